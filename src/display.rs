use colored::Colorize;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use crate::risk::{RiskLevel, RorResult};
use crate::stats::TrueCountTable;
use crate::strategy::Action;

fn signed_pct(value: f64) -> String {
    let s = format!("{:+.3}%", value * 100.0);
    if value > 0.0 {
        s.green().to_string()
    } else if value < 0.0 {
        s.red().to_string()
    } else {
        s.dimmed().to_string()
    }
}

pub fn stats_table(table: &TrueCountTable) -> String {
    let mut out = Table::new();
    out.set_content_arrangement(ContentArrangement::Dynamic);
    out.set_header(vec![
        Cell::new("True Count").set_alignment(CellAlignment::Right),
        Cell::new("Frequency").set_alignment(CellAlignment::Right),
        Cell::new("Percentage").set_alignment(CellAlignment::Right),
        Cell::new("Player Edge").set_alignment(CellAlignment::Right),
        Cell::new("Total Profit").set_alignment(CellAlignment::Right),
        Cell::new("Total Wagered").set_alignment(CellAlignment::Right),
    ]);

    for row in table.rows() {
        let tc = format!("{:+}", row.true_count);
        let tc = if row.frequency == 0 {
            tc.dimmed().to_string()
        } else {
            tc.bold().to_string()
        };
        out.add_row(vec![
            Cell::new(tc).set_alignment(CellAlignment::Right),
            Cell::new(row.frequency).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.4}%", row.percentage)).set_alignment(CellAlignment::Right),
            Cell::new(signed_pct(row.edge)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", row.total_profit)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", row.total_wagered)).set_alignment(CellAlignment::Right),
        ]);
    }

    out.to_string()
}

pub fn table_summary(table: &TrueCountTable) -> String {
    format!(
        "{} shoes | {} hands wagered | overall edge {}{}",
        table.shoes,
        table.total_hands(),
        signed_pct(table.overall_edge()),
        if table.skipped > 0 {
            format!(" | {} tail hands skipped", table.skipped)
        } else {
            String::new()
        },
    )
}

pub fn ror_table(result: &RorResult) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Metric").set_alignment(CellAlignment::Left),
        Cell::new("Value").set_alignment(CellAlignment::Right),
    ]);

    let rows: Vec<(&str, String)> = vec![
        (
            "Risk of Ruin (exponential)",
            format!("{:.4}%", result.risk_of_ruin_exponential * 100.0),
        ),
        (
            "Risk of Ruin (normal approx)",
            format!("{:.4}%", result.risk_of_ruin_normal_approx * 100.0),
        ),
        ("EV per hand", format!("{:.6} units", result.expected_value_per_hand)),
        ("EV per 100 hands", format!("{:.4} units", result.ev_per_100_hands)),
        ("SD per hand", format!("{:.4} units", result.standard_deviation_per_hand)),
        ("Variance per hand", format!("{:.4} units\u{b2}", result.variance_per_hand)),
        ("Average bet", format!("{:.2} units", result.average_bet_size)),
        ("Bankroll", format!("{:.0} units", result.bankroll_in_units)),
        ("Kelly fraction", format!("{:.6}", result.kelly_fraction)),
        (
            "Positive EV",
            if result.is_positive_ev { "Yes".to_string() } else { "No".to_string() },
        ),
    ];
    for (label, value) in rows {
        table.add_row(vec![
            Cell::new(label.bold().to_string()),
            Cell::new(value).set_alignment(CellAlignment::Right),
        ]);
    }

    table.to_string()
}

pub fn ror_verdict(result: &RorResult) -> String {
    let ev_line = if result.is_positive_ev {
        "This betting strategy has positive expected value.".green().to_string()
    } else {
        "Warning: this betting strategy has negative expected value.".red().to_string()
    };
    let pct = result.risk_of_ruin_exponential * 100.0;
    let level = result.risk_level();
    let risk_line = format!("{} risk of ruin ({:.4}%)", level, pct);
    let risk_line = match level {
        RiskLevel::VeryLow => risk_line.green().to_string(),
        RiskLevel::Low | RiskLevel::Moderate => risk_line.yellow().to_string(),
        RiskLevel::High => format!("{} - consider a larger bankroll", risk_line)
            .red()
            .bold()
            .to_string(),
    };
    format!("  {}\n  {}", ev_line, risk_line)
}

pub fn styled_action(action: Action) -> String {
    let s = action.as_str().to_uppercase();
    match action {
        Action::Double | Action::Split => s.green().bold().to_string(),
        Action::Hit => s.yellow().bold().to_string(),
        Action::Surrender => s.red().bold().to_string(),
        Action::Stand => s.bold().to_string(),
    }
}

pub fn print_section(title: &str, content: &str) {
    println!("\n{}", title.cyan().bold());
    println!("{}", content);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}

pub fn print_success(msg: &str) {
    println!("{}", msg.green().bold());
}
