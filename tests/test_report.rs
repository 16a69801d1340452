use std::io::Cursor;

use hilo_edge::error::EdgeError;
use hilo_edge::report::*;
use hilo_edge::simulation::SimulationConfig;
use hilo_edge::stats::{TailPolicy, TrueCountTable};

fn sample_table() -> TrueCountTable {
    let mut table = TrueCountTable::new();
    table.record(-2, -10.0, 10.0, TailPolicy::Clamp);
    table.record(1, 5.0, 5.0, TailPolicy::Clamp);
    table.record(1, -5.0, 5.0, TailPolicy::Clamp);
    table.record(4, 50.0, 25.0, TailPolicy::Clamp);
    table.shoes = 3;
    table
}

fn written(report: &SimulationReport) -> String {
    let mut buf = Vec::new();
    report.write(&mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn test_report_layout() {
    let report = SimulationReport::new(SimulationConfig::new(6, 4.5, 3), &sample_table());
    let text = written(&report);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], format!("# {}", TITLE));
    assert_eq!(lines[1], "# Deck Count: 6");
    assert_eq!(lines[2], "# Penetration: 4.5 deck penetration");
    assert_eq!(lines[3], "# Total Shoes: 3");
    assert_eq!(lines[4], "# Total Hands: 4");
    assert!(lines[5].starts_with("# Generated: "));
    assert_eq!(lines[6], "");
    assert_eq!(lines[7], COLUMNS);
    assert_eq!(lines.len(), 8 + 21);
    assert_eq!(lines[8], "-10,0,0.000000,0.000000,0.00,0.00");
    assert_eq!(lines[8 + 14], "4,1,25.000000,2.000000,50.00,25.00");
}

#[test]
fn test_report_reads_back() {
    let config = SimulationConfig::new(2, 0.0, 3);
    let report = SimulationReport::new(config, &sample_table());
    let parsed = SimulationReport::parse(Cursor::new(written(&report))).unwrap();
    assert_eq!(parsed.config, config);
    assert_eq!(parsed.total_hands, 4);
    assert_eq!(parsed.generated, report.generated);
    assert_eq!(parsed.rows, report.rows);
    assert_eq!(parsed.table(), sample_table());
}

#[test]
fn test_parse_tolerates_thousands_separators() {
    let text = "\
# Deck Count: 8
# Penetration: 6.0 deck penetration
# Total Shoes: 1,000
# Total Hands: 1,234

True Count,Frequency,Percentage,Player Edge,Total Profit,Total Wagered
0,\"1,200\",97.244733,-0.010000,-120.00,\"12,000.00\"
1,34,2.755267,0.020000,3.40,170.00
";
    let report = SimulationReport::parse(Cursor::new(text)).unwrap();
    assert_eq!(report.config, SimulationConfig::new(8, 6.0, 1000));
    assert_eq!(report.total_hands, 1234);
    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.rows[0].frequency, 1200);
    assert_eq!(report.rows[0].total_wagered, 12_000.0);
    assert_eq!(report.table().get(1).frequency, 34);
}

#[test]
fn test_parse_errors() {
    let no_header = "# Deck Count: 6\n1,2,3,4,5,6\n";
    assert!(matches!(
        SimulationReport::parse(Cursor::new(no_header)),
        Err(EdgeError::InvalidReport(_))
    ));

    let short_row = format!("# Deck Count: 6\n{}\n1,2,3\n", COLUMNS);
    assert!(SimulationReport::parse(Cursor::new(short_row)).is_err());

    let no_decks = format!("{}\n1,2,3,4,5,6\n", COLUMNS);
    assert!(SimulationReport::parse(Cursor::new(no_decks)).is_err());
}

#[test]
fn test_missing_total_hands_is_summed() {
    let text = format!(
        "# Deck Count: 1\n# Penetration: No penetration (all cards played)\n{}\n{}\n{}\n",
        COLUMNS, "0,7,70.0,0.0,0.0,7.0", "1,3,30.0,0.0,0.0,3.0"
    );
    let report = SimulationReport::parse(Cursor::new(text)).unwrap();
    assert_eq!(report.total_hands, 10);
    assert_eq!(report.config.penetration, 0.0);
}

#[test]
fn test_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("6decks-4.5penetration.csv");
    let report = SimulationReport::new(SimulationConfig::new(6, 4.5, 3), &sample_table());
    report.save(&path).unwrap();
    let loaded = SimulationReport::load(&path).unwrap();
    assert_eq!(loaded.rows, report.rows);
    assert!(SimulationReport::load(&dir.path().join("missing.csv")).is_err());
}

#[test]
fn test_json_round_trip() {
    let report = SimulationReport::new(SimulationConfig::new(4, 3.25, 3), &sample_table());
    let json = report.to_json().unwrap();
    assert!(json.contains("\"deck_count\": 4"));
    assert_eq!(SimulationReport::from_json(&json).unwrap(), report);
}
