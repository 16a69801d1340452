use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing::Level;

use crate::betting::BetSpread;
use crate::cards::{parse_ranks, Rank};
use crate::display::{
    print_error, print_section, print_success, ror_table, ror_verdict, stats_table, styled_action,
    table_summary,
};
use crate::error::{EdgeError, EdgeResult};
use crate::hand::Hand;
use crate::job::{CancelToken, SimulationJob};
use crate::report::SimulationReport;
use crate::risk::{RiskOfRuinCalculator, RorInputs, DEFAULT_SD_PER_UNIT};
use crate::rules::TableRules;
use crate::simulation::{run_configuration, SimulationConfig, SimulationOptions};
use crate::stats::TailPolicy;
use crate::strategy::{decide, Action, Allowed};
use crate::sweep::{save_reports, standard_configurations, sweep_dir};

const DEFAULT_SPREAD: &str = "0,5,10,15,25,25";

#[derive(Parser)]
#[command(
    name = "edge",
    version = "1.0.0",
    about = "High-Low card counting edge simulator and risk-of-ruin calculator."
)]
struct Cli {
    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum TailArg {
    Clamp,
    Skip,
}

impl TailArg {
    fn policy(self) -> TailPolicy {
        match self {
            TailArg::Clamp => TailPolicy::Clamp,
            TailArg::Skip => TailPolicy::Skip,
        }
    }
}

#[derive(clap::Args)]
struct RunArgs {
    /// Bet per true count bucket: <=0,1,2,3,4,5+
    #[arg(long, default_value = DEFAULT_SPREAD)]
    spread: String,
    /// JSON file with table rules (missing fields use defaults)
    #[arg(long)]
    rules: Option<PathBuf>,
    /// Base RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
    /// Parallel workers (0 = one per core)
    #[arg(short, long, default_value = "0")]
    workers: usize,
    /// What to do with true counts outside -10..=10
    #[arg(long, default_value = "clamp")]
    tail: TailArg,
}

impl RunArgs {
    fn spread(&self) -> EdgeResult<BetSpread> {
        self.spread.parse()
    }

    fn options(&self) -> EdgeResult<SimulationOptions> {
        let rules = match &self.rules {
            Some(path) => TableRules::from_json_file(path)?,
            None => TableRules::default(),
        };
        Ok(SimulationOptions {
            rules,
            tail: self.tail.policy(),
            workers: self.workers,
            seed: self.seed,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate one deck/penetration configuration
    Simulate {
        /// Decks in the shoe
        #[arg(short, long, default_value = "6")]
        decks: usize,
        /// Decks dealt before reshuffling (0 = whole shoe)
        #[arg(short, long, default_value = "0")]
        penetration: f64,
        /// Number of shoes to play
        #[arg(short = 'n', long, default_value = "10000")]
        shoes: u64,
        #[command(flatten)]
        run: RunArgs,
        /// Write the per-count report here
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Also compute risk of ruin for this bankroll (betting units)
        #[arg(short, long)]
        bankroll: Option<f64>,
    },
    /// Simulate the standard grid of deck counts and penetrations
    Sweep {
        /// Number of shoes per configuration
        #[arg(short = 'n', long, default_value = "10000")]
        shoes: u64,
        #[command(flatten)]
        run: RunArgs,
        /// Root folder for the reports
        #[arg(short, long, default_value = "simulation_results")]
        out_dir: PathBuf,
    },
    /// Risk of ruin from a saved report
    Ror {
        /// Report written by `simulate --out` or `sweep`
        report: PathBuf,
        /// Bankrolls in betting units
        #[arg(short, long, num_args = 1.., default_value = "1000")]
        bankroll: Vec<f64>,
        /// Bet per true count bucket: <=0,1,2,3,4,5+
        #[arg(long, default_value = DEFAULT_SPREAD)]
        spread: String,
        /// Standard deviation of one hand per unit bet
        #[arg(long, default_value_t = DEFAULT_SD_PER_UNIT)]
        sd: f64,
        /// Also report the bankroll needed for this risk of ruin (0-1)
        #[arg(long)]
        target: Option<f64>,
    },
    /// Basic strategy decision for a hand against a dealer up-card
    Decide {
        /// Player cards (e.g. "A,7", "8 8", "T6")
        hand: String,
        /// Dealer up-card (e.g. 6, T, A)
        dealer: String,
        #[arg(long)]
        no_double: bool,
        #[arg(long)]
        no_split: bool,
        #[arg(long)]
        no_surrender: bool,
    },
}

pub fn run() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(e) = dispatch(cli.command) {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn dispatch(command: Commands) -> EdgeResult<()> {
    match command {
        Commands::Simulate {
            decks,
            penetration,
            shoes,
            run,
            out,
            bankroll,
        } => {
            let config = SimulationConfig::new(decks, penetration, shoes);
            cmd_simulate(config, &run, out.as_deref(), bankroll)
        }
        Commands::Sweep { shoes, run, out_dir } => cmd_sweep(shoes, &run, &out_dir),
        Commands::Ror {
            report,
            bankroll,
            spread,
            sd,
            target,
        } => cmd_ror(&report, &bankroll, &spread, sd, target),
        Commands::Decide {
            hand,
            dealer,
            no_double,
            no_split,
            no_surrender,
        } => cmd_decide(&hand, &dealer, !no_double, !no_split, !no_surrender),
    }
}

fn cmd_simulate(
    config: SimulationConfig,
    run: &RunArgs,
    out: Option<&Path>,
    bankroll: Option<f64>,
) -> EdgeResult<()> {
    let spread = run.spread()?;
    let options = run.options()?;

    println!();
    println!(
        "  {} {} | {} | spread {}",
        "Simulating".bold(),
        config.name().bold(),
        options.rules.summary(),
        spread,
    );

    let table = run_configuration(&config, &spread, &options, &CancelToken::new())
        .map_err(|e| e.in_configuration(config.name()))?;

    print_section("Per true count", &stats_table(&table));
    println!("  {}", table_summary(&table));

    if let Some(path) = out {
        SimulationReport::new(config, &table).save(path)?;
        print_success(&format!("Saved report to {}", path.display()));
    }

    if let Some(bankroll) = bankroll {
        let inputs = RorInputs::from_table(&table, &spread);
        print_ror(&inputs, &RiskOfRuinCalculator::default(), bankroll)?;
    }
    Ok(())
}

fn print_ror(inputs: &RorInputs, calc: &RiskOfRuinCalculator, bankroll: f64) -> EdgeResult<()> {
    let result = calc.calculate_inputs(inputs, bankroll)?;
    print_section(&format!("Risk of ruin, bankroll {}", bankroll), &ror_table(&result));
    println!("{}", ror_verdict(&result));
    Ok(())
}

fn cmd_sweep(shoes: u64, run: &RunArgs, out_dir: &Path) -> EdgeResult<()> {
    let spread = run.spread()?;
    let options = run.options()?;
    let configs = standard_configurations(shoes);
    let dir = sweep_dir(out_dir, &spread, shoes);

    println!();
    println!(
        "  {} {} configurations x {} shoes -> {}",
        "Sweep".bold(),
        configs.len(),
        shoes,
        dir.display(),
    );

    let job = SimulationJob::new();
    let summary = std::thread::scope(|scope| {
        let handle = scope.spawn(|| job.run(&configs, &spread, &options));
        let mut last = usize::MAX;
        while !handle.is_finished() {
            let snap = job.snapshot();
            if snap.completed != last {
                last = snap.completed;
                if let Some(current) = &snap.current {
                    println!("  [{}/{}] {}", snap.completed + 1, snap.total, current);
                }
            }
            std::thread::sleep(Duration::from_millis(200));
        }
        handle.join()
    })
    .map_err(|_| EdgeError::WorkerFailed {
        worker: 0,
        message: "sweep thread panicked".to_string(),
    })?
    .ok_or_else(|| EdgeError::InvalidConfig("job was already started".to_string()))?;

    let written = save_reports(&dir, &summary)?;
    for outcome in summary.failed() {
        if let Err(e) = &outcome.result {
            print_error(&e.to_string());
        }
    }
    println!();
    println!(
        "  {} {} saved, {} failed ({:?})",
        "Sweep".bold(),
        written.len().to_string().bold(),
        summary.failed().count(),
        job.status(),
    );
    Ok(())
}

fn cmd_ror(
    report: &Path,
    bankrolls: &[f64],
    spread: &str,
    sd: f64,
    target: Option<f64>,
) -> EdgeResult<()> {
    let report = SimulationReport::load(report)?;
    let spread: BetSpread = spread.parse()?;
    let calc = RiskOfRuinCalculator::new(sd)?;
    let inputs = RorInputs::from_report(&report, &spread);

    println!();
    println!(
        "  {} {} | {} hands | spread {}",
        "Report".bold(),
        report.config.name().bold(),
        report.total_hands,
        spread,
    );

    for &bankroll in bankrolls {
        print_ror(&inputs, &calc, bankroll)?;
    }

    if let Some(target) = target {
        match calc.required_bankroll(&inputs, target)? {
            Some(bankroll) => println!(
                "\n  Bankroll for {:.2}% risk of ruin: {} units",
                target * 100.0,
                format!("{:.0}", bankroll.ceil()).bold()
            ),
            None => println!(
                "\n  {}",
                "No bankroll is large enough without a positive edge.".red()
            ),
        }
    }
    Ok(())
}

fn cmd_decide(
    hand: &str,
    dealer: &str,
    can_double: bool,
    can_split: bool,
    can_surrender: bool,
) -> EdgeResult<()> {
    let cards = parse_ranks(hand)?;
    let dealer: Rank = dealer.parse()?;
    let hand = Hand::from_cards(&cards);
    let allowed = Allowed::for_hand(&hand, can_double, can_split, can_surrender);
    let action = decide(&hand, dealer, allowed);

    let kind = if hand.is_soft() { "soft" } else { "hard" };
    println!();
    println!(
        "  {} ({} {}) vs dealer {}: {}",
        hand,
        kind,
        hand.value(),
        dealer,
        styled_action(action)
    );
    if action == Action::Split && hand.is_pair_of_aces() {
        println!("  {}", "Only if the table allows splitting aces.".dimmed());
    }
    Ok(())
}
