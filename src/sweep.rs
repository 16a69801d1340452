//! Runs many deck/penetration configurations one after another. Each
//! configuration succeeds or fails on its own; cancellation is checked
//! between configurations.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};

use crate::betting::{BetPolicy, BetSpread};
use crate::error::{EdgeError, EdgeResult};
use crate::job::CancelToken;
use crate::report::SimulationReport;
use crate::simulation::{run_configuration, SimulationConfig, SimulationOptions};
use crate::stats::TrueCountTable;

pub const STANDARD_DECK_COUNTS: [usize; 6] = [1, 2, 3, 4, 6, 8];

/// For each standard deck count: the full shoe, then penetrations stepping
/// down by a quarter deck from `decks - 0.25` to half the shoe.
pub fn standard_configurations(num_shoes: u64) -> Vec<SimulationConfig> {
    let mut configs = Vec::new();
    for &decks in &STANDARD_DECK_COUNTS {
        configs.push(SimulationConfig::new(decks, 0.0, num_shoes));
        // Quarter steps are exact in binary, so the loop bound is safe.
        let mut penetration = decks as f64 - 0.25;
        while penetration >= decks as f64 / 2.0 {
            configs.push(SimulationConfig::new(decks, penetration, num_shoes));
            penetration -= 0.25;
        }
    }
    configs
}

#[derive(Debug)]
pub struct ConfigOutcome {
    pub config: SimulationConfig,
    pub result: EdgeResult<TrueCountTable>,
    pub elapsed_secs: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepProgress {
    pub completed: usize,
    pub total: usize,
    pub current: Option<String>,
}

#[derive(Debug, Default)]
pub struct SweepSummary {
    pub outcomes: Vec<ConfigOutcome>,
    /// The cancel token fired; configurations after the last outcome never ran.
    pub cancelled: bool,
}

impl SweepSummary {
    pub fn succeeded(&self) -> impl Iterator<Item = (&SimulationConfig, &TrueCountTable)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|t| (&o.config, t)))
    }

    pub fn failed(&self) -> impl Iterator<Item = &ConfigOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }
}

pub fn run_sweep<F>(
    configs: &[SimulationConfig],
    policy: &dyn BetPolicy,
    options: &SimulationOptions,
    cancel: &CancelToken,
    mut on_progress: F,
) -> SweepSummary
where
    F: FnMut(SweepProgress),
{
    let total = configs.len();
    let mut summary = SweepSummary::default();

    for (i, config) in configs.iter().enumerate() {
        if cancel.is_cancelled() {
            info!(completed = i, total, "sweep cancelled");
            summary.cancelled = true;
            break;
        }
        on_progress(SweepProgress {
            completed: i,
            total,
            current: Some(config.name()),
        });

        let start = Instant::now();
        let result = run_configuration(config, policy, options, cancel)
            .map_err(|e| e.in_configuration(config.name()));
        if let Err(e) = &result {
            warn!(config = %config.name(), error = %e, "configuration failed");
        }
        let was_cancelled = matches!(result, Err(EdgeError::Cancelled));
        summary.outcomes.push(ConfigOutcome {
            config: *config,
            result,
            elapsed_secs: start.elapsed().as_secs_f64(),
        });
        if was_cancelled {
            summary.cancelled = true;
            break;
        }
    }

    on_progress(SweepProgress {
        completed: summary.outcomes.len(),
        total,
        current: None,
    });
    summary
}

/// Output folder for a sweep: `<root>/<spread label>_<shoes>shoes`.
pub fn sweep_dir(root: &Path, spread: &BetSpread, num_shoes: u64) -> PathBuf {
    root.join(format!("{}_{}shoes", spread.label(), num_shoes))
}

/// Write one report per successful configuration into `dir`. Returns the
/// written paths.
pub fn save_reports(dir: &Path, summary: &SweepSummary) -> EdgeResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for (config, table) in summary.succeeded() {
        let report = SimulationReport::new(*config, table);
        let path = dir.join(format!("{}.csv", config.name()));
        report.save(&path)?;
        written.push(path);
    }
    Ok(written)
}
