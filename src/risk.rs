//! Risk of ruin from per-true-count frequency, edge and bet size.

use std::collections::BTreeMap;
use std::f64::consts::SQRT_2;
use std::fmt;

use serde::Serialize;

use crate::betting::BetPolicy;
use crate::error::{EdgeError, EdgeResult};
use crate::report::SimulationReport;
use crate::stats::TrueCountTable;

/// Empirical standard deviation of one blackjack hand per unit bet.
pub const DEFAULT_SD_PER_UNIT: f64 = 1.15;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RorInputs {
    pub tc_frequencies: BTreeMap<i32, f64>,
    pub tc_edges: BTreeMap<i32, f64>,
    pub tc_bet_sizes: BTreeMap<i32, f64>,
}

impl RorInputs {
    /// Counts that were never wagered are left out.
    pub fn from_table(table: &TrueCountTable, policy: &dyn BetPolicy) -> RorInputs {
        let total = table.total_hands();
        let mut inputs = RorInputs::default();
        if total == 0 {
            return inputs;
        }
        for (&tc, stat) in table.stats.iter().filter(|(_, s)| s.frequency > 0) {
            inputs.tc_frequencies.insert(tc, stat.frequency as f64 / total as f64);
            inputs.tc_edges.insert(tc, stat.edge());
            inputs.tc_bet_sizes.insert(tc, policy.bet_amount(tc as f64));
        }
        inputs
    }

    pub fn from_report(report: &SimulationReport, policy: &dyn BetPolicy) -> RorInputs {
        RorInputs::from_table(&report.table(), policy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RorResult {
    pub expected_value_per_hand: f64,
    pub ev_per_100_hands: f64,
    pub variance_per_hand: f64,
    pub standard_deviation_per_hand: f64,
    pub kelly_fraction: f64,
    pub risk_of_ruin_exponential: f64,
    pub risk_of_ruin_normal_approx: f64,
    pub average_bet_size: f64,
    pub bankroll_in_units: f64,
    pub is_positive_ev: bool,
}

impl RorResult {
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_ror(self.risk_of_ruin_exponential)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    VeryLow,
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// Bands on the exponential RoR: <1%, <5%, <13.5%, above.
    pub fn from_ror(ror: f64) -> RiskLevel {
        let pct = ror * 100.0;
        if pct < 1.0 {
            RiskLevel::VeryLow
        } else if pct < 5.0 {
            RiskLevel::Low
        } else if pct < 13.5 {
            RiskLevel::Moderate
        } else {
            RiskLevel::High
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::VeryLow => "very low",
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskOfRuinCalculator {
    pub base_sd_per_unit: f64,
}

impl Default for RiskOfRuinCalculator {
    fn default() -> Self {
        RiskOfRuinCalculator {
            base_sd_per_unit: DEFAULT_SD_PER_UNIT,
        }
    }
}

impl RiskOfRuinCalculator {
    pub fn new(base_sd_per_unit: f64) -> EdgeResult<RiskOfRuinCalculator> {
        if !base_sd_per_unit.is_finite() || base_sd_per_unit <= 0.0 {
            return Err(EdgeError::InvalidConfig(format!(
                "standard deviation per unit must be positive, got {}",
                base_sd_per_unit
            )));
        }
        Ok(RiskOfRuinCalculator { base_sd_per_unit })
    }

    pub fn calculate_inputs(&self, inputs: &RorInputs, bankroll: f64) -> EdgeResult<RorResult> {
        self.calculate(&inputs.tc_frequencies, &inputs.tc_edges, &inputs.tc_bet_sizes, bankroll)
    }

    /// Frequencies are normalized to sum to 1 before use.
    pub fn calculate(
        &self,
        tc_frequencies: &BTreeMap<i32, f64>,
        tc_edges: &BTreeMap<i32, f64>,
        tc_bet_sizes: &BTreeMap<i32, f64>,
        bankroll: f64,
    ) -> EdgeResult<RorResult> {
        let frequencies = validate_inputs(tc_frequencies, tc_edges, tc_bet_sizes, bankroll)?;

        let mut ev = 0.0;
        let mut variance = 0.0;
        let mut average_bet = 0.0;
        for (tc, freq) in &frequencies {
            let edge = tc_edges[tc];
            let bet = tc_bet_sizes[tc];
            ev += freq * edge * bet;
            variance += freq * (bet * self.base_sd_per_unit).powi(2);
            average_bet += freq * bet;
        }
        let sd = variance.sqrt();

        let ror_exponential = if variance > 0.0 && ev > 0.0 {
            (-2.0 * bankroll * ev / variance).exp()
        } else {
            boundary_ror(ev)
        };

        let ror_normal = if sd > 0.0 && ev > 0.0 {
            let hands_to_ruin = bankroll / ev.abs();
            let z = -bankroll / (sd * hands_to_ruin.sqrt());
            0.5 * erfc(-z / SQRT_2)
        } else {
            boundary_ror(ev)
        };

        let kelly_fraction = if variance > 0.0 { ev / variance } else { 0.0 };

        Ok(RorResult {
            expected_value_per_hand: ev,
            ev_per_100_hands: ev * 100.0,
            variance_per_hand: variance,
            standard_deviation_per_hand: sd,
            kelly_fraction,
            risk_of_ruin_exponential: ror_exponential,
            risk_of_ruin_normal_approx: ror_normal,
            average_bet_size: average_bet,
            bankroll_in_units: bankroll,
            is_positive_ev: ev > 0.0,
        })
    }

    /// Bankroll that brings the exponential RoR down to `target`. `None`
    /// when the game has no positive expectation.
    pub fn required_bankroll(&self, inputs: &RorInputs, target: f64) -> EdgeResult<Option<f64>> {
        if !(target > 0.0 && target < 1.0) {
            return Err(EdgeError::InvalidConfig(format!(
                "target risk of ruin must be between 0 and 1, got {}",
                target
            )));
        }
        // Any positive bankroll gives the same EV and variance.
        let result = self.calculate_inputs(inputs, 1.0)?;
        if !result.is_positive_ev || result.variance_per_hand <= 0.0 {
            return Ok(None);
        }
        Ok(Some(
            -target.ln() * result.variance_per_hand / (2.0 * result.expected_value_per_hand),
        ))
    }
}

/// Certain ruin without an edge, no ruin with an edge and no variance.
fn boundary_ror(ev: f64) -> f64 {
    if ev <= 0.0 {
        1.0
    } else {
        0.0
    }
}

fn validate_inputs(
    tc_frequencies: &BTreeMap<i32, f64>,
    tc_edges: &BTreeMap<i32, f64>,
    tc_bet_sizes: &BTreeMap<i32, f64>,
    bankroll: f64,
) -> EdgeResult<BTreeMap<i32, f64>> {
    if !bankroll.is_finite() || bankroll <= 0.0 {
        return Err(EdgeError::InvalidBankroll(bankroll));
    }
    if tc_frequencies.is_empty() {
        return Err(EdgeError::EmptyFrequencies);
    }
    for &tc in tc_frequencies.keys() {
        if !tc_edges.contains_key(&tc) {
            return Err(EdgeError::MissingEdge(tc));
        }
        if !tc_bet_sizes.contains_key(&tc) {
            return Err(EdgeError::MissingBetSize(tc));
        }
    }
    if let Some((tc, f)) = tc_frequencies.iter().find(|(_, f)| !f.is_finite() || **f < 0.0) {
        return Err(EdgeError::InvalidConfig(format!(
            "frequency for true count {} must be non-negative, got {}",
            tc, f
        )));
    }
    let sum: f64 = tc_frequencies.values().sum();
    if sum <= 0.0 {
        return Err(EdgeError::ZeroFrequencies);
    }
    Ok(tc_frequencies.iter().map(|(&tc, &f)| (tc, f / sum)).collect())
}

/// Complementary error function (Numerical Recipes `erfcc`, fractional
/// error below 1.2e-7).
pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87 + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let r = t * poly.exp();
    if x >= 0.0 {
        r
    } else {
        2.0 - r
    }
}
