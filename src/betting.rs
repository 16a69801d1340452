use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{EdgeError, EdgeResult};

/// Maps a true count to a wager. Passed into the driver so alternative
/// sizing schemes can be plugged in without touching the simulation loop.
pub trait BetPolicy: Send + Sync {
    /// Wager for this true count. Zero means sit out.
    fn bet_amount(&self, true_count: f64) -> f64;
}

/// Six-bucket spread: `<= 0`, 1, 2, 3, 4 and `>= 5`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BetSpread {
    pub tc_neg: f64,
    pub tc_1: f64,
    pub tc_2: f64,
    pub tc_3: f64,
    pub tc_4: f64,
    pub tc_5plus: f64,
}

impl Default for BetSpread {
    fn default() -> Self {
        BetSpread {
            tc_neg: 0.0,
            tc_1: 5.0,
            tc_2: 10.0,
            tc_3: 15.0,
            tc_4: 25.0,
            tc_5plus: 25.0,
        }
    }
}

impl BetSpread {
    pub fn new(values: [f64; 6]) -> EdgeResult<BetSpread> {
        let spread = BetSpread {
            tc_neg: values[0],
            tc_1: values[1],
            tc_2: values[2],
            tc_3: values[3],
            tc_4: values[4],
            tc_5plus: values[5],
        };
        spread.validate()?;
        Ok(spread)
    }

    pub fn values(&self) -> [f64; 6] {
        [self.tc_neg, self.tc_1, self.tc_2, self.tc_3, self.tc_4, self.tc_5plus]
    }

    pub fn validate(&self) -> EdgeResult<()> {
        if let Some(bad) = self.values().iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(EdgeError::InvalidBetSpread(format!(
                "wagers must be non-negative numbers, got {}",
                bad
            )));
        }
        if self.values().iter().all(|&v| v == 0.0) {
            return Err(EdgeError::InvalidBetSpread(
                "every bucket is zero, nothing would ever be wagered".to_string(),
            ));
        }
        Ok(())
    }

    /// Wager for an already-rounded true count.
    pub fn bet_for_bucket(&self, tc: i32) -> f64 {
        match tc {
            i32::MIN..=0 => self.tc_neg,
            1 => self.tc_1,
            2 => self.tc_2,
            3 => self.tc_3,
            4 => self.tc_4,
            _ => self.tc_5plus,
        }
    }

    /// Folder label for a run with this spread, e.g.
    /// `TC0-sitout_TC1-5_TC2-10_TC3-15_TC4-25_TC5plus-25`.
    pub fn label(&self) -> String {
        let first = if self.tc_neg > 0.0 {
            format!("TC0-{}", self.tc_neg)
        } else {
            "TC0-sitout".to_string()
        };
        std::iter::once(first)
            .chain([
                format!("TC1-{}", self.tc_1),
                format!("TC2-{}", self.tc_2),
                format!("TC3-{}", self.tc_3),
                format!("TC4-{}", self.tc_4),
                format!("TC5plus-{}", self.tc_5plus),
            ])
            .join("_")
    }
}

impl BetPolicy for BetSpread {
    fn bet_amount(&self, true_count: f64) -> f64 {
        self.bet_for_bucket(true_count.round() as i32)
    }
}

/// Wager for `true_count` under `spread`, rounding to the nearest integer
/// first.
pub fn bet_amount(true_count: f64, spread: &BetSpread) -> f64 {
    spread.bet_amount(true_count)
}

impl fmt::Display for BetSpread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.values().iter().join("/"))
    }
}

impl FromStr for BetSpread {
    type Err = EdgeError;

    /// Six comma-separated wagers: `"0,5,10,15,25,25"`.
    fn from_str(s: &str) -> EdgeResult<BetSpread> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 6 {
            return Err(EdgeError::InvalidBetSpread(format!(
                "expected 6 comma-separated values, got {}",
                parts.len()
            )));
        }
        let mut values = [0.0; 6];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse::<f64>()
                .map_err(|_| EdgeError::InvalidBetSpread(format!("not a number: {}", part)))?;
        }
        BetSpread::new(values)
    }
}
