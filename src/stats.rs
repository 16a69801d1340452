//! Per-true-count accumulation of hands, profit and stakes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const TC_MIN: i32 = -10;
pub const TC_MAX: i32 = 10;

/// What to do with hands whose true count falls outside `[TC_MIN, TC_MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TailPolicy {
    /// Fold into the nearest boundary bucket.
    #[default]
    Clamp,
    /// Play the hand but leave it out of the statistics.
    Skip,
}

impl TailPolicy {
    /// Bucket for `tc`, or `None` when the hand should not be recorded.
    pub fn bucket(self, tc: i32) -> Option<i32> {
        match self {
            TailPolicy::Clamp => Some(tc.clamp(TC_MIN, TC_MAX)),
            TailPolicy::Skip if (TC_MIN..=TC_MAX).contains(&tc) => Some(tc),
            TailPolicy::Skip => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrueCountStat {
    pub frequency: u64,
    pub total_profit: f64,
    pub total_wagered: f64,
}

impl TrueCountStat {
    pub fn record(&mut self, profit: f64, wagered: f64) {
        self.frequency += 1;
        self.total_profit += profit;
        self.total_wagered += wagered;
    }

    pub fn merge(&mut self, other: &TrueCountStat) {
        self.frequency += other.frequency;
        self.total_profit += other.total_profit;
        self.total_wagered += other.total_wagered;
    }

    /// Profit per unit wagered; 0 when nothing was wagered.
    pub fn edge(&self) -> f64 {
        if self.total_wagered > 0.0 {
            self.total_profit / self.total_wagered
        } else {
            0.0
        }
    }
}

/// Statistics for one configuration run. Buckets are created on first use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrueCountTable {
    pub stats: BTreeMap<i32, TrueCountStat>,
    pub shoes: u64,
    /// Wagered hands left out by `TailPolicy::Skip`.
    pub skipped: u64,
}

impl TrueCountTable {
    pub fn new() -> TrueCountTable {
        TrueCountTable::default()
    }

    /// Record one wagered hand. Returns false if the tail policy dropped it.
    pub fn record(&mut self, true_count: i32, profit: f64, wagered: f64, tail: TailPolicy) -> bool {
        match tail.bucket(true_count) {
            Some(tc) => {
                self.stats.entry(tc).or_default().record(profit, wagered);
                true
            }
            None => {
                self.skipped += 1;
                false
            }
        }
    }

    pub fn merge(&mut self, other: &TrueCountTable) {
        for (&tc, stat) in &other.stats {
            self.stats.entry(tc).or_default().merge(stat);
        }
        self.shoes += other.shoes;
        self.skipped += other.skipped;
    }

    pub fn get(&self, true_count: i32) -> TrueCountStat {
        self.stats.get(&true_count).copied().unwrap_or_default()
    }

    pub fn total_hands(&self) -> u64 {
        self.stats.values().map(|s| s.frequency).sum()
    }

    pub fn total_profit(&self) -> f64 {
        self.stats.values().map(|s| s.total_profit).sum()
    }

    pub fn total_wagered(&self) -> f64 {
        self.stats.values().map(|s| s.total_wagered).sum()
    }

    /// Edge over every recorded hand.
    pub fn overall_edge(&self) -> f64 {
        let wagered = self.total_wagered();
        if wagered > 0.0 {
            self.total_profit() / wagered
        } else {
            0.0
        }
    }

    /// Share of recorded hands at this count, in percent.
    pub fn percentage(&self, true_count: i32) -> f64 {
        let total = self.total_hands();
        if total == 0 {
            return 0.0;
        }
        self.get(true_count).frequency as f64 / total as f64 * 100.0
    }

    /// One row per count from `TC_MIN` to `TC_MAX`, zero-filled.
    pub fn rows(&self) -> Vec<TrueCountRow> {
        (TC_MIN..=TC_MAX)
            .map(|tc| {
                let stat = self.get(tc);
                TrueCountRow {
                    true_count: tc,
                    frequency: stat.frequency,
                    percentage: self.percentage(tc),
                    edge: stat.edge(),
                    total_profit: stat.total_profit,
                    total_wagered: stat.total_wagered,
                }
            })
            .collect()
    }
}

/// Tabular form of one bucket, the shape persisted in reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrueCountRow {
    pub true_count: i32,
    pub frequency: u64,
    pub percentage: f64,
    pub edge: f64,
    pub total_profit: f64,
    pub total_wagered: f64,
}
