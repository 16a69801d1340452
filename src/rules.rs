use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EdgeError, EdgeResult};

/// Table rules. Missing fields in a JSON rules file fall back to the
/// defaults below.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableRules {
    pub dealer_hits_soft17: bool,
    pub double_after_split: bool,
    pub split_aces: bool,
    pub resplit_aces: bool,
    pub surrender_allowed: bool,
    pub max_splits: u8,
    /// Natural payout as a multiple of the bet (1.5 = 3:2, 1.2 = 6:5).
    pub blackjack_pays: f64,
}

impl Default for TableRules {
    fn default() -> Self {
        TableRules {
            dealer_hits_soft17: false,
            double_after_split: true,
            split_aces: true,
            resplit_aces: false,
            surrender_allowed: true,
            max_splits: 3,
            blackjack_pays: 1.5,
        }
    }
}

impl TableRules {
    pub fn validate(&self) -> EdgeResult<()> {
        if !self.blackjack_pays.is_finite() || self.blackjack_pays <= 0.0 {
            return Err(EdgeError::InvalidConfig(format!(
                "blackjack_pays must be positive, got {}",
                self.blackjack_pays
            )));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> EdgeResult<TableRules> {
        let rules: TableRules = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn from_json_file(path: &Path) -> EdgeResult<TableRules> {
        let json = std::fs::read_to_string(path)?;
        TableRules::from_json_str(&json)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} | {} | {} | max {} splits | BJ pays {}",
            if self.dealer_hits_soft17 { "H17" } else { "S17" },
            if self.double_after_split { "DAS" } else { "no DAS" },
            if self.surrender_allowed { "LS" } else { "no surrender" },
            self.max_splits,
            self.blackjack_pays,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_uses_defaults() {
        let json = r#"{"dealer_hits_soft17": true, "max_splits": 1}"#;
        let rules = TableRules::from_json_str(json).unwrap();
        assert!(rules.dealer_hits_soft17);
        assert_eq!(rules.max_splits, 1);
        assert!(rules.double_after_split);
        assert_eq!(rules.blackjack_pays, 1.5);
    }

    #[test]
    fn rejects_non_positive_payout() {
        assert!(TableRules::from_json_str(r#"{"blackjack_pays": 0}"#).is_err());
    }
}
