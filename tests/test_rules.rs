use hilo_edge::rules::TableRules;

#[test]
fn test_default_rules() {
    let rules = TableRules::default();
    assert!(!rules.dealer_hits_soft17);
    assert!(rules.double_after_split);
    assert!(rules.split_aces);
    assert!(!rules.resplit_aces);
    assert!(rules.surrender_allowed);
    assert_eq!(rules.max_splits, 3);
    assert_eq!(rules.blackjack_pays, 1.5);
    assert!(rules.validate().is_ok());
}

#[test]
fn test_rules_from_partial_json() {
    let json = r#"{"dealer_hits_soft17": true, "blackjack_pays": 1.2}"#;
    let rules = TableRules::from_json_str(json).unwrap();
    assert!(rules.dealer_hits_soft17);
    assert_eq!(rules.blackjack_pays, 1.2);
    assert_eq!(rules.max_splits, 3);
}

#[test]
fn test_rules_reject_bad_payout() {
    assert!(TableRules::from_json_str(r#"{"blackjack_pays": 0}"#).is_err());
    assert!(TableRules::from_json_str(r#"{"blackjack_pays": -1.5}"#).is_err());
    assert!(TableRules::from_json_str("not json").is_err());
}

#[test]
fn test_rules_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.json");
    std::fs::write(&path, r#"{"surrender_allowed": false}"#).unwrap();
    let rules = TableRules::from_json_file(&path).unwrap();
    assert!(!rules.surrender_allowed);
    assert!(TableRules::from_json_file(&dir.path().join("nope.json")).is_err());
}
