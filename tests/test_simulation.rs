use hilo_edge::betting::{BetPolicy, BetSpread};
use hilo_edge::error::EdgeError;
use hilo_edge::job::CancelToken;
use hilo_edge::rules::TableRules;
use hilo_edge::simulation::*;
use hilo_edge::stats::{TailPolicy, TrueCountTable, TC_MAX, TC_MIN};
use rand::rngs::StdRng;
use rand::SeedableRng;

struct SitOut;

impl BetPolicy for SitOut {
    fn bet_amount(&self, _true_count: f64) -> f64 {
        0.0
    }
}

struct Explodes;

impl BetPolicy for Explodes {
    fn bet_amount(&self, _true_count: f64) -> f64 {
        panic!("bet sizing blew up")
    }
}

fn seeded(workers: usize) -> SimulationOptions {
    SimulationOptions {
        workers,
        seed: Some(2024),
        ..SimulationOptions::default()
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn test_config_names() {
    assert_eq!(SimulationConfig::new(6, 0.0, 1).name(), "6decks-nopenetration");
    assert_eq!(SimulationConfig::new(6, 4.5, 1).name(), "6decks-4.5penetration");
    assert_eq!(SimulationConfig::new(2, 1.0, 1).name(), "2decks-1.0penetration");
    assert_eq!(SimulationConfig::new(8, 5.75, 1).name(), "8decks-5.75penetration");
}

#[test]
fn test_cards_to_play() {
    assert_eq!(SimulationConfig::new(6, 0.0, 1).cards_to_play(), 312);
    assert_eq!(SimulationConfig::new(6, 4.5, 1).cards_to_play(), 234);
    assert_eq!(SimulationConfig::new(1, 0.75, 1).cards_to_play(), 39);
}

#[test]
fn test_config_validation() {
    assert!(SimulationConfig::new(6, 4.5, 10).validate().is_ok());
    assert!(SimulationConfig::new(6, 6.0, 10).validate().is_ok());
    assert!(SimulationConfig::new(0, 0.0, 10).validate().is_err());
    assert!(SimulationConfig::new(6, 0.0, 0).validate().is_err());
    assert!(SimulationConfig::new(6, -1.0, 10).validate().is_err());
    assert!(SimulationConfig::new(6, 7.0, 10).validate().is_err());
    assert!(SimulationConfig::new(6, f64::NAN, 10).validate().is_err());
}

#[test]
fn test_invalid_config_is_rejected_before_running() {
    let result = run_configuration(
        &SimulationConfig::new(0, 0.0, 10),
        &BetSpread::default(),
        &seeded(1),
        &CancelToken::new(),
    );
    assert!(matches!(result, Err(EdgeError::InvalidConfig(_))));
}

#[test]
fn test_invalid_rules_are_rejected() {
    let options = SimulationOptions {
        rules: TableRules {
            blackjack_pays: 0.0,
            ..TableRules::default()
        },
        ..seeded(1)
    };
    let result = run_configuration(
        &SimulationConfig::new(1, 0.0, 1),
        &BetSpread::default(),
        &options,
        &CancelToken::new(),
    );
    assert!(result.is_err());
}

// ---------------------------------------------------------------------------
// Single shoe
// ---------------------------------------------------------------------------

#[test]
fn test_sitting_out_records_nothing() {
    let config = SimulationConfig::new(6, 0.0, 1);
    let mut table = TrueCountTable::new();
    let mut rng = StdRng::seed_from_u64(3);
    let rules = TableRules::default();
    simulate_shoe(&config, &rules, &SitOut, TailPolicy::Clamp, &mut rng, &mut table);
    assert_eq!(table.total_hands(), 0);
    assert!(table.stats.is_empty());
    assert_eq!(table.shoes, 1);
}

#[test]
fn test_flat_betting_records_every_round() {
    let flat = BetSpread::new([10.0; 6]).unwrap();
    let config = SimulationConfig::new(2, 0.0, 1);
    let mut table = TrueCountTable::new();
    let mut rng = StdRng::seed_from_u64(11);
    simulate_shoe(&config, &TableRules::default(), &flat, TailPolicy::Clamp, &mut rng, &mut table);
    assert!(table.total_hands() >= 5);
    assert!(table.total_wagered() >= 10.0 * table.total_hands() as f64);
    assert!(table.stats.keys().all(|tc| (TC_MIN..=TC_MAX).contains(tc)));
}

// ---------------------------------------------------------------------------
// Parallel runs
// ---------------------------------------------------------------------------

#[test]
fn test_seeded_run_is_reproducible() {
    let config = SimulationConfig::new(6, 4.5, 24);
    let spread = BetSpread::default();
    let a = run_configuration(&config, &spread, &seeded(4), &CancelToken::new()).unwrap();
    let b = run_configuration(&config, &spread, &seeded(4), &CancelToken::new()).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.shoes, 24);
    assert!(a.total_hands() > 0);
}

#[test]
fn test_every_shoe_is_played_once() {
    let config = SimulationConfig::new(1, 0.0, 7);
    let spread = BetSpread::default();
    let table = run_configuration(&config, &spread, &seeded(3), &CancelToken::new()).unwrap();
    assert_eq!(table.shoes, 7);
    let single = run_configuration(&config, &spread, &seeded(1), &CancelToken::new()).unwrap();
    assert_eq!(single.shoes, 7);
}

#[test]
fn test_panicking_worker_fails_configuration() {
    let result = run_configuration(
        &SimulationConfig::new(1, 0.0, 4),
        &Explodes,
        &seeded(2),
        &CancelToken::new(),
    );
    match result {
        Err(EdgeError::WorkerFailed { message, .. }) => assert!(message.contains("blew up")),
        other => panic!("expected WorkerFailed, got {:?}", other),
    }
}

#[test]
fn test_failures_name_their_configuration() {
    let config = SimulationConfig::new(2, 1.5, 4);
    let err = run_configuration(&config, &Explodes, &seeded(1), &CancelToken::new())
        .map_err(|e| e.in_configuration(config.name()))
        .unwrap_err();
    assert!(err.to_string().contains("2decks-1.5penetration"));
    match err {
        EdgeError::ConfigurationFailed { name, source } => {
            assert_eq!(name, "2decks-1.5penetration");
            assert!(matches!(*source, EdgeError::WorkerFailed { .. }));
        }
        other => panic!("expected ConfigurationFailed, got {:?}", other),
    }
}

#[test]
fn test_cancellation_is_not_tagged() {
    let err = EdgeError::Cancelled.in_configuration("1decks-nopenetration".to_string());
    assert!(matches!(err, EdgeError::Cancelled));
}

#[test]
fn test_cancelled_before_start() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let config = SimulationConfig::new(1, 0.0, 4);
    let result = run_configuration(&config, &BetSpread::default(), &seeded(2), &cancel);
    assert!(matches!(result, Err(EdgeError::Cancelled)));
}

#[test]
fn test_skip_tail_keeps_buckets_in_range() {
    let options = SimulationOptions {
        tail: TailPolicy::Skip,
        ..seeded(2)
    };
    let table = run_configuration(
        &SimulationConfig::new(1, 0.0, 20),
        &BetSpread::default(),
        &options,
        &CancelToken::new(),
    )
    .unwrap();
    assert!(table.stats.keys().all(|tc| (TC_MIN..=TC_MAX).contains(tc)));
}
