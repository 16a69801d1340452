//! Monte Carlo driver: deals shoes, sizes bets from the count, plays rounds
//! and accumulates per-true-count statistics. Work is sharded across rayon
//! workers by whole shoes so each worker keeps count continuity within a
//! shoe; shards are merged by summing.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::betting::BetPolicy;
use crate::cards::{Shoe, CARDS_PER_DECK};
use crate::counting::HiLoCounter;
use crate::error::{EdgeError, EdgeResult};
use crate::job::CancelToken;
use crate::resolution::{play_round, sit_out};
use crate::rules::TableRules;
use crate::stats::{TailPolicy, TrueCountTable};

/// Below this many cards no new round is started.
pub const MIN_CARDS_TO_DEAL: usize = 10;

const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub deck_count: usize,
    /// Decks dealt before the reshuffle; 0 plays the whole shoe.
    pub penetration: f64,
    pub num_shoes: u64,
}

impl SimulationConfig {
    pub fn new(deck_count: usize, penetration: f64, num_shoes: u64) -> SimulationConfig {
        SimulationConfig {
            deck_count,
            penetration,
            num_shoes,
        }
    }

    pub fn validate(&self) -> EdgeResult<()> {
        if self.deck_count == 0 {
            return Err(EdgeError::InvalidConfig("deck count must be positive".to_string()));
        }
        if self.num_shoes == 0 {
            return Err(EdgeError::InvalidConfig("number of shoes must be positive".to_string()));
        }
        if !self.penetration.is_finite() || self.penetration < 0.0 {
            return Err(EdgeError::InvalidConfig(format!(
                "penetration must be a non-negative number of decks, got {}",
                self.penetration
            )));
        }
        if self.penetration > self.deck_count as f64 {
            return Err(EdgeError::InvalidConfig(format!(
                "penetration {} exceeds the {}-deck shoe",
                self.penetration, self.deck_count
            )));
        }
        Ok(())
    }

    pub fn total_cards(&self) -> usize {
        self.deck_count * CARDS_PER_DECK
    }

    /// Cards dealt from a shoe before it is replaced.
    pub fn cards_to_play(&self) -> usize {
        if self.penetration == 0.0 {
            self.total_cards()
        } else {
            ((self.penetration * CARDS_PER_DECK as f64) as usize).min(self.total_cards())
        }
    }

    /// `6decks-nopenetration`, `6decks-4.5penetration`, `2decks-1.0penetration`.
    pub fn name(&self) -> String {
        if self.penetration == 0.0 {
            format!("{}decks-nopenetration", self.deck_count)
        } else {
            format!("{}decks-{}penetration", self.deck_count, format_decks(self.penetration))
        }
    }

    pub fn penetration_description(&self) -> String {
        if self.penetration == 0.0 {
            "No penetration (all cards played)".to_string()
        } else {
            format!("{} deck penetration", format_decks(self.penetration))
        }
    }
}

fn format_decks(decks: f64) -> String {
    if decks.fract() == 0.0 {
        format!("{:.1}", decks)
    } else {
        format!("{}", decks)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationOptions {
    pub rules: TableRules,
    pub tail: TailPolicy,
    /// Parallel shards; 0 uses the rayon pool size.
    pub workers: usize,
    /// Base seed for reproducible runs. Each worker derives its own stream.
    pub seed: Option<u64>,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        SimulationOptions {
            rules: TableRules::default(),
            tail: TailPolicy::Clamp,
            workers: 0,
            seed: None,
        }
    }
}

impl SimulationOptions {
    fn worker_count(&self, num_shoes: u64) -> usize {
        let requested = if self.workers == 0 {
            rayon::current_num_threads()
        } else {
            self.workers
        };
        requested.clamp(1, num_shoes.clamp(1, usize::MAX as u64) as usize)
    }

    fn worker_seed(&self, worker: usize) -> u64 {
        match self.seed {
            Some(seed) => seed ^ (worker as u64).wrapping_mul(SEED_STRIDE),
            None => rand::random(),
        }
    }
}

/// Deal one shoe to its penetration limit, recording every wagered hand.
pub fn simulate_shoe<R: Rng + ?Sized>(
    config: &SimulationConfig,
    rules: &TableRules,
    policy: &dyn BetPolicy,
    tail: TailPolicy,
    rng: &mut R,
    table: &mut TrueCountTable,
) {
    let mut shoe = Shoe::new(config.deck_count, rng);
    let mut counter = HiLoCounter::new();
    let cards_to_play = config.cards_to_play();

    while shoe.len() >= MIN_CARDS_TO_DEAL && shoe.cards_dealt() < cards_to_play {
        let true_count = counter.true_count_rounded(shoe.remaining_decks());
        let bet = policy.bet_amount(true_count as f64);
        if bet <= 0.0 {
            sit_out(&mut shoe, &mut counter);
            continue;
        }
        let outcome = play_round(&mut shoe, &mut counter, rules, bet);
        if outcome.was_played() {
            table.record(true_count, outcome.profit, outcome.wagered, tail);
        }
    }
    table.shoes += 1;
}

/// One shard: `shoes` consecutive shoes on a private RNG stream.
pub fn run_shard(
    config: &SimulationConfig,
    shoes: u64,
    policy: &dyn BetPolicy,
    options: &SimulationOptions,
    seed: u64,
    cancel: &CancelToken,
) -> EdgeResult<TrueCountTable> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut table = TrueCountTable::new();
    for _ in 0..shoes {
        if cancel.is_cancelled() {
            return Err(EdgeError::Cancelled);
        }
        simulate_shoe(config, &options.rules, policy, options.tail, &mut rng, &mut table);
    }
    Ok(table)
}

fn shard_sizes(num_shoes: u64, workers: usize) -> Vec<u64> {
    let workers = workers.max(1) as u64;
    let base = num_shoes / workers;
    let extra = num_shoes % workers;
    (0..workers).map(|i| base + u64::from(i < extra)).collect()
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

fn run_guarded(
    worker: usize,
    config: &SimulationConfig,
    shoes: u64,
    policy: &dyn BetPolicy,
    options: &SimulationOptions,
    cancel: &CancelToken,
) -> EdgeResult<TrueCountTable> {
    let seed = options.worker_seed(worker);
    debug!(worker, shoes, seed, "starting shard");
    catch_unwind(AssertUnwindSafe(|| run_shard(config, shoes, policy, options, seed, cancel)))
        .map_err(|payload| EdgeError::WorkerFailed {
            worker,
            message: panic_message(payload),
        })?
}

/// Simulate one configuration. Any failing shard fails the whole
/// configuration; partial merges are never returned.
pub fn run_configuration(
    config: &SimulationConfig,
    policy: &dyn BetPolicy,
    options: &SimulationOptions,
    cancel: &CancelToken,
) -> EdgeResult<TrueCountTable> {
    config.validate()?;
    options.rules.validate()?;

    let workers = options.worker_count(config.num_shoes);
    let shards = shard_sizes(config.num_shoes, workers);
    info!(
        config = %config.name(),
        shoes = config.num_shoes,
        workers,
        "simulating configuration"
    );
    let start = Instant::now();

    let tables: Vec<TrueCountTable> = if workers == 1 {
        vec![run_guarded(0, config, shards[0], policy, options, cancel)?]
    } else {
        shards
            .par_iter()
            .enumerate()
            .map(|(worker, &shoes)| run_guarded(worker, config, shoes, policy, options, cancel))
            .collect::<EdgeResult<Vec<_>>>()
            .inspect_err(|e| warn!(config = %config.name(), error = %e, "configuration aborted"))?
    };

    let mut merged = TrueCountTable::new();
    for table in &tables {
        merged.merge(table);
    }
    info!(
        config = %config.name(),
        hands = merged.total_hands(),
        edge = merged.overall_edge(),
        elapsed_secs = start.elapsed().as_secs_f64(),
        "configuration complete"
    );
    Ok(merged)
}
