//! Basic strategy: pure decision function over the player's hand, the dealer
//! up-card and the actions currently legal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::Rank;
use crate::hand::Hand;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Hit,
    Stand,
    Double,
    Split,
    Surrender,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Hit => "hit",
            Action::Stand => "stand",
            Action::Double => "double",
            Action::Split => "split",
            Action::Surrender => "surrender",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Legal actions for the current decision point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Allowed {
    pub double: bool,
    /// Already accounts for table rules such as aces splitting.
    pub split: bool,
    pub surrender: bool,
}

impl Allowed {
    pub fn all() -> Allowed {
        Allowed {
            double: true,
            split: true,
            surrender: true,
        }
    }

    /// Table permissions narrowed to what `hand` can actually do: doubling
    /// and surrender need exactly two cards, splitting needs a pair.
    pub fn for_hand(
        hand: &Hand,
        can_double: bool,
        can_split: bool,
        can_surrender: bool,
    ) -> Allowed {
        let two_cards = hand.len() == 2;
        Allowed {
            double: can_double && two_cards,
            split: can_split && hand.pair_rank().is_some(),
            surrender: can_surrender && two_cards,
        }
    }
}

/// Basic strategy decision. Evaluation order: surrender, pairs, soft totals,
/// hard totals. Never returns an action that `allowed` forbids.
pub fn decide(hand: &Hand, dealer_up: Rank, allowed: Allowed) -> Action {
    let total = hand.value();
    let dealer = dealer_up.value();

    if allowed.surrender && hand.len() == 2 {
        if let Some(action) = surrender_decision(total, dealer) {
            return action;
        }
    }

    if allowed.split {
        if let Some(pair) = hand.pair_rank() {
            return pair_decision(pair, dealer, allowed.double);
        }
    }

    if hand.is_soft() {
        return soft_decision(total, dealer, allowed.double);
    }

    hard_decision(total, dealer, allowed.double)
}

/// Convenience form taking the three flags separately.
pub fn decide_with(
    hand: &Hand,
    dealer_up: Rank,
    can_double: bool,
    can_split: bool,
    can_surrender: bool,
) -> Action {
    decide(
        hand,
        dealer_up,
        Allowed {
            double: can_double,
            split: can_split,
            surrender: can_surrender,
        },
    )
}

fn surrender_decision(total: u8, dealer: u8) -> Option<Action> {
    match (total, dealer) {
        (16, 9 | 10 | 11) => Some(Action::Surrender),
        (15, 10) => Some(Action::Surrender),
        _ => None,
    }
}

fn pair_decision(pair: Rank, dealer: u8, can_double: bool) -> Action {
    match pair {
        Rank::Ace | Rank::Eight => Action::Split,
        Rank::Two | Rank::Three | Rank::Seven => {
            if (2..=7).contains(&dealer) {
                Action::Split
            } else {
                Action::Hit
            }
        }
        Rank::Four => Action::Hit,
        // Played as hard 10.
        Rank::Five => {
            if can_double && dealer <= 9 {
                Action::Double
            } else {
                Action::Hit
            }
        }
        Rank::Six => {
            if (2..=6).contains(&dealer) {
                Action::Split
            } else {
                Action::Hit
            }
        }
        Rank::Nine => {
            if matches!(dealer, 7 | 10 | 11) {
                Action::Stand
            } else {
                Action::Split
            }
        }
        Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => Action::Stand,
    }
}

/// `total` includes the ace as 11, so soft 13 is A,2 and soft 18 is A,7.
fn soft_decision(total: u8, dealer: u8, can_double: bool) -> Action {
    match total {
        0..=14 => double_or_hit(can_double && matches!(dealer, 5 | 6)),
        15 | 16 => double_or_hit(can_double && matches!(dealer, 4..=6)),
        17 => double_or_hit(can_double && matches!(dealer, 3..=6)),
        18 => {
            if can_double && matches!(dealer, 3..=6) {
                Action::Double
            } else if matches!(dealer, 2 | 7 | 8) {
                Action::Stand
            } else {
                Action::Hit
            }
        }
        _ => Action::Stand,
    }
}

fn hard_decision(total: u8, dealer: u8, can_double: bool) -> Action {
    match total {
        0..=8 => Action::Hit,
        9 => double_or_hit(can_double && matches!(dealer, 3..=6)),
        10 => double_or_hit(can_double && dealer <= 9),
        11 => double_or_hit(can_double),
        12 => {
            if matches!(dealer, 4..=6) {
                Action::Stand
            } else {
                Action::Hit
            }
        }
        13..=16 => {
            if dealer <= 6 {
                Action::Stand
            } else {
                Action::Hit
            }
        }
        _ => Action::Stand,
    }
}

fn double_or_hit(double: bool) -> Action {
    if double {
        Action::Double
    } else {
        Action::Hit
    }
}
