use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::cards::Rank;

/// Cards held by the player or the dealer. The value is recomputed on every
/// call since hitting changes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hand {
    cards: Vec<Rank>,
}

impl Hand {
    pub fn new() -> Hand {
        Hand { cards: Vec::new() }
    }

    pub fn from_cards(cards: &[Rank]) -> Hand {
        Hand {
            cards: cards.to_vec(),
        }
    }

    pub fn push(&mut self, card: Rank) {
        self.cards.push(card);
    }

    pub fn cards(&self) -> &[Rank] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn first(&self) -> Option<Rank> {
        self.cards.first().copied()
    }

    /// Best total: every ace starts at 11 and is demoted to 1 while the
    /// total is over 21.
    pub fn value(&self) -> u8 {
        let (total, _) = self.value_and_soft_aces();
        total
    }

    /// True when an ace is still counted as 11.
    pub fn is_soft(&self) -> bool {
        let (_, soft_aces) = self.value_and_soft_aces();
        soft_aces > 0
    }

    fn value_and_soft_aces(&self) -> (u8, u8) {
        let mut total: u32 = 0;
        let mut aces = 0u8;
        for &card in &self.cards {
            if card.is_ace() {
                aces += 1;
            }
            total += card.value() as u32;
        }
        while total > 21 && aces > 0 {
            total -= 10;
            aces -= 1;
        }
        (total.min(u8::MAX as u32) as u8, aces)
    }

    pub fn is_bust(&self) -> bool {
        self.value() > 21
    }

    /// Two-card 21. Whether it pays as a natural is decided by the caller
    /// (split hands never do).
    pub fn is_blackjack(&self) -> bool {
        self.cards.len() == 2 && self.value() == 21
    }

    /// The rank to split on when both cards have the same blackjack value
    /// (so `K,Q` is a ten-value pair). Returns the first card's rank.
    pub fn pair_rank(&self) -> Option<Rank> {
        match self.cards.as_slice() {
            [a, b] if a.value() == b.value() => Some(*a),
            _ => None,
        }
    }

    pub fn is_pair_of_aces(&self) -> bool {
        matches!(self.cards.as_slice(), [Rank::Ace, Rank::Ace])
    }

    /// Break a pair into two one-card hands.
    pub fn split(self) -> Option<(Hand, Hand)> {
        match self.cards.as_slice() {
            [a, b] if a.value() == b.value() => {
                Some((Hand::from_cards(&[*a]), Hand::from_cards(&[*b])))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.cards.iter().join(","))
    }
}
