//! High-Low running count and true count.

use crate::cards::{Rank, MIN_REMAINING_DECKS};

/// High-Low tag: small cards +1, neutral 7-9, tens and aces -1.
pub fn hilo_tag(card: Rank) -> i32 {
    match card {
        Rank::Two | Rank::Three | Rank::Four | Rank::Five | Rank::Six => 1,
        Rank::Seven | Rank::Eight | Rank::Nine => 0,
        Rank::Ten | Rank::Jack | Rank::Queen | Rank::King | Rank::Ace => -1,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HiLoCounter {
    running_count: i32,
}

impl HiLoCounter {
    pub fn new() -> HiLoCounter {
        HiLoCounter { running_count: 0 }
    }

    /// Called on every reshuffle.
    pub fn reset(&mut self) {
        self.running_count = 0;
    }

    /// Must see every card that leaves the shoe, burned cards included.
    pub fn add_card(&mut self, card: Rank) {
        self.running_count += hilo_tag(card);
    }

    pub fn add_cards(&mut self, cards: &[Rank]) {
        for &card in cards {
            self.add_card(card);
        }
    }

    pub fn running_count(&self) -> i32 {
        self.running_count
    }

    /// Unrounded true count. The divisor is floored at half a deck.
    pub fn true_count(&self, remaining_decks: f64) -> f64 {
        let decks = if remaining_decks.is_finite() {
            remaining_decks.max(MIN_REMAINING_DECKS)
        } else {
            MIN_REMAINING_DECKS
        };
        self.running_count as f64 / decks
    }

    /// True count rounded to the nearest integer, ties away from zero. This
    /// is the value betting and recording use.
    pub fn true_count_rounded(&self, remaining_decks: f64) -> i32 {
        self.true_count(remaining_decks).round() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny_divisor_is_floored() {
        let mut c = HiLoCounter::new();
        c.add_cards(&[Rank::Two, Rank::Three]);
        assert_eq!(c.true_count(0.0), 4.0);
        assert_eq!(c.true_count(0.1), 4.0);
        assert_eq!(c.true_count(f64::NAN), 4.0);
    }

    #[test]
    fn rounding_ties_away_from_zero() {
        let mut c = HiLoCounter::new();
        c.add_cards(&[Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::Six]);
        // 5 / 2 = 2.5
        assert_eq!(c.true_count_rounded(2.0), 3);
        c.reset();
        c.add_cards(&[Rank::Ace, Rank::King, Rank::Queen, Rank::Jack, Rank::Ten]);
        assert_eq!(c.true_count_rounded(2.0), -3);
    }
}
