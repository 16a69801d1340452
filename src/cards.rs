use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{EdgeError, EdgeResult};

pub const CARDS_PER_DECK: usize = 52;

/// Floor for the deck divisor so the true count never blows up near the end
/// of a shoe.
pub const MIN_REMAINING_DECKS: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    /// Blackjack value with aces counted high. Soft demotion happens in
    /// [`crate::hand::Hand::value`].
    pub fn value(self) -> u8 {
        match self {
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
            Rank::Ace => 11,
        }
    }

    pub fn is_ace(self) -> bool {
        self == Rank::Ace
    }

    pub fn is_ten_value(self) -> bool {
        matches!(self, Rank::Ten | Rank::Jack | Rank::Queen | Rank::King)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Rank {
    type Err = EdgeError;

    fn from_str(s: &str) -> EdgeResult<Rank> {
        match s.trim().to_ascii_uppercase().as_str() {
            "2" => Ok(Rank::Two),
            "3" => Ok(Rank::Three),
            "4" => Ok(Rank::Four),
            "5" => Ok(Rank::Five),
            "6" => Ok(Rank::Six),
            "7" => Ok(Rank::Seven),
            "8" => Ok(Rank::Eight),
            "9" => Ok(Rank::Nine),
            "10" | "T" => Ok(Rank::Ten),
            "J" => Ok(Rank::Jack),
            "Q" => Ok(Rank::Queen),
            "K" => Ok(Rank::King),
            "A" | "1" | "11" => Ok(Rank::Ace),
            _ => Err(EdgeError::InvalidRank(s.to_string())),
        }
    }
}

pub const ALL_RANKS: [Rank; 13] = [
    Rank::Two,
    Rank::Three,
    Rank::Four,
    Rank::Five,
    Rank::Six,
    Rank::Seven,
    Rank::Eight,
    Rank::Nine,
    Rank::Ten,
    Rank::Jack,
    Rank::Queen,
    Rank::King,
    Rank::Ace,
];

/// Parse a list of ranks like `"A,K"`, `"8 8"` or `"10,6"`.
///
/// Without separators each character is one rank (`"AK"`, `"T6"`), so a ten
/// must be written as `T` in that form.
pub fn parse_ranks(notation: &str) -> EdgeResult<Vec<Rank>> {
    let notation = notation.trim();
    if notation.is_empty() {
        return Err(EdgeError::InvalidRank(notation.to_string()));
    }
    if notation.contains(|c: char| c == ',' || c.is_whitespace()) {
        return notation
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(Rank::from_str)
            .collect();
    }
    notation
        .chars()
        .map(|c| Rank::from_str(&c.to_string()))
        .collect()
}

/// Multi-deck shoe. Cards are dealt from the back of the vector; the order
/// is already random so the end we draw from does not matter.
#[derive(Debug, Clone)]
pub struct Shoe {
    cards: Vec<Rank>,
    deck_count: usize,
}

impl Shoe {
    pub fn new<R: Rng + ?Sized>(deck_count: usize, rng: &mut R) -> Shoe {
        let mut cards: Vec<Rank> = (0..deck_count)
            .flat_map(|_| ALL_RANKS.iter().flat_map(|&r| std::iter::repeat(r).take(4)))
            .collect();
        cards.shuffle(rng);
        Shoe { cards, deck_count }
    }

    /// A shoe that deals `cards` in the given order, first element first.
    pub fn stacked(cards: &[Rank]) -> Shoe {
        let deck_count = cards.len().div_ceil(CARDS_PER_DECK).max(1);
        let cards = cards.iter().rev().copied().collect();
        Shoe { cards, deck_count }
    }

    pub fn draw(&mut self) -> Option<Rank> {
        self.cards.pop()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn deck_count(&self) -> usize {
        self.deck_count
    }

    pub fn total_cards(&self) -> usize {
        self.deck_count * CARDS_PER_DECK
    }

    pub fn cards_dealt(&self) -> usize {
        self.total_cards().saturating_sub(self.cards.len())
    }

    pub fn remaining_decks(&self) -> f64 {
        remaining_decks(self.cards.len())
    }
}

pub fn remaining_decks(remaining_cards: usize) -> f64 {
    (remaining_cards as f64 / CARDS_PER_DECK as f64).max(MIN_REMAINING_DECKS)
}
