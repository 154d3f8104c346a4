//! Playing cards.
//!
//! A card is an immutable `(rank, suit)` pair. Ranks run 1 (ace) to 13
//! (king); there are four suits, so exactly 52 distinct cards exist.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// The four suits.
///
/// `#[serde(rename_all = "lowercase")]` puts `"hearts"` on the wire, which is
/// what clients render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
}

impl Suit {
    /// Every suit, in a fixed order.
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hearts => write!(f, "hearts"),
            Self::Diamonds => write!(f, "diamonds"),
            Self::Clubs => write!(f, "clubs"),
            Self::Spades => write!(f, "spades"),
        }
    }
}

/// A single playing card.
///
/// Fields are private and deserialization goes through [`Card::new`], so a
/// `Card` with rank 0 or 14 cannot exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCard")]
pub struct Card {
    suit: Suit,
    #[serde(rename = "value")]
    rank: u8,
}

impl Card {
    /// Valid ranks: 1 (ace) through 13 (king).
    pub const RANKS: RangeInclusive<u8> = 1..=13;

    /// Number of distinct cards.
    pub const COUNT: usize = 52;

    /// Builds a card, or `None` if `rank` is outside [`Card::RANKS`].
    pub fn new(rank: u8, suit: Suit) -> Option<Self> {
        Self::RANKS.contains(&rank).then_some(Self { suit, rank })
    }

    /// Iterates over all 52 cards, rank-major.
    pub fn all() -> impl Iterator<Item = Card> {
        Self::RANKS.flat_map(|rank| Suit::ALL.into_iter().map(move |suit| Card { suit, rank }))
    }

    pub fn rank(&self) -> u8 {
        self.rank
    }

    pub fn suit(&self) -> Suit {
        self.suit
    }
}

/// Unchecked wire form of a [`Card`].
#[derive(Deserialize)]
struct RawCard {
    suit: Suit,
    value: u8,
}

impl TryFrom<RawCard> for Card {
    type Error = String;

    fn try_from(raw: RawCard) -> Result<Self, Self::Error> {
        Card::new(raw.value, raw.suit)
            .ok_or_else(|| format!("card value {} outside 1..=13", raw.value))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}", self.rank, self.suit)
    }
}
