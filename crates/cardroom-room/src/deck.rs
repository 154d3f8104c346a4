//! The deck: 52 unique cards, drawn without replacement.

use cardroom_protocol::Card;
use rand::Rng;
use rand::seq::SliceRandom;

/// Returned by [`Deck::draw`] once every card has been drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("deck exhausted")]
pub struct DeckExhausted;

/// A shuffled pool of cards. Each room owns exactly one.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// A full 52-card deck shuffled with the thread-local RNG.
    pub fn shuffled() -> Self {
        Self::shuffled_with(&mut rand::rng())
    }

    /// A full 52-card deck shuffled with the given RNG.
    pub fn shuffled_with<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut cards: Vec<Card> = Card::all().collect();
        cards.shuffle(rng);
        Self { cards }
    }

    /// A deck holding exactly `cards`, drawn from the back.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    /// Removes and returns the top card.
    pub fn draw(&mut self) -> Result<Card, DeckExhausted> {
        self.cards.pop().ok_or(DeckExhausted)
    }

    /// Cards left to draw.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::shuffled()
    }
}
