use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card};
use crate::errors::GameError;

/// A shuffleable 52-card sequence that deals from the top. The RNG is
/// seeded explicitly so a hand can be replayed from its seed alone. Burn
/// cards are not modeled.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
    position: usize,
    rng: ChaCha20Rng,
}

impl Deck {
    pub fn new_with_seed(seed: u64) -> Self {
        Self {
            cards: full_deck(),
            position: 0,
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Restores the full 52 cards and shuffles them, resetting the deal
    /// position to the top.
    pub fn shuffle(&mut self) {
        self.cards = full_deck();
        self.cards.shuffle(&mut self.rng);
        self.position = 0;
    }

    pub fn deal(&mut self, count: usize) -> Result<Vec<Card>, GameError> {
        if count > self.remaining() {
            return Err(GameError::DeckExhausted {
                needed: count,
                remaining: self.remaining(),
            });
        }
        let dealt = self.cards[self.position..self.position + count].to_vec();
        self.position += count;
        Ok(dealt)
    }

    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.position)
    }
}
