use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::cards::{full_deck, Card};
use crate::errors::GameError;

/// The 17-card draw deck: a shuffled order plus a cursor. Cards are dealt
/// without replacement; the same physical card is never yielded twice
/// within one shuffle epoch.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
    cursor: usize,
    rng: ChaCha20Rng,
}

impl Deck {
    /// Deck seeded from OS entropy. Call [`Deck::shuffle`] before dealing.
    pub fn new() -> Self {
        Self::from_rng(ChaCha20Rng::from_os_rng())
    }

    /// Deterministic deck for tests and replays.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(ChaCha20Rng::seed_from_u64(seed))
    }

    fn from_rng(rng: ChaCha20Rng) -> Self {
        // Keep initial order until shuffle is called explicitly
        Self {
            cards: full_deck(),
            cursor: 0,
            rng,
        }
    }

    /// Fisher-Yates shuffle over a fresh 17-card deck; resets the cursor.
    pub fn shuffle(&mut self) {
        self.cards = full_deck();
        self.cards.shuffle(&mut self.rng);
        self.cursor = 0;
    }

    /// Draws the next `n` cards. Fails without consuming anything if fewer
    /// than `n` remain.
    pub fn draw(&mut self, n: usize) -> Result<Vec<Card>, GameError> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(GameError::InsufficientCards {
                requested: n,
                remaining,
            });
        }
        let drawn = self.cards[self.cursor..self.cursor + n].to_vec();
        self.cursor += n;
        Ok(drawn)
    }

    pub fn draw_one(&mut self) -> Result<Card, GameError> {
        let mut cards = self.draw(1)?;
        Ok(cards.pop().expect("draw(1) yields one card"))
    }

    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.cursor)
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_past_end_fails_without_consuming() {
        let mut deck = Deck::with_seed(7);
        deck.shuffle();
        deck.draw(15).expect("15 of 17");
        assert_eq!(deck.remaining(), 2);
        let err = deck.draw(3).unwrap_err();
        assert_eq!(
            err,
            GameError::InsufficientCards {
                requested: 3,
                remaining: 2
            }
        );
        // the failed draw consumed nothing
        assert_eq!(deck.remaining(), 2);
        deck.draw(2).expect("exact remainder");
        assert_eq!(deck.remaining(), 0);
    }

    #[test]
    fn same_seed_same_order() {
        let mut a = Deck::with_seed(42);
        let mut b = Deck::with_seed(42);
        a.shuffle();
        b.shuffle();
        assert_eq!(a.draw(17).unwrap(), b.draw(17).unwrap());
    }

    #[test]
    fn shuffle_resets_epoch() {
        let mut deck = Deck::with_seed(3);
        deck.shuffle();
        deck.draw(10).unwrap();
        deck.shuffle();
        assert_eq!(deck.remaining(), 17);
    }
}
