use crate::cards::Card;
use crate::errors::GameError;
use serde::{Deserialize, Serialize};

/// Chips each seat starts the match with.
pub const STARTING_CHIPS: u32 = 100;

/// A player action submitted against a room. `amount` on a raise is the new
/// street total, not the delta.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Check,
    Bet { amount: u32 },
    Call,
    Raise { amount: u32 },
    Fold,
    Discard { card_indices: Vec<usize> },
    NextHand,
}

impl Action {
    /// Short name used in log entries.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Check => "check",
            Action::Bet { .. } => "bet",
            Action::Call => "call",
            Action::Raise { .. } => "raise",
            Action::Fold => "fold",
            Action::Discard { .. } => "discard",
            Action::NextHand => "next_hand",
        }
    }
}

/// One seat's state: chip stack, hand, per-street commitment, fold flag.
/// Chips plus committed is conserved except when committed chips are swept
/// into the shared pot.
#[derive(Debug, Clone)]
pub struct PlayerState {
    seat: usize,
    hand: Vec<Card>,
    chips: u32,
    committed: u32,
    folded: bool,
}

impl PlayerState {
    pub fn new(seat: usize, chips: u32) -> Self {
        Self {
            seat,
            hand: Vec::with_capacity(5),
            chips,
            committed: 0,
            folded: false,
        }
    }

    pub fn seat(&self) -> usize {
        self.seat
    }
    pub fn hand(&self) -> &[Card] {
        &self.hand
    }
    pub fn chips(&self) -> u32 {
        self.chips
    }
    pub fn committed(&self) -> u32 {
        self.committed
    }
    pub fn folded(&self) -> bool {
        self.folded
    }

    /// Moves up to `amount` chips into this street's commitment, capping at
    /// the available stack (all-in). Returns the amount actually committed.
    pub fn commit(&mut self, amount: u32) -> u32 {
        let actual = amount.min(self.chips);
        self.chips -= actual;
        self.committed += actual;
        actual
    }

    /// Drains the street commitment (for sweeping into the pot).
    pub fn take_committed(&mut self) -> u32 {
        std::mem::take(&mut self.committed)
    }

    pub fn award(&mut self, amount: u32) {
        self.chips = self.chips.saturating_add(amount);
    }

    pub fn fold(&mut self) {
        self.folded = true;
    }

    pub fn give_card(&mut self, card: Card) {
        debug_assert!(self.hand.len() < 5);
        self.hand.push(card);
    }

    /// Clears hand and per-hand flags at the start of a new hand. Chips are
    /// untouched.
    pub fn reset_for_hand(&mut self) {
        self.hand.clear();
        self.committed = 0;
        self.folded = false;
    }

    /// Removes the cards at `indices` from the hand and returns them.
    /// Indices must be unique and in range; nothing is removed on failure.
    pub fn remove_cards(&mut self, indices: &[usize]) -> Result<Vec<Card>, GameError> {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        for pair in sorted.windows(2) {
            if pair[0] == pair[1] {
                return Err(GameError::InvalidDiscardIndex { index: pair[0] });
            }
        }
        if let Some(&bad) = sorted.iter().find(|&&i| i >= self.hand.len()) {
            return Err(GameError::InvalidDiscardIndex { index: bad });
        }
        let mut removed = Vec::with_capacity(sorted.len());
        for &i in sorted.iter().rev() {
            removed.push(self.hand.remove(i));
        }
        removed.reverse();
        Ok(removed)
    }
}
