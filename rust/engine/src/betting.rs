use serde::{Deserialize, Serialize};

use crate::errors::GameError;
use crate::player::PlayerState;

/// Canonical bet/raise step in the fixed-limit structure.
pub const BET_INCREMENT: u32 = 5;
/// Maximum total wagered per seat on one street: one bet plus up to five
/// raises (5, 10, 15, 20, 25, 30).
pub const STREET_CAP: u32 = 30;

/// The two betting streets of a hand.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Street {
    PreDraw,
    PostDraw,
}

/// Whether a street remains open after an accepted action.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StreetOutcome {
    Continue,
    Closed,
}

/// Fixed-limit betting machine for a single street. Exactly one betting
/// round: a street closes on a call, a fold, or two consecutive checks with
/// zero commitment, and once closed accepts nothing further.
#[derive(Debug, Clone)]
pub struct BettingState {
    street: Street,
    current_bet: u32,
    to_act: usize,
    closed: bool,
    last_raise: u32,
    opener: usize,
}

impl BettingState {
    pub fn open(street: Street, opener: usize) -> Self {
        Self {
            street,
            current_bet: 0,
            to_act: opener,
            closed: false,
            last_raise: 0,
            opener,
        }
    }

    pub fn street(&self) -> Street {
        self.street
    }
    pub fn current_bet(&self) -> u32 {
        self.current_bet
    }
    pub fn to_act(&self) -> usize {
        self.to_act
    }
    pub fn is_closed(&self) -> bool {
        self.closed
    }
    pub fn last_raise(&self) -> u32 {
        self.last_raise
    }
    pub fn opener(&self) -> usize {
        self.opener
    }

    fn ensure_turn(&self, seat: usize) -> Result<(), GameError> {
        if self.closed {
            return Err(GameError::StreetClosed);
        }
        if seat != self.to_act {
            return Err(GameError::NotPlayersTurn {
                expected: self.to_act,
                actual: seat,
            });
        }
        Ok(())
    }

    /// Check: legal only with no live bet. The opener's check passes the
    /// action; a second check with both commitments at zero closes the
    /// street.
    pub fn check(&mut self, seat: usize) -> Result<StreetOutcome, GameError> {
        self.ensure_turn(seat)?;
        if self.current_bet > 0 {
            return Err(GameError::CheckFacingBet {
                current_bet: self.current_bet,
            });
        }
        if seat == self.opener {
            self.to_act = 1 - seat;
            Ok(StreetOutcome::Continue)
        } else {
            self.closed = true;
            Ok(StreetOutcome::Closed)
        }
    }

    /// Bet: opens the wagering on a street with no live bet. The amount is
    /// capped to the available stack (all-in).
    pub fn bet(
        &mut self,
        players: &mut [PlayerState; 2],
        seat: usize,
        amount: u32,
    ) -> Result<StreetOutcome, GameError> {
        self.ensure_turn(seat)?;
        if self.current_bet > 0 {
            return Err(GameError::BetAlreadyMade {
                current_bet: self.current_bet,
            });
        }
        if amount == 0 || amount > STREET_CAP {
            return Err(GameError::InvalidBetAmount {
                amount,
                min: 1,
                max: STREET_CAP,
            });
        }
        let actual = players[seat].commit(amount);
        self.current_bet = actual;
        self.last_raise = actual;
        self.to_act = 1 - seat;
        Ok(StreetOutcome::Continue)
    }

    /// Call: matches the live bet (capped to the stack) and closes the
    /// street.
    pub fn call(
        &mut self,
        players: &mut [PlayerState; 2],
        seat: usize,
    ) -> Result<StreetOutcome, GameError> {
        self.ensure_turn(seat)?;
        if self.current_bet == 0 {
            return Err(GameError::NothingToCall);
        }
        let owed = self.current_bet.saturating_sub(players[seat].committed());
        players[seat].commit(owed);
        self.closed = true;
        Ok(StreetOutcome::Closed)
    }

    /// Raise to a new street total. Legal only against a live bet, with the
    /// total above the current bet and within the cap. Commits the delta,
    /// capped to the stack (all-in).
    pub fn raise(
        &mut self,
        players: &mut [PlayerState; 2],
        seat: usize,
        total: u32,
    ) -> Result<StreetOutcome, GameError> {
        self.ensure_turn(seat)?;
        if self.current_bet == 0 {
            return Err(GameError::NothingToCall);
        }
        if total <= self.current_bet || total > STREET_CAP {
            return Err(GameError::InvalidRaiseAmount {
                amount: total,
                current_bet: self.current_bet,
                cap: STREET_CAP,
            });
        }
        let owed = total.saturating_sub(players[seat].committed());
        players[seat].commit(owed);
        let effective = players[seat].committed();
        if effective > self.current_bet {
            self.last_raise = effective - self.current_bet;
            self.current_bet = effective;
        }
        self.to_act = 1 - seat;
        Ok(StreetOutcome::Continue)
    }

    /// Fold: closes the street and marks the seat folded.
    pub fn fold(
        &mut self,
        players: &mut [PlayerState; 2],
        seat: usize,
    ) -> Result<StreetOutcome, GameError> {
        self.ensure_turn(seat)?;
        players[seat].fold();
        self.closed = true;
        Ok(StreetOutcome::Closed)
    }
}
