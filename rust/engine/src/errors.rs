use crate::game::Phase;
use thiserror::Error;

/// Rejection reasons for game actions. Every variant is a validation
/// failure: the action is refused and no state is mutated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("it's not seat {actual}'s turn (expected seat {expected})")]
    NotPlayersTurn { expected: usize, actual: usize },
    #[error("action is not valid in the {phase} phase")]
    WrongPhase { phase: Phase },
    #[error("betting street is closed")]
    StreetClosed,
    #[error("cannot check while facing a bet of {current_bet}")]
    CheckFacingBet { current_bet: u32 },
    #[error("no bet to call")]
    NothingToCall,
    #[error("there is already a bet of {current_bet}; raise instead")]
    BetAlreadyMade { current_bet: u32 },
    #[error("invalid bet amount {amount}: must be between {min} and {max}")]
    InvalidBetAmount { amount: u32, min: u32, max: u32 },
    #[error("invalid raise to {amount}: must exceed {current_bet} and not exceed {cap}")]
    InvalidRaiseAmount {
        amount: u32,
        current_bet: u32,
        cap: u32,
    },
    #[error("cannot draw {requested} cards: only {remaining} remaining in the deck")]
    InsufficientCards { requested: usize, remaining: usize },
    #[error("cannot discard {requested} cards: only {remaining} remaining in the deck")]
    OverDiscard { requested: usize, remaining: usize },
    #[error("invalid discard: card index {index} is out of range or repeated")]
    InvalidDiscardIndex { index: usize },
    #[error("seat {seat} has already discarded this hand")]
    AlreadyDiscarded { seat: usize },
    #[error("seat {seat} must wait for the starting player to discard first")]
    DiscardOutOfTurn { seat: usize },
    #[error("the match is already complete")]
    MatchOver,
}
