//! # jokerdraw-engine: rule engine for two-player joker draw poker
//!
//! A fixed-limit draw poker engine for a 17-card deck: four each of
//! Ace/King/Queen/Jack plus one wild Joker. Provides the deck, the betting
//! state machine, joker-aware hand evaluation with deterministic
//! tie-breaking, and the per-match game state machine with an append-only
//! action log.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card, rank, and suit value types; 17-card deck construction
//! - [`deck`] - ChaCha20-shuffled deck with sequential draw-without-replacement
//! - [`betting`] - Fixed-limit betting machine for one street
//! - [`eval`] - Joker-aware 5-card hand evaluation and total strength order
//! - [`game`] - Hand/match state machine: antes, dealing, draw, showdown
//! - [`player`] - Seat state, chip accounting, player actions
//! - [`log`] - Append-only action log and JSONL transcript writer
//! - [`errors`] - Validation error types
//!
//! ## Quick Start
//!
//! ```rust
//! use jokerdraw_engine::game::GameState;
//! use jokerdraw_engine::player::Action;
//!
//! let mut game = GameState::new("demo", Some(42));
//! game.start_hand().expect("first hand");
//!
//! // seat 0 starts the first hand; both check the pre-draw street
//! game.apply(0, &Action::Check).expect("opener checks");
//! game.apply(1, &Action::Check).expect("mutual check closes the street");
//! ```
//!
//! All mutation goes through validated entry points returning `Result`;
//! a rejected action leaves the state untouched.

pub mod betting;
pub mod cards;
pub mod deck;
pub mod errors;
pub mod eval;
pub mod game;
pub mod log;
pub mod player;
