use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::betting::{BettingState, Street, StreetOutcome};
use crate::deck::Deck;
use crate::errors::GameError;
use crate::eval::{evaluate, HandStrength};
use crate::log::ActionLog;
use crate::player::{Action, PlayerState, STARTING_CHIPS};

/// Forced contribution from each seat before a hand is dealt.
pub const ANTE: u32 = 5;
/// A match runs at most this many hands.
pub const MAX_HANDS: u32 = 10;
/// Cards per hand outside the draw interlude.
pub const HAND_SIZE: usize = 5;

/// Lifecycle phases of a hand within a match.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    NewHand,
    PreDrawBetting,
    Draw,
    PostDrawBetting,
    Showdown,
    HandComplete,
    MatchComplete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::NewHand => "new hand",
            Phase::PreDrawBetting => "pre-draw betting",
            Phase::Draw => "draw",
            Phase::PostDrawBetting => "post-draw betting",
            Phase::Showdown => "showdown",
            Phase::HandComplete => "hand complete",
            Phase::MatchComplete => "match complete",
        };
        write!(f, "{s}")
    }
}

/// Outcome of a showdown. Absent when a hand ends on a fold.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ShowdownResult {
    pub winner: usize,
    pub hands: [HandStrength; 2],
    pub pot: u32,
}

/// Final outcome of a match. Equal chip counts are an explicit draw, never
/// silently credited to a seat.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchOutcome {
    Winner { seat: usize },
    Draw,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub outcome: MatchOutcome,
    pub chips: [u32; 2],
    pub pot: u32,
    pub hands_played: u32,
    pub finished_at: DateTime<Utc>,
}

/// Authoritative per-match state machine: antes, dealing, the two betting
/// streets, the draw interlude, showdown, and hand/match progression.
///
/// Every mutating entry point validates all preconditions before touching
/// any state; a rejected action leaves the game exactly as it was.
#[derive(Debug)]
pub struct GameState {
    match_id: String,
    hand_number: u32,
    players: [PlayerState; 2],
    pot: u32,
    starting_seat: usize,
    phase: Phase,
    deck: Deck,
    betting: Option<BettingState>,
    // who has discarded this hand, indexed by seat
    discarded: [bool; 2],
    log: ActionLog,
    showdown: Option<ShowdownResult>,
    result: Option<MatchResult>,
}

impl GameState {
    pub fn new(match_id: impl Into<String>, seed: Option<u64>) -> Self {
        let deck = match seed {
            Some(seed) => Deck::with_seed(seed),
            None => Deck::new(),
        };
        Self {
            match_id: match_id.into(),
            hand_number: 0,
            players: [
                PlayerState::new(0, STARTING_CHIPS),
                PlayerState::new(1, STARTING_CHIPS),
            ],
            pot: 0,
            starting_seat: 0,
            phase: Phase::NewHand,
            deck,
            betting: None,
            discarded: [false, false],
            log: ActionLog::new(),
            showdown: None,
            result: None,
        }
    }

    pub fn match_id(&self) -> &str {
        &self.match_id
    }
    pub fn hand_number(&self) -> u32 {
        self.hand_number
    }
    pub fn players(&self) -> &[PlayerState; 2] {
        &self.players
    }
    pub fn pot(&self) -> u32 {
        self.pot
    }
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn starting_seat(&self) -> usize {
        self.starting_seat
    }
    pub fn betting(&self) -> Option<&BettingState> {
        self.betting.as_ref()
    }
    pub fn showdown(&self) -> Option<&ShowdownResult> {
        self.showdown.as_ref()
    }
    pub fn result(&self) -> Option<&MatchResult> {
        self.result.as_ref()
    }
    pub fn log(&self) -> &ActionLog {
        &self.log
    }
    pub fn deck_remaining(&self) -> usize {
        self.deck.remaining()
    }

    /// The seat due to discard during the draw interlude: starting seat
    /// first, then the other; `None` outside the draw phase or once both
    /// have discarded.
    pub fn draw_turn(&self) -> Option<usize> {
        if self.phase != Phase::Draw {
            return None;
        }
        let first = self.starting_seat;
        if !self.discarded[first] {
            Some(first)
        } else if !self.discarded[1 - first] {
            Some(1 - first)
        } else {
            None
        }
    }

    /// Starts the next hand. Valid from `NewHand` (match start) and
    /// `HandComplete` (the explicit or timer-driven next-hand trigger,
    /// which alternates the starting seat).
    pub fn start_hand(&mut self) -> Result<(), GameError> {
        match self.phase {
            Phase::NewHand => {}
            Phase::HandComplete => self.starting_seat = 1 - self.starting_seat,
            Phase::MatchComplete => return Err(GameError::MatchOver),
            _ => return Err(GameError::WrongPhase { phase: self.phase }),
        }

        // A seat that cannot pay the ante and keep a positive stack loses
        // immediately by chip count; no cards are dealt.
        if self.players.iter().any(|p| p.chips() <= ANTE) {
            self.log.record(
                self.hand_number + 1,
                None,
                "ante_short",
                "a seat cannot cover the ante; match ends by chip count",
            );
            self.finish_match();
            return Ok(());
        }

        self.hand_number += 1;
        for p in &mut self.players {
            p.reset_for_hand();
        }
        self.showdown = None;
        self.discarded = [false, false];

        self.log.record(
            self.hand_number,
            None,
            "hand_started",
            format!(
                "hand {} started; seat {} acts first",
                self.hand_number, self.starting_seat
            ),
        );

        let mut antes = 0;
        for p in &mut self.players {
            p.commit(ANTE);
            antes += p.take_committed();
        }
        self.pot += antes;
        self.log.record(
            self.hand_number,
            None,
            "antes_posted",
            format!("both seats ante {ANTE}; pot is {}", self.pot),
        );

        self.deck.shuffle();
        // deal alternately starting with the hand's starting seat
        for _ in 0..HAND_SIZE {
            for offset in 0..2 {
                let seat = (self.starting_seat + offset) % 2;
                let card = self.deck.draw_one()?;
                self.players[seat].give_card(card);
            }
        }
        self.log.record(
            self.hand_number,
            None,
            "cards_dealt",
            format!("{HAND_SIZE} cards dealt to each seat"),
        );

        self.betting = Some(BettingState::open(Street::PreDraw, self.starting_seat));
        self.phase = Phase::PreDrawBetting;
        Ok(())
    }

    /// Applies a validated player action for `seat`. The single entry point
    /// for all client-driven mutation after match start.
    pub fn apply(&mut self, seat: usize, action: &Action) -> Result<(), GameError> {
        debug_assert!(seat < 2);
        match (self.phase, action) {
            (Phase::MatchComplete, _) => Err(GameError::MatchOver),
            (Phase::PreDrawBetting | Phase::PostDrawBetting, _) => {
                self.apply_betting(seat, action)
            }
            (Phase::Draw, Action::Discard { card_indices }) => self.discard(seat, card_indices),
            (Phase::HandComplete, Action::NextHand) => self.start_hand(),
            _ => Err(GameError::WrongPhase { phase: self.phase }),
        }
    }

    fn apply_betting(&mut self, seat: usize, action: &Action) -> Result<(), GameError> {
        let betting = self
            .betting
            .as_mut()
            .ok_or(GameError::WrongPhase { phase: self.phase })?;

        let chips_before = self.players[seat].chips();
        let outcome = match action {
            Action::Check => betting.check(seat)?,
            Action::Bet { amount } => betting.bet(&mut self.players, seat, *amount)?,
            Action::Call => betting.call(&mut self.players, seat)?,
            Action::Raise { amount } => betting.raise(&mut self.players, seat, *amount)?,
            Action::Fold => betting.fold(&mut self.players, seat)?,
            _ => return Err(GameError::WrongPhase { phase: self.phase }),
        };
        let spent = chips_before - self.players[seat].chips();

        let description = match action {
            Action::Check => format!("seat {seat} checked"),
            Action::Bet { .. } => format!("seat {seat} bet {spent}"),
            Action::Call => format!("seat {seat} called {spent}"),
            Action::Raise { .. } => format!(
                "seat {seat} raised to {}",
                self.players[seat].committed()
            ),
            Action::Fold => format!("seat {seat} folded"),
            _ => unreachable!(),
        };
        self.log
            .record(self.hand_number, Some(seat), action.name(), description);

        if outcome == StreetOutcome::Closed {
            self.close_street();
        }
        Ok(())
    }

    /// Sweeps street commitments into the pot and advances the phase: a
    /// fold awards the pot at once, a closed pre-draw street opens the
    /// draw, a closed post-draw street goes to showdown.
    fn close_street(&mut self) {
        let betting = self.betting.take().expect("closing an open street");
        let swept: u32 = self.players.iter_mut().map(|p| p.take_committed()).sum();
        self.pot += swept;

        if let Some(folder) = self.players.iter().position(|p| p.folded()) {
            let winner = 1 - folder;
            let amount = std::mem::take(&mut self.pot);
            self.players[winner].award(amount);
            self.log.record(
                self.hand_number,
                None,
                "hand_won",
                format!("seat {winner} wins {amount} chips; seat {folder} folded"),
            );
            self.end_hand();
        } else if betting.street() == Street::PreDraw {
            self.phase = Phase::Draw;
            self.log.record(
                self.hand_number,
                None,
                "draw_opened",
                format!("draw phase begins; seat {} discards first", self.starting_seat),
            );
        } else {
            self.resolve_showdown();
        }
    }

    fn resolve_showdown(&mut self) {
        self.phase = Phase::Showdown;
        let h0 = evaluate(self.players[0].hand()).expect("hands are complete at showdown");
        let h1 = evaluate(self.players[1].hand()).expect("hands are complete at showdown");
        // the strength order is total over distinct hands, so no ties
        let winner = if h0 > h1 { 0 } else { 1 };
        let amount = std::mem::take(&mut self.pot);
        self.players[winner].award(amount);

        self.log.record(
            self.hand_number,
            None,
            "showdown",
            format!("seat 0 shows {}", h0.describe()),
        );
        self.log.record(
            self.hand_number,
            None,
            "showdown",
            format!("seat 1 shows {}", h1.describe()),
        );
        self.log.record(
            self.hand_number,
            None,
            "hand_won",
            format!("seat {winner} wins {amount} chips at showdown"),
        );

        self.showdown = Some(ShowdownResult {
            winner,
            hands: [h0, h1],
            pot: amount,
        });
        self.end_hand();
    }

    fn end_hand(&mut self) {
        if self.hand_number >= MAX_HANDS || self.players.iter().any(|p| p.chips() == 0) {
            self.finish_match();
        } else {
            self.phase = Phase::HandComplete;
        }
    }

    fn finish_match(&mut self) {
        let chips = [self.players[0].chips(), self.players[1].chips()];
        let outcome = match chips[0].cmp(&chips[1]) {
            Ordering::Greater => MatchOutcome::Winner { seat: 0 },
            Ordering::Less => MatchOutcome::Winner { seat: 1 },
            Ordering::Equal => MatchOutcome::Draw,
        };
        let description = match outcome {
            MatchOutcome::Winner { seat } => format!(
                "seat {seat} wins the match with {} chips after {} hands",
                chips[seat], self.hand_number
            ),
            MatchOutcome::Draw => {
                format!("the match ends in a draw after {} hands", self.hand_number)
            }
        };
        self.log
            .record(self.hand_number, None, "match_ended", description);
        self.result = Some(MatchResult {
            outcome,
            chips,
            pot: self.pot,
            hands_played: self.hand_number,
            finished_at: Utc::now(),
        });
        self.phase = Phase::MatchComplete;
    }

    /// Draw-interlude discard: starting seat first, once per seat, capped
    /// by the cards remaining in the deck. Replacements restore the hand to
    /// exactly five cards.
    fn discard(&mut self, seat: usize, indices: &[usize]) -> Result<(), GameError> {
        if self.discarded[seat] {
            return Err(GameError::AlreadyDiscarded { seat });
        }
        if seat != self.starting_seat && !self.discarded[self.starting_seat] {
            return Err(GameError::DiscardOutOfTurn { seat });
        }
        let remaining = self.deck.remaining();
        if indices.len() > remaining {
            return Err(GameError::OverDiscard {
                requested: indices.len(),
                remaining,
            });
        }

        let removed = self.players[seat].remove_cards(indices)?;
        let drawn = self.deck.draw(removed.len())?;
        for card in drawn {
            self.players[seat].give_card(card);
        }
        self.discarded[seat] = true;
        self.log.record(
            self.hand_number,
            Some(seat),
            "discard",
            format!("seat {seat} discarded {} card(s)", removed.len()),
        );

        if self.discarded.iter().all(|&d| d) {
            self.betting = Some(BettingState::open(Street::PostDraw, self.starting_seat));
            self.phase = Phase::PostDrawBetting;
            self.log.record(
                self.hand_number,
                None,
                "street_opened",
                "post-draw betting begins",
            );
        }
        Ok(())
    }
}
