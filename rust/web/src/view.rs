use jokerdraw_engine::betting::{Street, BET_INCREMENT, STREET_CAP};
use jokerdraw_engine::cards::{Card, Rank, Suit};
use jokerdraw_engine::game::{GameState, Phase};
use serde::{Deserialize, Serialize};

/// Client-safe card. The masked form carries no rank, no suit, and a false
/// joker flag, so a viewer learns nothing about a concealed card.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardView {
    pub rank: Option<Rank>,
    pub suit: Option<Suit>,
    pub is_joker: bool,
}

impl CardView {
    pub fn revealed(card: &Card) -> Self {
        Self {
            rank: card.rank(),
            suit: card.suit(),
            is_joker: card.is_joker(),
        }
    }

    pub fn hidden() -> Self {
        Self {
            rank: None,
            suit: None,
            is_joker: false,
        }
    }

    pub fn is_masked(&self) -> bool {
        self.rank.is_none() && self.suit.is_none() && !self.is_joker
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatView {
    pub seat: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub chips: u32,
    pub committed: u32,
    pub folded: bool,
    pub cards: Vec<CardView>,
    pub is_viewer: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BettingView {
    pub street: Street,
    pub current_bet: u32,
    pub to_act: usize,
    pub closed: bool,
    pub increment: u32,
    pub cap: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShowdownHandView {
    pub description: String,
    pub primary: Vec<Rank>,
    pub kickers: Vec<(Rank, Suit)>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShowdownView {
    pub winner: usize,
    pub pot: u32,
    pub hands: [ShowdownHandView; 2],
}

/// What the viewer's seat may do right now. Drives client-side controls;
/// the engine still re-validates every submitted action.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Capabilities {
    pub can_check: bool,
    pub can_bet: bool,
    pub can_call: bool,
    pub can_raise: bool,
    pub can_fold: bool,
    pub can_discard: bool,
    pub can_next_hand: bool,
}

/// Per-viewer projection of a match: the viewer's own hand in full, the
/// opponent's hand masked until a showdown has been computed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameView {
    pub match_id: String,
    pub hand_number: u32,
    pub phase: Phase,
    pub pot: u32,
    pub starting_seat: usize,
    pub viewer_seat: usize,
    pub seats: Vec<SeatView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub betting: Option<BettingView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draw_turn: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showdown: Option<ShowdownView>,
    pub capabilities: Capabilities,
    pub deck_remaining: usize,
}

/// Projects the authoritative state into what `viewer` is allowed to see.
pub fn project(game: &GameState, viewer: usize, names: &[Option<String>; 2]) -> GameView {
    let phase = game.phase();
    let reveal_all = game.showdown().is_some()
        && matches!(
            phase,
            Phase::Showdown | Phase::HandComplete | Phase::MatchComplete
        );

    let seats = game
        .players()
        .iter()
        .map(|p| {
            let seat = p.seat();
            let visible = seat == viewer || reveal_all;
            let cards = p
                .hand()
                .iter()
                .map(|c| {
                    if visible {
                        CardView::revealed(c)
                    } else {
                        CardView::hidden()
                    }
                })
                .collect();
            SeatView {
                seat,
                username: names[seat].clone(),
                chips: p.chips(),
                committed: p.committed(),
                folded: p.folded(),
                cards,
                is_viewer: seat == viewer,
            }
        })
        .collect();

    let betting = game.betting().map(|b| BettingView {
        street: b.street(),
        current_bet: b.current_bet(),
        to_act: b.to_act(),
        closed: b.is_closed(),
        increment: BET_INCREMENT,
        cap: STREET_CAP,
    });

    let showdown = game.showdown().map(|s| ShowdownView {
        winner: s.winner,
        pot: s.pot,
        hands: [
            ShowdownHandView {
                description: s.hands[0].describe(),
                primary: s.hands[0].primary.clone(),
                kickers: s.hands[0].kickers.clone(),
            },
            ShowdownHandView {
                description: s.hands[1].describe(),
                primary: s.hands[1].primary.clone(),
                kickers: s.hands[1].kickers.clone(),
            },
        ],
    });

    GameView {
        match_id: game.match_id().to_string(),
        hand_number: game.hand_number(),
        phase,
        pot: game.pot(),
        starting_seat: game.starting_seat(),
        viewer_seat: viewer,
        seats,
        betting,
        draw_turn: game.draw_turn(),
        showdown,
        capabilities: capabilities(game, viewer),
        deck_remaining: game.deck_remaining(),
    }
}

fn capabilities(game: &GameState, viewer: usize) -> Capabilities {
    let mut caps = Capabilities::default();
    match game.phase() {
        Phase::PreDrawBetting | Phase::PostDrawBetting => {
            if let Some(b) = game.betting() {
                if !b.is_closed() && b.to_act() == viewer {
                    caps.can_fold = true;
                    if b.current_bet() == 0 {
                        caps.can_check = true;
                        caps.can_bet = true;
                    } else {
                        caps.can_call = true;
                        caps.can_raise = b.current_bet() < STREET_CAP;
                    }
                }
            }
        }
        Phase::Draw => {
            caps.can_discard = game.draw_turn() == Some(viewer);
        }
        Phase::HandComplete => {
            caps.can_next_hand = true;
        }
        _ => {}
    }
    caps
}
