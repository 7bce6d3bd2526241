use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents one of the four suits in the 17-card draw deck.
/// Suit order (ascending) breaks ties during hand comparison: Spades high.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suit {
    /// Clubs suit (♣)
    Clubs,
    /// Diamonds suit (♦)
    Diamonds,
    /// Hearts suit (♥)
    Hearts,
    /// Spades suit (♠)
    Spades,
}

/// Represents the rank of a card in the stripped deck, Jack through Ace.
/// Ace is high.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    /// Jack
    Jack,
    /// Queen
    Queen,
    /// King
    King,
    /// Ace (high)
    Ace,
}

impl Rank {
    /// Plural display form used in hand descriptions ("One Pair, Kings").
    pub fn plural(self) -> &'static str {
        match self {
            Rank::Jack => "Jacks",
            Rank::Queen => "Queens",
            Rank::King => "Kings",
            Rank::Ace => "Aces",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Ace => "A",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Suit::Clubs => "c",
            Suit::Diamonds => "d",
            Suit::Hearts => "h",
            Suit::Spades => "s",
        };
        write!(f, "{s}")
    }
}

/// A single card: a standard rank/suit pair, or the lone wild Joker.
/// Immutable value type; equality is by (rank, suit, joker-ness).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Card {
    Standard(Rank, Suit),
    Joker,
}

impl Card {
    pub fn rank(&self) -> Option<Rank> {
        match self {
            Card::Standard(r, _) => Some(*r),
            Card::Joker => None,
        }
    }

    pub fn suit(&self) -> Option<Suit> {
        match self {
            Card::Standard(_, s) => Some(*s),
            Card::Joker => None,
        }
    }

    pub fn is_joker(&self) -> bool {
        matches!(self, Card::Joker)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Card::Standard(r, s) => write!(f, "{r}{s}"),
            Card::Joker => write!(f, "Joker"),
        }
    }
}

pub fn all_suits() -> [Suit; 4] {
    [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades]
}

pub fn all_ranks() -> [Rank; 4] {
    [Rank::Jack, Rank::Queen, Rank::King, Rank::Ace]
}

/// Builds the full 17-card deck: four of each rank plus one Joker.
pub fn full_deck() -> Vec<Card> {
    let mut v = Vec::with_capacity(17);
    for &r in &all_ranks() {
        for &s in &all_suits() {
            v.push(Card::Standard(r, s));
        }
    }
    v.push(Card::Joker);
    v
}
