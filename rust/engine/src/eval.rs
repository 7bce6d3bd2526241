use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cards::{all_ranks, all_suits, Card, Rank, Suit};

/// Hand categories for the 17-card deck, ascending. No straights or
/// flushes exist with four ranks.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    OnePair,
    TwoPair,
    ThreeOfAKind,
    FullHouse,
    FourOfAKind,
    FiveOfAKind,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Category::OnePair => "One Pair",
            Category::TwoPair => "Two Pair",
            Category::ThreeOfAKind => "Three of a Kind",
            Category::FullHouse => "Full House",
            Category::FourOfAKind => "Four of a Kind",
            Category::FiveOfAKind => "Five of a Kind",
        }
    }
}

/// Comparable hand strength. Field order is the comparison order:
/// category, then primary ranks, then kickers (rank, then suit). The suit
/// component makes the order total over distinct physical hands, so a
/// showdown never ties.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct HandStrength {
    pub category: Category,
    pub primary: Vec<Rank>,
    pub kickers: Vec<(Rank, Suit)>,
}

impl HandStrength {
    /// Human-readable showdown text, e.g. "Full House, Kings over Queens".
    pub fn describe(&self) -> String {
        match self.category {
            Category::FiveOfAKind
            | Category::FourOfAKind
            | Category::ThreeOfAKind
            | Category::OnePair => {
                format!("{}, {}", self.category.label(), self.primary[0].plural())
            }
            Category::FullHouse => format!(
                "{}, {} over {}",
                self.category.label(),
                self.primary[0].plural(),
                self.primary[1].plural()
            ),
            Category::TwoPair => format!(
                "{}, {} and {}",
                self.category.label(),
                self.primary[0].plural(),
                self.primary[1].plural()
            ),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("expected exactly 5 cards, got {count}")]
    WrongCardCount { count: usize },
    #[error("at most one joker may appear in a hand, got {count}")]
    TooManyJokers { count: usize },
}

/// Evaluates a 5-card hand with at most one joker.
///
/// A joker is resolved exhaustively: every one of the 16 possible stand-in
/// cards is tried and the strongest resulting hand wins. This guarantees
/// the joker always lands on the highest-category completion even when two
/// placements cost the same natural cards, and that a stand-in used as a
/// kicker materializes as the highest usable rank with the Spades suit.
pub fn evaluate(cards: &[Card]) -> Result<HandStrength, EvalError> {
    if cards.len() != 5 {
        return Err(EvalError::WrongCardCount { count: cards.len() });
    }
    let jokers = cards.iter().filter(|c| c.is_joker()).count();
    if jokers > 1 {
        return Err(EvalError::TooManyJokers { count: jokers });
    }

    let naturals: Vec<(Rank, Suit)> = cards
        .iter()
        .filter_map(|c| match c {
            Card::Standard(r, s) => Some((*r, *s)),
            Card::Joker => None,
        })
        .collect();

    if jokers == 0 {
        return Ok(natural_strength(&naturals));
    }

    let mut best: Option<HandStrength> = None;
    let mut trial = naturals.clone();
    for &r in &all_ranks() {
        for &s in &all_suits() {
            trial.push((r, s));
            let strength = natural_strength(&trial);
            trial.pop();
            if best.as_ref().map_or(true, |b| strength > *b) {
                best = Some(strength);
            }
        }
    }
    Ok(best.expect("stand-in loop always evaluates"))
}

/// Ranks a 5-card hand with no joker. With only four ranks in the deck,
/// five cards always repeat a rank, so One Pair is the guaranteed floor.
fn natural_strength(cards: &[(Rank, Suit)]) -> HandStrength {
    debug_assert_eq!(cards.len(), 5);

    // rank multiplicities, highest rank first
    let mut groups: Vec<(Rank, usize)> = Vec::with_capacity(4);
    for &r in all_ranks().iter().rev() {
        let n = cards.iter().filter(|&&(cr, _)| cr == r).count();
        if n > 0 {
            groups.push((r, n));
        }
    }

    if let Some(&(r, _)) = groups.iter().find(|&&(_, n)| n == 5) {
        return strength(Category::FiveOfAKind, vec![r], cards, &[r]);
    }
    if let Some(&(r, _)) = groups.iter().find(|&&(_, n)| n == 4) {
        return strength(Category::FourOfAKind, vec![r], cards, &[r]);
    }

    let trips = groups.iter().find(|&&(_, n)| n == 3).map(|&(r, _)| r);
    let pairs: Vec<Rank> = groups
        .iter()
        .filter(|&&(_, n)| n == 2)
        .map(|&(r, _)| r)
        .collect();

    if let Some(t) = trips {
        if let Some(&p) = pairs.first() {
            return strength(Category::FullHouse, vec![t, p], cards, &[t, p]);
        }
        return strength(Category::ThreeOfAKind, vec![t], cards, &[t]);
    }
    if pairs.len() >= 2 {
        return strength(
            Category::TwoPair,
            vec![pairs[0], pairs[1]],
            cards,
            &[pairs[0], pairs[1]],
        );
    }
    if let Some(&p) = pairs.first() {
        return strength(Category::OnePair, vec![p], cards, &[p]);
    }
    // five cards over four ranks cannot avoid a pair
    unreachable!("pigeonhole: 5 cards over 4 ranks always contain a pair")
}

/// Assembles a strength from the category, the combination ranks, and the
/// leftover cards as kickers sorted descending by rank then suit.
fn strength(
    category: Category,
    primary: Vec<Rank>,
    cards: &[(Rank, Suit)],
    used: &[Rank],
) -> HandStrength {
    let mut kickers: Vec<(Rank, Suit)> = cards
        .iter()
        .filter(|&&(r, _)| !used.contains(&r))
        .copied()
        .collect();
    kickers.sort_unstable_by(|a, b| b.cmp(a));
    HandStrength {
        category,
        primary,
        kickers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(r: Rank, s: Suit) -> Card {
        Card::Standard(r, s)
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(
            evaluate(&[Card::Joker]),
            Err(EvalError::WrongCardCount { count: 1 })
        );
        let two_jokers = [
            Card::Joker,
            Card::Joker,
            c(Rank::Ace, Suit::Spades),
            c(Rank::Ace, Suit::Hearts),
            c(Rank::King, Suit::Clubs),
        ];
        assert_eq!(
            evaluate(&two_jokers),
            Err(EvalError::TooManyJokers { count: 2 })
        );
    }

    #[test]
    fn joker_prefers_full_house_over_two_pair() {
        // two natural pairs plus the joker must become a full house, never
        // stay two pair
        let hand = [
            c(Rank::King, Suit::Spades),
            c(Rank::King, Suit::Hearts),
            c(Rank::Queen, Suit::Spades),
            c(Rank::Queen, Suit::Hearts),
            Card::Joker,
        ];
        let s = evaluate(&hand).unwrap();
        assert_eq!(s.category, Category::FullHouse);
        assert_eq!(s.primary, vec![Rank::King, Rank::Queen]);
    }

    #[test]
    fn describe_reads_naturally() {
        let hand = [
            c(Rank::Ace, Suit::Spades),
            c(Rank::Ace, Suit::Hearts),
            c(Rank::Jack, Suit::Spades),
            c(Rank::Jack, Suit::Clubs),
            c(Rank::Queen, Suit::Diamonds),
        ];
        let s = evaluate(&hand).unwrap();
        assert_eq!(s.describe(), "Two Pair, Aces and Jacks");
    }
}
