use jokerdraw_engine::cards::{full_deck, Card, Rank, Suit};
use jokerdraw_engine::eval::{evaluate, Category};

fn c(r: Rank, s: Suit) -> Card {
    Card::Standard(r, s)
}

#[test]
fn four_aces_and_joker_make_five_aces() {
    let hand = [
        c(Rank::Ace, Suit::Spades),
        c(Rank::Ace, Suit::Hearts),
        c(Rank::Ace, Suit::Diamonds),
        c(Rank::Ace, Suit::Clubs),
        Card::Joker,
    ];
    let s = evaluate(&hand).unwrap();
    assert_eq!(s.category, Category::FiveOfAKind);
    assert_eq!(s.primary, vec![Rank::Ace]);
    assert!(s.kickers.is_empty());
}

#[test]
fn three_kings_joker_and_ace_make_four_kings_ace_kicker() {
    let hand = [
        c(Rank::King, Suit::Spades),
        c(Rank::King, Suit::Hearts),
        c(Rank::King, Suit::Diamonds),
        Card::Joker,
        c(Rank::Ace, Suit::Spades),
    ];
    let s = evaluate(&hand).unwrap();
    assert_eq!(s.category, Category::FourOfAKind);
    assert_eq!(s.primary, vec![Rank::King]);
    assert_eq!(s.kickers, vec![(Rank::Ace, Suit::Spades)]);
}

#[test]
fn joker_turns_a_pair_into_trips_not_two_pair() {
    let hand = [
        c(Rank::Ace, Suit::Spades),
        c(Rank::Ace, Suit::Hearts),
        c(Rank::King, Suit::Clubs),
        c(Rank::Queen, Suit::Diamonds),
        Card::Joker,
    ];
    let s = evaluate(&hand).unwrap();
    assert_eq!(s.category, Category::ThreeOfAKind);
    assert_eq!(s.primary, vec![Rank::Ace]);
}

#[test]
fn joker_turns_two_pair_into_the_higher_full_house() {
    let hand = [
        c(Rank::Queen, Suit::Spades),
        c(Rank::Queen, Suit::Hearts),
        c(Rank::King, Suit::Clubs),
        c(Rank::King, Suit::Diamonds),
        Card::Joker,
    ];
    let s = evaluate(&hand).unwrap();
    assert_eq!(s.category, Category::FullHouse);
    // the joker lands on the kings, never the queens
    assert_eq!(s.primary, vec![Rank::King, Rank::Queen]);
}

#[test]
fn joker_completes_quads_into_five_of_a_kind() {
    let hand = [
        c(Rank::Jack, Suit::Spades),
        c(Rank::Jack, Suit::Hearts),
        c(Rank::Jack, Suit::Diamonds),
        c(Rank::Jack, Suit::Clubs),
        Card::Joker,
    ];
    let s = evaluate(&hand).unwrap();
    assert_eq!(s.category, Category::FiveOfAKind);
    assert_eq!(s.primary, vec![Rank::Jack]);
}

#[test]
fn categories_rank_in_spec_order() {
    let one_pair = evaluate(&[
        c(Rank::Ace, Suit::Spades),
        c(Rank::Ace, Suit::Hearts),
        c(Rank::King, Suit::Clubs),
        c(Rank::Queen, Suit::Diamonds),
        c(Rank::Jack, Suit::Spades),
    ])
    .unwrap();
    let two_pair = evaluate(&[
        c(Rank::Jack, Suit::Spades),
        c(Rank::Jack, Suit::Hearts),
        c(Rank::Queen, Suit::Clubs),
        c(Rank::Queen, Suit::Diamonds),
        c(Rank::King, Suit::Spades),
    ])
    .unwrap();
    let trips = evaluate(&[
        c(Rank::Jack, Suit::Spades),
        c(Rank::Jack, Suit::Hearts),
        c(Rank::Jack, Suit::Clubs),
        c(Rank::Queen, Suit::Diamonds),
        c(Rank::King, Suit::Spades),
    ])
    .unwrap();
    let full_house = evaluate(&[
        c(Rank::Jack, Suit::Spades),
        c(Rank::Jack, Suit::Hearts),
        c(Rank::Jack, Suit::Clubs),
        c(Rank::Queen, Suit::Diamonds),
        c(Rank::Queen, Suit::Spades),
    ])
    .unwrap();
    let quads = evaluate(&[
        c(Rank::Jack, Suit::Spades),
        c(Rank::Jack, Suit::Hearts),
        c(Rank::Jack, Suit::Clubs),
        c(Rank::Jack, Suit::Diamonds),
        c(Rank::Queen, Suit::Spades),
    ])
    .unwrap();
    let five = evaluate(&[
        c(Rank::Jack, Suit::Spades),
        c(Rank::Jack, Suit::Hearts),
        c(Rank::Jack, Suit::Clubs),
        c(Rank::Jack, Suit::Diamonds),
        Card::Joker,
    ])
    .unwrap();

    // a pair of aces still loses to the lowest two pair, and so on up
    assert!(one_pair < two_pair);
    assert!(two_pair < trips);
    assert!(trips < full_house);
    assert!(full_house < quads);
    assert!(quads < five);
}

#[test]
fn suit_breaks_otherwise_equal_kickers() {
    let spades = evaluate(&[
        c(Rank::Ace, Suit::Spades),
        c(Rank::Ace, Suit::Hearts),
        c(Rank::King, Suit::Spades),
        c(Rank::Queen, Suit::Spades),
        c(Rank::Jack, Suit::Spades),
    ])
    .unwrap();
    let hearts = evaluate(&[
        c(Rank::Ace, Suit::Diamonds),
        c(Rank::Ace, Suit::Clubs),
        c(Rank::King, Suit::Hearts),
        c(Rank::Queen, Suit::Hearts),
        c(Rank::Jack, Suit::Hearts),
    ])
    .unwrap();
    assert_eq!(spades.category, hearts.category);
    assert_eq!(spades.primary, hearts.primary);
    assert!(spades > hearts);
}

#[test]
fn evaluation_is_total_and_deterministic_over_the_whole_deck() {
    // every 5-card subset of the 17-card deck (6188 hands, at most one
    // joker each) evaluates without panicking, twice, to the same strength
    let deck = full_deck();
    let n = deck.len();
    let mut evaluated = 0usize;
    for a in 0..n {
        for b in a + 1..n {
            for d in b + 1..n {
                for e in d + 1..n {
                    for f in e + 1..n {
                        let hand = [deck[a], deck[b], deck[d], deck[e], deck[f]];
                        let first = evaluate(&hand).expect("total");
                        let second = evaluate(&hand).expect("deterministic");
                        assert_eq!(first, second);
                        assert!(first.category >= Category::OnePair);
                        assert!(!first.describe().is_empty());
                        evaluated += 1;
                    }
                }
            }
        }
    }
    assert_eq!(evaluated, 6188);
}
