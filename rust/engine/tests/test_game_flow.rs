use jokerdraw_engine::errors::GameError;
use jokerdraw_engine::game::{GameState, Phase};
use jokerdraw_engine::player::Action;

fn fresh_game() -> GameState {
    let mut game = GameState::new("test-match", Some(7));
    game.start_hand().expect("first hand");
    game
}

#[test]
fn antes_are_posted_before_the_first_street() {
    // Scenario A
    let game = fresh_game();
    assert_eq!(game.pot(), 10);
    assert_eq!(game.players()[0].chips(), 95);
    assert_eq!(game.players()[1].chips(), 95);
    assert_eq!(game.phase(), Phase::PreDrawBetting);
    assert_eq!(game.starting_seat(), 0);
    assert_eq!(game.betting().unwrap().to_act(), 0);
    assert!(game.players().iter().all(|p| p.hand().len() == 5));
    assert_eq!(game.deck_remaining(), 7);
}

#[test]
fn bet_and_call_sweep_into_the_pot_and_open_the_draw() {
    // Scenario B
    let mut game = fresh_game();
    game.apply(0, &Action::Bet { amount: 5 }).unwrap();
    game.apply(1, &Action::Call).unwrap();
    assert_eq!(game.pot(), 20);
    assert_eq!(game.players()[0].committed(), 0);
    assert_eq!(game.players()[1].committed(), 0);
    assert_eq!(game.phase(), Phase::Draw);
    assert_eq!(game.draw_turn(), Some(0));
}

#[test]
fn both_seats_discard_in_order_and_refill_to_five() {
    // Scenario C
    let mut game = fresh_game();
    game.apply(0, &Action::Check).unwrap();
    game.apply(1, &Action::Check).unwrap();
    assert_eq!(game.phase(), Phase::Draw);

    game.apply(
        0,
        &Action::Discard {
            card_indices: vec![0, 2],
        },
    )
    .unwrap();
    assert_eq!(game.draw_turn(), Some(1));
    game.apply(
        1,
        &Action::Discard {
            card_indices: vec![1, 3, 4],
        },
    )
    .unwrap();

    assert!(game.players().iter().all(|p| p.hand().len() == 5));
    assert_eq!(game.phase(), Phase::PostDrawBetting);
    assert_eq!(game.draw_turn(), None);
    assert_eq!(game.betting().unwrap().to_act(), 0);
}

#[test]
fn non_starting_seat_cannot_discard_first() {
    let mut game = fresh_game();
    game.apply(0, &Action::Check).unwrap();
    game.apply(1, &Action::Check).unwrap();

    let err = game
        .apply(
            1,
            &Action::Discard {
                card_indices: vec![0],
            },
        )
        .unwrap_err();
    assert_eq!(err, GameError::DiscardOutOfTurn { seat: 1 });
    // rejection leaves the draw untouched
    assert_eq!(game.draw_turn(), Some(0));
    assert_eq!(game.players()[1].hand().len(), 5);
}

#[test]
fn second_discard_is_capped_by_the_deck() {
    let mut game = fresh_game();
    game.apply(0, &Action::Check).unwrap();
    game.apply(1, &Action::Check).unwrap();

    // seat 0 takes five of the seven remaining cards
    game.apply(
        0,
        &Action::Discard {
            card_indices: vec![0, 1, 2, 3, 4],
        },
    )
    .unwrap();
    assert_eq!(game.deck_remaining(), 2);

    let err = game
        .apply(
            1,
            &Action::Discard {
                card_indices: vec![0, 1, 2],
            },
        )
        .unwrap_err();
    assert_eq!(
        err,
        GameError::OverDiscard {
            requested: 3,
            remaining: 2
        }
    );

    game.apply(
        1,
        &Action::Discard {
            card_indices: vec![0, 1],
        },
    )
    .unwrap();
    assert!(game.players().iter().all(|p| p.hand().len() == 5));
    assert_eq!(game.phase(), Phase::PostDrawBetting);
}

#[test]
fn post_draw_fold_awards_the_pot_without_showdown() {
    // Scenario E
    let mut game = fresh_game();
    game.apply(0, &Action::Bet { amount: 5 }).unwrap();
    game.apply(1, &Action::Call).unwrap();
    game.apply(0, &Action::Discard { card_indices: vec![] })
        .unwrap();
    game.apply(1, &Action::Discard { card_indices: vec![] })
        .unwrap();
    game.apply(0, &Action::Bet { amount: 10 }).unwrap();
    game.apply(1, &Action::Fold).unwrap();

    assert_eq!(game.phase(), Phase::HandComplete);
    assert!(game.showdown().is_none());
    // seat 0 recovers its own wagers plus seat 1's ante and call
    assert_eq!(game.players()[0].chips(), 110);
    assert_eq!(game.players()[1].chips(), 90);
    assert_eq!(game.pot(), 0);
}

#[test]
fn checked_down_hand_reaches_showdown_and_awards_the_pot() {
    let mut game = fresh_game();
    game.apply(0, &Action::Check).unwrap();
    game.apply(1, &Action::Check).unwrap();
    game.apply(0, &Action::Discard { card_indices: vec![] })
        .unwrap();
    game.apply(1, &Action::Discard { card_indices: vec![] })
        .unwrap();
    game.apply(0, &Action::Check).unwrap();
    game.apply(1, &Action::Check).unwrap();

    assert_eq!(game.phase(), Phase::HandComplete);
    let showdown = game.showdown().expect("showdown result");
    assert_eq!(showdown.pot, 10);
    let winner = showdown.winner;
    assert_eq!(game.players()[winner].chips(), 105);
    assert_eq!(game.players()[1 - winner].chips(), 95);
}

#[test]
fn stale_and_misdirected_actions_are_rejected_without_mutation() {
    let mut game = fresh_game();

    // wrong actor
    let err = game.apply(1, &Action::Check).unwrap_err();
    assert_eq!(
        err,
        GameError::NotPlayersTurn {
            expected: 0,
            actual: 1
        }
    );

    // wrong phase: no draw is open yet
    let err = game
        .apply(
            0,
            &Action::Discard {
                card_indices: vec![0],
            },
        )
        .unwrap_err();
    assert_eq!(
        err,
        GameError::WrongPhase {
            phase: Phase::PreDrawBetting
        }
    );

    // double-submit after the street closed lands in the draw phase
    game.apply(0, &Action::Bet { amount: 5 }).unwrap();
    game.apply(1, &Action::Call).unwrap();
    let err = game.apply(1, &Action::Call).unwrap_err();
    assert_eq!(err, GameError::WrongPhase { phase: Phase::Draw });

    assert_eq!(game.pot(), 20);
    assert_eq!(game.players()[0].chips(), 90);
    assert_eq!(game.players()[1].chips(), 90);
}

#[test]
fn next_hand_alternates_the_starting_seat() {
    let mut game = fresh_game();
    game.apply(0, &Action::Bet { amount: 5 }).unwrap();
    game.apply(1, &Action::Fold).unwrap();
    assert_eq!(game.phase(), Phase::HandComplete);

    game.apply(1, &Action::NextHand).unwrap();
    assert_eq!(game.hand_number(), 2);
    assert_eq!(game.starting_seat(), 1);
    assert_eq!(game.phase(), Phase::PreDrawBetting);
    assert_eq!(game.betting().unwrap().to_act(), 1);
}

#[test]
fn action_log_narrates_the_hand() {
    let mut game = fresh_game();
    game.apply(0, &Action::Bet { amount: 5 }).unwrap();
    game.apply(1, &Action::Fold).unwrap();

    let actions: Vec<&str> = game
        .log()
        .for_hand(1)
        .map(|e| e.action.as_str())
        .collect();
    assert!(actions.contains(&"hand_started"));
    assert!(actions.contains(&"antes_posted"));
    assert!(actions.contains(&"bet"));
    assert!(actions.contains(&"fold"));
    assert!(actions.contains(&"hand_won"));

    let bet = game.log().entries().iter().find(|e| e.action == "bet").unwrap();
    assert_eq!(bet.seat, Some(0));
    assert_eq!(bet.description, "seat 0 bet 5");
}
