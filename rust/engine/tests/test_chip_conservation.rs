//! Seeded random-walk properties: whatever legal actions are thrown at
//! the engine, chips are conserved, streets only move forward, and the
//! board always matches the street.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use felt_engine::betting::{Action, ActionKind, SeatId};
use felt_engine::engine::Engine;
use felt_engine::state::Street;

fn seats(ids: &[&str]) -> Vec<SeatId> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn random_legal_action(engine: &Engine, rng: &mut StdRng) -> Action {
    let legal = engine.betting.legal_actions();
    assert!(!legal.is_empty(), "an acting seat always has a legal move");
    let kind = legal[rng.random_range(0..legal.len())];
    match kind {
        ActionKind::Raise => {
            let seat = engine.betting.current_player.clone().unwrap();
            let min = engine.betting.min_raise_to();
            let max = engine.betting.max_raise_to(&seat);
            let amount = if max < min {
                max
            } else {
                rng.random_range(min..=max)
            };
            Action::raise_to(amount)
        }
        ActionKind::Check => Action::check(),
        ActionKind::Call => Action::call(),
        ActionKind::Fold => Action::fold(),
    }
}

fn assert_invariants(engine: &Engine, initial_total: u64) {
    let stacks: u64 = engine.betting.stacks.values().map(|&c| c as u64).sum();
    assert_eq!(
        stacks + engine.betting.pot as u64,
        initial_total,
        "chip conservation"
    );
    assert_eq!(
        engine.board.len(),
        engine.street.board_len(),
        "board matches street"
    );
    if let Some(seat) = &engine.betting.current_player {
        assert!(engine.betting.pending_players.contains(seat));
        assert!(!engine.betting.folded_players.contains(seat));
        assert!(!engine.betting.all_in_players.contains(seat));
    }
    assert!(engine.betting.last_raise_size >= engine.betting.big_blind);
}

fn run_walk(player_ids: &[&str], walk_seed: u64, hands: u32) {
    let mut engine = Engine::new(seats(player_ids));
    let mut rng = StdRng::seed_from_u64(walk_seed);

    engine.new_hand(Some(walk_seed), false).unwrap();
    let initial_total: u64 = engine
        .starting_stacks()
        .values()
        .map(|&c| c as u64)
        .sum();

    for hand in 0..hands {
        let mut last_street = Street::Preflop;
        let mut guard = 0;
        while !engine.betting.hand_over {
            guard += 1;
            assert!(guard < 500, "hand failed to terminate");

            if engine.betting.current_player.is_none() {
                assert!(engine.advance_without_actor().unwrap());
            } else {
                let action = random_legal_action(&engine, &mut rng);
                let seat = engine.betting.current_player.clone().unwrap();
                engine.step(&action, &seat).unwrap();
            }

            assert!(engine.street >= last_street, "street monotonicity");
            last_street = engine.street;
            assert_invariants(&engine, initial_total);
        }

        assert_eq!(engine.betting.pot, 0, "pot cleared at hand end");
        assert_eq!(engine.street, Street::Showdown);

        let funded = engine
            .betting
            .stacks
            .values()
            .filter(|&&chips| chips > 0)
            .count();
        if funded < 2 {
            break;
        }
        engine
            .start_next_hand(Some(walk_seed.wrapping_add(hand as u64 + 1)))
            .unwrap();
        assert_invariants(&engine, initial_total);
    }
}

#[test]
fn heads_up_walk_conserves_chips() {
    run_walk(&["p1", "p2"], 1001, 40);
}

#[test]
fn three_handed_walk_conserves_chips() {
    run_walk(&["p1", "p2", "p3"], 2002, 40);
}

#[test]
fn five_handed_walk_conserves_chips() {
    run_walk(&["p1", "p2", "p3", "p4", "p5"], 3003, 40);
}

#[test]
fn fold_prefix_always_terminates_with_full_pot() {
    // Any prefix that folds down to one seat ends the hand and awards
    // the whole pot to the survivor.
    let mut engine = Engine::new(seats(&["p1", "p2", "p3", "p4"]));
    engine.new_hand(Some(404), false).unwrap();
    let total_before: u64 = engine
        .starting_stacks()
        .values()
        .map(|&c| c as u64)
        .sum();

    // Preflop order with the button on p1: p4 opens, then p1, p2, p3.
    for id in ["p4", "p1"] {
        engine.step(&Action::fold(), &id.to_string()).unwrap();
    }
    assert!(!engine.betting.hand_over);
    // Small blind folds too, leaving only the big blind.
    engine.step(&Action::fold(), &"p2".to_string()).unwrap();

    assert!(engine.betting.hand_over);
    assert_eq!(engine.betting.winners, seats(&["p3"]));
    assert_eq!(engine.betting.pot, 0);
    let total_after: u64 = engine.betting.stacks.values().map(|&c| c as u64).sum();
    assert_eq!(total_after, total_before);
    // The big blind keeps its own post and collects the small blind.
    assert_eq!(engine.betting.stack(&"p3".to_string()), 1005);
}
