use std::cell::Cell;

use isolation_engine::{Board, Engine, GameState, Heuristic, Move, Player, TimeoutGuard};

mod common;

fn generous_clock() -> f64 {
    1_000_000.0
}

/// Reference value function, written straight from the definition: max over
/// children on maximizing turns, min on minimizing turns, heuristic at the
/// leaves.
fn brute_value(state: &Board, depth: u32, maximizing: bool, player: Player) -> f64 {
    let moves = state.legal_moves(state.active_player());
    if moves.is_empty() || depth == 0 {
        return Heuristic::MobilityRatio.score(state, player);
    }
    let children = moves
        .into_iter()
        .map(|mv| brute_value(&state.forecast(mv), depth - 1, !maximizing, player));
    if maximizing {
        children.fold(f64::NEG_INFINITY, f64::max)
    } else {
        children.fold(f64::INFINITY, f64::min)
    }
}

#[test]
fn timeout_guard_trips_below_threshold() {
    let clock = || 5.0;
    assert!(TimeoutGuard::new(&clock).check().is_err());
    assert!(TimeoutGuard::with_threshold(&clock, 1.0).check().is_ok());
}

#[test]
fn minimax_matches_brute_force_at_depth_two() {
    let board = common::midgame_5x5();
    let engine = Engine::new(Heuristic::MobilityRatio);
    let guard = TimeoutGuard::new(&generous_clock);

    // first move in generation order with the strictly greatest child value
    let root = board.active_player();
    let mut expected: Option<(Move, f64)> = None;
    for mv in board.legal_moves(root) {
        let value = brute_value(&board.forecast(mv), 1, false, root);
        match expected {
            Some((_, best)) if value <= best => {}
            _ => expected = Some((mv, value)),
        }
    }

    let chosen = engine.minimax(&board, 2, &guard).unwrap();
    assert_eq!(chosen, expected.map(|(mv, _)| mv));
}

#[test]
fn alphabeta_chooses_the_same_move_as_minimax() {
    let board = common::midgame_5x5();
    let guard = TimeoutGuard::new(&generous_clock);
    for heuristic in [
        Heuristic::MobilityRatio,
        Heuristic::CenterDistance,
        Heuristic::CenterDistanceSquared,
    ] {
        let engine = Engine::new(heuristic);
        for depth in 1..=4 {
            assert_eq!(
                engine.alphabeta(&board, depth, &guard).unwrap(),
                engine.minimax(&board, depth, &guard).unwrap(),
                "divergence at depth {depth} with {heuristic:?}"
            );
        }
    }
}

#[test]
fn terminal_root_returns_no_move() {
    let board = common::finished_3x3();
    let engine = Engine::new(Heuristic::MobilityRatio);
    let guard = TimeoutGuard::new(&generous_clock);
    assert_eq!(engine.minimax(&board, 3, &guard), Ok(None));
    assert_eq!(engine.alphabeta(&board, 3, &guard), Ok(None));
}

#[test]
fn terminal_root_skips_the_search_entirely() {
    let board = common::finished_3x3();
    let engine = Engine::new(Heuristic::MobilityRatio);
    let clock = || -> f64 { panic!("clock consulted for a terminal root") };
    assert_eq!(engine.best_move(&board, &clock), None);
}

#[test]
fn deadline_during_depth_three_keeps_the_depth_two_result() {
    let board = common::midgame_5x5();
    let engine = Engine::new(Heuristic::MobilityRatio);

    let guard = TimeoutGuard::new(&generous_clock);
    let expected = engine.alphabeta(&board, 2, &guard).unwrap();
    assert!(expected.is_some());

    // the search is deterministic, so counting guard consultations for the
    // first two depths tells us exactly when depth three begins
    let count_checks = |depth: u32| {
        let calls = Cell::new(0_u32);
        let clock = || {
            calls.set(calls.get() + 1);
            generous_clock()
        };
        let guard = TimeoutGuard::new(&clock);
        engine.alphabeta(&board, depth, &guard).unwrap();
        calls.get()
    };
    let budget = count_checks(1) + count_checks(2);

    let calls = Cell::new(0_u32);
    let clock = || {
        calls.set(calls.get() + 1);
        if calls.get() <= budget {
            generous_clock()
        } else {
            0.0
        }
    };
    assert_eq!(engine.best_move(&board, &clock), expected);
}

#[test]
fn repeated_searches_are_deterministic() {
    let board = common::midgame_5x5();
    let engine = Engine::new(Heuristic::CenterDistance);
    let run = || {
        let remaining = Cell::new(50.0);
        let clock = || {
            let t = remaining.get();
            remaining.set(t - 0.01);
            t
        };
        engine.best_move(&board, &clock)
    };
    let first = run();
    assert!(first.is_some());
    assert_eq!(first, run());
}
