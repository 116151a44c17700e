use log::debug;
use thiserror::Error;

use crate::eval::{Heuristic, Score};
use crate::state::{GameState, Move, Player};

/// Remaining time (ms) below which an in-flight search is aborted. Leaves
/// headroom for the call stack to unwind before the turn clock hits zero.
pub const TIMER_THRESHOLD_MS: f64 = 10.0;

/// Cancellation signal raised by [`TimeoutGuard`]; propagates through every
/// active search frame and is handled once, in [`Engine::best_move`].
#[derive(Debug, Error, PartialEq, Eq)]
#[error("search aborted: turn time budget exhausted")]
pub struct SearchTimeout;

/// Cooperative deadline check. Borrows the caller's clock (milliseconds
/// remaining in the current turn) for the duration of one search; the engine
/// never owns or resets the clock.
pub struct TimeoutGuard<'a> {
    time_left: &'a dyn Fn() -> f64,
    threshold_ms: f64,
}

impl<'a> TimeoutGuard<'a> {
    pub fn new(time_left: &'a dyn Fn() -> f64) -> Self {
        Self {
            time_left,
            threshold_ms: TIMER_THRESHOLD_MS,
        }
    }

    pub fn with_threshold(time_left: &'a dyn Fn() -> f64, threshold_ms: f64) -> Self {
        Self {
            time_left,
            threshold_ms,
        }
    }

    /// Consulted at the top of every recursive expansion and at each search
    /// root; the sole cancellation mechanism.
    pub fn check(&self) -> Result<(), SearchTimeout> {
        if (self.time_left)() < self.threshold_ms {
            Err(SearchTimeout)
        } else {
            Ok(())
        }
    }
}

pub struct Engine {
    heuristic: Heuristic,
}

impl Engine {
    pub fn new(heuristic: Heuristic) -> Self {
        Self { heuristic }
    }

    /// Iterative deepening driver: runs alpha-beta at depth 1, 2, 3, ...
    /// until the guard aborts a depth, then answers with the move from the
    /// last depth that completed in full. `None` only when the position has
    /// no legal moves at all.
    pub fn best_move<S: GameState>(&self, state: &S, time_left: &dyn Fn() -> f64) -> Option<Move> {
        // without this guard a terminal root would re-run depth after depth
        // until the clock expired
        if state.legal_moves(state.active_player()).is_empty() {
            return None;
        }
        let guard = TimeoutGuard::new(time_left);
        let mut best_move = None;
        let mut depth = 1;
        loop {
            match self.alphabeta(state, depth, &guard) {
                Ok(mv) => {
                    best_move = mv;
                    depth += 1;
                }
                Err(SearchTimeout) => {
                    debug!("deadline reached during depth {depth}, keeping depth {}", depth - 1);
                    return best_move;
                }
            }
        }
    }

    /// Depth-limited minimax. Returns `Ok(None)` when the side to move has
    /// no legal moves; otherwise the first move in generation order whose
    /// value is strictly greatest.
    pub fn minimax<S: GameState>(
        &self,
        state: &S,
        depth: u32,
        guard: &TimeoutGuard,
    ) -> Result<Option<Move>, SearchTimeout> {
        guard.check()?;
        let player = state.active_player();
        let moves = state.legal_moves(player);
        let mut best: Option<(Move, Score)> = None;
        for mv in moves {
            let value = self.minimax_value(
                &state.forecast(mv),
                depth.saturating_sub(1),
                false,
                player,
                guard,
            )?;
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((mv, value)),
            }
        }
        Ok(best.map(|(mv, _)| mv))
    }

    fn minimax_value<S: GameState>(
        &self,
        state: &S,
        depth: u32,
        maximizing: bool,
        player: Player,
        guard: &TimeoutGuard,
    ) -> Result<Score, SearchTimeout> {
        guard.check()?;
        let moves = state.legal_moves(state.active_player());
        if moves.is_empty() || depth == 0 {
            return Ok(self.heuristic.score(state, player));
        }
        let mut value = if maximizing {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        for mv in moves {
            let child =
                self.minimax_value(&state.forecast(mv), depth - 1, !maximizing, player, guard)?;
            value = if maximizing {
                value.max(child)
            } else {
                value.min(child)
            };
        }
        Ok(value)
    }

    /// Alpha-beta pruned minimax. Chooses the identical move to [`minimax`]
    /// at every depth; pruning only cuts subtrees that cannot influence the
    /// decision.
    ///
    /// [`minimax`]: Engine::minimax
    pub fn alphabeta<S: GameState>(
        &self,
        state: &S,
        depth: u32,
        guard: &TimeoutGuard,
    ) -> Result<Option<Move>, SearchTimeout> {
        guard.check()?;
        let player = state.active_player();
        let moves = state.legal_moves(player);
        let mut alpha = f64::NEG_INFINITY;
        let beta = f64::INFINITY;
        let mut best: Option<(Move, Score)> = None;
        for mv in moves {
            let value = self.alphabeta_value(
                &state.forecast(mv),
                depth.saturating_sub(1),
                alpha,
                beta,
                false,
                player,
                guard,
            )?;
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((mv, value)),
            }
            if value >= beta {
                break;
            }
            alpha = alpha.max(value);
        }
        Ok(best.map(|(mv, _)| mv))
    }

    fn alphabeta_value<S: GameState>(
        &self,
        state: &S,
        depth: u32,
        mut alpha: Score,
        mut beta: Score,
        maximizing: bool,
        player: Player,
        guard: &TimeoutGuard,
    ) -> Result<Score, SearchTimeout> {
        guard.check()?;
        let moves = state.legal_moves(state.active_player());
        if moves.is_empty() || depth == 0 {
            return Ok(self.heuristic.score(state, player));
        }
        if maximizing {
            let mut value = f64::NEG_INFINITY;
            for mv in moves {
                value = value.max(self.alphabeta_value(
                    &state.forecast(mv),
                    depth - 1,
                    alpha,
                    beta,
                    false,
                    player,
                    guard,
                )?);
                // non-strict cutoff; ties with the bound are pruned
                if value >= beta {
                    return Ok(value);
                }
                alpha = alpha.max(value);
            }
            Ok(value)
        } else {
            let mut value = f64::INFINITY;
            for mv in moves {
                value = value.min(self.alphabeta_value(
                    &state.forecast(mv),
                    depth - 1,
                    alpha,
                    beta,
                    true,
                    player,
                    guard,
                )?);
                if value <= alpha {
                    return Ok(value);
                }
                beta = beta.min(value);
            }
            Ok(value)
        }
    }
}
