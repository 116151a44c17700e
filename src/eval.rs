use clap::ValueEnum;

use crate::state::{GameState, Player};

/// Heuristic value of a cutoff state; `f64::INFINITY`/`f64::NEG_INFINITY`
/// are reserved for proven terminal win/loss.
pub type Score = f64;

/// Strategy for scoring a non-terminal cutoff state from one player's point
/// of view. Every variant shares the terminal rule: a player with no legal
/// moves scores +inf when the game is already decided in their favor,
/// -inf otherwise. The variants differ only in the finite formula.
#[derive(PartialEq, Eq, Clone, Copy, Debug, ValueEnum)]
pub enum Heuristic {
    /// Negative ratio of opponent mobility to own mobility.
    MobilityRatio,
    /// Mobility difference plus euclidean distance from the board center.
    CenterDistance,
    /// Mobility difference plus squared distance from the board center.
    CenterDistanceSquared,
}

impl Heuristic {
    pub fn score<S: GameState>(self, state: &S, player: Player) -> Score {
        let own_moves = state.legal_moves(player);
        let opp_moves = state.legal_moves(player.opponent());
        if own_moves.is_empty() {
            return if state.is_winner(player) {
                f64::INFINITY
            } else {
                f64::NEG_INFINITY
            };
        }
        let own = own_moves.len() as f64;
        let opp = opp_moves.len() as f64;
        match self {
            Heuristic::MobilityRatio => -opp / own,
            Heuristic::CenterDistance => own - opp + center_distance_sq(state, player).sqrt(),
            Heuristic::CenterDistanceSquared => own - opp + center_distance_sq(state, player),
        }
    }
}

fn center_distance_sq<S: GameState>(state: &S, player: Player) -> f64 {
    match state.player_location(player) {
        Some((row, col)) => {
            let center_row = state.height() as f64 / 2.0;
            let center_col = state.width() as f64 / 2.0;
            (center_row - row as f64).powi(2) + (center_col - col as f64).powi(2)
        }
        // not placed yet; only mobility counts
        None => 0.0,
    }
}
