use serde::{Deserialize, Serialize};

/// One of the two contestants. The search layer never cares which is which,
/// only whose perspective a score or legality query applies to.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }
}

/// Destination cell of a move. "No move available" is `Option<Move>::None`
/// throughout the engine, never a sentinel coordinate pair.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Move {
    pub row: usize,
    pub col: usize,
}

/// Contract the search layer requires from a game position.
///
/// Implementations are immutable values: `forecast` returns a new state with
/// the move applied and the active player switched, leaving the receiver
/// untouched. An empty `legal_moves` result for the active player means the
/// position is terminal.
pub trait GameState: Clone {
    /// The player whose turn it is.
    fn active_player(&self) -> Player;

    /// Legal destination cells for `player`, in a deterministic generation
    /// order. The engine's tie-break rule (first move with the strictly
    /// greatest value wins) is defined relative to this order.
    fn legal_moves(&self, player: Player) -> Vec<Move>;

    /// A new state with `mv` played by the active player. Must not mutate
    /// `self`; `mv` must be legal for the active player.
    fn forecast(&self, mv: Move) -> Self;

    /// True iff the game is decided in `player`'s favor.
    fn is_winner(&self, player: Player) -> bool;

    /// `(row, col)` of `player`, or `None` before their opening placement.
    fn player_location(&self, player: Player) -> Option<(usize, usize)>;

    fn width(&self) -> usize;
    fn height(&self) -> usize;
}
