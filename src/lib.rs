pub mod board;
pub mod engine;
pub mod eval;
pub mod state;

pub use board::{Board, BoardError};
pub use engine::{Engine, SearchTimeout, TimeoutGuard, TIMER_THRESHOLD_MS};
pub use eval::{Heuristic, Score};
pub use state::{GameState, Move, Player};
