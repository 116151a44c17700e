use bitvec::prelude::*;
use thiserror::Error;

use crate::state::{GameState, Move, Player};

pub const DEFAULT_WIDTH: usize = 7;
pub const DEFAULT_HEIGHT: usize = 7;

// largest supported board; cells are indexed row-major into one bit array
const MAX_CELLS: usize = 64;
pub type BitBoard = BitArr!(for MAX_CELLS, in u8, Lsb0);

// knight jumps, the movement rule for every move after the opening placement
const KNIGHT_OFFSETS: [(isize, isize); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("illegal move to ({0}, {1})")]
    IllegalMove(usize, usize),
    #[error("{0}x{1} board exceeds the {MAX_CELLS}-cell limit")]
    OversizedBoard(usize, usize),
}

/// Immutable Isolation position. Applying a move produces a new `Board`;
/// the parent value is never touched. Cells stay blocked once either player
/// has visited them.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Board {
    width: usize,
    height: usize,
    blocked: BitBoard,
    location_one: Option<(usize, usize)>,
    location_two: Option<(usize, usize)>,
    active: Player,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Result<Self, BoardError> {
        if width * height > MAX_CELLS {
            return Err(BoardError::OversizedBoard(width, height));
        }
        Ok(Self {
            width,
            height,
            blocked: bitarr!(u8, Lsb0; 0; MAX_CELLS),
            location_one: None,
            location_two: None,
            active: Player::One,
        })
    }

    fn cell(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }

    fn is_blank(&self, row: usize, col: usize) -> bool {
        !self.blocked[self.cell(row, col)]
    }

    fn location(&self, player: Player) -> Option<(usize, usize)> {
        match player {
            Player::One => self.location_one,
            Player::Two => self.location_two,
        }
    }

    fn blank_cells(&self) -> Vec<Move> {
        (0..self.height)
            .flat_map(|row| (0..self.width).map(move |col| Move { row, col }))
            .filter(|mv| self.is_blank(mv.row, mv.col))
            .collect()
    }

    fn knight_moves(&self, row: usize, col: usize) -> Vec<Move> {
        KNIGHT_OFFSETS
            .iter()
            .filter_map(|&(dr, dc)| {
                let row = row.checked_add_signed(dr)?;
                let col = col.checked_add_signed(dc)?;
                (row < self.height && col < self.width && self.is_blank(row, col))
                    .then_some(Move { row, col })
            })
            .collect()
    }

    /// Validated move application for externally supplied moves.
    pub fn make_move(&self, mv: Move) -> Result<Self, BoardError> {
        if !self.legal_moves(self.active).contains(&mv) {
            return Err(BoardError::IllegalMove(mv.row, mv.col));
        }
        Ok(self.forecast(mv))
    }
}

impl GameState for Board {
    fn active_player(&self) -> Player {
        self.active
    }

    fn legal_moves(&self, player: Player) -> Vec<Move> {
        match self.location(player) {
            // before placement a player may open on any blank cell
            None => self.blank_cells(),
            Some((row, col)) => self.knight_moves(row, col),
        }
    }

    fn forecast(&self, mv: Move) -> Self {
        debug_assert!(self.legal_moves(self.active).contains(&mv));
        let mut board = self.clone();
        let idx = board.cell(mv.row, mv.col);
        board.blocked.set(idx, true);
        match board.active {
            Player::One => board.location_one = Some((mv.row, mv.col)),
            Player::Two => board.location_two = Some((mv.row, mv.col)),
        }
        board.active = self.active.opponent();
        board
    }

    fn is_winner(&self, player: Player) -> bool {
        player != self.active && self.legal_moves(self.active).is_empty()
    }

    fn player_location(&self, player: Player) -> Option<(usize, usize)> {
        self.location(player)
    }

    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }
}
