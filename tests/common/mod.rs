use isolation_engine::{Board, Move};

pub fn play(board: Board, moves: &[(usize, usize)]) -> Board {
    moves.iter().fold(board, |board, &(row, col)| {
        board.make_move(Move { row, col }).unwrap()
    })
}

/// 5x5 midgame position: both players placed, player one to move with eight
/// knight moves available.
pub fn midgame_5x5() -> Board {
    play(Board::new(5, 5).unwrap(), &[(2, 2), (1, 1)])
}

/// 3x3 game played out until both players are stuck. Only the center cell is
/// still blank; player one is to move, has no destinations, and has lost.
pub fn finished_3x3() -> Board {
    play(
        Board::new(3, 3).unwrap(),
        &[
            (0, 0),
            (2, 2),
            (1, 2),
            (1, 0),
            (2, 0),
            (0, 2),
            (0, 1),
            (2, 1),
        ],
    )
}
