use movement::{Coord, NotationError};
use thiserror::Error;

use crate::game::GameStatus;
use crate::operation::Operation;
use crate::player::Side;

/// Recoverable failures of board setup and play.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("{at} is off the {cols}x{rows} board")]
    OutOfBounds { at: Coord, cols: i32, rows: i32 },
    #[error("{0} is already occupied")]
    Occupied(Coord),
    #[error("unsupported board size {cols}x{rows}")]
    Dimensions { cols: i32, rows: i32 },
    #[error("unknown piece kind `{0}`")]
    UnknownKind(String),
    #[error("no legal moves from {0}")]
    NoLegalMoves(Coord),
    #[error("{0} is not a legal move for {1}")]
    IllegalOperation(Operation, Side),
    #[error("the game is over: {0}")]
    GameOver(GameStatus),
    #[error(transparent)]
    Notation(#[from] NotationError),
}
