//! Board, pieces and turn logic for chess-like games of any size.
//!
//! Piece types are lists of [`MovementRule`]s; the board asks them for raw
//! candidates and filters out operations that leave the mover's king
//! attacked. Every operation is reversible, which is what powers both undo
//! and the legality filter.

pub mod board;
pub mod error;
pub mod game;
pub mod kinds;
pub mod operation;
pub mod perft;
pub mod piece;
pub mod player;
pub mod setup;

pub use board::{Board, BACK_RANK, MAX_CELLS};
pub use error::BoardError;
pub use game::{Game, GameStatus};
pub use kinds::{PieceKind, PieceType, Registry};
pub use operation::{Operation, OperationKind};
pub use perft::{divide, perft};
pub use piece::{Piece, PieceId};
pub use player::{Orientation, Player, Side};
pub use setup::{Placement, Setup};

pub use movement::{Coord, Mode, MovementRule, NotationError, ScriptError};
