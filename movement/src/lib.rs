//! Declarative movement rules for chess-like pieces.
//!
//! A rule scans from a piece's square along one direction and reports which
//! squares it can move to or attack. The engine supplies the board through
//! [`Surface`] and turns the resulting [`Activation`]s into operations.

pub mod coord;
pub mod rule;
pub mod script;

pub use coord::{file_letters, Coord, NotationError, KING_STEPS, KNIGHT_LEAPS};
pub use rule::{
    preconditions, Activation, ActivationKind, Mode, MovementRule, Occupancy, Precondition,
    Surface,
};
pub use script::ScriptError;
