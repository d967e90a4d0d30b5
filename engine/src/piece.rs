use std::fmt;
use std::sync::Arc;

use movement::Coord;

use crate::kinds::PieceType;
use crate::player::Side;

/// Index of a piece in its board's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub(crate) usize);

/// A piece on (or captured from) a board.
///
/// Pieces are never removed from the board's arena: capture only clears the
/// location so that reversing an attack can bring the piece back.
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    kind: Arc<PieceType>,
    owner: Side,
    location: Option<Coord>,
    captured: bool,
    operations: u32,
}

impl Piece {
    pub(crate) fn new(kind: Arc<PieceType>, owner: Side, location: Coord) -> Self {
        Self {
            kind,
            owner,
            location: Some(location),
            captured: false,
            operations: 0,
        }
    }

    pub fn kind(&self) -> &Arc<PieceType> {
        &self.kind
    }

    pub fn owner(&self) -> Side {
        self.owner
    }

    /// `None` exactly when captured.
    pub fn location(&self) -> Option<Coord> {
        self.location
    }

    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// Moves and attacks applied to this piece and not yet reversed.
    pub fn operation_count(&self) -> u32 {
        self.operations
    }

    /// Uppercase for white, lowercase for black.
    pub fn symbol(&self) -> char {
        match self.owner {
            Side::White => self.kind.symbol().to_ascii_uppercase(),
            Side::Black => self.kind.symbol().to_ascii_lowercase(),
        }
    }

    pub(crate) fn relocate(&mut self, to: Coord) {
        self.location = Some(to);
    }

    pub(crate) fn capture(&mut self) {
        self.captured = true;
        self.location = None;
    }

    pub(crate) fn uncapture(&mut self, at: Coord) {
        self.captured = false;
        self.location = Some(at);
    }

    pub(crate) fn increment(&mut self) {
        self.operations += 1;
    }

    pub(crate) fn decrement(&mut self) {
        self.operations = self
            .operations
            .checked_sub(1)
            .expect("operation counter reversed below zero");
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(at) => write!(f, "{} {} at {}", self.owner, self.kind.name(), at),
            None => write!(f, "{} {} (captured)", self.owner, self.kind.name()),
        }
    }
}
