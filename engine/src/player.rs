use std::fmt;

use movement::Coord;
use serde::{Deserialize, Serialize};

use crate::piece::PieceId;

/// Which of the two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::White => 0,
            Side::Black => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => f.write_str("white"),
            Side::Black => f.write_str("black"),
        }
    }
}

/// How a player reads canonical rule directions.
///
/// Rules are written as if "forward" meant increasing rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Identity,
    /// (x, y) -> (x, -y)
    FlipRank,
}

impl Orientation {
    pub fn apply(self, direction: Coord) -> Coord {
        match self {
            Orientation::Identity => direction,
            Orientation::FlipRank => Coord::new(direction.x, direction.y.saturating_neg()),
        }
    }
}

/// Per-player state: roster, king, turn counter and orientation.
#[derive(Debug, Clone)]
pub struct Player {
    id: String,
    side: Side,
    orientation: Orientation,
    pieces: Vec<PieceId>,
    king: Option<PieceId>,
    turn_count: u32,
}

impl Player {
    pub fn new(id: impl Into<String>, side: Side, orientation: Orientation) -> Self {
        Self {
            id: id.into(),
            side,
            orientation,
            pieces: Vec::new(),
            king: None,
            turn_count: 1,
        }
    }

    /// White plays up the board.
    pub fn white(id: impl Into<String>) -> Self {
        Self::new(id, Side::White, Orientation::Identity)
    }

    /// Black plays down the board.
    pub fn black(id: impl Into<String>) -> Self {
        Self::new(id, Side::Black, Orientation::FlipRank)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn orient(&self, direction: Coord) -> Coord {
        self.orientation.apply(direction)
    }

    /// Every piece ever placed for this player, captured ones included.
    pub fn pieces(&self) -> &[PieceId] {
        &self.pieces
    }

    pub fn king(&self) -> Option<PieceId> {
        self.king
    }

    /// Starts at 1, bumped once per executed operation.
    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub(crate) fn increment(&mut self) {
        self.turn_count += 1;
    }

    pub(crate) fn set_turn_count(&mut self, count: u32) {
        self.turn_count = count;
    }

    pub(crate) fn register(&mut self, piece: PieceId, royal: bool) {
        if royal {
            self.king = Some(piece);
        }
        self.pieces.push(piece);
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}
