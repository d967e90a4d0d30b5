use std::fmt;
use std::hash::{Hash, Hasher};

use movement::{Activation, ActivationKind, Coord};

use crate::board::Board;
use crate::piece::PieceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperationKind {
    /// Into an empty square
    Move,
    /// Onto an enemy, capturing it
    Attack,
}

/// A reversible board mutation.
///
/// An attack remembers the piece it captured between `apply` and `reverse`.
/// That piece is not part of the operation's identity: equality and hashing
/// only look at the kind and the two squares.
#[derive(Debug, Clone, Copy)]
pub struct Operation {
    pub kind: OperationKind,
    pub from: Coord,
    pub to: Coord,
    captured: Option<PieceId>,
}

impl PartialEq for Operation {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.from == other.from && self.to == other.to
    }
}

impl Eq for Operation {}

impl Hash for Operation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.from.hash(state);
        self.to.hash(state);
    }
}

impl Operation {
    pub fn new(kind: OperationKind, from: Coord, to: Coord) -> Self {
        Self {
            kind,
            from,
            to,
            captured: None,
        }
    }

    pub fn move_to(from: Coord, to: Coord) -> Self {
        Self::new(OperationKind::Move, from, to)
    }

    pub fn attack(from: Coord, to: Coord) -> Self {
        Self::new(OperationKind::Attack, from, to)
    }

    pub(crate) fn from_activation(origin: Coord, activation: Activation) -> Self {
        let kind = match activation.kind {
            ActivationKind::Move => OperationKind::Move,
            ActivationKind::Attack => OperationKind::Attack,
        };
        Self::new(kind, origin, activation.target)
    }

    pub fn is_attack(&self) -> bool {
        self.kind == OperationKind::Attack
    }

    /// The piece taken by this attack while it is applied.
    pub fn captured(&self) -> Option<PieceId> {
        self.captured
    }

    /// Perform the operation on `board`.
    ///
    /// Panics if the origin is empty, if a move targets an occupied square,
    /// or if an attack targets an empty or friendly square.
    pub fn apply(&mut self, board: &mut Board) {
        let mover = board
            .lift(self.from)
            .unwrap_or_else(|| panic!("{self}: no piece on {}", self.from));

        match self.kind {
            OperationKind::Move => {
                let displaced = board.put(self.to, mover);
                assert!(displaced.is_none(), "{self}: destination is occupied");
            }
            OperationKind::Attack => {
                let victim = board
                    .put(self.to, mover)
                    .unwrap_or_else(|| panic!("{self}: nothing to capture"));
                assert_ne!(
                    board.piece(victim).owner(),
                    board.piece(mover).owner(),
                    "{self}: attacks a friendly piece"
                );
                board.piece_mut(victim).capture();
                self.captured = Some(victim);
            }
        }

        let piece = board.piece_mut(mover);
        piece.relocate(self.to);
        piece.increment();
    }

    /// Undo the most recent `apply` of this operation.
    ///
    /// Panics when the board is not in the state `apply` left it in.
    pub fn reverse(&mut self, board: &mut Board) {
        let victim = match self.kind {
            OperationKind::Move => None,
            OperationKind::Attack => Some(
                self.captured
                    .take()
                    .unwrap_or_else(|| panic!("{self}: reversed without being applied")),
            ),
        };

        let mover = board
            .lift(self.to)
            .unwrap_or_else(|| panic!("{self}: nothing to reverse on {}", self.to));
        let blocked = board.put(self.from, mover);
        assert!(blocked.is_none(), "{self}: origin was refilled before reverse");

        let piece = board.piece_mut(mover);
        piece.relocate(self.from);
        piece.decrement();

        if let Some(victim) = victim {
            board.put(self.to, victim);
            board.piece_mut(victim).uncapture(self.to);
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = match self.kind {
            OperationKind::Move => "->",
            OperationKind::Attack => "-x",
        };
        write!(f, "{} {} {}", self.from, arrow, self.to)
    }
}
