use std::fmt;

use tracing::trace;

use crate::coord::Coord;

/// Whether a rule may produce moves, attacks, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Move to empty squares or attack enemy ones
    Either,
    /// Empty squares only
    MoveOnly,
    /// Enemy-occupied squares only
    AttackOnly,
}

/// What stands on a square, seen from the moving piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupancy {
    Empty,
    Friendly,
    Enemy,
}

/// Kind of a generated activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivationKind {
    Move,
    Attack,
}

/// A square a rule makes reachable, tagged with how it is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Activation {
    pub target: Coord,
    pub kind: ActivationKind,
}

/// The board as seen by one piece standing on one square.
///
/// The engine implements this for a (board, origin, piece) triple; rules and
/// their preconditions only ever look at the board through it.
pub trait Surface {
    /// Square the piece is generating from
    fn origin(&self) -> Coord;

    /// Whether `at` lies on the board
    fn in_bounds(&self, at: Coord) -> bool;

    /// Occupant of `at` relative to the moving piece
    fn occupancy(&self, at: Coord) -> Occupancy;

    /// Owner's orientation applied to a canonical direction
    fn orient(&self, direction: Coord) -> Coord;

    /// Moves and attacks applied to the piece so far
    fn operation_count(&self) -> u32;

    /// Owner's turn counter (starts at 1)
    fn turn_count(&self) -> u32;
}

/// Activation condition of a rule, evaluated once per generation call.
pub type Precondition = fn(&dyn Surface) -> bool;

/// Named preconditions usable from rule scripts.
pub mod preconditions {
    use super::Surface;

    pub fn always(_: &dyn Surface) -> bool {
        true
    }

    /// The piece has not moved or attacked yet.
    pub fn unmoved(surface: &dyn Surface) -> bool {
        surface.operation_count() == 0
    }

    pub fn moved(surface: &dyn Surface) -> bool {
        surface.operation_count() > 0
    }

    /// The owner's turn counter is even. Shared by every piece of the owner.
    pub fn even_turn(surface: &dyn Surface) -> bool {
        surface.turn_count() % 2 == 0
    }

    pub fn odd_turn(surface: &dyn Surface) -> bool {
        surface.turn_count() % 2 == 1
    }
}

/// One declarative movement capability of a piece type.
///
/// Directions are written in the canonical frame where "forward" means
/// increasing rank; the owner's orientation reinterprets them per side.
#[derive(Clone, Copy)]
pub struct MovementRule {
    pub direction: Coord,
    /// `None` scans until the edge or a blocker
    pub max_steps: Option<u32>,
    /// Keep scanning past occupied squares
    pub skipping: bool,
    pub mode: Mode,
    pub precondition: Precondition,
}

impl MovementRule {
    /// Unbounded, non-skipping, either-mode rule that is always active.
    pub const fn new(direction: Coord) -> Self {
        Self {
            direction,
            max_steps: None,
            skipping: false,
            mode: Mode::Either,
            precondition: preconditions::always,
        }
    }

    /// Same rule limited to a single step.
    pub const fn step(direction: Coord) -> Self {
        Self {
            max_steps: Some(1),
            ..Self::new(direction)
        }
    }

    /// Squares this rule reaches from the surface's origin, ignoring checks.
    pub fn generate(&self, surface: &dyn Surface) -> Vec<Activation> {
        let mut activations = Vec::new();

        if !(self.precondition)(surface) {
            return activations;
        }

        let direction = surface.orient(self.direction);
        if direction == Coord::ORIGIN {
            // would never leave the origin
            return activations;
        }

        let origin = surface.origin();
        let mut reachable = Vec::new();
        let mut step: i32 = 1;
        loop {
            if let Some(max) = self.max_steps {
                if step as i64 > max as i64 {
                    break;
                }
            }
            let Some(candidate) = origin.checked_offset(direction, step) else {
                break;
            };
            if !surface.in_bounds(candidate) {
                break;
            }
            let occupancy = surface.occupancy(candidate);
            reachable.push((candidate, occupancy));
            if occupancy != Occupancy::Empty && !self.skipping {
                break;
            }
            step += 1;
        }

        for (target, occupancy) in reachable {
            let kind = match (occupancy, self.mode) {
                (Occupancy::Empty, Mode::Either | Mode::MoveOnly) => ActivationKind::Move,
                (Occupancy::Enemy, Mode::Either | Mode::AttackOnly) => ActivationKind::Attack,
                _ => continue,
            };
            trace!(%origin, %target, ?kind, "activation");
            activations.push(Activation { target, kind });
        }

        activations
    }
}

impl fmt::Debug for MovementRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MovementRule")
            .field("direction", &self.direction)
            .field("max_steps", &self.max_steps)
            .field("skipping", &self.skipping)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}
