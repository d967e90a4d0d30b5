use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use movement::preconditions;
use movement::script::{self, ScriptError};
use movement::{Coord, Mode, MovementRule, KING_STEPS, KNIGHT_LEAPS};
use tracing::trace;

use crate::board::{Board, PieceView};
use crate::operation::Operation;
use crate::piece::PieceId;

const ORTHOGONAL: [Coord; 4] = [
    Coord::new(1, 0),
    Coord::new(0, 1),
    Coord::new(-1, 0),
    Coord::new(0, -1),
];

const DIAGONAL: [Coord; 4] = [
    Coord::new(1, 1),
    Coord::new(-1, 1),
    Coord::new(1, -1),
    Coord::new(-1, -1),
];

/// The built-in piece kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
    /// Steps like a king, fires skipping rays on even turns
    Artillery,
    /// Short forward volleys over blockers
    Archer,
}

impl PieceKind {
    pub const ALL: [PieceKind; 8] = [
        PieceKind::King,
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Pawn,
        PieceKind::Artillery,
        PieceKind::Archer,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PieceKind::King => "king",
            PieceKind::Queen => "queen",
            PieceKind::Rook => "rook",
            PieceKind::Bishop => "bishop",
            PieceKind::Knight => "knight",
            PieceKind::Pawn => "pawn",
            PieceKind::Artillery => "artillery",
            PieceKind::Archer => "archer",
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            PieceKind::King => 'K',
            PieceKind::Queen => 'Q',
            PieceKind::Rook => 'R',
            PieceKind::Bishop => 'B',
            PieceKind::Knight => 'N',
            PieceKind::Pawn => 'P',
            PieceKind::Artillery => 'C',
            PieceKind::Archer => 'A',
        }
    }

    pub fn is_royal(&self) -> bool {
        matches!(self, PieceKind::King)
    }

    pub fn from_name(name: &str) -> Option<PieceKind> {
        PieceKind::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Movement rules in the canonical (white) frame.
    pub fn rules(&self) -> Vec<MovementRule> {
        match self {
            PieceKind::King => KING_STEPS.into_iter().map(MovementRule::step).collect(),
            PieceKind::Knight => KNIGHT_LEAPS.into_iter().map(MovementRule::step).collect(),
            PieceKind::Rook => ORTHOGONAL.into_iter().map(MovementRule::new).collect(),
            PieceKind::Bishop => DIAGONAL.into_iter().map(MovementRule::new).collect(),
            PieceKind::Queen => DIAGONAL
                .into_iter()
                .chain(ORTHOGONAL)
                .map(MovementRule::new)
                .collect(),
            PieceKind::Pawn => {
                let forward = Coord::new(0, 1);
                vec![
                    MovementRule {
                        max_steps: Some(2),
                        mode: Mode::MoveOnly,
                        precondition: preconditions::unmoved,
                        ..MovementRule::new(forward)
                    },
                    MovementRule {
                        mode: Mode::MoveOnly,
                        precondition: preconditions::moved,
                        ..MovementRule::step(forward)
                    },
                    MovementRule {
                        mode: Mode::AttackOnly,
                        ..MovementRule::step(Coord::new(1, 1))
                    },
                    MovementRule {
                        mode: Mode::AttackOnly,
                        ..MovementRule::step(Coord::new(-1, 1))
                    },
                ]
            }
            PieceKind::Artillery => {
                let rays = KING_STEPS.into_iter().map(|direction| MovementRule {
                    max_steps: Some(5),
                    skipping: true,
                    mode: Mode::AttackOnly,
                    precondition: preconditions::even_turn,
                    ..MovementRule::new(direction)
                });
                let steps = KING_STEPS.into_iter().map(|direction| MovementRule {
                    mode: Mode::MoveOnly,
                    ..MovementRule::step(direction)
                });
                rays.chain(steps).collect()
            }
            PieceKind::Archer => [Coord::new(0, 1), Coord::new(1, 1), Coord::new(-1, 1)]
                .into_iter()
                .map(|direction| MovementRule {
                    max_steps: Some(2),
                    skipping: true,
                    ..MovementRule::new(direction)
                })
                .collect(),
        }
    }
}

/// A named piece type: display symbol, royalty and movement rules.
///
/// Two types are the same type when their names match.
#[derive(Debug, Clone)]
pub struct PieceType {
    name: String,
    symbol: char,
    royal: bool,
    rules: Vec<MovementRule>,
}

impl PartialEq for PieceType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for PieceType {}

impl PieceType {
    pub fn new(
        name: impl Into<String>,
        symbol: char,
        royal: bool,
        rules: Vec<MovementRule>,
    ) -> Self {
        Self {
            name: name.into(),
            symbol,
            royal,
            rules,
        }
    }

    pub fn builtin(kind: PieceKind) -> Self {
        Self::new(kind.name(), kind.symbol(), kind.is_royal(), kind.rules())
    }

    /// Build a type from a rule script.
    pub fn from_script(
        name: impl Into<String>,
        symbol: char,
        royal: bool,
        source: &str,
    ) -> Result<Self, ScriptError> {
        Ok(Self::new(name, symbol, royal, script::parse(source)?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> char {
        self.symbol
    }

    pub fn is_royal(&self) -> bool {
        self.royal
    }

    pub fn rules(&self) -> &[MovementRule] {
        &self.rules
    }

    /// Every operation the rules produce from `origin`, ignoring checks.
    ///
    /// Duplicates across rules are dropped; the first occurrence keeps its
    /// place.
    pub fn raw_moves(&self, board: &Board, origin: Coord, piece: PieceId) -> Vec<Operation> {
        let view = PieceView::new(board, origin, board.piece(piece));
        let mut seen = HashSet::new();
        let mut operations = Vec::new();

        for rule in &self.rules {
            for activation in rule.generate(&view) {
                let operation = Operation::from_activation(origin, activation);
                if seen.insert(operation) {
                    operations.push(operation);
                }
            }
        }

        operations
    }

    /// Operations available from `origin`.
    ///
    /// With `filter_checks`, each candidate is applied to the board, the
    /// opponent's raw operations are checked for an attack on the owner's
    /// king, and the candidate is reversed again. Only survivors are
    /// returned.
    pub fn generate(
        &self,
        board: &mut Board,
        origin: Coord,
        piece: PieceId,
        filter_checks: bool,
    ) -> Vec<Operation> {
        let candidates = self.raw_moves(board, origin, piece);
        if !filter_checks {
            return candidates;
        }

        let owner = board.piece(piece).owner();
        let mut legal = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let mut trial = candidate;
            trial.apply(board);
            let exposed = board.in_check(owner);
            trial.reverse(board);

            if exposed {
                trace!(operation = %candidate, %owner, "leaves king attacked");
            } else {
                legal.push(candidate);
            }
        }
        legal
    }
}

/// Named piece types available to a board.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    types: BTreeMap<String, Arc<PieceType>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in kind.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for kind in PieceKind::ALL {
            registry.register(PieceType::builtin(kind));
        }
        registry
    }

    /// Add or replace a type under its name.
    pub fn register(&mut self, piece_type: PieceType) -> Arc<PieceType> {
        let piece_type = Arc::new(piece_type);
        self.types
            .insert(piece_type.name().to_string(), Arc::clone(&piece_type));
        piece_type
    }

    pub fn register_script(
        &mut self,
        name: &str,
        symbol: char,
        royal: bool,
        source: &str,
    ) -> Result<Arc<PieceType>, ScriptError> {
        let piece_type = PieceType::from_script(name, symbol, royal, source)?;
        Ok(self.register(piece_type))
    }

    pub fn get(&self, name: &str) -> Option<Arc<PieceType>> {
        self.types.get(name).cloned()
    }

    /// The registered type for a built-in kind, or a fresh one if it was
    /// never registered.
    pub fn kind(&self, kind: PieceKind) -> Arc<PieceType> {
        self.get(kind.name())
            .unwrap_or_else(|| Arc::new(PieceType::builtin(kind)))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(PieceKind::from_name("dragon"), None);
        assert!(PieceKind::King.is_royal());
        assert!(!PieceKind::Queen.is_royal());
    }

    #[test]
    fn test_rule_counts() {
        assert_eq!(PieceKind::King.rules().len(), 8);
        assert_eq!(PieceKind::Queen.rules().len(), 8);
        assert_eq!(PieceKind::Pawn.rules().len(), 4);
        assert_eq!(PieceKind::Artillery.rules().len(), 16);
        assert_eq!(PieceKind::Archer.rules().len(), 3);
    }

    #[test]
    fn test_type_equality_by_name() {
        let script = PieceType::from_script("rook", 'X', false, "take-move(1, 0);").unwrap();
        assert_eq!(script, PieceType::builtin(PieceKind::Rook));
        assert_ne!(
            PieceType::builtin(PieceKind::Rook),
            PieceType::builtin(PieceKind::Bishop)
        );
    }

    #[test]
    fn test_registry() {
        let mut registry = Registry::standard();
        assert_eq!(registry.names().count(), PieceKind::ALL.len());
        assert_eq!(registry.kind(PieceKind::Knight).symbol(), 'N');

        let wazir = registry
            .register_script(
                "wazir",
                'W',
                false,
                "take-move(1, 0); take-move(0, 1); take-move(-1, 0); take-move(0, -1);",
            )
            .unwrap();
        assert_eq!(wazir.rules().len(), 4);
        assert!(registry.get("wazir").is_some());
        assert!(registry.register_script("bad", 'Z', false, "fly(1, 0);").is_err());
        assert!(registry.get("bad").is_none());
    }

    #[test]
    fn test_empty_registry_falls_back_to_builtin() {
        let registry = Registry::new();
        assert!(registry.get("pawn").is_none());
        assert_eq!(registry.kind(PieceKind::Pawn).name(), "pawn");
    }
}
