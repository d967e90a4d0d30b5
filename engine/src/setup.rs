use movement::Coord;
use serde::{Deserialize, Serialize};

use crate::board::{Board, BACK_RANK};
use crate::error::BoardError;
use crate::kinds::{PieceKind, Registry};
use crate::player::{Player, Side};

/// One piece of a [`Setup`], e.g. `{ "kind": "rook", "side": "white", "at": "a1" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub kind: String,
    pub side: Side,
    pub at: String,
}

impl Placement {
    pub fn new(kind: &str, side: Side, at: Coord) -> Self {
        Self {
            kind: kind.to_string(),
            side,
            at: at.to_string(),
        }
    }
}

/// Serializable description of a starting position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setup {
    pub cols: i32,
    pub rows: i32,
    #[serde(default = "default_white")]
    pub white: String,
    #[serde(default = "default_black")]
    pub black: String,
    #[serde(default)]
    pub placements: Vec<Placement>,
}

fn default_white() -> String {
    "w".to_string()
}

fn default_black() -> String {
    "b".to_string()
}

impl Setup {
    /// An empty board of the given size.
    pub fn empty(cols: i32, rows: i32) -> Self {
        Self {
            cols,
            rows,
            white: default_white(),
            black: default_black(),
            placements: Vec::new(),
        }
    }

    /// The standard 8x8 position.
    pub fn standard() -> Self {
        let mut setup = Self::empty(8, 8);
        for (side, back, front) in [(Side::White, 0, 1), (Side::Black, 7, 6)] {
            for (x, kind) in (0..).zip(BACK_RANK) {
                setup.push(kind.name(), side, Coord::new(x, back));
                setup.push(PieceKind::Pawn.name(), side, Coord::new(x, front));
            }
        }
        setup
    }

    pub fn push(&mut self, kind: &str, side: Side, at: Coord) -> &mut Self {
        self.placements.push(Placement::new(kind, side, at));
        self
    }

    /// Build the board, resolving kinds through `registry`.
    pub fn build(&self, registry: Registry) -> Result<Board, BoardError> {
        let mut board = Board::try_with_registry(
            self.cols,
            self.rows,
            Player::white(self.white.as_str()),
            Player::black(self.black.as_str()),
            registry,
        )?;
        for placement in &self.placements {
            let at: Coord = placement.at.parse()?;
            board.place_named(&placement.kind, placement.side, at)?;
        }
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_matches_board() {
        let built = Setup::standard().build(Registry::standard()).unwrap();
        let direct = Board::standard(Player::white("w"), Player::black("b"));
        assert_eq!(built, direct);
        assert_eq!(built.player(Side::White).king(), direct.player(Side::White).king());
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "cols": 10,
            "rows": 6,
            "placements": [
                { "kind": "king", "side": "white", "at": "e1" },
                { "kind": "artillery", "side": "black", "at": "j6" }
            ]
        }"#;
        let setup: Setup = serde_json::from_str(json).unwrap();
        assert_eq!(setup.white, "w");

        let board = setup.build(Registry::standard()).unwrap();
        assert_eq!(board.cols(), 10);
        assert_eq!(board.get("j6".parse().unwrap()).unwrap().symbol(), 'c');
    }

    #[test]
    fn test_build_errors() {
        assert_eq!(
            Setup::empty(0, 8).build(Registry::standard()),
            Err(BoardError::Dimensions { cols: 0, rows: 8 })
        );
        assert_eq!(
            Setup::empty(70_000, 70_000).build(Registry::standard()),
            Err(BoardError::Dimensions {
                cols: 70_000,
                rows: 70_000
            })
        );

        let mut setup = Setup::empty(4, 4);
        setup.push("king", Side::White, Coord::new(0, 0));
        setup.push("king", Side::Black, Coord::new(0, 0));
        assert_eq!(
            setup.build(Registry::standard()),
            Err(BoardError::Occupied(Coord::new(0, 0)))
        );

        let mut setup = Setup::empty(4, 4);
        setup.placements.push(Placement {
            kind: "rook".to_string(),
            side: Side::White,
            at: "4a".to_string(),
        });
        assert!(matches!(
            setup.build(Registry::standard()),
            Err(BoardError::Notation(_))
        ));

        let mut setup = Setup::empty(4, 4);
        setup.push("dragon", Side::White, Coord::new(1, 1));
        assert_eq!(
            setup.build(Registry::new()),
            Err(BoardError::UnknownKind("dragon".to_string()))
        );
    }
}
