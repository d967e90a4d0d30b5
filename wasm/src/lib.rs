use engine::{Board, BoardError, GameStatus, Operation, Piece, Registry, Setup, Side};
use movement::{Coord, ScriptError};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Game wrapper exported to JS
#[wasm_bindgen]
pub struct Game {
    game: engine::Game,
}

/// A piece as JS sees it
#[derive(Debug, Serialize, Deserialize)]
pub struct JsPiece {
    pub kind: String,
    pub symbol: String,
    pub owner: String,
    pub is_royal: bool,
    pub operations: u32,
}

/// One board cell
#[derive(Debug, Serialize, Deserialize)]
pub struct JsSquare {
    pub x: i32,
    pub y: i32,
    pub name: String,
    pub piece: Option<JsPiece>,
}

/// One legal operation
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct JsMove {
    pub from_x: i32,
    pub from_y: i32,
    pub to_x: i32,
    pub to_y: i32,
    pub is_capture: bool,
    pub label: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsGameState {
    pub cols: i32,
    pub rows: i32,
    pub squares: Vec<JsSquare>,
    pub current_player: String,
    pub status: String,
    pub in_check: bool,
    pub is_game_over: bool,
    /// Side that delivered mate, if any
    pub winner: Option<String>,
    pub white_score: u32,
    pub black_score: u32,
}

/// A scripted piece kind supplied by JS
#[derive(Debug, Serialize, Deserialize)]
pub struct JsKind {
    pub name: String,
    pub symbol: char,
    #[serde(default)]
    pub royal: bool,
    pub script: String,
}

#[wasm_bindgen]
impl Game {
    /// Standard position, white to move
    #[wasm_bindgen(constructor)]
    pub fn new() -> Game {
        Game {
            game: engine::Game::standard(),
        }
    }

    /// Custom position from a serialized `Setup`, with optional scripted kinds
    #[wasm_bindgen]
    pub fn custom(setup: JsValue, kinds: JsValue) -> Result<Game, JsValue> {
        let setup: Setup = serde_wasm_bindgen::from_value(setup)?;
        let kinds: Vec<JsKind> = if kinds.is_undefined() || kinds.is_null() {
            Vec::new()
        } else {
            serde_wasm_bindgen::from_value(kinds)?
        };

        let game = build_game(&setup, &kinds).map_err(|e| JsValue::from_str(&e))?;
        Ok(Game { game })
    }

    #[wasm_bindgen]
    pub fn get_state(&mut self) -> Result<JsValue, JsValue> {
        let state = self.build_state();
        Ok(serde_wasm_bindgen::to_value(&state)?)
    }

    /// Legal operations of the piece on (x, y); empty for the waiting side
    #[wasm_bindgen]
    pub fn get_legal_moves(&mut self, x: i32, y: i32) -> Result<JsValue, JsValue> {
        let moves = self.legal_moves_at(Coord::new(x, y));
        Ok(serde_wasm_bindgen::to_value(&moves)?)
    }

    /// Play from one square to another; returns the new status
    #[wasm_bindgen]
    pub fn move_piece(
        &mut self,
        from_x: i32,
        from_y: i32,
        to_x: i32,
        to_y: i32,
    ) -> Result<String, JsValue> {
        self.play(Coord::new(from_x, from_y), Coord::new(to_x, to_y))
            .map_err(|e| JsValue::from_str(&e))
    }

    #[wasm_bindgen]
    pub fn undo(&mut self) -> bool {
        self.game.undo()
    }

    /// The side to move gives up; returns the winner
    #[wasm_bindgen]
    pub fn forfeit(&mut self) -> String {
        self.game.forfeit().to_string()
    }

    /// Restart from the opening position, keeping the scores
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.game.reset();
    }

    #[wasm_bindgen]
    pub fn status(&mut self) -> String {
        self.game.status().to_string()
    }

    #[wasm_bindgen]
    pub fn current_player(&self) -> String {
        self.game.current_player().to_string()
    }

    /// Text diagram of the board
    #[wasm_bindgen]
    pub fn render(&self) -> String {
        self.game.board().to_string()
    }

    // === Private helpers ===

    fn build_state(&mut self) -> JsGameState {
        let status = self.game.status();
        let side = self.game.current_player();
        let board = self.game.board();

        let squares = board
            .squares()
            .map(|(at, piece)| JsSquare {
                x: at.x,
                y: at.y,
                name: at.to_string(),
                piece: piece.map(js_piece),
            })
            .collect();

        JsGameState {
            cols: board.cols(),
            rows: board.rows(),
            squares,
            current_player: side.to_string(),
            status: status.to_string(),
            in_check: board.in_check(side),
            is_game_over: status.is_over(),
            winner: match status {
                GameStatus::Checkmate(loser) => Some(loser.other().to_string()),
                _ => None,
            },
            white_score: self.game.score(Side::White),
            black_score: self.game.score(Side::Black),
        }
    }

    fn legal_moves_at(&mut self, at: Coord) -> Vec<JsMove> {
        self.game
            .moves_from(at)
            .unwrap_or_default()
            .iter()
            .map(js_move)
            .collect()
    }

    fn play(&mut self, from: Coord, to: Coord) -> Result<String, String> {
        let status = self.game.status();
        if status.is_over() {
            return Err(BoardError::GameOver(status).to_string());
        }
        let operation = self
            .game
            .moves_from(from)
            .map_err(|e| e.to_string())?
            .into_iter()
            .find(|op| op.to == to)
            .ok_or_else(|| format!("{from} cannot reach {to}"))?;
        let status = self.game.play(operation).map_err(|e| e.to_string())?;
        Ok(status.to_string())
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

fn build_game(setup: &Setup, kinds: &[JsKind]) -> Result<engine::Game, String> {
    let mut registry = Registry::standard();
    for kind in kinds {
        registry
            .register_script(&kind.name, kind.symbol, kind.royal, &kind.script)
            .map_err(|e: ScriptError| format!("{}: {e}", kind.name))?;
    }
    let board: Board = setup.build(registry).map_err(|e| e.to_string())?;
    Ok(engine::Game::new(board, Side::White))
}

fn js_piece(piece: &Piece) -> JsPiece {
    JsPiece {
        kind: piece.kind().name().to_string(),
        symbol: piece.symbol().to_string(),
        owner: piece.owner().to_string(),
        is_royal: piece.kind().is_royal(),
        operations: piece.operation_count(),
    }
}

fn js_move(operation: &Operation) -> JsMove {
    JsMove {
        from_x: operation.from.x,
        from_y: operation.from.y,
        to_x: operation.to.x,
        to_y: operation.to.y,
        is_capture: operation.is_attack(),
        label: operation.to_string(),
    }
}

#[wasm_bindgen(start)]
pub fn main() {
    web_sys::console::log_1(&"gambit wasm initialized".into());
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::Placement;

    #[test]
    fn test_state_of_new_game() {
        let mut game = Game::new();
        let state = game.build_state();

        assert_eq!(state.squares.len(), 64);
        assert_eq!(state.current_player, "white");
        assert_eq!(state.status, "in progress");
        assert!(!state.is_game_over);

        let e1 = &state.squares[4];
        assert_eq!(e1.name, "e1");
        let king = e1.piece.as_ref().unwrap();
        assert_eq!(king.symbol, "K");
        assert!(king.is_royal);
    }

    #[test]
    fn test_moves_and_play() {
        let mut game = Game::new();
        let moves = game.legal_moves_at(Coord::new(6, 0));
        assert_eq!(moves.len(), 2);
        assert!(moves.iter().all(|m| !m.is_capture));

        // waiting side gets nothing
        assert!(game.legal_moves_at(Coord::new(6, 7)).is_empty());

        assert_eq!(
            game.play(Coord::new(4, 1), Coord::new(4, 3)).as_deref(),
            Ok("in progress")
        );
        assert_eq!(game.current_player(), "black");
        assert!(game.play(Coord::new(4, 6), Coord::new(4, 2)).is_err());
        assert!(game.undo());
        assert_eq!(game.current_player(), "white");
    }

    #[test]
    fn test_custom_game_with_scripted_kind() {
        let mut setup = Setup::empty(6, 6);
        setup.placements = vec![
            Placement::new("king", Side::White, Coord::new(0, 0)),
            Placement::new("king", Side::Black, Coord::new(5, 5)),
            Placement::new("wazir", Side::White, Coord::new(2, 2)),
        ];
        let kinds = vec![JsKind {
            name: "wazir".to_string(),
            symbol: 'W',
            royal: false,
            script: "take-move(1, 0); take-move(0, 1); take-move(-1, 0); take-move(0, -1);"
                .to_string(),
        }];

        let mut game = Game {
            game: build_game(&setup, &kinds).unwrap(),
        };
        assert_eq!(game.legal_moves_at(Coord::new(2, 2)).len(), 4);
        assert!(game.render().contains('W'));

        let broken = vec![JsKind {
            name: "broken".to_string(),
            symbol: 'Z',
            royal: false,
            script: "fly(1, 0);".to_string(),
        }];
        assert!(build_game(&setup, &broken).unwrap_err().starts_with("broken:"));
    }

    #[test]
    fn test_mate_score_and_forfeit() {
        let mut game = Game::new();
        for (from, to) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")] {
            let from: Coord = from.parse().unwrap();
            let to: Coord = to.parse().unwrap();
            game.play(from, to).unwrap();
        }

        let state = game.build_state();
        assert!(state.is_game_over);
        assert_eq!(state.winner.as_deref(), Some("black"));
        assert_eq!((state.white_score, state.black_score), (0, 1));

        // a square without moves still reports the finished game
        assert_eq!(
            game.play(Coord::new(3, 3), Coord::new(3, 4)).unwrap_err(),
            "the game is over: white is checkmated"
        );

        game.reset();
        assert_eq!(game.status(), "in progress");
        assert_eq!(game.forfeit(), "black");
        let state = game.build_state();
        assert_eq!((state.white_score, state.black_score), (0, 3));
        assert_eq!(state.current_player, "white");
    }
}
