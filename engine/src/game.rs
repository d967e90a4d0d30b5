use std::collections::BTreeMap;
use std::fmt;

use movement::Coord;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::board::Board;
use crate::error::BoardError;
use crate::operation::Operation;
use crate::player::{Player, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    InProgress,
    /// The side that has been mated
    Checkmate(Side),
    Stalemate,
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::InProgress => f.write_str("in progress"),
            GameStatus::Checkmate(side) => write!(f, "{side} is checkmated"),
            GameStatus::Stalemate => f.write_str("stalemate"),
        }
    }
}

/// A board plus whose turn it is, and the running score of a match.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    turn: Side,
    start: Board,
    first: Side,
    scores: [u32; 2],
}

impl Game {
    pub fn new(board: Board, first: Side) -> Self {
        Self {
            start: board.clone(),
            first,
            board,
            turn: first,
            scores: [0; 2],
        }
    }

    /// Standard position, white to move.
    pub fn standard() -> Self {
        Self::new(
            Board::standard(Player::white("w"), Player::black("b")),
            Side::White,
        )
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn into_board(self) -> Board {
        self.board
    }

    pub fn current_player(&self) -> Side {
        self.turn
    }

    /// Points won so far: 1 per checkmate delivered, 2 per opponent forfeit.
    pub fn score(&self, side: Side) -> u32 {
        self.scores[side.index()]
    }

    /// Legal operations of the side to move, grouped by origin.
    pub fn menu(&mut self) -> BTreeMap<Coord, Vec<Operation>> {
        self.board.moves_by_origin(self.turn)
    }

    /// Legal operations of the side to move starting on `at`.
    pub fn moves_from(&mut self, at: Coord) -> Result<Vec<Operation>, BoardError> {
        let owned = self.board.get(at).map(|piece| piece.owner()) == Some(self.turn);
        let moves = if owned {
            self.board.legal_moves_at(at)
        } else {
            Vec::new()
        };
        if moves.is_empty() {
            return Err(BoardError::NoLegalMoves(at));
        }
        Ok(moves)
    }

    pub fn status(&mut self) -> GameStatus {
        if !self.board.legal_moves(self.turn).is_empty() {
            GameStatus::InProgress
        } else if self.board.in_check(self.turn) {
            GameStatus::Checkmate(self.turn)
        } else {
            GameStatus::Stalemate
        }
    }

    /// Play a legal operation for the side to move and pass the turn.
    pub fn play(&mut self, operation: Operation) -> Result<GameStatus, BoardError> {
        self.ensure_in_progress()?;

        let legal = self
            .moves_from(operation.from)
            .map_or(false, |moves| moves.contains(&operation));
        if !legal {
            return Err(BoardError::IllegalOperation(operation, self.turn));
        }

        self.board.execute(operation, self.turn);
        self.turn = self.turn.other();

        let status = self.status();
        if let GameStatus::Checkmate(loser) = status {
            self.scores[loser.other().index()] += 1;
        }
        if status.is_over() {
            info!(%status, "game over");
        }
        Ok(status)
    }

    fn ensure_in_progress(&mut self) -> Result<(), BoardError> {
        let status = self.status();
        if status.is_over() {
            return Err(BoardError::GameOver(status));
        }
        Ok(())
    }

    /// Play the legal operation from one square to another, e.g. `("e2", "e4")`.
    pub fn play_notation(&mut self, from: &str, to: &str) -> Result<GameStatus, BoardError> {
        let from: Coord = from.parse()?;
        let to: Coord = to.parse()?;
        self.ensure_in_progress()?;
        let operation = self
            .moves_from(from)?
            .into_iter()
            .find(|op| op.to == to)
            .ok_or(BoardError::IllegalOperation(
                Operation::move_to(from, to),
                self.turn,
            ))?;
        self.play(operation)
    }

    /// Take back the last operation. The side that played it moves again.
    pub fn undo(&mut self) -> bool {
        match self.board.undo() {
            Some(side) => {
                self.turn = side;
                true
            }
            None => false,
        }
    }

    /// The side to move gives up. Its opponent scores 2 and a new round
    /// starts from the opening position; returns the winner.
    pub fn forfeit(&mut self) -> Side {
        let winner = self.turn.other();
        self.scores[winner.index()] += 2;
        info!(%winner, "forfeit");
        self.reset();
        winner
    }

    /// Back to the opening position with the first side to move. Scores are kept.
    pub fn reset(&mut self) {
        self.board = self.start.clone();
        self.turn = self.first;
    }
}
