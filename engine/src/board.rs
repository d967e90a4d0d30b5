use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use movement::{file_letters, Coord, Occupancy, Surface};
use tracing::{debug, warn};

use crate::error::BoardError;
use crate::kinds::{PieceKind, PieceType, Registry};
use crate::operation::{Operation, OperationKind};
use crate::piece::{Piece, PieceId};
use crate::player::{Player, Side};

/// Back rank of the standard position, file a to h.
pub const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// Largest number of squares a board may have.
pub const MAX_CELLS: usize = 1 << 20;

/// A rectangular board with two players and an undo history.
///
/// Pieces live in an arena and are never removed from it; the grid and the
/// player rosters refer to them by [`PieceId`].
#[derive(Debug, Clone)]
pub struct Board {
    cols: i32,
    rows: i32,
    cells: Vec<Option<PieceId>>,
    pieces: Vec<Piece>,
    players: [Player; 2],
    history: Vec<(Operation, Side)>,
    registry: Registry,
}

impl Board {
    /// An empty board using the built-in piece types.
    pub fn new(cols: i32, rows: i32, white: Player, black: Player) -> Self {
        Self::with_registry(cols, rows, white, black, Registry::standard())
    }

    /// An empty board whose named placements resolve through `registry`.
    ///
    /// Panics on unsupported dimensions or players on the wrong sides; see
    /// [`Board::try_with_registry`].
    pub fn with_registry(
        cols: i32,
        rows: i32,
        white: Player,
        black: Player,
        registry: Registry,
    ) -> Self {
        match Self::try_with_registry(cols, rows, white, black, registry) {
            Ok(board) => board,
            Err(err) => panic!("{err}"),
        }
    }

    /// Like [`Board::with_registry`], but reports a board that is empty or
    /// larger than [`MAX_CELLS`] as [`BoardError::Dimensions`].
    pub fn try_with_registry(
        cols: i32,
        rows: i32,
        white: Player,
        black: Player,
        registry: Registry,
    ) -> Result<Self, BoardError> {
        assert_eq!(white.side(), Side::White, "first player must be white");
        assert_eq!(black.side(), Side::Black, "second player must be black");

        let cells = (cols > 0 && rows > 0)
            .then(|| cols.checked_mul(rows))
            .flatten()
            .and_then(|n| usize::try_from(n).ok())
            .filter(|&n| n <= MAX_CELLS)
            .ok_or(BoardError::Dimensions { cols, rows })?;

        Ok(Self {
            cols,
            rows,
            cells: vec![None; cells],
            pieces: Vec::new(),
            players: [white, black],
            history: Vec::new(),
            registry,
        })
    }

    /// The usual 8x8 starting position.
    pub fn standard(white: Player, black: Player) -> Self {
        let mut board = Self::new(8, 8, white, black);
        for (side, back, front) in [(Side::White, 0, 1), (Side::Black, 7, 6)] {
            for (x, kind) in (0..).zip(BACK_RANK) {
                board.standard_place(kind, side, Coord::new(x, back));
                board.standard_place(PieceKind::Pawn, side, Coord::new(x, front));
            }
        }
        board
    }

    fn standard_place(&mut self, kind: PieceKind, side: Side, at: Coord) {
        let kind = self.registry.kind(kind);
        self.insert(kind, side, at);
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn player(&self, side: Side) -> &Player {
        &self.players[side.index()]
    }

    pub fn in_bounds(&self, at: Coord) -> bool {
        at.x >= 0 && at.x < self.cols && at.y >= 0 && at.y < self.rows
    }

    fn index(&self, at: Coord) -> Option<usize> {
        self.in_bounds(at)
            .then(|| (at.y * self.cols + at.x) as usize)
    }

    /// Place a new piece. Royal kinds become the owner's king.
    pub fn add_piece(
        &mut self,
        kind: Arc<PieceType>,
        side: Side,
        at: Coord,
    ) -> Result<PieceId, BoardError> {
        let index = self.index(at).ok_or(BoardError::OutOfBounds {
            at,
            cols: self.cols,
            rows: self.rows,
        })?;
        if self.cells[index].is_some() {
            return Err(BoardError::Occupied(at));
        }
        Ok(self.insert(kind, side, at))
    }

    /// Place a built-in kind.
    pub fn place(&mut self, kind: PieceKind, side: Side, at: Coord) -> Result<PieceId, BoardError> {
        let kind = self.registry.kind(kind);
        self.add_piece(kind, side, at)
    }

    /// Place a kind looked up by name in the board's registry.
    pub fn place_named(&mut self, name: &str, side: Side, at: Coord) -> Result<PieceId, BoardError> {
        let kind = self
            .registry
            .get(name)
            .ok_or_else(|| BoardError::UnknownKind(name.to_string()))?;
        self.add_piece(kind, side, at)
    }

    fn insert(&mut self, kind: Arc<PieceType>, side: Side, at: Coord) -> PieceId {
        let id = PieceId(self.pieces.len());
        let royal = kind.is_royal();
        self.pieces.push(Piece::new(kind, side, at));
        self.put(at, id);
        self.players[side.index()].register(id, royal);
        id
    }

    /// The piece on `at`, if any. Off-board squares are simply empty.
    pub fn get(&self, at: Coord) -> Option<&Piece> {
        self.piece_at(at).map(|id| &self.pieces[id.0])
    }

    pub fn piece_at(&self, at: Coord) -> Option<PieceId> {
        self.index(at).and_then(|index| self.cells[index])
    }

    pub fn piece(&self, id: PieceId) -> &Piece {
        &self.pieces[id.0]
    }

    pub(crate) fn piece_mut(&mut self, id: PieceId) -> &mut Piece {
        &mut self.pieces[id.0]
    }

    /// Roster of `side` in placement order, captured pieces included.
    pub fn pieces(&self, side: Side) -> impl Iterator<Item = (PieceId, &Piece)> + '_ {
        self.player(side)
            .pieces()
            .iter()
            .map(move |&id| (id, &self.pieces[id.0]))
    }

    /// Every cell from a1 rank by rank, with its occupant.
    pub fn squares(&self) -> impl Iterator<Item = (Coord, Option<&Piece>)> + '_ {
        let cols = self.cols;
        self.cells.iter().enumerate().map(move |(index, cell)| {
            let index = index as i32;
            let at = Coord::new(index % cols, index / cols);
            (at, cell.map(|id| &self.pieces[id.0]))
        })
    }

    pub fn history(&self) -> &[(Operation, Side)] {
        &self.history
    }

    /// Take the piece off `at`, leaving the cell empty.
    pub(crate) fn lift(&mut self, at: Coord) -> Option<PieceId> {
        let index = self
            .index(at)
            .unwrap_or_else(|| panic!("{at} is off the board"));
        self.cells[index].take()
    }

    /// Put `id` on `at`, returning whatever was there.
    pub(crate) fn put(&mut self, at: Coord, id: PieceId) -> Option<PieceId> {
        let index = self
            .index(at)
            .unwrap_or_else(|| panic!("{at} is off the board"));
        self.cells[index].replace(id)
    }

    /// Operations of `side`'s pieces in roster order, ignoring checks.
    pub fn raw_moves(&self, side: Side) -> Vec<Operation> {
        let mut operations = Vec::new();
        for (id, piece) in self.pieces(side) {
            if let Some(origin) = piece.location() {
                operations.extend(piece.kind().raw_moves(self, origin, id));
            }
        }
        operations
    }

    /// Operations of `side`, optionally dropping those that expose its king.
    pub fn generate_moves(&mut self, side: Side, filter_checks: bool) -> Vec<Operation> {
        if !filter_checks {
            return self.raw_moves(side);
        }

        let roster = self.player(side).pieces().to_vec();
        let mut operations = Vec::new();
        for id in roster {
            let piece = self.piece(id);
            let Some(origin) = piece.location() else {
                continue;
            };
            let kind = Arc::clone(piece.kind());
            operations.extend(kind.generate(self, origin, id, true));
        }
        operations
    }

    pub fn legal_moves(&mut self, side: Side) -> Vec<Operation> {
        self.generate_moves(side, true)
    }

    /// Legal operations of whatever piece stands on `at`.
    pub fn legal_moves_at(&mut self, at: Coord) -> Vec<Operation> {
        let Some(id) = self.piece_at(at) else {
            return Vec::new();
        };
        let kind = Arc::clone(self.piece(id).kind());
        kind.generate(self, at, id, true)
    }

    /// Legal operations of `side` grouped by origin square.
    pub fn moves_by_origin(&mut self, side: Side) -> BTreeMap<Coord, Vec<Operation>> {
        let mut menu: BTreeMap<Coord, Vec<Operation>> = BTreeMap::new();
        for operation in self.legal_moves(side) {
            menu.entry(operation.from).or_default().push(operation);
        }
        menu
    }

    /// Whether any raw operation of the opponent attacks `side`'s king.
    pub fn in_check(&self, side: Side) -> bool {
        let Some(king) = self.player(side).king() else {
            return false;
        };
        let Some(target) = self.piece(king).location() else {
            return false;
        };

        self.pieces(side.other()).any(|(id, piece)| {
            piece.location().is_some_and(|origin| {
                piece
                    .kind()
                    .raw_moves(self, origin, id)
                    .iter()
                    .any(|op| op.kind == OperationKind::Attack && op.to == target)
            })
        })
    }

    /// Apply `operation` for `side` and record it for undo.
    ///
    /// Legality is the caller's business. Panics if the origin does not
    /// hold a piece of `side` or the destination is off the board.
    pub fn execute(&mut self, mut operation: Operation, side: Side) {
        let owner = self.get(operation.from).map(Piece::owner);
        assert_eq!(
            owner,
            Some(side),
            "{operation} does not start on a {side} piece"
        );
        assert!(
            self.in_bounds(operation.to),
            "{operation} leaves the board"
        );

        self.players[side.index()].increment();
        operation.apply(self);
        debug!(%operation, %side, "executed");
        self.history.push((operation, side));
    }

    /// Reverse the last executed operation, returning who played it.
    pub fn undo(&mut self) -> Option<Side> {
        let Some((mut operation, side)) = self.history.pop() else {
            warn!("undo with empty history");
            return None;
        };
        operation.reverse(self);
        debug!(%operation, %side, "undone");
        Some(side)
    }

    /// Turn counters of white and black, for callers that search and must
    /// leave the counters as they found them.
    pub(crate) fn turn_counts(&self) -> [u32; 2] {
        [self.players[0].turn_count(), self.players[1].turn_count()]
    }

    pub(crate) fn restore_turn_counts(&mut self, counts: [u32; 2]) {
        for (player, count) in self.players.iter_mut().zip(counts) {
            player.set_turn_count(count);
        }
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.cols == other.cols
            && self.rows == other.rows
            && self
                .cells
                .iter()
                .zip(&other.cells)
                .all(|(mine, theirs)| match (mine, theirs) {
                    (None, None) => true,
                    (Some(a), Some(b)) => self.pieces[a.0] == other.pieces[b.0],
                    _ => false,
                })
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.rows.to_string().len();
        for y in (0..self.rows).rev() {
            write!(f, "{:>width$}", y + 1)?;
            for x in 0..self.cols {
                let symbol = self.get(Coord::new(x, y)).map_or('.', Piece::symbol);
                write!(f, " {symbol}")?;
            }
            writeln!(f)?;
        }
        write!(f, "{:width$}", "")?;
        for x in 0..self.cols {
            write!(f, " {}", file_letters(x))?;
        }
        Ok(())
    }
}

/// One piece's view of the board, handed to its movement rules.
pub(crate) struct PieceView<'a> {
    board: &'a Board,
    origin: Coord,
    piece: &'a Piece,
}

impl<'a> PieceView<'a> {
    pub(crate) fn new(board: &'a Board, origin: Coord, piece: &'a Piece) -> Self {
        Self {
            board,
            origin,
            piece,
        }
    }
}

impl Surface for PieceView<'_> {
    fn origin(&self) -> Coord {
        self.origin
    }

    fn in_bounds(&self, at: Coord) -> bool {
        self.board.in_bounds(at)
    }

    fn occupancy(&self, at: Coord) -> Occupancy {
        match self.board.get(at) {
            None => Occupancy::Empty,
            Some(other) if other.owner() == self.piece.owner() => Occupancy::Friendly,
            Some(_) => Occupancy::Enemy,
        }
    }

    fn orient(&self, direction: Coord) -> Coord {
        self.board.player(self.piece.owner()).orient(direction)
    }

    fn operation_count(&self) -> u32 {
        self.piece.operation_count()
    }

    fn turn_count(&self) -> u32 {
        self.board.player(self.piece.owner()).turn_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(text: &str) -> Coord {
        text.parse().unwrap()
    }

    fn standard() -> Board {
        Board::standard(Player::white("w"), Player::black("b"))
    }

    #[test]
    fn test_standard_layout() {
        let board = standard();
        assert_eq!(board.get(at("d1")).unwrap().kind().name(), "queen");
        assert_eq!(board.get(at("e8")).unwrap().kind().name(), "king");
        assert_eq!(board.get(at("e8")).unwrap().owner(), Side::Black);
        assert_eq!(board.get(at("c7")).unwrap().kind().name(), "pawn");
        assert!(board.get(at("e4")).is_none());
        assert_eq!(board.pieces(Side::White).count(), 16);
        assert!(board.player(Side::White).king().is_some());
        assert_eq!(board.squares().count(), 64);
        assert_eq!(board.squares().filter(|(_, p)| p.is_some()).count(), 32);
    }

    #[test]
    fn test_dimensions() {
        let board = |cols, rows| {
            Board::try_with_registry(
                cols,
                rows,
                Player::white("w"),
                Player::black("b"),
                Registry::standard(),
            )
        };
        assert_eq!(board(1024, 1024).unwrap().squares().count(), MAX_CELLS);
        for (cols, rows) in [(0, 8), (8, -1), (1025, 1024), (70_000, 70_000), (i32::MAX, 2)] {
            assert_eq!(
                board(cols, rows).unwrap_err(),
                BoardError::Dimensions { cols, rows }
            );
        }
    }

    #[test]
    #[should_panic(expected = "unsupported board size 0x3")]
    fn test_with_registry_panics_on_empty_board() {
        Board::new(0, 3, Player::white("w"), Player::black("b"));
    }

    #[test]
    fn test_get_never_panics() {
        let board = standard();
        assert!(board.get(Coord::new(-1, 0)).is_none());
        assert!(board.get(Coord::new(8, 3)).is_none());
        assert!(board.get(Coord::new(i32::MAX, i32::MIN)).is_none());
        assert!(!board.in_bounds(Coord::new(0, 8)));
        assert!(board.in_bounds(Coord::new(7, 7)));
    }

    #[test]
    fn test_add_piece_rejections() {
        let mut board = Board::new(5, 3, Player::white("w"), Player::black("b"));
        board.place(PieceKind::Rook, Side::White, at("e3")).unwrap();

        assert_eq!(
            board.place(PieceKind::Rook, Side::Black, at("e3")),
            Err(BoardError::Occupied(at("e3")))
        );
        assert!(matches!(
            board.place(PieceKind::Rook, Side::Black, at("f1")),
            Err(BoardError::OutOfBounds { .. })
        ));
        assert_eq!(
            board.place_named("dragon", Side::Black, at("a1")),
            Err(BoardError::UnknownKind("dragon".to_string()))
        );
    }

    #[test]
    fn test_opening_move_count() {
        let mut board = standard();
        assert_eq!(board.legal_moves(Side::White).len(), 20);
        assert_eq!(board.legal_moves(Side::Black).len(), 20);
        assert!(!board.in_check(Side::White));
    }

    #[test]
    fn test_moves_by_origin() {
        let mut board = standard();
        let menu = board.moves_by_origin(Side::White);
        assert_eq!(menu.len(), 10);
        assert_eq!(menu[&at("g1")].len(), 2);
        assert!(!menu.contains_key(&at("a1")));
    }

    #[test]
    fn test_execute_and_undo() {
        let mut board = standard();
        let before = board.clone();

        board.execute(Operation::move_to(at("e2"), at("e4")), Side::White);
        assert_eq!(board.player(Side::White).turn_count(), 2);
        assert_eq!(board.player(Side::Black).turn_count(), 1);
        assert_eq!(board.history().len(), 1);

        assert_eq!(board.undo(), Some(Side::White));
        assert_eq!(board, before);
        assert_eq!(board.player(Side::White).turn_count(), 2);
        assert_eq!(board.undo(), None);
    }

    #[test]
    #[should_panic(expected = "does not start on a white piece")]
    fn test_execute_wrong_owner_panics() {
        let mut board = standard();
        board.execute(Operation::move_to(at("e7"), at("e5")), Side::White);
    }

    #[test]
    fn test_no_king_never_in_check() {
        let mut board = Board::new(8, 8, Player::white("w"), Player::black("b"));
        board.place(PieceKind::Rook, Side::White, at("a1")).unwrap();
        board.place(PieceKind::Queen, Side::Black, at("a8")).unwrap();

        assert!(!board.in_check(Side::White));
        assert_eq!(board.legal_moves(Side::White).len(), 14);
    }

    #[test]
    fn test_display() {
        let text = standard().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "8 r n b q k b n r");
        assert_eq!(lines[4], "4 . . . . . . . .");
        assert_eq!(lines[7], "1 R N B Q K B N R");
        assert_eq!(lines[8], "  a b c d e f g h");
    }

    #[test]
    fn test_equality_tracks_piece_state() {
        let mut board = standard();
        let before = board.clone();
        board.execute(Operation::move_to(at("g1"), at("f3")), Side::White);
        board.execute(Operation::move_to(at("f3"), at("g1")), Side::White);

        // same squares, but the knight has moved twice
        assert_ne!(board, before);
    }
}
