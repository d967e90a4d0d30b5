use engine::{Board, Game, GameStatus, OperationKind, PieceKind, Player, Side};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

const SIDES: [Side; 2] = [Side::White, Side::Black];

/// Grid and piece records agree with each other.
fn assert_consistent(board: &Board) {
    for side in SIDES {
        for (id, piece) in board.pieces(side) {
            match piece.location() {
                Some(at) => {
                    assert!(!piece.is_captured(), "{piece} has a square but is captured");
                    assert_eq!(board.piece_at(at), Some(id), "{piece} is not on its square");
                }
                None => assert!(piece.is_captured(), "{piece} is off the grid"),
            }
        }
    }
    for (at, occupant) in board.squares() {
        if let Some(piece) = occupant {
            assert_eq!(piece.location(), Some(at));
        }
    }
}

fn assert_moves_well_formed(board: &mut Board, side: Side) {
    for op in board.legal_moves(side) {
        assert!(board.in_bounds(op.to), "{op} leaves the board");
        assert_eq!(board.get(op.from).map(|p| p.owner()), Some(side));
        match op.kind {
            OperationKind::Move => assert!(board.get(op.to).is_none(), "{op} lands on a piece"),
            OperationKind::Attack => assert_eq!(
                board.get(op.to).map(|p| p.owner()),
                Some(side.other()),
                "{op} does not land on an enemy"
            ),
        }
    }
}

fn assert_check_matches_raw_attacks(board: &Board, side: Side) {
    let king_square = board
        .player(side)
        .king()
        .and_then(|king| board.piece(king).location());
    let attacked = king_square.is_some_and(|target| {
        board
            .raw_moves(side.other())
            .iter()
            .any(|op| op.is_attack() && op.to == target)
    });
    assert_eq!(board.in_check(side), attacked);
}

fn assert_round_trips(board: &mut Board, side: Side) {
    let before = board.clone();
    for op in board.legal_moves(side) {
        board.execute(op, side);
        assert!(!board.in_check(side), "{op} left {side} in check");
        board.undo();
        assert_eq!(*board, before, "{op} did not reverse cleanly");
    }
}

/// Random legal game from the standard position, checking every law on the way.
fn playout(seed: u64, plies: usize) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut game = Game::standard();
    let start = game.board().clone();
    let mut played = 0;

    for _ in 0..plies {
        let side = game.current_player();
        let mut board = game.board().clone();

        assert_consistent(&board);
        assert_moves_well_formed(&mut board, side);
        assert_check_matches_raw_attacks(&board, side);
        assert_round_trips(&mut board, side);

        let moves = board.legal_moves(side);
        let in_check = board.in_check(side);
        let status = game.status();
        match (moves.is_empty(), in_check) {
            (true, true) => assert_eq!(status, GameStatus::Checkmate(side)),
            (true, false) => assert_eq!(status, GameStatus::Stalemate),
            (false, _) => assert_eq!(status, GameStatus::InProgress),
        }
        if status.is_over() {
            break;
        }

        let op = *moves.choose(&mut rng).unwrap();
        let mover = game.board().player(side).turn_count();
        let waiter = game.board().player(side.other()).turn_count();

        game.play(op).unwrap();
        played += 1;

        assert_eq!(game.board().player(side).turn_count(), mover + 1);
        assert_eq!(game.board().player(side.other()).turn_count(), waiter);
    }

    for _ in 0..played {
        assert!(game.undo());
    }
    assert!(!game.undo());
    assert_eq!(game.current_player(), Side::White);
    assert_eq!(*game.board(), start);
}

#[test]
fn random_games_obey_board_laws() {
    for seed in 0..6 {
        playout(seed, 40);
    }
}

#[test]
fn laws_hold_with_fairy_pieces() {
    let mut board = Board::standard(Player::white("w"), Player::black("b"));
    board.place(PieceKind::Artillery, Side::White, "d4".parse().unwrap()).unwrap();
    board.place(PieceKind::Archer, Side::Black, "e5".parse().unwrap()).unwrap();
    board.place(PieceKind::Artillery, Side::Black, "b5".parse().unwrap()).unwrap();

    let mut rng = StdRng::seed_from_u64(7);
    let mut side = Side::White;
    for _ in 0..30 {
        assert_consistent(&board);
        assert_moves_well_formed(&mut board, side);
        assert_check_matches_raw_attacks(&board, side);
        assert_round_trips(&mut board, side);

        let moves = board.legal_moves(side);
        let Some(&op) = moves.choose(&mut rng) else {
            break;
        };
        board.execute(op, side);
        side = side.other();
    }
}

#[test]
fn turn_counts_survive_undo() {
    let mut board = Board::standard(Player::white("w"), Player::black("b"));
    let op = board.legal_moves(Side::White)[0];

    board.execute(op, Side::White);
    board.undo();
    board.execute(op, Side::White);

    assert_eq!(board.player(Side::White).turn_count(), 3);
    assert_eq!(board.player(Side::Black).turn_count(), 1);
}
