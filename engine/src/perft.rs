//! Leaf counts of the legal move tree.

use crate::board::Board;
use crate::player::Side;

/// Number of leaf positions `depth` plies below the current one, `side` to
/// move. The board is restored before returning, turn counters included, so
/// every branch starts from the same turn parity.
pub fn perft(board: &mut Board, side: Side, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = board.legal_moves(side);
    if depth == 1 {
        return moves.len() as u64;
    }

    let counts = board.turn_counts();
    let mut nodes = 0;
    for operation in moves {
        board.execute(operation, side);
        nodes += perft(board, side.other(), depth - 1);
        board.undo();
        board.restore_turn_counts(counts);
    }
    nodes
}

/// Per-move leaf counts at the root, keyed by the operation's text.
pub fn divide(board: &mut Board, side: Side, depth: u32) -> Vec<(String, u64)> {
    let mut counts = Vec::new();
    if depth == 0 {
        return counts;
    }
    let turns = board.turn_counts();
    for operation in board.legal_moves(side) {
        board.execute(operation, side);
        counts.push((operation.to_string(), perft(board, side.other(), depth - 1)));
        board.undo();
        board.restore_turn_counts(turns);
    }
    counts
}
