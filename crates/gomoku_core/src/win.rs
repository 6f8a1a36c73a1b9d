//! Five-in-a-row detection.

use crate::board::Board;
use crate::types::{Cell, Symbol};
use tracing::instrument;

/// The four axes a run can lie on, in check order.
const AXES: [(i64, i64); 4] = [
    (0, 1),  // horizontal
    (1, 0),  // vertical
    (1, 1),  // diagonal \
    (1, -1), // diagonal /
];

/// Run length that ends the match.
const WIN_LENGTH: usize = 5;

/// Scans the four axes through the stone just placed at `(x, y)`.
///
/// Walks outward from the seed cell in both directions of each axis,
/// accumulating the run of same-symbol stones. The first axis whose run
/// reaches five returns its cells in contiguous geometric order, seed
/// included. Pure: the board is never mutated, so repeated calls agree.
#[instrument(skip(board))]
pub fn check_win(board: &Board, x: usize, y: usize, symbol: Symbol) -> Option<Vec<(usize, usize)>> {
    for (dx, dy) in AXES {
        let mut run = Vec::new();

        // Walk the negative direction first, then reverse, so the final
        // run reads in geometric order along the axis.
        let (mut i, mut j) = (x as i64 - dx, y as i64 - dy);
        while occupied_by(board, i, j, symbol) {
            run.push((i as usize, j as usize));
            i -= dx;
            j -= dy;
        }
        run.reverse();

        run.push((x, y));

        let (mut i, mut j) = (x as i64 + dx, y as i64 + dy);
        while occupied_by(board, i, j, symbol) {
            run.push((i as usize, j as usize));
            i += dx;
            j += dy;
        }

        if run.len() >= WIN_LENGTH {
            return Some(run);
        }
    }

    None
}

/// Bounds-checked occupancy test for signed scan coordinates.
fn occupied_by(board: &Board, x: i64, y: i64, symbol: Symbol) -> bool {
    if !Board::contains(x, y) {
        return false;
    }
    matches!(
        board.get(x as usize, y as usize),
        Some(Cell::Occupied(s)) if s == symbol
    )
}
