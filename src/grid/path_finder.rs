//! Depth-first route search over the grid.
//!
//! The search returns the first route found, not the shortest one. Neighbours
//! are expanded in the fixed order of [`NEIGHBOR_ORDER`], which is what breaks
//! ties between alternative routes. Scratch state (visited marks and the path
//! buffer) is allocated per call, so nothing leaks from one search to the next.

use super::{Cell, GridMap};

/// Expansion order as (row, col) offsets: +row, -row, +col, -col.
pub const NEIGHBOR_ORDER: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Search a route from `start` to the map's destination through free cells.
///
/// The returned path excludes `start`; its first element is the first step
/// and its last element is the destination. `start == destination` yields an
/// empty path. `None` means no route exists.
///
/// Iterative, so the depth is bounded by the number of free cells rather than
/// the thread's stack.
pub fn find_path(map: &GridMap, start: Cell) -> Option<Vec<Cell>> {
    let goal = map.destination();
    let start_index = map.index(start)?;
    if start == goal {
        return Some(Vec::new());
    }

    let mut visited = vec![false; map.rows() * map.cols()];
    visited[start_index] = true;

    let mut path: Vec<Cell> = Vec::with_capacity(visited.len());
    // (cell, index of the next neighbour to try)
    let mut stack: Vec<(Cell, usize)> = vec![(start, 0)];

    while let Some(frame) = stack.last_mut() {
        let (cell, next) = *frame;
        if next >= NEIGHBOR_ORDER.len() {
            stack.pop();
            path.pop();
            continue;
        }
        frame.1 += 1;

        let (d_row, d_col) = NEIGHBOR_ORDER[next];
        let Some(candidate) = cell.offset(d_row, d_col) else {
            continue;
        };
        let Some(index) = map.index(candidate) else {
            continue;
        };
        if visited[index] || !map.is_free(candidate) {
            continue;
        }

        visited[index] = true;
        path.push(candidate);
        if candidate == goal {
            tracing::trace!("Route found: {} steps from {}", path.len(), start);
            return Some(path);
        }
        stack.push((candidate, 0));
    }

    None
}
