//! Grid map: obstacle matrix, destination and vehicle pose.
//!
//! The map is a fixed-size row-major occupancy matrix. Every cell starts
//! blocked and only becomes traversable once a report marks it free, so an
//! unconfirmed cell is never planned through.
//!
//! Coordinates follow the vehicle convention: the `x` axis is the row index
//! (growing southwards) and the `y` axis is the column index (growing
//! eastwards).

mod path_finder;

pub use path_finder::{NEIGHBOR_ORDER, find_path};

use std::cmp::Ordering;
use std::fmt;

use serde::Deserialize;

use crate::direction::{self, Resolution};
use crate::error::{NavError, Result};

/// Occupancy value of a traversable cell.
pub const FREE: i32 = 0;

/// Occupancy value written for unknown or blocked cells.
pub const BLOCKED: i32 = 1;

/// A (row, column) grid coordinate, 0-indexed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    /// Top-left cell. Also the "no route" sentinel for the next position.
    pub const ORIGIN: Cell = Cell { row: 0, col: 0 };

    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Cell displaced by a signed (row, col) offset, or `None` below zero.
    pub fn offset(&self, d_row: isize, d_col: isize) -> Option<Cell> {
        Some(Cell {
            row: self.row.checked_add_signed(d_row)?,
            col: self.col.checked_add_signed(d_col)?,
        })
    }

    /// True when `other` is one of the four orthogonal neighbours.
    pub fn is_adjacent(&self, other: &Cell) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

impl From<[usize; 2]> for Cell {
    fn from([row, col]: [usize; 2]) -> Self {
        Cell::new(row, col)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Grid axis used when comparing the current and next positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Row index (`x`).
    Row,
    /// Column index (`y`).
    Col,
}

/// Compass facing of the vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Facing after a 90° clockwise turn.
    pub fn clockwise(self) -> Direction {
        Self::ALL[(self as usize + 1) % 4]
    }

    /// Facing after a 90° counter-clockwise turn.
    pub fn counter_clockwise(self) -> Direction {
        Self::ALL[(self as usize + 3) % 4]
    }

    pub fn opposite(self) -> Direction {
        Self::ALL[(self as usize + 2) % 4]
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::North => "NORTH",
            Direction::East => "EAST",
            Direction::South => "SOUTH",
            Direction::West => "WEST",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of recomputing the next position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    /// Current position is the destination; nothing to do.
    Arrived,
    /// First step of the route found by the search.
    Step(Cell),
    /// Search exhausted every branch. The next position holds the sentinel.
    NoRoute,
}

/// Occupancy grid plus the vehicle's navigation state.
#[derive(Clone, Debug)]
pub struct GridMap {
    rows: usize,
    cols: usize,
    matrix: Vec<i32>,
    destination: Cell,
    current_position: Cell,
    next_position: Cell,
    current_direction: Direction,
}

impl GridMap {
    /// Create a fully blocked map.
    ///
    /// Fails if either dimension is zero or if `start`/`destination` lie
    /// outside the grid.
    pub fn new(
        rows: usize,
        cols: usize,
        destination: Cell,
        start: Cell,
        facing: Direction,
    ) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(NavError::Config(format!(
                "grid dimensions must be non-zero, got {}x{}",
                rows, cols
            )));
        }

        let map = Self {
            rows,
            cols,
            matrix: vec![BLOCKED; rows * cols],
            destination,
            current_position: start,
            next_position: start,
            current_direction: facing,
        };
        map.check_bounds(destination)?;
        map.check_bounds(start)?;
        Ok(map)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn destination(&self) -> Cell {
        self.destination
    }

    pub fn current_position(&self) -> Cell {
        self.current_position
    }

    pub fn next_position(&self) -> Cell {
        self.next_position
    }

    /// Row-major index of a cell, `None` when out of bounds.
    pub fn index(&self, cell: Cell) -> Option<usize> {
        (cell.row < self.rows && cell.col < self.cols).then(|| cell.row * self.cols + cell.col)
    }

    fn check_bounds(&self, cell: Cell) -> Result<usize> {
        self.index(cell).ok_or(NavError::OutOfBounds {
            cell,
            rows: self.rows,
            cols: self.cols,
        })
    }

    /// Raw occupancy of a cell.
    pub fn occupancy(&self, cell: Cell) -> Option<i32> {
        self.index(cell).map(|i| self.matrix[i])
    }

    /// True for in-bounds cells confirmed free.
    pub fn is_free(&self, cell: Cell) -> bool {
        self.occupancy(cell) == Some(FREE)
    }

    /// Record remote knowledge for one cell. Last writer wins.
    pub fn set_cell_knowledge(&mut self, cell: Cell, occupancy: i32) -> Result<()> {
        let index = self.check_bounds(cell)?;
        self.matrix[index] = occupancy;
        Ok(())
    }

    /// Mark a whole row free.
    pub fn free_row(&mut self, row: usize) -> Result<()> {
        for col in 0..self.cols {
            self.set_cell_knowledge(Cell::new(row, col), FREE)?;
        }
        Ok(())
    }

    /// Mark a whole column free.
    pub fn free_col(&mut self, col: usize) -> Result<()> {
        for row in 0..self.rows {
            self.set_cell_knowledge(Cell::new(row, col), FREE)?;
        }
        Ok(())
    }

    pub fn current_facing(&self) -> Direction {
        self.current_direction
    }

    pub fn set_facing(&mut self, direction: Direction) {
        self.current_direction = direction;
    }

    /// Compare current and next positions along one axis.
    ///
    /// `Greater` means the current coordinate is larger than the next one,
    /// `Less` means it is smaller.
    pub fn compare_axis(&self, axis: Axis) -> Ordering {
        match axis {
            Axis::Row => self.current_position.row.cmp(&self.next_position.row),
            Axis::Col => self.current_position.col.cmp(&self.next_position.col),
        }
    }

    /// Full route from the current position, first element = first step.
    pub fn find_route(&self) -> Option<Vec<Cell>> {
        find_path(self, self.current_position)
    }

    /// Run the search from the current position and store its first step.
    pub fn recompute_next_position(&mut self) -> Route {
        match self.find_route() {
            Some(path) => match path.first() {
                Some(&step) => {
                    self.next_position = step;
                    Route::Step(step)
                }
                None => {
                    self.next_position = self.current_position;
                    Route::Arrived
                }
            },
            None => {
                tracing::debug!(
                    "Search exhausted from {} to {}",
                    self.current_position,
                    self.destination
                );
                self.next_position = Cell::ORIGIN;
                Route::NoRoute
            }
        }
    }

    /// Re-check the chosen next cell against the current matrix.
    pub fn is_next_position_traversable(&self) -> bool {
        self.is_free(self.next_position)
    }

    /// Resolve the turn toward the next position and commit the new facing.
    ///
    /// Returns `None` (facing untouched) when current and next coincide.
    pub fn resolve_direction(&mut self) -> Option<Resolution> {
        let resolution = direction::resolve(
            self.current_direction,
            self.compare_axis(Axis::Row),
            self.compare_axis(Axis::Col),
        )?;
        self.current_direction = resolution.facing;
        Some(resolution)
    }

    /// Move the vehicle to the planned next position.
    pub fn advance_to_next(&mut self) {
        self.current_position = self.next_position;
    }

    /// The four in-bounds neighbours of the current position.
    pub fn neighbors_of_current(&self) -> Vec<Cell> {
        NEIGHBOR_ORDER
            .iter()
            .filter_map(|&(d_row, d_col)| self.current_position.offset(d_row, d_col))
            .filter(|&cell| self.index(cell).is_some())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Turn;

    /// 5x5 map with row 4 and column 4 free, start (4,4), goal (0,4).
    fn cross_map() -> GridMap {
        let mut map =
            GridMap::new(5, 5, Cell::new(0, 4), Cell::new(4, 4), Direction::East).unwrap();
        map.free_row(4).unwrap();
        map.free_col(4).unwrap();
        map
    }

    #[test]
    fn test_new_map_is_blocked() {
        let map = GridMap::new(3, 4, Cell::new(0, 0), Cell::new(2, 3), Direction::North).unwrap();
        for row in 0..3 {
            for col in 0..4 {
                assert!(!map.is_free(Cell::new(row, col)));
            }
        }
    }

    #[test]
    fn test_new_rejects_out_of_bounds() {
        assert!(matches!(
            GridMap::new(5, 5, Cell::new(5, 0), Cell::ORIGIN, Direction::North),
            Err(NavError::OutOfBounds { .. })
        ));
        assert!(GridMap::new(0, 5, Cell::ORIGIN, Cell::ORIGIN, Direction::North).is_err());
    }

    #[test]
    fn test_set_cell_knowledge() {
        let mut map = cross_map();
        assert!(map.is_free(Cell::new(2, 4)));

        map.set_cell_knowledge(Cell::new(2, 4), 7).unwrap();
        assert_eq!(map.occupancy(Cell::new(2, 4)), Some(7));
        assert!(!map.is_free(Cell::new(2, 4)));

        assert!(map.set_cell_knowledge(Cell::new(9, 9), FREE).is_err());
    }

    #[test]
    fn test_compare_axis() {
        let mut map = cross_map();
        assert_eq!(map.compare_axis(Axis::Row), Ordering::Equal);

        map.recompute_next_position();
        assert_eq!(map.next_position(), Cell::new(3, 4));
        assert_eq!(map.compare_axis(Axis::Row), Ordering::Greater);
        assert_eq!(map.compare_axis(Axis::Col), Ordering::Equal);
    }

    #[test]
    fn test_recompute_next_position() {
        let mut map = cross_map();
        assert_eq!(map.recompute_next_position(), Route::Step(Cell::new(3, 4)));
        assert!(map.is_next_position_traversable());
    }

    #[test]
    fn test_no_route_sets_sentinel() {
        let mut map = cross_map();
        map.set_cell_knowledge(Cell::new(3, 4), BLOCKED).unwrap();

        assert_eq!(map.recompute_next_position(), Route::NoRoute);
        assert_eq!(map.next_position(), Cell::ORIGIN);
        assert!(!map.is_next_position_traversable());
    }

    #[test]
    fn test_report_after_search_blocks_next() {
        let mut map = cross_map();
        assert_eq!(map.recompute_next_position(), Route::Step(Cell::new(3, 4)));

        map.set_cell_knowledge(Cell::new(3, 4), BLOCKED).unwrap();
        assert_eq!(map.next_position(), Cell::new(3, 4));
        assert!(!map.is_next_position_traversable());
    }

    #[test]
    fn test_already_at_destination() {
        let mut map =
            GridMap::new(5, 5, Cell::new(4, 4), Cell::new(4, 4), Direction::West).unwrap();
        assert_eq!(map.recompute_next_position(), Route::Arrived);
        assert_eq!(map.next_position(), map.current_position());
        assert_eq!(map.resolve_direction(), None);
        assert_eq!(map.current_facing(), Direction::West);
    }

    #[test]
    fn test_resolve_direction_commits_facing() {
        let mut map = cross_map();
        map.recompute_next_position();

        let resolution = map.resolve_direction().unwrap();
        assert_eq!(resolution.turn, Turn::Left);
        assert_eq!(resolution.facing, Direction::North);
        assert_eq!(map.current_facing(), Direction::North);
    }

    #[test]
    fn test_neighbors_of_current() {
        let map = cross_map();
        assert_eq!(
            map.neighbors_of_current(),
            vec![Cell::new(3, 4), Cell::new(4, 3)]
        );
    }

    #[test]
    fn test_direction_rotation() {
        assert_eq!(Direction::North.clockwise(), Direction::East);
        assert_eq!(Direction::West.clockwise(), Direction::North);
        assert_eq!(Direction::North.counter_clockwise(), Direction::West);
        assert_eq!(Direction::East.opposite(), Direction::West);
    }

    #[test]
    fn test_cell_offset() {
        assert_eq!(Cell::new(0, 0).offset(-1, 0), None);
        assert_eq!(Cell::new(2, 3).offset(1, -1), Some(Cell::new(3, 2)));
        assert!(Cell::new(2, 3).is_adjacent(&Cell::new(2, 4)));
        assert!(!Cell::new(2, 3).is_adjacent(&Cell::new(3, 4)));
    }
}
