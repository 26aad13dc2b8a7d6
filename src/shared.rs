//! Shared state for the refresh and control threads.
//!
//! The grid map lives behind a single mutex. [`SharedGridMap`] only exposes
//! whole operations, so a decision that reads the position, the next step and
//! the matrix together always sees one consistent map.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::direction::Resolution;
use crate::error::Result;
use crate::grid::{Cell, Direction, GridMap, Route};

/// Result of one planning pass, taken under a single lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Plan {
    /// Current position is the destination.
    Arrived,
    /// Search found no route; next position holds the sentinel.
    NoRoute,
    /// Next cell stopped being traversable before it could be used.
    Blocked { next: Cell },
    /// Move one cell. The facing in `resolution` is already committed.
    Move {
        from: Cell,
        to: Cell,
        resolution: Resolution,
        previous_facing: Direction,
    },
}

/// Point-in-time copy of the vehicle pose.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapSnapshot {
    pub current: Cell,
    pub next: Cell,
    pub facing: Direction,
    pub destination: Cell,
}

/// Thread-safe handle to the session's grid map.
#[derive(Clone)]
pub struct SharedGridMap {
    inner: Arc<Mutex<GridMap>>,
}

impl SharedGridMap {
    pub fn new(map: GridMap) -> Self {
        Self {
            inner: Arc::new(Mutex::new(map)),
        }
    }

    /// Record remote knowledge for one cell.
    pub fn set_cell_knowledge(&self, cell: Cell, occupancy: i32) -> Result<()> {
        self.inner.lock().set_cell_knowledge(cell, occupancy)
    }

    pub fn occupancy(&self, cell: Cell) -> Option<i32> {
        self.inner.lock().occupancy(cell)
    }

    pub fn current_facing(&self) -> Direction {
        self.inner.lock().current_facing()
    }

    pub fn set_facing(&self, direction: Direction) {
        self.inner.lock().set_facing(direction);
    }

    pub fn snapshot(&self) -> MapSnapshot {
        let map = self.inner.lock();
        MapSnapshot {
            current: map.current_position(),
            next: map.next_position(),
            facing: map.current_facing(),
            destination: map.destination(),
        }
    }

    /// Recompute the next position on its own.
    pub fn recompute_next_position(&self) -> Route {
        self.inner.lock().recompute_next_position()
    }

    /// Full route from the current position.
    pub fn find_route(&self) -> Option<Vec<Cell>> {
        self.inner.lock().find_route()
    }

    /// Neighbours of the current position, for polling.
    pub fn neighbors_of_current(&self) -> Vec<Cell> {
        self.inner.lock().neighbors_of_current()
    }

    /// Search, re-check and resolve the next move in one critical section.
    pub fn plan_step(&self) -> Plan {
        let mut map = self.inner.lock();

        match map.recompute_next_position() {
            Route::Arrived => Plan::Arrived,
            Route::NoRoute => Plan::NoRoute,
            Route::Step(next) => {
                // Search only steps onto free cells and holds the same lock,
                // so this only trips if the search and the check are split.
                if !map.is_next_position_traversable() {
                    return Plan::Blocked { next };
                }
                let from = map.current_position();
                let previous_facing = map.current_facing();
                match map.resolve_direction() {
                    Some(resolution) => Plan::Move {
                        from,
                        to: next,
                        resolution,
                        previous_facing,
                    },
                    // current == next
                    None => Plan::Arrived,
                }
            }
        }
    }

    /// Advance from `from` to `to` if the map still holds that plan.
    pub fn advance(&self, from: Cell, to: Cell) -> bool {
        let mut map = self.inner.lock();
        if map.current_position() != from || map.next_position() != to {
            return false;
        }
        map.advance_to_next();
        true
    }
}

/// Counters reported by the status line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub reports_applied: u64,
    pub fetch_misses: u64,
    pub commands_sent: u64,
    pub send_failures: u64,
    pub no_route_cycles: u64,
    pub moves: u64,
}

/// Cancellation signal and progress counters shared by all threads.
#[derive(Debug, Default)]
pub struct SessionState {
    shutdown: Mutex<bool>,
    wake: Condvar,

    /// Destination reached at least once
    arrived: AtomicBool,

    reports_applied: AtomicU64,
    fetch_misses: AtomicU64,
    commands_sent: AtomicU64,
    send_failures: AtomicU64,
    no_route_cycles: AtomicU64,
    moves: AtomicU64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal shutdown and wake every waiting thread.
    pub fn signal_shutdown(&self) {
        *self.shutdown.lock() = true;
        self.wake.notify_all();
    }

    pub fn should_shutdown(&self) -> bool {
        *self.shutdown.lock()
    }

    /// Sleep for up to `timeout`, returning early on shutdown.
    ///
    /// Returns `true` when shutdown has been signalled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut stopped = self.shutdown.lock();
        while !*stopped {
            if self.wake.wait_until(&mut stopped, deadline).timed_out() {
                break;
            }
        }
        *stopped
    }

    pub fn set_arrived(&self) {
        self.arrived.store(true, Ordering::Release);
    }

    pub fn has_arrived(&self) -> bool {
        self.arrived.load(Ordering::Acquire)
    }

    pub fn record_report(&self) {
        self.reports_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_miss(&self) {
        self.fetch_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_command(&self) {
        self.commands_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_send_failure(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_no_route(&self) {
        self.no_route_cycles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_move(&self) {
        self.moves.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            reports_applied: self.reports_applied.load(Ordering::Relaxed),
            fetch_misses: self.fetch_misses.load(Ordering::Relaxed),
            commands_sent: self.commands_sent.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            no_route_cycles: self.no_route_cycles.load(Ordering::Relaxed),
            moves: self.moves.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Turn;
    use crate::grid::BLOCKED;
    use std::thread;

    fn cross() -> SharedGridMap {
        let mut map =
            GridMap::new(5, 5, Cell::new(0, 4), Cell::new(4, 4), Direction::East).unwrap();
        map.free_row(4).unwrap();
        map.free_col(4).unwrap();
        SharedGridMap::new(map)
    }

    #[test]
    fn test_plan_step_move() {
        let map = cross();
        let plan = map.plan_step();
        assert_eq!(
            plan,
            Plan::Move {
                from: Cell::new(4, 4),
                to: Cell::new(3, 4),
                resolution: Resolution {
                    turn: Turn::Left,
                    facing: Direction::North
                },
                previous_facing: Direction::East,
            }
        );
        assert_eq!(map.current_facing(), Direction::North);
        assert!(map.advance(Cell::new(4, 4), Cell::new(3, 4)));
        assert_eq!(map.snapshot().current, Cell::new(3, 4));
    }

    #[test]
    fn test_plan_step_no_route() {
        let map = cross();
        map.set_cell_knowledge(Cell::new(2, 4), BLOCKED).unwrap();
        assert_eq!(map.plan_step(), Plan::NoRoute);
        assert_eq!(map.snapshot().next, Cell::ORIGIN);
        assert_eq!(map.current_facing(), Direction::East);
    }

    #[test]
    fn test_advance_rejects_stale_plan() {
        let map = cross();
        map.plan_step();
        assert!(!map.advance(Cell::new(4, 4), Cell::new(4, 3)));
        assert_eq!(map.snapshot().current, Cell::new(4, 4));
    }

    #[test]
    fn test_wait_timeout_elapses() {
        let state = SessionState::new();
        let start = Instant::now();
        assert!(!state.wait_timeout(Duration::from_millis(30)));
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_wait_timeout_wakes_on_shutdown() {
        let state = Arc::new(SessionState::new());
        let waiter = Arc::clone(&state);
        let start = Instant::now();
        let handle = thread::spawn(move || waiter.wait_timeout(Duration::from_secs(30)));

        thread::sleep(Duration::from_millis(20));
        state.signal_shutdown();

        assert!(handle.join().unwrap());
        assert!(start.elapsed() < Duration::from_secs(10));
        assert!(state.should_shutdown());
    }

    #[test]
    fn test_stats_counters() {
        let state = SessionState::new();
        state.record_command();
        state.record_command();
        state.record_no_route();
        let stats = state.stats();
        assert_eq!(stats.commands_sent, 2);
        assert_eq!(stats.no_route_cycles, 1);
        assert_eq!(stats.moves, 0);
    }
}
