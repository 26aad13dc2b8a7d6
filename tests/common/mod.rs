//! Test utilities for GridNav integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use gridnav::config::NavConfig;
use gridnav::grid::{Cell, Direction, GridMap};
use gridnav::telemetry::{CellReport, MapFetch};
use gridnav::Result;

/// 5x5 cross: row 4 and column 4 free, start (4,4), destination (0,4).
pub fn cross_config() -> NavConfig {
    let mut config = NavConfig::default();
    config.map.free_rows = vec![4];
    config.map.free_cols = vec![4];
    config.map.facing = Direction::East;
    config.timing.refresh_interval_ms = 5;
    config.timing.control_interval_ms = 5;
    config
}

pub fn cross_map() -> GridMap {
    cross_config().build_map().unwrap()
}

/// Walk a path from `start` and check it only uses free 4-neighbour steps.
pub fn assert_valid_path(map: &GridMap, start: Cell, path: &[Cell]) {
    let mut prev = start;
    for cell in path {
        assert!(prev.is_adjacent(cell), "{} -> {} is not a step", prev, cell);
        assert!(map.is_free(*cell), "{} is not free", cell);
        prev = *cell;
    }
    assert_eq!(prev, map.destination());
}

/// Fetcher replaying queued answers, then answering "no data".
#[derive(Clone, Default)]
pub struct ScriptedFetcher {
    answers: Arc<Mutex<VecDeque<Option<CellReport>>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, cell: Cell, occupancy: i32) {
        self.answers
            .lock()
            .push_back(Some(CellReport { cell, occupancy }));
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

impl MapFetch for ScriptedFetcher {
    fn fetch(&mut self, place: &str) -> Result<Option<CellReport>> {
        self.requests.lock().push(place.to_string());
        Ok(self.answers.lock().pop_front().flatten())
    }
}
