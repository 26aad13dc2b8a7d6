//! Refresh thread: remote map knowledge into the shared grid.
//!
//! Each cycle fetches a report for every polled place and applies the ones
//! that arrive. A timeout or error only skips that place for the cycle.

use std::sync::Arc;
use std::time::Duration;

use crate::shared::{SessionState, SharedGridMap};
use crate::telemetry::{MapFetch, place_name};

/// Refresh thread state and logic.
pub struct RefreshThread {
    fetcher: Box<dyn MapFetch>,
    shared_map: SharedGridMap,
    shared_state: Arc<SessionState>,
    /// Fixed places to poll; empty polls the current cell's neighbours
    places: Vec<String>,
    interval: Duration,
}

impl RefreshThread {
    pub fn new(
        fetcher: Box<dyn MapFetch>,
        shared_map: SharedGridMap,
        shared_state: Arc<SessionState>,
        places: Vec<String>,
        interval: Duration,
    ) -> Self {
        Self {
            fetcher,
            shared_map,
            shared_state,
            places,
            interval,
        }
    }

    /// Run the refresh loop until shutdown.
    pub fn run(&mut self) {
        tracing::info!("Refresh thread started");

        while !self.shared_state.should_shutdown() {
            self.cycle();
            if self.shared_state.wait_timeout(self.interval) {
                break;
            }
        }

        tracing::info!("Refresh thread exited");
    }

    /// Places polled this cycle.
    fn places_to_poll(&self) -> Vec<String> {
        if self.places.is_empty() {
            self.shared_map
                .neighbors_of_current()
                .into_iter()
                .map(place_name)
                .collect()
        } else {
            self.places.clone()
        }
    }

    /// Fetch and apply one round of reports. Returns how many were applied.
    pub fn cycle(&mut self) -> usize {
        let mut applied = 0;

        for place in self.places_to_poll() {
            if self.shared_state.should_shutdown() {
                break;
            }

            match self.fetcher.fetch(&place) {
                Ok(Some(report)) => {
                    match self
                        .shared_map
                        .set_cell_knowledge(report.cell, report.occupancy)
                    {
                        Ok(()) => {
                            tracing::debug!(
                                "Cell {} <- {} (from {})",
                                report.cell,
                                report.occupancy,
                                place
                            );
                            self.shared_state.record_report();
                            applied += 1;
                        }
                        Err(e) => {
                            tracing::warn!("Discarding report from {}: {}", place, e);
                            self.shared_state.record_fetch_miss();
                        }
                    }
                }
                Ok(None) => {
                    tracing::trace!("No data for {}", place);
                    self.shared_state.record_fetch_miss();
                }
                Err(e) => {
                    tracing::warn!("Fetch for {} failed: {}", place, e);
                    self.shared_state.record_fetch_miss();
                }
            }
        }

        applied
    }
}
