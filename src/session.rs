//! Session boundary: build the map, start both workers, tear them down.

use std::sync::Arc;

use crate::actuator::ActuatorSink;
use crate::config::NavConfig;
use crate::error::Result;
use crate::shared::{SessionState, SharedGridMap};
use crate::telemetry::MapFetch;
use crate::threads::{ThreadHandles, spawn_threads};

/// A running navigation session.
///
/// Dropping the session signals shutdown and joins both threads, which in
/// turn drops the fetcher and the actuator.
pub struct Session {
    shared_map: SharedGridMap,
    shared_state: Arc<SessionState>,
    handles: Option<ThreadHandles>,
}

impl Session {
    /// Build the grid from `config` and start the refresh and control threads.
    pub fn start(
        config: &NavConfig,
        fetcher: Box<dyn MapFetch>,
        actuator: Box<dyn ActuatorSink>,
    ) -> Result<Self> {
        config.validate()?;
        let map = config.build_map()?;
        tracing::info!(
            "Session: {}x{} grid, start {}, destination {}, facing {}",
            map.rows(),
            map.cols(),
            map.current_position(),
            map.destination(),
            map.current_facing()
        );

        let shared_map = SharedGridMap::new(map);
        let shared_state = Arc::new(SessionState::new());
        let handles = spawn_threads(
            config,
            shared_map.clone(),
            Arc::clone(&shared_state),
            fetcher,
            actuator,
        )?;

        Ok(Self {
            shared_map,
            shared_state,
            handles: Some(handles),
        })
    }

    pub fn map(&self) -> &SharedGridMap {
        &self.shared_map
    }

    pub fn state(&self) -> &Arc<SessionState> {
        &self.shared_state
    }

    /// True while both workers are alive.
    pub fn is_running(&self) -> bool {
        self.handles.as_ref().is_some_and(|h| !h.any_finished())
    }

    /// Signal shutdown and wait for both threads.
    pub fn shutdown(&mut self) {
        let Some(handles) = self.handles.take() else {
            return;
        };

        self.shared_state.signal_shutdown();
        tracing::info!("Waiting for threads to finish...");

        if let Err(e) = handles.refresh.join() {
            tracing::error!("Refresh thread panicked: {:?}", e);
        }
        if let Err(e) = handles.control.join() {
            tracing::error!("Control thread panicked: {:?}", e);
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}
