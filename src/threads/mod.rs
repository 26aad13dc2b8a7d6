//! Worker threads for GridNav.
//!
//! - Refresh thread: pulls cell reports from the map server into the grid
//! - Control thread: plans the next step and drives the actuator

mod control;
mod refresh;

pub use control::{ControlThread, CycleOutcome};
pub use refresh::RefreshThread;

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::actuator::ActuatorSink;
use crate::config::NavConfig;
use crate::error::Result;
use crate::shared::{SessionState, SharedGridMap};
use crate::telemetry::MapFetch;

/// Thread handles for a running session.
pub struct ThreadHandles {
    pub refresh: JoinHandle<()>,
    pub control: JoinHandle<()>,
}

impl ThreadHandles {
    /// True when either worker has exited.
    pub fn any_finished(&self) -> bool {
        self.refresh.is_finished() || self.control.is_finished()
    }
}

/// Spawn both worker threads and return their handles.
pub fn spawn_threads(
    config: &NavConfig,
    shared_map: SharedGridMap,
    shared_state: Arc<SessionState>,
    fetcher: Box<dyn MapFetch>,
    actuator: Box<dyn ActuatorSink>,
) -> Result<ThreadHandles> {
    let mut refresh_thread = RefreshThread::new(
        fetcher,
        shared_map.clone(),
        Arc::clone(&shared_state),
        config.telemetry.places.clone(),
        config.refresh_interval(),
    );
    let mut control_thread = ControlThread::new(
        actuator,
        shared_map,
        shared_state,
        config.control_interval(),
    );

    let refresh = thread::Builder::new()
        .name("refresh".into())
        .spawn(move || refresh_thread.run())?;

    let control = thread::Builder::new()
        .name("control".into())
        .spawn(move || control_thread.run())?;

    Ok(ThreadHandles { refresh, control })
}
