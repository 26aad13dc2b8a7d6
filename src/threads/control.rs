//! Control thread: route planning and actuator commands.
//!
//! Each cycle plans under the map lock, releases it, then sends the turn (if
//! any) followed by go-straight. The position only advances once both
//! commands were sent. A failed turn also rolls the committed facing back.

use std::sync::Arc;
use std::time::Duration;

use crate::actuator::{ActuatorCommand, ActuatorSink};
use crate::error::Result;
use crate::grid::{Cell, Direction};
use crate::shared::{Plan, SessionState, SharedGridMap};

/// What one control cycle did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Reached the destination this cycle; stop was issued.
    Arrived,
    /// Already at the destination; nothing sent.
    Idle,
    /// No route exists; retry next cycle.
    NoRoute,
    /// Planned cell was not traversable at check time.
    Blocked,
    /// Moved one cell.
    Moved { to: Cell, facing: Direction },
    /// A command was not sent; position unchanged.
    SendFailed { command: ActuatorCommand },
}

/// Control thread state and logic.
pub struct ControlThread {
    actuator: Box<dyn ActuatorSink>,
    shared_map: SharedGridMap,
    shared_state: Arc<SessionState>,
    interval: Duration,
    stop_sent: bool,
}

impl ControlThread {
    pub fn new(
        actuator: Box<dyn ActuatorSink>,
        shared_map: SharedGridMap,
        shared_state: Arc<SessionState>,
        interval: Duration,
    ) -> Self {
        Self {
            actuator,
            shared_map,
            shared_state,
            interval,
            stop_sent: false,
        }
    }

    /// Run the control loop until shutdown.
    pub fn run(&mut self) {
        tracing::info!("Control thread started");
        if !self.actuator.is_ready() {
            tracing::warn!("Actuator not ready; commands will be dropped until it is");
        }

        while !self.shared_state.should_shutdown() {
            self.cycle();
            if self.shared_state.wait_timeout(self.interval) {
                break;
            }
        }

        tracing::info!("Control thread shutting down");
        if let Err(e) = self.actuator.send(ActuatorCommand::Stop) {
            tracing::warn!("Failed to send stop on shutdown: {}", e);
        }
        tracing::info!("Control thread exited");
    }

    /// Plan and execute one step.
    pub fn cycle(&mut self) -> CycleOutcome {
        match self.shared_map.plan_step() {
            Plan::Arrived => self.arrive(),
            Plan::NoRoute => {
                self.shared_state.record_no_route();
                tracing::warn!("No route to destination, retrying next cycle");
                CycleOutcome::NoRoute
            }
            Plan::Blocked { next } => {
                tracing::warn!("Next cell {} is no longer traversable", next);
                CycleOutcome::Blocked
            }
            Plan::Move {
                from,
                to,
                resolution,
                previous_facing,
            } => {
                self.stop_sent = false;

                if let Some(turn) = resolution.turn.command() {
                    if let Err(e) = self.send(turn) {
                        tracing::warn!("Turn not sent ({}), keeping facing {}", e, previous_facing);
                        self.shared_map.set_facing(previous_facing);
                        return CycleOutcome::SendFailed { command: turn };
                    }
                    tracing::info!("Current direction: {}", resolution.facing);
                }

                if let Err(e) = self.send(ActuatorCommand::GoStraight) {
                    tracing::warn!("Go straight not sent ({}), staying at {}", e, from);
                    return CycleOutcome::SendFailed {
                        command: ActuatorCommand::GoStraight,
                    };
                }

                if !self.shared_map.advance(from, to) {
                    // Replanned elsewhere between plan and send
                    tracing::error!("Plan {} -> {} went stale before advancing", from, to);
                    return CycleOutcome::Blocked;
                }

                self.shared_state.record_move();
                tracing::debug!("Moved {} -> {} facing {}", from, to, resolution.facing);
                CycleOutcome::Moved {
                    to,
                    facing: resolution.facing,
                }
            }
        }
    }

    fn arrive(&mut self) -> CycleOutcome {
        if self.stop_sent {
            return CycleOutcome::Idle;
        }

        match self.send(ActuatorCommand::Stop) {
            Ok(()) => {
                self.stop_sent = true;
                if !self.shared_state.has_arrived() {
                    tracing::info!("Destination reached");
                }
                self.shared_state.set_arrived();
                CycleOutcome::Arrived
            }
            Err(e) => {
                tracing::warn!("Stop not sent at destination: {}", e);
                CycleOutcome::SendFailed {
                    command: ActuatorCommand::Stop,
                }
            }
        }
    }

    fn send(&mut self, command: ActuatorCommand) -> Result<()> {
        match self.actuator.send(command) {
            Ok(()) => {
                self.shared_state.record_command();
                tracing::debug!("Sent {}", command);
                Ok(())
            }
            Err(e) => {
                self.shared_state.record_send_failure();
                Err(e)
            }
        }
    }
}
