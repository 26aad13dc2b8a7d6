//! Serial line actuator

use std::io::Write;
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use super::{ActuatorCommand, ActuatorSink};
use crate::error::{NavError, Result};

/// Drive controller on a UART, one byte per command.
pub struct SerialActuator {
    path: String,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialActuator {
    /// Open a serial port (8N1, no flow control).
    ///
    /// # Arguments
    /// * `path` - Serial port path (e.g., "/dev/ttymxc3")
    /// * `baud_rate` - Baud rate (e.g., 115200)
    /// * `timeout` - Write timeout, keeps a stuck line from stalling the caller
    pub fn open(path: &str, baud_rate: u32, timeout: Duration) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(timeout)
            .open()?;

        tracing::info!("Opened actuator port: {} at {} baud", path, baud_rate);

        Ok(Self {
            path: path.to_string(),
            port: Some(port),
        })
    }

    /// Actuator with no port. Every send fails with `NotReady`.
    pub fn offline(path: &str) -> Self {
        Self {
            path: path.to_string(),
            port: None,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl ActuatorSink for SerialActuator {
    fn send(&mut self, command: ActuatorCommand) -> Result<()> {
        let port = self.port.as_mut().ok_or(NavError::NotReady)?;
        // Written to the driver buffer only; no drain.
        port.write_all(&[command.wire_byte()])?;
        tracing::debug!("Actuator <- {} ({:?})", command, command.wire_byte() as char);
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.port.is_some()
    }
}

impl Drop for SerialActuator {
    fn drop(&mut self) {
        if self.port.take().is_some() {
            tracing::info!("Closed actuator port: {}", self.path);
        }
    }
}
