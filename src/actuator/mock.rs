//! Mock actuator for testing

use std::sync::Arc;

use parking_lot::Mutex;

use super::{ActuatorCommand, ActuatorSink};
use crate::error::{NavError, Result};

/// Records every command it is asked to send. Clones share the record.
#[derive(Clone, Default)]
pub struct MockActuator {
    inner: Arc<Mutex<MockActuatorInner>>,
}

#[derive(Default)]
struct MockActuatorInner {
    sent: Vec<ActuatorCommand>,
    failing: bool,
    fail_on: Option<ActuatorCommand>,
    failures: usize,
}

impl MockActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands sent successfully, in order.
    pub fn sent(&self) -> Vec<ActuatorCommand> {
        self.inner.lock().sent.clone()
    }

    /// Number of rejected sends.
    pub fn failures(&self) -> usize {
        self.inner.lock().failures
    }

    /// Reject every command while set.
    pub fn set_failing(&self, failing: bool) {
        self.inner.lock().failing = failing;
    }

    /// Reject only the given command.
    pub fn fail_on(&self, command: Option<ActuatorCommand>) {
        self.inner.lock().fail_on = command;
    }
}

impl ActuatorSink for MockActuator {
    fn send(&mut self, command: ActuatorCommand) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.failing || inner.fail_on == Some(command) {
            inner.failures += 1;
            return Err(NavError::NotReady);
        }
        inner.sent.push(command);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_and_fails() {
        let mock = MockActuator::new();
        let mut sink = mock.clone();

        sink.send(ActuatorCommand::TurnLeft).unwrap();
        mock.fail_on(Some(ActuatorCommand::GoStraight));
        assert!(sink.send(ActuatorCommand::GoStraight).is_err());
        sink.send(ActuatorCommand::Stop).unwrap();

        mock.set_failing(true);
        assert!(sink.send(ActuatorCommand::Stop).is_err());

        assert_eq!(
            mock.sent(),
            vec![ActuatorCommand::TurnLeft, ActuatorCommand::Stop]
        );
        assert_eq!(mock.failures(), 2);
    }
}
