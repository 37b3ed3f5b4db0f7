//! Log level control that records applied levels.

use parking_lot::Mutex;

use crate::core::domain::LogLevel;
use crate::port::outbound::LogLevelControl;

#[derive(Debug, Default)]
pub struct RecordingLogControl {
    applied: Mutex<Vec<LogLevel>>,
}

impl RecordingLogControl {
    pub fn applied(&self) -> Vec<LogLevel> {
        self.applied.lock().clone()
    }
}

impl LogLevelControl for RecordingLogControl {
    fn apply(&self, level: LogLevel) -> anyhow::Result<()> {
        self.applied.lock().push(level);
        Ok(())
    }
}
