//! Workout timer state. The client holds it and sends it back with each
//! request; the server keeps nothing between calls.

use crate::errors::LogError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimerSession {
    /// Unix timestamp (seconds) of the start, `None` when stopped.
    pub started_at: Option<i64>,
}

impl TimerSession {
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn start(now: i64) -> Self {
        Self {
            started_at: Some(now),
        }
    }

    /// Whole minutes elapsed since the start, rounded down.
    pub fn elapsed_minutes(&self, now: i64) -> Result<u32, LogError> {
        let started_at = self
            .started_at
            .ok_or_else(|| LogError::validation("timer not started"))?;
        if started_at > now {
            return Err(LogError::validation("timer start lies in the future"));
        }
        Ok(u32::try_from((now - started_at) / 60).unwrap_or(u32::MAX))
    }

    /// Stops the timer, returning the elapsed minutes and the reset session.
    pub fn stop(self, now: i64) -> Result<(u32, Self), LogError> {
        let minutes = self.elapsed_minutes(now)?;
        Ok((minutes, Self::default()))
    }
}
