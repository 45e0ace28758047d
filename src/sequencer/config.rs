use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    pub poll_interval_ms: u64,
    pub stop_timeout_ms: u64,
    pub home_clearance_steps: i32,
}

impl SequencerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            stop_timeout_ms: 120_000,
            home_clearance_steps: 20 * 4000,
        }
    }
}
