use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JogConfig {
    pub tick_ms: u64,
    pub print_delay_ms: u64,
    /// Relative target of a jog start; large enough that the axis is always
    /// stopped by key release before it arrives.
    pub jog_steps: i32,
}

impl JogConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn print_delay(&self) -> Duration {
        Duration::from_millis(self.print_delay_ms)
    }
}

impl Default for JogConfig {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            print_delay_ms: 300,
            jog_steps: 400_000,
        }
    }
}
