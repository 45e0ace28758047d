use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub speed: u32,
    pub min_travel: i32,
    pub max_travel: i32,
    pub home_position: i32,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            speed: 200_000,
            min_travel: -2_000_000,
            max_travel: 2_000_000,
            home_position: 0,
        }
    }
}
