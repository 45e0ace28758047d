use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::axis::position::AxisPosition;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionReport {
    pub taken_at: DateTime<Utc>,
    pub x: AxisPosition,
    pub y: AxisPosition,
    pub z: AxisPosition,
}

impl PositionReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl std::fmt::Display for PositionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "X-axis position: {}", self.x)?;
        writeln!(f, "Y-axis position: {}", self.y)?;
        write!(f, "Z-axis position: {}", self.z)
    }
}
