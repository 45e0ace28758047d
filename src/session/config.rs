use serde::{Deserialize, Serialize};

use crate::axis::AxisId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedConfig {
    pub x: Option<u32>,
    pub y: Option<u32>,
    pub z: Option<u32>,
}

impl SpeedConfig {
    pub fn for_axis(&self, id: AxisId) -> Option<u32> {
        match id {
            AxisId::X => self.x,
            AxisId::Y => self.y,
            AxisId::Z => self.z,
        }
    }
}
