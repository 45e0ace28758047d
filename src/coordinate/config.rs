use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepCalibration {
    pub xy_steps_per_mm: f64,
    /// Z height that clears the work surface for any XY travel.
    pub z_top_step: i32,
    pub z_bottom_step: i32,
    pub x_disc_load_step: i32,
    pub y_disc_load_step: i32,
    /// Offset of the loading height above the working height.
    pub z_disc_load_offset: i32,
}

impl Default for StepCalibration {
    fn default() -> Self {
        Self {
            xy_steps_per_mm: 8000.0,
            z_top_step: 60_000,
            z_bottom_step: -12_400,
            x_disc_load_step: 296_000,
            y_disc_load_step: -184_000,
            z_disc_load_offset: 2_000,
        }
    }
}
