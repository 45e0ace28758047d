pub mod config;

use config::StepCalibration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepCoordinate {
    x_step: i32,
    y_step: i32,
    z_top_step: i32,
    z_bottom_step: i32,
    x_disc_load_step: i32,
    y_disc_load_step: i32,
    z_disc_load_step: i32,
}

impl StepCoordinate {
    /// The X/Y controller axes count opposite to the grid, hence the sign.
    pub fn new(x_mm: f64, y_mm: f64, calibration: &StepCalibration) -> Self {
        Self {
            x_step: mm_to_steps(x_mm, calibration.xy_steps_per_mm),
            y_step: mm_to_steps(y_mm, calibration.xy_steps_per_mm),
            z_top_step: calibration.z_top_step,
            z_bottom_step: calibration.z_bottom_step,
            x_disc_load_step: calibration.x_disc_load_step,
            y_disc_load_step: calibration.y_disc_load_step,
            z_disc_load_step: calibration
                .z_bottom_step
                .saturating_add(calibration.z_disc_load_offset),
        }
    }

    pub fn loading(calibration: &StepCalibration) -> Self {
        Self::new(0.0, 0.0, calibration)
    }

    pub fn x_step(&self) -> i32 {
        self.x_step
    }

    pub fn y_step(&self) -> i32 {
        self.y_step
    }

    pub fn z_top_step(&self) -> i32 {
        self.z_top_step
    }

    pub fn z_bottom_step(&self) -> i32 {
        self.z_bottom_step
    }

    pub fn x_disc_load_step(&self) -> i32 {
        self.x_disc_load_step
    }

    pub fn y_disc_load_step(&self) -> i32 {
        self.y_disc_load_step
    }

    pub fn z_disc_load_step(&self) -> i32 {
        self.z_disc_load_step
    }
}

/// `-round(mm * steps_per_mm)`, saturating at the i32 range.
fn mm_to_steps(mm: f64, steps_per_mm: f64) -> i32 {
    -(mm * steps_per_mm).round() as i32
}
