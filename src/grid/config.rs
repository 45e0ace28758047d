use serde::{Deserialize, Serialize};

/// Geometry of the marked grid on the disc, in micrometres unless noted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSpec {
    pub disc_diameter_mm: f64,
    pub line_thickness_um: f64,
    pub spacing_um: f64,
    pub disc_center_um: (f64, f64),
    pub max_marks: u8,
}

impl GridSpec {
    pub fn pitch_um(&self) -> f64 {
        self.spacing_um + self.line_thickness_um
    }

    pub fn disc_radius_um(&self) -> f64 {
        self.disc_diameter_mm * 1000.0 / 2.0
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            disc_diameter_mm: 35.0,
            line_thickness_um: 800.0,
            spacing_um: 2200.0,
            disc_center_um: (23_000.0, 23_000.0),
            max_marks: 6,
        }
    }
}
