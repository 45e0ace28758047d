use std::time::Duration;

use thiserror::Error;

use crate::axis::fault_flags::FaultFlags;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AxisError {
    #[error("axis {axis}: device is not open")]
    DeviceNotOpen { axis: String },

    #[error("axis {axis}: no stop reported within {waited:?}")]
    ControllerTimeout { axis: String, waited: Duration },

    #[error("axis {axis}: controller fault, flags {flags:?} (raw {raw:#06x})", raw = .flags.bits())]
    ControllerFault { axis: String, flags: FaultFlags },
}

impl AxisError {
    pub fn axis(&self) -> &str {
        match self {
            AxisError::DeviceNotOpen { axis }
            | AxisError::ControllerTimeout { axis, .. }
            | AxisError::ControllerFault { axis, .. } => axis,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("malformed input: {0}")]
    Malformed(String),

    #[error("unknown mark shape: {0}")]
    UnknownShape(String),

    #[error("unknown operating mode: {0}")]
    UnknownMode(String),

    #[error("unknown key: {0}")]
    UnknownKey(String),

    #[error("mark count {count} out of range 1..={max}")]
    MarkCountOutOfRange { count: u8, max: u8 },

    #[error("delta {delta_um} µm out of range 0..={max_um} µm")]
    DeltaOutOfRange { delta_um: i32, max_um: i32 },

    #[error("grid cell (row {row}, column {col}) is outside the disc")]
    OutsideDisc { row: i32, col: i32 },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("found {found} axis device(s), three are required")]
    NotEnoughAxes { found: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("config validation: {0}")]
    Invalid(String),
}
