use thiserror::Error;

use crate::error::AxisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    PlaceDisc,
    DiscLoadPosition,
    HomeXy,
    HomeZ,
    ZeroX,
    ZeroY,
    ZeroZ,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::PlaceDisc => "disc placement",
            Operation::DiscLoadPosition => "disc loading position",
            Operation::HomeXy => "XY homing",
            Operation::HomeZ => "Z homing",
            Operation::ZeroX => "X zeroing",
            Operation::ZeroY => "Y zeroing",
            Operation::ZeroZ => "Z zeroing",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
#[error("{operation} aborted at '{step}': {source}")]
pub struct SequenceError {
    pub operation: Operation,
    pub step: &'static str,
    #[source]
    pub source: AxisError,
}

impl SequenceError {
    pub fn axis(&self) -> &str {
        self.source.axis()
    }
}
