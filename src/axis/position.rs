use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AxisPosition {
    pub steps: i32,
    pub micro: i16,
}

impl AxisPosition {
    pub fn new(steps: i32, micro: i16) -> Self {
        Self { steps, micro }
    }
}

impl std::fmt::Display for AxisPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} steps, {} micro-steps", self.steps, self.micro)
    }
}
