use super::fault_flags::FaultFlags;
use super::state::AxisState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisStatus {
    pub state: AxisState,
    pub flags: FaultFlags,
    pub homed: bool,
}

impl AxisStatus {
    pub fn new(state: AxisState) -> Self {
        Self {
            state,
            flags: FaultFlags::empty(),
            homed: false,
        }
    }

    pub fn with_flags(mut self, flags: FaultFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_homed(mut self, homed: bool) -> Self {
        self.homed = homed;
        self
    }

    pub fn is_moving(&self) -> bool {
        matches!(self.state, AxisState::Moving | AxisState::Homing)
    }

    pub fn is_faulted(&self) -> bool {
        self.state == AxisState::Fault || !self.flags.is_clear()
    }

    pub fn is_ready(&self) -> bool {
        self.state == AxisState::Idle && self.flags.is_clear()
    }
}

impl std::fmt::Display for AxisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "state {:?}, flags {:#06x}, homed {}",
            self.state,
            self.flags.bits(),
            self.homed
        )
    }
}
