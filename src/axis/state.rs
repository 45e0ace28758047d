#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisState {
    Idle,
    Moving,
    Homing,
    Fault,
}
