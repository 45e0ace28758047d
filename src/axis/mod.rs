pub mod fault_flags;
pub mod position;
pub mod state;
pub mod state_info;

use std::time::Duration;

use position::AxisPosition;
use state_info::AxisStatus;

use crate::error::AxisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisId {
    X,
    Y,
    Z,
}

impl AxisId {
    pub const ALL: [AxisId; 3] = [AxisId::X, AxisId::Y, AxisId::Z];
}

impl std::fmt::Display for AxisId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AxisId::X => "X",
            AxisId::Y => "Y",
            AxisId::Z => "Z",
        };
        f.write_str(name)
    }
}

/// One linear actuator behind a stage controller.
///
/// Motion commands return once the controller has accepted them; arrival is
/// observed through [`Axis::wait_for_stop`] or by polling the position.
/// Every call on a closed device fails with [`AxisError::DeviceNotOpen`].
#[async_trait::async_trait]
pub trait Axis: Send + Sync {
    fn name(&self) -> &str;
    fn is_open(&self) -> bool;

    async fn open(&self) -> Result<(), AxisError>;
    async fn close(&self) -> Result<(), AxisError>;

    async fn move_absolute(&self, target: i32, micro: i16) -> Result<(), AxisError>;
    async fn move_relative(&self, delta: i32, micro: i16) -> Result<(), AxisError>;
    async fn wait_for_stop(&self, poll_interval: Duration) -> Result<(), AxisError>;

    async fn stop(&self) -> Result<(), AxisError>;
    async fn home(&self) -> Result<(), AxisError>;
    async fn zero(&self) -> Result<(), AxisError>;

    async fn get_position(&self) -> Result<AxisPosition, AxisError>;
    async fn get_speed(&self) -> Result<u32, AxisError>;
    async fn set_speed(&self, speed: u32) -> Result<(), AxisError>;
    async fn get_status(&self) -> Result<AxisStatus, AxisError>;
}

/// Waits for `axis` to stop, giving up after `limit`.
///
/// An expired bound leaves the axis in whatever motion it was in.
pub async fn wait_stopped(
    axis: &dyn Axis,
    poll_interval: Duration,
    limit: Duration,
) -> Result<(), AxisError> {
    match tokio::time::timeout(limit, axis.wait_for_stop(poll_interval)).await {
        Ok(result) => result,
        Err(_) => Err(AxisError::ControllerTimeout {
            axis: axis.name().to_string(),
            waited: limit,
        }),
    }
}
