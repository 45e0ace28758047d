pub mod config;
pub mod report;

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    axis::{state_info::AxisStatus, Axis, AxisId},
    error::{AxisError, SessionError},
};
use config::SpeedConfig;
use report::PositionReport;

pub struct StageSession {
    id: Uuid,
    x: Arc<dyn Axis>,
    y: Arc<dyn Axis>,
    z: Arc<dyn Axis>,
}

impl StageSession {
    pub fn new(x: Arc<dyn Axis>, y: Arc<dyn Axis>, z: Arc<dyn Axis>) -> Self {
        Self {
            id: Uuid::new_v4(),
            x,
            y,
            z,
        }
    }

    /// Builds a session from enumerated devices: sorted by name, the first
    /// three become X, Y and Z.
    pub fn from_devices(mut devices: Vec<Arc<dyn Axis>>) -> Result<Self, SessionError> {
        if devices.len() < 3 {
            return Err(SessionError::NotEnoughAxes {
                found: devices.len(),
            });
        }
        devices.sort_by(|a, b| a.name().cmp(b.name()));
        let mut devices = devices.into_iter();
        match (devices.next(), devices.next(), devices.next()) {
            (Some(x), Some(y), Some(z)) => Ok(Self::new(x, y, z)),
            _ => Err(SessionError::NotEnoughAxes { found: 0 }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn axis(&self, id: AxisId) -> &dyn Axis {
        match id {
            AxisId::X => self.x.as_ref(),
            AxisId::Y => self.y.as_ref(),
            AxisId::Z => self.z.as_ref(),
        }
    }

    pub fn x(&self) -> &dyn Axis {
        self.x.as_ref()
    }

    pub fn y(&self) -> &dyn Axis {
        self.y.as_ref()
    }

    pub fn z(&self) -> &dyn Axis {
        self.z.as_ref()
    }

    pub async fn open_all(&self) -> Result<(), AxisError> {
        for id in AxisId::ALL {
            let axis = self.axis(id);
            info!("Opening device {} as {} axis", axis.name(), id);
            axis.open().await?;
        }
        info!("Session {} opened", self.id);
        Ok(())
    }

    pub async fn close_all(&self) -> Result<(), AxisError> {
        for id in AxisId::ALL {
            let axis = self.axis(id);
            if axis.is_open() {
                axis.close().await?;
            }
        }
        info!("Session {} closed", self.id);
        Ok(())
    }

    /// Stops every axis, even when an earlier stop fails; reports the first failure.
    pub async fn stop_all(&self) -> Result<(), AxisError> {
        let mut first_error = None;
        for id in AxisId::ALL {
            if let Err(e) = self.axis(id).stop().await {
                error!("Failed to stop {} axis: {}", id, e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub async fn apply_speeds(&self, speeds: &SpeedConfig) -> Result<(), AxisError> {
        for id in AxisId::ALL {
            let Some(speed) = speeds.for_axis(id) else {
                continue;
            };
            let axis = self.axis(id);
            let previous = axis.get_speed().await?;
            info!(
                "{} axis speed was {}, changing it to {}",
                id, previous, speed
            );
            axis.set_speed(speed).await?;
        }
        Ok(())
    }

    pub async fn report_positions(&self) -> Result<PositionReport, AxisError> {
        Ok(PositionReport {
            taken_at: Utc::now(),
            x: self.x.get_position().await?,
            y: self.y.get_position().await?,
            z: self.z.get_position().await?,
        })
    }

    pub async fn statuses(&self) -> Vec<(AxisId, Result<AxisStatus, AxisError>)> {
        let mut out = Vec::with_capacity(3);
        for id in AxisId::ALL {
            out.push((id, self.axis(id).get_status().await));
        }
        out
    }
}
