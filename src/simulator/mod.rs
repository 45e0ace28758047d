pub mod config;
pub mod journal;

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::{
    axis::{
        fault_flags::FaultFlags, position::AxisPosition, state::AxisState,
        state_info::AxisStatus, Axis,
    },
    error::AxisError,
};
use config::SimulatorConfig;
use journal::{AxisOp, CallJournal, OpKind};

/// Constant-speed stand-in for a stage controller. Absolute targets outside
/// the travel fault with `LIMIT_REACHED`; relative moves clamp to the travel.
pub struct SimulatedAxis {
    name: String,
    config: SimulatorConfig,
    state: Mutex<SimState>,
    journal: Option<CallJournal>,
}

struct SimState {
    open: bool,
    speed: u32,
    staged_speed: Option<u32>,
    origin: i32,
    target: i32,
    started: Instant,
    travel_time: Duration,
    homing: bool,
    homed: bool,
    last_fault: FaultFlags,
    pending_faults: Vec<(OpKind, FaultFlags)>,
}

impl SimState {
    fn position_at(&self, now: Instant) -> i32 {
        let elapsed = now.saturating_duration_since(self.started);
        if self.travel_time.is_zero() || elapsed >= self.travel_time {
            return self.target;
        }
        let fraction = elapsed.as_secs_f64() / self.travel_time.as_secs_f64();
        let span = i64::from(self.target) - i64::from(self.origin);
        (i64::from(self.origin) + (span as f64 * fraction).round() as i64) as i32
    }

    fn is_moving(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) < self.travel_time
    }

    fn settle(&mut self, now: Instant) {
        if self.homing && !self.is_moving(now) {
            self.homing = false;
            self.homed = true;
        }
    }

    fn begin_move(&mut self, target: i32, now: Instant) {
        let from = self.position_at(now);
        if let Some(speed) = self.staged_speed.take() {
            self.speed = speed;
        }
        let distance = (i64::from(target) - i64::from(from)).unsigned_abs();
        self.origin = from;
        self.target = target;
        self.started = now;
        self.travel_time = Duration::from_secs_f64(distance as f64 / f64::from(self.speed.max(1)));
        self.last_fault = FaultFlags::empty();
    }

    fn halt(&mut self, now: Instant) {
        let here = self.position_at(now);
        self.origin = here;
        self.target = here;
        self.travel_time = Duration::ZERO;
        self.homing = false;
    }
}

impl SimulatedAxis {
    pub fn new(name: impl Into<String>, config: SimulatorConfig) -> Self {
        let state = SimState {
            open: false,
            speed: config.speed,
            staged_speed: None,
            origin: 0,
            target: 0,
            started: Instant::now(),
            travel_time: Duration::ZERO,
            homing: false,
            homed: false,
            last_fault: FaultFlags::empty(),
            pending_faults: Vec::new(),
        };
        Self {
            name: name.into(),
            config,
            state: Mutex::new(state),
            journal: None,
        }
    }

    pub fn with_journal(mut self, journal: CallJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// The next call of `kind` fails with `flags` instead of executing.
    pub fn inject_fault(&self, kind: OpKind, flags: FaultFlags) {
        self.lock().pending_faults.push((kind, flags));
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin(&self, op: AxisOp) -> Result<MutexGuard<'_, SimState>, AxisError> {
        if let Some(journal) = &self.journal {
            journal.record(&self.name, op);
        }

        let mut state = self.lock();
        if !state.open && op != AxisOp::Open {
            return Err(AxisError::DeviceNotOpen {
                axis: self.name.clone(),
            });
        }

        if let Some(idx) = state
            .pending_faults
            .iter()
            .position(|(kind, _)| *kind == op.kind())
        {
            let (_, flags) = state.pending_faults.remove(idx);
            state.last_fault = flags;
            warn!("Axis {} faulted on {:?}: {:?}", self.name, op, flags);
            return Err(AxisError::ControllerFault {
                axis: self.name.clone(),
                flags,
            });
        }

        state.settle(Instant::now());
        Ok(state)
    }

    fn in_travel(&self, target: i32) -> bool {
        (self.config.min_travel..=self.config.max_travel).contains(&target)
    }
}

#[async_trait::async_trait]
impl Axis for SimulatedAxis {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_open(&self) -> bool {
        self.lock().open
    }

    async fn open(&self) -> Result<(), AxisError> {
        let mut state = self.begin(AxisOp::Open)?;
        state.open = true;
        info!("Opened simulated axis {}", self.name);
        Ok(())
    }

    async fn close(&self) -> Result<(), AxisError> {
        let mut state = self.begin(AxisOp::Close)?;
        state.halt(Instant::now());
        state.open = false;
        info!("Closed simulated axis {}", self.name);
        Ok(())
    }

    async fn move_absolute(&self, target: i32, _micro: i16) -> Result<(), AxisError> {
        let mut state = self.begin(AxisOp::MoveAbsolute(target))?;
        if !self.in_travel(target) {
            state.last_fault = FaultFlags::LIMIT_REACHED;
            return Err(AxisError::ControllerFault {
                axis: self.name.clone(),
                flags: FaultFlags::LIMIT_REACHED,
            });
        }
        state.begin_move(target, Instant::now());
        debug!(
            "Axis {} moving to {} over {:?}",
            self.name, target, state.travel_time
        );
        Ok(())
    }

    async fn move_relative(&self, delta: i32, _micro: i16) -> Result<(), AxisError> {
        let mut state = self.begin(AxisOp::MoveRelative(delta))?;
        let target = state
            .target
            .saturating_add(delta)
            .clamp(self.config.min_travel, self.config.max_travel);
        state.begin_move(target, Instant::now());
        debug!("Axis {} moving by {} towards {}", self.name, delta, target);
        Ok(())
    }

    async fn wait_for_stop(&self, poll_interval: Duration) -> Result<(), AxisError> {
        drop(self.begin(AxisOp::WaitForStop)?);
        loop {
            {
                let mut state = self.lock();
                if !state.open {
                    return Err(AxisError::DeviceNotOpen {
                        axis: self.name.clone(),
                    });
                }
                let now = Instant::now();
                state.settle(now);
                if !state.is_moving(now) {
                    return Ok(());
                }
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    async fn stop(&self) -> Result<(), AxisError> {
        let mut state = self.begin(AxisOp::Stop)?;
        let now = Instant::now();
        if state.is_moving(now) {
            state.halt(now);
            debug!("Axis {} stopped at {}", self.name, state.target);
        }
        Ok(())
    }

    async fn home(&self) -> Result<(), AxisError> {
        let mut state = self.begin(AxisOp::Home)?;
        state.begin_move(self.config.home_position, Instant::now());
        state.homing = true;
        state.homed = false;
        info!("Axis {} seeking home", self.name);
        Ok(())
    }

    async fn zero(&self) -> Result<(), AxisError> {
        let mut state = self.begin(AxisOp::Zero)?;
        state.halt(Instant::now());
        state.origin = 0;
        state.target = 0;
        state.last_fault = FaultFlags::empty();
        info!("Axis {} position redefined as zero", self.name);
        Ok(())
    }

    async fn get_position(&self) -> Result<AxisPosition, AxisError> {
        let state = self.begin(AxisOp::GetPosition)?;
        Ok(AxisPosition::new(state.position_at(Instant::now()), 0))
    }

    async fn get_speed(&self) -> Result<u32, AxisError> {
        let state = self.begin(AxisOp::GetSpeed)?;
        Ok(state.staged_speed.unwrap_or(state.speed))
    }

    async fn set_speed(&self, speed: u32) -> Result<(), AxisError> {
        let mut state = self.begin(AxisOp::SetSpeed(speed))?;
        if state.is_moving(Instant::now()) {
            state.staged_speed = Some(speed);
        } else {
            state.speed = speed;
        }
        Ok(())
    }

    async fn get_status(&self) -> Result<AxisStatus, AxisError> {
        let state = self.begin(AxisOp::GetStatus)?;
        let now = Instant::now();
        let mode = if !state.is_moving(now) {
            AxisState::Idle
        } else if state.homing {
            AxisState::Homing
        } else {
            AxisState::Moving
        };
        let mode = if state.last_fault.is_clear() {
            mode
        } else {
            AxisState::Fault
        };
        Ok(AxisStatus::new(mode)
            .with_flags(state.last_fault)
            .with_homed(state.homed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_axis(name: &str) -> SimulatedAxis {
        SimulatedAxis::new(
            name,
            SimulatorConfig {
                speed: 10_000_000,
                ..SimulatorConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn closed_axis_rejects_commands() {
        let axis = fast_axis("X");
        let err = axis.move_absolute(100, 0).await.unwrap_err();
        assert_eq!(
            err,
            AxisError::DeviceNotOpen {
                axis: "X".to_string()
            }
        );
        assert!(axis.get_position().await.is_err());
    }

    #[tokio::test]
    async fn absolute_move_arrives_at_target() {
        let axis = fast_axis("X");
        axis.open().await.unwrap();
        axis.move_absolute(5_000, 0).await.unwrap();
        axis.wait_for_stop(Duration::from_millis(1)).await.unwrap();
        assert_eq!(axis.get_position().await.unwrap(), AxisPosition::new(5_000, 0));
        assert!(axis.get_status().await.unwrap().is_ready());
    }

    #[tokio::test]
    async fn target_outside_travel_faults() {
        let axis = fast_axis("Z");
        axis.open().await.unwrap();
        let err = axis.move_absolute(3_000_000, 0).await.unwrap_err();
        assert!(matches!(
            err,
            AxisError::ControllerFault { flags, .. } if flags == FaultFlags::LIMIT_REACHED
        ));
    }

    #[tokio::test]
    async fn relative_move_clamps_to_travel() {
        let axis = fast_axis("Y");
        axis.open().await.unwrap();
        axis.move_relative(-9_000_000, 0).await.unwrap();
        axis.wait_for_stop(Duration::from_millis(1)).await.unwrap();
        assert_eq!(axis.get_position().await.unwrap().steps, -2_000_000);
    }

    #[tokio::test]
    async fn stop_freezes_a_long_move() {
        let axis = SimulatedAxis::new(
            "X",
            SimulatorConfig {
                speed: 1_000,
                ..SimulatorConfig::default()
            },
        );
        axis.open().await.unwrap();
        axis.move_relative(400_000, 0).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        axis.stop().await.unwrap();
        let here = axis.get_position().await.unwrap().steps;
        assert!(here > 0 && here < 400_000);
        assert!(!axis.get_status().await.unwrap().is_moving());

        // second stop is a no-op
        axis.stop().await.unwrap();
        assert_eq!(axis.get_position().await.unwrap().steps, here);
    }

    #[tokio::test]
    async fn speed_change_is_staged_while_moving() {
        let axis = SimulatedAxis::new(
            "X",
            SimulatorConfig {
                speed: 1_000,
                ..SimulatorConfig::default()
            },
        );
        axis.open().await.unwrap();
        axis.move_relative(100_000, 0).await.unwrap();
        axis.set_speed(5_000).await.unwrap();
        assert_eq!(axis.get_speed().await.unwrap(), 5_000);
        axis.stop().await.unwrap();
        axis.move_relative(10, 0).await.unwrap();
        assert_eq!(axis.get_speed().await.unwrap(), 5_000);
    }

    #[tokio::test]
    async fn home_and_zero() {
        let axis = fast_axis("Z");
        axis.open().await.unwrap();
        axis.move_absolute(1_234, 0).await.unwrap();
        axis.wait_for_stop(Duration::from_millis(1)).await.unwrap();

        axis.zero().await.unwrap();
        assert_eq!(axis.get_position().await.unwrap().steps, 0);

        axis.move_absolute(-500, 0).await.unwrap();
        axis.home().await.unwrap();
        axis.wait_for_stop(Duration::from_millis(1)).await.unwrap();
        let status = axis.get_status().await.unwrap();
        assert!(status.homed);
        assert_eq!(axis.get_position().await.unwrap().steps, 0);
    }

    #[tokio::test]
    async fn injected_fault_fires_once_and_is_journaled() {
        let journal = CallJournal::new();
        let axis = fast_axis("X").with_journal(journal.clone());
        axis.open().await.unwrap();
        axis.inject_fault(OpKind::Home, FaultFlags::OVERLOAD);

        assert!(axis.home().await.is_err());
        assert!(axis.get_status().await.unwrap().is_faulted());
        axis.home().await.unwrap();
        assert_eq!(journal.count("X", OpKind::Home), 2);
    }

    #[tokio::test]
    async fn accepted_command_clears_the_last_fault() {
        let axis = fast_axis("Z");
        axis.open().await.unwrap();
        assert!(axis.move_absolute(3_000_000, 0).await.is_err());
        let status = axis.get_status().await.unwrap();
        assert_eq!(status.state, AxisState::Fault);
        assert_eq!(status.flags, FaultFlags::LIMIT_REACHED);

        axis.move_absolute(1_000, 0).await.unwrap();
        axis.wait_for_stop(Duration::from_millis(1)).await.unwrap();
        assert!(axis.get_status().await.unwrap().is_ready());

        axis.inject_fault(OpKind::Stop, FaultFlags::DISCONNECTED);
        assert!(axis.stop().await.is_err());
        assert!(axis.get_status().await.unwrap().is_faulted());
        axis.zero().await.unwrap();
        assert!(axis.get_status().await.unwrap().flags.is_clear());
    }
}
