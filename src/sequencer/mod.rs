pub mod config;
pub mod operation;

use std::future::Future;

use tracing::{debug, error, info};

use crate::{
    axis::{wait_stopped, Axis},
    coordinate::StepCoordinate,
    error::AxisError,
    session::StageSession,
};
use config::SequencerConfig;
use operation::{Operation, SequenceError};

/// Collision-safe composite moves over the session's three axes.
///
/// X and Y never move unless Z has been confirmed at clearance height (or
/// raised clear for homing), and Z is only lowered after both X and Y have
/// been observed stopped. The first failing axis call aborts the sequence;
/// nothing is retried or undone.
pub struct MotionSequencer<'a> {
    session: &'a StageSession,
    config: SequencerConfig,
}

impl<'a> MotionSequencer<'a> {
    pub fn new(session: &'a StageSession, config: SequencerConfig) -> Self {
        Self { session, config }
    }

    pub async fn place_disc(&self, coord: &StepCoordinate) -> Result<(), SequenceError> {
        let op = Operation::PlaceDisc;
        info!(
            "Placing disc at X {} / Y {} steps",
            coord.x_step(),
            coord.y_step()
        );
        self.raise_z(op, coord.z_top_step()).await?;
        self.travel_xy(op, coord.x_step(), coord.y_step()).await?;
        self.lower_z(op, coord.z_bottom_step()).await?;
        info!("Disc placement complete");
        Ok(())
    }

    /// Only the fixed loading constants of `coord` are used.
    pub async fn disc_load_position(&self, coord: &StepCoordinate) -> Result<(), SequenceError> {
        let op = Operation::DiscLoadPosition;
        info!(
            "Moving to disc loading position X {} / Y {} steps",
            coord.x_disc_load_step(),
            coord.y_disc_load_step()
        );
        self.raise_z(op, coord.z_top_step()).await?;
        self.travel_xy(op, coord.x_disc_load_step(), coord.y_disc_load_step())
            .await?;
        self.lower_z(op, coord.z_disc_load_step()).await?;
        info!("Reached disc loading position");
        Ok(())
    }

    pub async fn home_xy(&self) -> Result<(), SequenceError> {
        let op = Operation::HomeXy;
        let (x, y, z) = (self.session.x(), self.session.y(), self.session.z());

        info!(
            "Raising Z by {} steps before XY homing",
            self.config.home_clearance_steps
        );
        step(
            op,
            "raise Z clear of the work surface",
            z.move_relative(self.config.home_clearance_steps, 0),
        )
        .await?;
        step(op, "wait for Z clearance", self.wait(z)).await?;

        step(op, "start X homing", x.home()).await?;
        step(op, "start Y homing", y.home()).await?;
        step(op, "wait for X and Y homing", self.wait_both(x, y)).await?;
        info!("XY homing complete");
        Ok(())
    }

    pub async fn home_z(&self) -> Result<(), SequenceError> {
        let op = Operation::HomeZ;
        let z = self.session.z();
        step(op, "start Z homing", z.home()).await?;
        step(op, "wait for Z homing", self.wait(z)).await?;
        info!("Z homing complete");
        Ok(())
    }

    pub async fn set_zero_x(&self) -> Result<(), SequenceError> {
        self.set_zero(Operation::ZeroX, self.session.x()).await
    }

    pub async fn set_zero_y(&self) -> Result<(), SequenceError> {
        self.set_zero(Operation::ZeroY, self.session.y()).await
    }

    pub async fn set_zero_z(&self) -> Result<(), SequenceError> {
        self.set_zero(Operation::ZeroZ, self.session.z()).await
    }

    async fn set_zero(&self, op: Operation, axis: &dyn Axis) -> Result<(), SequenceError> {
        step(op, "redefine zero", axis.zero()).await?;
        step(op, "wait for zeroing", self.wait(axis)).await?;
        info!("Axis {} zeroed", axis.name());
        Ok(())
    }

    async fn raise_z(&self, op: Operation, z_top: i32) -> Result<(), SequenceError> {
        let z = self.session.z();
        step(op, "raise Z to clearance height", z.move_absolute(z_top, 0)).await?;
        step(op, "wait for Z clearance", self.wait(z)).await
    }

    async fn travel_xy(
        &self,
        op: Operation,
        x_target: i32,
        y_target: i32,
    ) -> Result<(), SequenceError> {
        let (x, y) = (self.session.x(), self.session.y());
        step(op, "move X", x.move_absolute(x_target, 0)).await?;
        step(op, "move Y", y.move_absolute(y_target, 0)).await?;
        step(op, "wait for X and Y", self.wait_both(x, y)).await
    }

    async fn lower_z(&self, op: Operation, z_target: i32) -> Result<(), SequenceError> {
        let z = self.session.z();
        step(op, "lower Z", z.move_absolute(z_target, 0)).await?;
        step(op, "wait for Z", self.wait(z)).await
    }

    async fn wait(&self, axis: &dyn Axis) -> Result<(), AxisError> {
        wait_stopped(axis, self.config.poll_interval(), self.config.stop_timeout()).await
    }

    async fn wait_both(&self, a: &dyn Axis, b: &dyn Axis) -> Result<(), AxisError> {
        tokio::try_join!(self.wait(a), self.wait(b)).map(|_| ())
    }
}

async fn step<T>(
    operation: Operation,
    step: &'static str,
    action: impl Future<Output = Result<T, AxisError>>,
) -> Result<T, SequenceError> {
    debug!("{}: {}", operation, step);
    action.await.map_err(|source| {
        error!("{} aborted at '{}': {}", operation, step, source);
        SequenceError {
            operation,
            step,
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        axis::fault_flags::FaultFlags,
        coordinate::config::StepCalibration,
        simulator::{
            config::SimulatorConfig,
            journal::{AxisOp, CallJournal, OpKind},
            SimulatedAxis,
        },
    };

    struct Rig {
        journal: CallJournal,
        x: Arc<SimulatedAxis>,
        y: Arc<SimulatedAxis>,
        session: StageSession,
    }

    async fn rig() -> Rig {
        let journal = CallJournal::new();
        let make = |name: &str| {
            Arc::new(
                SimulatedAxis::new(
                    name,
                    SimulatorConfig {
                        speed: 50_000_000,
                        ..SimulatorConfig::default()
                    },
                )
                .with_journal(journal.clone()),
            )
        };
        let x = make("X");
        let y = make("Y");
        let session = StageSession::new(x.clone(), y.clone(), make("Z"));
        session.open_all().await.unwrap();
        journal.clear();
        Rig {
            journal,
            x,
            y,
            session,
        }
    }

    fn fast_config() -> SequencerConfig {
        SequencerConfig {
            poll_interval_ms: 1,
            ..SequencerConfig::default()
        }
    }

    #[tokio::test]
    async fn place_disc_clears_z_before_xy_and_lowers_after() {
        let rig = rig().await;
        let seq = MotionSequencer::new(&rig.session, fast_config());
        let coord = StepCoordinate::new(23.4, 24.0, &StepCalibration::default());
        seq.place_disc(&coord).await.unwrap();

        let commands: Vec<(String, AxisOp)> = rig
            .journal
            .commands()
            .into_iter()
            .map(|c| (c.axis, c.op))
            .collect();
        let expected = vec![
            ("Z".to_string(), AxisOp::MoveAbsolute(60_000)),
            ("Z".to_string(), AxisOp::WaitForStop),
            ("X".to_string(), AxisOp::MoveAbsolute(-187_200)),
            ("Y".to_string(), AxisOp::MoveAbsolute(-192_000)),
            ("X".to_string(), AxisOp::WaitForStop),
            ("Y".to_string(), AxisOp::WaitForStop),
            ("Z".to_string(), AxisOp::MoveAbsolute(-12_400)),
            ("Z".to_string(), AxisOp::WaitForStop),
        ];
        assert_eq!(commands, expected);

        let report = rig.session.report_positions().await.unwrap();
        assert_eq!(report.x.steps, -187_200);
        assert_eq!(report.y.steps, -192_000);
        assert_eq!(report.z.steps, -12_400);
    }

    #[tokio::test]
    async fn disc_load_position_ignores_millimeter_target() {
        let rig = rig().await;
        let seq = MotionSequencer::new(&rig.session, fast_config());
        let coord = StepCoordinate::new(5.0, 5.0, &StepCalibration::default());
        seq.disc_load_position(&coord).await.unwrap();

        let j = &rig.journal;
        let z_up = j.position("Z", AxisOp::MoveAbsolute(60_000)).unwrap();
        let x_move = j.position("X", AxisOp::MoveAbsolute(296_000)).unwrap();
        let y_move = j.position("Y", AxisOp::MoveAbsolute(-184_000)).unwrap();
        let z_down = j.position("Z", AxisOp::MoveAbsolute(-10_400)).unwrap();
        assert!(z_up < x_move && z_up < y_move);
        assert!(j.last_of("X", OpKind::WaitForStop).unwrap() < z_down);
        assert!(j.last_of("Y", OpKind::WaitForStop).unwrap() < z_down);
        assert!(j.position("X", AxisOp::MoveAbsolute(-40_000)).is_none());
    }

    #[tokio::test]
    async fn home_xy_raises_z_before_homing() {
        let rig = rig().await;
        let seq = MotionSequencer::new(&rig.session, fast_config());
        seq.home_xy().await.unwrap();

        let j = &rig.journal;
        let raise = j.position("Z", AxisOp::MoveRelative(80_000)).unwrap();
        let z_wait = j.position("Z", AxisOp::WaitForStop).unwrap();
        let x_home = j.position("X", AxisOp::Home).unwrap();
        let y_home = j.position("Y", AxisOp::Home).unwrap();
        assert!(raise < z_wait && z_wait < x_home && z_wait < y_home);
        assert_eq!(j.count("X", OpKind::WaitForStop), 1);
        assert_eq!(j.count("Y", OpKind::WaitForStop), 1);
        assert!(rig.session.x().get_status().await.unwrap().homed);
    }

    #[tokio::test]
    async fn home_z_and_zeroing_wait_for_completion() {
        let rig = rig().await;
        let seq = MotionSequencer::new(&rig.session, fast_config());
        seq.home_z().await.unwrap();
        seq.set_zero_x().await.unwrap();
        seq.set_zero_y().await.unwrap();
        seq.set_zero_z().await.unwrap();

        let calls: Vec<AxisOp> = rig.journal.commands().into_iter().map(|c| c.op).collect();
        assert_eq!(
            calls,
            vec![
                AxisOp::Home,
                AxisOp::WaitForStop,
                AxisOp::Zero,
                AxisOp::WaitForStop,
                AxisOp::Zero,
                AxisOp::WaitForStop,
                AxisOp::Zero,
                AxisOp::WaitForStop,
            ]
        );
    }

    #[tokio::test]
    async fn fault_on_x_move_aborts_before_lowering_z() {
        let rig = rig().await;
        rig.x.inject_fault(OpKind::MoveAbsolute, FaultFlags::DRIVER_FAULT);
        let seq = MotionSequencer::new(&rig.session, fast_config());
        let coord = StepCoordinate::new(1.0, 1.0, &StepCalibration::default());

        let err = seq.place_disc(&coord).await.unwrap_err();
        assert_eq!(err.operation, Operation::PlaceDisc);
        assert_eq!(err.step, "move X");
        assert_eq!(err.axis(), "X");
        assert!(matches!(err.source, AxisError::ControllerFault { .. }));

        let j = &rig.journal;
        assert_eq!(j.count("Z", OpKind::MoveAbsolute), 1);
        assert!(j.position("Z", AxisOp::MoveAbsolute(-12_400)).is_none());
        assert_eq!(j.count("Y", OpKind::MoveAbsolute), 0);
    }

    #[tokio::test]
    async fn fault_while_waiting_for_y_aborts_before_lowering_z() {
        let rig = rig().await;
        rig.y.inject_fault(OpKind::WaitForStop, FaultFlags::OVERHEAT);
        let seq = MotionSequencer::new(&rig.session, fast_config());
        let coord = StepCoordinate::new(1.0, 1.0, &StepCalibration::default());

        let err = seq.place_disc(&coord).await.unwrap_err();
        assert_eq!(err.step, "wait for X and Y");
        assert_eq!(err.axis(), "Y");
        assert!(rig.journal.position("Z", AxisOp::MoveAbsolute(-12_400)).is_none());
        assert_eq!(rig.journal.count("Z", OpKind::MoveAbsolute), 1);
    }

    #[tokio::test]
    async fn closed_session_reports_device_not_open() {
        let rig = rig().await;
        rig.session.close_all().await.unwrap();
        let seq = MotionSequencer::new(&rig.session, fast_config());
        let err = seq.home_z().await.unwrap_err();
        assert!(matches!(err.source, AxisError::DeviceNotOpen { .. }));
        assert_eq!(err.step, "start Z homing");
    }

    #[tokio::test]
    async fn wait_bound_expires_as_timeout() {
        let journal = CallJournal::new();
        let slow = |name: &str| {
            Arc::new(
                SimulatedAxis::new(
                    name,
                    SimulatorConfig {
                        speed: 10,
                        ..SimulatorConfig::default()
                    },
                )
                .with_journal(journal.clone()),
            )
        };
        let session = StageSession::new(slow("X"), slow("Y"), slow("Z"));
        session.open_all().await.unwrap();
        let seq = MotionSequencer::new(
            &session,
            SequencerConfig {
                poll_interval_ms: 1,
                stop_timeout_ms: 20,
                ..SequencerConfig::default()
            },
        );
        let coord = StepCoordinate::loading(&StepCalibration::default());
        let err = seq.place_disc(&coord).await.unwrap_err();
        assert_eq!(err.step, "wait for Z clearance");
        assert!(matches!(err.source, AxisError::ControllerTimeout { .. }));
        assert_eq!(journal.count("X", OpKind::MoveAbsolute), 0);
    }
}
