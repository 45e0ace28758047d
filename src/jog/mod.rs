pub mod config;
pub mod keys;
pub mod plan;

use tokio::{
    sync::broadcast,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, error, info};

use crate::{error::AxisError, session::report::PositionReport, session::StageSession};
use config::JogConfig;
use keys::{KeySource, KeyState};
use plan::{plan_tick, JogCommand};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    pub issued: Vec<JogCommand>,
    pub report: Option<PositionReport>,
}

/// Fixed-rate keyboard jogging. Every exit path leaves all axes stopped.
pub struct ManualJogLoop<'a> {
    session: &'a StageSession,
    config: JogConfig,
    previous: KeyState,
    active: bool,
}

impl<'a> ManualJogLoop<'a> {
    pub fn new(session: &'a StageSession, config: JogConfig) -> Self {
        Self {
            session,
            config,
            previous: KeyState::released(),
            active: true,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub async fn tick(&mut self, current: KeyState) -> Result<TickOutcome, AxisError> {
        if !self.active {
            return Ok(TickOutcome::default());
        }

        let issued = plan_tick(&self.previous, &current);
        let mut report = None;
        for command in &issued {
            match *command {
                JogCommand::Start { axis, direction } => {
                    let delta = direction.sign().saturating_mul(self.config.jog_steps);
                    debug!("Jogging {} axis by {}", axis, delta);
                    self.session.axis(axis).move_relative(delta, 0).await?;
                }
                JogCommand::Stop { axis } => {
                    debug!("Stopping {} axis", axis);
                    self.session.axis(axis).stop().await?;
                }
                JogCommand::ReportPositions => {
                    let positions = self.session.report_positions().await?;
                    info!("Current positions:\n{}", positions);
                    report = Some(positions);
                }
                JogCommand::Cancel => self.cancel().await?,
            }
        }

        self.previous = current;
        Ok(TickOutcome { issued, report })
    }

    /// Stops all axes and makes the loop terminal. A second call does nothing.
    pub async fn cancel(&mut self) -> Result<(), AxisError> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        info!("Manual control deactivated, stopping all axes");
        self.session.stop_all().await
    }

    /// A closed `shutdown` channel counts as an interrupt.
    pub async fn run(
        &mut self,
        keys: &mut dyn KeySource,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Result<(), AxisError> {
        info!("Manual control activated");
        let mut ticker = interval(self.config.tick());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while self.active {
            tokio::select! {
                _ = ticker.tick() => {
                    let current = keys.sample();
                    match self.tick(current).await {
                        Ok(outcome) => {
                            if outcome.report.is_some() && self.active {
                                tokio::time::sleep(self.config.print_delay()).await;
                            }
                        }
                        Err(e) => {
                            error!("Manual control aborted: {}", e);
                            if self.active {
                                self.active = false;
                                let _ = self.session.stop_all().await;
                            }
                            return Err(e);
                        }
                    }
                }
                _ = shutdown.recv() => {
                    info!("Interrupt received during manual control");
                    self.cancel().await?;
                }
            }
        }
        Ok(())
    }
}
