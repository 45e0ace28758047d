pub mod config;

use anyhow::Result;
use futures::StreamExt;
use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt},
    sync::{broadcast, mpsc},
};
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};
use tracing::{debug, info, warn};

use crate::{
    config::AppConfig,
    coordinate::StepCoordinate,
    grid::{GridSelection, GridTarget},
    jog::{
        keys::{Key, KeyState, LatchedKeys},
        ManualJogLoop,
    },
    mode::OperatingMode,
    sequencer::MotionSequencer,
    session::StageSession,
};

const MANUAL_HELP: &str = "Manual control activated!
  Controls (one line = the keys currently held, empty line = none):
  left / right: X axis
  up / down:    Y axis
  + / -:        Z axis
  p:            print current positions
  esc:          exit manual mode";

const GRID_PROMPT: &str = "Grid selection: <x marks> <x shape> <y marks> <y shape> \
                           <delta x um> <delta y um> (blank line to cancel)";

enum ModeOutcome {
    Completed,
    Skipped,
    Aborted(String),
}

/// Line-oriented operator front end: mode menu, grid selection, manual
/// control, and the return-to-menu prompt.
///
/// An interrupt on `shutdown` (or its sender going away) ends the console
/// at the prompt it arrives at and cancels manual control.
pub struct Console<'a, R, W> {
    session: &'a StageSession,
    config: &'a AppConfig,
    lines: FramedRead<R, LinesCodec>,
    output: W,
    shutdown: broadcast::Receiver<()>,
    interrupted: bool,
}

impl<'a, R, W> Console<'a, R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(
        session: &'a StageSession,
        config: &'a AppConfig,
        input: R,
        output: W,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        let codec = LinesCodec::new_with_max_length(config.console.max_line_length);
        Self {
            session,
            config,
            lines: FramedRead::new(input, codec),
            output,
            shutdown,
            interrupted: false,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub async fn run(&mut self) -> Result<()> {
        while !self.interrupted {
            self.show_menu().await?;
            let Some(line) = self.next_line().await? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            let mode = match line.parse::<OperatingMode>() {
                Ok(mode) => mode,
                Err(e) => {
                    self.say(&format!("Invalid input: {e}")).await?;
                    continue;
                }
            };
            if mode == OperatingMode::Exit {
                break;
            }

            info!("Selected mode '{}'", mode);
            match self.execute(mode).await? {
                ModeOutcome::Skipped => continue,
                ModeOutcome::Completed => {
                    self.say(&format!("Mode '{mode}' completed.")).await?;
                }
                ModeOutcome::Aborted(reason) => {
                    self.say(&format!("Mode '{mode}' aborted: {reason}")).await?;
                    self.show_statuses().await?;
                }
            }
            if self.interrupted {
                break;
            }

            self.say("Would you like to return to the main menu? [y/n]")
                .await?;
            match self.next_line().await? {
                Some(answer) if is_yes(&answer) => {}
                _ => break,
            }
        }

        self.say("Program exited.").await?;
        Ok(())
    }

    async fn execute(&mut self, mode: OperatingMode) -> Result<ModeOutcome> {
        let config = self.config;
        let sequencer = MotionSequencer::new(self.session, config.sequencer.clone());

        let result = match mode {
            OperatingMode::PlacementCoordinates => {
                let Some(target) = self.prompt_target().await? else {
                    return Ok(ModeOutcome::Skipped);
                };
                let coord = StepCoordinate::new(target.x_mm, target.y_mm, &config.calibration);
                let placed = sequencer.place_disc(&coord).await;
                if placed.is_ok() {
                    self.show_positions().await?;
                }
                placed.map_err(|e| e.to_string())
            }
            OperatingMode::LoadingPosition => {
                let coord = StepCoordinate::loading(&config.calibration);
                sequencer
                    .disc_load_position(&coord)
                    .await
                    .map_err(|e| e.to_string())
            }
            OperatingMode::ManualControl => {
                self.say(MANUAL_HELP).await?;
                let jogged = self.manual_control().await.map_err(|e| e.to_string());
                self.say("Manual control deactivated! All axes stopped.")
                    .await?;
                jogged
            }
            OperatingMode::XyHome => sequencer.home_xy().await.map_err(|e| e.to_string()),
            OperatingMode::ZHome => sequencer.home_z().await.map_err(|e| e.to_string()),
            OperatingMode::ZeroXy => {
                let zeroed = match sequencer.set_zero_x().await {
                    Ok(()) => sequencer.set_zero_y().await,
                    Err(e) => Err(e),
                };
                if zeroed.is_ok() {
                    self.show_positions().await?;
                }
                zeroed.map_err(|e| e.to_string())
            }
            OperatingMode::ZeroZ => {
                let zeroed = sequencer.set_zero_z().await;
                if zeroed.is_ok() {
                    self.show_positions().await?;
                }
                zeroed.map_err(|e| e.to_string())
            }
            OperatingMode::Exit => return Ok(ModeOutcome::Skipped),
        };

        Ok(match result {
            Ok(()) => ModeOutcome::Completed,
            Err(reason) => ModeOutcome::Aborted(reason),
        })
    }

    /// Re-prompts until the selection is valid; `None` on a blank line, end
    /// of input, or an interrupt.
    async fn prompt_target(&mut self) -> Result<Option<GridTarget>> {
        let config = self.config;
        let grid = &config.grid;
        loop {
            self.say(GRID_PROMPT).await?;
            let Some(line) = self.next_line().await? else {
                return Ok(None);
            };
            if line.trim().is_empty() {
                return Ok(None);
            }

            match line
                .parse::<GridSelection>()
                .and_then(|selection| grid.locate(&selection))
            {
                Ok(target) => {
                    let text = format!(
                        "Selected grid square: row {}, column {}\n\
                         Coordinates of desired point: X {:.3} mm, Y {:.3} mm",
                        target.row, target.col, target.x_mm, target.y_mm
                    );
                    self.say(&text).await?;
                    return Ok(Some(target));
                }
                Err(e) => {
                    warn!("Rejected grid selection '{}': {}", line, e);
                    self.say(&format!("Invalid input: {e}")).await?;
                }
            }
        }
    }

    async fn manual_control(&mut self) -> Result<(), crate::error::AxisError> {
        let config = self.config;
        let (tx, rx) = mpsc::channel(config.console.key_buffer);
        let mut keys = LatchedKeys::new(rx);
        let mut jog = ManualJogLoop::new(self.session, config.jog.clone());
        let lines = &mut self.lines;

        let feed = async move {
            let mut after_rejection = false;
            loop {
                let line = match lines.next().await {
                    Some(Ok(line)) => line,
                    Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                        warn!("Ignoring over-long key input");
                        after_rejection = true;
                        continue;
                    }
                    Some(Err(LinesCodecError::Io(e))) => {
                        warn!("Key input failed: {}", e);
                        break;
                    }
                    None if after_rejection => {
                        after_rejection = false;
                        continue;
                    }
                    None => break,
                };
                after_rejection = false;
                match line.parse::<KeyState>() {
                    Ok(state) => {
                        debug!("Key state: {:?}", state);
                        if tx.send(state).await.is_err() || state.is_pressed(Key::Cancel) {
                            break;
                        }
                    }
                    Err(e) => warn!("Ignoring key input: {}", e),
                }
            }
            let _ = tx.send(KeyState::of(&[Key::Cancel])).await;
            // keep the sender alive until the loop has seen the cancel
            std::future::pending::<()>().await
        };

        tokio::select! {
            result = jog.run(&mut keys, &mut self.shutdown) => result,
            () = feed => Ok(()),
        }
    }

    /// `None` once input ends or an interrupt arrives. Over-long lines are
    /// rejected and reading goes on.
    async fn next_line(&mut self) -> Result<Option<String>> {
        if self.interrupted {
            return Ok(None);
        }
        // the codec yields a single `None` after a rejected line
        let mut after_rejection = false;
        loop {
            tokio::select! {
                line = self.lines.next() => match line {
                    Some(Ok(line)) => return Ok(Some(line)),
                    Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                        warn!(
                            "Rejected operator line longer than {} bytes",
                            self.config.console.max_line_length
                        );
                        self.say("Invalid input: line too long").await?;
                        after_rejection = true;
                    }
                    Some(Err(LinesCodecError::Io(e))) => return Err(e.into()),
                    None if after_rejection => after_rejection = false,
                    None => {
                        debug!("Operator input closed");
                        return Ok(None);
                    }
                },
                _ = self.shutdown.recv() => {
                    info!("Interrupt received, leaving the console");
                    self.interrupted = true;
                    return Ok(None);
                }
            }
        }
    }

    async fn show_menu(&mut self) -> Result<()> {
        let mut menu = String::from("Choose a mode:");
        for (idx, mode) in OperatingMode::ALL.iter().enumerate() {
            menu.push_str(&format!("\n  {}. {} ({})", idx + 1, mode.label(), mode.token()));
        }
        self.say(&menu).await?;
        Ok(())
    }

    async fn show_positions(&mut self) -> Result<()> {
        let text = match self.session.report_positions().await {
            Ok(report) => report.to_string(),
            Err(e) => format!("Positions unavailable: {e}"),
        };
        self.say(&text).await?;
        Ok(())
    }

    async fn show_statuses(&mut self) -> Result<()> {
        for (id, status) in self.session.statuses().await {
            let text = match status {
                Ok(status) if status.flags.requires_inspection() => {
                    format!("{id} axis: {status}; inspect the axis before continuing")
                }
                Ok(status) => format!("{id} axis: {status}"),
                Err(e) => format!("{id} axis: status unavailable ({e})"),
            };
            self.say(&text).await?;
        }
        Ok(())
    }

    async fn say(&mut self, text: &str) -> std::io::Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
