use std::{io::Read, path::PathBuf, sync::Arc, thread};

use anyhow::{Context, Result};
use clap::Parser;
use discplace::{
    axis::Axis, config::AppConfig, console::Console, session::StageSession,
    simulator::SimulatedAxis,
};
use tokio::{
    io::{AsyncWriteExt, DuplexStream},
    sync::broadcast,
};
use tracing::{error, info, Level};

/// Disc placement stage controller
#[derive(Parser, Debug)]
#[command(name = "discplace")]
#[command(version)]
#[command(about = "Collision-safe disc placement on a three-axis stage")]
struct Args {
    /// JSON configuration file; defaults apply when omitted
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    let config = match &args.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AppConfig::default(),
    };

    info!("Starting discplace with simulated axes");

    let devices: Vec<Arc<dyn Axis>> = ["X", "Y", "Z"]
        .into_iter()
        .map(|name| {
            Arc::new(SimulatedAxis::new(name, config.simulator.clone())) as Arc<dyn Axis>
        })
        .collect();
    let session = StageSession::from_devices(devices)?;
    session.open_all().await?;
    session.apply_speeds(&config.speeds).await?;
    info!("Session {} ready", session.id());

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Cannot listen for interrupts: {}", e);
                // a dropped sender would read as an interrupt
                std::future::pending::<()>().await;
            }
            info!("Interrupt received");
            let _ = shutdown_tx.send(());
        }
    });

    let mut console = Console::new(
        &session,
        &config,
        spawn_stdin_reader()?,
        tokio::io::stdout(),
        shutdown_rx,
    );
    let outcome = console.run().await;
    if let Err(e) = &outcome {
        error!("Console failed: {:#}", e);
    }

    if let Err(e) = session.stop_all().await {
        error!("Failed to stop every axis: {}", e);
    }
    session.close_all().await?;
    info!("discplace shutdown complete");

    outcome
}

/// Pumps stdin into an in-memory pipe from a plain thread, so a pending read
/// never holds up runtime shutdown.
fn spawn_stdin_reader() -> Result<DuplexStream> {
    let (reader, mut writer) = tokio::io::duplex(4096);
    let runtime = tokio::runtime::Handle::current();
    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            let mut stdin = std::io::stdin().lock();
            let mut buf = [0u8; 1024];
            loop {
                let n = match stdin.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => n,
                    Err(e) => {
                        error!("Reading stdin failed: {}", e);
                        break;
                    }
                };
                if runtime.block_on(writer.write_all(&buf[..n])).is_err() {
                    break;
                }
            }
        })
        .context("spawning the stdin reader")?;
    Ok(reader)
}
