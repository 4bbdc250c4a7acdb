//! pogo-bridge entry point.
//!
//! Opens the serial line and the keyboard, then runs a single-threaded event
//! loop that owns the [`BridgeSession`].
//!
//! # Usage
//!
//! ```text
//! pogo-bridge [OPTIONS]
//!
//! Options:
//!   --config    <PATH>   TOML configuration file [default: pogo-bridge.toml]
//!   --serial    <PATH>   Serial device to the host
//!   --hidraw    <PATH>   hidraw node of the USB keyboard
//!   --log-level <LEVEL>  Log filter used when RUST_LOG is unset
//! ```
//!
//! Command-line values override the configuration file; `RUST_LOG` overrides
//! both for logging.
//!
//! # Event loop (for beginners)
//!
//! ```text
//! serial reader ──bytes──►┐
//! hidraw reader ─reports─►├─ tokio::select! ─► BridgeSession ─► serial writer
//! console ───────abort───►│
//! poll ticker ───────────►┘
//! ```
//!
//! The reader tasks never touch protocol state; they only forward what they
//! read. Because the loop handles one arm at a time on a current-thread
//! runtime, the session needs no locks.
//!
//! Stdin and hidraw reads run on blocking threads that cannot be cancelled,
//! so the runtime is shut down in the background once the loop ends.

use std::future::Future;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tokio::runtime;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pogo_bridge::application::BridgeSession;
use pogo_bridge::infrastructure::config::BridgeConfig;
use pogo_bridge::infrastructure::console::{self, ConsoleCommand};
use pogo_bridge::infrastructure::hidraw;
use pogo_bridge::infrastructure::serial::{self, SerialPort};
use pogo_core::CommandDispatcher;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// USB keyboard to pogo serial protocol bridge.
#[derive(Debug, Parser)]
#[command(
    name = "pogo-bridge",
    about = "Bridges a USB HID keyboard to the pogo serial keyboard protocol",
    version
)]
struct Cli {
    /// Path to the TOML configuration file. A missing file means defaults.
    #[arg(long, default_value = "pogo-bridge.toml", env = "POGO_CONFIG")]
    config: PathBuf,

    /// Serial device connected to the host.
    #[arg(long, env = "POGO_SERIAL")]
    serial: Option<PathBuf>,

    /// hidraw node of the USB keyboard.
    #[arg(long, env = "POGO_HIDRAW")]
    hidraw: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is not set (e.g. `debug`).
    #[arg(long, env = "POGO_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Cli {
    /// Loads the configuration file and applies command-line overrides.
    fn into_bridge_config(self) -> anyhow::Result<BridgeConfig> {
        let mut config = BridgeConfig::load_from(&self.config)
            .with_context(|| format!("loading {}", self.config.display()))?;
        if let Some(serial) = self.serial {
            config.serial.device = serial;
        }
        if let Some(hidraw) = self.hidraw {
            config.hid.device = hidraw;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let config = Cli::parse().into_bridge_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    block_on_detached(run(config))?
}

/// Runs `future` on a fresh current-thread runtime, then shuts the runtime
/// down without waiting for blocking reads still in flight.
fn block_on_detached<F: Future>(future: F) -> anyhow::Result<F::Output> {
    let runtime = runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;
    let output = runtime.block_on(future);
    runtime.shutdown_background();
    Ok(output)
}

async fn run(config: BridgeConfig) -> anyhow::Result<()> {
    info!(
        "pogo-bridge starting: serial={}, keyboard={}",
        config.serial.device.display(),
        config.hid.device.display()
    );

    // ── Devices and reader tasks ──────────────────────────────────────────────
    let (port, serial_reader) = SerialPort::open(&config.serial.device).await?;
    let keyboard = hidraw::open(&config.hid.device).await?;

    let (serial_tx, mut serial_rx) = mpsc::channel(64);
    let (hid_tx, mut hid_rx) = mpsc::channel(64);
    let (console_tx, mut console_rx) = mpsc::channel(4);
    serial::spawn_reader(serial_reader, serial_tx);
    hidraw::spawn_reader(keyboard, config.hid.report_id, hid_tx);
    console::spawn_listener(tokio::io::stdin(), console_tx);

    let mut session = BridgeSession::new(
        port,
        CommandDispatcher::new(config.identity.clone()),
        config.session.keep_alive(),
    );

    let mut ticker = time::interval(config.session.poll_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut console_open = true;

    info!("waiting for host handshake (type '.' + Enter to abort the session)");

    // ── Main event loop ───────────────────────────────────────────────────────
    loop {
        tokio::select! {
            chunk = serial_rx.recv() => {
                let Some(chunk) = chunk else {
                    warn!("serial line closed");
                    break;
                };
                let now = Instant::now();
                session.on_serial_bytes(&chunk, now).await?;
                session.service(now).await?;
            }
            report = hid_rx.recv() => {
                let Some(report) = report else {
                    warn!("keyboard disconnected");
                    break;
                };
                session.on_keyboard_report(&report);
                session.service(Instant::now()).await?;
            }
            command = console_rx.recv(), if console_open => match command {
                Some(ConsoleCommand::Abort) => session.abort().await?,
                None => console_open = false,
            },
            _ = ticker.tick() => {
                session.service(Instant::now()).await?;
            }
            _ = &mut shutdown => {
                info!("received Ctrl+C, shutting down");
                break;
            }
        }
    }

    info!("pogo-bridge stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc as std_mpsc;

    #[test]
    fn test_block_on_detached_does_not_wait_for_blocking_reads() {
        // Arrange – a blocking task that only ends once `release` is dropped
        let (release, blocked) = std_mpsc::channel::<()>();

        // Act
        let output = block_on_detached(async move {
            tokio::task::spawn_blocking(move || blocked.recv());
            7
        })
        .unwrap();

        // Assert
        assert_eq!(output, 7);
        drop(release);
    }

    #[test]
    fn test_cli_overrides_config_file() {
        // Arrange
        let cli = Cli::parse_from([
            "pogo-bridge",
            "--config",
            "/nonexistent/pogo-bridge.toml",
            "--serial",
            "/dev/ttyUSB0",
            "--log-level",
            "debug",
        ]);

        // Act
        let config = cli.into_bridge_config().unwrap();

        // Assert
        assert_eq!(config.serial.device, PathBuf::from("/dev/ttyUSB0"));
        assert_eq!(config.hid.device, PathBuf::from("/dev/hidraw0"));
        assert_eq!(config.logging.level, "debug");
    }
}
