//! Screen Recorder: console-driven screen recording through an external encoder.

mod app;
mod app_command;
mod clock_ticker;
mod command_console;
mod config;
mod error;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    clock_ticker::ClockTicker,
    command_console::CommandConsole,
    error::{AppError, Result as AppResult},
};

use crate::config::Config;

use screen_recorder_core::{EncoderSupervisor, RecordingSession, SegmentManager};

use std::{fs, time::Duration};

use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "screen_recorder=debug,screen_recorder_core=debug,encoder=debug";
const COMMAND_CHANNEL_CAPACITY: usize = 32;
const DIAGNOSTIC_CHANNEL_CAPACITY: usize = 64;
const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Application entry point.
fn main() {
    // Dropping the guard flushes the log file.
    let log_guard = init_tracing();

    let config_path = match Config::config_path() {
        Ok(path) => path,
        Err(e) => {
            error!("Failed to locate config directory: {:?}", e);
            std::process::exit(1);
        }
    };

    let config = match Config::load_from(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        error!("Config validation failed: {:?}", e);
        std::process::exit(1);
    }

    let backend = match config.capture_backend() {
        Ok(backend) => backend,
        Err(e) => {
            error!("Failed to select capture backend: {:?}", e);
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    let exit_code = rt.block_on(async {
        let (diagnostics_tx, diagnostics_rx) = mpsc::channel(DIAGNOSTIC_CHANNEL_CAPACITY);
        let supervisor = EncoderSupervisor::new(
            &config.encoder.binary,
            backend,
            diagnostics_tx,
            config.encoder.graceful_timeout(),
        );

        if let Err(e) = supervisor.verify().await {
            error!("Encoder is not usable: {:?}", e);
            return 1;
        }

        let segments = SegmentManager::new(supervisor, &config.output.directory);
        let session = RecordingSession::new(segments);

        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let console = CommandConsole::new(command_tx.clone());
        let ticker = ClockTicker::new(command_tx);

        let app = App {
            session,
            config,
            config_path,
            selection: None,
            command_rx,
            diagnostics_rx,
            shutdown_tx,
        };

        let console_shutdown = shutdown_rx.clone();
        tokio::join!(
            async {
                if let Err(e) = console.run(console_shutdown).await {
                    error!(error = ?e, "Command console error");
                }
            },
            async {
                if let Err(e) = ticker.run(shutdown_rx).await {
                    error!(error = ?e, "Clock ticker error");
                }
            },
            async {
                if let Err(e) = app.run().await {
                    error!(error = ?e, "App error");
                }
            }
        );

        0
    });

    // The console reader may still be blocked on stdin.
    rt.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);
    info!("Exiting");
    drop(log_guard);

    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// Console output plus a daily rolling log file.
///
/// Returns the file writer's guard, or `None` when logging to file is not
/// possible, in which case only the console is used.
fn init_tracing() -> Option<WorkerGuard> {
    let filter =
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let file_appender = Config::log_dir().ok().and_then(|dir| {
        fs::create_dir_all(&dir).ok()?;
        RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("screen-recorder")
            .filename_suffix("log")
            .build(&dir)
            .ok()
    });

    match file_appender {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter())
                .with(fmt::layer())
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter())
                .with(fmt::layer())
                .init();
            warn!("Log directory unavailable, logging to console only");
            None
        }
    }
}
