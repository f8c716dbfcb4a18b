//! Line-oriented command console on stdin.
//!
//! Reads one command per line and forwards it to the main application loop.
//! Mistyped commands are reported and never reach the application.

use crate::{AppCommand, AppError, AppResult, app_command::HELP_TEXT};

use std::{io::BufRead, panic::Location, time::Duration};

use error_location::ErrorLocation;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

/// Forwards parsed stdin commands to the application.
pub struct CommandConsole {
    command_tx: mpsc::Sender<AppCommand>,
}

impl CommandConsole {
    /// Create a console sending to `command_tx`.
    pub fn new(command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self { command_tx }
    }

    /// Run the console until shutdown or end of input.
    ///
    /// End of input is treated as `quit`.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let (line_tx, mut line_rx) = mpsc::channel::<String>(32);

        // Stdin has no async reader that can be cancelled, so one blocking
        // task reads lines and forwards them.
        //
        // Shutdown: when line_rx is dropped (loop breaks), the next
        // line_tx.blocking_send() fails, breaking the blocking loop.
        let handle = tokio::task::spawn_blocking(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if line_tx.blocking_send(line).is_err() {
                    break;
                }
            }
        });

        println!("{}", HELP_TEXT);

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Command console shutting down");
                    break;
                }
                line = line_rx.recv() => {
                    let Some(line) = line else {
                        info!("Console input closed, requesting shutdown");
                        self.send(AppCommand::Shutdown).await?;
                        break;
                    };
                    self.handle_line(&line).await?;
                }
            }
        }

        drop(line_rx);

        // Best-effort join: the blocking task may be stuck in a read if no
        // more input arrives. The runtime is shut down with a timeout, so a
        // stuck reader never blocks exit.
        match tokio::time::timeout(Duration::from_secs(1), handle).await {
            Ok(Ok(())) => debug!("Console reader stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Console reader task panicked"),
            Err(_) => debug!(
                "Console reader did not stop within timeout, \
                   will be cleaned up on exit"
            ),
        }

        Ok(())
    }

    async fn handle_line(&self, line: &str) -> AppResult<()> {
        if line.trim().is_empty() {
            return Ok(());
        }

        match line.parse::<AppCommand>() {
            Ok(command) => self.send(command).await,
            Err(e) => {
                warn!(error = %e, "Ignoring console input");
                println!("{}\n{}", describe_rejection(&e), HELP_TEXT);
                Ok(())
            }
        }
    }

    async fn send(&self, command: AppCommand) -> AppResult<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send {:?}: {}", e.0, e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

fn describe_rejection(error: &AppError) -> String {
    match error {
        AppError::InvalidCommand { input, reason, .. } => format!("'{}': {}", input, reason),
        other => other.to_string(),
    }
}
