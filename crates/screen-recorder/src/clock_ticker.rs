use crate::{AppCommand, AppError, AppResult};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use tokio::{
    sync::{mpsc, watch},
    time::{MissedTickBehavior, interval},
};
use tracing::{info, instrument};

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Sends [`AppCommand::Tick`] once per second until shutdown.
///
/// Ticks drive the elapsed-time clock and the encoder liveness check.
pub struct ClockTicker {
    command_tx: mpsc::Sender<AppCommand>,
}

impl ClockTicker {
    /// Create a ticker sending to `command_tx`.
    pub fn new(command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self { command_tx }
    }

    /// Tick until the shutdown flag changes.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let mut ticks = interval(TICK_INTERVAL);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticks.tick().await;

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Clock ticker shutting down");
                    break;
                }
                _ = ticks.tick() => {
                    self.command_tx
                        .send(AppCommand::Tick)
                        .await
                        .map_err(|e| AppError::ChannelSendFailed {
                            message: format!("Failed to send tick: {}", e),
                            location: ErrorLocation::from(Location::caller()),
                        })?;
                }
            }
        }

        Ok(())
    }
}
