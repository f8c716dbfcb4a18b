use crate::AppError;

use screen_recorder_core::SelectionRect;

use std::{panic::Location, str::FromStr};

use error_location::ErrorLocation;

/// Console usage, printed by `help` and after a mistyped command.
pub(crate) const HELP_TEXT: &str = "\
Commands:
  start                      start recording
  stop                       stop recording and save the file
  monitor <index>            capture another monitor
  area <x1> <y1> <x2> <y2>   capture a rectangle on the current monitor
  clear-area                 capture the whole monitor again
  status                     show state, target and elapsed time
  open                       open the output folder
  help                       show this text
  quit                       stop any recording and exit";

/// Commands sent to the main application loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Start a new recording.
    StartRecording,
    /// Stop the current recording and finalize its output.
    StopRecording,
    /// Capture the monitor at `index` from now on.
    SelectMonitor {
        /// Index into the configured monitor list.
        index: usize,
    },
    /// Capture a rectangle on the current monitor.
    SelectArea {
        /// Rectangle in monitor-local coordinates.
        rect: SelectionRect,
    },
    /// Capture the whole monitor again.
    ClearArea,
    /// Report session state.
    Status,
    /// Open the output directory in the file manager.
    OpenOutput,
    /// Print console usage.
    Help,
    /// One second of wall time passed.
    Tick,
    /// Request application shutdown.
    Shutdown,
}

impl FromStr for AppCommand {
    type Err = AppError;

    #[track_caller]
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut words = input.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(invalid(input, "empty command"));
        };
        let args: Vec<&str> = words.collect();

        let command = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("start", []) => AppCommand::StartRecording,
            ("stop", []) => AppCommand::StopRecording,
            ("monitor", [index]) => AppCommand::SelectMonitor {
                index: index
                    .parse()
                    .map_err(|_| invalid(input, "monitor index must be a non-negative number"))?,
            },
            ("area", [x1, y1, x2, y2]) => {
                let mut coords = [0i32; 4];
                for (slot, value) in coords.iter_mut().zip([x1, y1, x2, y2]) {
                    *slot = value
                        .parse()
                        .map_err(|_| invalid(input, "area corners must be whole numbers"))?;
                }
                let [x1, y1, x2, y2] = coords;
                AppCommand::SelectArea {
                    rect: SelectionRect::new(x1, y1, x2, y2),
                }
            }
            ("clear-area", []) => AppCommand::ClearArea,
            ("status", []) => AppCommand::Status,
            ("open", []) => AppCommand::OpenOutput,
            ("help" | "?", []) => AppCommand::Help,
            ("quit" | "exit", []) => AppCommand::Shutdown,
            ("start" | "stop" | "clear-area" | "status" | "open" | "help" | "quit", _) => {
                return Err(invalid(input, "takes no arguments"));
            }
            ("monitor", _) => return Err(invalid(input, "usage: monitor <index>")),
            ("area", _) => return Err(invalid(input, "usage: area <x1> <y1> <x2> <y2>")),
            _ => return Err(invalid(input, "unknown command")),
        };

        Ok(command)
    }
}

#[track_caller]
fn invalid(input: &str, reason: &str) -> AppError {
    AppError::InvalidCommand {
        input: input.trim().to_string(),
        reason: reason.to_string(),
        location: ErrorLocation::from(Location::caller()),
    }
}
