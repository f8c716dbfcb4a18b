/// Elapsed recording time in whole seconds.
///
/// A plain counter advanced by the coordinator's one-second ticks. It only
/// runs between [`start`](Self::start) and [`reset`](Self::reset), and
/// switching targets mid-recording does not touch it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElapsedClock {
    seconds: u64,
    running: bool,
}

impl ElapsedClock {
    /// Start counting from zero.
    pub fn start(&mut self) {
        self.seconds = 0;
        self.running = true;
    }

    /// Advance by one second if running.
    pub fn tick(&mut self) {
        if self.running {
            self.seconds += 1;
        }
    }

    /// Stop and return to zero.
    pub fn reset(&mut self) {
        self.seconds = 0;
        self.running = false;
    }

    /// Seconds counted so far.
    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    /// Whether the clock is counting.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// `HH:MM:SS`; hours are not wrapped at 24.
    pub fn formatted(&self) -> String {
        let hours = self.seconds / 3600;
        let minutes = (self.seconds % 3600) / 60;
        let seconds = self.seconds % 60;
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}
