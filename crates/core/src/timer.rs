use crate::time::format_clock;
use crate::view::round_percentage;

/// Remaining seconds at or below which the countdown is flagged as low.
pub const LOW_TIME_SECONDS: u32 = 30;

/// Remaining seconds at or below which the countdown is flagged as critical.
pub const CRITICAL_TIME_SECONDS: u32 = 10;

/// Countdown for a single question interval.
///
/// The timer is driven externally: whoever owns it calls [`CountdownTimer::tick`]
/// once per elapsed second while it is running. Expiry is reported through
/// [`CountdownTimer::take_expiry`], which yields `true` at most once per interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownTimer {
    interval_minutes: u32,
    total_seconds: u32,
    remaining_seconds: u32,
    running: bool,
    expiry_signaled: bool,
}

impl CountdownTimer {
    /// Creates a stopped timer for an interval of `minutes`.
    #[must_use]
    pub fn new(minutes: u32) -> Self {
        let total_seconds = minutes.saturating_mul(60);
        Self {
            interval_minutes: minutes,
            total_seconds,
            remaining_seconds: total_seconds,
            running: false,
            expiry_signaled: false,
        }
    }

    /// Starts counting down. No-op if already running or expired.
    pub fn start(&mut self) {
        if self.running || self.remaining_seconds == 0 {
            return;
        }
        self.running = true;
    }

    /// Pauses the countdown, keeping the time already spent.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Stops and restores the full interval, optionally with a new length.
    ///
    /// Partial elapsed time is discarded and the expiry guard is re-armed.
    pub fn reset(&mut self, minutes: Option<u32>) {
        *self = Self::new(minutes.unwrap_or(self.interval_minutes));
    }

    /// Advances the countdown by one second.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.running = false;
        }
    }

    /// Returns `true` the first time the expired condition is observed after a reset.
    pub fn take_expiry(&mut self) -> bool {
        if self.is_expired() && !self.expiry_signaled {
            self.expiry_signaled = true;
            return true;
        }
        false
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining_seconds == 0
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn interval_minutes(&self) -> u32 {
        self.interval_minutes
    }

    #[must_use]
    pub fn total_seconds(&self) -> u32 {
        self.total_seconds
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    #[must_use]
    pub fn time_spent(&self) -> u32 {
        self.total_seconds - self.remaining_seconds
    }

    /// Share of the interval already used, rounded to a whole percent.
    #[must_use]
    pub fn progress_percentage(&self) -> u32 {
        round_percentage(self.time_spent() as usize, self.total_seconds as usize)
    }

    #[must_use]
    pub fn is_low_time(&self) -> bool {
        self.remaining_seconds > 0 && self.remaining_seconds <= LOW_TIME_SECONDS
    }

    #[must_use]
    pub fn is_critical_time(&self) -> bool {
        self.remaining_seconds > 0 && self.remaining_seconds <= CRITICAL_TIME_SECONDS
    }

    #[must_use]
    pub fn remaining_formatted(&self) -> String {
        format_clock(self.remaining_seconds)
    }
}
