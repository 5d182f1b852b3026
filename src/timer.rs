//! One-shot countdown timer used to hold stage 2 dwell times
//!
//! Stage 2 keeps sweeping the panel until the timer expires, so the dwell
//! time is honoured no matter how long each sweep takes.

/// One-shot countdown timer
pub trait CountdownTimer {
    /// Arm the timer for `duration_ms` milliseconds, replacing any running countdown
    fn start(&mut self, duration_ms: u32);

    /// Milliseconds left before expiry, rounded up; 0 once expired
    fn remaining_ms(&mut self) -> u32;
}

/// Countdown timer backed by [`std::time::Instant`]
#[cfg(feature = "std")]
#[derive(Clone, Copy, Debug, Default)]
pub struct StdTimer {
    deadline: Option<std::time::Instant>,
}

#[cfg(feature = "std")]
impl StdTimer {
    /// Create an unarmed timer
    pub const fn new() -> Self {
        Self { deadline: None }
    }
}

#[cfg(feature = "std")]
impl CountdownTimer for StdTimer {
    fn start(&mut self, duration_ms: u32) {
        let duration = std::time::Duration::from_millis(u64::from(duration_ms));
        self.deadline = Some(std::time::Instant::now() + duration);
    }

    fn remaining_ms(&mut self) -> u32 {
        let Some(deadline) = self.deadline else {
            return 0;
        };
        let left = deadline.saturating_duration_since(std::time::Instant::now());
        if left.is_zero() {
            self.deadline = None;
            return 0;
        }
        let micros = left.as_micros().div_ceil(1000);
        u32::try_from(micros).unwrap_or(u32::MAX)
    }
}
