use std::time::Duration;

use crate::errors::ProviderError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF_STEP: Duration = Duration::from_millis(2000);

/// How a failed attempt should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    /// The service is overloaded; worth another attempt.
    Overloaded,
    /// The service answered with nothing usable; worth another attempt.
    Empty,
    /// Anything else. Not retried.
    Fatal,
}

/// Retry schedule for completions: a fixed attempt budget with linear
/// backoff (`attempt * step`, so 2s, 4s, 6s for the default step).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_MAX_ATTEMPTS, step: DEFAULT_BACKOFF_STEP }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, step: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), step }
    }

    pub fn with_max_attempts(self, max_attempts: u32) -> Self {
        Self::new(max_attempts, self.step)
    }

    /// Delay to wait after failed attempt number `attempt` (1-based), or
    /// `None` once the budget is spent.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts.max(1) {
            return None;
        }
        Some(self.step * attempt)
    }

    /// The full sleep schedule for an always-failing call.
    pub fn schedule(&self) -> Vec<Duration> {
        (1..).map_while(|a| self.delay_after(a)).collect()
    }
}

/// Overload is recognised from a 503 status or an "overloaded"/"503" marker
/// in the error text; every other failure is fatal.
pub fn classify(err: &ProviderError) -> Class {
    if err.status == Some(503) {
        return Class::Overloaded;
    }
    let msg = err.message.to_lowercase();
    if msg.contains("503") || msg.contains("overloaded") {
        Class::Overloaded
    } else {
        Class::Fatal
    }
}
