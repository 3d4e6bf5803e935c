//! Bounded retry with exponential backoff.
//!
//! Each attempt produces an explicit outcome; the delay between attempts goes
//! through a `Sleeper` so tests can record delays instead of waiting.

use super::provider::DataError;
use std::time::Duration;

/// How many times to attempt an operation and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    /// Three attempts, waiting 1s, 2s and 4s after each failure.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay after the failed attempt with zero-based index `attempt`:
    /// `base_delay * 2^attempt`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Blocks the calling thread between attempts.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by `std::thread::sleep`.
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Result of driving an operation through a `RetryPolicy`.
#[derive(Debug)]
pub enum RetryOutcome<T> {
    Succeeded { value: T, attempts: u32 },
    Exhausted { attempts: u32, last_error: DataError },
}

impl<T> RetryOutcome<T> {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Succeeded { attempts, .. } | Self::Exhausted { attempts, .. } => *attempts,
        }
    }
}

/// Run `op` until it succeeds or the policy's attempts are used up.
///
/// Every failed attempt is logged with the error kind and its source chain,
/// then followed by a backoff sleep, including the final one.
pub fn retry_with_backoff<T, F>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    label: &str,
    mut op: F,
) -> RetryOutcome<T>
where
    F: FnMut() -> Result<T, DataError>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match op() {
            Ok(value) => {
                return RetryOutcome::Succeeded {
                    value,
                    attempts: attempt + 1,
                }
            }
            Err(err) => {
                let delay = policy.delay_for_attempt(attempt);
                tracing::warn!(
                    "{label} attempt {}/{} failed: {} ({}), {}",
                    attempt + 1,
                    max_attempts,
                    err.kind(),
                    error_chain(&err),
                    backoff_note(attempt + 1, max_attempts, delay)
                );
                sleeper.sleep(delay);
                attempt += 1;
                if attempt >= max_attempts {
                    return RetryOutcome::Exhausted {
                        attempts: attempt,
                        last_error: err,
                    };
                }
            }
        }
    }
}

/// Tail of the failed-attempt log line. The last attempt still backs off
/// but nothing is retried afterwards.
fn backoff_note(attempts_made: u32, max_attempts: u32, delay: Duration) -> String {
    if attempts_made >= max_attempts {
        format!("backing off {:.1}s before giving up", delay.as_secs_f64())
    } else {
        format!("retrying in {:.1}s", delay.as_secs_f64())
    }
}

/// Render an error and all of its sources as `outer: inner: ...`.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
