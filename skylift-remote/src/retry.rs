//! Bounded fixed-interval retry, used for the host reachability loop.

use std::fmt::Display;
use std::thread;
use std::time::Duration;

use tracing::warn;

/// A fixed number of attempts separated by a fixed interval (not
/// exponential). Attempt failures inside the budget are logged and
/// retried; the last error surfaces once the budget is exhausted.
#[derive(Debug, Clone, Copy)]
pub struct RetrySchedule {
    pub attempts: u32,
    pub interval: Duration,
}

impl RetrySchedule {
    pub const fn new(attempts: u32, interval: Duration) -> Self {
        Self { attempts, interval }
    }
}

/// Runs `op` until it succeeds or the schedule is exhausted. `op` receives
/// the 1-based attempt number. A schedule of zero attempts still runs once.
///
/// Only errors `is_transient` accepts are retried; a permanent error
/// returns immediately with the remaining budget unspent.
pub fn retry<T, E, F, P>(
    schedule: &RetrySchedule,
    what: &str,
    mut op: F,
    mut is_transient: P,
) -> Result<T, E>
where
    E: Display,
    F: FnMut(u32) -> Result<T, E>,
    P: FnMut(&E) -> bool,
{
    let total = schedule.attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(e) if attempt < total && is_transient(&e) => {
                warn!(
                    "{} failed (attempt {}/{}): {}. Retrying in {:?}",
                    what, attempt, total, e, schedule.interval
                );
                thread::sleep(schedule.interval);
                attempt += 1;
            }
            Err(e) => {
                warn!("{} failed (attempt {}/{}): {}", what, attempt, total, e);
                return Err(e);
            }
        }
    }
}
