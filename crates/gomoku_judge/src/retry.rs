//! Bounded retry with transient/fatal classification.

use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Outcome of one attempt.
pub enum Attempt<T, E> {
    /// The operation settled with a value.
    Settled(T),
    /// Transient failure. Retried until the budget runs out, at which point
    /// the last transient error surfaces.
    Transient(E),
}

/// Runs `op` up to `max_attempts` times, sleeping `delay` between
/// transient failures.
///
/// The operation classifies itself: `Err` is fatal and short-circuits the
/// remaining attempts; `Ok(Attempt::Transient)` is retried. A budget of
/// zero is treated as one attempt.
pub async fn bounded<T, E, F>(max_attempts: u32, delay: Duration, mut op: F) -> Result<T, E>
where
    F: AsyncFnMut(u32) -> Result<Attempt<T, E>, E>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await? {
            Attempt::Settled(value) => return Ok(value),
            Attempt::Transient(e) => {
                if attempt >= max_attempts {
                    return Err(e);
                }
                debug!(attempt, max_attempts, "Transient failure, retrying");
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
