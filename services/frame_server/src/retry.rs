//! Fixed-attempt retry with a caller-supplied backoff schedule.

use std::{fmt::Display, future::Future, time::Duration};

use tracing::debug;

type BackoffFn = Box<dyn Fn(u32) -> Duration + Send + Sync>;

pub struct RetryPolicy {
    max_attempts: u32,
    backoff: BackoffFn,
}

impl RetryPolicy {
    /// `backoff(n)` is the pause after failed attempt `n` (1-based).
    pub fn new(max_attempts: u32, backoff: impl Fn(u32) -> Duration + Send + Sync + 'static) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: Box::new(backoff),
        }
    }

    /// Attempt `n` is followed by a pause of `n * unit`.
    pub fn linear(max_attempts: u32, unit: Duration) -> Self {
        Self::new(max_attempts, move |attempt| unit.saturating_mul(attempt))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self, attempt: u32) -> Duration {
        (self.backoff)(attempt)
    }

    /// Run `op` until it succeeds or the attempts are used up. The last error
    /// is returned; there is no pause after the final attempt.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= self.max_attempts => return Err(e),
                Err(e) => {
                    let pause = self.backoff(attempt);
                    debug!(
                        "{} failed (attempt {}/{}): {}; retrying in {:?}",
                        label, attempt, self.max_attempts, e, pause
                    );
                    tokio::time::sleep(pause).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}
