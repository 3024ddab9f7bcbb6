//! Fixed-interval request pacing.

use std::sync::Arc;
use std::time::TryFromFloatSecsError;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Enforces a politeness interval between consecutive external fetches.
///
/// The first `acquire` of a run returns immediately; every later one waits
/// until `interval` has passed since the previous fetch was released (or
/// acquired, if it was never released).
#[derive(Clone, Debug)]
pub struct RateLimiter {
    state: Arc<Mutex<RateLimiterState>>,
}

#[derive(Debug)]
struct RateLimiterState {
    interval: Duration,
    last_request: Option<Instant>,
}

impl RateLimiter {
    /// Create a limiter with the given interval between requests
    pub fn new(interval: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(RateLimiterState {
                interval,
                last_request: None,
            })),
        }
    }

    /// Create from a (possibly fractional) number of seconds.
    ///
    /// Fails for negative, non-finite or overflowing values.
    pub fn from_secs_f64(secs: f64) -> Result<Self, TryFromFloatSecsError> {
        Duration::try_from_secs_f64(secs).map(Self::new)
    }

    /// Limiter that never waits
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    pub async fn interval(&self) -> Duration {
        self.state.lock().await.interval
    }

    /// Wait for the politeness interval, then mark a request as started
    pub async fn acquire(&self) {
        let mut state = self.state.lock().await;

        if let Some(last) = state.last_request {
            let ready_at = last + state.interval;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }

        state.last_request = Some(Instant::now());
    }

    /// Restart the interval once a fetch has finished, successful or not
    pub async fn release(&self) {
        self.state.lock().await.last_request = Some(Instant::now());
    }
}
