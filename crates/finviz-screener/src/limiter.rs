use std::time::Duration;

use tokio::time::{self, Instant};

/// Interval gate: permits are handed out one at a time, at least `interval`
/// apart from each other.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    interval: Duration,
    last_permit: Option<Instant>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_permit: None,
        }
    }

    /// Waits until a request may be sent, then records it as sent.
    pub async fn acquire(&mut self) {
        if let Some(last_permit) = self.last_permit {
            let ready_at = last_permit + self.interval;
            if ready_at > Instant::now() {
                log::trace!(
                    "Throttling request for {:?}",
                    ready_at.duration_since(Instant::now())
                );
                time::sleep_until(ready_at).await;
            }
        }
        self.last_permit = Some(Instant::now());
    }
}
