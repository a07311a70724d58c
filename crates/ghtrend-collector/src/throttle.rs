use std::time::Duration;

use tokio::time::{sleep_until, Instant};

/// Enforces a minimum spacing between successive fetches.
///
/// The first [`Throttle::ready`] returns immediately; each later call waits
/// until `spacing` has elapsed since the previous one returned.
#[derive(Debug)]
pub struct Throttle {
    spacing: Duration,
    last: Option<Instant>,
}

impl Throttle {
    #[must_use]
    pub fn new(spacing: Duration) -> Self {
        Self {
            spacing,
            last: None,
        }
    }

    pub async fn ready(&mut self) {
        if let Some(last) = self.last {
            sleep_until(last + self.spacing).await;
        }
        self.last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_call_does_not_wait() {
        let start = Instant::now();
        let mut throttle = Throttle::new(Duration::from_secs(5));
        throttle.ready().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn consecutive_calls_are_spaced() {
        let mut throttle = Throttle::new(Duration::from_secs(1));
        let mut marks = Vec::new();
        for _ in 0..4 {
            throttle.ready().await;
            marks.push(Instant::now());
        }
        for pair in marks.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(1));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_work_between_calls_counts_toward_spacing() {
        let mut throttle = Throttle::new(Duration::from_secs(1));
        throttle.ready().await;
        tokio::time::sleep(Duration::from_secs(3)).await;

        let before = Instant::now();
        throttle.ready().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
    }
}
