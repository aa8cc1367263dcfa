//! Deferred "wait until present" primitive.

use std::time::Duration;

use tokio::time::{Instant, sleep};

/// Poll `predicate` every `interval` until it holds or `timeout` elapses.
///
/// Resolves to `false` on timeout instead of hanging.
pub async fn wait_until<F>(mut predicate: F, timeout: Duration, interval: Duration) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        if predicate() {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        sleep(interval.min(deadline - now)).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_resolves_when_predicate_holds() {
        let polls = Arc::new(AtomicU32::new(0));
        let counter = polls.clone();
        let found = wait_until(
            move || counter.fetch_add(1, Ordering::SeqCst) >= 3,
            Duration::from_secs(5),
            Duration::from_millis(50),
        )
        .await;
        assert!(found);
        assert_eq!(polls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out() {
        let start = Instant::now();
        let found = wait_until(|| false, Duration::from_secs(1), Duration::from_millis(50)).await;
        assert!(!found);
        assert!(start.elapsed() >= Duration::from_secs(1));
    }
}
