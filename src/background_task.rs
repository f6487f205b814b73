use tokio::time::{interval, Duration};

use crate::limiter::rate_limiter::RateLimiterStore;

/// Periodically forgets clients whose rate limit window has elapsed.
pub async fn start_limiter_purge_task(stores: Vec<RateLimiterStore>) {
    let mut interval = interval(Duration::from_secs(60));

    loop {
        interval.tick().await;

        let purged: usize = stores.iter().map(RateLimiterStore::purge_expired).sum();
        if purged > 0 {
            tracing::debug!("Purged {} idle rate limit windows", purged);
        }
    }
}
