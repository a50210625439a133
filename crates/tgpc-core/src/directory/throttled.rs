use std::{path::Path, sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

use crate::{
    directory::port::Directory,
    domain::{AccountRef, ResolvedEntity, UserAccount},
    Result,
};

#[derive(Debug)]
struct IntervalLimiter {
    interval: Duration,
    next: Instant,
}

impl IntervalLimiter {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: Instant::now(),
        }
    }

    /// Reserve the next slot and return the wait duration required before executing.
    fn reserve(&mut self) -> Duration {
        let now = Instant::now();
        let start = if now >= self.next { now } else { self.next };
        self.next = start + self.interval;
        start.saturating_duration_since(now)
    }
}

/// Directory decorator that spaces out remote calls.
///
/// Every remote call shares one limiter, so a phone probe (import + delete)
/// costs two slots and a photo download one more.
pub struct ThrottledDirectory {
    inner: Arc<dyn Directory>,
    limiter: Mutex<IntervalLimiter>,
}

impl ThrottledDirectory {
    pub fn new(inner: Arc<dyn Directory>, min_interval: Duration) -> Self {
        Self {
            inner,
            limiter: Mutex::new(IntervalLimiter::new(min_interval)),
        }
    }

    async fn throttle(&self) {
        let wait = { self.limiter.lock().await.reserve() };
        if wait > Duration::ZERO {
            tracing::debug!(wait_ms = wait.as_millis() as u64, "throttling directory call");
            sleep(wait).await;
        }
    }
}

#[async_trait]
impl Directory for ThrottledDirectory {
    async fn import_contact(
        &self,
        phone: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Vec<UserAccount>> {
        self.throttle().await;
        self.inner.import_contact(phone, first_name, last_name).await
    }

    async fn delete_contact(&self, account: AccountRef) -> Result<Vec<UserAccount>> {
        self.throttle().await;
        self.inner.delete_contact(account).await
    }

    async fn resolve_username(&self, username: &str) -> Result<ResolvedEntity> {
        self.throttle().await;
        self.inner.resolve_username(username).await
    }

    async fn download_profile_photo(&self, account: AccountRef, path: &Path) -> Result<bool> {
        self.throttle().await;
        self.inner.download_profile_photo(account, path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::fake::FakeDirectory;

    #[tokio::test(start_paused = true)]
    async fn spaces_calls_by_min_interval() {
        let fake = Arc::new(FakeDirectory::default().with_user("bob", 7));
        let throttled = ThrottledDirectory::new(fake.clone(), Duration::from_secs(2));

        let started = Instant::now();
        for _ in 0..3 {
            throttled.resolve_username("bob").await.unwrap();
        }
        // First call is immediate, the next two wait one interval each.
        assert!(started.elapsed() >= Duration::from_secs(4));
        assert_eq!(fake.resolve_calls(), vec!["bob", "bob", "bob"]);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_never_sleeps() {
        let fake = Arc::new(FakeDirectory::default());
        let throttled = ThrottledDirectory::new(fake, Duration::ZERO);

        let started = Instant::now();
        for _ in 0..5 {
            throttled.import_contact("+1", "", "").await.unwrap();
        }
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn photo_downloads_share_the_limiter() {
        let tmp = tempfile::tempdir().unwrap();
        let fake = Arc::new(FakeDirectory::default().with_user("bob", 7).with_photo(7));
        let throttled = ThrottledDirectory::new(fake.clone(), Duration::from_secs(3));
        let account = AccountRef {
            id: 7,
            access_hash: 7000,
        };

        let started = Instant::now();
        throttled.resolve_username("bob").await.unwrap();
        let saved = throttled
            .download_profile_photo(account, &tmp.path().join("7.jpeg"))
            .await
            .unwrap();

        assert!(saved);
        assert!(started.elapsed() >= Duration::from_secs(3));
        assert_eq!(fake.download_calls().len(), 1);
    }
}
