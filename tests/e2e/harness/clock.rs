use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// 2026-01-02T03:04:05Z, so the first image is `20260102030405.jpg`
pub const START_TIME: i64 = 1_767_323_045;

/// Shared, manually advanced clock for image naming.
#[derive(Clone)]
pub struct MockClock {
    seconds: Arc<AtomicI64>,
}

impl MockClock {
    pub fn new() -> Self {
        Self {
            seconds: Arc::new(AtomicI64::new(START_TIME)),
        }
    }

    /// Time source for `EditSession::with_time_provider`; follows `advance`.
    pub fn as_provider(&self) -> impl Fn() -> i64 + Send + Sync + 'static {
        let seconds = Arc::clone(&self.seconds);
        move || seconds.load(Ordering::SeqCst)
    }

    pub fn advance(&self, by: Duration) {
        self.seconds.fetch_add(by.as_secs() as i64, Ordering::SeqCst);
    }
}
