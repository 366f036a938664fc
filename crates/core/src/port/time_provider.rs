// Clock used to measure how long the dialog engine ran

/// Wall clock behind `ProcessOutput::duration_ms`
pub trait TimeProvider: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// Reads the system clock
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Advances by a fixed step on every read, so a run always lasts one step
    pub struct SteppingTimeProvider {
        now: AtomicI64,
        step_ms: i64,
    }

    impl SteppingTimeProvider {
        pub fn new(step_ms: i64) -> Self {
            Self {
                now: AtomicI64::new(0),
                step_ms,
            }
        }
    }

    impl TimeProvider for SteppingTimeProvider {
        fn now_millis(&self) -> i64 {
            self.now.fetch_add(self.step_ms, Ordering::SeqCst)
        }
    }
}
