// ID Provider Port (for deterministic testing)

use std::sync::atomic::{AtomicU64, Ordering};

/// ID provider interface (allows deterministic IDs in tests)
pub trait IdProvider: Send + Sync {
    /// Generate a new unique invocation ID
    fn generate_id(&self) -> String;
}

/// UUID v4 provider (production)
pub struct UuidProvider;

impl IdProvider for UuidProvider {
    fn generate_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Sequential provider: `inv-1`, `inv-2`, ...
#[derive(Default)]
pub struct SequentialIdProvider {
    next: AtomicU64,
}

impl IdProvider for SequentialIdProvider {
    fn generate_id(&self) -> String {
        format!("inv-{}", self.next.fetch_add(1, Ordering::Relaxed) + 1)
    }
}
