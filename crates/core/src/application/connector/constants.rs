// Connector constants (No magic values)
use std::time::Duration;

/// Invocation timeout applied by the CLI unless overridden (60s)
/// The core connector itself is unbounded until `with_timeout` is called
pub const DEFAULT_INVOCATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Grace period between SIGTERM and SIGKILL for a timed-out process (5s)
pub const GRACEFUL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Log target prefix for replies from the dialog engine
pub const DIALOG_ENGINE_LOG_LABEL: &str = "Django Dialog Engine";
