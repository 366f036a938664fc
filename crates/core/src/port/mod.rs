// Port Layer - Interfaces for external dependencies

pub mod id_provider; // For deterministic testing
pub mod process_runner;
pub mod reply_sink;
pub mod time_provider;

// Re-exports
pub use crate::domain::InvocationError;
pub use id_provider::IdProvider;
pub use process_runner::{ProcessOutput, ProcessRequest, ProcessRunner};
pub use reply_sink::{InvocationReport, OutcomeObserver, ReplySink};
pub use time_provider::TimeProvider;
