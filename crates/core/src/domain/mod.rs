// Domain Layer - Messages, capabilities and invocation results

pub mod capability;
pub mod command;
pub mod error;
pub mod invocation;
pub mod message;

// Re-exports
pub use capability::CapabilitySet;
pub use command::DialogCommand;
pub use error::{DomainError, InvocationError};
pub use invocation::{reply_lines, FailureReason, InvocationOutcome, InvocationResult};
pub use message::{InboundMessage, OutboundMessage};
