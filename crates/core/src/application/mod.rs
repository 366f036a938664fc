// Application Layer - Use Cases

pub mod connector;
pub mod delivery;

// Re-exports
pub use connector::BridgeConnector;
pub use delivery::{reply_channel, ReplyDispatcher, ReplyQueue, ReplyReceiver};
