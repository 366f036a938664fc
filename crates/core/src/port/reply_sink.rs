// Reply delivery and outcome observation ports

use crate::domain::{InboundMessage, InvocationOutcome};

/// Harness-side delivery callback
///
/// Shared by every in-flight invocation. Implementations must tolerate being
/// called from any task; the connector never observes their failures.
pub trait ReplySink: Send + Sync {
    fn deliver(&self, message: InboundMessage);
}

impl<F> ReplySink for F
where
    F: Fn(InboundMessage) + Send + Sync,
{
    fn deliver(&self, message: InboundMessage) {
        self(message)
    }
}

/// Typed result of one `user_says` cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationReport {
    pub invocation_id: String,
    pub outcome: InvocationOutcome,
}

/// Optional observer of invocation outcomes
///
/// Called once per invocation after classification, on success and on
/// failure alike.
pub trait OutcomeObserver: Send + Sync {
    fn observe(&self, report: &InvocationReport);
}

impl<F> OutcomeObserver for F
where
    F: Fn(&InvocationReport) + Send + Sync,
{
    fn observe(&self, report: &InvocationReport) {
        self(report)
    }
}
