// Invocation result classification

use super::{InboundMessage, InvocationError};

/// Captured result of one dialog engine run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    pub exit_error: Option<InvocationError>,
    pub stdout: String,
    pub stderr: String,
}

/// Why an invocation was abandoned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Spawn failure, abnormal exit or timeout
    Process(InvocationError),
    /// The process wrote to its error stream
    Stderr(String),
}

/// Terminal state of one `user_says` cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationOutcome {
    Replied(InboundMessage),
    Failed(FailureReason),
}

impl InvocationOutcome {
    pub fn is_replied(&self) -> bool {
        matches!(self, Self::Replied(_))
    }

    pub fn reply(&self) -> Option<&InboundMessage> {
        match self {
            Self::Replied(message) => Some(message),
            Self::Failed(_) => None,
        }
    }
}

impl InvocationResult {
    pub fn from_error(error: InvocationError) -> Self {
        Self {
            exit_error: Some(error),
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// Decide the outcome
    ///
    /// Order matters: a process error wins over stderr, and any stderr output
    /// is fatal even when stdout carries a usable reply. Empty stdout is a
    /// valid empty reply.
    pub fn classify(self) -> InvocationOutcome {
        if let Some(error) = self.exit_error {
            return InvocationOutcome::Failed(FailureReason::Process(error));
        }

        if !self.stderr.is_empty() {
            return InvocationOutcome::Failed(FailureReason::Stderr(self.stderr));
        }

        InvocationOutcome::Replied(InboundMessage::new(self.stdout.trim()))
    }
}

/// Lines of the trimmed reply, split on `\n` and `\r\n`
pub fn reply_lines(stdout: &str) -> impl Iterator<Item = &str> {
    stdout.trim().lines()
}
