// Process Runner Port
// Abstraction for running the dialog engine as an external process

use crate::domain::{InvocationError, InvocationResult};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

/// One process invocation, as a discrete argument vector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRequest {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

/// Raw output of a process that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// None when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: i64,
}

impl ProcessOutput {
    /// Fold the exit status into an `InvocationResult`
    pub fn into_result(self) -> InvocationResult {
        let exit_error = match self.exit_code {
            Some(0) => None,
            Some(code) => Some(InvocationError::NonZeroExit { code }),
            None => Some(InvocationError::Terminated),
        };

        InvocationResult {
            exit_error,
            stdout: self.stdout,
            stderr: self.stderr,
        }
    }
}

/// Process Runner trait
///
/// Implementations:
/// - SubprocessRunner: spawns the program directly, no shell
/// - MockProcessRunner: canned outputs for tests
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run the process to completion and capture its output
    ///
    /// # Errors
    /// - InvocationError::SpawnFailed if the process cannot be started
    /// - InvocationError::Timeout if `request.timeout` elapses first
    /// - InvocationError::Io if the pipes cannot be read
    async fn run(&self, request: &ProcessRequest) -> Result<ProcessOutput, InvocationError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock runner behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Exit with the given code and streams
        Output {
            exit_code: Option<i32>,
            stdout: String,
            stderr: String,
        },
        /// Exit 0, echoing the message text (last user argument) on stdout
        Echo,
        /// Fail before producing output
        Fail(InvocationError),
        /// Never complete
        Hang,
    }

    /// Mock Process Runner for testing
    pub struct MockProcessRunner {
        behavior: Arc<Mutex<MockBehavior>>,
        requests: Arc<Mutex<Vec<ProcessRequest>>>,
    }

    impl MockProcessRunner {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn new_reply(stdout: impl Into<String>) -> Self {
            Self::new(MockBehavior::Output {
                exit_code: Some(0),
                stdout: stdout.into(),
                stderr: String::new(),
            })
        }

        pub fn new_echo() -> Self {
            Self::new(MockBehavior::Echo)
        }

        pub fn new_fail(error: InvocationError) -> Self {
            Self::new(MockBehavior::Fail(error))
        }

        pub fn set_behavior(&self, behavior: MockBehavior) {
            *self.behavior.lock().unwrap() = behavior;
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn requests(&self) -> Vec<ProcessRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProcessRunner for MockProcessRunner {
        async fn run(&self, request: &ProcessRequest) -> Result<ProcessOutput, InvocationError> {
            self.requests.lock().unwrap().push(request.clone());

            let behavior = self.behavior.lock().unwrap().clone();

            match behavior {
                MockBehavior::Output {
                    exit_code,
                    stdout,
                    stderr,
                } => Ok(ProcessOutput {
                    exit_code,
                    stdout,
                    stderr,
                    duration_ms: 1,
                }),
                MockBehavior::Echo => {
                    // argv ends with user id, script path, text
                    let text = request.args.last().cloned().unwrap_or_default();
                    Ok(ProcessOutput {
                        exit_code: Some(0),
                        stdout: format!("{}\n", text),
                        stderr: String::new(),
                        duration_ms: 1,
                    })
                }
                MockBehavior::Fail(error) => Err(error),
                MockBehavior::Hang => std::future::pending().await,
            }
        }
    }
}
