// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid capabilities: {0}")]
    InvalidCapabilities(String),
}

/// Why a dialog engine invocation produced no usable exit
///
/// Payloads are plain strings so results can be cloned into reports.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvocationError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Process exited with status {code}")]
    NonZeroExit { code: i32 },

    #[error("Process terminated by signal")]
    Terminated,

    #[error("Process timeout after {0}ms")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
