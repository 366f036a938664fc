// DDE Bridge Infrastructure - System Adapters
// Implements: ProcessRunner

pub mod subprocess_runner;

pub use subprocess_runner::SubprocessRunner;
