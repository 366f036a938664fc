//! Bridge configuration: Botium caps file, environment and flags

use anyhow::{Context, Result};
use clap::Args;
use dde_bridge_core::application::connector::constants::{
    DEFAULT_INVOCATION_TIMEOUT, GRACEFUL_SHUTDOWN_TIMEOUT,
};
use dde_bridge_core::domain::command::{DEFAULT_MANAGE_PY, DEFAULT_PROGRAM};
use dde_bridge_core::domain::{CapabilitySet, DialogCommand};
use std::time::Duration;

/// Options shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct BridgeArgs {
    /// Botium config or flat capability JSON file
    #[arg(long, env = "DDE_BRIDGE_CAPS", global = true)]
    pub caps: Option<String>,

    /// Dialog user id (overrides the caps file)
    #[arg(long, env = "DDE_DIALOG_USER_ID", global = true)]
    pub user_id: Option<String>,

    /// Dialog script path (overrides the caps file)
    #[arg(long, env = "DDE_DIALOG_SCRIPT_PATH", global = true)]
    pub script_path: Option<String>,

    /// Bypass dialog extensions of installed Django apps
    #[arg(long, global = true)]
    pub skip_extensions: bool,

    /// Interpreter used to run manage.py
    #[arg(long, env = "DDE_BRIDGE_PROGRAM", default_value = DEFAULT_PROGRAM, global = true)]
    pub program: String,

    /// Path to the Django manage.py
    #[arg(long, env = "DDE_BRIDGE_MANAGE_PY", default_value = DEFAULT_MANAGE_PY, global = true)]
    pub manage_py: String,

    /// Working directory of the Django project
    #[arg(long, env = "DDE_BRIDGE_PROJECT_DIR", global = true)]
    pub project_dir: Option<String>,

    /// Per-message timeout in seconds (0 disables)
    #[arg(
        long,
        env = "DDE_BRIDGE_TIMEOUT_SECS",
        default_value_t = DEFAULT_INVOCATION_TIMEOUT.as_secs(),
        global = true
    )]
    pub timeout_secs: u64,
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub caps: CapabilitySet,
    pub command: DialogCommand,
    pub timeout: Option<Duration>,
}

impl BridgeConfig {
    /// How long pending invocations may run once input has ended
    ///
    /// One timeout plus the SIGTERM grace period, saturating for huge timeouts.
    pub fn drain_limit(&self) -> Option<Duration> {
        self.timeout
            .map(|limit| limit.saturating_add(GRACEFUL_SHUTDOWN_TIMEOUT))
    }
}

fn expand(path: &str) -> String {
    shellexpand::tilde(path).into_owned()
}

impl BridgeArgs {
    /// Merge caps file and flags (flags win)
    pub fn resolve(&self) -> Result<BridgeConfig> {
        let mut caps = match &self.caps {
            Some(path) => {
                let path = expand(path);
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read caps file {}", path))?;
                CapabilitySet::from_json(&raw)
                    .with_context(|| format!("Invalid caps file {}", path))?
            }
            None => CapabilitySet::default(),
        };

        if let Some(user_id) = &self.user_id {
            caps.user_id = user_id.clone();
        }
        if let Some(script_path) = &self.script_path {
            caps.script_path = expand(script_path);
        }
        if self.skip_extensions {
            caps.skip_extensions = true;
        }

        let mut command = DialogCommand::manage_py(&self.program, expand(&self.manage_py));
        if let Some(dir) = &self.project_dir {
            command = command.with_working_dir(expand(dir));
        }

        let timeout = match self.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(BridgeConfig {
            caps,
            command,
            timeout,
        })
    }
}
