//! Process-wide tracing subscriber

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "dde_bridge=info,dde_bridge_core=info,dde_bridge_infra_system=info";

/// Install the global subscriber (once, at startup)
///
/// `DDE_BRIDGE_LOG_FORMAT=json` selects JSON lines, anything else pretty
/// output. `RUST_LOG` overrides the default filter. Logs go to stderr;
/// stdout is reserved for replies.
pub fn init_logging() -> Result<()> {
    let log_format =
        std::env::var("DDE_BRIDGE_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;

    match log_format.as_str() {
        "json" => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()?;
        }
        _ => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()?;
        }
    }

    Ok(())
}
