//! DDE Bridge - relays chat test harness messages to the Django Dialog Engine

mod config;
mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use config::{BridgeArgs, BridgeConfig};
use dde_bridge_core::application::{reply_channel, BridgeConnector, ReplyQueue};
use dde_bridge_core::domain::{FailureReason, InvocationOutcome, OutboundMessage};
use dde_bridge_core::port::{InvocationReport, OutcomeObserver};
use dde_bridge_infra_system::SubprocessRunner;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// How long queued replies may take to print after the last invocation
const PRINTER_DRAIN_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "dde-bridge")]
#[command(about = "Bridge between a chat test harness and the Django Dialog Engine", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    bridge: BridgeArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Read messages from stdin, one per line, and print replies as they arrive
    Chat,

    /// Send a single message and print the reply
    Say {
        /// Message text
        text: String,
    },
}

fn build_connector(
    config: &BridgeConfig,
    replies: ReplyQueue,
    observer: Arc<dyn OutcomeObserver>,
) -> BridgeConnector {
    BridgeConnector::new(
        Arc::new(config.caps.clone()),
        Arc::new(SubprocessRunner::default()),
        replies,
    )
    .with_command(config.command.clone())
    .with_timeout(config.timeout)
    .with_observer(observer)
}

fn describe_failure(reason: &FailureReason) -> String {
    match reason {
        FailureReason::Process(error) => error.to_string(),
        FailureReason::Stderr(stderr) => format!("stderr: {}", stderr.trim()),
    }
}

/// One stdin line as a message; blank lines are not sent
///
/// Non-blank lines are relayed untouched, surrounding whitespace included.
fn chat_message(line: String) -> Option<OutboundMessage> {
    if line.trim().is_empty() {
        debug!(line_len = line.len(), "Skipping blank line");
        return None;
    }
    Some(OutboundMessage::new(line))
}

async fn run_chat(config: BridgeConfig) -> Result<ExitCode> {
    let (queue, mut replies) = reply_channel();
    let observer: Arc<dyn OutcomeObserver> = Arc::new(|report: &InvocationReport| {
        if let InvocationOutcome::Failed(reason) = &report.outcome {
            eprintln!("{} {}", "✗".red(), describe_failure(reason));
        }
    });
    let connector = build_connector(&config, queue, observer);

    let printer = tokio::spawn(async move {
        while let Some(reply) = replies.recv().await {
            println!("{}", reply.text());
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("Failed to read stdin")? {
                    Some(line) => {
                        if let Some(message) = chat_message(line) {
                            connector.user_says(message);
                        }
                    }
                    None => break,
                }
            }
            _ = &mut ctrl_c => {
                info!("Interrupted, no further messages accepted");
                break;
            }
        }
    }

    info!(in_flight = connector.in_flight(), "Waiting for pending replies");
    match config.drain_limit() {
        Some(limit) => {
            if tokio::time::timeout(limit, connector.wait_idle())
                .await
                .is_err()
            {
                warn!(in_flight = connector.in_flight(), "Gave up on pending replies");
            }
        }
        None => connector.wait_idle().await,
    }

    drop(connector);
    let _ = tokio::time::timeout(PRINTER_DRAIN_TIMEOUT, printer).await;

    Ok(ExitCode::SUCCESS)
}

async fn run_say(config: BridgeConfig, text: String) -> Result<ExitCode> {
    let (queue, mut replies) = reply_channel();
    let (report_tx, mut reports) = mpsc::unbounded_channel();
    let observer: Arc<dyn OutcomeObserver> = Arc::new(move |report: &InvocationReport| {
        let _ = report_tx.send(report.clone());
    });
    let connector = build_connector(&config, queue, observer);

    connector.user_says(OutboundMessage::new(text));

    let report = reports
        .recv()
        .await
        .context("Invocation finished without a report")?;

    match report.outcome {
        InvocationOutcome::Replied(_) => {
            // The queued copy is the delivered one
            if let Some(reply) = replies.recv().await {
                println!("{}", reply.text());
            }
            Ok(ExitCode::SUCCESS)
        }
        InvocationOutcome::Failed(reason) => {
            eprintln!("{} {}", "✗ No reply:".red().bold(), describe_failure(&reason));
            Ok(ExitCode::FAILURE)
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    logging::init_logging()?;
    info!("DDE Bridge v{} starting...", VERSION);

    let config = cli.bridge.resolve()?;
    info!(
        user_id = %config.caps.user_id,
        script_path = %config.caps.script_path,
        program = %config.command.program,
        timeout_secs = ?config.timeout.map(|t| t.as_secs()),
        "Bridge configured"
    );

    match cli.command {
        Commands::Chat => run_chat(config).await,
        Commands::Say { text } => run_say(config, text).await,
    }
}
