//! Shared fixtures: a connector wired to a `sh -c` stub in place of manage.py
//!
//! A preamble consumes the options up to `--` the way `send_cli_message`
//! does, collecting them in `$flags`. The script then sees `$1` user id,
//! `$2` script path and `$3` message text.

#![allow(dead_code)]

use dde_bridge_core::application::{reply_channel, BridgeConnector, ReplyReceiver};
use dde_bridge_core::domain::{CapabilitySet, DialogCommand, InboundMessage};
use dde_bridge_core::port::id_provider::SequentialIdProvider;
use dde_bridge_core::port::{InvocationReport, OutcomeObserver};
use dde_bridge_infra_system::SubprocessRunner;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub const WAIT: Duration = Duration::from_secs(10);

/// Echoes the message text, like a dialog that repeats the user
pub const ECHO_TEXT: &str = r#"printf '%s\n' "$3""#;

pub struct Harness {
    pub connector: BridgeConnector,
    pub replies: ReplyReceiver,
    pub reports: mpsc::UnboundedReceiver<InvocationReport>,
}

/// Options before `--` land in `$flags`, positionals are shifted into place
const OPTION_PREAMBLE: &str = r#"flags=""
while [ "$#" -gt 0 ] && [ "$1" != "--" ]; do flags="$flags$1"; shift; done
shift
"#;

pub fn stub_command(script: &str) -> DialogCommand {
    let script = format!("{}{}", OPTION_PREAMBLE, script);
    DialogCommand::custom("sh", ["-c".to_string(), script, "dde-stub".to_string()])
}

pub fn harness(script: &str) -> Harness {
    harness_with(script, CapabilitySet::new("u1", "/s.py"), None)
}

pub fn harness_with(script: &str, caps: CapabilitySet, timeout: Option<Duration>) -> Harness {
    let (queue, replies) = reply_channel();
    let (report_tx, reports) = mpsc::unbounded_channel();
    let observer: Arc<dyn OutcomeObserver> = Arc::new(move |report: &InvocationReport| {
        let _ = report_tx.send(report.clone());
    });

    let connector = BridgeConnector::new(
        Arc::new(caps),
        Arc::new(SubprocessRunner::default().with_grace_period(Duration::from_millis(200))),
        queue,
    )
    .with_command(stub_command(script))
    .with_timeout(timeout)
    .with_observer(observer)
    .with_id_provider(Arc::new(SequentialIdProvider::default()));

    Harness {
        connector,
        replies,
        reports,
    }
}

impl Harness {
    pub async fn next_reply(&mut self) -> InboundMessage {
        tokio::time::timeout(WAIT, self.replies.recv())
            .await
            .expect("timed out waiting for a reply")
            .expect("reply queue closed")
    }

    pub async fn next_report(&mut self) -> InvocationReport {
        tokio::time::timeout(WAIT, self.reports.recv())
            .await
            .expect("timed out waiting for a report")
            .expect("observer channel closed")
    }

    /// Wait for every invocation, then collect whatever was delivered
    pub async fn settle(&mut self) -> Vec<InboundMessage> {
        tokio::time::timeout(WAIT, self.connector.wait_idle())
            .await
            .expect("invocations did not finish");
        let mut delivered = Vec::new();
        while let Some(reply) = self.replies.try_recv() {
            delivered.push(reply);
        }
        delivered
    }
}
