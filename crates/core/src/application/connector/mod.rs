// Bridge Connector - relays harness messages to the dialog engine
//
// One `user_says` call is one independent cycle:
// Idle -> Invoking -> (Delivering | Failed) -> Idle

pub mod constants;
mod in_flight;

#[cfg(test)]
mod connector_test;

use constants::*;
use in_flight::InFlight;

use crate::application::delivery::{reply_channel, ReplyDispatcher, ReplyQueue};
use crate::domain::{
    reply_lines, CapabilitySet, DialogCommand, FailureReason, InvocationOutcome, InvocationResult,
    OutboundMessage,
};
use crate::port::id_provider::UuidProvider;
use crate::port::{
    IdProvider, InvocationReport, OutcomeObserver, ProcessRequest, ProcessRunner, ReplySink,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, warn, Instrument};

/// Bridge between a chat test harness and the dialog engine process
pub struct BridgeConnector {
    caps: Arc<CapabilitySet>,
    command: Arc<DialogCommand>,
    timeout: Option<Duration>,
    runner: Arc<dyn ProcessRunner>,
    replies: ReplyQueue,
    observer: Option<Arc<dyn OutcomeObserver>>,
    id_provider: Arc<dyn IdProvider>,
    in_flight: Arc<InFlight>,
}

impl BridgeConnector {
    /// Create a connector delivering replies onto `replies`
    ///
    /// Capabilities are stored as-is; missing values only surface when the
    /// dialog engine runs.
    pub fn new(
        caps: Arc<CapabilitySet>,
        runner: Arc<dyn ProcessRunner>,
        replies: ReplyQueue,
    ) -> Self {
        Self {
            caps,
            command: Arc::new(DialogCommand::default()),
            timeout: None,
            runner,
            replies,
            observer: None,
            id_provider: Arc::new(UuidProvider),
            in_flight: Arc::new(InFlight::default()),
        }
    }

    /// Create a connector that delivers through a callback
    ///
    /// Spawns a `ReplyDispatcher` on the current Tokio runtime. The returned
    /// handle completes with the delivered count once the connector is
    /// dropped and every in-flight invocation has finished.
    ///
    /// # Panics
    /// Outside of a Tokio runtime.
    pub fn with_callback(
        caps: Arc<CapabilitySet>,
        runner: Arc<dyn ProcessRunner>,
        sink: Arc<dyn ReplySink>,
    ) -> (Self, JoinHandle<usize>) {
        let (queue, receiver) = reply_channel();
        let dispatcher = tokio::spawn(ReplyDispatcher::new(receiver, sink).run());
        (Self::new(caps, runner, queue), dispatcher)
    }

    pub fn with_command(mut self, command: DialogCommand) -> Self {
        self.command = Arc::new(command);
        self
    }

    /// Bound each invocation; None leaves a hung process pending forever
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn OutcomeObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn with_id_provider(mut self, id_provider: Arc<dyn IdProvider>) -> Self {
        self.id_provider = id_provider;
        self
    }

    pub fn capabilities(&self) -> &Arc<CapabilitySet> {
        &self.caps
    }

    /// Invocations dispatched but not yet finished
    pub fn in_flight(&self) -> usize {
        self.in_flight.count()
    }

    /// Wait until no invocation is in flight
    pub async fn wait_idle(&self) {
        self.in_flight.wait_idle().await
    }

    /// Relay one user message to the dialog engine
    ///
    /// Returns immediately; the process runs on a spawned task. Failures are
    /// traced and swallowed, a reply is queued only on success.
    ///
    /// # Panics
    /// Outside of a Tokio runtime.
    pub fn user_says(&self, message: OutboundMessage) {
        let invocation_id = self.id_provider.generate_id();

        info!(invocation_id = %invocation_id, text = %message.text().trim(), "Botium: user says");

        let request = ProcessRequest {
            program: self.command.program.clone(),
            args: self.command.argv(&self.caps, message.text()),
            working_dir: self.command.working_dir.clone(),
            timeout: self.timeout,
        };
        debug!(
            command_line = %self.command.display(&self.caps, message.text()),
            "Dispatching dialog engine"
        );

        let guard = self.in_flight.enter();
        let runner = Arc::clone(&self.runner);
        let replies = self.replies.clone();
        let observer = self.observer.clone();
        let span = info_span!("invocation", id = %invocation_id);

        tokio::spawn(
            async move {
                let result = match runner.run(&request).await {
                    Ok(output) => output.into_result(),
                    Err(e) => InvocationResult::from_error(e),
                };

                let outcome = settle(result, &replies);
                // Queue handle goes first so dispatchers can finish once idle
                drop(replies);

                if let Some(observer) = observer {
                    observer.observe(&InvocationReport {
                        invocation_id,
                        outcome,
                    });
                }

                drop(guard);
            }
            .instrument(span),
        );
    }
}

/// Classify a finished invocation and queue the reply on success
fn settle(result: InvocationResult, replies: &ReplyQueue) -> InvocationOutcome {
    let outcome = result.classify();

    match &outcome {
        InvocationOutcome::Failed(FailureReason::Process(error)) => {
            warn!(error = %error, "Dialog engine invocation failed");
        }
        InvocationOutcome::Failed(FailureReason::Stderr(stderr)) => {
            warn!(stderr = %stderr, "Dialog engine wrote to stderr, dropping reply");
        }
        InvocationOutcome::Replied(reply) => {
            for line in reply_lines(reply.text()) {
                info!(line = %line, "{}", DIALOG_ENGINE_LOG_LABEL);
            }
            if let Err(dropped) = replies.push(reply.clone()) {
                warn!(
                    reply_len = dropped.text().len(),
                    "Reply queue closed, reply discarded"
                );
            }
        }
    }

    outcome
}
