// Reply hand-off between finished invocations and the harness
//
// Completion handlers never call the harness inline: they push onto this
// queue and the reply is delivered on a later scheduling turn, either by the
// harness draining `ReplyReceiver` itself or by a `ReplyDispatcher`.

use crate::domain::InboundMessage;
use crate::port::ReplySink;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Create a reply queue
pub fn reply_channel() -> (ReplyQueue, ReplyReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ReplyQueue { tx }, ReplyReceiver { rx })
}

/// Producer side, cloned into every invocation task
#[derive(Clone)]
pub struct ReplyQueue {
    tx: mpsc::UnboundedSender<InboundMessage>,
}

impl ReplyQueue {
    /// Hand a reply over for delivery
    ///
    /// Returns the message back when the receiving side is gone.
    pub fn push(&self, message: InboundMessage) -> Result<(), InboundMessage> {
        self.tx.send(message).map_err(|e| e.0)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Harness side of the queue
pub struct ReplyReceiver {
    rx: mpsc::UnboundedReceiver<InboundMessage>,
}

impl ReplyReceiver {
    /// Next reply; None once every `ReplyQueue` handle is dropped
    pub async fn recv(&mut self) -> Option<InboundMessage> {
        self.rx.recv().await
    }

    /// Reply already queued, without waiting
    pub fn try_recv(&mut self) -> Option<InboundMessage> {
        self.rx.try_recv().ok()
    }
}

/// Drains the queue into a `ReplySink`
pub struct ReplyDispatcher {
    receiver: ReplyReceiver,
    sink: Arc<dyn ReplySink>,
}

impl ReplyDispatcher {
    pub fn new(receiver: ReplyReceiver, sink: Arc<dyn ReplySink>) -> Self {
        Self { receiver, sink }
    }

    /// Deliver replies until the queue closes
    ///
    /// Returns the number of delivered replies.
    pub async fn run(mut self) -> usize {
        debug!("Reply dispatcher started");
        let mut delivered = 0;
        while let Some(message) = self.receiver.recv().await {
            self.sink.deliver(message);
            delivered += 1;
        }
        info!(delivered = delivered, "Reply dispatcher stopped");
        delivered
    }
}
