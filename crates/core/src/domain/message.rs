// Chat messages exchanged with the harness

use serde::{Deserialize, Serialize};

/// Message the harness sends on behalf of the simulated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    text: String,
}

impl OutboundMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl From<&str> for OutboundMessage {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Bot reply handed back to the harness
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    text: String,
}

impl InboundMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}
