// src/models.rs

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

/// Body of a transcript entry.
///
/// `Text` is untrusted and always escaped when rendered. `Preformatted` is
/// reserved for blocks from a trusted field of the reply (the generated policy).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "body", rename_all = "lowercase")]
pub enum MessageContent {
    Text(String),
    Preformatted(String),
}

impl MessageContent {
    pub fn as_str(&self) -> &str {
        match self {
            MessageContent::Text(s) | MessageContent::Preformatted(s) => s,
        }
    }

    pub fn is_preformatted(&self) -> bool {
        matches!(self, MessageContent::Preformatted(_))
    }
}

/// One entry in the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub content: MessageContent,
    pub timestamp: DateTime<Local>,
}

impl ChatMessage {
    pub fn new(sender: Sender, content: MessageContent) -> Self {
        Self {
            sender,
            content,
            timestamp: Local::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, MessageContent::Text(text.into()))
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, MessageContent::Text(text.into()))
    }
}

/// Body posted to the chat endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

/// One reply from the chat endpoint. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerResponse {
    pub response: String,
    #[serde(default, deserialize_with = "non_empty")]
    pub rego_policy: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub message: Option<String>,
}

// An empty string carries nothing to render or resend.
fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Logs details of each API call.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiCallLog {
    pub timestamp: DateTime<Utc>,
    pub endpoint: String,
    pub request_summary: String,
    pub response_status: u16,
    pub response_time_ms: u128,
}
