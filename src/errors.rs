// src/errors.rs

use thiserror::Error;

pub type ChatResult<T> = Result<T, ChatError>;

/// Errors raised while talking to the chat server or setting up the client.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed reply: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("logger error: {0}")]
    Logger(#[from] flexi_logger::FlexiLoggerError),
}

impl ChatError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        ChatError::Config(msg.into())
    }

    pub fn status_error(status: u16, body: impl Into<String>) -> Self {
        ChatError::Status {
            status,
            body: body.into(),
        }
    }

    /// Short label for the status line.
    pub fn kind(&self) -> &'static str {
        match self {
            ChatError::Network(e) if e.is_timeout() => "timeout",
            ChatError::Network(e) if e.is_connect() => "connection refused",
            ChatError::Network(_) => "network error",
            ChatError::Status { .. } => "server error",
            ChatError::Decode(_) => "bad reply",
            ChatError::Config(_) => "config error",
            ChatError::Io(_) => "io error",
            ChatError::Logger(_) => "logger error",
        }
    }
}
