use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChatError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error (HTTP {status})")]
    Server { status: u16, message: Option<String> },

    #[error("{0}")]
    Validation(String),

    #[error("Microphone access failed: {0}")]
    Permission(String),

    #[error("Media error: {0}")]
    Media(String),

    #[error("Not allowed while {0}")]
    InvalidState(String),

    #[error("A request is already in flight")]
    Busy,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("JS interop error: {0}")]
    JsInterop(String),

    #[error("Cancelled")]
    Cancelled,
}

impl ChatError {
    /// Message reported by the server in its `{error}` body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ChatError::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(e: serde_json::Error) -> Self {
        ChatError::Serialization(e.to_string())
    }
}
