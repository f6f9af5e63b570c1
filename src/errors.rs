use thiserror::Error;

/// Errors raised while talking to the remote chat API.
///
/// Malformed event lines and unknown event types are not represented here:
/// the decoder drops them without surfacing anything.
#[derive(Debug, Error)]
pub enum ChatError {
    // ── Transport errors ─────────────────────────────────────────────────────
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Server error: HTTP status {status}")]
    HttpStatus { status: u16 },

    #[error("Response has no body")]
    MissingBody,

    // ── Request errors ───────────────────────────────────────────────────────
    #[error("Failed to serialize chat request: {0}")]
    Serialize(#[from] serde_json::Error),

    // ── Configuration errors ─────────────────────────────────────────────────
    #[error("Invalid configuration: {message}")]
    Config { message: String },
}

impl ChatError {
    pub fn network(message: impl Into<String>) -> Self {
        ChatError::Network { message: message.into() }
    }

    /// Failures that end one exchange and fall back to the apology message.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ChatError::Network { .. } | ChatError::HttpStatus { .. } | ChatError::MissingBody
        )
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ChatError::HttpStatus { status: status.as_u16() },
            None => ChatError::network(err.to_string()),
        }
    }
}
