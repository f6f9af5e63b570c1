use crate::errors::ChatError;

/// Environment variable holding the chat API base URL.
pub const API_URL_VAR: &str = "CHAT_API_URL";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Where the chat client sends its requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    api_base_url: String,
}

impl ChatConfig {
    pub fn new(api_base_url: &str) -> Result<Self, ChatError> {
        let trimmed = api_base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ChatError::Config { message: format!("{API_URL_VAR} must not be empty") });
        }
        Ok(Self { api_base_url: trimmed.to_string() })
    }

    /// Reads `CHAT_API_URL` at runtime, falling back to the local default.
    pub fn from_env() -> Result<Self, ChatError> {
        let url = std::env::var(API_URL_VAR).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(&url)
    }

    /// Reads `CHAT_API_URL` as it was when the crate was compiled. Used by the
    /// web build, where there is no process environment at runtime.
    pub fn from_build_env() -> Result<Self, ChatError> {
        Self::new(option_env!("CHAT_API_URL").unwrap_or(DEFAULT_API_URL))
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn chat_endpoint(&self) -> String {
        format!("{}/api/chat", self.api_base_url)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self { api_base_url: DEFAULT_API_URL.to_string() }
    }
}
