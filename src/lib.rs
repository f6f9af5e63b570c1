//! Streaming chat client for the portfolio site's AI assistant.
//!
//! UI-agnostic core shared by the web views (`frontend/`) and the terminal
//! client (`src/main.rs`): decode the chat API's SSE body, fold it into a
//! transcript, and run one send at a time per chat surface.

pub mod config;
pub mod controller;
pub mod errors;
pub mod markdown;
pub mod models;
pub mod session;
pub mod sse;
pub mod transcript;
pub mod transport;

pub use config::ChatConfig;
pub use controller::{ChatController, ChatStore, LocalStore, SendOutcome, FALLBACK_REPLY};
pub use errors::ChatError;
pub use markdown::render_markdown;
pub use models::{ChatRequest, Message, MessageRole, StreamEvent};
pub use session::SessionId;
pub use sse::{decode_stream, SseDecoder};
pub use transcript::{Transcript, GREETING, WIDGET_GREETING};
pub use transport::{accept_response, ByteStream, ChatTransport};

#[cfg(not(target_arch = "wasm32"))]
pub use transport::HttpTransport;
