use serde::{Deserialize, Serialize};

use crate::session::SessionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: MessageRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: MessageRole::Assistant, content: content.into() }
    }

    pub fn is_assistant(&self) -> bool {
        self.role == MessageRole::Assistant
    }
}

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: SessionId,
}

/// One decoded unit of the chat event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Incremental fragment of the assistant reply.
    Text(String),
    /// End of generation.
    Done,
}

/// Payload of a `data:` line, internally tagged by `type`.
///
/// Anything that is not `text` or `done` (the server also emits `error`)
/// lands in `Unknown` and is ignored by the decoder.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub(crate) enum EventPayload {
    Text {
        #[serde(default)]
        content: String,
    },
    Done,
    #[serde(other)]
    Unknown,
}

impl EventPayload {
    pub(crate) fn into_event(self) -> Option<StreamEvent> {
        match self {
            EventPayload::Text { content } if !content.is_empty() => {
                Some(StreamEvent::Text(content))
            }
            EventPayload::Done => Some(StreamEvent::Done),
            EventPayload::Text { .. } | EventPayload::Unknown => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_uses_wire_field_names() {
        let req = ChatRequest {
            message: "hi".to_string(),
            session_id: SessionId::from_string("session_1_abc"),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "hi", "session_id": "session_1_abc" }));
    }

    #[test]
    fn payload_types_map_to_events() {
        let text: EventPayload = serde_json::from_str(r#"{"type":"text","content":"a"}"#).unwrap();
        assert_eq!(text.into_event(), Some(StreamEvent::Text("a".into())));

        let done: EventPayload = serde_json::from_str(r#"{"type":"done"}"#).unwrap();
        assert_eq!(done.into_event(), Some(StreamEvent::Done));

        let error: EventPayload =
            serde_json::from_str(r#"{"type":"error","content":"boom"}"#).unwrap();
        assert_eq!(error.into_event(), None);

        let empty: EventPayload = serde_json::from_str(r#"{"type":"text","content":""}"#).unwrap();
        assert_eq!(empty.into_event(), None);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&MessageRole::Assistant).unwrap(), "\"assistant\"");
        assert_eq!(MessageRole::User.to_string(), "user");
    }
}
