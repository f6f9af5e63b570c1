use crate::models::{Message, MessageRole};

/// Opening bubble of the full-page chat and the terminal client.
pub const GREETING: &str = "Hi! I'm Dingkang's AI assistant. Ask me anything about his work, \
                            projects, or experience in AI and autonomous driving.";

/// Opening bubble of the floating widget.
pub const WIDGET_GREETING: &str = "Hi! I'm Dingkang's AI assistant. Feel free to ask me anything \
                                   about his work, projects, or experience in AI and autonomous \
                                   driving.";

/// Ordered chat history for one chat surface.
///
/// Append-only, except for the last message when it is an assistant reply:
/// streamed fragments grow it and the error path may replace it. Nothing
/// here ever reorders or removes a message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transcript opened by an assistant greeting bubble.
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        Self { messages: vec![Message::assistant(greeting)] }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn append_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub fn append_placeholder_assistant(&mut self) {
        self.messages.push(Message::assistant(String::new()));
    }

    /// Grows the trailing assistant message. Does nothing when the transcript
    /// is empty or ends with a user message.
    pub fn append_fragment_to_last_assistant(&mut self, fragment: &str) {
        if let Some(last) = self.last_assistant_mut() {
            last.content.push_str(fragment);
        }
    }

    /// Overwrites the trailing assistant message, same guard as above.
    pub fn replace_last_assistant(&mut self, content: impl Into<String>) {
        if let Some(last) = self.last_assistant_mut() {
            last.content = content.into();
        }
    }

    /// Error path: puts `fallback` into the trailing assistant message only if
    /// nothing streamed into it yet. Returns whether the fallback was used.
    pub fn fail_open_assistant(&mut self, fallback: &str) -> bool {
        match self.last_assistant_mut() {
            Some(last) if last.content.is_empty() => {
                last.content = fallback.to_string();
                true
            }
            _ => false,
        }
    }

    fn last_assistant_mut(&mut self) -> Option<&mut Message> {
        self.messages.last_mut().filter(|m| m.role == MessageRole::Assistant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_concatenate_into_placeholder() {
        let mut transcript = Transcript::new();
        transcript.append_user("hi");
        transcript.append_placeholder_assistant();
        for fragment in ["Hel", "lo", " there"] {
            transcript.append_fragment_to_last_assistant(fragment);
        }
        assert_eq!(transcript.messages(), &[Message::user("hi"), Message::assistant("Hello there")]);
    }

    #[test]
    fn fragment_after_user_message_is_a_no_op() {
        let mut transcript = Transcript::new();
        transcript.append_user("question");
        transcript.append_fragment_to_last_assistant("stray");
        transcript.replace_last_assistant("stray");
        assert_eq!(transcript.messages(), &[Message::user("question")]);
    }

    #[test]
    fn fragment_on_empty_transcript_is_a_no_op() {
        let mut transcript = Transcript::new();
        transcript.append_fragment_to_last_assistant("stray");
        assert!(transcript.is_empty());
    }

    #[test]
    fn fallback_only_fills_an_empty_reply() {
        let mut transcript = Transcript::new();
        transcript.append_user("q");
        transcript.append_placeholder_assistant();
        assert!(transcript.fail_open_assistant("sorry"));
        assert_eq!(transcript.last(), Some(&Message::assistant("sorry")));

        transcript.append_user("q2");
        transcript.append_placeholder_assistant();
        transcript.append_fragment_to_last_assistant("partial");
        assert!(!transcript.fail_open_assistant("sorry"));
        assert_eq!(transcript.last(), Some(&Message::assistant("partial")));
    }

    #[test]
    fn widget_and_page_greetings_differ() {
        assert!(WIDGET_GREETING.contains("Feel free to ask me anything about his work"));
        assert!(GREETING.contains("Ask me anything about his work"));
        assert_ne!(GREETING, WIDGET_GREETING);
    }

    #[test]
    fn greeting_seeds_one_assistant_message() {
        let transcript = Transcript::with_greeting("Hi!");
        assert_eq!(transcript.len(), 1);
        assert!(transcript.last().unwrap().is_assistant());
    }
}
