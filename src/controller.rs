//! One request/response cycle with the chat API, folded into a transcript.
//!
//! `Idle -> Sending -> Streaming -> Idle` on success. Any transport failure
//! (connection, status, missing body, broken body) ends the exchange: the
//! apology replaces the assistant reply only if nothing streamed in yet, and
//! the streaming flag always ends up false. Nothing is retried.

use std::cell::{Cell, RefCell};

use futures_util::StreamExt;
use tracing::{debug, error, warn};

use crate::errors::ChatError;
use crate::models::{ChatRequest, StreamEvent};
use crate::session::SessionId;
use crate::sse::decode_stream;
use crate::transcript::Transcript;
use crate::transport::ChatTransport;

pub const FALLBACK_REPLY: &str =
    "Sorry, I'm having trouble connecting right now. Please try again later.";

/// State a chat surface renders: the transcript and the streaming flag.
///
/// Only the controller writes to it; views read it.
pub trait ChatStore {
    fn update(&self, f: impl FnOnce(&mut Transcript));
    fn set_streaming(&self, streaming: bool);
    fn is_streaming(&self) -> bool;
}

/// Plain in-memory store.
#[derive(Debug, Default)]
pub struct LocalStore {
    transcript: RefCell<Transcript>,
    streaming: Cell<bool>,
}

impl LocalStore {
    pub fn new(transcript: Transcript) -> Self {
        Self { transcript: RefCell::new(transcript), streaming: Cell::new(false) }
    }

    pub fn transcript(&self) -> Transcript {
        self.transcript.borrow().clone()
    }
}

impl ChatStore for LocalStore {
    fn update(&self, f: impl FnOnce(&mut Transcript)) {
        f(&mut self.transcript.borrow_mut());
    }

    fn set_streaming(&self, streaming: bool) {
        self.streaming.set(streaming);
    }

    fn is_streaming(&self) -> bool {
        self.streaming.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Empty input, or a reply is still streaming. Nothing changed.
    Rejected,
    /// The body ended. `saw_done` is false when the server closed the stream
    /// without a `done` event.
    Completed { saw_done: bool },
    /// Transport failure, already reflected in the transcript.
    Failed,
}

/// Drives exchanges for one chat surface.
///
/// Callers must not start a second `submit` while one is unresolved. The
/// streaming check below only covers the window until the `done` event.
#[derive(Clone)]
pub struct ChatController<T, S> {
    transport: T,
    store: S,
    session_id: SessionId,
}

impl<T: ChatTransport, S: ChatStore> ChatController<T, S> {
    pub fn new(transport: T, store: S) -> Self {
        Self { transport, store, session_id: SessionId::generate() }
    }

    pub fn with_session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Sends `input` and streams the reply into the store. Never fails: every
    /// transport error is turned into transcript state here.
    pub async fn submit(&self, input: &str) -> SendOutcome {
        let message = input.trim();
        if message.is_empty() || self.store.is_streaming() {
            return SendOutcome::Rejected;
        }

        self.store.update(|transcript| {
            transcript.append_user(message);
            transcript.append_placeholder_assistant();
        });
        self.store.set_streaming(true);

        let request =
            ChatRequest { message: message.to_string(), session_id: self.session_id.clone() };

        let outcome = match self.exchange(&request).await {
            Ok(saw_done) => {
                if !saw_done {
                    warn!("Chat stream for {} ended without a done event", self.session_id);
                }
                SendOutcome::Completed { saw_done }
            }
            Err(e) => {
                error!("Chat error for {}: {e}", self.session_id);
                self.store.update(|transcript| {
                    transcript.fail_open_assistant(FALLBACK_REPLY);
                });
                SendOutcome::Failed
            }
        };

        self.store.set_streaming(false);
        outcome
    }

    async fn exchange(&self, request: &ChatRequest) -> Result<bool, ChatError> {
        let body = self.transport.open(request).await?;
        debug!("Chat stream opened for {}", self.session_id);

        let mut events = std::pin::pin!(decode_stream(body));
        let mut saw_done = false;
        while let Some(event) = events.next().await {
            match event? {
                StreamEvent::Text(fragment) => self
                    .store
                    .update(|transcript| transcript.append_fragment_to_last_assistant(&fragment)),
                StreamEvent::Done if !saw_done => {
                    saw_done = true;
                    self.store.set_streaming(false);
                }
                StreamEvent::Done => {}
            }
        }
        Ok(saw_done)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use futures_util::stream;

    use super::*;
    use crate::models::Message;
    use crate::transport::ByteStream;

    type Script = Result<Vec<Result<Vec<u8>, ChatError>>, ChatError>;

    /// Replays canned responses and records every request it receives.
    #[derive(Default)]
    struct ScriptedTransport {
        responses: RefCell<VecDeque<Script>>,
        requests: RefCell<Vec<ChatRequest>>,
    }

    impl ScriptedTransport {
        fn with(responses: impl IntoIterator<Item = Script>) -> Self {
            Self { responses: RefCell::new(responses.into_iter().collect()), ..Default::default() }
        }
    }

    #[async_trait(?Send)]
    impl ChatTransport for ScriptedTransport {
        async fn open(&self, request: &ChatRequest) -> Result<ByteStream, ChatError> {
            self.requests.borrow_mut().push(request.clone());
            let script = self.responses.borrow_mut().pop_front().expect("unscripted request");
            Ok(stream::iter(script?).boxed_local())
        }
    }

    fn sse(events: &[String]) -> Vec<Result<Vec<u8>, ChatError>> {
        events.iter().map(|e| Ok(format!("data: {e}\n\n").into_bytes())).collect()
    }

    /// Several events delivered in a single network chunk.
    fn chunk(events: &[String]) -> Result<Vec<u8>, ChatError> {
        Ok(events.iter().map(|e| format!("data: {e}\n\n")).collect::<String>().into_bytes())
    }

    fn text(fragment: &str) -> String {
        serde_json::json!({ "type": "text", "content": fragment }).to_string()
    }

    fn done() -> String {
        r#"{"type":"done"}"#.to_string()
    }

    fn controller(transport: ScriptedTransport) -> ChatController<ScriptedTransport, LocalStore> {
        ChatController::new(transport, LocalStore::default())
            .with_session_id(SessionId::from_string("session_1_test"))
    }

    #[tokio::test]
    async fn fragments_fold_into_one_reply() {
        let transport =
            ScriptedTransport::with([Ok(sse(&[text("Hel"), text("lo"), text("!"), done()]))]);
        let chat = controller(transport);

        let outcome = chat.submit("  hi there  ").await;

        assert_eq!(outcome, SendOutcome::Completed { saw_done: true });
        assert_eq!(
            chat.store().transcript().messages(),
            &[Message::user("hi there"), Message::assistant("Hello!")]
        );
        assert!(!chat.store().is_streaming());

        let requests = chat.transport.requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].message, "hi there");
        assert_eq!(requests[0].session_id.as_str(), "session_1_test");
    }

    #[tokio::test]
    async fn blank_input_is_rejected_without_a_request() {
        let transport = ScriptedTransport::default();
        let chat = controller(transport);

        assert_eq!(chat.submit("").await, SendOutcome::Rejected);
        assert_eq!(chat.submit(" \n\t ").await, SendOutcome::Rejected);
        assert!(chat.store().transcript().is_empty());
        assert!(chat.transport.requests.borrow().is_empty());
    }

    #[tokio::test]
    async fn submit_while_streaming_is_rejected() {
        let transport = ScriptedTransport::default();
        let chat = controller(transport);
        chat.store().set_streaming(true);

        assert_eq!(chat.submit("hello").await, SendOutcome::Rejected);
        assert!(chat.store().transcript().is_empty());
    }

    #[tokio::test]
    async fn error_status_before_any_text_uses_fallback() {
        let transport = ScriptedTransport::with([Err(ChatError::HttpStatus { status: 500 })]);
        let chat = controller(transport);

        assert_eq!(chat.submit("hello").await, SendOutcome::Failed);
        assert_eq!(
            chat.store().transcript().messages(),
            &[Message::user("hello"), Message::assistant(FALLBACK_REPLY)]
        );
        assert!(!chat.store().is_streaming());
    }

    #[tokio::test]
    async fn broken_body_keeps_partial_reply() {
        let mut body = sse(&[text("partial answer")]);
        body.push(Err(ChatError::network("connection reset")));
        let transport = ScriptedTransport::with([Ok(body)]);
        let chat = controller(transport);

        assert_eq!(chat.submit("hello").await, SendOutcome::Failed);
        assert_eq!(chat.store().transcript().last(), Some(&Message::assistant("partial answer")));
        assert!(!chat.store().is_streaming());
    }

    #[tokio::test]
    async fn stream_without_done_still_clears_streaming() {
        let transport = ScriptedTransport::with([Ok(sse(&[text("cut")]))]);
        let chat = controller(transport);

        assert_eq!(chat.submit("hello").await, SendOutcome::Completed { saw_done: false });
        assert_eq!(chat.store().transcript().last(), Some(&Message::assistant("cut")));
        assert!(!chat.store().is_streaming());
    }

    #[tokio::test]
    async fn malformed_lines_do_not_abort_the_reply() {
        let transport = ScriptedTransport::with([Ok(sse(&["not-json".to_string(), text("ok"), done()]))]);
        let chat = controller(transport);

        chat.submit("hello").await;
        assert_eq!(chat.store().transcript().last(), Some(&Message::assistant("ok")));
    }

    #[tokio::test]
    async fn turns_share_the_session_and_keep_order() {
        let transport = ScriptedTransport::with([
            Ok(sse(&[text("first"), done()])),
            Ok(sse(&[text("second"), done()])),
        ]);
        let store = LocalStore::new(Transcript::with_greeting("Hi!"));
        let chat = ChatController::new(transport, store);

        chat.submit("one").await;
        chat.submit("two").await;

        assert_eq!(
            chat.store().transcript().messages(),
            &[
                Message::assistant("Hi!"),
                Message::user("one"),
                Message::assistant("first"),
                Message::user("two"),
                Message::assistant("second"),
            ]
        );
        let requests = chat.transport.requests.borrow();
        assert_eq!(requests[0].session_id, requests[1].session_id);
        assert_eq!(&requests[0].session_id, chat.session_id());
    }

    /// Logs every store call with the state it left behind.
    #[derive(Default)]
    struct RecordingStore {
        inner: LocalStore,
        log: RefCell<Vec<String>>,
    }

    impl ChatStore for RecordingStore {
        fn update(&self, f: impl FnOnce(&mut Transcript)) {
            self.inner.update(f);
            let last = self.inner.transcript().last().map(|m| m.content.clone()).unwrap_or_default();
            self.log.borrow_mut().push(format!("upd:{last}:{}", self.inner.is_streaming()));
        }

        fn set_streaming(&self, streaming: bool) {
            self.inner.set_streaming(streaming);
            self.log.borrow_mut().push(format!("flag:{streaming}"));
        }

        fn is_streaming(&self) -> bool {
            self.inner.is_streaming()
        }
    }

    #[tokio::test]
    async fn first_done_clears_streaming_while_the_body_stays_open() {
        let body = vec![chunk(&[text("a"), done()]), chunk(&[text("b")]), chunk(&[done()])];
        let chat = ChatController::new(ScriptedTransport::with([Ok(body)]), RecordingStore::default());

        let outcome = chat.submit("q").await;

        assert_eq!(outcome, SendOutcome::Completed { saw_done: true });
        assert_eq!(
            *chat.store().log.borrow(),
            ["upd::false", "flag:true", "upd:a:true", "flag:false", "upd:ab:false", "flag:false"]
        );
        assert_eq!(chat.store().inner.transcript().last(), Some(&Message::assistant("ab")));
    }
}
