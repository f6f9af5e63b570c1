use std::cell::{Cell, RefCell};
use std::io::Write;

use portfolio_chat::{ChatStore, MessageRole, Transcript};
use tracing::debug;

const ASSISTANT_LABEL: &str = "assistant> ";
const TYPING_MARKER: &str = "\u{2026}";
const BACKSPACE: &str = "\u{8}";

/// Terminal view: renders the transcript incrementally as the controller
/// mutates it. User lines are not echoed; the user typed them.
pub struct TerminalStore<W: Write> {
    transcript: RefCell<Transcript>,
    streaming: Cell<bool>,
    out: RefCell<W>,
    /// Messages already rendered, including the one being streamed.
    shown_messages: Cell<usize>,
    /// Bytes of the last assistant message already written.
    shown_bytes: Cell<usize>,
    typing: Cell<bool>,
}

impl<W: Write> TerminalStore<W> {
    pub fn new(out: W, transcript: Transcript) -> Self {
        let store = Self {
            transcript: RefCell::new(Transcript::new()),
            streaming: Cell::new(false),
            out: RefCell::new(out),
            shown_messages: Cell::new(0),
            shown_bytes: Cell::new(0),
            typing: Cell::new(false),
        };
        store.update(|t| *t = transcript);
        store.finish_line();
        store
    }

    /// Output failures never interrupt the exchange; the transcript stays
    /// authoritative and later writes are still attempted.
    fn write(&self, text: &str) {
        let mut out = self.out.borrow_mut();
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
            debug!("Terminal write failed: {e}");
        }
    }

    fn clear_typing(&self) {
        if self.typing.replace(false) {
            self.write(BACKSPACE);
        }
    }

    fn finish_line(&self) {
        if self.shown_messages.get() > 0 {
            self.write("\n");
        }
    }

    fn render(&self) {
        let transcript = self.transcript.borrow();
        let messages = transcript.messages();
        let first_unshown = self.shown_messages.get();

        // Start one back so the message being streamed picks up new fragments.
        for (index, message) in messages.iter().enumerate().skip(first_unshown.saturating_sub(1)) {
            if message.role != MessageRole::Assistant {
                continue;
            }
            if index >= first_unshown {
                self.write(ASSISTANT_LABEL);
                self.shown_bytes.set(0);
            }
            let unseen = message.content.get(self.shown_bytes.get()..).unwrap_or_default();
            if !unseen.is_empty() {
                self.clear_typing();
                self.write(unseen);
                self.shown_bytes.set(message.content.len());
            }
        }
        self.shown_messages.set(messages.len());
    }

    #[cfg(test)]
    fn output(&self) -> String
    where
        W: AsRef<[u8]>,
    {
        String::from_utf8_lossy(self.out.borrow().as_ref()).into_owned()
    }
}

impl<W: Write> ChatStore for TerminalStore<W> {
    fn update(&self, f: impl FnOnce(&mut Transcript)) {
        f(&mut self.transcript.borrow_mut());
        self.render();
    }

    fn set_streaming(&self, streaming: bool) {
        let was_streaming = self.streaming.replace(streaming);
        match (was_streaming, streaming) {
            (false, true) => {
                let waiting = self
                    .transcript
                    .borrow()
                    .last()
                    .is_some_and(|m| m.role == MessageRole::Assistant && m.content.is_empty());
                if waiting {
                    self.write(TYPING_MARKER);
                    self.typing.set(true);
                }
            }
            (true, false) => {
                if self.typing.replace(false) {
                    self.write(BACKSPACE);
                    self.write(" ");
                }
                self.write("\n");
            }
            _ => {}
        }
    }

    fn is_streaming(&self) -> bool {
        self.streaming.get()
    }
}
