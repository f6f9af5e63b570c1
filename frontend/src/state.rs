use leptos::prelude::*;
use leptos::task::spawn_local;

use portfolio_chat::{ChatConfig, ChatController, ChatStore, Transcript, WIDGET_GREETING};

use crate::api::FetchTransport;

/// Per-surface chat state, backed by Leptos signals so views re-render on
/// every transcript change. Each chat surface owns its own instance.
#[derive(Clone, Copy)]
pub struct ChatState {
    pub transcript: RwSignal<Transcript>,
    pub streaming: RwSignal<bool>,
}

impl ChatState {
    pub fn new(transcript: Transcript) -> Self {
        Self { transcript: RwSignal::new(transcript), streaming: RwSignal::new(false) }
    }

    /// Puts the widget greeting in an empty transcript.
    pub fn seed_greeting(&self) {
        self.transcript.update(|t| {
            if t.is_empty() {
                *t = Transcript::with_greeting(WIDGET_GREETING);
            }
        });
    }
}

impl ChatStore for ChatState {
    fn update(&self, f: impl FnOnce(&mut Transcript)) {
        self.transcript.update(f);
    }

    fn set_streaming(&self, streaming: bool) {
        self.streaming.set(streaming);
    }

    fn is_streaming(&self) -> bool {
        self.streaming.get_untracked()
    }
}

pub type WebChat = ChatController<FetchTransport, ChatState>;

/// Builds the controller for one chat surface.
pub fn new_chat(transcript: Transcript) -> WebChat {
    let config = ChatConfig::from_build_env().unwrap_or_else(|e| {
        log::error!("{e}; using the default chat API");
        ChatConfig::default()
    });
    ChatController::new(FetchTransport::new(&config), ChatState::new(transcript))
}

/// Runs one send in the background. The exchange is not cancelled when the
/// view that started it goes away.
pub fn send_message(chat: &WebChat, text: String) {
    let chat = chat.clone();
    spawn_local(async move {
        let outcome = chat.submit(&text).await;
        log::debug!("Chat send finished: {outcome:?}");
    });
}
