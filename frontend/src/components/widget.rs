use leptos::prelude::*;

use portfolio_chat::Transcript;

use crate::components::chat::{ChatInput, MessageList};
use crate::state::new_chat;

/// Floating chat bubble that expands into a chat panel.
///
/// The greeting appears on first open. Closing the panel only hides it; a
/// reply still streaming keeps filling the transcript in the background.
#[component]
pub fn ChatWidget() -> impl IntoView {
    let chat = new_chat(Transcript::new());
    let state = *chat.store();
    let is_open = RwSignal::new(false);

    let on_open = move |_| {
        state.seed_greeting();
        is_open.set(true);
    };
    let on_close = move |_| is_open.set(false);

    view! {
        <div id="chat">
            <Show
                when=move || is_open.get()
                fallback=move || view! {
                    <button class="chat-bubble" aria-label="Open chat" on:click=on_open>
                        "💬"
                    </button>
                }
            >
                <div class="chat-window">
                    <div class="chat-window-header">
                        <span class="status-dot" />
                        <h3>"Chat with AI"</h3>
                        <button class="close-btn" aria-label="Close chat" on:click=on_close>
                            "×"
                        </button>
                    </div>
                    <MessageList state=state />
                    <div class="input-area">
                        <ChatInput chat=chat.clone() />
                    </div>
                </div>
            </Show>
        </div>
    }
}
