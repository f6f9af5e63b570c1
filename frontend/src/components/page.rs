use leptos::prelude::*;

use portfolio_chat::{Transcript, GREETING};

use crate::components::chat::{ChatInput, MessageList};
use crate::state::new_chat;

/// Full-page chat at `/chat`.
#[component]
pub fn ChatPage() -> impl IntoView {
    let chat = new_chat(Transcript::with_greeting(GREETING));
    let state = *chat.store();

    view! {
        <div class="chat-page">
            <header class="chat-header">
                <a href="/" class="back-link" aria-label="Back to home">"←"</a>
                <div>
                    <h1>"Chat with AI"</h1>
                    <p class="subtitle">"Ask about Dingkang's work and projects"</p>
                </div>
            </header>
            <MessageList state=state />
            <div class="input-area">
                <ChatInput chat=chat />
            </div>
        </div>
    }
}
