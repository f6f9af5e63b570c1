use leptos::ev;
use leptos::html;
use leptos::prelude::*;
use web_sys::{HtmlTextAreaElement, ScrollBehavior, ScrollIntoViewOptions};

use portfolio_chat::{render_markdown, MessageRole, Transcript};

use crate::state::{send_message, ChatState, WebChat};

/// The input grows with its content up to this height, then scrolls.
const TEXTAREA_MAX_HEIGHT_PX: i32 = 120;

/// Transcript bubbles, typing indicator and the scroll anchor.
#[component]
pub fn MessageList(state: ChatState) -> impl IntoView {
    let end_ref = NodeRef::<html::Div>::new();

    // Keep the newest message in view on every transcript change.
    Effect::new(move |_| {
        state.transcript.track();
        if let Some(end) = end_ref.get() {
            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            end.scroll_into_view_with_scroll_into_view_options(&options);
        }
    });

    view! {
        <div class="messages-container">
            <For
                each=move || 0..state.transcript.with(Transcript::len)
                key=|index| *index
                let:index
            >
                <MessageBubble state=state index=index />
            </For>
            <Show when=move || state.streaming.get()>
                <TypingIndicator />
            </Show>
            <div node_ref=end_ref />
        </div>
    }
}

/// A single chat message bubble. Only the content is reactive: once placed,
/// a message keeps its role and position.
///
/// User text is shown verbatim; assistant replies are rendered as markdown,
/// or as plain text when too large to render.
#[component]
fn MessageBubble(state: ChatState, index: usize) -> impl IntoView {
    let role = state
        .transcript
        .with_untracked(|t| t.messages().get(index).map(|m| m.role))
        .unwrap_or(MessageRole::Assistant);
    let content = move || {
        state
            .transcript
            .with(|t| t.messages().get(index).map(|m| m.content.clone()).unwrap_or_default())
    };

    match role {
        MessageRole::User => view! {
            <div class="message user">
                <p class="message-content whitespace-pre-wrap">{content}</p>
            </div>
        }
        .into_any(),
        MessageRole::Assistant => view! {
            <div class="message assistant">
                {move || {
                    let text = content();
                    match render_markdown(&text) {
                        Some(html) => view! {
                            <div class="message-content markdown-content" inner_html=html />
                        }
                        .into_any(),
                        None => view! {
                            <p class="message-content whitespace-pre-wrap">{text}</p>
                        }
                        .into_any(),
                    }
                }}
            </div>
        }
        .into_any(),
    }
}

#[component]
fn TypingIndicator() -> impl IntoView {
    view! {
        <div class="typing-indicator">
            <span class="typing-dot" />
            <span class="typing-dot" />
            <span class="typing-dot" />
        </div>
    }
}

/// Chat input form with textarea and send button.
#[component]
pub fn ChatInput(chat: WebChat) -> impl IntoView {
    let state = *chat.store();
    let (input, set_input) = signal(String::new());
    let textarea_ref = NodeRef::<html::Textarea>::new();

    Effect::new(move |_| {
        if let Some(textarea) = textarea_ref.get() {
            let _ = textarea.focus();
        }
    });

    let is_sending = move || state.streaming.get();

    let send = move || {
        let text = input.get_untracked().trim().to_string();
        if text.is_empty() || state.streaming.get_untracked() {
            return;
        }
        set_input.set(String::new());
        if let Some(textarea) = textarea_ref.get_untracked() {
            let _ = web_sys::HtmlElement::style(&textarea).set_property("height", "auto");
        }
        send_message(&chat, text);
    };

    let send_clone = send.clone();
    let on_keydown = move |ev: ev::KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            send_clone();
        }
    };

    let on_submit = move |_| {
        send();
    };

    view! {
        <div class="input-row">
            <textarea
                node_ref=textarea_ref
                rows="1"
                placeholder="Ask me anything..."
                prop:value=input
                on:input=move |ev| {
                    set_input.set(event_target_value(&ev));
                    if let Some(textarea) = textarea_ref.get_untracked() {
                        fit_to_content(&textarea);
                    }
                }
                on:keydown=on_keydown
                disabled=is_sending
            />
            <button
                class="send-btn"
                aria-label="Send message"
                on:click=on_submit
                disabled=move || is_sending() || input.get().trim().is_empty()
            >
                "Send"
            </button>
        </div>
    }
}

/// Resizes the textarea to its content, capped at `TEXTAREA_MAX_HEIGHT_PX`.
fn fit_to_content(textarea: &HtmlTextAreaElement) {
    let style = web_sys::HtmlElement::style(textarea);
    let _ = style.set_property("height", "auto");
    let height = textarea_height(textarea.scroll_height());
    let _ = style.set_property("height", &format!("{height}px"));
}

fn textarea_height(scroll_height: i32) -> i32 {
    scroll_height.clamp(0, TEXTAREA_MAX_HEIGHT_PX)
}
