mod api;
mod components;
mod state;

use leptos::mount::mount_to_body;
use leptos::prelude::*;

use components::page::ChatPage;
use components::widget::ChatWidget;

/// Root application component: `/chat` is the full-page chat, every other
/// path is the landing shell with the floating widget.
#[component]
fn App() -> impl IntoView {
    let path = window().location().pathname().unwrap_or_default();

    if path.trim_end_matches('/') == "/chat" {
        view! { <ChatPage /> }.into_any()
    } else {
        view! {
            <main class="home">
                <h1>"Dingkang Wang"</h1>
                <p>"AI and autonomous driving engineer."</p>
                <a href="/chat">"Open the full-page chat"</a>
                <ChatWidget />
            </main>
        }
        .into_any()
    }
}

fn main() {
    console_log::init_with_level(log::Level::Debug).expect("Failed to init logger");
    mount_to_body(App);
}
