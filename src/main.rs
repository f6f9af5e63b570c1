mod terminal;

use std::io::Write;

use portfolio_chat::{ChatConfig, ChatController, HttpTransport, SendOutcome, Transcript, GREETING};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::terminal::TerminalStore;

const PROMPT: &str = "you> ";
const QUIT: &str = "/quit";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (development convenience)
    dotenvy::dotenv().ok();

    // Logs go to stderr so they never interleave with the streamed reply.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portfolio_chat=info".into()),
        )
        .init();

    // ── Dependency wiring ─────────────────────────────────────────────────────
    let config = ChatConfig::from_env()?;
    info!("Chat API at {}", config.api_base_url());

    let store = TerminalStore::new(std::io::stdout(), Transcript::with_greeting(GREETING));
    let chat = ChatController::new(HttpTransport::new(&config), store);
    debug!("Session {}", chat.session_id());

    // ── Read-submit loop ──────────────────────────────────────────────────────
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{PROMPT}");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim() == QUIT {
            break;
        }

        if let SendOutcome::Completed { saw_done: false } = chat.submit(&line).await {
            debug!("Reply ended without a done event");
        }
    }

    info!("Bye");
    Ok(())
}
