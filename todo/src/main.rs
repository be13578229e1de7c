//! Interactive todo list on the terminal.
//!
//! Reads commands from stdin, one per line; type `help` for the list.
//! Logs go to stderr so they never interleave with rendered lists.

use anyhow::Context as _;
use std::sync::Arc;
use todolist::cli::{Console, Outcome, HELP};
use todolist::{TodoConfig, TodoEnvironment, TodoReducer, TodoSession, TodoState, TodoStore};
use todolist_runtime::StoreConfig;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    let config = TodoConfig::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(todolist::config::DEFAULT_LOG_FILTER)
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!(
        max_title_len = config.max_title_len,
        shutdown_timeout_secs = config.shutdown_timeout.as_secs(),
        "Starting todolist"
    );

    let store = Arc::new(TodoStore::with_config(
        TodoState::new(),
        TodoReducer::new(),
        TodoEnvironment::system(),
        StoreConfig::default().with_shutdown_timeout(config.shutdown_timeout),
    ));
    let mut console = Console::new(TodoSession::new(Arc::clone(&store), config.max_title_len));

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout.write_all(HELP.as_bytes()).await?;

    loop {
        stdout.write_all(console.prompt().as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await.context("failed to read from stdin")? else {
            break;
        };

        match console.handle_line(&line).await {
            Outcome::Continue(text) => stdout.write_all(text.as_bytes()).await?,
            Outcome::Quit => break,
        }
    }

    store
        .shutdown_with_default_timeout()
        .await
        .context("store did not shut down cleanly")?;

    tracing::info!(transitions = store.version(), "Stopped todolist");
    Ok(())
}
