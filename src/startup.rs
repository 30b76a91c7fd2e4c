//! Application startup and the interactive loop.
//!
//! Builds the identity provider, session storage, favorites store and catalog
//! client from configuration, then drives the shell from stdin until EOF or
//! `quit`.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use crate::app::App;
use crate::auth::{AuthClient, create_storage};
use crate::config::ConfigV1;
use crate::providers::create_identity_provider;
use crate::search::GoogleBooksClient;
use crate::shell::{self, Command};
use crate::state::AppState;
use crate::store::create_store;

/// Wire up the services named by `config`. Nothing touches the network yet.
pub fn build_state(config: Arc<ConfigV1>) -> AppState {
    let provider = create_identity_provider(&config.auth);
    let storage = create_storage(&config.session.persistence);
    let auth = Arc::new(AuthClient::new(provider, storage, config.session.key.clone()));
    let favorites = create_store(&config.store);
    let search = Arc::new(GoogleBooksClient::new(&config.search));

    AppState {
        config,
        auth,
        favorites,
        search,
    }
}

async fn print_lines(stdout: &mut tokio::io::Stdout, lines: &[String]) -> std::io::Result<()> {
    for line in lines {
        stdout.write_all(line.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
    }
    stdout.flush().await
}

/// Start the app and read commands from stdin.
///
/// # Errors
///
/// Returns an error if stdin or stdout fail.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state(config);
    info!(
        event_name = "app.start",
        provider = state.auth.provider_name(),
        provider_type = state.auth.provider_type(),
        store = state.favorites.get_name(),
        "Starting booktracker"
    );

    let mut app = App::start(state).await;
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let greeting = shell::execute(&mut app, Command::Show).await;
    print_lines(&mut stdout, &greeting).await?;

    while let Some(line) = lines.next_line().await? {
        let output = match Command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => shell::execute(&mut app, command).await,
            Err(e) => {
                warn!("Rejected input: {}", e);
                vec![e]
            }
        };
        print_lines(&mut stdout, &output).await?;
    }

    app.shutdown().await;
    info!(event_name = "app.stop", "Stopped booktracker");
    Ok(())
}
