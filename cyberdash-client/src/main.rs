//! CyberDash client entry point.

use cyberdash_client::api_client::RestClient;
use cyberdash_client::commands::{self, Command};
use cyberdash_client::config::ClientConfig;
use cyberdash_client::deep_link::{self, DeepLinkQueue};
use cyberdash_client::error::ClientError;
use cyberdash_client::state::{App, Outcome};
use cyberdash_client::store::FileStore;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let mut links = DeepLinkQueue::new();
    for arg in std::env::args().skip(1) {
        if arg.starts_with(&format!("{}://", deep_link::SCHEME)) {
            links.push(arg);
        }
    }

    let config = ClientConfig::load()?;
    let api = RestClient::new(&config)?;
    let store = Arc::new(FileStore::new(config.store_path.clone()));
    let mut app = App::new(config, api, store);
    tracing::info!(api = %app.api().base_url(), messages = app.transcript.len(), "Client started");

    println!("CyberDash client. Type /help for commands.");

    for link in links.mark_ready() {
        match deep_link::to_command(&link) {
            Some(command) => {
                if run_command(&mut app, command).await {
                    return Ok(());
                }
            }
            None => tracing::warn!(url = %link, "Ignoring unrecognised deep link"),
        }
    }

    let (line_tx, mut line_rx) = mpsc::channel::<String>(16);
    spawn_input_reader(line_tx);

    loop {
        prompt()?;
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = line_rx.recv() => {
                let Some(line) = line else { break };
                if run_line(&mut app, &line).await {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Returns `true` when the loop should stop.
async fn run_line(app: &mut App, line: &str) -> bool {
    let command = match commands::parse(line) {
        Ok(Some(command)) => command,
        Ok(None) => return false,
        Err(err) => {
            println!("{}", err);
            return false;
        }
    };
    run_command(app, command).await
}

async fn run_command(app: &mut App, command: Command) -> bool {
    if let Command::Chat(_) = command {
        println!("...");
    }
    match app.execute(command).await {
        Outcome::Quit => true,
        Outcome::Print(text) => {
            if !text.is_empty() {
                println!("{}", text);
            }
            false
        }
    }
}

fn prompt() -> Result<(), ClientError> {
    let mut stdout = io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()?;
    Ok(())
}

fn spawn_input_reader(sender: mpsc::Sender<String>) {
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if sender.blocking_send(line).is_err() {
                break;
            }
        }
    });
}
