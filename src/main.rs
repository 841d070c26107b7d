use std::io;
use std::time::Duration;

use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use legalmate::config::AppConfig;
use legalmate::core::api::{DocumentApi, HttpDocumentClient};
use legalmate::core::logging;
use legalmate::tui::app::AppState;
use legalmate::tui::services::Services;

const USAGE: &str = "\
Usage: legalmate [--check | --version | --help]

  --check     Ping the analysis API and exit
  --version   Print version
  --help      Print this message

Configuration: ~/.config/legalmate/config.toml
Environment:   LEGALMATE_API_URL, LEGALMATE_LOG, RUST_LOG";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load();

    match std::env::args().nth(1).as_deref() {
        None => run_tui(config).await,
        Some("--check") => check(config).await,
        Some("--version" | "-V") => {
            println!("{} {}", legalmate::NAME, legalmate::VERSION);
            Ok(())
        }
        Some("--help" | "-h") => {
            println!("{USAGE}");
            Ok(())
        }
        Some(other) => {
            eprintln!("unknown argument: {other}\n\n{USAGE}");
            std::process::exit(2);
        }
    }
}

/// One health-check round trip, reported on stdout.
async fn check(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    logging::init_stderr(&config);

    let client = HttpDocumentClient::new(&config.api, &config.upload)?;
    match client.health_check().await {
        Ok(status) => {
            println!("{} is up: {}", client.base_url(), status.message);
            Ok(())
        }
        Err(e) => {
            eprintln!("{} is unreachable: {e}", client.base_url());
            std::process::exit(1);
        }
    }
}

async fn run_tui(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    let _log_guard = logging::init_tui(&config);
    log::info!("{} v{} starting", legalmate::NAME, legalmate::VERSION);

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let services = Services::init(&config, event_tx)?;
    let mut app = AppState::new(event_rx, services);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    if config.tui.mouse_enabled {
        execute!(stdout, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let tick_rate = Duration::from_millis(config.tui.tick_rate_ms.max(1));
    let result = app.run(&mut terminal, tick_rate).await;

    // Restore terminal
    disable_raw_mode()?;
    if config.tui.mouse_enabled {
        execute!(terminal.backend_mut(), DisableMouseCapture)?;
    }
    execute!(terminal.backend_mut(), DisableBracketedPaste, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        tracing::error!(error = %e, "terminal error");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
