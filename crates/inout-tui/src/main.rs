//! Library In/Out - terminal client for staff entry/exit scanning.
//!
//! Staff sign in, pick the entrance they are standing at, and scan patron
//! library cards; the gateway records each scan as an entry or exit. A second
//! tab shows today's log.

mod app;
mod ui;
mod utils;

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{bail, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use inout_core::config::Config;
use inout_core::screens::{LogScreen, LoginScreen, ScanScreen};
use inout_core::{CredentialStore, GatewayClient, SessionManager};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const LOG_FILE_PREFIX: &str = "inout.log";

const USAGE: &str = "\
Usage: inout [COMMAND]

Without a command, starts the interactive terminal client.

Commands:
  --login            Sign in from the command line and store the session
  --logout           Forget the stored session
  --entries [--json] Print today's entry/exit log
  --locations        Print the locations available for scanning
  --help             Show this message";

/// Where tracing output goes.
enum LogTarget {
    /// Daily rolling file in the cache directory, so the alternate screen stays clean
    File,
    Stderr,
}

/// Initialize the tracing subscriber. The returned guard flushes the file writer on drop.
fn init_tracing(target: LogTarget) -> Option<WorkerGuard> {
    // RUST_LOG controls the level (e.g. RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if let LogTarget::File = target {
        if let Some(dir) = Config::cache_dir().ok().filter(|d| std::fs::create_dir_all(d).is_ok()) {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            return Some(guard);
        }
        // No cache directory: drop log output rather than draw over the UI
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::sink))
            .with(filter)
            .init();
        return None;
    }

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
    None
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Some(command) = args.first() {
        let _guard = init_tracing(LogTarget::Stderr);
        return match command.as_str() {
            "--login" => login_headless().await,
            "--logout" => logout_headless().await,
            "--entries" => print_entries(args.iter().any(|a| a == "--json")).await,
            "--locations" => print_locations().await,
            "--help" | "-h" => {
                println!("{}", USAGE);
                Ok(())
            }
            other => bail!("Unknown command: {}\n\n{}", other, USAGE),
        };
    }

    let _guard = init_tracing(LogTarget::File);
    info!("Library In/Out starting");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("Library In/Out shutting down");
    Ok(())
}

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    let mut app = App::new()?;

    // Show the loading view while the stored token is read
    terminal.draw(|f| render(f, &app))?;
    app.restore_session().await;

    run_app(terminal, &mut app).await
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks().await;

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

// ============================================================================
// Headless commands
// ============================================================================

/// Shared setup for the command-line modes.
async fn headless_session() -> Result<(Config, GatewayClient, SessionManager)> {
    let config = Config::load()?;
    let gateway = GatewayClient::new(config.effective_endpoints())?;
    let mut session = SessionManager::new(CredentialStore::from_kind(config.token_store));
    session.restore().await;
    Ok((config, gateway, session))
}

async fn login_headless() -> Result<()> {
    let (mut config, gateway, mut session) = headless_session().await?;

    let username = match config.last_username {
        Some(ref last) => {
            let input = prompt(&format!("Username [{}]: ", last))?;
            if input.is_empty() {
                last.clone()
            } else {
                input
            }
        }
        None => prompt("Username: ")?,
    };
    let password = rpassword::prompt_password("Password: ")?;

    eprintln!("Signing in...");
    let mut screen = LoginScreen::new(username, password);
    let Some(token) = screen.submit(&gateway).await else {
        bail!(screen
            .error_message()
            .unwrap_or_else(|| "Login failed".to_string()));
    };

    session.login(token).await;
    config.last_username = Some(screen.username.clone());
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }

    println!("Login successful.");
    Ok(())
}

async fn logout_headless() -> Result<()> {
    let (_, _, mut session) = headless_session().await?;
    session.logout().await;
    println!("Signed out.");
    Ok(())
}

async fn print_entries(json: bool) -> Result<()> {
    let (_, gateway, session) = headless_session().await?;
    let Some(token) = session.token() else {
        bail!("Not signed in. Run `inout --login` first.");
    };

    let mut screen = LogScreen::new();
    screen.refresh(&gateway, token).await;
    if let Some(error) = screen.error_message() {
        bail!(error);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(screen.entries())?);
        return Ok(());
    }

    if screen.show_empty_state() {
        println!("{}", inout_core::screens::NO_ENTRIES);
        return Ok(());
    }

    println!("{:<28} {:<20} {:<9} {:<9} STATUS", "NAME", "LOCATION", "ENTRY", "EXIT");
    for entry in screen.entries() {
        println!(
            "{:<28} {:<20} {:<9} {:<9} {}",
            utils::truncate_string(&entry.patron_name, 28),
            utils::truncate_string(&entry.location, 20),
            entry.entry_time,
            entry.exit_display(),
            entry.status
        );
    }
    println!(
        "\n{} entries, {} inside",
        screen.entries().len(),
        screen.inside_count()
    );
    Ok(())
}

async fn print_locations() -> Result<()> {
    let (_, gateway, _) = headless_session().await?;

    let mut screen = ScanScreen::new();
    screen.load_locations(&gateway).await;
    if let Some(error) = screen.error_message() {
        bail!(error);
    }

    for location in screen.location_list() {
        println!("{}\t{}", location.id, location.label);
    }
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}
