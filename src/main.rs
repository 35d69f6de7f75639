mod app;
mod auth;
mod config;
mod messages;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, Overrides, Page};
use config::AppConfig;
use messages::MessageKind;
use theme::ThemeMode;

#[derive(Parser, Debug)]
#[command(name = "otpgate")]
#[command(author = "Sean Fournier")]
#[command(version = "0.1.0")]
#[command(about = "A terminal signup and login flow with one-time-code entry")]
struct Args {
    /// Theme for this session (overrides the saved preference until toggled)
    #[arg(short, long, value_enum)]
    theme: Option<ThemeMode>,

    /// Page to open on
    #[arg(short, long, value_enum, default_value = "signup")]
    page: Page,

    /// Seconds before a code may be resent
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    resend_seconds: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so the alternate screen stays clean
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = AppConfig::load().unwrap_or_default();
    let overrides = Overrides {
        theme: args.theme,
        resend_seconds: args.resend_seconds,
    };

    run_tui(config, overrides, args.page).await
}

async fn run_tui(config: AppConfig, overrides: Overrides, page: Page) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = match App::new(config, overrides, page).context("Failed to start") {
        Ok(mut app) => run_app(&mut terminal, &mut app).await,
        Err(e) => Err(e),
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if key.modifiers.contains(KeyModifiers::CONTROL)
                        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
                    {
                        return Ok(());
                    }
                    // Surface handler errors instead of tearing down the terminal
                    if let Err(e) = app.handle_key(key) {
                        app.messages.show(format!("Error: {}", e), MessageKind::Error);
                    }
                }
                Event::Paste(text) => app.handle_paste(&text),
                _ => {}
            }
        }

        // Countdown ticks, deferred work, message expiry
        if let Err(e) = app.tick() {
            app.messages.show(format!("Error: {}", e), MessageKind::Error);
        }

        // Let countdown tasks run between frames
        tokio::task::yield_now().await;
    }
}
