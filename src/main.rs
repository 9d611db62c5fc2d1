//! Ambassador Form - terminal application form for the PraSaga Ambassadors program
//!
//! Collects applicant details, validates them locally and sends them
//! through a hosted email relay.

mod app;
mod config;
mod relay;
mod state;
mod ui;

use anyhow::Result;
use app::App;
use config::FormConfig;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use relay::EmailJsClient;
use state::forms::FormSchema;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ambassador_form=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = FormConfig::load()?;
    let schema = FormSchema::for_variant(config.variant());

    let mut client = EmailJsClient::new(config.relay_url(), config::public_key_from_env());
    if let Some(limit) = config.rate_limit() {
        client = client.with_rate_limit(limit);
    }
    tracing::info!(
        "Starting {:?} form, relay {}",
        config.variant(),
        config.relay_url()
    );

    let mut app = App::new(schema, Arc::new(client), config.target());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Handle any errors
    if let Err(err) = result {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        // Pick up finished submissions and store changes before drawing
        app.poll_submissions();
        app.sync_form_events()?;

        terminal.draw(|frame| ui::draw(frame, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                // Global quit: Ctrl+C
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }
                app.handle_key(key)?;
            }
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}
