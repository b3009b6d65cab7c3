use briefing_tui::{
    app::{Action, App},
    briefing::LiveAggregator,
    config::{AppSettings, ConfigStore, SETTINGS_FILE},
    error::BriefingError,
    events::{Event, EventHandler},
    logging, ui,
};
use color_eyre::Result;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, sync::Arc};
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Instrumentation and safety
    let (settings, settings_warnings) = AppSettings::load(SETTINGS_FILE);
    let _log_guard = logging::initialize_logging(&settings.log_dir);
    for message in &settings_warnings {
        warn!("{}", message);
    }
    color_eyre::install()?;
    install_panic_hook();

    let store = ConfigStore::default();
    let aggregator = Arc::new(LiveAggregator::from_settings(&settings)?);

    if std::env::args().skip(1).any(|arg| arg == "--print") {
        return print_once(&store, &aggregator).await;
    }

    // Ready terminal and state
    let mut app = App::new();
    match store.load() {
        Ok(credentials) => app.set_credentials(credentials),
        Err(e) => {
            if matches!(e, BriefingError::ConfigMissing { .. }) {
                if let Err(write_err) = store.write_template() {
                    warn!("Could not create credentials template: {}", write_err);
                }
            }
            warn!("Credentials unavailable: {}", e);
            app.require_setup(e);
        }
    }

    let mut terminal = setup_terminal()?;
    let mut event_handler = EventHandler::new(150);
    let mut in_flight: Option<JoinHandle<()>> = None;

    let mut pending = if app.credentials.is_complete() {
        app.request_refresh()
    } else {
        None
    };

    // Main loop
    while !app.should_quit {
        match pending.take() {
            Some(Action::Refresh(generation)) => {
                // A new run replaces the one in flight.
                if let Some(handle) = in_flight.take() {
                    handle.abort();
                }
                let aggregator = Arc::clone(&aggregator);
                let credentials = app.credentials.clone();
                let tx = event_handler.tx.clone();
                in_flight = Some(tokio::spawn(async move {
                    let result = aggregator.run(&credentials).await;
                    let _ = tx.send(Event::BriefingReady { generation, result });
                }));
            }
            Some(Action::SaveCredentials(credentials)) => {
                let result = store.save(&credentials);
                app.on_saved(credentials, result);
            }
            None => {}
        }

        terminal.draw(|f| ui::render(f, &app))?;

        if let Some(event) = event_handler.next().await {
            pending = match event {
                Event::Tick => {
                    app.on_tick();
                    None
                }
                Event::Input(key) => app.handle_key(key),
                Event::BriefingReady { generation, result } => {
                    app.on_briefing(generation, result);
                    None
                }
            };
        } else {
            break;
        }
    }

    if let Some(handle) = in_flight {
        handle.abort();
    }
    restore_terminal(terminal)?;
    info!("Shutting down");
    Ok(())
}

/// Headless mode: one briefing to stdout.
async fn print_once(store: &ConfigStore, aggregator: &LiveAggregator) -> Result<()> {
    let credentials = match store.load_complete() {
        Ok(c) => c,
        Err(e) => {
            if matches!(e, BriefingError::ConfigMissing { .. }) {
                store.write_template()?;
            }
            eprintln!("Fill in {} and run again.", store.path().display());
            return Err(e.into());
        }
    };

    let briefing = aggregator.run(&credentials).await?;
    println!("{}", briefing.to_text());
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen, crossterm::cursor::Hide)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(terminal.backend_mut(), crossterm::terminal::LeaveAlternateScreen, crossterm::cursor::Show)?;
    Ok(())
}

fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Force terminal cleanup!
        crossterm::terminal::disable_raw_mode().ok();
        crossterm::execute!(std::io::stdout(), crossterm::terminal::LeaveAlternateScreen, crossterm::cursor::Show).ok();
        original_hook(panic_info);
    }));
}
