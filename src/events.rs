//! Event types and the main event loop driver.
//!
//! This module defines the [`Event`] enum (keyboard input, ticks and finished
//! briefing runs) and the [`EventHandler`], which runs a background task that
//! polls crossterm for key events and emits periodic [`Event::Tick`]s.
//! The main loop in `main.rs` receives events via [`EventHandler::next`] and
//! briefing tasks post their results via [`EventHandler::tx`].

use crate::briefing::Briefing;
use crate::error::BriefingError;
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::error;

/// Events processed by the application event loop.
pub enum Event {
    /// Periodic tick used for the fetch spinner.
    Tick,
    /// User key press from the terminal.
    Input(KeyEvent),
    /// A briefing run finished.
    BriefingReady {
        /// Generation the run was started with, see [`App::request_refresh`](crate::app::App::request_refresh).
        generation: u64,
        result: Result<Briefing, BriefingError>,
    },
}

/// Multiplexes terminal input and ticks into a single event stream.
///
/// The sender ([`tx`](EventHandler::tx)) can be cloned and handed to briefing
/// tasks, while the receiver is consumed by [`next`](EventHandler::next).
pub struct EventHandler {
    pub tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Creates a new event handler and spawns the input/tick task.
    ///
    /// The spawned task polls crossterm with a timeout of `tick_rate_ms`,
    /// sending [`Event::Input`] on key press and [`Event::Tick`] when the
    /// interval elapses. It stops if the terminal can no longer be read or
    /// the receiver is gone.
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();

        tokio::spawn(async move {
            let tick_rate = Duration::from_millis(tick_rate_ms);
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate
                    .checked_sub(last_tick.elapsed())
                    .unwrap_or(Duration::from_secs(0));

                match event::poll(timeout) {
                    Ok(true) => match event::read() {
                        Ok(CrosstermEvent::Key(key)) => {
                            if event_tx.send(Event::Input(key)).is_err() {
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(e) => {
                            error!("Terminal read failed: {}", e);
                            break;
                        }
                    },
                    Ok(false) => {}
                    Err(e) => {
                        error!("Terminal poll failed: {}", e);
                        break;
                    }
                }

                if last_tick.elapsed() >= tick_rate {
                    if event_tx.send(Event::Tick).is_err() {
                        break;
                    }
                    last_tick = Instant::now();
                }
            }
        });

        Self { tx, rx }
    }

    /// Receives the next event from the channel.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}
