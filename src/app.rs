use crate::briefing::Briefing;
use crate::config::{Credentials, CREDENTIALS_FILE};
use crate::error::BriefingError;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub enum ViewMode {
    #[default]
    Briefing,
    Settings,
}

/// Work the main loop has to carry out on behalf of the app state.
#[derive(Debug, PartialEq, Clone)]
pub enum Action {
    /// Start a briefing run tagged with this generation.
    Refresh(u64),
    SaveCredentials(Credentials),
}

pub const SETTINGS_FIELDS: usize = 2;

#[derive(Default)]
pub struct App {
    pub view_mode: ViewMode,
    pub credentials: Credentials,
    pub tick_count: usize,
    pub should_quit: bool,

    // Briefing state
    pub briefing: Option<Briefing>,
    pub last_error: Option<BriefingError>,
    pub is_fetching: bool,
    pub fetch_generation: u64,

    // Settings editor
    pub draft: Credentials,
    pub settings_selected_index: usize,
    pub settings_message: Option<String>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = credentials;
        if !self.credentials.is_complete() {
            self.open_settings(Some(format!(
                "Fill in your SimBrief username and AVWX token ({})",
                CREDENTIALS_FILE
            )));
        }
    }

    /// Startup could not read the credentials file.
    pub fn require_setup(&mut self, error: BriefingError) {
        self.open_settings(Some(error.to_string()));
        self.last_error = Some(error);
    }

    fn open_settings(&mut self, message: Option<String>) {
        self.draft = self.credentials.clone();
        self.settings_selected_index = 0;
        self.settings_message = message;
        self.view_mode = ViewMode::Settings;
    }

    /// Starts a new fetch, superseding any in flight.
    pub fn request_refresh(&mut self) -> Option<Action> {
        if !self.credentials.is_complete() {
            self.open_settings(Some("Credentials incomplete, fill in both fields".to_string()));
            return None;
        }
        self.fetch_generation += 1;
        self.is_fetching = true;
        Some(Action::Refresh(self.fetch_generation))
    }

    /// Result of the run tagged `generation`. Results of superseded runs are dropped.
    pub fn on_briefing(&mut self, generation: u64, result: Result<Briefing, BriefingError>) {
        if generation != self.fetch_generation {
            return;
        }
        self.is_fetching = false;
        match result {
            Ok(briefing) => {
                self.briefing = Some(briefing);
                self.last_error = None;
            }
            Err(e) => {
                self.briefing = None;
                self.last_error = Some(e);
            }
        }
    }

    pub fn on_saved(&mut self, credentials: Credentials, result: Result<(), BriefingError>) {
        match result {
            Ok(()) => {
                self.credentials = credentials;
                self.last_error = None;
                self.settings_message = None;
                self.view_mode = ViewMode::Briefing;
            }
            Err(e) => self.settings_message = Some(e.to_string()),
        }
    }

    pub fn on_tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return None;
        }

        match self.view_mode {
            ViewMode::Briefing => self.handle_briefing_key(key),
            ViewMode::Settings => self.handle_settings_key(key),
        }
    }

    fn handle_briefing_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') => return self.request_refresh(),
            KeyCode::Char('s') => self.open_settings(None),
            _ => {}
        }
        None
    }

    fn handle_settings_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc => {
                self.settings_message = None;
                self.view_mode = ViewMode::Briefing;
            }
            KeyCode::Down | KeyCode::Tab => {
                self.settings_selected_index = (self.settings_selected_index + 1) % SETTINGS_FIELDS;
            }
            KeyCode::Up | KeyCode::BackTab => {
                self.settings_selected_index = self
                    .settings_selected_index
                    .checked_sub(1)
                    .unwrap_or(SETTINGS_FIELDS - 1);
            }
            KeyCode::Backspace => {
                self.selected_field().pop();
            }
            KeyCode::Char(c) if !c.is_whitespace() => self.selected_field().push(c),
            KeyCode::Enter => {
                let draft = Credentials::new(self.draft.simbrief_username.trim(), self.draft.api_token.trim());
                return Some(Action::SaveCredentials(draft));
            }
            _ => {}
        }
        None
    }

    fn selected_field(&mut self) -> &mut String {
        if self.settings_selected_index == 0 {
            &mut self.draft.simbrief_username
        } else {
            &mut self.draft.api_token
        }
    }
}
