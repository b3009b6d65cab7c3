use crate::error::BriefingError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

pub const CREDENTIALS_FILE: &str = "userdata.json";
pub const SETTINGS_FILE: &str = "briefing.toml";

/// User credentials persisted in `userdata.json`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    #[serde(rename = "simBrief_userName")]
    pub simbrief_username: String,
    pub api_token: String,
}

impl Credentials {
    pub fn new(simbrief_username: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            simbrief_username: simbrief_username.into(),
            api_token: api_token.into(),
        }
    }

    /// Both fields are filled in.
    pub fn is_complete(&self) -> bool {
        !self.simbrief_username.trim().is_empty() && !self.api_token.trim().is_empty()
    }
}

/// Reads and writes [`Credentials`] at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(CREDENTIALS_FILE)
    }
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    /// Loads credentials from disk.
    ///
    /// A missing file is [`BriefingError::ConfigMissing`]. Invalid JSON or a
    /// missing key is [`BriefingError::ConfigMalformed`]; no defaults are
    /// substituted in that case.
    pub fn load(&self) -> Result<Credentials, BriefingError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(BriefingError::ConfigMissing {
                    path: self.display_path(),
                })
            }
            Err(e) => {
                return Err(BriefingError::ConfigMalformed {
                    path: self.display_path(),
                    reason: e.to_string(),
                })
            }
        };

        let credentials: Credentials =
            serde_json::from_str(&content).map_err(|e| BriefingError::ConfigMalformed {
                path: self.display_path(),
                reason: e.to_string(),
            })?;

        info!(path = %self.path.display(), "Loaded credentials.");
        Ok(credentials)
    }

    /// Like [`ConfigStore::load`], but a file with a blank username or token
    /// is [`BriefingError::ConfigMalformed`] so callers can ask for setup.
    pub fn load_complete(&self) -> Result<Credentials, BriefingError> {
        let credentials = self.load()?;
        if !credentials.is_complete() {
            return Err(BriefingError::ConfigMalformed {
                path: self.display_path(),
                reason: "simBrief_userName and api_token must both be filled in".to_string(),
            });
        }
        Ok(credentials)
    }

    /// Overwrites the credentials file.
    pub fn save(&self, credentials: &Credentials) -> Result<(), BriefingError> {
        let write_error = |reason: String| BriefingError::ConfigWriteError {
            path: self.display_path(),
            reason,
        };

        let json = serde_json::to_string_pretty(credentials).map_err(|e| write_error(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| write_error(e.to_string()))?;

        info!(path = %self.path.display(), "Saved credentials.");
        Ok(())
    }

    /// Writes an empty template so the file can be filled in by hand.
    /// Refuses to touch an existing file.
    pub fn write_template(&self) -> Result<(), BriefingError> {
        if self.path.exists() {
            return Ok(());
        }
        self.save(&Credentials::default())
    }
}

/// Endpoint and runtime settings read from `briefing.toml`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub request_timeout_seconds: u64,
    pub log_dir: String,
    pub endpoints: EndpointSettings,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EndpointSettings {
    pub simbrief_url: String,
    pub avwx_url: String,
    pub vatsim_url: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            request_timeout_seconds: 10,
            log_dir: "logs".to_string(),
            endpoints: EndpointSettings {
                simbrief_url: "https://www.simbrief.com/api/xml.fetcher.php".to_string(),
                avwx_url: "https://avwx.rest/api".to_string(),
                vatsim_url: "https://data.vatsim.net/v3/vatsim-data.json".to_string(),
            },
        }
    }
}

impl AppSettings {
    /// Loads settings from `path`.
    /// If it doesn't exist, writes the defaults there for the user to edit.
    /// A file that exists but can't be read or parsed is left alone and the
    /// defaults are used.
    ///
    /// Runs before logging is set up, so problems come back as messages for
    /// the caller to log once it can.
    pub fn load(path: impl AsRef<Path>) -> (Self, Vec<String>) {
        let path = path.as_ref();
        let mut warnings = Vec::new();

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => return (settings, warnings),
                Err(e) => {
                    warnings.push(format!("Failed to parse {}: {}. Using defaults.", path.display(), e));
                    return (Self::default(), warnings);
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                warnings.push(format!("Could not read {}: {}. Using defaults.", path.display(), e));
                return (Self::default(), warnings);
            }
        }

        let defaults = Self::default();
        match toml::to_string_pretty(&defaults) {
            Ok(toml_string) => {
                if let Err(e) = fs::write(path, toml_string) {
                    warnings.push(format!("Could not write default {} to disk: {}", path.display(), e));
                }
            }
            Err(e) => warnings.push(format!("Could not serialize default settings: {}", e)),
        }

        (defaults, warnings)
    }
}
