//! Error kinds surfaced by the briefing workflow.
//!
//! Every failure the user can run into maps to exactly one variant of
//! [`BriefingError`], and every variant renders to its own message. Config
//! errors stop a fetch before it starts, a plan failure stops the run, and
//! the remaining kinds are attached to individual METAR/ATIS fields.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BriefingError {
    /// `userdata.json` does not exist.
    #[error("No configuration found at {path}. Enter your SimBrief username and AVWX token in settings.")]
    ConfigMissing { path: String },

    /// `userdata.json` exists but is not usable.
    #[error("Configuration file {path} is malformed: {reason}")]
    ConfigMalformed { path: String, reason: String },

    /// Saving credentials failed.
    #[error("Could not write configuration to {path}: {reason}")]
    ConfigWriteError { path: String, reason: String },

    /// SimBrief has no recent flight plan for this user.
    #[error("SimBrief has no recent flight plan for user '{username}'")]
    NoPlanFound { username: String },

    /// Connectivity failure or an unexpected HTTP status.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The response did not have the expected shape.
    #[error("Unexpected response from {source_name}: {reason}")]
    ParseError { source_name: String, reason: String },

    /// The AVWX token was rejected (or is empty).
    #[error("AVWX rejected the API token")]
    AuthError,

    /// Unknown ICAO, invalid ICAO or no current report.
    #[error("No METAR available for station '{icao}'")]
    StationNotFound { icao: String },

    /// No matching ATIS is currently published.
    #[error("No VATSIM ATIS currently published for {icao}")]
    AtisUnavailable { icao: String },
}

impl BriefingError {
    /// Short placeholder used where a field would normally be displayed.
    pub fn label(&self) -> &'static str {
        match self {
            BriefingError::ConfigMissing { .. } => "setup required",
            BriefingError::ConfigMalformed { .. } => "config malformed",
            BriefingError::ConfigWriteError { .. } => "config not saved",
            BriefingError::NoPlanFound { .. } => "no flight plan",
            BriefingError::NetworkError(_) => "unavailable (network)",
            BriefingError::ParseError { .. } => "unavailable (bad response)",
            BriefingError::AuthError => "unavailable (invalid token)",
            BriefingError::StationNotFound { .. } => "unavailable (unknown station)",
            BriefingError::AtisUnavailable { .. } => "no ATIS online",
        }
    }

    /// Whether this error should send the user to the settings view.
    pub fn needs_setup(&self) -> bool {
        matches!(
            self,
            BriefingError::ConfigMissing { .. } | BriefingError::ConfigMalformed { .. }
        )
    }

    pub(crate) fn parse(source_name: &str, reason: impl ToString) -> Self {
        BriefingError::ParseError {
            source_name: source_name.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn every_kind() -> Vec<BriefingError> {
        vec![
            BriefingError::ConfigMissing { path: "userdata.json".into() },
            BriefingError::ConfigMalformed {
                path: "userdata.json".into(),
                reason: "eof".into(),
            },
            BriefingError::ConfigWriteError {
                path: "userdata.json".into(),
                reason: "denied".into(),
            },
            BriefingError::NoPlanFound { username: "pilot".into() },
            BriefingError::NetworkError("timeout".into()),
            BriefingError::parse("SimBrief", "missing origin"),
            BriefingError::AuthError,
            BriefingError::StationNotFound { icao: "ZZZZ".into() },
            BriefingError::AtisUnavailable { icao: "EGLL".into() },
        ]
    }

    #[test]
    fn test_every_kind_has_distinct_message() {
        let kinds = every_kind();
        let messages: HashSet<String> = kinds.iter().map(|e| e.to_string()).collect();
        let labels: HashSet<&str> = kinds.iter().map(|e| e.label()).collect();
        assert_eq!(messages.len(), kinds.len());
        assert_eq!(labels.len(), kinds.len());
    }

    #[test]
    fn test_only_config_read_errors_need_setup() {
        let needing: Vec<_> = every_kind().into_iter().filter(|e| e.needs_setup()).collect();
        assert_eq!(needing.len(), 2);
    }
}
