use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs a file logger under `log_dir`. Keep the guard alive for the
/// lifetime of the program or buffered lines are lost.
pub fn initialize_logging(log_dir: &str) -> WorkerGuard {
    // The subscriber isn't up yet, so this can only go to stderr.
    if let Err(message) = prepare_log_dir(log_dir) {
        eprintln!("{}", message);
    }

    let file_appender = tracing_appender::rolling::daily(log_dir, "briefing.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    tracing::info!("Logging initialized successfully.");
    guard
}

fn prepare_log_dir(log_dir: &str) -> Result<(), String> {
    std::fs::create_dir_all(log_dir)
        .map_err(|e| format!("Could not create log directory {}: {}", log_dir, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_prepare_log_dir_reports_failure() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("logs").join("today");
        assert!(prepare_log_dir(nested.to_str().unwrap()).is_ok());
        assert!(nested.is_dir());

        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let under_file = blocker.join("logs");
        let message = prepare_log_dir(under_file.to_str().unwrap()).unwrap_err();
        assert!(message.starts_with("Could not create log directory"));
        assert!(message.contains("blocker"));
    }
}
