use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;
use crate::error::{AppError, AppResult};

/// Installs the global fmt subscriber. `RUST_LOG` wins over the configured level.
pub fn init(settings: &LoggingSettings) -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|err| AppError::Configuration(format!("invalid log level: {err}")))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| AppError::Configuration(format!("failed to install logger: {err}")))
}

/// Records actions that were intended but suppressed by dry-run mode.
pub trait IntentLog: Send + Sync {
    fn info(&self, issue_key: &str, message: &str);
    fn detail(&self, issue_key: &str, message: &str);

    /// Logs `message` and then every line of `body` as a quoted detail.
    fn body(&self, issue_key: &str, message: &str, body: &str) {
        self.info(issue_key, message);
        for line in body.lines() {
            self.detail(issue_key, &format!("> {line}"));
        }
    }
}

pub struct TracingIntentLog;

impl IntentLog for TracingIntentLog {
    fn info(&self, issue_key: &str, message: &str) {
        tracing::info!(target: "dryrun", issue_key, "DRYRUN - {message}");
    }

    fn detail(&self, issue_key: &str, message: &str) {
        tracing::debug!(target: "dryrun", issue_key, "DRYRUN - {message}");
    }
}
