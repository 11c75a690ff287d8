use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    ConfigErrors(#[from] ConfigErrors),
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("invalid build event on line {line}: {message}")]
    Event { line: usize, message: String },
    #[error("failed to read build events from {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to install signal handler")]
    Signal {
        #[source]
        source: std::io::Error,
    },
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    #[error("invalid configuration for {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
    #[error("configuration error: {0}")]
    Other(String),
}

/// Validation messages gathered over a whole configuration.
///
/// Checks never stop at the first problem: every message is recorded so the
/// operator sees all of them at once.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigErrors {
    errors: Vec<String>,
}

impl ConfigErrors {
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn contains(&self, message: &str) -> bool {
        self.errors.iter().any(|err| err == message)
    }

    /// `Ok(())` when nothing was recorded, the accumulated errors otherwise.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one message was recorded.
    pub fn into_result(self) -> std::result::Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ConfigErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("configuration errors:")?;
        for err in &self.errors {
            write!(f, "\n  {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigErrors {}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("failed to build HTTP client")]
    Client {
        #[source]
        source: reqwest::Error,
    },
    #[error("request failed: {source}")]
    Request {
        #[source]
        source: reqwest::Error,
    },
}

impl From<reqwest::Error> for HttpError {
    fn from(source: reqwest::Error) -> Self {
        Self::Request { source }
    }
}

#[cfg(test)]
mod tests {
    use super::ConfigErrors;

    #[test]
    fn config_errors_display_lists_every_message() {
        let mut errors = ConfigErrors::new();
        errors.add_error("endpoint must be a string");
        errors.add_error("channels must be a list or None");

        let rendered = errors.to_string();
        assert!(rendered.contains("\n  endpoint must be a string"));
        assert!(rendered.contains("\n  channels must be a list or None"));
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn empty_config_errors_is_ok() {
        assert!(ConfigErrors::new().into_result().is_ok());
    }
}
