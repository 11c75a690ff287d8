use std::fmt;
use std::path::Path;
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use serde_json::Value;

use crate::Result;
use crate::error::ConfigErrors;

mod check;
mod defaults;
mod duration;
mod env;
mod raw;

pub use check::check_reporter_args;
use duration::HumantimeDuration;

#[derive(Debug, Clone)]
pub struct Config {
    pub slack: ReporterArgs,
    pub http: HttpSettings,
    pub queue_capacity: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout: defaults::default_request_timeout(),
            connect_timeout: defaults::default_connect_timeout(),
        }
    }
}

/// Reporter arguments exactly as the operator wrote them.
///
/// Values stay untyped until [`check_reporter_args`] has looked at them, so a
/// wrong type is reported as a configuration error instead of failing the
/// whole deserialization.
#[derive(Clone, Default, Deserialize)]
pub struct ReporterArgs {
    #[serde(default)]
    pub endpoint: Value,
    #[serde(default)]
    pub username: Value,
    #[serde(default)]
    pub channels: Value,
    #[serde(default)]
    pub icon_url: Value,
    #[serde(default)]
    pub debug: Value,
    #[serde(default)]
    pub verify: Value,
}

impl ReporterArgs {
    pub fn new(endpoint: impl Into<Value>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_username(mut self, username: impl Into<Value>) -> Self {
        self.username = username.into();
        self
    }

    #[must_use]
    pub fn with_channels(mut self, channels: impl Into<Value>) -> Self {
        self.channels = channels.into();
        self
    }

    #[must_use]
    pub fn with_icon_url(mut self, icon_url: impl Into<Value>) -> Self {
        self.icon_url = icon_url.into();
        self
    }

    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = Value::Bool(debug);
        self
    }
}

// The endpoint embeds the webhook token, keep it out of logs.
impl fmt::Debug for ReporterArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let endpoint = if self.endpoint.is_null() {
            "<unset>"
        } else {
            "<redacted>"
        };
        f.debug_struct("ReporterArgs")
            .field("endpoint", &endpoint)
            .field("username", &self.username)
            .field("channels", &self.channels)
            .field("icon_url", &self.icon_url)
            .field("debug", &self.debug)
            .field("verify", &self.verify)
            .finish()
    }
}

/// Typed reporter settings, only obtainable from arguments that passed
/// validation.
#[derive(Debug, Clone)]
pub struct SlackSettings {
    pub endpoint: SecretString,
    pub username: Option<String>,
    pub channels: Option<Vec<String>>,
    pub icon_url: Option<String>,
    pub debug: bool,
    pub verify: bool,
}

impl SlackSettings {
    /// Validate `args` and convert them into typed settings.
    ///
    /// # Errors
    ///
    /// Returns every validation message recorded for `args`.
    pub fn from_args(args: &ReporterArgs) -> std::result::Result<Self, ConfigErrors> {
        check_reporter_args(args).into_result()?;

        let endpoint = args.endpoint.as_str().unwrap_or_default().to_string();
        Ok(Self {
            endpoint: endpoint.into(),
            username: optional_string(&args.username),
            channels: args.channels.as_array().map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            }),
            icon_url: optional_string(&args.icon_url),
            debug: args.debug.as_bool().unwrap_or(false),
            verify: args.verify.as_bool().unwrap_or(true),
        })
    }
}

fn optional_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

impl Config {
    /// Load configuration from a file and the environment.
    ///
    /// Reporter arguments are not validated here; call [`Config::check`] to
    /// collect their errors.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration file cannot be parsed, when
    /// environment overrides are invalid, or when HTTP or queue settings fail
    /// validation.
    pub fn from_env_and_file(path: impl AsRef<Path>) -> Result<Self> {
        raw::from_sources(path, &env::EnvSource::Process)
    }

    #[must_use]
    pub fn check(&self) -> ConfigErrors {
        check_reporter_args(&self.slack)
    }
}
