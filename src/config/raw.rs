use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use serde_with::serde_as;

use crate::Result;
use crate::error::ConfigError;

use super::defaults::{default_connect_timeout, default_queue_bound, default_request_timeout};
use super::env::EnvSource;
use super::{Config, HttpSettings, HumantimeDuration, ReporterArgs};

/// Load the file, layer `BUILD_NOTIFY__*` and the flat shortcuts from `env`
/// over it, then validate the non-reporter sections.
pub(super) fn from_sources(path: impl AsRef<Path>, env: &EnvSource) -> Result<Config> {
    let mut raw = load(path, env)?;
    raw.apply_env_overrides(env)?;
    raw.validate_and_build()
}

fn load(path: impl AsRef<Path>, env: &EnvSource) -> std::result::Result<RawConfig, ConfigError> {
    ::config::Config::builder()
        .add_source(::config::File::from(path.as_ref()).required(false))
        .add_source(env.layered())
        .build()
        .map_err(|err| ConfigError::Other(err.to_string()))?
        .try_deserialize()
        .map_err(|err| ConfigError::Parse(err.to_string()))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub(super) slack: ReporterArgs,
    #[serde(default)]
    pub(super) http: RawHttp,
    #[serde(default)]
    pub(super) app: RawApp,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawHttp {
    #[serde(default = "default_request_timeout")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) timeout: Duration,
    #[serde(default = "default_connect_timeout")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) connect_timeout: Duration,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawApp {
    #[serde(default = "default_queue_bound")]
    pub(super) queue_bound: usize,
}

impl RawConfig {
    // Layered values arrive as strings; the list and flag fields of the
    // reporter are parsed here so a string field such as `username=1234`
    // keeps its type.
    fn apply_env_overrides(&mut self, env: &EnvSource) -> std::result::Result<(), ConfigError> {
        for key in ["BUILD_NOTIFY__SLACK__CHANNELS", "SLACK_CHANNELS"] {
            if let Some(channels) = env.list(key)? {
                self.slack.channels =
                    Value::Array(channels.into_iter().map(Value::String).collect());
            }
        }
        for key in ["BUILD_NOTIFY__SLACK__DEBUG", "SLACK_DEBUG"] {
            if let Some(debug) = env.bool(key)? {
                self.slack.debug = Value::Bool(debug);
            }
        }
        for key in ["BUILD_NOTIFY__SLACK__VERIFY", "SLACK_VERIFY"] {
            if let Some(verify) = env.bool(key)? {
                self.slack.verify = Value::Bool(verify);
            }
        }
        if let Some(endpoint) = env.string("SLACK_ENDPOINT")? {
            self.slack.endpoint = Value::String(endpoint);
        }
        if let Some(username) = env.string("SLACK_USERNAME")? {
            self.slack.username = Value::String(username);
        }
        if let Some(icon_url) = env.string("SLACK_ICON_URL")? {
            self.slack.icon_url = Value::String(icon_url);
        }
        if let Some(timeout) = env.duration("HTTP_TIMEOUT")? {
            self.http.timeout = timeout;
        }
        if let Some(timeout) = env.duration("HTTP_CONNECT_TIMEOUT")? {
            self.http.connect_timeout = timeout;
        }
        if let Some(queue) = env.parse::<usize>("NOTIFY_QUEUE_BOUND")? {
            self.app.queue_bound = queue;
        }
        Ok(())
    }

    fn validate_and_build(self) -> Result<Config> {
        if self.app.queue_bound == 0 {
            return Err(ConfigError::InvalidField {
                field: "app.queue_bound",
                message: "queue bound must be greater than zero".to_string(),
            }
            .into());
        }
        if self.http.timeout.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "http.timeout",
                message: "request timeout must be greater than zero".to_string(),
            }
            .into());
        }
        if self.http.connect_timeout.is_zero() {
            return Err(ConfigError::InvalidField {
                field: "http.connect_timeout",
                message: "connect timeout must be greater than zero".to_string(),
            }
            .into());
        }

        Ok(Config {
            slack: self.slack,
            http: HttpSettings {
                request_timeout: self.http.timeout,
                connect_timeout: self.http.connect_timeout,
            },
            queue_capacity: self.app.queue_bound,
        })
    }
}

impl Default for RawHttp {
    fn default() -> Self {
        Self {
            timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

impl Default for RawApp {
    fn default() -> Self {
        Self {
            queue_bound: default_queue_bound(),
        }
    }
}
