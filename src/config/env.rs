#[cfg(test)]
use std::collections::HashMap;
use std::time::Duration;

use humantime::parse_duration;

use crate::error::ConfigError;

const ENV_PREFIX: &str = "BUILD_NOTIFY";
const ENV_SEPARATOR: &str = "__";

/// Where environment overrides are read from.
///
/// Blank values count as unset everywhere, in both the layered
/// `BUILD_NOTIFY__*` keys and the flat shortcuts.
#[derive(Debug, Clone, Default)]
pub(super) enum EnvSource {
    #[default]
    Process,
    #[cfg(test)]
    Fixed(HashMap<String, String>),
}

impl EnvSource {
    /// Layered source for the `config` builder. Every value stays a string.
    pub(super) fn layered(&self) -> ::config::Environment {
        let layered = ::config::Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .ignore_empty(true);
        match self {
            Self::Process => layered,
            #[cfg(test)]
            Self::Fixed(vars) => layered.source(Some(vars.clone().into_iter().collect())),
        }
    }

    fn var(&self, key: &str) -> std::result::Result<Option<String>, ConfigError> {
        let value = match self {
            Self::Process => match std::env::var(key) {
                Ok(value) => Some(value),
                Err(std::env::VarError::NotPresent) => None,
                Err(err) => return Err(ConfigError::Other(format!("{key}: {err}"))),
            },
            #[cfg(test)]
            Self::Fixed(vars) => vars.get(key).cloned(),
        };
        Ok(value.filter(|value| !value.trim().is_empty()))
    }

    pub(super) fn string(
        &self,
        key: &'static str,
    ) -> std::result::Result<Option<String>, ConfigError> {
        self.var(key)
    }

    pub(super) fn parse<T>(&self, key: &'static str) -> std::result::Result<Option<T>, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.var(key)?
            .map(|value| {
                value
                    .trim()
                    .parse::<T>()
                    .map_err(|err| ConfigError::InvalidField {
                        field: key,
                        message: err.to_string(),
                    })
            })
            .transpose()
    }

    pub(super) fn bool(&self, key: &'static str) -> std::result::Result<Option<bool>, ConfigError> {
        self.parse::<bool>(key)
    }

    pub(super) fn duration(
        &self,
        key: &'static str,
    ) -> std::result::Result<Option<Duration>, ConfigError> {
        self.var(key)?
            .map(|value| {
                parse_duration(value.trim()).map_err(|err| ConfigError::InvalidField {
                    field: key,
                    message: err.to_string(),
                })
            })
            .transpose()
    }

    /// Comma separated list, e.g. `SLACK_CHANNELS="#ci,#releases"`.
    pub(super) fn list(
        &self,
        key: &'static str,
    ) -> std::result::Result<Option<Vec<String>>, ConfigError> {
        Ok(self.var(key)?.map(|value| split_list(&value)))
    }
}

pub(super) fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
