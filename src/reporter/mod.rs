//! Posts build-completion messages to a chat webhook.

pub mod message;

use std::sync::Arc;

use reqwest::StatusCode;
use tracing::{debug, error};

use crate::Result;
use crate::config::{HttpSettings, ReporterArgs, SlackSettings, check_reporter_args};
use crate::error::{ConfigErrors, Error as NotifyError};
use crate::http_client::HttpClientService;
use crate::types::Build;

pub use message::{Attachment, Message, build_message, color_for};

/// Outcome of one [`SlackStatusPush::send`] call. Informational only: failed
/// posts have already been logged.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DeliveryReport {
    pub attempted: usize,
    pub failed: usize,
}

impl DeliveryReport {
    #[must_use]
    pub const fn delivered(&self) -> usize {
        self.attempted - self.failed
    }
}

#[derive(Clone, Debug)]
pub struct SlackStatusPush {
    settings: SlackSettings,
    http: Arc<HttpClientService>,
}

impl SlackStatusPush {
    pub const NAME: &'static str = "SlackStatusPush";

    /// Record every problem with `args` without building anything.
    #[must_use]
    pub fn check_config(args: &ReporterArgs) -> ConfigErrors {
        check_reporter_args(args)
    }

    #[must_use]
    pub const fn new(settings: SlackSettings, http: Arc<HttpClientService>) -> Self {
        Self { settings, http }
    }

    /// Validate `args` and start a reporter with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns all configuration errors of `args` at once, or an error if the
    /// HTTP client cannot be built.
    pub fn from_args(args: &ReporterArgs, http: HttpSettings) -> Result<Self> {
        let settings = SlackSettings::from_args(args).map_err(NotifyError::from)?;
        let client = HttpClientService::for_endpoint(&settings, http)?;
        Ok(Self::new(settings, Arc::new(client)))
    }

    /// Reporter for reloaded `args`. The HTTP client is shared with `self`
    /// unless the endpoint or transport settings changed.
    ///
    /// # Errors
    ///
    /// Same as [`SlackStatusPush::from_args`]; `self` is left untouched.
    pub fn reconfig_service(&self, args: &ReporterArgs, http: HttpSettings) -> Result<Self> {
        let settings = SlackSettings::from_args(args).map_err(NotifyError::from)?;
        let client = if self.http.serves(&settings, http) {
            Arc::clone(&self.http)
        } else {
            Arc::new(HttpClientService::for_endpoint(&settings, http)?)
        };
        Ok(Self::new(settings, client))
    }

    #[must_use]
    pub const fn settings(&self) -> &SlackSettings {
        &self.settings
    }

    #[must_use]
    pub fn shares_client_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.http, &other.http)
    }

    /// One message per destination, in channel order.
    ///
    /// Empty when `build` produces no payload.
    #[must_use]
    pub fn messages_for(&self, build: &Build) -> Vec<Message> {
        let Some(mut message) = build_message(build) else {
            return Vec::new();
        };

        if let Some(username) = &self.settings.username {
            message.username = Some(username.clone());
        }
        if let Some(icon_url) = &self.settings.icon_url {
            message.icon_url = Some(icon_url.clone());
        }

        match &self.settings.channels {
            None => vec![message],
            Some(channels) => channels
                .iter()
                .map(|channel| Message {
                    channel: Some(channel.clone()),
                    ..message.clone()
                })
                .collect(),
        }
    }

    /// Deliver the notification for `build` to every destination.
    ///
    /// Never fails: a destination that refuses the message is logged and the
    /// remaining ones are still tried.
    pub async fn send(&self, build: &Build) -> DeliveryReport {
        let messages = self.messages_for(build);
        if messages.is_empty() {
            debug!(
                builder = %build.builder.name,
                number = build.number,
                complete = build.complete,
                "no message for build"
            );
            return DeliveryReport::default();
        }

        let mut report = DeliveryReport::default();
        for message in &messages {
            report.attempted += 1;
            if !self.send_message(message).await {
                report.failed += 1;
            }
        }
        report
    }

    async fn send_message(&self, message: &Message) -> bool {
        let response = match self.http.post(message).await {
            Ok(response) => response,
            Err(err) => {
                error!(
                    channel = message.channel.as_deref(),
                    error = %err,
                    "unable to upload status"
                );
                return false;
            }
        };

        let status = response.status();
        if status == StatusCode::OK {
            return true;
        }

        let code = status.as_u16();
        let content = response
            .text()
            .await
            .unwrap_or_else(|err| format!("<unreadable body: {err}>"));
        error!(
            code,
            channel = message.channel.as_deref(),
            "{code}: unable to upload status: {content}"
        );
        false
    }
}

#[cfg(test)]
mod tests {
    use super::SlackStatusPush;
    use crate::config::{HttpSettings, ReporterArgs};
    use crate::types::{Build, BuilderRef};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn reporter(args: &ReporterArgs) -> SlackStatusPush {
        match SlackStatusPush::from_args(args, HttpSettings::default()) {
            Ok(reporter) => reporter,
            Err(err) => panic!("reporter rejected: {err}"),
        }
    }

    fn build() -> Build {
        Build {
            number: 7,
            builder: BuilderRef {
                name: "linux".to_string(),
            },
            url: "http://ci/builds/7".to_string(),
            complete: true,
            complete_at: Utc.timestamp_opt(1_700_000_000, 0).single(),
            results: Some(0),
        }
    }

    #[test]
    fn check_config_records_without_panicking() {
        let errors = SlackStatusPush::check_config(&ReporterArgs::new(json!(2)));
        assert!(errors.contains("endpoint must be a string"));
    }

    #[test]
    fn from_args_returns_every_error() {
        let args = ReporterArgs::new(json!(2)).with_icon_url(json!(1));
        let err = match SlackStatusPush::from_args(&args, HttpSettings::default()) {
            Ok(_) => panic!("invalid args accepted"),
            Err(err) => err.to_string(),
        };
        assert!(err.contains("endpoint must be a string"));
        assert!(err.contains("icon_url must be a string or None"));
    }

    #[test]
    fn single_destination_without_channels() {
        let reporter = reporter(&ReporterArgs::new("http://hooks.local/x"));
        let messages = reporter.messages_for(&build());
        assert_eq!(messages.len(), 1);
        assert!(messages[0].channel.is_none());
        assert!(messages[0].username.is_none());
        assert!(messages[0].icon_url.is_none());
    }

    #[test]
    fn one_message_per_channel_in_order() {
        let reporter = reporter(
            &ReporterArgs::new("http://hooks.local/x")
                .with_username("bb")
                .with_icon_url("http://icons.local/bb.png")
                .with_channels(json!(["chan0", "chan1"])),
        );
        let messages = reporter.messages_for(&build());
        let channels: Vec<_> = messages.iter().map(|m| m.channel.as_deref()).collect();
        assert_eq!(channels, [Some("chan0"), Some("chan1")]);
        assert_eq!(messages[0].attachments, messages[1].attachments);
        assert!(messages.iter().all(|m| m.username.as_deref() == Some("bb")));
        assert!(
            messages
                .iter()
                .all(|m| m.icon_url.as_deref() == Some("http://icons.local/bb.png"))
        );
    }

    #[test]
    fn empty_channel_list_has_no_destination() {
        let reporter = reporter(&ReporterArgs::new("http://hooks.local/x").with_channels(json!([])));
        assert!(reporter.messages_for(&build()).is_empty());
    }

    #[test]
    fn reconfig_keeps_client_for_same_endpoint() {
        let first = reporter(&ReporterArgs::new("http://hooks.local/x"));
        let same = match first.reconfig_service(
            &ReporterArgs::new("http://hooks.local/x").with_username("bb"),
            HttpSettings::default(),
        ) {
            Ok(reporter) => reporter,
            Err(err) => panic!("reload rejected: {err}"),
        };
        assert!(same.shares_client_with(&first));
        assert_eq!(same.settings().username.as_deref(), Some("bb"));

        let moved = match first.reconfig_service(
            &ReporterArgs::new("http://hooks.local/y"),
            HttpSettings::default(),
        ) {
            Ok(reporter) => reporter,
            Err(err) => panic!("reload rejected: {err}"),
        };
        assert!(!moved.shares_client_with(&first));
    }

    #[test]
    fn reconfig_with_bad_args_fails() {
        let first = reporter(&ReporterArgs::new("http://hooks.local/x"));
        assert!(
            first
                .reconfig_service(&ReporterArgs::new(json!(false)), HttpSettings::default())
                .is_err()
        );
    }
}
