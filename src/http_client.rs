use std::fmt;
use std::time::Duration;

use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::Result;
use crate::config::{HttpSettings, SlackSettings};
use crate::error::{ConfigError, HttpError};

pub const CORRELATION_HEADER: &str = "x-correlation-id";
const BODY_PREVIEW_LIMIT: usize = 256;

/// Long-lived HTTP client bound to one base URL.
///
/// Created when the service starts and shared by reference; the reporter never
/// manages the connection pool itself.
#[derive(Clone)]
pub struct HttpClientService {
    http: reqwest::Client,
    base: Url,
    settings: HttpSettings,
    verify: bool,
    debug: bool,
}

impl HttpClientService {
    /// Build a client for `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn new(base: Url, settings: HttpSettings, verify: bool, debug: bool) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .user_agent(concat!("build-notify/", env!("CARGO_PKG_VERSION")))
            .pool_idle_timeout(Duration::from_secs(30))
            .danger_accept_invalid_certs(!verify)
            .build()
            .map_err(|err| HttpError::Client { source: err })?;

        Ok(Self {
            http,
            base,
            settings,
            verify,
            debug,
        })
    }

    /// Build the client serving the endpoint of `slack`.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is not an absolute URL or if the HTTP
    /// client fails to build.
    pub fn for_endpoint(slack: &SlackSettings, settings: HttpSettings) -> Result<Self> {
        let base = parse_endpoint(slack)?;
        Self::new(base, settings, slack.verify, slack.debug)
    }

    /// Whether this client can keep serving `slack` after a reload.
    #[must_use]
    pub fn serves(&self, slack: &SlackSettings, settings: HttpSettings) -> bool {
        parse_endpoint(slack).is_ok_and(|base| base == self.base)
            && self.settings == settings
            && self.verify == slack.verify
            && self.debug == slack.debug
    }

    /// POST `json` to the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent. Non-success statuses
    /// are returned as responses.
    pub async fn post<T>(&self, json: &T) -> std::result::Result<reqwest::Response, HttpError>
    where
        T: Serialize + ?Sized,
    {
        let correlation_id = Uuid::now_v7().to_string();
        if self.debug {
            let body = serde_json::to_vec(json).unwrap_or_default();
            debug!(%correlation_id, body = %body_preview(&body), "posting payload");
        }

        let response = self
            .http
            .post(self.base.clone())
            .header(CORRELATION_HEADER, &correlation_id)
            .json(json)
            .send()
            .await?;

        debug!(%correlation_id, status = %response.status(), "payload posted");
        Ok(response)
    }
}

// The base URL of a webhook carries its token.
impl fmt::Debug for HttpClientService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClientService")
            .field("host", &self.base.host_str())
            .field("settings", &self.settings)
            .field("verify", &self.verify)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

fn parse_endpoint(slack: &SlackSettings) -> Result<Url> {
    Url::parse(slack.endpoint.expose_secret()).map_err(|err| {
        ConfigError::InvalidField {
            field: "slack.endpoint",
            message: err.to_string(),
        }
        .into()
    })
}

pub(crate) fn body_preview(body: &[u8]) -> String {
    if body.is_empty() {
        return "<empty>".to_string();
    }
    let end = body.len().min(BODY_PREVIEW_LIMIT);
    let mut preview = String::from_utf8_lossy(&body[..end]).to_string();
    if body.len() > BODY_PREVIEW_LIMIT {
        preview.push_str("...");
    }
    preview.replace('\n', "\\n")
}
