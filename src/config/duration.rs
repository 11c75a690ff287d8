use std::time::Duration;

use humantime::parse_duration;
use serde::Deserialize;
use serde_with::DeserializeAs;

/// Reads durations written the human way (`"10s"`, `"1m 30s"`).
pub(super) struct HumantimeDuration;

impl<'de> DeserializeAs<'de, Duration> for HumantimeDuration {
    fn deserialize_as<D>(deserializer: D) -> std::result::Result<Duration, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::HumantimeDuration;
    use serde::Deserialize;
    use serde_with::serde_as;
    use std::time::Duration;

    #[serde_as]
    #[derive(Deserialize)]
    struct Timeouts {
        #[serde_as(as = "HumantimeDuration")]
        timeout: Duration,
        #[serde_as(as = "Option<HumantimeDuration>")]
        #[serde(default)]
        connect_timeout: Option<Duration>,
    }

    #[test]
    fn parses_compound_durations() {
        let parsed: Timeouts = match serde_json::from_str(r#"{"timeout":"1m 30s"}"#) {
            Ok(value) => value,
            Err(err) => panic!("failed to parse sample json: {err}"),
        };
        assert_eq!(parsed.timeout, Duration::from_secs(90));
        assert!(parsed.connect_timeout.is_none());
    }

    #[test]
    fn rejects_bare_numbers() {
        assert!(serde_json::from_str::<Timeouts>(r#"{"timeout":"10"}"#).is_err());
    }
}
