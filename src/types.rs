use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Outcome of a finished build, as reported by the orchestration server.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildResult {
    Success,
    Warnings,
    Failure,
    Skipped,
    Exception,
    Retry,
    Cancelled,
}

impl BuildResult {
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::Warnings),
            2 => Some(Self::Failure),
            3 => Some(Self::Skipped),
            4 => Some(Self::Exception),
            5 => Some(Self::Retry),
            6 => Some(Self::Cancelled),
            _ => None,
        }
    }

    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Success => 0,
            Self::Warnings => 1,
            Self::Failure => 2,
            Self::Skipped => 3,
            Self::Exception => 4,
            Self::Retry => 5,
            Self::Cancelled => 6,
        }
    }

    /// Lowercase name used in log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warnings => "warnings",
            Self::Failure => "failure",
            Self::Skipped => "skipped",
            Self::Exception => "exception",
            Self::Retry => "retry",
            Self::Cancelled => "cancelled",
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct BuilderRef {
    pub name: String,
}

/// Build record delivered with a build-completion event.
///
/// Mirrors the data API shape: `results` is the raw integer code and
/// `complete_at` is Unix-epoch seconds, both absent while the build runs.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Build {
    pub number: u64,
    pub builder: BuilderRef,
    pub url: String,
    #[serde(default)]
    pub complete: bool,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub complete_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub results: Option<i64>,
}

impl Build {
    #[must_use]
    pub fn result(&self) -> Option<BuildResult> {
        self.results.and_then(BuildResult::from_code)
    }
}

#[cfg(test)]
mod tests {
    use super::{Build, BuildResult};

    #[test]
    fn build_result_codes_round_trip() {
        for code in 0..=6 {
            let result = BuildResult::from_code(code);
            assert_eq!(result.map(BuildResult::code), Some(code));
        }
        assert!(BuildResult::from_code(7).is_none());
        assert!(BuildResult::from_code(-1).is_none());
    }

    #[test]
    fn build_result_names() {
        assert_eq!(BuildResult::Warnings.as_str(), "warnings");
        assert_eq!(BuildResult::Cancelled.as_str(), "cancelled");
    }

    #[test]
    fn build_parses_data_api_record() {
        let build: Build = match serde_json::from_str(
            r#"{
                "buildid": 20,
                "number": 3,
                "builder": {"name": "linux", "builderid": 79},
                "url": "http://localhost:8080/#builders/79/builds/3",
                "complete": true,
                "complete_at": 329920275,
                "results": 2
            }"#,
        ) {
            Ok(value) => value,
            Err(err) => panic!("failed to parse build json: {err}"),
        };
        assert_eq!(build.number, 3);
        assert_eq!(build.builder.name, "linux");
        assert_eq!(build.result(), Some(BuildResult::Failure));
        assert_eq!(build.complete_at.map(|at| at.timestamp()), Some(329_920_275));
    }

    #[test]
    fn running_build_has_no_completion_fields() {
        let build: Build = match serde_json::from_str(
            r#"{"number": 1, "builder": {"name": "b"}, "url": "u", "complete": false}"#,
        ) {
            Ok(value) => value,
            Err(err) => panic!("failed to parse build json: {err}"),
        };
        assert!(!build.complete);
        assert!(build.complete_at.is_none());
        assert!(build.result().is_none());
    }
}
