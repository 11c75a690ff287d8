use serde::Serialize;

use crate::types::{Build, BuildResult};

/// Chat message posted to the webhook.
///
/// Optional top-level fields are left out of the JSON body when unset.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Message {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    pub attachments: Vec<Attachment>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Attachment {
    /// `null` for result codes outside the color table.
    pub color: Option<&'static str>,
    pub author_name: String,
    pub title: String,
    pub title_link: String,
    pub ts: i64,
}

#[must_use]
pub const fn color_for(result: BuildResult) -> &'static str {
    match result {
        BuildResult::Success => "#8d4",
        BuildResult::Warnings => "#fa3",
        BuildResult::Failure => "#e88",
        BuildResult::Skipped => "#ade",
        BuildResult::Exception => "#c6c",
        BuildResult::Retry | BuildResult::Cancelled => "#ecc",
    }
}

/// Payload announcing that `build` finished.
///
/// `None` while the build is still running, or when it carries no completion
/// time.
#[must_use]
pub fn build_message(build: &Build) -> Option<Message> {
    if !build.complete {
        return None;
    }
    let complete_at = build.complete_at?;

    Some(Message {
        username: None,
        icon_url: None,
        channel: None,
        attachments: vec![Attachment {
            color: build.result().map(color_for),
            author_name: build.builder.name.clone(),
            title: format!("Build #{} finished", build.number),
            title_link: build.url.clone(),
            ts: complete_at.timestamp(),
        }],
    })
}
