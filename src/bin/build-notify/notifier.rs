use std::sync::Arc;

use async_channel::Receiver;
use build_notify::reporter::SlackStatusPush;
use build_notify::types::{Build, BuildResult};
use tokio::sync::watch;
use tracing::{debug, info};

/// Drain `rx`, notifying each build with whichever reporter is current.
pub async fn run_notifier(
    rx: Receiver<Build>,
    reporter: watch::Receiver<Arc<SlackStatusPush>>,
    dry_run: bool,
) {
    while let Ok(build) = rx.recv().await {
        let current = Arc::clone(&reporter.borrow());
        let result = build.result().map_or("unknown", BuildResult::as_str);

        if dry_run {
            for message in current.messages_for(&build) {
                info!(
                    builder = %build.builder.name,
                    number = build.number,
                    result,
                    channel = message.channel.as_deref(),
                    payload = %serde_json::to_string(&message).unwrap_or_default(),
                    "dry-run: would post message"
                );
            }
            continue;
        }

        let report = current.send(&build).await;
        if report.attempted == 0 {
            debug!(builder = %build.builder.name, number = build.number, "build skipped");
            continue;
        }
        info!(
            builder = %build.builder.name,
            number = build.number,
            result,
            delivered = report.delivered(),
            failed = report.failed,
            "build notification processed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::run_notifier;
    use async_channel::bounded;
    use build_notify::config::{HttpSettings, ReporterArgs};
    use build_notify::reporter::SlackStatusPush;
    use build_notify::types::{Build, BuilderRef};
    use std::sync::Arc;
    use tokio::sync::watch;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn build(number: u64, complete: bool) -> Build {
        Build {
            number,
            builder: BuilderRef {
                name: "Builder0".to_string(),
            },
            url: format!("http://ci/builds/{number}"),
            complete,
            complete_at: chrono::DateTime::from_timestamp(1_700_000_000, 0),
            results: Some(0),
        }
    }

    async fn notify_all(server: &MockServer, builds: Vec<Build>, dry_run: bool) {
        let reporter = match SlackStatusPush::from_args(
            &ReporterArgs::new(server.uri()),
            HttpSettings::default(),
        ) {
            Ok(reporter) => reporter,
            Err(err) => panic!("reporter rejected: {err}"),
        };
        let (_reporter_tx, reporter_rx) = watch::channel(Arc::new(reporter));
        let (tx, rx) = bounded(8);
        for build in builds {
            if tx.send(build).await.is_err() {
                panic!("notifier queue closed");
            }
        }
        tx.close();
        run_notifier(rx, reporter_rx, dry_run).await;
    }

    #[tokio::test]
    async fn posts_each_finished_build() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(2)
            .mount(&server)
            .await;

        notify_all(
            &server,
            vec![build(1, true), build(2, false), build(3, true)],
            false,
        )
        .await;
    }

    #[tokio::test]
    async fn dry_run_posts_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        notify_all(&server, vec![build(1, true)], true).await;
    }
}
