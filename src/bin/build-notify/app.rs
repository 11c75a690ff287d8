use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_channel::bounded;
use build_notify::Result;
use build_notify::config::Config;
use build_notify::error::Error as NotifyError;
use build_notify::reporter::SlackStatusPush;
use build_notify::telemetry::init_tracing;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

use super::cli::Cli;
use super::events::forward_from;
use super::notifier::run_notifier;

const DEFAULT_CONFIG: &str = "build-notify.toml";

pub async fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.log_filter.as_deref(), cli.json_logs)?;

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let config = Config::from_env_and_file(&config_path)?;

    let errors = config.check();
    if cli.check && errors.is_empty() {
        info!(path = %config_path.display(), "configuration is valid");
        return Ok(());
    }
    errors.into_result().map_err(NotifyError::from)?;

    let reporter = SlackStatusPush::from_args(&config.slack, config.http)?;
    info!(
        reporter = SlackStatusPush::NAME,
        channels = reporter.settings().channels.as_ref().map_or(0, Vec::len),
        dry_run = cli.dry_run,
        "reporter started"
    );

    let (reporter_tx, reporter_rx) = watch::channel(Arc::new(reporter));
    let (tx, rx) = bounded(config.queue_capacity);
    let notifier = tokio::spawn(run_notifier(rx, reporter_rx, cli.dry_run));

    let mut reload = ReloadSignal::new()?;
    let ingest = forward_from(cli.events.as_deref(), &tx);
    tokio::pin!(ingest);

    let outcome = loop {
        tokio::select! {
            biased;
            _ = signal::ctrl_c() => {
                info!("shutdown signal received, stopping");
                break Ok(());
            }
            () = reload.recv() => {
                reload_reporter(&config_path, &reporter_tx);
            }
            res = &mut ingest => {
                break res.map(|forwarded| info!(forwarded, "event stream closed"));
            }
        }
    };

    tx.close();
    if let Err(err) = notifier.await {
        warn!(error = %err, "notifier task terminated unexpectedly");
    }

    outcome
}

fn reload_reporter(path: &Path, reporter: &watch::Sender<Arc<SlackStatusPush>>) {
    let config = match Config::from_env_and_file(path) {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "reload failed, keeping current reporter");
            return;
        }
    };

    let current = Arc::clone(&reporter.borrow());
    match current.reconfig_service(&config.slack, config.http) {
        Ok(next) => {
            let reused_client = next.shares_client_with(&current);
            reporter.send_replace(Arc::new(next));
            info!(reused_client, "reporter reconfigured");
        }
        Err(err) => error!(error = %err, "reload rejected, keeping current reporter"),
    }
}

#[cfg(unix)]
struct ReloadSignal(signal::unix::Signal);

#[cfg(unix)]
impl ReloadSignal {
    fn new() -> Result<Self> {
        signal::unix::signal(signal::unix::SignalKind::hangup())
            .map(Self)
            .map_err(|source| NotifyError::Signal { source })
    }

    async fn recv(&mut self) {
        if self.0.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
struct ReloadSignal;

#[cfg(not(unix))]
impl ReloadSignal {
    #[allow(clippy::unnecessary_wraps)]
    const fn new() -> Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) {
        std::future::pending::<()>().await;
    }
}
