use std::path::Path;

use async_channel::Sender;
use build_notify::Result;
use build_notify::error::Error as NotifyError;
use build_notify::types::Build;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::warn;

const STDIN_LABEL: &str = "<stdin>";

/// Forward build records from `path`, or stdin, until the input ends.
/// Returns the number of records handed to the notifier.
pub async fn forward_from(path: Option<&Path>, tx: &Sender<Build>) -> Result<usize> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .await
                .map_err(|source| NotifyError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
            forward_events(BufReader::new(file), path, tx).await
        }
        None => forward_events(BufReader::new(tokio::io::stdin()), Path::new(STDIN_LABEL), tx).await,
    }
}

pub async fn forward_events<R>(reader: R, origin: &Path, tx: &Sender<Build>) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut line_no = 0;
    let mut forwarded = 0;

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|source| NotifyError::Io {
            path: origin.to_path_buf(),
            source,
        })?
    {
        line_no += 1;
        match parse_line(line_no, &line) {
            Ok(None) => {}
            Ok(Some(build)) => {
                if tx.send(build).await.is_err() {
                    break;
                }
                forwarded += 1;
            }
            Err(err) => warn!(error = %err, "skipping malformed build event"),
        }
    }

    Ok(forwarded)
}

fn parse_line(line_no: usize, line: &str) -> Result<Option<Build>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|err| NotifyError::Event {
            line: line_no,
            message: err.to_string(),
        })
}
