use anyhow::Result;
use std::future::Future;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::execution::processor::MessageProcessor;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    pub processed: usize,
    pub rejected: usize,
}

/// Process newline-delimited JSON messages until EOF or `shutdown` resolves.
///
/// Each enriched message is written as one line. A rejected message is
/// logged and skipped; only IO failures end the loop early. The summary is
/// returned either way.
pub async fn run_stream<R, W, F>(
    processor: &MessageProcessor,
    reader: R,
    mut writer: W,
    shutdown: F,
) -> Result<StreamSummary>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    F: Future<Output = ()>,
{
    let mut lines = reader.lines();
    let mut summary = StreamSummary::default();
    let mut line_no = 0usize;
    tokio::pin!(shutdown);

    loop {
        let line = tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!("Shutdown requested, stopping stream");
                break;
            }
            line = lines.next_line() => match line? {
                Some(line) => line,
                None => break,
            },
        };

        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }

        match processor.process_line(&line) {
            Ok(encoded) => {
                writer.write_all(encoded.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
                summary.processed += 1;
            }
            Err(e) => {
                warn!("Rejected message on line {}: {}", line_no, e);
                summary.rejected += 1;
            }
        }
    }

    info!(
        "Stream finished: {} processed, {} rejected",
        summary.processed, summary.rejected
    );
    Ok(summary)
}
