//! Stream — async plumbing around the enricher.
//!
//! A blocking task tokenizes the input and feeds rows through a bounded
//! channel; the channel capacity is the only buffering between reader and
//! consumer, so a slow consumer stalls the reader. [`enrich_stream`] then maps
//! rows to records one at a time, in arrival order.

use std::io::Read;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, error, warn};

use super::error::IngestError;
use super::reader::row_reader;
use crate::parser::{EnrichMetrics, Enricher, LogRecord, RawRow};

/// Spawn a blocking reader that tokenizes `input` into a bounded channel.
///
/// The task stops after the first tokenizer error (which is forwarded) or
/// as soon as the returned stream is dropped. Once the channel drains the
/// task is joined; a panicked or cancelled reader ends the stream with
/// [`IngestError::Worker`] instead of looking like end of input.
pub fn spawn_row_reader<R>(input: R, capacity: usize) -> impl Stream<Item = Result<RawRow, IngestError>>
where
    R: Read + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<Result<RawRow, IngestError>>(capacity.max(1));

    let handle = tokio::task::spawn_blocking(move || {
        let mut rows = 0u64;
        for row in row_reader(input) {
            let failed = row.is_err();
            if tx.blocking_send(row).is_err() {
                debug!(rows, "row reader: receiver dropped, stopping");
                return;
            }
            if failed {
                warn!(rows, "row reader: tokenizer error, stopping");
                return;
            }
            rows += 1;
        }
        debug!(rows, "row reader: end of input");
    });

    async_stream::stream! {
        let mut rows = ReceiverStream::new(rx);
        while let Some(row) = rows.next().await {
            yield row;
        }
        if let Err(e) = handle.await {
            error!("row reader task failed: {}", e);
            yield Err(IngestError::Worker(e.to_string()));
        }
    }
}

/// Enrich a stream of rows, counting each emitted record in `metrics`.
///
/// Row errors are passed through unchanged.
pub fn enrich_stream<S, E>(
    rows: S,
    enricher: Enricher,
    metrics: Arc<EnrichMetrics>,
) -> impl Stream<Item = Result<LogRecord, E>>
where
    S: Stream<Item = Result<RawRow, E>>,
{
    async_stream::stream! {
        tokio::pin!(rows);
        while let Some(row) = rows.next().await {
            match row {
                Ok(row) => {
                    let record = enricher.enrich(row);
                    metrics.record(&record);
                    yield Ok(record);
                }
                Err(e) => yield Err(e),
            }
        }
    }
}

/// Tokenize `input` on a blocking task and enrich it as a stream.
pub fn ingest<R>(
    input: R,
    enricher: Enricher,
    metrics: Arc<EnrichMetrics>,
    capacity: usize,
) -> impl Stream<Item = Result<LogRecord, IngestError>>
where
    R: Read + Send + 'static,
{
    enrich_stream(spawn_row_reader(input, capacity), enricher, metrics)
}
