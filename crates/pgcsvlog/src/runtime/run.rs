//! Run — open input/output, drive the enrichment stream, write NDJSON.

use std::io::Read;
use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio_stream::{Stream, StreamExt};
use tracing::info;

use crate::conf::IngestConfig;
use crate::ingest::{self, IngestError};
use crate::parser::{EnrichMetrics, Enricher, LogRecord, MetricsSnapshot};

/// Process the configured input end to end and return the run's counters.
pub async fn run(config: &IngestConfig) -> Result<MetricsSnapshot, IngestError> {
    let input = open_input(config)?;
    let output = open_output(config).await?;

    let metrics = Arc::new(EnrichMetrics::new());
    let enricher = Enricher::new(config.enrich_options());
    let records = ingest::ingest(input, enricher, Arc::clone(&metrics), config.channel_capacity);

    let written = write_ndjson(records, output).await?;
    let summary = metrics.snapshot();

    info!(
        records = written,
        duration_lines = summary.duration_lines,
        with_query = summary.with_query,
        with_plan = summary.with_plan,
        duration_only = summary.duration_only,
        invalid_timestamps = summary.invalid_timestamps,
        invalid_numbers = summary.invalid_numbers,
        "Ingest complete"
    );

    Ok(summary)
}

/// Write each record as one JSON line. Stops at the first stream error.
pub async fn write_ndjson<S, W>(records: S, output: W) -> Result<u64, IngestError>
where
    S: Stream<Item = Result<LogRecord, IngestError>>,
    W: AsyncWrite + Unpin,
{
    tokio::pin!(records);
    let mut out = BufWriter::new(output);
    let mut line = Vec::with_capacity(1024);
    let mut written = 0u64;

    while let Some(record) = records.next().await {
        let record = record?;
        line.clear();
        serde_json::to_writer(&mut line, &record)?;
        line.push(b'\n');
        out.write_all(&line).await?;
        written += 1;
    }

    out.flush().await?;
    Ok(written)
}

fn open_input(config: &IngestConfig) -> Result<Box<dyn Read + Send>, IngestError> {
    if config.reads_stdin() {
        info!("Reading csvlog from stdin");
        Ok(Box::new(std::io::stdin()))
    } else {
        info!("Reading csvlog from {}", config.input_path);
        Ok(Box::new(std::fs::File::open(&config.input_path)?))
    }
}

async fn open_output(config: &IngestConfig) -> Result<Box<dyn AsyncWrite + Unpin + Send>, IngestError> {
    if config.writes_stdout() {
        Ok(Box::new(tokio::io::stdout()))
    } else {
        Ok(Box::new(tokio::fs::File::create(&config.output_path).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::ingest;
    use serde_json::Value;
    use std::io::Cursor;

    const SAMPLE: &str = concat!(
        "2024-03-01 12:00:00.001 UTC,\"postgres\",\"shop\",101,\"[local]\",65e1c9a0.65,1,\"idle\",2024-03-01 11:59:00 UTC,3/1,0,LOG,00000,\"connection authorized\",,,,,,,,,\"psql\"\n",
        "2024-03-01 12:00:01.500 UTC,\"postgres\",\"shop\",101,\"[local]\",65e1c9a0.65,2,\"SELECT\",2024-03-01 11:59:00 UTC,3/2,0,LOG,00000,\"duration: 7.0 ms  plan:\nnot valid json {{\",,,,,,,,,\"psql\"\n",
        "2024-03-01 12:00:02.000 UTC,\"postgres\",\"shop\",bogus,\"[local]\",65e1c9a0.65,3,\"SELECT\",yesterday,3/3,0,LOG,00000,\"duration: 3.0 ms  plan:\n{\"\"Query Text\"\":\"\"SELECT 2\"\",\"\"Node Type\"\":\"\"Result\"\"}\",,,,,,,,,\"psql\"\n",
    );

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("pgcsvlog-{}-{}", std::process::id(), name))
    }

    #[tokio::test]
    async fn test_write_ndjson_one_line_per_record() {
        let metrics = Arc::new(EnrichMetrics::new());
        let stream = ingest(Cursor::new(SAMPLE), Enricher::default(), metrics, 4);

        let mut out: Vec<u8> = Vec::new();
        let written = write_ndjson(stream, &mut out).await.unwrap();
        assert_eq!(written, 3);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(lines.len(), 3);

        assert!(lines[0].get("duration").is_none());
        assert_eq!(lines[0]["message"], "connection authorized");

        assert_eq!(lines[1]["duration"], 7.0);
        assert_eq!(lines[1]["query"], "");
        assert!(lines[1].get("plan").is_none());

        assert_eq!(lines[2]["duration"], 3.0);
        assert_eq!(lines[2]["query"], "SELECT 2");
        assert_eq!(lines[2]["plan"]["Node Type"], "Result");
        assert!(lines[2]["process_id"].is_null());
        assert!(lines[2]["session_start_time"].is_null());
    }

    #[tokio::test]
    async fn test_run_file_to_file() {
        let input = temp_path("in.csv");
        let output = temp_path("out.ndjson");
        std::fs::write(&input, SAMPLE).unwrap();

        let config = IngestConfig {
            input_path: input.to_string_lossy().into_owned(),
            output_path: output.to_string_lossy().into_owned(),
            ..Default::default()
        };
        let summary = run(&config).await.unwrap();
        assert_eq!(summary.records, 3);
        assert_eq!(summary.duration_lines, 2);
        assert_eq!(summary.with_plan, 1);
        assert_eq!(summary.duration_only, 1);
        assert_eq!(summary.invalid_numbers, 1);
        assert_eq!(summary.invalid_timestamps, 1);

        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(written.lines().count(), 3);

        std::fs::remove_file(&input).ok();
        std::fs::remove_file(&output).ok();
    }

    #[tokio::test]
    async fn test_run_missing_input() {
        let config = IngestConfig {
            input_path: "/nonexistent/postgresql.csv".to_string(),
            output_path: temp_path("unused.ndjson").to_string_lossy().into_owned(),
            ..Default::default()
        };
        assert!(matches!(run(&config).await, Err(IngestError::Io(_))));
    }
}
