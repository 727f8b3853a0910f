//! Reader — csvlog tokenizer and the synchronous enrichment iterator.
//!
//! csvlog files have no header row and quote any field containing commas or
//! newlines, so a header-less, flexible RFC 4180 reader yields exactly one
//! record per log entry.

use std::io::Read;

use super::error::IngestError;
use crate::parser::{Enricher, LogRecord, RawRow};

/// Iterator over tokenized rows of a csvlog stream.
pub struct RowReader<R> {
    records: csv::StringRecordsIntoIter<R>,
}

impl<R: Read> Iterator for RowReader<R> {
    type Item = Result<RawRow, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.records
            .next()
            .map(|result| result.map(RawRow::from).map_err(IngestError::from))
    }
}

/// Tokenize a csvlog stream.
pub fn row_reader<R: Read>(input: R) -> RowReader<R> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);
    RowReader {
        records: reader.into_records(),
    }
}

/// Tokenize and enrich, one record per row, in order.
///
/// Tokenizer errors are passed through; enrichment itself cannot fail.
pub fn records<R: Read>(
    input: R,
    enricher: Enricher,
) -> impl Iterator<Item = Result<LogRecord, IngestError>> {
    row_reader(input).map(move |row| row.map(|row| enricher.enrich(row)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::EnrichState;
    use std::io::Cursor;

    const SAMPLE: &str = concat!(
        "2024-03-01 12:00:00.001 UTC,\"postgres\",\"shop\",101,\"[local]\",65e1c9a0.65,1,\"idle\",2024-03-01 11:59:00 UTC,3/1,0,LOG,00000,\"connection authorized: user=postgres database=shop\",,,,,,,,,\"psql\"\n",
        "2024-03-01 12:00:01.500 UTC,\"postgres\",\"shop\",101,\"[local]\",65e1c9a0.65,2,\"SELECT\",2024-03-01 11:59:00 UTC,3/2,0,LOG,00000,\"duration: 12.5 ms  plan:\nQuery Text: SELECT 1\nResult  (cost=0.00..0.01 rows=1 width=4)\",,,,,,,,,\"psql\"\n",
        "2024-03-01 12:00:02.000 UTC,\"postgres\",\"shop\",101,\"[local]\",65e1c9a0.65,3,\"SELECT\",2024-03-01 11:59:00 UTC,3/3,0,ERROR,42P01,\"relation \"\"missing\"\" does not exist\",,,,,,\"SELECT * FROM missing;\",15,,\"psql\"\n",
        "2024-03-01 12:00:03.000 UTC,\"postgres\",\"shop\",101,\"[local]\",65e1c9a0.65,4,\"SELECT\",2024-03-01 11:59:00 UTC,3/4,0,LOG,00000,\"duration: 3.0 ms  plan:\n{\n  \"\"Query Text\"\": \"\"SELECT 2\"\",\n  \"\"Plan\"\": {\"\"Node Type\"\": \"\"Result\"\"}\n}\",,,,,,,,,\"psql\"\n",
    );

    #[test]
    fn test_row_reader_handles_multiline_fields() {
        let rows: Vec<RawRow> = row_reader(Cursor::new(SAMPLE))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.len() == 23));
    }

    #[test]
    fn test_records_preserve_order_and_cardinality() {
        let records: Vec<LogRecord> = records(Cursor::new(SAMPLE), Enricher::default())
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(records.len(), 4);
        let lines: Vec<i64> = records.iter().filter_map(|r| r.session_line_num.as_i64()).collect();
        assert_eq!(lines, vec![1, 2, 3, 4]);

        assert_eq!(records[0].state(), EnrichState::NoMatch);
        assert_eq!(records[1].state(), EnrichState::DurationWithQuery);
        assert_eq!(
            records[1].derived_query(),
            Some("SELECT 1\nResult  (cost=0.00..0.01 rows=1 width=4)")
        );
        assert_eq!(records[2].state(), EnrichState::NoMatch);
        assert_eq!(records[2].message, "relation \"missing\" does not exist");
        assert_eq!(records[2].query, "SELECT * FROM missing;");
        assert_eq!(records[3].state(), EnrichState::DurationWithPlan);
        assert_eq!(records[3].derived_query(), Some("SELECT 2"));
    }

    #[test]
    fn test_records_empty_input() {
        assert_eq!(records(Cursor::new(""), Enricher::default()).count(), 0);
    }

    #[test]
    fn test_records_accepts_newer_server_columns() {
        let line = "2024-03-01 12:00:00.001 UTC,,,101,,65e1c9a0.65,1,,2024-03-01 11:59:00 UTC,,0,LOG,00000,\"checkpoint starting: time\",,,,,,,,,\"\",\"checkpointer\",,0\n";
        let rec = records(Cursor::new(line), Enricher::default())
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(rec.column("backend_type"), Some("checkpointer"));
        assert_eq!(rec.column("leader_pid"), Some(""));
        assert_eq!(rec.column("query_id"), Some("0"));
    }

    #[test]
    fn test_records_reports_invalid_utf8() {
        let bytes: &[u8] = b"2024-03-01 12:00:00 UTC,\xff\xfe,x\n";
        let first = records(Cursor::new(bytes), Enricher::default()).next().unwrap();
        assert!(matches!(first, Err(IngestError::Csv(_))));
    }
}
