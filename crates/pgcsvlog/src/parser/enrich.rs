//! Enrich — one csvlog row in, one typed [`LogRecord`] out.
//!
//! Binding, coercion and the duration sub-parser run in that order. The
//! transformation holds no state between rows and never fails.

use super::coerce::{parse_integer, parse_timestamp};
use super::duration::{self, DurationOptions};
use super::model::{LogRecord, SUCCESS_STATE};
use super::schema::{Column, RawRow, SchemaBinder};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichOptions {
    pub duration: DurationOptions,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Enricher {
    options: EnrichOptions,
}

impl Enricher {
    pub fn new(options: EnrichOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> EnrichOptions {
        self.options
    }

    pub fn enrich(&self, row: RawRow) -> LogRecord {
        let mut bound = SchemaBinder::bind(row);

        let log_time = parse_timestamp(bound.get(Column::LogTime));
        let session_start_time = parse_timestamp(bound.get(Column::SessionStartTime));
        let process_id = parse_integer(bound.get(Column::ProcessId));
        let session_line_num = parse_integer(bound.get(Column::SessionLineNum));

        let statement = if bound.get(Column::SqlStateCode) == SUCCESS_STATE {
            duration::parse_message(bound.get(Column::Message), self.options.duration)
        } else {
            None
        };

        LogRecord {
            log_time,
            user_name: bound.take(Column::UserName),
            database_name: bound.take(Column::DatabaseName),
            process_id,
            connection_from: bound.take(Column::ConnectionFrom),
            session_id: bound.take(Column::SessionId),
            session_line_num,
            command_tag: bound.take(Column::CommandTag),
            session_start_time,
            virtual_transaction_id: bound.take(Column::VirtualTransactionId),
            transaction_id: bound.take(Column::TransactionId),
            error_severity: bound.take(Column::ErrorSeverity),
            sql_state_code: bound.take(Column::SqlStateCode),
            message: bound.take(Column::Message),
            detail: bound.take(Column::Detail),
            hint: bound.take(Column::Hint),
            internal_query: bound.take(Column::InternalQuery),
            internal_query_pos: bound.take(Column::InternalQueryPos),
            context: bound.take(Column::Context),
            query: bound.take(Column::Query),
            query_pos: bound.take(Column::QueryPos),
            location: bound.take(Column::Location),
            application_name: bound.take(Column::ApplicationName),
            extensions: bound.take_extensions(),
            statement,
        }
    }
}

/// Enrich with default options.
pub fn enrich(row: RawRow) -> LogRecord {
    Enricher::default().enrich(row)
}
