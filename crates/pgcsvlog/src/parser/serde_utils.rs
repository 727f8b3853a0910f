use serde::ser::SerializeMap;
use serde::Serializer;

use super::model::LogRecord;

/// Write a record as one flat map: schema columns in file order, extension
/// columns, then `duration` / `plan`.
///
/// A query taken from the duration message replaces the raw `query` column,
/// which PostgreSQL leaves empty on those lines. A JSON plan without a string
/// `"Query Text"` derives no query, so the raw column is written as read
/// rather than cleared.
pub fn serialize_record_as_map<S>(record: &LogRecord, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(None)?;

    map.serialize_entry("log_time", &record.log_time)?;
    map.serialize_entry("user_name", &record.user_name)?;
    map.serialize_entry("database_name", &record.database_name)?;
    map.serialize_entry("process_id", &record.process_id)?;
    map.serialize_entry("connection_from", &record.connection_from)?;
    map.serialize_entry("session_id", &record.session_id)?;
    map.serialize_entry("session_line_num", &record.session_line_num)?;
    map.serialize_entry("command_tag", &record.command_tag)?;
    map.serialize_entry("session_start_time", &record.session_start_time)?;
    map.serialize_entry("virtual_transaction_id", &record.virtual_transaction_id)?;
    map.serialize_entry("transaction_id", &record.transaction_id)?;
    map.serialize_entry("error_severity", &record.error_severity)?;
    map.serialize_entry("sql_state_code", &record.sql_state_code)?;
    map.serialize_entry("message", &record.message)?;
    map.serialize_entry("detail", &record.detail)?;
    map.serialize_entry("hint", &record.hint)?;
    map.serialize_entry("internal_query", &record.internal_query)?;
    map.serialize_entry("internal_query_pos", &record.internal_query_pos)?;
    map.serialize_entry("context", &record.context)?;
    map.serialize_entry("query", record.derived_query().unwrap_or(record.query.as_str()))?;
    map.serialize_entry("query_pos", &record.query_pos)?;
    map.serialize_entry("location", &record.location)?;
    map.serialize_entry("application_name", &record.application_name)?;

    for (k, v) in &record.extensions {
        map.serialize_entry(k, v)?;
    }

    if let Some(duration) = record.duration() {
        map.serialize_entry("duration", &duration)?;
    }
    if let Some(plan) = record.plan() {
        map.serialize_entry("plan", plan)?;
    }

    map.end()
}
