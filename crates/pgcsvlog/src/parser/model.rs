use serde::{Serialize, Serializer};
use serde_json::Value;

use super::coerce::{LogNumber, Timestamp};
use super::duration::{DurationPayload, DurationStatement};
use super::serde_utils::serialize_record_as_map;

/// Success SQLSTATE; duration messages are always reported with it.
pub const SUCCESS_STATE: &str = "00000";

/// How far enrichment got for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichState {
    /// Gate failed or the message is not a duration message.
    NoMatch,
    /// Duration extracted; payload not recognized.
    DurationOnly,
    /// Duration plus query text.
    DurationWithQuery,
    /// Duration plus a JSON plan.
    DurationWithPlan,
}

impl EnrichState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichState::NoMatch => "no_match",
            EnrichState::DurationOnly => "duration_only",
            EnrichState::DurationWithQuery => "duration_with_query",
            EnrichState::DurationWithPlan => "duration_with_plan",
        }
    }
}

/// One enriched csvlog row.
///
/// Serializes as a flat JSON object keyed by column name, with `duration`,
/// `query` and `plan` added when the message carried them.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub log_time: Timestamp,
    pub user_name: String,
    pub database_name: String,
    pub process_id: LogNumber,
    pub connection_from: String,
    pub session_id: String,
    pub session_line_num: LogNumber,
    pub command_tag: String,
    pub session_start_time: Timestamp,
    pub virtual_transaction_id: String,
    pub transaction_id: String,
    pub error_severity: String,
    pub sql_state_code: String,
    pub message: String,
    pub detail: String,
    pub hint: String,
    pub internal_query: String,
    pub internal_query_pos: String,
    pub context: String,
    /// The raw `query` column.
    pub query: String,
    pub query_pos: String,
    pub location: String,
    pub application_name: String,

    /// Columns past the classic schema, in row order.
    pub extensions: Vec<(String, String)>,

    /// Derived from `message` when it is a duration message.
    pub statement: Option<DurationStatement>,
}

impl Serialize for LogRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_record_as_map(self, serializer)
    }
}

impl LogRecord {
    pub fn duration(&self) -> Option<f64> {
        self.statement.as_ref().map(|s| s.duration_ms)
    }

    /// Query text extracted from the duration message.
    pub fn derived_query(&self) -> Option<&str> {
        self.statement.as_ref().and_then(DurationStatement::query)
    }

    pub fn plan(&self) -> Option<&Value> {
        self.statement.as_ref().and_then(DurationStatement::plan)
    }

    pub fn state(&self) -> EnrichState {
        match &self.statement {
            None => EnrichState::NoMatch,
            Some(stmt) => match &stmt.payload {
                DurationPayload::Query(_) => EnrichState::DurationWithQuery,
                DurationPayload::Plan { .. } => EnrichState::DurationWithPlan,
                DurationPayload::Unrecognized => EnrichState::DurationOnly,
            },
        }
    }

    /// Value of a string column by name, including extension columns.
    pub fn column(&self, name: &str) -> Option<&str> {
        let value = match name {
            "user_name" => &self.user_name,
            "database_name" => &self.database_name,
            "connection_from" => &self.connection_from,
            "session_id" => &self.session_id,
            "command_tag" => &self.command_tag,
            "virtual_transaction_id" => &self.virtual_transaction_id,
            "transaction_id" => &self.transaction_id,
            "error_severity" => &self.error_severity,
            "sql_state_code" => &self.sql_state_code,
            "message" => &self.message,
            "detail" => &self.detail,
            "hint" => &self.hint,
            "internal_query" => &self.internal_query,
            "internal_query_pos" => &self.internal_query_pos,
            "context" => &self.context,
            "query" => &self.query,
            "query_pos" => &self.query_pos,
            "location" => &self.location,
            "application_name" => &self.application_name,
            _ => {
                return self
                    .extensions
                    .iter()
                    .find(|(k, _)| k == name)
                    .map(|(_, v)| v.as_str())
            }
        };
        Some(value.as_str())
    }
}
