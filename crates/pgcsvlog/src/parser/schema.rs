//! Schema — the fixed csvlog column list and positional binding.

/// Columns of PostgreSQL's `csvlog` output, in file order.
pub const COLUMNS: [&str; 23] = [
    "log_time",
    "user_name",
    "database_name",
    "process_id",
    "connection_from",
    "session_id",
    "session_line_num",
    "command_tag",
    "session_start_time",
    "virtual_transaction_id",
    "transaction_id",
    "error_severity",
    "sql_state_code",
    "message",
    "detail",
    "hint",
    "internal_query",
    "internal_query_pos",
    "context",
    "query",
    "query_pos",
    "location",
    "application_name",
];

/// Columns appended by newer servers (13+: backend_type, 14+: leader_pid, query_id).
pub const EXTENSION_COLUMNS: [&str; 3] = ["backend_type", "leader_pid", "query_id"];

/// Index into [`COLUMNS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    LogTime,
    UserName,
    DatabaseName,
    ProcessId,
    ConnectionFrom,
    SessionId,
    SessionLineNum,
    CommandTag,
    SessionStartTime,
    VirtualTransactionId,
    TransactionId,
    ErrorSeverity,
    SqlStateCode,
    Message,
    Detail,
    Hint,
    InternalQuery,
    InternalQueryPos,
    Context,
    Query,
    QueryPos,
    Location,
    ApplicationName,
}

impl Column {
    pub fn name(self) -> &'static str {
        COLUMNS[self as usize]
    }
}

/// One tokenized csvlog row, positional and unnamed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow(Vec<String>);

impl RawRow {
    pub fn new(fields: Vec<String>) -> Self {
        Self(fields)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_fields(self) -> Vec<String> {
        self.0
    }
}

impl<S: Into<String>> FromIterator<S> for RawRow {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<csv::StringRecord> for RawRow {
    fn from(record: csv::StringRecord) -> Self {
        record.iter().collect()
    }
}

/// A row with every schema column present, plus any surplus columns by name.
#[derive(Debug, Clone)]
pub struct BoundRow {
    values: Vec<String>,
    extensions: Vec<(String, String)>,
}

impl BoundRow {
    pub fn get(&self, column: Column) -> &str {
        &self.values[column as usize]
    }

    /// Move a column's value out, leaving an empty string behind.
    pub fn take(&mut self, column: Column) -> String {
        std::mem::take(&mut self.values[column as usize])
    }

    pub fn extensions(&self) -> &[(String, String)] {
        &self.extensions
    }

    pub fn take_extensions(&mut self) -> Vec<(String, String)> {
        std::mem::take(&mut self.extensions)
    }
}

pub struct SchemaBinder;

impl SchemaBinder {
    /// Bind a raw row onto [`COLUMNS`].
    ///
    /// Short rows are padded with empty strings. Surplus fields are named from
    /// [`EXTENSION_COLUMNS`], then `column_<n>` (1-based position in the row).
    pub fn bind(row: RawRow) -> BoundRow {
        let mut values = row.into_fields();

        let extensions = if values.len() > COLUMNS.len() {
            values
                .split_off(COLUMNS.len())
                .into_iter()
                .enumerate()
                .map(|(i, value)| (extension_name(i), value))
                .collect()
        } else {
            values.resize(COLUMNS.len(), String::new());
            Vec::new()
        };

        BoundRow { values, extensions }
    }
}

fn extension_name(offset: usize) -> String {
    EXTENSION_COLUMNS
        .get(offset)
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("column_{}", COLUMNS.len() + offset + 1))
}
