//! Duration — recognizes the `duration: ... ms  plan:` message written by
//! duration logging / auto_explain and splits it into typed parts.
//!
//! Matching is two-stage. [`match_duration`] checks the outer shape and yields
//! the elapsed time plus the unparsed remainder; [`classify`] then decides
//! whether the remainder is query text or a JSON plan. Nothing here returns an
//! error: an unrecognized shape simply produces fewer derived fields.

use serde_json::Value;

const DURATION_PREFIX: &str = "duration: ";
const PLAN_LABEL: &str = "plan:";
const STATEMENT_LABEL: &str = "statement:";
const QUERY_TEXT_LABEL: &str = "Query Text:";
const PLAN_QUERY_TEXT_KEY: &str = "Query Text";

/// Which message flavour follows the elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// `plan:` from auto_explain
    Plan,
    /// `statement:` from log_min_duration_statement
    Statement,
    /// extended-protocol `parse <name>:`
    Parse,
    /// extended-protocol `bind <name>:`
    Bind,
    /// extended-protocol `execute <name>:`
    Execute,
}

/// Result of the outer structural match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationMatch<'a> {
    pub duration_ms: f64,
    pub kind: StatementKind,
    pub remainder: &'a str,
}

/// Result of classifying the remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload<'a> {
    Query(&'a str),
    PlanCandidate(&'a str),
    NoMatch,
}

/// What the sub-parser extracted from a duration message.
#[derive(Debug, Clone, PartialEq)]
pub enum DurationPayload {
    /// Plain query text.
    Query(String),
    /// A JSON plan, with its `"Query Text"` lifted out when present.
    Plan { plan: Value, query: Option<String> },
    /// The remainder was neither query text nor JSON.
    Unrecognized,
}

/// The derived fields of a duration message.
#[derive(Debug, Clone, PartialEq)]
pub struct DurationStatement {
    pub duration_ms: f64,
    pub kind: StatementKind,
    pub payload: DurationPayload,
}

impl DurationStatement {
    pub fn query(&self) -> Option<&str> {
        match &self.payload {
            DurationPayload::Query(q) => Some(q),
            DurationPayload::Plan { query, .. } => query.as_deref(),
            DurationPayload::Unrecognized => None,
        }
    }

    pub fn plan(&self) -> Option<&Value> {
        match &self.payload {
            DurationPayload::Plan { plan, .. } => Some(plan),
            _ => None,
        }
    }
}

/// Sub-parser switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DurationOptions {
    /// Also accept `statement:` and `parse|bind|execute <name>:` messages.
    pub statement_durations: bool,
}

/// Parse a message into its duration statement, if it is one.
pub fn parse_message(message: &str, options: DurationOptions) -> Option<DurationStatement> {
    let matched = match_duration(message, options)?;

    let payload = match matched.kind {
        StatementKind::Plan => match classify(matched.remainder) {
            Payload::Query(text) => DurationPayload::Query(text.to_string()),
            Payload::PlanCandidate(candidate) => parse_plan(candidate),
            Payload::NoMatch => DurationPayload::Unrecognized,
        },
        _ => DurationPayload::Query(matched.remainder.to_string()),
    };

    Some(DurationStatement {
        duration_ms: matched.duration_ms,
        kind: matched.kind,
        payload,
    })
}

/// Match `duration: <d>.<d> ms  plan:<ws><remainder>`.
///
/// Whitespace between the number and `ms` is optional, between `ms` and the
/// label it is required, and leading whitespace of the remainder is dropped.
pub fn match_duration(message: &str, options: DurationOptions) -> Option<DurationMatch<'_>> {
    let rest = message.strip_prefix(DURATION_PREFIX)?;
    let (number, rest) = split_decimal(rest)?;
    let rest = rest.trim_start().strip_prefix("ms")?;

    let label = rest.trim_start();
    if label.len() == rest.len() {
        return None;
    }

    let (kind, remainder) = if let Some(after) = label.strip_prefix(PLAN_LABEL) {
        (StatementKind::Plan, after)
    } else if !options.statement_durations {
        return None;
    } else if let Some(after) = label.strip_prefix(STATEMENT_LABEL) {
        (StatementKind::Statement, after)
    } else {
        split_protocol_label(label)?
    };

    Some(DurationMatch {
        duration_ms: number.parse().ok()?,
        kind,
        remainder: remainder.trim_start(),
    })
}

/// Decide what the remainder of a `plan:` message holds.
///
/// `Query Text:` wins over JSON: text-format EXPLAIN output always starts
/// with that label.
pub fn classify(remainder: &str) -> Payload<'_> {
    if let Some(rest) = remainder.strip_prefix(QUERY_TEXT_LABEL) {
        return Payload::Query(rest.trim_start());
    }
    if remainder.is_empty() {
        return Payload::NoMatch;
    }
    Payload::PlanCandidate(remainder)
}

fn parse_plan(candidate: &str) -> DurationPayload {
    match serde_json::from_str::<Value>(candidate) {
        Ok(plan) => {
            let query = plan
                .get(PLAN_QUERY_TEXT_KEY)
                .and_then(Value::as_str)
                .map(str::to_string);
            DurationPayload::Plan { plan, query }
        }
        Err(_) => DurationPayload::Unrecognized,
    }
}

/// Split a leading `<digits>.<digits>` off `text`.
fn split_decimal(text: &str) -> Option<(&str, &str)> {
    let int_len = text.bytes().take_while(u8::is_ascii_digit).count();
    if int_len == 0 || text.as_bytes().get(int_len) != Some(&b'.') {
        return None;
    }
    let frac_len = text[int_len + 1..].bytes().take_while(u8::is_ascii_digit).count();
    if frac_len == 0 {
        return None;
    }
    Some(text.split_at(int_len + 1 + frac_len))
}

/// `parse <name>: ...`, `bind <name>: ...`, `execute <name>: ...`
fn split_protocol_label(label: &str) -> Option<(StatementKind, &str)> {
    let (word, rest) = label.split_once(' ')?;
    let kind = match word {
        "parse" => StatementKind::Parse,
        "bind" => StatementKind::Bind,
        "execute" => StatementKind::Execute,
        _ => return None,
    };
    let (_name, sql) = rest.split_once(':')?;
    Some((kind, sql))
}
