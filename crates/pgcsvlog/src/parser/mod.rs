/// csvlog row parsing and enrichment
///
/// Turns one tokenized PostgreSQL `csvlog` row into a typed [`LogRecord`].
///
/// # Architecture
///
/// - `schema.rs`: column list and positional binding
/// - `coerce.rs`: timestamp / integer coercion with sentinels
/// - `duration.rs`: duration message sub-parser (query text vs. JSON plan)
/// - `enrich.rs`: the per-row transformation
/// - `model.rs`: output record
/// - `metrics.rs`: enrichment counters for the stream adapters
///
/// Per-record problems never surface as errors; they only reduce the set of
/// derived fields.

pub mod schema;
pub mod coerce;
pub mod duration;
pub mod enrich;
pub mod model;
pub mod metrics;
mod serde_utils;

// Re-export commonly used types
pub use schema::{Column, RawRow, SchemaBinder, COLUMNS};
pub use coerce::{LogNumber, Timestamp};
pub use duration::{DurationOptions, DurationPayload, DurationStatement, StatementKind};
pub use enrich::{enrich, EnrichOptions, Enricher};
pub use model::{EnrichState, LogRecord, SUCCESS_STATE};
pub use metrics::{EnrichMetrics, MetricsSnapshot};
