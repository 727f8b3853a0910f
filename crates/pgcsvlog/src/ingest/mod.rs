//! Ingest module — tokenizer wiring, sync iterator and async stream adapters.

pub mod error;
pub mod reader;
pub mod stream;

pub use error::IngestError;
pub use reader::{records, row_reader, RowReader};
pub use stream::{enrich_stream, ingest, spawn_row_reader};
