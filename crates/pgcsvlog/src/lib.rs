// PostgreSQL csvlog ingestion: tokenize, enrich, emit NDJSON.

// Core
pub mod parser;

// Plumbing
pub mod ingest;
pub mod conf;
pub mod runtime;
