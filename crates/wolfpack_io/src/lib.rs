//! # Wolfpack IO
//!
//! Persistence for the per-agent pack records.
//!
//! This crate provides:
//! - Structured error handling with custom error types
//! - Validated JSON helpers
//! - Binary (rkyv) and JSON record files

/// Error types and result aliases for I/O operations
pub mod error;
/// Record book save and load
pub mod persistence;
/// Validated serialization helpers for JSON
pub mod serialization;

pub use error::{IoError, Result};
pub use persistence::{load_records, load_rkyv, record_digest, save_records, save_rkyv, RecordFormat};
pub use serialization::{from_json, read_json_file, to_json, to_json_pretty, validate_json, write_json_file};
