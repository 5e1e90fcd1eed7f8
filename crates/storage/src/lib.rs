//! Storage layer for agentmem
//!
//! SQLite-based storage with FTS5 for full-text search over observations
//! and prompts, plus a typed relation graph between observations.

mod error;
mod migrations;
mod storage;
#[cfg(test)]
mod tests;

pub use error::{ErrorKind, Result, StorageError};
pub use storage::{
    Clock, ImportResult, PassiveCaptureParams, PassiveCaptureResult, Stats, Storage,
};
