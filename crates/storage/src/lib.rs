//! Storage Layer
//!
//! In-memory repository of finished session summaries:
//! - Per-user queries (all, date range, most recent)
//! - Lifetime record aggregation per user
//! - postcard snapshots for persistence between runs

mod record;
mod repository;

pub use record::LifetimeRecord;
pub use repository::{RepositorySnapshot, SessionRepository};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Lock poisoned: {0}")]
    Lock(String),
    #[error("Session not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
