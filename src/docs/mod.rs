//! Document storage collaborator.
//!
//! # Data Flow
//! ```text
//! Resolved identity URN
//!     → Base::user(urn) (per-user document space)
//!     → takes.rs (listing at "/", read/write/delete under "/doc/")
//! ```
//!
//! # Design Decisions
//! - The front door only sees the narrow `Base`/`User` interface
//! - `memory.rs` is the in-process implementation used by the binary and tests

pub mod memory;
pub mod takes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use thiserror::Error;

pub use memory::MemoryBase;
pub use takes::{DocTake, DocsTake, IndexTake, DOC_PREFIX};

/// Errors raised by a document base.
#[derive(Debug, Error)]
pub enum BaseError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("invalid document name: {0:?}")]
    InvalidName(String),

    /// The store behind the base is unreachable or broken. `MemoryBase` never
    /// fails this way; bases backed by disk or a remote service do.
    #[error("storage backend failed: {0}")]
    Backend(String),
}

/// All users' documents.
#[async_trait]
pub trait Base: Send + Sync {
    /// Document space of the user identified by `urn`.
    async fn user(&self, urn: &str) -> Result<Arc<dyn User>, BaseError>;
}

/// One user's documents.
#[async_trait]
pub trait User: Send + Sync {
    /// Names of all documents, sorted.
    async fn docs(&self) -> Result<Vec<String>, BaseError>;

    async fn read(&self, name: &str) -> Result<Bytes, BaseError>;

    async fn write(&self, name: &str, content: Bytes) -> Result<(), BaseError>;

    async fn delete(&self, name: &str) -> Result<(), BaseError>;
}

/// Document names are single non-empty path segments.
pub fn check_name(name: &str) -> Result<(), BaseError> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.chars().any(char::is_control);
    if valid {
        Ok(())
    } else {
        Err(BaseError::InvalidName(name.to_string()))
    }
}
