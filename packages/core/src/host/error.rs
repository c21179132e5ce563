//! Registry error types
//!
//! Errors that can occur while loading, saving, importing or exporting
//! the host registry. All of them abort the operation that raised them.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::validation::ValidationError;

/// Errors that can occur during registry operations
#[derive(Error, Debug)]
pub enum HostError {
    /// Failed to read the registry document
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to back up or write the registry document
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Malformed host document; no partial registry is returned
    #[error("Invalid host document in {origin}: {source}")]
    Decode {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to serialize the host list
    #[error("Failed to serialize hosts: {0}")]
    Encode(#[source] serde_json::Error),

    /// Failed to write an exported host list
    #[error("Failed to export hosts: {0}")]
    Export(#[source] io::Error),

    /// A record violates a registry invariant
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
