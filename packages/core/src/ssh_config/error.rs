//! SSH config error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or rewriting the ssh config
#[derive(Error, Debug)]
pub enum SshConfigError {
    /// Failed to read, back up or write the file
    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The generated markers are not properly paired
    #[error("Corrupt ssh config at line {line}: {reason}")]
    Corrupt { line: usize, reason: String },
}
