//! Error types for the sandbox preview composer.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for preview operations.
///
/// Document generation and file lookups never fail; these variants cover
/// the surrounding configuration, IO and channel plumbing.
#[derive(Error, Debug)]
pub enum Error {
    /// An environment tag did not name a known environment.
    #[error("unknown environment: {0}")]
    UnknownEnvironment(String),

    /// Configuration or starter validation failed.
    #[error("configuration error: {0}")]
    Config(String),

    /// A configuration or starter file could not be parsed.
    #[error("failed to parse {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// IO error while reading files or writing previews.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A relayed payload was not valid JSON.
    #[error("malformed relay payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// The session owning the relay has been dropped.
    #[error("relay channel closed")]
    RelayClosed,

    /// A renderer failed to load a snapshot.
    #[error("renderer '{renderer}' failed: {reason}")]
    Render { renderer: String, reason: String },
}

/// Result type alias for preview operations.
pub type Result<T> = std::result::Result<T, Error>;
