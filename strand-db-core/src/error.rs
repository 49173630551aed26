//! Error types for strand-db-core

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
///
/// This is the shared error currency for the whole cursor layer. Failures
/// surfaced by a child cursor propagate through combinators unchanged; the
/// combinators add no retry and no fallback on error.
#[derive(Error, Debug)]
pub enum Error {
    /// Continuation bytes failed to parse. Fatal and non-retryable: the
    /// position token is untrustworthy and must not be treated as "start
    /// over". Carries the raw offending bytes for diagnostics.
    #[error("malformed continuation: {reason} (raw bytes: {})", loggable_bytes(.raw))]
    MalformedContinuation { reason: String, raw: Vec<u8> },

    /// Operation not supported by this index or cursor type.
    ///
    /// A capability answer, not a retryable failure.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Cursor advanced after close()
    #[error("cursor used after close")]
    CursorClosed,

    /// Storage-related errors surfaced by leaf cursors
    #[error("storage error: {0}")]
    Storage(String),

    /// Internal error (should not happen in normal operation)
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a malformed-continuation error, keeping the raw bytes
    pub fn malformed_continuation(reason: impl Into<String>, raw: impl Into<Vec<u8>>) -> Self {
        Self::MalformedContinuation {
            reason: reason.into(),
            raw: raw.into(),
        }
    }

    /// Create an unsupported-operation error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

// Hex rendering for raw continuation bytes in error messages, truncated so a
// corrupt multi-kilobyte token cannot flood a log line.
fn loggable_bytes(bytes: &[u8]) -> String {
    const MAX: usize = 64;
    let mut out = String::with_capacity(2 + bytes.len().min(MAX) * 2);
    out.push_str("0x");
    for b in bytes.iter().take(MAX) {
        out.push_str(&format!("{b:02x}"));
    }
    if bytes.len() > MAX {
        out.push_str(&format!("..({} bytes)", bytes.len()));
    }
    out
}
