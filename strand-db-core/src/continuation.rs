//! Resume positions for cursors
//!
//! Every cursor result carries a continuation: an opaque token from which an
//! equivalent cursor can be rebuilt to produce exactly the remaining results.
//! Two sentinel states exist. *Start* is "no position yet" and serializes to
//! nothing; *end* is "scan definitively finished" and also serializes to
//! nothing (the end sentinel is a zero-size marker, never an encoded byte
//! sequence). Everything in between is an `Active` byte payload whose format
//! is private to the cursor that produced it.

use crate::error::Result;
use std::fmt;
use std::sync::Arc;

/// Polymorphic face of a resume position.
///
/// Combinators wrap their children's continuations in richer implementations
/// that defer wire encoding until the bytes are first requested and then
/// cache the encoding, since a caller may ask for the bytes zero or more
/// times per result.
pub trait CursorContinuation: fmt::Debug + Send + Sync {
    /// Serialized resume token, or `None` at the start and end sentinels.
    ///
    /// Implementations must be deterministic: for one continuation value the
    /// same bytes are returned on every call. When [`is_end`] is true this
    /// returns `Ok(None)` without attempting any encoding.
    ///
    /// [`is_end`]: CursorContinuation::is_end
    fn to_bytes(&self) -> Result<Option<Vec<u8>>>;

    /// True iff resuming from this continuation can only report exhaustion.
    fn is_end(&self) -> bool;

    /// True iff this is the start sentinel (nothing consumed yet).
    fn is_start(&self) -> bool {
        false
    }
}

/// Shared handle to a continuation, cheap to clone into results.
pub type SharedContinuation = Arc<dyn CursorContinuation>;

/// Concrete continuation value used at the leaves and as the decoded form of
/// a combinator's inner continuation.
///
/// The three states are an explicit enum so that illegal combinations (an
/// "end" that still carries bytes, say) are unrepresentable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Continuation {
    /// No position yet; the scan starts from the beginning.
    Start,
    /// A resumable position, encoded by the cursor that produced it.
    Active(Vec<u8>),
    /// The scan is definitively finished; resuming is a no-op that must
    /// immediately report exhaustion.
    End,
}

impl Continuation {
    /// Rebuild a continuation from persisted token bytes.
    ///
    /// `None` means the caller never captured a token: start from the
    /// beginning. The end sentinel has no byte form, so it can never arrive
    /// through this path.
    pub fn from_resume_bytes(bytes: Option<&[u8]>) -> Self {
        match bytes {
            None => Self::Start,
            Some(b) => Self::Active(b.to_vec()),
        }
    }

    pub const fn is_start(&self) -> bool {
        matches!(self, Self::Start)
    }

    pub const fn is_end(&self) -> bool {
        matches!(self, Self::End)
    }

    /// Byte payload of an active continuation
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Active(b) => Some(b),
            Self::Start | Self::End => None,
        }
    }

    /// Wrap into the shared handle carried by cursor results
    pub fn shared(self) -> SharedContinuation {
        Arc::new(self)
    }
}

impl CursorContinuation for Continuation {
    fn to_bytes(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.bytes().map(<[u8]>::to_vec))
    }

    fn is_end(&self) -> bool {
        matches!(self, Self::End)
    }

    fn is_start(&self) -> bool {
        matches!(self, Self::Start)
    }
}
