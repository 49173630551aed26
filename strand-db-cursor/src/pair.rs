//! Shared scaffolding for combinators that keep two children active at once
//!
//! Union and intersection differ only in how they merge values; the per-child
//! bookkeeping is identical and lives here. Each child occupies a slot that
//! buffers at most one unconsumed value, tracks the continuation that resumes
//! *at* that value (not after it), and absorbs the child's source exhaustion
//! into a flag — the same "absorb internal exhaustion, surface only terminal
//! exhaustion" discipline the concatenation combinator applies, but with both
//! children live.
//!
//! Because the resume position only advances when a buffered value is
//! consumed, discarding a buffer on pause is safe: a resumed attempt
//! re-requests the same element idempotently.

use crate::codec;
use std::sync::{Arc, OnceLock};
use strand_db_core::{
    BoxedCursor, Continuation, CursorContinuation, CursorFactory, CursorResult, CursorVisitor,
    Error, NoNextReason, Result, ScanContext, ScanProperties, SharedContinuation,
};
use tokio::runtime::Handle;

/// One child of a two-child simultaneous combinator.
pub(crate) struct ChildSlot<T: Send> {
    cursor: Option<BoxedCursor<T>>,
    /// The next unconsumed value and the continuation resuming after it
    buffered: Option<(T, SharedContinuation)>,
    /// Resume position at the next unconsumed element
    resume: SharedContinuation,
    exhausted: bool,
}

impl<T: Send> ChildSlot<T> {
    /// Build a slot from its decoded resume state. An exhausted child is
    /// never instantiated again.
    pub(crate) fn build(
        factory: &CursorFactory<T>,
        context: &ScanContext,
        scan: &ScanProperties,
        resume_from: (bool, Continuation),
    ) -> Result<Self> {
        let (exhausted, continuation) = resume_from;
        if exhausted || continuation.is_end() {
            return Ok(Self {
                cursor: None,
                buffered: None,
                resume: Continuation::End.shared(),
                exhausted: true,
            });
        }

        let resume = continuation.clone().shared();
        let cursor = factory(context, scan, continuation)?;
        Ok(Self {
            cursor: Some(cursor),
            buffered: None,
            resume,
            exhausted: false,
        })
    }

    /// Ensure the slot holds a buffered value, or learn why it cannot.
    ///
    /// Returns `Some(reason)` when the child paused resumably; the caller
    /// must surface the pause for the whole combinator. Exhaustion is
    /// absorbed into the slot state and returns `None`.
    pub(crate) async fn fill(&mut self) -> Result<Option<NoNextReason>> {
        if self.exhausted || self.buffered.is_some() {
            return Ok(None);
        }
        let cursor = self
            .cursor
            .as_mut()
            .ok_or_else(|| Error::internal("child slot has no cursor"))?;

        match cursor.next().await? {
            CursorResult::Next {
                value,
                continuation,
            } => {
                self.buffered = Some((value, continuation));
                Ok(None)
            }
            CursorResult::NoNext {
                reason,
                continuation,
            } => {
                if reason.is_source_exhausted() {
                    self.exhausted = true;
                    self.resume = Continuation::End.shared();
                    Ok(None)
                } else {
                    self.resume = continuation;
                    Ok(Some(reason))
                }
            }
        }
    }

    pub(crate) fn peek(&self) -> Option<&T> {
        self.buffered.as_ref().map(|(value, _)| value)
    }

    /// Consume the buffered value, advancing the resume position past it.
    pub(crate) fn take(&mut self) -> Option<T> {
        let (value, continuation) = self.buffered.take()?;
        self.resume = continuation;
        Some(value)
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Snapshot for continuation wrapping
    pub(crate) fn resume_state(&self) -> (bool, SharedContinuation) {
        (self.exhausted, self.resume.clone())
    }

    pub(crate) fn close(&mut self) {
        if let Some(mut cursor) = self.cursor.take() {
            cursor.close();
        }
        self.buffered = None;
    }

    pub(crate) fn executor(&self) -> Option<&Handle> {
        self.cursor.as_ref().map(|cursor| cursor.executor())
    }

    pub(crate) fn accept(&mut self, visitor: &mut dyn CursorVisitor) {
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.accept(visitor);
        }
    }
}

/// Decode a two-child resume position into per-child (exhausted, position)
/// states.
pub(crate) fn decode_pair_resume(
    continuation: Continuation,
) -> Result<[(bool, Continuation); 2]> {
    match continuation {
        Continuation::Start => Ok([(false, Continuation::Start), (false, Continuation::Start)]),
        Continuation::End => Ok([(true, Continuation::End), (true, Continuation::End)]),
        Continuation::Active(raw) => codec::decode_pair(&raw),
    }
}

/// Combine the pause reasons of two children: the highest-precedence reason
/// wins when both paused.
pub(crate) fn strictest_pause(
    first: Option<NoNextReason>,
    second: Option<NoNextReason>,
) -> Option<NoNextReason> {
    match (first, second) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Resume position emitted by a two-child simultaneous combinator: both
/// children's positions plus which of them already exhausted.
///
/// Encoding is deferred until first requested, then cached.
#[derive(Debug)]
pub(crate) struct PairContinuation {
    first_exhausted: bool,
    first: SharedContinuation,
    second_exhausted: bool,
    second: SharedContinuation,
    cached: OnceLock<Vec<u8>>,
}

impl PairContinuation {
    pub(crate) fn wrap(
        first: (bool, SharedContinuation),
        second: (bool, SharedContinuation),
    ) -> SharedContinuation {
        Arc::new(Self {
            first_exhausted: first.0,
            first: first.1,
            second_exhausted: second.0,
            second: second.1,
            cached: OnceLock::new(),
        })
    }
}

impl CursorContinuation for PairContinuation {
    fn to_bytes(&self) -> Result<Option<Vec<u8>>> {
        if self.is_end() {
            return Ok(None);
        }
        if let Some(bytes) = self.cached.get() {
            return Ok(Some(bytes.clone()));
        }
        let first = self.first.to_bytes()?;
        let second = self.second.to_bytes()?;
        let encoded = codec::encode_pair(
            (self.first_exhausted, first.as_deref()),
            (self.second_exhausted, second.as_deref()),
        )?;
        Ok(Some(self.cached.get_or_init(|| encoded).clone()))
    }

    fn is_end(&self) -> bool {
        self.first_exhausted && self.second_exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strictest_pause_prefers_precedence_order() {
        use NoNextReason::*;
        assert_eq!(strictest_pause(None, None), None);
        assert_eq!(
            strictest_pause(Some(ScanLimitReached), None),
            Some(ScanLimitReached)
        );
        assert_eq!(
            strictest_pause(Some(ScanLimitReached), Some(ReturnLimitReached)),
            Some(ReturnLimitReached)
        );
        assert_eq!(
            strictest_pause(Some(TimeLimitReached), Some(ScanLimitReached)),
            Some(TimeLimitReached)
        );
    }

    #[test]
    fn pair_continuation_end_requires_both_exhausted() {
        let end = Continuation::End.shared();
        let active = Continuation::Active(vec![1]).shared();

        let half = PairContinuation::wrap((true, end.clone()), (false, active));
        assert!(!half.is_end());
        assert!(half.to_bytes().unwrap().is_some());

        let done = PairContinuation::wrap((true, end.clone()), (true, end));
        assert!(done.is_end());
        assert_eq!(done.to_bytes().unwrap(), None);
    }

    #[test]
    fn pair_continuation_round_trips_through_the_codec() {
        let first = Continuation::Active(vec![7, 8]).shared();
        let second = Continuation::Start.shared();
        let wrapped = PairContinuation::wrap((false, first), (false, second));

        let bytes = wrapped.to_bytes().unwrap().unwrap();
        let [first, second] = codec::decode_pair(&bytes).unwrap();
        assert_eq!(first, (false, Continuation::Active(vec![7, 8])));
        assert_eq!(second, (false, Continuation::Start));
    }
}
