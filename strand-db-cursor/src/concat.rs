//! Sequential concatenation combinator
//!
//! Returns the elements of a first cursor followed by the elements of a
//! second cursor. Each child is produced by an injected factory, so a child
//! exists only once it becomes active: the first child is built at
//! construction (unless the continuation routes straight to the second), the
//! second only at the moment the first exhausts.
//!
//! Exhaustion handling is deliberately asymmetric. The first child running
//! out of data is not visible to the caller: within the same advance the
//! cursor falls through to a freshly built second child, whose row cap is
//! overridden to whatever allowance remains. The second child running out of
//! data is terminal. Any other stop reason — from either child — is a
//! resumable pause and is surfaced as-is.

use crate::codec;
use async_trait::async_trait;
use std::sync::{Arc, OnceLock};
use strand_db_core::{
    BoxedCursor, Continuation, Cursor, CursorContinuation, CursorFactory, CursorResult,
    CursorVisitor, Error, NoNextReason, Result, ScanContext, ScanProperties, SharedContinuation,
};
use tokio::runtime::Handle;

/// Which child the cursor is currently draining.
///
/// There is no explicit "done" state; termination is the emitted result's
/// stop reason being terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ActiveChild {
    First,
    Second,
}

/// A cursor over the concatenation of two child cursors.
pub struct ConcatCursor<T: Send> {
    context: ScanContext,
    scan: ScanProperties,
    /// Deferred builder for the second child; the first child's builder is
    /// consumed at construction.
    second_factory: CursorFactory<T>,
    first: Option<BoxedCursor<T>>,
    second: Option<BoxedCursor<T>>,
    state: ActiveChild,
    /// Rows this cursor may still surface; handed to the second child at
    /// fallthrough so the cap holds across the boundary.
    remaining_rows: Option<usize>,
    closed: bool,
}

impl<T: Send> std::fmt::Debug for ConcatCursor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcatCursor")
            .field("context", &self.context)
            .field("scan", &self.scan)
            .field("first", &self.first.as_ref().map(|_| "<cursor>"))
            .field("second", &self.second.as_ref().map(|_| "<cursor>"))
            .field("state", &self.state)
            .field("remaining_rows", &self.remaining_rows)
            .field("closed", &self.closed)
            .finish()
    }
}

impl<T: Send> ConcatCursor<T> {
    /// Build a concatenation cursor, optionally resumed from a continuation.
    ///
    /// "First" and "second" are positions in iteration order: on a reverse
    /// scan the factories are swapped here, and everything downstream is
    /// direction-agnostic.
    ///
    /// A malformed continuation fails here, before either child is built.
    pub fn new(
        context: &ScanContext,
        scan: ScanProperties,
        first_factory: CursorFactory<T>,
        second_factory: CursorFactory<T>,
        continuation: Continuation,
    ) -> Result<Self> {
        let (first_factory, second_factory) = if scan.reverse {
            (second_factory, first_factory)
        } else {
            (first_factory, second_factory)
        };

        let remaining_rows = scan.execute.return_limit;

        let (state, first, second) = match continuation {
            Continuation::Start => {
                let first = first_factory(context, &scan, Continuation::Start)?;
                (ActiveChild::First, Some(first), None)
            }
            Continuation::End => {
                // Resuming a finished scan is a no-op; a second child built
                // at its end reports exhaustion immediately, recursively.
                let second = second_factory(context, &scan, Continuation::End)?;
                (ActiveChild::Second, None, Some(second))
            }
            Continuation::Active(raw) => {
                let (second_active, inner) = codec::decode_concat(&raw)?;
                if second_active {
                    let second = second_factory(context, &scan, inner)?;
                    (ActiveChild::Second, None, Some(second))
                } else {
                    let first = first_factory(context, &scan, inner)?;
                    (ActiveChild::First, Some(first), None)
                }
            }
        };

        Ok(Self {
            context: context.clone(),
            scan,
            second_factory,
            first,
            second,
            state,
            remaining_rows,
            closed: false,
        })
    }

    // Wrap a raw child result for emission: route exhaustion, wrap the
    // continuation, account the row cap.
    fn wrap_result(&mut self, result: CursorResult<T>) -> CursorResult<T> {
        let second_active = self.state == ActiveChild::Second;
        match result {
            CursorResult::NoNext {
                reason,
                continuation,
            } => {
                if second_active && reason.is_source_exhausted() {
                    // Nowhere left to fall through to.
                    CursorResult::exhausted()
                } else {
                    CursorResult::without_value(
                        reason,
                        ConcatContinuation::wrap(second_active, continuation),
                    )
                }
            }
            CursorResult::Next {
                value,
                continuation,
            } => {
                self.remaining_rows = self.remaining_rows.map(|n| n.saturating_sub(1));
                CursorResult::with_value(
                    value,
                    ConcatContinuation::wrap(second_active, continuation),
                )
            }
        }
    }
}

#[async_trait]
impl<T: Send> Cursor<T> for ConcatCursor<T> {
    async fn next(&mut self) -> Result<CursorResult<T>> {
        if self.closed {
            return Err(Error::CursorClosed);
        }

        let result = match self.state {
            ActiveChild::First => {
                let first = self
                    .first
                    .as_mut()
                    .ok_or_else(|| Error::internal("concat first child missing"))?;
                let result = first.next().await?;

                let exhausted = result
                    .no_next_reason()
                    .is_some_and(NoNextReason::is_source_exhausted);
                if exhausted {
                    // Fallthrough: absorb the first child's exhaustion and
                    // continue into the second within this same advance. The
                    // second child's row cap is the *remaining* allowance,
                    // not the original one.
                    tracing::debug!(
                        remaining_rows = ?self.remaining_rows,
                        "concat falling through to second child"
                    );
                    let scan = self.scan.with_return_limit(self.remaining_rows);
                    let mut second =
                        (self.second_factory)(&self.context, &scan, Continuation::Start)?;
                    let result = second.next().await?;
                    self.second = Some(second);
                    self.state = ActiveChild::Second;
                    result
                } else {
                    result
                }
            }
            ActiveChild::Second => {
                let second = self
                    .second
                    .as_mut()
                    .ok_or_else(|| Error::internal("concat second child missing"))?;
                second.next().await?
            }
        };

        Ok(self.wrap_result(result))
    }

    fn close(&mut self) {
        if let Some(mut second) = self.second.take() {
            second.close();
        }
        if let Some(mut first) = self.first.take() {
            first.close();
        }
        self.closed = true;
    }

    fn executor(&self) -> &Handle {
        let active = match self.state {
            ActiveChild::First => self.first.as_ref(),
            ActiveChild::Second => self.second.as_ref(),
        };
        active
            .map(|cursor| cursor.executor())
            .unwrap_or_else(|| self.context.executor())
    }

    fn accept(&mut self, visitor: &mut dyn CursorVisitor) -> bool {
        if visitor.visit_enter("concat") {
            // Only the active child is visited: the other either has not
            // started or has already finished.
            let active = match self.state {
                ActiveChild::First => self.first.as_mut(),
                ActiveChild::Second => self.second.as_mut(),
            };
            if let Some(child) = active {
                child.accept(visitor);
            }
        }
        visitor.visit_leave("concat")
    }
}

/// Resume position emitted by [`ConcatCursor`]: which child was active, plus
/// that child's own continuation.
///
/// Wire encoding is deferred until the bytes are first requested, then
/// cached, since a caller may ask zero or more times per result.
#[derive(Debug)]
struct ConcatContinuation {
    second: bool,
    inner: SharedContinuation,
    cached: OnceLock<Vec<u8>>,
}

impl ConcatContinuation {
    fn wrap(second: bool, inner: SharedContinuation) -> SharedContinuation {
        Arc::new(Self {
            second,
            inner,
            cached: OnceLock::new(),
        })
    }
}

impl CursorContinuation for ConcatContinuation {
    fn to_bytes(&self) -> Result<Option<Vec<u8>>> {
        if self.is_end() {
            return Ok(None);
        }
        if let Some(bytes) = self.cached.get() {
            return Ok(Some(bytes.clone()));
        }
        let inner = self.inner.to_bytes()?;
        let encoded = codec::encode_concat(self.second, inner.as_deref())?;
        Ok(Some(self.cached.get_or_init(|| encoded).clone()))
    }

    fn is_end(&self) -> bool {
        // End iff the second child was active and is itself at its end. A
        // continuation produced while the first child is active is never the
        // end sentinel: first-child exhaustion means fallthrough, not
        // termination.
        self.second && self.inner.is_end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::ListCursor;
    use crate::runner::collect_remaining;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use strand_db_core::ExecuteProperties;

    fn list_factory(items: Vec<i64>) -> CursorFactory<i64> {
        Box::new(move |ctx, scan, continuation| {
            Ok(Box::new(ListCursor::new(
                ctx,
                scan,
                items.clone(),
                continuation,
            )?))
        })
    }

    fn concat(
        ctx: &ScanContext,
        scan: ScanProperties,
        first: Vec<i64>,
        second: Vec<i64>,
        continuation: Continuation,
    ) -> ConcatCursor<i64> {
        ConcatCursor::new(
            ctx,
            scan,
            list_factory(first),
            list_factory(second),
            continuation,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn yields_first_sequence_then_second() {
        let ctx = ScanContext::current();
        let mut cursor = concat(
            &ctx,
            ScanProperties::default(),
            vec![1, 2],
            vec![3, 4, 5],
            Continuation::Start,
        );

        let (values, stop) = collect_remaining(&mut cursor).await.unwrap();
        assert_eq!(values, vec![1, 2, 3, 4, 5]);
        assert_eq!(stop.no_next_reason(), Some(NoNextReason::SourceExhausted));
        assert!(stop.continuation().is_end());
        assert_eq!(stop.continuation().to_bytes().unwrap(), None);
    }

    #[tokio::test]
    async fn first_child_exhaustion_is_absorbed_not_surfaced() {
        let ctx = ScanContext::current();
        let mut cursor = concat(
            &ctx,
            ScanProperties::default(),
            vec![1],
            vec![2],
            Continuation::Start,
        );

        // The advance that exhausts the first child already returns the
        // second child's first value; no empty result marks the boundary.
        assert_eq!(cursor.next().await.unwrap().value(), Some(&1));
        assert_eq!(cursor.next().await.unwrap().value(), Some(&2));
        assert!(cursor.next().await.unwrap().continuation().is_end());
    }

    #[tokio::test]
    async fn empty_children_fall_through_cleanly() {
        let ctx = ScanContext::current();

        let mut cursor = concat(
            &ctx,
            ScanProperties::default(),
            vec![],
            vec![7],
            Continuation::Start,
        );
        let (values, _) = collect_remaining(&mut cursor).await.unwrap();
        assert_eq!(values, vec![7]);

        let mut cursor = concat(
            &ctx,
            ScanProperties::default(),
            vec![],
            vec![],
            Continuation::Start,
        );
        let (values, stop) = collect_remaining(&mut cursor).await.unwrap();
        assert!(values.is_empty());
        assert!(stop.continuation().is_end());
    }

    #[tokio::test]
    async fn row_limit_carries_over_into_the_second_child() {
        // Child 1 yields [1,2] then exhausts; child 2 yields [3,4,5]; cap 3.
        let ctx = ScanContext::current();
        let scan = ScanProperties::new(ExecuteProperties::new().with_return_limit(3));
        let mut cursor = concat(&ctx, scan, vec![1, 2], vec![3, 4, 5], Continuation::Start);

        let (values, stop) = collect_remaining(&mut cursor).await.unwrap();
        assert_eq!(values, vec![1, 2, 3]);
        assert_eq!(
            stop.no_next_reason(),
            Some(NoNextReason::ReturnLimitReached)
        );
        assert!(!stop.continuation().is_end());

        // The pause points at the second child, right after value 3.
        let token = stop.continuation().to_bytes().unwrap().unwrap();
        let (second_active, inner) = codec::decode_concat(&token).unwrap();
        assert!(second_active);
        assert_eq!(inner.bytes(), Some(codec::encode_list_index(1).unwrap().as_slice()));
    }

    #[tokio::test]
    async fn resumes_from_a_first_child_token() {
        let ctx = ScanContext::current();
        let first = vec![1, 2, 3];
        let second = vec![4, 5];

        let mut cursor = concat(
            &ctx,
            ScanProperties::default(),
            first.clone(),
            second.clone(),
            Continuation::Start,
        );
        let result = cursor.next().await.unwrap();
        assert_eq!(result.value(), Some(&1));
        let token = result.continuation().to_bytes().unwrap().unwrap();

        let mut resumed = concat(
            &ctx,
            ScanProperties::default(),
            first,
            second,
            Continuation::from_resume_bytes(Some(&token)),
        );
        let (values, stop) = collect_remaining(&mut resumed).await.unwrap();
        assert_eq!(values, vec![2, 3, 4, 5]);
        assert!(stop.continuation().is_end());
    }

    #[tokio::test]
    async fn resumes_from_a_second_child_token_without_building_the_first() {
        let ctx = ScanContext::current();
        let built_first = Arc::new(AtomicUsize::new(0));

        let counting_first: CursorFactory<i64> = {
            let built_first = built_first.clone();
            Box::new(move |ctx, scan, continuation| {
                built_first.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(ListCursor::new(
                    ctx,
                    scan,
                    vec![1, 2],
                    continuation,
                )?))
            })
        };

        // Walk past the boundary to capture a second-child token.
        let mut cursor = ConcatCursor::new(
            &ctx,
            ScanProperties::default(),
            counting_first,
            list_factory(vec![3, 4]),
            Continuation::Start,
        )
        .unwrap();
        let mut token = None;
        loop {
            let result = cursor.next().await.unwrap();
            match result.value() {
                Some(&3) => {
                    token = Some(result.continuation().to_bytes().unwrap().unwrap());
                    break;
                }
                Some(_) => {}
                None => panic!("ran out before reaching the second child"),
            }
        }
        assert_eq!(built_first.load(Ordering::SeqCst), 1);

        let counting_first: CursorFactory<i64> = {
            let built_first = built_first.clone();
            Box::new(move |ctx, scan, continuation| {
                built_first.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(ListCursor::new(
                    ctx,
                    scan,
                    vec![1, 2],
                    continuation,
                )?))
            })
        };
        let mut resumed = ConcatCursor::new(
            &ctx,
            ScanProperties::default(),
            counting_first,
            list_factory(vec![3, 4]),
            Continuation::from_resume_bytes(token.as_deref()),
        )
        .unwrap();

        let (values, _) = collect_remaining(&mut resumed).await.unwrap();
        assert_eq!(values, vec![4]);
        // The first child was never instantiated on the resume path.
        assert_eq!(built_first.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn reverse_scan_swaps_the_child_builders() {
        let ctx = ScanContext::current();

        let mut reversed = concat(
            &ctx,
            ScanProperties::default().reversed(),
            vec![2, 1],
            vec![5, 4, 3],
            Continuation::Start,
        );
        let (reversed_values, _) = collect_remaining(&mut reversed).await.unwrap();

        // Reverse with (f1, f2) == forward with (f2, f1).
        let mut swapped = concat(
            &ctx,
            ScanProperties::default(),
            vec![5, 4, 3],
            vec![2, 1],
            Continuation::Start,
        );
        let (swapped_values, _) = collect_remaining(&mut swapped).await.unwrap();

        assert_eq!(reversed_values, vec![5, 4, 3, 2, 1]);
        assert_eq!(reversed_values, swapped_values);
    }

    #[tokio::test]
    async fn malformed_continuation_fails_before_any_child_exists() {
        let ctx = ScanContext::current();
        let built = Arc::new(AtomicUsize::new(0));

        let factory = |built: Arc<AtomicUsize>| -> CursorFactory<i64> {
            Box::new(move |ctx, scan, continuation| {
                built.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(ListCursor::new(ctx, scan, vec![1], continuation)?))
            })
        };

        let err = ConcatCursor::new(
            &ctx,
            ScanProperties::default(),
            factory(built.clone()),
            factory(built.clone()),
            Continuation::Active(vec![0xba, 0xad, 0xf0, 0x0d]),
        )
        .unwrap_err();

        assert!(matches!(err, Error::MalformedContinuation { .. }), "got {err:?}");
        assert_eq!(built.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn pause_on_the_first_child_is_not_a_fallthrough() {
        // The first child pauses with a return limit exactly when its data
        // also happens to be exhausted; the pause must surface, not trigger
        // the second child.
        let ctx = ScanContext::current();
        let scan = ScanProperties::new(ExecuteProperties::new().with_return_limit(2));
        let mut cursor = concat(&ctx, scan, vec![1, 2], vec![3], Continuation::Start);

        let (values, stop) = collect_remaining(&mut cursor).await.unwrap();
        assert_eq!(values, vec![1, 2]);
        assert_eq!(
            stop.no_next_reason(),
            Some(NoNextReason::ReturnLimitReached)
        );

        // The token still points at the first child.
        let token = stop.continuation().to_bytes().unwrap().unwrap();
        let (second_active, _) = codec::decode_concat(&token).unwrap();
        assert!(!second_active);
    }

    #[tokio::test]
    async fn continuation_bytes_are_cached_and_stable() {
        let ctx = ScanContext::current();
        let mut cursor = concat(
            &ctx,
            ScanProperties::default(),
            vec![1],
            vec![2],
            Continuation::Start,
        );
        let result = cursor.next().await.unwrap();
        let first_ask = result.continuation().to_bytes().unwrap();
        let second_ask = result.continuation().to_bytes().unwrap();
        assert_eq!(first_ask, second_ask);
        assert!(first_ask.is_some());
    }

    #[tokio::test]
    async fn close_is_idempotent_and_next_errors_after() {
        let ctx = ScanContext::current();
        let mut cursor = concat(
            &ctx,
            ScanProperties::default(),
            vec![1],
            vec![2],
            Continuation::Start,
        );
        cursor.next().await.unwrap();
        cursor.close();
        cursor.close();
        assert!(matches!(cursor.next().await, Err(Error::CursorClosed)));
    }

    #[tokio::test]
    async fn end_sentinel_appears_exactly_at_terminal_exhaustion() {
        let ctx = ScanContext::current();
        let mut cursor = concat(
            &ctx,
            ScanProperties::default(),
            vec![1],
            vec![2],
            Continuation::Start,
        );

        // Every value-bearing result carries a non-end continuation, even
        // the very last value.
        loop {
            let result = cursor.next().await.unwrap();
            if result.has_next() {
                assert!(!result.continuation().is_end());
            } else {
                assert_eq!(result.no_next_reason(), Some(NoNextReason::SourceExhausted));
                assert!(result.continuation().is_end());
                break;
            }
        }
    }
}
