//! Row-limit wrapper
//!
//! Caps the number of value-bearing results a cursor tree may surface. The
//! counter discipline is the same one the concatenation combinator applies
//! across its child boundary, but with a single child there is no fallthrough
//! and no routing metadata: the pause carries the child's continuation after
//! the last emitted value, verbatim.

use async_trait::async_trait;
use strand_db_core::{
    BoxedCursor, Continuation, Cursor, CursorResult, CursorVisitor, Error, NoNextReason, Result,
    SharedContinuation,
};
use tokio::runtime::Handle;

/// Emits at most `limit` values, then pauses with `ReturnLimitReached`.
pub struct RowLimitCursor<T> {
    child: BoxedCursor<T>,
    limit: usize,
    emitted: usize,
    /// Resume position after the last emitted value
    resume: SharedContinuation,
    closed: bool,
}

impl<T> RowLimitCursor<T> {
    /// Wrap `child`, which must have been built from `resume_from`.
    pub fn new(child: BoxedCursor<T>, limit: usize, resume_from: Continuation) -> Self {
        Self {
            child,
            limit,
            emitted: 0,
            resume: resume_from.shared(),
            closed: false,
        }
    }

    /// Values emitted so far
    pub fn emitted(&self) -> usize {
        self.emitted
    }
}

#[async_trait]
impl<T: Send> Cursor<T> for RowLimitCursor<T> {
    async fn next(&mut self) -> Result<CursorResult<T>> {
        if self.closed {
            return Err(Error::CursorClosed);
        }

        if self.emitted >= self.limit {
            return Ok(CursorResult::without_value(
                NoNextReason::ReturnLimitReached,
                self.resume.clone(),
            ));
        }

        match self.child.next().await? {
            CursorResult::Next {
                value,
                continuation,
            } => {
                self.emitted += 1;
                self.resume = continuation.clone();
                Ok(CursorResult::with_value(value, continuation))
            }
            stop @ CursorResult::NoNext { .. } => Ok(stop),
        }
    }

    fn close(&mut self) {
        self.child.close();
        self.closed = true;
    }

    fn executor(&self) -> &Handle {
        self.child.executor()
    }

    fn accept(&mut self, visitor: &mut dyn CursorVisitor) -> bool {
        if visitor.visit_enter("row_limit") {
            self.child.accept(visitor);
        }
        visitor.visit_leave("row_limit")
    }
}
