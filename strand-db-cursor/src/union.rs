//! Union combinator - ordered merge of two cursors
//!
//! Both children are active at once; each advance surfaces whichever child is
//! behind in sort order, so two sorted inputs merge into one sorted output.
//! Equal keys collapse to a single result (the first child's value) with both
//! children advanced past the duplicate.
//!
//! A resumable pause on either child pauses the whole union: merge order
//! cannot be decided without knowing both heads. When both children pause the
//! highest-precedence reason is reported. The union is terminal only when
//! both children have exhausted.

use crate::pair::{decode_pair_resume, strictest_pause, ChildSlot, PairContinuation};
use async_trait::async_trait;
use std::cmp::Ordering;
use strand_db_core::{
    Continuation, Cursor, CursorFactory, CursorResult, CursorVisitor, Error, Result, ScanContext,
    ScanProperties, SharedContinuation,
};
use tokio::runtime::Handle;

/// Comparison function establishing the merge order of two elements.
pub type Comparator<T> = Box<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

pub struct UnionCursor<T: Send> {
    context: ScanContext,
    comparator: Comparator<T>,
    reverse: bool,
    first: ChildSlot<T>,
    second: ChildSlot<T>,
    closed: bool,
}

impl<T: Send> UnionCursor<T> {
    /// Build a union cursor, optionally resumed from a continuation.
    ///
    /// Children already exhausted at capture time are not instantiated again.
    /// A malformed continuation fails here, before either child is built.
    pub fn new(
        context: &ScanContext,
        scan: &ScanProperties,
        first_factory: CursorFactory<T>,
        second_factory: CursorFactory<T>,
        comparator: Comparator<T>,
        continuation: Continuation,
    ) -> Result<Self> {
        let [first_resume, second_resume] = decode_pair_resume(continuation)?;
        let first = ChildSlot::build(&first_factory, context, scan, first_resume)?;
        let second = ChildSlot::build(&second_factory, context, scan, second_resume)?;

        Ok(Self {
            context: context.clone(),
            comparator,
            reverse: scan.reverse,
            first,
            second,
            closed: false,
        })
    }

    fn compare(&self, a: &T, b: &T) -> Ordering {
        let ordering = (self.comparator)(a, b);
        if self.reverse {
            ordering.reverse()
        } else {
            ordering
        }
    }

    fn wrap(&self) -> SharedContinuation {
        PairContinuation::wrap(self.first.resume_state(), self.second.resume_state())
    }
}

#[async_trait]
impl<T: Send> Cursor<T> for UnionCursor<T> {
    async fn next(&mut self) -> Result<CursorResult<T>> {
        if self.closed {
            return Err(Error::CursorClosed);
        }

        let first_pause = self.first.fill().await?;
        let second_pause = self.second.fill().await?;
        if let Some(reason) = strictest_pause(first_pause, second_pause) {
            return Ok(CursorResult::without_value(reason, self.wrap()));
        }

        let value = match (self.first.peek(), self.second.peek()) {
            (None, None) => return Ok(CursorResult::exhausted()),
            (Some(_), None) => self.first.take(),
            (None, Some(_)) => self.second.take(),
            (Some(a), Some(b)) => match self.compare(a, b) {
                Ordering::Less => self.first.take(),
                Ordering::Greater => self.second.take(),
                Ordering::Equal => {
                    // Duplicate key: surface once, advance both children.
                    let value = self.first.take();
                    self.second.take();
                    value
                }
            },
        };
        let value =
            value.ok_or_else(|| Error::internal("union buffered value vanished"))?;

        Ok(CursorResult::with_value(value, self.wrap()))
    }

    fn close(&mut self) {
        self.first.close();
        self.second.close();
        self.closed = true;
    }

    fn executor(&self) -> &Handle {
        self.first
            .executor()
            .or_else(|| self.second.executor())
            .unwrap_or_else(|| self.context.executor())
    }

    fn accept(&mut self, visitor: &mut dyn CursorVisitor) -> bool {
        if visitor.visit_enter("union") {
            self.first.accept(visitor);
            self.second.accept(visitor);
        }
        visitor.visit_leave("union")
    }
}
