//! Intersection combinator
//!
//! Both children are active at once; each advance pulls the trailing child
//! forward until the heads compare equal (a match, surfaced as the first
//! child's value) or either child exhausts. Exhaustion of *either* child is
//! terminal: with one side out of data, no further matches are possible.

use crate::pair::{decode_pair_resume, strictest_pause, ChildSlot, PairContinuation};
use crate::union::Comparator;
use async_trait::async_trait;
use std::cmp::Ordering;
use strand_db_core::{
    Continuation, Cursor, CursorFactory, CursorResult, CursorVisitor, Error, Result, ScanContext,
    ScanProperties, SharedContinuation,
};
use tokio::runtime::Handle;

pub struct IntersectionCursor<T: Send> {
    context: ScanContext,
    comparator: Comparator<T>,
    reverse: bool,
    first: ChildSlot<T>,
    second: ChildSlot<T>,
    closed: bool,
}

impl<T: Send> IntersectionCursor<T> {
    /// Build an intersection cursor, optionally resumed from a continuation.
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
impl<T: Send> Cursor<T> for IntersectionCursor<T> {
    async fn next(&mut self) -> Result<CursorResult<T>> {
        if self.closed {
            return Err(Error::CursorClosed);
        }

        loop {
            let first_pause = self.first.fill().await?;
            let second_pause = self.second.fill().await?;
            if let Some(reason) = strictest_pause(first_pause, second_pause) {
                return Ok(CursorResult::without_value(reason, self.wrap()));
            }

            if self.first.is_exhausted() || self.second.is_exhausted() {
                return Ok(CursorResult::exhausted());
            }

            let (Some(a), Some(b)) = (self.first.peek(), self.second.peek()) else {
                return Err(Error::internal("intersection child has no buffered value"));
            };
            match self.compare(a, b) {
                Ordering::Equal => {
                    let value = self
                        .first
                        .take()
                        .ok_or_else(|| Error::internal("intersection match vanished"))?;
                    self.second.take();
                    return Ok(CursorResult::with_value(value, self.wrap()));
                }
                // Advance whichever side is behind and compare again.
                Ordering::Less => {
                    self.first.take();
                }
                Ordering::Greater => {
                    self.second.take();
                }
            }
        }
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
        if visitor.visit_enter("intersection") {
            self.first.accept(visitor);
            self.second.accept(visitor);
        }
        visitor.visit_leave("intersection")
    }
}
