//! A cursor over nothing

use async_trait::async_trait;
use std::marker::PhantomData;
use strand_db_core::{Cursor, CursorResult, CursorVisitor, Error, Result, ScanContext};
use tokio::runtime::Handle;

/// Always immediately exhausted.
///
/// Used wherever a scan has provably nothing to return, e.g. uniqueness
/// violations on index types that cannot have them.
pub struct EmptyCursor<T> {
    context: ScanContext,
    closed: bool,
    _values: PhantomData<fn() -> T>,
}

impl<T> EmptyCursor<T> {
    pub fn new(context: &ScanContext) -> Self {
        Self {
            context: context.clone(),
            closed: false,
            _values: PhantomData,
        }
    }
}

#[async_trait]
impl<T: Send> Cursor<T> for EmptyCursor<T> {
    async fn next(&mut self) -> Result<CursorResult<T>> {
        if self.closed {
            return Err(Error::CursorClosed);
        }
        Ok(CursorResult::exhausted())
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn executor(&self) -> &Handle {
        self.context.executor()
    }

    fn accept(&mut self, visitor: &mut dyn CursorVisitor) -> bool {
        visitor.visit_enter("empty");
        visitor.visit_leave("empty")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_db_core::{CursorContinuation, NoNextReason};

    #[tokio::test]
    async fn empty_cursor_is_exhausted_from_the_start() {
        let ctx = ScanContext::current();
        let mut cursor: EmptyCursor<i64> = EmptyCursor::new(&ctx);
        let result = cursor.next().await.unwrap();
        assert_eq!(result.no_next_reason(), Some(NoNextReason::SourceExhausted));
        assert!(result.continuation().is_end());

        // Repeated advances keep reporting exhaustion.
        assert!(cursor.next().await.unwrap().continuation().is_end());
    }
}
