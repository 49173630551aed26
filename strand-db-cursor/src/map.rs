//! Element transformation wrapper

use async_trait::async_trait;
use std::marker::PhantomData;
use strand_db_core::{BoxedCursor, Cursor, CursorResult, CursorVisitor, Result};
use tokio::runtime::Handle;

/// Applies a side-effect-free mapping to every value of the wrapped cursor.
///
/// Stops and continuations pass through verbatim: with a single child there
/// is no routing metadata to add, so the child's resume token is already the
/// map cursor's resume token.
pub struct MapCursor<T, U, F> {
    child: BoxedCursor<T>,
    map: F,
    _out: PhantomData<fn() -> U>,
}

impl<T, U, F> MapCursor<T, U, F>
where
    F: FnMut(T) -> U,
{
    pub fn new(child: BoxedCursor<T>, map: F) -> Self {
        Self {
            child,
            map,
            _out: PhantomData,
        }
    }
}

#[async_trait]
impl<T, U, F> Cursor<U> for MapCursor<T, U, F>
where
    T: Send,
    U: Send,
    F: FnMut(T) -> U + Send,
{
    async fn next(&mut self) -> Result<CursorResult<U>> {
        match self.child.next().await? {
            CursorResult::Next {
                value,
                continuation,
            } => Ok(CursorResult::with_value((self.map)(value), continuation)),
            CursorResult::NoNext {
                reason,
                continuation,
            } => Ok(CursorResult::without_value(reason, continuation)),
        }
    }

    fn close(&mut self) {
        self.child.close();
    }

    fn executor(&self) -> &Handle {
        self.child.executor()
    }

    fn accept(&mut self, visitor: &mut dyn CursorVisitor) -> bool {
        if visitor.visit_enter("map") {
            self.child.accept(visitor);
        }
        visitor.visit_leave("map")
    }
}
