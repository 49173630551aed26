//! Cursor trait and construction contracts
//!
//! Cursors form a tree that produces one [`CursorResult`] per advance through
//! the `next/close` lifecycle pattern.
//!
//! A cursor is driven by a single caller issuing one `next()` at a time and
//! awaiting its completion before the next; a cursor instance is never
//! advanced concurrently. Suspension happens only while waiting on a child's
//! asynchronous result. `close()` is cooperative and idempotent: it releases
//! every child that was actually instantiated, and releasing again is a
//! no-op. Interrupting an advance already in flight is the leaf/storage
//! layer's concern, not the tree's.

use crate::context::ScanContext;
use crate::continuation::Continuation;
use crate::error::Result;
use crate::properties::ScanProperties;
use crate::result::CursorResult;
use async_trait::async_trait;
use tokio::runtime::Handle;

/// A resumable, asynchronous producer of an ordered sequence of results.
#[async_trait]
pub trait Cursor<T: Send>: Send {
    /// Produce the next result.
    ///
    /// Failures from child cursors propagate unchanged; callers wanting to
    /// survive a transient failure re-enter the tree from the last captured
    /// continuation in a fresh attempt.
    async fn next(&mut self) -> Result<CursorResult<T>>;

    /// Release resources.
    ///
    /// Idempotent. Advancing after close is an [`Error::CursorClosed`] error.
    ///
    /// [`Error::CursorClosed`]: crate::error::Error::CursorClosed
    fn close(&mut self);

    /// The executor this cursor effectively runs on.
    ///
    /// Combinators report the currently active child's executor.
    fn executor(&self) -> &Handle;

    /// Diagnostic traversal of the cursor tree.
    ///
    /// Implementations call [`CursorVisitor::visit_enter`], descend into
    /// whichever children are relevant if it returned true, then return the
    /// value of [`CursorVisitor::visit_leave`].
    fn accept(&mut self, visitor: &mut dyn CursorVisitor) -> bool;
}

/// Boxed cursor for dynamic dispatch
pub type BoxedCursor<T> = Box<dyn Cursor<T>>;

/// Deferred child construction: given the attempt context, scan parameters,
/// and a resume position, build a leaf or nested-combinator cursor.
///
/// Combinators take these instead of ready-made children so that a child is
/// only instantiated at the moment it becomes active.
pub type CursorFactory<T> =
    Box<dyn Fn(&ScanContext, &ScanProperties, Continuation) -> Result<BoxedCursor<T>> + Send + Sync>;

/// Visitor for cursor tree traversal (EXPLAIN-style diagnostics).
pub trait CursorVisitor {
    /// Called before descending into a cursor's children. Return false to
    /// skip the children.
    fn visit_enter(&mut self, name: &str) -> bool;

    /// Called after a cursor's children were visited. Return false to stop
    /// the traversal at the enclosing cursor.
    fn visit_leave(&mut self, name: &str) -> bool;
}
