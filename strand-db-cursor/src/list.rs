//! In-memory list leaf cursor
//!
//! The simplest leaf: an ordered sequence already in memory, with the resume
//! position being the index of the next unreturned element. Useful on its own
//! for small materialized sequences and throughout the tests as a stand-in
//! for a storage-backed range scan. The items must already be in iteration
//! order; direction handling belongs to whoever built the list.

use crate::codec;
use async_trait::async_trait;
use strand_db_core::{
    Continuation, Cursor, CursorResult, CursorVisitor, Error, NoNextReason, Result, ScanContext,
    ScanProperties, SharedContinuation,
};
use tokio::runtime::Handle;

#[derive(Debug)]
pub struct ListCursor<T> {
    items: Vec<T>,
    next_index: usize,
    remaining_rows: Option<usize>,
    context: ScanContext,
    closed: bool,
}

impl<T> ListCursor<T> {
    /// Build a list cursor, optionally resumed from a prior position.
    ///
    /// Fails with [`Error::MalformedContinuation`] when the continuation does
    /// not decode to an index within the list.
    pub fn new(
        context: &ScanContext,
        scan: &ScanProperties,
        items: Vec<T>,
        continuation: Continuation,
    ) -> Result<Self> {
        let next_index = match &continuation {
            Continuation::Start => 0,
            Continuation::End => items.len(),
            Continuation::Active(raw) => {
                let index = codec::decode_list_index(raw)?;
                let index = usize::try_from(index).map_err(|_| {
                    Error::malformed_continuation("list index exceeds platform size", raw.clone())
                })?;
                if index > items.len() {
                    return Err(Error::malformed_continuation(
                        format!("list index {index} past end of {} items", items.len()),
                        raw.clone(),
                    ));
                }
                index
            }
        };

        Ok(Self {
            items,
            next_index,
            remaining_rows: scan.execute.return_limit,
            context: context.clone(),
            closed: false,
        })
    }

    // Resume token for the current position (the next unreturned index).
    fn position(&self) -> Result<SharedContinuation> {
        let raw = codec::encode_list_index(self.next_index as u64)?;
        Ok(Continuation::Active(raw).shared())
    }
}

#[async_trait]
impl<T: Clone + Send> Cursor<T> for ListCursor<T> {
    async fn next(&mut self) -> Result<CursorResult<T>> {
        if self.closed {
            return Err(Error::CursorClosed);
        }

        if self.remaining_rows == Some(0) {
            return Ok(CursorResult::without_value(
                NoNextReason::ReturnLimitReached,
                self.position()?,
            ));
        }
        if self.next_index >= self.items.len() {
            return Ok(CursorResult::exhausted());
        }
        if let Some(reason) = self.context.budget().try_record_scan() {
            return Ok(CursorResult::without_value(reason, self.position()?));
        }

        let value = self.items[self.next_index].clone();
        self.next_index += 1;
        self.remaining_rows = self.remaining_rows.map(|n| n.saturating_sub(1));
        Ok(CursorResult::with_value(value, self.position()?))
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn executor(&self) -> &Handle {
        self.context.executor()
    }

    fn accept(&mut self, visitor: &mut dyn CursorVisitor) -> bool {
        visitor.visit_enter("list");
        visitor.visit_leave("list")
    }
}
