//! Helpers for driving a cursor from the root

use strand_db_core::{Cursor, CursorResult, Result};

/// Drain a cursor until it produces no value.
///
/// Returns the values surfaced and the stopping result, whose reason and
/// continuation tell the caller whether to persist a token and come back or
/// treat the scan as finished.
pub async fn collect_remaining<T: Send>(
    cursor: &mut dyn Cursor<T>,
) -> Result<(Vec<T>, CursorResult<T>)> {
    let mut values = Vec::new();
    loop {
        match cursor.next().await? {
            CursorResult::Next { value, .. } => values.push(value),
            stop @ CursorResult::NoNext { .. } => return Ok((values, stop)),
        }
    }
}
