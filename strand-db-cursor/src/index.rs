//! Index maintainer capability surface
//!
//! Scans consult the maintainer of the index they run against for operations
//! beyond plain range iteration: native evaluation of record and aggregate
//! functions, and scanning stored uniqueness violations. Most index types
//! support only a subset, so every capability comes as a query method plus an
//! evaluation method, and the defaults decline: callers are expected to probe
//! `can_*` first and treat [`Error::Unsupported`] as a capability answer, not
//! a failure to retry.
//!
//! [`Error::Unsupported`]: strand_db_core::Error::Unsupported

use crate::empty::EmptyCursor;
use async_trait::async_trait;
use strand_db_core::{
    BoxedCursor, Continuation, Error, Result, ScanContext, ScanProperties,
};

/// Capability surface of one index type, consumed by scan planning.
#[async_trait]
pub trait IndexMaintainer<T: Send + 'static>: Send + Sync {
    /// Name of the index this maintainer serves (for diagnostics)
    fn index_name(&self) -> &str;

    /// Whether this index can natively evaluate `function` for one record.
    fn can_evaluate_record_function(&self, function: &str) -> bool {
        tracing::trace!(index = self.index_name(), function, "can_evaluate_record_function");
        false
    }

    /// Evaluate a record-level function natively on the index.
    async fn evaluate_record_function(&self, function: &str) -> Result<T> {
        Err(Error::unsupported(format!(
            "record function {function} not supported by index {}",
            self.index_name()
        )))
    }

    /// Whether this index can natively evaluate the aggregate `function`
    /// over a scanned range.
    fn can_evaluate_aggregate_function(&self, function: &str) -> bool {
        tracing::trace!(index = self.index_name(), function, "can_evaluate_aggregate_function");
        false
    }

    /// Evaluate an aggregate function natively on the index.
    async fn evaluate_aggregate_function(&self, function: &str) -> Result<T> {
        Err(Error::unsupported(format!(
            "aggregate function {function} not supported by index {}",
            self.index_name()
        )))
    }

    /// Scan stored uniqueness violations.
    ///
    /// Index types that cannot accumulate violations report an empty scan.
    fn scan_uniqueness_violations(
        &self,
        context: &ScanContext,
        _scan: &ScanProperties,
        _continuation: Continuation,
    ) -> Result<BoxedCursor<T>> {
        tracing::trace!(index = self.index_name(), "scan_uniqueness_violations");
        Ok(Box::new(EmptyCursor::new(context)))
    }
}
