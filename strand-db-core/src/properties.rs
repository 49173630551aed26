//! Scan parameters threaded from the caller down to leaf cursors

use std::time::Duration;

/// Per-attempt execution limits.
///
/// All limits are optional; `None` means unbounded. The return limit counts
/// value-bearing results, the scan limit counts keys touched upstream, and
/// the time limit bounds one attempt's wall clock.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecuteProperties {
    pub return_limit: Option<usize>,
    pub time_limit: Option<Duration>,
    pub scan_limit: Option<u64>,
}

impl ExecuteProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of value-bearing results
    pub fn with_return_limit(mut self, limit: usize) -> Self {
        self.return_limit = Some(limit);
        self
    }

    /// Bound the attempt's wall clock
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Bound the number of keys scanned upstream
    pub fn with_scan_limit(mut self, limit: u64) -> Self {
        self.scan_limit = Some(limit);
        self
    }
}

/// Scan parameters accepted by cursor factories: execution limits plus the
/// scan direction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanProperties {
    pub execute: ExecuteProperties,
    pub reverse: bool,
}

impl ScanProperties {
    pub fn new(execute: ExecuteProperties) -> Self {
        Self {
            execute,
            reverse: false,
        }
    }

    /// Same properties, scanning in reverse
    pub fn reversed(mut self) -> Self {
        self.reverse = true;
        self
    }

    /// A copy with the row cap overridden.
    ///
    /// This is the cross-boundary carry-over hook: a combinator that has
    /// already surfaced some rows hands its remaining allowance to the next
    /// child it builds.
    pub fn with_return_limit(&self, limit: Option<usize>) -> Self {
        let mut scan = self.clone();
        scan.execute.return_limit = limit;
        scan
    }
}
