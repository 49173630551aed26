//! Per-attempt scan budgets (time and scanned-key limits)
//!
//! A [`ScanBudget`] is shared by every cursor participating in one scan
//! attempt, so the budget is enforced globally across a combinator tree
//! rather than per leaf. When disabled it is a single `None` pointer and
//! costs one null check per call.

use crate::properties::ExecuteProperties;
use crate::result::NoNextReason;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

struct BudgetInner {
    deadline: Option<Instant>,
    scanned: AtomicU64,
    /// 0 = unlimited
    scan_limit: u64,
}

/// Shared scan budget for one attempt. Cheap to clone and pass around.
#[derive(Clone, Default)]
pub struct ScanBudget(Option<Arc<BudgetInner>>);

impl ScanBudget {
    /// Build a budget from the attempt's execution limits.
    ///
    /// The time budget starts counting here, so construct the budget when the
    /// attempt starts, not when the properties are first parsed. Returns a
    /// disabled budget when neither limit is set.
    pub fn from_properties(execute: &ExecuteProperties) -> Self {
        if execute.time_limit.is_none() && execute.scan_limit.is_none() {
            return Self(None);
        }

        Self(Some(Arc::new(BudgetInner {
            deadline: execute.time_limit.map(|limit| Instant::now() + limit),
            scanned: AtomicU64::new(0),
            scan_limit: execute.scan_limit.unwrap_or(0),
        })))
    }

    /// Budget that never pauses a scan
    pub const fn disabled() -> Self {
        Self(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.0.is_some()
    }

    /// Account for one key about to be scanned.
    ///
    /// Returns the pause reason once a budget is exceeded: the time check
    /// runs first so `TimeLimitReached` wins over `ScanLimitReached` when
    /// both apply, matching stop-reason precedence. The key budget allows
    /// exactly `scan_limit` scans and trips on the one after; a tripped
    /// budget keeps reporting the pause on re-request.
    pub fn try_record_scan(&self) -> Option<NoNextReason> {
        let inner = self.0.as_ref()?;

        if let Some(deadline) = inner.deadline {
            if Instant::now() >= deadline {
                return Some(NoNextReason::TimeLimitReached);
            }
        }

        let new_total = inner.scanned.fetch_add(1, Ordering::Relaxed) + 1;
        if inner.scan_limit > 0 && new_total > inner.scan_limit {
            return Some(NoNextReason::ScanLimitReached);
        }
        None
    }

    /// Keys recorded so far (0 when disabled)
    pub fn scanned(&self) -> u64 {
        self.0
            .as_ref()
            .map(|inner| inner.scanned.load(Ordering::Relaxed))
            .unwrap_or(0)
    }
}

impl std::fmt::Debug for ScanBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            None => f.write_str("ScanBudget(disabled)"),
            Some(inner) => f
                .debug_struct("ScanBudget")
                .field("scanned", &inner.scanned.load(Ordering::Relaxed))
                .field("scan_limit", &inner.scan_limit)
                .finish(),
        }
    }
}
