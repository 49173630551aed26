//! Execution context for one scan attempt
//!
//! The context carries what every cursor in an attempt reads: the executor
//! the scan runs on and the attempt's shared [`ScanBudget`]. It is owned by
//! the caller and borrowed by cursors — cursors hold a cheap clone and never
//! mutate it.

use crate::budget::ScanBudget;
use std::sync::Arc;
use tokio::runtime::Handle;

struct ContextInner {
    executor: Handle,
    budget: ScanBudget,
}

/// Cheap-clone handle to the attempt's execution state.
#[derive(Clone)]
pub struct ScanContext {
    inner: Arc<ContextInner>,
}

impl ScanContext {
    /// Context on the given executor with no budget
    pub fn new(executor: Handle) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                executor,
                budget: ScanBudget::disabled(),
            }),
        }
    }

    /// Context on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics outside a tokio runtime, like [`Handle::current`].
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Attach the attempt's scan budget
    pub fn with_budget(self, budget: ScanBudget) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                executor: self.inner.executor.clone(),
                budget,
            }),
        }
    }

    /// The executor this attempt runs on
    pub fn executor(&self) -> &Handle {
        &self.inner.executor
    }

    /// The attempt's shared scan budget
    pub fn budget(&self) -> &ScanBudget {
        &self.inner.budget
    }
}

impl std::fmt::Debug for ScanContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanContext")
            .field("budget", self.budget())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::ExecuteProperties;

    #[tokio::test]
    async fn context_exposes_executor_and_budget() {
        let ctx = ScanContext::current();
        assert!(!ctx.budget().is_enabled());

        let budget = ScanBudget::from_properties(&ExecuteProperties::new().with_scan_limit(1));
        let ctx = ctx.with_budget(budget);
        assert!(ctx.budget().is_enabled());

        // Clones observe the same budget.
        let clone = ctx.clone();
        assert_eq!(ctx.budget().try_record_scan(), None);
        assert!(clone.budget().try_record_scan().is_some());
    }
}
