//! Wall-clock budget for one diff run.

use crate::error::DiffError;
use crate::warn;
use std::time::{Duration, Instant};

/// A monotonic deadline shared (by copy) with every worker of a diff run.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    /// Start a deadline now. `None` never expires.
    pub fn start(budget_ms: Option<u64>) -> Self {
        Self {
            start: Instant::now(),
            budget: budget_ms.map(Duration::from_millis),
        }
    }

    /// A deadline that never expires.
    pub fn unlimited() -> Self {
        Self::start(None)
    }

    /// Milliseconds since the deadline started.
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Fail with [`DiffError::TimedOut`] once the budget is spent.
    pub fn check(&self) -> Result<(), DiffError> {
        let Some(budget) = self.budget else {
            return Ok(());
        };
        let elapsed = self.start.elapsed();
        if elapsed >= budget {
            let budget_ms = u64::try_from(budget.as_millis()).unwrap_or(u64::MAX);
            let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
            warn!(budget_ms, elapsed_ms, "diff timed out");
            return Err(DiffError::TimedOut {
                budget_ms,
                elapsed_ms,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn test_unlimited_never_expires() {
        assert!(Deadline::unlimited().check().is_ok());
    }

    #[test]
    fn test_zero_budget_expires_immediately() {
        let err = Deadline::start(Some(0)).check().unwrap_err();
        assert!(matches!(err, DiffError::TimedOut { budget_ms: 0, .. }));
    }
}
