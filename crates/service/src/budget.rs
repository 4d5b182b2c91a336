//! Consecutive-failure accounting for a subject's list calls.

/// Counts consecutive list failures. Any success resets the count; reaching
/// the ceiling means the subject must escalate and stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorBudget {
    ceiling: u32,
    consecutive: u32,
}

impl ErrorBudget {
    /// A ceiling of zero is treated as one.
    #[must_use]
    pub const fn new(ceiling: u32) -> Self {
        let ceiling = if ceiling == 0 { 1 } else { ceiling };
        Self { ceiling, consecutive: 0 }
    }

    /// Records a failure and returns `true` once the ceiling is reached.
    pub const fn record_failure(&mut self) -> bool {
        self.consecutive = self.consecutive.saturating_add(1);
        self.is_exhausted()
    }

    pub const fn record_success(&mut self) {
        self.consecutive = 0;
    }

    #[must_use]
    pub const fn consecutive(&self) -> u32 {
        self.consecutive
    }

    #[must_use]
    pub const fn ceiling(&self) -> u32 {
        self.ceiling
    }

    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.consecutive >= self.ceiling
    }
}
