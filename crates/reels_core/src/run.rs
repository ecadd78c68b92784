use std::time::Duration;

use crate::{CollectionReport, ExtractionError};

/// Bounds for one pass of the collection loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionPlan {
    /// Upper bound on items visited in one pass.
    pub max_steps: usize,
    /// Stop early once this many new identifiers were appended.
    pub target_new: usize,
    /// Delay before reading the location at each step.
    pub settle_delay: Duration,
}

impl CollectionPlan {
    /// Short pass on the primary session used to bootstrap or recover.
    pub fn foreground() -> Self {
        Self {
            max_steps: 3,
            target_new: 10,
            settle_delay: Duration::from_millis(1500),
        }
    }

    /// Longer pass on the secondary session.
    pub fn background() -> Self {
        Self {
            max_steps: 8,
            target_new: 8,
            settle_delay: Duration::from_millis(1500),
        }
    }
}

/// What happened at one step of a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Added,
    Duplicate,
    NoItem(ExtractionError),
    /// The automation session failed this step; the pass moves on.
    Skipped,
}

/// Bookkeeping for a single pass. Created at the start, dropped at the end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRun {
    plan: CollectionPlan,
    steps_attempted: usize,
    discovered: usize,
    skipped: usize,
}

impl CollectionRun {
    pub fn new(plan: CollectionPlan) -> Self {
        Self {
            plan,
            steps_attempted: 0,
            discovered: 0,
            skipped: 0,
        }
    }

    pub fn plan(&self) -> &CollectionPlan {
        &self.plan
    }

    pub fn record(&mut self, outcome: &StepOutcome) {
        self.steps_attempted += 1;
        match outcome {
            StepOutcome::Added => self.discovered += 1,
            StepOutcome::Skipped => self.skipped += 1,
            StepOutcome::Duplicate | StepOutcome::NoItem(_) => {}
        }
    }

    /// No more steps are planned: the step budget is spent or the target met.
    pub fn is_done(&self) -> bool {
        self.steps_attempted >= self.plan.max_steps || self.discovered >= self.plan.target_new
    }

    pub fn steps_attempted(&self) -> usize {
        self.steps_attempted
    }

    pub fn discovered(&self) -> usize {
        self.discovered
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn report(&self, total_queue_length: usize) -> CollectionReport {
        CollectionReport {
            discovered_count: self.discovered,
            total_queue_length,
        }
    }
}
