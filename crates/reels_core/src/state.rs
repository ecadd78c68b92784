use crate::BufferPolicy;

/// Lifecycle of the foreground navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Uninitialized,
    Initializing,
    Ready,
    /// Setup failed. Terminal: a new navigator must be built.
    Failed,
    /// Shut down by the owner. Terminal.
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavigatorState {
    phase: Phase,
    policy: BufferPolicy,
}

impl NavigatorState {
    pub fn new(policy: BufferPolicy) -> Self {
        Self {
            phase: Phase::Uninitialized,
            policy,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn policy(&self) -> BufferPolicy {
        self.policy
    }

    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }
}
