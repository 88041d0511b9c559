use wolfpack_data::{AgentId, HuntingState};

/// Transient per-agent hunting state. Every timer is a plain tick counter
/// reset on state transitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HuntingSession {
    pub state: HuntingState,
    pub target: Option<AgentId>,
    /// Ticks spent chasing the current prey.
    pub hunt_ticks: u64,
    /// Ticks spent in `Resting`.
    pub rest_ticks: u64,
    /// Post-kill handling time left; re-targeting is suppressed while > 0.
    pub handling_remaining: u64,
    pub killed_recently: bool,
}

impl HuntingSession {
    /// Advances the timers by one tick.
    pub fn tick(&mut self) {
        if self.state.is_chasing() {
            self.hunt_ticks += 1;
        }
        if self.state == HuntingState::Resting {
            self.rest_ticks += 1;
        }
        if self.handling_remaining > 0 {
            self.handling_remaining -= 1;
            if self.handling_remaining == 0 {
                self.killed_recently = false;
            }
        }
    }

    pub fn is_handling(&self) -> bool {
        self.handling_remaining > 0
    }

    pub fn transition(&mut self, agent: AgentId, to: HuntingState) {
        if self.state == to {
            return;
        }
        tracing::debug!(agent = %agent, from = ?self.state, to = ?to, target = ?self.target, "Hunting state");
        if !self.state.is_chasing() && to.is_chasing() {
            self.hunt_ticks = 0;
        }
        if to == HuntingState::Resting {
            self.rest_ticks = 0;
            self.target = None;
        }
        self.state = to;
    }

    /// Commits to `prey`; a different prey restarts the hunt timer.
    pub fn set_target(&mut self, prey: AgentId) {
        if self.target != Some(prey) {
            self.target = Some(prey);
            self.hunt_ticks = 0;
        }
    }

    pub fn clear_target(&mut self) {
        self.target = None;
    }
}
