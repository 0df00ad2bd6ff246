//! Bootstrap lifecycle states

use std::fmt;

/// State of a single bootstrap run
///
/// ```text
/// NotStarted -> Starting -> Running -> Closing -> Closed
///      |            |
///      +------------+--> Failed
/// ```
///
/// `Failed` is only reachable before a context exists. Once a context has
/// started, every path (including failures) ends in `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BootstrapState {
    #[default]
    NotStarted,
    Starting,
    Running,
    Closing,
    Closed,
    Failed,
}

impl BootstrapState {
    /// Check whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(self, next: BootstrapState) -> bool {
        use BootstrapState::*;
        matches!(
            (self, next),
            (NotStarted, Starting)
                | (NotStarted, Failed)
                | (Starting, Running)
                | (Starting, Failed)
                | (Running, Closing)
                | (Closing, Closed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BootstrapState::Closed | BootstrapState::Failed)
    }
}

impl fmt::Display for BootstrapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NotStarted => "not-started",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Closing => "closing",
            Self::Closed => "closed",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Tracks the state of one run and logs every transition
#[derive(Debug, Default)]
pub(crate) struct Lifecycle {
    state: BootstrapState,
}

impl Lifecycle {
    pub(crate) fn state(&self) -> BootstrapState {
        self.state
    }

    pub(crate) fn advance(&mut self, next: BootstrapState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal bootstrap transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!("Bootstrap state: {} -> {}", self.state, next);
        self.state = next;
    }

    /// Settle the state after a panic unwound through the run
    ///
    /// A started context is closed by its guard while unwinding, so a run
    /// that got past startup ends `Closed`; anything earlier ends `Failed`.
    pub(crate) fn unwound(&mut self) {
        match self.state {
            BootstrapState::Running => {
                self.advance(BootstrapState::Closing);
                self.advance(BootstrapState::Closed);
            }
            BootstrapState::Closing => self.advance(BootstrapState::Closed),
            BootstrapState::NotStarted | BootstrapState::Starting => {
                self.advance(BootstrapState::Failed)
            }
            BootstrapState::Closed | BootstrapState::Failed => {}
        }
    }

    /// Mark the run failed unless it already reached a terminal state
    pub(crate) fn fail(&mut self) {
        if !self.state.is_terminal() {
            self.advance(BootstrapState::Failed);
        }
    }
}
