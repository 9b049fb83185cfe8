use super::handler::HandlerId;
use super::outcome::Outcome;
use std::fmt;

/// Per-dispatch traversal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchState {
    /// Positioned at a node that has not been asked yet
    Traversing { current: HandlerId },
    /// Dispatch finished; absorbing
    Terminated(Outcome),
}

impl DispatchState {
    /// Initial state for a dispatch beginning at `start`.
    pub fn start(start: Option<HandlerId>) -> Self {
        match start {
            Some(current) => Self::Traversing { current },
            None => Self::Terminated(Outcome::Unhandled),
        }
    }

    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated(_))
    }

    /// State after the current node declined.
    pub fn advance(self, successor: Option<HandlerId>) -> Self {
        match self {
            Self::Traversing { .. } => Self::start(successor),
            terminated => terminated,
        }
    }

    /// State after the current node accepted.
    pub fn accept(self, label: &str) -> Self {
        match self {
            Self::Traversing { .. } => Self::Terminated(Outcome::handled(label)),
            terminated => terminated,
        }
    }
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Traversing { current } => write!(f, "traversing at {current}"),
            Self::Terminated(outcome) => write!(f, "terminated ({outcome})"),
        }
    }
}
