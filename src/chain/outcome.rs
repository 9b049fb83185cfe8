use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Terminal result of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The first handler whose predicate held took the request
    Handled { by: String },
    /// No handler in the chain accepted the request
    Unhandled,
}

impl Outcome {
    pub fn handled(by: impl Into<String>) -> Self {
        Self::Handled { by: by.into() }
    }

    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled { .. })
    }

    /// Label of the accepting handler.
    pub fn handled_by(&self) -> Option<&str> {
        match self {
            Self::Handled { by } => Some(by),
            Self::Unhandled => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Handled { by } => write!(f, "handled by {by}"),
            Self::Unhandled => write!(f, "unhandled"),
        }
    }
}

/// Outcome plus the path the request took, from `HandlerChain::dispatch_traced`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    /// Correlation id of this dispatch
    pub correlation_id: Uuid,

    /// Labels whose predicates were evaluated, in traversal order
    pub visited: Vec<String>,

    pub outcome: Outcome,
}

impl DispatchReport {
    /// Handlers that were asked and declined.
    pub fn rejected(&self) -> &[String] {
        match self.outcome {
            Outcome::Handled { .. } => &self.visited[..self.visited.len().saturating_sub(1)],
            Outcome::Unhandled => &self.visited,
        }
    }
}
