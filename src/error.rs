//! Error types for handler chains.
//!
//! Two layers: [`HandlerError`] is what an individual handler reports when its
//! predicate or action fails, and [`ChainError`] is what the chain surfaces to
//! the dispatch caller. `Outcome::Unhandled` is deliberately absent here: no
//! handler accepting a request is a normal result, not a failure.

use crate::chain::HandlerId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error reported by a handler's predicate or action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    pub message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type HandlerResult<T> = std::result::Result<T, HandlerError>;

/// Which half of a handler faulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultStage {
    /// `can_handle` returned an error
    Predicate,
    /// `handle` returned an error
    Action,
}

impl fmt::Display for FaultStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Predicate => write!(f, "can_handle"),
            Self::Action => write!(f, "handle"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The successor relation contains (or would contain) a cycle.
    #[error("Malformed chain after {steps} steps: {reason}")]
    MalformedChain { reason: String, steps: usize },

    /// A handler's predicate or action failed mid-dispatch.
    #[error("Handler '{label}' faulted in {stage}: {reason}")]
    HandlerFault {
        label: String,
        stage: FaultStage,
        reason: String,
    },

    #[error("Handler {id} is not registered in this chain")]
    UnknownHandler { id: HandlerId },

    #[error("No handler labelled '{label}' in this chain")]
    UnknownLabel { label: String },

    #[error("A handler labelled '{label}' is already registered")]
    DuplicateLabel { label: String },

    #[error("Chain capacity of {max_handlers} handlers exceeded")]
    CapacityExceeded { max_handlers: usize },
}

impl ChainError {
    pub fn malformed(reason: impl Into<String>, steps: usize) -> Self {
        Self::MalformedChain {
            reason: reason.into(),
            steps,
        }
    }

    pub fn fault(label: impl Into<String>, stage: FaultStage, error: HandlerError) -> Self {
        Self::HandlerFault {
            label: label.into(),
            stage,
            reason: error.message,
        }
    }

    /// Label of the faulting handler, if this is a `HandlerFault`.
    pub fn faulted_handler(&self) -> Option<&str> {
        match self {
            Self::HandlerFault { label, .. } => Some(label),
            _ => None,
        }
    }
}

pub type ChainResult<T> = std::result::Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_carries_label_and_stage() {
        let error = ChainError::fault("Director", FaultStage::Action, HandlerError::new("ledger offline"));

        assert_eq!(error.faulted_handler(), Some("Director"));
        assert_eq!(
            error.to_string(),
            "Handler 'Director' faulted in handle: ledger offline"
        );
    }

    #[test]
    fn test_non_fault_has_no_faulted_handler() {
        let error = ChainError::malformed("cycle", 4);
        assert_eq!(error.faulted_handler(), None);
        assert!(error.to_string().contains("after 4 steps"));
    }
}
