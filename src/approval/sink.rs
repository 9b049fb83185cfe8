//! Announcement channels for approval decisions.
//!
//! Approvers never print directly; they hand an [`ApprovalEvent`] to
//! whichever [`ApprovalSink`] they were built with.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ApprovalEvent {
    Approved { approver: String, days: u32 },
    NoApprover { days: u32 },
}

impl fmt::Display for ApprovalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approved { approver, .. } => write!(f, "{approver} approved the request."),
            Self::NoApprover { .. } => write!(f, "No one can approve this request."),
        }
    }
}

pub trait ApprovalSink: Send + Sync + fmt::Debug {
    fn announce(&self, event: &ApprovalEvent);
}

/// Prints each announcement on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl ApprovalSink for ConsoleSink {
    fn announce(&self, event: &ApprovalEvent) {
        println!("{event}");
    }
}

/// Emits each announcement as a structured `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ApprovalSink for TracingSink {
    fn announce(&self, event: &ApprovalEvent) {
        match event {
            ApprovalEvent::Approved { approver, days } => {
                tracing::info!(approver = %approver, days = days, "{event}");
            }
            ApprovalEvent::NoApprover { days } => {
                tracing::warn!(days = days, "{event}");
            }
        }
    }
}

/// Keeps announcements in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ApprovalEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ApprovalEvent> {
        self.events.lock().clone()
    }

    /// Announcements rendered the way `ConsoleSink` prints them.
    pub fn messages(&self) -> Vec<String> {
        self.events.lock().iter().map(ToString::to_string).collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl ApprovalSink for RecordingSink {
    fn announce(&self, event: &ApprovalEvent) {
        self.events.lock().push(event.clone());
    }
}
