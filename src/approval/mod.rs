//! # Leave Approval Chain
//!
//! The reference escalation chain built on [`crate::chain`]: a leave request
//! goes to the Manager, then the Director, then the CEO, each approving only
//! within their own day range.
//!
//! ```text
//! LeaveRequest ──► Manager (≤5) ──► Director (6-10) ──► CEO (11-15) ──► no approver
//! ```
//!
//! Tiers come from [`crate::config::ApprovalConfig`]; announcements go to an
//! injected [`ApprovalSink`].
//!
//! ## Usage
//!
//! ```rust
//! use handler_chain::approval::{ApprovalDesk, LeaveRequest, RecordingSink};
//! use handler_chain::chain::Outcome;
//! use handler_chain::config::HandlerChainConfig;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let sink = Arc::new(RecordingSink::new());
//! let desk = ApprovalDesk::from_config(&HandlerChainConfig::default(), sink.clone())?;
//!
//! assert_eq!(desk.submit(LeaveRequest::new(7))?, Outcome::handled("Director"));
//! assert_eq!(sink.messages(), vec!["Director approved the request."]);
//! # Ok(())
//! # }
//! ```

pub mod approver;
pub mod desk;
pub mod sink;

pub use approver::{build_approval_chain, LeaveRequest, ThresholdApprover};
pub use desk::ApprovalDesk;
pub use sink::{ApprovalEvent, ApprovalSink, ConsoleSink, RecordingSink, TracingSink};
