use super::sink::{ApprovalEvent, ApprovalSink};
use crate::chain::{ChainHandler, HandlerChain};
use crate::config::{ApprovalTier, ChainSettings};
use crate::error::{ChainResult, HandlerResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A request for `days` days of leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub days: u32,
}

impl LeaveRequest {
    pub fn new(days: u32) -> Self {
        Self { days }
    }
}

impl fmt::Display for LeaveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} day(s) of leave", self.days)
    }
}

/// Approves requests in `(floor, ceiling]`; with no floor, `[0, ceiling]`.
#[derive(Debug)]
pub struct ThresholdApprover {
    label: String,
    floor: Option<u32>,
    ceiling: u32,
    sink: Arc<dyn ApprovalSink>,
}

impl ThresholdApprover {
    pub fn new(
        label: impl Into<String>,
        floor: Option<u32>,
        ceiling: u32,
        sink: Arc<dyn ApprovalSink>,
    ) -> Self {
        Self {
            label: label.into(),
            floor,
            ceiling,
            sink,
        }
    }

    pub fn floor(&self) -> Option<u32> {
        self.floor
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }
}

impl ChainHandler<LeaveRequest> for ThresholdApprover {
    fn label(&self) -> &str {
        &self.label
    }

    fn can_handle(&self, request: &LeaveRequest) -> HandlerResult<bool> {
        let above_floor = !self.floor.is_some_and(|floor| request.days <= floor);
        Ok(above_floor && request.days <= self.ceiling)
    }

    fn handle(&self, request: &LeaveRequest) -> HandlerResult<()> {
        self.sink.announce(&ApprovalEvent::Approved {
            approver: self.label.clone(),
            days: request.days,
        });
        Ok(())
    }
}

/// Build and wire one approver per tier, in tier order.
///
/// Each tier's floor is the previous tier's ceiling, so validated tiers
/// produce contiguous, non-overlapping ranges.
pub fn build_approval_chain(
    tiers: &[ApprovalTier],
    sink: Arc<dyn ApprovalSink>,
    settings: ChainSettings,
) -> ChainResult<HandlerChain<LeaveRequest>> {
    let mut chain = HandlerChain::with_settings(settings);
    let mut floor = None;

    for tier in tiers {
        chain.append(Arc::new(ThresholdApprover::new(
            tier.label.clone(),
            floor,
            tier.max_days,
            Arc::clone(&sink),
        )))?;
        floor = Some(tier.max_days);
    }

    Ok(chain)
}
