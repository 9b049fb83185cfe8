use super::approver::{build_approval_chain, LeaveRequest};
use super::sink::{ApprovalEvent, ApprovalSink};
use crate::chain::{HandlerChain, Outcome};
use crate::config::HandlerChainConfig;
use crate::error::ChainResult;
use crate::logging::{log_dispatch_operation, log_error};
use std::sync::Arc;

/// Front desk for leave requests.
///
/// Submits each request to the approval chain and, when nobody approves it,
/// announces that on the same sink the approvers use. A `HandlerFault` is
/// logged and returned; it is not turned into a "no approver" announcement.
#[derive(Debug)]
pub struct ApprovalDesk {
    chain: HandlerChain<LeaveRequest>,
    sink: Arc<dyn ApprovalSink>,
}

impl ApprovalDesk {
    pub fn new(chain: HandlerChain<LeaveRequest>, sink: Arc<dyn ApprovalSink>) -> Self {
        Self { chain, sink }
    }

    /// Wire the configured tiers with the configured chain settings.
    pub fn from_config(
        config: &HandlerChainConfig,
        sink: Arc<dyn ApprovalSink>,
    ) -> ChainResult<Self> {
        let chain = build_approval_chain(
            &config.approval.tiers,
            Arc::clone(&sink),
            config.chain.clone(),
        )?;
        Ok(Self::new(chain, sink))
    }

    pub fn chain(&self) -> &HandlerChain<LeaveRequest> {
        &self.chain
    }

    pub fn submit(&self, request: LeaveRequest) -> ChainResult<Outcome> {
        let outcome = match self.chain.dispatch(&request) {
            Ok(outcome) => outcome,
            Err(error) => {
                log_error(
                    "approval_desk",
                    "submit",
                    &error.to_string(),
                    Some(&request.to_string()),
                );
                return Err(error);
            }
        };

        match &outcome {
            Outcome::Handled { by } => {
                log_dispatch_operation("submit", "approval", Some(by.as_str()), "handled", None);
            }
            Outcome::Unhandled => {
                self.sink
                    .announce(&ApprovalEvent::NoApprover { days: request.days });
                log_dispatch_operation(
                    "submit",
                    "approval",
                    None,
                    "unhandled",
                    Some(&request.to_string()),
                );
            }
        }

        Ok(outcome)
    }

    /// Submit several requests in order, stopping at the first fault.
    pub fn submit_all<I>(&self, requests: I) -> ChainResult<Vec<Outcome>>
    where
        I: IntoIterator<Item = LeaveRequest>,
    {
        requests.into_iter().map(|r| self.submit(r)).collect()
    }
}
