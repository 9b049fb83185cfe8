//! # Handler Chain
//!
//! Ordered, acyclic chain of handlers with first-match-wins dispatch.
//!
//! ## Dispatch Flow
//!
//! ```text
//!  request ──► head ──can_handle?──yes──► handle ──► Handled { by }
//!                │
//!                no
//!                ▼
//!             successor ──can_handle?── ... ──► (no successor) ──► Unhandled
//! ```
//!
//! ## Wiring
//!
//! Handlers live in an arena owned by the chain and are addressed by
//! [`HandlerId`]. Each node holds an optional successor id. `set_successor`
//! refuses any link that would close a cycle, so a chain wired only through
//! this API is always a simple path. Dispatch additionally counts steps
//! (when `ChainSettings::cycle_guard` is on) and stops with
//! `ChainError::MalformedChain` once it has taken more steps than there are
//! handlers.
//!
//! ## Example Usage
//!
//! ```rust
//! use handler_chain::chain::{FnHandler, HandlerChain, Outcome};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut chain: HandlerChain<u32> = HandlerChain::new();
//! chain.append(Arc::new(FnHandler::new("small", |n: &u32| *n <= 5, |_: &u32| Ok(()))))?;
//! chain.append(Arc::new(FnHandler::new("large", |n: &u32| *n > 5, |_: &u32| Ok(()))))?;
//!
//! assert_eq!(chain.dispatch(&3)?, Outcome::handled("small"));
//! assert_eq!(chain.dispatch(&9)?, Outcome::handled("large"));
//! # Ok(())
//! # }
//! ```

use super::handler::{ChainHandler, HandlerId};
use super::outcome::{DispatchReport, Outcome};
use super::state::DispatchState;
use crate::config::ChainSettings;
use crate::error::{ChainError, ChainResult, FaultStage};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, trace, warn};
use uuid::Uuid;

struct ChainNode<R> {
    handler: Arc<dyn ChainHandler<R>>,
    successor: Option<HandlerId>,
}

/// An ordered, acyclic sequence of handlers with a designated head.
///
/// ## Thread Safety
///
/// Dispatch takes `&self` and mutates nothing, so a wired chain can be
/// shared (e.g. behind an `Arc`) and dispatched from many threads. Rewiring
/// needs `&mut self`.
pub struct HandlerChain<R> {
    nodes: Vec<ChainNode<R>>,
    by_label: HashMap<String, HandlerId>,
    head: Option<HandlerId>,
    settings: ChainSettings,
}

impl<R> Default for HandlerChain<R> {
    fn default() -> Self {
        Self::with_settings(ChainSettings::default())
    }
}

impl<R> fmt::Debug for HandlerChain<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerChain")
            .field(
                "handlers",
                &self
                    .nodes
                    .iter()
                    .map(|n| n.handler.label())
                    .collect::<Vec<_>>(),
            )
            .field("head", &self.head)
            .field("settings", &self.settings)
            .finish()
    }
}

impl<R> HandlerChain<R> {
    /// Create an empty chain with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_settings(settings: ChainSettings) -> Self {
        Self {
            nodes: Vec::new(),
            by_label: HashMap::new(),
            head: None,
            settings,
        }
    }

    pub fn settings(&self) -> &ChainSettings {
        &self.settings
    }

    /// Number of registered handlers (wired or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Register a handler without wiring it.
    ///
    /// The handler is unreachable until it becomes the head or some node's
    /// successor.
    pub fn register(&mut self, handler: Arc<dyn ChainHandler<R>>) -> ChainResult<HandlerId> {
        if self.nodes.len() >= self.settings.max_handlers {
            return Err(ChainError::CapacityExceeded {
                max_handlers: self.settings.max_handlers,
            });
        }

        let label = handler.label().to_string();
        if self.by_label.contains_key(&label) {
            return Err(ChainError::DuplicateLabel { label });
        }

        let id = HandlerId(self.nodes.len());
        self.nodes.push(ChainNode {
            handler,
            successor: None,
        });
        debug!(handler = %label, id = %id, "Registered handler");
        self.by_label.insert(label, id);
        Ok(id)
    }

    /// Register a handler and link it after the current tail.
    ///
    /// On an empty chain (no head) the handler becomes the head.
    pub fn append(&mut self, handler: Arc<dyn ChainHandler<R>>) -> ChainResult<HandlerId> {
        let tail = self.tail()?;
        let id = self.register(handler)?;
        match tail {
            Some(tail) => self.set_successor(tail, Some(id))?,
            None => self.head = Some(id),
        }
        Ok(id)
    }

    /// Designate the node dispatch starts from. `None` empties the chain's
    /// traversal without unregistering anything.
    pub fn set_head(&mut self, head: Option<HandlerId>) -> ChainResult<()> {
        if let Some(id) = head {
            self.node(id)?;
        }
        self.head = head;
        Ok(())
    }

    pub fn head(&self) -> Option<HandlerId> {
        self.head
    }

    /// Point `handler` at `next` (or detach its successor with `None`).
    ///
    /// Rejects links that would make the successor relation cyclic; the
    /// chain is left unchanged in that case.
    pub fn set_successor(&mut self, handler: HandlerId, next: Option<HandlerId>) -> ChainResult<()> {
        self.node(handler)?;

        if let Some(next) = next {
            self.node(next)?;
            if let Some(steps) = self.reaches(next, handler) {
                warn!(
                    handler = self.label_of(handler),
                    next = self.label_of(next),
                    "Rejected successor link that would create a cycle"
                );
                return Err(ChainError::malformed(
                    format!(
                        "linking '{}' to '{}' would create a cycle",
                        self.label_of(handler),
                        self.label_of(next)
                    ),
                    steps,
                ));
            }
        }

        self.nodes[handler.0].successor = next;
        trace!(
            handler = self.label_of(handler),
            next = next.map(|id| self.label_of(id)),
            "Successor updated"
        );
        Ok(())
    }

    pub fn successor_of(&self, handler: HandlerId) -> ChainResult<Option<HandlerId>> {
        Ok(self.node(handler)?.successor)
    }

    /// Look up a handler id by label.
    pub fn find(&self, label: &str) -> Option<HandlerId> {
        self.by_label.get(label).copied()
    }

    pub fn handler(&self, id: HandlerId) -> ChainResult<&Arc<dyn ChainHandler<R>>> {
        Ok(&self.node(id)?.handler)
    }

    /// Labels reachable from the head, in traversal order.
    pub fn labels_in_order(&self) -> Vec<&str> {
        let mut labels = Vec::new();
        let mut current = self.head;
        while let Some(id) = current {
            // Wiring forbids cycles; the bound only matters if that invariant breaks.
            if labels.len() >= self.nodes.len() {
                break;
            }
            labels.push(self.label_of(id));
            current = self.nodes[id.0].successor;
        }
        labels
    }

    /// Dispatch a request starting at the head.
    pub fn dispatch(&self, request: &R) -> ChainResult<Outcome> {
        self.dispatch_from(self.head, request)
    }

    /// Dispatch a request starting at `start`; `None` yields `Unhandled`.
    pub fn dispatch_from(&self, start: Option<HandlerId>, request: &R) -> ChainResult<Outcome> {
        self.traverse(start, request, |_| {})
    }

    /// Dispatch from the node after the handler labelled `label`.
    ///
    /// This is the restart policy for a `HandlerFault`: the caller may
    /// decide to skip the faulting handler and continue down the chain.
    pub fn resume_after(&self, label: &str, request: &R) -> ChainResult<Outcome> {
        let id = self.find(label).ok_or_else(|| ChainError::UnknownLabel {
            label: label.to_string(),
        })?;
        let start = self.successor_of(id)?;
        self.dispatch_from(start, request)
    }

    /// Dispatch from the head and report every node that was asked.
    #[instrument(skip(self, request), fields(correlation_id = tracing::field::Empty))]
    pub fn dispatch_traced(&self, request: &R) -> ChainResult<DispatchReport> {
        let correlation_id = Uuid::new_v4();
        tracing::Span::current().record("correlation_id", tracing::field::display(correlation_id));

        let mut visited = Vec::new();
        let outcome = self.traverse(self.head, request, |label| visited.push(label.to_string()))?;

        debug!(
            correlation_id = %correlation_id,
            visited = visited.len(),
            outcome = %outcome,
            "Dispatch completed"
        );

        Ok(DispatchReport {
            correlation_id,
            visited,
            outcome,
        })
    }

    /// Chain statistics.
    #[must_use]
    pub fn stats(&self) -> HandlerChainStats {
        let wired: Vec<String> = self
            .labels_in_order()
            .into_iter()
            .map(String::from)
            .collect();
        HandlerChainStats {
            handler_count: self.nodes.len(),
            unreachable_count: self.nodes.len() - wired.len(),
            traversal_order: wired,
        }
    }

    fn traverse<F>(&self, start: Option<HandlerId>, request: &R, mut on_visit: F) -> ChainResult<Outcome>
    where
        F: FnMut(&str),
    {
        let mut state = DispatchState::start(start);
        let mut steps = 0usize;

        loop {
            let current = match &state {
                DispatchState::Terminated(outcome) => {
                    trace!(steps, outcome = %outcome, "Dispatch terminated");
                    return Ok(outcome.clone());
                }
                DispatchState::Traversing { current } => *current,
            };

            steps += 1;
            if self.settings.cycle_guard && steps > self.nodes.len() {
                warn!(steps, handlers = self.nodes.len(), "Dispatch exceeded chain length");
                return Err(ChainError::malformed(
                    "dispatch visited more nodes than the chain holds",
                    steps,
                ));
            }

            let node = self.node(current)?;
            let label = node.handler.label();
            on_visit(label);

            let accepts = node
                .handler
                .can_handle(request)
                .map_err(|e| ChainError::fault(label, FaultStage::Predicate, e))?;

            if accepts {
                debug!(handler = label, "Handler accepted request");
                node.handler
                    .handle(request)
                    .map_err(|e| ChainError::fault(label, FaultStage::Action, e))?;
                state = state.accept(label);
            } else {
                trace!(handler = label, "Handler declined, passing to successor");
                state = state.advance(node.successor);
            }
        }
    }

    /// Number of successor steps from `from` to `to`, if `to` is reachable.
    fn reaches(&self, from: HandlerId, to: HandlerId) -> Option<usize> {
        let mut current = Some(from);
        let mut steps = 0usize;
        while let Some(id) = current {
            if id == to {
                return Some(steps);
            }
            steps += 1;
            if steps > self.nodes.len() {
                // Pre-existing cycle not involving `to`; cannot happen via set_successor.
                return Some(steps);
            }
            current = self.nodes[id.0].successor;
        }
        None
    }

    /// Last node reachable from the head.
    fn tail(&self) -> ChainResult<Option<HandlerId>> {
        let mut current = match self.head {
            Some(head) => head,
            None => return Ok(None),
        };
        let mut steps = 0usize;
        while let Some(next) = self.nodes[current.0].successor {
            steps += 1;
            if steps > self.nodes.len() {
                return Err(ChainError::malformed("tail search did not terminate", steps));
            }
            current = next;
        }
        Ok(Some(current))
    }

    fn node(&self, id: HandlerId) -> ChainResult<&ChainNode<R>> {
        self.nodes.get(id.0).ok_or(ChainError::UnknownHandler { id })
    }

    fn label_of(&self, id: HandlerId) -> &str {
        self.nodes[id.0].handler.label()
    }
}

/// Statistics about a handler chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerChainStats {
    /// Number of registered handlers
    pub handler_count: usize,

    /// Registered handlers not reachable from the head
    pub unreachable_count: usize,

    /// Labels reachable from the head, in order
    pub traversal_order: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::FnHandler;
    use crate::error::HandlerError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn threshold(label: &str, max: u32) -> Arc<dyn ChainHandler<u32>> {
        Arc::new(FnHandler::new(label, move |n: &u32| *n <= max, |_: &u32| Ok(())))
    }

    #[test]
    fn test_empty_chain() {
        let chain: HandlerChain<u32> = HandlerChain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.len(), 0);
        assert!(chain.head().is_none());
        assert_eq!(chain.dispatch(&1), Ok(Outcome::Unhandled));
    }

    #[test]
    fn test_append_wires_in_order() {
        let mut chain: HandlerChain<u32> = HandlerChain::new();
        let first = chain.append(threshold("First", 5)).unwrap();
        let second = chain.append(threshold("Second", 10)).unwrap();

        assert_eq!(chain.head(), Some(first));
        assert_eq!(chain.successor_of(first), Ok(Some(second)));
        assert_eq!(chain.successor_of(second), Ok(None));
        assert_eq!(chain.labels_in_order(), vec!["First", "Second"]);
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let mut chain: HandlerChain<u32> = HandlerChain::new();
        chain.append(threshold("Same", 5)).unwrap();

        let result = chain.append(threshold("Same", 10));
        assert_eq!(
            result,
            Err(ChainError::DuplicateLabel {
                label: "Same".to_string()
            })
        );
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_capacity_enforced() {
        let mut chain: HandlerChain<u32> = HandlerChain::with_settings(ChainSettings {
            max_handlers: 1,
            ..ChainSettings::default()
        });
        chain.append(threshold("Only", 5)).unwrap();

        assert_eq!(
            chain.append(threshold("Extra", 10)),
            Err(ChainError::CapacityExceeded { max_handlers: 1 })
        );
    }

    #[test]
    fn test_self_loop_rejected() {
        let mut chain: HandlerChain<u32> = HandlerChain::new();
        let a = chain.register(threshold("A", 5)).unwrap();

        let result = chain.set_successor(a, Some(a));
        assert!(matches!(result, Err(ChainError::MalformedChain { .. })));
        assert_eq!(chain.successor_of(a), Ok(None));
    }

    #[test]
    fn test_transitive_cycle_rejected() {
        let mut chain: HandlerChain<u32> = HandlerChain::new();
        let a = chain.append(threshold("A", 1)).unwrap();
        let _b = chain.append(threshold("B", 2)).unwrap();
        let c = chain.append(threshold("C", 3)).unwrap();

        let result = chain.set_successor(c, Some(a));
        match result {
            Err(ChainError::MalformedChain { reason, steps }) => {
                assert!(reason.contains("'C'"));
                assert_eq!(steps, 2);
            }
            other => panic!("expected MalformedChain, got {other:?}"),
        }
        assert_eq!(chain.successor_of(c), Ok(None));
    }

    #[test]
    fn test_rewiring_to_skip_node_is_allowed() {
        let mut chain: HandlerChain<u32> = HandlerChain::new();
        let a = chain.append(threshold("A", 1)).unwrap();
        let _b = chain.append(threshold("B", 2)).unwrap();
        let c = chain.append(threshold("C", 3)).unwrap();

        chain.set_successor(a, Some(c)).unwrap();
        assert_eq!(chain.labels_in_order(), vec!["A", "C"]);
        assert_eq!(chain.stats().unreachable_count, 1);
        assert_eq!(chain.dispatch(&2), Ok(Outcome::handled("C")));
    }

    #[test]
    fn test_unknown_handler_id() {
        let mut chain: HandlerChain<u32> = HandlerChain::new();
        let bogus = HandlerId(7);

        assert_eq!(
            chain.set_head(Some(bogus)),
            Err(ChainError::UnknownHandler { id: bogus })
        );
        assert_eq!(
            chain.dispatch_from(Some(bogus), &1),
            Err(ChainError::UnknownHandler { id: bogus })
        );
    }

    #[test]
    fn test_dispatch_from_none_is_unhandled() {
        let mut chain: HandlerChain<u32> = HandlerChain::new();
        chain.append(threshold("Any", u32::MAX)).unwrap();
        assert_eq!(chain.dispatch_from(None, &1), Ok(Outcome::Unhandled));
    }

    #[test]
    fn test_dispatch_from_mid_chain_skips_earlier_nodes() {
        let mut chain: HandlerChain<u32> = HandlerChain::new();
        chain.append(threshold("Low", 5)).unwrap();
        let high = chain.append(threshold("High", 10)).unwrap();

        assert_eq!(chain.dispatch_from(Some(high), &3), Ok(Outcome::handled("High")));
    }

    #[test]
    fn test_first_match_wins_on_overlap() {
        let mut chain: HandlerChain<u32> = HandlerChain::new();
        chain.append(threshold("Broad", 100)).unwrap();
        chain.append(threshold("Narrow", 10)).unwrap();

        assert_eq!(chain.dispatch(&5), Ok(Outcome::handled("Broad")));
    }

    #[test]
    fn test_predicate_fault_aborts_dispatch() {
        let later_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&later_calls);

        let mut chain: HandlerChain<u32> = HandlerChain::new();
        chain
            .append(Arc::new(FnHandler::fallible(
                "Broken",
                |_: &u32| Err(HandlerError::new("predicate blew up")),
                |_: &u32| Ok(()),
            )))
            .unwrap();
        chain
            .append(Arc::new(FnHandler::new(
                "Later",
                move |_: &u32| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    true
                },
                |_: &u32| Ok(()),
            )))
            .unwrap();

        let result = chain.dispatch(&1);
        assert_eq!(
            result,
            Err(ChainError::HandlerFault {
                label: "Broken".to_string(),
                stage: FaultStage::Predicate,
                reason: "predicate blew up".to_string(),
            })
        );
        assert_eq!(later_calls.load(Ordering::SeqCst), 0);

        assert_eq!(chain.resume_after("Broken", &1), Ok(Outcome::handled("Later")));
        assert_eq!(later_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_action_fault_reports_action_stage() {
        let mut chain: HandlerChain<u32> = HandlerChain::new();
        chain
            .append(Arc::new(FnHandler::new(
                "Clumsy",
                |_: &u32| true,
                |_: &u32| Err(HandlerError::new("could not record approval")),
            )))
            .unwrap();

        let error = chain.dispatch(&1).unwrap_err();
        assert!(matches!(
            error,
            ChainError::HandlerFault {
                stage: FaultStage::Action,
                ..
            }
        ));
        assert_eq!(error.faulted_handler(), Some("Clumsy"));
    }

    #[test]
    fn test_resume_after_unknown_label() {
        let chain: HandlerChain<u32> = HandlerChain::new();
        assert!(matches!(
            chain.resume_after("Ghost", &1),
            Err(ChainError::UnknownLabel { .. })
        ));
    }

    #[test]
    fn test_runtime_cycle_guard_stops_dispatch() {
        let mut chain: HandlerChain<u32> = HandlerChain::new();
        let a = chain.append(threshold("A", 0)).unwrap();
        let b = chain.append(threshold("B", 0)).unwrap();
        // Bypass wiring validation to simulate a corrupted topology.
        chain.nodes[b.0].successor = Some(a);

        let result = chain.dispatch(&1);
        match result {
            Err(ChainError::MalformedChain { steps, .. }) => assert_eq!(steps, 3),
            other => panic!("expected MalformedChain, got {other:?}"),
        }
        assert_eq!(chain.labels_in_order(), vec!["A", "B"]);
    }

    #[test]
    fn test_traced_dispatch_records_visits() {
        let mut chain: HandlerChain<u32> = HandlerChain::new();
        chain.append(threshold("Manager", 5)).unwrap();
        chain.append(threshold("Director", 10)).unwrap();
        chain.append(threshold("CEO", 15)).unwrap();

        let report = chain.dispatch_traced(&7).unwrap();
        assert_eq!(report.visited, vec!["Manager", "Director"]);
        assert_eq!(report.outcome, Outcome::handled("Director"));

        let report = chain.dispatch_traced(&18).unwrap();
        assert_eq!(report.visited, vec!["Manager", "Director", "CEO"]);
        assert_eq!(report.outcome, Outcome::Unhandled);
    }

    #[test]
    fn test_stats() {
        let mut chain: HandlerChain<u32> = HandlerChain::new();
        chain.append(threshold("First", 1)).unwrap();
        chain.register(threshold("Detached", 2)).unwrap();

        let stats = chain.stats();
        assert_eq!(stats.handler_count, 2);
        assert_eq!(stats.unreachable_count, 1);
        assert_eq!(stats.traversal_order, vec!["First"]);
    }

    #[test]
    fn test_chain_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HandlerChain<u32>>();
    }
}
