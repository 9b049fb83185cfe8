//! Chain Dispatch Integration Tests
//!
//! Wiring and dispatch behaviour of `HandlerChain` with instrumented handlers.

use handler_chain::{
    ChainError, ChainHandler, FaultStage, FnHandler, HandlerChain, HandlerError, HandlerResult,
    Outcome,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Handler that counts how often each half is called.
#[derive(Debug)]
struct CountingHandler {
    label: String,
    accepts: fn(&u32) -> bool,
    predicate_calls: AtomicUsize,
    action_calls: AtomicUsize,
}

impl CountingHandler {
    fn new(label: &str, accepts: fn(&u32) -> bool) -> Arc<Self> {
        Arc::new(Self {
            label: label.to_string(),
            accepts,
            predicate_calls: AtomicUsize::new(0),
            action_calls: AtomicUsize::new(0),
        })
    }

    fn predicate_calls(&self) -> usize {
        self.predicate_calls.load(Ordering::SeqCst)
    }

    fn action_calls(&self) -> usize {
        self.action_calls.load(Ordering::SeqCst)
    }
}

impl ChainHandler<u32> for CountingHandler {
    fn label(&self) -> &str {
        &self.label
    }

    fn can_handle(&self, request: &u32) -> HandlerResult<bool> {
        self.predicate_calls.fetch_add(1, Ordering::SeqCst);
        Ok((self.accepts)(request))
    }

    fn handle(&self, _request: &u32) -> HandlerResult<()> {
        self.action_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn explicit_wiring_with_set_successor() {
    let mut chain: HandlerChain<u32> = HandlerChain::new();
    let ceo = chain.register(CountingHandler::new("CEO", |d| *d > 10 && *d <= 15)).unwrap();
    let director = chain
        .register(CountingHandler::new("Director", |d| *d > 5 && *d <= 10))
        .unwrap();
    let manager = chain.register(CountingHandler::new("Manager", |d| *d <= 5)).unwrap();

    chain.set_successor(manager, Some(director)).unwrap();
    chain.set_successor(director, Some(ceo)).unwrap();
    chain.set_successor(ceo, None).unwrap();

    // Registered but no head yet: nothing is reachable.
    assert_eq!(chain.dispatch(&3).unwrap(), Outcome::Unhandled);

    chain.set_head(Some(manager)).unwrap();
    assert_eq!(chain.labels_in_order(), vec!["Manager", "Director", "CEO"]);
    assert_eq!(chain.dispatch(&3).unwrap(), Outcome::handled("Manager"));
    assert_eq!(chain.dispatch_from(Some(manager), &12).unwrap(), Outcome::handled("CEO"));
    assert_eq!(chain.dispatch_from(None, &12).unwrap(), Outcome::Unhandled);
}

#[test]
fn predicates_evaluated_once_per_visited_node() {
    let first = CountingHandler::new("First", |_| false);
    let second = CountingHandler::new("Second", |_| true);
    let third = CountingHandler::new("Third", |_| true);

    let mut chain: HandlerChain<u32> = HandlerChain::new();
    chain.append(first.clone()).unwrap();
    chain.append(second.clone()).unwrap();
    chain.append(third.clone()).unwrap();

    assert_eq!(chain.dispatch(&1).unwrap(), Outcome::handled("Second"));

    assert_eq!(first.predicate_calls(), 1);
    assert_eq!(second.predicate_calls(), 1);
    assert_eq!(third.predicate_calls(), 0);
}

#[test]
fn rejecting_handlers_never_act() {
    let low = CountingHandler::new("Low", |d| *d < 10);
    let high = CountingHandler::new("High", |d| *d >= 10 && *d < 20);

    let mut chain: HandlerChain<u32> = HandlerChain::new();
    chain.append(low.clone()).unwrap();
    chain.append(high.clone()).unwrap();

    assert_eq!(chain.dispatch(&50).unwrap(), Outcome::Unhandled);
    assert_eq!(low.action_calls(), 0);
    assert_eq!(high.action_calls(), 0);

    assert_eq!(chain.dispatch(&15).unwrap(), Outcome::handled("High"));
    assert_eq!(low.action_calls(), 0);
    assert_eq!(high.action_calls(), 1);
}

#[test]
fn overlap_resolved_by_wiring_order_not_specificity() {
    let general = CountingHandler::new("General", |_| true);
    let specific = CountingHandler::new("Specific", |d| *d == 7);

    let mut chain: HandlerChain<u32> = HandlerChain::new();
    let g = chain.append(general.clone()).unwrap();
    let s = chain.append(specific.clone()).unwrap();

    assert_eq!(chain.dispatch(&7).unwrap(), Outcome::handled("General"));
    assert_eq!(specific.predicate_calls(), 0);

    // Rewire so the specific handler goes first.
    chain.set_successor(g, None).unwrap();
    chain.set_successor(s, Some(g)).unwrap();
    chain.set_head(Some(s)).unwrap();

    assert_eq!(chain.dispatch(&7).unwrap(), Outcome::handled("Specific"));
    assert_eq!(chain.dispatch(&8).unwrap(), Outcome::handled("General"));
}

#[test]
fn fault_carries_label_and_caller_may_resume() {
    let fallback = CountingHandler::new("Fallback", |_| true);

    let mut chain: HandlerChain<u32> = HandlerChain::new();
    chain
        .append(Arc::new(FnHandler::new(
            "Auditor",
            |_: &u32| true,
            |_: &u32| Err(HandlerError::new("audit log unavailable")),
        )))
        .unwrap();
    chain.append(fallback.clone()).unwrap();

    let error = chain.dispatch(&4).unwrap_err();
    assert_eq!(
        error,
        ChainError::HandlerFault {
            label: "Auditor".to_string(),
            stage: FaultStage::Action,
            reason: "audit log unavailable".to_string(),
        }
    );
    // The chain did not move on by itself.
    assert_eq!(fallback.predicate_calls(), 0);

    let label = error.faulted_handler().unwrap();
    assert_eq!(chain.resume_after(label, &4).unwrap(), Outcome::handled("Fallback"));
    assert_eq!(fallback.action_calls(), 1);
}

#[test]
fn cycles_cannot_be_wired() {
    let mut chain: HandlerChain<u32> = HandlerChain::new();
    let a = chain.append(CountingHandler::new("A", |_| false)).unwrap();
    let b = chain.append(CountingHandler::new("B", |_| false)).unwrap();

    let error = chain.set_successor(b, Some(a)).unwrap_err();
    assert!(matches!(error, ChainError::MalformedChain { .. }));

    // Topology unchanged and dispatch still terminates.
    assert_eq!(chain.labels_in_order(), vec!["A", "B"]);
    assert_eq!(chain.dispatch(&1).unwrap(), Outcome::Unhandled);
}

#[test]
fn handler_lookup_by_label() {
    let mut chain: HandlerChain<u32> = HandlerChain::new();
    let id = chain.append(CountingHandler::new("Lookup", |_| true)).unwrap();

    assert_eq!(chain.find("Lookup"), Some(id));
    assert_eq!(chain.find("Missing"), None);
    assert_eq!(chain.handler(id).unwrap().label(), "Lookup");
}
