//! # Chain Handlers
//!
//! The handler abstraction: one unit of local decision logic that the chain
//! consults in order.
//!
//! ## Example: Custom Handler
//!
//! ```rust
//! use handler_chain::chain::ChainHandler;
//! use handler_chain::error::HandlerResult;
//!
//! #[derive(Debug)]
//! struct EvenNumbers;
//!
//! impl ChainHandler<u32> for EvenNumbers {
//!     fn label(&self) -> &str {
//!         "EvenNumbers"
//!     }
//!
//!     fn can_handle(&self, request: &u32) -> HandlerResult<bool> {
//!         Ok(request % 2 == 0)
//!     }
//!
//!     fn handle(&self, _request: &u32) -> HandlerResult<()> {
//!         Ok(())
//!     }
//! }
//! ```

use crate::error::HandlerResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a handler inside the chain that registered it.
///
/// Ids are only meaningful for the chain that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HandlerId(pub(crate) usize);

impl HandlerId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node's decision logic.
///
/// ## Contract
///
/// - `can_handle` must not mutate the request or shared state, and must
///   terminate for any well-formed request.
/// - `handle` is only called after `can_handle` returned `Ok(true)` on the
///   same dispatch, and at most once per dispatch.
/// - Errors from either method abort the dispatch as a `HandlerFault`.
///
/// All handlers must be `Send + Sync` so one chain can serve dispatches from
/// several threads.
pub trait ChainHandler<R>: Send + Sync + fmt::Debug {
    /// Unique label, reported in `Outcome::Handled`.
    fn label(&self) -> &str;

    /// Whether this node can satisfy the request.
    fn can_handle(&self, request: &R) -> HandlerResult<bool>;

    /// Satisfy the request.
    fn handle(&self, request: &R) -> HandlerResult<()>;
}

type Predicate<R> = Box<dyn Fn(&R) -> HandlerResult<bool> + Send + Sync>;
type Action<R> = Box<dyn Fn(&R) -> HandlerResult<()> + Send + Sync>;

/// Handler assembled from a label, a predicate closure and an action closure.
pub struct FnHandler<R> {
    label: String,
    predicate: Predicate<R>,
    action: Action<R>,
}

impl<R> FnHandler<R> {
    /// Build a handler with an infallible predicate.
    pub fn new<P, A>(label: impl Into<String>, predicate: P, action: A) -> Self
    where
        P: Fn(&R) -> bool + Send + Sync + 'static,
        A: Fn(&R) -> HandlerResult<()> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            predicate: Box::new(move |request| Ok(predicate(request))),
            action: Box::new(action),
        }
    }

    /// Build a handler whose predicate may itself fail.
    pub fn fallible<P, A>(label: impl Into<String>, predicate: P, action: A) -> Self
    where
        P: Fn(&R) -> HandlerResult<bool> + Send + Sync + 'static,
        A: Fn(&R) -> HandlerResult<()> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            predicate: Box::new(predicate),
            action: Box::new(action),
        }
    }
}

impl<R> fmt::Debug for FnHandler<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler")
            .field("label", &self.label)
            .field("predicate", &"Fn")
            .field("action", &"Fn")
            .finish()
    }
}

impl<R> ChainHandler<R> for FnHandler<R> {
    fn label(&self) -> &str {
        &self.label
    }

    fn can_handle(&self, request: &R) -> HandlerResult<bool> {
        (self.predicate)(request)
    }

    fn handle(&self, request: &R) -> HandlerResult<()> {
        (self.action)(request)
    }
}
