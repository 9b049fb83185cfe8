//! # Sequential Handler Chain
//!
//! A request is offered to an ordered, acyclic sequence of handlers. Each
//! handler decides locally whether it can satisfy the request; the first one
//! that can, does, and the dispatch ends there. If none can, the dispatch
//! ends `Unhandled`.
//!
//! ## Architecture
//!
//! ```text
//! HandlerChain
//! ├── nodes: [ChainNode]        (arena, addressed by HandlerId)
//! │     ├── handler: Arc<dyn ChainHandler<R>>
//! │     └── successor: Option<HandlerId>
//! ├── head: Option<HandlerId>
//! └── settings: ChainSettings   (cycle guard, capacity)
//! ```
//!
//! - [`ChainHandler`] - the `{label, can_handle, handle}` capability set
//! - [`FnHandler`] - closure-backed handler
//! - [`HandlerChain`] - wiring and dispatch
//! - [`Outcome`] / [`DispatchReport`] - dispatch results
//! - [`DispatchState`] - per-dispatch traversal state

pub mod handler;
pub mod handler_chain;
pub mod outcome;
pub mod state;

pub use handler::{ChainHandler, FnHandler, HandlerId};
pub use handler_chain::{HandlerChain, HandlerChainStats};
pub use outcome::{DispatchReport, Outcome};
pub use state::DispatchState;
