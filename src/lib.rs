#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Handler Chain
//!
//! Sequential handler chain with first-match-wins dispatch.
//!
//! ## Overview
//!
//! A request is offered to an ordered, acyclic sequence of handlers. Each
//! handler decides locally whether it can satisfy the request; the first
//! that can, handles it, and dispatch stops. If the chain is exhausted the
//! outcome is `Unhandled`, a normal result distinct from a handler fault.
//!
//! ## Module Organization
//!
//! - [`chain`] - handler trait, chain wiring and dispatch
//! - [`approval`] - the reference Manager / Director / CEO leave-approval chain
//! - [`config`] - TOML + environment configuration
//! - [`error`] - structured error handling
//! - [`logging`] - tracing initialisation and structured logging helpers
//!
//! ## Quick Start
//!
//! ```rust
//! use handler_chain::approval::{ApprovalDesk, LeaveRequest, TracingSink};
//! use handler_chain::config::HandlerChainConfig;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let desk = ApprovalDesk::from_config(&HandlerChainConfig::default(), Arc::new(TracingSink))?;
//!
//! let outcome = desk.submit(LeaveRequest::new(12))?;
//! assert_eq!(outcome.handled_by(), Some("CEO"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # All tests, including property tests
//! ```

pub mod approval;
pub mod chain;
pub mod config;
pub mod error;
pub mod logging;

pub use crate::chain::{ChainHandler, DispatchReport, FnHandler, HandlerChain, HandlerId, Outcome};
pub use crate::config::{ChainSettings, ConfigManager, HandlerChainConfig};
pub use crate::error::{ChainError, ChainResult, FaultStage, HandlerError, HandlerResult};
