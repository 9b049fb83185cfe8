//! # Handler Chain Configuration
//!
//! Explicit, validated configuration for chain wiring and the approval tiers.
//!
//! ## Sources
//!
//! Loaded by [`ConfigManager`] through the `config` crate, later sources
//! overriding earlier ones:
//!
//! 1. `config/handler-chain.toml` (optional)
//! 2. `config/handler-chain.<environment>.toml` (optional)
//! 3. Environment variables `HANDLER_CHAIN__<SECTION>__<KEY>`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use handler_chain::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let guard_enabled = manager.config().chain.cycle_guard;
//! let tiers = &manager.config().approval.tiers;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure mirroring handler-chain.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HandlerChainConfig {
    /// Chain wiring and dispatch settings
    pub chain: ChainSettings,

    /// Leave-approval tiers
    pub approval: ApprovalConfig,
}

impl HandlerChainConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        self.chain.validate()?;
        self.approval.validate()?;

        if self.approval.tiers.len() > self.chain.max_handlers {
            return Err(ConfigurationError::validation_error(format!(
                "{} approval tiers exceed chain.max_handlers ({})",
                self.approval.tiers.len(),
                self.chain.max_handlers
            )));
        }
        Ok(())
    }
}

/// Chain wiring and dispatch settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainSettings {
    /// Bound every dispatch by the number of registered handlers and fail
    /// with `MalformedChain` when exceeded
    pub cycle_guard: bool,

    /// Maximum number of handlers a chain accepts
    pub max_handlers: usize,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            cycle_guard: true,
            max_handlers: 64,
        }
    }
}

impl ChainSettings {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_handlers == 0 {
            return Err(ConfigurationError::invalid_value(
                "chain.max_handlers",
                "0",
                "a chain must be able to hold at least one handler",
            ));
        }
        Ok(())
    }
}

/// One approval tier: accepts requests above the previous tier's ceiling up
/// to and including `max_days`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApprovalTier {
    pub label: String,
    pub max_days: u32,
}

impl ApprovalTier {
    pub fn new(label: impl Into<String>, max_days: u32) -> Self {
        Self {
            label: label.into(),
            max_days,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApprovalConfig {
    /// Tiers in escalation order
    pub tiers: Vec<ApprovalTier>,
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            tiers: vec![
                ApprovalTier::new("Manager", 5),
                ApprovalTier::new("Director", 10),
                ApprovalTier::new("CEO", 15),
            ],
        }
    }
}

impl ApprovalConfig {
    /// Labels must be non-empty and unique; ceilings strictly increasing.
    pub fn validate(&self) -> ConfigResult<()> {
        let mut seen = HashSet::new();
        let mut previous: Option<&ApprovalTier> = None;

        for (index, tier) in self.tiers.iter().enumerate() {
            if tier.label.trim().is_empty() {
                return Err(ConfigurationError::invalid_value(
                    format!("approval.tiers[{index}].label"),
                    tier.label.clone(),
                    "tier label must not be empty",
                ));
            }
            if !seen.insert(tier.label.as_str()) {
                return Err(ConfigurationError::invalid_value(
                    format!("approval.tiers[{index}].label"),
                    tier.label.clone(),
                    "tier labels must be unique",
                ));
            }
            if let Some(prev) = previous {
                if tier.max_days <= prev.max_days {
                    return Err(ConfigurationError::invalid_value(
                        format!("approval.tiers[{index}].max_days"),
                        tier.max_days.to_string(),
                        format!(
                            "must be greater than '{}' ceiling of {}",
                            prev.label, prev.max_days
                        ),
                    ));
                }
            }
            previous = Some(tier);
        }
        Ok(())
    }
}
