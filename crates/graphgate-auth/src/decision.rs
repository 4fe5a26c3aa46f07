//! Authorization decisions.
//!
//! A decision is constructed fresh per write, never persisted, and
//! never mutated after construction.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The trust source that authorized a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// The shared administrative secret matched.
    System,
    /// A live pre-authorization cache entry matched.
    Cache,
    /// An on-chain registry confirmed membership.
    Chain,
    /// A valid bearer token was presented.
    Token,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::System => "system",
            Tier::Cache => "cache",
            Tier::Chain => "chain",
            Tier::Token => "token",
        };
        f.write_str(name)
    }
}

/// Why a write was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// Every authorization tier fell through.
    NoMatchingTier,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::NoMatchingTier => f.write_str("no matching authorization tier"),
        }
    }
}

/// The outcome of resolving a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    /// The write may propagate.
    Allowed {
        /// Which tier authorized it.
        tier: Tier,
        /// Permissions attached by the tier (token tier only; other
        /// tiers attach none).
        permissions: BTreeSet<String>,
    },
    /// The write must be suppressed.
    Denied {
        /// Why nothing matched.
        reason: DenyReason,
    },
}

impl Decision {
    /// An allowed decision with no attached permissions.
    pub fn allowed(tier: Tier) -> Self {
        Decision::Allowed {
            tier,
            permissions: BTreeSet::new(),
        }
    }

    /// An allowed decision carrying a permission set.
    pub fn allowed_with_permissions(tier: Tier, permissions: BTreeSet<String>) -> Self {
        Decision::Allowed { tier, permissions }
    }

    /// The standard denial.
    pub fn denied() -> Self {
        Decision::Denied {
            reason: DenyReason::NoMatchingTier,
        }
    }

    /// Whether the write may propagate.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }

    /// The matching tier, if allowed.
    pub fn tier(&self) -> Option<Tier> {
        match self {
            Decision::Allowed { tier, .. } => Some(*tier),
            Decision::Denied { .. } => None,
        }
    }
}
