use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::tags::{TraitDomain, UNTAGGED};

/// A unique identifier for a belief node.
/// Generated as UUID v4 hex (no dashes).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BeliefId(pub String);

impl BeliefId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().as_simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BeliefId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BeliefId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BeliefId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A single belief held by the agent.
///
/// Nodes are owned by a [`Lattice`](super::Lattice), which only hands out
/// shared references; confidence and tag invariants are maintained there.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BeliefNode {
    pub id: BeliefId,
    pub content: String,
    /// Always within [0, 1].
    pub confidence: f64,
    /// Free-form provenance: author role, or `synthesis:<belief>:<condition>`.
    pub source: String,
    /// Never empty; `["untagged"]` when no trait pattern matched.
    pub tags: Vec<String>,
    pub created_step: u64,
    pub last_active_step: u64,
}

impl BeliefNode {
    /// First tag, used as the merge key.
    pub fn primary_tag(&self) -> &str {
        self.tags.first().map(String::as_str).unwrap_or(UNTAGGED)
    }

    /// Tags that belong to the fixed eight trait domains.
    pub fn domains(&self) -> impl Iterator<Item = TraitDomain> + '_ {
        self.tags.iter().filter_map(|t| TraitDomain::from_tag(t))
    }

    /// True when both nodes carry at least one common trait-domain tag.
    pub fn shares_domain_with(&self, other: &BeliefNode) -> bool {
        self.domains().any(|d| other.domains().any(|o| o == d))
    }

    pub fn is_synthesized(&self) -> bool {
        self.source.starts_with("synthesis:")
    }
}

pub(crate) fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
