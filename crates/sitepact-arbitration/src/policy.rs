//! # Dispute Policy
//!
//! Operator-configurable bounds and mediator authority for the dispute
//! workflow. Evidence growth is capped by policy rather than left
//! unbounded, and resolution authority can be restricted to a roster of
//! known mediators instead of any uninvolved third party.

use serde::{Deserialize, Serialize};

use sitepact_core::PartyId;

/// Configuration for the dispute workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisputePolicy {
    /// Maximum evidence items per dispute.
    pub max_evidence_items: usize,
    /// Maximum size of one evidence item's content, in bytes.
    pub max_evidence_bytes: usize,
    /// Identities allowed to resolve disputes. When empty, any identity
    /// that is neither disputing party may resolve — the permissive mode
    /// the marketplace launched with.
    pub mediator_roster: Vec<PartyId>,
}

impl Default for DisputePolicy {
    fn default() -> Self {
        Self {
            max_evidence_items: 32,
            max_evidence_bytes: 8 * 1024,
            mediator_roster: Vec::new(),
        }
    }
}

impl DisputePolicy {
    /// Whether the caller satisfies the roster requirement. Party and
    /// null-identity checks happen elsewhere; this only consults the
    /// roster.
    pub fn permits_mediator(&self, caller: &PartyId) -> bool {
        self.mediator_roster.is_empty() || self.mediator_roster.contains(caller)
    }
}
