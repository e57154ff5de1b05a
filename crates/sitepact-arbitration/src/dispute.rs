//! # Dispute Lifecycle
//!
//! The dispute record and its two-state machine.
//!
//! ## States
//!
//! ```text
//! Open ──resolve()──▶ Resolved (terminal)
//! ```
//!
//! A dispute is created `Open` when a party freezes its service's
//! settlement, collects evidence while `Open`, and becomes immutable the
//! moment a resolution is recorded. At most one dispute exists per
//! service: resolution terminates the service, so a second settlement
//! cycle never begins.

use serde::{Deserialize, Serialize};

use sitepact_core::{DisputeId, EscrowError, PartyId, ServiceId, Timestamp};
use sitepact_ledger::DisputeFavor;

use crate::evidence::Evidence;

// ─── Dispute State ───────────────────────────────────────────────────

/// The lifecycle state of a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeState {
    /// Collecting evidence; the service's settlement is frozen.
    Open,
    /// A mediator has allocated the residual. Terminal state.
    Resolved,
}

impl DisputeState {
    /// The canonical string name of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Resolved => "RESOLVED",
        }
    }

    /// Whether this state is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved)
    }
}

impl std::fmt::Display for DisputeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Resolution ──────────────────────────────────────────────────────

/// The mediator's ruling. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Which party received the residual balance.
    pub favor: DisputeFavor,
    /// The mediator's written reasoning.
    pub text: String,
    /// The mediator that ruled.
    pub resolved_by: PartyId,
    /// When the ruling was recorded.
    pub resolved_at: Timestamp,
}

// ─── The Dispute Record ──────────────────────────────────────────────

/// A dispute over one service's remaining locked value.
///
/// Holds a snapshot of the service's parties taken when the dispute was
/// raised, so authorization checks need no ledger lookup and cannot be
/// affected by anything that happens to the service afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dispute {
    /// Unique dispute identifier.
    pub id: DisputeId,
    /// The service whose settlement is frozen.
    pub service_id: ServiceId,
    /// The party that raised the dispute.
    pub opened_by: PartyId,
    /// The service's client at the time the dispute was raised.
    pub client: PartyId,
    /// The service's contractor at the time the dispute was raised.
    pub contractor: PartyId,
    /// When the dispute was raised.
    pub opened_at: Timestamp,
    /// Current lifecycle state.
    pub state: DisputeState,
    /// Append-only evidence, bounded by policy.
    pub evidence: Vec<Evidence>,
    /// The ruling, absent until resolved and immutable afterwards.
    pub resolution: Option<Resolution>,
}

impl Dispute {
    /// Create a new dispute in the `Open` state.
    pub(crate) fn open(
        id: DisputeId,
        service_id: ServiceId,
        opened_by: PartyId,
        client: PartyId,
        contractor: PartyId,
    ) -> Self {
        Self {
            id,
            service_id,
            opened_by,
            client,
            contractor,
            opened_at: Timestamp::now(),
            state: DisputeState::Open,
            evidence: Vec::new(),
            resolution: None,
        }
    }

    /// Whether the given identity is one of the two disputing parties.
    pub fn is_party(&self, caller: &PartyId) -> bool {
        *caller == self.client || *caller == self.contractor
    }

    /// Reject the action unless the dispute is still `Open`.
    pub(crate) fn ensure_open(&self, action: &str) -> Result<(), EscrowError> {
        if self.state != DisputeState::Open {
            return Err(EscrowError::InvalidState {
                subject: self.id.to_string(),
                state: self.state.to_string(),
                action: action.to_string(),
            });
        }
        Ok(())
    }

    /// Append an evidence item. Callers have already validated state,
    /// party, and policy bounds.
    pub(crate) fn push_evidence(&mut self, evidence: Evidence) {
        self.evidence.push(evidence);
    }

    /// Record the ruling and close the dispute.
    pub(crate) fn record_resolution(&mut self, resolution: Resolution) {
        self.resolution = Some(resolution);
        self.state = DisputeState::Resolved;
    }
}
