//! # Service and Milestone Records
//!
//! The canonical record of a funded engagement and its milestone plan,
//! plus the service status machine.
//!
//! ## States
//!
//! ```text
//! Created ──confirm_acceptance()──▶ InProgress ──all milestones approved──▶ Completed
//!                                       │
//!                                 raise_dispute()
//!                                       │
//!                                       ▼
//!                                   Disputed ──resolve_dispute()──▶ Completed | Cancelled
//! ```
//!
//! `Created` is the sole initial state; `Completed` and `Cancelled` are
//! terminal. A terminal service is immutable — every mutating path checks
//! the status first.
//!
//! ## Invariants
//!
//! - The milestone amounts sum to `total_amount` for the service's entire
//!   lifetime; the plan is fixed at creation in count and amounts.
//! - `released_amount` never decreases and never exceeds `total_amount`.
//! - An approved milestone is completed, and is never mutated again.

use serde::{Deserialize, Serialize};

use sitepact_core::{Amount, PartyId, ServiceId, Timestamp, TradeCategory};

// ─── Service Status ──────────────────────────────────────────────────

/// The lifecycle status of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceStatus {
    /// Funded and waiting for the contractor to accept.
    Created,
    /// Accepted; milestones may be completed and approved.
    InProgress,
    /// All value settled. Terminal state.
    Completed,
    /// Settlement frozen pending arbitration.
    Disputed,
    /// Annulled with a full refund before any release. Terminal state.
    Cancelled,
}

impl ServiceStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Disputed => "DISPUTED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Whether this status is terminal (the record is immutable).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Valid target statuses from this status.
    pub fn valid_transitions(&self) -> &'static [ServiceStatus] {
        match self {
            Self::Created => &[Self::InProgress],
            Self::InProgress => &[Self::Completed, Self::Disputed],
            Self::Disputed => &[Self::Completed, Self::Cancelled],
            Self::Completed | Self::Cancelled => &[],
        }
    }
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Status Transition Record ────────────────────────────────────────

/// One entry in a service's append-only status history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusTransition {
    /// Status before the transition.
    pub from: ServiceStatus,
    /// Status after the transition.
    pub to: ServiceStatus,
    /// When the transition occurred.
    pub at: Timestamp,
    /// What caused it (e.g., "accepted by contractor").
    pub reason: String,
}

// ─── Milestones ──────────────────────────────────────────────────────

/// A milestone description and amount supplied at service creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneSpec {
    /// What the milestone delivers.
    pub description: String,
    /// The portion of the total released on approval.
    pub amount: Amount,
}

impl MilestoneSpec {
    /// Convenience constructor.
    pub fn new(description: impl Into<String>, amount: Amount) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }
}

/// A unit of work within a service, addressed as `(service_id, index)`.
///
/// Completion is the contractor's claim that the work is done; approval is
/// the client's sign-off that releases the milestone's amount. Each
/// milestone gates on its own `completed` flag only — there is no ordering
/// dependency between milestones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    /// What the milestone delivers.
    pub description: String,
    /// The portion of the total released on approval.
    pub amount: Amount,
    /// Whether the contractor has marked the work done.
    pub completed: bool,
    /// Whether the client has approved and the amount was released.
    pub approved: bool,
    /// When the contractor marked the work done.
    pub completed_at: Option<Timestamp>,
}

impl Milestone {
    fn from_spec(spec: MilestoneSpec) -> Self {
        Self {
            description: spec.description,
            amount: spec.amount,
            completed: false,
            approved: false,
            completed_at: None,
        }
    }
}

// ─── The Service Record ──────────────────────────────────────────────

/// A funded engagement between a client and a contractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Ledger-assigned identifier.
    pub id: ServiceId,
    /// The party that funded the service and approves milestones.
    pub client: PartyId,
    /// The party performing the work.
    pub contractor: PartyId,
    /// Catalog category of the work.
    pub trade: TradeCategory,
    /// Free-form description of the engagement.
    pub description: String,
    /// The full locked value; equals the sum of milestone amounts.
    pub total_amount: Amount,
    /// Value released from custody so far. Monotonically non-decreasing.
    pub released_amount: Amount,
    /// Current lifecycle status.
    pub status: ServiceStatus,
    /// When the service was created.
    pub created_at: Timestamp,
    /// Advisory completion deadline. Not enforced by the engine.
    pub deadline: Option<Timestamp>,
    /// The milestone plan, fixed at creation.
    pub milestones: Vec<Milestone>,
    /// Append-only status history.
    pub transitions: Vec<StatusTransition>,
}

impl Service {
    /// Build a new service record in `Created` status.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: ServiceId,
        client: PartyId,
        contractor: PartyId,
        trade: TradeCategory,
        description: String,
        deadline: Option<Timestamp>,
        specs: Vec<MilestoneSpec>,
        total_amount: Amount,
    ) -> Self {
        Self {
            id,
            client,
            contractor,
            trade,
            description,
            total_amount,
            released_amount: Amount::ZERO,
            status: ServiceStatus::Created,
            created_at: Timestamp::now(),
            deadline,
            milestones: specs.into_iter().map(Milestone::from_spec).collect(),
            transitions: Vec::new(),
        }
    }

    /// The value still locked in custody: `total_amount - released_amount`.
    pub fn residual(&self) -> Amount {
        self.total_amount
            .checked_sub(self.released_amount)
            .unwrap_or(Amount::ZERO)
    }

    /// Whether every milestone has been approved.
    pub fn all_approved(&self) -> bool {
        self.milestones.iter().all(|m| m.approved)
    }

    /// How many milestones have been approved.
    pub fn approved_count(&self) -> usize {
        self.milestones.iter().filter(|m| m.approved).count()
    }

    /// Whether any milestone has been approved yet.
    pub fn any_approved(&self) -> bool {
        self.milestones.iter().any(|m| m.approved)
    }

    /// Whether the advisory deadline has passed. Informational only; no
    /// engine behavior depends on this.
    pub fn is_past_deadline(&self, now: Timestamp) -> bool {
        self.deadline.is_some_and(|d| now > d)
    }

    /// Record a status change in the append-only history.
    pub(crate) fn transition(&mut self, to: ServiceStatus, reason: impl Into<String>) {
        self.transitions.push(StatusTransition {
            from: self.status,
            to,
            at: Timestamp::now(),
            reason: reason.into(),
        });
        self.status = to;
    }
}
