//! # Escrow Events
//!
//! The engine's sole outward interface: an append-only stream of typed
//! events describing everything that changed hands. Off-engine consumers
//! (reputation, notifications, indexers) observe this stream instead of
//! reading ledger internals — a review, for instance, is only acceptable
//! after `ServiceCompleted` has been observed for the engagement.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use sitepact_core::{Amount, DisputeId, PartyId, ServiceId};

// ─── Dispute Favor ───────────────────────────────────────────────────

/// Which party a dispute resolution awards the residual balance to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeFavor {
    /// The residual is refunded to the client.
    Client,
    /// The residual is paid to the contractor.
    Contractor,
}

impl DisputeFavor {
    /// The canonical string name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "CLIENT",
            Self::Contractor => "CONTRACTOR",
        }
    }
}

impl std::fmt::Display for DisputeFavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Events ──────────────────────────────────────────────────────────

/// An event emitted by the engine for off-engine consumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EscrowEvent {
    /// A service was created and its full value locked in custody.
    ServiceCreated {
        /// The new service.
        service_id: ServiceId,
        /// The funding party.
        client: PartyId,
        /// The assigned contractor.
        contractor: PartyId,
        /// The locked total.
        amount: Amount,
    },
    /// The contractor accepted the engagement.
    ServiceAccepted {
        /// The accepted service.
        service_id: ServiceId,
        /// The accepting contractor.
        contractor: PartyId,
    },
    /// The contractor marked a milestone's work done.
    MilestoneCompleted {
        /// The owning service.
        service_id: ServiceId,
        /// The milestone index within the service.
        index: usize,
        /// The milestone's amount (not yet released).
        amount: Amount,
    },
    /// The client approved a milestone and its amount left custody.
    MilestoneApproved {
        /// The owning service.
        service_id: ServiceId,
        /// The milestone index within the service.
        index: usize,
        /// The released amount.
        amount: Amount,
        /// The contractor the amount was paid to.
        to: PartyId,
    },
    /// Every milestone is approved and the service settled naturally,
    /// or a dispute resolution settled the remaining value.
    ServiceCompleted {
        /// The completed service.
        service_id: ServiceId,
        /// The funding party.
        client: PartyId,
        /// The contractor.
        contractor: PartyId,
    },
    /// A party froze settlement by raising a dispute.
    DisputeRaised {
        /// The frozen service.
        service_id: ServiceId,
        /// The new dispute.
        dispute_id: DisputeId,
        /// The party that raised it.
        opened_by: PartyId,
        /// The residual balance frozen by the dispute.
        frozen: Amount,
    },
    /// A mediator resolved a dispute and the residual changed hands.
    DisputeResolved {
        /// The service the dispute belonged to.
        service_id: ServiceId,
        /// The resolved dispute.
        dispute_id: DisputeId,
        /// Which party was favored.
        favor: DisputeFavor,
        /// The residual amount moved.
        amount: Amount,
        /// The party that received it.
        to: PartyId,
    },
}

impl EscrowEvent {
    /// The service this event concerns.
    pub fn service_id(&self) -> ServiceId {
        match self {
            Self::ServiceCreated { service_id, .. }
            | Self::ServiceAccepted { service_id, .. }
            | Self::MilestoneCompleted { service_id, .. }
            | Self::MilestoneApproved { service_id, .. }
            | Self::ServiceCompleted { service_id, .. }
            | Self::DisputeRaised { service_id, .. }
            | Self::DisputeResolved { service_id, .. } => *service_id,
        }
    }
}

// ─── Event Log ───────────────────────────────────────────────────────

/// Append-only in-memory event stream shared by the ledger and the
/// dispute workflow.
#[derive(Debug, Default)]
pub struct EventLog {
    entries: Mutex<Vec<EscrowEvent>>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn emit(&self, event: EscrowEvent) {
        self.entries.lock().expect("event log poisoned").push(event);
    }

    /// A snapshot of all events emitted so far, in order.
    pub fn snapshot(&self) -> Vec<EscrowEvent> {
        self.entries.lock().expect("event log poisoned").clone()
    }

    /// Remove and return all events emitted so far.
    pub fn drain(&self) -> Vec<EscrowEvent> {
        std::mem::take(&mut *self.entries.lock().expect("event log poisoned"))
    }

    /// Events concerning one service, in order.
    pub fn for_service(&self, service_id: ServiceId) -> Vec<EscrowEvent> {
        self.entries
            .lock()
            .expect("event log poisoned")
            .iter()
            .filter(|e| e.service_id() == service_id)
            .cloned()
            .collect()
    }

    /// How many events have been emitted.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("event log poisoned").len()
    }

    /// Whether no events have been emitted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
