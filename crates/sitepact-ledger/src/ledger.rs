//! # The Service Ledger
//!
//! Keyed, concurrency-safe store of service records, and the only
//! component that moves value through the custody vault.
//!
//! ## Locking Discipline
//!
//! Each service lives behind its own mutex inside a read-write-locked map.
//! Every mutating operation on a service runs entirely under that
//! service's mutex — including the custody transfer it performs — so all
//! operations on one `service_id` are linearizable, while operations on
//! distinct services proceed fully in parallel. Reads clone a snapshot
//! under the same mutex and can never observe a released amount that
//! disagrees with the approved milestone set.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use tracing::{info, instrument};

use sitepact_core::{
    Amount, DisputeId, EscrowError, PartyId, ServiceId, Timestamp, TradeCategory,
};
use sitepact_custody::CustodyVault;

use crate::events::{DisputeFavor, EscrowEvent, EventLog};
use crate::service::{Milestone, MilestoneSpec, Service, ServiceStatus};

/// The canonical store of services and milestones.
pub struct ServiceLedger {
    pub(crate) vault: Arc<dyn CustodyVault>,
    pub(crate) services: RwLock<HashMap<ServiceId, Arc<Mutex<Service>>>>,
    by_client: RwLock<HashMap<PartyId, Vec<ServiceId>>>,
    by_contractor: RwLock<HashMap<PartyId, Vec<ServiceId>>>,
    next_id: AtomicU64,
    pub(crate) events: Arc<EventLog>,
}

impl ServiceLedger {
    /// Create a ledger over the given custody vault with a fresh event log.
    pub fn new(vault: Arc<dyn CustodyVault>) -> Self {
        Self {
            vault,
            services: RwLock::new(HashMap::new()),
            by_client: RwLock::new(HashMap::new()),
            by_contractor: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            events: Arc::new(EventLog::new()),
        }
    }

    /// The shared event log.
    pub fn events(&self) -> Arc<EventLog> {
        Arc::clone(&self.events)
    }

    // ── Creation ─────────────────────────────────────────────────────

    /// Create a funded service in `Created` status, locking `total_amount`
    /// in custody under the new identifier.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::InvalidParty`] if the contractor equals the client,
    ///   or either identity is null.
    /// - [`EscrowError::InvalidMilestones`] if the plan is empty, contains
    ///   a zero amount, or does not sum to `total_amount`.
    /// - [`EscrowError::Custody`] if the vault rejects the lock.
    #[instrument(skip_all, fields(%client, %contractor, %total_amount))]
    #[allow(clippy::too_many_arguments)]
    pub fn create_service(
        &self,
        client: PartyId,
        contractor: PartyId,
        trade: TradeCategory,
        description: String,
        deadline: Option<Timestamp>,
        milestones: Vec<MilestoneSpec>,
        total_amount: Amount,
    ) -> Result<ServiceId, EscrowError> {
        if contractor == client {
            return Err(EscrowError::InvalidParty {
                caller: contractor.to_string(),
                action: "act as both client and contractor".to_string(),
            });
        }
        if contractor.is_null() || client.is_null() {
            return Err(EscrowError::InvalidParty {
                caller: PartyId::null().to_string(),
                action: "participate in a service".to_string(),
            });
        }
        if milestones.is_empty() {
            return Err(EscrowError::InvalidMilestones(
                "at least one milestone is required".to_string(),
            ));
        }
        if milestones.iter().any(|m| m.amount.is_zero()) {
            return Err(EscrowError::InvalidMilestones(
                "milestone amounts must be positive".to_string(),
            ));
        }
        let sum = Amount::checked_sum(milestones.iter().map(|m| m.amount))?;
        if sum != total_amount {
            return Err(EscrowError::InvalidMilestones(format!(
                "milestone amounts sum to {sum}, expected {total_amount}"
            )));
        }

        let id = ServiceId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.vault.lock(id, total_amount)?;

        let service = Service::new(
            id,
            client.clone(),
            contractor.clone(),
            trade,
            description,
            deadline,
            milestones,
            total_amount,
        );
        self.services
            .write()
            .expect("service map poisoned")
            .insert(id, Arc::new(Mutex::new(service)));
        self.by_client
            .write()
            .expect("client index poisoned")
            .entry(client.clone())
            .or_default()
            .push(id);
        self.by_contractor
            .write()
            .expect("contractor index poisoned")
            .entry(contractor.clone())
            .or_default()
            .push(id);

        self.events.emit(EscrowEvent::ServiceCreated {
            service_id: id,
            client,
            contractor,
            amount: total_amount,
        });
        info!(%id, "service created");
        Ok(id)
    }

    // ── Acceptance ───────────────────────────────────────────────────

    /// Contractor acceptance: `Created → InProgress`.
    ///
    /// # Errors
    ///
    /// [`EscrowError::InvalidParty`] unless the caller is the assigned
    /// contractor; [`EscrowError::InvalidState`] unless the service is
    /// still `Created`.
    #[instrument(skip_all, fields(%service_id, %caller))]
    pub fn confirm_acceptance(
        &self,
        service_id: ServiceId,
        caller: &PartyId,
    ) -> Result<(), EscrowError> {
        let handle = self.service_handle(service_id)?;
        let mut service = handle.lock().expect("service record poisoned");

        if *caller != service.contractor {
            return Err(EscrowError::InvalidParty {
                caller: caller.to_string(),
                action: format!("accept {service_id}"),
            });
        }
        if service.status != ServiceStatus::Created {
            return Err(EscrowError::InvalidState {
                subject: service_id.to_string(),
                state: service.status.to_string(),
                action: "accept".to_string(),
            });
        }

        service.transition(ServiceStatus::InProgress, "accepted by contractor");
        self.events.emit(EscrowEvent::ServiceAccepted {
            service_id,
            contractor: caller.clone(),
        });
        info!(%service_id, "service accepted");
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// A consistent snapshot of the service record.
    ///
    /// # Errors
    ///
    /// [`EscrowError::NotFound`] for an unknown identifier.
    pub fn get_service(&self, service_id: ServiceId) -> Result<Service, EscrowError> {
        let handle = self.service_handle(service_id)?;
        let service = handle.lock().expect("service record poisoned");
        Ok(service.clone())
    }

    /// A consistent snapshot of the service's milestones.
    ///
    /// # Errors
    ///
    /// [`EscrowError::NotFound`] for an unknown identifier.
    pub fn get_milestones(&self, service_id: ServiceId) -> Result<Vec<Milestone>, EscrowError> {
        let handle = self.service_handle(service_id)?;
        let service = handle.lock().expect("service record poisoned");
        Ok(service.milestones.clone())
    }

    /// Services where the party is the client, in creation order.
    pub fn services_for_client(&self, party: &PartyId) -> Vec<ServiceId> {
        self.by_client
            .read()
            .expect("client index poisoned")
            .get(party)
            .cloned()
            .unwrap_or_default()
    }

    /// Services where the party is the contractor, in creation order.
    pub fn services_for_contractor(&self, party: &PartyId) -> Vec<ServiceId> {
        self.by_contractor
            .read()
            .expect("contractor index poisoned")
            .get(party)
            .cloned()
            .unwrap_or_default()
    }

    // ── Dispute Hooks ────────────────────────────────────────────────
    //
    // The dispute workflow owns dispute records, but every service status
    // change and every custody movement goes through the ledger. These two
    // operations are the workflow's only entry points.

    /// Freeze settlement for a dispute: `InProgress → Disputed`.
    ///
    /// Returns the party snapshot `(client, contractor)` and the residual
    /// balance frozen by the dispute.
    ///
    /// # Errors
    ///
    /// [`EscrowError::InvalidParty`] unless `opened_by` is the client or
    /// the contractor; [`EscrowError::InvalidState`] unless the service is
    /// `InProgress`.
    #[instrument(skip_all, fields(%service_id, %opened_by))]
    pub fn open_dispute(
        &self,
        service_id: ServiceId,
        opened_by: &PartyId,
        dispute_id: DisputeId,
    ) -> Result<(PartyId, PartyId, Amount), EscrowError> {
        let handle = self.service_handle(service_id)?;
        let mut service = handle.lock().expect("service record poisoned");

        if *opened_by != service.client && *opened_by != service.contractor {
            return Err(EscrowError::InvalidParty {
                caller: opened_by.to_string(),
                action: format!("raise a dispute on {service_id}"),
            });
        }
        if service.status != ServiceStatus::InProgress {
            return Err(EscrowError::InvalidState {
                subject: service_id.to_string(),
                state: service.status.to_string(),
                action: "raise a dispute".to_string(),
            });
        }

        let frozen = service.residual();
        service.transition(
            ServiceStatus::Disputed,
            format!("dispute {dispute_id} raised by {opened_by}"),
        );
        self.events.emit(EscrowEvent::DisputeRaised {
            service_id,
            dispute_id,
            opened_by: opened_by.clone(),
            frozen,
        });
        info!(%service_id, %dispute_id, %frozen, "settlement frozen");
        Ok((service.client.clone(), service.contractor.clone(), frozen))
    }

    /// Settle a frozen service after arbitration: the entire residual is
    /// released to the favored party and the service reaches a terminal
    /// status — `Cancelled` when the resolution refunds the client before
    /// anything was released, `Completed` otherwise.
    ///
    /// Returns the recipient and the amount moved.
    ///
    /// # Errors
    ///
    /// [`EscrowError::InvalidState`] unless the service is `Disputed`;
    /// [`EscrowError::Custody`] if the vault rejects the release (the
    /// record is left untouched).
    #[instrument(skip_all, fields(%service_id, %favor))]
    pub fn settle_dispute(
        &self,
        service_id: ServiceId,
        dispute_id: DisputeId,
        favor: DisputeFavor,
    ) -> Result<(PartyId, Amount), EscrowError> {
        let handle = self.service_handle(service_id)?;
        let mut service = handle.lock().expect("service record poisoned");

        if service.status != ServiceStatus::Disputed {
            return Err(EscrowError::InvalidState {
                subject: service_id.to_string(),
                state: service.status.to_string(),
                action: "settle a dispute".to_string(),
            });
        }

        let recipient = match favor {
            DisputeFavor::Client => service.client.clone(),
            DisputeFavor::Contractor => service.contractor.clone(),
        };
        let annulled = favor == DisputeFavor::Client && !service.any_approved();

        // Validate the arithmetic before any value moves; after the vault
        // call succeeds nothing below can fail.
        let new_released = service.released_amount.checked_add(service.residual())?;
        let moved = self.vault.release_all(service_id, &recipient)?;
        service.released_amount = new_released;

        let terminal = if annulled {
            ServiceStatus::Cancelled
        } else {
            ServiceStatus::Completed
        };
        service.transition(
            terminal,
            format!("dispute {dispute_id} resolved in favor of {favor}"),
        );

        self.events.emit(EscrowEvent::DisputeResolved {
            service_id,
            dispute_id,
            favor,
            amount: moved,
            to: recipient.clone(),
        });
        if terminal == ServiceStatus::Completed {
            self.events.emit(EscrowEvent::ServiceCompleted {
                service_id,
                client: service.client.clone(),
                contractor: service.contractor.clone(),
            });
        }
        info!(%service_id, %dispute_id, %moved, status = %terminal, "dispute settled");
        Ok((recipient, moved))
    }

    // ── Internal ─────────────────────────────────────────────────────

    pub(crate) fn service_handle(
        &self,
        service_id: ServiceId,
    ) -> Result<Arc<Mutex<Service>>, EscrowError> {
        self.services
            .read()
            .expect("service map poisoned")
            .get(&service_id)
            .cloned()
            .ok_or_else(|| EscrowError::NotFound {
                subject: service_id.to_string(),
            })
    }
}

impl std::fmt::Debug for ServiceLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.services.read().map(|m| m.len()).unwrap_or(0);
        f.debug_struct("ServiceLedger")
            .field("services", &count)
            .finish_non_exhaustive()
    }
}
