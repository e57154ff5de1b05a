//! # Milestone Settlement
//!
//! The completion → approval protocol that releases value. Completion is
//! the contractor's claim; approval is the client's sign-off and the only
//! path by which funds leave custody during normal operation.
//!
//! Both operations run entirely under the owning service's mutex, so an
//! approval racing a dispute freeze serializes: either the transfer and
//! the record update both commit before the freeze, or the freeze wins and
//! the approval is rejected.

use tracing::{info, instrument};

use sitepact_core::{EscrowError, PartyId, ServiceId, Timestamp};

use crate::events::EscrowEvent;
use crate::ledger::ServiceLedger;
use crate::service::ServiceStatus;

impl ServiceLedger {
    /// Contractor marks a milestone's work done. No fund movement.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::InvalidParty`] unless the caller is the contractor.
    /// - [`EscrowError::InvalidState`] unless the service is `InProgress`.
    /// - [`EscrowError::NotFound`] for a bad milestone index.
    /// - [`EscrowError::AlreadyProcessed`] if the milestone was already
    ///   marked done.
    #[instrument(skip_all, fields(%service_id, milestone = index, %caller))]
    pub fn complete_milestone(
        &self,
        service_id: ServiceId,
        index: usize,
        caller: &PartyId,
    ) -> Result<(), EscrowError> {
        let handle = self.service_handle(service_id)?;
        let mut service = handle.lock().expect("service record poisoned");

        if *caller != service.contractor {
            return Err(EscrowError::InvalidParty {
                caller: caller.to_string(),
                action: format!("complete milestone {index} of {service_id}"),
            });
        }
        if service.status != ServiceStatus::InProgress {
            return Err(EscrowError::InvalidState {
                subject: service_id.to_string(),
                state: service.status.to_string(),
                action: "complete a milestone".to_string(),
            });
        }
        let milestone = service
            .milestones
            .get(index)
            .ok_or_else(|| EscrowError::NotFound {
                subject: format!("milestone {index} of {service_id}"),
            })?;
        if milestone.completed {
            return Err(EscrowError::AlreadyProcessed {
                subject: format!("milestone {index} of {service_id}"),
                action: "completed".to_string(),
            });
        }

        let amount = milestone.amount;
        let milestone = &mut service.milestones[index];
        milestone.completed = true;
        milestone.completed_at = Some(Timestamp::now());

        self.events.emit(EscrowEvent::MilestoneCompleted {
            service_id,
            index,
            amount,
        });
        info!(%service_id, index, "milestone completed");
        Ok(())
    }

    /// Client approves a completed milestone, releasing its amount to the
    /// contractor. The transfer and the record update commit together or
    /// not at all. When this approval is the last one, the service
    /// transitions to `Completed`.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::InvalidParty`] unless the caller is the client.
    /// - [`EscrowError::InvalidState`] unless the service is `InProgress`
    ///   and the milestone has been completed.
    /// - [`EscrowError::NotFound`] for a bad milestone index.
    /// - [`EscrowError::AlreadyProcessed`] if the milestone was already
    ///   approved — no second transfer occurs.
    /// - [`EscrowError::Custody`] if the vault rejects the release; the
    ///   record is left untouched.
    #[instrument(skip_all, fields(%service_id, milestone = index, %caller))]
    pub fn approve_milestone(
        &self,
        service_id: ServiceId,
        index: usize,
        caller: &PartyId,
    ) -> Result<(), EscrowError> {
        let handle = self.service_handle(service_id)?;
        let mut service = handle.lock().expect("service record poisoned");

        if *caller != service.client {
            return Err(EscrowError::InvalidParty {
                caller: caller.to_string(),
                action: format!("approve milestone {index} of {service_id}"),
            });
        }
        if service.status != ServiceStatus::InProgress {
            return Err(EscrowError::InvalidState {
                subject: service_id.to_string(),
                state: service.status.to_string(),
                action: "approve a milestone".to_string(),
            });
        }
        let milestone = service
            .milestones
            .get(index)
            .ok_or_else(|| EscrowError::NotFound {
                subject: format!("milestone {index} of {service_id}"),
            })?;
        if milestone.approved {
            return Err(EscrowError::AlreadyProcessed {
                subject: format!("milestone {index} of {service_id}"),
                action: "approved".to_string(),
            });
        }
        if !milestone.completed {
            return Err(EscrowError::InvalidState {
                subject: format!("milestone {index} of {service_id}"),
                state: "PENDING".to_string(),
                action: "approve before completion".to_string(),
            });
        }

        let amount = milestone.amount;
        let contractor = service.contractor.clone();
        let new_released = service.released_amount.checked_add(amount)?;

        // Everything validated; the transfer is the commit point. If the
        // vault errors the record has not been touched.
        self.vault.release(service_id, &contractor, amount)?;

        service.milestones[index].approved = true;
        service.released_amount = new_released;

        self.events.emit(EscrowEvent::MilestoneApproved {
            service_id,
            index,
            amount,
            to: contractor.clone(),
        });
        info!(%service_id, index, %amount, "milestone approved and released");

        if service.all_approved() {
            // The sum invariant makes the residual zero here; nothing is
            // left in custody to sweep.
            service.transition(ServiceStatus::Completed, "all milestones approved");
            self.events.emit(EscrowEvent::ServiceCompleted {
                service_id,
                client: service.client.clone(),
                contractor,
            });
            info!(%service_id, "service completed");
        }
        Ok(())
    }
}
