//! # Dispute Workflow
//!
//! The registry owning dispute records and driving the arbitration
//! lifecycle against the service ledger. The registry never touches the
//! custody vault: every status change and every fund movement goes through
//! the ledger's dispute hooks, so the freeze and the settlement stay
//! atomic with the service record.
//!
//! ## Locking Discipline
//!
//! Where both are needed, the dispute mutex is taken before the service
//! mutex (inside the ledger call). No code path takes them in the other
//! order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use tracing::{info, instrument};

use sitepact_core::{DisputeId, EscrowError, EvidenceId, PartyId, ServiceId, Timestamp};
use sitepact_ledger::{DisputeFavor, ServiceLedger};

use crate::dispute::{Dispute, Resolution};
use crate::evidence::Evidence;
use crate::policy::DisputePolicy;

/// The dispute resolution workflow.
pub struct DisputeRegistry {
    ledger: Arc<ServiceLedger>,
    policy: DisputePolicy,
    disputes: RwLock<HashMap<DisputeId, Arc<Mutex<Dispute>>>>,
    by_service: RwLock<HashMap<ServiceId, DisputeId>>,
}

impl DisputeRegistry {
    /// Create a registry over the given ledger with the default policy.
    pub fn new(ledger: Arc<ServiceLedger>) -> Self {
        Self::with_policy(ledger, DisputePolicy::default())
    }

    /// Create a registry with an explicit policy.
    pub fn with_policy(ledger: Arc<ServiceLedger>, policy: DisputePolicy) -> Self {
        Self {
            ledger,
            policy,
            disputes: RwLock::new(HashMap::new()),
            by_service: RwLock::new(HashMap::new()),
        }
    }

    /// The active policy.
    pub fn policy(&self) -> &DisputePolicy {
        &self.policy
    }

    // ── Raise ────────────────────────────────────────────────────────

    /// Freeze a service's settlement and open a dispute over its residual.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::InvalidParty`] unless the caller is the service's
    ///   client or contractor.
    /// - [`EscrowError::InvalidState`] unless the service is `InProgress`
    ///   (a service already frozen by a dispute rejects a second one here).
    /// - [`EscrowError::NotFound`] for an unknown service.
    #[instrument(skip_all, fields(%service_id, %caller))]
    pub fn raise_dispute(
        &self,
        service_id: ServiceId,
        caller: &PartyId,
    ) -> Result<DisputeId, EscrowError> {
        let dispute_id = DisputeId::new();
        // The ledger serializes on the service mutex: of two racing
        // raises, exactly one freezes the service and reaches the
        // insertions below.
        let (client, contractor, frozen) =
            self.ledger.open_dispute(service_id, caller, dispute_id)?;

        let dispute = Dispute::open(dispute_id, service_id, caller.clone(), client, contractor);
        self.disputes
            .write()
            .expect("dispute map poisoned")
            .insert(dispute_id, Arc::new(Mutex::new(dispute)));
        self.by_service
            .write()
            .expect("service index poisoned")
            .insert(service_id, dispute_id);

        info!(%dispute_id, %service_id, %frozen, "dispute opened");
        Ok(dispute_id)
    }

    // ── Evidence ─────────────────────────────────────────────────────

    /// Append an evidence item to an open dispute.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::NotFound`] for an unknown dispute.
    /// - [`EscrowError::InvalidState`] unless the dispute is `Open`.
    /// - [`EscrowError::InvalidParty`] unless the caller is one of the
    ///   disputing parties.
    /// - [`EscrowError::EvidenceLimit`] when the policy's item or size
    ///   bound would be exceeded.
    #[instrument(skip_all, fields(%dispute_id, %caller))]
    pub fn submit_evidence(
        &self,
        dispute_id: DisputeId,
        caller: &PartyId,
        content: impl Into<String>,
    ) -> Result<EvidenceId, EscrowError> {
        let handle = self.dispute_handle(dispute_id)?;
        let mut dispute = handle.lock().expect("dispute record poisoned");

        dispute.ensure_open("submit evidence")?;
        if !dispute.is_party(caller) {
            return Err(EscrowError::InvalidParty {
                caller: caller.to_string(),
                action: format!("submit evidence to {dispute_id}"),
            });
        }
        let content = content.into();
        if content.len() > self.policy.max_evidence_bytes {
            return Err(EscrowError::EvidenceLimit {
                dispute_id: dispute_id.to_string(),
                limit: format!("{} bytes per item", self.policy.max_evidence_bytes),
            });
        }
        if dispute.evidence.len() >= self.policy.max_evidence_items {
            return Err(EscrowError::EvidenceLimit {
                dispute_id: dispute_id.to_string(),
                limit: format!("{} items", self.policy.max_evidence_items),
            });
        }

        let evidence = Evidence::new(dispute_id, caller.clone(), content);
        let evidence_id = evidence.id;
        dispute.push_evidence(evidence);
        info!(%dispute_id, %evidence_id, "evidence submitted");
        Ok(evidence_id)
    }

    // ── Resolve ──────────────────────────────────────────────────────

    /// Resolve an open dispute: the entire residual balance moves to the
    /// favored party, the service reaches a terminal status, and the
    /// dispute closes. Irreversible.
    ///
    /// # Errors
    ///
    /// - [`EscrowError::NotFound`] for an unknown dispute.
    /// - [`EscrowError::InvalidState`] unless the dispute is `Open`.
    /// - [`EscrowError::NotMediator`] if the caller is one of the
    ///   disputing parties, the null identity, or outside a configured
    ///   mediator roster.
    #[instrument(skip_all, fields(%dispute_id, %caller, %favor))]
    pub fn resolve_dispute(
        &self,
        dispute_id: DisputeId,
        caller: &PartyId,
        favor: DisputeFavor,
        resolution_text: impl Into<String>,
    ) -> Result<(), EscrowError> {
        let handle = self.dispute_handle(dispute_id)?;
        let mut dispute = handle.lock().expect("dispute record poisoned");

        dispute.ensure_open("resolve")?;
        if dispute.is_party(caller) || caller.is_null() || !self.policy.permits_mediator(caller) {
            return Err(EscrowError::NotMediator {
                caller: caller.to_string(),
            });
        }

        // The ledger moves the residual and finalizes the service; only
        // then does the dispute record close. If the ledger call fails,
        // the dispute stays open and untouched.
        let (recipient, moved) = self
            .ledger
            .settle_dispute(dispute.service_id, dispute_id, favor)?;

        dispute.record_resolution(Resolution {
            favor,
            text: resolution_text.into(),
            resolved_by: caller.clone(),
            resolved_at: Timestamp::now(),
        });
        info!(%dispute_id, %recipient, %moved, "dispute resolved");
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// A consistent snapshot of the dispute record.
    ///
    /// # Errors
    ///
    /// [`EscrowError::NotFound`] for an unknown identifier.
    pub fn get_dispute(&self, dispute_id: DisputeId) -> Result<Dispute, EscrowError> {
        let handle = self.dispute_handle(dispute_id)?;
        let dispute = handle.lock().expect("dispute record poisoned");
        Ok(dispute.clone())
    }

    /// The dispute raised against a service, if any.
    pub fn dispute_for_service(&self, service_id: ServiceId) -> Option<DisputeId> {
        self.by_service
            .read()
            .expect("service index poisoned")
            .get(&service_id)
            .copied()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn dispute_handle(&self, dispute_id: DisputeId) -> Result<Arc<Mutex<Dispute>>, EscrowError> {
        self.disputes
            .read()
            .expect("dispute map poisoned")
            .get(&dispute_id)
            .cloned()
            .ok_or_else(|| EscrowError::NotFound {
                subject: dispute_id.to_string(),
            })
    }
}

impl std::fmt::Debug for DisputeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.disputes.read().map(|m| m.len()).unwrap_or(0);
        f.debug_struct("DisputeRegistry")
            .field("disputes", &count)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitepact_core::{Amount, TradeCategory};
    use sitepact_custody::{CustodyVault, InMemoryVault};
    use sitepact_ledger::{MilestoneSpec, ServiceStatus};

    fn party(tail: char) -> PartyId {
        PartyId::new(format!("0x{}", tail.to_string().repeat(40))).unwrap()
    }

    fn setup() -> (Arc<ServiceLedger>, DisputeRegistry, ServiceId) {
        let vault = Arc::new(InMemoryVault::new()) as Arc<dyn CustodyVault>;
        let ledger = Arc::new(ServiceLedger::new(vault));
        let id = ledger
            .create_service(
                party('a'),
                party('b'),
                TradeCategory::Carpentry,
                "built-in wardrobes".to_string(),
                None,
                vec![
                    MilestoneSpec::new("carcass", Amount::new(1_000)),
                    MilestoneSpec::new("doors", Amount::new(1_000)),
                ],
                Amount::new(2_000),
            )
            .unwrap();
        ledger.confirm_acceptance(id, &party('b')).unwrap();
        let registry = DisputeRegistry::new(Arc::clone(&ledger));
        (ledger, registry, id)
    }

    #[test]
    fn raise_creates_open_dispute_and_freezes_service() {
        let (ledger, registry, id) = setup();
        let dispute_id = registry.raise_dispute(id, &party('a')).unwrap();
        let dispute = registry.get_dispute(dispute_id).unwrap();
        assert_eq!(dispute.service_id, id);
        assert_eq!(dispute.opened_by, party('a'));
        assert_eq!(
            ledger.get_service(id).unwrap().status,
            ServiceStatus::Disputed
        );
        assert_eq!(registry.dispute_for_service(id), Some(dispute_id));
    }

    #[test]
    fn raise_rejects_stranger() {
        let (_, registry, id) = setup();
        assert!(matches!(
            registry.raise_dispute(id, &party('c')),
            Err(EscrowError::InvalidParty { .. })
        ));
    }

    #[test]
    fn second_raise_is_invalid_state() {
        let (_, registry, id) = setup();
        registry.raise_dispute(id, &party('a')).unwrap();
        assert!(matches!(
            registry.raise_dispute(id, &party('b')),
            Err(EscrowError::InvalidState { .. })
        ));
    }

    #[test]
    fn evidence_accepted_from_both_parties() {
        let (_, registry, id) = setup();
        let dispute_id = registry.raise_dispute(id, &party('a')).unwrap();
        registry
            .submit_evidence(dispute_id, &party('a'), "doors were never hung")
            .unwrap();
        registry
            .submit_evidence(dispute_id, &party('b'), "client changed the design mid-build")
            .unwrap();
        let dispute = registry.get_dispute(dispute_id).unwrap();
        assert_eq!(dispute.evidence.len(), 2);
        assert!(dispute.evidence.iter().all(|e| e.verify_integrity()));
    }

    #[test]
    fn evidence_rejects_stranger() {
        let (_, registry, id) = setup();
        let dispute_id = registry.raise_dispute(id, &party('a')).unwrap();
        assert!(matches!(
            registry.submit_evidence(dispute_id, &party('c'), "unsolicited opinion"),
            Err(EscrowError::InvalidParty { .. })
        ));
    }

    #[test]
    fn evidence_item_bound_enforced() {
        let (ledger, _, id) = setup();
        let registry = DisputeRegistry::with_policy(
            ledger,
            DisputePolicy {
                max_evidence_items: 2,
                ..DisputePolicy::default()
            },
        );
        let dispute_id = registry.raise_dispute(id, &party('a')).unwrap();
        registry.submit_evidence(dispute_id, &party('a'), "one").unwrap();
        registry.submit_evidence(dispute_id, &party('a'), "two").unwrap();
        assert!(matches!(
            registry.submit_evidence(dispute_id, &party('a'), "three"),
            Err(EscrowError::EvidenceLimit { .. })
        ));
    }

    #[test]
    fn evidence_size_bound_enforced() {
        let (ledger, _, id) = setup();
        let registry = DisputeRegistry::with_policy(
            ledger,
            DisputePolicy {
                max_evidence_bytes: 16,
                ..DisputePolicy::default()
            },
        );
        let dispute_id = registry.raise_dispute(id, &party('a')).unwrap();
        assert!(matches!(
            registry.submit_evidence(
                dispute_id,
                &party('a'),
                "this statement is much longer than sixteen bytes"
            ),
            Err(EscrowError::EvidenceLimit { .. })
        ));
    }

    #[test]
    fn resolve_rejects_disputing_parties() {
        let (_, registry, id) = setup();
        let dispute_id = registry.raise_dispute(id, &party('a')).unwrap();
        for p in ['a', 'b'] {
            assert!(matches!(
                registry.resolve_dispute(
                    dispute_id,
                    &party(p),
                    DisputeFavor::Client,
                    "self-serving ruling"
                ),
                Err(EscrowError::NotMediator { .. })
            ));
        }
    }

    #[test]
    fn resolve_rejects_null_identity() {
        let (_, registry, id) = setup();
        let dispute_id = registry.raise_dispute(id, &party('a')).unwrap();
        assert!(matches!(
            registry.resolve_dispute(
                dispute_id,
                &PartyId::null(),
                DisputeFavor::Client,
                "ruling"
            ),
            Err(EscrowError::NotMediator { .. })
        ));
    }

    #[test]
    fn roster_restricts_mediators() {
        let (ledger, _, id) = setup();
        let registry = DisputeRegistry::with_policy(
            ledger,
            DisputePolicy {
                mediator_roster: vec![party('d')],
                ..DisputePolicy::default()
            },
        );
        let dispute_id = registry.raise_dispute(id, &party('a')).unwrap();
        assert!(matches!(
            registry.resolve_dispute(dispute_id, &party('c'), DisputeFavor::Client, "ruling"),
            Err(EscrowError::NotMediator { .. })
        ));
        registry
            .resolve_dispute(dispute_id, &party('d'), DisputeFavor::Client, "ruling")
            .unwrap();
    }

    #[test]
    fn resolve_closes_dispute_and_records_ruling() {
        let (ledger, registry, id) = setup();
        let dispute_id = registry.raise_dispute(id, &party('a')).unwrap();
        registry
            .resolve_dispute(
                dispute_id,
                &party('c'),
                DisputeFavor::Contractor,
                "work matched the agreed plan",
            )
            .unwrap();

        let dispute = registry.get_dispute(dispute_id).unwrap();
        assert_eq!(dispute.state, crate::dispute::DisputeState::Resolved);
        let resolution = dispute.resolution.unwrap();
        assert_eq!(resolution.favor, DisputeFavor::Contractor);
        assert_eq!(resolution.resolved_by, party('c'));
        assert_eq!(
            ledger.get_service(id).unwrap().status,
            ServiceStatus::Completed
        );
    }

    #[test]
    fn second_resolution_is_invalid_state() {
        let (_, registry, id) = setup();
        let dispute_id = registry.raise_dispute(id, &party('a')).unwrap();
        registry
            .resolve_dispute(dispute_id, &party('c'), DisputeFavor::Client, "ruling")
            .unwrap();
        assert!(matches!(
            registry.resolve_dispute(dispute_id, &party('c'), DisputeFavor::Contractor, "again"),
            Err(EscrowError::InvalidState { .. })
        ));
    }

    #[test]
    fn evidence_rejected_after_resolution() {
        let (_, registry, id) = setup();
        let dispute_id = registry.raise_dispute(id, &party('a')).unwrap();
        registry
            .resolve_dispute(dispute_id, &party('c'), DisputeFavor::Client, "ruling")
            .unwrap();
        assert!(matches!(
            registry.submit_evidence(dispute_id, &party('a'), "late evidence"),
            Err(EscrowError::InvalidState { .. })
        ));
    }

    #[test]
    fn unknown_dispute_is_not_found() {
        let (_, registry, _) = setup();
        assert!(matches!(
            registry.get_dispute(DisputeId::new()),
            Err(EscrowError::NotFound { .. })
        ));
    }
}
