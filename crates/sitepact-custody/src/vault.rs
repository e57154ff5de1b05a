//! # Custody Vault
//!
//! Locked-value balances keyed by service. The vault is deliberately dumb:
//! it knows nothing about milestones, parties' roles, or disputes — it
//! locks a balance once per service, pays portions of it out, and refuses
//! anything that would create or destroy value.
//!
//! Every transfer is atomic and failure-transparent: either the whole
//! amount moves and a journal entry is written, or the call errors and the
//! balance is untouched. The service ledger is the only intended caller;
//! no other component mutates balances directly.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use sitepact_core::{Amount, EscrowError, PartyId, ServiceId, Timestamp};

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors arising from vault operations.
#[derive(Error, Debug)]
pub enum CustodyError {
    /// A balance is already locked under this service.
    #[error("{service_id} already holds a locked balance")]
    AlreadyLocked {
        /// The service whose balance was locked twice.
        service_id: ServiceId,
    },

    /// No balance exists under this service.
    #[error("{service_id} holds no locked balance")]
    UnknownBalance {
        /// The service with no balance.
        service_id: ServiceId,
    },

    /// A release asked for more than the remaining balance.
    #[error("release of {requested} exceeds remaining balance {remaining} for {service_id}")]
    InsufficientBalance {
        /// The service whose balance was overdrawn.
        service_id: ServiceId,
        /// The requested release amount.
        requested: Amount,
        /// The remaining locked balance.
        remaining: Amount,
    },

    /// A zero-value lock was requested.
    #[error("refusing to lock a zero balance for {service_id}")]
    ZeroLock {
        /// The service the zero lock targeted.
        service_id: ServiceId,
    },
}

impl From<CustodyError> for EscrowError {
    fn from(err: CustodyError) -> Self {
        EscrowError::Custody(err.to_string())
    }
}

// ─── Transfer Journal ────────────────────────────────────────────────

/// The kind of movement a journal entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferKind {
    /// Value locked into the vault at service creation.
    Lock,
    /// A portion of the balance paid out.
    Release,
    /// The entire remaining balance paid out.
    ReleaseAll,
}

/// One recorded movement of value through the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// The movement kind.
    pub kind: TransferKind,
    /// The service the balance belongs to.
    pub service_id: ServiceId,
    /// The recipient, absent for locks.
    pub to: Option<PartyId>,
    /// The amount moved.
    pub amount: Amount,
    /// When the movement occurred.
    pub at: Timestamp,
}

// ─── The Vault Trait ─────────────────────────────────────────────────

/// Fund custody keyed by service identifier.
///
/// Implementations must make each call atomic: a failed call leaves the
/// balance exactly as it was, and a successful call moves exactly the
/// stated amount.
pub trait CustodyVault: Send + Sync {
    /// Lock `amount` under `service_id`. One lock per service.
    fn lock(&self, service_id: ServiceId, amount: Amount) -> Result<(), CustodyError>;

    /// Pay `amount` out of the service's balance to `to`.
    fn release(
        &self,
        service_id: ServiceId,
        to: &PartyId,
        amount: Amount,
    ) -> Result<(), CustodyError>;

    /// Pay the entire remaining balance to `to`, returning the amount moved.
    fn release_all(&self, service_id: ServiceId, to: &PartyId) -> Result<Amount, CustodyError>;

    /// The remaining locked balance, if a lock exists for the service.
    fn balance(&self, service_id: ServiceId) -> Option<Amount>;
}

// ─── In-Memory Implementation ────────────────────────────────────────

#[derive(Debug, Default)]
struct VaultState {
    balances: HashMap<ServiceId, Amount>,
    journal: Vec<Transfer>,
}

/// In-memory vault with a transfer journal.
///
/// Balances and the journal live behind one mutex, so a journal snapshot
/// is always consistent with the balances it explains.
#[derive(Debug, Default)]
pub struct InMemoryVault {
    state: Mutex<VaultState>,
}

impl InMemoryVault {
    /// Create an empty vault.
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of every transfer recorded so far, in order.
    pub fn journal(&self) -> Vec<Transfer> {
        self.state.lock().expect("vault lock poisoned").journal.clone()
    }
}

impl CustodyVault for InMemoryVault {
    fn lock(&self, service_id: ServiceId, amount: Amount) -> Result<(), CustodyError> {
        if amount.is_zero() {
            return Err(CustodyError::ZeroLock { service_id });
        }
        let mut state = self.state.lock().expect("vault lock poisoned");
        if state.balances.contains_key(&service_id) {
            return Err(CustodyError::AlreadyLocked { service_id });
        }
        state.balances.insert(service_id, amount);
        state.journal.push(Transfer {
            kind: TransferKind::Lock,
            service_id,
            to: None,
            amount,
            at: Timestamp::now(),
        });
        debug!(%service_id, %amount, "locked balance");
        Ok(())
    }

    fn release(
        &self,
        service_id: ServiceId,
        to: &PartyId,
        amount: Amount,
    ) -> Result<(), CustodyError> {
        let mut state = self.state.lock().expect("vault lock poisoned");
        let remaining = *state
            .balances
            .get(&service_id)
            .ok_or(CustodyError::UnknownBalance { service_id })?;
        if amount > remaining {
            return Err(CustodyError::InsufficientBalance {
                service_id,
                requested: amount,
                remaining,
            });
        }
        // Cannot underflow: amount <= remaining was just checked.
        let new_balance = Amount::new(remaining.minor_units() - amount.minor_units());
        state.balances.insert(service_id, new_balance);
        state.journal.push(Transfer {
            kind: TransferKind::Release,
            service_id,
            to: Some(to.clone()),
            amount,
            at: Timestamp::now(),
        });
        debug!(%service_id, %to, %amount, "released from balance");
        Ok(())
    }

    fn release_all(&self, service_id: ServiceId, to: &PartyId) -> Result<Amount, CustodyError> {
        let mut state = self.state.lock().expect("vault lock poisoned");
        let remaining = *state
            .balances
            .get(&service_id)
            .ok_or(CustodyError::UnknownBalance { service_id })?;
        state.balances.insert(service_id, Amount::ZERO);
        state.journal.push(Transfer {
            kind: TransferKind::ReleaseAll,
            service_id,
            to: Some(to.clone()),
            amount: remaining,
            at: Timestamp::now(),
        });
        debug!(%service_id, %to, amount = %remaining, "released full balance");
        Ok(remaining)
    }

    fn balance(&self, service_id: ServiceId) -> Option<Amount> {
        self.state
            .lock()
            .expect("vault lock poisoned")
            .balances
            .get(&service_id)
            .copied()
    }
}
