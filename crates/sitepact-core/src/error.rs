//! # Error Types
//!
//! Structured error hierarchy for the escrow engine. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! Every variant carries enough context to diagnose the failure without
//! consulting logs: the caller that was rejected, the state a record was
//! in, the limit that was breached. None of these errors is retried
//! automatically — each surfaces synchronously to the caller, who must
//! correct the input or wait for a different actor to act.

use thiserror::Error;

/// Errors arising from escrow, settlement, and dispute operations.
#[derive(Error, Debug)]
pub enum EscrowError {
    /// Caller lacks authority for the requested action.
    #[error("caller {caller} is not authorized to {action}")]
    InvalidParty {
        /// The rejected caller identity.
        caller: String,
        /// The action that was attempted (e.g., "approve milestone").
        action: String,
    },

    /// Action attempted in a state where it is not permitted.
    #[error("{subject} is in state {state}: cannot {action}")]
    InvalidState {
        /// The record the action targeted (e.g., "service:7").
        subject: String,
        /// The state the record was in.
        state: String,
        /// The action that was attempted.
        action: String,
    },

    /// Milestone plan rejected at service creation.
    #[error("invalid milestone plan: {0}")]
    InvalidMilestones(String),

    /// Idempotency guard: the action was already carried out.
    #[error("{subject} already {action}")]
    AlreadyProcessed {
        /// The record the action targeted.
        subject: String,
        /// What was already done (e.g., "completed", "approved").
        action: String,
    },

    /// Reference to an unknown service, dispute, or milestone index.
    #[error("{subject} not found")]
    NotFound {
        /// The missing reference (e.g., "service:9", "milestone 3 of service:2").
        subject: String,
    },

    /// Dispute resolution attempted by one of the disputing parties,
    /// or by a caller outside the configured mediator roster.
    #[error("caller {caller} may not act as mediator")]
    NotMediator {
        /// The rejected caller identity.
        caller: String,
    },

    /// Evidence submission exceeded the configured policy bound.
    #[error("evidence limit reached for {dispute_id}: {limit}")]
    EvidenceLimit {
        /// The dispute the submission targeted.
        dispute_id: String,
        /// The bound that was hit (item count or byte size).
        limit: String,
    },

    /// A party identifier failed validation at construction.
    #[error("invalid party identity: {0:?}")]
    InvalidIdentity(String),

    /// A trade category string did not match the catalog.
    #[error("unknown trade category: {0:?}")]
    UnknownTrade(String),

    /// A timestamp failed to parse or was out of range.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Checked monetary arithmetic overflowed.
    #[error("amount overflow while {0}")]
    AmountOverflow(String),

    /// Fund custody rejected an operation.
    #[error("custody failure: {0}")]
    Custody(String),
}
