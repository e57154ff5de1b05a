//! # Identity Newtypes
//!
//! Newtype wrappers for every identifier in the engine. You cannot pass a
//! `DisputeId` where a `ServiceId` is expected, and a `PartyId` cannot be
//! confused with free-form text.
//!
//! ## Party Canonicalization
//!
//! `PartyId` wraps an account address (`0x` followed by 40 hex digits).
//! The address is lowercased once, at construction, so authorization checks
//! are exact equality — two spellings of the same address compare equal and
//! no call site performs case folding.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EscrowError;

// ─── PartyId ─────────────────────────────────────────────────────────

/// A canonical account address identifying a client, contractor, or mediator.
///
/// Validated and lowercased at construction; equality is exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartyId(String);

impl PartyId {
    /// Parse and canonicalize an account address.
    ///
    /// # Errors
    ///
    /// Returns [`EscrowError::InvalidIdentity`] unless the input is `0x`
    /// followed by exactly 40 hex digits.
    pub fn new(value: impl Into<String>) -> Result<Self, EscrowError> {
        let s = value.into();
        let hex = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| EscrowError::InvalidIdentity(s.clone()))?;
        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(EscrowError::InvalidIdentity(s));
        }
        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }

    /// The all-zero address, used by external systems as "no party".
    pub fn null() -> Self {
        Self(format!("0x{}", "0".repeat(40)))
    }

    /// Whether this is the null (all-zero) identity.
    pub fn is_null(&self) -> bool {
        self.0[2..].bytes().all(|b| b == b'0')
    }

    /// Access the canonical address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PartyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ─── ServiceId ───────────────────────────────────────────────────────

/// Identifier for a funded service engagement.
///
/// Sequential, assigned by the ledger at creation. Milestones are addressed
/// as `(ServiceId, index)` and have no identifier of their own.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ServiceId(pub u64);

impl ServiceId {
    /// The raw sequence number.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "service:{}", self.0)
    }
}

// ─── DisputeId ───────────────────────────────────────────────────────

/// Unique identifier for a dispute proceeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisputeId(Uuid);

impl DisputeId {
    /// Create a new random dispute identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DisputeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DisputeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "dispute:{}", self.0)
    }
}

// ─── EvidenceId ──────────────────────────────────────────────────────

/// Unique identifier for a single evidence item within a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvidenceId(Uuid);

impl EvidenceId {
    /// Create a new random evidence identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EvidenceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EvidenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "evidence:{}", self.0)
    }
}
