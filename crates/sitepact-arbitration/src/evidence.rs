//! # Evidence Records
//!
//! Append-only evidence items submitted by the disputing parties. Each
//! item is digested at submission; the stored digest can be recomputed at
//! any time to prove the content has not been altered since. Evidence is
//! never edited or deleted.

use serde::{Deserialize, Serialize};

use sitepact_core::{ContentDigest, DisputeId, EvidenceId, PartyId, Timestamp};

/// One piece of evidence within a dispute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// Unique evidence identifier.
    pub id: EvidenceId,
    /// The dispute this evidence belongs to.
    pub dispute_id: DisputeId,
    /// The party that submitted it (the service's client or contractor).
    pub submitted_by: PartyId,
    /// The submitted statement or document reference.
    pub content: String,
    /// SHA-256 digest of `content`, fixed at submission.
    pub digest: ContentDigest,
    /// When the item was submitted.
    pub submitted_at: Timestamp,
}

impl Evidence {
    /// Create a new evidence item, digesting the content.
    pub fn new(dispute_id: DisputeId, submitted_by: PartyId, content: impl Into<String>) -> Self {
        let content = content.into();
        let digest = ContentDigest::of(content.as_bytes());
        Self {
            id: EvidenceId::new(),
            dispute_id,
            submitted_by,
            content,
            digest,
            submitted_at: Timestamp::now(),
        }
    }

    /// Whether the stored content still matches its submission digest.
    pub fn verify_integrity(&self) -> bool {
        self.digest.matches(self.content.as_bytes())
    }
}
