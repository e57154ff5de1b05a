//! # sitepact-core — Foundational Types for the Sitepact Escrow Engine
//!
//! This crate is the bedrock of the workspace. It defines the primitives
//! every other crate builds on; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `PartyId`, `ServiceId`,
//!    `DisputeId`, `EvidenceId` — no bare strings or integers for
//!    identifiers, and no accidental cross-namespace confusion.
//!
//! 2. **Canonical identity.** A `PartyId` is validated and lowercased at
//!    construction, so authorization is exact equality. No call site ever
//!    case-folds an address.
//!
//! 3. **Checked integer money.** `Amount` counts minor units in a `u64`
//!    with checked arithmetic. No floats in the money path, no silent
//!    wrap-around.
//!
//! 4. **One exhaustive trade catalog.** `TradeCategory` is a single enum
//!    matched structurally everywhere; there is no integer-indexed label
//!    table to run off the end of.
//!
//! 5. **UTC-only timestamps.** `Timestamp` is seconds-precision UTC with a
//!    `Z`-suffixed canonical rendering.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sitepact-*` crates (leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Public types derive `Debug`, `Clone`, `Serialize`, `Deserialize`.

pub mod amount;
pub mod catalog;
pub mod digest;
pub mod error;
pub mod identity;
pub mod time;

// Re-export primary types for ergonomic imports.
pub use amount::Amount;
pub use catalog::TradeCategory;
pub use digest::ContentDigest;
pub use error::EscrowError;
pub use identity::{DisputeId, EvidenceId, PartyId, ServiceId};
pub use time::Timestamp;
