//! # sitepact-arbitration — Dispute Resolution
//!
//! The arbitration side of the escrow engine:
//!
//! - **Dispute** (`dispute.rs`): the dispute record and its
//!   `Open → Resolved` state machine, with a party snapshot taken at the
//!   moment the dispute is raised.
//!
//! - **Evidence** (`evidence.rs`): append-only, content-digested evidence
//!   items with integrity verification.
//!
//! - **Policy** (`policy.rs`): evidence bounds and the optional mediator
//!   roster.
//!
//! - **Registry** (`registry.rs`): the workflow that freezes a service's
//!   settlement, collects evidence, and lets a mediator allocate the
//!   frozen residual — always through the ledger, never touching custody
//!   directly.
//!
//! ## Crate Policy
//!
//! - Depends on `sitepact-core`, `sitepact-custody`, and
//!   `sitepact-ledger` internally.
//! - Dispute records become immutable at resolution.

pub mod dispute;
pub mod evidence;
pub mod policy;
pub mod registry;

pub use dispute::{Dispute, DisputeState, Resolution};
pub use evidence::Evidence;
pub use policy::DisputePolicy;
pub use registry::DisputeRegistry;
