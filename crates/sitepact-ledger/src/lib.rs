//! # sitepact-ledger — The Service Ledger
//!
//! Canonical records and settlement logic for funded engagements:
//!
//! - **Service records** (`service.rs`): the `Service` and `Milestone`
//!   records, the `ServiceStatus` machine with validated transitions, and
//!   the append-only status history.
//!
//! - **The ledger** (`ledger.rs`): the keyed store (`ServiceId → Service`)
//!   behind per-service mutexes, service creation with custody locking,
//!   contractor acceptance, snapshot queries, and the dispute
//!   freeze/settle hooks used by the arbitration workflow.
//!
//! - **Settlement** (`settlement.rs`): the completion → approval protocol
//!   that releases milestone amounts, the only normal-operation path by
//!   which value leaves custody.
//!
//! - **Events** (`events.rs`): the typed `EscrowEvent` stream and the
//!   shared `EventLog`, the engine's sole outward interface.
//!
//! ## Crate Policy
//!
//! - All mutating operations on one service are linearizable; operations
//!   on different services are independent.
//! - Every failure is all-or-nothing across the record and the custody
//!   balance.
//! - The ledger is the only component that calls the custody vault.

pub mod events;
pub mod ledger;
pub mod service;
pub mod settlement;

pub use events::{DisputeFavor, EscrowEvent, EventLog};
pub use ledger::ServiceLedger;
pub use service::{Milestone, MilestoneSpec, Service, ServiceStatus, StatusTransition};
