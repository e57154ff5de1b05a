//! # sitepact-custody — Fund Custody
//!
//! The opaque value-custody primitive the rest of the engine settles
//! against. A [`CustodyVault`] locks a balance per service, pays portions
//! out on milestone approval, and pays the residual out on dispute
//! resolution. The [`InMemoryVault`] implementation backs tests and the
//! demo binary; production deployments supply their own implementation of
//! the trait over whatever custody substrate they use.
//!
//! ## Crate Policy
//!
//! - Depends only on `sitepact-core` internally.
//! - Every operation is atomic; a failed call leaves balances untouched.

pub mod vault;

pub use vault::{CustodyError, CustodyVault, InMemoryVault, Transfer, TransferKind};
