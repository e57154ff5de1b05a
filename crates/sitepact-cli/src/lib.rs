//! # sitepact-cli — Command-Line Interface
//!
//! Subcommand handlers for the `sitepact` binary. The demos drive a real
//! in-memory engine end to end; nothing here is mocked.

pub mod demo;
