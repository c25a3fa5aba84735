//! `pos-config` - a transactional configuration store for point-of-sale
//! installations.
//!
//! This crate persists the configuration records a terminal needs to run
//! (database connections, printer mappings, system settings) into a
//! hierarchical key/value namespace, with atomic multi-key initialization,
//! singleton-flag invariants, and a pollable health snapshot.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    unsafe_code,
    unsafe_op_in_unsafe_fn,
    unreachable_code,
    unreachable_patterns,
    unused_must_use,
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::dbg_macro,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    future_incompatible,
    rust_2018_idioms,
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,  // Common pattern in Rust
    clippy::missing_errors_doc,        // Will add gradually
    clippy::missing_panics_doc,        // Will add gradually
)]

/// Application configuration for the administrative CLI
pub mod config;
/// Unified error types and result handling
pub mod errors;
/// Injected collaborator interfaces (clock, identity, error sink)
pub mod providers;
/// Typed configuration records
pub mod records;
/// Persistence core: key store, codec, CRUD, health, backup
pub mod store;

#[cfg(test)]
pub mod test_utils;
