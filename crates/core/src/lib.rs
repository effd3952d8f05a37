//! Coral Core - Shared types library.
//!
//! This crate provides common types used across all Coral components:
//! - `sync` - Catalog sync and webhook reconciliation engine
//! - `cli` - Command-line tools for migrations and sync runs
//!
//! # Architecture
//!
//! The core crate contains only types and parsing helpers - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows
//! it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe local ids, remote platform
//!   ids, and defensive numeric parsing

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
