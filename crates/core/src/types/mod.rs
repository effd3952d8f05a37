//! Core types for Coral.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod numeric;
pub mod remote_id;

pub use id::*;
pub use numeric::{parse_count, parse_money};
pub use remote_id::{RemoteId, RemoteIdError};
