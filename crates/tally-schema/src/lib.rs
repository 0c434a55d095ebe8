//! # tally-schema
//!
//! Schema evolution and validation for Tally.
//!
//! This crate provides:
//! - [`migrate`]: the single seam that upgrades stored records of any past
//!   shape into the current canonical record (plus split-off instances)
//! - [`legacy`]: read-side upgrade of activity log entries written under
//!   older field and action names
//! - [`SchemaRegistry`]: JSON Schemas generated from tally-core types, and
//!   validation of log payloads against them
//!
//! Nothing outside this crate branches on which shape a stored value had.

pub mod error;
pub mod legacy;
pub mod migrate;
pub mod registry;

pub use error::{MigrationError, SchemaError};
pub use legacy::{upgrade_change_set, upgrade_entry};
pub use migrate::{CURRENT_RECORD_VERSION, MigratedRecord, migrate};
pub use registry::SchemaRegistry;
