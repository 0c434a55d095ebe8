//! # tally-ingest
//!
//! Turns loosely-labelled spreadsheet rows into canonical records.
//!
//! - [`aliases`]: canonical field to ordered header spellings, and the
//!   inverse display-header mapping used by exporters
//! - [`coerce`]: raw cell to target type, each with a fixed fallback
//! - [`resolve`]: case-insensitive first-alias-wins header lookup
//! - [`normalize`]: one row to one record (plus an optional instance)
//! - [`export`]: records back to a header + rows table

pub mod aliases;
pub mod coerce;
pub mod error;
pub mod export;
pub mod normalize;
pub mod resolve;

pub use aliases::AliasTable;
pub use error::{AliasError, RowParseError, RowParseReason};
pub use export::{ExportTable, export_table};
pub use normalize::{NormalizedRow, RowNormalizer};
