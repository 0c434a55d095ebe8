//! Repository modules implementing Tally operations.
//!
//! Each module adds methods to `TallyService` via `impl TallyService` blocks.

pub mod activity;
pub mod export;
pub mod import;
pub mod instances;
pub mod items;
