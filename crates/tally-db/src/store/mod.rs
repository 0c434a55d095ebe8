//! Store contract implementations for [`TallyDb`](crate::TallyDb).
//!
//! Each module implements one `tally-core` store trait. Database errors are
//! mapped into `CoreError` at this boundary.

mod activity;
mod instances;
mod items;
