//! Partial-update builders for record and instance mutations.
//!
//! Each builder produces an update struct with `Option` fields. Only `Some`
//! fields are applied; `apply` produces the full post-update snapshot that
//! the change detector compares against the old one. Nullable fields use
//! `Option<Option<T>>` so "clear" is distinct from "leave alone".

pub mod instance;
pub mod item;

pub use instance::{InstanceUpdate, InstanceUpdateBuilder};
pub use item::{ItemUpdate, ItemUpdateBuilder};
