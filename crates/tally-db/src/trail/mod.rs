//! JSONL activity log.
//!
//! An alternative to the `activity_log` table: one JSON object per line in
//! `{trail_dir}/activity.jsonl`, appended and never rewritten.

pub mod jsonl;

pub use jsonl::JsonlLogStore;
