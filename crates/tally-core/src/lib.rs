//! # tally-core
//!
//! Core types, change detection, and audit logging for Tally.
//!
//! This crate provides the foundational types shared across all Tally crates:
//! - The canonical inventory record, its instances, and activity log entries
//! - The closed `CellValue` sum type for raw spreadsheet rows
//! - Field-level change detection between record snapshots
//! - Deterministic narration of change sets
//! - The `AuditLogger` that persists log entries through a `LogStore`
//! - Store contracts (`RecordStore`, `InstanceStore`, `LogStore`) and an
//!   in-memory implementation
//! - Partial-update builders and cross-cutting error types

pub mod audit;
pub mod audit_detail;
pub mod cell;
pub mod changes;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod memory;
pub mod narrate;
pub mod responses;
pub mod store;
pub mod updates;
