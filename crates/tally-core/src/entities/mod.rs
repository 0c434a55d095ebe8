//! Entity structs for Tally domain objects.
//!
//! Each entity maps to a table in the libSQL database and to a JSON shape in
//! the JSONL log. All structs derive `Serialize`, `Deserialize`, and
//! `JsonSchema` for JSON roundtrip and schema validation.

mod instance;
mod log_entry;
mod record;

pub use instance::{Instance, InstanceFields};
pub use log_entry::{LOG_ENTRY_VERSION, LogDetail, LogEntry, PendingEntry, Subject};
pub use record::{CanonicalRecord, derived_short};
