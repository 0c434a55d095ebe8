use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::ItemId;

/// The normalized inventory item.
///
/// `quantity_short` is derived: whenever both quantities are known it equals
/// `max(0, quantity_authorized - quantity_on_hand)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CanonicalRecord {
    /// Assigned by the record store; absent before first persist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    pub nomenclature: String,
    pub line_item_number: String,
    pub stock_number: String,
    pub unit_of_issue: String,
    pub quantity_authorized: f64,
    pub quantity_on_hand: f64,
    pub quantity_short: f64,
    pub is_flagged: bool,
    #[serde(default)]
    pub notes: Option<String>,
    /// Opaque photo references, in insertion order.
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub last_verified_at: Option<DateTime<Utc>>,
    /// Bumped by the record store on every persisted update.
    #[serde(default)]
    pub revision: u32,
}

impl CanonicalRecord {
    /// Recompute `quantity_short` from the two quantities.
    pub fn recompute_short(&mut self) {
        self.quantity_short = derived_short(self.quantity_authorized, self.quantity_on_hand);
    }

    /// Copy with the store-assigned id set.
    #[must_use]
    pub fn with_id(mut self, id: ItemId) -> Self {
        self.id = Some(id);
        self
    }
}

/// `max(0, authorized - on_hand)`.
#[must_use]
pub fn derived_short(authorized: f64, on_hand: f64) -> f64 {
    (authorized - on_hand).max(0.0)
}
