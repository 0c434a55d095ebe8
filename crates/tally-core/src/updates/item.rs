//! Record update builder.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entities::CanonicalRecord;

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nomenclature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_item_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_of_issue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_authorized: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_on_hand: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_flagged: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_verified_at: Option<Option<DateTime<Utc>>>,
    /// When set, the store rejects the update unless the stored revision
    /// still matches.
    #[serde(skip)]
    pub expected_revision: Option<u32>,
}

impl ItemUpdate {
    /// True when no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nomenclature.is_none()
            && self.line_item_number.is_none()
            && self.stock_number.is_none()
            && self.unit_of_issue.is_none()
            && self.quantity_authorized.is_none()
            && self.quantity_on_hand.is_none()
            && self.is_flagged.is_none()
            && self.notes.is_none()
            && self.photos.is_none()
            && self.last_verified_at.is_none()
    }

    /// True when the update touches either quantity, so the shortage has to be
    /// recomputed.
    #[must_use]
    pub const fn touches_quantities(&self) -> bool {
        self.quantity_authorized.is_some() || self.quantity_on_hand.is_some()
    }

    /// Post-update snapshot of `old`. `quantity_short` is recomputed only when
    /// a quantity changes; `revision` is always bumped.
    #[must_use]
    pub fn apply(&self, old: &CanonicalRecord) -> CanonicalRecord {
        let mut new = old.clone();
        if let Some(ref v) = self.nomenclature {
            new.nomenclature.clone_from(v);
        }
        if let Some(ref v) = self.line_item_number {
            new.line_item_number.clone_from(v);
        }
        if let Some(ref v) = self.stock_number {
            new.stock_number.clone_from(v);
        }
        if let Some(ref v) = self.unit_of_issue {
            new.unit_of_issue.clone_from(v);
        }
        if let Some(v) = self.quantity_authorized {
            new.quantity_authorized = v;
        }
        if let Some(v) = self.quantity_on_hand {
            new.quantity_on_hand = v;
        }
        if let Some(v) = self.is_flagged {
            new.is_flagged = v;
        }
        if let Some(ref v) = self.notes {
            new.notes.clone_from(v);
        }
        if let Some(ref v) = self.photos {
            new.photos.clone_from(v);
        }
        if let Some(v) = self.last_verified_at {
            new.last_verified_at = v;
        }
        if self.touches_quantities() {
            new.recompute_short();
        }
        new.revision = old.revision.saturating_add(1);
        new
    }
}

pub struct ItemUpdateBuilder(ItemUpdate);

impl ItemUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(ItemUpdate::default())
    }

    #[must_use]
    pub fn nomenclature(mut self, val: impl Into<String>) -> Self {
        self.0.nomenclature = Some(val.into());
        self
    }

    #[must_use]
    pub fn line_item_number(mut self, val: impl Into<String>) -> Self {
        self.0.line_item_number = Some(val.into());
        self
    }

    #[must_use]
    pub fn stock_number(mut self, val: impl Into<String>) -> Self {
        self.0.stock_number = Some(val.into());
        self
    }

    #[must_use]
    pub fn unit_of_issue(mut self, val: impl Into<String>) -> Self {
        self.0.unit_of_issue = Some(val.into());
        self
    }

    #[must_use]
    pub const fn quantity_authorized(mut self, val: f64) -> Self {
        self.0.quantity_authorized = Some(val);
        self
    }

    #[must_use]
    pub const fn quantity_on_hand(mut self, val: f64) -> Self {
        self.0.quantity_on_hand = Some(val);
        self
    }

    #[must_use]
    pub const fn is_flagged(mut self, val: bool) -> Self {
        self.0.is_flagged = Some(val);
        self
    }

    #[must_use]
    pub fn notes(mut self, val: Option<String>) -> Self {
        self.0.notes = Some(val);
        self
    }

    #[must_use]
    pub fn photos(mut self, val: Vec<String>) -> Self {
        self.0.photos = Some(val);
        self
    }

    #[must_use]
    pub const fn last_verified_at(mut self, val: Option<DateTime<Utc>>) -> Self {
        self.0.last_verified_at = Some(val);
        self
    }

    #[must_use]
    pub const fn expected_revision(mut self, val: u32) -> Self {
        self.0.expected_revision = Some(val);
        self
    }

    #[must_use]
    pub fn build(self) -> ItemUpdate {
        self.0
    }
}

impl Default for ItemUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn radio() -> CanonicalRecord {
        CanonicalRecord {
            id: Some(1),
            nomenclature: "Radio".to_string(),
            quantity_authorized: 10.0,
            quantity_on_hand: 7.0,
            quantity_short: 3.0,
            revision: 2,
            ..CanonicalRecord::default()
        }
    }

    #[test]
    fn apply_recomputes_short_and_bumps_revision() {
        let update = ItemUpdateBuilder::new().quantity_on_hand(12.0).build();
        let new = update.apply(&radio());
        assert_eq!(new.quantity_on_hand, 12.0);
        assert_eq!(new.quantity_short, 0.0);
        assert_eq!(new.revision, 3);
        assert_eq!(new.id, Some(1));
    }

    #[test]
    fn flag_toggle_keeps_stored_shortage() {
        let mut old = radio();
        old.quantity_on_hand = 0.0;
        old.quantity_short = 2.0;
        let new = ItemUpdateBuilder::new().is_flagged(true).build().apply(&old);
        assert_eq!(new.quantity_short, 2.0);
        assert!(new.is_flagged);
        assert!(!ItemUpdateBuilder::new().is_flagged(true).build().touches_quantities());
    }

    #[test]
    fn notes_can_be_cleared() {
        let mut old = radio();
        old.notes = Some("dented".to_string());
        let new = ItemUpdateBuilder::new().notes(None).build().apply(&old);
        assert_eq!(new.notes, None);
    }

    #[test]
    fn empty_update() {
        assert!(ItemUpdate::default().is_empty());
        assert!(ItemUpdateBuilder::new().expected_revision(1).build().is_empty());
        assert!(!ItemUpdateBuilder::new().is_flagged(true).build().is_empty());
    }

    #[test]
    fn serializes_only_set_fields() {
        let update = ItemUpdateBuilder::new()
            .is_flagged(true)
            .expected_revision(4)
            .build();
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"is_flagged": true})
        );
    }
}
