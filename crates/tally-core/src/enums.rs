//! Canonical fields, activity actions, and unit-of-issue codes for Tally.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! The string forms are what the stores persist and what change sets carry.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

/// A tracked field of a canonical record or of an instance.
///
/// Declaration order is the canonical field order: resolution, diffing, and
/// export all walk fields in this order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Nomenclature,
    LineItemNumber,
    StockNumber,
    UnitOfIssue,
    QuantityAuthorized,
    QuantityOnHand,
    QuantityShort,
    IsFlagged,
    Notes,
    Photos,
    LastVerifiedAt,
    SerialNumber,
    Location,
    ConditionCode,
}

impl Field {
    /// Every field, in canonical order.
    pub const ALL: [Self; 14] = [
        Self::Nomenclature,
        Self::LineItemNumber,
        Self::StockNumber,
        Self::UnitOfIssue,
        Self::QuantityAuthorized,
        Self::QuantityOnHand,
        Self::QuantityShort,
        Self::IsFlagged,
        Self::Notes,
        Self::Photos,
        Self::LastVerifiedAt,
        Self::SerialNumber,
        Self::Location,
        Self::ConditionCode,
    ];

    /// Fields of the canonical record itself, in canonical order.
    pub const RECORD: [Self; 11] = [
        Self::Nomenclature,
        Self::LineItemNumber,
        Self::StockNumber,
        Self::UnitOfIssue,
        Self::QuantityAuthorized,
        Self::QuantityOnHand,
        Self::QuantityShort,
        Self::IsFlagged,
        Self::Notes,
        Self::Photos,
        Self::LastVerifiedAt,
    ];

    /// Fields of an instance, in canonical order.
    pub const INSTANCE: [Self; 4] = [
        Self::SerialNumber,
        Self::Location,
        Self::ConditionCode,
        Self::LastVerifiedAt,
    ];

    /// Narration priority, most specific first.
    ///
    /// When several fields change in one action, the summary line names the
    /// first entry of this list that is present in the change set.
    pub const NARRATION_PRIORITY: [Self; 14] = [
        Self::IsFlagged,
        Self::LastVerifiedAt,
        Self::Photos,
        Self::Notes,
        Self::QuantityOnHand,
        Self::QuantityAuthorized,
        Self::QuantityShort,
        Self::SerialNumber,
        Self::ConditionCode,
        Self::Location,
        Self::UnitOfIssue,
        Self::StockNumber,
        Self::LineItemNumber,
        Self::Nomenclature,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nomenclature => "nomenclature",
            Self::LineItemNumber => "line_item_number",
            Self::StockNumber => "stock_number",
            Self::UnitOfIssue => "unit_of_issue",
            Self::QuantityAuthorized => "quantity_authorized",
            Self::QuantityOnHand => "quantity_on_hand",
            Self::QuantityShort => "quantity_short",
            Self::IsFlagged => "is_flagged",
            Self::Notes => "notes",
            Self::Photos => "photos",
            Self::LastVerifiedAt => "last_verified_at",
            Self::SerialNumber => "serial_number",
            Self::Location => "location",
            Self::ConditionCode => "condition_code",
        }
    }

    /// Human label used in narration.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Nomenclature => "nomenclature",
            Self::LineItemNumber => "LIN",
            Self::StockNumber => "NSN",
            Self::UnitOfIssue => "unit of issue",
            Self::QuantityAuthorized => "authorized quantity",
            Self::QuantityOnHand => "on-hand quantity",
            Self::QuantityShort => "shortage",
            Self::IsFlagged => "flag",
            Self::Notes => "notes",
            Self::Photos => "photos",
            Self::LastVerifiedAt => "last verified",
            Self::SerialNumber => "serial number",
            Self::Location => "location",
            Self::ConditionCode => "condition code",
        }
    }

    /// Look a field up by its snake_case name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }

    /// Position in the narration priority list (lower is more specific).
    #[must_use]
    pub fn narration_rank(self) -> usize {
        Self::NARRATION_PRIORITY
            .iter()
            .position(|f| *f == self)
            .unwrap_or(Self::NARRATION_PRIORITY.len())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ActivityAction
// ---------------------------------------------------------------------------

/// The closed set of actions an activity log entry can describe.
///
/// Lineage of a single record:
///
/// ```text
/// item_added → { edited, flagged ⇄ unflagged, verified,
///                photo_added ⇄ photo_removed, notes_changed }* → deleted
/// ```
///
/// `deleted` is terminal. `imported` and `exported` describe batches and have
/// no single subject record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    ItemAdded,
    Edited,
    Deleted,
    Imported,
    Exported,
    PhotoAdded,
    PhotoRemoved,
    Flagged,
    Unflagged,
    Verified,
    NotesChanged,
    InstanceAdded,
    InstanceEdited,
    InstanceDeleted,
}

impl ActivityAction {
    /// Every action, in declaration order.
    pub const ALL: [Self; 14] = [
        Self::ItemAdded,
        Self::Edited,
        Self::Deleted,
        Self::Imported,
        Self::Exported,
        Self::PhotoAdded,
        Self::PhotoRemoved,
        Self::Flagged,
        Self::Unflagged,
        Self::Verified,
        Self::NotesChanged,
        Self::InstanceAdded,
        Self::InstanceEdited,
        Self::InstanceDeleted,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ItemAdded => "item_added",
            Self::Edited => "edited",
            Self::Deleted => "deleted",
            Self::Imported => "imported",
            Self::Exported => "exported",
            Self::PhotoAdded => "photo_added",
            Self::PhotoRemoved => "photo_removed",
            Self::Flagged => "flagged",
            Self::Unflagged => "unflagged",
            Self::Verified => "verified",
            Self::NotesChanged => "notes_changed",
            Self::InstanceAdded => "instance_added",
            Self::InstanceEdited => "instance_edited",
            Self::InstanceDeleted => "instance_deleted",
        }
    }

    /// Whether entries for this action carry a field-level change set
    /// (as opposed to a free-form payload).
    #[must_use]
    pub const fn carries_change_set(self) -> bool {
        matches!(
            self,
            Self::Edited
                | Self::PhotoAdded
                | Self::PhotoRemoved
                | Self::Flagged
                | Self::Unflagged
                | Self::Verified
                | Self::NotesChanged
                | Self::InstanceEdited
        )
    }

    /// Parse the snake_case form, also accepting hyphenated spellings
    /// (`photo-added`).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|a| a.as_str() == normalized)
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// UnitOfIssue
// ---------------------------------------------------------------------------

/// Standard unit-of-issue codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum UnitOfIssue {
    #[serde(rename = "EA")]
    Each,
    #[serde(rename = "PR")]
    Pair,
    #[serde(rename = "SE")]
    Set,
    #[serde(rename = "KT")]
    Kit,
    #[serde(rename = "BX")]
    Box,
    #[serde(rename = "PG")]
    Package,
    #[serde(rename = "RL")]
    Roll,
    #[serde(rename = "GL")]
    Gallon,
    #[serde(rename = "LB")]
    Pound,
    #[serde(rename = "FT")]
    Foot,
    #[serde(rename = "DZ")]
    Dozen,
    #[serde(rename = "CN")]
    Can,
    #[serde(rename = "BT")]
    Bottle,
    #[serde(rename = "CS")]
    Case,
    #[serde(rename = "AY")]
    Assembly,
}

impl UnitOfIssue {
    pub const ALL: [Self; 15] = [
        Self::Each,
        Self::Pair,
        Self::Set,
        Self::Kit,
        Self::Box,
        Self::Package,
        Self::Roll,
        Self::Gallon,
        Self::Pound,
        Self::Foot,
        Self::Dozen,
        Self::Can,
        Self::Bottle,
        Self::Case,
        Self::Assembly,
    ];

    /// Two-letter code as stored on the record.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Each => "EA",
            Self::Pair => "PR",
            Self::Set => "SE",
            Self::Kit => "KT",
            Self::Box => "BX",
            Self::Package => "PG",
            Self::Roll => "RL",
            Self::Gallon => "GL",
            Self::Pound => "LB",
            Self::Foot => "FT",
            Self::Dozen => "DZ",
            Self::Can => "CN",
            Self::Bottle => "BT",
            Self::Case => "CS",
            Self::Assembly => "AY",
        }
    }

    const fn long_names(self) -> &'static [&'static str] {
        match self {
            Self::Each => &["each"],
            Self::Pair => &["pair"],
            Self::Set => &["set"],
            Self::Kit => &["kit"],
            Self::Box => &["box"],
            Self::Package => &["package", "pkg"],
            Self::Roll => &["roll"],
            Self::Gallon => &["gallon", "gal"],
            Self::Pound => &["pound", "lbs"],
            Self::Foot => &["foot", "feet"],
            Self::Dozen => &["dozen"],
            Self::Can => &["can"],
            Self::Bottle => &["bottle"],
            Self::Case => &["case"],
            Self::Assembly => &["assembly"],
        }
    }

    /// Resolve a code or long name, case-insensitively.
    #[must_use]
    pub fn lookup(raw: &str) -> Option<Self> {
        let needle = raw.trim();
        Self::ALL.into_iter().find(|unit| {
            unit.code().eq_ignore_ascii_case(needle)
                || unit
                    .long_names()
                    .iter()
                    .any(|name| name.eq_ignore_ascii_case(needle))
        })
    }

    /// Normalize free text into a stored unit-of-issue string.
    ///
    /// Known codes and long names map to their code; anything else is kept
    /// trimmed and upper-cased. Blank input yields an empty string.
    #[must_use]
    pub fn normalize(raw: &str) -> String {
        Self::lookup(raw).map_or_else(|| raw.trim().to_uppercase(), |unit| unit.code().to_string())
    }
}

impl fmt::Display for UnitOfIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_serde_roundtrip {
        ($name:ident, $ty:ty, $variant:expr, $expected_str:expr) => {
            #[test]
            fn $name() {
                let val = $variant;
                let json = serde_json::to_string(&val).unwrap();
                assert_eq!(json, format!("\"{}\"", $expected_str));
                let recovered: $ty = serde_json::from_str(&json).unwrap();
                assert_eq!(recovered, val);
            }
        };
    }

    test_serde_roundtrip!(field_lin, Field, Field::LineItemNumber, "line_item_number");
    test_serde_roundtrip!(field_flag, Field, Field::IsFlagged, "is_flagged");
    test_serde_roundtrip!(
        action_photo_added,
        ActivityAction,
        ActivityAction::PhotoAdded,
        "photo_added"
    );
    test_serde_roundtrip!(
        action_instance_deleted,
        ActivityAction,
        ActivityAction::InstanceDeleted,
        "instance_deleted"
    );
    test_serde_roundtrip!(unit_each, UnitOfIssue, UnitOfIssue::Each, "EA");

    #[test]
    fn as_str_matches_serde_for_every_field() {
        for field in Field::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.as_str()));
            assert_eq!(Field::from_name(field.as_str()), Some(field));
        }
    }

    #[test]
    fn as_str_matches_serde_for_every_action() {
        for action in ActivityAction::ALL {
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{}\"", action.as_str()));
        }
    }

    #[test]
    fn narration_priority_covers_every_field_once() {
        let mut seen = Field::NARRATION_PRIORITY.to_vec();
        seen.sort();
        assert_eq!(seen, Field::ALL.to_vec());
        assert_eq!(Field::IsFlagged.narration_rank(), 0);
        assert_eq!(Field::Nomenclature.narration_rank(), 13);
    }

    #[test]
    fn action_parse_accepts_hyphens() {
        assert_eq!(
            ActivityAction::parse("photo-added"),
            Some(ActivityAction::PhotoAdded)
        );
        assert_eq!(
            ActivityAction::parse(" Item_Added "),
            Some(ActivityAction::ItemAdded)
        );
        assert_eq!(ActivityAction::parse("renamed"), None);
    }

    #[test]
    fn change_set_actions() {
        assert!(ActivityAction::Flagged.carries_change_set());
        assert!(!ActivityAction::Deleted.carries_change_set());
        assert!(!ActivityAction::Imported.carries_change_set());
    }

    #[test]
    fn unit_lookup_accepts_codes_and_long_names() {
        assert_eq!(UnitOfIssue::lookup("ea"), Some(UnitOfIssue::Each));
        assert_eq!(UnitOfIssue::lookup(" Feet "), Some(UnitOfIssue::Foot));
        assert_eq!(UnitOfIssue::lookup("GALLON"), Some(UnitOfIssue::Gallon));
        assert_eq!(UnitOfIssue::lookup("furlong"), None);
    }

    #[test]
    fn unit_normalize_keeps_unknown_codes_upper_cased() {
        assert_eq!(UnitOfIssue::normalize("each"), "EA");
        assert_eq!(UnitOfIssue::normalize(" hd "), "HD");
        assert_eq!(UnitOfIssue::normalize(""), "");
    }
}
