//! One sheet row to one canonical record.
//!
//! Every field is resolved and coerced independently in canonical order, so
//! a bad cell only ever defaults its own field. The shortage is computed
//! last:
//!
//! - both quantities parsed: `max(0, authorized - on_hand)`, and any
//!   explicit shortage column is ignored
//! - otherwise an explicit shortage column, clamped at zero, if it parses
//! - otherwise derived from the defaulted quantities
//!
//! A row that resolves a serial number also yields one instance.

use serde_json::Value;
use tally_core::cell::Row;
use tally_core::entities::{CanonicalRecord, InstanceFields, derived_short};
use tally_core::enums::{Field, UnitOfIssue};

use crate::aliases::AliasTable;
use crate::coerce::{
    parse_quantity, to_date, to_flag, to_optional_string, to_quantity, to_trimmed_string,
};
use crate::error::{RowParseError, RowParseReason};
use crate::resolve::HeaderIndex;

/// A normalized row.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRow {
    pub record: CanonicalRecord,
    /// Present when the row carried a serial number.
    pub instance: Option<InstanceFields>,
}

/// Normalizes rows against an alias table.
#[derive(Debug, Clone, Default)]
pub struct RowNormalizer {
    aliases: AliasTable,
}

impl RowNormalizer {
    #[must_use]
    pub const fn new(aliases: AliasTable) -> Self {
        Self { aliases }
    }

    #[must_use]
    pub const fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Normalize a raw JSON row. Fails only when the value is not an object
    /// or has no readable headers.
    pub fn normalize_json(&self, index: usize, raw: &Value) -> Result<NormalizedRow, RowParseError> {
        let row = Row::from_json(raw).ok_or(RowParseError {
            row: index,
            reason: RowParseReason::NotAMapping,
        })?;
        self.normalize(index, &row)
    }

    /// Normalize one row. `index` is the row's zero-based position in its
    /// batch and only used for error reporting.
    pub fn normalize(&self, index: usize, row: &Row) -> Result<NormalizedRow, RowParseError> {
        let headers = HeaderIndex::new(row);
        if headers.is_empty() {
            return Err(RowParseError {
                row: index,
                reason: RowParseReason::NoHeaders,
            });
        }

        let get = |field| headers.resolve(&self.aliases, field);

        let missing: Vec<&str> = Field::ALL
            .into_iter()
            .filter(|f| *f != Field::Photos && get(*f).is_none())
            .map(Field::as_str)
            .collect();
        if !missing.is_empty() {
            tracing::debug!(row = index, ?missing, "no matching header, using defaults");
        }

        let (quantity_authorized, quantity_on_hand) = fill_quantities(
            parse_quantity(get(Field::QuantityAuthorized)),
            parse_quantity(get(Field::QuantityOnHand)),
            parse_quantity(get(Field::QuantityShort)),
        );
        let quantity_short = derived_short(quantity_authorized, quantity_on_hand);

        let last_verified_at = to_date(get(Field::LastVerifiedAt));

        let record = CanonicalRecord {
            id: None,
            nomenclature: to_trimmed_string(get(Field::Nomenclature)),
            line_item_number: to_trimmed_string(get(Field::LineItemNumber)),
            stock_number: to_trimmed_string(get(Field::StockNumber)),
            unit_of_issue: UnitOfIssue::normalize(&to_trimmed_string(get(Field::UnitOfIssue))),
            quantity_authorized,
            quantity_on_hand,
            quantity_short,
            is_flagged: to_flag(get(Field::IsFlagged)),
            notes: to_optional_string(get(Field::Notes)),
            photos: Vec::new(),
            last_verified_at,
            revision: 0,
        };

        let instance = to_optional_string(get(Field::SerialNumber)).map(|serial_number| {
            InstanceFields {
                serial_number,
                location: to_optional_string(get(Field::Location)),
                condition_code: to_optional_string(get(Field::ConditionCode)),
                last_verified_at,
            }
        });

        Ok(NormalizedRow { record, instance })
    }
}

/// Resolves the stored quantities for a row. An explicit shortage only counts
/// when one of the quantities is missing, and then stands in for it so the
/// stored record still satisfies `short == max(0, authorized - on_hand)`.
fn fill_quantities(
    authorized: Option<f64>,
    on_hand: Option<f64>,
    short: Option<f64>,
) -> (f64, f64) {
    let short = short.map(|s| s.max(0.0));
    match (authorized, on_hand, short) {
        (Some(a), Some(h), _) => (a, h),
        (Some(a), None, Some(s)) => (a, (a - s).max(0.0)),
        (None, Some(h), Some(s)) => (h + s, h),
        (None, None, Some(s)) => (s, 0.0),
        (a, h, None) => (a.unwrap_or(0.0), h.unwrap_or(0.0)),
    }
}
