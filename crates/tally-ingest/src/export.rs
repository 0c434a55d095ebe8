//! Records back to a table.
//!
//! Headers come from [`AliasTable::display_header`], so normalizing an
//! exported row reproduces the record for every exported field. Ids,
//! photos, and revisions are internal and never exported.

use serde::Serialize;
use tally_core::cell::{CellValue, Row};
use tally_core::entities::CanonicalRecord;
use tally_core::enums::Field;

use crate::aliases::AliasTable;

/// Exported fields, in column order.
pub const EXPORTED_FIELDS: [Field; 10] = [
    Field::Nomenclature,
    Field::LineItemNumber,
    Field::StockNumber,
    Field::UnitOfIssue,
    Field::QuantityAuthorized,
    Field::QuantityOnHand,
    Field::QuantityShort,
    Field::IsFlagged,
    Field::Notes,
    Field::LastVerifiedAt,
];

/// Header row plus one row of cells per record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl ExportTable {
    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Each data row keyed by header, as a row source would produce it.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Row> {
        self.rows
            .iter()
            .map(|cells| {
                self.headers
                    .iter()
                    .cloned()
                    .zip(cells.iter().cloned())
                    .collect()
            })
            .collect()
    }
}

/// Build the export table for `records`.
#[must_use]
pub fn export_table(aliases: &AliasTable, records: &[CanonicalRecord]) -> ExportTable {
    let columns: Vec<(Field, String)> = EXPORTED_FIELDS
        .into_iter()
        .map(|f| {
            let header = aliases
                .display_header(f)
                .map_or_else(|| f.as_str().to_string(), str::to_string);
            (f, header)
        })
        .collect();

    ExportTable {
        headers: columns.iter().map(|(_, h)| h.clone()).collect(),
        rows: records
            .iter()
            .map(|record| columns.iter().map(|(f, _)| cell(record, *f)).collect())
            .collect(),
    }
}

fn cell(record: &CanonicalRecord, field: Field) -> CellValue {
    match field {
        Field::Nomenclature => CellValue::text(record.nomenclature.as_str()),
        Field::LineItemNumber => CellValue::text(record.line_item_number.as_str()),
        Field::StockNumber => CellValue::text(record.stock_number.as_str()),
        Field::UnitOfIssue => CellValue::text(record.unit_of_issue.as_str()),
        Field::QuantityAuthorized => CellValue::Number(record.quantity_authorized),
        Field::QuantityOnHand => CellValue::Number(record.quantity_on_hand),
        Field::QuantityShort => CellValue::Number(record.quantity_short),
        Field::IsFlagged => CellValue::Bool(record.is_flagged),
        Field::Notes => record.notes.as_deref().map_or(CellValue::Empty, CellValue::text),
        Field::LastVerifiedAt => record
            .last_verified_at
            .map_or(CellValue::Empty, |t| CellValue::Text(t.to_rfc3339())),
        Field::Photos | Field::SerialNumber | Field::Location | Field::ConditionCode => {
            CellValue::Empty
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn headers_are_display_headers_in_canonical_order() {
        let table = export_table(&AliasTable::builtin(), &[]);
        assert_eq!(
            table.headers,
            vec![
                "Nomenclature",
                "LIN",
                "NSN",
                "UI",
                "Qty Authorized",
                "Qty On Hand",
                "Qty Short",
                "Flag",
                "Notes",
                "Last Verified",
            ]
        );
        assert!(table.is_empty());
    }

    #[test]
    fn internal_fields_are_not_exported() {
        let record = CanonicalRecord {
            id: Some(12),
            nomenclature: "Radio".to_string(),
            photos: vec!["blob:1".to_string()],
            revision: 3,
            ..CanonicalRecord::default()
        };
        let table = export_table(&AliasTable::builtin(), &[record]);
        let row = &table.rows[0];
        assert_eq!(row.len(), table.headers.len());
        assert!(!row.contains(&CellValue::Number(12.0)));
        assert!(!row.contains(&CellValue::Text("blob:1".to_string())));
        assert_eq!(row[0], CellValue::Text("Radio".to_string()));
    }
}
