use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use tally_core::entities::CanonicalRecord;
use tally_ingest::{AliasTable, RowNormalizer, RowParseReason, export_table};

fn normalizer() -> RowNormalizer {
    RowNormalizer::new(AliasTable::builtin())
}

#[test]
fn normalize_export_normalize_is_stable() {
    let sources = [
        json!({
            "Nomenclature": "Radio",
            "LIN": "a1b2c3",
            "NSN": "1005-01-123-4567",
            "Unit of Issue": "each",
            "Qty Authorized": "10",
            "Qty On Hand": "7",
            "Flag": "Y",
            "Remarks": "antenna bent",
            "Date Verified": "2026-02-01"
        }),
        json!({
            "item name": "Tent, 5-man",
            "line item": "T12345",
            "quantity authorized": 2,
            "on hand": 4,
            "highlight": "no"
        }),
        json!({"Description": "Cable", "Shortage": "3"}),
    ];

    let first: Vec<CanonicalRecord> = sources
        .iter()
        .enumerate()
        .map(|(i, raw)| normalizer().normalize_json(i, raw).unwrap().record)
        .collect();

    let table = export_table(normalizer().aliases(), &first);
    let second: Vec<CanonicalRecord> = table
        .to_rows()
        .iter()
        .enumerate()
        .map(|(i, row)| normalizer().normalize(i, row).unwrap().record)
        .collect();

    assert_eq!(second.len(), first.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.nomenclature, b.nomenclature);
        assert_eq!(a.line_item_number, b.line_item_number);
        assert_eq!(a.stock_number, b.stock_number);
        assert_eq!(a.unit_of_issue, b.unit_of_issue);
        assert_eq!(a.quantity_authorized, b.quantity_authorized);
        assert_eq!(a.quantity_on_hand, b.quantity_on_hand);
        assert_eq!(a.quantity_short, b.quantity_short);
        assert_eq!(a.is_flagged, b.is_flagged);
        assert_eq!(a.notes, b.notes);
        assert_eq!(a.last_verified_at, b.last_verified_at);
    }
    assert_eq!(second[2].quantity_short, 3.0);
    assert_eq!(
        second[0].last_verified_at,
        Some(Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap())
    );
}

#[test]
fn shortage_invariant_holds_for_known_quantities() {
    for (authorized, on_hand) in [(0.0, 0.0), (10.0, 7.0), (3.0, 9.0), (5.5, 2.25), (1e6, 1.0)] {
        let row = json!({"Qty Authorized": authorized, "Qty On Hand": on_hand, "Qty Short": 42});
        let record = normalizer().normalize_json(0, &row).unwrap().record;
        assert_eq!(record.quantity_short, f64::max(0.0, authorized - on_hand));
    }
}

#[test]
fn batch_with_one_malformed_row() {
    let batch = [
        json!({"Nomenclature": "Radio"}),
        json!("not a row"),
        json!({"Nomenclature": "Tent"}),
    ];
    let mut accepted = Vec::new();
    let mut rejected = Vec::new();
    for (i, raw) in batch.iter().enumerate() {
        match normalizer().normalize_json(i, raw) {
            Ok(row) => accepted.push(row.record.nomenclature),
            Err(e) => {
                assert_eq!(e.reason, RowParseReason::NotAMapping);
                rejected.push(e.row);
            }
        }
    }
    assert_eq!(accepted, vec!["Radio", "Tent"]);
    assert_eq!(rejected, vec![1]);
}
