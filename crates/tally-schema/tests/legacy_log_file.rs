use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tally_core::enums::{ActivityAction, Field};
use tally_schema::upgrade_entry;

#[test]
fn mixed_version_log_file_reads_in_current_shape() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("activity.jsonl");

    let lines = vec![
        json!({
            "id": 1,
            "timestamp": "2024-09-01T08:00:00Z",
            "action": "created",
            "itemId": 1,
            "details": {"nomenclature": "Radio", "line_item_number": "a1b2c3", "stock_number": "", "quantity_on_hand": 1.0}
        }),
        json!({
            "id": 2,
            "timestamp": "2024-09-02T08:00:00Z",
            "action": "updated",
            "itemId": 1,
            "changes": [
                {"field": "name", "before": "Radio", "after": "Radio Set"},
                {"field": "qty", "before": 1, "after": 3}
            ]
        }),
        json!({
            "v": 2,
            "id": 3,
            "timestamp": "2026-01-10T08:00:00Z",
            "action": "verified",
            "item_id": 1,
            "detail": {"kind": "changes", "data": [
                {"field": "last_verified_at", "before": null, "after": "2026-01-10T08:00:00+00:00"}
            ]}
        }),
    ];
    serde_jsonlines::write_json_lines(&path, &lines).unwrap();

    let entries: Vec<_> = serde_jsonlines::json_lines::<Value, _>(&path)
        .unwrap()
        .map(|line| upgrade_entry(line.unwrap()).unwrap())
        .collect();

    assert_eq!(
        entries.iter().map(|e| e.action).collect::<Vec<_>>(),
        vec![
            ActivityAction::ItemAdded,
            ActivityAction::Edited,
            ActivityAction::Verified
        ]
    );
    assert_eq!(entries.iter().map(|e| e.v).collect::<Vec<_>>(), vec![1, 1, 2]);

    let edit = entries[1].detail.changes().unwrap();
    assert_eq!(
        edit.fields(),
        vec![Field::Nomenclature, Field::QuantityOnHand]
    );
    assert_eq!(
        entries[1].summary(),
        "changed on-hand quantity from 1 to 3 (+1 more)"
    );
    assert_eq!(entries[0].summary(), "added Radio (LIN a1b2c3)");
}
