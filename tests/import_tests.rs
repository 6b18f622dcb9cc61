mod common;

use assert_fs::prelude::*;
use common::{day, draft, manager_at};
use finance_core::{
    core::importer::{sanitize_import, MAX_IMPORT_BYTES},
    errors::{ImportError, LedgerError},
    ledger::{Currency, Settings},
};
use serde_json::{json, Value};

fn one_record_document() -> String {
    json!({
        "records": [
            {"id": "r1", "description": "Groceries", "amount": 41.2, "category": "Food", "date": "2024-01-04"}
        ]
    })
    .to_string()
}

#[test]
fn non_json_extension_is_rejected_before_parsing() {
    let dir = assert_fs::TempDir::new().unwrap();
    let file = dir.child("data.txt");
    file.write_str(&one_record_document()).unwrap();

    let (mut manager, _, _) = manager_at(day(2024, 1, 10));
    let err = manager.import_file(file.path()).unwrap_err();
    assert!(matches!(err, LedgerError::Import(ImportError::WrongFileType(_))));
    assert!(manager.records().is_empty());
}

#[test]
fn six_megabyte_file_is_rejected_before_parsing() {
    let dir = assert_fs::TempDir::new().unwrap();
    let file = dir.child("big.json");
    let mut text = one_record_document();
    text.push_str(&" ".repeat(6 * 1024 * 1024));
    file.write_str(&text).unwrap();

    let (mut manager, _, _) = manager_at(day(2024, 1, 10));
    let err = manager.import_file(file.path()).unwrap_err();
    match err {
        LedgerError::Import(ImportError::FileTooLarge { size, limit }) => {
            assert!(size > limit);
            assert_eq!(limit, MAX_IMPORT_BYTES);
        }
        other => panic!("expected FileTooLarge, got {other:?}"),
    }
}

#[test]
fn four_megabyte_json_file_is_accepted() {
    let dir = assert_fs::TempDir::new().unwrap();
    let file = dir.child("backup.json");
    let mut text = one_record_document();
    text.push_str(&" ".repeat(4 * 1024 * 1024 - text.len()));
    file.write_str(&text).unwrap();

    let (mut manager, _, _) = manager_at(day(2024, 1, 10));
    let report = manager.import_file(file.path()).unwrap();
    assert_eq!(report.accepted, 1);
    assert_eq!(manager.records()[0].description, "Groceries");
}

#[test]
fn missing_file_is_a_read_failure() {
    let dir = assert_fs::TempDir::new().unwrap();
    let (mut manager, _, _) = manager_at(day(2024, 1, 10));
    let err = manager
        .import_file(&dir.path().join("absent.json"))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Import(ImportError::ReadFailure(_))));
}

#[test]
fn export_then_import_keeps_records() {
    let (mut source, _, _) = manager_at(day(2024, 1, 10));
    source
        .add_or_update_record(&draft("Rent share", "450", "Fees", "2024-01-01"))
        .unwrap();
    source
        .add_or_update_record(&draft("Textbook", "89.99", "Books", "2024-01-03"))
        .unwrap();
    source.set_base_currency(Currency::EUR).unwrap();
    let exported = source.export_snapshot().unwrap();

    let document: Value = serde_json::from_str(&exported).unwrap();
    assert!(document.get("exportDate").is_some());
    assert!(document.get("ui").is_none());
    assert!(document["settings"].get("rates").is_none());

    let (mut target, _, _) = manager_at(day(2024, 1, 10));
    let report = target.import_document(&exported).unwrap();
    assert_eq!(report.accepted, 2);
    for (before, after) in source.records().iter().zip(target.records()) {
        assert_eq!(before.id, after.id);
        assert_eq!(before.description, after.description);
        assert_eq!(before.amount, after.amount);
        assert_eq!(before.created_at, after.created_at);
    }
    assert_eq!(target.settings().base_currency, Currency::EUR);
}

#[test]
fn import_coerces_rows_and_merges_settings() {
    let (mut manager, _, _) = manager_at(day(2024, 1, 10));
    manager.set_monthly_cap(750.0).unwrap();
    let text = json!({
        "records": [
            {"id": "a<b>", "description": "Caf\u{e9} \"latte\"", "amount": 5_000_000, "category": "Food & Drink", "date": "01/02/2024"},
            {"id": "neg", "description": "Refund", "amount": -3},
            {"id": "str", "description": "Text amount", "amount": "12"},
            {"description": "No id", "amount": 1}
        ],
        "settings": {
            "baseCurrency": "GBP",
            "monthlyCap": -10,
            "categories": ["Food!", "  ", "Travel", "Food"]
        }
    })
    .to_string();

    let report = manager.import_document(&text).unwrap();
    assert_eq!(report.accepted, 1);
    assert_eq!(report.discarded, 3);

    let record = &manager.records()[0];
    assert_eq!(record.id, "ab");
    assert_eq!(record.description, "Caf\u{e9} latte");
    assert_eq!(record.amount, 999_999.99);
    assert_eq!(record.category, "Food  Drink");
    assert_eq!(record.date, "2024-01-10");

    let settings = manager.settings();
    assert_eq!(settings.base_currency, Currency::USD);
    assert_eq!(settings.monthly_cap, 750.0);
    assert_eq!(settings.categories, ["Food", "Travel"]);
}

#[test]
fn category_list_is_truncated_to_twenty() {
    let names: Vec<String> = (0..25).map(|i| format!("Cat{i}")).collect();
    let raw = json!({
        "records": [{"id": "x", "description": "y", "amount": 1}],
        "settings": {"categories": names, "monthlyCap": 2_000_000}
    });
    let result = sanitize_import(&raw, &Settings::default(), chrono::Utc::now()).unwrap();
    assert_eq!(result.settings.categories.len(), 20);
    assert_eq!(result.settings.monthly_cap, 999_999.0);
}

#[test]
fn sanitizer_never_panics_on_malformed_input() {
    let inputs = vec![
        json!(null),
        json!([]),
        json!(42),
        json!("records"),
        json!({}),
        json!({"records": null}),
        json!({"records": {}}),
        json!({"records": [null, 1, "x", [], {}]}),
        json!({"records": [{"id": {}, "description": [], "amount": "5"}]}),
        json!({"records": [{"id": true, "description": 3, "amount": 1e308, "category": {}, "date": 5, "createdAt": "nope"}]}),
        json!({"records": [{"id": "ok", "description": "fine", "amount": 0}], "settings": {"baseCurrency": 5, "monthlyCap": "x", "categories": "Food"}}),
        json!({"version": "1", "records": []}),
        json!({"version": -1, "records": []}),
        json!({"version": 2, "records": [{"id": "a", "description": "b", "amount": 1}]}),
    ];

    for raw in inputs {
        match sanitize_import(&raw, &Settings::default(), chrono::Utc::now()) {
            Ok(ledger) => assert!(!ledger.records.is_empty(), "empty success for {raw}"),
            Err(
                ImportError::InvalidStructure(_)
                | ImportError::NoValidRecords
                | ImportError::UnsupportedVersion(_),
            ) => {}
            Err(other) => panic!("unexpected error {other:?} for {raw}"),
        }
    }
}
