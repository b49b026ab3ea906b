mod common;

use std::io::Cursor;

use calamine::{Reader, Xlsx};
use serde_json::json;

use intake::error::AppError;
use intake::export::{self, Exporter};
use intake::models::Record;
use intake::submission::defaults::{DefaultsProfile, FormDefaults};

use common::record;

fn requests() -> Vec<Record> {
    vec![
        record(json!({
            "appName": "Portal",
            "requestor": "Alice",
            "prodServerCount": 2,
            "sql": true,
            "azureVolume": "300TB",
        })),
        record(json!({
            "appName": "Tool",
            "requestor": "Bob",
            "prodServerCount": 0,
            "sql": false,
            "azureVolume": "1.5TB",
        })),
    ]
}

fn sheet_names(bytes: Vec<u8>) -> Vec<String> {
    let workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).unwrap();
    workbook.sheet_names()
}

// ── Workbook ────────────────────────────────────────────────────

#[test]
fn workbook_round_trips_records() {
    let exporter = Exporter::default();
    let records = requests();

    let bytes = exporter.write_workbook(&records).unwrap();
    let imported = export::read_workbook(bytes).unwrap();

    assert_eq!(imported, records);
}

#[test]
fn header_order_follows_field_order() {
    let exporter = Exporter::default();
    let bytes = exporter.write_workbook(&requests()).unwrap();
    let imported = export::read_workbook(bytes).unwrap();

    let keys: Vec<&str> = imported[0].keys().map(String::as_str).collect();
    assert_eq!(keys, ["appName", "requestor", "prodServerCount", "sql", "azureVolume"]);
}

#[test]
fn workbook_has_one_named_sheet() {
    let bytes = Exporter::new("Intake Requests").write_workbook(&requests()).unwrap();
    assert_eq!(sheet_names(bytes), ["Intake Requests"]);

    let bytes = Exporter::default().write_workbook(&requests()).unwrap();
    assert_eq!(sheet_names(bytes), [export::DEFAULT_SHEET_NAME]);
}

#[test]
fn missing_fields_leave_blank_cells() {
    let records = vec![
        record(json!({ "appName": "Portal", "requestor": "Alice" })),
        record(json!({ "appName": "Tool", "fundCode": "F-12" })),
    ];

    let bytes = Exporter::default().write_workbook(&records).unwrap();
    let imported = export::read_workbook(bytes).unwrap();

    assert_eq!(imported, records);
}

#[test]
fn empty_strings_survive_the_round_trip() {
    let records = vec![
        record(json!({ "appName": "Portal", "fundCode": "" })),
        record(json!({ "appName": "", "fundCode": "" })),
        record(json!({ "appName": "Tool", "fundCode": "F1" })),
        record(json!({ "appName": "", "fundCode": "" })),
    ];

    let bytes = Exporter::default().write_workbook(&records).unwrap();
    let imported = export::read_workbook(bytes).unwrap();

    assert_eq!(imported, records);
}

#[test]
fn default_filled_submissions_round_trip() {
    let defaults = FormDefaults::from_profile(DefaultsProfile::Standard);
    let records = vec![
        defaults.fill(record(json!({ "appName": "Portal", "requestor": "Alice" }))),
        defaults.fill(record(json!({}))),
    ];
    assert!(records[1].values().any(|v| v == ""));

    let bytes = Exporter::default().write_workbook(&records).unwrap();
    let imported = export::read_workbook(bytes).unwrap();

    assert_eq!(imported, records);
}

#[test]
fn nested_values_are_written_as_json_text() {
    let records = vec![record(json!({ "appName": "Portal", "tags": ["a", "b"] }))];

    let bytes = Exporter::default().write_workbook(&records).unwrap();
    let imported = export::read_workbook(bytes).unwrap();

    assert_eq!(imported[0]["tags"], json!("[\"a\",\"b\"]"));
}

#[test]
fn empty_list_gives_an_empty_sheet() {
    let bytes = Exporter::default().write_workbook(&[]).unwrap();
    assert!(export::read_workbook(bytes).unwrap().is_empty());
}

#[test]
fn invalid_sheet_name_is_an_export_error() {
    let err = Exporter::new("bad/name").write_workbook(&requests()).unwrap_err();
    assert!(matches!(err, AppError::Export(_)), "got {err}");
}

#[test]
fn garbage_bytes_are_a_parse_error() {
    let err = export::read_workbook(b"not a spreadsheet".to_vec()).unwrap_err();
    assert!(matches!(err, AppError::Parse(_)), "got {err}");
}

// ── Files ───────────────────────────────────────────────────────

#[tokio::test]
async fn export_then_import_file() {
    let t = common::spawn_store().await;
    let path = t.path("requests.xlsx");

    assert!(Exporter::default().export(&requests(), &path).await);
    assert_eq!(export::import(&path).await.unwrap(), requests());

    common::cleanup(t).await;
}

#[tokio::test]
async fn export_of_empty_list_succeeds() {
    let t = common::spawn_store().await;
    let path = t.path("empty.xlsx");

    assert!(Exporter::default().export(&[], &path).await);
    assert!(path.exists());
    assert!(export::import(&path).await.unwrap().is_empty());

    common::cleanup(t).await;
}

#[tokio::test]
async fn export_failure_returns_false() {
    let t = common::spawn_store().await;
    let path = t.path("no-such-dir").join("out.xlsx");

    assert!(!Exporter::default().export(&requests(), &path).await);
    assert!(!path.exists());

    common::cleanup(t).await;
}

#[tokio::test]
async fn import_of_missing_file_is_a_parse_error() {
    let t = common::spawn_store().await;

    let err = export::import(&t.path("absent.xlsx")).await.unwrap_err();
    assert!(matches!(err, AppError::Parse(_)), "got {err}");

    common::cleanup(t).await;
}

#[tokio::test]
async fn stored_submissions_export_with_id_and_timestamp() {
    let t = common::spawn_store().await;
    for r in requests() {
        t.store.save(r).await.unwrap();
    }
    let submissions = t.store.list_all().await.unwrap();
    let path = t.path("submissions.xlsx");

    assert!(Exporter::default().export_submissions(&submissions, &path).await);

    let imported = export::import(&path).await.unwrap();
    let expected: Vec<Record> = submissions.iter().map(|s| s.to_record()).collect();
    assert_eq!(imported, expected);
    assert_eq!(imported[0]["id"], json!(1));

    common::cleanup(t).await;
}

// ── Accumulation ────────────────────────────────────────────────

#[tokio::test]
async fn accumulated_exports_concatenate() {
    let t = common::spawn_store().await;
    let ledger = t.store.ledger("accumulatedFormData");
    let exporter = Exporter::default();
    let path = t.path("ledger.xlsx");

    let a = vec![record(json!({ "appName": "Portal", "requestor": "Alice" }))];
    let b = vec![
        record(json!({ "appName": "Tool", "requestor": "Bob" })),
        record(json!({ "appName": "Desk", "requestor": "Carol" })),
    ];

    assert!(exporter.export_accumulated(&ledger, &a, &path).await);
    assert_eq!(export::import(&path).await.unwrap(), a);

    assert!(exporter.export_accumulated(&ledger, &b, &path).await);

    let expected: Vec<Record> = a.iter().chain(b.iter()).cloned().collect();
    assert_eq!(export::import(&path).await.unwrap(), expected);
    assert_eq!(ledger.load().await.unwrap(), expected);

    common::cleanup(t).await;
}

#[tokio::test]
async fn ledger_outlives_store_deletes() {
    let t = common::spawn_store().await;
    let ledger = t.store.ledger("accumulatedFormData");
    let exporter = Exporter::default();
    let path = t.path("ledger.xlsx");

    let id = t.store.save(record(json!({ "appName": "Portal" }))).await.unwrap();
    let snapshot: Vec<Record> = t
        .store
        .list_all()
        .await
        .unwrap()
        .iter()
        .map(|s| s.to_record())
        .collect();
    assert!(exporter.export_accumulated(&ledger, &snapshot, &path).await);

    t.store.delete_by_id(id).await.unwrap();
    assert!(t.store.list_all().await.unwrap().is_empty());

    let later = vec![record(json!({ "appName": "Tool" }))];
    assert!(exporter.export_accumulated(&ledger, &later, &path).await);

    let exported = export::import(&path).await.unwrap();
    assert_eq!(exported.len(), 2);
    assert_eq!(exported[0]["id"], json!(id));
    assert_eq!(exported[1]["appName"], json!("Tool"));

    common::cleanup(t).await;
}

#[tokio::test]
async fn ledger_slots_are_independent() {
    let t = common::spawn_store().await;
    let first = t.store.ledger("first");
    let second = t.store.ledger("second");

    first.append(&requests()).await.unwrap();

    assert_eq!(first.load().await.unwrap().len(), 2);
    assert!(second.load().await.unwrap().is_empty());

    common::cleanup(t).await;
}

#[tokio::test]
async fn plain_export_does_not_touch_the_ledger() {
    let t = common::spawn_store().await;
    let ledger = t.store.ledger("accumulatedFormData");

    assert!(Exporter::default().export(&requests(), &t.path("plain.xlsx")).await);

    assert!(ledger.load().await.unwrap().is_empty());

    common::cleanup(t).await;
}
