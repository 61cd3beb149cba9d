//! Tests for the workbook ingestion service.

use std::sync::{Arc, Mutex};

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockShipmentRepository, MockWorkbookReader, ShipmentPersistenceError};
use crate::domain::{CellValue, DeliveryStatus, ErrorCode, Role, UserId};

fn text(value: &str) -> CellValue {
    CellValue::Text(value.to_owned())
}

fn pickup_sheet(rows: Vec<Vec<CellValue>>) -> Sheet {
    let mut grid = vec![vec![
        text("AWB"),
        text("Nama"),
        text("Alamat"),
        text("No. HP"),
        text("Tanggal"),
        text("User"),
    ]];
    grid.extend(rows);
    Sheet::new("Pickup", 0, grid)
}

fn delivery_sheet(rows: Vec<Vec<CellValue>>) -> Sheet {
    let mut grid = vec![vec![
        text("AWB"),
        text("Status"),
        text("Tanggal"),
        text("User"),
        text("COD Amount"),
    ]];
    grid.extend(rows);
    Sheet::new("Delivery", 0, grid)
}

fn reader_for(workbook: Workbook) -> MockWorkbookReader {
    let mut reader = MockWorkbookReader::new();
    reader.expect_read().return_once(move |_| Ok(workbook));
    reader
}

#[fixture]
fn caller() -> Identity {
    Identity {
        id: UserId::new(3),
        username: Username::new("operator").expect("valid username"),
        role: Role::User,
    }
}

fn service(
    repo: MockShipmentRepository,
    reader: MockWorkbookReader,
) -> IngestionService<MockShipmentRepository, MockWorkbookReader> {
    IngestionService::new(Arc::new(repo), Arc::new(reader))
}

#[rstest]
#[tokio::test]
async fn stages_both_sheets_and_counts_skips(caller: Identity) {
    let workbook = Workbook::new(vec![
        pickup_sheet(vec![
            vec![
                text("JKT001"),
                text("Ani"),
                text("Jl. Sudirman"),
                CellValue::Number(81_234.0),
                text("2024-07-20"),
                text("budi"),
            ],
            vec![CellValue::Empty, text("no awb")],
            vec![text("JKT002"), text("Bayu")],
        ]),
        delivery_sheet(vec![vec![
            text("JKT001"),
            text("terkirim"),
            CellValue::DateSerial(45_494.0),
            CellValue::Empty,
            CellValue::Number(150_000.0),
        ]]),
    ]);

    let captured: Arc<Mutex<Option<UpsertBatch>>> = Arc::default();
    let sink = Arc::clone(&captured);
    let mut repo = MockShipmentRepository::new();
    repo.expect_upsert_batch().times(1).returning(move |batch| {
        *sink.lock().expect("capture lock") = Some(batch.clone());
        Ok(())
    });

    let summary = service(repo, reader_for(workbook))
        .ingest(&caller, b"xlsx".to_vec())
        .await
        .expect("ingest succeeds");

    assert_eq!(
        summary,
        IngestionSummary {
            pickup_upserted: 2,
            delivery_upserted: 1,
            pickup_skipped: 1,
            delivery_skipped: 0,
        }
    );

    let batch = captured
        .lock()
        .expect("capture lock")
        .take()
        .expect("batch written");
    let first = batch.pickups().first().expect("first pickup");
    assert_eq!(first.phone.as_deref(), Some("81234"));
    assert_eq!(first.submitted_by.as_ref(), "budi");

    let delivery = batch.deliveries().first().expect("delivery");
    assert_eq!(delivery.status, DeliveryStatus::Terkirim);
    assert_eq!(delivery.submitted_by.as_ref(), "operator");
    assert_eq!(
        delivery.event_date.map(|d| d.to_string()).as_deref(),
        Some("2024-07-21")
    );
}

#[rstest]
#[case("Pickup")]
#[case("Delivery")]
#[tokio::test]
async fn missing_sheet_fails_before_writing(caller: Identity, #[case] missing: &str) {
    let sheets = [pickup_sheet(Vec::new()), delivery_sheet(Vec::new())]
        .into_iter()
        .filter(|sheet| sheet.name() != missing)
        .collect();
    let mut repo = MockShipmentRepository::new();
    repo.expect_upsert_batch().never();

    let err = service(repo, reader_for(Workbook::new(sheets)))
        .ingest(&caller, Vec::new())
        .await
        .expect_err("missing sheet");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert!(err.message().contains(missing));
}

#[rstest]
#[tokio::test]
async fn invalid_cell_rejects_whole_upload(caller: Identity) {
    let workbook = Workbook::new(vec![
        pickup_sheet(vec![vec![text("JKT001")]]),
        delivery_sheet(vec![
            vec![text("JKT001"), text("Terkirim")],
            vec![
                text("JKT002"),
                text("Gagal"),
                CellValue::Empty,
                CellValue::Empty,
                CellValue::Number(-5.0),
            ],
        ]),
    ]);
    let mut repo = MockShipmentRepository::new();
    repo.expect_upsert_batch().never();

    let err = service(repo, reader_for(workbook))
        .ingest(&caller, Vec::new())
        .await
        .expect_err("negative COD");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.details(),
        Some(&serde_json::json!({ "sheet": "Delivery", "row": 3, "column": "COD Amount" }))
    );
}

#[rstest]
#[tokio::test]
async fn unreadable_bytes_are_invalid_workbook(caller: Identity) {
    let mut reader = MockWorkbookReader::new();
    reader
        .expect_read()
        .return_once(|_| Err(WorkbookReadError::format("not a zip archive")));
    let mut repo = MockShipmentRepository::new();
    repo.expect_upsert_batch().never();

    let err = service(repo, reader)
        .ingest(&caller, b"hello".to_vec())
        .await
        .expect_err("format error");
    assert_eq!(err.code(), ErrorCode::InvalidWorkbook);
}

#[rstest]
#[tokio::test]
async fn storage_failure_surfaces_as_internal_error(caller: Identity) {
    let workbook = Workbook::new(vec![
        pickup_sheet(vec![vec![text("JKT001")]]),
        delivery_sheet(Vec::new()),
    ]);
    let mut repo = MockShipmentRepository::new();
    repo.expect_upsert_batch()
        .return_once(|_| Err(ShipmentPersistenceError::query("constraint failed")));

    let err = service(repo, reader_for(workbook))
        .ingest(&caller, Vec::new())
        .await
        .expect_err("storage failure");
    assert_eq!(err.code(), ErrorCode::InternalError);
}

#[rstest]
#[tokio::test]
async fn empty_sheets_write_nothing(caller: Identity) {
    let workbook = Workbook::new(vec![pickup_sheet(Vec::new()), delivery_sheet(Vec::new())]);
    let mut repo = MockShipmentRepository::new();
    repo.expect_upsert_batch().never();

    let summary = service(repo, reader_for(workbook))
        .ingest(&caller, Vec::new())
        .await
        .expect("ingest succeeds");
    assert_eq!(summary, IngestionSummary::default());
}
