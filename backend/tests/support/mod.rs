//! Shared helper utilities for backend integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`, so
//! each test file pulls this module in with `mod support;` and uses only the
//! helpers it needs.

#![allow(dead_code, reason = "each test crate uses a different subset")]

use courier_backend::domain::{EventDate, Identity, Role, UserId, Username};
use courier_backend::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use rust_xlsxwriter::Workbook as XlsxWorkbook;
use tempfile::TempDir;

/// Migrated SQLite file in a temporary directory, removed on drop.
pub struct TestDatabase {
    pool: DbPool,
    _dir: TempDir,
}

impl TestDatabase {
    /// Create and migrate a fresh database.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let url = dir.path().join("courier.db").to_string_lossy().into_owned();
        run_migrations(&url).await.expect("migrations apply");
        let pool = DbPool::new(PoolConfig::new(url).with_max_size(4))
            .await
            .expect("pool builds");
        Self { pool, _dir: dir }
    }

    /// Handle to the connection pool.
    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}

pub fn username(raw: &str) -> Username {
    Username::new(raw).expect("valid username")
}

pub fn date(raw: &str) -> EventDate {
    EventDate::parse(raw).expect("valid date")
}

/// Regular operator used as the acting user.
pub fn operator() -> Identity {
    Identity {
        id: UserId::new(2),
        username: username("budi"),
        role: Role::User,
    }
}

/// One worksheet: a header row followed by text rows. Empty strings leave
/// the cell blank.
pub struct SheetSpec<'a> {
    pub name: &'a str,
    pub headers: &'a [&'a str],
    pub rows: Vec<Vec<&'a str>>,
}

pub const PICKUP_HEADERS: &[&str] = &["AWB", "Nama", "Alamat", "No. HP", "Tanggal", "User"];
pub const DELIVERY_HEADERS: &[&str] = &["AWB", "Status", "Tanggal", "User", "COD Amount"];

pub fn pickup_sheet<'a>(rows: Vec<Vec<&'a str>>) -> SheetSpec<'a> {
    SheetSpec {
        name: "Pickup",
        headers: PICKUP_HEADERS,
        rows,
    }
}

pub fn delivery_sheet<'a>(rows: Vec<Vec<&'a str>>) -> SheetSpec<'a> {
    SheetSpec {
        name: "Delivery",
        headers: DELIVERY_HEADERS,
        rows,
    }
}

/// Serialise `sheets` into an `.xlsx` buffer.
pub fn workbook(sheets: &[SheetSpec<'_>]) -> Vec<u8> {
    let mut book = XlsxWorkbook::new();
    for spec in sheets {
        let sheet = book.add_worksheet();
        sheet.set_name(spec.name).expect("sheet name");
        for (col, header) in spec.headers.iter().enumerate() {
            let col = u16::try_from(col).expect("column fits");
            sheet.write_string(0, col, *header).expect("write header");
        }
        for (row_index, row) in spec.rows.iter().enumerate() {
            let row_number = u32::try_from(row_index + 1).expect("row fits");
            for (col, value) in row.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                let col = u16::try_from(col).expect("column fits");
                sheet
                    .write_string(row_number, col, *value)
                    .expect("write cell");
            }
        }
    }
    book.save_to_buffer().expect("save workbook")
}
