//! `calamine`-backed `WorkbookReader` for xlsx, xls and ods uploads.

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use tracing::debug;

use crate::domain::ports::{WorkbookReadError, WorkbookReader};
use crate::domain::{CellValue, Sheet, Workbook};

/// Decodes workbooks in memory; the format is sniffed from the bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalamineWorkbookReader;

impl CalamineWorkbookReader {
    /// Create a reader.
    pub const fn new() -> Self {
        Self
    }
}

fn to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => {
            CellValue::Text(text.clone())
        }
        Data::Int(value) => CellValue::Number(*value as f64),
        Data::Float(value) => CellValue::Number(*value),
        Data::Bool(value) => CellValue::Bool(*value),
        Data::DateTime(value) => CellValue::DateSerial(value.as_f64()),
        Data::Error(err) => CellValue::Text(err.to_string()),
    }
}

impl WorkbookReader for CalamineWorkbookReader {
    fn read(&self, bytes: &[u8]) -> Result<Workbook, WorkbookReadError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|err| WorkbookReadError::format(err.to_string()))?;

        let mut sheets = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|err| WorkbookReadError::sheet(name.as_str(), err.to_string()))?;
            let first_row = range.start().map_or(0, |(row, _)| row);
            let rows: Vec<Vec<CellValue>> = range
                .rows()
                .map(|row| row.iter().map(to_cell).collect())
                .collect();
            debug!(sheet = %name, rows = rows.len(), "decoded worksheet");
            sheets.push(Sheet::new(name, first_row, rows));
        }
        Ok(Workbook::new(sheets))
    }
}
