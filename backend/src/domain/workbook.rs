//! In-memory view of an uploaded spreadsheet workbook.
//!
//! Reader adapters decode the raw bytes into [`Workbook`]; the ingestion
//! service only ever sees typed cells. The first row of each sheet holds the
//! column headers and every later row is addressed by header name.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::json;

use super::Error;
use super::shipment::{Awb, CodAmount, DeliveryStatus, EventDate};
use super::user::Username;

/// One decoded cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// No value.
    Empty,
    /// Text as typed.
    Text(String),
    /// Plain number.
    Number(f64),
    /// Boolean.
    Bool(bool),
    /// Date or date-time cell, as a days-since-1899-12-30 serial.
    DateSerial(f64),
}

impl CellValue {
    /// Whether the cell carries no usable value.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.trim().is_empty(),
            Self::Number(_) | Self::Bool(_) | Self::DateSerial(_) => false,
        }
    }

    /// Render the cell as trimmed text, or `None` when blank.
    ///
    /// Whole numbers render without a fractional part so numeric AWBs and
    /// phone numbers survive spreadsheet auto-formatting.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_owned())
            }
            Self::Number(value) | Self::DateSerial(value) => Some(render_number(*value)),
            Self::Bool(value) => Some(value.to_string()),
        }
    }
}

fn render_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// One worksheet: a rectangular grid of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    first_row: u32,
    rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Build a sheet whose first grid row sits at zero-based `first_row`.
    pub fn new(name: impl Into<String>, first_row: u32, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            first_row,
            rows,
        }
    }

    /// Worksheet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Data rows keyed by header, skipping blank rows.
    ///
    /// Row numbers are one-based, as a spreadsheet shows them. Columns with a
    /// blank header are ignored; header text is trimmed and matched exactly.
    pub fn records(&self) -> Vec<SheetRow> {
        let mut grid = self.rows.iter();
        let Some(header_row) = grid.next() else {
            return Vec::new();
        };
        let headers: Vec<Option<String>> = header_row.iter().map(CellValue::as_text).collect();
        let header_number = self.first_row.saturating_add(1);

        grid.zip(1_u32..)
            .filter(|(cells, _)| !cells.iter().all(CellValue::is_blank))
            .map(|(cells, offset)| {
                let cells = headers
                    .iter()
                    .zip(cells.iter())
                    .filter_map(|(header, cell)| {
                        header.as_ref().map(|name| (name.clone(), cell.clone()))
                    })
                    .collect();
                SheetRow {
                    sheet: self.name.clone(),
                    number: header_number.saturating_add(offset),
                    cells,
                }
            })
            .collect()
    }
}

/// A decoded workbook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Wrap decoded sheets.
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// Look up a sheet by exact name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    /// Names of all sheets in workbook order.
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(Sheet::name)
    }
}

/// A rejected cell, located by sheet, row and column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// Worksheet name.
    pub sheet: String,
    /// One-based row number.
    pub row: u32,
    /// Column header.
    pub column: String,
    /// Why the cell was rejected.
    pub reason: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sheet {} row {} column {}: {}",
            self.sheet, self.row, self.column, self.reason
        )
    }
}

impl std::error::Error for RowError {}

impl From<RowError> for Error {
    fn from(value: RowError) -> Self {
        let details = json!({
            "sheet": value.sheet,
            "row": value.row,
            "column": value.column,
        });
        Self::invalid_request(value.to_string()).with_details(details)
    }
}

/// A non-blank data row addressed by column header.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    sheet: String,
    number: u32,
    cells: BTreeMap<String, CellValue>,
}

static EMPTY: CellValue = CellValue::Empty;

impl SheetRow {
    /// Build a row directly, mainly for tests.
    pub fn new(sheet: impl Into<String>, number: u32, cells: BTreeMap<String, CellValue>) -> Self {
        Self {
            sheet: sheet.into(),
            number,
            cells,
        }
    }

    /// One-based row number.
    pub const fn number(&self) -> u32 {
        self.number
    }

    /// Cell under `column`, or [`CellValue::Empty`] when absent.
    pub fn cell(&self, column: &str) -> &CellValue {
        self.cells.get(column).unwrap_or(&EMPTY)
    }

    fn reject(&self, column: &str, reason: impl fmt::Display) -> RowError {
        RowError {
            sheet: self.sheet.clone(),
            row: self.number,
            column: column.to_owned(),
            reason: reason.to_string(),
        }
    }

    /// Trimmed text, `None` when blank.
    pub fn text(&self, column: &str) -> Option<String> {
        self.cell(column).as_text()
    }

    /// Airway bill number, `None` when blank.
    pub fn awb(&self, column: &str) -> Result<Option<Awb>, RowError> {
        self.text(column)
            .map(|raw| Awb::new(raw).map_err(|err| self.reject(column, err)))
            .transpose()
    }

    /// Submitting user, `None` when blank.
    pub fn username(&self, column: &str) -> Result<Option<Username>, RowError> {
        self.text(column)
            .map(|raw| Username::new(raw).map_err(|err| self.reject(column, err)))
            .transpose()
    }

    /// Event date from a date cell, a date serial or an ISO string.
    ///
    /// ISO date-times keep only their date part.
    pub fn date(&self, column: &str) -> Result<Option<EventDate>, RowError> {
        match self.cell(column) {
            cell if cell.is_blank() => Ok(None),
            CellValue::DateSerial(serial) | CellValue::Number(serial) => {
                EventDate::from_excel_serial(*serial)
                    .map(Some)
                    .ok_or_else(|| self.reject(column, format!("{serial} is not a valid date")))
            }
            CellValue::Text(text) => {
                let trimmed = text.trim();
                let date_part = trimmed
                    .split_once(['T', ' '])
                    .map_or(trimmed, |(date, _)| date);
                EventDate::parse(date_part)
                    .map(Some)
                    .map_err(|err| self.reject(column, err))
            }
            CellValue::Bool(_) | CellValue::Empty => {
                Err(self.reject(column, "expected a date"))
            }
        }
    }

    /// Delivery status; blank means [`DeliveryStatus::Proses`].
    pub fn status(&self, column: &str) -> Result<DeliveryStatus, RowError> {
        self.text(column).map_or(Ok(DeliveryStatus::default()), |raw| {
            raw.parse().map_err(|err| self.reject(column, err))
        })
    }

    /// Cash-on-delivery amount; blank means zero.
    pub fn amount(&self, column: &str) -> Result<CodAmount, RowError> {
        let value = match self.cell(column) {
            cell if cell.is_blank() => return Ok(CodAmount::default()),
            CellValue::Number(value) => *value,
            CellValue::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| self.reject(column, format!("'{}' is not a number", text.trim())))?,
            CellValue::Bool(_) | CellValue::DateSerial(_) | CellValue::Empty => {
                return Err(self.reject(column, "expected a number"));
            }
        };
        CodAmount::new(value).map_err(|err| self.reject(column, err))
    }
}
