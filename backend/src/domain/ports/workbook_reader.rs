//! Port for decoding uploaded spreadsheet bytes.

use crate::domain::Workbook;

use super::define_port_error;

define_port_error! {
    /// Errors raised by workbook readers.
    pub enum WorkbookReadError {
        /// The bytes are not a workbook the reader understands.
        Format { message: String } => "file is not a readable workbook: {message}",
        /// A sheet exists but could not be decoded.
        Sheet { sheet: String, message: String } => "sheet {sheet} could not be read: {message}",
    }
}

/// Decodes workbook bytes into typed sheets.
///
/// Decoding is CPU-bound; callers run it on the blocking pool.
#[cfg_attr(test, mockall::automock)]
pub trait WorkbookReader: Send + Sync {
    /// Decode every sheet in the workbook.
    fn read(&self, bytes: &[u8]) -> Result<Workbook, WorkbookReadError>;
}
