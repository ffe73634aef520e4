//! Record ↔ sheet marshaling
//!
//! - Export: records → header row + one data row per record
//! - Import: header row + data rows → records
//!
//! Both directions talk to the store only through [`SheetSink`] and
//! [`SheetSource`], addressed by (sheet, 1-based column, 1-based row).

mod exporter;
mod importer;
mod memory;
mod workbook;

pub use exporter::{export, export_to_bytes, ExcelExporter};
pub use importer::{import, import_from_bytes, import_with, ExcelImporter, ImportOptions, UnsupportedPolicy};
pub use memory::MemoryWorkbook;
pub use workbook::{XlsxSink, XlsxSource, XLSX_CONTENT_TYPE};

pub(crate) use exporter::write_sheet;
pub(crate) use importer::header_map;

use crate::error::{SheetError, SheetResult};
use crate::types::CellValue;

/// Writable tabular store
pub trait SheetSink {
    /// Create the sheet unless it already exists
    fn ensure_sheet(&mut self, sheet: &str) -> SheetResult<()>;

    /// Store a native value at a 1-based (column, row)
    fn write_cell(&mut self, sheet: &str, column: u16, row: u32, value: &CellValue)
        -> SheetResult<()>;

    /// Serialize everything written so far to the sink's destination
    fn flush(&mut self) -> SheetResult<()>;
}

/// Readable tabular store
pub trait SheetSource {
    /// All rows of the sheet as cell text; trailing empty cells are trimmed
    fn rows(&mut self, sheet: &str) -> SheetResult<Vec<Vec<String>>>;

    /// Text of a single 1-based (column, row) cell, `None` when blank
    fn cell(&mut self, sheet: &str, column: u16, row: u32) -> SheetResult<Option<String>>;
}

impl<T: SheetSink + ?Sized> SheetSink for &mut T {
    fn ensure_sheet(&mut self, sheet: &str) -> SheetResult<()> {
        (**self).ensure_sheet(sheet)
    }

    fn write_cell(
        &mut self,
        sheet: &str,
        column: u16,
        row: u32,
        value: &CellValue,
    ) -> SheetResult<()> {
        (**self).write_cell(sheet, column, row, value)
    }

    fn flush(&mut self) -> SheetResult<()> {
        (**self).flush()
    }
}

impl<T: SheetSource + ?Sized> SheetSource for &mut T {
    fn rows(&mut self, sheet: &str) -> SheetResult<Vec<Vec<String>>> {
        (**self).rows(sheet)
    }

    fn cell(&mut self, sheet: &str, column: u16, row: u32) -> SheetResult<Option<String>> {
        (**self).cell(sheet, column, row)
    }
}

/// Convert 1-based sheet coordinates to the 0-based (row, column) stores use
pub(crate) fn zero_based(column: u16, row: u32) -> SheetResult<(u32, u16)> {
    if column == 0 || row == 0 {
        return Err(SheetError::Sink(format!(
            "cell coordinates are 1-based, got column {} row {}",
            column, row
        )));
    }
    Ok((row - 1, column - 1))
}

/// Convert a column index (0-based) to its letter name (0→A, 25→Z, 26→AA)
pub fn column_letter(index: usize) -> String {
    let mut result = String::new();
    let mut num = index;

    loop {
        let remainder = num % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if num < 26 {
            break;
        }
        num = num / 26 - 1;
    }

    result
}
