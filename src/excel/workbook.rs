//! `.xlsx` store backends: rust_xlsxwriter for writing, calamine for reading

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;

use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use rust_xlsxwriter::{Workbook, Worksheet};

use super::{zero_based, SheetSink, SheetSource};
use crate::error::{SheetError, SheetResult};
use crate::types::CellValue;

/// MIME type of an `.xlsx` workbook
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Largest integer magnitude an `.xlsx` number cell (an f64) holds exactly
const MAX_EXACT_NUMBER: u64 = 1 << 53;

/// Sink that builds an `.xlsx` workbook in memory and writes it to `W` on flush
pub struct XlsxSink<W: Write> {
    workbook: Workbook,
    destination: W,
}

impl<W: Write> XlsxSink<W> {
    pub fn new(destination: W) -> Self {
        Self {
            workbook: Workbook::new(),
            destination,
        }
    }

    /// Give back the destination, e.g. the `Vec<u8>` holding the flushed workbook
    pub fn into_inner(self) -> W {
        self.destination
    }
}

impl<W: Write> SheetSink for XlsxSink<W> {
    fn ensure_sheet(&mut self, sheet: &str) -> SheetResult<()> {
        if self.workbook.worksheet_from_name(sheet).is_ok() {
            return Ok(());
        }
        // A rejected name must leave the workbook untouched
        let mut worksheet = Worksheet::new();
        worksheet.set_name(sheet)?;
        self.workbook.push_worksheet(worksheet);
        Ok(())
    }

    fn write_cell(
        &mut self,
        sheet: &str,
        column: u16,
        row: u32,
        value: &CellValue,
    ) -> SheetResult<()> {
        let (row, col) = zero_based(column, row)?;
        let worksheet = self.workbook.worksheet_from_name(sheet)?;
        if value.is_empty() {
            return Ok(());
        }

        match value {
            CellValue::Empty => {}
            CellValue::Text(s) => {
                worksheet.write_string(row, col, s)?;
            }
            CellValue::Int(i) if i.unsigned_abs() > MAX_EXACT_NUMBER => {
                worksheet.write_string(row, col, i.to_string())?;
            }
            CellValue::Int(i) => {
                worksheet.write_number(row, col, *i as f64)?;
            }
            CellValue::UInt(u) if *u > MAX_EXACT_NUMBER => {
                worksheet.write_string(row, col, u.to_string())?;
            }
            CellValue::UInt(u) => {
                worksheet.write_number(row, col, *u as f64)?;
            }
            CellValue::Float(f) => {
                worksheet.write_number(row, col, *f)?;
            }
            CellValue::Bool(b) => {
                worksheet.write_boolean(row, col, *b)?;
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> SheetResult<()> {
        let buffer = self.workbook.save_to_buffer()?;
        self.destination.write_all(&buffer)?;
        self.destination.flush()?;
        Ok(())
    }
}

/// Source reading sheets from an `.xlsx` workbook
pub struct XlsxSource<RS: Read + Seek> {
    workbook: Xlsx<RS>,
}

impl XlsxSource<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> SheetResult<Self> {
        let path = path.as_ref();
        let workbook: Xlsx<_> = open_workbook(path)
            .map_err(|e| SheetError::Workbook(format!("{}: {}", path.display(), e)))?;
        Ok(Self { workbook })
    }
}

impl XlsxSource<Cursor<Vec<u8>>> {
    pub fn from_bytes(bytes: Vec<u8>) -> SheetResult<Self> {
        let workbook = Xlsx::new(Cursor::new(bytes))
            .map_err(|e| SheetError::Workbook(e.to_string()))?;
        Ok(Self { workbook })
    }
}

impl<RS: Read + Seek> XlsxSource<RS> {
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    fn range(&mut self, sheet: &str) -> SheetResult<Range<Data>> {
        self.workbook
            .worksheet_range(sheet)
            .map_err(|e| SheetError::SheetRead {
                sheet: sheet.to_string(),
                reason: e.to_string(),
            })
    }
}

impl<RS: Read + Seek> SheetSource for XlsxSource<RS> {
    fn rows(&mut self, sheet: &str) -> SheetResult<Vec<Vec<String>>> {
        let range = self.range(sheet)?;
        Ok(range_rows(&range))
    }

    fn cell(&mut self, sheet: &str, column: u16, row: u32) -> SheetResult<Option<String>> {
        let (row, col) = zero_based(column, row)?;
        let range = self.range(sheet)?;
        Ok(range
            .get_value((row, col as u32))
            .filter(|data| !matches!(data, Data::Empty))
            .map(|data| data.to_string()))
    }
}

/// Expand a used range into rows addressed from A1.
///
/// calamine ranges start at the first used cell, so leading blank rows and
/// columns are filled back in to keep header positions stable.
fn range_rows(range: &Range<Data>) -> Vec<Vec<String>> {
    let Some((end_row, end_col)) = range.end() else {
        return Vec::new();
    };

    (0..=end_row)
        .map(|row| {
            let mut cells: Vec<String> = (0..=end_col)
                .map(|col| {
                    range
                        .get_value((row, col))
                        .map(|data| data.to_string())
                        .unwrap_or_default()
                })
                .collect();
            while cells.last().is_some_and(|c| c.is_empty()) {
                cells.pop();
            }
            cells
        })
        .collect()
}
