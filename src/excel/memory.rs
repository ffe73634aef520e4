//! In-memory workbook implementing both store traits

use std::collections::BTreeMap;

use super::{zero_based, SheetSink, SheetSource};
use crate::error::{SheetError, SheetResult};
use crate::types::CellValue;

#[derive(Debug, Clone, Default)]
struct MemorySheet {
    name: String,
    /// (row, column), both 0-based
    cells: BTreeMap<(u32, u16), CellValue>,
}

/// A workbook held entirely in memory.
///
/// Cells keep their native [`CellValue`]; reads render them with `Display`,
/// which matches the text an `.xlsx` round trip produces for the same value.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: Vec<MemorySheet>,
    max_rows: Option<u32>,
    flushes: usize,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a workbook with one sheet from text rows (row 1 first)
    pub fn from_rows<S: AsRef<str>>(sheet: &str, rows: &[Vec<S>]) -> Self {
        let mut cells = BTreeMap::new();
        for (r, row) in rows.iter().enumerate() {
            for (c, text) in row.iter().enumerate() {
                let text = text.as_ref();
                if !text.is_empty() {
                    cells.insert((r as u32, c as u16), CellValue::Text(text.to_string()));
                }
            }
        }
        Self {
            sheets: vec![MemorySheet {
                name: sheet.to_string(),
                cells,
            }],
            ..Self::default()
        }
    }

    /// Reject writes past `max_rows` (1-based), like a real sheet's row limit
    pub fn with_max_rows(mut self, max_rows: u32) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Native value at a 1-based (column, row)
    pub fn value(&self, sheet: &str, column: u16, row: u32) -> Option<&CellValue> {
        let (row, col) = zero_based(column, row).ok()?;
        self.sheet(sheet)?.cells.get(&(row, col))
    }

    /// Number of completed flushes
    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    fn sheet(&self, name: &str) -> Option<&MemorySheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    fn sheet_mut(&mut self, name: &str) -> SheetResult<&mut MemorySheet> {
        self.sheets
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| SheetError::Sink(format!("sheet '{}' does not exist", name)))
    }

    fn read_sheet(&self, name: &str) -> SheetResult<&MemorySheet> {
        self.sheet(name).ok_or_else(|| SheetError::SheetRead {
            sheet: name.to_string(),
            reason: "sheet does not exist".to_string(),
        })
    }
}

impl SheetSink for MemoryWorkbook {
    fn ensure_sheet(&mut self, sheet: &str) -> SheetResult<()> {
        if self.sheet(sheet).is_none() {
            self.sheets.push(MemorySheet {
                name: sheet.to_string(),
                cells: BTreeMap::new(),
            });
        }
        Ok(())
    }

    fn write_cell(
        &mut self,
        sheet: &str,
        column: u16,
        row: u32,
        value: &CellValue,
    ) -> SheetResult<()> {
        if let Some(max) = self.max_rows {
            if row > max {
                return Err(SheetError::Sink(format!(
                    "row {} exceeds the sheet limit of {} rows",
                    row, max
                )));
            }
        }
        let key = zero_based(column, row)?;
        let target = self.sheet_mut(sheet)?;
        if value.is_empty() {
            target.cells.remove(&key);
        } else {
            target.cells.insert(key, value.clone());
        }
        Ok(())
    }

    fn flush(&mut self) -> SheetResult<()> {
        self.flushes += 1;
        Ok(())
    }
}

impl SheetSource for MemoryWorkbook {
    fn rows(&mut self, sheet: &str) -> SheetResult<Vec<Vec<String>>> {
        let target = self.read_sheet(sheet)?;
        let Some(&(last_row, _)) = target.cells.keys().next_back() else {
            return Ok(Vec::new());
        };

        let mut rows = vec![Vec::new(); last_row as usize + 1];
        for (&(row, col), value) in &target.cells {
            let cells: &mut Vec<String> = &mut rows[row as usize];
            if cells.len() <= col as usize {
                cells.resize(col as usize + 1, String::new());
            }
            cells[col as usize] = value.to_string();
        }
        Ok(rows)
    }

    fn cell(&mut self, sheet: &str, column: u16, row: u32) -> SheetResult<Option<String>> {
        let key = zero_based(column, row)?;
        let target = self.read_sheet(sheet)?;
        Ok(target.cells.get(&key).map(|v| v.to_string()))
    }
}
