//! Excel importer implementation - sheet → records

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{SheetSource, XlsxSource};
use crate::error::{SheetError, SheetResult};
use crate::record::ImportRecord;
use crate::schema::ColumnSchema;
use crate::types::Conversion;

/// What to do with a tagged field whose kind cannot be parsed from text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnsupportedPolicy {
    /// Leave the field at its zero value
    #[default]
    ZeroValue,
    /// Fail the import with [`SheetError::UnsupportedField`]
    Reject,
}

/// Import configuration
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub unsupported: UnsupportedPolicy,
}

impl ImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the policy for unsupported field kinds
    pub fn with_unsupported(mut self, policy: UnsupportedPolicy) -> Self {
        self.unsupported = policy;
        self
    }
}

/// Read the sheet's header and data rows into records with default options
pub fn import<R, S>(source: &mut S, sheet: &str) -> SheetResult<Vec<R>>
where
    R: ImportRecord,
    S: SheetSource + ?Sized,
{
    import_with(source, sheet, &ImportOptions::default())
}

/// Read the sheet's header and data rows into records.
///
/// Row 1 holds the column labels. Each tagged field is filled from the column
/// carrying its tag; fields whose tag has no column stay at their zero value,
/// and untagged fields are never touched. The first conversion failure
/// aborts the whole import.
pub fn import_with<R, S>(source: &mut S, sheet: &str, options: &ImportOptions) -> SheetResult<Vec<R>>
where
    R: ImportRecord,
    S: SheetSource + ?Sized,
{
    let rows = source.rows(sheet)?;
    let Some((header, data)) = rows.split_first() else {
        debug!(sheet, "sheet has no header row, nothing to import");
        return Ok(Vec::new());
    };

    let column_map = header_map(header);
    let schema = ColumnSchema::of::<R>();
    let fields = R::fields();

    let mut records = Vec::with_capacity(data.len());
    for (offset, row) in data.iter().enumerate() {
        let row_number = u32::try_from(offset + 2).unwrap_or(u32::MAX);
        let mut record = R::default();

        for column in &schema.columns {
            let def = &fields[column.field];
            let Some(tag) = def.tag else {
                continue;
            };
            let Some(&col_idx) = column_map.get(tag) else {
                continue;
            };
            // Short rows: missing trailing cells read as empty text
            let text = row.get(col_idx).map(String::as_str).unwrap_or("");

            match record.assign(column.field, text) {
                Conversion::Parsed(()) => {}
                Conversion::Failed(reason) => {
                    return Err(SheetError::FieldConversion {
                        field: def.name.to_string(),
                        column: tag.to_string(),
                        row: row_number,
                        text: text.to_string(),
                        reason,
                    });
                }
                Conversion::Unsupported => match options.unsupported {
                    UnsupportedPolicy::ZeroValue => {
                        debug!(
                            field = def.name,
                            kind = %def.kind,
                            row = row_number,
                            "unsupported field kind left at zero value"
                        );
                    }
                    UnsupportedPolicy::Reject => {
                        return Err(SheetError::UnsupportedField {
                            field: def.name.to_string(),
                            column: tag.to_string(),
                            row: row_number,
                        });
                    }
                },
            }
        }
        records.push(record);
    }

    debug!(sheet, rows = records.len(), "imported records");
    Ok(records)
}

/// Import records from an in-memory `.xlsx` workbook
pub fn import_from_bytes<R: ImportRecord>(bytes: Vec<u8>, sheet: &str) -> SheetResult<Vec<R>> {
    let mut source = XlsxSource::from_bytes(bytes)?;
    import(&mut source, sheet)
}

/// Map each header label to its 0-based column; a repeated label keeps the
/// last column it appears in
pub(crate) fn header_map(header: &[String]) -> HashMap<&str, usize> {
    header
        .iter()
        .enumerate()
        .map(|(idx, label)| (label.as_str(), idx))
        .collect()
}

/// Imports records from an `.xlsx` file on disk
pub struct ExcelImporter {
    path: PathBuf,
    options: ImportOptions,
}

impl ExcelImporter {
    /// Create a new Excel importer
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            options: ImportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }

    /// Import every data row of `sheet` as an `R`
    pub fn import<R: ImportRecord>(&self, sheet: &str) -> SheetResult<Vec<R>> {
        let mut source = XlsxSource::open(&self.path)?;
        import_with(&mut source, sheet, &self.options)
    }
}
