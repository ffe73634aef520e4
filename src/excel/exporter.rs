//! Excel exporter implementation - records → sheet

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{SheetSink, XlsxSink};
use crate::error::{SheetError, SheetResult};
use crate::record::Record;
use crate::schema::ColumnSchema;
use crate::types::CellValue;

/// Write a header row followed by one row per record, then flush the sink.
///
/// The sheet is created if it does not exist yet. Field values are handed to
/// the sink as native [`CellValue`]s; the first failed write aborts the call.
/// An empty `records` slice produces a header-only sheet.
pub fn export<S, R>(sink: &mut S, sheet: &str, records: &[R]) -> SheetResult<()>
where
    S: SheetSink + ?Sized,
    R: Record,
{
    sink.ensure_sheet(sheet)?;
    let schema = ColumnSchema::of::<R>();
    write_sheet(sink, sheet, &schema, records.iter().map(|record| record.cells()))?;
    sink.flush()?;

    debug!(
        sheet,
        columns = schema.len(),
        rows = records.len(),
        "exported records"
    );
    Ok(())
}

/// Export into a fresh in-memory `.xlsx` workbook and return its bytes
pub fn export_to_bytes<R: Record>(sheet: &str, records: &[R]) -> SheetResult<Vec<u8>> {
    let mut sink = XlsxSink::new(Vec::new());
    export(&mut sink, sheet, records)?;
    Ok(sink.into_inner())
}

/// Write the header row and data rows for `schema`.
///
/// `rows` yields each record's cells in field order; cells are placed in the
/// schema column that holds their field.
pub(crate) fn write_sheet<S, I>(
    sink: &mut S,
    sheet: &str,
    schema: &ColumnSchema,
    rows: I,
) -> SheetResult<()>
where
    S: SheetSink + ?Sized,
    I: IntoIterator<Item = Vec<CellValue>>,
{
    // Sheet column of every schema entry, resolved once per call
    let placements = schema
        .columns
        .iter()
        .map(|column| {
            schema
                .column_of(column.field)
                .map(|col| (column, col))
                .ok_or_else(|| {
                    SheetError::Sink(format!("field {} has no sheet column", column.field))
                })
        })
        .collect::<SheetResult<Vec<_>>>()?;

    // Header row (row 1)
    for &(column, col) in &placements {
        let label = CellValue::Text(column.label.clone());
        sink.write_cell(sheet, col, 1, &label)?;
    }

    // Data rows start at row 2
    for (record_idx, cells) in rows.into_iter().enumerate() {
        let row = u32::try_from(record_idx + 2)
            .map_err(|_| SheetError::Sink(format!("row {} is out of range", record_idx + 2)))?;

        for &(column, col) in &placements {
            let value = cells.get(column.field).unwrap_or(&CellValue::Empty);
            sink.write_cell(sheet, col, row, value)?;
        }
    }
    Ok(())
}

/// Exports records to an `.xlsx` file on disk
pub struct ExcelExporter {
    path: PathBuf,
}

impl ExcelExporter {
    /// Create a new Excel exporter writing to `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Export `records` to `sheet` and save the workbook
    pub fn export<R: Record>(&self, sheet: &str, records: &[R]) -> SheetResult<()> {
        // A failed export leaves an existing file untouched
        let bytes = export_to_bytes(sheet, records)?;
        let mut file = BufWriter::new(File::create(&self.path)?);
        file.write_all(&bytes)?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::excel::{MemoryWorkbook, SheetSource};

    crate::sheet_record! {
        #[derive(Debug, Clone, PartialEq, Default)]
        struct Person {
            #[column = "Name"]
            name: String,
            #[column = "Age"]
            age: i64,
        }
    }

    fn people() -> Vec<Person> {
        vec![
            Person {
                name: "Ann".into(),
                age: 30,
            },
            Person {
                name: "Bo".into(),
                age: 41,
            },
        ]
    }

    #[test]
    fn test_export_writes_header_and_rows() {
        let mut book = MemoryWorkbook::new();
        export(&mut book, "People", &people()).unwrap();

        assert_eq!(book.value("People", 1, 1), Some(&CellValue::from("Name")));
        assert_eq!(book.value("People", 2, 1), Some(&CellValue::from("Age")));
        assert_eq!(book.value("People", 1, 2), Some(&CellValue::from("Ann")));
        assert_eq!(book.value("People", 2, 3), Some(&CellValue::Int(41)));
        assert_eq!(book.flush_count(), 1);
    }

    #[test]
    fn test_cells_follow_schema_column_of_their_field() {
        use crate::schema::SchemaColumn;

        let schema = ColumnSchema {
            columns: vec![
                SchemaColumn {
                    field: 1,
                    label: "Second".into(),
                },
                SchemaColumn {
                    field: 0,
                    label: "First".into(),
                },
            ],
        };
        let mut book = MemoryWorkbook::new();
        book.ensure_sheet("S").unwrap();
        write_sheet(
            &mut book,
            "S",
            &schema,
            vec![vec![CellValue::Int(1), CellValue::Int(2)]],
        )
        .unwrap();

        assert_eq!(schema.column_of(1), Some(1));
        assert_eq!(
            book.rows("S").unwrap(),
            vec![vec!["Second", "First"], vec!["2", "1"]]
        );
    }

    #[test]
    fn test_export_empty_collection_is_header_only() {
        let mut book = MemoryWorkbook::new();
        export::<_, Person>(&mut book, "People", &[]).unwrap();
        assert_eq!(book.rows("People").unwrap(), vec![vec!["Name", "Age"]]);
    }

    #[test]
    fn test_export_into_existing_sheet() {
        let mut book = MemoryWorkbook::new();
        book.ensure_sheet("People").unwrap();
        export(&mut book, "People", &people()).unwrap();
        assert_eq!(book.sheet_names(), vec!["People"]);
    }

    #[test]
    fn test_export_stops_on_first_write_error() {
        let mut book = MemoryWorkbook::new().with_max_rows(2);
        let err = export(&mut book, "People", &people()).unwrap_err();
        assert!(matches!(err, SheetError::Sink(_)));
        assert_eq!(book.flush_count(), 0);
        assert_eq!(book.value("People", 1, 3), None);
    }

    #[test]
    fn test_export_record_references() {
        let owned = people();
        let refs: Vec<&Person> = owned.iter().collect();
        let mut book = MemoryWorkbook::new();
        export(&mut book, "People", &refs).unwrap();
        assert_eq!(book.value("People", 1, 3), Some(&CellValue::from("Bo")));
    }
}
