//! JSON records whose shape is only known at run time
//!
//! Export takes a JSON array of objects; the first object's keys (in
//! document order) become the column labels. Import returns each data row as
//! an object keyed by header label with the cell text as value.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{SheetError, SheetResult};
use crate::excel::{header_map, write_sheet, SheetSink, SheetSource, XlsxSink};
use crate::schema::{json_kind, resolve_json_schema, ColumnSchema};
use crate::types::CellValue;

/// Export a JSON array of objects to `sheet`.
///
/// Every element is checked before anything is written, so a malformed
/// collection never leaves a half-written sheet behind.
pub fn export_json<S>(sink: &mut S, sheet: &str, records: &Value) -> SheetResult<()>
where
    S: SheetSink + ?Sized,
{
    let elements = records
        .as_array()
        .ok_or_else(|| SheetError::NotACollection(json_kind(records).to_string()))?;

    let schema = match elements.first() {
        Some(first) => resolve_json_schema(first).map_err(|_| SheetError::ElementNotRecord {
            index: 0,
            found: json_kind(first).to_string(),
        })?,
        None => ColumnSchema::default(),
    };

    let rows = elements
        .iter()
        .enumerate()
        .map(|(index, element)| {
            let object = element
                .as_object()
                .ok_or_else(|| SheetError::ElementNotRecord {
                    index,
                    found: json_kind(element).to_string(),
                })?;
            Ok(schema
                .columns
                .iter()
                .map(|column| json_cell(object.get(&column.label)))
                .collect::<Vec<_>>())
        })
        .collect::<SheetResult<Vec<_>>>()?;

    sink.ensure_sheet(sheet)?;
    write_sheet(sink, sheet, &schema, rows)?;
    sink.flush()?;

    debug!(
        sheet,
        columns = schema.len(),
        rows = elements.len(),
        "exported JSON records"
    );
    Ok(())
}

/// Export JSON records into a fresh `.xlsx` workbook and return its bytes
pub fn export_json_to_bytes(sheet: &str, records: &Value) -> SheetResult<Vec<u8>> {
    let mut sink = XlsxSink::new(Vec::new());
    export_json(&mut sink, sheet, records)?;
    Ok(sink.into_inner())
}

/// Read every data row of `sheet` as a JSON object of header label → cell text.
///
/// Columns with an empty header are skipped; a repeated header label takes
/// its value from the last column carrying it.
pub fn import_json<S>(source: &mut S, sheet: &str) -> SheetResult<Vec<Map<String, Value>>>
where
    S: SheetSource + ?Sized,
{
    let rows = source.rows(sheet)?;
    let Some((header, data)) = rows.split_first() else {
        return Ok(Vec::new());
    };

    let column_map = header_map(header);
    // Keep header order, one entry per distinct label
    let columns: Vec<(&str, usize)> = header
        .iter()
        .enumerate()
        .filter(|(idx, label)| !label.is_empty() && column_map.get(label.as_str()) == Some(idx))
        .map(|(idx, label)| (label.as_str(), idx))
        .collect();

    let objects = data
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|&(label, idx)| {
                    let text = row.get(idx).cloned().unwrap_or_default();
                    (label.to_string(), Value::String(text))
                })
                .collect::<Map<String, Value>>()
        })
        .collect::<Vec<_>>();

    debug!(sheet, rows = objects.len(), "imported JSON records");
    Ok(objects)
}

/// Native cell value for a JSON field; nested values are not exported
fn json_cell(value: Option<&Value>) -> CellValue {
    match value {
        None | Some(Value::Null) => CellValue::Empty,
        Some(Value::Bool(b)) => CellValue::Bool(*b),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                CellValue::Int(i)
            } else if let Some(u) = n.as_u64() {
                CellValue::UInt(u)
            } else {
                CellValue::Float(n.as_f64().unwrap_or_default())
            }
        }
        Some(Value::String(s)) => CellValue::Text(s.clone()),
        Some(nested @ (Value::Array(_) | Value::Object(_))) => {
            debug!(kind = json_kind(nested), "nested JSON value exported as empty cell");
            CellValue::Empty
        }
    }
}
