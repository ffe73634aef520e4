//! Column schema resolution

use serde_json::Value;

use crate::error::{SheetError, SheetResult};
use crate::record::Record;

/// One header column bound to a record field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaColumn {
    /// Field position in declaration order
    pub field: usize,
    pub label: String,
}

/// Ordered (field, label) pairs derived from a record type's column tags
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnSchema {
    pub columns: Vec<SchemaColumn>,
}

impl ColumnSchema {
    /// Schema of a record type; untagged fields keep their slot with an empty label
    pub fn of<R: Record>() -> Self {
        let columns = R::fields()
            .iter()
            .enumerate()
            .map(|(field, def)| SchemaColumn {
                field,
                label: def.label().to_string(),
            })
            .collect();
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.label.as_str())
    }

    /// 1-based sheet column for a field position
    pub fn column_of(&self, field: usize) -> Option<u16> {
        self.columns
            .iter()
            .position(|c| c.field == field)
            .and_then(|idx| u16::try_from(idx + 1).ok())
    }
}

/// Resolve the schema from a representative record.
///
/// References and boxes are looked through once (see the blanket impls on
/// [`Record`]); the instance's values never influence the result.
pub fn resolve_schema<R: Record>(_representative: &R) -> ColumnSchema {
    ColumnSchema::of::<R>()
}

/// Resolve the schema of a dynamic (JSON) record: object keys in document order.
pub fn resolve_json_schema(representative: &Value) -> SheetResult<ColumnSchema> {
    let object = representative
        .as_object()
        .ok_or_else(|| SheetError::InvalidInputKind(json_kind(representative).to_string()))?;

    let columns = object
        .keys()
        .enumerate()
        .map(|(field, key)| SchemaColumn {
            field,
            label: key.clone(),
        })
        .collect();
    Ok(ColumnSchema { columns })
}

/// Human-readable name of a JSON value's kind, used in shape errors
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
