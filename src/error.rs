use thiserror::Error;

pub type SheetResult<T> = Result<T, SheetError>;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Invalid input kind: expected a record, got {0}")]
    InvalidInputKind(String),

    #[error("Not a collection: expected an array of records, got {0}")]
    NotACollection(String),

    #[error("Element {index} is not a record (got {found})")]
    ElementNotRecord { index: usize, found: String },

    #[error("Failed to open workbook: {0}")]
    Workbook(String),

    #[error("Failed to read sheet '{sheet}': {reason}")]
    SheetRead { sheet: String, reason: String },

    #[error(
        "Cannot convert '{text}' for field '{field}' (column '{column}', row {row}): {reason}"
    )]
    FieldConversion {
        field: String,
        column: String,
        row: u32,
        text: String,
        reason: String,
    },

    #[error("Field '{field}' has a kind that cannot be imported (column '{column}', row {row})")]
    UnsupportedField {
        field: String,
        column: String,
        row: u32,
    },

    #[error("Sheet write error: {0}")]
    Sink(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SheetError {
    /// True for errors caused by the caller's data rather than the store.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SheetError::InvalidInputKind(_)
                | SheetError::NotACollection(_)
                | SheetError::ElementNotRecord { .. }
                | SheetError::Workbook(_)
                | SheetError::SheetRead { .. }
                | SheetError::FieldConversion { .. }
                | SheetError::UnsupportedField { .. }
                | SheetError::Json(_)
        )
    }
}

impl From<rust_xlsxwriter::XlsxError> for SheetError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        SheetError::Sink(err.to_string())
    }
}
