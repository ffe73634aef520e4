use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

//==============================================================================
// Cell Values
//==============================================================================

/// A native value handed to a sheet sink.
///
/// The exporter never formats values itself; each sink decides how a
/// `CellValue` is stored (number cell, string cell, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    /// Unsigned integers above `i64::MAX`
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl CellValue {
    /// True when the cell renders as blank
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::UInt(u) => write!(f, "{}", u),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

//==============================================================================
// Field Descriptors
//==============================================================================

/// How a field's cell text is converted on import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Raw cell text, unmodified
    Text,
    /// Base-10 integer
    Integer,
    /// Decimal floating point
    Float,
    /// Exported as-is, left at its zero value on import
    Unsupported,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

/// Static description of one record field, in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    /// Column label; `None` means the field is never populated on import
    pub tag: Option<&'static str>,
    pub kind: FieldKind,
}

impl FieldDef {
    pub const fn new(name: &'static str, tag: Option<&'static str>, kind: FieldKind) -> Self {
        Self { name, tag, kind }
    }

    /// Label written to the header row (empty for untagged fields)
    pub fn label(&self) -> &'static str {
        self.tag.unwrap_or("")
    }
}

//==============================================================================
// Conversion
//==============================================================================

/// Result of converting cell text into a field value.
///
/// `Unsupported` is kept apart from `Failed` so the importer can apply its
/// policy (zero value or reject) instead of treating it as a parse error.
#[derive(Debug, Clone, PartialEq)]
pub enum Conversion<T> {
    Parsed(T),
    Failed(String),
    Unsupported,
}

impl<T> Conversion<T> {
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Conversion<U> {
        match self {
            Conversion::Parsed(v) => Conversion::Parsed(f(v)),
            Conversion::Failed(reason) => Conversion::Failed(reason),
            Conversion::Unsupported => Conversion::Unsupported,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, Conversion::Parsed(_))
    }
}

/// A native type that can live in a record field.
pub trait FieldType: Default {
    const KIND: FieldKind;

    fn to_cell(&self) -> CellValue;

    fn parse_cell(text: &str) -> Conversion<Self>;
}

/// Store the converted cell text in `slot`; unsupported kinds reset it to zero.
pub fn assign_field<T: FieldType>(slot: &mut T, text: &str) -> Conversion<()> {
    match T::parse_cell(text) {
        Conversion::Parsed(value) => {
            *slot = value;
            Conversion::Parsed(())
        }
        Conversion::Failed(reason) => Conversion::Failed(reason),
        Conversion::Unsupported => {
            *slot = T::default();
            Conversion::Unsupported
        }
    }
}

impl FieldType for String {
    const KIND: FieldKind = FieldKind::Text;

    fn to_cell(&self) -> CellValue {
        CellValue::Text(self.clone())
    }

    fn parse_cell(text: &str) -> Conversion<Self> {
        Conversion::Parsed(text.to_string())
    }
}

macro_rules! integer_field {
    ($($ty:ty),*) => {
        $(
            impl FieldType for $ty {
                const KIND: FieldKind = FieldKind::Integer;

                fn to_cell(&self) -> CellValue {
                    let wide = *self as i128;
                    i64::try_from(wide)
                        .map(CellValue::Int)
                        .or_else(|_| u64::try_from(wide).map(CellValue::UInt))
                        .unwrap_or_else(|_| CellValue::Text(wide.to_string()))
                }

                fn parse_cell(text: &str) -> Conversion<Self> {
                    match text.parse::<$ty>() {
                        Ok(v) => Conversion::Parsed(v),
                        Err(e) => Conversion::Failed(e.to_string()),
                    }
                }
            }
        )*
    };
}

integer_field!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! float_field {
    ($($ty:ty),*) => {
        $(
            impl FieldType for $ty {
                const KIND: FieldKind = FieldKind::Float;

                fn to_cell(&self) -> CellValue {
                    CellValue::Float(*self as f64)
                }

                fn parse_cell(text: &str) -> Conversion<Self> {
                    match text.parse::<$ty>() {
                        Ok(v) => Conversion::Parsed(v),
                        Err(e) => Conversion::Failed(e.to_string()),
                    }
                }
            }
        )*
    };
}

float_field!(f32, f64);

impl FieldType for bool {
    const KIND: FieldKind = FieldKind::Unsupported;

    fn to_cell(&self) -> CellValue {
        CellValue::Bool(*self)
    }

    fn parse_cell(_text: &str) -> Conversion<Self> {
        Conversion::Unsupported
    }
}

impl FieldType for NaiveDate {
    const KIND: FieldKind = FieldKind::Unsupported;

    fn to_cell(&self) -> CellValue {
        CellValue::Text(self.format("%Y-%m-%d").to_string())
    }

    fn parse_cell(_text: &str) -> Conversion<Self> {
        Conversion::Unsupported
    }
}

impl<T: FieldType> FieldType for Option<T> {
    const KIND: FieldKind = FieldKind::Unsupported;

    fn to_cell(&self) -> CellValue {
        match self {
            Some(inner) => inner.to_cell(),
            None => CellValue::Empty,
        }
    }

    fn parse_cell(_text: &str) -> Conversion<Self> {
        Conversion::Unsupported
    }
}
