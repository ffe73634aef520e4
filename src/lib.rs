//! sheetbind - typed records ↔ spreadsheet sheets
//!
//! This library converts collections of uniformly-typed records to and from a
//! tabular sheet (header row + data rows), using per-field column tags to
//! bind fields to columns.
//!
//! # Features
//!
//! - Compile-time record descriptors via [`sheet_record!`]
//! - Type-directed cell conversion (text, integer, floating point)
//! - `.xlsx` export/import (rust_xlsxwriter / calamine) and an in-memory store
//! - Dynamic JSON records, an HTTP API, and a bounded download utility
//!
//! # Example
//!
//! ```
//! use sheetbind::excel::{export, import, MemoryWorkbook};
//!
//! sheetbind::sheet_record! {
//!     #[derive(Debug, Clone, PartialEq, Default)]
//!     pub struct Person {
//!         #[column = "Name"]
//!         pub name: String,
//!         #[column = "Age"]
//!         pub age: i64,
//!     }
//! }
//!
//! let people = vec![
//!     Person { name: "Ann".into(), age: 30 },
//!     Person { name: "Bo".into(), age: 41 },
//! ];
//!
//! let mut book = MemoryWorkbook::new();
//! export(&mut book, "People", &people)?;
//! let back: Vec<Person> = import(&mut book, "People")?;
//! assert_eq!(back, people);
//! # Ok::<(), sheetbind::SheetError>(())
//! ```

pub mod api;
pub mod cli;
pub mod download;
pub mod dynamic;
pub mod error;
pub mod excel;
pub mod logging;
pub mod record;
pub mod schema;
pub mod types;

// Re-export commonly used types
pub use error::{SheetError, SheetResult};
pub use record::{ImportRecord, Record};
pub use schema::{resolve_schema, ColumnSchema, SchemaColumn};
pub use types::{CellValue, Conversion, FieldDef, FieldKind, FieldType};
