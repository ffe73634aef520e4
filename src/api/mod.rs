//! sheetbind API Server module
//!
//! Provides HTTP REST API for spreadsheet export/import.
//! Run with `sheetbind serve` or `sheetbind-server`.

pub mod handlers;
pub mod server;

pub use handlers::{xlsx_attachment, xlsx_response};
pub use server::{router, run_api_server};
