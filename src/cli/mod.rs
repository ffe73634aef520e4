//! CLI command handlers

pub mod commands;

pub use commands::{download, export, headers, import};
