//! Tracing subscriber setup shared by the binaries

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "sheetbind=info,tower_http=info";

/// Quieter default for one-shot CLI commands
pub const CLI_FILTER: &str = "sheetbind=warn";

/// Install a fmt subscriber on stderr honoring `RUST_LOG`, falling back to
/// `default_filter`.
///
/// Calling this more than once is harmless; later calls keep the first subscriber.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
