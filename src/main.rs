use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sheetbind::api::{run_api_server, server::ApiConfig};
use sheetbind::{cli, logging};

#[derive(Parser)]
#[command(name = "sheetbind")]
#[command(about = "Move tabular records between JSON and Excel sheets")]
#[command(long_about = "sheetbind - Records to spreadsheets and back

Column headers come from record field tags. Exporting writes one header row
followed by one row per record; importing binds columns back to fields by
header label, so column order in the file does not matter.

COMMANDS:
  export    - JSON array of objects to .xlsx
  import    - .xlsx sheet to JSON rows keyed by header
  headers   - List the header row of a sheet
  download  - Fetch files concurrently into a folder
  serve     - Run the HTTP API server

EXAMPLES:
  sheetbind export people.json people.xlsx --sheet People
  sheetbind import people.xlsx --sheet People -o people.json
  sheetbind download https://host/a.xlsx https://host/b.xlsx --dir inbox -j 8")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a JSON array of objects to an Excel workbook
    Export {
        /// Path to JSON input file
        input: PathBuf,

        /// Path to Excel output file (.xlsx)
        output: PathBuf,

        /// Sheet to write
        #[arg(short, long, default_value = "Sheet1", env = "SHEETBIND_SHEET")]
        sheet: String,

        /// Show verbose export steps
        #[arg(short, long)]
        verbose: bool,
    },

    /// Import an Excel sheet as JSON rows
    Import {
        /// Path to Excel input file (.xlsx)
        input: PathBuf,

        /// Sheet to read
        #[arg(short, long, default_value = "Sheet1", env = "SHEETBIND_SHEET")]
        sheet: String,

        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the header row of a sheet
    Headers {
        /// Path to Excel file (.xlsx)
        input: PathBuf,

        /// Sheet to inspect
        #[arg(short, long, default_value = "Sheet1", env = "SHEETBIND_SHEET")]
        sheet: String,
    },

    /// Download files into a folder, a bounded number at a time
    Download {
        /// Addresses to fetch
        #[arg(required = true)]
        urls: Vec<String>,

        /// Destination folder (created if missing)
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Maximum simultaneous transfers
        #[arg(short, long, default_value = "4", env = "SHEETBIND_DOWNLOAD_JOBS")]
        jobs: usize,
    },

    /// Run the HTTP API server
    Serve {
        /// Host address to bind to (use 0.0.0.0 for all interfaces)
        #[arg(short = 'H', long, default_value = "127.0.0.1", env = "SHEETBIND_HOST")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "8080", env = "SHEETBIND_PORT")]
        port: u16,

        /// Sheet used when a request does not name one
        #[arg(short, long, default_value = "Sheet1", env = "SHEETBIND_SHEET")]
        sheet: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if !matches!(cli.command, Commands::Serve { .. }) {
        logging::init(logging::CLI_FILTER);
    }

    match cli.command {
        Commands::Export {
            input,
            output,
            sheet,
            verbose,
        } => cli::export(input, output, sheet, verbose)?,

        Commands::Import {
            input,
            sheet,
            output,
        } => cli::import(input, sheet, output)?,

        Commands::Headers { input, sheet } => cli::headers(input, sheet)?,

        Commands::Download { urls, dir, jobs } => cli::download(urls, dir, jobs).await?,

        Commands::Serve { host, port, sheet } => {
            let config = ApiConfig {
                host,
                port,
                default_sheet: sheet,
                ..ApiConfig::default()
            };
            run_api_server(config).await?
        }
    }

    Ok(())
}
