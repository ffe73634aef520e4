use std::fs;
use std::path::{Path, PathBuf};

use colored::Colorize;
use serde_json::Value;

use crate::download::{download_all, DownloadConfig};
use crate::dynamic::{export_json_to_bytes, import_json};
use crate::error::{SheetError, SheetResult};
use crate::excel::{column_letter, SheetSource, XlsxSource};

/// Execute the export command
pub fn export(input: PathBuf, output: PathBuf, sheet: String, verbose: bool) -> SheetResult<()> {
    println!("{}", "📊 sheetbind - JSON to Excel".bold().green());
    println!("   Input:  {}", input.display());
    println!("   Output: {}", output.display());
    println!("   Sheet:  {}\n", sheet.bright_blue());

    if verbose {
        println!("{}", "📖 Reading JSON records...".cyan());
    }
    let records = read_json(&input)?;

    if verbose {
        if let Some(elements) = records.as_array() {
            println!("   Found {} records", elements.len());
        }
        println!("{}", "💾 Writing workbook...".cyan());
    }

    // Build the whole workbook before touching the output path
    let bytes = export_json_to_bytes(&sheet, &records)?;
    fs::write(&output, bytes)?;

    println!("{}", "✅ Export completed successfully!".bold().green());
    Ok(())
}

/// Execute the import command
///
/// Rows go to `output` as pretty JSON, or to stdout with no decoration when
/// no output path is given.
pub fn import(input: PathBuf, sheet: String, output: Option<PathBuf>) -> SheetResult<()> {
    let mut source = XlsxSource::open(&input)?;
    let rows = import_json(&mut source, &sheet)?;
    let json = serde_json::to_string_pretty(&rows)?;

    match output {
        Some(path) => {
            println!("{}", "📥 sheetbind - Excel to JSON".bold().green());
            println!("   Input:  {}", input.display());
            println!("   Sheet:  {}", sheet.bright_blue());
            println!("   Output: {}\n", path.display());

            fs::write(&path, json)?;

            println!("   Imported {} rows", rows.len());
            println!("{}", "✅ Import completed successfully!".bold().green());
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Execute the headers command
pub fn headers(input: PathBuf, sheet: String) -> SheetResult<()> {
    let mut source = XlsxSource::open(&input)?;
    let rows = source.rows(&sheet)?;

    println!("{}", "🏷️  sheetbind - Column headers".bold().green());
    println!("   File:  {}", input.display());
    println!("   Sheet: {}\n", sheet.bright_blue());

    let header = rows.first().map(Vec::as_slice).unwrap_or_default();
    if header.is_empty() {
        println!("{}", "   (no header row)".yellow());
        return Ok(());
    }

    for (index, label) in header.iter().enumerate() {
        let label = if label.is_empty() {
            "(empty)".dimmed().to_string()
        } else {
            label.bold().to_string()
        };
        println!("   {:>3}  {}", column_letter(index).cyan(), label);
    }
    println!("\n   {} data rows", rows.len().saturating_sub(1));
    Ok(())
}

/// Execute the download command
pub async fn download(urls: Vec<String>, dir: PathBuf, jobs: usize) -> anyhow::Result<()> {
    println!("{}", "⬇️  sheetbind - Downloading files".bold().green());
    println!("   Folder: {}", dir.display());
    println!("   Jobs:   {}\n", jobs);

    tokio::fs::create_dir_all(&dir).await?;

    let client = reqwest::Client::builder()
        .user_agent(concat!("sheetbind/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let config = DownloadConfig::default().with_concurrency(jobs);
    let outcomes = download_all(&client, &urls, &dir, &config).await;

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(path) => println!("   {} {}", "✓".green(), path.display()),
            Err(e) => {
                failed += 1;
                println!("   {} {}: {}", "✗".red(), outcome.address, e);
            }
        }
    }
    println!();

    if failed > 0 {
        anyhow::bail!("{} of {} downloads failed", failed, outcomes.len());
    }
    println!("{}", "✅ All downloads completed!".bold().green());
    Ok(())
}

fn read_json(path: &Path) -> SheetResult<Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        SheetError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_export_then_import_files() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("people.json");
        let workbook = dir.path().join("people.xlsx");
        let output = dir.path().join("back.json");
        fs::write(&input, r#"[{"Name":"Ann","Age":30},{"Name":"Bo","Age":41}]"#).unwrap();

        export(input, workbook.clone(), "People".into(), true).unwrap();
        import(workbook, "People".into(), Some(output.clone())).unwrap();

        let rows: Value = serde_json::from_str(&fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(rows[0]["Name"], "Ann");
        assert_eq!(rows[1]["Age"], "41");
    }

    #[test]
    fn test_export_rejects_object_without_writing() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("one.json");
        let workbook = dir.path().join("one.xlsx");
        fs::write(&input, r#"{"Name":"Ann"}"#).unwrap();

        let err = export(input, workbook.clone(), "Sheet1".into(), false).unwrap_err();
        assert!(matches!(err, SheetError::NotACollection(_)));
        assert!(!workbook.exists());
    }

    #[test]
    fn test_import_missing_sheet() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("data.json");
        let workbook = dir.path().join("data.xlsx");
        fs::write(&input, r#"[{"A":1}]"#).unwrap();
        export(input, workbook.clone(), "Data".into(), false).unwrap();

        let err = import(workbook, "Missing".into(), None).unwrap_err();
        assert!(matches!(err, SheetError::SheetRead { .. }));
    }

    #[test]
    fn test_read_json_reports_path() {
        let err = read_json(Path::new("/nonexistent/records.json")).unwrap_err();
        assert!(err.to_string().contains("records.json"));
    }
}
