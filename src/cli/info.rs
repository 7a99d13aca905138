use anyhow::{Context, Result};
use std::path::PathBuf;

use srmdoc::reader::{DocumentReader, DocumentSummary};

use super::Config;

/// Display a summary of a document
pub fn run(file: PathBuf, json: bool, config: &Config) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let reader = DocumentReader::new().with_config(config.reader.clone());
    let document = reader
        .open(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let summary = DocumentSummary::from_document(&document);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("File: {}", file.display());
    if let Some(name) = &document.settings().name {
        println!("Settings: {name}");
    }
    println!();
    print!("{summary}");
    Ok(())
}
