use anyhow::Result;
use log::info;
use std::path::PathBuf;

use srmdoc::reader::DocumentReader;

use super::Config;

#[cfg(feature = "colorized_output")]
fn status(ok: bool) -> String {
    use console::style;
    if ok {
        style("OK  ").green().bold().to_string()
    } else {
        style("FAIL").red().bold().to_string()
    }
}

#[cfg(not(feature = "colorized_output"))]
fn status(ok: bool) -> String {
    if ok { "OK  " } else { "FAIL" }.to_string()
}

/// Load each document and report the first failure
pub fn run(files: Vec<PathBuf>, config: &Config) -> Result<()> {
    let reader = DocumentReader::new().with_config(config.reader.clone());
    let mut failures = 0;
    for file in &files {
        info!("Validating {}", file.display());
        match reader.open(file) {
            Ok(document) => {
                let counts = document.counts();
                println!(
                    "{} {} (version {}, {} transitions)",
                    status(true),
                    file.display(),
                    document.format_version(),
                    counts.transitions
                );
            }
            Err(e) => {
                failures += 1;
                println!("{} {} [{:?}]: {}", status(false), file.display(), e.kind(), e);
            }
        }
    }

    if failures > 0 {
        eprintln!("{failures} of {} documents failed to load", files.len());
        std::process::exit(1);
    }
    Ok(())
}
