//! # srmdoc
//!
//! Command-line front end for the document reader.
//!
//! ## Usage
//!
//! ```bash
//! # Print node counts and replicate totals
//! srmdoc info assay.sky
//!
//! # Check that documents load
//! srmdoc validate a.sky b.sky
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
