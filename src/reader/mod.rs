//! # Document Reader Module
//!
//! Builds an immutable [`SrmDocument`] from the XML document format in one
//! forward pass over a [`TagCursor`].
//!
//! ## Features
//!
//! - **Every format revision**: documents from 0.1 up to
//!   [`FormatVersion::CURRENT`]; newer ones are rejected up front
//! - **Results correlation**: result rows are bound to the replicate
//!   registry supplied by the settings
//! - **Bulk payloads**: `results_data` / `transition_data` blobs decode to
//!   the same tree as their verbose equivalents
//! - **Legacy chemistry**: pre-3.72 small molecule formulas and adducts are
//!   reconciled on load
//!
//! ## Example
//!
//! ```rust,no_run
//! use srmdoc::reader::DocumentReader;
//!
//! let document = DocumentReader::new().open("experiment.sky")?;
//! println!("Format version: {}", document.format_version());
//! for peptide in document.peptides() {
//!     println!("{:?}: {} transitions", peptide.target(), peptide.transition_count());
//! }
//! # Ok::<(), srmdoc::reader::DocumentError>(())
//! ```

mod annotations;
mod bulk;
mod config;
mod cursor;
mod error;
mod group;
mod legacy;
mod modifications;
mod molecule;
mod names;
mod open;
mod peptide;
mod precursor;
mod results;
mod summary;
mod transition;

#[cfg(test)]
mod tests;

pub use bulk::BulkDecodeError;
pub use config::ReaderConfig;
pub use cursor::{TagCursor, DEFAULT_INPUT_BUFFER_SIZE};
pub use error::{DocumentError, ErrorKind, ModificationReference};
pub use summary::DocumentSummary;

use std::io::BufRead;
use std::sync::Arc;

use log::info;

use crate::chemistry::{MassCalculator, DefaultMassCalculator};
use crate::format_version::FormatVersion;
use crate::model::SrmDocument;
use crate::settings::{BasicSettingsReader, DocumentSettings, SettingsReader};
use crate::string_pool::StringPool;
use names::{attr, el};

/// State shared by every builder during one parse.
///
/// Owned by a single parse and dropped with it, so concurrent parses never
/// share an interner.
pub(crate) struct ParseContext<'a> {
    pub(crate) settings: &'a DocumentSettings,
    pub(crate) version: FormatVersion,
    pub(crate) pool: StringPool,
    pub(crate) calculator: &'a dyn MassCalculator,
}

impl<'a> ParseContext<'a> {
    pub(crate) fn new(
        settings: &'a DocumentSettings,
        version: FormatVersion,
        calculator: &'a dyn MassCalculator,
    ) -> Self {
        Self {
            settings,
            version,
            pool: StringPool::new(),
            calculator,
        }
    }
}

/// Reader for documents
///
/// The settings element is handed to `S`, and masses are computed by `C`.
pub struct DocumentReader<S = BasicSettingsReader, C = DefaultMassCalculator> {
    config: ReaderConfig,
    settings_reader: S,
    calculator: C,
}

impl DocumentReader {
    /// Reader with the default settings reader and mass calculator
    pub fn new() -> Self {
        Self {
            config: ReaderConfig::default(),
            settings_reader: BasicSettingsReader,
            calculator: DefaultMassCalculator::new(),
        }
    }
}

impl Default for DocumentReader {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SettingsReader, C: MassCalculator> DocumentReader<S, C> {
    /// Use a custom configuration
    pub fn with_config(self, config: ReaderConfig) -> Self {
        Self { config, ..self }
    }

    /// Use another settings reader
    pub fn with_settings_reader<S2: SettingsReader>(self, settings_reader: S2) -> DocumentReader<S2, C> {
        DocumentReader {
            config: self.config,
            settings_reader,
            calculator: self.calculator,
        }
    }

    /// Use another mass calculator
    pub fn with_calculator<C2: MassCalculator>(self, calculator: C2) -> DocumentReader<S, C2> {
        DocumentReader {
            config: self.config,
            settings_reader: self.settings_reader,
            calculator,
        }
    }

    /// Current configuration
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Read a document from an XML string
    pub fn read_str(&self, xml: &str) -> Result<SrmDocument, DocumentError> {
        self.read(xml.as_bytes())
    }

    /// Read a whole document.
    ///
    /// Any failure aborts the load; no partial tree is returned.
    pub fn read<R: BufRead>(&self, reader: R) -> Result<SrmDocument, DocumentError> {
        let mut cursor = TagCursor::new(reader)?;
        if !cursor.is_start_element(el::ROOT) {
            return Err(cursor.unexpected(format!("<{}>", el::ROOT)));
        }
        let version =
            FormatVersion::negotiate(cursor.nullable_double_attribute(attr::FORMAT_VERSION)?)?;
        info!("Reading document format version {version}");
        cursor.enter_element()?;

        let settings = self.settings_reader.read_settings(&mut cursor)?;
        let children = {
            let mut ctx = ParseContext::new(&settings, version, &self.calculator);
            group::read_document_groups(&mut ctx, &mut cursor)?
        };
        cursor.exit_element()?;

        let document = SrmDocument::new(version, Arc::new(settings), children);
        let counts = document.counts();
        info!(
            "Read {} groups, {} peptides, {} precursors, {} transitions",
            counts.groups, counts.peptides, counts.precursors, counts.transitions
        );
        Ok(document)
    }
}
