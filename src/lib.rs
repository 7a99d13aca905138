//! # srmdoc - Targeted Assay Document Reader
//!
//! `srmdoc` loads targeted mass spectrometry assay documents (proteins,
//! peptides and small molecules with their precursors, transitions and
//! per-replicate results) into an immutable tree.
//!
//! ## Key Features
//!
//! - **Every format revision**: documents written by any revision up to
//!   [`FormatVersion::CURRENT`](format_version::FormatVersion::CURRENT) load
//!   into the same model. Superseded layouts and attribute names are
//!   translated on the way in.
//!
//! - **Legacy chemistry reconciliation**: small molecules written before
//!   neutral formulas and adducts existed are converted to the modern
//!   representation.
//!
//! - **Results correlation**: result rows are bound to the replicate and
//!   file registry carried by the settings, and adjacent duplicates are
//!   dropped.
//!
//! - **Compact payloads**: base64 / zlib transition and result blobs decode
//!   to the same nodes as their verbose equivalents.
//!
//! - **All or nothing**: any broken reference aborts the whole load with a
//!   typed [`DocumentError`](reader::DocumentError).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use srmdoc::reader::{DocumentReader, DocumentSummary};
//!
//! let document = DocumentReader::new().open("assay.sky")?;
//! println!("{}", DocumentSummary::from_document(&document));
//!
//! for precursor in document.precursors() {
//!     println!("{:.4} ({} transitions)", precursor.precursor_mz(), precursor.children().len());
//! }
//! # Ok::<(), srmdoc::reader::DocumentError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`reader`]: tag cursor, entity builders and the document entry point
//! - [`model`]: immutable node types produced by the reader
//! - [`settings`]: the settings element and the [`settings::SettingsReader`] seam
//! - [`chemistry`]: formulas, adducts, custom molecules and mass calculation
//! - [`format_version`]: ordered format revisions and renamed attributes
//! - [`string_pool`]: per-parse interning of repeated strings

#![warn(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![allow(clippy::too_many_arguments)]

pub mod chemistry;
pub mod format_version;
pub mod model;
pub mod reader;
pub mod settings;
pub mod string_pool;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::chemistry::{
        Adduct, CustomMolecule, DefaultMassCalculator, Formula, MassCalculator, MassType,
    };
    pub use crate::format_version::FormatVersion;
    pub use crate::model::{
        Annotations, PeptideGroup, PeptideGroupNode, PeptideNode, PeptideTarget, Results,
        SrmDocument, TransitionGroupNode, TransitionNode,
    };
    pub use crate::reader::{
        DocumentError, DocumentReader, DocumentSummary, ErrorKind, ReaderConfig,
    };
    pub use crate::settings::{BasicSettingsReader, DocumentSettings, SettingsReader};
}
