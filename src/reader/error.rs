use std::fmt;

use super::bulk::BulkDecodeError;
use crate::chemistry::ChemistryError;

/// What an unresolved modification-table reference pointed at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModificationReference {
    /// Modification name absent from the settings tables
    Name(String),
    /// Loss index outside a modification's loss list
    LossIndex {
        /// Requested index, possibly negative
        index: i32,
        /// Modification carrying the losses
        modification: String,
    },
    /// Isotope label type absent from the settings
    IsotopeLabelType(String),
    /// Reporter ion absent from the transition filter
    MeasuredIon(String),
}

impl fmt::Display for ModificationReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModificationReference::Name(name) => {
                write!(f, "no modification named '{name}' was found in this document")
            }
            ModificationReference::LossIndex {
                index,
                modification,
            } => write!(
                f,
                "invalid loss index {index} for modification '{modification}'"
            ),
            ModificationReference::IsotopeLabelType(name) => write!(
                f,
                "the isotope modification type '{name}' does not exist in the document settings"
            ),
            ModificationReference::MeasuredIon(name) => write!(
                f,
                "the reporter ion '{name}' was not found in the transition filter settings"
            ),
        }
    }
}

/// Errors that abort a document load
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// The document was written by a newer format revision
    #[error("The document format version {version} is newer than the version {current} supported")]
    VersionTooNew {
        /// Version found on the root element
        version: f64,
        /// Newest supported version
        current: f64,
    },

    /// A result row names a replicate absent from the registry
    #[error("No replicate named '{0}' found in measured results")]
    MissingReplicateReference(String),

    /// A result row names a file absent from its replicate
    #[error("No file with id '{file_id}' found in the replicate '{replicate}'")]
    MissingFileReference {
        /// File id from the result row
        file_id: String,
        /// Replicate the lookup was made in
        replicate: String,
    },

    /// A modification table lookup failed
    #[error("Missing modification reference: {0}")]
    MissingModificationReference(ModificationReference),

    /// An explicit modification sits outside its peptide sequence
    #[error(
        "Modification '{modification}' at residue {index} is outside a sequence of {length} residues"
    )]
    ModificationOutOfRange {
        /// Modification name
        modification: String,
        /// `index_aa` as written
        index: i32,
        /// Residue count of the sequence
        length: usize,
    },

    /// An annotation element has no name attribute
    #[error("Annotation found without name")]
    MalformedAnnotation,

    /// A results section appeared but the settings carry no replicates
    #[error("No results information found in the document settings")]
    MissingMeasuredResultsContext,

    /// Transition of a decoy precursor without its own mass shift
    #[error("All transitions of decoy precursors must have a decoy mass shift")]
    DecoyTransitionWithoutMassShift,

    /// Error parsing XML
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// I/O error opening or reading the document
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 encoding error in text content
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Required attribute is missing
    #[error("Missing required attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        /// Element carrying the attribute
        element: String,
        /// Attribute name
        attribute: String,
    },

    /// Attribute value could not be parsed
    #[error("Invalid value '{value}' for attribute '{attribute}'")]
    InvalidAttributeValue {
        /// Attribute name
        attribute: String,
        /// Raw value
        value: String,
    },

    /// Element content could not be parsed
    #[error("Invalid content '{value}' in <{element}>")]
    InvalidElementValue {
        /// Element name
        element: String,
        /// Raw text
        value: String,
    },

    /// The tag at the cursor is not what the document structure requires
    #[error("Unexpected {found}, expected {expected}")]
    UnexpectedElement {
        /// What the builder was looking for
        expected: String,
        /// What the cursor was positioned on
        found: String,
    },

    /// Embedded binary payload could not be decoded
    #[error("Binary payload error: {0}")]
    Bulk(#[from] BulkDecodeError),

    /// Formula, adduct or mass evaluation failed
    #[error("Chemistry error: {0}")]
    Chemistry(#[from] ChemistryError),
}

/// Coarse classification of a [`DocumentError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// [`DocumentError::VersionTooNew`]
    VersionTooNew,
    /// [`DocumentError::MissingReplicateReference`]
    MissingReplicateReference,
    /// [`DocumentError::MissingFileReference`]
    MissingFileReference,
    /// [`DocumentError::MissingModificationReference`]
    MissingModificationReference,
    /// [`DocumentError::MalformedAnnotation`]
    MalformedAnnotation,
    /// [`DocumentError::MissingMeasuredResultsContext`]
    MissingMeasuredResultsContext,
    /// [`DocumentError::DecoyTransitionWithoutMassShift`]
    InvalidDecoy,
    /// XML syntax, I/O or encoding failure
    Syntax,
    /// Well-formed XML that does not match the document structure
    InvalidStructure,
    /// [`DocumentError::Bulk`]
    BulkPayload,
    /// [`DocumentError::Chemistry`]
    Chemistry,
}

impl DocumentError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            DocumentError::VersionTooNew { .. } => ErrorKind::VersionTooNew,
            DocumentError::MissingReplicateReference(_) => ErrorKind::MissingReplicateReference,
            DocumentError::MissingFileReference { .. } => ErrorKind::MissingFileReference,
            DocumentError::MissingModificationReference(_) => {
                ErrorKind::MissingModificationReference
            }
            DocumentError::MalformedAnnotation => ErrorKind::MalformedAnnotation,
            DocumentError::MissingMeasuredResultsContext => {
                ErrorKind::MissingMeasuredResultsContext
            }
            DocumentError::DecoyTransitionWithoutMassShift => ErrorKind::InvalidDecoy,
            DocumentError::Xml(_) | DocumentError::Io(_) | DocumentError::Utf8(_) => {
                ErrorKind::Syntax
            }
            DocumentError::MissingAttribute { .. }
            | DocumentError::InvalidAttributeValue { .. }
            | DocumentError::InvalidElementValue { .. }
            | DocumentError::UnexpectedElement { .. }
            | DocumentError::ModificationOutOfRange { .. } => ErrorKind::InvalidStructure,
            DocumentError::Bulk(_) => ErrorKind::BulkPayload,
            DocumentError::Chemistry(_) => ErrorKind::Chemistry,
        }
    }

    pub(crate) fn missing_modification(name: &str) -> Self {
        DocumentError::MissingModificationReference(ModificationReference::Name(name.to_string()))
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::VersionTooNew => "version-too-new",
            ErrorKind::MissingReplicateReference => "missing-replicate-reference",
            ErrorKind::MissingFileReference => "missing-file-reference",
            ErrorKind::MissingModificationReference => "missing-modification-reference",
            ErrorKind::MalformedAnnotation => "malformed-annotation",
            ErrorKind::MissingMeasuredResultsContext => "missing-measured-results-context",
            ErrorKind::InvalidDecoy => "invalid-decoy",
            ErrorKind::Syntax => "syntax",
            ErrorKind::InvalidStructure => "invalid-structure",
            ErrorKind::BulkPayload => "bulk-payload",
            ErrorKind::Chemistry => "chemistry",
        };
        f.write_str(name)
    }
}
