//! Document root and peptide groups

use std::sync::Arc;

use super::annotations::Annotations;
use super::peptide::PeptideNode;
use super::transition::{TransitionGroupNode, TransitionNode};
use crate::format_version::FormatVersion;
use crate::settings::DocumentSettings;

/// Protein identification details of a group
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProteinMetadata {
    /// Name
    pub name: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Preferred name
    pub preferred_name: Option<String>,
    /// Accession
    pub accession: Option<String>,
    /// Gene
    pub gene: Option<String>,
    /// Species, interned
    pub species: Option<Arc<str>>,
    /// Status of the web lookup that filled these values
    pub websearch_status: Option<String>,
}

impl ProteinMetadata {
    /// Same metadata with another name
    pub fn with_name(self, name: Option<String>) -> Self {
        Self { name, ..self }
    }

    /// Same metadata with another description
    pub fn with_description(self, description: Option<String>) -> Self {
        Self {
            description,
            ..self
        }
    }
}

/// Protein sequence of a FASTA group
#[derive(Debug, Clone, PartialEq)]
pub struct FastaSequence {
    /// Name from the FASTA header
    pub name: Option<String>,
    /// Description from the FASTA header
    pub description: Option<String>,
    /// Alternative names
    pub alternatives: Vec<ProteinMetadata>,
    /// Residues without whitespace
    pub sequence: String,
}

/// Identity of a peptide group
#[derive(Debug, Clone, PartialEq)]
pub enum PeptideGroup {
    /// Protein with a sequence
    Protein(FastaSequence),
    /// Free list of peptides or molecules
    PeptideList {
        /// Decoy list
        decoy: bool,
    },
}

impl PeptideGroup {
    /// Protein sequence, `None` for peptide lists
    pub fn sequence(&self) -> Option<&str> {
        match self {
            PeptideGroup::Protein(fasta) => Some(&fasta.sequence),
            PeptideGroup::PeptideList { .. } => None,
        }
    }

    /// Whether this is a peptide list
    pub fn is_peptide_list(&self) -> bool {
        matches!(self, PeptideGroup::PeptideList { .. })
    }
}

/// A protein or peptide list with its peptides
#[derive(Debug, Clone, PartialEq)]
pub struct PeptideGroupNode {
    pub(crate) group: PeptideGroup,
    pub(crate) metadata: ProteinMetadata,
    pub(crate) annotations: Arc<Annotations>,
    pub(crate) children: Vec<PeptideNode>,
    pub(crate) auto_manage_children: bool,
}

impl PeptideGroupNode {
    /// Group identity
    pub fn group(&self) -> &PeptideGroup {
        &self.group
    }

    /// Label metadata
    pub fn metadata(&self) -> &ProteinMetadata {
        &self.metadata
    }

    /// Annotations
    pub fn annotations(&self) -> &Arc<Annotations> {
        &self.annotations
    }

    /// Peptides and molecules
    pub fn children(&self) -> &[PeptideNode] {
        &self.children
    }

    /// Whether children are managed automatically
    pub fn auto_manage_children(&self) -> bool {
        self.auto_manage_children
    }

    /// Same group with other annotations
    pub fn with_annotations(&self, annotations: Arc<Annotations>) -> Self {
        Self {
            annotations,
            ..self.clone()
        }
    }

    /// Same group with other peptides
    pub fn with_children(&self, children: Vec<PeptideNode>) -> Self {
        Self {
            children,
            ..self.clone()
        }
    }
}

/// Node totals of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeCounts {
    /// Proteins and peptide lists
    pub groups: usize,
    /// Peptides and molecules
    pub peptides: usize,
    /// Precursors
    pub precursors: usize,
    /// Transitions
    pub transitions: usize,
}

/// A fully read document
#[derive(Debug, Clone, PartialEq)]
pub struct SrmDocument {
    pub(crate) format_version: FormatVersion,
    pub(crate) settings: Arc<DocumentSettings>,
    pub(crate) children: Vec<PeptideGroupNode>,
}

impl SrmDocument {
    /// Document with the given groups
    pub fn new(
        format_version: FormatVersion,
        settings: Arc<DocumentSettings>,
        children: Vec<PeptideGroupNode>,
    ) -> Self {
        Self {
            format_version,
            settings,
            children,
        }
    }

    /// Format revision the document was written in
    pub fn format_version(&self) -> FormatVersion {
        self.format_version
    }

    /// Settings read from the document
    pub fn settings(&self) -> &Arc<DocumentSettings> {
        &self.settings
    }

    /// Proteins and peptide lists
    pub fn children(&self) -> &[PeptideGroupNode] {
        &self.children
    }

    /// All peptides and molecules in document order
    pub fn peptides(&self) -> impl Iterator<Item = &PeptideNode> {
        self.children.iter().flat_map(|g| g.children.iter())
    }

    /// All precursors in document order
    pub fn precursors(&self) -> impl Iterator<Item = &TransitionGroupNode> {
        self.peptides().flat_map(|p| p.children.iter())
    }

    /// All transitions in document order
    pub fn transitions(&self) -> impl Iterator<Item = &TransitionNode> {
        self.precursors().flat_map(|g| g.children.iter())
    }

    /// Node totals
    pub fn counts(&self) -> NodeCounts {
        NodeCounts {
            groups: self.children.len(),
            peptides: self.peptides().count(),
            precursors: self.precursors().count(),
            transitions: self.transitions().count(),
        }
    }

    /// Same document with other groups
    pub fn with_children(&self, children: Vec<PeptideGroupNode>) -> Self {
        Self {
            children,
            ..self.clone()
        }
    }
}
