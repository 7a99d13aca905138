use std::fmt;

use serde::Serialize;

use crate::model::{NodeCounts, SrmDocument};

/// Summary of a loaded document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSummary {
    /// Format version the document was written in
    pub format_version: f64,
    /// Proteins and peptide lists
    pub groups: usize,
    /// Peptides
    pub peptides: usize,
    /// Small molecules
    pub molecules: usize,
    /// Precursors
    pub precursors: usize,
    /// Decoy precursors
    pub decoy_precursors: usize,
    /// Transitions
    pub transitions: usize,
    /// Replicates in the results registry
    pub replicates: usize,
    /// Transition result rows across all replicates
    pub transition_results: usize,
}

impl DocumentSummary {
    /// Collect totals from a document
    pub fn from_document(document: &SrmDocument) -> Self {
        let NodeCounts {
            groups,
            peptides,
            precursors,
            transitions,
        } = document.counts();
        let molecules = document
            .peptides()
            .filter(|peptide| peptide.target().is_custom_molecule())
            .count();
        Self {
            format_version: document.format_version().as_f64(),
            groups,
            peptides: peptides - molecules,
            molecules,
            precursors,
            decoy_precursors: document.precursors().filter(|p| p.is_decoy()).count(),
            transitions,
            replicates: document
                .settings()
                .measured_results
                .as_ref()
                .map_or(0, |results| results.len()),
            transition_results: document
                .transitions()
                .filter_map(|t| t.results())
                .map(|results| results.row_count())
                .sum(),
        }
    }
}

impl fmt::Display for DocumentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Document Summary")?;
        writeln!(f, "================")?;
        writeln!(f, "Format version: {}", self.format_version)?;
        writeln!(f, "Groups: {}", self.groups)?;
        writeln!(f, "Peptides: {}", self.peptides)?;
        if self.molecules > 0 {
            writeln!(f, "Molecules: {}", self.molecules)?;
        }
        writeln!(f, "Precursors: {}", self.precursors)?;
        if self.decoy_precursors > 0 {
            writeln!(f, "  decoys: {}", self.decoy_precursors)?;
        }
        writeln!(f, "Transitions: {}", self.transitions)?;
        if self.replicates > 0 {
            writeln!(f, "Replicates: {}", self.replicates)?;
            writeln!(f, "Transition results: {}", self.transition_results)?;
        }
        Ok(())
    }
}
