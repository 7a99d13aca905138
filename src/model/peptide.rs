//! Peptide and custom molecule nodes

use std::sync::Arc;

use super::annotations::Annotations;
use super::results::{PeptideChromInfo, Results};
use super::transition::TransitionGroupNode;
use crate::chemistry::CustomMolecule;
use crate::settings::{IsotopeLabelType, StaticMod};

/// A modification placed on one residue
#[derive(Debug, Clone, PartialEq)]
pub struct ExplicitMod {
    /// Zero-based residue index
    pub index_aa: usize,
    /// Definition from the settings tables
    pub modification: Arc<StaticMod>,
}

/// Explicit modifications of one label type
#[derive(Debug, Clone, PartialEq)]
pub struct TypedExplicitModifications {
    /// Label type the list applies to
    pub label_type: IsotopeLabelType,
    /// Modifications in document order
    pub modifications: Vec<ExplicitMod>,
}

impl TypedExplicitModifications {
    /// Create a typed list
    pub fn new(label_type: IsotopeLabelType, modifications: Vec<ExplicitMod>) -> Self {
        Self {
            label_type,
            modifications,
        }
    }
}

/// Per-peptide override of the settings modifications
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExplicitMods {
    static_mods: Option<Vec<ExplicitMod>>,
    heavy_mods: Vec<TypedExplicitModifications>,
    variable: bool,
}

impl ExplicitMods {
    /// Explicit static list (`None` keeps the implicit static modifications)
    /// plus heavy lists
    pub fn new(
        static_mods: Option<Vec<ExplicitMod>>,
        heavy_mods: Vec<TypedExplicitModifications>,
        variable: bool,
    ) -> Self {
        Self {
            static_mods,
            heavy_mods,
            variable,
        }
    }

    /// Static modifications, when declared explicitly
    pub fn static_modifications(&self) -> Option<&[ExplicitMod]> {
        self.static_mods.as_deref()
    }

    /// Heavy modification lists
    pub fn heavy_modifications(&self) -> &[TypedExplicitModifications] {
        &self.heavy_mods
    }

    /// Heavy list for one label type
    pub fn heavy_modifications_for(&self, label_type: &IsotopeLabelType) -> Option<&[ExplicitMod]> {
        self.heavy_mods
            .iter()
            .find(|typed| typed.label_type.name() == label_type.name())
            .map(|typed| typed.modifications.as_slice())
    }

    /// Whether the modifications came from variable modification enumeration
    pub fn is_variable(&self) -> bool {
        self.variable
    }
}

/// Role of a peptide used as a standard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardType {
    /// Global normalization standard
    Normalization,
    /// Retention time standard
    Irt,
    /// Quality control
    Qc,
    /// Surrogate standard
    SurrogateStandard,
}

impl StandardType {
    /// Parse the `standard_type` attribute
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Normalization" => Some(Self::Normalization),
            "iRT" => Some(Self::Irt),
            "QC" => Some(Self::Qc),
            "Surrogate Standard" => Some(Self::SurrogateStandard),
            _ => None,
        }
    }
}

/// Retention time fixed by the user
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplicitRetentionTime {
    /// Retention time in minutes
    pub retention_time: f64,
    /// Window around it
    pub window: Option<f64>,
}

/// Amino acid sequence target
#[derive(Debug, Clone, PartialEq)]
pub struct Peptide {
    /// Unmodified sequence
    pub sequence: String,
    /// Start offset in the protein
    pub start: Option<i32>,
    /// End offset in the protein
    pub end: Option<i32>,
    /// Missed cleavages
    pub missed_cleavages: i32,
    /// Decoy flag
    pub decoy: bool,
}

/// What a peptide node measures
#[derive(Debug, Clone, PartialEq)]
pub enum PeptideTarget {
    /// Amino acid sequence
    Peptide(Peptide),
    /// Small molecule
    Molecule(CustomMolecule),
}

impl PeptideTarget {
    /// Sequence for peptides
    pub fn sequence(&self) -> Option<&str> {
        match self {
            PeptideTarget::Peptide(p) => Some(&p.sequence),
            PeptideTarget::Molecule(_) => None,
        }
    }

    /// Molecule for custom targets
    pub fn molecule(&self) -> Option<&CustomMolecule> {
        match self {
            PeptideTarget::Peptide(_) => None,
            PeptideTarget::Molecule(m) => Some(m),
        }
    }

    /// Whether this is a small molecule
    pub fn is_custom_molecule(&self) -> bool {
        matches!(self, PeptideTarget::Molecule(_))
    }

    /// Residue count, zero for molecules
    pub fn len(&self) -> usize {
        self.sequence().map_or(0, str::len)
    }

    /// Whether there are no residues
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sequence and modifications used for library lookups
#[derive(Debug, Clone, PartialEq)]
pub struct LookupSequence {
    /// Sequence
    pub sequence: String,
    /// Modifications of the lookup sequence
    pub modifications: Option<ExplicitMods>,
}

impl LookupSequence {
    /// Sequence with bracketed modification text removed
    /// (`PEP[+80]TIDE` becomes `PEPTIDE`)
    pub fn unmodified_sequence(&self) -> String {
        strip_modifications(&self.sequence)
    }
}

pub(crate) fn strip_modifications(sequence: &str) -> String {
    let mut stripped = String::with_capacity(sequence.len());
    let mut depth = 0usize;
    for c in sequence.chars() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            c if depth == 0 => stripped.push(c),
            _ => {}
        }
    }
    stripped
}

/// A peptide or molecule with its precursors
#[derive(Debug, Clone, PartialEq)]
pub struct PeptideNode {
    pub(crate) target: PeptideTarget,
    pub(crate) explicit_mods: Option<ExplicitMods>,
    pub(crate) lookup: Option<LookupSequence>,
    pub(crate) standard_type: Option<StandardType>,
    pub(crate) rank: Option<i32>,
    pub(crate) explicit_retention_time: Option<ExplicitRetentionTime>,
    pub(crate) concentration_multiplier: Option<f64>,
    pub(crate) internal_standard_concentration: Option<f64>,
    pub(crate) normalization_method: Option<String>,
    pub(crate) annotations: Arc<Annotations>,
    pub(crate) results: Option<Results<PeptideChromInfo>>,
    pub(crate) children: Vec<TransitionGroupNode>,
    pub(crate) auto_manage_children: bool,
}

impl PeptideNode {
    /// Peptide or molecule
    pub fn target(&self) -> &PeptideTarget {
        &self.target
    }

    /// Explicit modifications
    pub fn explicit_mods(&self) -> Option<&ExplicitMods> {
        self.explicit_mods.as_ref()
    }

    /// Library lookup sequence
    pub fn lookup(&self) -> Option<&LookupSequence> {
        self.lookup.as_ref()
    }

    /// Standard role
    pub fn standard_type(&self) -> Option<StandardType> {
        self.standard_type
    }

    /// Rank in its protein
    pub fn rank(&self) -> Option<i32> {
        self.rank
    }

    /// Explicit retention time
    pub fn explicit_retention_time(&self) -> Option<ExplicitRetentionTime> {
        self.explicit_retention_time
    }

    /// Concentration multiplier
    pub fn concentration_multiplier(&self) -> Option<f64> {
        self.concentration_multiplier
    }

    /// Internal standard concentration
    pub fn internal_standard_concentration(&self) -> Option<f64> {
        self.internal_standard_concentration
    }

    /// Normalization method name
    pub fn normalization_method(&self) -> Option<&str> {
        self.normalization_method.as_deref()
    }

    /// Annotations
    pub fn annotations(&self) -> &Arc<Annotations> {
        &self.annotations
    }

    /// Per-replicate results
    pub fn results(&self) -> Option<&Results<PeptideChromInfo>> {
        self.results.as_ref()
    }

    /// Precursors
    pub fn children(&self) -> &[TransitionGroupNode] {
        &self.children
    }

    /// Whether children are managed automatically
    pub fn auto_manage_children(&self) -> bool {
        self.auto_manage_children
    }

    /// Number of transitions under this node
    pub fn transition_count(&self) -> usize {
        self.children.iter().map(|g| g.children().len()).sum()
    }

    /// Same node with other annotations
    pub fn with_annotations(&self, annotations: Arc<Annotations>) -> Self {
        Self {
            annotations,
            ..self.clone()
        }
    }

    /// Same node with other precursors
    pub fn with_children(&self, children: Vec<TransitionGroupNode>) -> Self {
        Self {
            children,
            ..self.clone()
        }
    }

    /// Same node with other results
    pub fn with_results(&self, results: Option<Results<PeptideChromInfo>>) -> Self {
        Self {
            results,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_sequence_strips_modifications() {
        let lookup = LookupSequence {
            sequence: "PEP[+80.0]TIDEM(ox)K".to_string(),
            modifications: None,
        };
        assert_eq!(lookup.unmodified_sequence(), "PEPTIDEMK");
    }

    #[test]
    fn test_molecule_target_has_no_residues() {
        let target = PeptideTarget::Molecule(CustomMolecule::from_masses(100.0, 100.1, None));
        assert!(target.is_empty());
        assert!(target.is_custom_molecule());
        assert_eq!(target.sequence(), None);
    }
}
