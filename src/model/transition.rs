//! Precursor (transition group) and transition nodes

use std::sync::Arc;

use super::annotations::Annotations;
use super::results::{Results, TransitionChromInfo, TransitionGroupChromInfo};
use crate::chemistry::{Adduct, CustomMolecule, MassType};
use crate::settings::{FragmentLoss, IsotopeLabelType, StaticMod};

/// Fragment ion series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IonType {
    /// a ion
    A,
    /// b ion
    B,
    /// c ion
    C,
    /// x ion
    X,
    /// y ion
    Y,
    /// z ion
    Z,
    /// Intact precursor
    Precursor,
    /// Small molecule fragment or reporter ion
    Custom,
}

impl IonType {
    /// Parse the `fragment_type` attribute (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "a" => Some(Self::A),
            "b" => Some(Self::B),
            "c" => Some(Self::C),
            "x" => Some(Self::X),
            "y" => Some(Self::Y),
            "z" => Some(Self::Z),
            "precursor" => Some(Self::Precursor),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    /// Fragments that keep the N-terminus
    pub fn is_n_terminal(self) -> bool {
        matches!(self, Self::A | Self::B | Self::C)
    }

    /// Fragments that keep the C-terminus
    pub fn is_c_terminal(self) -> bool {
        matches!(self, Self::X | Self::Y | Self::Z)
    }

    /// Lowercase name as written in documents
    pub fn name(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
            Self::C => "c",
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::Precursor => "precursor",
            Self::Custom => "custom",
        }
    }
}

/// Convert a fragment ordinal to the cleavage offset in a sequence of
/// `length` residues
pub fn ordinal_to_offset(ion_type: IonType, ordinal: i32, length: usize) -> i32 {
    if ion_type.is_n_terminal() {
        ordinal - 1
    } else {
        length as i32 - ordinal - 1
    }
}

/// One neutral loss of a transition
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionLoss {
    /// Modification the loss comes from, `None` for ad hoc losses
    pub modification: Option<Arc<StaticMod>>,
    /// The loss
    pub loss: FragmentLoss,
}

/// Neutral losses of a transition
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionLosses {
    losses: Vec<TransitionLoss>,
    mass_type: MassType,
}

impl TransitionLosses {
    /// Losses evaluated with `mass_type`
    pub fn new(losses: Vec<TransitionLoss>, mass_type: MassType) -> Self {
        Self { losses, mass_type }
    }

    /// Individual losses
    pub fn losses(&self) -> &[TransitionLoss] {
        &self.losses
    }

    /// Total mass lost
    pub fn mass(&self) -> f64 {
        self.losses.iter().map(|l| l.loss.mass(self.mass_type)).sum()
    }
}

/// Library match of a transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionLibInfo {
    /// Rank in the library spectrum
    pub rank: i32,
    /// Library intensity
    pub intensity: f32,
}

/// Library spectrum header of a precursor
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumHeaderInfo {
    /// Element name, identifies the library kind (`bibliospec_spectrum_info`, ...)
    pub kind: String,
    /// Library name, interned
    pub library_name: Arc<str>,
    /// Remaining attributes as written
    pub attributes: Vec<(String, String)>,
}

/// Instrument values fixed on a precursor
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExplicitTransitionGroupValues {
    /// Collision energy
    pub collision_energy: Option<f64>,
    /// Drift time in msec
    pub drift_time_msec: Option<f64>,
    /// Offset of high energy drift time
    pub drift_time_high_energy_offset_msec: Option<f64>,
    /// Collisional cross section
    pub ccs_sqa: Option<f64>,
    /// S-lens
    pub s_lens: Option<f64>,
    /// Cone voltage
    pub cone_voltage: Option<f64>,
    /// Compensation voltage
    pub compensation_voltage: Option<f64>,
    /// Declustering potential
    pub declustering_potential: Option<f64>,
}

impl ExplicitTransitionGroupValues {
    /// Whether no value is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A precursor ion with its transitions
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionGroupNode {
    pub(crate) adduct: Adduct,
    pub(crate) label_type: IsotopeLabelType,
    pub(crate) decoy_mass_shift: Option<i32>,
    pub(crate) precursor_mz: f64,
    pub(crate) explicit_values: ExplicitTransitionGroupValues,
    pub(crate) annotations: Arc<Annotations>,
    pub(crate) lib_info: Option<SpectrumHeaderInfo>,
    pub(crate) results: Option<Results<TransitionGroupChromInfo>>,
    pub(crate) children: Vec<TransitionNode>,
    pub(crate) auto_manage_children: bool,
}

impl TransitionGroupNode {
    /// Precursor adduct
    pub fn adduct(&self) -> &Adduct {
        &self.adduct
    }

    /// Isotope label type
    pub fn label_type(&self) -> &IsotopeLabelType {
        &self.label_type
    }

    /// Decoy mass shift
    pub fn decoy_mass_shift(&self) -> Option<i32> {
        self.decoy_mass_shift
    }

    /// Whether this is a decoy precursor
    pub fn is_decoy(&self) -> bool {
        self.decoy_mass_shift.is_some()
    }

    /// Calculated precursor m/z
    pub fn precursor_mz(&self) -> f64 {
        self.precursor_mz
    }

    /// Explicit instrument values
    pub fn explicit_values(&self) -> &ExplicitTransitionGroupValues {
        &self.explicit_values
    }

    /// Annotations
    pub fn annotations(&self) -> &Arc<Annotations> {
        &self.annotations
    }

    /// Library spectrum header
    pub fn lib_info(&self) -> Option<&SpectrumHeaderInfo> {
        self.lib_info.as_ref()
    }

    /// Per-replicate results
    pub fn results(&self) -> Option<&Results<TransitionGroupChromInfo>> {
        self.results.as_ref()
    }

    /// Transitions
    pub fn children(&self) -> &[TransitionNode] {
        &self.children
    }

    /// Whether children are managed automatically
    pub fn auto_manage_children(&self) -> bool {
        self.auto_manage_children
    }

    /// Same precursor with other annotations
    pub fn with_annotations(&self, annotations: Arc<Annotations>) -> Self {
        Self {
            annotations,
            ..self.clone()
        }
    }

    /// Same precursor with other transitions
    pub fn with_children(&self, children: Vec<TransitionNode>) -> Self {
        Self {
            children,
            ..self.clone()
        }
    }

    /// Same precursor with other results
    pub fn with_results(&self, results: Option<Results<TransitionGroupChromInfo>>) -> Self {
        Self {
            results,
            ..self.clone()
        }
    }
}

/// A fragment (or precursor) ion measured for a precursor
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionNode {
    pub(crate) ion_type: IonType,
    pub(crate) ordinal: i32,
    pub(crate) cleavage_offset: i32,
    pub(crate) mass_index: i32,
    pub(crate) adduct: Adduct,
    pub(crate) decoy_mass_shift: Option<i32>,
    pub(crate) custom_ion: Option<CustomMolecule>,
    pub(crate) measured_ion_name: Option<Arc<str>>,
    pub(crate) losses: Option<TransitionLosses>,
    pub(crate) product_mz: f64,
    pub(crate) declared_product_mz: Option<f64>,
    pub(crate) annotations: Arc<Annotations>,
    pub(crate) lib_info: Option<TransitionLibInfo>,
    pub(crate) results: Option<Results<TransitionChromInfo>>,
    pub(crate) quantitative: bool,
}

impl TransitionNode {
    /// Ion series
    pub fn ion_type(&self) -> IonType {
        self.ion_type
    }

    /// Fragment ordinal (residue count of the fragment)
    pub fn ordinal(&self) -> i32 {
        self.ordinal
    }

    /// Cleavage offset in the peptide sequence
    pub fn cleavage_offset(&self) -> i32 {
        self.cleavage_offset
    }

    /// Isotope peak index
    pub fn mass_index(&self) -> i32 {
        self.mass_index
    }

    /// Product adduct
    pub fn adduct(&self) -> &Adduct {
        &self.adduct
    }

    /// Decoy mass shift
    pub fn decoy_mass_shift(&self) -> Option<i32> {
        self.decoy_mass_shift
    }

    /// Fragment molecule for custom transitions
    pub fn custom_ion(&self) -> Option<&CustomMolecule> {
        self.custom_ion.as_ref()
    }

    /// Reporter ion name
    pub fn measured_ion_name(&self) -> Option<&str> {
        self.measured_ion_name.as_deref()
    }

    /// Neutral losses
    pub fn losses(&self) -> Option<&TransitionLosses> {
        self.losses.as_ref()
    }

    /// Calculated product m/z
    pub fn product_mz(&self) -> f64 {
        self.product_mz
    }

    /// Product m/z as written in the document
    pub fn declared_product_mz(&self) -> Option<f64> {
        self.declared_product_mz
    }

    /// Annotations
    pub fn annotations(&self) -> &Arc<Annotations> {
        &self.annotations
    }

    /// Library match
    pub fn lib_info(&self) -> Option<TransitionLibInfo> {
        self.lib_info
    }

    /// Per-replicate results
    pub fn results(&self) -> Option<&Results<TransitionChromInfo>> {
        self.results.as_ref()
    }

    /// Whether the transition counts toward quantification
    pub fn quantitative(&self) -> bool {
        self.quantitative
    }

    /// Same transition with other annotations
    pub fn with_annotations(&self, annotations: Arc<Annotations>) -> Self {
        Self {
            annotations,
            ..self.clone()
        }
    }

    /// Same transition with other results
    pub fn with_results(&self, results: Option<Results<TransitionChromInfo>>) -> Self {
        Self {
            results,
            ..self.clone()
        }
    }

    /// Same transition with the quantitative flag changed
    pub fn with_quantitative(&self, quantitative: bool) -> Self {
        Self {
            quantitative,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ion_type_names() {
        assert_eq!(IonType::from_name("Y"), Some(IonType::Y));
        assert_eq!(IonType::from_name("precursor"), Some(IonType::Precursor));
        assert_eq!(IonType::from_name("q"), None);
        assert!(IonType::B.is_n_terminal());
        assert!(IonType::Z.is_c_terminal());
        assert!(!IonType::Custom.is_c_terminal());
    }

    #[test]
    fn test_ordinal_to_offset() {
        // PEPTIDER: b3 cleaves after residue 2, y3 after residue 4
        assert_eq!(ordinal_to_offset(IonType::B, 3, 8), 2);
        assert_eq!(ordinal_to_offset(IonType::Y, 3, 8), 4);
    }

    #[test]
    fn test_losses_mass() {
        let water = FragmentLoss::from_masses(18.010565, 18.01528);
        let losses = TransitionLosses::new(
            vec![TransitionLoss {
                modification: None,
                loss: water,
            }],
            MassType::Average,
        );
        assert!((losses.mass() - 18.01528).abs() < 1e-9);
    }

    #[test]
    fn test_explicit_values_empty() {
        assert!(ExplicitTransitionGroupValues::default().is_empty());
        let values = ExplicitTransitionGroupValues {
            s_lens: Some(2.0),
            ..Default::default()
        };
        assert!(!values.is_empty());
    }
}
