//! Document settings consumed by the entity builders
//!
//! The settings element is read by a [`SettingsReader`] before any entity.
//! Builders only query the result: modification tables, label types,
//! reporter ions, mass types and the replicate registry.

mod measured_ion;
mod modifications;
mod reader;
mod results;

pub use measured_ion::MeasuredIon;
pub use modifications::{
    FragmentLoss, IsotopeLabelType, LabelAtoms, PeptideModifications, StaticMod, Terminus,
    TypedModifications,
};
pub use reader::{BasicSettingsReader, SettingsReader};
pub(crate) use reader::read_fragment_loss;
pub use results::{ChromFileId, ChromFileInfo, ChromatogramSet, MeasuredResults};

use crate::chemistry::MassType;

/// Everything the builders need from the settings element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentSettings {
    /// Settings name
    pub name: Option<String>,
    /// Modification tables and label types
    pub modifications: PeptideModifications,
    /// Reporter ions of the transition filter
    pub measured_ions: Vec<MeasuredIon>,
    /// Mass type for precursor m/z
    pub precursor_mass_type: MassType,
    /// Mass type for fragment m/z and losses
    pub fragment_mass_type: MassType,
    /// Replicate registry, when the document has results
    pub measured_results: Option<MeasuredResults>,
}

impl DocumentSettings {
    /// Reporter ion by name
    pub fn find_measured_ion(&self, name: &str) -> Option<&MeasuredIon> {
        self.measured_ions.iter().find(|ion| ion.name == name)
    }

    /// Same settings with a replicate registry attached
    pub fn with_measured_results(self, measured_results: MeasuredResults) -> Self {
        Self {
            measured_results: Some(measured_results),
            ..self
        }
    }

    /// Number of internal standard label types, used to size ratio slots
    pub fn ratio_count(&self) -> usize {
        self.modifications.internal_standard_types.len()
    }
}
