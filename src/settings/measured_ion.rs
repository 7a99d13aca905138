use crate::chemistry::CustomMolecule;

/// A reporter ion from the transition filter settings
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredIon {
    /// Unique name
    pub name: String,
    /// Reporter molecule; `None` for cleavage-rule ions without chemistry
    pub custom_ion: Option<CustomMolecule>,
    /// Charge the reporter is measured at
    pub charge: i32,
}

impl MeasuredIon {
    /// Reporter ion with its molecule
    pub fn reporter(name: impl Into<String>, molecule: CustomMolecule, charge: i32) -> Self {
        Self {
            name: name.into(),
            custom_ion: Some(molecule),
            charge,
        }
    }
}
