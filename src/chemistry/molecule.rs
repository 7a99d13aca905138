//! Small molecules described by formula or by mass

use std::fmt;
use std::sync::Arc;

use super::elements::MassType;
use super::formula::Formula;
use super::ChemistryError;

/// A neutral molecule that is not a peptide
#[derive(Debug, Clone, PartialEq)]
pub struct CustomMolecule {
    formula: Option<Formula>,
    monoisotopic_mass: f64,
    average_mass: f64,
    name: Option<Arc<str>>,
}

impl CustomMolecule {
    /// Molecule defined by its formula; masses are derived
    pub fn from_formula(formula: Formula, name: Option<Arc<str>>) -> Result<Self, ChemistryError> {
        let monoisotopic_mass = formula.mass(MassType::Monoisotopic)?;
        let average_mass = formula.mass(MassType::Average)?;
        Ok(Self {
            formula: Some(formula),
            monoisotopic_mass,
            average_mass,
            name,
        })
    }

    /// Molecule defined by masses alone
    pub fn from_masses(monoisotopic_mass: f64, average_mass: f64, name: Option<Arc<str>>) -> Self {
        Self {
            formula: None,
            monoisotopic_mass,
            average_mass,
            name,
        }
    }

    /// Formula, when the molecule was declared with one
    pub fn formula(&self) -> Option<&Formula> {
        self.formula.as_ref()
    }

    /// Whether the molecule carries a non-empty formula
    pub fn has_formula(&self) -> bool {
        self.formula.as_ref().is_some_and(|f| !f.is_empty())
    }

    /// Monoisotopic mass
    pub fn monoisotopic_mass(&self) -> f64 {
        self.monoisotopic_mass
    }

    /// Average mass
    pub fn average_mass(&self) -> f64 {
        self.average_mass
    }

    /// Mass of the requested type
    pub fn mass(&self, mass_type: MassType) -> f64 {
        match mass_type {
            MassType::Monoisotopic => self.monoisotopic_mass,
            MassType::Average => self.average_mass,
        }
    }

    /// Display name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Shared handle to the name
    pub fn name_arc(&self) -> Option<Arc<str>> {
        self.name.clone()
    }
}

impl fmt::Display for CustomMolecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, &self.formula) {
            (Some(name), _) => write!(f, "{name}"),
            (None, Some(formula)) => write!(f, "{formula}"),
            (None, None) => write!(f, "{:.6}", self.monoisotopic_mass),
        }
    }
}
