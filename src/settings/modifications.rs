//! Modification tables
//!
//! Static (structural) modifications and isotope label modifications are
//! defined once in the settings. Peptides refer to them by name, so lookups
//! here back every explicit modification and neutral loss in the document.

use std::fmt;
use std::sync::Arc;

use crate::chemistry::{element_masses, light_symbol, Formula, MassType};

/// Named isotope label type (`light`, `heavy`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IsotopeLabelType {
    name: Arc<str>,
    sort_order: i32,
}

impl IsotopeLabelType {
    /// Name of the unlabeled type
    pub const LIGHT_NAME: &'static str = "light";
    /// Name of the default heavy type
    pub const HEAVY_NAME: &'static str = "heavy";

    /// Create a label type
    pub fn new(name: impl Into<Arc<str>>, sort_order: i32) -> Self {
        Self {
            name: name.into(),
            sort_order,
        }
    }

    /// The unlabeled type
    pub fn light() -> Self {
        Self::new(Self::LIGHT_NAME, 0)
    }

    /// The default heavy type
    pub fn heavy() -> Self {
        Self::new(Self::HEAVY_NAME, 1)
    }

    /// Label type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position among the document's label types
    pub fn sort_order(&self) -> i32 {
        self.sort_order
    }

    /// Whether this is the unlabeled type
    pub fn is_light(&self) -> bool {
        self.sort_order == 0
    }
}

impl fmt::Display for IsotopeLabelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Atoms a label modification replaces by heavy isotopes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelAtoms {
    /// 13C
    pub c13: bool,
    /// 15N
    pub n15: bool,
    /// 18O
    pub o18: bool,
    /// 2H
    pub h2: bool,
    /// 37Cl
    pub cl37: bool,
    /// 81Br
    pub br81: bool,
}

impl LabelAtoms {
    /// Whether no atom is labelled
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Heavy symbols of the labelled atoms
    pub fn heavy_symbols(&self) -> Vec<&'static str> {
        [
            (self.c13, "C'"),
            (self.n15, "N'"),
            (self.o18, "O'"),
            (self.h2, "H'"),
            (self.cl37, "Cl'"),
            (self.br81, "Br'"),
        ]
        .into_iter()
        .filter(|(on, _)| *on)
        .map(|(_, symbol)| symbol)
        .collect()
    }

    /// Replace every labelled light atom in `formula` by its heavy isotope
    pub fn apply_to_formula(&self, formula: &Formula) -> Formula {
        let mut labeled = formula.clone();
        for heavy in self.heavy_symbols() {
            let light = light_symbol(heavy);
            let n = formula.count(light);
            if n != 0 {
                labeled = labeled
                    .adjust_element_count(light, -n)
                    .adjust_element_count(heavy, n);
            }
        }
        labeled
    }
}

/// Which end of the peptide a modification is restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminus {
    /// N-terminus
    N,
    /// C-terminus
    C,
}

impl Terminus {
    /// Parse the `terminus` attribute
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "N" | "n" => Some(Terminus::N),
            "C" | "c" => Some(Terminus::C),
            _ => None,
        }
    }
}

/// A neutral loss a modification can undergo
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentLoss {
    /// Formula of the lost fragment
    pub formula: Option<Formula>,
    /// Monoisotopic mass lost
    pub monoisotopic_mass: f64,
    /// Average mass lost
    pub average_mass: f64,
}

impl FragmentLoss {
    /// Loss described by formula
    pub fn from_formula(formula: Formula) -> Result<Self, crate::chemistry::ChemistryError> {
        Ok(Self {
            monoisotopic_mass: formula.mass(MassType::Monoisotopic)?,
            average_mass: formula.mass(MassType::Average)?,
            formula: Some(formula),
        })
    }

    /// Loss described by masses
    pub fn from_masses(monoisotopic_mass: f64, average_mass: f64) -> Self {
        Self {
            formula: None,
            monoisotopic_mass,
            average_mass,
        }
    }

    /// Mass of the requested type
    pub fn mass(&self, mass_type: MassType) -> f64 {
        match mass_type {
            MassType::Monoisotopic => self.monoisotopic_mass,
            MassType::Average => self.average_mass,
        }
    }
}

/// A modification definition from the settings
#[derive(Debug, Clone, PartialEq)]
pub struct StaticMod {
    /// Unique name
    pub name: String,
    /// Residues it applies to; `None` means any
    pub amino_acids: Option<String>,
    /// Terminal restriction
    pub terminus: Option<Terminus>,
    /// Added formula
    pub formula: Option<Formula>,
    /// Monoisotopic mass difference when no formula is given
    pub monoisotopic_mass: Option<f64>,
    /// Average mass difference when no formula is given
    pub average_mass: Option<f64>,
    /// Heavy atom substitutions
    pub label_atoms: LabelAtoms,
    /// Applied only where a peptide says so
    pub explicit: bool,
    /// Variable modification
    pub variable: bool,
    /// Neutral losses
    pub losses: Vec<FragmentLoss>,
}

impl StaticMod {
    /// A modification with only a name, every other property unset
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amino_acids: None,
            terminus: None,
            formula: None,
            monoisotopic_mass: None,
            average_mass: None,
            label_atoms: LabelAtoms::default(),
            explicit: false,
            variable: false,
            losses: Vec::new(),
        }
    }

    /// Whether the modification can lose fragments
    pub fn has_loss(&self) -> bool {
        !self.losses.is_empty()
    }

    /// Whether the modification can apply to `residue` at position `index`
    pub fn applies_to(&self, residue: char, index: usize, length: usize) -> bool {
        let residue_ok = self
            .amino_acids
            .as_deref()
            .map_or(true, |aas| aas.contains(residue));
        let terminus_ok = match self.terminus {
            None => true,
            Some(Terminus::N) => index == 0,
            Some(Terminus::C) => index + 1 == length,
        };
        residue_ok && terminus_ok
    }

    /// Mass added by the modification's formula or declared mass difference
    pub fn mass_diff(&self, mass_type: MassType) -> f64 {
        if let Some(formula) = &self.formula {
            return formula.mass(mass_type).unwrap_or_default();
        }
        match mass_type {
            MassType::Monoisotopic => self.monoisotopic_mass.unwrap_or_default(),
            MassType::Average => self
                .average_mass
                .or(self.monoisotopic_mass)
                .unwrap_or_default(),
        }
    }

    /// Mass added when the label atoms are applied to one atom of each
    /// labelled element
    pub fn ion_label_mass_diff(&self) -> f64 {
        self.label_atoms
            .heavy_symbols()
            .into_iter()
            .filter_map(|heavy| {
                let (heavy_mass, _) = element_masses(heavy)?;
                let (light_mass, _) = element_masses(light_symbol(heavy))?;
                Some(heavy_mass - light_mass)
            })
            .sum()
    }
}

/// The modifications of one label type
#[derive(Debug, Clone, PartialEq)]
pub struct TypedModifications {
    /// Label type
    pub label_type: IsotopeLabelType,
    /// Modifications in settings order
    pub modifications: Vec<Arc<StaticMod>>,
}

impl TypedModifications {
    /// Create a typed modification list
    pub fn new(label_type: IsotopeLabelType, modifications: Vec<Arc<StaticMod>>) -> Self {
        Self {
            label_type,
            modifications,
        }
    }

    /// Find a modification by name
    pub fn find(&self, name: &str) -> Option<&Arc<StaticMod>> {
        self.modifications.iter().find(|m| m.name == name)
    }
}

/// Every modification table in the document settings
#[derive(Debug, Clone, PartialEq)]
pub struct PeptideModifications {
    /// Structural modifications (light)
    pub static_modifications: Vec<Arc<StaticMod>>,
    /// One entry per heavy label type
    pub heavy_modifications: Vec<TypedModifications>,
    /// Label types used as internal standards
    pub internal_standard_types: Vec<IsotopeLabelType>,
}

impl Default for PeptideModifications {
    fn default() -> Self {
        Self {
            static_modifications: Vec::new(),
            heavy_modifications: vec![TypedModifications::new(
                IsotopeLabelType::heavy(),
                Vec::new(),
            )],
            internal_standard_types: vec![IsotopeLabelType::heavy()],
        }
    }
}

impl PeptideModifications {
    /// Modifications for a label type name; `light` maps to the static table
    pub fn modifications_by_name(&self, name: &str) -> Option<TypedModifications> {
        if name == IsotopeLabelType::LIGHT_NAME {
            return Some(TypedModifications::new(
                IsotopeLabelType::light(),
                self.static_modifications.clone(),
            ));
        }
        self.heavy_modifications
            .iter()
            .find(|typed| typed.label_type.name() == name)
            .cloned()
    }

    /// Static modification by name
    pub fn find_static(&self, name: &str) -> Option<&Arc<StaticMod>> {
        self.static_modifications.iter().find(|m| m.name == name)
    }

    /// All label types, light first
    pub fn label_types(&self) -> Vec<IsotopeLabelType> {
        std::iter::once(IsotopeLabelType::light())
            .chain(
                self.heavy_modifications
                    .iter()
                    .map(|typed| typed.label_type.clone()),
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label_mod() -> StaticMod {
        StaticMod {
            amino_acids: Some("K".into()),
            terminus: Some(Terminus::C),
            label_atoms: LabelAtoms {
                c13: true,
                n15: true,
                ..LabelAtoms::default()
            },
            ..StaticMod::named("Label:13C(6)15N(2) (C-term K)")
        }
    }

    #[test]
    fn test_label_atoms_apply() {
        let atoms = label_mod().label_atoms;
        let formula = Formula::parse("C6H12N2O").unwrap();
        let labeled = atoms.apply_to_formula(&formula);
        assert_eq!(labeled, Formula::parse("C'6H12N'2O").unwrap());
        assert_eq!(atoms.heavy_symbols(), vec!["C'", "N'"]);
    }

    #[test]
    fn test_applies_to() {
        let m = label_mod();
        assert!(m.applies_to('K', 6, 7));
        assert!(!m.applies_to('K', 3, 7));
        assert!(!m.applies_to('R', 6, 7));
    }

    #[test]
    fn test_ion_label_mass_diff() {
        let m = StaticMod {
            label_atoms: LabelAtoms {
                n15: true,
                ..LabelAtoms::default()
            },
            ..StaticMod::named("15N")
        };
        assert!((m.ion_label_mass_diff() - 0.997034898).abs() < 1e-6);
    }

    #[test]
    fn test_modifications_by_name() {
        let mods = PeptideModifications::default();
        let light = mods.modifications_by_name("light").unwrap();
        assert!(light.label_type.is_light());
        assert!(mods.modifications_by_name("heavy").is_some());
        assert!(mods.modifications_by_name("medium").is_none());
        assert_eq!(mods.label_types().len(), 2);
    }
}
