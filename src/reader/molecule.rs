//! Custom molecule attributes shared by `molecule` and `transition` elements

use std::io::BufRead;

use log::debug;

use super::cursor::TagCursor;
use super::error::DocumentError;
use super::names::attr;
use crate::chemistry::{split_formula_with_adduct, Adduct, CustomMolecule, Formula, MASS_HYDROGEN};
use crate::string_pool::StringPool;

/// Molecule description as written on an element, before any
/// version-dependent interpretation
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct MoleculeAttributes {
    pub(crate) formula: Option<String>,
    pub(crate) monoisotopic_mass: Option<f64>,
    pub(crate) average_mass: Option<f64>,
    /// Masses came from the `massH_*` attributes
    pub(crate) mass_h: bool,
    pub(crate) name: Option<String>,
}

impl MoleculeAttributes {
    /// Read the molecule attributes of the current start tag
    pub(crate) fn read<R: BufRead>(cursor: &TagCursor<R>) -> Result<Self, DocumentError> {
        let formula = [attr::NEUTRAL_FORMULA, attr::ION_FORMULA, attr::FORMULA]
            .iter()
            .find_map(|name| cursor.attribute(name))
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);

        let mut mass_h = false;
        let mut monoisotopic_mass = match cursor.nullable_double_attribute(attr::MASS_MONOISOTOPIC)? {
            Some(mass) => Some(mass),
            None => cursor.nullable_double_attribute(attr::NEUTRAL_MASS_MONOISOTOPIC)?,
        };
        let mut average_mass = match cursor.nullable_double_attribute(attr::MASS_AVERAGE)? {
            Some(mass) => Some(mass),
            None => cursor.nullable_double_attribute(attr::NEUTRAL_MASS_AVERAGE)?,
        };
        if monoisotopic_mass.is_none() {
            if let Some(mass) = cursor.nullable_double_attribute(attr::MASSH_MONOISOTOPIC)? {
                monoisotopic_mass = Some(mass);
                average_mass = cursor.nullable_double_attribute(attr::MASSH_AVERAGE)?;
                mass_h = true;
            }
        }

        let name = cursor
            .attribute(attr::CUSTOM_ION_NAME)
            .or_else(|| cursor.attribute(attr::NAME))
            .map(str::to_string);

        Ok(Self {
            formula,
            monoisotopic_mass,
            average_mass,
            mass_h,
            name,
        })
    }

    /// Build the molecule, splitting off any adduct written into the formula.
    ///
    /// Mass-only molecules written with `massH_*` attributes keep the written
    /// numbers when `legacy_mass_h` is set; otherwise one hydrogen is removed.
    pub(crate) fn into_molecule(
        self,
        element: &str,
        legacy_mass_h: bool,
        pool: &mut StringPool,
    ) -> Result<(CustomMolecule, Adduct), DocumentError> {
        let name = pool.intern_opt(self.name.as_deref());
        if let Some(text) = self.formula.as_deref() {
            if let Some((neutral, adduct)) = split_formula_with_adduct(text)? {
                return Ok((CustomMolecule::from_formula(neutral, name)?, adduct));
            }
            let formula = Formula::parse(text)?;
            return Ok((CustomMolecule::from_formula(formula, name)?, Adduct::empty()));
        }

        let mono = self
            .monoisotopic_mass
            .ok_or_else(|| DocumentError::MissingAttribute {
                element: element.to_string(),
                attribute: attr::MASS_MONOISOTOPIC.to_string(),
            })?;
        let avg = self.average_mass.unwrap_or(mono);
        let (mono, avg) = if self.mass_h && !legacy_mass_h {
            (mono - MASS_HYDROGEN, avg - MASS_HYDROGEN)
        } else {
            if self.mass_h {
                debug!("Reading massH of {element} as a neutral mass");
            }
            (mono, avg)
        };
        Ok((CustomMolecule::from_masses(mono, avg, name), Adduct::empty()))
    }
}
