//! Reconciliation of small molecule chemistry written before 3.72
//!
//! Older documents stored the charged precursor ion as the molecule, put
//! isotope labels into ion formulas, and did not distinguish m/z from mass
//! for mass-only declarations. The functions here work only on values
//! already read from the current element and its parent.
//!
//! The tolerances are historical constants and must not be re-derived.

use log::debug;

use crate::chemistry::{
    find_isotope_labels_in_formula, split_formula_with_adduct, Adduct, ChemistryError,
    CustomMolecule, Formula, MassCalculator, MassType, MASS_ELECTRON, MASS_HYDROGEN, MASS_PROTON,
};
use crate::settings::{IsotopeLabelType, TypedModifications};

/// Molecule mass vs. charge times declared m/z
const PROTONATED_FORMULA_TOLERANCE: f64 = 0.01;
/// Declared m/z vs. molecule mass, and label count fit
const MZ_EQUALS_MASS_TOLERANCE: f64 = 0.001;
/// Heavy minus light m/z below which there is no label shift
const LABEL_SHIFT_TOLERANCE: f64 = 1e-4;
/// Ion mass vs. molecule mass for proton-inclusive mass-only molecules
const MASS_H_TOLERANCE: f64 = 5e-7;

/// Attributes of the first precursor of a legacy molecule
#[derive(Debug, Clone, Copy)]
pub(crate) struct FirstPrecursor<'a> {
    pub(crate) charge: i32,
    pub(crate) ion_formula: Option<&'a str>,
    pub(crate) declared_mz: f64,
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|text| !text.is_empty())
}

/// Recover the neutral molecule of a pre-3.72 document from its first
/// precursor.
///
/// Returns the molecule and the mass shift every precursor of the molecule
/// must subtract per charge when inferring label shifts.
pub(crate) fn neutralize_embedded_molecule(
    molecule: &CustomMolecule,
    precursor: FirstPrecursor<'_>,
) -> Result<(CustomMolecule, f64), ChemistryError> {
    let charge = precursor.charge;
    let ion_formula = non_empty(precursor.ion_formula);
    let mut molecule = molecule.clone();

    if let Some(text) = ion_formula {
        // An ion formula that does not parse matches nothing here
        match split_formula_with_adduct(text).ok().flatten() {
            Some((neutral, adduct)) => {
                if molecule.formula() == Some(&adduct.apply_to_formula(&neutral)) {
                    debug!("Molecule formula is the precursor ion {text}, using {neutral}");
                    molecule = CustomMolecule::from_formula(neutral, molecule.name_arc())?;
                }
            }
            None => {
                let same_formula = molecule.formula().filter(|formula| {
                    formula.to_string() == text || Formula::parse(text).ok().as_ref() == Some(formula)
                });
                let mass_matches = (molecule.monoisotopic_mass()
                    - charge.abs() as f64 * precursor.declared_mz)
                    .abs()
                    < PROTONATED_FORMULA_TOLERANCE;
                if let Some(ion) = same_formula.filter(|_| mass_matches) {
                    let neutral = ion.adjust_element_count("H", -charge);
                    debug!("Molecule formula {ion} is protonated, using {neutral}");
                    molecule = CustomMolecule::from_formula(neutral, molecule.name_arc())?;
                }
            }
        }
    }

    let mut mass_shift = 0.0;
    if ion_formula.is_none() && !molecule.has_formula() {
        let adduct = Adduct::from_charge_protonated(charge);
        let mass = adduct.mass_from_mz(precursor.declared_mz, MassType::Monoisotopic);
        let ion_mass = mass + charge as f64 * MASS_PROTON;
        let molecule_mass = molecule.monoisotopic_mass() - charge as f64 * MASS_ELECTRON;
        if (ion_mass - molecule_mass).abs() <= MASS_H_TOLERANCE {
            let mono = molecule_mass - charge as f64 * MASS_PROTON;
            let avg = molecule.average_mass()
                - charge as f64 * MASS_ELECTRON
                - charge as f64 * MASS_PROTON;
            debug!("Mass-only molecule includes {charge} protons, neutral mass {mono}");
            molecule = CustomMolecule::from_masses(mono, avg, molecule.name_arc());
            mass_shift = MASS_HYDROGEN - (MASS_PROTON + MASS_ELECTRON);
        }
    }
    Ok((molecule, mass_shift))
}

/// Values of a molecule precursor element needed to settle its adduct
#[derive(Debug, Clone, Copy)]
pub(crate) struct PrecursorChemistry<'a> {
    pub(crate) charge: i32,
    pub(crate) ion_formula: Option<&'a str>,
    /// `precursor_mz` attribute
    pub(crate) declared_mz: Option<f64>,
    /// `mass_monoisotopic` attribute of labelled mass-only precursors
    pub(crate) declared_mass: Option<f64>,
    pub(crate) label_type: &'a IsotopeLabelType,
    pub(crate) typed_mods: &'a TypedModifications,
    pub(crate) embedded_ions: bool,
    /// Shift from [`neutralize_embedded_molecule`]
    pub(crate) delta_mass: f64,
}

/// Adduct of a small molecule precursor
pub(crate) fn precursor_adduct(
    molecule: &CustomMolecule,
    precursor: &PrecursorChemistry<'_>,
    calculator: &dyn MassCalculator,
) -> Result<Adduct, ChemistryError> {
    let charge = precursor.charge;
    let ion_text = non_empty(precursor.ion_formula);
    let split = match ion_text {
        Some(text) => split_formula_with_adduct(text)?,
        None => None,
    };

    let (mut adduct, mut neutral, ion) = match split {
        Some((neutral, adduct)) => {
            let ion = adduct.apply_to_formula(&neutral);
            (adduct, Some(neutral), Some(ion))
        }
        None => {
            let mut adduct = Adduct::non_proteomic_protonated(charge);
            let ion = ion_text.map(Formula::parse).transpose()?;
            if ion.is_none() {
                if let Some(declared) = precursor.declared_mz {
                    if (declared - molecule.monoisotopic_mass()).abs() < MZ_EQUALS_MASS_TOLERANCE {
                        adduct = Adduct::from_charge_no_mass(charge);
                    }
                }
            }
            (adduct, None, ion)
        }
    };

    let molecule_formula = molecule.formula().cloned().unwrap_or_default();
    if precursor.embedded_ions {
        if let Some(ion) = &ion {
            let labels = find_isotope_labels_in_formula(ion);
            adduct = adduct.with_label_counts(labels.clone());
            if adduct.apply_to_formula(&molecule_formula) != *ion {
                adduct = Adduct::from_formula_diff(ion, &molecule_formula, charge)
                    .with_label_counts(labels);
                debug!("Precursor adduct taken from ion formula difference: {adduct}");
            }
            neutral = Some(molecule_formula.clone());
        }
    }

    match neutral.filter(|formula| !formula.is_empty()) {
        Some(neutral) => {
            let ion_string = adduct.apply_to_formula(&neutral);
            let molecule_with_adduct = adduct.apply_to_formula(&molecule_formula);
            if ion_string != molecule_with_adduct {
                return Err(ChemistryError::InconsistentIonFormula {
                    ion: ion_string.to_string(),
                    molecule: molecule_with_adduct.to_string(),
                });
            }
            if precursor.embedded_ions && !precursor.label_type.is_light() {
                let labeled = calculator.labeled_formula(&molecule_formula, precursor.typed_mods);
                let unlabeled = adduct.unlabeled();
                if molecule_with_adduct == unlabeled.apply_to_formula(&labeled) {
                    adduct = unlabeled;
                }
            }
        }
        None if precursor.embedded_ions
            && !precursor.label_type.is_light()
            && !molecule.has_formula() =>
        {
            adduct = label_shift_adduct(adduct, molecule, precursor);
        }
        None => {}
    }
    Ok(adduct)
}

/// Express the label of a mass-only heavy precursor in its adduct, as atom
/// counts when the shift is a whole number of label atoms
fn label_shift_adduct(
    adduct: Adduct,
    molecule: &CustomMolecule,
    precursor: &PrecursorChemistry<'_>,
) -> Adduct {
    let light_mz = adduct.apply_to_mass(molecule.monoisotopic_mass(), MassType::Monoisotopic)
        - precursor.charge as f64 * precursor.delta_mass;
    let heavy_mz = precursor
        .declared_mass
        .or(precursor.declared_mz)
        .unwrap_or(light_mz);
    let mut shift = heavy_mz - light_mz;
    if shift.abs() < LABEL_SHIFT_TOLERANCE {
        shift = 0.0;
    }
    let mut adduct = adduct.with_label_mass(shift);
    if shift == 0.0 {
        return adduct;
    }
    if let Some(first) = precursor.typed_mods.modifications.first() {
        let per_atom = first.ion_label_mass_diff();
        if per_atom != 0.0 {
            let n = (shift / per_atom).round();
            if (n * per_atom - shift).abs() < MZ_EQUALS_MASS_TOLERANCE {
                let counts = first
                    .label_atoms
                    .heavy_symbols()
                    .into_iter()
                    .map(|symbol| (symbol.to_string(), n as i32))
                    .collect();
                adduct = adduct.with_label_counts(counts);
            }
        }
    }
    debug!("Label of mass-only precursor expressed as {adduct}");
    adduct
}

/// Values of a transition needed to settle its product adduct
#[derive(Debug, Clone)]
pub(crate) struct ProductChemistry {
    /// Adduct split from the transition's own molecule formula
    pub(crate) parsed_adduct: Adduct,
    /// `product_charge` attribute
    pub(crate) product_adduct: Adduct,
    pub(crate) is_precursor: bool,
    pub(crate) is_reporter: bool,
    pub(crate) embedded_ions: bool,
    pub(crate) declared_product_mz: Option<f64>,
}

/// Product adduct of a transition, possibly fixing a legacy molecule that
/// was written as its own ion
pub(crate) fn product_adduct(
    molecule: Option<CustomMolecule>,
    product: ProductChemistry,
) -> Result<(Option<CustomMolecule>, Adduct), ChemistryError> {
    if !product.parsed_adduct.is_empty() {
        if !product.product_adduct.is_empty()
            && product.parsed_adduct.charge() != product.product_adduct.charge()
        {
            return Err(ChemistryError::InconsistentCharge {
                adduct: product.parsed_adduct.charge(),
                declared: product.product_adduct.charge(),
            });
        }
        return Ok((molecule, product.parsed_adduct));
    }

    let mut adduct = product.product_adduct;
    let legacy_custom = product.embedded_ions && molecule.is_some() && !product.is_reporter;
    if legacy_custom && adduct.is_proteomic() {
        adduct = Adduct::non_proteomic_protonated(adduct.charge());
    }

    let mut molecule = molecule;
    if !product.is_precursor && legacy_custom {
        if let (Some(current), Some(declared)) = (&molecule, product.declared_product_mz) {
            let mono = current.monoisotopic_mass();
            if (declared - mono).abs() < MZ_EQUALS_MASS_TOLERANCE {
                let fits_charge = (mono - adduct.abs_charge() as f64 * declared).abs()
                    < PROTONATED_FORMULA_TOLERANCE;
                match current.formula() {
                    Some(formula) if !formula.is_empty() && fits_charge => {
                        let neutral = formula.adjust_element_count("H", -adduct.charge());
                        debug!("Product formula {formula} is protonated, using {neutral}");
                        molecule = Some(CustomMolecule::from_formula(neutral, current.name_arc())?);
                    }
                    _ => adduct = Adduct::from_charge_no_mass(adduct.charge()),
                }
            }
        }
    }
    Ok((molecule, adduct))
}
