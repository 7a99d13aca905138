//! Chemistry primitives used while reading documents
//!
//! The reader never derives chemistry on its own beyond what the legacy
//! format requires: formulas and adducts are parsed, compared, and shifted
//! by a few atoms, and masses are delegated to a [`MassCalculator`].

mod adduct;
mod calculator;
mod elements;
mod formula;
mod molecule;

pub use adduct::{split_formula_with_adduct, Adduct, AdductKind, IsotopeLabels};
pub use calculator::{DefaultMassCalculator, FragmentIon, MassCalculator, MassContext, MassTarget};
pub use elements::{
    element_masses, heavy_symbol_for_nickname, light_symbol, nickname_for_heavy_symbol, MassType,
    MASS_ELECTRON, MASS_HYDROGEN, MASS_PROTON, MASS_SHIFT_C13,
};
pub use formula::{find_isotope_labels_in_formula, Formula};
pub use molecule::CustomMolecule;

/// Errors raised while parsing or evaluating chemistry
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChemistryError {
    /// Formula contains a symbol with no known mass
    #[error("Unknown element '{symbol}' in formula '{formula}'")]
    UnknownElement {
        /// Offending symbol
        symbol: String,
        /// Formula text being parsed
        formula: String,
    },

    /// Formula text is not a sequence of element/count pairs
    #[error("Invalid formula '{0}'")]
    InvalidFormula(String),

    /// Adduct text could not be parsed
    #[error("Invalid adduct '{0}'")]
    InvalidAdduct(String),

    /// Peptide sequence contains a residue with no known composition
    #[error("Unknown amino acid '{residue}' in sequence '{sequence}'")]
    UnknownResidue {
        /// Offending residue
        residue: char,
        /// Sequence being evaluated
        sequence: String,
    },

    /// Fragment ordinal outside the peptide
    #[error("Fragment ordinal {ordinal} out of range for a peptide of length {length}")]
    OrdinalOutOfRange {
        /// Requested ordinal
        ordinal: usize,
        /// Peptide length
        length: usize,
    },

    /// Adduct applied to the neutral formula disagrees with the parent molecule
    #[error("Precursor ion formula '{ion}' does not match parent molecule with adduct applied '{molecule}'")]
    InconsistentIonFormula {
        /// Ion formula from the precursor
        ion: String,
        /// Parent molecule formula with the adduct applied
        molecule: String,
    },

    /// Adduct parsed from a custom ion disagrees with the declared charge
    #[error("Adduct charge {adduct} does not match declared charge {declared}")]
    InconsistentCharge {
        /// Charge carried by the parsed adduct
        adduct: i32,
        /// Charge declared on the element
        declared: i32,
    },
}
