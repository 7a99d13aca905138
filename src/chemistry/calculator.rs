//! Precursor and fragment m/z calculation
//!
//! The reader hands every calculated value to a [`MassCalculator`], so
//! hosts with richer chemistry can plug in their own. The default
//! implementation covers the twenty standard residues, settings
//! modifications and isotope label atoms.

use std::collections::HashMap;

use super::adduct::Adduct;
use super::elements::{MassType, MASS_SHIFT_C13};
use super::formula::Formula;
use super::molecule::CustomMolecule;
use super::ChemistryError;
use crate::model::{ExplicitMod, ExplicitMods, IonType};
use crate::settings::{IsotopeLabelType, LabelAtoms, PeptideModifications, StaticMod, TypedModifications};

/// Settings that decide how a target is weighed
#[derive(Debug, Clone, Copy)]
pub struct MassContext<'a> {
    /// Modification tables
    pub modifications: &'a PeptideModifications,
    /// Label type of the precursor
    pub label_type: &'a IsotopeLabelType,
    /// Per-peptide modifications
    pub explicit_mods: Option<&'a ExplicitMods>,
    /// Monoisotopic or average
    pub mass_type: MassType,
}

/// What is being weighed
#[derive(Debug, Clone, Copy)]
pub enum MassTarget<'a> {
    /// Unmodified amino acid sequence
    Sequence(&'a str),
    /// Small molecule
    Molecule(&'a CustomMolecule),
}

/// A fragment to weigh
#[derive(Debug, Clone, Copy)]
pub struct FragmentIon<'a> {
    /// Ion series
    pub ion_type: IonType,
    /// Residue count of the fragment
    pub ordinal: i32,
    /// Isotope peak index
    pub mass_index: i32,
    /// Product adduct
    pub adduct: &'a Adduct,
    /// Fragment molecule for custom ions
    pub custom_ion: Option<&'a CustomMolecule>,
    /// Mass of neutral losses
    pub losses_mass: f64,
}

/// Mass calculation capability consumed by the reader
pub trait MassCalculator: Send + Sync {
    /// m/z of the precursor ion
    fn precursor_mz(
        &self,
        ctx: &MassContext<'_>,
        target: MassTarget<'_>,
        adduct: &Adduct,
    ) -> Result<f64, ChemistryError>;

    /// m/z of a fragment ion
    fn fragment_mz(
        &self,
        ctx: &MassContext<'_>,
        target: MassTarget<'_>,
        ion: &FragmentIon<'_>,
    ) -> Result<f64, ChemistryError>;

    /// `formula` with the label atoms of `modifications` applied
    fn labeled_formula(&self, formula: &Formula, modifications: &TypedModifications) -> Formula;
}

/// Residue compositions as C, H, N, O, S counts
const RESIDUES: [(char, [i32; 5]); 20] = [
    ('G', [2, 3, 1, 1, 0]),
    ('A', [3, 5, 1, 1, 0]),
    ('S', [3, 5, 1, 2, 0]),
    ('P', [5, 7, 1, 1, 0]),
    ('V', [5, 9, 1, 1, 0]),
    ('T', [4, 7, 1, 2, 0]),
    ('C', [3, 5, 1, 1, 1]),
    ('L', [6, 11, 1, 1, 0]),
    ('I', [6, 11, 1, 1, 0]),
    ('N', [4, 6, 2, 2, 0]),
    ('D', [4, 5, 1, 3, 0]),
    ('Q', [5, 8, 2, 2, 0]),
    ('K', [6, 12, 2, 1, 0]),
    ('E', [5, 7, 1, 3, 0]),
    ('M', [5, 9, 1, 1, 1]),
    ('H', [6, 7, 3, 1, 0]),
    ('F', [9, 9, 1, 1, 0]),
    ('R', [6, 12, 4, 1, 0]),
    ('Y', [9, 9, 1, 2, 0]),
    ('W', [11, 10, 2, 1, 0]),
];

fn composition(counts: &[(&str, i32)]) -> Formula {
    counts
        .iter()
        .fold(Formula::new(), |f, (symbol, n)| f.adjust_element_count(symbol, *n))
}

/// Calculator for peptides with settings modifications and for molecules
#[derive(Debug, Clone)]
pub struct DefaultMassCalculator {
    residues: HashMap<char, Formula>,
}

impl Default for DefaultMassCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultMassCalculator {
    /// Calculator with the standard residue table
    pub fn new() -> Self {
        let residues = RESIDUES
            .iter()
            .map(|(aa, [c, h, n, o, s])| {
                let formula = composition(&[("C", *c), ("H", *h), ("N", *n), ("O", *o), ("S", *s)]);
                (*aa, formula)
            })
            .collect();
        Self { residues }
    }

    fn residue_formula(&self, residue: char, sequence: &str) -> Result<&Formula, ChemistryError> {
        self.residues
            .get(&residue)
            .ok_or_else(|| ChemistryError::UnknownResidue {
                residue,
                sequence: sequence.to_string(),
            })
    }

    /// Mass of each residue with its modifications and labels
    fn residue_masses(
        &self,
        ctx: &MassContext<'_>,
        sequence: &str,
    ) -> Result<Vec<f64>, ChemistryError> {
        let length = sequence.chars().count();
        let static_mods = self.static_mods(ctx, sequence, length);
        let heavy_mods = self.heavy_mods(ctx, sequence, length);

        let mut masses = Vec::with_capacity(length);
        for (index, residue) in sequence.chars().enumerate() {
            let formula = self.residue_formula(residue, sequence)?;
            let mut mass = formula.mass(ctx.mass_type)?;
            for m in static_mods.iter().chain(heavy_mods.iter()) {
                if m.index_aa != index {
                    continue;
                }
                mass += m.modification.mass_diff(ctx.mass_type);
                mass += label_mass_diff(&m.modification.label_atoms, formula, ctx.mass_type)?;
            }
            masses.push(mass);
        }
        Ok(masses)
    }

    fn static_mods(&self, ctx: &MassContext<'_>, sequence: &str, length: usize) -> Vec<ExplicitMod> {
        if let Some(explicit) = ctx.explicit_mods.and_then(ExplicitMods::static_modifications) {
            return explicit.to_vec();
        }
        implicit_mods(&ctx.modifications.static_modifications, sequence, length)
    }

    fn heavy_mods(&self, ctx: &MassContext<'_>, sequence: &str, length: usize) -> Vec<ExplicitMod> {
        if ctx.label_type.is_light() {
            return Vec::new();
        }
        if let Some(explicit) = ctx
            .explicit_mods
            .and_then(|mods| mods.heavy_modifications_for(ctx.label_type))
        {
            return explicit.to_vec();
        }
        ctx.modifications
            .modifications_by_name(ctx.label_type.name())
            .map(|typed| implicit_mods(&typed.modifications, sequence, length))
            .unwrap_or_default()
    }

    fn peptide_neutral_mass(&self, ctx: &MassContext<'_>, sequence: &str) -> Result<f64, ChemistryError> {
        let water = composition(&[("H", 2), ("O", 1)]).mass(ctx.mass_type)?;
        Ok(self.residue_masses(ctx, sequence)?.iter().sum::<f64>() + water)
    }

    fn molecule_mass(&self, ctx: &MassContext<'_>, molecule: &CustomMolecule) -> Result<f64, ChemistryError> {
        match molecule.formula() {
            Some(formula) if !formula.is_empty() && !ctx.label_type.is_light() => {
                match ctx.modifications.modifications_by_name(ctx.label_type.name()) {
                    Some(typed) => self.labeled_formula(formula, &typed).mass(ctx.mass_type),
                    None => Ok(molecule.mass(ctx.mass_type)),
                }
            }
            _ => Ok(molecule.mass(ctx.mass_type)),
        }
    }
}

fn implicit_mods(mods: &[std::sync::Arc<StaticMod>], sequence: &str, length: usize) -> Vec<ExplicitMod> {
    let mut placed = Vec::new();
    for (index, residue) in sequence.chars().enumerate() {
        for m in mods {
            if !m.explicit && !m.variable && m.applies_to(residue, index, length) {
                placed.push(ExplicitMod {
                    index_aa: index,
                    modification: m.clone(),
                });
            }
        }
    }
    placed
}

fn label_mass_diff(
    atoms: &LabelAtoms,
    formula: &Formula,
    mass_type: MassType,
) -> Result<f64, ChemistryError> {
    if atoms.is_empty() {
        return Ok(0.0);
    }
    Ok(atoms.apply_to_formula(formula).mass(mass_type)? - formula.mass(mass_type)?)
}

impl MassCalculator for DefaultMassCalculator {
    fn precursor_mz(
        &self,
        ctx: &MassContext<'_>,
        target: MassTarget<'_>,
        adduct: &Adduct,
    ) -> Result<f64, ChemistryError> {
        let neutral = match target {
            MassTarget::Sequence(sequence) => self.peptide_neutral_mass(ctx, sequence)?,
            MassTarget::Molecule(molecule) => self.molecule_mass(ctx, molecule)?,
        };
        Ok(adduct.apply_to_mass(neutral, ctx.mass_type))
    }

    fn fragment_mz(
        &self,
        ctx: &MassContext<'_>,
        target: MassTarget<'_>,
        ion: &FragmentIon<'_>,
    ) -> Result<f64, ChemistryError> {
        let neutral = match (ion.ion_type, target) {
            (IonType::Custom, _) => match (ion.custom_ion, target) {
                (Some(custom), _) => custom.mass(ctx.mass_type),
                (None, MassTarget::Molecule(molecule)) => self.molecule_mass(ctx, molecule)?,
                (None, MassTarget::Sequence(sequence)) => {
                    return Err(ChemistryError::InvalidFormula(format!(
                        "custom fragment of {sequence} has no molecule"
                    )))
                }
            },
            (IonType::Precursor, MassTarget::Sequence(sequence)) => {
                self.peptide_neutral_mass(ctx, sequence)?
            }
            (_, MassTarget::Molecule(molecule)) => self.molecule_mass(ctx, molecule)?,
            (ion_type, MassTarget::Sequence(sequence)) => {
                let masses = self.residue_masses(ctx, sequence)?;
                let length = masses.len();
                let ordinal = usize::try_from(ion.ordinal).unwrap_or(0);
                if ordinal == 0 || ordinal >= length {
                    return Err(ChemistryError::OrdinalOutOfRange { ordinal, length });
                }
                let mt = ctx.mass_type;
                let co = composition(&[("C", 1), ("O", 1)]).mass(mt)?;
                let nh3 = composition(&[("N", 1), ("H", 3)]).mass(mt)?;
                let water = composition(&[("H", 2), ("O", 1)]).mass(mt)?;
                let h2 = composition(&[("H", 2)]).mass(mt)?;
                let prefix: f64 = masses[..ordinal].iter().sum();
                let suffix: f64 = masses[length - ordinal..].iter().sum::<f64>() + water;
                match ion_type {
                    IonType::A => prefix - co,
                    IonType::B => prefix,
                    IonType::C => prefix + nh3,
                    IonType::X => suffix + co - h2,
                    IonType::Y => suffix,
                    // z ion as y - NH3
                    _ => suffix - nh3,
                }
            }
        };
        let shifted = neutral + ion.mass_index as f64 * MASS_SHIFT_C13 - ion.losses_mass;
        Ok(ion.adduct.apply_to_mass(shifted, ctx.mass_type))
    }

    fn labeled_formula(&self, formula: &Formula, modifications: &TypedModifications) -> Formula {
        let atoms = modifications
            .modifications
            .iter()
            .fold(LabelAtoms::default(), |acc, m| LabelAtoms {
                c13: acc.c13 || m.label_atoms.c13,
                n15: acc.n15 || m.label_atoms.n15,
                o18: acc.o18 || m.label_atoms.o18,
                h2: acc.h2 || m.label_atoms.h2,
                cl37: acc.cl37 || m.label_atoms.cl37,
                br81: acc.br81 || m.label_atoms.br81,
            });
        atoms.apply_to_formula(formula)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::settings::Terminus;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    fn light_context(mods: &PeptideModifications) -> MassContext<'_> {
        MassContext {
            modifications: mods,
            label_type: light(),
            explicit_mods: None,
            mass_type: MassType::Monoisotopic,
        }
    }

    fn light() -> &'static IsotopeLabelType {
        static LIGHT: std::sync::OnceLock<IsotopeLabelType> = std::sync::OnceLock::new();
        LIGHT.get_or_init(IsotopeLabelType::light)
    }

    #[test]
    fn test_peptide_precursor_mz() {
        let calc = DefaultMassCalculator::new();
        let mods = PeptideModifications::default();
        let ctx = light_context(&mods);
        let mz = calc
            .precursor_mz(&ctx, MassTarget::Sequence("PEPTIDE"), &Adduct::from_charge_protonated(2))
            .unwrap();
        assert!(approx(mz, 400.68725), "{mz}");
    }

    #[test]
    fn test_fragment_series() {
        let calc = DefaultMassCalculator::new();
        let mods = PeptideModifications::default();
        let ctx = light_context(&mods);
        let adduct = Adduct::from_charge_protonated(1);
        let ion = |ion_type, ordinal| FragmentIon {
            ion_type,
            ordinal,
            mass_index: 0,
            adduct: &adduct,
            custom_ion: None,
            losses_mass: 0.0,
        };
        let target = MassTarget::Sequence("PEPTIDE");
        let y1 = calc.fragment_mz(&ctx, target, &ion(IonType::Y, 1)).unwrap();
        assert!(approx(y1, 148.06043), "{y1}");
        let b2 = calc.fragment_mz(&ctx, target, &ion(IonType::B, 2)).unwrap();
        assert!(approx(b2, 227.10263), "{b2}");
        let a2 = calc.fragment_mz(&ctx, target, &ion(IonType::A, 2)).unwrap();
        assert!(approx(b2 - a2, 27.99491), "{a2}");
        assert!(matches!(
            calc.fragment_mz(&ctx, target, &ion(IonType::Y, 7)),
            Err(ChemistryError::OrdinalOutOfRange { .. })
        ));
    }

    #[test]
    fn test_heavy_label_shift() {
        let calc = DefaultMassCalculator::new();
        let label = StaticMod {
            amino_acids: Some("K".into()),
            terminus: Some(Terminus::C),
            label_atoms: LabelAtoms {
                c13: true,
                n15: true,
                ..LabelAtoms::default()
            },
            ..StaticMod::named("Label:13C(6)15N(2)")
        };
        let mods = PeptideModifications {
            heavy_modifications: vec![TypedModifications::new(
                IsotopeLabelType::heavy(),
                vec![Arc::new(label)],
            )],
            ..PeptideModifications::default()
        };
        let heavy = IsotopeLabelType::heavy();
        let adduct = Adduct::from_charge_protonated(2);
        let light_mz = calc
            .precursor_mz(&light_context(&mods), MassTarget::Sequence("PEPTIDEK"), &adduct)
            .unwrap();
        let heavy_ctx = MassContext {
            label_type: &heavy,
            ..light_context(&mods)
        };
        let heavy_mz = calc
            .precursor_mz(&heavy_ctx, MassTarget::Sequence("PEPTIDEK"), &adduct)
            .unwrap();
        assert!(approx(heavy_mz - light_mz, 8.0142 / 2.0), "{}", heavy_mz - light_mz);
    }

    #[test]
    fn test_static_mod_mass() {
        let calc = DefaultMassCalculator::new();
        let carbamidomethyl = StaticMod {
            amino_acids: Some("C".into()),
            formula: Some(Formula::parse("C2H3NO").unwrap()),
            ..StaticMod::named("Carbamidomethyl")
        };
        let plain = PeptideModifications::default();
        let modified = PeptideModifications {
            static_modifications: vec![Arc::new(carbamidomethyl)],
            ..PeptideModifications::default()
        };
        let adduct = Adduct::from_charge_protonated(1);
        let a = calc
            .precursor_mz(&light_context(&plain), MassTarget::Sequence("ACK"), &adduct)
            .unwrap();
        let b = calc
            .precursor_mz(&light_context(&modified), MassTarget::Sequence("ACK"), &adduct)
            .unwrap();
        assert!(approx(b - a, 57.02146));
    }

    #[test]
    fn test_molecule_and_unknown_residue() {
        let calc = DefaultMassCalculator::new();
        let mods = PeptideModifications::default();
        let ctx = light_context(&mods);
        let molecule = CustomMolecule::from_masses(300.0, 300.2, None);
        let mz = calc
            .precursor_mz(&ctx, MassTarget::Molecule(&molecule), &Adduct::from_charge_no_mass(2))
            .unwrap();
        assert!(approx(mz, 150.0));
        assert!(matches!(
            calc.precursor_mz(&ctx, MassTarget::Sequence("PEPXIDE"), &Adduct::from_charge_protonated(1)),
            Err(ChemistryError::UnknownResidue { residue: 'X', .. })
        ));
    }

    #[test]
    fn test_labeled_formula() {
        let calc = DefaultMassCalculator::new();
        let label = StaticMod {
            label_atoms: LabelAtoms {
                c13: true,
                ..LabelAtoms::default()
            },
            ..StaticMod::named("13C")
        };
        let typed = TypedModifications::new(IsotopeLabelType::heavy(), vec![Arc::new(label)]);
        let formula = Formula::parse("C6H12O6").unwrap();
        assert_eq!(
            calc.labeled_formula(&formula, &typed),
            Formula::parse("C'6H12O6").unwrap()
        );
    }
}
