//! Transition elements
//!
//! A transition is read in two steps. [`TransitionRecord`] holds what the
//! element says, from either a verbose `transition` element or one entry of
//! a `transition_data` payload. [`build_transition`] then binds the record to
//! its precursor, resolves modification and reporter ion references, and
//! computes the product m/z.

use std::io::BufRead;
use std::sync::Arc;

use log::trace;

use super::annotations::read_annotations;
use super::bulk::{decode_transition_peaks, decode_transitions};
use super::cursor::TagCursor;
use super::error::{DocumentError, ModificationReference};
use super::legacy::{product_adduct, ProductChemistry};
use super::molecule::MoleculeAttributes;
use super::names::{attr, el};
use super::results::{correlate_transition_peaks, read_results, read_transition_peak};
use super::ParseContext;
use crate::chemistry::{Adduct, FragmentIon, MassContext, MassTarget};
use crate::model::{
    ordinal_to_offset, Annotations, ExplicitMods, IonType, PeptideTarget, Results,
    TransitionChromInfo, TransitionLibInfo, TransitionLoss, TransitionLosses, TransitionNode,
};
use crate::settings::{read_fragment_loss, FragmentLoss, IsotopeLabelType};

/// One neutral loss as written
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LossRecord {
    /// Loss `loss_index` of a static modification
    Modification { name: String, loss_index: i32 },
    /// Loss defined on the transition itself
    Custom(FragmentLoss),
}

/// A transition as written, before it is bound to its precursor
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TransitionRecord {
    pub(crate) ion_type: IonType,
    pub(crate) ordinal: i32,
    pub(crate) mass_index: i32,
    /// Only meaningful for ungrouped 0.1 transitions
    pub(crate) precursor_charge: Option<String>,
    pub(crate) product_charge: Option<String>,
    pub(crate) decoy_mass_shift: Option<i32>,
    pub(crate) quantitative: bool,
    pub(crate) measured_ion_name: Option<String>,
    pub(crate) molecule: Option<MoleculeAttributes>,
    pub(crate) losses: Option<Vec<LossRecord>>,
    pub(crate) lib_info: Option<TransitionLibInfo>,
    pub(crate) declared_product_mz: Option<f64>,
    pub(crate) annotations: Arc<Annotations>,
    pub(crate) results: Option<Results<TransitionChromInfo>>,
}

impl TransitionRecord {
    /// Read a whole `transition` element
    pub(crate) fn read<R: BufRead>(
        ctx: &mut ParseContext<'_>,
        cursor: &mut TagCursor<R>,
    ) -> Result<Self, DocumentError> {
        let mut record = Self::read_attributes(cursor)?;
        record.read_elements(ctx, cursor)?;
        Ok(record)
    }

    fn read_attributes<R: BufRead>(cursor: &TagCursor<R>) -> Result<Self, DocumentError> {
        let ion_type = match cursor.attribute(attr::FRAGMENT_TYPE) {
            None => IonType::Y,
            Some(name) => {
                IonType::from_name(name).ok_or_else(|| DocumentError::InvalidAttributeValue {
                    attribute: attr::FRAGMENT_TYPE.to_string(),
                    value: name.to_string(),
                })?
            }
        };
        Ok(Self {
            ion_type,
            ordinal: cursor.int_attribute_or(attr::FRAGMENT_ORDINAL, 0)?,
            mass_index: cursor.int_attribute_or(attr::MASS_INDEX, 0)?,
            precursor_charge: cursor.attribute(attr::PRECURSOR_CHARGE).map(str::to_string),
            product_charge: cursor.attribute(attr::PRODUCT_CHARGE).map(str::to_string),
            decoy_mass_shift: cursor.nullable_int_attribute(attr::DECOY_MASS_SHIFT)?,
            quantitative: cursor.bool_attribute(attr::QUANTITATIVE, true)?,
            measured_ion_name: cursor.attribute(attr::MEASURED_ION_NAME).map(str::to_string),
            molecule: Some(MoleculeAttributes::read(cursor)?),
            losses: None,
            lib_info: None,
            declared_product_mz: None,
            annotations: Annotations::empty(),
            results: None,
        })
    }

    /// Child elements. Annotations come first in every revision; the
    /// remaining sections may appear in any order.
    fn read_elements<R: BufRead>(
        &mut self,
        ctx: &mut ParseContext<'_>,
        cursor: &mut TagCursor<R>,
    ) -> Result<(), DocumentError> {
        if cursor.is_empty_element() {
            return cursor.skip_element();
        }
        cursor.enter_element()?;
        self.annotations = read_annotations(cursor, &mut ctx.pool)?;
        loop {
            if cursor.is_start_element(el::LOSSES) {
                self.losses = Some(read_losses(cursor)?);
            } else if cursor.is_start_element(el::TRANSITION_LIB_INFO) {
                self.lib_info = Some(TransitionLibInfo {
                    rank: cursor.int_attribute(attr::RANK)?,
                    intensity: cursor.float_attribute(attr::INTENSITY)?,
                });
                cursor.skip_element()?;
            } else if cursor.is_start_element(el::TRANSITION_RESULTS)
                || cursor.is_start_element(el::RESULTS_DATA)
            {
                self.results = read_transition_results(ctx, cursor)?;
            } else if cursor.is_start_element(el::PRODUCT_MZ) {
                self.declared_product_mz = Some(cursor.read_element_f64()?);
            } else if [
                el::PRECURSOR_MZ,
                el::COLLISION_ENERGY,
                el::DECLUSTERING_POTENTIAL,
                el::START_RT,
                el::STOP_RT,
            ]
            .iter()
            .any(|name| cursor.is_start_element(name))
            {
                trace!("Discarding recomputed value <{}>", cursor.describe());
                cursor.read_element_f64()?;
            } else {
                break;
            }
        }
        cursor.exit_element()
    }
}

fn read_losses<R: BufRead>(cursor: &mut TagCursor<R>) -> Result<Vec<LossRecord>, DocumentError> {
    let mut losses = Vec::new();
    if cursor.is_empty_element() {
        cursor.skip_element()?;
        return Ok(losses);
    }
    cursor.enter_element()?;
    while cursor.is_start_element(el::NEUTRAL_LOSS) {
        let loss = match cursor.attribute(attr::MODIFICATION_NAME) {
            Some(name) if !name.is_empty() => LossRecord::Modification {
                name: name.to_string(),
                loss_index: cursor.int_attribute(attr::LOSS_INDEX)?,
            },
            _ => LossRecord::Custom(read_fragment_loss(cursor)?),
        };
        losses.push(loss);
        cursor.skip_element()?;
    }
    cursor.exit_element()?;
    Ok(losses)
}

/// `transition_results` rows or a `results_data` payload
fn read_transition_results<R: BufRead>(
    ctx: &mut ParseContext<'_>,
    cursor: &mut TagCursor<R>,
) -> Result<Option<Results<TransitionChromInfo>>, DocumentError> {
    if cursor.is_start_element(el::RESULTS_DATA) {
        let text = cursor.read_element_text()?;
        let records = decode_transition_peaks(&text, &mut ctx.pool)?;
        return correlate_transition_peaks(ctx, records);
    }
    read_results(ctx, cursor, el::TRANSITION_PEAK, read_transition_peak)
}

fn resolve_losses(
    ctx: &ParseContext<'_>,
    records: Vec<LossRecord>,
) -> Result<TransitionLosses, DocumentError> {
    let settings = ctx.settings;
    let mut losses = Vec::with_capacity(records.len());
    for record in records {
        let loss = match record {
            LossRecord::Custom(loss) => TransitionLoss {
                modification: None,
                loss,
            },
            LossRecord::Modification { name, loss_index } => {
                let modification = settings
                    .modifications
                    .find_static(&name)
                    .ok_or_else(|| DocumentError::missing_modification(&name))?;
                let loss = usize::try_from(loss_index)
                    .ok()
                    .and_then(|index| modification.losses.get(index))
                    .cloned()
                    .ok_or_else(|| {
                        DocumentError::MissingModificationReference(
                            ModificationReference::LossIndex {
                                index: loss_index,
                                modification: name.clone(),
                            },
                        )
                    })?;
                TransitionLoss {
                    modification: Some(Arc::clone(modification)),
                    loss,
                }
            }
        };
        losses.push(loss);
    }
    Ok(TransitionLosses::new(losses, settings.fragment_mass_type))
}

/// The precursor a transition belongs to
#[derive(Debug, Clone, Copy)]
pub(crate) struct TransitionScope<'s> {
    pub(crate) target: &'s PeptideTarget,
    pub(crate) explicit_mods: Option<&'s ExplicitMods>,
    pub(crate) precursor_adduct: &'s Adduct,
    pub(crate) label_type: &'s IsotopeLabelType,
    /// The precursor carries a decoy mass shift
    pub(crate) decoy: bool,
}

/// What the calculator weighs for a peptide or molecule
pub(crate) fn mass_target(target: &PeptideTarget) -> MassTarget<'_> {
    match target {
        PeptideTarget::Peptide(peptide) => MassTarget::Sequence(&peptide.sequence),
        PeptideTarget::Molecule(molecule) => MassTarget::Molecule(molecule),
    }
}

/// Bind a record to its precursor and compute its product m/z
pub(crate) fn build_transition(
    ctx: &mut ParseContext<'_>,
    scope: &TransitionScope<'_>,
    record: TransitionRecord,
) -> Result<TransitionNode, DocumentError> {
    let settings = ctx.settings;
    let embedded_ions = ctx.version.may_contain_embedded_ions();

    let measured_ion = match record.measured_ion_name.as_deref() {
        None => None,
        Some(name) => Some(settings.find_measured_ion(name).ok_or_else(|| {
            DocumentError::MissingModificationReference(ModificationReference::MeasuredIon(
                name.to_string(),
            ))
        })?),
    };
    let ion_type = if measured_ion.is_some() {
        IonType::Custom
    } else {
        record.ion_type
    };
    let is_precursor = ion_type == IonType::Precursor;
    let is_custom = ion_type == IonType::Custom || scope.target.is_custom_molecule();

    let mut molecule = None;
    let mut parsed_adduct = Adduct::empty();
    if is_custom {
        if let Some(ion) = measured_ion {
            molecule = ion.custom_ion.clone();
        } else if is_precursor {
            molecule = scope.target.molecule().cloned();
        } else {
            let attributes = record.molecule.unwrap_or_default();
            let (fragment, adduct) =
                attributes.into_molecule(el::TRANSITION, embedded_ions, &mut ctx.pool)?;
            molecule = Some(fragment);
            parsed_adduct = adduct;
        }
    }

    let (molecule, adduct) = product_adduct(
        molecule,
        ProductChemistry {
            parsed_adduct,
            product_adduct: Adduct::from_string_assume_protonated(record.product_charge.as_deref())?,
            is_precursor,
            is_reporter: measured_ion.is_some(),
            embedded_ions,
            declared_product_mz: record.declared_product_mz,
        },
    )?;

    let length = scope.target.len();
    let (adduct, ordinal, cleavage_offset, decoy_mass_shift) = if is_custom {
        let adduct = if is_precursor {
            scope.precursor_adduct.clone()
        } else {
            adduct
        };
        (adduct, record.ordinal, 0, None)
    } else if is_precursor {
        (
            scope.precursor_adduct.clone(),
            length as i32,
            length as i32 - 1,
            record.decoy_mass_shift,
        )
    } else {
        let offset = ordinal_to_offset(ion_type, record.ordinal, length);
        (adduct, record.ordinal, offset, record.decoy_mass_shift)
    };

    let losses = record
        .losses
        .map(|losses| resolve_losses(ctx, losses))
        .transpose()?;

    let mass_context = MassContext {
        modifications: &settings.modifications,
        label_type: scope.label_type,
        explicit_mods: scope.explicit_mods,
        mass_type: settings.fragment_mass_type,
    };
    let product_mz = ctx.calculator.fragment_mz(
        &mass_context,
        mass_target(scope.target),
        &FragmentIon {
            ion_type,
            ordinal,
            mass_index: record.mass_index,
            adduct: &adduct,
            custom_ion: molecule.as_ref(),
            losses_mass: losses.as_ref().map_or(0.0, TransitionLosses::mass),
        },
    )?;

    if scope.decoy && record.decoy_mass_shift.is_none() {
        return Err(DocumentError::DecoyTransitionWithoutMassShift);
    }

    Ok(TransitionNode {
        ion_type,
        ordinal,
        cleavage_offset,
        mass_index: record.mass_index,
        adduct,
        decoy_mass_shift,
        custom_ion: if is_custom { molecule } else { None },
        measured_ion_name: ctx.pool.intern_opt(record.measured_ion_name.as_deref()),
        losses,
        product_mz,
        declared_product_mz: record.declared_product_mz,
        annotations: record.annotations,
        lib_info: record.lib_info,
        results: record.results,
        quantitative: record.quantitative,
    })
}

/// Read the transitions of a precursor: a `transition_data` payload or a
/// run of `transition` elements
pub(crate) fn read_transition_list<R: BufRead>(
    ctx: &mut ParseContext<'_>,
    cursor: &mut TagCursor<R>,
    scope: &TransitionScope<'_>,
) -> Result<Vec<TransitionNode>, DocumentError> {
    let mut transitions = Vec::new();
    if cursor.is_start_element(el::TRANSITION_DATA) {
        let text = cursor.read_element_text()?;
        for (mut record, peaks) in decode_transitions(&text, &mut ctx.pool)? {
            record.results = correlate_transition_peaks(ctx, peaks)?;
            transitions.push(build_transition(ctx, scope, record)?);
        }
    } else {
        while cursor.is_start_element(el::TRANSITION) {
            let record = TransitionRecord::read(ctx, cursor)?;
            transitions.push(build_transition(ctx, scope, record)?);
        }
    }
    Ok(transitions)
}
