//! Precursor (`precursor`) elements and the ungrouped transition lists of
//! 0.1 documents

use std::io::BufRead;

use log::debug;

use super::annotations::read_annotations;
use super::cursor::TagCursor;
use super::error::DocumentError;
use super::legacy::{precursor_adduct, PrecursorChemistry};
use super::modifications::read_label_type;
use super::names::{attr, el};
use super::results::{read_precursor_peak, read_results};
use super::transition::{
    build_transition, mass_target, read_transition_list, TransitionRecord, TransitionScope,
};
use super::ParseContext;
use crate::chemistry::{Adduct, MassContext};
use crate::format_version::FormatVersion;
use crate::model::{
    Annotations, ExplicitMods, ExplicitTransitionGroupValues, PeptideTarget, SpectrumHeaderInfo,
    TransitionGroupNode,
};
use crate::settings::IsotopeLabelType;

/// The peptide or molecule whose precursors are being read
#[derive(Debug, Clone, Copy)]
pub(crate) struct PrecursorScope<'s> {
    pub(crate) target: &'s PeptideTarget,
    pub(crate) explicit_mods: Option<&'s ExplicitMods>,
    /// Per-charge mass shift of a legacy mass-only molecule
    pub(crate) delta_mass: f64,
}

fn read_explicit_values<R: BufRead>(
    cursor: &TagCursor<R>,
    version: FormatVersion,
) -> Result<ExplicitTransitionGroupValues, DocumentError> {
    Ok(ExplicitTransitionGroupValues {
        collision_energy: cursor.nullable_double_attribute(attr::EXPLICIT_COLLISION_ENERGY)?,
        drift_time_msec: cursor.nullable_double_attribute(attr::EXPLICIT_DRIFT_TIME_MSEC)?,
        drift_time_high_energy_offset_msec: cursor
            .nullable_double_attribute(attr::EXPLICIT_DRIFT_TIME_HIGH_ENERGY_OFFSET_MSEC)?,
        ccs_sqa: cursor.nullable_double_attribute(attr::EXPLICIT_CCS_SQA)?,
        s_lens: cursor.nullable_double_attribute(attr::S_LENS.resolve(version))?,
        cone_voltage: cursor.nullable_double_attribute(attr::CONE_VOLTAGE.resolve(version))?,
        compensation_voltage: cursor
            .nullable_double_attribute(attr::EXPLICIT_COMPENSATION_VOLTAGE)?,
        declustering_potential: cursor
            .nullable_double_attribute(attr::EXPLICIT_DECLUSTERING_POTENTIAL)?,
    })
}

/// Library header at the cursor, any `*_spectrum_info` element
fn read_spectrum_header<R: BufRead>(
    ctx: &mut ParseContext<'_>,
    cursor: &mut TagCursor<R>,
) -> Result<Option<SpectrumHeaderInfo>, DocumentError> {
    let kind = match cursor.current_name() {
        Some(name) if cursor.is_start() && name.ends_with(el::SPECTRUM_INFO_SUFFIX) => {
            name.to_string()
        }
        _ => return Ok(None),
    };
    let library_name = ctx
        .pool
        .intern(cursor.attribute(attr::LIBRARY_NAME).unwrap_or_default());
    let attributes = cursor
        .attributes()
        .filter(|(name, _)| *name != attr::LIBRARY_NAME)
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    cursor.skip_element()?;
    Ok(Some(SpectrumHeaderInfo {
        kind,
        library_name,
        attributes,
    }))
}

fn calculate_precursor_mz(
    ctx: &ParseContext<'_>,
    scope: &PrecursorScope<'_>,
    label_type: &IsotopeLabelType,
    adduct: &Adduct,
) -> Result<f64, DocumentError> {
    let settings = ctx.settings;
    let mass_context = MassContext {
        modifications: &settings.modifications,
        label_type,
        explicit_mods: scope.explicit_mods,
        mass_type: settings.precursor_mass_type,
    };
    Ok(ctx
        .calculator
        .precursor_mz(&mass_context, mass_target(scope.target), adduct)?)
}

/// Read one `precursor` element with its transitions
pub(crate) fn read_precursor<R: BufRead>(
    ctx: &mut ParseContext<'_>,
    cursor: &mut TagCursor<R>,
    scope: &PrecursorScope<'_>,
) -> Result<TransitionGroupNode, DocumentError> {
    let charge = cursor.int_attribute(attr::CHARGE)?;
    let typed_mods = read_label_type(ctx, cursor, &IsotopeLabelType::light())?;
    let decoy_mass_shift = cursor.nullable_int_attribute(attr::DECOY_MASS_SHIFT)?;
    let explicit_values = read_explicit_values(cursor, ctx.version)?;

    let adduct = match scope.target {
        PeptideTarget::Molecule(molecule) => precursor_adduct(
            molecule,
            &PrecursorChemistry {
                charge,
                ion_formula: cursor.attribute(attr::ION_FORMULA),
                declared_mz: cursor.nullable_double_attribute(attr::PRECURSOR_MZ)?,
                declared_mass: cursor.nullable_double_attribute(attr::MASS_MONOISOTOPIC)?,
                label_type: &typed_mods.label_type,
                typed_mods: &typed_mods,
                embedded_ions: ctx.version.may_contain_embedded_ions(),
                delta_mass: scope.delta_mass,
            },
            ctx.calculator,
        )?,
        PeptideTarget::Peptide(_) => Adduct::from_charge_protonated(charge),
    };
    let auto_manage_children = cursor.bool_attribute(attr::AUTO_MANAGE_CHILDREN, true)?;
    let label_type = typed_mods.label_type;
    let precursor_mz = calculate_precursor_mz(ctx, scope, &label_type, &adduct)?;

    let mut node = TransitionGroupNode {
        adduct,
        label_type,
        decoy_mass_shift,
        precursor_mz,
        explicit_values,
        annotations: Annotations::empty(),
        lib_info: None,
        results: None,
        children: Vec::new(),
        auto_manage_children,
    };
    if cursor.is_empty_element() {
        cursor.skip_element()?;
        return Ok(node);
    }

    cursor.enter_element()?;
    node.annotations = read_annotations(cursor, &mut ctx.pool)?;
    node.lib_info = read_spectrum_header(ctx, cursor)?;
    if cursor.is_start_element(el::PRECURSOR_RESULTS) {
        node.results = read_results(ctx, cursor, el::PRECURSOR_PEAK, read_precursor_peak)?;
    }
    let transition_scope = TransitionScope {
        target: scope.target,
        explicit_mods: scope.explicit_mods,
        precursor_adduct: &node.adduct,
        label_type: &node.label_type,
        decoy: node.decoy_mass_shift.is_some(),
    };
    node.children = read_transition_list(ctx, cursor, &transition_scope)?;
    cursor.exit_element()?;
    Ok(node)
}

/// Read every `precursor` element at the cursor
pub(crate) fn read_precursor_list<R: BufRead>(
    ctx: &mut ParseContext<'_>,
    cursor: &mut TagCursor<R>,
    scope: &PrecursorScope<'_>,
) -> Result<Vec<TransitionGroupNode>, DocumentError> {
    let mut precursors = Vec::new();
    while cursor.is_start_element(el::PRECURSOR) {
        precursors.push(read_precursor(ctx, cursor, scope)?);
    }
    Ok(precursors)
}

/// Read the `transition` elements of a 0.1 peptide, which carry their own
/// precursor charge, into one light precursor per charge.
///
/// Precursors appear in order of first use. Transition annotations, library
/// matches and results are not carried over.
pub(crate) fn read_ungrouped_transitions<R: BufRead>(
    ctx: &mut ParseContext<'_>,
    cursor: &mut TagCursor<R>,
    scope: &PrecursorScope<'_>,
) -> Result<Vec<TransitionGroupNode>, DocumentError> {
    let mut groups: Vec<(Adduct, Vec<TransitionRecord>)> = Vec::new();
    while cursor.is_start_element(el::TRANSITION) {
        let record = TransitionRecord::read(ctx, cursor)?;
        let adduct = Adduct::from_string_assume_protonated(record.precursor_charge.as_deref())?;
        match groups.iter_mut().find(|(existing, _)| *existing == adduct) {
            Some((_, records)) => records.push(record),
            None => groups.push((adduct, vec![record])),
        }
    }
    debug!("Distributed ungrouped transitions into {} precursors", groups.len());

    let light = IsotopeLabelType::light();
    let mut precursors = Vec::with_capacity(groups.len());
    for (adduct, records) in groups {
        let precursor_mz = calculate_precursor_mz(ctx, scope, &light, &adduct)?;
        let transition_scope = TransitionScope {
            target: scope.target,
            explicit_mods: scope.explicit_mods,
            precursor_adduct: &adduct,
            label_type: &light,
            decoy: false,
        };
        let mut children = Vec::with_capacity(records.len());
        for record in records {
            let record = TransitionRecord {
                annotations: Annotations::empty(),
                lib_info: None,
                results: None,
                quantitative: true,
                ..record
            };
            children.push(build_transition(ctx, &transition_scope, record)?);
        }
        precursors.push(TransitionGroupNode {
            adduct,
            label_type: light.clone(),
            decoy_mass_shift: None,
            precursor_mz,
            explicit_values: ExplicitTransitionGroupValues::default(),
            annotations: Annotations::empty(),
            lib_info: None,
            results: None,
            children,
            auto_manage_children: true,
        });
    }
    Ok(precursors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::{CustomMolecule, DefaultMassCalculator, Formula};
    use crate::model::{IonType, Peptide};
    use crate::reader::ErrorKind;
    use crate::settings::{
        ChromFileId, ChromFileInfo, ChromatogramSet, DocumentSettings, MeasuredResults,
    };

    fn peptide(sequence: &str) -> PeptideTarget {
        PeptideTarget::Peptide(Peptide {
            sequence: sequence.to_string(),
            start: None,
            end: None,
            missed_cleavages: 0,
            decoy: false,
        })
    }

    fn settings_with_replicate() -> DocumentSettings {
        DocumentSettings::default().with_measured_results(MeasuredResults::new(vec![
            ChromatogramSet::new(
                "R1",
                vec![ChromFileInfo {
                    id: ChromFileId::new("f1"),
                    path: "f1.raw".to_string(),
                }],
            ),
        ]))
    }

    fn read_one(
        settings: &DocumentSettings,
        version: FormatVersion,
        target: &PeptideTarget,
        xml: &str,
    ) -> Result<TransitionGroupNode, DocumentError> {
        let calculator = DefaultMassCalculator::new();
        let mut ctx = ParseContext::new(settings, version, &calculator);
        let mut cursor = TagCursor::new(xml.as_bytes())?;
        let scope = PrecursorScope {
            target,
            explicit_mods: None,
            delta_mass: 0.0,
        };
        let node = read_precursor(&mut ctx, &mut cursor, &scope)?;
        assert!(cursor.is_eof());
        Ok(node)
    }

    #[test]
    fn test_peptide_precursor_with_children() {
        let settings = settings_with_replicate();
        let target = peptide("PEPTIDER");
        let node = read_one(
            &settings,
            FormatVersion::CURRENT,
            &target,
            r#"<precursor charge="2" explicit_collision_energy="21.5" explicit_s_lens="3">
                <note category="1">checked</note>
                <bibliospec_spectrum_info library_name="Lib" count_measured="3"/>
                <precursor_results>
                    <precursor_peak replicate="R1" step="0" peak_count_ratio="1" area="100">
                        <annotation name="QValue">0.01</annotation>
                    </precursor_peak>
                </precursor_results>
                <transition fragment_type="y" fragment_ordinal="4" product_charge="1"/>
                <transition fragment_type="b" fragment_ordinal="2" product_charge="1"/>
            </precursor>"#,
        )
        .unwrap();
        assert_eq!(node.adduct().charge(), 2);
        assert!(node.label_type().is_light());
        assert!(node.precursor_mz() > 400.0 && node.precursor_mz() < 600.0);
        assert_eq!(node.explicit_values().collision_energy, Some(21.5));
        assert_eq!(node.explicit_values().s_lens, Some(3.0));
        assert_eq!(node.annotations().note(), Some("checked"));
        let lib = node.lib_info().unwrap();
        assert_eq!(lib.kind, "bibliospec_spectrum_info");
        assert_eq!(&*lib.library_name, "Lib");
        assert_eq!(lib.attributes, vec![("count_measured".to_string(), "3".to_string())]);
        let row = &node.results().unwrap().get(0).unwrap()[0];
        assert_eq!(row.qvalue, Some(0.01));
        assert_eq!(node.children().len(), 2);
        assert_eq!(node.children()[1].ion_type(), IonType::B);
        assert!(node.auto_manage_children());
    }

    #[test]
    fn test_obsolete_instrument_names() {
        let settings = DocumentSettings::default();
        let target = peptide("PEPTIDER");
        let xml = r#"<precursor charge="2" s_lens="4" cone_voltage="30" explicit_s_lens="9"/>"#;
        let old = read_one(&settings, FormatVersion::VERSION_3_5, &target, xml).unwrap();
        assert_eq!(old.explicit_values().s_lens, Some(4.0));
        assert_eq!(old.explicit_values().cone_voltage, Some(30.0));
        let new = read_one(&settings, FormatVersion::CURRENT, &target, xml).unwrap();
        assert_eq!(new.explicit_values().s_lens, Some(9.0));
        assert_eq!(new.explicit_values().cone_voltage, None);
    }

    #[test]
    fn test_empty_precursor() {
        let settings = DocumentSettings::default();
        let target = peptide("PEPTIDER");
        let node = read_one(
            &settings,
            FormatVersion::CURRENT,
            &target,
            r#"<precursor charge="3" auto_manage_children="false"/>"#,
        )
        .unwrap();
        assert!(node.children().is_empty());
        assert!(node.results().is_none());
        assert!(Annotations::is_shared_empty(node.annotations()));
        assert!(!node.auto_manage_children());
    }

    #[test]
    fn test_molecule_precursor_adduct_from_ion_formula() {
        let settings = DocumentSettings::default();
        let molecule =
            CustomMolecule::from_formula(Formula::parse("C6H12O6").unwrap(), None).unwrap();
        let target = PeptideTarget::Molecule(molecule);
        let node = read_one(
            &settings,
            FormatVersion::CURRENT,
            &target,
            r#"<precursor charge="1" ion_formula="C6H12O6[M+Na]"/>"#,
        )
        .unwrap();
        assert_eq!(node.adduct().charge(), 1);
        assert!(!node.adduct().is_proteomic());
        assert!(node.precursor_mz() > 200.0);
    }

    #[test]
    fn test_unknown_label_type() {
        let settings = DocumentSettings::default();
        let target = peptide("PEPTIDER");
        let err = read_one(
            &settings,
            FormatVersion::CURRENT,
            &target,
            r#"<precursor charge="2" isotope_label="medium"/>"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingModificationReference);
    }

    #[test]
    fn test_decoy_precursor_checks_transitions() {
        let settings = DocumentSettings::default();
        let target = peptide("PEPTIDER");
        let err = read_one(
            &settings,
            FormatVersion::CURRENT,
            &target,
            r#"<precursor charge="2" decoy_mass_shift="1">
                <transition fragment_type="y" fragment_ordinal="3" product_charge="1" decoy_mass_shift="1"/>
                <transition fragment_type="y" fragment_ordinal="4" product_charge="1"/>
            </precursor>"#,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDecoy);
    }

    #[test]
    fn test_ungrouped_transitions_split_by_charge() {
        let settings = DocumentSettings::default();
        let target = peptide("PEPTIDER");
        let calculator = DefaultMassCalculator::new();
        let mut ctx = ParseContext::new(&settings, FormatVersion::VERSION_0_1, &calculator);
        let xml = r#"<selected_transitions>
            <transition fragment_type="Y" fragment_ordinal="3" precursor_charge="2" product_charge="1">
                <annotation name="Note">dropped</annotation>
            </transition>
            <transition fragment_type="B" fragment_ordinal="3" precursor_charge="3" product_charge="1" quantitative="false"/>
            <transition fragment_type="Y" fragment_ordinal="5" precursor_charge="2" product_charge="1"/>
        </selected_transitions>"#;
        let mut cursor = TagCursor::new(xml.as_bytes()).unwrap();
        cursor.enter_element().unwrap();
        let scope = PrecursorScope {
            target: &target,
            explicit_mods: None,
            delta_mass: 0.0,
        };
        let precursors = read_ungrouped_transitions(&mut ctx, &mut cursor, &scope).unwrap();
        assert!(cursor.is_end());

        assert_eq!(precursors.len(), 2);
        assert_eq!(precursors[0].adduct().charge(), 2);
        assert_eq!(precursors[0].children().len(), 2);
        assert_eq!(precursors[1].adduct().charge(), 3);
        let first = &precursors[0].children()[0];
        assert!(first.annotations().is_empty());
        assert!(precursors[1].children()[0].quantitative());
        assert!(precursors.iter().all(|p| p.label_type().is_light()));
        assert!(Annotations::is_shared_empty(precursors[0].annotations()));
    }
}
