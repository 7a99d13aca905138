//! Peptide (`peptide`) and small molecule (`molecule`) elements

use std::io::BufRead;

use log::debug;

use super::annotations::read_annotations;
use super::cursor::TagCursor;
use super::error::DocumentError;
use super::legacy::{neutralize_embedded_molecule, FirstPrecursor};
use super::modifications::{read_explicit_mods, read_lookup_mods, skip_implicit_mods};
use super::molecule::MoleculeAttributes;
use super::names::{attr, el};
use super::precursor::{read_precursor_list, read_ungrouped_transitions, PrecursorScope};
use super::results::{read_peptide_result, read_results};
use super::ParseContext;
use crate::model::{
    Annotations, ExplicitRetentionTime, LookupSequence, Peptide, PeptideNode, PeptideTarget,
    StandardType,
};

/// Attributes of a `peptide` element
fn read_peptide_target<R: BufRead>(
    cursor: &TagCursor<R>,
    group_sequence: Option<&str>,
) -> Result<Peptide, DocumentError> {
    // Offsets only make sense against a protein sequence
    let (start, end) = match group_sequence {
        Some(_) => (
            cursor.nullable_int_attribute(attr::START)?,
            cursor.nullable_int_attribute(attr::END)?,
        ),
        None => (None, None),
    };
    let sequence = match cursor.attribute(attr::SEQUENCE) {
        Some(sequence) => sequence.to_string(),
        None => protein_slice(group_sequence, start, end).ok_or_else(|| {
            DocumentError::MissingAttribute {
                element: el::PEPTIDE.to_string(),
                attribute: attr::SEQUENCE.to_string(),
            }
        })?,
    };
    Ok(Peptide {
        sequence,
        start,
        end,
        missed_cleavages: cursor.int_attribute(attr::NUM_MISSED_CLEAVAGES)?,
        decoy: cursor.bool_attribute(attr::DECOY, false)?,
    })
}

/// Residues `start..end` of the protein, for peptides written by offset only
fn protein_slice(protein: Option<&str>, start: Option<i32>, end: Option<i32>) -> Option<String> {
    let start = usize::try_from(start?).ok()?;
    let end = usize::try_from(end?).ok()?;
    protein?.get(start..end).map(str::to_string)
}

/// Attributes of the first `precursor`, which describe the ion a legacy
/// molecule was written as
fn first_precursor<R: BufRead>(cursor: &TagCursor<R>) -> Result<FirstPrecursor<'_>, DocumentError> {
    Ok(FirstPrecursor {
        charge: cursor.int_attribute(attr::CHARGE)?,
        ion_formula: cursor.attribute(attr::ION_FORMULA),
        declared_mz: cursor.double_attribute(attr::PRECURSOR_MZ)?,
    })
}

/// Read one `peptide` or `molecule` element with its precursors.
///
/// `group_sequence` is the protein sequence of the enclosing group, `None`
/// for peptide lists.
pub(crate) fn read_peptide<R: BufRead>(
    ctx: &mut ParseContext<'_>,
    cursor: &mut TagCursor<R>,
    group_sequence: Option<&str>,
) -> Result<PeptideNode, DocumentError> {
    let is_molecule = cursor.is_start_element(el::MOLECULE);
    let embedded_ions = ctx.version.may_contain_embedded_ions();

    let lookup_sequence = cursor.attribute(attr::LOOKUP_SEQUENCE).map(str::to_string);
    let standard_type = match cursor.attribute(attr::STANDARD_TYPE) {
        None => None,
        Some(name) => {
            let parsed = StandardType::from_name(name);
            if parsed.is_none() {
                debug!("Ignoring unknown standard type '{name}'");
            }
            parsed
        }
    };
    let explicit_retention_time = cursor
        .nullable_double_attribute(attr::EXPLICIT_RETENTION_TIME)?
        .map(|retention_time| -> Result<_, DocumentError> {
            Ok(ExplicitRetentionTime {
                retention_time,
                window: cursor.nullable_double_attribute(attr::EXPLICIT_RETENTION_TIME_WINDOW)?,
            })
        })
        .transpose()?;

    let mut target = if is_molecule {
        let (molecule, adduct) = MoleculeAttributes::read(cursor)?.into_molecule(
            el::MOLECULE,
            embedded_ions,
            &mut ctx.pool,
        )?;
        if !adduct.is_empty() {
            debug!("Ignoring adduct {adduct} written on a molecule");
        }
        PeptideTarget::Molecule(molecule)
    } else {
        PeptideTarget::Peptide(read_peptide_target(cursor, group_sequence)?)
    };

    let mut node = PeptideNode {
        target: target.clone(),
        explicit_mods: None,
        lookup: None,
        standard_type,
        rank: cursor.nullable_int_attribute(attr::RANK)?,
        explicit_retention_time,
        concentration_multiplier: cursor.nullable_double_attribute(attr::CONCENTRATION_MULTIPLIER)?,
        internal_standard_concentration: cursor
            .nullable_double_attribute(attr::INTERNAL_STANDARD_CONCENTRATION)?,
        normalization_method: cursor.attribute(attr::NORMALIZATION_METHOD).map(str::to_string),
        annotations: Annotations::empty(),
        results: None,
        children: Vec::new(),
        auto_manage_children: cursor.bool_attribute(attr::AUTO_MANAGE_CHILDREN, true)?,
    };

    let mut lookup_mods = None;
    if cursor.is_empty_element() {
        cursor.skip_element()?;
    } else {
        cursor.enter_element()?;
        node.annotations = read_annotations(cursor, &mut ctx.pool)?;
        if !is_molecule {
            let sequence = target.sequence().unwrap_or_default();
            node.explicit_mods = read_explicit_mods(ctx, cursor, sequence)?;
            skip_implicit_mods(cursor)?;
            lookup_mods = read_lookup_mods(ctx, cursor, lookup_sequence.as_deref())?;
        }
        if cursor.is_start_element(el::PEPTIDE_RESULTS) {
            node.results = read_results(ctx, cursor, el::PEPTIDE_RESULT, read_peptide_result)?;
        }

        if cursor.is_start_element(el::PRECURSOR) {
            let mut delta_mass = 0.0;
            if embedded_ions {
                if let PeptideTarget::Molecule(molecule) = &target {
                    let (neutral, shift) =
                        neutralize_embedded_molecule(molecule, first_precursor(cursor)?)?;
                    target = PeptideTarget::Molecule(neutral);
                    delta_mass = shift;
                }
            }
            let scope = PrecursorScope {
                target: &target,
                explicit_mods: node.explicit_mods.as_ref(),
                delta_mass,
            };
            node.children = read_precursor_list(ctx, cursor, &scope)?;
        } else if cursor.is_start_element(el::SELECTED_TRANSITIONS) {
            if cursor.is_empty_element() {
                cursor.skip_element()?;
            } else {
                cursor.enter_element()?;
                let scope = PrecursorScope {
                    target: &target,
                    explicit_mods: node.explicit_mods.as_ref(),
                    delta_mass: 0.0,
                };
                node.children = read_ungrouped_transitions(ctx, cursor, &scope)?;
                cursor.exit_element()?;
            }
        }
        cursor.exit_element()?;
    }

    node.target = target;
    node.lookup = lookup_sequence.map(|sequence| LookupSequence {
        sequence,
        modifications: lookup_mods,
    });
    Ok(node)
}

/// Read the `peptide` and `molecule` elements at the cursor
pub(crate) fn read_peptide_list<R: BufRead>(
    ctx: &mut ParseContext<'_>,
    cursor: &mut TagCursor<R>,
    group_sequence: Option<&str>,
) -> Result<Vec<PeptideNode>, DocumentError> {
    let mut peptides = Vec::new();
    while cursor.is_start_element(el::PEPTIDE) || cursor.is_start_element(el::MOLECULE) {
        peptides.push(read_peptide(ctx, cursor, group_sequence)?);
    }
    Ok(peptides)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::chemistry::{DefaultMassCalculator, Formula, MASS_HYDROGEN};
    use crate::format_version::FormatVersion;
    use crate::model::IonType;
    use crate::reader::ErrorKind;
    use crate::settings::{DocumentSettings, StaticMod};

    fn settings() -> DocumentSettings {
        let mut settings = DocumentSettings::default();
        settings.modifications.static_modifications = vec![Arc::new(StaticMod {
            explicit: true,
            formula: Some(Formula::parse("O").unwrap()),
            ..StaticMod::named("Oxidation (M)")
        })];
        settings
    }

    fn read(
        settings: &DocumentSettings,
        version: FormatVersion,
        group_sequence: Option<&str>,
        xml: &str,
    ) -> Result<PeptideNode, DocumentError> {
        let calculator = DefaultMassCalculator::new();
        let mut ctx = ParseContext::new(settings, version, &calculator);
        let mut cursor = TagCursor::new(xml.as_bytes())?;
        let node = read_peptide(&mut ctx, &mut cursor, group_sequence)?;
        assert!(cursor.is_eof());
        Ok(node)
    }

    #[test]
    fn test_peptide_attributes_and_children() {
        let settings = settings();
        let node = read(
            &settings,
            FormatVersion::CURRENT,
            Some("MKPEPTIDEMR"),
            r#"<peptide sequence="PEPTIDEMR" start="2" end="11" num_missed_cleavages="1"
                    rank="3" standard_type="iRT" explicit_retention_time="12.5"
                    explicit_retention_time_window="2" concentration_multiplier="0.5"
                    normalization_method="global_standards" lookup_sequence="PEPTIDEM[+16]R">
                <annotation name="Reviewed">true</annotation>
                <explicit_modifications>
                    <explicit_static_modifications>
                        <explicit_modification index_aa="7" modification_name="Oxidation (M)"/>
                    </explicit_static_modifications>
                </explicit_modifications>
                <implicit_modifications><implicit_static_modifications/></implicit_modifications>
                <lookup_modifications>
                    <explicit_modifications>
                        <explicit_static_modifications>
                            <explicit_modification index_aa="7" modification_name="Oxidation (M)"/>
                        </explicit_static_modifications>
                    </explicit_modifications>
                </lookup_modifications>
                <precursor charge="2">
                    <transition fragment_type="y" fragment_ordinal="3" product_charge="1"/>
                </precursor>
                <precursor charge="3"/>
            </peptide>"#,
        )
        .unwrap();

        let PeptideTarget::Peptide(peptide) = node.target() else {
            panic!("expected a peptide");
        };
        assert_eq!(peptide.sequence, "PEPTIDEMR");
        assert_eq!(peptide.start, Some(2));
        assert_eq!(peptide.missed_cleavages, 1);
        assert_eq!(node.rank(), Some(3));
        assert_eq!(node.standard_type(), Some(StandardType::Irt));
        assert_eq!(node.explicit_retention_time().unwrap().window, Some(2.0));
        assert_eq!(node.concentration_multiplier(), Some(0.5));
        assert_eq!(node.normalization_method(), Some("global_standards"));
        assert_eq!(node.annotations().get("Reviewed"), Some("true"));
        assert_eq!(node.explicit_mods().unwrap().static_modifications().unwrap().len(), 1);
        let lookup = node.lookup().unwrap();
        assert_eq!(lookup.unmodified_sequence(), "PEPTIDEMR");
        assert!(lookup.modifications.is_some());
        assert_eq!(node.children().len(), 2);
        assert_eq!(node.transition_count(), 1);
        assert!(node.children()[0].precursor_mz() > 500.0);
    }

    #[test]
    fn test_peptide_list_ignores_offsets() {
        let settings = settings();
        let node = read(
            &settings,
            FormatVersion::CURRENT,
            None,
            r#"<peptide sequence="ELVISK" start="4" end="10" decoy="true"/>"#,
        )
        .unwrap();
        let PeptideTarget::Peptide(peptide) = node.target() else {
            panic!("expected a peptide");
        };
        assert_eq!(peptide.start, None);
        assert_eq!(peptide.end, None);
        assert!(peptide.decoy);
        assert!(Annotations::is_shared_empty(node.annotations()));
        assert!(node.auto_manage_children());
    }

    #[test]
    fn test_sequence_from_protein_offsets() {
        let settings = settings();
        let node = read(
            &settings,
            FormatVersion::VERSION_0_1,
            Some("MKELVISKR"),
            r#"<peptide start="2" end="8"/>"#,
        )
        .unwrap();
        assert_eq!(node.target().sequence(), Some("ELVISK"));

        let err = read(&settings, FormatVersion::VERSION_0_1, None, "<peptide/>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidStructure);
    }

    #[test]
    fn test_molecule_skips_modification_sections() {
        let settings = settings();
        let node = read(
            &settings,
            FormatVersion::CURRENT,
            None,
            r#"<molecule ion_formula="C6H12O6" custom_ion_name="glucose">
                <precursor charge="1">
                    <transition fragment_type="precursor"/>
                </precursor>
            </molecule>"#,
        )
        .unwrap();
        let molecule = node.target().molecule().unwrap();
        assert_eq!(molecule.name(), Some("glucose"));
        assert!(node.explicit_mods().is_none());
        let precursor = &node.children()[0];
        assert_eq!(precursor.children()[0].ion_type(), IonType::Precursor);
        assert!((precursor.precursor_mz() - precursor.children()[0].product_mz()).abs() < 1e-6);
    }

    #[test]
    fn test_legacy_protonated_molecule_is_neutralised() {
        let settings = settings();
        // C6H13O6 is glucose + H, written as the molecule before 3.72
        let node = read(
            &settings,
            FormatVersion::VERSION_3_71,
            None,
            r#"<molecule ion_formula="C6H13O6" custom_ion_name="glucose">
                <precursor charge="1" ion_formula="C6H13O6" precursor_mz="181.0707"/>
            </molecule>"#,
        )
        .unwrap();
        let molecule = node.target().molecule().unwrap();
        assert_eq!(molecule.formula(), Some(&Formula::parse("C6H12O6").unwrap()));
    }

    #[test]
    fn test_legacy_mass_h_molecule_keeps_written_mass() {
        let settings = settings();
        let node = read(
            &settings,
            FormatVersion::VERSION_3_6,
            None,
            r#"<molecule massH_monoisotopic="300.5" massH_average="300.7"/>"#,
        )
        .unwrap();
        assert_eq!(node.target().molecule().unwrap().monoisotopic_mass(), 300.5);

        let modern = read(
            &settings,
            FormatVersion::CURRENT,
            None,
            r#"<molecule massH_monoisotopic="300.5" massH_average="300.7"/>"#,
        )
        .unwrap();
        let mass = modern.target().molecule().unwrap().monoisotopic_mass();
        assert!((mass - (300.5 - MASS_HYDROGEN)).abs() < 1e-9);
    }

    #[test]
    fn test_ungrouped_transitions_in_selected_transitions() {
        let settings = settings();
        let node = read(
            &settings,
            FormatVersion::VERSION_0_1,
            None,
            r#"<peptide sequence="PEPTIDER">
                <selected_transitions>
                    <transition fragment_type="Y" fragment_ordinal="3" precursor_charge="2" product_charge="1"/>
                    <transition fragment_type="Y" fragment_ordinal="4" precursor_charge="2" product_charge="1"/>
                </selected_transitions>
            </peptide>"#,
        )
        .unwrap();
        assert_eq!(node.children().len(), 1);
        assert_eq!(node.children()[0].children().len(), 2);

        let empty = read(
            &settings,
            FormatVersion::VERSION_0_1,
            None,
            r#"<peptide sequence="PEPTIDER"><selected_transitions/></peptide>"#,
        )
        .unwrap();
        assert!(empty.children().is_empty());
    }
}
