use super::*;
use crate::chemistry::Formula;
use crate::model::{PeptideGroup, PeptideTarget};
use proptest::prelude::*;

const SETTINGS: &str = r#"<settings_summary name="Default">
    <measured_results>
        <replicate name="R1">
            <sample_file id="f1" file_path="a.raw"/>
        </replicate>
        <replicate name="R2">
            <sample_file id="f2" file_path="b.raw"/>
        </replicate>
    </measured_results>
</settings_summary>"#;

fn document(version: Option<&str>, body: &str) -> String {
    let version = version
        .map(|v| format!(r#" format_version="{v}""#))
        .unwrap_or_default();
    format!("<srm_settings{version}>{SETTINGS}{body}</srm_settings>")
}

#[test]
fn test_missing_version_is_earliest() -> Result<(), DocumentError> {
    let xml = document(
        None,
        r#"<peptide_list label_name="peptides1">
            <peptide sequence="PEPTIDER">
                <selected_transitions>
                    <transition fragment_type="y" fragment_ordinal="4" precursor_charge="2"/>
                </selected_transitions>
            </peptide>
        </peptide_list>"#,
    );
    let document = DocumentReader::new().read_str(&xml)?;
    assert_eq!(document.format_version(), FormatVersion::EARLIEST);
    assert_eq!(document.counts().transitions, 1);
    Ok(())
}

#[test]
fn test_version_too_new_builds_nothing() {
    let xml = document(Some("99.0"), r#"<protein name="P1"><sequence>PEPTIDER</sequence></protein>"#);
    let err = DocumentReader::new().read_str(&xml).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VersionTooNew);
}

#[test]
fn test_adjacent_duplicate_precursor_peaks_collapse() -> Result<(), DocumentError> {
    let peak = r#"<precursor_peak replicate="R1" file="f1" step="0" peak_count_ratio="1"
        retention_time="12.5" area="1000" height="50"/>"#;
    let xml = document(
        Some("4.12"),
        &format!(
            r#"<peptide_list label_name="list">
                <peptide sequence="PEPTIDER">
                    <precursor charge="2">
                        <precursor_results>{peak}{peak}</precursor_results>
                    </precursor>
                </peptide>
            </peptide_list>"#
        ),
    );
    let document = DocumentReader::new().read_str(&xml)?;
    let precursor = document.precursors().next().unwrap();
    let results = precursor.results().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results.get(0).unwrap().len(), 1);
    assert!(results.get(1).is_none());
    Ok(())
}

#[test]
fn test_duplicate_rows_with_nan_collapse() -> Result<(), DocumentError> {
    let peak = r#"<transition_peak replicate="R1" file="f1" retention_time="NaN" start_time="1"
        end_time="2" area="10" background="0" height="5" fwhm="NaN" mass_error_ppm="NaN"/>"#;
    let xml = document(
        Some("4.12"),
        &format!(
            r#"<peptide_list label_name="list">
                <peptide sequence="PEPTIDER">
                    <precursor charge="2">
                        <transition fragment_type="y" fragment_ordinal="3" product_charge="1">
                            <transition_results>{peak}{peak}</transition_results>
                        </transition>
                    </precursor>
                </peptide>
            </peptide_list>"#
        ),
    );
    let document = DocumentReader::new().read_str(&xml)?;
    let transition = document.transitions().next().unwrap();
    assert_eq!(transition.results().unwrap().get(0).unwrap().len(), 1);
    Ok(())
}

#[test]
fn test_transition_data_payload() -> Result<(), DocumentError> {
    use super::bulk::encode::{self, Transition, TransitionData, TransitionResults};

    let transition = |ordinal, peaks| Transition {
        fragment_type: encode::IonType::Y as i32,
        fragment_ordinal: ordinal,
        charge: 1,
        results: Some(TransitionResults { peaks }),
        ..Transition::default()
    };
    let payload = encode::zlib(&TransitionData {
        transitions: vec![
            transition(3, vec![encode::peak(1, 0, 40.0)]),
            transition(4, Vec::new()),
        ],
    });
    let xml = document(
        Some("4.12"),
        &format!(
            r#"<peptide_list label_name="list">
                <peptide sequence="PEPTIDER">
                    <precursor charge="2">
                        <transition_data>{payload}</transition_data>
                    </precursor>
                </peptide>
            </peptide_list>"#
        ),
    );
    let document = DocumentReader::new().read_str(&xml)?;
    assert_eq!(document.counts().transitions, 2);
    let mut transitions = document.transitions();
    let results = transitions.next().unwrap().results().unwrap();
    assert!(results.get(0).is_none());
    let row = &results.get(1).unwrap()[0];
    assert_eq!(row.file_id.as_str(), "f2");
    assert_eq!(row.area, 40.0);
    assert!(transitions.next().unwrap().results().is_none());
    Ok(())
}

#[test]
fn test_results_data_with_unknown_replicate_position() {
    use super::bulk::encode::{self, TransitionResults};

    let payload = encode::raw(&TransitionResults {
        peaks: vec![encode::peak(5, 0, 1.0)],
    });
    let xml = document(
        Some("4.12"),
        &format!(
            r#"<peptide_list label_name="list">
                <peptide sequence="PEPTIDER">
                    <precursor charge="2">
                        <transition fragment_type="y" fragment_ordinal="3" product_charge="1">
                            <results_data>{payload}</results_data>
                        </transition>
                    </precursor>
                </peptide>
            </peptide_list>"#
        ),
    );
    let err = DocumentReader::new().read_str(&xml).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingReplicateReference);
}

#[test]
fn test_truncated_payload_aborts_load() {
    let xml = document(
        Some("4.12"),
        r#"<peptide_list label_name="list">
            <peptide sequence="PEPTIDER">
                <precursor charge="2">
                    <transition_data>Cv////8PAQI=</transition_data>
                </precursor>
            </peptide>
        </peptide_list>"#,
    );
    let err = DocumentReader::new().read_str(&xml).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BulkPayload);
}

#[test]
fn test_annotation_without_name_aborts() {
    let xml = document(
        Some("4.12"),
        r#"<protein name="P1">
            <annotation>value</annotation>
            <sequence>PEPTIDER</sequence>
        </protein>"#,
    );
    let err = DocumentReader::new().read_str(&xml).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedAnnotation);
}

#[test]
fn test_legacy_protonated_molecule_formula() -> Result<(), DocumentError> {
    let xml = document(
        Some("3.6"),
        r#"<peptide_list label_name="molecules">
            <molecule ion_formula="C6H13O6" custom_ion_name="glucose">
                <precursor charge="1" ion_formula="C6H13O6" precursor_mz="181.0707"/>
            </molecule>
        </peptide_list>"#,
    );
    let document = DocumentReader::new().read_str(&xml)?;
    let peptide = document.peptides().next().unwrap();
    let molecule = peptide.target().molecule().unwrap();
    assert_eq!(molecule.formula(), Some(&Formula::parse("C6H12O6")?));
    Ok(())
}

#[test]
fn test_molecules_with_silicon_and_boron() -> Result<(), DocumentError> {
    let xml = document(
        Some("4.12"),
        r#"<peptide_list label_name="derivatives">
            <molecule neutral_formula="C9H14OSi" custom_ion_name="TMS phenol">
                <precursor charge="1" ion_formula="C9H14OSi[M+H]"/>
            </molecule>
            <molecule neutral_formula="C6H7BO2" custom_ion_name="phenylboronic acid">
                <precursor charge="-1" ion_formula="C6H7BO2[M-H]"/>
            </molecule>
        </peptide_list>"#,
    );
    let document = DocumentReader::new().read_str(&xml)?;
    let mut peptides = document.peptides();
    let tms = peptides.next().unwrap().target().molecule().unwrap();
    assert_eq!(tms.formula(), Some(&Formula::parse("C9H14OSi")?));
    assert!((tms.monoisotopic_mass() - 166.0814).abs() < 1e-3);
    let boronic = peptides.next().unwrap().target().molecule().unwrap();
    assert_eq!(boronic.formula().unwrap().count("B"), 1);
    assert_eq!(document.counts().precursors, 2);
    Ok(())
}

#[test]
fn test_auto_manage_defaults_to_true() -> Result<(), DocumentError> {
    let xml = document(
        Some("4.12"),
        r#"<peptide_list label_name="list">
            <peptide sequence="PEPTIDER" auto_manage_children="false">
                <precursor charge="2"/>
            </peptide>
        </peptide_list>"#,
    );
    let document = DocumentReader::new().read_str(&xml)?;
    assert!(!document.peptides().next().unwrap().auto_manage_children());
    assert!(document.precursors().next().unwrap().auto_manage_children());
    Ok(())
}

#[test]
fn test_unknown_replicate_aborts_load() {
    let xml = document(
        Some("4.12"),
        r#"<peptide_list label_name="list">
            <peptide sequence="PEPTIDER">
                <peptide_results>
                    <peptide_result replicate="R9" peak_count_ratio="1"/>
                </peptide_results>
            </peptide>
        </peptide_list>"#,
    );
    let err = DocumentReader::new().read_str(&xml).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingReplicateReference);
}

#[test]
fn test_results_without_registry() {
    let xml = r#"<srm_settings format_version="4.12">
        <peptide_list label_name="list">
            <peptide sequence="PEPTIDER">
                <peptide_results><peptide_result replicate="R1"/></peptide_results>
            </peptide>
        </peptide_list>
    </srm_settings>"#;
    let err = DocumentReader::new().read_str(xml).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingMeasuredResultsContext);
}

#[test]
fn test_padding_protein_is_peptide_list() -> Result<(), DocumentError> {
    let xml = document(
        Some("1.2"),
        r#"<protein name="peptides1">
            <sequence>XXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX</sequence>
            <peptide sequence="ELVISK"/>
        </protein>"#,
    );
    let document = DocumentReader::new().read_str(&xml)?;
    let group = &document.children()[0];
    assert!(matches!(group.group(), PeptideGroup::PeptideList { .. }));
    assert_eq!(group.metadata().name.as_deref(), Some("peptides1"));
    Ok(())
}

#[test]
fn test_summary_counts() -> Result<(), DocumentError> {
    let xml = document(
        Some("4.12"),
        r#"<protein name="P1">
            <sequence>MKPEPTIDERELVISK</sequence>
            <peptide sequence="PEPTIDER" start="2" end="10">
                <precursor charge="2">
                    <transition fragment_type="y" fragment_ordinal="3" product_charge="1">
                        <transition_results>
                            <transition_peak replicate="R1" file="f1" retention_time="10"
                                start_time="9" end_time="11" area="100" background="1"
                                height="10" fwhm="0.2"/>
                        </transition_results>
                    </transition>
                    <transition fragment_type="b" fragment_ordinal="2" product_charge="1"/>
                </precursor>
            </peptide>
        </protein>
        <peptide_list label_name="molecules">
            <molecule neutral_formula="C6H12O6" custom_ion_name="glucose">
                <precursor charge="1" ion_formula="C6H12O6[M+H]"/>
            </molecule>
        </peptide_list>"#,
    );
    let document = DocumentReader::new().read_str(&xml)?;
    let summary = DocumentSummary::from_document(&document);
    assert_eq!(summary.groups, 2);
    assert_eq!(summary.peptides, 1);
    assert_eq!(summary.molecules, 1);
    assert_eq!(summary.precursors, 2);
    assert_eq!(summary.transitions, 2);
    assert_eq!(summary.replicates, 2);
    assert_eq!(summary.transition_results, 1);
    assert!(summary.to_string().contains("Molecules: 1"));
    assert!(matches!(
        document.peptides().next().unwrap().target(),
        PeptideTarget::Peptide(_)
    ));
    Ok(())
}

#[test]
fn test_open_reads_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("small.sky");
    std::fs::write(
        &path,
        document(Some("4.12"), r#"<protein name="P1"><sequence>PEPTIDER</sequence></protein>"#),
    )?;
    let reader = DocumentReader::new().with_config(ReaderConfig { buffer_size: 64 });
    let document = reader.open(&path)?;
    assert_eq!(document.counts().groups, 1);
    Ok(())
}

#[test]
fn test_open_missing_file() {
    let err = DocumentReader::new().open("/nonexistent/document.sky").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

fn peptide_list_xml(shape: &[Vec<usize>]) -> String {
    let mut body = String::from(r#"<peptide_list label_name="generated">"#);
    for precursors in shape {
        body.push_str(r#"<peptide sequence="PEPTIDEKR">"#);
        for (i, transitions) in precursors.iter().enumerate() {
            body.push_str(&format!(r#"<precursor charge="{}">"#, i + 1));
            for ordinal in 0..*transitions {
                body.push_str(&format!(
                    r#"<transition fragment_type="y" fragment_ordinal="{}" product_charge="1"/>"#,
                    ordinal + 1
                ));
            }
            body.push_str("</precursor>");
        }
        body.push_str("</peptide>");
    }
    body.push_str("</peptide_list>");
    document(Some("4.12"), &body)
}

proptest! {
    #[test]
    fn prop_node_counts_match_elements(
        shape in prop::collection::vec(prop::collection::vec(0usize..6, 0..4), 0..6)
    ) {
        let document = DocumentReader::new().read_str(&peptide_list_xml(&shape)).unwrap();
        let counts = document.counts();
        prop_assert_eq!(counts.peptides, shape.len());
        prop_assert_eq!(counts.precursors, shape.iter().map(Vec::len).sum::<usize>());
        prop_assert_eq!(
            counts.transitions,
            shape.iter().flatten().sum::<usize>()
        );
    }

    #[test]
    fn prop_newer_versions_rejected(excess in 0.01f64..100.0) {
        let version = FormatVersion::CURRENT.as_f64() + excess;
        let version = version.to_string();
        let xml = document(Some(version.as_str()), r#"<protein name="P"/>"#);
        let err = DocumentReader::new().read_str(&xml).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::VersionTooNew);
    }
}
