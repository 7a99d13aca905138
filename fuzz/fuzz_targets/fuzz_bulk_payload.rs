#![no_main]

use base64::prelude::*;
use libfuzzer_sys::fuzz_target;
use srmdoc::reader::DocumentReader;

const PREFIX: &str = r#"<srm_settings format_version="4.12"><settings_summary name="Default">
<measured_results><replicate name="R1"><sample_file id="f1" file_path="a.raw"/></replicate>
</measured_results></settings_summary><peptide_list label_name="list">
<peptide sequence="PEPTIDER"><precursor charge="2">"#;
const SUFFIX: &str = "</precursor></peptide></peptide_list></srm_settings>";

fuzz_target!(|data: &[u8]| {
    // Arbitrary payload bytes as transition_data, then as results_data
    let payload = BASE64_STANDARD.encode(data);
    let as_transitions = format!("{PREFIX}<transition_data>{payload}</transition_data>{SUFFIX}");
    let _ = DocumentReader::new().read_str(&as_transitions);
    let as_results = format!(
        r#"{PREFIX}<transition fragment_type="y" fragment_ordinal="3" product_charge="1"><results_data>{payload}</results_data></transition>{SUFFIX}"#
    );
    let _ = DocumentReader::new().read_str(&as_results);
});
