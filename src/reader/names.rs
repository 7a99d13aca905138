//! Element and attribute names of the document format

/// Element names
pub(crate) mod el {
    pub const ROOT: &str = "srm_settings";
    pub const SELECTED_PROTEINS: &str = "selected_proteins";
    pub const PROTEIN: &str = "protein";
    pub const PEPTIDE_LIST: &str = "peptide_list";
    pub const ALTERNATIVES: &str = "alternatives";
    pub const ALTERNATIVE_PROTEIN: &str = "alternative_protein";
    pub const SEQUENCE: &str = "sequence";
    pub const SELECTED_PEPTIDES: &str = "selected_peptides";
    pub const PEPTIDE: &str = "peptide";
    pub const MOLECULE: &str = "molecule";
    pub const NOTE: &str = "note";
    pub const ANNOTATION: &str = "annotation";

    pub const VARIABLE_MODIFICATIONS: &str = "variable_modifications";
    pub const VARIABLE_MODIFICATION: &str = "variable_modification";
    pub const EXPLICIT_MODIFICATIONS: &str = "explicit_modifications";
    pub const EXPLICIT_STATIC_MODIFICATIONS: &str = "explicit_static_modifications";
    pub const EXPLICIT_HEAVY_MODIFICATIONS: &str = "explicit_heavy_modifications";
    pub const EXPLICIT_MODIFICATION: &str = "explicit_modification";
    pub const IMPLICIT_MODIFICATIONS: &str = "implicit_modifications";
    pub const LOOKUP_MODIFICATIONS: &str = "lookup_modifications";

    pub const PEPTIDE_RESULTS: &str = "peptide_results";
    pub const PEPTIDE_RESULT: &str = "peptide_result";
    pub const PRECURSOR_RESULTS: &str = "precursor_results";
    pub const PRECURSOR_PEAK: &str = "precursor_peak";
    pub const TRANSITION_RESULTS: &str = "transition_results";
    pub const TRANSITION_PEAK: &str = "transition_peak";
    pub const RESULTS_DATA: &str = "results_data";

    pub const PRECURSOR: &str = "precursor";
    pub const SELECTED_TRANSITIONS: &str = "selected_transitions";
    pub const TRANSITION: &str = "transition";
    pub const TRANSITION_DATA: &str = "transition_data";
    pub const LOSSES: &str = "losses";
    pub const NEUTRAL_LOSS: &str = "neutral_loss";
    pub const TRANSITION_LIB_INFO: &str = "transition_lib_info";
    pub const SPECTRUM_INFO_SUFFIX: &str = "_spectrum_info";

    pub const PRECURSOR_MZ: &str = "precursor_mz";
    pub const PRODUCT_MZ: &str = "product_mz";
    pub const COLLISION_ENERGY: &str = "collision_energy";
    pub const DECLUSTERING_POTENTIAL: &str = "declustering_potential";
    pub const START_RT: &str = "start_rt";
    pub const STOP_RT: &str = "stop_rt";
}

/// Attribute names
pub(crate) mod attr {
    use crate::format_version::{FormatVersion, VersionedName};

    pub const FORMAT_VERSION: &str = "format_version";
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const LABEL_PREFIX: &str = "label_";
    pub const PREFERRED_NAME: &str = "preferred_name";
    pub const ACCESSION: &str = "accession";
    pub const GENE: &str = "gene";
    pub const SPECIES: &str = "species";
    pub const WEBSEARCH_STATUS: &str = "websearch_status";
    pub const PEPTIDE_LIST: &str = "peptide_list";
    pub const AUTO_MANAGE_CHILDREN: &str = "auto_manage_children";
    pub const DECOY: &str = "decoy";
    pub const CATEGORY: &str = "category";

    pub const START: &str = "start";
    pub const END: &str = "end";
    pub const SEQUENCE: &str = "sequence";
    pub const LOOKUP_SEQUENCE: &str = "lookup_sequence";
    pub const NUM_MISSED_CLEAVAGES: &str = "num_missed_cleavages";
    pub const RANK: &str = "rank";
    pub const CONCENTRATION_MULTIPLIER: &str = "concentration_multiplier";
    pub const INTERNAL_STANDARD_CONCENTRATION: &str = "internal_standard_concentration";
    pub const NORMALIZATION_METHOD: &str = "normalization_method";
    pub const STANDARD_TYPE: &str = "standard_type";
    pub const EXPLICIT_RETENTION_TIME: &str = "explicit_retention_time";
    pub const EXPLICIT_RETENTION_TIME_WINDOW: &str = "explicit_retention_time_window";

    pub const ION_FORMULA: &str = "ion_formula";
    pub const FORMULA: &str = "formula";
    pub const NEUTRAL_FORMULA: &str = "neutral_formula";
    pub const MASS_MONOISOTOPIC: &str = "mass_monoisotopic";
    pub const MASS_AVERAGE: &str = "mass_average";
    pub const MASSH_MONOISOTOPIC: &str = "massH_monoisotopic";
    pub const MASSH_AVERAGE: &str = "massH_average";
    pub const NEUTRAL_MASS_MONOISOTOPIC: &str = "neutral_mass_monoisotopic";
    pub const NEUTRAL_MASS_AVERAGE: &str = "neutral_mass_average";
    pub const CUSTOM_ION_NAME: &str = "custom_ion_name";

    pub const INDEX_AA: &str = "index_aa";
    pub const MODIFICATION_NAME: &str = "modification_name";
    pub const ISOTOPE_LABEL: &str = "isotope_label";
    pub const LOSS_INDEX: &str = "loss_index";

    pub const CHARGE: &str = "charge";
    pub const PRECURSOR_MZ: &str = "precursor_mz";
    pub const DECOY_MASS_SHIFT: &str = "decoy_mass_shift";
    pub const EXPLICIT_COLLISION_ENERGY: &str = "explicit_collision_energy";
    pub const EXPLICIT_DRIFT_TIME_MSEC: &str = "explicit_drift_time_msec";
    pub const EXPLICIT_DRIFT_TIME_HIGH_ENERGY_OFFSET_MSEC: &str =
        "explicit_drift_time_high_energy_offset_msec";
    pub const EXPLICIT_CCS_SQA: &str = "explicit_ccs_sqa";
    pub const EXPLICIT_COMPENSATION_VOLTAGE: &str = "explicit_compensation_voltage";
    pub const EXPLICIT_DECLUSTERING_POTENTIAL: &str = "explicit_declustering_potential";
    pub const S_LENS: VersionedName = VersionedName {
        since: FormatVersion::VERSION_3_52,
        current: "explicit_s_lens",
        before: "s_lens",
    };
    pub const CONE_VOLTAGE: VersionedName = VersionedName {
        since: FormatVersion::VERSION_3_52,
        current: "explicit_cone_voltage",
        before: "cone_voltage",
    };
    pub const LIBRARY_NAME: &str = "library_name";

    pub const FRAGMENT_TYPE: &str = "fragment_type";
    pub const FRAGMENT_ORDINAL: &str = "fragment_ordinal";
    pub const MASS_INDEX: &str = "mass_index";
    pub const PRECURSOR_CHARGE: &str = "precursor_charge";
    pub const PRODUCT_CHARGE: &str = "product_charge";
    pub const QUANTITATIVE: &str = "quantitative";
    pub const MEASURED_ION_NAME: &str = "measured_ion_name";
    pub const INTENSITY: &str = "intensity";

    pub const REPLICATE: &str = "replicate";
    pub const FILE: &str = "file";
    pub const STEP: &str = "step";
    pub const PEAK_COUNT_RATIO: &str = "peak_count_ratio";
    pub const RETENTION_TIME: &str = "retention_time";
    pub const EXCLUDE_FROM_CALIBRATION: &str = "exclude_from_calibration";
    pub const START_TIME: &str = "start_time";
    pub const END_TIME: &str = "end_time";
    pub const CCS: &str = "ccs";
    pub const DRIFT_TIME_MS1: &str = "drift_time_ms1";
    pub const DRIFT_TIME_FRAGMENT: &str = "drift_time_fragment";
    pub const DRIFT_TIME_WINDOW: &str = "drift_time_window";
    pub const DRIFT_TIME: &str = "drift_time";
    pub const FWHM: &str = "fwhm";
    pub const FWHM_DEGENERATE: &str = "fwhm_degenerate";
    pub const AREA: &str = "area";
    pub const BACKGROUND: &str = "background";
    pub const HEIGHT: &str = "height";
    pub const MASS_ERROR_PPM: &str = "mass_error_ppm";
    pub const TRUNCATED: &str = "truncated";
    pub const IDENTIFIED: &str = "identified";
    pub const LIBRARY_DOTP: &str = "library_dotp";
    pub const ISOTOPE_DOTP: &str = "isotope_dotp";
    pub const QVALUE: &str = "qvalue";
    pub const ZSCORE: &str = "zscore";
    pub const RANK_BY_LEVEL: &str = "rank_by_level";
    pub const POINTS_ACROSS: &str = "points_across";
    pub const USER_SET: &str = "user_set";
}

/// Annotation names folded into numeric fields of precursor rows
pub(crate) mod score {
    pub const QVALUE: &str = "QValue";
    pub const ZSCORE: &str = "Score";
}
