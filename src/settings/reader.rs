use std::io::BufRead;
use std::sync::Arc;

use log::debug;

use super::{
    ChromFileId, ChromFileInfo, ChromatogramSet, DocumentSettings, FragmentLoss,
    IsotopeLabelType, LabelAtoms, MeasuredIon, MeasuredResults, PeptideModifications, StaticMod,
    Terminus, TypedModifications,
};
use crate::chemistry::{CustomMolecule, Formula, MassType};
use crate::reader::{DocumentError, TagCursor};

/// Reads the settings element at the cursor.
///
/// Implementations must leave the cursor on the tag following the settings
/// element, and return defaults when the cursor is not on one.
pub trait SettingsReader {
    /// Read settings from the cursor
    fn read_settings<R: BufRead>(
        &self,
        cursor: &mut TagCursor<R>,
    ) -> Result<DocumentSettings, DocumentError>;
}

/// Reader for the `settings_summary` element
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicSettingsReader;

const SETTINGS_SUMMARY: &str = "settings_summary";

impl SettingsReader for BasicSettingsReader {
    fn read_settings<R: BufRead>(
        &self,
        cursor: &mut TagCursor<R>,
    ) -> Result<DocumentSettings, DocumentError> {
        if !cursor.is_start_element(SETTINGS_SUMMARY) {
            debug!("No settings element, using defaults");
            return Ok(DocumentSettings::default());
        }
        let mut settings = DocumentSettings {
            name: cursor.attribute("name").map(str::to_string),
            ..DocumentSettings::default()
        };
        cursor.enter_element()?;
        while cursor.is_start() {
            if cursor.is_start_element("peptide_settings") {
                cursor.enter_element()?;
                while cursor.is_start() {
                    if cursor.is_start_element("peptide_modifications") {
                        settings.modifications = read_peptide_modifications(cursor)?;
                    } else {
                        cursor.skip_element()?;
                    }
                }
                cursor.exit_element()?;
            } else if cursor.is_start_element("transition_settings") {
                read_transition_settings(cursor, &mut settings)?;
            } else if cursor.is_start_element("measured_results") {
                settings.measured_results = Some(read_measured_results(cursor)?);
            } else {
                cursor.skip_element()?;
            }
        }
        cursor.exit_element()?;
        Ok(settings)
    }
}

fn read_peptide_modifications<R: BufRead>(
    cursor: &mut TagCursor<R>,
) -> Result<PeptideModifications, DocumentError> {
    let mut modifications = PeptideModifications::default();
    let mut heavy = Vec::new();
    let mut internal_standards = Vec::new();
    cursor.enter_element()?;
    while cursor.is_start() {
        if cursor.is_start_element("internal_standard") {
            internal_standards.push(cursor.required_attribute("name")?.to_string());
            cursor.skip_element()?;
        } else if cursor.is_start_element("static_modifications") {
            modifications.static_modifications = read_static_mods(cursor)?;
        } else if cursor.is_start_element("heavy_modifications") {
            let name = cursor
                .attribute("isotope_label")
                .unwrap_or(IsotopeLabelType::HEAVY_NAME)
                .to_string();
            let label_type = IsotopeLabelType::new(name, heavy.len() as i32 + 1);
            heavy.push(TypedModifications::new(label_type, read_static_mods(cursor)?));
        } else {
            cursor.skip_element()?;
        }
    }
    cursor.exit_element()?;

    if !heavy.is_empty() {
        modifications.heavy_modifications = heavy;
    }
    let label_types = modifications.label_types();
    modifications.internal_standard_types = if internal_standards.is_empty() {
        label_types.into_iter().filter(|t| !t.is_light()).take(1).collect()
    } else {
        internal_standards
            .iter()
            .map(|name| {
                label_types
                    .iter()
                    .find(|t| t.name() == name)
                    .cloned()
                    .ok_or_else(|| {
                        DocumentError::MissingModificationReference(
                            crate::reader::ModificationReference::IsotopeLabelType(name.clone()),
                        )
                    })
            })
            .collect::<Result<_, _>>()?
    };
    Ok(modifications)
}

/// Children of a `static_modifications` / `heavy_modifications` element
fn read_static_mods<R: BufRead>(
    cursor: &mut TagCursor<R>,
) -> Result<Vec<Arc<StaticMod>>, DocumentError> {
    let mut mods = Vec::new();
    cursor.enter_element()?;
    while cursor.is_start() {
        if cursor.is_start_element("static_modification") {
            mods.push(Arc::new(read_static_mod(cursor)?));
        } else {
            cursor.skip_element()?;
        }
    }
    cursor.exit_element()?;
    Ok(mods)
}

fn read_static_mod<R: BufRead>(cursor: &mut TagCursor<R>) -> Result<StaticMod, DocumentError> {
    let terminus = match cursor.attribute("terminus") {
        None => None,
        Some(value) => Some(Terminus::from_name(value).ok_or_else(|| {
            DocumentError::InvalidAttributeValue {
                attribute: "terminus".to_string(),
                value: value.to_string(),
            }
        })?),
    };
    let formula = match cursor.attribute("formula") {
        Some(text) if !text.trim().is_empty() => Some(Formula::parse(text)?),
        _ => None,
    };
    let mut modification = StaticMod {
        amino_acids: cursor.attribute("aminoacid").map(str::to_string),
        terminus,
        formula,
        monoisotopic_mass: cursor.nullable_double_attribute("massdiff_monoisotopic")?,
        average_mass: cursor.nullable_double_attribute("massdiff_average")?,
        label_atoms: LabelAtoms {
            c13: cursor.bool_attribute("label_13C", false)?,
            n15: cursor.bool_attribute("label_15N", false)?,
            o18: cursor.bool_attribute("label_18O", false)?,
            h2: cursor.bool_attribute("label_2H", false)?,
            cl37: cursor.bool_attribute("label_37Cl", false)?,
            br81: cursor.bool_attribute("label_81Br", false)?,
        },
        explicit: cursor.bool_attribute("explicit_decl", false)?,
        variable: cursor.bool_attribute("variable", false)?,
        ..StaticMod::named(cursor.required_attribute("name")?)
    };
    cursor.enter_element()?;
    while cursor.is_start() {
        if cursor.is_start_element("potential_loss") {
            modification.losses.push(read_fragment_loss(cursor)?);
        }
        cursor.skip_element()?;
    }
    cursor.exit_element()?;
    Ok(modification)
}

/// Loss defined by a `formula` or by `massdiff_*` attributes
pub(crate) fn read_fragment_loss<R: BufRead>(
    cursor: &TagCursor<R>,
) -> Result<FragmentLoss, DocumentError> {
    match cursor.attribute("formula") {
        Some(text) if !text.trim().is_empty() => {
            Ok(FragmentLoss::from_formula(Formula::parse(text)?)?)
        }
        _ => {
            let mono = cursor.double_attribute("massdiff_monoisotopic")?;
            let avg = cursor
                .nullable_double_attribute("massdiff_average")?
                .unwrap_or(mono);
            Ok(FragmentLoss::from_masses(mono, avg))
        }
    }
}

fn read_mass_type<R: BufRead>(
    cursor: &TagCursor<R>,
    attribute: &str,
) -> Result<MassType, DocumentError> {
    match cursor.attribute(attribute) {
        None => Ok(MassType::default()),
        Some(value) => {
            MassType::from_name(value).ok_or_else(|| DocumentError::InvalidAttributeValue {
                attribute: attribute.to_string(),
                value: value.to_string(),
            })
        }
    }
}

fn read_transition_settings<R: BufRead>(
    cursor: &mut TagCursor<R>,
    settings: &mut DocumentSettings,
) -> Result<(), DocumentError> {
    cursor.enter_element()?;
    while cursor.is_start() {
        if cursor.is_start_element("transition_prediction") {
            settings.precursor_mass_type = read_mass_type(cursor, "precursor_mass_type")?;
            settings.fragment_mass_type = read_mass_type(cursor, "fragment_mass_type")?;
            cursor.skip_element()?;
        } else if cursor.is_start_element("transition_filter") {
            cursor.enter_element()?;
            while cursor.is_start() {
                if cursor.is_start_element("measured_ions") {
                    cursor.enter_element()?;
                    while cursor.is_start() {
                        if cursor.is_start_element("measured_ion") {
                            settings.measured_ions.push(read_measured_ion(cursor)?);
                        }
                        cursor.skip_element()?;
                    }
                    cursor.exit_element()?;
                } else {
                    cursor.skip_element()?;
                }
            }
            cursor.exit_element()?;
        } else {
            cursor.skip_element()?;
        }
    }
    cursor.exit_element()
}

/// Attributes of a `measured_ion`; the caller skips the element
fn read_measured_ion<R: BufRead>(cursor: &TagCursor<R>) -> Result<MeasuredIon, DocumentError> {
    let name = cursor.required_attribute("name")?.to_string();
    let label: Arc<str> = Arc::from(name.as_str());
    let custom_ion = match cursor.attribute("formula") {
        Some(text) if !text.trim().is_empty() => Some(CustomMolecule::from_formula(
            Formula::parse(text)?,
            Some(label),
        )?),
        _ => match cursor.nullable_double_attribute("mass_monoisotopic")? {
            Some(mono) => {
                let avg = cursor
                    .nullable_double_attribute("mass_average")?
                    .unwrap_or(mono);
                Some(CustomMolecule::from_masses(mono, avg, Some(label)))
            }
            None => None,
        },
    };
    let charge = cursor
        .attribute("charges")
        .and_then(|charges| charges.split(',').next())
        .map(|first| {
            first
                .trim()
                .parse::<i32>()
                .map_err(|_| DocumentError::InvalidAttributeValue {
                    attribute: "charges".to_string(),
                    value: first.to_string(),
                })
        })
        .transpose()?
        .unwrap_or(1);
    Ok(MeasuredIon {
        name,
        custom_ion,
        charge,
    })
}

fn read_measured_results<R: BufRead>(
    cursor: &mut TagCursor<R>,
) -> Result<MeasuredResults, DocumentError> {
    let mut chromatograms = Vec::new();
    cursor.enter_element()?;
    while cursor.is_start() {
        if !cursor.is_start_element("replicate") {
            cursor.skip_element()?;
            continue;
        }
        let name = cursor.required_attribute("name")?.to_string();
        let mut files = Vec::new();
        cursor.enter_element()?;
        while cursor.is_start() {
            if cursor.is_start_element("sample_file") {
                let path = cursor.attribute("file_path").unwrap_or_default().to_string();
                let id = cursor.attribute("id").unwrap_or(&path).to_string();
                files.push(ChromFileInfo {
                    id: ChromFileId::new(id),
                    path,
                });
            }
            cursor.skip_element()?;
        }
        cursor.exit_element()?;
        chromatograms.push(ChromatogramSet::new(name, files));
    }
    cursor.exit_element()?;
    debug!("Read {} replicates from settings", chromatograms.len());
    Ok(MeasuredResults::new(chromatograms))
}
