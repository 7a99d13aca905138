//! Binary payloads of `results_data` and `transition_data` elements
//!
//! Bulk payloads decode to the same records the verbose elements produce,
//! so both paths share all validation and correlation downstream.
//!
//! Decoding pipeline:
//!
//! 1. Base64 decode the element text, ignoring whitespace
//! 2. Inflate the bytes when they start with a zlib header
//! 3. Decode the protobuf message ([`proto::TransitionResults`] or
//!    [`proto::TransitionData`])
//!
//! Result rows in a payload name their replicate and file by position in
//! the replicate registry rather than by name.

mod proto;

use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Arc;

use base64::prelude::*;
use flate2::read::ZlibDecoder;
use log::debug;
use prost::Message;

use super::error::DocumentError;
use super::molecule::MoleculeAttributes;
use super::transition::{LossRecord, TransitionRecord};
use crate::chemistry::Formula;
use crate::model::{Annotations, IonType, PeakIdentification, TransitionLibInfo, UserSet};
use crate::settings::FragmentLoss;
use crate::string_pool::StringPool;

/// Largest inflated payload accepted
const MAX_INFLATED_SIZE: u64 = 256 * 1024 * 1024;

/// Errors that can occur while decoding a bulk payload
#[derive(Debug, thiserror::Error)]
pub enum BulkDecodeError {
    /// Element text is not base64
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Compressed payload failed to inflate
    #[error("Payload inflate error: {0}")]
    Io(#[from] std::io::Error),

    /// Inflated payload exceeds the size limit
    #[error("Inflated payload is larger than {limit} bytes")]
    TooLarge {
        /// Size limit in bytes
        limit: u64,
    },

    /// Payload is not a valid protobuf message
    #[error("Protobuf decode error: {0}")]
    Protobuf(#[from] prost::DecodeError),

    /// Enumerated field holds an unknown code
    #[error("Invalid {field} code {value}")]
    InvalidCode {
        /// Field being decoded
        field: &'static str,
        /// Code found
        value: i32,
    },
}

fn is_zlib_header(bytes: &[u8]) -> bool {
    match bytes {
        [cmf, flg, ..] => cmf & 0x0f == 8 && (u16::from(*cmf) << 8 | u16::from(*flg)) % 31 == 0,
        _ => false,
    }
}

/// Decode the element text to protobuf bytes
fn decode_payload(text: &str) -> Result<Vec<u8>, BulkDecodeError> {
    let compact: String = text.split_whitespace().collect();
    let bytes = BASE64_STANDARD.decode(compact)?;
    if !is_zlib_header(&bytes) {
        return Ok(bytes);
    }
    let mut inflated = Vec::new();
    ZlibDecoder::new(bytes.as_slice())
        .take(MAX_INFLATED_SIZE + 1)
        .read_to_end(&mut inflated)?;
    if inflated.len() as u64 > MAX_INFLATED_SIZE {
        return Err(BulkDecodeError::TooLarge {
            limit: MAX_INFLATED_SIZE,
        });
    }
    debug!("Inflated bulk payload {} -> {} bytes", bytes.len(), inflated.len());
    Ok(inflated)
}

/// A transition result row before it is bound to the replicate registry
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TransitionPeakRecord {
    pub(crate) optimization_step: i32,
    pub(crate) mass_error: Option<f32>,
    pub(crate) retention_time: f32,
    pub(crate) start_retention_time: f32,
    pub(crate) end_retention_time: f32,
    pub(crate) drift_time: Option<f64>,
    pub(crate) drift_time_window: Option<f64>,
    pub(crate) area: f32,
    pub(crate) background_area: f32,
    pub(crate) height: f32,
    pub(crate) fwhm: f32,
    pub(crate) fwhm_degenerate: bool,
    pub(crate) truncated: Option<bool>,
    pub(crate) points_across: Option<i32>,
    pub(crate) identified: PeakIdentification,
    pub(crate) rank: i32,
    pub(crate) rank_by_level: Option<i32>,
    pub(crate) user_set: UserSet,
    pub(crate) annotations: Arc<Annotations>,
}

/// A payload row with its registry position
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IndexedPeak {
    pub(crate) replicate_index: i32,
    pub(crate) file_index: i32,
    pub(crate) peak: TransitionPeakRecord,
}

fn identification(code: i32) -> Result<PeakIdentification, BulkDecodeError> {
    match proto::PeakIdentified::try_from(code) {
        Ok(proto::PeakIdentified::False) => Ok(PeakIdentification::False),
        Ok(proto::PeakIdentified::True) => Ok(PeakIdentification::True),
        Ok(proto::PeakIdentified::Aligned) => Ok(PeakIdentification::Aligned),
        Err(_) => Err(BulkDecodeError::InvalidCode {
            field: "identified",
            value: code,
        }),
    }
}

fn user_set(code: i32) -> Result<UserSet, BulkDecodeError> {
    match proto::UserSet::try_from(code) {
        Ok(proto::UserSet::False) => Ok(UserSet::False),
        Ok(proto::UserSet::True) => Ok(UserSet::True),
        Ok(proto::UserSet::Imported) => Ok(UserSet::Imported),
        Ok(proto::UserSet::Reintegrated) => Ok(UserSet::Reintegrated),
        Ok(proto::UserSet::Matched) => Ok(UserSet::Matched),
        Err(_) => Err(BulkDecodeError::InvalidCode {
            field: "user_set",
            value: code,
        }),
    }
}

fn ion_type(code: i32) -> Result<IonType, BulkDecodeError> {
    let ion_type = match proto::IonType::try_from(code) {
        Ok(proto::IonType::A) => IonType::A,
        Ok(proto::IonType::B) => IonType::B,
        Ok(proto::IonType::C) => IonType::C,
        Ok(proto::IonType::X) => IonType::X,
        Ok(proto::IonType::Y) => IonType::Y,
        Ok(proto::IonType::Z) => IonType::Z,
        Ok(proto::IonType::Precursor) => IonType::Precursor,
        Ok(proto::IonType::Custom) => IonType::Custom,
        Err(_) => {
            return Err(BulkDecodeError::InvalidCode {
                field: "ion type",
                value: code,
            })
        }
    };
    Ok(ion_type)
}

fn non_empty(text: String) -> Option<String> {
    Some(text).filter(|text| !text.trim().is_empty())
}

fn annotations(message: Option<proto::Annotations>, pool: &mut StringPool) -> Arc<Annotations> {
    let Some(message) = message else {
        return Annotations::empty();
    };
    let values: BTreeMap<_, _> = message
        .values
        .into_iter()
        .filter(|value| !value.name.is_empty())
        .map(|value| (pool.intern(&value.name), value.text_value))
        .collect();
    Annotations::from_parts(non_empty(message.note), message.color, values)
}

fn peak_record(
    peak: proto::TransitionPeak,
    pool: &mut StringPool,
) -> Result<IndexedPeak, BulkDecodeError> {
    let record = TransitionPeakRecord {
        optimization_step: peak.optimization_step,
        mass_error: peak.mass_error.map(|v| v.value),
        retention_time: peak.retention_time,
        start_retention_time: peak.start_retention_time,
        end_retention_time: peak.end_retention_time,
        drift_time: peak.ion_mobility.map(|v| v.value),
        drift_time_window: peak.ion_mobility_window.map(|v| v.value),
        area: peak.area,
        background_area: peak.background_area,
        height: peak.height,
        fwhm: peak.fwhm,
        fwhm_degenerate: peak.is_fwhm_degenerate,
        truncated: peak.truncated.map(|v| v.value),
        points_across: peak.points_across_peak.map(|v| v.value),
        identified: identification(peak.identified)?,
        rank: peak.rank,
        rank_by_level: peak.rank_by_level.map(|v| v.value),
        user_set: user_set(peak.user_set)?,
        annotations: annotations(peak.annotations, pool),
    };
    Ok(IndexedPeak {
        replicate_index: peak.replicate_index,
        file_index: peak.file_index_in_replicate,
        peak: record,
    })
}

fn peak_records(
    results: Option<proto::TransitionResults>,
    pool: &mut StringPool,
) -> Result<Vec<IndexedPeak>, BulkDecodeError> {
    results
        .map(|results| results.peaks)
        .unwrap_or_default()
        .into_iter()
        .map(|peak| peak_record(peak, pool))
        .collect()
}

/// Decode the text of a `results_data` element
pub(crate) fn decode_transition_peaks(
    text: &str,
    pool: &mut StringPool,
) -> Result<Vec<IndexedPeak>, BulkDecodeError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let results = proto::TransitionResults::decode(decode_payload(text)?.as_slice())?;
    peak_records(Some(results), pool)
}

fn loss_record(loss: proto::TransitionLoss) -> Result<LossRecord, DocumentError> {
    if !loss.modification_name.is_empty() {
        return Ok(LossRecord::Modification {
            name: loss.modification_name,
            loss_index: loss.loss_index,
        });
    }
    let fragment_loss = match loss.formula.trim() {
        "" => {
            let average = if loss.average_mass == 0.0 {
                loss.monoisotopic_mass
            } else {
                loss.average_mass
            };
            FragmentLoss::from_masses(loss.monoisotopic_mass, average)
        }
        formula => FragmentLoss::from_formula(Formula::parse(formula)?)?,
    };
    Ok(LossRecord::Custom(fragment_loss))
}

fn transition_record(
    transition: proto::Transition,
    pool: &mut StringPool,
) -> Result<(TransitionRecord, Vec<IndexedPeak>), DocumentError> {
    let formula = non_empty(transition.formula);
    let monoisotopic_mass = transition.mono_mass.map(|v| v.value);
    let molecule = (formula.is_some() || monoisotopic_mass.is_some()).then(|| MoleculeAttributes {
        formula,
        monoisotopic_mass,
        average_mass: transition.average_mass.map(|v| v.value),
        mass_h: false,
        name: non_empty(transition.custom_ion_name),
    });
    let product_charge = non_empty(transition.adduct)
        .or_else(|| (transition.charge != 0).then(|| transition.charge.to_string()));
    let losses = transition
        .losses
        .into_iter()
        .map(loss_record)
        .collect::<Result<Vec<_>, _>>()?;

    let record = TransitionRecord {
        ion_type: ion_type(transition.fragment_type)?,
        ordinal: transition.fragment_ordinal,
        mass_index: transition.mass_index,
        precursor_charge: None,
        product_charge,
        decoy_mass_shift: transition.decoy_mass_shift.map(|v| v.value),
        quantitative: !transition.not_quantitative,
        measured_ion_name: non_empty(transition.measured_ion_name),
        molecule,
        losses: (!losses.is_empty()).then_some(losses),
        lib_info: transition.lib_info.map(|info| TransitionLibInfo {
            rank: info.rank,
            intensity: info.intensity,
        }),
        declared_product_mz: transition.product_mz.map(|v| v.value),
        annotations: annotations(transition.annotations, pool),
        results: None,
    };
    let peaks = peak_records(transition.results, pool)?;
    Ok((record, peaks))
}

/// Decode the text of a `transition_data` element into transitions and
/// their uncorrelated result rows
pub(crate) fn decode_transitions(
    text: &str,
    pool: &mut StringPool,
) -> Result<Vec<(TransitionRecord, Vec<IndexedPeak>)>, DocumentError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let data = proto::TransitionData::decode(decode_payload(text)?.as_slice())
        .map_err(BulkDecodeError::from)?;
    data.transitions
        .into_iter()
        .map(|transition| transition_record(transition, pool))
        .collect()
}

/// Payload builders for tests
#[cfg(test)]
pub(crate) mod encode {
    use std::io::Write;

    use base64::prelude::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use prost::Message;

    pub(crate) use super::proto::*;

    /// A peak row in replicate `replicate_index`, first file
    pub(crate) fn peak(replicate_index: i32, file_index: i32, area: f32) -> TransitionPeak {
        TransitionPeak {
            retention_time: 10.0,
            start_retention_time: 9.5,
            end_retention_time: 10.5,
            area,
            background_area: 1.0,
            height: 100.0,
            fwhm: 0.2,
            identified: PeakIdentified::True as i32,
            rank: 1,
            replicate_index,
            file_index_in_replicate: file_index,
            ..TransitionPeak::default()
        }
    }

    /// Base64 text of an uncompressed message
    pub(crate) fn raw<M: Message>(message: &M) -> String {
        BASE64_STANDARD.encode(message.encode_to_vec())
    }

    /// Base64 text of a zlib-compressed message
    pub(crate) fn zlib<M: Message>(message: &M) -> String {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&message.encode_to_vec()).unwrap();
        BASE64_STANDARD.encode(encoder.finish().unwrap())
    }
}
