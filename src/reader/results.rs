//! Correlation of result rows with the replicate registry
//!
//! All three row kinds share one algorithm: rows name a replicate and,
//! optionally, a file inside it. Rows decoded from binary payloads name
//! both by position instead. Rows land in the slot of their replicate;
//! slots with no rows stay `None`.

use std::io::BufRead;

use log::debug;

use super::annotations::{read_row_annotations, take_score_annotation};
use super::bulk::{IndexedPeak, TransitionPeakRecord};
use super::cursor::TagCursor;
use super::error::DocumentError;
use super::names::{attr, score};
use super::ParseContext;
use crate::model::{
    Annotations, DriftTimeFilter, IonMobilityInfo, PeakIdentification, PeptideChromInfo, Results,
    SameRow, TransitionChromInfo, TransitionGroupChromInfo, UserSet,
};
use crate::settings::{ChromFileId, ChromatogramSet, MeasuredResults};

/// Collects rows into replicate slots, dropping a row equal to the one
/// just appended for the same replicate
pub(crate) struct ResultsBuilder<T> {
    slots: Vec<Option<Vec<T>>>,
}

impl<T: SameRow> ResultsBuilder<T> {
    pub(crate) fn new(replicate_count: usize) -> Self {
        Self {
            slots: (0..replicate_count).map(|_| None).collect(),
        }
    }

    pub(crate) fn push(&mut self, replicate_index: usize, row: T) {
        let Some(slot) = self.slots.get_mut(replicate_index) else {
            return;
        };
        let rows = slot.get_or_insert_with(Vec::new);
        if rows.last().is_some_and(|last| last.same_row(&row)) {
            debug!("Discarding duplicate result row for replicate {replicate_index}");
            return;
        }
        rows.push(row);
    }

    pub(crate) fn finish(self) -> Results<T> {
        Results::new(self.slots)
    }
}

/// Registry the results sections resolve against
pub(crate) fn registry<'a>(ctx: &ParseContext<'a>) -> Result<&'a MeasuredResults, DocumentError> {
    let settings = ctx.settings;
    settings
        .measured_results
        .as_ref()
        .ok_or(DocumentError::MissingMeasuredResultsContext)
}

/// Binds replicate names and file ids to registry positions, remembering
/// the replicate of the previous row
pub(crate) struct ReplicateResolver<'a> {
    registry: &'a MeasuredResults,
    current: Option<(usize, &'a ChromatogramSet)>,
}

impl<'a> ReplicateResolver<'a> {
    pub(crate) fn new(ctx: &ParseContext<'a>) -> Result<Self, DocumentError> {
        Ok(Self {
            registry: registry(ctx)?,
            current: None,
        })
    }

    pub(crate) fn replicate_count(&self) -> usize {
        self.registry.len()
    }

    /// Replicate index and file id of a row
    pub(crate) fn resolve(
        &mut self,
        replicate: &str,
        file: Option<&str>,
    ) -> Result<(usize, ChromFileId), DocumentError> {
        let (index, set) = match self.current {
            Some((index, set)) if set.name == replicate => (index, set),
            _ => {
                let found = self
                    .registry
                    .find_replicate(replicate)
                    .ok_or_else(|| DocumentError::MissingReplicateReference(replicate.to_string()))?;
                self.current = Some(found);
                found
            }
        };
        Ok((index, resolve_file(file, set)?))
    }

    /// Replicate index and file id of a payload row, which names both by
    /// position. Negative or out of range positions are missing references.
    pub(crate) fn resolve_position(
        &self,
        replicate_index: i32,
        file_index: i32,
    ) -> Result<(usize, ChromFileId), DocumentError> {
        let (index, set) = usize::try_from(replicate_index)
            .ok()
            .and_then(|index| Some((index, self.registry.get(index)?)))
            .ok_or_else(|| DocumentError::MissingReplicateReference(format!("#{replicate_index}")))?;
        let file = usize::try_from(file_index)
            .ok()
            .and_then(|position| set.files.get(position))
            .ok_or_else(|| DocumentError::MissingFileReference {
                file_id: format!("#{file_index}"),
                replicate: set.name.to_string(),
            })?;
        Ok((index, file.id.clone()))
    }
}

/// Read a results section at the cursor whose rows are `row_element`.
///
/// `read_row` is called on each row with its resolved file id and must
/// consume the row element. An empty section yields `None`.
pub(crate) fn read_results<R, T, F>(
    ctx: &mut ParseContext<'_>,
    cursor: &mut TagCursor<R>,
    row_element: &str,
    mut read_row: F,
) -> Result<Option<Results<T>>, DocumentError>
where
    R: BufRead,
    T: SameRow,
    F: FnMut(&mut ParseContext<'_>, &mut TagCursor<R>, ChromFileId) -> Result<T, DocumentError>,
{
    if cursor.is_empty_element() {
        cursor.skip_element()?;
        return Ok(None);
    }
    let mut resolver = ReplicateResolver::new(ctx)?;

    cursor.enter_element()?;
    let mut builder = ResultsBuilder::new(resolver.replicate_count());
    while cursor.is_start_element(row_element) {
        let (index, file_id) = resolver.resolve(
            cursor.attribute(attr::REPLICATE).unwrap_or_default(),
            cursor.attribute(attr::FILE),
        )?;
        let row = read_row(ctx, cursor, file_id)?;
        builder.push(index, row);
    }
    cursor.exit_element()?;
    Ok(Some(builder.finish()))
}

/// Bind decoded transition rows to the registry. No rows yields `None`.
pub(crate) fn correlate_transition_peaks(
    ctx: &ParseContext<'_>,
    records: Vec<IndexedPeak>,
) -> Result<Option<Results<TransitionChromInfo>>, DocumentError> {
    if records.is_empty() {
        return Ok(None);
    }
    let resolver = ReplicateResolver::new(ctx)?;
    let ratio_count = ctx.settings.ratio_count();
    let mut builder = ResultsBuilder::new(resolver.replicate_count());
    for record in records {
        let (index, file_id) =
            resolver.resolve_position(record.replicate_index, record.file_index)?;
        builder.push(index, record.peak.into_chrom_info(file_id, ratio_count));
    }
    Ok(Some(builder.finish()))
}

/// File id named by a row, or the replicate's first file when omitted
pub(crate) fn resolve_file(
    file_id: Option<&str>,
    replicate: &ChromatogramSet,
) -> Result<ChromFileId, DocumentError> {
    let found = match file_id {
        Some(id) => replicate.find_file_by_id(id),
        None => replicate.first_file(),
    };
    found
        .cloned()
        .ok_or_else(|| DocumentError::MissingFileReference {
            file_id: file_id.unwrap_or_default().to_string(),
            replicate: replicate.name.to_string(),
        })
}

pub(crate) fn read_peptide_result<R: BufRead>(
    _ctx: &mut ParseContext<'_>,
    cursor: &mut TagCursor<R>,
    file_id: ChromFileId,
) -> Result<PeptideChromInfo, DocumentError> {
    let info = PeptideChromInfo {
        file_id,
        peak_count_ratio: cursor.float_attribute(attr::PEAK_COUNT_RATIO)?,
        retention_time: cursor.nullable_float_attribute(attr::RETENTION_TIME)?,
        exclude_from_calibration: cursor.bool_attribute(attr::EXCLUDE_FROM_CALIBRATION, false)?,
    };
    cursor.skip_element()?;
    Ok(info)
}

fn identified<R: BufRead>(cursor: &TagCursor<R>) -> Result<PeakIdentification, DocumentError> {
    match cursor.attribute(attr::IDENTIFIED) {
        None => Ok(PeakIdentification::False),
        Some(value) => PeakIdentification::from_name(value).ok_or_else(|| {
            DocumentError::InvalidAttributeValue {
                attribute: attr::IDENTIFIED.to_string(),
                value: value.to_string(),
            }
        }),
    }
}

/// Precursor row. `user_set` is ignored because precursor values are
/// recomputed from their transitions.
pub(crate) fn read_precursor_peak<R: BufRead>(
    ctx: &mut ParseContext<'_>,
    cursor: &mut TagCursor<R>,
    file_id: ChromFileId,
) -> Result<TransitionGroupChromInfo, DocumentError> {
    let mut qvalue = cursor.nullable_float_attribute(attr::QVALUE)?;
    let mut zscore = cursor.nullable_float_attribute(attr::ZSCORE)?;
    let mut info = TransitionGroupChromInfo {
        file_id,
        optimization_step: cursor.int_attribute(attr::STEP)?,
        peak_count_ratio: cursor.float_attribute(attr::PEAK_COUNT_RATIO)?,
        retention_time: cursor.nullable_float_attribute(attr::RETENTION_TIME)?,
        start_time: cursor.nullable_float_attribute(attr::START_TIME)?,
        end_time: cursor.nullable_float_attribute(attr::END_TIME)?,
        ion_mobility: IonMobilityInfo {
            ccs: cursor.nullable_float_attribute(attr::CCS)?,
            drift_time_ms1: cursor.nullable_float_attribute(attr::DRIFT_TIME_MS1)?,
            drift_time_fragment: cursor.nullable_float_attribute(attr::DRIFT_TIME_FRAGMENT)?,
            drift_time_window: cursor.nullable_float_attribute(attr::DRIFT_TIME_WINDOW)?,
        },
        fwhm: cursor.nullable_float_attribute(attr::FWHM)?,
        area: cursor.nullable_float_attribute(attr::AREA)?,
        background_area: cursor.nullable_float_attribute(attr::BACKGROUND)?,
        height: cursor.nullable_float_attribute(attr::HEIGHT)?,
        mass_error: cursor.nullable_float_attribute(attr::MASS_ERROR_PPM)?,
        truncated: cursor.nullable_int_attribute(attr::TRUNCATED)?,
        identified: identified(cursor)?,
        library_dot_product: cursor.nullable_float_attribute(attr::LIBRARY_DOTP)?,
        isotope_dot_product: cursor.nullable_float_attribute(attr::ISOTOPE_DOTP)?,
        qvalue: None,
        zscore: None,
        ratios: vec![None; ctx.settings.ratio_count()],
        annotations: Annotations::empty(),
        user_set: UserSet::False,
    };
    let annotations = read_row_annotations(cursor, &mut ctx.pool)?;
    let annotations = take_score_annotation(annotations, score::QVALUE, &mut qvalue);
    info.annotations = take_score_annotation(annotations, score::ZSCORE, &mut zscore);
    info.qvalue = qvalue;
    info.zscore = zscore;
    Ok(info)
}

/// Transition row with negative areas clamped and NaN widths zeroed
pub(crate) fn read_transition_peak<R: BufRead>(
    ctx: &mut ParseContext<'_>,
    cursor: &mut TagCursor<R>,
    file_id: ChromFileId,
) -> Result<TransitionChromInfo, DocumentError> {
    let user_set = match cursor.attribute(attr::USER_SET) {
        None => UserSet::False,
        Some(value) => {
            UserSet::from_name(value).ok_or_else(|| DocumentError::InvalidAttributeValue {
                attribute: attr::USER_SET.to_string(),
                value: value.to_string(),
            })?
        }
    };
    let mut record = TransitionPeakRecord {
        optimization_step: cursor.int_attribute(attr::STEP)?,
        mass_error: cursor.nullable_float_attribute(attr::MASS_ERROR_PPM)?,
        retention_time: cursor.float_attribute(attr::RETENTION_TIME)?,
        start_retention_time: cursor.float_attribute(attr::START_TIME)?,
        end_retention_time: cursor.float_attribute(attr::END_TIME)?,
        drift_time: cursor.nullable_double_attribute(attr::DRIFT_TIME)?,
        drift_time_window: cursor.nullable_double_attribute(attr::DRIFT_TIME_WINDOW)?,
        area: cursor.float_attribute(attr::AREA)?,
        background_area: cursor.float_attribute(attr::BACKGROUND)?,
        height: cursor.float_attribute(attr::HEIGHT)?,
        fwhm: cursor.float_attribute(attr::FWHM)?,
        fwhm_degenerate: cursor.bool_attribute(attr::FWHM_DEGENERATE, false)?,
        truncated: cursor.nullable_bool_attribute(attr::TRUNCATED)?,
        points_across: cursor.nullable_int_attribute(attr::POINTS_ACROSS)?,
        identified: identified(cursor)?,
        rank: cursor.int_attribute(attr::RANK)?,
        rank_by_level: cursor.nullable_int_attribute(attr::RANK_BY_LEVEL)?,
        user_set,
        annotations: Annotations::empty(),
    };
    record.annotations = read_row_annotations(cursor, &mut ctx.pool)?;
    Ok(record.into_chrom_info(file_id, ctx.settings.ratio_count()))
}

impl TransitionPeakRecord {
    pub(crate) fn into_chrom_info(self, file_id: ChromFileId, ratio_count: usize) -> TransitionChromInfo {
        let rank = self.rank as i16;
        TransitionChromInfo {
            file_id,
            optimization_step: self.optimization_step,
            mass_error: self.mass_error,
            retention_time: self.retention_time,
            start_retention_time: self.start_retention_time,
            end_retention_time: self.end_retention_time,
            ion_mobility: self.drift_time.map(|drift_time| DriftTimeFilter {
                drift_time,
                window: self.drift_time_window,
            }),
            area: self.area.max(0.0),
            background_area: self.background_area.max(0.0),
            height: self.height,
            fwhm: non_nan(self.fwhm),
            fwhm_degenerate: self.fwhm_degenerate,
            truncated: self.truncated,
            points_across: self.points_across.map(|n| n as i16),
            identified: self.identified,
            rank,
            rank_by_level: self.rank_by_level.map_or(rank, |n| n as i16),
            ratios: vec![None; ratio_count],
            annotations: self.annotations,
            user_set: self.user_set,
        }
    }
}

pub(crate) fn non_nan(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::DefaultMassCalculator;
    use crate::format_version::FormatVersion;
    use crate::settings::{ChromFileInfo, DocumentSettings};

    fn settings() -> DocumentSettings {
        let file = |id: &str| ChromFileInfo {
            id: ChromFileId::new(id),
            path: format!("{id}.raw"),
        };
        DocumentSettings::default().with_measured_results(MeasuredResults::new(vec![
            ChromatogramSet::new("R1", vec![file("f1"), file("f2")]),
            ChromatogramSet::new("R2", vec![file("f3")]),
        ]))
    }

    fn peak(replicate_index: i32, file_index: i32, area: f32) -> IndexedPeak {
        let peak = TransitionPeakRecord {
            optimization_step: 0,
            mass_error: None,
            retention_time: 1.0,
            start_retention_time: 0.5,
            end_retention_time: 1.5,
            drift_time: None,
            drift_time_window: None,
            area,
            background_area: -1.0,
            height: 3.0,
            fwhm: f32::NAN,
            fwhm_degenerate: false,
            truncated: None,
            points_across: None,
            identified: PeakIdentification::False,
            rank: 2,
            rank_by_level: None,
            user_set: UserSet::False,
            annotations: Annotations::empty(),
        };
        IndexedPeak {
            replicate_index,
            file_index,
            peak,
        }
    }

    #[test]
    fn test_builder_drops_adjacent_duplicates() {
        let mut builder = ResultsBuilder::new(3);
        builder.push(0, 1);
        builder.push(0, 1);
        builder.push(0, 2);
        builder.push(2, 1);
        let results = builder.finish();
        assert_eq!(results.get(0), Some(&[1, 2][..]));
        assert_eq!(results.get(1), None);
        assert_eq!(results.get(2), Some(&[1][..]));
    }

    #[test]
    fn test_correlate_resolves_files_and_clamps() {
        let settings = settings();
        let calculator = DefaultMassCalculator::new();
        let ctx = ParseContext::new(&settings, FormatVersion::CURRENT, &calculator);
        let results = correlate_transition_peaks(
            &ctx,
            vec![peak(1, 0, 4.0), peak(0, 1, -5.0)],
        )
        .unwrap()
        .unwrap();

        let r1 = results.get(0).unwrap();
        assert_eq!(r1[0].file_id.as_str(), "f2");
        assert_eq!(r1[0].area, 0.0);
        assert_eq!(r1[0].background_area, 0.0);
        assert_eq!(r1[0].fwhm, 0.0);
        assert_eq!(r1[0].rank_by_level, 2);
        assert_eq!(results.get(1).unwrap()[0].file_id.as_str(), "f3");
    }

    #[test]
    fn test_unknown_replicate_and_file() {
        let settings = settings();
        let calculator = DefaultMassCalculator::new();
        let ctx = ParseContext::new(&settings, FormatVersion::CURRENT, &calculator);
        let err = correlate_transition_peaks(&ctx, vec![peak(2, 0, 1.0)]).unwrap_err();
        assert!(matches!(err, DocumentError::MissingReplicateReference(name) if name == "#2"));
        let err = correlate_transition_peaks(&ctx, vec![peak(-1, 0, 1.0)]).unwrap_err();
        assert!(matches!(err, DocumentError::MissingReplicateReference(_)));
        let err = correlate_transition_peaks(&ctx, vec![peak(1, 1, 1.0)]).unwrap_err();
        assert!(matches!(
            err,
            DocumentError::MissingFileReference { file_id, replicate }
                if file_id == "#1" && replicate == "R2"
        ));
    }

    #[test]
    fn test_rows_without_registry() {
        let settings = DocumentSettings::default();
        let calculator = DefaultMassCalculator::new();
        let ctx = ParseContext::new(&settings, FormatVersion::CURRENT, &calculator);
        assert!(correlate_transition_peaks(&ctx, Vec::new()).unwrap().is_none());
        let err = correlate_transition_peaks(&ctx, vec![peak(0, 0, 1.0)]).unwrap_err();
        assert!(matches!(err, DocumentError::MissingMeasuredResultsContext));
    }
}
