//! Per-replicate measurement rows
//!
//! Every entity with results holds a [`Results`] whose length equals the
//! number of replicates in the registry. A slot is `None` when the entity
//! has no row for that replicate, which is distinct from an empty list.

use std::sync::Arc;

use super::annotations::Annotations;
use crate::settings::ChromFileId;

/// Rows of one entity, aligned to the replicate registry
#[derive(Debug, Clone, PartialEq)]
pub struct Results<T> {
    replicates: Vec<Option<Vec<T>>>,
}

impl<T> Results<T> {
    /// Wrap per-replicate slots
    pub fn new(replicates: Vec<Option<Vec<T>>>) -> Self {
        Self { replicates }
    }

    /// Number of slots (the registry size)
    pub fn len(&self) -> usize {
        self.replicates.len()
    }

    /// Whether there are no slots at all
    pub fn is_empty(&self) -> bool {
        self.replicates.is_empty()
    }

    /// Rows for the replicate at `index`, `None` when absent
    pub fn get(&self, index: usize) -> Option<&[T]> {
        self.replicates.get(index)?.as_deref()
    }

    /// Slots in registry order
    pub fn iter(&self) -> impl Iterator<Item = Option<&[T]>> {
        self.replicates.iter().map(|slot| slot.as_deref())
    }

    /// Total rows over all replicates
    pub fn row_count(&self) -> usize {
        self.replicates.iter().flatten().map(Vec::len).sum()
    }
}

/// Peak identification state of a result row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeakIdentification {
    /// Not identified
    #[default]
    False,
    /// Identified by a matching spectrum
    True,
    /// Identified by alignment with another run
    Aligned,
}

impl PeakIdentification {
    /// Parse the `identified` attribute (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "FALSE" => Some(Self::False),
            "TRUE" => Some(Self::True),
            "ALIGNED" => Some(Self::Aligned),
            _ => None,
        }
    }
}

/// How a peak boundary was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserSet {
    /// Picked automatically
    #[default]
    False,
    /// Set by a user
    True,
    /// Imported from an external tool
    Imported,
    /// Reintegrated by a model
    Reintegrated,
    /// Matched to another precursor
    Matched,
}

impl UserSet {
    /// Parse the `user_set` attribute (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "FALSE" => Some(Self::False),
            "TRUE" => Some(Self::True),
            "IMPORTED" => Some(Self::Imported),
            "REINTEGRATED" => Some(Self::Reintegrated),
            "MATCHED" => Some(Self::Matched),
            _ => None,
        }
    }
}

/// Peptide-level row
#[derive(Debug, Clone, PartialEq)]
pub struct PeptideChromInfo {
    /// Owning file
    pub file_id: ChromFileId,
    /// Fraction of precursors with a peak
    pub peak_count_ratio: f32,
    /// Retention time
    pub retention_time: Option<f32>,
    /// Excluded from calibration curves
    pub exclude_from_calibration: bool,
}

/// Ion mobility of a precursor row
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IonMobilityInfo {
    /// Collisional cross section
    pub ccs: Option<f32>,
    /// Drift time of MS1 ions
    pub drift_time_ms1: Option<f32>,
    /// Drift time of fragment ions
    pub drift_time_fragment: Option<f32>,
    /// Drift time window
    pub drift_time_window: Option<f32>,
}

/// Precursor-level row
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionGroupChromInfo {
    /// Owning file
    pub file_id: ChromFileId,
    /// Optimization step
    pub optimization_step: i32,
    /// Fraction of transitions with a peak
    pub peak_count_ratio: f32,
    /// Apex retention time
    pub retention_time: Option<f32>,
    /// Peak start
    pub start_time: Option<f32>,
    /// Peak end
    pub end_time: Option<f32>,
    /// Ion mobility
    pub ion_mobility: IonMobilityInfo,
    /// Full width at half maximum
    pub fwhm: Option<f32>,
    /// Summed area
    pub area: Option<f32>,
    /// Summed background
    pub background_area: Option<f32>,
    /// Apex height
    pub height: Option<f32>,
    /// Mass error in ppm
    pub mass_error: Option<f32>,
    /// Number of truncated transition peaks
    pub truncated: Option<i32>,
    /// Identification state
    pub identified: PeakIdentification,
    /// Library dot product
    pub library_dot_product: Option<f32>,
    /// Isotope dot product
    pub isotope_dot_product: Option<f32>,
    /// q-value from peak scoring
    pub qvalue: Option<f32>,
    /// z-score from peak scoring
    pub zscore: Option<f32>,
    /// Ratio slots, one per internal standard type
    pub ratios: Vec<Option<f32>>,
    /// Annotations
    pub annotations: Arc<Annotations>,
    /// Boundary provenance
    pub user_set: UserSet,
}

/// Drift time filter of a transition row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftTimeFilter {
    /// Drift time in msec
    pub drift_time: f64,
    /// Window width
    pub window: Option<f64>,
}

/// Transition-level row
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionChromInfo {
    /// Owning file
    pub file_id: ChromFileId,
    /// Optimization step
    pub optimization_step: i32,
    /// Mass error in ppm
    pub mass_error: Option<f32>,
    /// Apex retention time
    pub retention_time: f32,
    /// Peak start
    pub start_retention_time: f32,
    /// Peak end
    pub end_retention_time: f32,
    /// Drift time filter
    pub ion_mobility: Option<DriftTimeFilter>,
    /// Area, never negative
    pub area: f32,
    /// Background area, never negative
    pub background_area: f32,
    /// Apex height
    pub height: f32,
    /// Full width at half maximum, never NaN
    pub fwhm: f32,
    /// FWHM could not be measured reliably
    pub fwhm_degenerate: bool,
    /// Peak truncated at the chromatogram edge
    pub truncated: Option<bool>,
    /// Points across the peak
    pub points_across: Option<i16>,
    /// Identification state
    pub identified: PeakIdentification,
    /// Rank among sibling transitions
    pub rank: i16,
    /// Rank among transitions of the same MS level
    pub rank_by_level: i16,
    /// Ratio slots, one per internal standard type
    pub ratios: Vec<Option<f32>>,
    /// Annotations
    pub annotations: Arc<Annotations>,
    /// Boundary provenance
    pub user_set: UserSet,
}

/// Row equality used to drop a repeated row. Unlike `PartialEq`, two NaN
/// values are the same.
pub(crate) trait SameRow {
    fn same_row(&self, other: &Self) -> bool;
}

macro_rules! same_row_by_eq {
    ($($ty:ty),* $(,)?) => {
        $(impl SameRow for $ty {
            fn same_row(&self, other: &Self) -> bool {
                self == other
            }
        })*
    };
}

macro_rules! same_row_for_float {
    ($($ty:ty),*) => {
        $(impl SameRow for $ty {
            fn same_row(&self, other: &Self) -> bool {
                self == other || (self.is_nan() && other.is_nan())
            }
        })*
    };
}

macro_rules! same_row_by_fields {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl SameRow for $ty {
            fn same_row(&self, other: &Self) -> bool {
                $(self.$field.same_row(&other.$field))&&*
            }
        }
    };
}

same_row_by_eq!(bool, i16, i32, ChromFileId, PeakIdentification, UserSet, Arc<Annotations>);
same_row_for_float!(f32, f64);

impl<T: SameRow> SameRow for Option<T> {
    fn same_row(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.same_row(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: SameRow> SameRow for Vec<T> {
    fn same_row(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.same_row(b))
    }
}

same_row_by_fields!(PeptideChromInfo {
    file_id,
    peak_count_ratio,
    retention_time,
    exclude_from_calibration,
});

same_row_by_fields!(IonMobilityInfo {
    ccs,
    drift_time_ms1,
    drift_time_fragment,
    drift_time_window,
});

same_row_by_fields!(TransitionGroupChromInfo {
    file_id,
    optimization_step,
    peak_count_ratio,
    retention_time,
    start_time,
    end_time,
    ion_mobility,
    fwhm,
    area,
    background_area,
    height,
    mass_error,
    truncated,
    identified,
    library_dot_product,
    isotope_dot_product,
    qvalue,
    zscore,
    ratios,
    annotations,
    user_set,
});

same_row_by_fields!(DriftTimeFilter { drift_time, window });

same_row_by_fields!(TransitionChromInfo {
    file_id,
    optimization_step,
    mass_error,
    retention_time,
    start_retention_time,
    end_retention_time,
    ion_mobility,
    area,
    background_area,
    height,
    fwhm,
    fwhm_degenerate,
    truncated,
    points_across,
    identified,
    rank,
    rank_by_level,
    ratios,
    annotations,
    user_set,
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_slot_differs_from_empty() {
        let results: Results<i32> = Results::new(vec![None, Some(vec![]), Some(vec![1, 2])]);
        assert_eq!(results.len(), 3);
        assert!(results.get(0).is_none());
        assert_eq!(results.get(1), Some(&[][..]));
        assert_eq!(results.get(2), Some(&[1, 2][..]));
        assert!(results.get(3).is_none());
        assert_eq!(results.row_count(), 2);
    }

    #[test]
    fn test_same_row_treats_nan_as_equal() {
        let row = PeptideChromInfo {
            file_id: ChromFileId::new("f1"),
            peak_count_ratio: f32::NAN,
            retention_time: Some(f32::NAN),
            exclude_from_calibration: false,
        };
        assert_ne!(row, row.clone());
        assert!(row.same_row(&row.clone()));
        let moved = PeptideChromInfo {
            retention_time: Some(1.0),
            ..row.clone()
        };
        assert!(!row.same_row(&moved));
        assert!(!Some(1.0f32).same_row(&None));
    }

    #[test]
    fn test_enum_names() {
        assert_eq!(PeakIdentification::from_name("aligned"), Some(PeakIdentification::Aligned));
        assert_eq!(UserSet::from_name("REINTEGRATED"), Some(UserSet::Reintegrated));
        assert_eq!(UserSet::from_name("sometimes"), None);
    }
}
