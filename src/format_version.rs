//! Document format revisions
//!
//! Every document carries a `format_version` attribute on its root element.
//! The value is a decimal number (`3.71`, `4.12`, ...) and revisions are
//! ordered numerically. Builders compare the negotiated version against the
//! named milestones below to pick between superseded and current layouts.

use std::cmp::Ordering;
use std::fmt;

use crate::reader::DocumentError;

/// An ordered document format revision
#[derive(Debug, Clone, Copy)]
pub struct FormatVersion(f64);

impl FormatVersion {
    /// Original release: ungrouped transitions, `selected_*` wrappers
    pub const VERSION_0_1: Self = Self(0.1);
    /// Last revision where a missing modification type meant "no modifications"
    pub const VERSION_0_2: Self = Self(0.2);
    /// Transition groups introduced
    pub const VERSION_0_8: Self = Self(0.8);
    /// Protein metadata on peptide lists
    pub const VERSION_1_2: Self = Self(1.2);
    /// Peak identification flags on result rows
    pub const VERSION_1_3: Self = Self(1.3);
    /// Explicit modifications on peptides
    pub const VERSION_1_4: Self = Self(1.4);
    /// Optimization steps on result rows
    pub const VERSION_1_5: Self = Self(1.5);
    /// Library info on transitions
    pub const VERSION_1_6: Self = Self(1.6);
    /// Heavy label types by name
    pub const VERSION_1_7: Self = Self(1.7);
    /// Decoy peptides and mass shifts
    pub const VERSION_1_9: Self = Self(1.9);
    /// Protein alternatives
    pub const VERSION_2_61: Self = Self(2.61);
    /// Mass error on transition peaks
    pub const VERSION_2_62: Self = Self(2.62);
    /// Custom ions
    pub const VERSION_3_1: Self = Self(3.1);
    /// Peptide standard types
    pub const VERSION_3_11: Self = Self(3.11);
    /// Explicit retention times
    pub const VERSION_3_12: Self = Self(3.12);
    /// Explicit collision energy and drift time attributes
    pub const VERSION_3_5: Self = Self(3.5);
    /// `s_lens` / `cone_voltage` renamed to `explicit_s_lens` / `explicit_cone_voltage`
    pub const VERSION_3_52: Self = Self(3.52);
    /// Small molecule lists
    pub const VERSION_3_6: Self = Self(3.6);
    /// Mass-only custom ions stored as m/z
    pub const VERSION_3_61: Self = Self(3.61);
    /// Measured ion reporters on transitions
    pub const VERSION_3_62: Self = Self(3.62);
    /// Compact binary transition results
    pub const VERSION_3_7: Self = Self(3.7);
    /// Last revision storing the charged precursor ion as the molecule formula
    pub const VERSION_3_71: Self = Self(3.71);
    /// Neutral molecules with adducts
    pub const VERSION_3_72: Self = Self(3.72);
    /// Neutral masses on custom molecules
    pub const VERSION_3_73: Self = Self(3.73);
    /// Calibration curve attributes on peptides
    pub const VERSION_4_1: Self = Self(4.1);
    /// Lookup sequences and modifications
    pub const VERSION_4_11: Self = Self(4.11);
    /// Compact binary transition lists
    pub const VERSION_4_12: Self = Self(4.12);

    /// Newest revision this reader understands
    pub const CURRENT: Self = Self::VERSION_4_12;

    /// Revision assumed when the root element carries no version
    pub const EARLIEST: Self = Self::VERSION_0_1;

    /// All named milestones, oldest first
    pub const MILESTONES: &'static [FormatVersion] = &[
        Self::VERSION_0_1,
        Self::VERSION_0_2,
        Self::VERSION_0_8,
        Self::VERSION_1_2,
        Self::VERSION_1_3,
        Self::VERSION_1_4,
        Self::VERSION_1_5,
        Self::VERSION_1_6,
        Self::VERSION_1_7,
        Self::VERSION_1_9,
        Self::VERSION_2_61,
        Self::VERSION_2_62,
        Self::VERSION_3_1,
        Self::VERSION_3_11,
        Self::VERSION_3_12,
        Self::VERSION_3_5,
        Self::VERSION_3_52,
        Self::VERSION_3_6,
        Self::VERSION_3_61,
        Self::VERSION_3_62,
        Self::VERSION_3_7,
        Self::VERSION_3_71,
        Self::VERSION_3_72,
        Self::VERSION_3_73,
        Self::VERSION_4_1,
        Self::VERSION_4_11,
        Self::VERSION_4_12,
    ];

    /// Wrap a raw version number
    pub const fn new(value: f64) -> Self {
        Self(value)
    }

    /// The raw version number
    pub fn as_f64(self) -> f64 {
        self.0
    }

    /// Resolve the root element's `format_version` attribute.
    ///
    /// A missing attribute (or the value `0`) means the earliest revision.
    /// Anything newer than [`FormatVersion::CURRENT`] is rejected before any
    /// entity is built.
    pub fn negotiate(attribute: Option<f64>) -> Result<Self, DocumentError> {
        let value = match attribute {
            None => return Ok(Self::EARLIEST),
            Some(v) if v == 0.0 => return Ok(Self::EARLIEST),
            Some(v) => v,
        };
        let version = Self(value);
        if version > Self::CURRENT {
            return Err(DocumentError::VersionTooNew {
                version: value,
                current: Self::CURRENT.as_f64(),
            });
        }
        Ok(version)
    }

    /// Documents at or before 3.71 stored the charged precursor ion as the
    /// custom molecule, so their chemistry needs reconciling on load.
    pub fn may_contain_embedded_ions(self) -> bool {
        self <= Self::VERSION_3_71
    }
}

impl PartialEq for FormatVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FormatVersion {}

impl PartialOrd for FormatVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FormatVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Default for FormatVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An attribute whose name changed at a given revision
#[derive(Debug, Clone, Copy)]
pub struct VersionedName {
    /// First revision using `current`
    pub since: FormatVersion,
    /// Name used from `since` onwards
    pub current: &'static str,
    /// Name used before `since`
    pub before: &'static str,
}

impl VersionedName {
    /// Name to look up for a document at `version`
    pub fn resolve(&self, version: FormatVersion) -> &'static str {
        if version < self.since {
            self.before
        } else {
            self.current
        }
    }
}
