//! Protobuf messages carried by `results_data` and `transition_data`
//!
//! Mirrors the nested messages of `SkylineDocumentProto`. Optional scalars
//! are wrapper messages so that an absent value is distinct from zero.

/// Wrapped `float`
#[derive(Clone, PartialEq, prost::Message)]
pub struct OptionalFloat {
    #[prost(float, tag = "1")]
    pub value: f32,
}

/// Wrapped `double`
#[derive(Clone, PartialEq, prost::Message)]
pub struct OptionalDouble {
    #[prost(double, tag = "1")]
    pub value: f64,
}

/// Wrapped `int32`
#[derive(Clone, PartialEq, prost::Message)]
pub struct OptionalInt {
    #[prost(int32, tag = "1")]
    pub value: i32,
}

/// Wrapped `bool`
#[derive(Clone, PartialEq, prost::Message)]
pub struct OptionalBool {
    #[prost(bool, tag = "1")]
    pub value: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum IonType {
    A = 0,
    B = 1,
    C = 2,
    X = 3,
    Y = 4,
    Z = 5,
    Precursor = 6,
    Custom = 7,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum UserSet {
    False = 0,
    True = 1,
    Imported = 2,
    Reintegrated = 3,
    Matched = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum PeakIdentified {
    False = 0,
    True = 1,
    Aligned = 2,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct AnnotationValue {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub text_value: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Annotations {
    #[prost(string, tag = "1")]
    pub note: String,
    #[prost(int32, tag = "2")]
    pub color: i32,
    #[prost(message, repeated, tag = "3")]
    pub values: Vec<AnnotationValue>,
}

/// One transition result row. The replicate and file are positions in the
/// replicate registry, not names.
#[derive(Clone, PartialEq, prost::Message)]
pub struct TransitionPeak {
    #[prost(int32, tag = "1")]
    pub optimization_step: i32,
    #[prost(message, optional, tag = "2")]
    pub mass_error: Option<OptionalFloat>,
    #[prost(float, tag = "3")]
    pub retention_time: f32,
    #[prost(float, tag = "4")]
    pub start_retention_time: f32,
    #[prost(float, tag = "5")]
    pub end_retention_time: f32,
    #[prost(message, optional, tag = "6")]
    pub ion_mobility: Option<OptionalDouble>,
    #[prost(message, optional, tag = "7")]
    pub ion_mobility_window: Option<OptionalDouble>,
    #[prost(float, tag = "8")]
    pub area: f32,
    #[prost(float, tag = "9")]
    pub background_area: f32,
    #[prost(float, tag = "10")]
    pub height: f32,
    #[prost(float, tag = "11")]
    pub fwhm: f32,
    #[prost(bool, tag = "12")]
    pub is_fwhm_degenerate: bool,
    #[prost(message, optional, tag = "13")]
    pub truncated: Option<OptionalBool>,
    #[prost(enumeration = "PeakIdentified", tag = "14")]
    pub identified: i32,
    #[prost(int32, tag = "15")]
    pub rank: i32,
    #[prost(message, optional, tag = "16")]
    pub rank_by_level: Option<OptionalInt>,
    #[prost(enumeration = "UserSet", tag = "17")]
    pub user_set: i32,
    #[prost(message, optional, tag = "18")]
    pub annotations: Option<Annotations>,
    #[prost(message, optional, tag = "19")]
    pub points_across_peak: Option<OptionalInt>,
    #[prost(int32, tag = "20")]
    pub replicate_index: i32,
    #[prost(int32, tag = "21")]
    pub file_index_in_replicate: i32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct TransitionResults {
    #[prost(message, repeated, tag = "1")]
    pub peaks: Vec<TransitionPeak>,
}

/// A modification loss when `modification_name` is set, otherwise a loss
/// given by formula or masses
#[derive(Clone, PartialEq, prost::Message)]
pub struct TransitionLoss {
    #[prost(string, tag = "1")]
    pub modification_name: String,
    #[prost(int32, tag = "2")]
    pub loss_index: i32,
    #[prost(string, tag = "3")]
    pub formula: String,
    #[prost(double, tag = "4")]
    pub monoisotopic_mass: f64,
    #[prost(double, tag = "5")]
    pub average_mass: f64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct TransitionLibInfo {
    #[prost(int32, tag = "1")]
    pub rank: i32,
    #[prost(float, tag = "2")]
    pub intensity: f32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Transition {
    #[prost(enumeration = "IonType", tag = "1")]
    pub fragment_type: i32,
    #[prost(int32, tag = "2")]
    pub fragment_ordinal: i32,
    #[prost(int32, tag = "3")]
    pub mass_index: i32,
    #[prost(int32, tag = "4")]
    pub charge: i32,
    /// Product adduct text, overrides `charge` when set
    #[prost(string, tag = "5")]
    pub adduct: String,
    #[prost(message, optional, tag = "6")]
    pub decoy_mass_shift: Option<OptionalInt>,
    #[prost(bool, tag = "7")]
    pub not_quantitative: bool,
    #[prost(string, tag = "8")]
    pub measured_ion_name: String,
    #[prost(string, tag = "9")]
    pub formula: String,
    #[prost(message, optional, tag = "10")]
    pub mono_mass: Option<OptionalDouble>,
    #[prost(message, optional, tag = "11")]
    pub average_mass: Option<OptionalDouble>,
    #[prost(string, tag = "12")]
    pub custom_ion_name: String,
    #[prost(message, repeated, tag = "13")]
    pub losses: Vec<TransitionLoss>,
    #[prost(message, optional, tag = "14")]
    pub lib_info: Option<TransitionLibInfo>,
    #[prost(message, optional, tag = "15")]
    pub product_mz: Option<OptionalDouble>,
    #[prost(message, optional, tag = "16")]
    pub annotations: Option<Annotations>,
    #[prost(message, optional, tag = "17")]
    pub results: Option<TransitionResults>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct TransitionData {
    #[prost(message, repeated, tag = "1")]
    pub transitions: Vec<Transition>,
}
