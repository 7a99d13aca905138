//! Immutable document tree
//!
//! Nodes are built once by the reader and never mutated afterwards.
//! `with_*` methods return a changed copy.

mod annotations;
mod document;
mod peptide;
mod results;
mod transition;

pub use annotations::Annotations;
pub use document::{
    FastaSequence, NodeCounts, PeptideGroup, PeptideGroupNode, ProteinMetadata, SrmDocument,
};
pub(crate) use peptide::strip_modifications;
pub(crate) use results::SameRow;
pub use peptide::{
    ExplicitMod, ExplicitMods, ExplicitRetentionTime, LookupSequence, Peptide, PeptideNode,
    PeptideTarget, StandardType, TypedExplicitModifications,
};
pub use results::{
    DriftTimeFilter, IonMobilityInfo, PeakIdentification, PeptideChromInfo, Results,
    TransitionChromInfo, TransitionGroupChromInfo, UserSet,
};
pub use transition::{
    ordinal_to_offset, ExplicitTransitionGroupValues, IonType, SpectrumHeaderInfo,
    TransitionGroupNode, TransitionLibInfo, TransitionLoss, TransitionLosses, TransitionNode,
};
