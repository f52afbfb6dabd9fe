//! Per-read edit streams reconstructed from alignment annotations.
//!
//! A record's CIGAR string and MD tag are merged by [`StreamReconciler`]
//! into an [`EditStream`]: the ordered matches, substitutions, insertions
//! and deletions of the read, each carrying the bases involved.

mod operation;
mod operator;
mod reconcile;

pub use operation::{EditOperation, EditStream};
pub use operator::{EditOperator, Nucleotide};
pub use reconcile::{ReconcileError, StreamReconciler};
