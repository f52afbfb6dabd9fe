//! # Variant statistics from CIGAR and MD annotations
//!
//! Reconstructs, per aligned read, one stream of matches, substitutions,
//! insertions and deletions from two partially redundant annotations, then
//! aggregates genome-wide and per-read-position statistics over a whole
//! alignment file.
//!
//! ## Pipeline
//!
//! 1. **Reconcile**: [`StreamReconciler`] merges a record's CIGAR string and
//!    MD tag into an [`EditStream`], or the invalid sentinel when the two
//!    disagree.
//! 2. **Accumulate**: [`VariantAccumulator::update`] folds each stream into
//!    directed substitution counters, per-base indel counters and
//!    per-position density arrays that grow on demand.
//! 3. **Report**: [`report::VariantReport`] derives per-position
//!    frequencies and threshold checks for downstream presentation.
//!
//! ## Usage Example
//!
//! ```
//! use variantqc::{StreamReconciler, VariantAccumulator};
//!
//! let reconciler = StreamReconciler::new();
//! let stream = reconciler.reconcile("10M", Some("5A4"), b"AAAAACAAAA");
//!
//! let mut accumulator = VariantAccumulator::new(100);
//! accumulator.update(&stream, true, 10);
//! let totals = accumulator.compute_totals();
//! assert_eq!(totals.substitutions, 1);
//! assert_eq!(totals.matches, 9);
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

pub mod analysis; // Whole-file driver
pub mod config; // Resolved run parameters
pub mod edits; // Edit operations and CIGAR/MD reconciliation
pub mod io; // Alignment record source
pub mod report; // Frequency summaries and text output
pub mod stats; // Incremental statistics engine

// Re-exports for convenience
pub use analysis::VariantAnalysis;
pub use config::{Thresholds, VariantConfig};
pub use edits::{
    EditOperation, EditOperator, EditStream, Nucleotide, ReconcileError, StreamReconciler,
};
pub use io::{AlignmentRecord, BamRecordSource};
pub use stats::{RecordOutcome, Totals, VariantAccumulator};

use thiserror::Error;

/// Errors surfaced by configuration and I/O.
///
/// Per-record annotation problems never appear here; they turn into skipped
/// reads.
#[derive(Error, Debug)]
pub enum VariantQcError {
    /// A configuration parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// htslib failed to open or decode an alignment file.
    #[error("alignment input error: {0}")]
    Htslib(#[from] rust_htslib::errors::Error),

    /// Writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
