//! Read-only summaries derived from accumulated statistics.
//!
//! Nothing here mutates the accumulator; build a [`VariantReport`] after the
//! scan and render it with [`write_report`] or [`render_report`].

mod frequencies;
mod render;

pub use frequencies::{
    supported_positions, IndelFrequencies, QcStatus, SnpFrequencies, SubstitutionShare,
    SubstitutionSpectrum,
};
pub use render::{render_report, write_report};

use crate::config::VariantConfig;
use crate::edits::Nucleotide;
use crate::stats::{ReadFlagStatistics, Totals, VariantAccumulator};

/// Per-base insertion and deletion counts, `N` included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "export", derive(serde::Serialize))]
pub struct IndelBaseCount {
    /// Base.
    pub base: Nucleotide,
    /// Inserted occurrences.
    pub insertions: u64,
    /// Deleted occurrences.
    pub deletions: u64,
}

/// Everything a downstream consumer needs from one run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "export", derive(serde::Serialize))]
pub struct VariantReport {
    /// Records offered to the accumulator.
    pub total_reads: u64,
    /// Records rejected from the statistics.
    pub skipped_reads: u64,
    /// Whether second-segment reads were counted.
    pub paired_reads: bool,
    /// Derived totals.
    pub totals: Totals,
    /// Mismatches with an unresolved reference side.
    pub reference_gaps: u64,
    /// Mismatches with an unresolved read side.
    pub read_gaps: u64,
    /// Per-base indel counts in the order A, C, G, T, N.
    pub indel_bases: Vec<IndelBaseCount>,
    /// Directed substitution shares.
    pub substitutions: SubstitutionSpectrum,
    /// Number of read positions reported.
    pub positions: usize,
    /// Per-position SNP frequencies.
    pub snp: SnpFrequencies,
    /// Per-position indel frequencies.
    pub indels: IndelFrequencies,
    /// SAM flag summary.
    pub flags: ReadFlagStatistics,
}

impl VariantReport {
    /// Summarise an accumulator and its flag statistics.
    pub fn build(
        accumulator: &VariantAccumulator,
        flags: &ReadFlagStatistics,
        config: &VariantConfig,
    ) -> Self {
        let positions = supported_positions(
            accumulator.read_length_histogram(),
            config.xaxis_threshold_percent,
        );
        let indel_bases = Nucleotide::ACGT
            .into_iter()
            .chain(std::iter::once(Nucleotide::N))
            .map(|base| IndelBaseCount {
                base,
                insertions: accumulator.insertions().get(base),
                deletions: accumulator.deletions().get(base),
            })
            .collect();

        Self {
            total_reads: accumulator.total_reads(),
            skipped_reads: accumulator.skipped_reads(),
            paired_reads: accumulator.has_paired_reads(),
            totals: accumulator.totals(),
            reference_gaps: accumulator.reference_gaps(),
            read_gaps: accumulator.read_gaps(),
            indel_bases,
            substitutions: SubstitutionSpectrum::from_counts(accumulator.substitutions()),
            positions,
            snp: SnpFrequencies::from_accumulator(accumulator, positions, &config.snp_thresholds),
            indels: IndelFrequencies::from_accumulator(
                accumulator,
                positions,
                &config.indel_thresholds,
            ),
            flags: flags.clone(),
        }
    }

    /// Skipped reads as a percentage of all offered reads.
    pub fn skipped_percent(&self) -> f64 {
        if self.total_reads == 0 {
            0.0
        } else {
            self.skipped_reads as f64 * 100.0 / self.total_reads as f64
        }
    }

    /// Worst status across the SNP and indel checks.
    pub fn overall_status(&self) -> QcStatus {
        [self.snp.status, self.indels.status]
            .into_iter()
            .max_by_key(|status| match status {
                QcStatus::Pass => 0,
                QcStatus::Warn => 1,
                QcStatus::Fail => 2,
            })
            .unwrap_or(QcStatus::Pass)
    }
}
