use std::collections::BTreeMap;
use std::fmt;

use crate::config::Thresholds;
use crate::edits::Nucleotide;
use crate::stats::{DensityTrack, SubstitutionCounts, VariantAccumulator};

/// Positions are always reported up to at least this read length.
const MIN_REPORTED_LENGTH: usize = 5;

/// Outcome of comparing a maximum frequency with its thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "export", derive(serde::Serialize))]
pub enum QcStatus {
    /// At or below the warning threshold.
    Pass,
    /// Above the warning threshold.
    Warn,
    /// Above the error threshold.
    Fail,
}

impl QcStatus {
    /// Classify `max_frequency` (percent).
    pub fn classify(max_frequency: f64, thresholds: &Thresholds) -> Self {
        if max_frequency > thresholds.error {
            Self::Fail
        } else if max_frequency > thresholds.warn {
            Self::Warn
        } else {
            Self::Pass
        }
    }
}

impl fmt::Display for QcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pass => "PASS",
            Self::Warn => "WARN",
            Self::Fail => "FAIL",
        };
        f.write_str(label)
    }
}

/// Number of read positions with enough supporting reads to report.
///
/// A read length counts when its reads number at least `percent`% of the
/// most common length's reads. The result is the longest such length (never
/// below 5) plus one.
pub fn supported_positions(histogram: &BTreeMap<usize, u64>, percent: f64) -> usize {
    let most_frequent = histogram.values().copied().max().unwrap_or(0);
    let threshold = most_frequent as f64 * percent / 100.0;
    let longest = histogram
        .iter()
        .filter(|&(_, &count)| count as f64 >= threshold)
        .map(|(&length, _)| length)
        .fold(MIN_REPORTED_LENGTH, usize::max);
    longest + 1
}

fn percent(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

/// `numerator(pos)` as a percentage of the positional total, for the first
/// `positions` positions.
fn positional_percentages(
    accumulator: &VariantAccumulator,
    positions: usize,
    numerator: impl Fn(usize) -> u64,
) -> Vec<f64> {
    let totals = accumulator.density().totals();
    (0..positions)
        .map(|pos| match totals.get(pos) {
            Some(&total) => percent(numerator(pos), total),
            None => 0.0,
        })
        .collect()
}

fn max_of(series: &[&[f64]]) -> f64 {
    series
        .iter()
        .flat_map(|values| values.iter().copied())
        .fold(0.0, f64::max)
}

/// Per-position substitution frequencies.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "export", derive(serde::Serialize))]
pub struct SnpFrequencies {
    /// First-segment SNP percentage per position.
    pub first: Vec<f64>,
    /// Second-segment SNP percentage per position.
    pub second: Vec<f64>,
    /// Substitutions as a percentage of all counted bases.
    pub total_percent: f64,
    /// Largest per-position percentage.
    pub max_frequency: f64,
    /// Threshold check on `max_frequency`.
    pub status: QcStatus,
}

impl SnpFrequencies {
    /// Derive from the accumulator over the first `positions` positions.
    pub fn from_accumulator(
        accumulator: &VariantAccumulator,
        positions: usize,
        thresholds: &Thresholds,
    ) -> Self {
        let density = accumulator.density();
        let first = positional_percentages(accumulator, positions, |pos| {
            density.track(DensityTrack::FirstSnp)[pos]
        });
        let second = positional_percentages(accumulator, positions, |pos| {
            density.track(DensityTrack::SecondSnp)[pos]
        });
        let max_frequency = max_of(&[first.as_slice(), second.as_slice()]);
        let totals = accumulator.totals();
        Self {
            first,
            second,
            total_percent: percent(totals.substitutions, totals.grand_total),
            max_frequency,
            status: QcStatus::classify(max_frequency, thresholds),
        }
    }
}

/// Per-position insertion and deletion frequencies, both segments summed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "export", derive(serde::Serialize))]
pub struct IndelFrequencies {
    /// Insertion percentage per position.
    pub insertions: Vec<f64>,
    /// Deletion percentage per position.
    pub deletions: Vec<f64>,
    /// Insertions as a percentage of all counted bases.
    pub insertion_percent: f64,
    /// Deletions as a percentage of all counted bases.
    pub deletion_percent: f64,
    /// Largest per-position percentage.
    pub max_frequency: f64,
    /// Threshold check on `max_frequency`.
    pub status: QcStatus,
}

impl IndelFrequencies {
    /// Derive from the accumulator over the first `positions` positions.
    pub fn from_accumulator(
        accumulator: &VariantAccumulator,
        positions: usize,
        thresholds: &Thresholds,
    ) -> Self {
        let density = accumulator.density();
        let insertions = positional_percentages(accumulator, positions, |pos| {
            density.track(DensityTrack::FirstInsertion)[pos]
                + density.track(DensityTrack::SecondInsertion)[pos]
        });
        let deletions = positional_percentages(accumulator, positions, |pos| {
            density.track(DensityTrack::FirstDeletion)[pos]
                + density.track(DensityTrack::SecondDeletion)[pos]
        });
        let max_frequency = max_of(&[insertions.as_slice(), deletions.as_slice()]);
        let totals = accumulator.totals();
        Self {
            insertions,
            deletions,
            insertion_percent: percent(totals.insertions, totals.grand_total),
            deletion_percent: percent(totals.deletions, totals.grand_total),
            max_frequency,
            status: QcStatus::classify(max_frequency, thresholds),
        }
    }
}

/// One directed substitution and its share of all substitutions.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "export", derive(serde::Serialize))]
pub struct SubstitutionShare {
    /// Reference base.
    pub reference: Nucleotide,
    /// Read base.
    pub read: Nucleotide,
    /// Occurrences.
    pub count: u64,
    /// Percentage of all substitutions.
    pub percent: f64,
}

/// The 12 directed substitutions with their relative shares.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "export", derive(serde::Serialize))]
pub struct SubstitutionSpectrum {
    /// Entries in the order A→C, A→G, … T→G.
    pub entries: Vec<SubstitutionShare>,
}

impl SubstitutionSpectrum {
    /// Build from directed counts.
    pub fn from_counts(counts: &SubstitutionCounts) -> Self {
        let total = counts.total();
        Self {
            entries: counts
                .iter()
                .map(|(reference, read, count)| SubstitutionShare {
                    reference,
                    read,
                    count,
                    percent: percent(count, total),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edits::{EditOperation, EditStream};

    #[test]
    fn supported_positions_ignores_rare_lengths() {
        let histogram = BTreeMap::from([(50, 100), (75, 60), (150, 10)]);
        assert_eq!(supported_positions(&histogram, 50.0), 76);
        assert_eq!(supported_positions(&histogram, 0.0), 151);
    }

    #[test]
    fn supported_positions_has_a_floor() {
        assert_eq!(supported_positions(&BTreeMap::new(), 50.0), 6);
        assert_eq!(supported_positions(&BTreeMap::from([(3, 4)]), 50.0), 6);
    }

    #[test]
    fn status_uses_strict_comparisons() {
        let thresholds = Thresholds::new(0.5, 1.0);
        assert_eq!(QcStatus::classify(0.5, &thresholds), QcStatus::Pass);
        assert_eq!(QcStatus::classify(0.75, &thresholds), QcStatus::Warn);
        assert_eq!(QcStatus::classify(1.0, &thresholds), QcStatus::Warn);
        assert_eq!(QcStatus::classify(1.5, &thresholds), QcStatus::Fail);
    }

    #[test]
    fn indel_frequencies_sum_segments() {
        let mut acc = VariantAccumulator::new(8);
        let mut first = EditStream::new();
        first.push(EditOperation::matched(1));
        first.push(EditOperation::insertion(vec![Nucleotide::A]));
        let mut second = EditStream::new();
        second.push(EditOperation::matched(1));
        second.push(EditOperation::insertion(vec![Nucleotide::C]));
        let mut plain = EditStream::new();
        plain.push(EditOperation::matched(2));

        acc.update(&first, true, 1);
        acc.update(&second, false, 1);
        acc.update(&plain, true, 2);
        acc.compute_totals();

        let indels = IndelFrequencies::from_accumulator(&acc, 3, &Thresholds::new(0.5, 1.0));
        assert_eq!(indels.insertions.len(), 3);
        assert!((indels.insertions[1] - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(indels.deletions[1], 0.0);
        assert_eq!(indels.insertions[2], 0.0);
        assert_eq!(indels.status, QcStatus::Fail);
    }
}
