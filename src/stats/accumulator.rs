use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::config::VariantConfig;
use crate::edits::{EditOperator, EditStream, Nucleotide};

use super::{BaseCounts, DensityArrays, DensityTrack, Segment, SubstitutionCounts};

/// What [`VariantAccumulator::update`] did with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Every operation was counted.
    Counted,
    /// The stream was the invalid sentinel; nothing but the read counters
    /// changed.
    Invalid,
    /// An unsupported operator stopped the record. Operations before it
    /// remain counted.
    Unsupported(EditOperator),
}

impl RecordOutcome {
    /// Whether the record was counted as skipped.
    pub fn is_skipped(&self) -> bool {
        !matches!(self, Self::Counted)
    }
}

/// Derived totals. Unresolved insertions and deletions are excluded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "export", derive(serde::Serialize))]
pub struct Totals {
    /// All directed substitutions.
    pub substitutions: u64,
    /// Inserted A, C, G and T bases.
    pub insertions: u64,
    /// Deleted A, C, G and T bases.
    pub deletions: u64,
    /// Matching bases.
    pub matches: u64,
    /// `substitutions + insertions + deletions + matches`.
    pub grand_total: u64,
}

/// Genome-wide and per-position statistics over a stream of records.
///
/// One instance serves one sequential scan; `update` takes `&mut self` and
/// there is no internal locking.
#[derive(Debug, Clone)]
pub struct VariantAccumulator {
    initial_length: usize,
    substitutions: SubstitutionCounts,
    insertions: BaseCounts,
    deletions: BaseCounts,
    matches: u64,
    reference_gaps: u64,
    read_gaps: u64,
    skipped_reads: u64,
    total_reads: u64,
    density: DensityArrays,
    read_lengths: BTreeMap<usize, u64>,
    paired_reads: bool,
}

impl VariantAccumulator {
    /// Empty accumulator with density arrays of `initial_length` slots.
    pub fn new(initial_length: usize) -> Self {
        Self {
            initial_length,
            substitutions: SubstitutionCounts::new(),
            insertions: BaseCounts::new(),
            deletions: BaseCounts::new(),
            matches: 0,
            reference_gaps: 0,
            read_gaps: 0,
            skipped_reads: 0,
            total_reads: 0,
            density: DensityArrays::new(initial_length),
            read_lengths: BTreeMap::new(),
            paired_reads: false,
        }
    }

    /// Empty accumulator sized from the configuration.
    pub fn from_config(config: &VariantConfig) -> Self {
        Self::new(config.position_length)
    }

    /// Return to the freshly constructed state.
    pub fn reset(&mut self) {
        *self = Self::new(self.initial_length);
    }

    /// Fold one record's edit stream into the statistics.
    ///
    /// Every call counts as a processed read. The invalid sentinel and
    /// streams holding an unsupported operator also count as skipped; in the
    /// latter case the operations before the unsupported one stay counted.
    pub fn update(
        &mut self,
        stream: &EditStream,
        is_first_segment: bool,
        read_length: usize,
    ) -> RecordOutcome {
        self.total_reads += 1;
        if stream.is_invalid() {
            self.skipped_reads += 1;
            return RecordOutcome::Invalid;
        }

        let segment = Segment::from_first_flag(is_first_segment);
        let mut position = 0usize;

        for op in stream {
            let len = op.length() as usize;
            let operator = op.operator();
            if operator.advances_position() {
                self.density.ensure_capacity(position + len);
            }
            match operator {
                EditOperator::Match => {
                    self.matches += len as u64;
                    for pos in position..position + len {
                        self.density.increment(DensityTrack::Match, pos);
                    }
                    position += len;
                }
                EditOperator::Mismatch => {
                    for (reference, read) in op.base_pairs() {
                        self.record_substitution(reference, read, segment, position);
                        position += 1;
                    }
                }
                EditOperator::Insertion => {
                    let track = DensityTrack::insertion(segment);
                    for &base in op.bases() {
                        self.insertions.record(base);
                        if !base.is_unresolved() {
                            self.density.increment(track, position);
                        }
                        position += 1;
                    }
                }
                EditOperator::Deletion => {
                    let track = DensityTrack::deletion(segment);
                    for &base in op.bases() {
                        self.deletions.record(base);
                        if !base.is_unresolved() {
                            self.density.increment(track, position);
                        }
                        position += 1;
                    }
                }
                unsupported @ (EditOperator::SkippedRegion
                | EditOperator::SoftClip
                | EditOperator::HardClip
                | EditOperator::Padding
                | EditOperator::SequenceMatch
                | EditOperator::SequenceMismatch) => {
                    debug!(operator = %unsupported, position, "unsupported operator, skipping read");
                    self.skipped_reads += 1;
                    return RecordOutcome::Unsupported(unsupported);
                }
            }
        }

        *self.read_lengths.entry(read_length).or_insert(0) += 1;
        if segment == Segment::Second {
            self.paired_reads = true;
        }
        trace!(read_length, positions = position, "counted read");
        RecordOutcome::Counted
    }

    fn record_substitution(
        &mut self,
        reference: Nucleotide,
        read: Nucleotide,
        segment: Segment,
        position: usize,
    ) {
        match (reference.index(), read.index()) {
            (None, _) => self.reference_gaps += 1,
            (_, None) => self.read_gaps += 1,
            (Some(r), Some(q)) if r != q => {
                self.substitutions.record(r, q);
                self.density.increment(DensityTrack::snp(segment), position);
            }
            // identical bases are not a substitution
            _ => {}
        }
    }

    /// Rebuild the positional totals array and return the derived totals.
    ///
    /// Totals are also kept current by every `update`, so calling this
    /// repeatedly without intervening updates always gives the same result.
    pub fn compute_totals(&mut self) -> Totals {
        self.density.recompute_totals();
        self.totals()
    }

    /// Derived totals from the current counters.
    pub fn totals(&self) -> Totals {
        let substitutions = self.substitutions.total();
        let insertions = self.insertions.total();
        let deletions = self.deletions.total();
        Totals {
            substitutions,
            insertions,
            deletions,
            matches: self.matches,
            grand_total: substitutions + insertions + deletions + self.matches,
        }
    }

    /// Directed substitution counters.
    pub fn substitutions(&self) -> &SubstitutionCounts {
        &self.substitutions
    }

    /// Count of one directed substitution.
    pub fn substitution(&self, reference: Nucleotide, read: Nucleotide) -> u64 {
        self.substitutions.get(reference, read)
    }

    /// Inserted-base counters.
    pub fn insertions(&self) -> &BaseCounts {
        &self.insertions
    }

    /// Deleted-base counters.
    pub fn deletions(&self) -> &BaseCounts {
        &self.deletions
    }

    /// Matching bases.
    pub fn matches(&self) -> u64 {
        self.matches
    }

    /// Mismatches whose reference side was unresolved.
    pub fn reference_gaps(&self) -> u64 {
        self.reference_gaps
    }

    /// Mismatches whose read side was unresolved.
    pub fn read_gaps(&self) -> u64 {
        self.read_gaps
    }

    /// Records rejected from the statistics.
    pub fn skipped_reads(&self) -> u64 {
        self.skipped_reads
    }

    /// Records offered to [`update`](Self::update).
    pub fn total_reads(&self) -> u64 {
        self.total_reads
    }

    /// Per-position arrays.
    pub fn density(&self) -> &DensityArrays {
        &self.density
    }

    /// Read length → number of counted reads of that length.
    pub fn read_length_histogram(&self) -> &BTreeMap<usize, u64> {
        &self.read_lengths
    }

    /// Whether any counted read was a second segment.
    pub fn has_paired_reads(&self) -> bool {
        self.paired_reads
    }

    /// Density array length used at construction and reset.
    pub fn initial_length(&self) -> usize {
        self.initial_length
    }
}
