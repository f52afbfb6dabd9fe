//! Whole-file driver: record filtering, reconciliation and accumulation.

use tracing::{info, trace};

use crate::config::VariantConfig;
use crate::edits::StreamReconciler;
use crate::io::AlignmentRecord;
use crate::report::VariantReport;
use crate::stats::{ReadFlagStatistics, RecordOutcome, VariantAccumulator};
use crate::VariantQcError;

/// One sequential variant statistics scan.
#[derive(Debug, Clone)]
pub struct VariantAnalysis {
    config: VariantConfig,
    reconciler: StreamReconciler,
    accumulator: VariantAccumulator,
    flags: ReadFlagStatistics,
    filtered: u64,
}

impl VariantAnalysis {
    /// Validate the configuration and set up an empty scan.
    pub fn new(config: VariantConfig) -> Result<Self, VariantQcError> {
        config.validate()?;
        Ok(Self {
            accumulator: VariantAccumulator::from_config(&config),
            config,
            reconciler: StreamReconciler::new(),
            flags: ReadFlagStatistics::new(),
            filtered: 0,
        })
    }

    /// Feed one record. Returns `None` when the record was filtered out
    /// before reaching the accumulator.
    pub fn process(&mut self, record: &AlignmentRecord) -> Option<RecordOutcome> {
        self.flags.observe(record.flags);

        if (record.is_unmapped() && !self.config.include_unmapped)
            || (record.is_secondary() && !self.config.include_secondary)
        {
            self.filtered += 1;
            return None;
        }

        // walk the whole CIGAR so the stopping point is chosen after
        // orientation, in sequencing order
        let stream = self.reconciler.reconcile_complete(
            &record.cigar,
            record.md.as_deref(),
            &record.sequence,
        );
        let stream = if self.config.orient_by_strand && record.is_reverse() {
            stream.to_read_orientation()
        } else {
            stream
        };

        let outcome =
            self.accumulator
                .update(&stream, record.is_first_segment(), record.read_length);
        if outcome.is_skipped() {
            trace!(read = %record.name, ?outcome, "read skipped");
        }
        Some(outcome)
    }

    /// Drive a whole record source, then refresh the totals.
    ///
    /// Stops at the first source error; per-record conditions never stop
    /// the scan.
    pub fn run<I>(&mut self, records: I) -> Result<(), VariantQcError>
    where
        I: IntoIterator<Item = Result<AlignmentRecord, VariantQcError>>,
    {
        for record in records {
            self.process(&record?);
        }
        let totals = self.accumulator.compute_totals();

        info!(
            reads = self.flags.reads(),
            filtered = self.filtered,
            counted = self.accumulator.total_reads() - self.accumulator.skipped_reads(),
            skipped = self.accumulator.skipped_reads(),
            "scan complete"
        );
        info!(
            substitutions = totals.substitutions,
            insertions = totals.insertions,
            deletions = totals.deletions,
            matches = totals.matches,
            unresolved_insertions = self.accumulator.insertions().unresolved(),
            unresolved_deletions = self.accumulator.deletions().unresolved(),
            reference_gaps = self.accumulator.reference_gaps(),
            read_gaps = self.accumulator.read_gaps(),
            "variant totals"
        );
        Ok(())
    }

    /// Summarise the statistics gathered so far.
    pub fn report(&self) -> VariantReport {
        VariantReport::build(&self.accumulator, &self.flags, &self.config)
    }

    /// Start over with the same configuration.
    pub fn reset(&mut self) {
        self.accumulator.reset();
        self.flags.reset();
        self.filtered = 0;
    }

    /// Accumulated variant statistics.
    pub fn accumulator(&self) -> &VariantAccumulator {
        &self.accumulator
    }

    /// Accumulated flag statistics.
    pub fn flag_statistics(&self) -> &ReadFlagStatistics {
        &self.flags
    }

    /// Records filtered out before accumulation.
    pub fn filtered_records(&self) -> u64 {
        self.filtered
    }

    /// Active configuration.
    pub fn config(&self) -> &VariantConfig {
        &self.config
    }
}
