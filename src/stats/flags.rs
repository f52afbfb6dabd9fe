const FLAG_PAIRED: u16 = 0x1;
const FLAG_PROPER_PAIR: u16 = 0x2;
const FLAG_UNMAPPED: u16 = 0x4;
const FLAG_QC_FAIL: u16 = 0x200;
const FLAG_DUPLICATE: u16 = 0x400;

/// Counts of SAM flag properties over every record seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "export", derive(serde::Serialize))]
pub struct ReadFlagStatistics {
    reads: u64,
    paired: u64,
    mapped: u64,
    proper_pairs: u64,
    qc_failed: u64,
    duplicates: u64,
}

impl ReadFlagStatistics {
    /// All counters at zero.
    pub fn new() -> Self {
        Self {
            reads: 0,
            paired: 0,
            mapped: 0,
            proper_pairs: 0,
            qc_failed: 0,
            duplicates: 0,
        }
    }

    /// Count one record's SAM flag word.
    pub fn observe(&mut self, flags: u16) {
        self.reads += 1;
        self.paired += u64::from(flags & FLAG_PAIRED != 0);
        self.mapped += u64::from(flags & FLAG_UNMAPPED == 0);
        self.proper_pairs += u64::from(flags & FLAG_PROPER_PAIR != 0);
        self.qc_failed += u64::from(flags & FLAG_QC_FAIL != 0);
        self.duplicates += u64::from(flags & FLAG_DUPLICATE != 0);
    }

    /// Zero every counter.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Records seen.
    pub fn reads(&self) -> u64 {
        self.reads
    }

    /// Records flagged as paired.
    pub fn paired(&self) -> u64 {
        self.paired
    }

    /// Records not flagged as unmapped.
    pub fn mapped(&self) -> u64 {
        self.mapped
    }

    /// Records flagged as properly paired.
    pub fn proper_pairs(&self) -> u64 {
        self.proper_pairs
    }

    /// Records failing vendor quality checks.
    pub fn qc_failed(&self) -> u64 {
        self.qc_failed
    }

    /// Records flagged as duplicates.
    pub fn duplicates(&self) -> u64 {
        self.duplicates
    }

    /// `count` as a percentage of all records, 0 when none were seen.
    pub fn percent_of_reads(&self, count: u64) -> f64 {
        if self.reads == 0 {
            0.0
        } else {
            count as f64 * 100.0 / self.reads as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_counted_independently() {
        let mut stats = ReadFlagStatistics::new();
        stats.observe(0x1 | 0x2 | 0x40);
        stats.observe(0x4);
        stats.observe(0x400 | 0x200);
        stats.observe(0);

        assert_eq!(stats.reads(), 4);
        assert_eq!(stats.paired(), 1);
        assert_eq!(stats.mapped(), 3);
        assert_eq!(stats.proper_pairs(), 1);
        assert_eq!(stats.qc_failed(), 1);
        assert_eq!(stats.duplicates(), 1);
        assert_eq!(stats.percent_of_reads(stats.mapped()), 75.0);
    }

    #[test]
    fn empty_percentages_are_zero() {
        let stats = ReadFlagStatistics::new();
        assert_eq!(stats.percent_of_reads(0), 0.0);
    }
}
