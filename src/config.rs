//! Resolved run parameters.

use crate::VariantQcError;

/// Warning and error limits for a maximum per-position frequency (percent).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "export", derive(serde::Serialize))]
pub struct Thresholds {
    /// Frequencies above this raise a warning.
    pub warn: f64,
    /// Frequencies above this fail the check.
    pub error: f64,
}

impl Thresholds {
    /// Construct a threshold pair.
    pub const fn new(warn: f64, error: f64) -> Self {
        Self { warn, error }
    }

    fn validate(&self, name: &str) -> Result<(), VariantQcError> {
        let valid = self.warn.is_finite()
            && self.error.is_finite()
            && self.warn >= 0.0
            && self.warn <= self.error;
        if valid {
            Ok(())
        } else {
            Err(VariantQcError::InvalidConfiguration(format!(
                "{name} thresholds must satisfy 0 <= warn <= error (got warn {}, error {})",
                self.warn, self.error
            )))
        }
    }
}

/// Parameters for one variant statistics run.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantConfig {
    /// Initial length of the per-position density arrays.
    pub position_length: usize,
    /// Limits for per-position SNP frequencies.
    pub snp_thresholds: Thresholds,
    /// Limits for per-position insertion/deletion frequencies.
    pub indel_thresholds: Thresholds,
    /// Read lengths seen in fewer than this percentage of the most common
    /// length's reads do not extend the reported positions.
    pub xaxis_threshold_percent: f64,
    /// Put reverse-strand reads back into sequencing order.
    pub orient_by_strand: bool,
    /// Offer unmapped records to the accumulator (they end up skipped).
    pub include_unmapped: bool,
    /// Offer secondary and supplementary alignments to the accumulator.
    pub include_secondary: bool,
}

impl Default for VariantConfig {
    fn default() -> Self {
        Self {
            position_length: 100,
            snp_thresholds: Thresholds::new(0.5, 1.0),
            indel_thresholds: Thresholds::new(0.5, 1.0),
            xaxis_threshold_percent: 50.0,
            orient_by_strand: true,
            include_unmapped: false,
            include_secondary: false,
        }
    }
}

impl VariantConfig {
    /// Set the initial density array length.
    pub fn with_position_length(mut self, position_length: usize) -> Self {
        self.position_length = position_length;
        self
    }

    /// Set SNP frequency thresholds.
    pub fn with_snp_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.snp_thresholds = thresholds;
        self
    }

    /// Set indel frequency thresholds.
    pub fn with_indel_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.indel_thresholds = thresholds;
        self
    }

    /// Set the read-length support percentage.
    pub fn with_xaxis_threshold_percent(mut self, percent: f64) -> Self {
        self.xaxis_threshold_percent = percent;
        self
    }

    /// Enable or disable strand orientation.
    pub fn with_orient_by_strand(mut self, enabled: bool) -> Self {
        self.orient_by_strand = enabled;
        self
    }

    /// Enable or disable unmapped records.
    pub fn with_include_unmapped(mut self, enabled: bool) -> Self {
        self.include_unmapped = enabled;
        self
    }

    /// Enable or disable secondary/supplementary records.
    pub fn with_include_secondary(mut self, enabled: bool) -> Self {
        self.include_secondary = enabled;
        self
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<(), VariantQcError> {
        if self.position_length == 0 {
            return Err(VariantQcError::InvalidConfiguration(
                "position length must be > 0".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&self.xaxis_threshold_percent) {
            return Err(VariantQcError::InvalidConfiguration(format!(
                "x-axis threshold must be within 0..=100 (got {})",
                self.xaxis_threshold_percent
            )));
        }
        self.snp_thresholds.validate("SNP")?;
        self.indel_thresholds.validate("indel")?;
        Ok(())
    }
}
