use std::path::Path;

use rust_htslib::bam::{self, record::Aux, Read, Record};

use crate::VariantQcError;

const FLAG_PAIRED: u16 = 0x1;
const FLAG_UNMAPPED: u16 = 0x4;
const FLAG_REVERSE: u16 = 0x10;
const FLAG_FIRST_IN_TEMPLATE: u16 = 0x40;
const FLAG_SECONDARY: u16 = 0x100;
const FLAG_SUPPLEMENTARY: u16 = 0x800;

/// The parts of an alignment record the variant statistics consume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentRecord {
    /// Read name, for diagnostics.
    pub name: String,
    /// CIGAR string (`*` or empty when unavailable).
    pub cigar: String,
    /// MD tag, if present.
    pub md: Option<String>,
    /// Read bases as stored (upper or lower case ASCII).
    pub sequence: Vec<u8>,
    /// Read length.
    pub read_length: usize,
    /// SAM flag word.
    pub flags: u16,
}

impl AlignmentRecord {
    /// Construct a record; the read length is taken from `sequence`.
    pub fn new(
        name: impl Into<String>,
        cigar: impl Into<String>,
        md: Option<&str>,
        sequence: impl Into<Vec<u8>>,
        flags: u16,
    ) -> Self {
        let sequence = sequence.into();
        Self {
            name: name.into(),
            cigar: cigar.into(),
            md: md.map(str::to_string),
            read_length: sequence.len(),
            sequence,
            flags,
        }
    }

    /// First read of a pair, or an unpaired read.
    pub fn is_first_segment(&self) -> bool {
        self.flags & FLAG_PAIRED == 0 || self.flags & FLAG_FIRST_IN_TEMPLATE != 0
    }

    /// Aligned to the reverse strand.
    pub fn is_reverse(&self) -> bool {
        self.flags & FLAG_REVERSE != 0
    }

    /// Flagged as unmapped.
    pub fn is_unmapped(&self) -> bool {
        self.flags & FLAG_UNMAPPED != 0
    }

    /// Secondary or supplementary alignment.
    pub fn is_secondary(&self) -> bool {
        self.flags & (FLAG_SECONDARY | FLAG_SUPPLEMENTARY) != 0
    }

    fn from_htslib(record: &Record) -> Self {
        let md = match record.aux(b"MD") {
            Ok(Aux::String(md)) => Some(md.to_string()),
            _ => None,
        };
        Self {
            name: String::from_utf8_lossy(record.qname()).into_owned(),
            cigar: record.cigar().to_string(),
            md,
            sequence: record.seq().as_bytes(),
            read_length: record.seq_len(),
            flags: record.flags(),
        }
    }
}

/// Sequential reader over a SAM, BAM or CRAM file.
pub struct BamRecordSource {
    reader: bam::Reader,
    record: Record,
}

impl std::fmt::Debug for BamRecordSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BamRecordSource").finish_non_exhaustive()
    }
}

impl BamRecordSource {
    /// Open an alignment file; the format is detected by htslib.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, VariantQcError> {
        let reader = bam::Reader::from_path(path.as_ref())?;
        Ok(Self {
            reader,
            record: Record::new(),
        })
    }

    /// Decompress with additional htslib worker threads.
    pub fn with_threads(mut self, threads: usize) -> Result<Self, VariantQcError> {
        if threads > 0 {
            self.reader.set_threads(threads)?;
        }
        Ok(self)
    }
}

impl Iterator for BamRecordSource {
    type Item = Result<AlignmentRecord, VariantQcError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read(&mut self.record)? {
            Ok(()) => Some(Ok(AlignmentRecord::from_htslib(&self.record))),
            Err(err) => Some(Err(err.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpaired_reads_are_first_segment() {
        let record = AlignmentRecord::new("r1", "4M", Some("4"), b"ACGT".to_vec(), 0);
        assert!(record.is_first_segment());
        assert_eq!(record.read_length, 4);
    }

    #[test]
    fn second_mate_is_not_first_segment() {
        let record = AlignmentRecord::new("r1", "4M", Some("4"), b"ACGT".to_vec(), 0x1 | 0x80 | 0x10);
        assert!(!record.is_first_segment());
        assert!(record.is_reverse());
        assert!(!record.is_unmapped());
    }

    #[test]
    fn supplementary_counts_as_secondary() {
        let record = AlignmentRecord::new("r1", "4M", None, b"ACGT".to_vec(), 0x800);
        assert!(record.is_secondary());
    }
}
