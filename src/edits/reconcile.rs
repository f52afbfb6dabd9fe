//! Merge a CIGAR string and an MD annotation into one [`EditStream`].
//!
//! The CIGAR tells which read bases align, are inserted or are clipped; the
//! MD tag tells which aligned bases differ from the reference and which
//! reference bases were deleted. Neither is complete on its own:
//!
//! - a CIGAR `M` run is split by the MD distances into match pieces and
//!   single-base mismatches, the read side of each mismatch coming from the
//!   read sequence;
//! - a CIGAR `I` run takes its bases from the read sequence;
//! - a CIGAR `D` run takes its bases from the MD `^` run at the same place.
//!
//! Both encodings must agree on the number of reference bases consumed.

use thiserror::Error;
use tracing::{debug, trace};

use super::{EditOperation, EditOperator, EditStream, Nucleotide};

/// Reasons a record's annotations cannot be reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// The record carries no MD tag.
    #[error("missing MD annotation")]
    MissingAnnotation,

    /// The CIGAR string does not parse.
    #[error("malformed CIGAR '{cigar}' at byte {offset}")]
    MalformedCigar {
        /// Offending CIGAR string.
        cigar: String,
        /// Byte offset of the first bad character.
        offset: usize,
    },

    /// The MD tag does not parse.
    #[error("malformed MD annotation '{annotation}' at byte {offset}")]
    MalformedAnnotation {
        /// Offending MD tag.
        annotation: String,
        /// Byte offset of the first bad character.
        offset: usize,
    },

    /// CIGAR and MD disagree on the reference length.
    #[error("MD annotation spans {annotated} reference bases but CIGAR consumes {expected}")]
    ReferenceLengthMismatch {
        /// Reference bases consumed according to the CIGAR.
        expected: u64,
        /// Reference bases accounted for by the MD tag.
        annotated: u64,
    },

    /// A CIGAR deletion is not matched by an MD `^` run of the same length,
    /// or an MD `^` run appears inside an aligned block.
    #[error("CIGAR deletion of {expected} bases does not line up with MD deletion of {annotated}")]
    MisalignedDeletion {
        /// Length of the CIGAR `D` run (0 when the MD run was unexpected).
        expected: u32,
        /// Length of the MD `^` run (0 when none was found).
        annotated: u32,
    },

    /// The read sequence is shorter than the CIGAR implies.
    #[error("read offset {needed} beyond read sequence of length {available}")]
    ReadOverrun {
        /// Read bases required.
        needed: usize,
        /// Read bases available.
        available: usize,
    },

    /// MD marks a mismatch where the read carries the reference base.
    #[error("MD mismatch at read offset {offset} agrees with reference base {base}")]
    ConcordantMismatch {
        /// 0-based read offset.
        offset: usize,
        /// Base shared by read and reference.
        base: Nucleotide,
    },
}

/// Stateless CIGAR/MD reconciler.
///
/// Holds no mutable state, so one instance can be shared across threads
/// decoding independent records.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamReconciler;

impl StreamReconciler {
    /// Create a new reconciler.
    pub fn new() -> Self {
        Self
    }

    /// Reconcile one record, collapsing every failure into
    /// [`EditStream::invalid`].
    pub fn reconcile(&self, cigar: &str, md: Option<&str>, read_bases: &[u8]) -> EditStream {
        collapse(self.try_reconcile(cigar, md, read_bases), cigar, md)
    }

    /// Reconcile one record, reporting why it failed.
    ///
    /// Processing stops after the first unsupported operator, which is
    /// emitted as the last operation of the stream. Reference and read
    /// lengths are checked against the whole CIGAR beforehand, so an
    /// annotation that disagrees past the stopping point is still rejected.
    pub fn try_reconcile(
        &self,
        cigar: &str,
        md: Option<&str>,
        read_bases: &[u8],
    ) -> Result<EditStream, ReconcileError> {
        self.walk(cigar, md, read_bases, true)
    }

    /// Like [`reconcile`](Self::reconcile) but keeps walking past
    /// unsupported operators, so the stream covers the whole CIGAR.
    ///
    /// Use this when the stream is reoriented before accumulation: where a
    /// read stops counting then depends on sequencing order, not on the
    /// strand it mapped to.
    pub fn reconcile_complete(
        &self,
        cigar: &str,
        md: Option<&str>,
        read_bases: &[u8],
    ) -> EditStream {
        collapse(self.try_reconcile_complete(cigar, md, read_bases), cigar, md)
    }

    /// Fallible form of [`reconcile_complete`](Self::reconcile_complete).
    pub fn try_reconcile_complete(
        &self,
        cigar: &str,
        md: Option<&str>,
        read_bases: &[u8],
    ) -> Result<EditStream, ReconcileError> {
        self.walk(cigar, md, read_bases, false)
    }

    fn walk(
        &self,
        cigar: &str,
        md: Option<&str>,
        read_bases: &[u8],
        stop_at_unsupported: bool,
    ) -> Result<EditStream, ReconcileError> {
        let ops = parse_cigar(cigar)?;
        let md = md.ok_or(ReconcileError::MissingAnnotation)?;
        let tokens = parse_md(md)?;

        // MD says nothing about skipped regions
        let expected: u64 = ops
            .iter()
            .filter(|(op, _)| op.consumes_reference() && *op != EditOperator::SkippedRegion)
            .map(|&(_, len)| len as u64)
            .sum();
        let annotated: u64 = tokens.iter().map(MdToken::reference_length).sum();
        if annotated != expected {
            return Err(ReconcileError::ReferenceLengthMismatch {
                expected,
                annotated,
            });
        }

        let needed: usize = ops
            .iter()
            .filter(|(op, _)| op.consumes_read())
            .map(|&(_, len)| len as usize)
            .sum();
        if needed > read_bases.len() {
            return Err(ReconcileError::ReadOverrun {
                needed,
                available: read_bases.len(),
            });
        }

        let mut cursor = MdCursor::new(tokens, expected);
        let mut stream = EditStream::with_capacity(ops.len());
        let mut read_offset = 0usize;

        for (op, len) in ops {
            match op {
                EditOperator::Match => {
                    let mut left = len;
                    while left > 0 {
                        match cursor.next_in_run(left)? {
                            RunStep::Matched(n) => {
                                stream.push(EditOperation::matched(n));
                                read_offset += n as usize;
                                left -= n;
                            }
                            RunStep::Mismatch(reference) => {
                                let read = read_base(read_bases, read_offset)?;
                                if reference == read && !reference.is_unresolved() {
                                    return Err(ReconcileError::ConcordantMismatch {
                                        offset: read_offset,
                                        base: reference,
                                    });
                                }
                                stream.push(EditOperation::mismatch(reference, read));
                                read_offset += 1;
                                left -= 1;
                            }
                        }
                    }
                }
                EditOperator::Insertion => {
                    let end = read_offset + len as usize;
                    let bases = read_bases.get(read_offset..end).ok_or(
                        ReconcileError::ReadOverrun {
                            needed: end,
                            available: read_bases.len(),
                        },
                    )?;
                    stream.push(EditOperation::insertion(
                        bases.iter().copied().map(Nucleotide::from_byte).collect(),
                    ));
                    read_offset = end;
                }
                EditOperator::Deletion => {
                    let bases = cursor.take_deletion(len)?;
                    stream.push(EditOperation::deletion(
                        bases.iter().copied().map(Nucleotide::from_byte).collect(),
                    ));
                }
                other => {
                    stream.push(EditOperation::unsupported(other, len));
                    if stop_at_unsupported {
                        return Ok(stream);
                    }
                    if other.consumes_reference() && other != EditOperator::SkippedRegion {
                        cursor.skip_aligned(len)?;
                    }
                    if other.consumes_read() {
                        read_offset += len as usize;
                    }
                }
            }
        }

        if !cursor.is_exhausted() {
            return Err(cursor.length_mismatch());
        }
        Ok(stream)
    }
}

fn collapse(
    result: Result<EditStream, ReconcileError>,
    cigar: &str,
    md: Option<&str>,
) -> EditStream {
    match result {
        Ok(stream) => {
            trace!(cigar, stream = %stream, "reconciled record");
            stream
        }
        Err(err) => {
            debug!(cigar, md = md.unwrap_or("*"), error = %err, "unreconcilable record");
            EditStream::invalid()
        }
    }
}

fn read_base(read_bases: &[u8], offset: usize) -> Result<Nucleotide, ReconcileError> {
    read_bases
        .get(offset)
        .copied()
        .map(Nucleotide::from_byte)
        .ok_or(ReconcileError::ReadOverrun {
            needed: offset + 1,
            available: read_bases.len(),
        })
}

/// Parse a CIGAR string into `(operator, length)` runs. Zero-length runs
/// are dropped.
fn parse_cigar(cigar: &str) -> Result<Vec<(EditOperator, u32)>, ReconcileError> {
    let malformed = |offset: usize| ReconcileError::MalformedCigar {
        cigar: cigar.to_string(),
        offset,
    };

    let bytes = cigar.as_bytes();
    if bytes.is_empty() || cigar == "*" {
        return Err(malformed(0));
    }

    let mut ops = Vec::new();
    let mut len: Option<u32> = None;
    for (i, &b) in bytes.iter().enumerate() {
        if b.is_ascii_digit() {
            let digit = (b - b'0') as u32;
            len = Some(
                len.unwrap_or(0)
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(digit))
                    .ok_or_else(|| malformed(i))?,
            );
            continue;
        }
        let op = EditOperator::from_cigar_byte(b).ok_or_else(|| malformed(i))?;
        let run = len.take().ok_or_else(|| malformed(i))?;
        if run > 0 {
            ops.push((op, run));
        }
    }

    if len.is_some() {
        return Err(malformed(bytes.len()));
    }
    Ok(ops)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MdToken<'a> {
    Matches(u32),
    Mismatch(Nucleotide),
    Deletion(&'a [u8]),
}

impl MdToken<'_> {
    fn reference_length(&self) -> u64 {
        match self {
            MdToken::Matches(n) => *n as u64,
            MdToken::Mismatch(_) => 1,
            MdToken::Deletion(bases) => bases.len() as u64,
        }
    }
}

fn parse_md(md: &str) -> Result<Vec<MdToken<'_>>, ReconcileError> {
    let malformed = |offset: usize| ReconcileError::MalformedAnnotation {
        annotation: md.to_string(),
        offset,
    };

    let bytes = md.as_bytes();
    if bytes.is_empty() {
        return Err(malformed(0));
    }

    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii_digit() {
            let mut n: u32 = 0;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                n = n
                    .checked_mul(10)
                    .and_then(|v| v.checked_add((bytes[i] - b'0') as u32))
                    .ok_or_else(|| malformed(i))?;
                i += 1;
            }
            tokens.push(MdToken::Matches(n));
        } else if b == b'^' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_alphabetic() {
                end += 1;
            }
            if end == start {
                return Err(malformed(i));
            }
            tokens.push(MdToken::Deletion(&bytes[start..end]));
            i = end;
        } else if b.is_ascii_alphabetic() {
            tokens.push(MdToken::Mismatch(Nucleotide::from_byte(b)));
            i += 1;
        } else {
            return Err(malformed(i));
        }
    }
    Ok(tokens)
}

enum RunStep {
    Matched(u32),
    Mismatch(Nucleotide),
}

/// Walks MD tokens while the CIGAR is consumed.
struct MdCursor<'a> {
    tokens: Vec<MdToken<'a>>,
    next: usize,
    pending_matches: u32,
    expected: u64,
}

impl<'a> MdCursor<'a> {
    fn new(tokens: Vec<MdToken<'a>>, expected: u64) -> Self {
        Self {
            tokens,
            next: 0,
            pending_matches: 0,
            expected,
        }
    }

    /// Next piece of an aligned run of at most `wanted` bases.
    fn next_in_run(&mut self, wanted: u32) -> Result<RunStep, ReconcileError> {
        loop {
            if self.pending_matches > 0 {
                let n = self.pending_matches.min(wanted);
                self.pending_matches -= n;
                return Ok(RunStep::Matched(n));
            }
            match self.tokens.get(self.next).copied() {
                Some(MdToken::Matches(n)) => {
                    self.pending_matches = n;
                    self.next += 1;
                }
                Some(MdToken::Mismatch(reference)) => {
                    self.next += 1;
                    return Ok(RunStep::Mismatch(reference));
                }
                Some(MdToken::Deletion(bases)) => {
                    return Err(ReconcileError::MisalignedDeletion {
                        expected: 0,
                        annotated: bases.len() as u32,
                    });
                }
                None => return Err(self.length_mismatch()),
            }
        }
    }

    /// Step over `len` aligned bases without emitting anything (`=`/`X`).
    fn skip_aligned(&mut self, len: u32) -> Result<(), ReconcileError> {
        let mut left = len;
        while left > 0 {
            left -= match self.next_in_run(left)? {
                RunStep::Matched(n) => n,
                RunStep::Mismatch(_) => 1,
            };
        }
        Ok(())
    }

    /// Bases of the MD `^` run that must sit at the current position.
    fn take_deletion(&mut self, len: u32) -> Result<&'a [u8], ReconcileError> {
        let misaligned = |annotated: u32| ReconcileError::MisalignedDeletion {
            expected: len,
            annotated,
        };
        if self.pending_matches > 0 {
            return Err(misaligned(0));
        }
        while let Some(MdToken::Matches(0)) = self.tokens.get(self.next) {
            self.next += 1;
        }
        match self.tokens.get(self.next).copied() {
            Some(MdToken::Deletion(bases)) if bases.len() == len as usize => {
                self.next += 1;
                Ok(bases)
            }
            Some(MdToken::Deletion(bases)) => Err(misaligned(bases.len() as u32)),
            Some(_) => Err(misaligned(0)),
            None => Err(self.length_mismatch()),
        }
    }

    fn is_exhausted(&self) -> bool {
        self.pending_matches == 0
            && self.tokens[self.next..]
                .iter()
                .all(|token| *token == MdToken::Matches(0))
    }

    fn length_mismatch(&self) -> ReconcileError {
        ReconcileError::ReferenceLengthMismatch {
            expected: self.expected,
            annotated: self.tokens.iter().map(MdToken::reference_length).sum(),
        }
    }
}
