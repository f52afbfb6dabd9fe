use std::fmt;

use super::{EditOperator, Nucleotide};

/// One contiguous span of a single edit kind.
///
/// Base payload by kind:
/// - [`EditOperator::Mismatch`]: `2 * length` bases, reference/read pairs
///   interleaved;
/// - [`EditOperator::Insertion`] / [`EditOperator::Deletion`]: `length`
///   bases;
/// - everything else: no bases.
///
/// Fields are private and each constructor builds one kind, so the payload
/// always matches the operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EditOperation {
    length: u32,
    operator: EditOperator,
    bases: Vec<Nucleotide>,
}

impl EditOperation {
    /// Run of `length` matching bases.
    pub fn matched(length: u32) -> Self {
        debug_assert!(length > 0);
        Self {
            length,
            operator: EditOperator::Match,
            bases: Vec::new(),
        }
    }

    /// Single substitution from `reference` to `read`.
    pub fn mismatch(reference: Nucleotide, read: Nucleotide) -> Self {
        Self::mismatches([(reference, read)])
    }

    /// Adjacent substitutions, one `(reference, read)` pair per position.
    pub fn mismatches(pairs: impl IntoIterator<Item = (Nucleotide, Nucleotide)>) -> Self {
        let bases: Vec<Nucleotide> = pairs
            .into_iter()
            .flat_map(|(reference, read)| [reference, read])
            .collect();
        debug_assert!(!bases.is_empty());
        Self {
            length: (bases.len() / 2) as u32,
            operator: EditOperator::Mismatch,
            bases,
        }
    }

    /// Bases present in the read only.
    pub fn insertion(bases: Vec<Nucleotide>) -> Self {
        Self::indel(EditOperator::Insertion, bases)
    }

    /// Reference bases missing from the read.
    pub fn deletion(bases: Vec<Nucleotide>) -> Self {
        Self::indel(EditOperator::Deletion, bases)
    }

    fn indel(operator: EditOperator, bases: Vec<Nucleotide>) -> Self {
        debug_assert!(!bases.is_empty());
        Self {
            length: bases.len() as u32,
            operator,
            bases,
        }
    }

    /// Span of an operator the statistics engine does not handle.
    pub fn unsupported(operator: EditOperator, length: u32) -> Self {
        debug_assert!(!operator.is_supported());
        Self {
            length,
            operator,
            bases: Vec::new(),
        }
    }

    /// Number of positions covered.
    #[inline]
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Edit kind.
    #[inline]
    pub fn operator(&self) -> EditOperator {
        self.operator
    }

    /// Raw base payload (see the type docs for the layout).
    #[inline]
    pub fn bases(&self) -> &[Nucleotide] {
        &self.bases
    }

    /// `(reference, read)` pairs of a mismatch; empty for any other kind.
    pub fn base_pairs(&self) -> impl DoubleEndedIterator<Item = (Nucleotide, Nucleotide)> + '_ {
        let pairs: &[Nucleotide] = if self.operator == EditOperator::Mismatch {
            self.bases.as_slice()
        } else {
            &[]
        };
        pairs.chunks_exact(2).map(|pair| (pair[0], pair[1]))
    }

    /// The same edit as seen from the opposite strand.
    pub fn reverse_complement(&self) -> Self {
        let bases = match self.operator {
            EditOperator::Mismatch => self
                .base_pairs()
                .rev()
                .flat_map(|(reference, read)| [reference.complement(), read.complement()])
                .collect(),
            _ => self.bases.iter().rev().map(|b| b.complement()).collect(),
        };
        Self {
            length: self.length,
            operator: self.operator,
            bases,
        }
    }
}

impl fmt::Display for EditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.length, self.operator)?;
        for base in &self.bases {
            write!(f, "{base}")?;
        }
        Ok(())
    }
}

/// Ordered edit operations reconstructed for one alignment record.
///
/// [`EditStream::invalid`] is the sentinel for a record whose annotations
/// could not be reconciled; it never carries operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditStream {
    operations: Vec<EditOperation>,
    invalid: bool,
}

impl EditStream {
    /// Empty, valid stream.
    pub fn new() -> Self {
        Self {
            operations: Vec::new(),
            invalid: false,
        }
    }

    /// Empty, valid stream with room for `capacity` operations.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            operations: Vec::with_capacity(capacity),
            invalid: false,
        }
    }

    /// Sentinel for an unusable record.
    pub fn invalid() -> Self {
        Self {
            operations: Vec::new(),
            invalid: true,
        }
    }

    /// Whether this is the unusable-record sentinel.
    #[inline]
    pub fn is_invalid(&self) -> bool {
        self.invalid
    }

    /// Append an operation. Appending to the sentinel is a no-op.
    pub fn push(&mut self, operation: EditOperation) {
        if self.invalid {
            return;
        }
        self.operations.push(operation);
    }

    /// Operations in read order.
    #[inline]
    pub fn operations(&self) -> &[EditOperation] {
        &self.operations
    }

    /// Iterate operations in order.
    pub fn iter(&self) -> std::slice::Iter<'_, EditOperation> {
        self.operations.iter()
    }

    /// Number of operations.
    #[inline]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the stream holds no operations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// First operation the statistics engine cannot handle, if any.
    pub fn first_unsupported(&self) -> Option<&EditOperation> {
        self.operations
            .iter()
            .find(|op| !op.operator().is_supported())
    }

    /// Reference bases spanned by the stream.
    pub fn reference_length(&self) -> u64 {
        self.operations
            .iter()
            .filter(|op| op.operator().consumes_reference())
            .map(|op| op.length() as u64)
            .sum()
    }

    /// Reverse the stream into sequencing order for a reverse-strand read,
    /// complementing every base.
    pub fn to_read_orientation(&self) -> Self {
        if self.invalid {
            return Self::invalid();
        }
        Self {
            operations: self
                .operations
                .iter()
                .rev()
                .map(EditOperation::reverse_complement)
                .collect(),
            invalid: false,
        }
    }
}

impl<'a> IntoIterator for &'a EditStream {
    type Item = &'a EditOperation;
    type IntoIter = std::slice::Iter<'a, EditOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

impl fmt::Display for EditStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in &self.operations {
            write!(f, "{op}")?;
        }
        Ok(())
    }
}
