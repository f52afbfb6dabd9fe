use std::fmt;

/// Edit kinds carried by an [`EditOperation`](super::EditOperation).
///
/// The first four kinds feed the variant statistics. Every other kind is
/// unsupported: a stream containing one is rejected as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EditOperator {
    /// Run of bases identical between read and reference.
    Match = b'm',
    /// Single-base substitutions with their reference/read pairs.
    Mismatch = b'u',
    /// Bases present in the read only.
    Insertion = b'i',
    /// Bases present in the reference only.
    Deletion = b'd',
    /// Reference skip (`N`), typically an intron.
    SkippedRegion = b'n',
    /// Soft clip (`S`).
    SoftClip = b's',
    /// Hard clip (`H`).
    HardClip = b'h',
    /// Silent deletion from padded reference (`P`).
    Padding = b'p',
    /// Explicit sequence match (`=`).
    SequenceMatch = b'=',
    /// Explicit sequence mismatch (`X`).
    SequenceMismatch = b'x',
}

impl EditOperator {
    /// Map a CIGAR operation character onto the edit kind it introduces.
    ///
    /// `M` maps to [`EditOperator::Match`]; mismatches are only introduced
    /// by the MD annotation, never by the CIGAR itself.
    #[inline]
    pub const fn from_cigar_byte(b: u8) -> Option<Self> {
        match b {
            b'M' => Some(Self::Match),
            b'I' => Some(Self::Insertion),
            b'D' => Some(Self::Deletion),
            b'N' => Some(Self::SkippedRegion),
            b'S' => Some(Self::SoftClip),
            b'H' => Some(Self::HardClip),
            b'P' => Some(Self::Padding),
            b'=' => Some(Self::SequenceMatch),
            b'X' => Some(Self::SequenceMismatch),
            _ => None,
        }
    }

    /// Character used in the textual stream form (`5m1uAC4m`).
    #[inline]
    pub const fn symbol(self) -> char {
        self as u8 as char
    }

    /// Whether the statistics engine handles this kind.
    #[inline]
    pub const fn is_supported(self) -> bool {
        matches!(
            self,
            Self::Match | Self::Mismatch | Self::Insertion | Self::Deletion
        )
    }

    /// Whether each unit of this kind moves the intra-read position cursor.
    ///
    /// Deletions advance the cursor as well, so a deletion occupies its own
    /// slot in the density arrays.
    #[inline]
    pub const fn advances_position(self) -> bool {
        self.is_supported()
    }

    /// Whether the operation consumes reference bases.
    #[inline]
    pub const fn consumes_reference(self) -> bool {
        matches!(
            self,
            Self::Match
                | Self::Mismatch
                | Self::Deletion
                | Self::SkippedRegion
                | Self::SequenceMatch
                | Self::SequenceMismatch
        )
    }

    /// Whether the operation consumes bases of the read sequence.
    #[inline]
    pub const fn consumes_read(self) -> bool {
        matches!(
            self,
            Self::Match
                | Self::Mismatch
                | Self::Insertion
                | Self::SoftClip
                | Self::SequenceMatch
                | Self::SequenceMismatch
        )
    }
}

impl fmt::Display for EditOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Decoded nucleotide. `N` covers every unresolved or ambiguous call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "export", derive(serde::Serialize))]
pub enum Nucleotide {
    /// Adenine.
    A,
    /// Cytosine.
    C,
    /// Guanine.
    G,
    /// Thymine.
    T,
    /// Unresolved base.
    N,
}

impl Nucleotide {
    /// The four resolved bases in index order.
    pub const ACGT: [Nucleotide; 4] = [Self::A, Self::C, Self::G, Self::T];

    /// Decode an ASCII base. Lower case is accepted; anything outside
    /// `ACGT` (IUPAC codes included) decodes to [`Nucleotide::N`].
    #[inline]
    pub const fn from_byte(b: u8) -> Self {
        match b {
            b'A' | b'a' => Self::A,
            b'C' | b'c' => Self::C,
            b'G' | b'g' => Self::G,
            b'T' | b't' => Self::T,
            _ => Self::N,
        }
    }

    /// Index into `[A, C, G, T]`, `None` for an unresolved base.
    #[inline]
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::A => Some(0),
            Self::C => Some(1),
            Self::G => Some(2),
            Self::T => Some(3),
            Self::N => None,
        }
    }

    /// Watson-Crick complement; `N` stays `N`.
    #[inline]
    pub const fn complement(self) -> Self {
        match self {
            Self::A => Self::T,
            Self::C => Self::G,
            Self::G => Self::C,
            Self::T => Self::A,
            Self::N => Self::N,
        }
    }

    /// Upper-case ASCII character.
    #[inline]
    pub const fn as_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::C => 'C',
            Self::G => 'G',
            Self::T => 'T',
            Self::N => 'N',
        }
    }

    /// Whether this is the unresolved placeholder.
    #[inline]
    pub const fn is_unresolved(self) -> bool {
        matches!(self, Self::N)
    }
}

impl fmt::Display for Nucleotide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cigar_bytes_map_to_operators() {
        assert_eq!(EditOperator::from_cigar_byte(b'M'), Some(EditOperator::Match));
        assert_eq!(EditOperator::from_cigar_byte(b'='), Some(EditOperator::SequenceMatch));
        assert_eq!(EditOperator::from_cigar_byte(b'X'), Some(EditOperator::SequenceMismatch));
        assert_eq!(EditOperator::from_cigar_byte(b'Q'), None);
    }

    #[test]
    fn only_four_operators_are_supported() {
        let supported: Vec<_> = [
            EditOperator::Match,
            EditOperator::Mismatch,
            EditOperator::Insertion,
            EditOperator::Deletion,
            EditOperator::SkippedRegion,
            EditOperator::SoftClip,
            EditOperator::HardClip,
            EditOperator::Padding,
            EditOperator::SequenceMatch,
            EditOperator::SequenceMismatch,
        ]
        .into_iter()
        .filter(|op| op.is_supported())
        .collect();
        assert_eq!(supported.len(), 4);
    }

    #[test]
    fn ambiguity_codes_decode_to_unresolved() {
        assert_eq!(Nucleotide::from_byte(b'g'), Nucleotide::G);
        assert_eq!(Nucleotide::from_byte(b'R'), Nucleotide::N);
        assert_eq!(Nucleotide::from_byte(b'N').index(), None);
        assert_eq!(Nucleotide::A.complement(), Nucleotide::T);
    }
}
