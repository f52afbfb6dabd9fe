use crate::edits::Nucleotide;

/// Directed substitution counts for the 12 ordered pairs of distinct bases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "export", derive(serde::Serialize))]
pub struct SubstitutionCounts {
    // [reference][read]; the diagonal stays zero
    counts: [[u64; 4]; 4],
}

impl SubstitutionCounts {
    /// All counters at zero.
    pub fn new() -> Self {
        Self {
            counts: [[0; 4]; 4],
        }
    }

    pub(crate) fn record(&mut self, reference: usize, read: usize) {
        debug_assert_ne!(reference, read);
        self.counts[reference][read] += 1;
    }

    /// Count of `reference` → `read` substitutions. Zero for identical
    /// bases or an unresolved side.
    pub fn get(&self, reference: Nucleotide, read: Nucleotide) -> u64 {
        match (reference.index(), read.index()) {
            (Some(r), Some(q)) => self.counts[r][q],
            _ => 0,
        }
    }

    /// Sum over all 12 directed pairs.
    pub fn total(&self) -> u64 {
        self.iter().map(|(_, _, count)| count).sum()
    }

    /// `(reference, read, count)` in the order A→C, A→G, A→T, C→A, … T→G.
    pub fn iter(&self) -> impl Iterator<Item = (Nucleotide, Nucleotide, u64)> + '_ {
        Nucleotide::ACGT.into_iter().flat_map(move |reference| {
            Nucleotide::ACGT
                .into_iter()
                .filter(move |read| *read != reference)
                .map(move |read| (reference, read, self.get(reference, read)))
        })
    }
}

/// Per-base counts for inserted or deleted bases.
///
/// Unresolved bases are tracked separately and excluded from [`total`](Self::total).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "export", derive(serde::Serialize))]
pub struct BaseCounts {
    resolved: [u64; 4],
    unresolved: u64,
}

impl BaseCounts {
    /// All counters at zero.
    pub fn new() -> Self {
        Self {
            resolved: [0; 4],
            unresolved: 0,
        }
    }

    pub(crate) fn record(&mut self, base: Nucleotide) {
        match base.index() {
            Some(idx) => self.resolved[idx] += 1,
            None => self.unresolved += 1,
        }
    }

    /// Count for one base; `N` returns the unresolved count.
    pub fn get(&self, base: Nucleotide) -> u64 {
        match base.index() {
            Some(idx) => self.resolved[idx],
            None => self.unresolved,
        }
    }

    /// Unresolved (`N`) bases.
    pub fn unresolved(&self) -> u64 {
        self.unresolved
    }

    /// Sum over A, C, G and T.
    pub fn total(&self) -> u64 {
        self.resolved.iter().sum()
    }
}
