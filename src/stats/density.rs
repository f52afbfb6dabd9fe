use tracing::debug;

/// Which read of a pair a record is. Unpaired reads count as first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    /// First read of a pair, or an unpaired read.
    First,
    /// Second read of a pair.
    Second,
}

impl Segment {
    /// Segment for an "is first segment" flag.
    pub fn from_first_flag(is_first: bool) -> Self {
        if is_first {
            Self::First
        } else {
            Self::Second
        }
    }
}

/// Event classes tracked per intra-read position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DensityTrack {
    /// Substitution on a first-segment read.
    FirstSnp,
    /// Substitution on a second-segment read.
    SecondSnp,
    /// Insertion on a first-segment read.
    FirstInsertion,
    /// Insertion on a second-segment read.
    SecondInsertion,
    /// Deletion on a first-segment read.
    FirstDeletion,
    /// Deletion on a second-segment read.
    SecondDeletion,
    /// Matching base, either segment.
    Match,
}

impl DensityTrack {
    /// Every track, in storage order.
    pub const ALL: [DensityTrack; 7] = [
        Self::FirstSnp,
        Self::SecondSnp,
        Self::FirstInsertion,
        Self::SecondInsertion,
        Self::FirstDeletion,
        Self::SecondDeletion,
        Self::Match,
    ];

    /// Substitution track for a segment.
    pub fn snp(segment: Segment) -> Self {
        match segment {
            Segment::First => Self::FirstSnp,
            Segment::Second => Self::SecondSnp,
        }
    }

    /// Insertion track for a segment.
    pub fn insertion(segment: Segment) -> Self {
        match segment {
            Segment::First => Self::FirstInsertion,
            Segment::Second => Self::SecondInsertion,
        }
    }

    /// Deletion track for a segment.
    pub fn deletion(segment: Segment) -> Self {
        match segment {
            Segment::First => Self::FirstDeletion,
            Segment::Second => Self::SecondDeletion,
        }
    }

    const fn slot(self) -> usize {
        self as usize
    }
}

/// Per-position event counts, one array per [`DensityTrack`] plus the
/// positional totals, all of equal length.
///
/// Lengths only grow. Growth doubles the arrays, or jumps straight to
/// `required + 1` when doubling would still fall short, so reallocation
/// happens O(log n) times for a maximum read length n.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DensityArrays {
    tracks: [Vec<u64>; 7],
    totals: Vec<u64>,
    growths: usize,
}

impl DensityArrays {
    /// Zeroed arrays of `initial_length` slots.
    pub fn new(initial_length: usize) -> Self {
        Self {
            tracks: std::array::from_fn(|_| vec![0; initial_length]),
            totals: vec![0; initial_length],
            growths: 0,
        }
    }

    /// Current (shared) array length.
    #[inline]
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    /// Whether the arrays have no slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Number of reallocations performed so far.
    pub fn growth_count(&self) -> usize {
        self.growths
    }

    /// Counts for one track.
    pub fn track(&self, track: DensityTrack) -> &[u64] {
        &self.tracks[track.slot()]
    }

    /// Sum of all tracks per position.
    pub fn totals(&self) -> &[u64] {
        &self.totals
    }

    /// Make room for writes at positions below `required`.
    ///
    /// Grows whenever `required` reaches the current length, so a run ending
    /// exactly at the last slot still triggers growth. Nothing is needed
    /// for `required == 0`.
    pub fn ensure_capacity(&mut self, required: usize) {
        if required > 0 && required >= self.len() {
            self.grow(required);
        }
    }

    fn grow(&mut self, required: usize) {
        let old_len = self.len();
        let new_len = if old_len * 2 < required {
            required + 1
        } else {
            old_len * 2
        };
        for array in self.tracks.iter_mut().chain(std::iter::once(&mut self.totals)) {
            array.resize(new_len, 0);
        }
        self.growths += 1;
        debug!(from = old_len, to = new_len, "grew density arrays");
    }

    /// Count one event at `position`. The caller must have reserved
    /// capacity with [`ensure_capacity`](Self::ensure_capacity).
    #[inline]
    pub(crate) fn increment(&mut self, track: DensityTrack, position: usize) {
        self.tracks[track.slot()][position] += 1;
        self.totals[position] += 1;
    }

    /// Rebuild the positional totals from the tracks.
    pub fn recompute_totals(&mut self) {
        for (pos, total) in self.totals.iter_mut().enumerate() {
            *total = self.tracks.iter().map(|track| track[pos]).sum();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_doubles_when_enough() {
        let mut arrays = DensityArrays::new(10);
        arrays.ensure_capacity(15);
        assert_eq!(arrays.len(), 20);
        assert_eq!(arrays.growth_count(), 1);
    }

    #[test]
    fn growth_jumps_past_double() {
        let mut arrays = DensityArrays::new(10);
        arrays.ensure_capacity(35);
        assert_eq!(arrays.len(), 36);
        for track in DensityTrack::ALL {
            assert_eq!(arrays.track(track).len(), 36);
        }
    }

    #[test]
    fn growth_keeps_existing_counts() {
        let mut arrays = DensityArrays::new(4);
        arrays.ensure_capacity(3);
        arrays.increment(DensityTrack::SecondInsertion, 2);
        arrays.ensure_capacity(9);
        assert_eq!(arrays.track(DensityTrack::SecondInsertion)[2], 1);
        assert_eq!(arrays.totals()[2], 1);
        assert!(arrays.track(DensityTrack::SecondInsertion)[3..].iter().all(|&c| c == 0));
    }

    #[test]
    fn totals_recompute_matches_incremental() {
        let mut arrays = DensityArrays::new(8);
        arrays.increment(DensityTrack::Match, 0);
        arrays.increment(DensityTrack::FirstSnp, 0);
        arrays.increment(DensityTrack::SecondDeletion, 5);
        let before = arrays.totals().to_vec();
        arrays.recompute_totals();
        assert_eq!(arrays.totals(), before.as_slice());
        assert_eq!(arrays.totals()[0], 2);
    }

    #[test]
    fn zero_length_arrays_grow_only_when_written() {
        let mut arrays = DensityArrays::new(0);
        arrays.ensure_capacity(0);
        assert_eq!(arrays.growth_count(), 0);
        assert!(arrays.is_empty());

        arrays.ensure_capacity(3);
        assert_eq!(arrays.len(), 4);
        assert_eq!(arrays.growth_count(), 1);
    }
}
