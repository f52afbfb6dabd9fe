//! Incremental variant statistics over reconciled edit streams.

mod accumulator;
mod counters;
mod density;
mod flags;

pub use accumulator::{RecordOutcome, Totals, VariantAccumulator};
pub use counters::{BaseCounts, SubstitutionCounts};
pub use density::{DensityArrays, DensityTrack, Segment};
pub use flags::ReadFlagStatistics;
