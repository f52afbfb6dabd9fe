#[path = "common/mod.rs"]
mod common;

use common::stream_of;
use variantqc::stats::DensityTrack;
use variantqc::{
    EditOperation, EditOperator, EditStream, Nucleotide, RecordOutcome, StreamReconciler,
    VariantAccumulator,
};

#[test]
fn pure_matches_fill_match_density() {
    let mut acc = VariantAccumulator::new(100);
    let stream = StreamReconciler::new().reconcile("10M", Some("10"), b"ACGTACGTAC");

    assert_eq!(acc.update(&stream, true, 10), RecordOutcome::Counted);

    assert_eq!(acc.matches(), 10);
    let matches = acc.density().track(DensityTrack::Match);
    assert!(matches[..10].iter().all(|&c| c == 1));
    assert_eq!(matches[10], 0);
    assert_eq!(acc.skipped_reads(), 0);
}

#[test]
fn single_substitution_is_directed_and_positioned() {
    let mut acc = VariantAccumulator::new(100);
    let stream = StreamReconciler::new().reconcile("10M", Some("5A4"), b"GGGGGCGGGG");
    assert_eq!(stream.to_string(), "5m1uAC4m");

    acc.update(&stream, true, 10);

    assert_eq!(acc.substitution(Nucleotide::A, Nucleotide::C), 1);
    assert_eq!(acc.substitutions().total(), 1);
    assert_eq!(acc.matches(), 9);
    assert_eq!(acc.density().track(DensityTrack::FirstSnp)[5], 1);
    assert_eq!(acc.density().track(DensityTrack::SecondSnp)[5], 0);
}

#[test]
fn unresolved_insertion_advances_without_density() {
    let mut acc = VariantAccumulator::new(100);
    let stream = StreamReconciler::new().reconcile("2M1I2M", Some("4"), b"AANAA");
    assert_eq!(stream.to_string(), "2m1iN2m");

    acc.update(&stream, true, 5);

    assert_eq!(acc.insertions().unresolved(), 1);
    assert_eq!(acc.insertions().total(), 0);
    assert_eq!(acc.compute_totals().insertions, 0);
    assert!(acc
        .density()
        .track(DensityTrack::FirstInsertion)
        .iter()
        .all(|&c| c == 0));
    let matches = acc.density().track(DensityTrack::Match);
    assert_eq!(&matches[..5], &[1, 1, 0, 1, 1]);
}

#[test]
fn growth_preserves_history() {
    let initial = 50;
    let short = 40;
    let mut acc = VariantAccumulator::new(initial);

    let short_read = stream_of([
        EditOperation::matched(10),
        EditOperation::mismatch(Nucleotide::C, Nucleotide::T),
        EditOperation::matched(29),
    ]);
    for _ in 0..3 {
        acc.update(&short_read, true, short);
    }
    let before: Vec<Vec<u64>> = DensityTrack::ALL
        .iter()
        .map(|&track| acc.density().track(track).to_vec())
        .collect();
    assert_eq!(acc.density().len(), initial);

    let long_read = stream_of([EditOperation::matched(3 * short as u32)]);
    acc.update(&long_read, false, 3 * short);

    assert!(acc.density().len() > 3 * short - 1);
    for (track, old) in DensityTrack::ALL.iter().zip(&before) {
        let now = acc.density().track(*track);
        assert_eq!(now.len(), acc.density().len());
        for (pos, &count) in old.iter().enumerate() {
            let added = u64::from(*track == DensityTrack::Match && pos < 3 * short);
            assert_eq!(now[pos], count + added, "{track:?} at {pos}");
        }
    }
    assert_eq!(acc.density().track(DensityTrack::FirstSnp)[10], 3);
    assert_eq!(acc.density().track(DensityTrack::Match)[3 * short - 1], 1);
}

#[test]
fn unsupported_operator_aborts_with_partial_effect() {
    let mut acc = VariantAccumulator::new(100);
    let stream = StreamReconciler::new().reconcile("5M3S", Some("5"), b"ACGTACGT");

    let outcome = acc.update(&stream, true, 8);

    assert_eq!(outcome, RecordOutcome::Unsupported(EditOperator::SoftClip));
    assert_eq!(acc.matches(), 5);
    let matches = acc.density().track(DensityTrack::Match);
    assert!(matches[..5].iter().all(|&c| c == 1));
    assert_eq!(matches[5], 0);
    assert_eq!(acc.skipped_reads(), 1);
    assert_eq!(acc.total_reads(), 1);
    assert!(acc.read_length_histogram().is_empty());
}

#[test]
fn totals_are_idempotent_and_consistent() {
    let mut acc = VariantAccumulator::new(8);
    acc.update(
        &stream_of([
            EditOperation::matched(3),
            EditOperation::mismatch(Nucleotide::G, Nucleotide::A),
            EditOperation::insertion(vec![Nucleotide::T, Nucleotide::N]),
            EditOperation::deletion(vec![Nucleotide::C]),
            EditOperation::matched(4),
        ]),
        true,
        10,
    );
    acc.update(
        &stream_of([
            EditOperation::deletion(vec![Nucleotide::N, Nucleotide::A]),
            EditOperation::matched(6),
        ]),
        false,
        6,
    );

    let first = acc.compute_totals();
    let first_positional = acc.density().totals().to_vec();
    let second = acc.compute_totals();

    assert_eq!(first, second);
    assert_eq!(first_positional, acc.density().totals());
    assert_eq!(
        first.grand_total,
        first.substitutions + first.insertions + first.deletions + first.matches
    );
    assert_eq!(first.substitutions, 1);
    assert_eq!(first.insertions, 1);
    assert_eq!(first.deletions, 2);
    assert_eq!(first.matches, 13);
}

#[test]
fn malformed_annotation_only_counts_as_skipped() {
    let stream = StreamReconciler::new().reconcile("10M", Some("6"), b"ACGTACGTAC");
    assert!(stream.is_invalid());
    assert_eq!(stream, EditStream::invalid());

    let mut acc = VariantAccumulator::new(100);
    let outcome = acc.update(&stream, true, 10);

    assert_eq!(outcome, RecordOutcome::Invalid);
    assert_eq!(acc.skipped_reads(), 1);
    assert_eq!(acc.matches(), 0);
    assert_eq!(acc.compute_totals().grand_total, 0);
    assert_eq!(acc.reference_gaps() + acc.read_gaps(), 0);
    assert!(acc.density().totals().iter().all(|&c| c == 0));
    assert_eq!(acc.density().len(), 100);
    assert!(acc.read_length_histogram().is_empty());
}
