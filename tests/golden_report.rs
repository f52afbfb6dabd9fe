#[path = "common/mod.rs"]
mod common;

use std::collections::HashSet;

use blake3::hash;
use common::{assert_report_snapshot, render_records};
use variantqc::{AlignmentRecord, VariantAnalysis, VariantConfig};

fn fixture_records() -> Vec<AlignmentRecord> {
    vec![
        AlignmentRecord::new("single_snp", "10M", Some("5A4"), b"AAAAACAAAA".to_vec(), 0),
        AlignmentRecord::new("insertion", "4M1I5M", Some("9"), b"ACGTTACGTA".to_vec(), 0x41),
        AlignmentRecord::new("deletion", "3M2D7M", Some("3^GG7"), b"ACGACGTACG".to_vec(), 0x81),
        AlignmentRecord::new("clipped", "5M5S", Some("5"), b"ACGTAACGTA".to_vec(), 0),
        AlignmentRecord::new("unmapped", "*", None, b"ACGTACGTAC".to_vec(), 0x4),
    ]
}

fn render_fixture() -> String {
    render_records(VariantConfig::default(), &fixture_records())
}

#[test]
fn report_matches_snapshot() {
    assert_report_snapshot("report/golden.tsv", &render_fixture());
}

#[test]
fn report_is_deterministic() {
    let mut fingerprints = HashSet::new();
    for _ in 0..5 {
        fingerprints.insert(hash(render_fixture().as_bytes()));
    }
    assert_eq!(fingerprints.len(), 1, "outputs diverged across runs");
}

#[test]
fn reset_reproduces_the_same_report() {
    let mut analysis = VariantAnalysis::new(VariantConfig::default()).expect("default config");
    analysis.run(fixture_records().into_iter().map(Ok)).unwrap();
    let first = analysis.report();

    analysis.reset();
    assert_eq!(analysis.accumulator().total_reads(), 0);
    analysis.run(fixture_records().into_iter().map(Ok)).unwrap();

    assert_eq!(analysis.report(), first);
}
