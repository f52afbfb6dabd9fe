#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use variantqc::report::render_report;
use variantqc::{AlignmentRecord, EditOperation, EditStream, VariantAnalysis, VariantConfig};

/// Set to rewrite stored reports instead of comparing against them.
const UPDATE_VAR: &str = "VARIANTQC_UPDATE_SNAPSHOTS";

/// Run `records` through a fresh analysis and render its report.
pub fn render_records(config: VariantConfig, records: &[AlignmentRecord]) -> String {
    let mut analysis = VariantAnalysis::new(config).expect("valid configuration");
    analysis
        .run(records.iter().cloned().map(Ok))
        .expect("in-memory records never fail");
    render_report(&analysis.report()).expect("report renders")
}

/// Compare a rendered report with `tests/snapshots/<name>`, line by line.
pub fn assert_report_snapshot(name: &str, actual: &str) {
    let path: PathBuf = [env!("CARGO_MANIFEST_DIR"), "tests", "snapshots", name]
        .iter()
        .collect();

    if std::env::var_os(UPDATE_VAR).is_some() {
        let dir = path.parent().expect("snapshot lives in a directory");
        fs::create_dir_all(dir).expect("create snapshot directory");
        fs::write(&path, actual).expect("write snapshot");
        return;
    }

    let stored = fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("cannot read {}: {err} (set {UPDATE_VAR}=1)", path.display()));
    let mut expected = stored.lines();
    let mut produced = actual.lines();
    for line_no in 1.. {
        match (expected.next(), produced.next()) {
            (None, None) => break,
            (want, got) if want == got => {}
            (want, got) => panic!(
                "{} differs at line {line_no}: expected {want:?}, got {got:?} (set {UPDATE_VAR}=1 to accept)",
                path.display()
            ),
        }
    }
}

/// Build a valid stream from operations.
pub fn stream_of(ops: impl IntoIterator<Item = EditOperation>) -> EditStream {
    let mut stream = EditStream::new();
    for op in ops {
        stream.push(op);
    }
    stream
}
