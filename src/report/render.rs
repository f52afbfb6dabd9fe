use std::io::{self, Write};

use super::VariantReport;
use crate::VariantQcError;

const HEADER: &str = "##fileformat=variantqc-1\n";

/// Write the report as tab-separated sections.
pub fn write_report<W: Write>(writer: &mut W, report: &VariantReport) -> Result<(), VariantQcError> {
    writer.write_all(HEADER.as_bytes())?;

    let totals = &report.totals;
    writeln!(writer, "#Summary")?;
    writeln!(writer, "total_reads\t{}", report.total_reads)?;
    writeln!(
        writer,
        "skipped_reads\t{}\t{:.3}%",
        report.skipped_reads,
        report.skipped_percent()
    )?;
    writeln!(
        writer,
        "paired_reads\t{}",
        if report.paired_reads { "yes" } else { "no" }
    )?;
    writeln!(writer, "matches\t{}", totals.matches)?;
    writeln!(
        writer,
        "substitutions\t{}\t{:.3}%",
        totals.substitutions, report.snp.total_percent
    )?;
    writeln!(
        writer,
        "insertions\t{}\t{:.3}%",
        totals.insertions, report.indels.insertion_percent
    )?;
    writeln!(
        writer,
        "deletions\t{}\t{:.3}%",
        totals.deletions, report.indels.deletion_percent
    )?;
    writeln!(writer, "total\t{}", totals.grand_total)?;
    writeln!(writer, "reference_gaps\t{}", report.reference_gaps)?;
    writeln!(writer, "read_gaps\t{}", report.read_gaps)?;

    writeln!(writer, "#Substitution\tCount\tPercent")?;
    for share in &report.substitutions.entries {
        writeln!(
            writer,
            "{}>{}\t{}\t{:.3}",
            share.reference, share.read, share.count, share.percent
        )?;
    }

    writeln!(writer, "#Base\tInsertions\tDeletions")?;
    for entry in &report.indel_bases {
        writeln!(writer, "{}\t{}\t{}", entry.base, entry.insertions, entry.deletions)?;
    }

    let flags = &report.flags;
    writeln!(writer, "#Flag\tCount\tPercent")?;
    for (label, count) in [
        ("paired", flags.paired()),
        ("mapped", flags.mapped()),
        ("proper_pair", flags.proper_pairs()),
        ("qc_failed", flags.qc_failed()),
        ("duplicate", flags.duplicates()),
    ] {
        writeln!(writer, "{label}\t{count}\t{:.3}", flags.percent_of_reads(count))?;
    }

    writeln!(writer, "#Position\tFirstSNP\tSecondSNP\tInsertion\tDeletion")?;
    for pos in 0..report.positions {
        writeln!(
            writer,
            "{}\t{:.3}\t{:.3}\t{:.3}\t{:.3}",
            pos + 1,
            report.snp.first[pos],
            report.snp.second[pos],
            report.indels.insertions[pos],
            report.indels.deletions[pos]
        )?;
    }

    writeln!(writer, "#Check\tMax\tStatus")?;
    writeln!(writer, "snp\t{:.3}\t{}", report.snp.max_frequency, report.snp.status)?;
    writeln!(
        writer,
        "indel\t{:.3}\t{}",
        report.indels.max_frequency, report.indels.status
    )?;

    writer.flush()?;
    Ok(())
}

/// Render the report into a string (useful for tests and snapshots).
pub fn render_report(report: &VariantReport) -> Result<String, VariantQcError> {
    let mut buffer = Vec::new();
    write_report(&mut buffer, report)?;
    String::from_utf8(buffer).map_err(|err| {
        VariantQcError::Io(io::Error::new(io::ErrorKind::InvalidData, err))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VariantConfig;
    use crate::stats::{ReadFlagStatistics, VariantAccumulator};

    #[test]
    fn empty_report_renders_all_sections() {
        let config = VariantConfig::default();
        let acc = VariantAccumulator::from_config(&config);
        let report = VariantReport::build(&acc, &ReadFlagStatistics::new(), &config);
        let text = render_report(&report).unwrap();

        assert!(text.starts_with(HEADER));
        for section in ["#Summary", "#Substitution", "#Base", "#Flag", "#Position", "#Check"] {
            assert!(text.contains(section), "missing {section}");
        }
        // floor of five positions plus one
        assert_eq!(text.lines().filter(|l| l.starts_with(|c: char| c.is_ascii_digit())).count(), 6);
        assert!(text.ends_with("indel\t0.000\tPASS\n"));
    }
}
