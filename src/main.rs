use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use variantqc::report::write_report;
use variantqc::{BamRecordSource, Thresholds, VariantAnalysis, VariantConfig};

#[derive(Parser, Debug)]
#[command(
    name = "variantqc",
    about = "Substitution and indel statistics from CIGAR and MD annotations"
)]
struct Cli {
    /// Alignment file (SAM, BAM or CRAM) with MD tags.
    alignments: PathBuf,
    /// Initial number of read positions tracked (grows as needed).
    #[arg(long, default_value_t = 100)]
    position_length: usize,
    /// Per-position SNP frequency (%) raising a warning.
    #[arg(long, default_value_t = 0.5)]
    snp_warn: f64,
    /// Per-position SNP frequency (%) failing the check.
    #[arg(long, default_value_t = 1.0)]
    snp_error: f64,
    /// Per-position indel frequency (%) raising a warning.
    #[arg(long, default_value_t = 0.5)]
    indel_warn: f64,
    /// Per-position indel frequency (%) failing the check.
    #[arg(long, default_value_t = 1.0)]
    indel_error: f64,
    /// Report positions up to read lengths seen in at least this percentage
    /// of the most common length's reads.
    #[arg(long, default_value_t = 50.0)]
    xaxis_threshold: f64,
    /// Keep reverse-strand reads in reference orientation.
    #[arg(long)]
    no_orient: bool,
    /// Count unmapped records (they are reported as skipped).
    #[arg(long)]
    include_unmapped: bool,
    /// Count secondary and supplementary alignments.
    #[arg(long)]
    include_secondary: bool,
    /// Extra htslib decompression threads.
    #[arg(long, default_value_t = 0)]
    threads: usize,
}

impl Cli {
    fn config(&self) -> VariantConfig {
        VariantConfig::default()
            .with_position_length(self.position_length)
            .with_snp_thresholds(Thresholds::new(self.snp_warn, self.snp_error))
            .with_indel_thresholds(Thresholds::new(self.indel_warn, self.indel_error))
            .with_xaxis_threshold_percent(self.xaxis_threshold)
            .with_orient_by_strand(!self.no_orient)
            .with_include_unmapped(self.include_unmapped)
            .with_include_secondary(self.include_secondary)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut analysis =
        VariantAnalysis::new(cli.config()).context("invalid analysis parameters")?;

    let source = BamRecordSource::from_path(&cli.alignments)
        .and_then(|source| source.with_threads(cli.threads))
        .with_context(|| format!("failed to open alignments {}", cli.alignments.display()))?;
    info!(path = %cli.alignments.display(), "reading alignments");

    analysis
        .run(source)
        .with_context(|| format!("failed while reading {}", cli.alignments.display()))?;

    let report = analysis.report();
    info!(
        skipped_percent = report.skipped_percent(),
        status = %report.overall_status(),
        "report ready"
    );

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    write_report(&mut writer, &report).context("failed to write report")?;
    Ok(())
}
