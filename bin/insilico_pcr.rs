//! Predict PCR amplicons from a FASTA of templates and a primer pair.
//!
//! Primers may contain IUPAC ambiguity codes and are allowed to bind with up
//! to `-k` edits (substitutions, insertions or deletions). Every template is
//! searched with both primers in both orientations; compatible hits within
//! the length window become amplicons. Templates with hits for only one
//! primer near a sequence end yield edge amplicons instead.
//!
//! # Usage
//!
//! ```bash
//! insilico_pcr \
//!   -i assembly.fasta.gz \
//!   -o amplicons.fasta \
//!   -f AGAGTTTGATCMTGGCTCAG \
//!   -r CGGTTACCTTGTTACGACTT \
//!   -k 1 \
//!   --min-len 100 \
//!   --max-len 2000
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Controls logging verbosity (e.g., `debug`, `info`, `warn`)
//! - `RAYON_NUM_THREADS`: Overrides default thread count

use anyhow::Result;
use clap::Parser;
use insilico_pcr::{
    config::{DEFAULT_EDGE_DISTANCE, DEFAULT_MAX_ERRORS, DEFAULT_MAX_LEN, DEFAULT_MIN_LEN},
    report::{self, PcrStats, DEFAULT_LINE_WIDTH},
    Amplicon, PcrConfig, PcrError, PrimerOrientation, PrimerPair, Simulation, TemplateHits,
};
use log::{debug, info, warn};
use std::path::PathBuf;

/// Command line arguments for in-silico PCR
#[derive(Parser, Debug)]
#[command(name = "insilico_pcr")]
#[command(version, about = "Predict PCR amplicons from template sequences and a primer pair")]
struct Args {
    /// Input FASTA file of templates (gzip supported)
    #[arg(short = 'i', long = "fasta")]
    fasta: PathBuf,

    /// Output FASTA file for amplicons (gzip-compressed if it ends in .gz)
    #[arg(short = 'o', long = "fasta-out")]
    fasta_out: PathBuf,

    /// Forward primer sequence (IUPAC codes allowed)
    #[arg(short = 'f', long = "fwd-primer")]
    fwd_primer: String,

    /// Reverse primer sequence (IUPAC codes allowed)
    #[arg(short = 'r', long = "rev-primer")]
    rev_primer: String,

    /// Maximum edits (substitutions + insertions + deletions) per primer hit
    #[arg(short = 'k', long, default_value_t = DEFAULT_MAX_ERRORS as i64, allow_negative_numbers = true)]
    max_errors: i64,

    /// Minimum amplicon length, primers included
    #[arg(long, default_value_t = DEFAULT_MIN_LEN as i64, allow_negative_numbers = true)]
    min_len: i64,

    /// Maximum amplicon length, primers included
    #[arg(long, default_value_t = DEFAULT_MAX_LEN as i64, allow_negative_numbers = true)]
    max_len: i64,

    /// Maximum distance from a sequence end for edge amplicons
    #[arg(long, default_value_t = DEFAULT_EDGE_DISTANCE as i64, allow_negative_numbers = true)]
    edge_distance: i64,

    /// Number of threads (default: half of available cores)
    #[arg(short = 't', long, default_value_t = default_threads())]
    threads: usize,

    /// FASTA line width for amplicon sequences (0 disables wrapping)
    #[arg(long, default_value_t = DEFAULT_LINE_WIDTH)]
    line_width: usize,

    /// Statistics output file (default: stderr)
    #[arg(long)]
    stats: Option<PathBuf>,
}

fn default_threads() -> usize {
    std::env::var("RAYON_NUM_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| (num_cpus::get() / 2).max(1))
}

/// Validate command-line arguments not covered by `PcrConfig`
fn validate_args(args: &Args) -> Result<()> {
    debug!("Validating command-line arguments");

    if !args.fasta.exists() {
        anyhow::bail!("Input file does not exist: {:?}", args.fasta);
    }
    debug!("Input file exists: {:?}", args.fasta);

    if args.threads == 0 {
        anyhow::bail!("Number of threads must be at least 1");
    }
    debug!("Thread count: {}", args.threads);

    // Short primers bind all over the place
    for (name, seq) in [("Forward", &args.fwd_primer), ("Reverse", &args.rev_primer)] {
        if !seq.is_empty() && seq.len() < 10 {
            warn!(
                "{} primer is very short ({} bp), may cause false matches",
                name,
                seq.len()
            );
        }
    }

    Ok(())
}

fn write_stats(args: &Args, hits: &[TemplateHits], amplicons: &[Amplicon]) -> Result<()> {
    let stats = PcrStats::new(hits, amplicons);
    let mut stats_output: Box<dyn std::io::Write> = match &args.stats {
        Some(path) => {
            info!("Writing statistics to: {:?}", path);
            Box::new(std::fs::File::create(path)?)
        }
        None => {
            debug!("Writing statistics to stderr");
            Box::new(std::io::stderr())
        }
    };
    stats.report(&mut *stats_output)?;
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let config = PcrConfig::new(args.max_errors, args.min_len, args.max_len, args.edge_distance)?;
    let primers = PrimerPair::new(&args.fwd_primer, &args.rev_primer)?;

    info!(
        "Forward primer: {} ({} bp)",
        args.fwd_primer,
        args.fwd_primer.len()
    );
    info!(
        "Reverse primer: {} ({} bp)",
        args.rev_primer,
        args.rev_primer.len()
    );
    debug!(
        "Forward primer RC: {}",
        primers.pattern(PrimerOrientation::ForwardRc).source()
    );
    debug!(
        "Reverse primer RC: {}",
        primers.pattern(PrimerOrientation::ReverseRc).source()
    );

    let templates = insilico_pcr::load_templates(&args.fasta)?;
    let simulation = Simulation::new(&templates, &primers, config);

    let hits = simulation.search();
    report::log_hits(&hits);

    let amplicons = match simulation.assemble(&hits) {
        Ok(amplicons) => amplicons,
        Err(PcrError::NoAmplicon) => {
            write_stats(args, &hits, &[])?;
            return Err(PcrError::NoAmplicon.into());
        }
        Err(e) => return Err(e.into()),
    };

    debug!("Creating output writer");
    let mut writer = report::create_writer(&args.fasta_out)?;
    report::write_amplicons(&mut *writer, &amplicons, args.line_width)?;
    info!("Total amplicons found: {}", amplicons.len());
    info!("Amplicons written to {:?}", args.fasta_out);

    write_stats(args, &hits, &amplicons)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    validate_args(&args)?;

    info!("=== In-silico PCR Started ===");
    info!("Input file: {:?}", args.fasta);
    info!("Output file: {:?}", args.fasta_out);
    info!("Threads: {}", args.threads);
    info!("Max errors: {}", args.max_errors);
    info!("Amplicon length bounds: {}-{} bp", args.min_len, args.max_len);
    info!("Edge distance: {} bp", args.edge_distance);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build()?;
    pool.install(|| run(&args))?;

    info!("=== In-silico PCR Finished ===");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    const FWD: &str = "AGAGTTTGATCMTGGCTCAG";
    const REV: &str = "CGGTTACCTTGTTACGACTT";

    fn test_args(fasta: PathBuf, fasta_out: PathBuf) -> Args {
        Args {
            fasta,
            fasta_out,
            fwd_primer: FWD.to_string(),
            rev_primer: REV.to_string(),
            max_errors: 1,
            min_len: 50,
            max_len: 2000,
            edge_distance: 1500,
            threads: 1,
            line_width: 80,
            stats: None,
        }
    }

    fn paired_template() -> String {
        format!(
            ">contig_1 test\nCCCCAGAGTTTGATCCTGGCTCAG{}AAGTCGTAACAAGGTAACCGCCCC\n",
            "T".repeat(60)
        )
    }

    #[test]
    fn test_default_threads_positive() {
        assert!(default_threads() >= 1);
    }

    #[test]
    fn test_args_parse_defaults() {
        let args = Args::parse_from([
            "insilico_pcr", "-i", "in.fa", "-o", "out.fa", "-f", FWD, "-r", REV,
        ]);
        assert_eq!(args.max_errors, 1);
        assert_eq!(args.min_len, 100);
        assert_eq!(args.max_len, 2000);
        assert_eq!(args.edge_distance, 1500);
        assert_eq!(args.line_width, 80);
        assert!(args.stats.is_none());
    }

    #[test]
    fn test_validate_args_missing_input() {
        let args = test_args(
            PathBuf::from("/nonexistent/templates.fasta"),
            std::env::temp_dir().join("insilico_pcr_never_written.fasta"),
        );
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_zero_threads() {
        let input = std::env::temp_dir().join("insilico_pcr_validate_threads.fasta");
        std::fs::write(&input, paired_template()).unwrap();

        let mut args = test_args(input.clone(), std::env::temp_dir().join("unused.fasta"));
        assert!(validate_args(&args).is_ok());
        args.threads = 0;
        assert!(validate_args(&args).is_err());

        std::fs::remove_file(&input).unwrap();
    }

    #[test]
    fn test_run_rejects_invalid_config() {
        let input = std::env::temp_dir().join("insilico_pcr_invalid_config.fasta");
        std::fs::write(&input, paired_template()).unwrap();

        let mut args = test_args(input.clone(), std::env::temp_dir().join("unused.fasta"));
        args.min_len = 500;
        args.max_len = 100;
        let err = run(&args).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PcrError>(),
            Some(PcrError::InvalidLengthWindow { .. })
        ));

        std::fs::remove_file(&input).unwrap();
    }

    #[test]
    fn test_run_writes_amplicons_and_stats() {
        let dir = std::env::temp_dir();
        let input = dir.join("insilico_pcr_run_input.fasta");
        let output = dir.join("insilico_pcr_run_output.fasta");
        let stats = dir.join("insilico_pcr_run_stats.txt");
        std::fs::write(&input, paired_template()).unwrap();

        let mut args = test_args(input.clone(), output.clone());
        args.stats = Some(stats.clone());
        run(&args).unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        let expected = format!(
            ">contig_1_from4_to104_len100_orientation_fwd_rev_rc\n\
             AGAGTTTGATCCTGGCTCAG{}\n\
             AAGTCGTAACAAGGTAACCG\n",
            "T".repeat(60)
        );
        assert_eq!(written, expected);

        let report = std::fs::read_to_string(&stats).unwrap();
        assert!(report.contains("Amplicons: 1"));

        std::fs::remove_file(&input).unwrap();
        std::fs::remove_file(&output).unwrap();
        std::fs::remove_file(&stats).unwrap();
    }

    #[test]
    fn test_run_gzip_output() {
        let dir = std::env::temp_dir();
        let input = dir.join("insilico_pcr_gz_input.fasta");
        let output = dir.join("insilico_pcr_gz_output.fasta.gz");
        let stats = dir.join("insilico_pcr_gz_stats.txt");
        std::fs::write(&input, paired_template()).unwrap();

        let mut args = test_args(input.clone(), output.clone());
        args.stats = Some(stats.clone());
        run(&args).unwrap();

        let mut decoder = GzDecoder::new(std::fs::File::open(&output).unwrap());
        let mut written = String::new();
        decoder.read_to_string(&mut written).unwrap();
        assert!(written.starts_with(">contig_1_from4_to104_len100_orientation_fwd_rev_rc\n"));

        std::fs::remove_file(&input).unwrap();
        std::fs::remove_file(&output).unwrap();
        std::fs::remove_file(&stats).unwrap();
    }

    #[test]
    fn test_run_no_amplicon() {
        let dir = std::env::temp_dir();
        let input = dir.join("insilico_pcr_empty_input.fasta");
        let output = dir.join("insilico_pcr_empty_output.fasta");
        let stats = dir.join("insilico_pcr_empty_stats.txt");
        std::fs::write(&input, format!(">nothing\n{}\n", "ACGGT".repeat(40))).unwrap();

        let mut args = test_args(input.clone(), output.clone());
        args.stats = Some(stats.clone());
        let err = run(&args).unwrap_err();
        assert!(matches!(err.downcast_ref::<PcrError>(), Some(PcrError::NoAmplicon)));
        // Nothing is written when no amplicon was found
        assert!(!output.exists());

        let report = std::fs::read_to_string(&stats).unwrap();
        assert!(report.contains("Amplicons: 0"));

        std::fs::remove_file(&input).unwrap();
        std::fs::remove_file(&stats).unwrap();
    }
}
