//! Amplicon output, hit diagnostics and run statistics.

use crate::assembler::{Amplicon, AmpliconOrientation};
use crate::error::Result;
use crate::matcher::Match;
use crate::orientation::{PrimerOrientation, TemplateHits};
use flate2::{write::GzEncoder, Compression};
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Default FASTA body line width
pub const DEFAULT_LINE_WIDTH: usize = 80;

/// Create the amplicon output writer, gzip-compressed when `path` ends in `.gz`
pub fn create_writer(path: &Path) -> Result<Box<dyn Write>> {
    let file = File::create(path)?;
    let compress = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false);

    let writer: Box<dyn Write> = if compress {
        debug!("Writing gzip-compressed output to {:?}", path);
        Box::new(BufWriter::new(GzEncoder::new(file, Compression::default())))
    } else {
        Box::new(BufWriter::new(file))
    };

    Ok(writer)
}

/// FASTA header (without `>`) encoding template, coordinates, length and orientation
pub fn amplicon_header(amplicon: &Amplicon) -> String {
    format!(
        "{}_from{}_to{}_len{}_orientation_{}",
        amplicon.template_id,
        amplicon.start,
        amplicon.end,
        amplicon.length(),
        amplicon.orientation.tag()
    )
}

/// Write one amplicon as a FASTA record; `line_width == 0` disables wrapping
pub fn write_amplicon<W: Write + ?Sized>(
    writer: &mut W,
    amplicon: &Amplicon,
    line_width: usize,
) -> std::io::Result<()> {
    writeln!(writer, ">{}", amplicon_header(amplicon))?;

    let width = if line_width == 0 {
        amplicon.sequence.len().max(1)
    } else {
        line_width
    };
    for line in amplicon.sequence.chunks(width) {
        writer.write_all(line)?;
        writer.write_all(b"\n")?;
    }

    Ok(())
}

/// Write every amplicon in order, logging each with 1-based inclusive coordinates
pub fn write_amplicons<W: Write + ?Sized>(
    writer: &mut W,
    amplicons: &[Amplicon],
    line_width: usize,
) -> std::io::Result<()> {
    for (n, amplicon) in amplicons.iter().enumerate() {
        write_amplicon(writer, amplicon, line_width)?;
        info!(
            "Amplicon {}: Contig={} start={} end={} inclusive length={} orientation={} primer errors={}",
            n + 1,
            amplicon.template_id,
            amplicon.start + 1,
            amplicon.end,
            amplicon.length(),
            amplicon.orientation,
            amplicon.evidence.total_errors()
        );
    }
    writer.flush()
}

/// One-line summary of a primer hit
pub fn format_hit(template_id: &str, hit: &Match) -> String {
    format!("contig={}  {}", template_id, hit)
}

/// Log every primer hit, grouped by orientation then template
pub fn log_hits(hits: &[TemplateHits]) {
    for orientation in PrimerOrientation::ALL {
        info!("{} primer matches:", orientation);
        for template_hits in hits {
            for hit in template_hits.get(orientation) {
                info!("{}", format_hit(&template_hits.template_id, hit));
            }
        }
    }
}

fn primer_index(orientation: PrimerOrientation) -> usize {
    match orientation {
        PrimerOrientation::Forward => 0,
        PrimerOrientation::ForwardRc => 1,
        PrimerOrientation::Reverse => 2,
        PrimerOrientation::ReverseRc => 3,
    }
}

fn amplicon_index(orientation: AmpliconOrientation) -> usize {
    match orientation {
        AmpliconOrientation::FwdRevRc => 0,
        AmpliconOrientation::FwdRcRev => 1,
        AmpliconOrientation::FwdToEnd => 2,
        AmpliconOrientation::RevToStart => 3,
    }
}

/// Summary counts for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PcrStats {
    /// Templates searched
    pub templates: usize,
    /// Templates yielding at least one amplicon
    pub templates_with_amplicons: usize,
    hits: [usize; 4],
    amplicons: [usize; 4],
}

impl PcrStats {
    pub fn new(hits: &[TemplateHits], amplicons: &[Amplicon]) -> Self {
        let mut stats = Self {
            templates: hits.len(),
            ..Self::default()
        };

        for template_hits in hits {
            for (orientation, _) in template_hits.iter() {
                stats.hits[primer_index(orientation)] += 1;
            }
        }
        for amplicon in amplicons {
            stats.amplicons[amplicon_index(amplicon.orientation)] += 1;
        }

        let mut with_amplicons: Vec<&str> =
            amplicons.iter().map(|a| a.template_id.as_str()).collect();
        with_amplicons.sort_unstable();
        with_amplicons.dedup();
        stats.templates_with_amplicons = with_amplicons.len();

        stats
    }

    pub fn hits(&self, orientation: PrimerOrientation) -> usize {
        self.hits[primer_index(orientation)]
    }

    pub fn amplicons(&self, orientation: AmpliconOrientation) -> usize {
        self.amplicons[amplicon_index(orientation)]
    }

    pub fn total_amplicons(&self) -> usize {
        self.amplicons.iter().sum()
    }

    pub fn report(&self, output: &mut dyn Write) -> std::io::Result<()> {
        writeln!(output, "\nIn-silico PCR Statistics:")?;
        writeln!(output, "  Templates searched: {}", self.templates)?;

        if self.templates > 0 {
            writeln!(
                output,
                "  Templates with amplicons: {} ({:.2}%)",
                self.templates_with_amplicons,
                100.0 * self.templates_with_amplicons as f64 / self.templates as f64
            )?;
        } else {
            writeln!(output, "  Templates with amplicons: 0")?;
        }

        writeln!(output, "\nPrimer hits:")?;
        for orientation in PrimerOrientation::ALL {
            writeln!(output, "  {}: {}", orientation, self.hits(orientation))?;
        }

        writeln!(output, "\nAmplicons: {}", self.total_amplicons())?;
        for orientation in AmpliconOrientation::ALL {
            writeln!(output, "  {}: {}", orientation, self.amplicons(orientation))?;
        }

        Ok(())
    }
}
