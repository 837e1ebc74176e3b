//! Template sequences and FASTA loading.

use crate::error::Result;
use flate2::read::MultiGzDecoder;
use log::{debug, info, warn};
use noodles::fasta;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A template record: immutable once loaded.
///
/// The sequence is kept verbatim, case included; matching uppercases it
/// logically and amplicon sequences are sliced from it unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub id: String,
    pub sequence: Vec<u8>,
}

impl Template {
    pub fn new(id: impl Into<String>, sequence: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            sequence: sequence.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// Open a FASTA file, decompressing transparently when it ends in `.gz`
fn open_fasta(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    let gzipped = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false);

    if gzipped {
        debug!("Reading gzip-compressed FASTA: {:?}", path);
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Read every record of a FASTA stream, in input order
pub fn read_templates<R: BufRead>(inner: R) -> Result<Vec<Template>> {
    let mut reader = fasta::io::Reader::new(inner);
    let mut templates = Vec::new();

    for result in reader.records() {
        let record = result?;
        let id = String::from_utf8_lossy(record.name()).into_owned();
        let sequence = record.sequence().as_ref().to_vec();

        if sequence.is_empty() {
            warn!("Template {} has an empty sequence", id);
        }
        debug!("Loaded template {} ({} bp)", id, sequence.len());

        templates.push(Template::new(id, sequence));
    }

    Ok(templates)
}

/// Load all templates from a FASTA file (plain or gzip)
pub fn load_templates(path: &Path) -> Result<Vec<Template>> {
    let templates = read_templates(open_fasta(path)?)?;
    info!("Loaded {} template(s) from {:?}", templates.len(), path);
    Ok(templates)
}
