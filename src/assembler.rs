//! Amplicon assembly from per-template primer hits.
//!
//! # Algorithm
//!
//! For each template, in this order:
//!
//! 1. Pair every forward hit with every reverse-complement reverse hit that
//!    starts strictly after it ends (`fwd_rev_rc`, sense strand).
//! 2. Pair every reverse-complement forward hit with every reverse hit that
//!    ends strictly before it starts (`fwd_rc_rev`, antisense strand; the
//!    amplicon sequence is reverse complemented).
//! 3. Only when neither step produced an amplicon, fall back to edge cases:
//!    a forward hit near the template end with no reverse hit of either
//!    orientation extends to the end (`fwd_to_end`); a reverse hit of either
//!    orientation near the template start with no forward hit extends to
//!    the start (`rev_to_start`).
//!
//! Every combination inside the length window is reported. Two forward
//! hits pairing with the same reverse hit give two amplicons; nothing is
//! deduplicated or ranked.

use crate::config::PcrConfig;
use crate::error::{PcrError, Result};
use crate::iupac::reverse_complement_seq;
use crate::matcher::Match;
use crate::orientation::{PrimerOrientation, TemplateHits};
use crate::templates::Template;
use log::{debug, info};
use rayon::prelude::*;
use std::fmt;

/// How an amplicon was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AmpliconOrientation {
    /// Forward primer paired with reverse primer reverse complement
    FwdRevRc,
    /// Forward primer reverse complement paired with reverse primer
    FwdRcRev,
    /// Unpaired forward primer extended to the template end
    FwdToEnd,
    /// Unpaired reverse primer extended to the template start
    RevToStart,
}

impl AmpliconOrientation {
    pub const ALL: [AmpliconOrientation; 4] = [
        AmpliconOrientation::FwdRevRc,
        AmpliconOrientation::FwdRcRev,
        AmpliconOrientation::FwdToEnd,
        AmpliconOrientation::RevToStart,
    ];

    /// Tag used in amplicon headers
    pub fn tag(&self) -> &'static str {
        match self {
            AmpliconOrientation::FwdRevRc => "fwd_rev_rc",
            AmpliconOrientation::FwdRcRev => "fwd_rc_rev",
            AmpliconOrientation::FwdToEnd => "fwd_to_end",
            AmpliconOrientation::RevToStart => "rev_to_start",
        }
    }

    pub fn is_edge(&self) -> bool {
        matches!(
            self,
            AmpliconOrientation::FwdToEnd | AmpliconOrientation::RevToStart
        )
    }
}

impl fmt::Display for AmpliconOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// The primer hit(s) an amplicon was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimerEvidence {
    /// Properly paired forward-side and reverse-side hits
    Pair { forward: Match, reverse: Match },
    /// Edge amplicon anchored on a forward hit
    ForwardOnly(Match),
    /// Edge amplicon anchored on a reverse or reverse-complement hit
    ReverseOnly {
        orientation: PrimerOrientation,
        hit: Match,
    },
}

impl PrimerEvidence {
    /// Errors summed over the supporting hits
    pub fn total_errors(&self) -> usize {
        match self {
            PrimerEvidence::Pair { forward, reverse } => {
                forward.total_errors() + reverse.total_errors()
            }
            PrimerEvidence::ForwardOnly(hit) | PrimerEvidence::ReverseOnly { hit, .. } => {
                hit.total_errors()
            }
        }
    }
}

/// A predicted PCR product on one template: half-open, 0-based `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amplicon {
    pub template_id: String,
    pub start: usize,
    pub end: usize,
    pub orientation: AmpliconOrientation,
    pub evidence: PrimerEvidence,
    /// Template slice, reverse complemented for `fwd_rc_rev`
    pub sequence: Vec<u8>,
}

impl Amplicon {
    pub fn length(&self) -> usize {
        self.end - self.start
    }
}

/// Build every amplicon supported by one template's hits.
pub fn assemble_template(
    template: &Template,
    hits: &TemplateHits,
    config: &PcrConfig,
) -> Vec<Amplicon> {
    let mut amplicons = Vec::new();
    let seq = &template.sequence;

    // Sense strand: fwd ... rev_rc
    for f in &hits.forward {
        for r in &hits.reverse_rc {
            if r.start <= f.end {
                continue;
            }
            let length = r.end - f.start;
            if config.accepts_length(length) {
                amplicons.push(Amplicon {
                    template_id: template.id.clone(),
                    start: f.start,
                    end: r.end,
                    orientation: AmpliconOrientation::FwdRevRc,
                    evidence: PrimerEvidence::Pair {
                        forward: *f,
                        reverse: *r,
                    },
                    sequence: seq[f.start..r.end].to_vec(),
                });
            }
        }
    }

    // Antisense strand: rev ... fwd_rc
    for f in &hits.forward_rc {
        for r in &hits.reverse {
            if f.start <= r.end {
                continue;
            }
            let length = f.end - r.start;
            if config.accepts_length(length) {
                amplicons.push(Amplicon {
                    template_id: template.id.clone(),
                    start: r.start,
                    end: f.end,
                    orientation: AmpliconOrientation::FwdRcRev,
                    evidence: PrimerEvidence::Pair {
                        forward: *f,
                        reverse: *r,
                    },
                    sequence: reverse_complement_seq(&seq[r.start..f.end]),
                });
            }
        }
    }

    if amplicons.is_empty() {
        edge_amplicons(template, hits, config, &mut amplicons);
    } else {
        debug!(
            "Template {}: {} paired amplicon(s), skipping edge cases",
            template.id,
            amplicons.len()
        );
    }

    amplicons
}

/// Single-primer recovery near template boundaries
fn edge_amplicons(
    template: &Template,
    hits: &TemplateHits,
    config: &PcrConfig,
    amplicons: &mut Vec<Amplicon>,
) {
    let seq = &template.sequence;
    let seq_len = seq.len();

    // Forward primer near the template end
    if hits.reverse.is_empty() && hits.reverse_rc.is_empty() {
        for f in &hits.forward {
            if seq_len - f.end > config.edge_distance {
                continue;
            }
            let length = seq_len - f.start;
            if config.accepts_length(length) {
                info!(
                    "Edge amplicon: {} fwd_to_end start={} end={} len={}",
                    template.id,
                    f.start + 1,
                    seq_len,
                    length
                );
                amplicons.push(Amplicon {
                    template_id: template.id.clone(),
                    start: f.start,
                    end: seq_len,
                    orientation: AmpliconOrientation::FwdToEnd,
                    evidence: PrimerEvidence::ForwardOnly(*f),
                    sequence: seq[f.start..].to_vec(),
                });
            }
        }
    }

    // Reverse primer near the template start
    if hits.forward.is_empty() && hits.forward_rc.is_empty() {
        for orientation in [PrimerOrientation::ReverseRc, PrimerOrientation::Reverse] {
            for r in hits.get(orientation) {
                if r.start > config.edge_distance {
                    continue;
                }
                let length = r.end;
                if config.accepts_length(length) {
                    info!(
                        "Edge amplicon: {} rev_to_start start=1 end={} len={}",
                        template.id, r.end, length
                    );
                    amplicons.push(Amplicon {
                        template_id: template.id.clone(),
                        start: 0,
                        end: r.end,
                        orientation: AmpliconOrientation::RevToStart,
                        evidence: PrimerEvidence::ReverseOnly {
                            orientation,
                            hit: *r,
                        },
                        sequence: seq[..r.end].to_vec(),
                    });
                }
            }
        }
    }
}

/// Assemble every template and fail if the run produced nothing.
///
/// `hits` must be in the same order as `templates`, as returned by
/// [`search_all`](crate::orientation::search_all); anything else is
/// rejected with [`PcrError::HitsMismatch`].
pub fn assemble_all(
    templates: &[Template],
    hits: &[TemplateHits],
    config: &PcrConfig,
) -> Result<Vec<Amplicon>> {
    check_alignment(templates, hits)?;

    let amplicons: Vec<Amplicon> = templates
        .par_iter()
        .zip(hits.par_iter())
        .map(|(template, template_hits)| assemble_template(template, template_hits, config))
        .collect::<Vec<Vec<Amplicon>>>()
        .into_iter()
        .flatten()
        .collect();

    if amplicons.is_empty() {
        return Err(PcrError::NoAmplicon);
    }

    info!("Total plausible amplicons: {}", amplicons.len());
    Ok(amplicons)
}

/// Hit lists must pair one-to-one, in order, with the templates
fn check_alignment(templates: &[Template], hits: &[TemplateHits]) -> Result<()> {
    const MISSING: &str = "<missing>";

    for index in 0..templates.len().max(hits.len()) {
        let template = templates.get(index).map(|t| t.id.as_str());
        let template_hits = hits.get(index).map(|h| h.template_id.as_str());
        if template != template_hits {
            return Err(PcrError::HitsMismatch {
                index,
                template: template.unwrap_or(MISSING).to_string(),
                hits: template_hits.unwrap_or(MISSING).to_string(),
            });
        }
    }

    Ok(())
}
