//! Four-orientation primer search.
//!
//! Each template is searched with the forward primer, its reverse
//! complement, the reverse primer and its reverse complement, all under
//! the same error budget. Patterns are compiled once per run and shared
//! read-only by every worker.

use crate::error::{PcrError, Result};
use crate::iupac::{compile, reverse_complement, Pattern};
use crate::matcher::{find_matches, Match};
use crate::templates::Template;
use log::{debug, warn};
use rayon::prelude::*;
use std::fmt;

/// Which of the four search patterns produced a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimerOrientation {
    /// Forward primer as supplied
    Forward,
    /// Reverse complement of the forward primer
    ForwardRc,
    /// Reverse primer as supplied
    Reverse,
    /// Reverse complement of the reverse primer
    ReverseRc,
}

impl PrimerOrientation {
    pub const ALL: [PrimerOrientation; 4] = [
        PrimerOrientation::Forward,
        PrimerOrientation::ForwardRc,
        PrimerOrientation::Reverse,
        PrimerOrientation::ReverseRc,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PrimerOrientation::Forward => "Forward",
            PrimerOrientation::ForwardRc => "Forward RC",
            PrimerOrientation::Reverse => "Reverse",
            PrimerOrientation::ReverseRc => "Reverse RC",
        }
    }
}

impl fmt::Display for PrimerOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A primer compiled in both orientations.
#[derive(Debug, Clone)]
pub struct Primer {
    raw: String,
    forward: Pattern,
    reverse_complement: Pattern,
}

impl Primer {
    /// Compile `raw` as-is and as its reverse complement.
    ///
    /// `which` names the primer in error messages ("forward" or "reverse").
    pub fn new(which: &'static str, raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(PcrError::EmptyPrimer { which });
        }
        let forward = compile(raw)?;
        let rc = reverse_complement(raw)?;

        Ok(Self {
            raw: raw.to_string(),
            forward,
            reverse_complement: compile(&rc)?,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn forward(&self) -> &Pattern {
        &self.forward
    }

    pub fn reverse_complement(&self) -> &Pattern {
        &self.reverse_complement
    }
}

/// Primer pair with pre-computed reverse complements.
#[derive(Debug, Clone)]
pub struct PrimerPair {
    pub forward: Primer,
    pub reverse: Primer,
}

impl PrimerPair {
    /// Compile both primers; fails before any matching if either is invalid.
    pub fn new(forward: &str, reverse: &str) -> Result<Self> {
        Ok(Self {
            forward: Primer::new("forward", forward)?,
            reverse: Primer::new("reverse", reverse)?,
        })
    }

    pub fn pattern(&self, orientation: PrimerOrientation) -> &Pattern {
        match orientation {
            PrimerOrientation::Forward => self.forward.forward(),
            PrimerOrientation::ForwardRc => self.forward.reverse_complement(),
            PrimerOrientation::Reverse => self.reverse.forward(),
            PrimerOrientation::ReverseRc => self.reverse.reverse_complement(),
        }
    }

    fn shortest(&self) -> usize {
        self.forward.raw.len().min(self.reverse.raw.len())
    }
}

/// The four labelled hit lists for one template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateHits {
    pub template_id: String,
    pub forward: Vec<Match>,
    pub forward_rc: Vec<Match>,
    pub reverse: Vec<Match>,
    pub reverse_rc: Vec<Match>,
}

impl TemplateHits {
    pub fn get(&self, orientation: PrimerOrientation) -> &[Match] {
        match orientation {
            PrimerOrientation::Forward => &self.forward,
            PrimerOrientation::ForwardRc => &self.forward_rc,
            PrimerOrientation::Reverse => &self.reverse,
            PrimerOrientation::ReverseRc => &self.reverse_rc,
        }
    }

    /// Number of hits across all four orientations
    pub fn total(&self) -> usize {
        PrimerOrientation::ALL
            .iter()
            .map(|&orientation| self.get(orientation).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Every hit with the orientation that produced it, orientation-major
    pub fn iter(&self) -> impl Iterator<Item = (PrimerOrientation, &Match)> + '_ {
        PrimerOrientation::ALL
            .into_iter()
            .flat_map(move |orientation| {
                self.get(orientation)
                    .iter()
                    .map(move |m| (orientation, m))
            })
    }
}

/// Search one template in all four orientations.
///
/// The four searches read the same immutable template and run concurrently.
pub fn search_template(
    template: &Template,
    primers: &PrimerPair,
    max_errors: usize,
) -> TemplateHits {
    if template.len() < primers.shortest() {
        warn!(
            "Template {} ({} bp) is shorter than the primers",
            template.id,
            template.len()
        );
    }

    let search = |orientation: PrimerOrientation| {
        find_matches(primers.pattern(orientation), &template.sequence, max_errors)
    };

    let ((forward, forward_rc), (reverse, reverse_rc)) = rayon::join(
        || {
            rayon::join(
                || search(PrimerOrientation::Forward),
                || search(PrimerOrientation::ForwardRc),
            )
        },
        || {
            rayon::join(
                || search(PrimerOrientation::Reverse),
                || search(PrimerOrientation::ReverseRc),
            )
        },
    );

    let hits = TemplateHits {
        template_id: template.id.clone(),
        forward,
        forward_rc,
        reverse,
        reverse_rc,
    };
    debug!(
        "Template {}: {} fwd, {} fwd_rc, {} rev, {} rev_rc hits",
        hits.template_id,
        hits.forward.len(),
        hits.forward_rc.len(),
        hits.reverse.len(),
        hits.reverse_rc.len()
    );
    hits
}

/// Search every template; results keep the template input order.
pub fn search_all(
    templates: &[Template],
    primers: &PrimerPair,
    max_errors: usize,
) -> Vec<TemplateHits> {
    templates
        .par_iter()
        .map(|template| search_template(template, primers, max_errors))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FWD: &str = "AGAGTTTGATCCTGGCTCAG";
    const REV: &str = "CGGTTACCTTGTTACGACTT";

    #[test]
    fn test_primer_pair_creation() {
        let primers = PrimerPair::new("ACGT", "TGCA").unwrap();
        assert_eq!(primers.forward.raw(), "ACGT");
        assert_eq!(primers.reverse.raw(), "TGCA");
        assert_eq!(primers.pattern(PrimerOrientation::ForwardRc).source(), "ACGT");
        assert_eq!(primers.pattern(PrimerOrientation::ReverseRc).source(), "TGCA");
    }

    #[test]
    fn test_primer_pair_rc_patterns() {
        let primers = PrimerPair::new(FWD, REV).unwrap();
        assert_eq!(
            primers.pattern(PrimerOrientation::ForwardRc).source(),
            "CTGAGCCAGGATCAAACTCT"
        );
        assert_eq!(
            primers.pattern(PrimerOrientation::ReverseRc).source(),
            "AAGTCGTAACAAGGTAACCG"
        );
    }

    #[test]
    fn test_primer_pair_rejects_invalid_symbol() {
        let result = PrimerPair::new("ACGTX", REV);
        assert!(matches!(result, Err(PcrError::InvalidPrimerSymbol { symbol: 'X', .. })));
        let result = PrimerPair::new(FWD, "ACG1");
        assert!(matches!(result, Err(PcrError::InvalidPrimerSymbol { symbol: '1', .. })));
    }

    #[test]
    fn test_primer_pair_rejects_empty() {
        assert!(matches!(
            PrimerPair::new("", REV),
            Err(PcrError::EmptyPrimer { which: "forward" })
        ));
        assert!(matches!(
            PrimerPair::new(FWD, ""),
            Err(PcrError::EmptyPrimer { which: "reverse" })
        ));
    }

    #[test]
    fn test_search_template_all_four_orientations() {
        let primers = PrimerPair::new(FWD, REV).unwrap();
        // fwd at 2, rev_rc at 30, rev at 60, fwd_rc at 90
        let sequence = format!(
            "GG{}GGGGGGGG{}GGGGGGGGGG{}GGGGGGGGGG{}GG",
            FWD, "AAGTCGTAACAAGGTAACCG", REV, "CTGAGCCAGGATCAAACTCT"
        );
        let template = Template::new("contig_1", sequence.into_bytes());
        let hits = search_template(&template, &primers, 0);

        assert_eq!(hits.template_id, "contig_1");
        assert_eq!(hits.forward.len(), 1);
        assert_eq!((hits.forward[0].start, hits.forward[0].end), (2, 22));
        assert_eq!(hits.reverse_rc.len(), 1);
        assert_eq!(hits.reverse_rc[0].start, 30);
        assert_eq!(hits.reverse.len(), 1);
        assert_eq!(hits.reverse[0].start, 60);
        assert_eq!(hits.forward_rc.len(), 1);
        assert_eq!(hits.forward_rc[0].start, 90);
        assert_eq!(hits.total(), 4);
    }

    #[test]
    fn test_search_template_no_hits() {
        let primers = PrimerPair::new(FWD, REV).unwrap();
        let template = Template::new("empty", b"GGGGGGGGGGGGGGGGGGGGGGGGGGGGGG".to_vec());
        let hits = search_template(&template, &primers, 1);
        assert!(hits.is_empty());
        assert_eq!(hits.iter().count(), 0);
    }

    #[test]
    fn test_hits_iter_labels_orientations() {
        let primers = PrimerPair::new(FWD, REV).unwrap();
        let sequence = format!("TT{}TTTT{}TT", FWD, REV);
        let template = Template::new("t", sequence.into_bytes());
        let hits = search_template(&template, &primers, 0);

        let labelled: Vec<PrimerOrientation> = hits.iter().map(|(o, _)| o).collect();
        assert_eq!(
            labelled,
            vec![PrimerOrientation::Forward, PrimerOrientation::Reverse]
        );
    }

    #[test]
    fn test_search_all_preserves_template_order() {
        let primers = PrimerPair::new(FWD, REV).unwrap();
        let templates: Vec<Template> = (0..8)
            .map(|i| {
                let sequence = format!("{}{}", "C".repeat(i), FWD);
                Template::new(format!("contig_{}", i), sequence.into_bytes())
            })
            .collect();

        let hits = search_all(&templates, &primers, 0);
        assert_eq!(hits.len(), 8);
        for (i, template_hits) in hits.iter().enumerate() {
            assert_eq!(template_hits.template_id, format!("contig_{}", i));
            assert_eq!(template_hits.forward.len(), 1);
            assert_eq!(template_hits.forward[0].start, i);
        }
    }

    #[test]
    fn test_primer_orientation_labels() {
        let labels: Vec<String> = PrimerOrientation::ALL.iter().map(|o| o.to_string()).collect();
        assert_eq!(labels, vec!["Forward", "Forward RC", "Reverse", "Reverse RC"]);
    }
}
