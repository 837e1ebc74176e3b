//! Bounded edit-distance primer search.
//!
//! # Algorithm
//!
//! 1. Semi-global dynamic programming over the template (the primer must be
//!    consumed in full, the template prefix and suffix are free). One column
//!    of `primer_len + 1` cells is kept per template position; every cell
//!    carries the start of its best alignment and its substitution,
//!    insertion and deletion counts, so no traceback is needed.
//! 2. Cells are ranked by (errors, start): for a given end, the best
//!    alignment is the one with the fewest errors and, among those, the
//!    leftmost start. Cells above the error budget are pruned.
//! 3. Every template end whose last-row cell is within budget becomes a
//!    candidate. Candidates are taken in (errors, start, end) order and kept
//!    unless they overlap an already kept hit, so each matching region
//!    reports its single best alignment and distinct occurrences are all
//!    reported.
//!
//! 4. The gaps between kept hits are searched again on their own, so a
//!    weaker occurrence hidden behind an overlapping candidate (tandem or
//!    periodic sequence) is still reported.
//!
//! Insertions are template bases absent from the primer; deletions are
//! primer positions absent from the template.

use crate::iupac::Pattern;
use std::collections::BTreeMap;
use std::fmt;

/// A primer hit on a template: half-open, 0-based `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Match {
    pub start: usize,
    pub end: usize,
    pub substitutions: usize,
    pub insertions: usize,
    pub deletions: usize,
}

impl Match {
    /// Substitutions + insertions + deletions
    pub fn total_errors(&self) -> usize {
        self.substitutions + self.insertions + self.deletions
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    pub fn is_exact(&self) -> bool {
        self.total_errors() == 0
    }

    fn shifted(self, offset: usize) -> Match {
        Match {
            start: self.start + offset,
            end: self.end + offset,
            ..self
        }
    }

    fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "start={}, end={}, ", self.start, self.end)?;
        if self.is_exact() {
            write!(f, "exact match")
        } else {
            write!(
                f,
                "fuzzy match with {} substitutions, {} insertions, {} deletions (total errors: {})",
                self.substitutions,
                self.insertions,
                self.deletions,
                self.total_errors()
            )
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    errors: usize,
    start: usize,
    substitutions: usize,
    insertions: usize,
    deletions: usize,
}

impl Cell {
    const PRUNED: Cell = Cell {
        errors: usize::MAX,
        start: usize::MAX,
        substitutions: 0,
        insertions: 0,
        deletions: 0,
    };

    fn is_pruned(&self) -> bool {
        self.errors == usize::MAX
    }

    fn beats(&self, other: &Cell) -> bool {
        (self.errors, self.start) < (other.errors, other.start)
    }

    fn substitute(self, mismatch: bool) -> Cell {
        if self.is_pruned() || !mismatch {
            return self;
        }
        Cell {
            errors: self.errors + 1,
            substitutions: self.substitutions + 1,
            ..self
        }
    }

    fn insert(self) -> Cell {
        if self.is_pruned() {
            return self;
        }
        Cell {
            errors: self.errors + 1,
            insertions: self.insertions + 1,
            ..self
        }
    }

    fn delete(self) -> Cell {
        if self.is_pruned() {
            return self;
        }
        Cell {
            errors: self.errors + 1,
            deletions: self.deletions + 1,
            ..self
        }
    }

    fn within(self, max_errors: usize) -> Cell {
        if self.errors > max_errors {
            Cell::PRUNED
        } else {
            self
        }
    }
}

/// Find every best, non-overlapping occurrence of `pattern` in `template`
/// with at most `max_errors` substitutions, insertions and deletions.
///
/// Matching is case-insensitive. Hits are returned sorted by start; an
/// empty vector means the primer does not bind anywhere.
pub fn find_matches(pattern: &Pattern, template: &[u8], max_errors: usize) -> Vec<Match> {
    let mut hits = Vec::new();
    search_region(pattern, template, 0, max_errors, &mut hits);
    hits
}

/// Search `region` (starting at `offset` in the template), then the gaps
/// left between its kept hits.
///
/// Each template end carries a single best cell, so a weaker alignment
/// ending at the same position is lost when that cell overlaps a kept hit.
/// Re-searching the uncovered gaps recovers such alignments in periodic
/// sequence. Hits are pushed in start order.
fn search_region(
    pattern: &Pattern,
    region: &[u8],
    offset: usize,
    max_errors: usize,
    hits: &mut Vec<Match>,
) {
    if region.len() + max_errors < pattern.len() {
        return;
    }
    let kept = select_best(candidate_hits(pattern, region, max_errors));
    if kept.is_empty() {
        return;
    }

    let mut gap_start = 0;
    for hit in kept {
        search_region(
            pattern,
            &region[gap_start..hit.start],
            offset + gap_start,
            max_errors,
            hits,
        );
        hits.push(hit.shifted(offset));
        gap_start = hit.end;
    }
    search_region(
        pattern,
        &region[gap_start..],
        offset + gap_start,
        max_errors,
        hits,
    );
}

/// Best in-budget alignment ending at each template position
fn candidate_hits(pattern: &Pattern, template: &[u8], max_errors: usize) -> Vec<Match> {
    let m = pattern.len();
    if m == 0 {
        return Vec::new();
    }

    // Column for the empty template prefix: only primer deletions
    let mut prev: Vec<Cell> = (0..=m)
        .map(|i| {
            Cell {
                errors: i,
                start: 0,
                substitutions: 0,
                insertions: 0,
                deletions: i,
            }
            .within(max_errors)
        })
        .collect();
    let mut cur = vec![Cell::PRUNED; m + 1];
    let mut candidates = Vec::new();

    for (j, &base) in template.iter().enumerate() {
        let end = j + 1;
        cur[0] = Cell {
            errors: 0,
            start: end,
            substitutions: 0,
            insertions: 0,
            deletions: 0,
        };

        for i in 1..=m {
            let mut best = prev[i - 1].substitute(!pattern.matches_at(i - 1, base));
            let deletion = cur[i - 1].delete();
            if deletion.beats(&best) {
                best = deletion;
            }
            let insertion = prev[i].insert();
            if insertion.beats(&best) {
                best = insertion;
            }
            cur[i] = best.within(max_errors);
        }

        let last = cur[m];
        if !last.is_pruned() && last.start < end {
            candidates.push(Match {
                start: last.start,
                end,
                substitutions: last.substitutions,
                insertions: last.insertions,
                deletions: last.deletions,
            });
        }

        std::mem::swap(&mut prev, &mut cur);
    }

    candidates
}

/// Keep the best candidate of every region: fewest errors, then leftmost
/// start, then shortest span; drop anything overlapping a kept hit.
fn select_best(mut candidates: Vec<Match>) -> Vec<Match> {
    candidates.sort_by_key(|hit| (hit.total_errors(), hit.start, hit.end));

    let mut kept: BTreeMap<usize, Match> = BTreeMap::new();
    for hit in candidates {
        let before = kept.range(..=hit.start).next_back().map(|(_, m)| m);
        let after = kept.range(hit.start..).next().map(|(_, m)| m);
        let overlapping = [before, after]
            .into_iter()
            .flatten()
            .any(|m| m.overlaps(hit.start, hit.end));
        if !overlapping {
            kept.insert(hit.start, hit);
        }
    }

    kept.into_values().collect()
}
