//! IUPAC ambiguity codes: primer compilation and reverse complements.
//!
//! A primer is compiled into a [`Pattern`]: one 4-bit base set per primer
//! position (A=1, C=2, G=4, T=8). A template base matches a position when
//! its bit is in that set, so `N` accepts any of A/C/G/T and `R` accepts A
//! or G. Template bases outside A/C/G/T (including `N` in the template)
//! match nothing.

use crate::error::{PcrError, Result};

const A: u8 = 0b0001;
const C: u8 = 0b0010;
const G: u8 = 0b0100;
const T: u8 = 0b1000;

/// The 15 IUPAC nucleotide codes accepted in primers
pub const IUPAC_SYMBOLS: &[u8; 15] = b"ACGTRYSWKMBDHVN";

/// Base set denoted by an IUPAC symbol (case-insensitive)
fn symbol_mask(symbol: u8) -> Option<u8> {
    let mask = match symbol.to_ascii_uppercase() {
        b'A' => A,
        b'C' => C,
        b'G' => G,
        b'T' => T,
        b'R' => A | G,
        b'Y' => C | T,
        b'S' => G | C,
        b'W' => A | T,
        b'K' => G | T,
        b'M' => A | C,
        b'B' => C | G | T,
        b'D' => A | G | T,
        b'H' => A | C | T,
        b'V' => A | C | G,
        b'N' => A | C | G | T,
        _ => return None,
    };
    Some(mask)
}

fn ascii_byte(symbol: char) -> Option<u8> {
    symbol.is_ascii().then_some(symbol as u8)
}

/// Base set of a literal template base; zero for anything but A/C/G/T
#[inline]
pub fn base_mask(base: u8) -> u8 {
    match base {
        b'A' | b'a' => A,
        b'C' | b'c' => C,
        b'G' | b'g' => G,
        b'T' | b't' => T,
        _ => 0,
    }
}

/// An ambiguity-expanded primer in one orientation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    masks: Vec<u8>,
}

impl Pattern {
    /// The primer string this pattern was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// Whether template `base` is one of the bases allowed at `position`
    #[inline]
    pub fn matches_at(&self, position: usize, base: u8) -> bool {
        self.masks[position] & base_mask(base) != 0
    }
}

/// Compile an IUPAC primer into a matchable [`Pattern`].
///
/// Fails on the first character that is not one of the 15 IUPAC
/// nucleotide codes, in either case.
pub fn compile(primer: &str) -> Result<Pattern> {
    let masks = primer
        .chars()
        .enumerate()
        .map(|(position, symbol)| {
            ascii_byte(symbol)
                .and_then(symbol_mask)
                .ok_or_else(|| PcrError::InvalidPrimerSymbol {
                    primer: primer.to_string(),
                    symbol,
                    position,
                })
        })
        .collect::<Result<Vec<u8>>>()?;

    Ok(Pattern {
        source: primer.to_string(),
        masks,
    })
}

/// Complement of a single IUPAC symbol, preserving case
fn complement_symbol(symbol: u8) -> Option<u8> {
    let complement = match symbol {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        b'N' => b'N',
        b'R' => b'Y',
        b'Y' => b'R',
        b'S' => b'S',
        b'W' => b'W',
        b'K' => b'M',
        b'M' => b'K',
        b'B' => b'V',
        b'V' => b'B',
        b'D' => b'H',
        b'H' => b'D',
        b'a'..=b'z' => complement_symbol(symbol.to_ascii_uppercase())?.to_ascii_lowercase(),
        _ => return None,
    };
    Some(complement)
}

/// Reverse complement an IUPAC primer.
///
/// Ambiguity codes complement to the code of the complemented base set
/// (R↔Y, K↔M, B↔V, D↔H; S, W and N are their own complements). Any
/// symbol without a complement is rejected.
pub fn reverse_complement(primer: &str) -> Result<String> {
    let symbols: Vec<char> = primer.chars().collect();
    symbols
        .iter()
        .enumerate()
        .rev()
        .map(|(position, &symbol)| {
            ascii_byte(symbol)
                .and_then(complement_symbol)
                .map(char::from)
                .ok_or_else(|| PcrError::InvalidPrimerSymbol {
                    primer: primer.to_string(),
                    symbol,
                    position,
                })
        })
        .collect()
}

/// Reverse complement a template slice.
///
/// Unlike [`reverse_complement`] this never fails: template sequences may
/// carry gaps or other symbols, which pass through unchanged.
pub fn reverse_complement_seq(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .rev()
        .map(|&b| complement_symbol(b).unwrap_or(b))
        .collect()
}
