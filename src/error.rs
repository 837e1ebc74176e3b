//! Error types for in-silico PCR

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, PcrError>;

/// Errors raised while configuring or running a PCR simulation.
///
/// Configuration errors are raised eagerly, before any matching begins.
/// An empty hit list is never an error; only a run that yields no
/// amplicons at all is.
#[derive(Debug, Error)]
pub enum PcrError {
    /// Primer contains a character outside the 15-letter IUPAC nucleotide alphabet
    #[error("Invalid IUPAC base '{symbol}' at position {position} in primer '{primer}'")]
    InvalidPrimerSymbol {
        /// The offending primer as supplied
        primer: String,
        /// The character that could not be compiled
        symbol: char,
        /// 0-based position of the character
        position: usize,
    },

    /// Primer string is empty
    #[error("{which} primer cannot be empty")]
    EmptyPrimer {
        /// "forward" or "reverse"
        which: &'static str,
    },

    /// Negative error budget
    #[error("Maximum number of errors must be non-negative, got {0}")]
    InvalidErrorBudget(i64),

    /// Length window is empty or non-positive
    #[error("Invalid amplicon length window: min_len={min_len}, max_len={max_len} (both must be > 0 and min_len <= max_len)")]
    InvalidLengthWindow {
        /// Requested minimum amplicon length
        min_len: i64,
        /// Requested maximum amplicon length
        max_len: i64,
    },

    /// Edge-case proximity threshold is not positive
    #[error("Edge distance must be greater than 0, got {0}")]
    InvalidEdgeDistance(i64),

    /// Matching and assembly finished without a single amplicon
    #[error("No plausible amplicon pairs found (check length thresholds or primer orientation)")]
    NoAmplicon,

    /// Hit lists do not line up with the templates they are assembled against
    #[error("Hits for template '{hits}' do not match template '{template}' at position {index}")]
    HitsMismatch {
        /// 0-based position in the template list
        index: usize,
        /// Template id expected at that position ("<missing>" past the end)
        template: String,
        /// Template id carried by the hit list ("<missing>" past the end)
        hits: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
