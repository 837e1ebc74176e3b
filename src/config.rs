//! Run parameters for a PCR simulation.

use crate::error::{PcrError, Result};
use log::debug;

/// Default maximum number of edit operations per primer hit
pub const DEFAULT_MAX_ERRORS: usize = 1;
/// Default minimum amplicon length
pub const DEFAULT_MIN_LEN: usize = 100;
/// Default maximum amplicon length
pub const DEFAULT_MAX_LEN: usize = 2000;
/// Default distance from a template boundary within which an unpaired
/// primer hit may still produce an edge amplicon
pub const DEFAULT_EDGE_DISTANCE: usize = 1500;

/// Validated thresholds shared by every template in a run.
///
/// Build it with [`PcrConfig::new`] so that an invalid budget or length
/// window is rejected before any primer is compiled or searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcrConfig {
    /// Maximum substitutions + insertions + deletions per primer hit
    pub max_errors: usize,
    /// Minimum amplicon length (inclusive)
    pub min_len: usize,
    /// Maximum amplicon length (inclusive)
    pub max_len: usize,
    /// Proximity threshold for edge-case amplicons
    pub edge_distance: usize,
}

impl Default for PcrConfig {
    fn default() -> Self {
        Self {
            max_errors: DEFAULT_MAX_ERRORS,
            min_len: DEFAULT_MIN_LEN,
            max_len: DEFAULT_MAX_LEN,
            edge_distance: DEFAULT_EDGE_DISTANCE,
        }
    }
}

impl PcrConfig {
    /// Validate raw (possibly negative) parameters as they arrive from a caller.
    pub fn new(max_errors: i64, min_len: i64, max_len: i64, edge_distance: i64) -> Result<Self> {
        if max_errors < 0 {
            return Err(PcrError::InvalidErrorBudget(max_errors));
        }
        if min_len <= 0 || max_len <= 0 || min_len > max_len {
            return Err(PcrError::InvalidLengthWindow { min_len, max_len });
        }
        if edge_distance <= 0 {
            return Err(PcrError::InvalidEdgeDistance(edge_distance));
        }

        debug!(
            "Config: max_errors={}, length window={}-{} bp, edge_distance={}",
            max_errors, min_len, max_len, edge_distance
        );

        Ok(Self {
            max_errors: max_errors as usize,
            min_len: min_len as usize,
            max_len: max_len as usize,
            edge_distance: edge_distance as usize,
        })
    }

    /// Whether an amplicon of `length` bases falls inside the length window
    pub fn accepts_length(&self, length: usize) -> bool {
        self.min_len <= length && length <= self.max_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_valid() {
        let config = PcrConfig::new(2, 100, 2000, 1500).unwrap();
        assert_eq!(config.max_errors, 2);
        assert_eq!(config.min_len, 100);
        assert_eq!(config.max_len, 2000);
        assert_eq!(config.edge_distance, 1500);
    }

    #[test]
    fn test_config_default_matches_tool_defaults() {
        let config = PcrConfig::default();
        assert_eq!(config, PcrConfig::new(1, 100, 2000, 1500).unwrap());
    }

    #[test]
    fn test_config_zero_errors_allowed() {
        assert!(PcrConfig::new(0, 1, 1, 1).is_ok());
    }

    #[test]
    fn test_config_negative_errors() {
        let result = PcrConfig::new(-1, 100, 2000, 1500);
        assert!(matches!(result, Err(PcrError::InvalidErrorBudget(-1))));
    }

    #[test]
    fn test_config_min_greater_than_max() {
        let result = PcrConfig::new(1, 2000, 100, 1500);
        assert!(matches!(
            result,
            Err(PcrError::InvalidLengthWindow {
                min_len: 2000,
                max_len: 100
            })
        ));
    }

    #[test]
    fn test_config_non_positive_lengths() {
        assert!(matches!(
            PcrConfig::new(1, 0, 100, 1500),
            Err(PcrError::InvalidLengthWindow { .. })
        ));
        assert!(matches!(
            PcrConfig::new(1, -5, -1, 1500),
            Err(PcrError::InvalidLengthWindow { .. })
        ));
    }

    #[test]
    fn test_config_invalid_edge_distance() {
        assert!(matches!(
            PcrConfig::new(1, 100, 2000, 0),
            Err(PcrError::InvalidEdgeDistance(0))
        ));
    }

    #[test]
    fn test_accepts_length_is_inclusive() {
        let config = PcrConfig::new(0, 10, 20, 1500).unwrap();
        assert!(!config.accepts_length(9));
        assert!(config.accepts_length(10));
        assert!(config.accepts_length(20));
        assert!(!config.accepts_length(21));
    }
}
