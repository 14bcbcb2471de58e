//! Error type shared by every stage of the network evaluation.
//!
//! Errors fall into two families. Setup errors (missing or malformed tables,
//! oversized batches, bad configuration files) abort initialisation. Evaluation
//! errors (temperature non-convergence, numerical-domain violations) are
//! reported back to the integrator so it can shrink the step and retry.
use thiserror::Error;

/// Status returned to the integrator on success.
pub const STATUS_OK: i32 = 0;
/// Status for a failed evaluation the integrator may retry with a smaller step.
pub const STATUS_EVALUATION_FAILED: i32 = -1;
/// Status for a setup/shape problem that retrying cannot fix.
pub const STATUS_SETUP_FAILED: i32 = -2;

#[derive(Debug, Error)]
pub enum ChemistryError {
    #[error("table '{0}' was not supplied by the table source")]
    MissingTable(String),
    #[error("table '{key}' has {found} entries, expected {expected}")]
    TableLength {
        key: String,
        expected: usize,
        found: usize,
    },
    #[error("failed to access '{path}': {source}")]
    FileAccess {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON data: {0}")]
    TableFormat(#[from] serde_json::Error),
    #[error("batch of {requested} cells exceeds the maximum of {max} cells per strip")]
    BatchTooLarge { requested: usize, max: usize },
    #[error("{what} has length {found}, expected {expected}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("temperature failed to converge in cell {cell} after {iterations} iterations")]
    TemperatureNotConverged { cell: usize, iterations: usize },
    #[error("{quantity} is out of its numerical domain in cell {cell}: {value}")]
    NumericalDomain {
        cell: usize,
        quantity: &'static str,
        value: f64,
    },
    #[error("derived quantities were not set up before evaluation")]
    DerivedNotInitialized,
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ChemistryError {
    /// Integer flag understood by the integrator collaborator.
    pub fn status_code(&self) -> i32 {
        match self {
            ChemistryError::TemperatureNotConverged { .. }
            | ChemistryError::NumericalDomain { .. } => STATUS_EVALUATION_FAILED,
            _ => STATUS_SETUP_FAILED,
        }
    }

    /// True when the integrator may recover by retrying with a smaller step.
    pub fn is_recoverable(&self) -> bool {
        self.status_code() == STATUS_EVALUATION_FAILED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let e = ChemistryError::TemperatureNotConverged {
            cell: 3,
            iterations: 100,
        };
        assert_eq!(e.status_code(), STATUS_EVALUATION_FAILED);
        assert!(e.is_recoverable());
        let e = ChemistryError::MissingTable("k01".to_string());
        assert_eq!(e.status_code(), STATUS_SETUP_FAILED);
        assert!(!e.is_recoverable());
        assert_eq!(
            e.to_string(),
            "table 'k01' was not supplied by the table source"
        );
    }
}
