//! Unified error types for dcflow
//!
//! [`DcFlowError`] covers everything the solver stack can reject: malformed
//! networks, singular reduced systems, malformed backend input and bad
//! configuration knobs. Callers at the binary boundary wrap it in `anyhow`.
//!
//! # Example
//!
//! ```ignore
//! use dcflow_core::{DcFlowError, DcFlowResult};
//!
//! fn run(network: &Network) -> DcFlowResult<()> {
//!     network.validate().into_result()?;
//!     solve(network)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Error type for all dcflow operations.
#[derive(Error, Debug)]
pub enum DcFlowError {
    /// The reduced susceptance matrix cannot be inverted. In a DC power flow
    /// this means some bus has no in-service path to the slack.
    #[error("Singular system: {0}")]
    SingularSystem(String),

    /// Network structure or parameter errors caught before solving
    #[error("Invalid network: {0}")]
    InvalidNetwork(String),

    /// Malformed input handed to a linear backend
    #[error("Solver error: {0}")]
    Solver(String),

    /// Configuration errors (unknown solver kind, bad knob values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors while rendering results
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results using DcFlowError.
pub type DcFlowResult<T> = Result<T, DcFlowError>;

impl DcFlowError {
    /// True for the one error kind a well-formed but disconnected network produces.
    pub fn is_singular(&self) -> bool {
        matches!(self, DcFlowError::SingularSystem(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DcFlowError::SingularSystem("pivot 0.0 at row 1".into());
        assert!(err.to_string().contains("Singular system"));
        assert!(err.to_string().contains("pivot 0.0 at row 1"));
        assert!(err.is_singular());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let err: DcFlowError = io_err.into();
        assert!(matches!(err, DcFlowError::Io(_)));
        assert!(!err.is_singular());
    }

    #[test]
    fn test_question_mark_operator() {
        fn inner() -> DcFlowResult<()> {
            Err(DcFlowError::InvalidNetwork("test".into()))
        }

        fn outer() -> DcFlowResult<()> {
            inner()?;
            Ok(())
        }

        assert!(matches!(outer(), Err(DcFlowError::InvalidNetwork(_))));
    }
}
