//! # Error Types
//!
//! Structured error types for loss_core. Every failure the engine can report
//! is a variant of [`LossError`], serializable to JSON so that callers can
//! log or forward it without losing context.
//!
//! Three families matter to callers:
//!
//! - configuration problems ([`LossError::UnsupportedConfiguration`],
//!   [`LossError::Settings`]) which also land in the status log
//! - numerical defects ([`LossError::AnchorSetNonConvergence`],
//!   [`LossError::Internal`]) which signal a bug or a degenerate model
//! - collaborator failures ([`LossError::Collaborator`]) propagated unchanged
//!
//! ## Example
//!
//! ```rust
//! use loss_core::errors::{LossError, LossResult};
//!
//! fn validate_wobble(k: f64) -> LossResult<()> {
//!     if k < 0.0 {
//!         return Err(LossError::invalid_input(
//!             "wobble_coefficient",
//!             k.to_string(),
//!             "Wobble coefficient cannot be negative",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_wobble(-1.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keys::{DuctKey, MemberEnd};

/// Result type alias for loss_core operations
pub type LossResult<T> = Result<T, LossError>;

/// Structured error type for loss calculations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum LossError {
    /// The project is configured for something this engine does not do
    #[error("Unsupported configuration: {feature} - {reason}")]
    UnsupportedConfiguration { feature: String, reason: String },

    /// An input value is invalid (out of range, wrong sign, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Interval index beyond the schedule
    #[error("Interval {interval} is out of range (schedule has {count} intervals)")]
    IntervalOutOfRange { interval: usize, count: usize },

    /// The bridge model produced no analysis points for a girder line
    #[error("Girder line {girder_line} has no analysis points")]
    NoAnalysisPoints { girder_line: usize },

    /// A duct key does not name a duct known to the girder line
    #[error("Duct not found: {duct}")]
    DuctNotFound { duct: String },

    /// The anchor-set root finder ran out of iterations
    #[error("Anchor set did not converge for {duct} at {end} after {iterations} iterations (residual {residual})")]
    AnchorSetNonConvergence {
        duct: String,
        end: MemberEnd,
        iterations: usize,
        residual: f64,
    },

    /// A collaborator (bridge model, materials, structural analysis) failed
    #[error("{source_name} failed: {reason}")]
    Collaborator { source_name: String, reason: String },

    /// Loss settings could not be read or parsed
    #[error("Settings error: {reason}")]
    Settings { reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl LossError {
    /// Create an UnsupportedConfiguration error
    pub fn unsupported(feature: impl Into<String>, reason: impl Into<String>) -> Self {
        LossError::UnsupportedConfiguration {
            feature: feature.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        LossError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a DuctNotFound error
    pub fn duct_not_found(duct: &DuctKey) -> Self {
        LossError::DuctNotFound {
            duct: duct.to_string(),
        }
    }

    /// Create an AnchorSetNonConvergence error
    pub fn anchor_set_non_convergence(duct: &DuctKey, end: MemberEnd, iterations: usize, residual: f64) -> Self {
        LossError::AnchorSetNonConvergence {
            duct: duct.to_string(),
            end,
            iterations,
            residual,
        }
    }

    /// Create a Collaborator error
    pub fn collaborator(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        LossError::Collaborator {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a Settings error
    pub fn settings(reason: impl Into<String>) -> Self {
        LossError::Settings { reason: reason.into() }
    }

    /// Create an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        LossError::Internal {
            message: message.into(),
        }
    }

    /// True when the error indicates a defect rather than a bad request.
    ///
    /// A defect means an unconverged or inconsistent value would otherwise
    /// have been written into the loss history.
    pub fn is_defect(&self) -> bool {
        matches!(
            self,
            LossError::AnchorSetNonConvergence { .. } | LossError::Internal { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            LossError::UnsupportedConfiguration { .. } => "UNSUPPORTED_CONFIGURATION",
            LossError::InvalidInput { .. } => "INVALID_INPUT",
            LossError::IntervalOutOfRange { .. } => "INTERVAL_OUT_OF_RANGE",
            LossError::NoAnalysisPoints { .. } => "NO_ANALYSIS_POINTS",
            LossError::DuctNotFound { .. } => "DUCT_NOT_FOUND",
            LossError::AnchorSetNonConvergence { .. } => "ANCHOR_SET_NON_CONVERGENCE",
            LossError::Collaborator { .. } => "COLLABORATOR_ERROR",
            LossError::Settings { .. } => "SETTINGS_ERROR",
            LossError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for LossError {
    fn from(err: serde_json::Error) -> Self {
        LossError::settings(err.to_string())
    }
}
