//! Error types for the portfolio behavior layer.
//!
//! Only configuration loading can fail at runtime. Missing page elements are
//! never errors: every behavior degrades to a silent no-op instead.

use thiserror::Error;

/// Result type alias for portfolio operations.
pub type PortfolioResult<T> = Result<T, PortfolioError>;

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum PortfolioError {
    /// Configuration JSON could not be parsed.
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A root margin string is not a list of one to four pixel lengths.
    #[error("Invalid root margin {margin:?}: {reason}")]
    InvalidRootMargin { margin: String, reason: String },
}

impl PortfolioError {
    /// Creates an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Creates an InvalidRootMargin error.
    pub fn invalid_root_margin(margin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRootMargin {
            margin: margin.into(),
            reason: reason.into(),
        }
    }
}

/// Contact form validation failures.
///
/// These are recovered locally: they block the submission and render an
/// inline notice, nothing else.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was absent or blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// A field is shorter than its minimum length (trimmed, in characters).
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    /// The email address does not look like `local@domain.tld`.
    #[error("email address is malformed")]
    InvalidEmailFormat,
}

impl ValidationError {
    /// Creates a TooShort error.
    pub fn too_short(field: &'static str, min: usize) -> Self {
        Self::TooShort { field, min }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField(field) | Self::TooShort { field, .. } => field,
            Self::InvalidEmailFormat => "email",
        }
    }
}
