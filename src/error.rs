//! Per-identifier failure taxonomy.
//!
//! Every way a fetch can go wrong collapses into one of three recoverable
//! kinds. A failure terminates only that identifier's row; the batch keeps
//! going.

use thiserror::Error;

/// Why a metric record could not be resolved for one security code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Host unreachable, request timed out, or non-success HTTP status.
    #[error("network error: {0}")]
    Network(String),

    /// Expected anchor or field missing from the document, or non-numeric
    /// content where a ratio was expected. Also the catch-all for responses
    /// in no recognizable shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// Identifier malformed, e.g. empty after trimming.
    #[error("invalid code: {0}")]
    Validation(String),
}

impl FetchError {
    pub fn network(cause: impl Into<String>) -> Self {
        Self::Network(cause.into())
    }

    pub fn parse(cause: impl Into<String>) -> Self {
        Self::Parse(cause.into())
    }

    pub fn validation(cause: impl Into<String>) -> Self {
        Self::Validation(cause.into())
    }

    /// The human-readable cause string surfaced in failed report rows.
    pub fn cause(&self) -> &str {
        match self {
            Self::Network(c) | Self::Parse(c) | Self::Validation(c) => c,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network("timeout".to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cause_is_preserved() {
        let err = FetchError::network("connection refused");
        assert_eq!(err.cause(), "connection refused");
        assert_eq!(err.to_string(), "network error: connection refused");
    }

    #[test]
    fn test_parse_display() {
        let err = FetchError::parse("PBR not found");
        assert_eq!(err.to_string(), "parse error: PBR not found");
    }
}
