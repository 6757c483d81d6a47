//! Error types for the intent engine
//!
//! No-match is never an error: a message that hits no pattern classifies
//! to `None` (or the default intent during aggregation).

use thiserror::Error;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, IntentError>;

#[derive(Debug, Error)]
pub enum IntentError {
    /// Taxonomy or engine settings are inconsistent. Fatal at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A raw pattern failed to compile
    #[error("invalid pattern {pattern:?} for intent '{intent}': {source}")]
    InvalidPattern {
        intent: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The caller passed something the engine cannot work with
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}

impl IntentError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// True for errors that can only be fixed by changing configuration
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::InvalidPattern { .. } | Self::Parse { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_classification() {
        assert!(IntentError::configuration("bad priority").is_configuration());
        assert!(!IntentError::invalid_input("number").is_configuration());
    }

    #[test]
    fn test_display_includes_pattern() {
        let source = regex::Regex::new("(unclosed").unwrap_err();
        let err = IntentError::InvalidPattern {
            intent: "exploring".to_string(),
            pattern: "(unclosed".to_string(),
            source,
        };
        let text = err.to_string();
        assert!(text.contains("exploring"));
        assert!(text.contains("(unclosed"));
    }
}
