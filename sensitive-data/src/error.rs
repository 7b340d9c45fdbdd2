//! Error taxonomy for the sanitizer.
//!
//! Malformed input is never an error: strings that fail to decode as JSON are
//! handled as free text. The variants below signal defects in configuration,
//! in a host-supplied transformer, or in re-encoding a masked structure.

use thiserror::Error;

/// Errors surfaced by [`crate::SensitiveDataSanitizer`] and its collaborators.
#[derive(Debug, Error)]
pub enum Error {
    /// A masked structure decoded from a string could not be encoded back.
    #[error("failed to re-encode sanitized JSON: {0}")]
    Encode(#[source] serde_json::Error),

    /// A transformer accepted an object but could not turn it into a mapping.
    #[error("object transformer failed for `{type_name}`: {message}")]
    Transform {
        /// Type name of the object being transformed.
        type_name: &'static str,
        /// Description of the failure.
        message: String,
    },

    /// A hydrator could not rebuild an object from its masked mapping.
    #[error("failed to hydrate `{type_name}`: {message}")]
    Hydrate {
        /// Type name of the object being rebuilt.
        type_name: &'static str,
        /// Description of the failure.
        message: String,
    },

    /// The sanitizer was configured with invalid settings.
    #[error("invalid sanitizer configuration: {0}")]
    Config(String),
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn transform_error_names_the_type() {
        let error = Error::Transform {
            type_name: "my_app::Payment",
            message: "key must be a string".into(),
        };

        let output = error.to_string();
        assert!(output.contains("my_app::Payment"));
        assert!(output.contains("key must be a string"));
    }

    #[test]
    fn encode_error_exposes_source() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = Error::Encode(source);

        assert!(std::error::Error::source(&error).is_some());
        assert!(error.to_string().starts_with("failed to re-encode"));
    }
}
