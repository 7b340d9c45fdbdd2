//! Declarative sanitizer settings.
//!
//! [`SanitizerSettings`] is the shape hosts load from their own configuration
//! files. It only covers what can be expressed as data; custom transformers
//! and sanitizers are added on the [`SanitizerBuilder`] it produces.

use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    sanitizer::{SanitizerBuilder, SensitiveDataSanitizer},
};

/// Placeholder substituted for masked values unless configured otherwise.
pub const DEFAULT_MASK_PATTERN: &str = "*REDACTED*";

/// Keys masked by default, merged with any configured keys.
pub const DEFAULT_KEYS_TO_MASK: &[&str] = &[
    "access_key",
    "access_secret",
    "access_token",
    "apikey",
    "api_key",
    "auth_basic",
    "auth_bearer",
    "authorization",
    "card_number",
    "cardnumber",
    "cvc",
    "cvv",
    "password",
    "php-auth-pw",
    "php_auth_pw",
    "secret",
    "token",
    "x-api-key",
    "x-shared-key",
];

/// Data-only sanitizer configuration.
///
/// Every field is optional when deserializing; unknown fields are rejected so
/// a misspelt option fails loudly.
///
/// ```rust
/// use sensitive_data::SanitizerSettings;
///
/// let settings: SanitizerSettings = serde_json::from_str(
///     r#"{ "keys_to_mask": ["iban"], "mask_pattern": "[hidden]" }"#,
/// )
/// .unwrap();
/// let sanitizer = settings.build().unwrap();
///
/// assert!(sanitizer.config().keys_to_mask().matches("IBAN"));
/// assert!(sanitizer.config().keys_to_mask().matches("password"));
/// assert_eq!(sanitizer.config().mask_pattern(), "[hidden]");
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SanitizerSettings {
    /// When `false`, the sanitizer returns every input unchanged.
    pub enabled: bool,
    /// Extra keys to mask.
    pub keys_to_mask: Vec<String>,
    /// Merge [`DEFAULT_KEYS_TO_MASK`] into `keys_to_mask`.
    pub use_default_keys_to_mask: bool,
    /// Placeholder for masked values; [`DEFAULT_MASK_PATTERN`] when unset.
    pub mask_pattern: Option<String>,
    /// Register the built-in error and serializable transformers.
    pub use_default_object_transformers: bool,
    /// Register the built-in string sanitizers.
    pub use_default_string_sanitizers: bool,
}

impl Default for SanitizerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            keys_to_mask: Vec::new(),
            use_default_keys_to_mask: true,
            mask_pattern: None,
            use_default_object_transformers: true,
            use_default_string_sanitizers: true,
        }
    }
}

impl SanitizerSettings {
    /// Returns a builder pre-populated from these settings.
    pub fn builder(&self) -> SanitizerBuilder {
        let mut builder = SensitiveDataSanitizer::builder().enabled(self.enabled);

        if self.use_default_keys_to_mask {
            builder = builder.keys_to_mask(DEFAULT_KEYS_TO_MASK.iter().copied());
        }
        builder = builder.keys_to_mask(&self.keys_to_mask);

        if let Some(mask_pattern) = &self.mask_pattern {
            builder = builder.mask_pattern(mask_pattern);
        }
        if self.use_default_object_transformers {
            builder = builder.with_default_object_transformers();
        }
        if self.use_default_string_sanitizers {
            builder = builder.with_default_string_sanitizers();
        }
        builder
    }

    /// Builds a sanitizer from these settings alone.
    pub fn build(&self) -> Result<SensitiveDataSanitizer> {
        self.builder().build()
    }
}
