//! The recursive sanitizer and its configuration.
//!
//! [`SensitiveDataSanitizer::sanitize`] dispatches on the shape of its input:
//! - mappings and sequences: masked entry by entry, recursing into values
//! - objects: handed to the first supporting [`ObjectTransformer`]
//! - strings: decoded and masked structurally if they hold JSON, otherwise run
//!   through the [`StringSanitizer`] pipeline
//! - other scalars: returned unchanged
//!
//! Configuration is fixed when the sanitizer is built; a sanitizer holds no
//! per-call state and can be shared across threads.

mod codec;

use std::{borrow::Cow, cmp::Reverse, fmt};

use serde_json::Value as JsonValue;
use tracing::{debug, trace, warn};

use crate::{
    config::DEFAULT_MASK_PATTERN,
    error::{Error, Result},
    keys::KeyMatcher,
    string::{
        AuthorizationStringSanitizer, CreditCardStringSanitizer, JsonStringSanitizer,
        StringSanitizer, UrlStringSanitizer,
    },
    transformer::{ErrorTransformer, ObjectTransformer, SerializableTransformer},
    value::{Mapping, Object, Value},
};

/// Immutable sanitizer configuration.
///
/// Transformers and sanitizers are stored in evaluation order: descending
/// priority, registration order among equal priorities.
pub struct SanitizerConfig {
    enabled: bool,
    keys_to_mask: KeyMatcher,
    mask_pattern: String,
    object_transformers: Vec<Box<dyn ObjectTransformer>>,
    string_sanitizers: Vec<Box<dyn StringSanitizer>>,
}

impl SanitizerConfig {
    /// Returns `false` when sanitization is switched off.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Keys whose values are always masked.
    pub fn keys_to_mask(&self) -> &KeyMatcher {
        &self.keys_to_mask
    }

    /// Placeholder substituted for masked values.
    pub fn mask_pattern(&self) -> &str {
        &self.mask_pattern
    }

    /// Object transformers in evaluation order.
    pub fn object_transformers(&self) -> &[Box<dyn ObjectTransformer>] {
        &self.object_transformers
    }

    /// String sanitizers in evaluation order.
    pub fn string_sanitizers(&self) -> &[Box<dyn StringSanitizer>] {
        &self.string_sanitizers
    }
}

impl fmt::Debug for SanitizerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let transformers: Vec<_> = self
            .object_transformers
            .iter()
            .map(|transformer| (transformer.name(), transformer.priority()))
            .collect();
        let sanitizers: Vec<_> = self
            .string_sanitizers
            .iter()
            .map(|sanitizer| (sanitizer.name(), sanitizer.priority()))
            .collect();

        f.debug_struct("SanitizerConfig")
            .field("enabled", &self.enabled)
            .field("keys_to_mask", &self.keys_to_mask)
            .field("mask_pattern", &self.mask_pattern)
            .field("object_transformers", &transformers)
            .field("string_sanitizers", &sanitizers)
            .finish()
    }
}

/// Builder for [`SensitiveDataSanitizer`].
///
/// Starts with no keys, no transformers, no string sanitizers and the
/// [`DEFAULT_MASK_PATTERN`]. Use [`crate::SanitizerSettings`] for a builder
/// that starts from the defaults instead.
pub struct SanitizerBuilder {
    enabled: bool,
    keys_to_mask: KeyMatcher,
    mask_pattern: String,
    object_transformers: Vec<Box<dyn ObjectTransformer>>,
    string_sanitizers: Vec<Box<dyn StringSanitizer>>,
}

impl Default for SanitizerBuilder {
    fn default() -> Self {
        Self {
            enabled: true,
            keys_to_mask: KeyMatcher::default(),
            mask_pattern: DEFAULT_MASK_PATTERN.to_owned(),
            object_transformers: Vec::new(),
            string_sanitizers: Vec::new(),
        }
    }
}

impl SanitizerBuilder {
    /// Adds keys to mask. Keys are compared ignoring case.
    #[must_use]
    pub fn keys_to_mask<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.keys_to_mask.extend(keys);
        self
    }

    /// Sets the placeholder substituted for masked values.
    #[must_use]
    pub fn mask_pattern(mut self, mask_pattern: impl Into<String>) -> Self {
        self.mask_pattern = mask_pattern.into();
        self
    }

    /// Registers an object transformer.
    #[must_use]
    pub fn object_transformer(mut self, transformer: impl ObjectTransformer + 'static) -> Self {
        self.object_transformers.push(Box::new(transformer));
        self
    }

    /// Registers a string sanitizer.
    #[must_use]
    pub fn string_sanitizer(mut self, sanitizer: impl StringSanitizer + 'static) -> Self {
        self.string_sanitizers.push(Box::new(sanitizer));
        self
    }

    /// Registers [`ErrorTransformer`] and [`SerializableTransformer`].
    #[must_use]
    pub fn with_default_object_transformers(self) -> Self {
        self.object_transformer(ErrorTransformer::new())
            .object_transformer(SerializableTransformer::new())
    }

    /// Registers the authorization, credit card, JSON and URL sanitizers, in
    /// that order.
    #[must_use]
    pub fn with_default_string_sanitizers(self) -> Self {
        self.string_sanitizer(AuthorizationStringSanitizer::new())
            .string_sanitizer(CreditCardStringSanitizer::new())
            .string_sanitizer(JsonStringSanitizer::new())
            .string_sanitizer(UrlStringSanitizer::new())
    }

    /// Switches sanitization on or off.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Orders the pipelines and builds the sanitizer.
    ///
    /// Fails with [`Error::Config`] if the mask pattern is empty.
    pub fn build(self) -> Result<SensitiveDataSanitizer> {
        let Self {
            enabled,
            keys_to_mask,
            mask_pattern,
            mut object_transformers,
            mut string_sanitizers,
        } = self;

        if mask_pattern.is_empty() {
            return Err(Error::Config("mask pattern must not be empty".into()));
        }

        // Stable sorts keep registration order among equal priorities.
        object_transformers.sort_by_key(|transformer| Reverse(transformer.priority()));
        string_sanitizers.sort_by_key(|sanitizer| Reverse(sanitizer.priority()));

        debug!(
            enabled,
            keys = keys_to_mask.len(),
            object_transformers = object_transformers.len(),
            string_sanitizers = string_sanitizers.len(),
            "built sensitive data sanitizer"
        );

        Ok(SensitiveDataSanitizer {
            config: SanitizerConfig {
                enabled,
                keys_to_mask,
                mask_pattern,
                object_transformers,
                string_sanitizers,
            },
        })
    }
}

/// Masks sensitive data in values of unknown shape.
///
/// Build one per process and share it; it is `Send + Sync`.
#[derive(Debug)]
pub struct SensitiveDataSanitizer {
    config: SanitizerConfig,
}

impl SensitiveDataSanitizer {
    /// Returns an empty builder.
    pub fn builder() -> SanitizerBuilder {
        SanitizerBuilder::default()
    }

    /// The configuration this sanitizer was built with.
    pub fn config(&self) -> &SanitizerConfig {
        &self.config
    }

    /// Returns a masked copy of `data`.
    ///
    /// Fails only if a transformer fails or a masked JSON string cannot be
    /// re-encoded. Input that does not decode as JSON is never an error.
    pub fn sanitize(&self, data: Value) -> Result<Value> {
        if !self.config.enabled {
            return Ok(data);
        }
        self.sanitize_value(data)
    }

    /// [`sanitize`](Self::sanitize) for `serde_json` values.
    pub fn sanitize_json(&self, json: JsonValue) -> Result<JsonValue> {
        if !self.config.enabled {
            return Ok(json);
        }
        self.sanitize_value(Value::from_json(json))?
            .to_json()
            .map_err(Error::Encode)
    }

    /// [`sanitize`](Self::sanitize) for a single string.
    pub fn sanitize_str(&self, text: &str) -> Result<String> {
        if !self.config.enabled {
            return Ok(text.to_owned());
        }
        self.sanitize_string_value(text.to_owned())
    }

    fn sanitize_value(&self, value: Value) -> Result<Value> {
        match value {
            Value::Mapping(mapping) => self.sanitize_array(mapping).map(Value::Mapping),
            Value::Sequence(items) => self.sanitize_sequence(items).map(Value::Sequence),
            Value::Object(object) => self.sanitize_object(object),
            Value::String(text) => self.sanitize_string_value(text).map(Value::String),
            scalar => Ok(scalar),
        }
    }

    fn masked(&self) -> Value {
        Value::String(self.config.mask_pattern.clone())
    }

    fn sanitize_array(&self, mapping: Mapping) -> Result<Mapping> {
        let mut sanitized = Mapping::with_capacity(mapping.len());
        for (key, value) in mapping {
            let value = if self.config.keys_to_mask.matches(&key) {
                self.masked()
            } else {
                self.sanitize_value(value)?
            };
            sanitized.push(key, value);
        }
        Ok(sanitized)
    }

    fn sanitize_sequence(&self, items: Vec<Value>) -> Result<Vec<Value>> {
        let keys = &self.config.keys_to_mask;
        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                if !keys.is_empty() && keys.matches(&index.to_string()) {
                    Ok(self.masked())
                } else {
                    self.sanitize_value(item)
                }
            })
            .collect()
    }

    fn sanitize_object(&self, object: Object) -> Result<Value> {
        let Some(transformer) = self
            .config
            .object_transformers
            .iter()
            .find(|transformer| transformer.supports(&object))
        else {
            trace!(
                type_name = object.type_name(),
                "no object transformer supports value, passing it through"
            );
            return Ok(Value::Object(object));
        };

        let masked = self.sanitize_array(transformer.transform(&object)?)?;
        let Some(hydrator) = transformer.as_hydrator() else {
            return Ok(Value::Mapping(masked));
        };

        match hydrator.hydrate(&object, masked.clone()) {
            Ok(hydrated) => Ok(hydrated),
            Err(error) => {
                warn!(
                    type_name = object.type_name(),
                    transformer = transformer.name(),
                    %error,
                    "hydration failed, returning the masked mapping"
                );
                Ok(Value::Mapping(masked))
            }
        }
    }

    fn sanitize_string_value(&self, text: String) -> Result<String> {
        if let Some(decoded) = codec::decode_structure(&text) {
            return codec::encode(&self.sanitize_value(decoded)?);
        }

        if text.contains('\\') {
            if let Some(decoded) = codec::decode_structure(&codec::strip_slashes(&text)) {
                let encoded = codec::encode(&self.sanitize_value(decoded)?)?;
                return Ok(codec::add_slashes(&encoded));
            }
        }

        let sanitized = match self.sanitize_text(&text) {
            Cow::Borrowed(_) => None,
            Cow::Owned(sanitized) => Some(sanitized),
        };
        Ok(sanitized.unwrap_or(text))
    }

    fn sanitize_text<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut current = Cow::Borrowed(text);
        for sanitizer in &self.config.string_sanitizers {
            let sanitized = match sanitizer.sanitize_string(
                &current,
                &self.config.mask_pattern,
                &self.config.keys_to_mask,
            ) {
                Cow::Borrowed(_) => None,
                Cow::Owned(sanitized) => Some(sanitized),
            };
            if let Some(sanitized) = sanitized {
                current = Cow::Owned(sanitized);
            }
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use serde_json::json;

    use super::SensitiveDataSanitizer;
    use crate::{
        Error, KeyMatcher, Mapping, Object, ObjectTransformer, StringSanitizer, Value,
    };

    struct Tag {
        name: &'static str,
        priority: i32,
    }

    impl ObjectTransformer for Tag {
        fn priority(&self) -> i32 {
            self.priority
        }

        fn supports(&self, _object: &Object) -> bool {
            true
        }

        fn transform(&self, _object: &Object) -> crate::Result<Mapping> {
            Ok(std::iter::once(("by", self.name)).collect())
        }
    }

    struct Append(&'static str);

    impl StringSanitizer for Append {
        fn sanitize_string<'a>(
            &self,
            input: &'a str,
            _mask_pattern: &str,
            _keys_to_mask: &KeyMatcher,
        ) -> Cow<'a, str> {
            Cow::Owned(format!("{input}{}", self.0))
        }
    }

    struct Failing;

    impl ObjectTransformer for Failing {
        fn supports(&self, _object: &Object) -> bool {
            true
        }

        fn transform(&self, object: &Object) -> crate::Result<Mapping> {
            Err(Error::Transform {
                type_name: object.type_name(),
                message: "unsupported layout".into(),
            })
        }
    }

    fn sanitizer(keys: &[&str]) -> SensitiveDataSanitizer {
        SensitiveDataSanitizer::builder()
            .keys_to_mask(keys)
            .build()
            .unwrap()
    }

    #[test]
    fn masks_keys_at_any_depth() {
        let sanitized = sanitizer(&["secret"])
            .sanitize_json(json!({
                "a": { "b": [{ "SECRET": { "nested": true } }] },
                "secret": null,
            }))
            .unwrap();

        assert_eq!(
            sanitized,
            json!({
                "a": { "b": [{ "SECRET": "*REDACTED*" }] },
                "secret": "*REDACTED*",
            })
        );
    }

    #[test]
    fn sequence_indexes_are_keys() {
        let sanitized = sanitizer(&["1"])
            .sanitize_json(json!(["a", "b", "c"]))
            .unwrap();

        assert_eq!(sanitized, json!(["a", "*REDACTED*", "c"]));
    }

    #[test]
    fn scalars_pass_through() {
        let sanitizer = sanitizer(&["password"]);

        for value in [Value::Null, Value::from(true), Value::from(42), Value::from(1.5)] {
            assert_eq!(sanitizer.sanitize(value.clone()).unwrap(), value);
        }
    }

    #[test]
    fn disabled_sanitizer_returns_input() {
        let sanitizer = SensitiveDataSanitizer::builder()
            .keys_to_mask(["password"])
            .enabled(false)
            .build()
            .unwrap();
        let input = json!({ "password": "hunter2" });

        assert_eq!(sanitizer.sanitize_json(input.clone()).unwrap(), input);
        assert_eq!(
            sanitizer.sanitize_str("Bearer abcdefghij").unwrap(),
            "Bearer abcdefghij"
        );
    }

    #[test]
    fn transformers_run_in_descending_priority_with_stable_ties() {
        let sanitizer = SensitiveDataSanitizer::builder()
            .object_transformer(Tag { name: "low", priority: 1 })
            .object_transformer(Tag { name: "first-high", priority: 5 })
            .object_transformer(Tag { name: "second-high", priority: 5 })
            .build()
            .unwrap();

        let priorities: Vec<_> = sanitizer
            .config()
            .object_transformers()
            .iter()
            .map(|transformer| transformer.priority())
            .collect();
        assert_eq!(priorities, [5, 5, 1]);

        let sanitized = sanitizer.sanitize(Value::from(Object::new(()))).unwrap();
        assert_eq!(sanitized.get("by"), Some(&Value::from("first-high")));
    }

    #[test]
    fn string_sanitizers_see_earlier_output() {
        let sanitizer = SensitiveDataSanitizer::builder()
            .string_sanitizer(Append("-a"))
            .string_sanitizer(Append("-b"))
            .build()
            .unwrap();

        assert_eq!(sanitizer.sanitize_str("x").unwrap(), "x-a-b");
    }

    #[test]
    fn transformer_output_is_masked() {
        let sanitizer = SensitiveDataSanitizer::builder()
            .keys_to_mask(["by"])
            .object_transformer(Tag { name: "tag", priority: 0 })
            .build()
            .unwrap();

        let sanitized = sanitizer.sanitize(Value::from(Object::new(()))).unwrap();
        assert_eq!(sanitized.get("by"), Some(&Value::from("*REDACTED*")));
    }

    #[test]
    fn transform_errors_propagate() {
        let sanitizer = SensitiveDataSanitizer::builder()
            .object_transformer(Failing)
            .build()
            .unwrap();

        let result = sanitizer.sanitize(Value::from(vec![Value::from(Object::new(7_u8))]));
        assert!(matches!(result, Err(Error::Transform { .. })));
    }

    #[test]
    fn json_strings_are_masked_and_reencoded() {
        let sanitizer = sanitizer(&["token"]);

        assert_eq!(
            sanitizer.sanitize_str(r#"{"token":"secret123","n":[1,2]}"#).unwrap(),
            r#"{"token":"*REDACTED*","n":[1,2]}"#
        );
    }

    #[test]
    fn escaped_json_strings_keep_their_escaping() {
        let sanitizer = sanitizer(&["token"]);

        assert_eq!(
            sanitizer.sanitize_str(r#"{\"token\":\"abc\"}"#).unwrap(),
            r#"{\"token\":\"*REDACTED*\"}"#
        );
    }

    #[test]
    fn nested_json_strings_are_decoded_too() {
        let sanitizer = sanitizer(&["token"]);
        let inner = r#"{"token":"abc"}"#;

        let sanitized = sanitizer
            .sanitize_json(json!({ "payload": inner }))
            .unwrap();
        assert_eq!(sanitized, json!({ "payload": r#"{"token":"*REDACTED*"}"# }));
    }

    #[test]
    fn json_scalars_in_strings_are_plain_text() {
        let sanitizer = sanitizer(&["token"]);

        assert_eq!(sanitizer.sanitize_str("12").unwrap(), "12");
        assert_eq!(sanitizer.sanitize_str(r#""token""#).unwrap(), r#""token""#);
    }

    #[test]
    fn debug_lists_pipeline_names() {
        let sanitizer = SensitiveDataSanitizer::builder()
            .with_default_object_transformers()
            .build()
            .unwrap();

        let output = format!("{:?}", sanitizer.config());
        assert!(output.contains("ErrorTransformer"));
        assert!(output.contains("SerializableTransformer"));
    }
}
