//! Adapters for emitting sanitized values through `slog`.
//!
//! This module connects [`SensitiveDataSanitizer`] with `slog` by providing a
//! `slog::Value` that serializes the sanitized form of a value as structured
//! JSON via `slog`'s nested-value support.
//!
//! It is responsible for:
//! - Ensuring the logged representation is the output of
//!   [`SensitiveDataSanitizer::sanitize`], never the original value.
//! - Avoiding fallible logging APIs: sanitization and serialization failures
//!   are represented as placeholder strings rather than propagated as errors.
//!
//! It does not configure `slog` or decide which keys are sensitive.

use serde_json::{Map, Value as JsonValue};
use slog::{Key, Record, Result as SlogResult, Serializer, Value as SlogValue};

use crate::{
    sanitizer::SensitiveDataSanitizer,
    value::{Object, Value},
};

const SANITIZE_FAILED: &str = "Failed to sanitize value";
const SERIALIZE_FAILED: &str = "Failed to serialize sanitized value";

/// A `slog::Value` that emits an owned sanitized payload as structured JSON.
///
/// Objects no transformer could open are logged as `"[object <type>]"`.
pub struct SanitizedJson {
    value: JsonValue,
}

impl SanitizedJson {
    fn new(value: JsonValue) -> Self {
        Self { value }
    }

    /// The JSON that will be logged.
    pub fn as_json(&self) -> &JsonValue {
        &self.value
    }
}

impl SlogValue for SanitizedJson {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        let nested = slog::Serde(self.value.clone());
        SlogValue::serialize(&nested, record, key, serializer)
    }
}

impl SensitiveDataSanitizer {
    /// Sanitizes `data` and wraps the result for logging.
    ///
    /// ```rust
    /// use sensitive_data::SanitizerSettings;
    /// use serde_json::json;
    ///
    /// let sanitizer = SanitizerSettings::default().build().unwrap();
    /// let value = sanitizer.slog_value(json!({ "password": "hunter2" }));
    ///
    /// assert_eq!(value.as_json(), &json!({ "password": "*REDACTED*" }));
    /// ```
    pub fn slog_value(&self, data: impl Into<Value>) -> SanitizedJson {
        match self.sanitize(data.into()) {
            Ok(sanitized) => SanitizedJson::new(self.loggable(&sanitized)),
            Err(_) => SanitizedJson::new(JsonValue::String(SANITIZE_FAILED.to_owned())),
        }
    }

    fn loggable(&self, value: &Value) -> JsonValue {
        match value {
            Value::Null => JsonValue::Null,
            Value::Bool(flag) => JsonValue::Bool(*flag),
            Value::Number(number) => JsonValue::Number(number.clone()),
            Value::String(text) => JsonValue::String(text.clone()),
            Value::Sequence(items) => {
                JsonValue::Array(items.iter().map(|item| self.loggable(item)).collect())
            }
            Value::Mapping(mapping) => JsonValue::Object(
                mapping
                    .iter()
                    .map(|(key, value)| (key.to_owned(), self.loggable(value)))
                    .collect::<Map<_, _>>(),
            ),
            Value::Object(object) => self.loggable_object(object),
        }
    }

    // A serializable object left after sanitizing is either hydrated output or
    // one no transformer opened; masking its JSON again covers both.
    fn loggable_object(&self, object: &Object) -> JsonValue {
        match object.to_json() {
            Some(Ok(json)) => self
                .sanitize_json(json)
                .unwrap_or_else(|_| JsonValue::String(SANITIZE_FAILED.to_owned())),
            Some(Err(_)) => JsonValue::String(SERIALIZE_FAILED.to_owned()),
            None => JsonValue::String(format!("[object {}]", object.type_name())),
        }
    }
}

/// Converts values into a `slog::Value` that logs their sanitized form as
/// JSON.
///
/// ## Example
/// ```ignore
/// use sensitive_data::slog::IntoSanitizedJson;
///
/// info!(logger, "request"; "body" => body.into_sanitized_json(&sanitizer));
/// ```
pub trait IntoSanitizedJson: Into<Value> + Sized {
    /// Sanitizes `self` with `sanitizer` and returns a loggable value.
    fn into_sanitized_json(self, sanitizer: &SensitiveDataSanitizer) -> SanitizedJson {
        sanitizer.slog_value(self)
    }
}

impl<T> IntoSanitizedJson for T where T: Into<Value> {}
