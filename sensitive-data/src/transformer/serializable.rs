use super::{json_to_mapping, ObjectTransformer};
use crate::{
    error::{Error, Result},
    value::{Mapping, Object},
};

/// Catch-all transformer for objects built with [`Object::serializable`].
///
/// The object's serde JSON form becomes the mapping. It cannot rebuild the
/// object, so the sanitized output holds a plain mapping in its place. Use
/// [`crate::TypedTransformer`] when the concrete type must survive.
#[derive(Clone, Copy, Debug)]
pub struct SerializableTransformer {
    priority: i32,
}

impl SerializableTransformer {
    /// Default evaluation rank; lower than every specialised transformer.
    pub const DEFAULT_PRIORITY: i32 = 100;

    /// Creates a transformer with [`Self::DEFAULT_PRIORITY`].
    pub fn new() -> Self {
        Self {
            priority: Self::DEFAULT_PRIORITY,
        }
    }

    /// Overrides the evaluation rank.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl Default for SerializableTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectTransformer for SerializableTransformer {
    fn priority(&self) -> i32 {
        self.priority
    }

    fn supports(&self, object: &Object) -> bool {
        object.is_serializable()
    }

    fn transform(&self, object: &Object) -> Result<Mapping> {
        let failed = |message: String| Error::Transform {
            type_name: object.type_name(),
            message,
        };

        match object.to_json() {
            Some(Ok(json)) => Ok(json_to_mapping(json)),
            Some(Err(error)) => Err(failed(error.to_string())),
            None => Err(failed("object is not serializable".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde::Serialize;

    use super::SerializableTransformer;
    use crate::{Error, Object, ObjectTransformer, Value};

    #[derive(Serialize)]
    struct Credentials {
        username: &'static str,
        password: &'static str,
    }

    #[test]
    fn supports_serializable_objects_only() {
        let transformer = SerializableTransformer::new();

        assert!(transformer.supports(&Object::serializable(1_u8)));
        assert!(!transformer.supports(&Object::new(1_u8)));
    }

    #[test]
    fn transform_uses_serde_form() {
        let transformer = SerializableTransformer::new();
        let object = Object::serializable(Credentials {
            username: "alice",
            password: "hunter2",
        });

        let mapping = transformer.transform(&object).unwrap();

        assert_eq!(mapping.keys().collect::<Vec<_>>(), ["username", "password"]);
        assert_eq!(mapping.get("password"), Some(&Value::from("hunter2")));
    }

    #[test]
    fn serialization_failures_are_reported() {
        // JSON object keys must be strings
        let mut scores = HashMap::new();
        scores.insert(vec![1_u8], 2_u8);
        let object = Object::serializable(scores);

        let error = SerializableTransformer::new().transform(&object).unwrap_err();
        assert!(matches!(error, Error::Transform { .. }));
    }
}
