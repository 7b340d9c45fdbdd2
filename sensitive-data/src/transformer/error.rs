use super::ObjectTransformer;
use crate::{
    error::Result,
    value::{Mapping, Object, Value},
};

/// Transforms errors built with [`Object::from_error`].
///
/// The mapping has three keys:
/// - `type`: the error's type name
/// - `message`: its `Display` output
/// - `sources`: the `Display` output of each error in its source chain
///
/// Messages are plain strings, so the string sanitizers still scrub them.
#[derive(Clone, Copy, Debug)]
pub struct ErrorTransformer {
    priority: i32,
}

impl ErrorTransformer {
    /// Default evaluation rank; errors are recognised before generic objects.
    pub const DEFAULT_PRIORITY: i32 = 10_000;

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

impl Default for ErrorTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectTransformer for ErrorTransformer {
    fn priority(&self) -> i32 {
        self.priority
    }

    fn supports(&self, object: &Object) -> bool {
        object.as_error().is_some()
    }

    fn transform(&self, object: &Object) -> Result<Mapping> {
        let error = object.as_error().ok_or_else(|| crate::Error::Transform {
            type_name: object.type_name(),
            message: "object does not wrap an error".into(),
        })?;

        let sources: Vec<Value> = std::iter::successors(error.source(), |e| e.source())
            .map(|source| Value::from(source.to_string()))
            .collect();

        let mut mapping = Mapping::with_capacity(3);
        mapping.insert("type", object.type_name());
        mapping.insert("message", error.to_string());
        mapping.insert("sources", sources);
        Ok(mapping)
    }
}
