use std::{any, fmt, marker::PhantomData};

use serde::{de::DeserializeOwned, Serialize};

use super::{json_to_mapping, ObjectHydrator, ObjectTransformer};
use crate::{
    error::{Error, Result},
    value::{Mapping, Object, Value},
};

/// Transformer for one concrete type `T`, with hydration.
///
/// `T` is serialized into a mapping, masked, and deserialized back, so the
/// sanitized output still holds a `T` (wrapped with [`Object::serializable`]).
///
/// Masking replaces values with the mask string. If a masked field of `T` is
/// not string-typed, deserialization fails and the sanitizer falls back to the
/// masked mapping.
///
/// ```rust
/// use sensitive_data::{Object, SensitiveDataSanitizer, TypedTransformer, Value};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Login {
///     username: String,
///     password: String,
/// }
///
/// let sanitizer = SensitiveDataSanitizer::builder()
///     .keys_to_mask(["password"])
///     .object_transformer(TypedTransformer::<Login>::new())
///     .build()
///     .unwrap();
///
/// let login = Object::new(Login {
///     username: "alice".into(),
///     password: "hunter2".into(),
/// });
///
/// let sanitized = sanitizer.sanitize(Value::from(login)).unwrap();
/// let login = sanitized.as_object().and_then(Object::downcast_ref::<Login>).unwrap();
/// assert_eq!(login.username, "alice");
/// assert_eq!(login.password, "*REDACTED*");
/// ```
pub struct TypedTransformer<T> {
    priority: i32,
    _type: PhantomData<fn() -> T>,
}

impl<T> TypedTransformer<T> {
    /// Default evaluation rank; above the catch-all serializable transformer.
    pub const DEFAULT_PRIORITY: i32 = 1_000;

    /// Creates a transformer with [`Self::DEFAULT_PRIORITY`].
    pub fn new() -> Self {
        Self {
            priority: Self::DEFAULT_PRIORITY,
            _type: PhantomData,
        }
    }

    /// Overrides the evaluation rank.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl<T> Default for TypedTransformer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for TypedTransformer<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypedTransformer<T> {}

impl<T> fmt::Debug for TypedTransformer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedTransformer")
            .field("type", &any::type_name::<T>())
            .field("priority", &self.priority)
            .finish()
    }
}

impl<T> ObjectTransformer for TypedTransformer<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn priority(&self) -> i32 {
        self.priority
    }

    fn supports(&self, object: &Object) -> bool {
        object.is::<T>()
    }

    fn transform(&self, object: &Object) -> Result<Mapping> {
        let failed = |message: String| Error::Transform {
            type_name: object.type_name(),
            message,
        };

        let value = object
            .downcast_ref::<T>()
            .ok_or_else(|| failed(format!("expected `{}`", any::type_name::<T>())))?;
        let json = serde_json::to_value(value).map_err(|error| failed(error.to_string()))?;
        Ok(json_to_mapping(json))
    }

    fn as_hydrator(&self) -> Option<&dyn ObjectHydrator> {
        Some(self)
    }
}

impl<T> ObjectHydrator for TypedTransformer<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn hydrate(&self, original: &Object, masked: Mapping) -> Result<Value> {
        let failed = |message: String| Error::Hydrate {
            type_name: original.type_name(),
            message,
        };

        let json = Value::Mapping(masked)
            .to_json()
            .map_err(|error| failed(error.to_string()))?;
        let rebuilt: T = serde_json::from_value(json).map_err(|error| failed(error.to_string()))?;
        Ok(Value::Object(Object::serializable(rebuilt)))
    }
}
