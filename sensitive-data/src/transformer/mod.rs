//! Object transformers: turning opaque values into maskable mappings.
//!
//! - [`ObjectTransformer`]: converts a supported [`Object`] into a [`Mapping`]
//! - [`ObjectHydrator`]: optional second capability that rebuilds an object
//!   from its masked mapping
//!
//! Built-in transformers:
//!
//! | Transformer | Default priority | Supports | Hydrates |
//! |-------------|------------------|----------|----------|
//! | [`ErrorTransformer`] | 10 000 | [`Object::from_error`] | no |
//! | [`TypedTransformer`] | 1 000 | one concrete type `T` | yes |
//! | [`SerializableTransformer`] | 100 | [`Object::serializable`] | no |

mod error;
mod serializable;
mod typed;

pub use error::ErrorTransformer;
pub use serializable::SerializableTransformer;
pub use typed::TypedTransformer;

use crate::{
    error::Result,
    value::{Mapping, Object, Value},
};

/// Converts a class of objects into plain mappings the sanitizer can mask.
///
/// Transformers are evaluated in descending [`priority`](Self::priority); the
/// first one whose [`supports`](Self::supports) returns `true` handles the
/// object. Implementations are shared across threads and must not keep
/// per-call state.
///
/// ```compile_fail
/// use std::rc::Rc;
/// use sensitive_data::{Mapping, Object, ObjectTransformer};
///
/// // `Rc` is neither `Send` nor `Sync`, so this transformer cannot be shared.
/// struct Counting(Rc<()>);
///
/// impl ObjectTransformer for Counting {
///     fn supports(&self, _object: &Object) -> bool {
///         true
///     }
///
///     fn transform(&self, _object: &Object) -> sensitive_data::Result<Mapping> {
///         Ok(Mapping::new())
///     }
/// }
/// ```
pub trait ObjectTransformer: Send + Sync {
    /// Evaluation rank; higher runs first.
    fn priority(&self) -> i32 {
        0
    }

    /// Returns `true` if this transformer can handle `object`.
    fn supports(&self, object: &Object) -> bool;

    /// Converts `object` into a mapping. Keys are masked afterwards.
    fn transform(&self, object: &Object) -> Result<Mapping>;

    /// Exposes the hydration capability, if this transformer has one.
    fn as_hydrator(&self) -> Option<&dyn ObjectHydrator> {
        None
    }

    /// Name used in diagnostics.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Rebuilds an object from the masked mapping its transformer produced.
pub trait ObjectHydrator: Send + Sync {
    /// Returns a value equivalent to `original` but carrying `masked` data.
    fn hydrate(&self, original: &Object, masked: Mapping) -> Result<Value>;
}

/// Shapes a serde JSON form into a mapping: maps are taken as-is, sequences
/// are keyed by index and anything else is stored under `"value"`.
pub(crate) fn json_to_mapping(json: serde_json::Value) -> Mapping {
    match Value::from_json(json) {
        Value::Mapping(mapping) => mapping,
        Value::Sequence(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), item))
            .collect(),
        scalar => std::iter::once(("value", scalar)).collect(),
    }
}
