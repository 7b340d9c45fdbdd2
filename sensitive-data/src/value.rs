//! The data model walked by the sanitizer.
//!
//! [`Value`] is a closed set of shape categories: scalars, strings, mappings
//! (ordered string-keyed maps and integer-keyed sequences) and opaque
//! [`Object`]s. The sanitizer dispatches on the variant; nothing else about a
//! value's runtime type is inspected, except through object transformers.

use std::{
    any::{self, Any},
    error::Error as StdError,
    fmt,
    sync::Arc,
    vec,
};

use serde::{
    ser::{Error as _, SerializeMap, SerializeSeq},
    Serialize, Serializer,
};
use serde_json::{Number, Value as JsonValue};

/// A value of unknown shape handed to the sanitizer.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Absent value.
    #[default]
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Numeric scalar. The textual form is kept exactly as decoded.
    Number(Number),
    /// Text, possibly carrying serialized JSON.
    String(String),
    /// Integer-keyed mapping; the index is the key.
    Sequence(Vec<Value>),
    /// Ordered, string-keyed mapping.
    Mapping(Mapping),
    /// Opaque in-memory value, reachable only through object transformers.
    Object(Object),
}

impl Value {
    /// Converts decoded JSON, keeping numbers verbatim.
    pub fn from_json(json: JsonValue) -> Self {
        Self::convert_json(json, false)
    }

    /// Converts freshly decoded JSON. Integers too large for `i64`/`u64`
    /// become strings so re-encoding never loses digits.
    pub(crate) fn from_decoded_json(json: JsonValue) -> Self {
        Self::convert_json(json, true)
    }

    fn convert_json(json: JsonValue, big_numbers_as_strings: bool) -> Self {
        match json {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(flag) => Self::Bool(flag),
            JsonValue::Number(number) if big_numbers_as_strings && !fits_native(&number) => {
                Self::String(number.to_string())
            }
            JsonValue::Number(number) => Self::Number(number),
            JsonValue::String(text) => Self::String(text),
            JsonValue::Array(items) => Self::Sequence(
                items
                    .into_iter()
                    .map(|item| Self::convert_json(item, big_numbers_as_strings))
                    .collect(),
            ),
            JsonValue::Object(map) => {
                let mut mapping = Mapping::with_capacity(map.len());
                for (key, value) in map {
                    // serde_json maps never repeat a key
                    mapping.push(key, Self::convert_json(value, big_numbers_as_strings));
                }
                Self::Mapping(mapping)
            }
        }
    }

    /// Converts into a `serde_json::Value`.
    ///
    /// Fails if the value contains an [`Object`] that was not built with
    /// [`Object::serializable`].
    pub fn to_json(&self) -> serde_json::Result<JsonValue> {
        serde_json::to_value(self)
    }

    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the text of a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the entries of a [`Value::Mapping`].
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    /// Returns the items of a [`Value::Sequence`].
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the wrapped [`Object`].
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Looks up `key` when this value is a mapping.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_mapping().and_then(|mapping| mapping.get(key))
    }
}

// Numbers outside the native ranges only survive decoding because of
// `arbitrary_precision`; `is_f64` is false for integer literals.
fn fits_native(number: &Number) -> bool {
    number.is_i64() || number.is_u64() || number.is_f64()
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(flag) => serializer.serialize_bool(*flag),
            Self::Number(number) => number.serialize(serializer),
            Self::String(text) => serializer.serialize_str(text),
            Self::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Mapping(mapping) => mapping.serialize(serializer),
            Self::Object(object) => object.serialize(serializer),
        }
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        Self::from_json(json)
    }
}

impl TryFrom<Value> for JsonValue {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        value.to_json()
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::String(text.to_owned())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::String(text)
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Self::Bool(flag)
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Self::Number(number.into())
    }
}

impl From<u64> for Value {
    fn from(number: u64) -> Self {
        Self::Number(number.into())
    }
}

impl From<i32> for Value {
    fn from(number: i32) -> Self {
        Self::Number(number.into())
    }
}

/// Non-finite floats have no JSON form and become [`Value::Null`].
impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Number::from_f64(number).map_or(Self::Null, Self::Number)
    }
}

impl From<Number> for Value {
    fn from(number: Number) -> Self {
        Self::Number(number)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Sequence(items)
    }
}

impl From<Mapping> for Value {
    fn from(mapping: Mapping) -> Self {
        Self::Mapping(mapping)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Self::Object(object)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

// =============================================================================
// Mapping
// =============================================================================

/// An insertion-ordered map from string keys to values.
///
/// Equality is order-sensitive: two mappings are equal when they hold the same
/// entries in the same order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mapping {
    entries: Vec<(String, Value)>,
}

impl Mapping {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty mapping with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the mapping has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find_map(|(candidate, value)| (candidate.as_str() == key).then_some(value))
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find_map(|(candidate, value)| (candidate.as_str() == key).then_some(value))
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Inserts an entry, returning the previous value for `key`.
    ///
    /// An existing key keeps its position; a new key is appended.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        if let Some(index) = self.entries.iter().position(|(existing, _)| *existing == key) {
            return Some(std::mem::replace(&mut self.entries[index].1, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Appends an entry whose key is known not to be present.
    pub(crate) fn push(&mut self, key: String, value: Value) {
        debug_assert!(!self.contains_key(&key), "duplicate mapping key `{key}`");
        self.entries.push((key, value));
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(key, _)| key.as_str())
    }
}

impl IntoIterator for Mapping {
    type Item = (String, Value);
    type IntoIter = vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Mapping
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(entries: I) -> Self {
        let mut mapping = Self::new();
        for (key, value) in entries {
            mapping.insert(key, value);
        }
        mapping
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// =============================================================================
// Object
// =============================================================================

/// What an object exposes beyond its concrete type.
trait Payload: Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn as_error(&self) -> Option<&(dyn StdError + 'static)> {
        None
    }

    fn can_serialize(&self) -> bool {
        false
    }

    fn to_json(&self) -> Option<serde_json::Result<JsonValue>> {
        None
    }
}

struct Opaque<T>(T);

impl<T: Any + Send + Sync> Payload for Opaque<T> {
    fn as_any(&self) -> &dyn Any {
        &self.0
    }
}

struct Failure<E>(E);

impl<E: StdError + Send + Sync + 'static> Payload for Failure<E> {
    fn as_any(&self) -> &dyn Any {
        &self.0
    }

    fn as_error(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.0)
    }
}

struct Serializable<T>(T);

impl<T: Serialize + Send + Sync + 'static> Payload for Serializable<T> {
    fn as_any(&self) -> &dyn Any {
        &self.0
    }

    fn can_serialize(&self) -> bool {
        true
    }

    fn to_json(&self) -> Option<serde_json::Result<JsonValue>> {
        Some(serde_json::to_value(&self.0))
    }
}

/// A type-erased, shared in-memory value.
///
/// Objects are cheap to clone and compare by identity: two `Object`s are
/// equal only if they share the same allocation. This is how an unsupported
/// object is recognised as passed through untouched.
///
/// ```rust
/// use sensitive_data::Object;
///
/// struct Session {
///     id: u32,
/// }
///
/// let object = Object::new(Session { id: 7 });
/// assert_eq!(object.downcast_ref::<Session>().map(|s| s.id), Some(7));
/// assert_eq!(object, object.clone());
/// assert_ne!(object, Object::new(Session { id: 7 }));
/// ```
#[derive(Clone)]
pub struct Object {
    payload: Arc<dyn Payload>,
    type_name: &'static str,
}

impl Object {
    /// Wraps a value that exposes nothing but its concrete type.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::with_payload(Opaque(value), any::type_name::<T>())
    }

    /// Wraps an error so transformers can read its message and source chain.
    pub fn from_error<E: StdError + Send + Sync + 'static>(error: E) -> Self {
        Self::with_payload(Failure(error), any::type_name::<E>())
    }

    /// Wraps a value that can be serialized with `serde`.
    pub fn serializable<T: Serialize + Send + Sync + 'static>(value: T) -> Self {
        Self::with_payload(Serializable(value), any::type_name::<T>())
    }

    fn with_payload(payload: impl Payload + 'static, type_name: &'static str) -> Self {
        Self {
            payload: Arc::new(payload),
            type_name,
        }
    }

    /// Fully qualified name of the wrapped type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the wrapped value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.payload.as_any().is::<T>()
    }

    /// Borrows the wrapped value as a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.as_any().downcast_ref::<T>()
    }

    /// Borrows the wrapped value as an error, if built with [`Object::from_error`].
    pub fn as_error(&self) -> Option<&(dyn StdError + 'static)> {
        self.payload.as_error()
    }

    /// Returns `true` if built with [`Object::serializable`].
    pub fn is_serializable(&self) -> bool {
        self.payload.can_serialize()
    }

    /// Serializes the wrapped value, if built with [`Object::serializable`].
    pub fn to_json(&self) -> Option<serde_json::Result<JsonValue>> {
        self.payload.to_json()
    }

    /// Returns `true` if both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.payload, &other.payload)
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}

impl Serialize for Object {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.to_json() {
            Some(Ok(json)) => json.serialize(serializer),
            Some(Err(error)) => Err(S::Error::custom(error)),
            None => Err(S::Error::custom(format_args!(
                "object of type `{}` is not serializable",
                self.type_name
            ))),
        }
    }
}
