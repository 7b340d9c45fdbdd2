//! Recursive masking of sensitive data in logs and error reports.
//!
//! The crate separates:
//! - **Key masking**: any mapping entry whose key is on the denylist is replaced
//!   by the mask pattern, whatever its value.
//! - **Object transformation**: opaque in-memory values (errors, serializable
//!   structs) are turned into mappings so key masking can reach their fields.
//! - **String sanitization**: free text with no key context is scrubbed for
//!   bearer tokens, card numbers, URL credentials and quasi-JSON fragments.
//!
//! [`SensitiveDataSanitizer`] ties these together. It walks a [`Value`] of
//! unknown shape and returns a masked copy:
//!
//! ```rust
//! use sensitive_data::{SensitiveDataSanitizer, Value};
//! use serde_json::json;
//!
//! let sanitizer = SensitiveDataSanitizer::builder()
//!     .keys_to_mask(["password", "card"])
//!     .mask_pattern("******")
//!     .build()
//!     .unwrap();
//!
//! let sanitized = sanitizer
//!     .sanitize_json(json!({
//!         "user": "alice",
//!         "password": "hunter2",
//!         "meta": { "Card": "4111111111111111" },
//!     }))
//!     .unwrap();
//!
//! assert_eq!(
//!     sanitized,
//!     json!({ "user": "alice", "password": "******", "meta": { "Card": "******" } })
//! );
//! ```
//!
//! Strings are inspected before they are treated as free text. A string that
//! decodes to a JSON object or array (directly, or after one level of
//! backslash-unescaping) is masked structurally and re-encoded.
//!
//! What this crate does not do:
//! - perform I/O or configure a logger
//! - validate JSON grammar; undecodable input is handled as plain text
//! - mask fields of objects no transformer supports (they pass through)
//!
//! The `slog` feature adds a `slog::Value` adapter that logs sanitized data as
//! structured JSON.

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::option_if_let_else
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

// Module declarations
mod config;
mod error;
mod keys;
mod sanitizer;
#[cfg(feature = "slog")]
pub mod slog;
mod string;
mod transformer;
mod value;

// Re-exports
pub use config::{SanitizerSettings, DEFAULT_KEYS_TO_MASK, DEFAULT_MASK_PATTERN};
pub use error::{Error, Result};
pub use keys::KeyMatcher;
pub use sanitizer::{SanitizerBuilder, SanitizerConfig, SensitiveDataSanitizer};
pub use string::{
    AuthorizationStringSanitizer, CreditCardStringSanitizer, JsonStringSanitizer,
    StringSanitizer, UrlStringSanitizer, DEFAULT_STRING_SANITIZER_PRIORITY,
};
pub use transformer::{
    ErrorTransformer, ObjectHydrator, ObjectTransformer, SerializableTransformer,
    TypedTransformer,
};
pub use value::{Mapping, Object, Value};
