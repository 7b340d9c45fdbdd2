//! String sanitizers: pattern-based masking of free text.
//!
//! A string reaches this pipeline only when it carries no key context: it is
//! not JSON, not even after one level of unescaping. Each sanitizer
//! recognises its own family of patterns and sees the output of the ones
//! before it.
//!
//! Built-in sanitizers, all at [`DEFAULT_STRING_SANITIZER_PRIORITY`] and
//! registered in this order by the default configuration:
//!
//! 1. [`AuthorizationStringSanitizer`]: `Bearer`/`Basic` credentials
//! 2. [`CreditCardStringSanitizer`]: Luhn-valid card numbers
//! 3. [`JsonStringSanitizer`]: `"key": value` pairs in quasi-JSON text
//! 4. [`UrlStringSanitizer`]: URL passwords and sensitive query parameters

mod authorization;
mod credit_card;
mod json;
mod url;

use std::borrow::Cow;

pub use authorization::AuthorizationStringSanitizer;
pub use credit_card::CreditCardStringSanitizer;
pub use json::JsonStringSanitizer;
pub use url::UrlStringSanitizer;

use crate::keys::KeyMatcher;

/// Evaluation rank shared by the built-in string sanitizers.
pub const DEFAULT_STRING_SANITIZER_PRIORITY: i32 = 10_000;

/// Masks sensitive substrings of a string that has no key context.
///
/// Implementations must be idempotent: running a sanitizer over its own output
/// changes nothing, and a substring already equal to the mask pattern is left
/// alone. Return [`Cow::Borrowed`] when nothing was masked.
pub trait StringSanitizer: Send + Sync {
    /// Evaluation rank; higher runs first.
    fn priority(&self) -> i32 {
        0
    }

    /// Returns `input` with every recognised secret replaced by `mask_pattern`.
    fn sanitize_string<'a>(
        &self,
        input: &'a str,
        mask_pattern: &str,
        keys_to_mask: &KeyMatcher,
    ) -> Cow<'a, str>;

    /// Name used in diagnostics.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Implements the `priority` plumbing shared by the built-in sanitizers.
macro_rules! impl_priority {
    ($ty:ident) => {
        impl $ty {
            /// Creates the sanitizer with [`DEFAULT_STRING_SANITIZER_PRIORITY`].
            ///
            /// [`DEFAULT_STRING_SANITIZER_PRIORITY`]: crate::DEFAULT_STRING_SANITIZER_PRIORITY
            pub fn new() -> Self {
                Self {
                    priority: $crate::string::DEFAULT_STRING_SANITIZER_PRIORITY,
                }
            }

            /// Overrides the evaluation rank.
            #[must_use]
            pub fn with_priority(mut self, priority: i32) -> Self {
                self.priority = priority;
                self
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

pub(crate) use impl_priority;
