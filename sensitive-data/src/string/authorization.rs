use std::{borrow::Cow, sync::LazyLock};

use regex::{Captures, Regex};

use super::{impl_priority, StringSanitizer};
use crate::keys::KeyMatcher;

// Scheme word, separator, then a credential of 8+ characters running to the
// next whitespace, quote, backslash or list separator.
static CREDENTIAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(bearer|basic)(\s+)([^\s"'\\,;]{8,})"#)
        .expect("authorization pattern is valid")
});

/// Masks `Bearer` and `Basic` credentials, keeping the scheme word.
///
/// `Authorization: Bearer eyJhbGciOi...` becomes
/// `Authorization: Bearer *REDACTED*`.
#[derive(Clone, Copy, Debug)]
pub struct AuthorizationStringSanitizer {
    priority: i32,
}

impl_priority!(AuthorizationStringSanitizer);

impl StringSanitizer for AuthorizationStringSanitizer {
    fn priority(&self) -> i32 {
        self.priority
    }

    fn sanitize_string<'a>(
        &self,
        input: &'a str,
        mask_pattern: &str,
        _keys_to_mask: &KeyMatcher,
    ) -> Cow<'a, str> {
        CREDENTIAL.replace_all(input, |caps: &Captures<'_>| {
            if &caps[3] == mask_pattern {
                caps[0].to_owned()
            } else {
                format!("{}{}{mask_pattern}", &caps[1], &caps[2])
            }
        })
    }
}
