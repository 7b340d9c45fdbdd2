//! Case-insensitive key denylist.

use std::{borrow::Cow, collections::HashSet};

/// The set of mapping keys whose values are always masked.
///
/// Keys are lower-cased once when the matcher is built; lookups lower-case
/// the candidate key and test membership. Duplicate keys (after lower-casing)
/// are dropped, keeping the first occurrence so iteration order is stable.
#[derive(Clone, Debug, Default)]
pub struct KeyMatcher {
    ordered: Vec<String>,
    lookup: HashSet<String>,
}

impl KeyMatcher {
    /// Builds a matcher from any collection of keys.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut matcher = Self::default();
        matcher.extend(keys);
        matcher
    }

    /// Returns `true` if `key` is on the denylist, ignoring case.
    pub fn matches(&self, key: &str) -> bool {
        !self.lookup.is_empty() && self.lookup.contains(normalize(key).as_ref())
    }

    /// Iterates over the lower-cased keys in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.ordered.iter().map(String::as_str)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Returns `true` when nothing is masked by key.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

impl<S: AsRef<str>> Extend<S> for KeyMatcher {
    fn extend<I: IntoIterator<Item = S>>(&mut self, keys: I) {
        for key in keys {
            let key = normalize(key.as_ref()).into_owned();
            if self.lookup.insert(key.clone()) {
                self.ordered.push(key);
            }
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for KeyMatcher {
    fn from_iter<I: IntoIterator<Item = S>>(keys: I) -> Self {
        Self::new(keys)
    }
}

// Lowercase ASCII keys are by far the common case; skip the allocation.
fn normalize(key: &str) -> Cow<'_, str> {
    if key.bytes().all(|b| b.is_ascii() && !b.is_ascii_uppercase()) {
        Cow::Borrowed(key)
    } else {
        Cow::Owned(key.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::KeyMatcher;

    #[test]
    fn matches_ignoring_case() {
        let matcher = KeyMatcher::new(["Password", "X-API-KEY"]);

        assert!(matcher.matches("password"));
        assert!(matcher.matches("PASSWORD"));
        assert!(matcher.matches("x-api-key"));
        assert!(!matcher.matches("username"));
    }

    #[test]
    fn stores_lowercased_keys_once() {
        let matcher = KeyMatcher::new(["Token", "token", "TOKEN", "secret"]);

        assert_eq!(matcher.len(), 2);
        assert_eq!(matcher.iter().collect::<Vec<_>>(), ["token", "secret"]);
    }

    #[test]
    fn lowercases_non_ascii_keys() {
        let matcher = KeyMatcher::new(["MOTDEPASSE", "ÜBERSCHRIFT"]);

        assert!(matcher.matches("motdepasse"));
        assert!(matcher.matches("überschrift"));
        assert!(matcher.matches("Überschrift"));
    }

    #[test]
    fn empty_matcher_matches_nothing() {
        let matcher = KeyMatcher::default();

        assert!(matcher.is_empty());
        assert!(!matcher.matches(""));
        assert!(!matcher.matches("password"));
    }

    #[test]
    fn extend_appends_new_keys() {
        let mut matcher = KeyMatcher::new(["token"]);
        matcher.extend(["Card", "TOKEN"]);

        assert_eq!(matcher.iter().collect::<Vec<_>>(), ["token", "card"]);
    }
}
