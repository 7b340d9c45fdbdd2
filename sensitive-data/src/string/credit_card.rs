use std::{borrow::Cow, sync::LazyLock};

use regex::{Captures, Regex};

use super::{impl_priority, StringSanitizer};
use crate::keys::KeyMatcher;

// 13 to 19 digits, optionally grouped by single spaces or dashes.
static CARD_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[1-9](?:[ \-]?[0-9]){12,18}\b").expect("card number pattern is valid")
});

/// Masks card numbers that pass the Luhn checksum.
///
/// Digit runs that fail the checksum (order numbers, timestamps) are kept. A
/// card number followed by more digit groups (`4111 1111 1111 1111 123`) is
/// still found: the longest leading run of groups that passes is masked.
#[derive(Clone, Copy, Debug)]
pub struct CreditCardStringSanitizer {
    priority: i32,
}

impl_priority!(CreditCardStringSanitizer);

impl StringSanitizer for CreditCardStringSanitizer {
    fn priority(&self) -> i32 {
        self.priority
    }

    fn sanitize_string<'a>(
        &self,
        input: &'a str,
        mask_pattern: &str,
        _keys_to_mask: &KeyMatcher,
    ) -> Cow<'a, str> {
        mask_card_numbers(input, mask_pattern)
    }
}

fn mask_card_numbers<'a>(input: &'a str, mask_pattern: &str) -> Cow<'a, str> {
    CARD_NUMBER.replace_all(input, |caps: &Captures<'_>| {
        mask_candidate(&caps[0], mask_pattern)
    })
}

// The regex is greedy, so a candidate can carry a CVV, an expiry or a
// preceding short number. Try the longest leading run of groups first; if
// none passes, keep the first group and scan the rest again.
fn mask_candidate(candidate: &str, mask_pattern: &str) -> String {
    let ends = group_ends(candidate);
    let card = ends
        .iter()
        .rev()
        .find(|(end, digits)| (13..=19).contains(digits) && passes_luhn(&candidate[..*end]));

    if let Some(&(end, _)) = card {
        return format!(
            "{mask_pattern}{}",
            mask_card_numbers(&candidate[end..], mask_pattern)
        );
    }
    match ends.first() {
        Some(&(end, _)) if end < candidate.len() => format!(
            "{}{}",
            &candidate[..end],
            mask_card_numbers(&candidate[end..], mask_pattern)
        ),
        _ => candidate.to_owned(),
    }
}

// Byte offset just past each digit group, with the digit count up to it.
fn group_ends(candidate: &str) -> Vec<(usize, usize)> {
    let bytes = candidate.as_bytes();
    let mut digits = 0;
    let mut ends = Vec::new();
    for (index, byte) in bytes.iter().enumerate() {
        if !byte.is_ascii_digit() {
            continue;
        }
        digits += 1;
        if !bytes.get(index + 1).is_some_and(u8::is_ascii_digit) {
            ends.push((index + 1, digits));
        }
    }
    ends
}

fn passes_luhn(candidate: &str) -> bool {
    let sum: u32 = candidate
        .bytes()
        .filter(u8::is_ascii_digit)
        .rev()
        .enumerate()
        .map(|(position, digit)| {
            let digit = u32::from(digit - b'0');
            if position % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                digit
            }
        })
        .sum();
    sum % 10 == 0
}
