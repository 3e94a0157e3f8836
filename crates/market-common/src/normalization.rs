use std::cmp::Ordering;
use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;

/// Longest option label kept, in chars.
pub const MAX_OPTION_CHARS: usize = 128;

/// Normalize text: trim, collapse whitespace (U+0020 only), Unicode NFC normalization, BOM removal.
pub fn normalize_text(text: &str) -> String {
    let no_bom = text.replace('\u{FEFF}', "");
    let nfc: String = no_bom.nfc().collect();
    let mut result = String::with_capacity(nfc.len());
    let mut prev_space = false;
    for c in nfc.chars() {
        if c.is_whitespace() {
            if !prev_space {
                result.push(' ');
                prev_space = true;
            }
        } else {
            result.push(c);
            prev_space = false;
        }
    }
    result.trim().to_string()
}

fn truncate_to_chars(s: &str, max_chars: usize) -> &str {
    let byte_idx = s
        .char_indices()
        .nth(max_chars)
        .map(|(idx, _)| idx)
        .unwrap_or(s.len());
    &s[..byte_idx]
}

/// Canonical option label (brand, model, generation, city...): normalized and
/// truncated at a char boundary. `None` when nothing is left.
pub fn canonical_option(value: &str) -> Option<String> {
    let normalized = normalize_text(value);
    let truncated = truncate_to_chars(&normalized, MAX_OPTION_CHARS).trim_end();
    if truncated.is_empty() {
        None
    } else {
        Some(truncated.to_string())
    }
}

/// Case- and accent-insensitive sort key for option lists.
pub fn sort_key(value: &str) -> String {
    value
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

fn is_combining_mark(c: char) -> bool {
    matches!(c as u32,
        0x0300..=0x036F |
        0x1AB0..=0x1AFF |
        0x1DC0..=0x1DFF |
        0x20D0..=0x20FF |
        0xFE20..=0xFE2F
    )
}

fn compare_options(a: &str, b: &str) -> Ordering {
    sort_key(a).cmp(&sort_key(b)).then_with(|| a.cmp(b))
}

/// Canonicalize, de-duplicate and sort an option list.
pub fn sorted_options<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = unique_options(values);
    out.sort_by(|a, b| compare_options(a, b));
    out
}

/// Canonicalize and de-duplicate an option list, keeping first-seen order.
pub fn unique_options<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter_map(|v| canonical_option(v.as_ref()))
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

/// Coerce free-form numeric input into a non-negative integer.
///
/// Grouping characters (spaces, NBSP, `'`, `_`, `,`, and `.` when exactly
/// three digits follow it) are dropped, and a leading currency sign is
/// skipped. Anything after the leading digit run is ignored, so `1999.99`
/// keeps its integer part. Negative numbers clamp to zero and overflow
/// saturates. Input without a leading digit yields `None`.
pub fn coerce_number(input: &str) -> Option<u64> {
    let compact: Vec<char> = input
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '\'' | '_' | ','))
        .collect();
    let compact: String = compact
        .iter()
        .enumerate()
        .filter(|(i, c)| **c != '.' || !is_thousands_dot(&compact[i + 1..]))
        .map(|(_, c)| *c)
        .collect();
    let compact = compact.trim_start_matches(['$', '€', '£', '₽', '₸']);
    let (negative, unsigned) = match compact.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, compact.strip_prefix('+').unwrap_or(compact)),
    };
    let digits: Vec<u64> = unsigned
        .chars()
        .map_while(|c| c.to_digit(10))
        .map(u64::from)
        .collect();
    if digits.is_empty() {
        return None;
    }
    if negative {
        return Some(0);
    }
    Some(digits.iter().fold(0u64, |acc, d| {
        acc.checked_mul(10)
            .and_then(|v| v.checked_add(*d))
            .unwrap_or(u64::MAX)
    }))
}

/// `.` followed by exactly three digits reads as a thousands separator.
fn is_thousands_dot(rest: &[char]) -> bool {
    let run = rest.iter().take_while(|c| c.is_ascii_digit()).count();
    run == 3 && rest.get(3).map_or(true, |c| *c == '.')
}

/// Clamp a signed number into the range-bound domain.
pub fn clamp_number(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
