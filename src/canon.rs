//! Canonical path segments for category keys.
//!
//! Turns free-form display names ("Điện thoại") into lowercase hyphenated
//! ASCII segments ("dien-thoai") and joins them into slash-separated paths.
//! Pure and total: unparseable input degrades to an empty string.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold a display string to ASCII: decompose, drop combining marks, keep
/// `[A-Za-z0-9 /\-|]`, collapse whitespace runs, trim.
///
/// Vietnamese đ/Đ carry their bar in the base character rather than a
/// combining mark, so they are mapped to d/D explicitly.
pub fn fold_ascii(input: &str) -> String {
    let mut kept = String::with_capacity(input.len());
    for ch in input.nfd() {
        if is_combining_mark(ch) {
            continue;
        }
        let ch = match ch {
            'đ' => 'd',
            'Đ' => 'D',
            other => other,
        };
        if ch.is_ascii_alphanumeric() || matches!(ch, '/' | '-' | '|') {
            kept.push(ch);
        } else {
            kept.push(' ');
        }
    }

    let mut out = String::with_capacity(kept.len());
    for word in kept.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Canonicalize one segment: fold to ASCII, lowercase, hyphenate spaces,
/// strip leading/trailing hyphens, slashes, and pipes.
fn canonical_segment(segment: &str) -> String {
    fold_ascii(segment)
        .to_lowercase()
        .replace(' ', "-")
        .trim_matches(|c| matches!(c, '-' | '/' | '|'))
        .to_string()
}

/// Join display-name segments into a canonical slash-separated path.
/// Empty or whitespace-only segments are silently dropped.
pub fn canonicalize(segments: &[&str]) -> String {
    let cleaned: Vec<String> = segments
        .iter()
        .map(|s| canonical_segment(s))
        .filter(|s| !s.is_empty())
        .collect();
    cleaned.join("/")
}
