//! Version number ordering.
//!
//! Numbers are dotted numeric segments with an optional `-tag` pre-release
//! suffix. Numeric segments compare element-wise; on an equal prefix the
//! number with more segments wins (`1.0.0` > `1.0`). A number without a
//! pre-release tag outranks the same number with one; two tags compare
//! lexically.

use std::cmp::Ordering;

/// Compare two version number strings.
#[must_use]
pub fn compare_version_numbers(a: &str, b: &str) -> Ordering {
    let (a_num, a_tag) = split_pre_release(a);
    let (b_num, b_tag) = split_pre_release(b);

    let a_segments = numeric_segments(a_num);
    let b_segments = numeric_segments(b_num);

    match a_segments.cmp(&b_segments) {
        Ordering::Equal => compare_tags(a_tag, b_tag),
        other => other,
    }
}

/// Split `1.2-beta` into (`1.2`, `Some("beta")`).
fn split_pre_release(number: &str) -> (&str, Option<&str>) {
    match number.split_once('-') {
        Some((num, tag)) => (num, Some(tag)),
        None => (number, None),
    }
}

/// Parse dotted numeric segments; non-numeric segments count as 0.
fn numeric_segments(number: &str) -> Vec<u64> {
    number
        .split('.')
        .map(|s| s.parse().unwrap_or(0))
        .collect()
}

/// Stable (no tag) outranks pre-release; tags compare lexically.
fn compare_tags(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_ordering() {
        assert_eq!(compare_version_numbers("2.0", "1.0"), Ordering::Greater);
        assert_eq!(compare_version_numbers("1.0", "1.0"), Ordering::Equal);
        assert_eq!(compare_version_numbers("1.2", "1.10"), Ordering::Less);
    }

    #[test]
    fn test_more_segments_win_on_equal_prefix() {
        assert_eq!(compare_version_numbers("1.0.0", "1.0"), Ordering::Greater);
        assert_eq!(compare_version_numbers("1.0", "1.0.1"), Ordering::Less);
    }

    #[test]
    fn test_stable_outranks_pre_release() {
        assert_eq!(compare_version_numbers("1.0", "1.0-beta"), Ordering::Greater);
        assert_eq!(compare_version_numbers("1.0-rc1", "1.0"), Ordering::Less);
    }

    #[test]
    fn test_tags_compare_lexically() {
        assert_eq!(
            compare_version_numbers("1.0-alpha", "1.0-beta"),
            Ordering::Less
        );
        assert_eq!(
            compare_version_numbers("1.0-rc2", "1.0-rc1"),
            Ordering::Greater
        );
    }

    #[test]
    fn test_pre_release_of_higher_number_still_wins() {
        assert_eq!(
            compare_version_numbers("2.0-beta", "1.9"),
            Ordering::Greater
        );
    }
}
