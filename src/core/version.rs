//! Ordering over dotted version strings
//!
//! Segments are compared numerically after stripping everything that is not
//! an ASCII digit, so `"1.0.0-rc1"` ranks as `1.0.01` and `"v2"` as `2`.
//! Digits are compared as strings after left-padding, which keeps the
//! comparison exact for arbitrarily long numbers.

use std::cmp::Ordering;

/// Returns true iff `a` denotes a strictly newer version than `b`
pub fn compare(a: &str, b: &str) -> bool {
    order(a, b) == Ordering::Greater
}

/// Alias of [`compare`] that reads better at call sites
pub fn is_newer(candidate: &str, current: &str) -> bool {
    compare(candidate, current)
}

/// Total order used by [`compare`]
pub fn order(a: &str, b: &str) -> Ordering {
    let segments_a: Vec<&str> = a.split('.').collect();
    let segments_b: Vec<&str> = b.split('.').collect();
    let len = segments_a.len().max(segments_b.len());

    for i in 0..len {
        let seg_a = digits(segments_a.get(i).copied().unwrap_or("0"));
        let seg_b = digits(segments_b.get(i).copied().unwrap_or("0"));

        let width = seg_a.len().max(seg_b.len());
        let padded_a = format!("{:0>width$}", seg_a, width = width);
        let padded_b = format!("{:0>width$}", seg_b, width = width);

        match padded_a.cmp(&padded_b) {
            Ordering::Equal => continue,
            decided => return decided,
        }
    }

    // Every padded segment matched; the longer original list wins
    segments_a.len().cmp(&segments_b.len())
}

/// Sort tags newest-first. Stable, so equal-ranked tags keep their input order.
pub fn sort_newest_first<T, F>(items: &mut [T], tag: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by(|x, y| order(tag(y), tag(x)));
}

fn digits(segment: &str) -> String {
    segment.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("1.0.0", "1.0.0", false)]
    #[case("1.0.0", "1.0.1", false)]
    #[case("1.9.0", "1.10.0", false)]
    #[case("1.10.0", "1.9.0", true)]
    #[case("2", "1.9.9", true)]
    #[case("v1.2.0", "1.1.9", true)]
    #[case("1.0.0.1", "1.0.0", true)]
    #[case("1.0", "1.0.0", false)]
    #[case("1.0.0", "1.0", true)]
    #[case("12345678901234567890.0", "12345678901234567889.9", true)]
    fn test_compare_table(#[case] a: &str, #[case] b: &str, #[case] want: bool) {
        assert_eq!(compare(a, b), want, "{a} > {b}");
    }

    #[test]
    fn test_qualifiers_degrade_to_digits() {
        // "-rc1" keeps only its digit, so the segment reads as "01"
        assert!(compare("1.0.0-rc1", "1.0.0"));
        assert!(!compare("1.0.0-rc", "1.0.0"));
        assert!(!compare("1.0.0", "1.0.0-rc"));
    }

    #[test]
    fn test_malformed_input_does_not_panic() {
        assert!(!compare("", ""));
        assert!(!compare("...", "..."));
        assert!(compare("1", "garbage"));
    }

    #[test]
    fn test_sort_newest_first() {
        let mut tags = vec!["1.0.0", "1.10.0", "1.2.0", "0.9"];
        sort_newest_first(&mut tags, |t| t);
        assert_eq!(tags, vec!["1.10.0", "1.2.0", "1.0.0", "0.9"]);
    }

    proptest! {
        #[test]
        fn test_compare_is_irreflexive(v in "[0-9]{1,3}(\\.[0-9]{1,3}){0,3}") {
            prop_assert!(!compare(&v, &v));
        }

        #[test]
        fn test_compare_is_antisymmetric(
            a in "[0-9]{1,3}(\\.[0-9]{1,3}){0,3}",
            b in "[0-9]{1,3}(\\.[0-9]{1,3}){0,3}",
        ) {
            prop_assert!(!(compare(&a, &b) && compare(&b, &a)));
        }

        #[test]
        fn test_compare_matches_numeric_triples(
            a in any::<(u16, u16, u16)>(),
            b in any::<(u16, u16, u16)>(),
        ) {
            let sa = format!("{}.{}.{}", a.0, a.1, a.2);
            let sb = format!("{}.{}.{}", b.0, b.1, b.2);
            prop_assert_eq!(compare(&sa, &sb), a > b);
        }
    }
}
