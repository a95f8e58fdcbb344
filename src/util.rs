//! Small string helpers shared by the classifier and the output boundaries.

/// Placeholder written wherever a textual property could not be read.
pub const UNKNOWN: &str = "Unknown";

/// ASCII case-insensitive substring search. An empty needle always matches.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}

/// Returns the value, or [`UNKNOWN`] when it is absent.
pub fn or_unknown(value: Option<&str>) -> &str {
    value.unwrap_or(UNKNOWN)
}

/// Longest prefix of `value` no longer than `max_bytes` that ends on a
/// character boundary.
pub fn truncate_to_boundary(value: &str, max_bytes: usize) -> &str {
    if value.len() <= max_bytes {
        return value;
    }
    let mut end = max_bytes;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

/// Trims surrounding whitespace and NULs, mapping empty results to `None`.
pub fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Prefers the friendly name, reading the description only when it is absent.
pub fn name_or_description(
    friendly: Option<String>,
    description: impl FnOnce() -> Option<String>,
) -> Option<String> {
    friendly.or_else(description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_search_ignores_ascii_case() {
        assert!(contains_ignore_case("HiSilicon Technologies", "hisilicon"));
        assert!(contains_ignore_case("HUAWEI HDC Device", "hdc"));
        assert!(!contains_ignore_case("Pixel 8", "hdc"));
        assert!(!contains_ignore_case("hd", "hdc"));
    }

    #[test]
    fn empty_needle_matches() {
        assert!(contains_ignore_case("", ""));
        assert!(contains_ignore_case("anything", ""));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_to_boundary("abcdef", 3), "abc");
        assert_eq!(truncate_to_boundary("abc", 10), "abc");
        // "é" is two bytes; cutting at 2 would split it.
        assert_eq!(truncate_to_boundary("aé", 2), "a");
    }

    #[test]
    fn blank_values_are_absent() {
        assert_eq!(non_empty("  \0"), None);
        assert_eq!(non_empty(" Pixel 8\n").as_deref(), Some("Pixel 8"));
        assert_eq!(or_unknown(None), "Unknown");
        assert_eq!(or_unknown(Some("Samsung")), "Samsung");
    }

    #[test]
    fn description_stands_in_for_missing_friendly_name() {
        assert_eq!(
            name_or_description(None, || Some("ADB Interface".into())).as_deref(),
            Some("ADB Interface")
        );
        assert_eq!(name_or_description(None, || None), None);
    }

    #[test]
    fn friendly_name_skips_description_read() {
        let name = name_or_description(Some("Galaxy S23".into()), || {
            panic!("description read despite friendly name")
        });
        assert_eq!(name.as_deref(), Some("Galaxy S23"));
    }
}
