//! Answer normalizer: turns raw option strings into stable `(token, label)` pairs.
//!
//! Recognised markers: `A)`..`D)`, `A.`..`D.`, `1)`..`4)`, `1.`..`4.`, each optionally
//! followed by whitespace. Anything else is labelled by position (A, B, C, ...).
//!
//! Each option is normalized on its own. A question mixing marked and unmarked
//! options therefore mixes both strategies; `has_mixed_markers` reports that
//! case so callers can log it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionToken {
    pub token: String,
    pub label: String,
}

/// Normalizes a single option. `position` is its zero-based index in the list.
pub fn normalize_option(raw: &str, position: usize) -> OptionToken {
    match split_marker(raw) {
        Some((token, label)) => OptionToken {
            token: token.to_string(),
            label: label.to_string(),
        },
        None => OptionToken {
            token: positional_token(position),
            label: raw.to_string(),
        },
    }
}

pub fn normalize_options(options: &[String]) -> Vec<OptionToken> {
    options
        .iter()
        .enumerate()
        .map(|(position, raw)| normalize_option(raw, position))
        .collect()
}

/// True when some options carry a marker and others don't.
pub fn has_mixed_markers(options: &[String]) -> bool {
    let marked = options.iter().filter(|o| split_marker(o).is_some()).count();
    marked > 0 && marked < options.len()
}

fn split_marker(raw: &str) -> Option<(char, &str)> {
    let mut chars = raw.chars();
    let token = chars.next()?;
    if !matches!(token, 'A'..='D' | '1'..='4') {
        return None;
    }
    match chars.next()? {
        ')' | '.' => Some((token, chars.as_str().trim_start())),
        _ => None,
    }
}

fn positional_token(position: usize) -> String {
    match u8::try_from(position).ok().and_then(|p| b'A'.checked_add(p)) {
        Some(letter) if letter <= b'Z' => char::from(letter).to_string(),
        _ => (position + 1).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_letter_marker_with_paren() {
        assert_eq!(
            normalize_option("B) Paris", 3),
            OptionToken {
                token: "B".into(),
                label: "Paris".into()
            }
        );
    }

    #[test]
    fn test_digit_marker_with_dot() {
        let opt = normalize_option("2. Paris", 0);
        assert_eq!(opt.token, "2");
        assert_eq!(opt.label, "Paris");
    }

    #[test]
    fn test_marker_without_whitespace() {
        let opt = normalize_option("C)Rome", 0);
        assert_eq!(opt.token, "C");
        assert_eq!(opt.label, "Rome");
    }

    #[test]
    fn test_unmarked_options_are_positional() {
        let tokens: Vec<String> = normalize_options(&strings(&["Python", "Java", "C++"]))
            .into_iter()
            .map(|o| o.token)
            .collect();
        assert_eq!(tokens, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_unmarked_label_is_whole_string() {
        let opt = normalize_option("C++", 2);
        assert_eq!(opt.token, "C");
        assert_eq!(opt.label, "C++");
    }

    #[test]
    fn test_out_of_range_markers_are_not_markers() {
        assert_eq!(normalize_option("E) Berlin", 0).token, "A");
        assert_eq!(normalize_option("5) Berlin", 1).label, "5) Berlin");
        assert_eq!(normalize_option("a) lower", 2).token, "C");
    }

    #[test]
    fn test_positional_content_is_irrelevant() {
        // "B" content at position 0 still gets token A.
        assert_eq!(normalize_option("Bash", 0).token, "A");
    }

    #[test]
    fn test_empty_string_is_total() {
        let opt = normalize_option("", 1);
        assert_eq!(opt.token, "B");
        assert_eq!(opt.label, "");
    }

    #[test]
    fn test_long_lists_continue_past_d() {
        assert_eq!(normalize_option("x", 4).token, "E");
        assert_eq!(normalize_option("x", 25).token, "Z");
        assert_eq!(normalize_option("x", 26).token, "27");
    }

    #[test]
    fn test_mixed_markers_are_normalized_per_option() {
        let options = strings(&["A) Tokio", "async-std", "C) smol"]);
        assert!(has_mixed_markers(&options));
        let tokens: Vec<String> = normalize_options(&options)
            .into_iter()
            .map(|o| o.token)
            .collect();
        assert_eq!(tokens, vec!["A", "B", "C"]);
        assert!(!has_mixed_markers(&strings(&["A) x", "B) y"])));
        assert!(!has_mixed_markers(&strings(&["x", "y"])));
    }
}
