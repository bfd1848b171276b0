//! Score extraction.

use super::Pattern;

/// Fallback score patterns, tried in order.
pub const DEFAULT_SCORE_PATTERNS: &[&str] = &[
    r"[（(【\[]\s*([0-9]+)\s*分\s*[)）\]】]",
    r"共\s*([0-9]+)\s*分",
    r"([0-9]+)\s*分",
];

/// Extract a score using the first pattern that matches.
///
/// The value is read from capture group 1 when the pattern has one and it
/// participated, otherwise from the first digit run of the whole match.
pub fn extract_score(text: &str, patterns: &[Pattern]) -> Option<i64> {
    for pattern in patterns {
        let Some(caps) = pattern.regex().captures(text) else {
            continue;
        };
        let value = match caps.get(1) {
            Some(group) => first_digits(group.as_str()),
            None => caps.get(0).and_then(|m| first_digits(m.as_str())),
        };
        if value.is_some() {
            return value;
        }
    }
    None
}

/// Parse the first run of ASCII digits in the text.
pub(crate) fn first_digits(text: &str) -> Option<i64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Vec<Pattern> {
        Pattern::compile_all(DEFAULT_SCORE_PATTERNS)
    }

    #[test]
    fn test_simple_score() {
        let patterns = Pattern::compile_all(&[r"(\d+)\s*分"]);
        assert_eq!(extract_score("本题共10分", &patterns), Some(10));
    }

    #[test]
    fn test_default_chain_priority() {
        let patterns = defaults();
        assert_eq!(extract_score("一、选择题（每题2分，共20分）", &patterns), Some(20));
        assert_eq!(extract_score("1. 计算（5分）", &patterns), Some(5));
        assert_eq!(extract_score("共 15 分", &patterns), Some(15));
        assert_eq!(extract_score("没有分值", &patterns), None);
    }

    #[test]
    fn test_full_width_digits_are_not_scores() {
        let patterns = defaults();
        assert_eq!(extract_score("本题１０分", &patterns), None);
        assert_eq!(extract_score("（１０分）共8分", &patterns), Some(8));
    }

    #[test]
    fn test_pattern_without_group_uses_first_digits() {
        let patterns = Pattern::compile_all(&[r"满分\d+"]);
        assert_eq!(extract_score("试卷满分150，时间120分钟", &patterns), Some(150));
    }

    #[test]
    fn test_first_digits() {
        assert_eq!(first_digits("ab12cd34"), Some(12));
        assert_eq!(first_digits("none"), None);
    }
}
