//! Ordered numbering and scoring rules.

use super::config::RuleConfig;
use super::marks::{DEFAULT_BRACKET_PATTERNS, DEFAULT_UNDERLINE_PATTERNS};
use super::score::{extract_score, DEFAULT_SCORE_PATTERNS};
use super::Pattern;

/// Default numbering patterns in priority order.
pub const DEFAULT_QUESTION_PATTERNS: &[&str] = &[
    r"^[一二三四五六七八九十百]+[、．.]",
    r"^[0-9]+[、]\s*",
    r"^[0-9]+[.．]\s*",
    r"^[（(][0-9]+[)）]\s*",
    r"^[①②③④⑤⑥⑦⑧⑨⑩⑪⑫⑬⑭⑮⑯⑰⑱⑲⑳]\s*",
    r"^[a-z][.．)）]\s*",
    r"^[ⅰⅱⅲⅳⅴⅵⅶⅷⅸⅹⅠⅡⅢⅣⅤⅥⅦⅧⅨⅩ][.．)）、]\s*",
];

/// Result of matching a leading numbering token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadingMatch {
    /// Priority index of the pattern that matched
    pub pattern_index: usize,

    /// The numbering token, trimmed
    pub number: String,

    /// Text after the token, trimmed
    pub remainder: String,
}

/// Validated, ordered collection of patterns.
///
/// List order is priority order for numbering patterns. Score patterns are
/// kept per resolved level (index 0 = level 1) with a fixed fallback chain.
#[derive(Debug, Clone)]
pub struct RuleSet {
    numbering: Vec<Pattern>,
    level_scores: Vec<Vec<Pattern>>,
    default_scores: Vec<Pattern>,
    bracket: Vec<Pattern>,
    underline: Vec<Pattern>,
    ignore: Vec<Pattern>,
}

impl RuleSet {
    /// Create a rule set from compiled numbering patterns.
    pub fn new(numbering: Vec<Pattern>) -> Self {
        Self {
            numbering,
            level_scores: Vec::new(),
            default_scores: Pattern::compile_all(DEFAULT_SCORE_PATTERNS),
            bracket: Pattern::compile_all(DEFAULT_BRACKET_PATTERNS),
            underline: Pattern::compile_all(DEFAULT_UNDERLINE_PATTERNS),
            ignore: Vec::new(),
        }
    }

    /// Compile raw numbering patterns, dropping invalid ones.
    pub fn compile<S: AsRef<str>>(raw: &[S]) -> Self {
        Self::new(Pattern::compile_all(raw))
    }

    /// Build a rule set from a configuration.
    ///
    /// Numbering patterns of all levels are concatenated in level order
    /// (duplicates keep their first position). When the configuration has
    /// no numbering strings at all, the default patterns are used.
    pub fn from_config(config: &RuleConfig) -> Self {
        let mut raw: Vec<&str> = Vec::new();
        for level in &config.levels {
            for source in &level.patterns {
                let source = source.as_str();
                if !raw.contains(&source) {
                    raw.push(source);
                }
            }
        }

        let mut rules = if raw.is_empty() {
            Self::default()
        } else {
            Self::compile(&raw)
        };

        rules.level_scores = config
            .levels
            .iter()
            .map(|level| Pattern::compile_all(&level.score_patterns))
            .collect();
        if !config.bracket.is_empty() {
            rules.bracket = Pattern::compile_all(&config.bracket);
        }
        if !config.underline.is_empty() {
            rules.underline = Pattern::compile_all(&config.underline);
        }
        rules.ignore = Pattern::compile_all(&config.ignore);

        log::debug!(
            "RuleSet: {} numbering patterns, {} score levels, {} ignore patterns",
            rules.numbering.len(),
            rules.level_scores.len(),
            rules.ignore.len()
        );
        rules
    }

    /// Set per-level score patterns and return self.
    pub fn with_level_scores(mut self, level_scores: Vec<Vec<Pattern>>) -> Self {
        self.level_scores = level_scores;
        self
    }

    /// Set ignore patterns and return self.
    pub fn with_ignore(mut self, ignore: Vec<Pattern>) -> Self {
        self.ignore = ignore;
        self
    }

    /// Numbering patterns in priority order.
    pub fn numbering(&self) -> &[Pattern] {
        &self.numbering
    }

    /// Bracket patterns.
    pub fn bracket(&self) -> &[Pattern] {
        &self.bracket
    }

    /// Underline patterns.
    pub fn underline(&self) -> &[Pattern] {
        &self.underline
    }

    /// Fallback score patterns.
    pub fn default_scores(&self) -> &[Pattern] {
        &self.default_scores
    }

    /// Match a leading numbering token.
    ///
    /// Patterns are tried in priority order and the first one whose match
    /// starts at offset 0 of the trimmed text wins.
    pub fn match_leading(&self, text: &str) -> Option<LeadingMatch> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.numbering
            .iter()
            .enumerate()
            .find_map(|(index, pattern)| {
                pattern.leading(text).map(|m| LeadingMatch {
                    pattern_index: index,
                    number: m.as_str().trim().to_string(),
                    remainder: text[m.end()..].trim().to_string(),
                })
            })
    }

    /// Score patterns for a resolved level, or the fallback chain.
    pub fn score_patterns(&self, level: u32) -> &[Pattern] {
        let configured = (level as usize)
            .checked_sub(1)
            .and_then(|i| self.level_scores.get(i))
            .filter(|patterns| !patterns.is_empty());
        match configured {
            Some(patterns) => patterns,
            None => &self.default_scores,
        }
    }

    /// Extract the score of a line at the given resolved level.
    pub fn extract_score(&self, text: &str, level: u32) -> Option<i64> {
        extract_score(text, self.score_patterns(level))
    }

    /// Check whether a line matches any ignore pattern.
    pub fn is_ignored(&self, text: &str) -> bool {
        self.ignore.iter().any(|p| p.is_match(text))
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::compile(DEFAULT_QUESTION_PATTERNS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::config::LevelRule;

    #[test]
    fn test_default_patterns_compile() {
        let rules = RuleSet::default();
        assert_eq!(rules.numbering().len(), DEFAULT_QUESTION_PATTERNS.len());
        assert_eq!(rules.default_scores().len(), 3);
    }

    #[test]
    fn test_match_leading_priority() {
        let rules = RuleSet::default();

        let m = rules.match_leading("一、选择题").unwrap();
        assert_eq!(m.pattern_index, 0);
        assert_eq!(m.number, "一、");
        assert_eq!(m.remainder, "选择题");

        let m = rules.match_leading("  1. 什么是  ").unwrap();
        assert_eq!(m.pattern_index, 2);
        assert_eq!(m.number, "1.");
        assert_eq!(m.remainder, "什么是");

        let m = rules.match_leading("（1）第一小问").unwrap();
        assert_eq!(m.pattern_index, 3);
        assert_eq!(m.number, "（1）");

        assert!(rules.match_leading("A. 选项").is_none());
        assert!(rules.match_leading("正文 1. 不在行首").is_none());
        assert!(rules.match_leading("   ").is_none());
    }

    #[test]
    fn test_default_digits_are_ascii() {
        let rules = RuleSet::default();
        assert!(rules.match_leading("１．全角数字").is_none());
        assert!(rules.match_leading("（１）全角括号").is_none());
        assert_eq!(rules.match_leading("12．半角").map(|m| m.number), Some("12．".to_string()));
    }

    #[test]
    fn test_first_match_wins_over_specific_pattern() {
        let rules = RuleSet::compile(&[r"^\d+", r"^\d+\.\d+"]);
        let m = rules.match_leading("1.2 小节").unwrap();
        assert_eq!(m.pattern_index, 0);
        assert_eq!(m.number, "1");
    }

    #[test]
    fn test_all_invalid_matches_nothing() {
        let config = RuleConfig {
            levels: vec![LevelRule::new("一级题号", vec!["([".to_string()])],
            ..RuleConfig::default()
        };
        let rules = RuleSet::from_config(&config);
        assert!(rules.numbering().is_empty());
        assert!(rules.match_leading("一、选择题").is_none());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let rules = RuleSet::from_config(&RuleConfig::default());
        assert_eq!(rules.numbering().len(), DEFAULT_QUESTION_PATTERNS.len());
    }

    #[test]
    fn test_level_scores_with_fallback() {
        let mut level2 = LevelRule::new("二级题号", vec![r"^\d+\.".to_string()]);
        level2.score_patterns = vec![r"每小题\s*(\d+)\s*分".to_string()];
        let config = RuleConfig {
            levels: vec![
                LevelRule::new("一级题号", vec![r"^[一二三]、".to_string()]),
                level2,
            ],
            ..RuleConfig::default()
        };
        let rules = RuleSet::from_config(&config);

        let text = "1. 每小题 3 分，共12分";
        assert_eq!(rules.extract_score(text, 2), Some(3));
        assert_eq!(rules.extract_score(text, 1), Some(12));
        assert_eq!(rules.extract_score(text, 7), Some(12));
    }

    #[test]
    fn test_ignore_patterns() {
        let rules = RuleSet::default().with_ignore(Pattern::compile_all(&["注意事项"]));
        assert!(rules.is_ignored("注意事项："));
        assert!(!rules.is_ignored("一、选择题"));
    }
}
