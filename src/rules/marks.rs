//! Bracket and fill-in blank detection.

use super::score::first_digits;
use super::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default bracket patterns.
pub const DEFAULT_BRACKET_PATTERNS: &[&str] = &[
    r"[（(][^)）]*[)）]",
    r"[【\[][^\]】]*[\]】]",
    r"\{[^}]*\}",
];

/// Default underline (blank) patterns.
pub const DEFAULT_UNDERLINE_PATTERNS: &[&str] = &[r"_{2,}", r"—{2,}", r"＿{2,}"];

/// Bracket style, named after the opening character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketKind {
    /// Full-width round `（`
    Chinese,
    /// ASCII round `(`
    Small,
    /// ASCII square `[`
    Medium,
    /// Curly `{`
    Large,
    /// Lenticular `【`
    Square,
    /// Anything else a custom pattern produced
    Unknown,
}

impl BracketKind {
    /// Detect the kind from the first character of a match.
    pub fn detect(text: &str) -> Self {
        match text.chars().next() {
            Some('（' | '）') => BracketKind::Chinese,
            Some('(' | ')') => BracketKind::Small,
            Some('[' | ']') => BracketKind::Medium,
            Some('{' | '}') => BracketKind::Large,
            Some('【' | '】') => BracketKind::Square,
            _ => BracketKind::Unknown,
        }
    }
}

/// Underline style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnderlineKind {
    /// ASCII underscores
    English,
    /// Em-dash run
    ChineseDash,
    /// Full-width underscores
    ChineseUnderline,
    /// Anything else a custom pattern produced
    Unknown,
}

impl UnderlineKind {
    /// Detect the kind from the characters of a match.
    pub fn detect(text: &str) -> Self {
        if text.contains('_') {
            UnderlineKind::English
        } else if text.contains('—') {
            UnderlineKind::ChineseDash
        } else if text.contains('＿') {
            UnderlineKind::ChineseUnderline
        } else {
            UnderlineKind::Unknown
        }
    }
}

/// A bracketed span found in text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketMark {
    /// Byte offset of the match
    pub offset: usize,

    /// Matched text including the brackets
    pub content: String,

    /// Bracket style
    pub kind: BracketKind,

    /// Score written inside the brackets (e.g. "（5分）")
    pub score: Option<i64>,
}

impl BracketMark {
    /// Check if the brackets carry a score.
    pub fn has_score(&self) -> bool {
        self.score.is_some()
    }
}

/// A fill-in blank found in text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnderlineMark {
    /// Byte offset of the match
    pub offset: usize,

    /// Length in characters
    pub length: usize,

    /// Underline style
    pub kind: UnderlineKind,

    /// Matched text
    pub content: String,
}

/// Scanner for bracket and underline marks.
pub struct MarkScanner {
    score_in_bracket: Regex,
}

impl MarkScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        Self {
            score_in_bracket: Regex::new(r"([0-9]+)\s*分").expect("valid regex literal"),
        }
    }

    /// Find every bracketed span, sorted by offset and unique per offset.
    pub fn brackets(&self, text: &str, patterns: &[Pattern]) -> Vec<BracketMark> {
        let mut marks: Vec<BracketMark> = patterns
            .iter()
            .flat_map(|p| p.regex().find_iter(text))
            .map(|m| BracketMark {
                offset: m.start(),
                content: m.as_str().to_string(),
                kind: BracketKind::detect(m.as_str()),
                score: self
                    .score_in_bracket
                    .captures(m.as_str())
                    .and_then(|c| c.get(1))
                    .and_then(|g| first_digits(g.as_str())),
            })
            .collect();

        marks.sort_by_key(|m| m.offset);
        dedup_by_offset(marks, |m| m.offset)
    }

    /// Find every fill-in blank, sorted by offset and unique per offset.
    pub fn underlines(&self, text: &str, patterns: &[Pattern]) -> Vec<UnderlineMark> {
        let mut marks: Vec<UnderlineMark> = patterns
            .iter()
            .flat_map(|p| p.regex().find_iter(text))
            .map(|m| UnderlineMark {
                offset: m.start(),
                length: m.as_str().chars().count(),
                kind: UnderlineKind::detect(m.as_str()),
                content: m.as_str().to_string(),
            })
            .collect();

        marks.sort_by_key(|m| m.offset);
        dedup_by_offset(marks, |m| m.offset)
    }
}

impl Default for MarkScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn dedup_by_offset<T>(items: Vec<T>, offset: impl Fn(&T) -> usize) -> Vec<T> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|item| seen.insert(offset(item))).collect()
}

/// Find bracketed spans using the given patterns.
pub fn extract_brackets(text: &str, patterns: &[Pattern]) -> Vec<BracketMark> {
    MarkScanner::new().brackets(text, patterns)
}

/// Find fill-in blanks using the given patterns.
pub fn extract_underlines(text: &str, patterns: &[Pattern]) -> Vec<UnderlineMark> {
    MarkScanner::new().underlines(text, patterns)
}
