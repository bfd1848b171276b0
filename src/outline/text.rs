//! Line-based outline extraction for plain text.
//!
//! Without style information the level of a line is the priority of the
//! numbering pattern that matched it, plus one.

use super::levels::LeveledRun;
use super::TreeBuilder;
use crate::model::Question;
use crate::rules::{BracketMark, MarkScanner, RuleSet, UnderlineMark};
use serde::{Deserialize, Serialize};

/// Outline and marks found in plain text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextOutline {
    /// Question forest; `source_order` is the zero-based line index
    pub questions: Vec<Question>,

    /// Bracketed spans over the whole text
    pub brackets: Vec<BracketMark>,

    /// Fill-in blanks over the whole text
    pub underlines: Vec<UnderlineMark>,
}

/// Extract an outline from newline-separated text.
pub fn extract_from_text(text: &str, rules: &RuleSet) -> TextOutline {
    let leveled: Vec<LeveledRun> = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !rules.is_ignored(line))
        .filter_map(|(index, line)| {
            let m = rules.match_leading(line)?;
            let level = m.pattern_index as u32 + 1;
            Some(LeveledRun {
                level,
                base_level: level,
                sub_level: 0,
                pattern_index: m.pattern_index,
                number: m.number,
                body: m.remainder,
                score: rules.extract_score(line.trim(), level),
                source_order: index as u32,
            })
        })
        .collect();

    let scanner = MarkScanner::new();
    TextOutline {
        questions: TreeBuilder::new().build(leveled),
        brackets: scanner.brackets(text, rules.bracket()),
        underlines: scanner.underlines(text, rules.underline()),
    }
}
