//! Numbering, scoring and mark-up rules.
//!
//! A [`RuleSet`] is the compiled, validated form of a [`RuleConfig`].
//! Patterns are compiled once when the rule set is built and never again
//! while matching.

pub mod config;
pub mod marks;
mod pattern;
pub mod presets;
mod ruleset;
mod score;

pub use config::{FlatConfig, GlobalScoreConfig, LevelRule, RawRuleConfig, RuleConfig};
pub use marks::{
    extract_brackets, extract_underlines, BracketKind, BracketMark, MarkScanner, UnderlineKind,
    UnderlineMark, DEFAULT_BRACKET_PATTERNS, DEFAULT_UNDERLINE_PATTERNS,
};
pub use pattern::Pattern;
pub use presets::{Preset, PresetCategory, PresetKind};
pub use ruleset::{LeadingMatch, RuleSet, DEFAULT_QUESTION_PATTERNS};
pub use score::{extract_score, DEFAULT_SCORE_PATTERNS};
