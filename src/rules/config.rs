//! Rule configuration and migration of legacy shapes.
//!
//! Three JSON shapes are accepted:
//!
//! * current: `{"levels": [{"name", "patterns", "score_patterns"}], "bracket", "underline", "ignore"}`
//! * global score: `{"levels": [{"name", "patterns"}], "score": [...], ...}`
//! * flat: `{"level1": [...], "level2": [...], "level3": [...], "score": [...], ...}`
//!
//! Legacy shapes are upgraded by [`RawRuleConfig::migrate`], a pure function.

use super::Pattern;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_LEVEL_NAMES: [&str; 3] = ["一级题号", "二级题号", "三级题号"];

fn level_name(index: usize) -> String {
    DEFAULT_LEVEL_NAMES
        .get(index)
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("{}级题号", index + 1))
}

/// Numbering and score patterns for one hierarchy level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelRule {
    /// Display name of the level
    #[serde(default)]
    pub name: String,

    /// Numbering pattern strings
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Score pattern strings for questions resolved to this level
    #[serde(default)]
    pub score_patterns: Vec<String>,
}

impl LevelRule {
    /// Create a level without score patterns.
    pub fn new(name: impl Into<String>, patterns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            patterns,
            score_patterns: Vec::new(),
        }
    }

    /// Set score patterns and return self.
    pub fn with_score_patterns(mut self, score_patterns: Vec<String>) -> Self {
        self.score_patterns = score_patterns;
        self
    }
}

/// Rule configuration in its current per-level shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Levels, outermost first
    pub levels: Vec<LevelRule>,

    /// Bracket pattern strings
    #[serde(default)]
    pub bracket: Vec<String>,

    /// Underline pattern strings
    #[serde(default)]
    pub underline: Vec<String>,

    /// Lines matching any of these are excluded from the outline
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            levels: default_levels(),
            bracket: Vec::new(),
            underline: Vec::new(),
            ignore: Vec::new(),
        }
    }
}

fn default_levels() -> Vec<LevelRule> {
    (0..DEFAULT_LEVEL_NAMES.len())
        .map(|i| LevelRule::new(level_name(i), Vec::new()))
        .collect()
}

impl RuleConfig {
    /// Parse any supported shape and migrate it to the current one.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawRuleConfig = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("unrecognized rule configuration: {}", e)))?;
        Ok(raw.migrate())
    }

    /// Read and migrate a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize in the current shape.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Drop pattern strings that fail to compile and name unnamed levels.
    pub fn validated(mut self) -> Self {
        if self.levels.is_empty() {
            self.levels = default_levels();
        }
        for (i, level) in self.levels.iter_mut().enumerate() {
            if level.name.trim().is_empty() {
                level.name = level_name(i);
            }
            retain_valid(&mut level.patterns);
            retain_valid(&mut level.score_patterns);
        }
        retain_valid(&mut self.bracket);
        retain_valid(&mut self.underline);
        retain_valid(&mut self.ignore);
        self
    }

    /// Total number of numbering pattern strings over all levels.
    pub fn numbering_count(&self) -> usize {
        self.levels.iter().map(|l| l.patterns.len()).sum()
    }
}

fn retain_valid(patterns: &mut Vec<String>) {
    patterns.retain(|p| {
        let ok = Pattern::is_valid(p);
        if !ok {
            log::warn!("Dropping invalid pattern '{}'", p);
        }
        ok
    });
}

/// Legacy shape: per-level numbering with one global score list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalScoreConfig {
    /// Levels, outermost first
    pub levels: Vec<LevelRule>,

    /// Score patterns shared by every level
    #[serde(default)]
    pub score: Vec<String>,

    /// Bracket pattern strings
    #[serde(default)]
    pub bracket: Vec<String>,

    /// Underline pattern strings
    #[serde(default)]
    pub underline: Vec<String>,

    /// Ignore pattern strings
    #[serde(default)]
    pub ignore: Vec<String>,
}

/// Legacy shape: three fixed level arrays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlatConfig {
    /// Level 1 numbering patterns
    #[serde(default)]
    pub level1: Vec<String>,

    /// Level 2 numbering patterns
    #[serde(default)]
    pub level2: Vec<String>,

    /// Level 3 numbering patterns
    #[serde(default)]
    pub level3: Vec<String>,

    /// Score patterns shared by every level
    #[serde(default)]
    pub score: Vec<String>,

    /// Bracket pattern strings
    #[serde(default)]
    pub bracket: Vec<String>,

    /// Underline pattern strings
    #[serde(default)]
    pub underline: Vec<String>,

    /// Ignore pattern strings
    #[serde(default)]
    pub ignore: Vec<String>,
}

/// Any accepted configuration shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawRuleConfig {
    /// Current per-level shape
    Current(RuleConfig),
    /// Per-level numbering with a global score list
    GlobalScore(GlobalScoreConfig),
    /// `level1`/`level2`/`level3` arrays
    Flat(FlatConfig),
}

impl RawRuleConfig {
    /// Upgrade to the current shape.
    ///
    /// Global score patterns are copied into every level that has none of
    /// its own, so no configured pattern is lost. Migrating the result
    /// again yields the same configuration.
    pub fn migrate(self) -> RuleConfig {
        match self {
            RawRuleConfig::Current(mut config) => {
                if config.levels.is_empty() {
                    config.levels = default_levels();
                }
                config
            }
            RawRuleConfig::GlobalScore(legacy) => {
                let levels = if legacy.levels.is_empty() {
                    default_levels()
                } else {
                    legacy.levels
                };
                RuleConfig {
                    levels: with_global_score(levels, &legacy.score),
                    bracket: legacy.bracket,
                    underline: legacy.underline,
                    ignore: legacy.ignore,
                }
            }
            RawRuleConfig::Flat(flat) => {
                let levels = [flat.level1, flat.level2, flat.level3]
                    .into_iter()
                    .enumerate()
                    .map(|(i, patterns)| LevelRule::new(level_name(i), patterns))
                    .collect();
                RuleConfig {
                    levels: with_global_score(levels, &flat.score),
                    bracket: flat.bracket,
                    underline: flat.underline,
                    ignore: flat.ignore,
                }
            }
        }
    }

    /// Check if this is already the current shape.
    pub fn is_current(&self) -> bool {
        matches!(self, RawRuleConfig::Current(_))
    }
}

impl From<RuleConfig> for RawRuleConfig {
    fn from(config: RuleConfig) -> Self {
        RawRuleConfig::Current(config)
    }
}

fn with_global_score(mut levels: Vec<LevelRule>, score: &[String]) -> Vec<LevelRule> {
    for (i, level) in levels.iter_mut().enumerate() {
        if level.name.trim().is_empty() {
            level.name = level_name(i);
        }
        if level.score_patterns.is_empty() {
            level.score_patterns = score.to_vec();
        }
    }
    levels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_three_named_levels() {
        let config = RuleConfig::default();
        let names: Vec<&str> = config.levels.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["一级题号", "二级题号", "三级题号"]);
        assert_eq!(config.numbering_count(), 0);
    }

    #[test]
    fn test_current_shape_passes_through() {
        let json = r#"{"levels": [{"name": "大题", "patterns": ["^[一二三]、"], "score_patterns": ["共(\\d+)分"]}]}"#;
        let raw: RawRuleConfig = serde_json::from_str(json).unwrap();
        assert!(raw.is_current());

        let config = raw.migrate();
        assert_eq!(config.levels.len(), 1);
        assert_eq!(config.levels[0].score_patterns, vec![r"共(\d+)分"]);
    }

    #[test]
    fn test_global_score_shape() {
        let json = r#"{"levels": [{"name": "", "patterns": ["^\\d+\\."]}], "score": ["(\\d+)分"]}"#;
        let config = RuleConfig::from_json(json).unwrap();
        assert_eq!(config.levels[0].name, "一级题号");
        assert_eq!(config.levels[0].score_patterns, vec![r"(\d+)分"]);
    }

    #[test]
    fn test_flat_shape() {
        let json = r#"{"level1": ["^[一二三]、"], "level2": ["^\\d+\\."], "score": ["(\\d+)分"], "bracket": ["\\(.*?\\)"]}"#;
        let config = RuleConfig::from_json(json).unwrap();
        assert_eq!(config.levels.len(), 3);
        assert_eq!(config.levels[1].patterns, vec![r"^\d+\."]);
        assert!(config.levels[2].patterns.is_empty());
        assert!(config
            .levels
            .iter()
            .all(|l| l.score_patterns == vec![r"(\d+)分".to_string()]));
        assert_eq!(config.bracket, vec![r"\(.*?\)"]);
    }

    #[test]
    fn test_empty_object_is_default() {
        let config = RuleConfig::from_json("{}").unwrap();
        assert_eq!(config, RuleConfig::default());
    }

    #[test]
    fn test_unknown_shape_is_config_error() {
        let err = RuleConfig::from_json(r#"{"patterns": 3}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_validated_drops_invalid() {
        let config = RuleConfig {
            levels: vec![LevelRule::new("", vec!["([".to_string(), r"^\d+".to_string()])],
            ignore: vec!["[".to_string()],
            ..RuleConfig::default()
        }
        .validated();
        assert_eq!(config.levels[0].name, "一级题号");
        assert_eq!(config.levels[0].patterns, vec![r"^\d+"]);
        assert!(config.ignore.is_empty());
    }
}
