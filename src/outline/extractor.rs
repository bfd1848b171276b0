//! Outline extraction pipeline.

use super::{LevelAssigner, StyleGrouper, TreeBuilder};
use crate::model::{Outline, StyledRun};
use crate::rules::RuleSet;

/// Options for outline extraction.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Extract scores for matched questions
    pub extract_scores: bool,

    /// Drop runs matching the rule set's ignore patterns before grouping
    pub apply_ignore: bool,

    /// Drop questions deeper than this level
    pub max_level: Option<u32>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            extract_scores: true,
            apply_ignore: true,
            max_level: None,
        }
    }
}

impl ExtractOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable score extraction.
    pub fn with_scores(mut self, extract_scores: bool) -> Self {
        self.extract_scores = extract_scores;
        self
    }

    /// Enable or disable ignore patterns.
    pub fn with_ignore(mut self, apply_ignore: bool) -> Self {
        self.apply_ignore = apply_ignore;
        self
    }

    /// Limit the outline depth.
    pub fn with_max_level(mut self, max_level: u32) -> Self {
        self.max_level = Some(max_level);
        self
    }
}

/// Runs the grouper, assigner and tree builder over one document.
#[derive(Debug, Clone)]
pub struct OutlineExtractor {
    rules: RuleSet,
    options: ExtractOptions,
}

impl OutlineExtractor {
    /// Create an extractor.
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            options: ExtractOptions::default(),
        }
    }

    /// Set options and return self.
    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// The rule set in use.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// The options in use.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract the question outline from styled runs.
    pub fn extract(&self, runs: &[StyledRun]) -> Outline {
        if runs.is_empty() {
            return Outline::default();
        }

        let kept: Vec<StyledRun>;
        let runs = if self.options.apply_ignore {
            kept = runs
                .iter()
                .filter(|r| !self.rules.is_ignored(&r.text))
                .cloned()
                .collect();
            if kept.len() < runs.len() {
                log::debug!("OutlineExtractor: ignored {} runs", runs.len() - kept.len());
            }
            &kept[..]
        } else {
            runs
        };

        let groups = StyleGrouper::new().group(runs);
        let (mut leveled, levels) = LevelAssigner::new()
            .with_scores(self.options.extract_scores)
            .assign(&groups, &self.rules);

        if let Some(max) = self.options.max_level {
            leveled.retain(|r| r.level <= max);
        }

        let questions = TreeBuilder::new().build(leveled);
        log::debug!(
            "OutlineExtractor: {} runs -> {} root questions",
            runs.len(),
            questions.len()
        );
        Outline { questions, levels }
    }
}

impl Default for OutlineExtractor {
    fn default() -> Self {
        Self::new(RuleSet::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Pattern;

    fn runs() -> Vec<StyledRun> {
        vec![
            StyledRun::new("注意事项：答案写在答题卡上", 14.0, true, 0),
            StyledRun::new("一、选择题", 14.0, true, 1),
            StyledRun::new("1.什么是", 14.0, true, 2),
            StyledRun::new("（1）第一小问", 12.0, false, 3),
        ]
    }

    #[test]
    fn test_extract_worked_example() {
        let outline = OutlineExtractor::default().extract(&runs());

        assert_eq!(outline.questions.len(), 1);
        let root = &outline.questions[0];
        assert_eq!((root.level, root.number.as_str()), (1, "一、"));
        assert_eq!((root.children[0].level, root.children[0].number.as_str()), (2, "1."));
        let leaf = &root.children[0].children[0];
        assert_eq!((leaf.level, leaf.number.as_str()), (3, "（1）"));
    }

    #[test]
    fn test_ignore_patterns_filter_runs() {
        let rules = RuleSet::compile(&[r"^注意事项", r"^[一二三]、"])
            .with_ignore(Pattern::compile_all(&["注意事项"]));

        let outline = OutlineExtractor::new(rules.clone()).extract(&runs());
        assert_eq!(outline.question_count(), 1);

        let outline = OutlineExtractor::new(rules)
            .with_options(ExtractOptions::new().with_ignore(false))
            .extract(&runs());
        assert_eq!(outline.question_count(), 2);
    }

    #[test]
    fn test_max_level() {
        let outline = OutlineExtractor::default()
            .with_options(ExtractOptions::new().with_max_level(2))
            .extract(&runs());
        assert_eq!(outline.question_count(), 2);
    }

    #[test]
    fn test_empty_runs() {
        let outline = OutlineExtractor::default().extract(&[]);
        assert!(outline.is_empty());
        assert!(outline.levels.is_empty());
    }
}
