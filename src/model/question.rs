//! Question tree and level diagnostics.

use super::StyleSignature;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A numbered exam item and its nested sub-items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Resolved hierarchy level (1 = outermost)
    pub level: u32,

    /// Leading numbering token, e.g. "一、" or "（1）"
    pub number: String,

    /// Text after the numbering token
    pub body: String,

    /// Score found in the line, if any
    pub score: Option<i64>,

    /// `original_order` of the run this question came from
    pub source_order: u32,

    /// Base level of the style group the run belonged to
    pub base_level: u32,

    /// Offset of the numbering pattern within its style group
    pub sub_level: u32,

    /// Nested questions
    pub children: Vec<Question>,
}

impl Question {
    /// Create a leaf question.
    pub fn new(
        level: u32,
        number: impl Into<String>,
        body: impl Into<String>,
        source_order: u32,
    ) -> Self {
        Self {
            level,
            number: number.into(),
            body: body.into(),
            score: None,
            source_order,
            base_level: level,
            sub_level: 0,
            children: Vec::new(),
        }
    }

    /// Set the score and return self.
    pub fn with_score(mut self, score: Option<i64>) -> Self {
        self.score = score;
        self
    }

    /// Add a child question.
    pub fn add_child(&mut self, child: Question) {
        self.children.push(child);
    }

    /// Check if this question has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of questions in this subtree, including self.
    pub fn total_count(&self) -> usize {
        1 + self.children.iter().map(Question::total_count).sum::<usize>()
    }

    /// Depth of this subtree (a leaf has depth 1).
    pub fn max_depth(&self) -> usize {
        1 + self.children.iter().map(Question::max_depth).max().unwrap_or(0)
    }

    /// Number token followed by the body.
    pub fn full_text(&self) -> String {
        if self.body.is_empty() {
            self.number.clone()
        } else {
            format!("{}{}", self.number, self.body)
        }
    }

    /// Pre-order iterator over this subtree.
    pub fn iter(&self) -> QuestionIter<'_> {
        QuestionIter { stack: vec![self] }
    }
}

/// Pre-order traversal over a question subtree or forest.
pub struct QuestionIter<'a> {
    stack: Vec<&'a Question>,
}

impl<'a> QuestionIter<'a> {
    /// Iterate over every question of a forest in document order.
    pub fn forest(roots: &'a [Question]) -> Self {
        Self {
            stack: roots.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for QuestionIter<'a> {
    type Item = &'a Question;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Diagnostic summary for one style group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSummary {
    /// Human-readable group label, e.g. "bold 14pt"
    pub label: String,

    /// Group signature
    pub signature: StyleSignature,

    /// Font size of the first run in the group
    pub font_size: f64,

    /// Emphasis of the first run in the group
    pub bold: bool,

    /// Assigned base level; `None` when the group had no numbering lines
    pub base_level: Option<u32>,

    /// Number of distinct numbering patterns seen in the group
    pub sub_levels: u32,

    /// Number of non-blank runs in the group
    pub run_count: usize,
}

/// Result of outline extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    /// Top-level questions in document order
    pub questions: Vec<Question>,

    /// Per-group level summary, most prominent group first
    pub levels: Vec<LevelSummary>,
}

impl Outline {
    /// Check if no question was found.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Total number of questions at every depth.
    pub fn question_count(&self) -> usize {
        self.questions.iter().map(Question::total_count).sum()
    }

    /// Pre-order iterator over every question.
    pub fn iter(&self) -> QuestionIter<'_> {
        QuestionIter::forest(&self.questions)
    }

    /// Level summary keyed by group label, restricted to groups that took part.
    pub fn level_mapping(&self) -> BTreeMap<String, (u32, u32)> {
        self.levels
            .iter()
            .filter_map(|s| s.base_level.map(|base| (s.label.clone(), (base, s.sub_levels))))
            .collect()
    }

    /// Count of questions per level.
    pub fn level_histogram(&self) -> BTreeMap<u32, usize> {
        let mut histogram = BTreeMap::new();
        for question in self.iter() {
            *histogram.entry(question.level).or_insert(0) += 1;
        }
        histogram
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Question {
        let mut root = Question::new(1, "一、", "选择题", 0);
        let mut first = Question::new(2, "1.", "什么是", 1);
        first.add_child(Question::new(3, "（1）", "第一小问", 2));
        root.add_child(first);
        root.add_child(Question::new(2, "2.", "为什么", 3));
        root
    }

    #[test]
    fn test_counts_and_depth() {
        let root = sample();
        assert_eq!(root.total_count(), 4);
        assert_eq!(root.max_depth(), 3);
        assert!(!root.is_leaf());
    }

    #[test]
    fn test_preorder_iteration() {
        let root = sample();
        let orders: Vec<u32> = root.iter().map(|q| q.source_order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_full_text() {
        let q = Question::new(1, "一、", "选择题", 0);
        assert_eq!(q.full_text(), "一、选择题");
        assert_eq!(Question::new(1, "①", "", 0).full_text(), "①");
    }

    #[test]
    fn test_level_histogram() {
        let outline = Outline {
            questions: vec![sample()],
            levels: Vec::new(),
        };
        let histogram = outline.level_histogram();
        assert_eq!(histogram.get(&2), Some(&2));
        assert_eq!(outline.question_count(), 4);
    }
}
