//! Grouping of runs by style signature.

use crate::model::{StyleSignature, StyledRun};
use std::collections::BTreeMap;

/// Runs sharing one style signature, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelGroup {
    /// Signature shared by every run in the group
    pub signature: StyleSignature,

    /// Font size of the first run
    pub font_size: f64,

    /// Emphasis of the first run
    pub bold: bool,

    /// Non-blank runs sorted by `original_order`
    pub runs: Vec<StyledRun>,
}

impl LevelGroup {
    fn new(first: &StyledRun) -> Self {
        Self {
            signature: first.signature(),
            font_size: first.effective_font_size(),
            bold: first.bold,
            runs: Vec::new(),
        }
    }

    /// Display label such as "bold 14pt".
    pub fn label(&self) -> String {
        if self.bold {
            format!("bold {}pt", self.font_size)
        } else {
            format!("{}pt", self.font_size)
        }
    }

    /// Number of runs in the group.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Check if the group has no runs.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Buckets runs by exact signature, most prominent bucket first.
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleGrouper;

impl StyleGrouper {
    /// Create a new grouper.
    pub fn new() -> Self {
        Self
    }

    /// Group runs by signature.
    ///
    /// Blank runs are discarded. Runs inside a group keep `original_order`
    /// order (stable for ties) and groups are sorted by descending signature.
    pub fn group(&self, runs: &[StyledRun]) -> Vec<LevelGroup> {
        let mut ordered: Vec<&StyledRun> = runs.iter().filter(|r| !r.is_blank()).collect();
        ordered.sort_by_key(|r| r.original_order);

        let mut buckets: BTreeMap<StyleSignature, LevelGroup> = BTreeMap::new();
        for run in ordered {
            buckets
                .entry(run.signature())
                .or_insert_with(|| LevelGroup::new(run))
                .runs
                .push(run.clone());
        }

        let groups: Vec<LevelGroup> = buckets.into_values().rev().collect();
        log::debug!(
            "StyleGrouper: {} runs in {} style groups",
            groups.iter().map(LevelGroup::len).sum::<usize>(),
            groups.len()
        );
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_sorted_by_prominence() {
        let runs = vec![
            StyledRun::new("正文", 10.5, false, 0),
            StyledRun::new("一、选择题", 14.0, true, 1),
            StyledRun::new("（1）小问", 12.0, false, 2),
            StyledRun::new("1. 题干", 14.0, true, 3),
        ];
        let groups = StyleGrouper::new().group(&runs);

        let signatures: Vec<f64> = groups.iter().map(|g| g.signature.value()).collect();
        assert_eq!(signatures, vec![1014.0, 12.0, 10.5]);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[0].label(), "bold 14pt");
        assert_eq!(groups[2].label(), "10.5pt");
    }

    #[test]
    fn test_blank_runs_discarded_and_order_restored() {
        let runs = vec![
            StyledRun::new("b", 12.0, false, 5),
            StyledRun::new("   ", 12.0, false, 1),
            StyledRun::new("a", 12.0, false, 2),
        ];
        let groups = StyleGrouper::new().group(&runs);
        assert_eq!(groups.len(), 1);
        let texts: Vec<&str> = groups[0].runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(StyleGrouper::new().group(&[]).is_empty());
    }
}
