//! Level assignment for style groups.
//!
//! Each group is scanned twice. The first pass records, for every numbering
//! pattern, the order in which it first appears inside the group; the second
//! pass turns that order into sub-level offsets on top of the group's base
//! level. Groups without any numbering line are skipped and consume no level.

use super::grouper::LevelGroup;
use crate::model::LevelSummary;
use crate::rules::{LeadingMatch, RuleSet};
use std::collections::BTreeMap;

/// A matched run tagged with its resolved level.
#[derive(Debug, Clone, PartialEq)]
pub struct LeveledRun {
    /// Final level (`base_level + sub_level`)
    pub level: u32,

    /// Base level of the run's style group
    pub base_level: u32,

    /// Sub-level of the matching pattern within the group
    pub sub_level: u32,

    /// Priority index of the matching pattern
    pub pattern_index: usize,

    /// Numbering token
    pub number: String,

    /// Text after the numbering token
    pub body: String,

    /// Score extracted for the resolved level
    pub score: Option<i64>,

    /// `original_order` of the run
    pub source_order: u32,
}

/// First-pass result for one group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupScan {
    /// Pattern index → sub-level, by first appearance
    pub pattern_order: BTreeMap<usize, u32>,

    /// Matched runs as (index into the group's runs, match)
    pub matches: Vec<(usize, LeadingMatch)>,
}

impl GroupScan {
    /// Number of distinct patterns seen.
    pub fn sub_level_count(&self) -> u32 {
        self.pattern_order.len() as u32
    }
}

/// Assigns base levels and sub-levels.
#[derive(Debug, Clone, Copy)]
pub struct LevelAssigner {
    extract_scores: bool,
}

impl LevelAssigner {
    /// Create a new assigner that extracts scores.
    pub fn new() -> Self {
        Self {
            extract_scores: true,
        }
    }

    /// Enable or disable score extraction.
    pub fn with_scores(mut self, extract_scores: bool) -> Self {
        self.extract_scores = extract_scores;
        self
    }

    /// Scan a group and record the first-seen order of each pattern.
    pub fn discover(&self, group: &LevelGroup, rules: &RuleSet) -> GroupScan {
        let mut scan = GroupScan::default();
        for (i, run) in group.runs.iter().enumerate() {
            let Some(m) = rules.match_leading(&run.text) else {
                continue;
            };
            let next = scan.pattern_order.len() as u32;
            scan.pattern_order.entry(m.pattern_index).or_insert(next);
            scan.matches.push((i, m));
        }
        scan
    }

    /// Assign levels to every matched run of every group.
    ///
    /// Groups must be in descending signature order. Returns the matched runs
    /// sorted by `source_order` and one summary per group.
    pub fn assign(&self, groups: &[LevelGroup], rules: &RuleSet) -> (Vec<LeveledRun>, Vec<LevelSummary>) {
        let mut next_base = 1u32;
        let mut leveled = Vec::new();
        let mut summaries = Vec::with_capacity(groups.len());

        for group in groups {
            let scan = self.discover(group, rules);
            let count = scan.sub_level_count();

            let base_level = if count == 0 {
                None
            } else {
                let base = next_base;
                next_base += count;
                Some(base)
            };

            summaries.push(LevelSummary {
                label: group.label(),
                signature: group.signature,
                font_size: group.font_size,
                bold: group.bold,
                base_level,
                sub_levels: count,
                run_count: group.len(),
            });

            let Some(base) = base_level else {
                log::debug!("LevelAssigner: group {} has no numbering, skipped", group.label());
                continue;
            };
            log::debug!(
                "LevelAssigner: group {} -> base {} with {} sub-levels",
                group.label(),
                base,
                count
            );

            for (i, m) in scan.matches {
                let run = &group.runs[i];
                let sub_level = scan.pattern_order.get(&m.pattern_index).copied().unwrap_or(0);
                let level = base + sub_level;
                let score = if self.extract_scores {
                    rules.extract_score(run.text.trim(), level)
                } else {
                    None
                };
                leveled.push(LeveledRun {
                    level,
                    base_level: base,
                    sub_level,
                    pattern_index: m.pattern_index,
                    number: m.number,
                    body: m.remainder,
                    score,
                    source_order: run.original_order,
                });
            }
        }

        leveled.sort_by_key(|r| r.source_order);
        (leveled, summaries)
    }
}

impl Default for LevelAssigner {
    fn default() -> Self {
        Self::new()
    }
}
