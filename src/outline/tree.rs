//! Stack-based question tree construction.

use super::levels::LeveledRun;
use crate::model::Question;

/// Builds a question forest from level-tagged runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeBuilder;

impl TreeBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self
    }

    /// Build the forest in one pass.
    ///
    /// Runs must be sorted by `source_order`. The stack holds the open path
    /// from a root to the most recent question; a node is attached to its
    /// parent when it is closed, so siblings keep document order.
    pub fn build(&self, runs: Vec<LeveledRun>) -> Vec<Question> {
        let mut roots: Vec<Question> = Vec::new();
        let mut stack: Vec<Question> = Vec::new();

        for run in runs {
            let node = Question {
                level: run.level,
                number: run.number,
                body: run.body,
                score: run.score,
                source_order: run.source_order,
                base_level: run.base_level,
                sub_level: run.sub_level,
                children: Vec::new(),
            };

            while stack.last().is_some_and(|top| top.level >= node.level) {
                close_top(&mut stack, &mut roots);
            }
            stack.push(node);
        }

        while !stack.is_empty() {
            close_top(&mut stack, &mut roots);
        }

        log::debug!("TreeBuilder: {} root questions", roots.len());
        roots
    }
}

fn close_top(stack: &mut Vec<Question>, roots: &mut Vec<Question>) {
    let Some(closed) = stack.pop() else {
        return;
    };
    match stack.last_mut() {
        Some(parent) => parent.add_child(closed),
        None => roots.push(closed),
    }
}
