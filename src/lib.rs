//! # unexam
//!
//! Exam paper structure inference for Rust.
//!
//! This library takes the styled text runs and body markup of an exam
//! document and recovers its structure: a nested question outline with
//! scores, tables with merged cells resolved, and the reading order of
//! paragraphs, tables and images.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unexam::{extract_outline, render, RuleSet, StyledRun};
//!
//! let runs = vec![
//!     StyledRun::new("一、选择题（共30分）", 14.0, true, 0),
//!     StyledRun::new("1.下列说法正确的是", 12.0, false, 1),
//! ];
//!
//! let outline = extract_outline(&runs, &RuleSet::default());
//! println!("{}", render::outline_to_text(&outline.questions));
//! ```
//!
//! ## Features
//!
//! - **Style-driven levels**: font size and weight decide the hierarchy
//! - **Configurable numbering**: per-level patterns with legacy config migration
//! - **Merged tables**: horizontal and vertical spans on a complete grid
//! - **Reading order**: paragraphs, tables and content images in sequence
//! - **Batch processing**: bounded parallelism with progress and cancellation

pub mod batch;
pub mod error;
pub mod markup;
pub mod model;
pub mod outline;
pub mod render;
pub mod rules;

// Re-export commonly used types
pub use batch::{BatchOptions, BatchProcessor, BatchReport, CancelToken, DocumentInput, DocumentSource};
pub use error::{Error, Result};
pub use markup::{ContentSequencer, TableAssembler};
pub use model::{
    BlockContent, ContentBlock, ImageRef, LevelSummary, MediaContext, Outline, Question,
    StyledRun, Table, TableCell, TableRow,
};
pub use outline::{ExtractOptions, OutlineExtractor};
pub use render::JsonFormat;
pub use rules::{RawRuleConfig, RuleConfig, RuleSet};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything extracted from one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResult {
    /// Document name
    pub name: String,

    /// Question outline
    pub outline: Outline,

    /// Paragraphs, tables and images in reading order
    pub blocks: Vec<ContentBlock>,
}

impl DocumentResult {
    /// Tables among the content blocks.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match &b.content {
            BlockContent::Table(table) => Some(table),
            _ => None,
        })
    }
}

/// Per-document pipeline: outline from runs, blocks from body markup.
///
/// # Example
///
/// ```no_run
/// use unexam::{DocumentInput, ExtractOptions, RuleConfig, Unexam};
///
/// let config = RuleConfig::from_file("rules.json").unwrap();
/// let pipeline = Unexam::new()
///     .with_config(&config)
///     .with_options(ExtractOptions::new().with_max_level(3));
///
/// let result = pipeline.process(&DocumentInput::new("paper", Vec::new()));
/// println!("{} questions", result.outline.question_count());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Unexam {
    extractor: OutlineExtractor,
    sequencer: ContentSequencer,
}

impl Unexam {
    /// Create a pipeline with the default numbering rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a compiled rule set.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        let options = self.extractor.options().clone();
        self.extractor = OutlineExtractor::new(rules).with_options(options);
        self
    }

    /// Compile and use a rule configuration.
    pub fn with_config(self, config: &RuleConfig) -> Self {
        self.with_rules(RuleSet::from_config(config))
    }

    /// Set outline extraction options.
    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.extractor = self.extractor.with_options(options);
        self
    }

    /// Rules in use.
    pub fn rules(&self) -> &RuleSet {
        self.extractor.rules()
    }

    /// Extract the question outline.
    pub fn outline(&self, runs: &[StyledRun]) -> Outline {
        self.extractor.extract(runs)
    }

    /// Sequence body markup into content blocks.
    pub fn blocks(&self, body_markup: &str, media: &MediaContext) -> Vec<ContentBlock> {
        self.sequencer.sequence(body_markup, media)
    }

    /// Parse every top-level table of the body.
    pub fn tables(&self, body_markup: &str, media: &MediaContext) -> Vec<Table> {
        self.sequencer.tables(body_markup, media)
    }

    /// Run the whole pipeline over one document.
    pub fn process(&self, input: &DocumentInput) -> DocumentResult {
        DocumentResult {
            name: input.name.clone(),
            outline: self.outline(&input.runs),
            blocks: self.blocks(&input.body_markup, &input.media),
        }
    }
}

/// Extract a question outline from styled runs.
///
/// # Example
///
/// ```
/// use unexam::{extract_outline, RuleSet, StyledRun};
///
/// let runs = vec![
///     StyledRun::new("一、选择题", 14.0, true, 0),
///     StyledRun::new("1.第一题", 12.0, false, 1),
/// ];
/// let outline = extract_outline(&runs, &RuleSet::default());
/// assert_eq!(outline.questions[0].children.len(), 1);
/// ```
pub fn extract_outline(runs: &[StyledRun], rules: &RuleSet) -> Outline {
    OutlineExtractor::new(rules.clone()).extract(runs)
}

/// Parse one table's markup with merged cells resolved.
pub fn parse_table(markup: &str, position: usize) -> Table {
    TableAssembler::new().parse_table(markup, position)
}

/// Sequence body markup into paragraphs, tables and images.
pub fn sequence_content(body_markup: &str, media: &MediaContext) -> Vec<ContentBlock> {
    ContentSequencer::new().sequence(body_markup, media)
}

/// Parse a JSON array of styled runs.
///
/// A JSON `null` is a missing input and fails with [`Error::MissingInput`];
/// an empty array is valid and yields no runs.
pub fn runs_from_json(json: &str) -> Result<Vec<StyledRun>> {
    let runs: Option<Vec<StyledRun>> = serde_json::from_str(json)?;
    runs.ok_or_else(|| Error::MissingInput("styled runs".to_string()))
}

/// Read styled runs from a JSON file.
pub fn runs_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<StyledRun>> {
    let json = std::fs::read_to_string(path)?;
    runs_from_json(&json)
}

/// Serialize any extraction result to JSON.
///
/// # Example
///
/// ```
/// use unexam::{to_json, JsonFormat, Outline};
///
/// let json = to_json(&Outline::default(), JsonFormat::Compact).unwrap();
/// assert!(json.starts_with('{'));
/// ```
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    render::to_json(value, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_from_json() {
        let runs = runs_from_json(r#"[{"text": "一、", "original_order": 0}]"#).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].font_size, model::DEFAULT_FONT_SIZE);
        assert!(!runs[0].bold);

        assert!(runs_from_json("[]").unwrap().is_empty());
        assert!(matches!(runs_from_json("null"), Err(Error::MissingInput(_))));
        assert!(matches!(runs_from_json("{"), Err(Error::Json(_))));
    }

    #[test]
    fn test_process_document() {
        let body = "<w:body><w:p><w:r><w:t>一、选择题</w:t></w:r></w:p>\
                    <w:tbl><w:tr><w:tc><w:p><w:r><w:t>x</w:t></w:r></w:p></w:tc></w:tr></w:tbl></w:body>";
        let input = DocumentInput::new("paper", vec![StyledRun::new("一、选择题", 14.0, true, 0)])
            .with_body(body);

        let result = Unexam::new().process(&input);
        assert_eq!(result.name, "paper");
        assert_eq!(result.outline.question_count(), 1);
        assert_eq!(result.blocks.len(), 2);
        assert_eq!(result.tables().count(), 1);
    }

    #[test]
    fn test_with_rules_keeps_options() {
        let pipeline = Unexam::new()
            .with_options(ExtractOptions::new().with_max_level(1))
            .with_rules(RuleSet::compile(&[r"\d+\."]));

        let runs = vec![
            StyledRun::new("1.a", 14.0, true, 0),
            StyledRun::new("2.b", 12.0, false, 1),
        ];
        let outline = pipeline.outline(&runs);
        assert_eq!(outline.question_count(), 1);
    }
}
