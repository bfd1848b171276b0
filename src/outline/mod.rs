//! Question outline inference.
//!
//! The pipeline is strictly sequential per document:
//!
//! 1. [`StyleGrouper`] buckets runs by style signature, most prominent first.
//! 2. [`LevelAssigner`] gives each bucket a base level and each numbering
//!    pattern inside it a sub-level.
//! 3. [`TreeBuilder`] nests the level-tagged runs into a question forest.
//!
//! [`OutlineExtractor`] wires the three stages together.

mod extractor;
mod grouper;
mod levels;
pub mod text;
mod tree;

pub use extractor::{ExtractOptions, OutlineExtractor};
pub use grouper::{LevelGroup, StyleGrouper};
pub use levels::{GroupScan, LevelAssigner, LeveledRun};
pub use text::{extract_from_text, TextOutline};
pub use tree::TreeBuilder;
