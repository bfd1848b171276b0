//! Document model types for exam structure.
//!
//! This module defines the data that flows between the pipeline stages:
//! styled runs coming in, and question trees, tables and ordered content
//! blocks going out. All types are plain data and serialize to JSON.

mod content;
mod question;
mod resource;
mod run;
mod table;

pub use content::{BlockContent, ContentBlock};
pub use question::{LevelSummary, Outline, Question, QuestionIter};
pub use resource::{
    extension_of, mime_for_extension, normalize_target, ImageRef, MediaContext, MediaResource,
    Relationship, RelationshipKind, PREVIEW_EXTENSIONS, SUPPORTED_IMAGE_EXTENSIONS,
};
pub use run::{StyleSignature, StyledRun, DEFAULT_FONT_SIZE};
pub use table::{Table, TableCell, TableRow};
