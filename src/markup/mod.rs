//! WordprocessingML markup stages.
//!
//! Body and table markup arrive as raw strings taken from a `.docx`
//! package. Nothing here unzips or opens files; the caller supplies the
//! markup and a [`MediaContext`](crate::model::MediaContext) for images.

pub mod relationships;
mod sequencer;
mod table;
pub mod xml;

pub use relationships::parse_relationships;
pub use sequencer::ContentSequencer;
pub use table::{CellMarkup, RowMarkup, TableAssembler, VerticalMerge, MAX_UNDECLARED_SPAN};
