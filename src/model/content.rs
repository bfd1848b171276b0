//! Ordered document content blocks.

use super::{ImageRef, Table};
use serde::{Deserialize, Serialize};

/// One item of the document in reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Emission order, starting at 0
    pub index: usize,

    /// Block payload
    #[serde(flatten)]
    pub content: BlockContent,
}

impl ContentBlock {
    /// Create a block.
    pub fn new(index: usize, content: BlockContent) -> Self {
        Self { index, content }
    }

    /// Check if this block is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self.content, BlockContent::Paragraph { .. })
    }

    /// Check if this block is a table.
    pub fn is_table(&self) -> bool {
        matches!(self.content, BlockContent::Table(_))
    }

    /// Check if this block is an image.
    pub fn is_image(&self) -> bool {
        matches!(self.content, BlockContent::Image(_))
    }

    /// Text of a paragraph block.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            BlockContent::Paragraph { text } => Some(text),
            _ => None,
        }
    }
}

/// Payload of a content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum BlockContent {
    /// Body paragraph outside any table
    Paragraph {
        /// Paragraph text
        text: String,
    },
    /// Table with merged cells resolved
    Table(Table),
    /// Content image
    Image(ImageRef),
}

impl BlockContent {
    /// Type name used in serialized output.
    pub fn kind(&self) -> &'static str {
        match self {
            BlockContent::Paragraph { .. } => "paragraph",
            BlockContent::Table(_) => "table",
            BlockContent::Image(_) => "image",
        }
    }
}
