//! Rendering module for converting extraction results to output formats.

mod html;
mod json;
mod text;

pub use html::{blocks_to_markdown, table_to_html};
pub use json::{to_json, JsonFormat};
pub use text::outline_to_text;
