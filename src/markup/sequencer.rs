//! Reading-order content blocks from document body markup.

use super::table::TableAssembler;
use super::xml::{Element, ElementScanner, PropertyTag, TextExtractor};
use crate::model::{BlockContent, ContentBlock, MediaContext, Table};

enum Anchor<'a> {
    Paragraph(String),
    Table(Element<'a>),
    Image(String),
}

/// Emits paragraphs, tables and images in document order.
#[derive(Debug, Clone)]
pub struct ContentSequencer {
    body: ElementScanner,
    table: ElementScanner,
    paragraph: ElementScanner,
    drawing: ElementScanner,
    object: ElementScanner,
    blip: PropertyTag,
    text: TextExtractor,
    assembler: TableAssembler,
}

impl ContentSequencer {
    /// Create a new sequencer.
    pub fn new() -> Self {
        Self {
            body: ElementScanner::new("w:body"),
            table: ElementScanner::new("w:tbl"),
            paragraph: ElementScanner::new("w:p"),
            drawing: ElementScanner::new("w:drawing"),
            object: ElementScanner::new("w:object"),
            blip: PropertyTag::new("a:blip"),
            text: TextExtractor::new(),
            assembler: TableAssembler::new(),
        }
    }

    /// The body content, or the whole markup when there is no `w:body`.
    fn body<'a>(&self, markup: &'a str) -> &'a str {
        self.body.first(markup).map(|b| b.inner).unwrap_or(markup)
    }

    /// Sequence body markup into content blocks.
    ///
    /// Paragraphs inside tables are folded into their table. Drawings inside
    /// tables or embedded objects are not emitted as images, nor are drawings
    /// whose media the context rejects. Tables and images are numbered by
    /// their own ordinal among blocks of the same kind.
    pub fn sequence(&self, markup: &str, media: &MediaContext) -> Vec<ContentBlock> {
        let body = self.body(markup);
        let tables = self.table.scan(body);
        let objects = self.object.scan(body);
        let inside = |offset: usize, ranges: &[Element<'_>]| ranges.iter().any(|e| e.contains(offset));

        let mut anchors: Vec<(usize, Anchor<'_>)> = Vec::new();

        for p in self.paragraph.scan(body) {
            if inside(p.start, &tables) {
                continue;
            }
            let text = self.text.text(p.markup);
            let text = text.trim();
            if !text.is_empty() {
                anchors.push((p.start, Anchor::Paragraph(text.to_string())));
            }
        }

        for t in &tables {
            anchors.push((t.start, Anchor::Table(*t)));
        }

        for d in self.drawing.scan(body) {
            if inside(d.start, &tables) || inside(d.start, &objects) {
                continue;
            }
            if let Some(rid) = self.blip.attribute(d.markup, "r:embed") {
                anchors.push((d.start, Anchor::Image(rid)));
            }
        }

        anchors.sort_by_key(|(start, _)| *start);

        let mut blocks = Vec::with_capacity(anchors.len());
        let mut table_ordinal = 0;
        let mut image_ordinal = 0;

        for (_, anchor) in anchors {
            let content = match anchor {
                Anchor::Paragraph(text) => BlockContent::Paragraph { text },
                Anchor::Table(element) => {
                    let table = self
                        .assembler
                        .parse_table_with(element.markup, table_ordinal, media);
                    table_ordinal += 1;
                    BlockContent::Table(table)
                }
                Anchor::Image(rid) => match media.resolve_image(&rid, image_ordinal) {
                    Some(image) => {
                        image_ordinal += 1;
                        BlockContent::Image(image)
                    }
                    None => continue,
                },
            };
            blocks.push(ContentBlock::new(blocks.len(), content));
        }

        log::debug!(
            "ContentSequencer: {} blocks ({} tables, {} images)",
            blocks.len(),
            table_ordinal,
            image_ordinal
        );
        blocks
    }

    /// Top-level tables of the body, in document order.
    pub fn tables(&self, markup: &str, media: &MediaContext) -> Vec<Table> {
        self.table
            .scan(self.body(markup))
            .iter()
            .enumerate()
            .map(|(i, t)| self.assembler.parse_table_with(t.markup, i, media))
            .collect()
    }
}

impl Default for ContentSequencer {
    fn default() -> Self {
        Self::new()
    }
}
