//! Event-reader helpers for WordprocessingML fragments.
//!
//! Markup arrives as raw text, often cut out of a larger part without its
//! namespace declarations. Everything here reads it with `quick_xml::Reader`
//! and no namespace resolution, so prefixed names such as `w:tc` match
//! literally. Offsets are byte offsets into the input string.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Reader over a fragment that tolerates unbalanced and mismatched tags.
pub(crate) fn fragment_reader(xml: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(xml);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    reader
}

/// Byte range of the tag the reader returned last.
fn tag_range(xml: &str, reader: &Reader<&[u8]>) -> (usize, usize) {
    let end = (reader.buffer_position() as usize).min(xml.len());
    let start = xml[..end].rfind('<').unwrap_or(end);
    (start, end)
}

/// One element found in a markup string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element<'a> {
    /// Byte offset of the opening `<`
    pub start: usize,

    /// Byte offset just past the closing `>`
    pub end: usize,

    /// The opening tag, attributes included
    pub tag: &'a str,

    /// Content between the opening and closing tags
    pub inner: &'a str,

    /// The whole element
    pub markup: &'a str,
}

impl Element<'_> {
    /// Check if a byte offset lies inside this element.
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Unescaped value of an attribute of the opening tag.
    pub fn attr(&self, name: &str) -> Option<String> {
        let mut reader = fragment_reader(self.tag);
        match reader.read_event() {
            Ok(Event::Start(tag) | Event::Empty(tag)) => attribute(&tag, name),
            _ => None,
        }
    }
}

/// Finds outermost elements with a given qualified name.
#[derive(Debug, Clone)]
pub struct ElementScanner {
    name: String,
}

impl ElementScanner {
    /// Create a scanner for an element name such as `w:tbl`.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    /// Outermost elements in document order.
    ///
    /// Same-name elements nested inside a match stay part of it. An element
    /// left open at the end of the markup extends to the end; stray closing
    /// tags are ignored.
    pub fn scan<'a>(&self, xml: &'a str) -> Vec<Element<'a>> {
        let name = self.name.as_bytes();
        let mut reader = fragment_reader(xml);
        let mut elements = Vec::new();
        let mut depth = 0usize;
        let mut open: Option<(usize, usize)> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) if e.name().as_ref() == name => {
                    if depth == 0 {
                        open = Some(tag_range(xml, &reader));
                    }
                    depth += 1;
                }
                Ok(Event::Empty(e)) if e.name().as_ref() == name => {
                    if depth == 0 {
                        let (start, end) = tag_range(xml, &reader);
                        elements.push(Element {
                            start,
                            end,
                            tag: &xml[start..end],
                            inner: "",
                            markup: &xml[start..end],
                        });
                    }
                }
                Ok(Event::End(e)) if e.name().as_ref() == name => {
                    if depth == 0 {
                        continue;
                    }
                    depth -= 1;
                    if depth == 0 {
                        if let Some((start, inner_start)) = open.take() {
                            let (close, end) = tag_range(xml, &reader);
                            elements.push(Element {
                                start,
                                end,
                                tag: &xml[start..inner_start],
                                inner: &xml[inner_start..close],
                                markup: &xml[start..end],
                            });
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    log::debug!(
                        "Stopped scanning <{}> at offset {}: {}",
                        self.name,
                        reader.buffer_position(),
                        e
                    );
                    break;
                }
                Ok(_) => {}
            }
        }

        if let Some((start, inner_start)) = open {
            log::debug!("Unclosed <{}> at offset {}", self.name, start);
            elements.push(Element {
                start,
                end: xml.len(),
                tag: &xml[start..inner_start],
                inner: &xml[inner_start..],
                markup: &xml[start..],
            });
        }

        elements
    }

    /// First outermost element, if any.
    pub fn first<'a>(&self, xml: &'a str) -> Option<Element<'a>> {
        self.scan(xml).into_iter().next()
    }
}

/// Reads property elements such as `<w:vMerge w:val="restart"/>`.
#[derive(Debug, Clone)]
pub struct PropertyTag {
    name: String,
}

impl PropertyTag {
    /// Create a reader for a property element name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    /// Every matching start or empty tag, in document order.
    fn tags<'a>(&'a self, xml: &'a str) -> impl Iterator<Item = BytesStart<'a>> + 'a {
        let name = self.name.as_bytes();
        let mut reader = fragment_reader(xml);
        std::iter::from_fn(move || loop {
            match reader.read_event() {
                Ok(Event::Start(e) | Event::Empty(e)) if e.name().as_ref() == name => {
                    return Some(e)
                }
                Ok(Event::Eof) | Err(_) => return None,
                Ok(_) => {}
            }
        })
    }

    /// Whether the property occurs at all.
    pub fn is_present(&self, xml: &str) -> bool {
        self.tags(xml).next().is_some()
    }

    /// Number of matching tags.
    pub fn count(&self, xml: &str) -> usize {
        self.tags(xml).count()
    }

    /// An attribute of the first matching tag.
    pub fn attribute(&self, xml: &str, name: &str) -> Option<String> {
        self.tags(xml).next().and_then(|tag| attribute(&tag, name))
    }

    /// `w:val` of the first matching tag.
    pub fn value(&self, xml: &str) -> Option<String> {
        self.attribute(xml, "w:val")
    }

    /// Numeric `w:val` of the first matching tag.
    pub fn number(&self, xml: &str) -> Option<usize> {
        self.value(xml).and_then(|v| v.trim().parse().ok())
    }

    /// Whether an on/off property is present and switched on.
    pub fn is_on(&self, xml: &str) -> bool {
        match self.tags(xml).next() {
            Some(tag) => !matches!(
                attribute(&tag, "w:val").as_deref(),
                Some("0" | "false" | "off")
            ),
            None => false,
        }
    }
}

/// Extracts run text from paragraph markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextExtractor;

impl TextExtractor {
    /// Create a new extractor.
    pub fn new() -> Self {
        Self
    }

    /// Concatenated text of `<w:t>` nodes, with tabs and breaks.
    ///
    /// Tab stops declared in `<w:tabs>` are properties, not text.
    pub fn text(&self, xml: &str) -> String {
        let mut reader = fragment_reader(xml);
        let mut out = String::new();
        let mut in_text = 0usize;
        let mut in_tabs = 0usize;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"w:t" => in_text += 1,
                    b"w:tabs" => in_tabs += 1,
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"w:t" => in_text = in_text.saturating_sub(1),
                    b"w:tabs" => in_tabs = in_tabs.saturating_sub(1),
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"w:tab" if in_tabs == 0 => out.push('\t'),
                    b"w:br" | b"w:cr" => out.push('\n'),
                    _ => {}
                },
                Ok(Event::Text(t)) if in_text > 0 => match t.unescape() {
                    Ok(text) => out.push_str(&text),
                    Err(_) => out.push_str(&String::from_utf8_lossy(&t)),
                },
                Ok(Event::CData(c)) if in_text > 0 => out.push_str(&String::from_utf8_lossy(&c)),
                Ok(Event::Eof) => break,
                Err(e) => {
                    log::debug!("Stopped reading run text: {}", e);
                    break;
                }
                Ok(_) => {}
            }
        }
        out
    }
}

/// Unescaped value of an attribute on a start tag.
///
/// A value with a malformed entity reference is returned as written.
pub fn attribute(tag: &BytesStart<'_>, name: &str) -> Option<String> {
    tag.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name.as_bytes())
        .map(|a| match a.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&a.value).into_owned(),
        })
}
