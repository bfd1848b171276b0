//! HTML tables and Markdown content.

use crate::model::{BlockContent, ContentBlock, Table, TableCell, TableRow};

/// Render a table as HTML.
///
/// Merge placeholders are skipped, so each owner cell's `rowspan` and
/// `colspan` cover them. Header rows go into `<thead>`.
pub fn table_to_html(table: &Table) -> String {
    let mut output = String::new();
    render_table(&mut output, table);
    output
}

/// Render content blocks as Markdown, tables as inline HTML.
pub fn blocks_to_markdown(blocks: &[ContentBlock]) -> String {
    let mut output = String::new();

    for block in blocks {
        match &block.content {
            BlockContent::Paragraph { text } => {
                output.push_str(&escape_markdown(text));
                output.push_str("\n\n");
            }
            BlockContent::Table(table) => {
                if !table.is_empty() {
                    render_table(&mut output, table);
                    output.push('\n');
                }
            }
            BlockContent::Image(image) => {
                output.push_str(&format!("![]({})\n\n", image.target));
            }
        }
    }

    output.trim_end().to_string()
}

fn render_table(output: &mut String, table: &Table) {
    output.push_str("<table>\n");

    if table.header().next().is_some() {
        output.push_str("<thead>\n");
        for row in table.header() {
            render_row(output, row, true);
        }
        output.push_str("</thead>\n");
    }

    output.push_str("<tbody>\n");
    for row in table.body() {
        render_row(output, row, false);
    }
    output.push_str("</tbody>\n");

    output.push_str("</table>\n");
}

fn render_row(output: &mut String, row: &TableRow, is_header: bool) {
    let tag = if is_header { "th" } else { "td" };
    output.push_str("<tr>");

    for cell in row.owners() {
        let mut attrs = String::new();
        if cell.rowspan > 1 {
            attrs.push_str(&format!(" rowspan=\"{}\"", cell.rowspan));
        }
        if cell.colspan > 1 {
            attrs.push_str(&format!(" colspan=\"{}\"", cell.colspan));
        }

        output.push_str(&format!("<{}{}>", tag, attrs));
        render_cell(output, cell);
        output.push_str(&format!("</{}>", tag));
    }

    output.push_str("</tr>\n");
}

fn render_cell(output: &mut String, cell: &TableCell) {
    let lines: Vec<String> = cell.text.lines().map(escape_html).collect();
    output.push_str(&lines.join("<br>"));

    for image in &cell.images {
        output.push_str(&format!("<img src=\"{}\">", escape_html(&image.target)));
    }
}

/// Escape text for HTML element content and attribute values.
fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape characters that would change Markdown inline formatting.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '|' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}
