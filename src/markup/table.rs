//! Table markup to merge-resolved grid.
//!
//! Parsing runs in two phases. The first reads every row and cell with its
//! merge markers; the second lays the cells out on a grid whose width is the
//! declared column count widened to the widest row, tracking one open
//! vertical span per column. Owner `rowspan` values are back-patched once
//! all rows are placed, and every merged region stays rectangular.

use super::xml::{ElementScanner, PropertyTag, TextExtractor};
use crate::model::{ImageRef, MediaContext, Table, TableCell, TableRow};

/// Widest span or skip accepted when the table declares no grid.
pub const MAX_UNDECLARED_SPAN: usize = 63;

/// Vertical merge marker of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalMerge {
    /// Not vertically merged
    None,
    /// Starts a new vertical span
    Restart,
    /// Continues the span open in this column
    Continue,
}

/// A cell as read from markup, before grid layout.
#[derive(Debug, Clone, PartialEq)]
pub struct CellMarkup {
    /// Cell text, paragraphs joined by newlines
    pub text: String,

    /// Horizontal span (at least 1)
    pub colspan: usize,

    /// Vertical merge marker
    pub vmerge: VerticalMerge,

    /// Images resolved through the media context
    pub images: Vec<ImageRef>,
}

/// A row as read from markup, before grid layout.
#[derive(Debug, Clone, PartialEq)]
pub struct RowMarkup {
    /// Cells in markup order
    pub cells: Vec<CellMarkup>,

    /// Grid columns skipped before the first cell
    pub grid_before: usize,

    /// Grid columns skipped after the last cell
    pub grid_after: usize,

    /// Whether this row is a header row
    pub is_header: bool,
}

impl RowMarkup {
    /// Grid columns the row occupies, skipped columns included.
    pub fn width(&self) -> usize {
        self.cells
            .iter()
            .fold(self.grid_before, |w, c| w.saturating_add(c.colspan))
            .saturating_add(self.grid_after)
    }

    /// Cap every span and skip at `limit` columns.
    fn clamp_spans(&mut self, limit: usize) -> bool {
        let mut clamped = false;
        for value in self
            .cells
            .iter_mut()
            .map(|c| &mut c.colspan)
            .chain([&mut self.grid_before, &mut self.grid_after])
        {
            if *value > limit {
                *value = limit;
                clamped = true;
            }
        }
        clamped
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenSpan {
    start_row: usize,
    end_row: usize,
    owner_col: usize,
    width: usize,
}

/// Parses table markup into a [`Table`].
#[derive(Debug, Clone)]
pub struct TableAssembler {
    tbl: ElementScanner,
    tbl_grid: ElementScanner,
    grid_col: PropertyTag,
    row: ElementScanner,
    row_props: ElementScanner,
    cell: ElementScanner,
    cell_props: ElementScanner,
    paragraph: ElementScanner,
    drawing: ElementScanner,
    blip: PropertyTag,
    grid_span: PropertyTag,
    vmerge: PropertyTag,
    grid_before: PropertyTag,
    grid_after: PropertyTag,
    tbl_header: PropertyTag,
    bold: PropertyTag,
    text: TextExtractor,
}

impl TableAssembler {
    /// Create a new assembler.
    pub fn new() -> Self {
        Self {
            tbl: ElementScanner::new("w:tbl"),
            tbl_grid: ElementScanner::new("w:tblGrid"),
            grid_col: PropertyTag::new("w:gridCol"),
            row: ElementScanner::new("w:tr"),
            row_props: ElementScanner::new("w:trPr"),
            cell: ElementScanner::new("w:tc"),
            cell_props: ElementScanner::new("w:tcPr"),
            paragraph: ElementScanner::new("w:p"),
            drawing: ElementScanner::new("w:drawing"),
            blip: PropertyTag::new("a:blip"),
            grid_span: PropertyTag::new("w:gridSpan"),
            vmerge: PropertyTag::new("w:vMerge"),
            grid_before: PropertyTag::new("w:gridBefore"),
            grid_after: PropertyTag::new("w:gridAfter"),
            tbl_header: PropertyTag::new("w:tblHeader"),
            bold: PropertyTag::new("w:b"),
            text: TextExtractor::new(),
        }
    }

    /// Parse a table without resolving images.
    pub fn parse_table(&self, markup: &str, position: usize) -> Table {
        self.parse_table_with(markup, position, &MediaContext::default())
    }

    /// Parse a table, resolving cell images through the media context.
    ///
    /// Never fails: empty markup yields an empty table, spans wider than the
    /// declared grid are clamped to it, and malformed merge markers degrade
    /// to unmerged cells.
    pub fn parse_table_with(&self, markup: &str, position: usize, media: &MediaContext) -> Table {
        let body = self.tbl_inner(markup).unwrap_or(markup);

        let declared = self
            .tbl_grid
            .first(body)
            .map(|grid| self.grid_col.count(grid.inner))
            .unwrap_or(0);
        let limit = if declared > 0 { declared } else { MAX_UNDECLARED_SPAN };

        let mut rows: Vec<RowMarkup> = self
            .row
            .scan(body)
            .iter()
            .enumerate()
            .map(|(i, row)| self.read_row(row.inner, i, media))
            .collect();

        for (i, row) in rows.iter_mut().enumerate() {
            if row.clamp_spans(limit) {
                log::warn!("Table {}: row {} spans more than {} columns", position, i, limit);
            }
        }

        let col_count = rows.iter().map(RowMarkup::width).fold(declared, usize::max);
        let table = layout(rows, col_count, position);
        log::debug!(
            "TableAssembler: table {} with {} rows x {} cols",
            position,
            table.row_count,
            table.col_count
        );
        table
    }

    fn tbl_inner<'a>(&self, markup: &'a str) -> Option<&'a str> {
        let trimmed = markup.trim_start();
        if trimmed.starts_with("<w:tbl>") || trimmed.starts_with("<w:tbl ") {
            self.tbl.first(trimmed).map(|t| t.inner)
        } else {
            None
        }
    }

    /// Read one row's cells and markers.
    pub fn read_row(&self, row: &str, index: usize, media: &MediaContext) -> RowMarkup {
        let props = self.row_props.first(row).map(|p| p.inner).unwrap_or("");
        let is_header =
            self.tbl_header.is_on(props) || (index == 0 && self.bold.is_on(row));

        let cells = self
            .cell
            .scan(row)
            .iter()
            .map(|cell| self.read_cell(cell.inner, media))
            .collect();

        RowMarkup {
            cells,
            grid_before: self.grid_before.number(props).unwrap_or(0),
            grid_after: self.grid_after.number(props).unwrap_or(0),
            is_header,
        }
    }

    /// Read one cell's text, images and merge markers.
    pub fn read_cell(&self, cell: &str, media: &MediaContext) -> CellMarkup {
        let props = self.cell_props.first(cell).map(|p| p.inner).unwrap_or("");

        let colspan = self.grid_span.number(props).unwrap_or(1).max(1);
        let vmerge = if !self.vmerge.is_present(props) {
            VerticalMerge::None
        } else if self.vmerge.value(props).as_deref() == Some("restart") {
            VerticalMerge::Restart
        } else {
            VerticalMerge::Continue
        };

        let text = self
            .paragraph
            .scan(cell)
            .iter()
            .map(|p| self.text.text(p.markup))
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        let images = self
            .drawing
            .scan(cell)
            .iter()
            .filter_map(|d| self.blip.attribute(d.markup, "r:embed"))
            .enumerate()
            .filter_map(|(i, rid)| media.resolve_image(&rid, i))
            .collect();

        CellMarkup {
            text,
            colspan,
            vmerge,
            images,
        }
    }
}

impl Default for TableAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Lay rows out on a grid of `col_count` columns.
fn layout(rows: Vec<RowMarkup>, col_count: usize, position: usize) -> Table {
    let mut table = Table::new(position);
    table.col_count = col_count;

    let mut spans: Vec<OpenSpan> = Vec::new();
    let mut open: Vec<Option<usize>> = vec![None; col_count];

    for (r, row) in rows.into_iter().enumerate() {
        let mut cells: Vec<TableCell> = Vec::with_capacity(col_count);
        let mut extended = vec![false; col_count];

        let deficit = col_count.saturating_sub(row.width());
        let leading = if row.grid_before > 0 {
            row.grid_before
        } else {
            open.iter()
                .take(deficit)
                .take_while(|s| s.is_some())
                .count()
        };

        fill_gap(&mut cells, r, leading, &open, &mut spans, &mut extended);

        for cell in row.cells {
            let col = cells.len();
            let width = cell.colspan.min(col_count.saturating_sub(col));
            if width == 0 {
                break;
            }
            let end = col + width;
            let mut start = col;

            if cell.vmerge == VerticalMerge::Continue {
                match open[col] {
                    Some(idx) => {
                        let covered = (col..end).take_while(|&c| open[c] == Some(idx)).count();
                        for c in col..col + covered {
                            cells.push(TableCell::placeholder(r, c));
                            extended[c] = true;
                        }
                        spans[idx].end_row = r + 1;
                        if covered == width {
                            continue;
                        }
                        log::warn!(
                            "Table {}: vertical merge at ({}, {}) is wider than the span it continues",
                            position,
                            r,
                            col
                        );
                        start = col + covered;
                    }
                    None => log::warn!(
                        "Table {}: vertical merge continues at ({}, {}) with no open span",
                        position,
                        r,
                        col
                    ),
                }
            }

            cells.push(
                TableCell::text(cell.text, r, start)
                    .colspan(end - start)
                    .with_images(cell.images),
            );
            for c in start + 1..end {
                cells.push(TableCell::placeholder(r, c));
            }

            if cell.vmerge == VerticalMerge::Restart {
                spans.push(OpenSpan {
                    start_row: r,
                    end_row: r + 1,
                    owner_col: start,
                    width: end - start,
                });
                let idx = spans.len() - 1;
                for c in start..end {
                    open[c] = Some(idx);
                    extended[c] = true;
                }
            } else {
                for slot in &mut open[start..end] {
                    *slot = None;
                }
            }
        }

        let trailing = col_count - cells.len();
        fill_gap(&mut cells, r, trailing, &open, &mut spans, &mut extended);
        close_partial_spans(&mut cells, r, &mut open, &mut spans, &extended, position);

        for (c, slot) in open.iter_mut().enumerate() {
            if !extended[c] {
                *slot = None;
            }
        }

        table.add_row(TableRow::new(r, cells).with_header(row.is_header));
    }

    for span in &spans {
        if let Some(owner) = table
            .rows
            .get_mut(span.start_row)
            .and_then(|row| row.cells.get_mut(span.owner_col))
        {
            owner.rowspan = span.end_row - span.start_row;
        }
    }

    table
}

/// Append `count` gap cells: placeholders where a span is open, empty cells
/// elsewhere.
fn fill_gap(
    cells: &mut Vec<TableCell>,
    row: usize,
    count: usize,
    open: &[Option<usize>],
    spans: &mut [OpenSpan],
    extended: &mut [bool],
) {
    for _ in 0..count {
        let col = cells.len();
        match open[col] {
            Some(idx) => {
                spans[idx].end_row = row + 1;
                extended[col] = true;
                cells.push(TableCell::placeholder(row, col));
            }
            None => cells.push(TableCell::empty(row, col)),
        }
    }
}

/// End, at the previous row, any span this row extended over only some of
/// its columns. Its placeholders in this row become empty cells.
fn close_partial_spans(
    cells: &mut [TableCell],
    row: usize,
    open: &mut [Option<usize>],
    spans: &mut [OpenSpan],
    extended: &[bool],
    position: usize,
) {
    for (idx, span) in spans.iter_mut().enumerate() {
        if span.start_row == row || span.end_row != row + 1 {
            continue;
        }
        let cols = span.owner_col..span.owner_col + span.width;
        if cols.clone().all(|c| open[c] == Some(idx) && extended[c]) {
            continue;
        }

        log::warn!(
            "Table {}: row {} continues only part of the span at ({}, {})",
            position,
            row,
            span.start_row,
            span.owner_col
        );
        span.end_row = row;
        for c in cols {
            if open[c] == Some(idx) {
                if extended[c] {
                    cells[c] = TableCell::empty(row, c);
                }
                open[c] = None;
            }
        }
    }
}
