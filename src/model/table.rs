//! Table types.

use super::ImageRef;
use serde::{Deserialize, Serialize};

/// A table structure with a complete cell grid.
///
/// Every row holds exactly `col_count` cells. Each merged rectangle has a
/// single owner cell carrying `rowspan`/`colspan`; the other positions it
/// covers are placeholders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Ordinal of the table in its document
    pub position: usize,

    /// Number of rows
    pub row_count: usize,

    /// Number of grid columns
    pub col_count: usize,

    /// Rows in the table
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Create a new empty table.
    pub fn new(position: usize) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
        self.row_count = self.rows.len();
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at a grid position, placeholders included.
    pub fn cell(&self, row: usize, col: usize) -> Option<&TableCell> {
        self.rows.get(row).and_then(|r| r.cells.get(col))
    }

    /// Header rows.
    pub fn header(&self) -> impl Iterator<Item = &TableRow> {
        self.rows.iter().filter(|r| r.is_header)
    }

    /// Body rows (non-header).
    pub fn body(&self) -> impl Iterator<Item = &TableRow> {
        self.rows.iter().filter(|r| !r.is_header)
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check if the table has merged cells.
    pub fn has_merged_cells(&self) -> bool {
        self.rows
            .iter()
            .flat_map(|r| &r.cells)
            .any(|c| c.is_merged())
    }

    /// Images attached to any cell.
    pub fn images(&self) -> impl Iterator<Item = &ImageRef> {
        self.rows
            .iter()
            .flat_map(|r| &r.cells)
            .flat_map(|c| &c.images)
    }
}

/// A table row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Zero-based row index
    pub index: usize,

    /// Cells in the row, one per grid column
    pub cells: Vec<TableCell>,

    /// Whether this is a header row
    pub is_header: bool,
}

impl TableRow {
    /// Create a new row with cells.
    pub fn new(index: usize, cells: Vec<TableCell>) -> Self {
        Self {
            index,
            cells,
            is_header: false,
        }
    }

    /// Mark the row as a header row.
    pub fn with_header(mut self, is_header: bool) -> Self {
        self.is_header = is_header;
        self
    }

    /// Cells that own their content (placeholders skipped).
    pub fn owners(&self) -> impl Iterator<Item = &TableCell> {
        self.cells.iter().filter(|c| !c.is_merged_placeholder)
    }

    /// Get plain text representation.
    pub fn plain_text(&self) -> String {
        self.owners()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\t")
    }
}

/// A table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    /// Cell text, paragraphs separated by newlines
    pub text: String,

    /// Row position in the grid
    pub row_index: usize,

    /// Column position in the grid
    pub col_index: usize,

    /// Number of rows this cell spans
    pub rowspan: usize,

    /// Number of columns this cell spans
    pub colspan: usize,

    /// Whether this position is covered by another cell's span
    pub is_merged_placeholder: bool,

    /// Images embedded in the cell
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageRef>,
}

impl TableCell {
    /// Create a new 1×1 cell with text content.
    pub fn text(text: impl Into<String>, row_index: usize, col_index: usize) -> Self {
        Self {
            text: text.into(),
            row_index,
            col_index,
            rowspan: 1,
            colspan: 1,
            is_merged_placeholder: false,
            images: Vec::new(),
        }
    }

    /// Create an empty 1×1 cell.
    pub fn empty(row_index: usize, col_index: usize) -> Self {
        Self::text(String::new(), row_index, col_index)
    }

    /// Create a placeholder for a position covered by a merge.
    pub fn placeholder(row_index: usize, col_index: usize) -> Self {
        Self {
            is_merged_placeholder: true,
            ..Self::empty(row_index, col_index)
        }
    }

    /// Set colspan and return self.
    pub fn colspan(mut self, span: usize) -> Self {
        self.colspan = span.max(1);
        self
    }

    /// Set rowspan and return self.
    pub fn rowspan(mut self, span: usize) -> Self {
        self.rowspan = span.max(1);
        self
    }

    /// Attach images and return self.
    pub fn with_images(mut self, images: Vec<ImageRef>) -> Self {
        self.images = images;
        self
    }

    /// Check if the cell is empty.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.images.is_empty()
    }

    /// Check if this cell spans multiple rows or columns.
    pub fn is_merged(&self) -> bool {
        self.rowspan > 1 || self.colspan > 1
    }
}
