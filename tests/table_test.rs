//! Integration tests for merged table assembly.

use unexam::markup::TableAssembler;
use unexam::model::{MediaContext, Relationship, RelationshipKind, Table};
use unexam::parse_table;

fn tc(text: &str, props: &str) -> String {
    format!("<w:tc><w:tcPr>{props}</w:tcPr><w:p><w:r><w:t>{text}</w:t></w:r></w:p></w:tc>")
}

fn tr(row_props: &str, cells: &[String]) -> String {
    format!("<w:tr><w:trPr>{row_props}</w:trPr>{}</w:tr>", cells.concat())
}

fn tbl(grid: usize, rows: &[String]) -> String {
    format!(
        "<w:tbl><w:tblPr/><w:tblGrid>{}</w:tblGrid>{}</w:tbl>",
        "<w:gridCol w:w=\"2000\"/>".repeat(grid),
        rows.concat()
    )
}

const RESTART: &str = r#"<w:vMerge w:val="restart"/>"#;
const CONTINUE: &str = "<w:vMerge/>";

fn span(n: usize) -> String {
    format!(r#"<w:gridSpan w:val="{n}"/>"#)
}

/// Every position must be covered by exactly one owner, and covered
/// positions other than the owner's own must be placeholders.
fn assert_single_ownership(table: &Table) {
    let mut cover = vec![vec![0usize; table.col_count]; table.row_count];
    for row in &table.rows {
        assert_eq!(row.cells.len(), table.col_count, "row {} width", row.index);
        for (c, cell) in row.cells.iter().enumerate() {
            assert_eq!(cell.col_index, c);
            assert_eq!(cell.row_index, row.index);
            if cell.is_merged_placeholder {
                assert_eq!((cell.rowspan, cell.colspan), (1, 1));
                continue;
            }
            for r in row.index..row.index + cell.rowspan {
                for cc in c..c + cell.colspan {
                    cover[r][cc] += 1;
                    if (r, cc) != (row.index, c) {
                        assert!(table.cell(r, cc).unwrap().is_merged_placeholder);
                    }
                }
            }
        }
    }
    assert!(cover.iter().flatten().all(|&n| n == 1), "coverage {:?}", cover);
}

#[test]
fn test_two_by_two_vertical_merge() {
    let markup = tbl(
        2,
        &[
            tr("", &[tc("A", RESTART), tc("B", "")]),
            tr("", &[tc("", CONTINUE), tc("D", "")]),
        ],
    );
    let table = parse_table(&markup, 0);

    assert_eq!(table.row_count, 2);
    assert_eq!(table.col_count, 2);
    let a = table.cell(0, 0).unwrap();
    assert_eq!((a.text.as_str(), a.rowspan, a.colspan), ("A", 2, 1));
    assert!(table.cell(1, 0).unwrap().is_merged_placeholder);
    assert_eq!(table.cell(0, 1).unwrap().text, "B");
    assert_eq!(table.cell(1, 1).unwrap().text, "D");
    assert_single_ownership(&table);
}

#[test]
fn test_block_merge() {
    let markup = tbl(
        3,
        &[
            tr("", &[tc("A", &(span(2) + RESTART)), tc("B", "")]),
            tr("", &[tc("", &(span(2) + CONTINUE)), tc("C", "")]),
            tr("", &[tc("D", ""), tc("E", ""), tc("F", "")]),
        ],
    );
    let table = parse_table(&markup, 3);

    assert_eq!(table.position, 3);
    let a = table.cell(0, 0).unwrap();
    assert_eq!((a.rowspan, a.colspan), (2, 2));
    assert_eq!(table.cell(1, 2).unwrap().text, "C");
    assert_eq!(table.cell(2, 0).unwrap().text, "D");
    assert!(table.has_merged_cells());
    assert_single_ownership(&table);
}

#[test]
fn test_three_row_span_and_restart_after_span() {
    let markup = tbl(
        2,
        &[
            tr("", &[tc("A", RESTART), tc("1", "")]),
            tr("", &[tc("", CONTINUE), tc("2", "")]),
            tr("", &[tc("", CONTINUE), tc("3", "")]),
            tr("", &[tc("B", RESTART), tc("4", "")]),
            tr("", &[tc("", CONTINUE), tc("5", "")]),
        ],
    );
    let table = parse_table(&markup, 0);

    assert_eq!(table.cell(0, 0).unwrap().rowspan, 3);
    assert_eq!(table.cell(3, 0).unwrap().rowspan, 2);
    assert_eq!(table.cell(3, 0).unwrap().text, "B");
    assert_single_ownership(&table);
}

#[test]
fn test_grid_before_and_after() {
    let markup = tbl(
        3,
        &[
            tr("", &[tc("a", ""), tc("b", ""), tc("c", "")]),
            tr(r#"<w:gridBefore w:val="1"/>"#, &[tc("y", ""), tc("z", "")]),
            tr(r#"<w:gridAfter w:val="2"/>"#, &[tc("x", "")]),
        ],
    );
    let table = parse_table(&markup, 0);

    assert!(table.cell(1, 0).unwrap().is_empty());
    assert_eq!(table.cell(1, 1).unwrap().text, "y");
    assert_eq!(table.cell(2, 0).unwrap().text, "x");
    assert!(table.cell(2, 2).unwrap().is_empty());
    assert_single_ownership(&table);
}

#[test]
fn test_missing_cells_under_open_span() {
    // The second row omits the continued cell entirely.
    let markup = tbl(
        3,
        &[
            tr("", &[tc("A", RESTART), tc("B", ""), tc("C", "")]),
            tr("", &[tc("E", ""), tc("F", "")]),
        ],
    );
    let table = parse_table(&markup, 0);

    assert!(table.cell(1, 0).unwrap().is_merged_placeholder);
    assert_eq!(table.cell(1, 1).unwrap().text, "E");
    assert_eq!(table.cell(0, 0).unwrap().rowspan, 2);
    assert_single_ownership(&table);
}

#[test]
fn test_row_wider_than_grid() {
    let markup = tbl(2, &[tr("", &[tc("a", ""), tc("b", ""), tc("c", "")])]);
    let table = parse_table(&markup, 0);

    assert_eq!(table.col_count, 3);
    assert_single_ownership(&table);
}

#[test]
fn test_malformed_continue_degrades() {
    let markup = tbl(
        2,
        &[
            tr("", &[tc("A", ""), tc("B", CONTINUE)]),
            tr("", &[tc("C", ""), tc("D", "")]),
        ],
    );
    let table = parse_table(&markup, 0);

    let b = table.cell(0, 1).unwrap();
    assert!(!b.is_merged_placeholder);
    assert_eq!((b.text.as_str(), b.rowspan), ("B", 1));
    assert_single_ownership(&table);
}

#[test]
fn test_header_rows() {
    let markup = tbl(
        1,
        &[
            tr("<w:tblHeader/>", &[tc("head", "")]),
            tr(r#"<w:tblHeader w:val="0"/>"#, &[tc("body", "")]),
        ],
    );
    let table = parse_table(&markup, 0);

    assert_eq!(table.header().count(), 1);
    assert_eq!(table.body().count(), 1);
}

#[test]
fn test_cell_images() {
    let media = MediaContext::new()
        .with_relationships([Relationship::new("rId4", "media/image1.png", RelationshipKind::Image)])
        .with_media("word/media/image1.png", vec![0x89, 0x50, 0x4E, 0x47]);
    let cell = r#"<w:tc><w:p><w:r><w:drawing><a:blip r:embed="rId4"/></w:drawing></w:r></w:p></w:tc>"#;
    let markup = tbl(1, &[format!("<w:tr>{cell}</w:tr>")]);

    let table = TableAssembler::new().parse_table_with(&markup, 0, &media);
    let images: Vec<_> = table.images().collect();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].target, "word/media/image1.png");
    assert_eq!(images[0].mime_type, "image/png");

    let without_media = parse_table(&markup, 0);
    assert_eq!(without_media.images().count(), 0);
}

#[test]
fn test_entities_and_breaks_in_cells() {
    let cell = "<w:tc><w:p><w:r><w:t>a &lt; b</w:t><w:br/><w:t>c</w:t></w:r></w:p></w:tc>";
    let table = parse_table(&tbl(1, &[format!("<w:tr>{cell}</w:tr>")]), 0);
    assert_eq!(table.cell(0, 0).unwrap().text, "a < b\nc");
}

#[test]
fn test_continue_wider_than_open_span() {
    let markup = tbl(
        2,
        &[
            tr("", &[tc("A", RESTART), tc("B", "")]),
            tr("", &[tc("C", &(span(2) + CONTINUE))]),
        ],
    );
    let table = parse_table(&markup, 0);

    assert_eq!(table.cell(0, 0).unwrap().rowspan, 2);
    assert!(table.cell(1, 0).unwrap().is_merged_placeholder);
    let c = table.cell(1, 1).unwrap();
    assert!(!c.is_merged_placeholder);
    assert_eq!((c.text.as_str(), c.rowspan, c.colspan), ("C", 1, 1));
    assert_single_ownership(&table);
}

#[test]
fn test_continue_narrower_than_open_span() {
    let markup = tbl(
        3,
        &[
            tr("", &[tc("A", &(span(2) + RESTART)), tc("B", "")]),
            tr("", &[tc("", CONTINUE), tc("X", ""), tc("Y", "")]),
        ],
    );
    let table = parse_table(&markup, 0);

    let a = table.cell(0, 0).unwrap();
    assert_eq!((a.rowspan, a.colspan), (1, 2));
    assert!(!table.cell(1, 0).unwrap().is_merged_placeholder);
    assert_eq!(table.cell(1, 1).unwrap().text, "X");
    assert_single_ownership(&table);
}

#[test]
fn test_overflowing_grid_span_is_clamped() {
    let markup = tbl(
        1,
        &[tr("", &[tc("X", &span(usize::MAX)), tc("Y", "")])],
    );
    let table = parse_table(&markup, 0);

    assert_eq!(table.col_count, 2);
    assert_eq!(table.cell(0, 0).unwrap().colspan, 1);
    assert_eq!(table.cell(0, 1).unwrap().text, "Y");
    assert_single_ownership(&table);
}

#[test]
fn test_huge_span_without_grid_is_bounded() {
    let markup = format!(
        "<w:tbl>{}</w:tbl>",
        tr(r#"<w:gridBefore w:val="99999999"/>"#, &[tc("X", &span(100_000_000))])
    );
    let table = parse_table(&markup, 0);

    assert_eq!(table.col_count, 2 * unexam::markup::MAX_UNDECLARED_SPAN);
    assert_eq!(table.cell(0, 63).unwrap().text, "X");
    assert_single_ownership(&table);
}
