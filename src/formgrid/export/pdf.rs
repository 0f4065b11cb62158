//! Paginated PDF table with a striped theme.
//!
//! A filled header band on every page, alternating shaded body rows, Helvetica text.
//! Column widths are shared evenly unless a [`ColumnStyle`] (keyed by column index)
//! fixes them. Rows flow onto new pages as needed.

use crate::error::Result;
use crate::table::{cell_text, Column, Row};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 40.0;
const ROW_HEIGHT: f32 = 18.0;
const FONT_SIZE: f32 = 9.0;
const CELL_PADDING: f32 = 4.0;
/// Rough Helvetica advance per character, as a fraction of the font size.
const CHAR_WIDTH: f32 = 0.5;

const HEADER_FILL: (f32, f32, f32) = (0.16, 0.50, 0.73);
const STRIPE_FILL: (f32, f32, f32) = (0.96, 0.96, 0.96);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Per-column overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnStyle {
    /// Width in points.
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub align: Align,
    #[serde(default)]
    pub bold: bool,
}

pub fn to_pdf(
    columns: &[Column],
    rows: &[Row],
    styles: &BTreeMap<usize, ColumnStyle>,
) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let widths = column_widths(columns, styles);
    let per_page = rows_per_page();
    let mut kids: Vec<Object> = Vec::new();

    let mut chunks: Vec<&[Row]> = rows.chunks(per_page).collect();
    if chunks.is_empty() {
        chunks.push(&[]);
    }
    for chunk in chunks {
        let content = Content {
            operations: page_operations(columns, chunk, &widths, styles),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = add_page(&mut doc, pages_id, content_id);
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out)?;
    Ok(out)
}

fn add_page(doc: &mut Document, pages_id: ObjectId, content_id: ObjectId) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    })
}

fn rows_per_page() -> usize {
    let usable = PAGE_HEIGHT - 2.0 * MARGIN - ROW_HEIGHT;
    ((usable / ROW_HEIGHT).floor() as usize).max(1)
}

fn column_widths(columns: &[Column], styles: &BTreeMap<usize, ColumnStyle>) -> Vec<f32> {
    let usable = PAGE_WIDTH - 2.0 * MARGIN;
    let fixed: f32 = (0..columns.len())
        .filter_map(|i| styles.get(&i).and_then(|s| s.width))
        .sum();
    let flexible = (0..columns.len())
        .filter(|i| styles.get(i).and_then(|s| s.width).is_none())
        .count();
    let share = if flexible == 0 {
        0.0
    } else {
        ((usable - fixed) / flexible as f32).max(CELL_PADDING * 4.0)
    };
    (0..columns.len())
        .map(|i| styles.get(&i).and_then(|s| s.width).unwrap_or(share))
        .collect()
}

fn page_operations(
    columns: &[Column],
    rows: &[Row],
    widths: &[f32],
    styles: &BTreeMap<usize, ColumnStyle>,
) -> Vec<Operation> {
    let table_width: f32 = widths.iter().sum();
    let mut ops = Vec::new();
    let mut top = PAGE_HEIGHT - MARGIN;

    fill_rect(&mut ops, HEADER_FILL, MARGIN, top - ROW_HEIGHT, table_width);
    set_fill(&mut ops, (1.0, 1.0, 1.0));
    let mut x = MARGIN;
    for (i, column) in columns.iter().enumerate() {
        let align = styles.get(&i).map(|s| s.align).unwrap_or_default();
        cell_text_ops(&mut ops, &column.header, x, top, widths[i], align, true);
        x += widths[i];
    }
    top -= ROW_HEIGHT;

    for (r, row) in rows.iter().enumerate() {
        if r % 2 == 1 {
            fill_rect(&mut ops, STRIPE_FILL, MARGIN, top - ROW_HEIGHT, table_width);
        }
        set_fill(&mut ops, (0.0, 0.0, 0.0));
        let mut x = MARGIN;
        for (i, column) in columns.iter().enumerate() {
            let style = styles.get(&i).cloned().unwrap_or_default();
            let text = cell_text(row.get(&column.key));
            cell_text_ops(&mut ops, &text, x, top, widths[i], style.align, style.bold);
            x += widths[i];
        }
        top -= ROW_HEIGHT;
    }
    ops
}

fn set_fill(ops: &mut Vec<Operation>, (r, g, b): (f32, f32, f32)) {
    ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
}

fn fill_rect(ops: &mut Vec<Operation>, color: (f32, f32, f32), x: f32, y: f32, width: f32) {
    set_fill(ops, color);
    ops.push(Operation::new(
        "re",
        vec![x.into(), y.into(), width.into(), ROW_HEIGHT.into()],
    ));
    ops.push(Operation::new("f", vec![]));
}

fn cell_text_ops(
    ops: &mut Vec<Operation>,
    text: &str,
    x: f32,
    top: f32,
    width: f32,
    align: Align,
    bold: bool,
) {
    let room = width - 2.0 * CELL_PADDING;
    let fitted = fit_text(text, room);
    let text_width = fitted.chars().count() as f32 * FONT_SIZE * CHAR_WIDTH;
    let offset = match align {
        Align::Left => CELL_PADDING,
        Align::Center => (width - text_width) / 2.0,
        Align::Right => width - CELL_PADDING - text_width,
    };
    let baseline = top - ROW_HEIGHT + (ROW_HEIGHT - FONT_SIZE) / 2.0 + 2.0;
    let font = if bold { "F2" } else { "F1" };

    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![font.into(), FONT_SIZE.into()]));
    ops.push(Operation::new(
        "Td",
        vec![(x + offset.max(0.0)).into(), baseline.into()],
    ));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(win_ansi_bytes(&fitted), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
}

/// Encodes text for the WinAnsi fonts. Characters outside the code page become `?`.
fn win_ansi_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8a,
            '‹' => 0x8b,
            'Œ' => 0x8c,
            'Ž' => 0x8e,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9a,
            '›' => 0x9b,
            'œ' => 0x9c,
            'ž' => 0x9e,
            'Ÿ' => 0x9f,
            _ => b'?',
        })
        .collect()
}

/// Truncates `text` with an ellipsis marker so it fits `room` points.
fn fit_text(text: &str, room: f32) -> String {
    let max_chars = (room / (FONT_SIZE * CHAR_WIDTH)).floor().max(0.0) as usize;
    let single_line: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if single_line.chars().count() <= max_chars {
        return single_line;
    }
    if max_chars < 3 {
        return single_line.chars().take(max_chars).collect();
    }
    let mut fitted: String = single_line.chars().take(max_chars - 3).collect();
    fitted.push_str("...");
    fitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(n: usize) -> Vec<Row> {
        (0..n)
            .map(|i| serde_json::from_value(json!({"id": i, "name": format!("row {}", i)})).unwrap())
            .collect()
    }

    #[test]
    fn produces_a_loadable_document() {
        let data = rows(3);
        let bytes = to_pdf(&Column::from_rows(&data), &data, &BTreeMap::new()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn rows_flow_onto_new_pages() {
        let per_page = rows_per_page();
        let data = rows(per_page * 2 + 1);
        let bytes = to_pdf(&Column::from_rows(&data), &data, &BTreeMap::new()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn empty_table_still_has_a_page() {
        let columns = vec![Column::new("a", "A")];
        let bytes = to_pdf(&columns, &[], &BTreeMap::new()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn fixed_widths_take_priority() {
        let columns = vec![Column::new("a", "A"), Column::new("b", "B"), Column::new("c", "C")];
        let mut styles = BTreeMap::new();
        styles.insert(
            1,
            ColumnStyle {
                width: Some(115.0),
                ..Default::default()
            },
        );
        let widths = column_widths(&columns, &styles);
        assert_eq!(widths[1], 115.0);
        assert_eq!(widths[0], widths[2]);
        let total: f32 = widths.iter().sum();
        assert!((total - (PAGE_WIDTH - 2.0 * MARGIN)).abs() < 0.01);
    }

    #[test]
    fn long_text_is_truncated() {
        let fitted = fit_text(&"x".repeat(100), 45.0);
        assert_eq!(fitted, "xxxxxxx...");
        assert_eq!(fit_text("short", 200.0), "short");
        assert_eq!(fit_text("line\nbreak", 200.0), "line break");
    }

    #[test]
    fn text_is_encoded_for_win_ansi_fonts() {
        assert_eq!(win_ansi_bytes("Abc 1"), b"Abc 1".to_vec());
        assert_eq!(win_ansi_bytes("Café"), vec![b'C', b'a', b'f', 0xe9]);
        assert_eq!(win_ansi_bytes("€5 – ok"), vec![0x80, b'5', b' ', 0x96, b' ', b'o', b'k']);
        assert_eq!(win_ansi_bytes("日本"), b"??".to_vec());
    }

    #[test]
    fn fonts_declare_their_encoding() {
        let data: Vec<Row> = vec![serde_json::from_value(json!({"name": "Zoë"})).unwrap()];
        let bytes = to_pdf(&Column::from_rows(&data), &data, &BTreeMap::new()).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let encodings = doc
            .objects
            .values()
            .filter_map(|o| o.as_dict().ok())
            .filter(|d| d.get(b"Type").and_then(|t| t.as_name()).ok() == Some(b"Font".as_slice()))
            .filter_map(|d| d.get(b"Encoding").and_then(|e| e.as_name()).ok())
            .filter(|name| *name == b"WinAnsiEncoding".as_slice())
            .count();
        assert_eq!(encodings, 2);
    }

    #[test]
    fn style_deserializes_from_json() {
        let style: ColumnStyle =
            serde_json::from_str(r#"{"width": 80, "align": "right", "bold": true}"#).unwrap();
        assert_eq!(style.width, Some(80.0));
        assert_eq!(style.align, Align::Right);
        assert!(style.bold);
    }
}
