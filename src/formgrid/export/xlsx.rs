//! Single-sheet OOXML workbook.
//!
//! The header row lists every key in order of first appearance across the rows.
//! Numbers become numeric cells, booleans boolean cells, everything else inline
//! strings. Missing and null cells are left out.

use crate::error::Result;
use crate::sequence::Alphabet;
use crate::table::{cell_text, Row};
use serde_json::Value;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const MAX_SHEET_NAME: usize = 31;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

pub fn to_xlsx(rows: &[Row], sheet_name: &str) -> Result<Vec<u8>> {
    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", ROOT_RELS.to_string()),
        ("xl/workbook.xml", workbook_xml(sheet_name)),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
        ("xl/worksheets/sheet1.xml", sheet_xml(rows)),
    ];

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, body) in parts {
        zip.start_file(name, options)?;
        zip.write_all(body.as_bytes())?;
    }
    Ok(zip.finish()?.into_inner())
}

fn workbook_xml(sheet_name: &str) -> String {
    let name: String = sheet_name.chars().take(MAX_SHEET_NAME).collect();
    let name = if name.trim().is_empty() {
        "Sheet1".to_string()
    } else {
        name
    };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        escape_xml(&name)
    )
}

fn sheet_xml(rows: &[Row]) -> String {
    let letters = Alphabet::new("ABCDEFGHIJKLMNOPQRSTUVWXYZ").unwrap_or_default();
    let mut keys: Vec<&str> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !keys.contains(&key.as_str()) {
                keys.push(key);
            }
        }
    }

    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );

    if !keys.is_empty() {
        xml.push_str(r#"<row r="1">"#);
        for (col, key) in keys.iter().enumerate() {
            let cell_ref = format!("{}1", letters.encode(col));
            xml.push_str(&inline_string_cell(&cell_ref, key));
        }
        xml.push_str("</row>");
    }

    for (i, row) in rows.iter().enumerate() {
        let line = i + 2;
        xml.push_str(&format!(r#"<row r="{}">"#, line));
        for (col, key) in keys.iter().enumerate() {
            let cell_ref = format!("{}{}", letters.encode(col), line);
            match row.get(*key) {
                None | Some(Value::Null) => {}
                Some(Value::Number(n)) => {
                    xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, cell_ref, n));
                }
                Some(Value::Bool(b)) => {
                    xml.push_str(&format!(
                        r#"<c r="{}" t="b"><v>{}</v></c>"#,
                        cell_ref,
                        u8::from(*b)
                    ));
                }
                Some(other) => {
                    xml.push_str(&inline_string_cell(&cell_ref, &cell_text(Some(other))));
                }
            }
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn inline_string_cell(cell_ref: &str, text: &str) -> String {
    format!(
        r#"<c r="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
        cell_ref,
        escape_xml(text)
    )
}

pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
