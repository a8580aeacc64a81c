//! Shared fixtures for integration tests.
//!
//! Everything is built in memory so the tests need no files on disk. Only
//! the PDF tests need the pdfium shared library; they print `SKIP` when it
//! cannot be bound.

#![allow(dead_code)]

use edgequake_report::pipeline::render::bind_pdfium;
use edgequake_report::ReportConfig;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;

// ── pdfium gate ─────────────────────────────────────────────────────────────

/// `true` when a pdfium library can be bound with the default config.
pub fn pdfium_available() -> bool {
    match bind_pdfium(&ReportConfig::default()) {
        Ok(_) => true,
        Err(e) => {
            println!("SKIP — pdfium unavailable: {e}");
            false
        }
    }
}

// ── PDF fixtures ────────────────────────────────────────────────────────────

/// A valid PDF with `pages` US-Letter pages. Page `n` carries a filled
/// square whose size depends on `n`, so every page rasterises differently.
pub fn pdf_with_pages(pages: usize) -> Vec<u8> {
    build_pdf(pages, None)
}

/// A PDF with a standard-security `/Encrypt` dictionary whose user password
/// is not empty, so it cannot be opened without one.
pub fn encrypted_pdf() -> Vec<u8> {
    let o = "<".to_string() + &"4F".repeat(32) + ">";
    let u = "<".to_string() + &"A5".repeat(32) + ">";
    build_pdf(
        1,
        Some(format!(
            "<< /Filter /Standard /V 1 /R 2 /Length 40 /P -44 /O {o} /U {u} >>"
        )),
    )
}

fn build_pdf(pages: usize, encrypt: Option<String>) -> Vec<u8> {
    let mut objects: Vec<String> = Vec::new();
    // 1: catalog, 2: page tree, then (page, content) pairs, then optional encrypt.
    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    let kids: Vec<String> = (0..pages).map(|i| format!("{} 0 R", 3 + 2 * i)).collect();
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        pages
    ));
    for i in 0..pages {
        let content_id = 4 + 2 * i;
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents {content_id} 0 R >>"
        ));
        let side = 100 + 60 * i;
        let stream = format!("0 0 0 rg 72 {} {side} {side} re f", 600 - side);
        objects.push(format!(
            "<< /Length {} >>\nstream\n{stream}\nendstream",
            stream.len()
        ));
    }
    let encrypt_id = encrypt.map(|dict| {
        objects.push(dict);
        objects.len()
    });

    let mut out = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }

    let xref_at = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for off in offsets {
        out.extend_from_slice(format!("{off:010} 00000 n \n").as_bytes());
    }
    let extra = match encrypt_id {
        Some(id) => format!(
            " /Encrypt {id} 0 R /ID [<0123456789ABCDEF0123456789ABCDEF> <0123456789ABCDEF0123456789ABCDEF>]"
        ),
        None => String::new(),
    };
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R{extra} >>\nstartxref\n{xref_at}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    out
}

// ── Spreadsheet fixture ─────────────────────────────────────────────────────

/// Minimal `.xlsx` whose first sheet has an `x`/`y` header and `rows` below it.
pub fn xlsx_with_rows(rows: &[(f64, f64)]) -> Vec<u8> {
    let mut sheet = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>x</t></is></c><c r="B1" t="inlineStr"><is><t>y</t></is></c></row>"#,
    );
    for (i, (x, y)) in rows.iter().enumerate() {
        let r = i + 2;
        sheet.push_str(&format!(
            r#"<row r="{r}"><c r="A{r}"><v>{x}</v></c><c r="B{r}"><v>{y}</v></c></row>"#
        ));
    }
    sheet.push_str("</sheetData></worksheet>");

    let parts = [
        ("[Content_Types].xml", r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#.to_string()),
        ("_rels/.rels", r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#.to_string()),
        ("xl/workbook.xml", r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Data" sheetId="1" r:id="rId1"/></sheets></workbook>"#.to_string()),
        ("xl/_rels/workbook.xml.rels", r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#.to_string()),
        ("xl/worksheets/sheet1.xml", sheet),
    ];

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in parts {
        zip.start_file(name, SimpleFileOptions::default()).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

// ── .docx inspection ────────────────────────────────────────────────────────

pub fn docx_part(docx: &[u8], name: &str) -> Vec<u8> {
    let mut archive = zip::ZipArchive::new(Cursor::new(docx)).expect("docx is a zip");
    let mut file = archive
        .by_name(name)
        .unwrap_or_else(|_| panic!("{name} missing from docx"));
    let mut buf = Vec::new();
    file.read_to_end(&mut buf).unwrap();
    buf
}

pub fn document_xml(docx: &[u8]) -> String {
    String::from_utf8(docx_part(docx, "word/document.xml")).unwrap()
}

/// Names of the `word/media/*` parts, sorted.
pub fn media_names(docx: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(docx)).expect("docx is a zip");
    let mut names: Vec<String> = archive
        .file_names()
        .filter(|n| n.starts_with("word/media/"))
        .map(str::to_owned)
        .collect();
    names.sort();
    names
}

// ── Multipart ───────────────────────────────────────────────────────────────

pub const BOUNDARY: &str = "----edgequake-report-test-boundary";

/// One form part.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        filename: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                filename,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}
