//! Report assembly: a WordprocessingML (`.docx`) package.
//!
//! The package is a zip of fixed XML parts plus one `word/media/imageN.png`
//! per embedded image. Everything is written from format strings; there is
//! no template file. Zip entries carry a fixed timestamp so identical inputs
//! produce identical bytes.
//!
//! Body layout:
//!
//! ```text
//! Heading 1  Description
//!            <description, one paragraph per line>
//! Heading 1  Chart by coordinates
//!            Chart.
//!            [chart image]
//!            Page 1:
//!            [page 1 image]
//!            ...
//! ```

use crate::error::ReportError;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Content type of the produced report.
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Attachment filename used for the produced report.
pub const REPORT_FILENAME: &str = "generated_document.docx";

const EMU_PER_INCH: f64 = 914_400.0;

/// A PNG to embed, with its pixel size for aspect-ratio scaling.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedImage<'a> {
    pub png: &'a [u8],
    pub width: u32,
    pub height: u32,
}

/// Builds the document body and collects media parts.
#[derive(Debug)]
pub struct ReportDocument<'a> {
    body: String,
    media: Vec<&'a [u8]>,
    image_width_inches: f64,
}

impl<'a> ReportDocument<'a> {
    pub fn new(image_width_inches: f64) -> Self {
        Self {
            body: String::new(),
            media: Vec::new(),
            image_width_inches,
        }
    }

    pub fn heading(&mut self, text: &str) -> &mut Self {
        self.body.push_str(&format!(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
            xml_escape(text)
        ));
        self
    }

    /// One paragraph per line of `text`.
    pub fn paragraphs(&mut self, text: &str) -> &mut Self {
        for line in text.lines() {
            self.paragraph(line);
        }
        self
    }

    pub fn paragraph(&mut self, text: &str) -> &mut Self {
        self.body.push_str(&format!(
            r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
            xml_escape(text)
        ));
        self
    }

    /// Embed an image inline at the configured display width.
    pub fn image(&mut self, img: EmbeddedImage<'a>) -> &mut Self {
        self.media.push(img.png);
        let n = self.media.len();
        let (cx, cy) = extent_emu(img.width, img.height, self.image_width_inches);
        self.body.push_str(&format!(
            r#"<w:p><w:r><w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0"><wp:extent cx="{cx}" cy="{cy}"/><wp:effectExtent l="0" t="0" r="0" b="0"/><wp:docPr id="{n}" name="Picture {n}"/><wp:cNvGraphicFramePr><a:graphicFrameLocks xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" noChangeAspect="1"/></wp:cNvGraphicFramePr><a:graphic xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:pic xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture"><pic:nvPicPr><pic:cNvPr id="{n}" name="image{n}.png"/><pic:cNvPicPr/></pic:nvPicPr><pic:blipFill><a:blip r:embed="{rid}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill><pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#,
            rid = image_rel_id(n),
        ));
        self
    }

    /// Serialise the package.
    pub fn finish(&self) -> Result<Vec<u8>, ReportError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let xml = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());
        let stored = xml.compression_method(CompressionMethod::Stored);

        let mut put = |name: &str, bytes: &[u8], opts: SimpleFileOptions| -> Result<(), ReportError> {
            zip.start_file(name, opts).map_err(zip_err)?;
            zip.write_all(bytes)
                .map_err(|e| ReportError::Internal(format!("Failed to write {name}: {e}")))
        };

        put("[Content_Types].xml", CONTENT_TYPES.as_bytes(), xml)?;
        put("_rels/.rels", ROOT_RELS.as_bytes(), xml)?;
        put("docProps/core.xml", CORE_PROPS.as_bytes(), xml)?;
        put("docProps/app.xml", APP_PROPS.as_bytes(), xml)?;
        put("word/document.xml", self.document_xml().as_bytes(), xml)?;
        put("word/styles.xml", STYLES.as_bytes(), xml)?;
        put("word/_rels/document.xml.rels", self.document_rels().as_bytes(), xml)?;
        for (i, png) in self.media.iter().enumerate() {
            put(&format!("word/media/image{}.png", i + 1), png, stored)?;
        }

        let cursor = zip.finish().map_err(zip_err)?;
        Ok(cursor.into_inner())
    }

    fn document_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing"><w:body>{}<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr></w:body></w:document>"#,
            self.body
        )
    }

    fn document_rels(&self) -> String {
        let mut rels = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rIdStyles" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        );
        for n in 1..=self.media.len() {
            rels.push_str(&format!(
                r#"<Relationship Id="{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image{n}.png"/>"#,
                image_rel_id(n)
            ));
        }
        rels.push_str("</Relationships>");
        rels
    }
}

/// Assemble the full report: description, chart, then one labelled image per page.
pub fn assemble_report(
    description: &str,
    chart: EmbeddedImage<'_>,
    pages: &[EmbeddedImage<'_>],
    image_width_inches: f64,
) -> Result<Vec<u8>, ReportError> {
    let mut doc = ReportDocument::new(image_width_inches);
    doc.heading("Description")
        .paragraphs(description)
        .heading("Chart by coordinates")
        .paragraph("Chart.")
        .image(chart);
    for (i, page) in pages.iter().enumerate() {
        doc.paragraph(&format!("Page {}:", i + 1)).image(*page);
    }
    doc.finish()
}

fn image_rel_id(n: usize) -> String {
    format!("rIdImage{n}")
}

/// Display size in EMU for a `width × height` px image shown `inches` wide.
fn extent_emu(width: u32, height: u32, inches: f64) -> (i64, i64) {
    let cx = inches * EMU_PER_INCH;
    let cy = if width == 0 {
        cx
    } else {
        cx * f64::from(height) / f64::from(width)
    };
    (cx.round() as i64, cy.round() as i64)
}

fn zip_err(e: zip::result::ZipError) -> ReportError {
    ReportError::Internal(format!("Failed to build report document: {e}"))
}

pub(crate) fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // Control characters other than tab are not allowed in XML 1.0.
            c if (c as u32) < 0x20 && c != '\t' => {}
            c => out.push(c),
        }
    }
    out
}

// ── Fixed parts ─────────────────────────────────────────────────────────────

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/></Relationships>"#;

const CORE_PROPS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>Generated report</dc:title><dc:creator>edgequake-report</dc:creator></cp:coreProperties>"#;

const APP_PROPS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>edgequake-report</Application></Properties>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/><w:sz w:val="22"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="160" w:line="259" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:uiPriority w:val="9"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="120"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:color w:val="2F5496"/><w:sz w:val="32"/></w:rPr></w:style></w:styles>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake";

    fn img(w: u32, h: u32) -> EmbeddedImage<'static> {
        EmbeddedImage {
            png: FAKE_PNG,
            width: w,
            height: h,
        }
    }

    fn read_part(docx: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(docx)).unwrap();
        let mut s = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut s).unwrap();
        s
    }

    #[test]
    fn body_follows_fixed_layout() {
        let docx = assemble_report("Line one\nLine two", img(640, 480), &[img(100, 200), img(100, 100)], 6.0)
            .unwrap();
        let xml = read_part(&docx, "word/document.xml");

        let order = ["Description", "Line one", "Line two", "Chart by coordinates", "Chart.", "rIdImage1", "Page 1:", "rIdImage2", "Page 2:", "rIdImage3"];
        let mut pos = 0;
        for needle in order {
            let found = xml[pos..].find(needle).unwrap_or_else(|| panic!("{needle} missing or out of order"));
            pos += found + needle.len();
        }
        assert_eq!(xml.matches("Heading1").count(), 2);
    }

    #[test]
    fn media_parts_and_relationships_match() {
        let docx = assemble_report("d", img(640, 480), &[img(10, 10)], 6.0).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(&docx[..])).unwrap();
        assert!(archive.by_name("word/media/image1.png").is_ok());
        assert!(archive.by_name("word/media/image2.png").is_ok());
        assert!(archive.by_name("word/media/image3.png").is_err());

        let rels = read_part(&docx, "word/_rels/document.xml.rels");
        assert!(rels.contains(r#"Id="rIdImage2""#));
        assert!(rels.contains("media/image2.png"));
    }

    #[test]
    fn images_are_six_inches_wide_with_aspect_height() {
        let docx = assemble_report("d", img(640, 480), &[], 6.0).unwrap();
        let xml = read_part(&docx, "word/document.xml");
        assert!(xml.contains(r#"cx="5486400" cy="4114800""#), "{xml}");
    }

    #[test]
    fn text_is_escaped() {
        let docx = assemble_report("a < b & \"c\"", img(1, 1), &[], 6.0).unwrap();
        let xml = read_part(&docx, "word/document.xml");
        assert!(xml.contains("a &lt; b &amp; &quot;c&quot;"));
    }

    #[test]
    fn output_is_byte_deterministic() {
        let a = assemble_report("same", img(640, 480), &[img(5, 5)], 6.0).unwrap();
        let b = assemble_report("same", img(640, 480), &[img(5, 5)], 6.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn extent_handles_zero_width() {
        assert_eq!(extent_emu(0, 10, 1.0), (914_400, 914_400));
    }
}
