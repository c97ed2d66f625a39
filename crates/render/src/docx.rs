//! DOCX output: a minimal WordprocessingML package written with `zip`.

use crate::{blocks, visible_comments, Renderer, DOCUMENT_TITLE};
use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use xtract_core::{Error, Extraction, Result};
use zip::write::FileOptions;
use zip::ZipWriter;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
</Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:pPr><w:spacing w:after="120"/></w:pPr><w:rPr><w:sz w:val="22"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:spacing w:after="240"/></w:pPr><w:rPr><w:b/><w:sz w:val="48"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="120"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="120" w:after="120"/><w:outlineLvl w:val="1"/></w:pPr><w:rPr><w:b/><w:sz w:val="26"/></w:rPr></w:style>
<w:style w:type="paragraph" w:styleId="ListBullet"><w:name w:val="List Bullet"/><w:basedOn w:val="Normal"/><w:pPr><w:ind w:left="360" w:hanging="360"/></w:pPr></w:style>
</w:styles>"#;

/// Renders an extraction as a Word document.
#[derive(Debug, Clone, Default)]
pub struct DocxRenderer;

impl DocxRenderer {
    /// Create a DOCX renderer.
    pub fn new() -> Self {
        Self
    }

    /// Build the `word/document.xml` part.
    pub fn document_xml(&self, extraction: &Extraction) -> String {
        let mut body = paragraph(Some("Title"), &[DOCUMENT_TITLE]);

        for slide in &extraction.slides {
            let heading = format!("Slide {}", slide.slide_number);
            body.push_str(&paragraph(Some("Heading1"), &[heading.as_str()]));
            for block in blocks(&slide.body_text) {
                body.push_str(&paragraph(None, &block));
            }

            let comments = visible_comments(extraction, slide);
            if !comments.is_empty() {
                body.push_str(&paragraph(Some("Heading2"), &["Comments"]));
                for comment in comments {
                    let text = format!("\u{2022}\t{}", comment);
                    let lines: Vec<&str> = text.lines().collect();
                    body.push_str(&paragraph(Some("ListBullet"), &lines));
                }
            }
        }

        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr></w:body></w:document>"#,
            body
        )
    }

    fn package(&self, extraction: &Extraction) -> Result<Vec<u8>> {
        let document = self.document_xml(extraction);
        let parts = [
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", PACKAGE_RELS),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS),
            ("word/styles.xml", STYLES),
            ("word/document.xml", document.as_str()),
        ];

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in parts {
            writer
                .start_file(name, FileOptions::default())
                .map_err(|e| Error::Render(format!("Failed to add '{}': {}", name, e)))?;
            writer.write_all(content.as_bytes())?;
        }
        let cursor = writer
            .finish()
            .map_err(|e| Error::Render(format!("Failed to finish DOCX archive: {}", e)))?;
        Ok(cursor.into_inner())
    }
}

/// One `w:p` with optional style; lines are separated by `w:br`.
fn paragraph(style: Option<&str>, lines: &[&str]) -> String {
    let props = style
        .map(|s| format!(r#"<w:pPr><w:pStyle w:val="{}"/></w:pPr>"#, s))
        .unwrap_or_default();
    let runs: Vec<String> = lines.iter().map(|line| run_text(line)).collect();
    format!("<w:p>{}<w:r>{}</w:r></w:p>", props, runs.join("<w:br/>"))
}

/// Text of a run, with tabs as `w:tab`.
fn run_text(line: &str) -> String {
    line.split('\t')
        .map(|piece| format!(r#"<w:t xml:space="preserve">{}</w:t>"#, escape(piece)))
        .collect::<Vec<_>>()
        .join("<w:tab/>")
}

impl Renderer for DocxRenderer {
    fn extension(&self) -> &'static str {
        "docx"
    }

    fn render(&self, extraction: &Extraction, out: &mut dyn Write) -> Result<()> {
        let bytes = self.package(extraction)?;
        log::debug!("Writing DOCX package ({} bytes)", bytes.len());
        out.write_all(&bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::sample;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn test_paragraph_escapes_and_breaks() {
        assert_eq!(
            paragraph(None, &["a < b", "c & d"]),
            r#"<w:p><w:r><w:t xml:space="preserve">a &lt; b</w:t><w:br/><w:t xml:space="preserve">c &amp; d</w:t></w:r></w:p>"#
        );
    }

    #[test]
    fn test_document_structure() {
        let xml = DocxRenderer::new().document_xml(&sample());

        assert!(xml.contains(r#"<w:pStyle w:val="Title"/>"#));
        assert!(xml.contains(">Slide 1<"));
        assert!(xml.contains(">Slide 2<"));
        assert!(xml.contains(r#"Line one</w:t><w:br/><w:t xml:space="preserve">Line two"#));
        assert!(xml.contains("Alice: Looks good"));
        assert!(xml.contains("Unknown Author: Fix typo"));
    }

    #[test]
    fn test_render_produces_readable_package() {
        let bytes = DocxRenderer::new().render_to_vec(&sample()).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();

        for name in ["[Content_Types].xml", "_rels/.rels", "word/styles.xml"] {
            assert!(archive.by_name(name).is_ok(), "missing {}", name);
        }
        let mut document = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut document)
            .unwrap();
        assert!(document.contains("Presentation Content"));
    }
}
