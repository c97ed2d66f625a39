//! In-memory PPTX packages for tests.

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn paragraphs_xml(paragraphs: &[&str]) -> String {
    paragraphs
        .iter()
        .map(|p| {
            if p.is_empty() {
                "<a:p/>".to_string()
            } else {
                format!("<a:p><a:r><a:rPr lang=\"en-US\"/><a:t>{}</a:t></a:r></a:p>", escape(p))
            }
        })
        .collect()
}

/// A text box at vertical offset `y` (EMU).
pub(crate) fn text_shape(y: i64, paragraphs: &[&str]) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="TextBox"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="457200" y="{}"/><a:ext cx="8229600" cy="1143000"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/>{}</p:txBody></p:sp>"#,
        y,
        paragraphs_xml(paragraphs)
    )
}

/// A picture at vertical offset `y`; pictures carry no text frame.
pub(crate) fn picture(y: i64) -> String {
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="4" name="Picture"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="rId9"/></p:blipFill><p:spPr><a:xfrm><a:off x="0" y="{}"/><a:ext cx="100" cy="100"/></a:xfrm></p:spPr></p:pic>"#,
        y
    )
}

/// A placeholder without its own transform. Empty `paragraphs` gives a
/// shape without a text body.
pub(crate) fn placeholder_shape(kind: &str, idx: Option<u32>, paragraphs: &[&str]) -> String {
    let idx = idx.map(|i| format!(" idx=\"{}\"", i)).unwrap_or_default();
    let body = if paragraphs.is_empty() {
        String::new()
    } else {
        format!("<p:txBody><a:bodyPr/>{}</p:txBody>", paragraphs_xml(paragraphs))
    };
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="3" name="Placeholder"/><p:cNvSpPr/><p:nvPr><p:ph type="{}"{}/></p:nvPr></p:nvSpPr><p:spPr/>{}</p:sp>"#,
        kind, idx, body
    )
}

/// A layout or master placeholder with a position.
pub(crate) fn positioned_placeholder(kind: &str, idx: u32, y: i64) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="5" name="Placeholder"/><p:cNvSpPr/><p:nvPr><p:ph type="{}" idx="{}"/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="0" y="{}"/><a:ext cx="100" cy="100"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:p/></p:txBody></p:sp>"#,
        kind, idx, y
    )
}

/// A legacy comment part with inline author lists.
pub(crate) fn legacy_comments(comments: &[(Option<&str>, &str)]) -> String {
    let entries: String = comments
        .iter()
        .map(|(author, text)| {
            let authors = author
                .map(|a| format!("<p:author name=\"{}\"/>", escape(a)))
                .unwrap_or_default();
            format!(
                "<p:cm><p:authorLst>{}</p:authorLst><p:text>{}</p:text></p:cm>",
                authors,
                escape(text)
            )
        })
        .collect();
    format!("<p:cmLst {}>{}</p:cmLst>", NS, entries)
}

/// Wrap shapes in a slide part.
pub(crate) fn slide_xml(shapes: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld {}><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld></p:sld>"#,
        NS,
        shapes.concat()
    )
}

fn rels_xml(rels: &[(String, String, String)]) -> String {
    let entries: String = rels
        .iter()
        .map(|(id, rel_type, target)| {
            format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
                id, rel_type, target
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        entries
    )
}

struct SlideFixture {
    name: String,
    xml: String,
    rels: Vec<(String, String)>,
}

/// Builds a minimal PPTX package.
///
/// Slides get relationship ids `rId2`, `rId3`, ... in insertion order.
/// Methods that attach parts to a slide act on the most recently added one.
#[derive(Default)]
pub(crate) struct PackageBuilder {
    slides: Vec<SlideFixture>,
    order: Option<Vec<String>>,
    parts: Vec<(String, String)>,
    comment_parts: usize,
}

impl PackageBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Zip the given parts as they are.
    pub(crate) fn raw(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in parts {
            writer.start_file(*name, FileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    pub(crate) fn slide(self, shapes: &[String]) -> Self {
        let name = format!("slide{}.xml", self.slides.len() + 1);
        self.slide_with_name(&name, shapes)
    }

    pub(crate) fn slide_with_name(mut self, name: &str, shapes: &[String]) -> Self {
        self.slides.push(SlideFixture {
            name: name.to_string(),
            xml: slide_xml(shapes),
            rels: Vec::new(),
        });
        self
    }

    /// Override the `p:sldIdLst` order with relationship ids.
    pub(crate) fn slide_order(mut self, ids: &[&str]) -> Self {
        self.order = Some(ids.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Add a relationship to the last slide.
    pub(crate) fn slide_rel(mut self, rel_type: &str, target: &str) -> Self {
        let slide = self.slides.last_mut().expect("add a slide first");
        slide.rels.push((rel_type.to_string(), target.to_string()));
        self
    }

    /// Attach a comment part to the last slide.
    pub(crate) fn comments(mut self, xml: &str) -> Self {
        self.comment_parts += 1;
        let file = format!("comment{}.xml", self.comment_parts);
        self.parts.push((format!("ppt/comments/{}", file), xml.to_string()));
        self.slide_rel(
            &format!("{}/comments", REL_NS),
            &format!("../comments/{}", file),
        )
    }

    /// Attach a notes slide with the given body text to the last slide.
    pub(crate) fn notes(mut self, text: &str) -> Self {
        let n = self.slides.len();
        let paragraphs: Vec<&str> = text.split('\n').collect();
        let xml = slide_xml(&[
            placeholder_shape("sldImg", Some(1), &[]),
            placeholder_shape("body", Some(2), &paragraphs),
        ])
        .replace("p:sld ", "p:notes ")
        .replace("</p:sld>", "</p:notes>");
        self.parts
            .push((format!("ppt/notesSlides/notesSlide{}.xml", n), xml));
        self.slide_rel(
            &format!("{}/notesSlide", REL_NS),
            &format!("../notesSlides/notesSlide{}.xml", n),
        )
    }

    /// Attach a slide layout part to the last slide.
    pub(crate) fn layout(mut self, xml: &str) -> Self {
        let n = self.slides.len();
        self.parts
            .push((format!("ppt/slideLayouts/slideLayout{}.xml", n), xml.to_string()));
        self.slide_rel(
            &format!("{}/slideLayout", REL_NS),
            &format!("../slideLayouts/slideLayout{}.xml", n),
        )
    }

    /// Add an arbitrary part.
    pub(crate) fn part(mut self, name: &str, xml: &str) -> Self {
        self.parts.push((name.to_string(), xml.to_string()));
        self
    }

    pub(crate) fn build(self) -> Vec<u8> {
        let mut files: Vec<(String, String)> = Vec::new();

        let mut pres_rels = vec![(
            "rId1".to_string(),
            format!("{}/slideMaster", REL_NS),
            "slideMasters/slideMaster1.xml".to_string(),
        )];
        let mut ids = Vec::new();
        for (i, slide) in self.slides.iter().enumerate() {
            let id = format!("rId{}", i + 2);
            pres_rels.push((id.clone(), format!("{}/slide", REL_NS), format!("slides/{}", slide.name)));
            ids.push(id);

            files.push((format!("ppt/slides/{}", slide.name), slide.xml.clone()));
            if !slide.rels.is_empty() {
                let rels: Vec<(String, String, String)> = slide
                    .rels
                    .iter()
                    .enumerate()
                    .map(|(j, (t, target))| (format!("rId{}", j + 1), t.clone(), target.clone()))
                    .collect();
                files.push((format!("ppt/slides/_rels/{}.rels", slide.name), rels_xml(&rels)));
            }
        }

        let order = self.order.unwrap_or(ids);
        let sld_ids: String = order
            .iter()
            .enumerate()
            .map(|(i, id)| format!(r#"<p:sldId id="{}" r:id="{}"/>"#, 256 + i, id))
            .collect();
        files.push((
            "ppt/presentation.xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentation {}><p:sldIdLst>{}</p:sldIdLst></p:presentation>"#,
                NS, sld_ids
            ),
        ));
        files.push(("ppt/_rels/presentation.xml.rels".to_string(), rels_xml(&pres_rels)));
        files.extend(self.parts);

        let refs: Vec<(&str, &str)> = files.iter().map(|(n, c)| (n.as_str(), c.as_str())).collect();
        Self::raw(&refs)
    }
}
