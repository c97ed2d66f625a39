//! Slide shape-tree parsing and body-text extraction.

use crate::package::PptxPackage;
use crate::rels::{find_related, Relationship, REL_NOTES_SLIDE, REL_SLIDE_LAYOUT, REL_SLIDE_MASTER};
use crate::xml::{attr, attr_i64, local_name, reader, xml_error};
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use std::io::{Read, Seek};
use xtract_core::{compose_body_text, normalize_run, Result, ShapeText, Warning};

/// Placeholder reference of a shape (`p:nvPr/p:ph`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Placeholder type, `obj` when not given.
    pub kind: String,
    /// Placeholder index, `0` when not given.
    pub idx: u32,
}

impl Placeholder {
    fn from_element(e: &BytesStart<'_>) -> Self {
        Self {
            kind: attr(e, b"type").unwrap_or_else(|| "obj".to_string()),
            idx: attr(e, b"idx").and_then(|v| v.parse().ok()).unwrap_or(0),
        }
    }

    /// Type used to match against slide master placeholders.
    fn master_kind(&self) -> &str {
        match self.kind.as_str() {
            "ctrTitle" | "title" => "title",
            "subTitle" | "obj" | "body" => "body",
            other => other,
        }
    }
}

/// A `p:sp` shape as found in a slide, layout, master or notes part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedShape {
    /// Paragraph texts, empty paragraphs included.
    pub paragraphs: Vec<String>,
    /// Whether the shape carries a text frame (`p:txBody`).
    pub has_text_frame: bool,
    /// Vertical offset in slide coordinates (EMU), if the shape has one.
    pub y: Option<i64>,
    /// Placeholder reference, if the shape is a placeholder.
    pub placeholder: Option<Placeholder>,
}

/// Child-to-parent coordinate mapping of a group shape.
#[derive(Debug, Clone, Copy, Default)]
struct GroupTransform {
    off_y: i64,
    ext_cy: i64,
    ch_off_y: i64,
    ch_ext_cy: i64,
}

impl GroupTransform {
    /// Map a child offset to the parent's coordinates. Out-of-range values
    /// saturate at the `i64` bounds.
    fn apply(&self, y: i64) -> i64 {
        let delta = i128::from(y) - i128::from(self.ch_off_y);
        let scaled = if self.ch_ext_cy == 0 || self.ext_cy == 0 {
            delta
        } else {
            delta.saturating_mul(i128::from(self.ext_cy)) / i128::from(self.ch_ext_cy)
        };
        let mapped = i128::from(self.off_y).saturating_add(scaled);
        i64::try_from(mapped).unwrap_or(if mapped < 0 { i64::MIN } else { i64::MAX })
    }
}

/// Which shape-properties element the parser is inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Props {
    None,
    Shape,
    Group,
}

/// Parse every `p:sp` of a part, flattening group shapes.
///
/// Content under `mc:Fallback` is skipped so that alternate renditions of
/// the same shape are not read twice.
pub fn parse_shapes(part: &str, xml: &str) -> Result<Vec<ParsedShape>> {
    let mut reader = reader(xml);
    let mut shapes = Vec::new();

    let mut groups: Vec<GroupTransform> = Vec::new();
    let mut current: Option<ParsedShape> = None;
    let mut props = Props::None;
    let mut in_xfrm = false;
    let mut in_text_body = false;
    let mut paragraph: Option<String> = None;
    let mut in_text = false;

    loop {
        let event = reader.read_event().map_err(|e| xml_error(part, e))?;
        match event {
            Event::Start(ref e) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"Fallback" => {
                        let end = e.to_end().into_owned();
                        reader
                            .read_to_end(end.name())
                            .map_err(|err| xml_error(part, err))?;
                    }
                    b"sp" if current.is_none() => {
                        current = Some(ParsedShape::default());
                    }
                    b"grpSp" => {
                        groups.push(GroupTransform::default());
                    }
                    b"spPr" if current.is_some() => props = Props::Shape,
                    b"grpSpPr" if current.is_none() => props = Props::Group,
                    b"xfrm" if props != Props::None => in_xfrm = true,
                    b"txBody" if current.is_some() => {
                        in_text_body = true;
                        if let Some(shape) = current.as_mut() {
                            shape.has_text_frame = true;
                        }
                    }
                    b"p" if in_text_body => paragraph = Some(String::new()),
                    b"t" if paragraph.is_some() => in_text = true,
                    b"br" => {
                        if let Some(p) = paragraph.as_mut() {
                            p.push('\n');
                        }
                    }
                    other => {
                        apply_geometry(other, e, in_xfrm, props, &mut current, &mut groups);
                        apply_placeholder(other, e, &mut current);
                    }
                }
            }
            Event::Empty(ref e) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"p" if in_text_body => {
                        if let Some(shape) = current.as_mut() {
                            shape.paragraphs.push(String::new());
                        }
                    }
                    b"br" => {
                        if let Some(p) = paragraph.as_mut() {
                            p.push('\n');
                        }
                    }
                    b"txBody" if current.is_some() => {
                        if let Some(shape) = current.as_mut() {
                            shape.has_text_frame = true;
                        }
                    }
                    other => {
                        apply_geometry(other, e, in_xfrm, props, &mut current, &mut groups);
                        apply_placeholder(other, e, &mut current);
                    }
                }
            }
            Event::Text(ref e) if in_text => {
                if let Some(p) = paragraph.as_mut() {
                    match e.unescape() {
                        Ok(text) => p.push_str(&normalize_run(&text)),
                        Err(err) => {
                            log::warn!("Unresolvable text in '{}' (keeping raw): {}", part, err);
                            p.push_str(&normalize_run(&String::from_utf8_lossy(e)));
                        }
                    }
                }
            }
            Event::CData(ref e) if in_text => {
                if let Some(p) = paragraph.as_mut() {
                    p.push_str(&normalize_run(&String::from_utf8_lossy(e)));
                }
            }
            Event::End(ref e) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"t" => in_text = false,
                    b"p" if in_text_body => {
                        if let (Some(text), Some(shape)) = (paragraph.take(), current.as_mut()) {
                            shape.paragraphs.push(text);
                        }
                    }
                    b"txBody" => in_text_body = false,
                    b"xfrm" => in_xfrm = false,
                    b"spPr" | b"grpSpPr" => props = Props::None,
                    b"sp" => {
                        if let Some(mut shape) = current.take() {
                            shape.y = shape
                                .y
                                .map(|y| groups.iter().rev().fold(y, |y, g| g.apply(y)));
                            shapes.push(shape);
                        }
                        in_text_body = false;
                        paragraph = None;
                        in_text = false;
                    }
                    b"grpSp" => {
                        groups.pop();
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(shapes)
}

/// Record `a:off`/`a:ext`/`a:chOff`/`a:chExt` values of the transform being read.
fn apply_geometry(
    local: &[u8],
    e: &BytesStart<'_>,
    in_xfrm: bool,
    props: Props,
    current: &mut Option<ParsedShape>,
    groups: &mut [GroupTransform],
) {
    if !in_xfrm {
        return;
    }
    match props {
        Props::Shape => {
            if local == b"off" {
                if let Some(shape) = current.as_mut() {
                    shape.y = attr_i64(e, b"y").or(shape.y);
                }
            }
        }
        Props::Group => {
            let Some(group) = groups.last_mut() else {
                return;
            };
            match local {
                b"off" => group.off_y = attr_i64(e, b"y").unwrap_or(0),
                b"ext" => group.ext_cy = attr_i64(e, b"cy").unwrap_or(0),
                b"chOff" => group.ch_off_y = attr_i64(e, b"y").unwrap_or(0),
                b"chExt" => group.ch_ext_cy = attr_i64(e, b"cy").unwrap_or(0),
                _ => {}
            }
        }
        Props::None => {}
    }
}

fn apply_placeholder(local: &[u8], e: &BytesStart<'_>, current: &mut Option<ParsedShape>) {
    if local != b"ph" {
        return;
    }
    if let Some(shape) = current.as_mut() {
        shape.placeholder = Some(Placeholder::from_element(e));
    }
}

/// Text of the notes body placeholder, paragraphs joined by `\n`.
pub fn notes_text(part: &str, xml: &str) -> Result<Option<String>> {
    let shapes = parse_shapes(part, xml)?;
    Ok(shapes
        .into_iter()
        .find(|s| {
            s.has_text_frame
                && s.placeholder.as_ref().is_some_and(|p| p.kind == "body")
        })
        .map(|s| s.paragraphs.join("\n")))
}

/// Extracts the body text of slides.
///
/// Layout and master placeholders are cached across slides so that shared
/// layouts are parsed once per run.
#[derive(Debug, Default)]
pub struct SlideExtractor {
    templates: HashMap<String, Vec<ParsedShape>>,
}

impl SlideExtractor {
    /// Create an extractor with an empty layout cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the body text of one slide. `rels` are the slide's own
    /// relationships.
    ///
    /// Fails only when the slide part itself cannot be read or parsed.
    /// Problems with notes, layouts or masters are pushed to `warnings` and
    /// the affected enrichment is left out.
    pub fn extract<R: Read + Seek>(
        &mut self,
        package: &mut PptxPackage<R>,
        slide_number: usize,
        slide_part: &str,
        rels: &[Relationship],
        warnings: &mut Vec<Warning>,
    ) -> Result<String> {
        let xml = package.read_part(slide_part)?;
        let mut shapes = parse_shapes(slide_part, &xml)?;
        shapes.retain(|s| s.has_text_frame);

        if shapes.iter().any(|s| s.y.is_none() && s.placeholder.is_some()) {
            if let Err(e) = self.inherit_positions(package, slide_part, rels, &mut shapes) {
                warnings.push(Warning::from_error(
                    Some(slide_number),
                    "Could not resolve placeholder positions",
                    &e,
                ));
            }
        }

        let notes = match Self::notes(package, slide_part, rels) {
            Ok(notes) => notes,
            Err(e) => {
                warnings.push(Warning::from_error(
                    Some(slide_number),
                    "Could not read speaker notes",
                    &e,
                ));
                None
            }
        };

        log::debug!(
            "Slide {} ({}): {} text shapes, notes: {}",
            slide_number,
            slide_part,
            shapes.len(),
            notes.is_some()
        );

        let shapes = shapes
            .into_iter()
            .map(|s| ShapeText::new(s.paragraphs, s.y))
            .collect();
        Ok(compose_body_text(shapes, notes.as_deref()))
    }

    fn notes<R: Read + Seek>(
        package: &mut PptxPackage<R>,
        slide_part: &str,
        rels: &[Relationship],
    ) -> Result<Option<String>> {
        let Some(notes_part) = find_related(slide_part, rels, REL_NOTES_SLIDE) else {
            return Ok(None);
        };
        let xml = package.read_part(&notes_part)?;
        notes_text(&notes_part, &xml)
    }

    /// Fill in missing positions of placeholder shapes from the slide layout
    /// (matched by `idx`) and then the slide master (matched by type).
    fn inherit_positions<R: Read + Seek>(
        &mut self,
        package: &mut PptxPackage<R>,
        slide_part: &str,
        rels: &[Relationship],
        shapes: &mut [ParsedShape],
    ) -> Result<()> {
        let Some(layout) = find_related(slide_part, rels, REL_SLIDE_LAYOUT) else {
            return Ok(());
        };
        self.load_template(package, &layout)?;
        let master = package.related_part(&layout, REL_SLIDE_MASTER)?;
        if let Some(master) = master.as_deref() {
            self.load_template(package, master)?;
        }

        let layout_shapes = self.templates.get(&layout).map(Vec::as_slice).unwrap_or(&[]);
        let master_shapes = master
            .as_ref()
            .and_then(|m| self.templates.get(m))
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        for shape in shapes.iter_mut().filter(|s| s.y.is_none()) {
            let Some(ph) = shape.placeholder.as_ref() else {
                continue;
            };
            let layout_match = layout_shapes
                .iter()
                .find(|l| l.placeholder.as_ref().is_some_and(|lp| lp.idx == ph.idx));
            let kind = layout_match
                .and_then(|l| l.placeholder.as_ref())
                .unwrap_or(ph)
                .master_kind();

            shape.y = layout_match.and_then(|l| l.y).or_else(|| {
                master_shapes
                    .iter()
                    .find(|m| m.placeholder.as_ref().is_some_and(|mp| mp.master_kind() == kind))
                    .and_then(|m| m.y)
            });
        }

        Ok(())
    }

    fn load_template<R: Read + Seek>(
        &mut self,
        package: &mut PptxPackage<R>,
        part: &str,
    ) -> Result<()> {
        if self.templates.contains_key(part) {
            return Ok(());
        }
        let xml = package.read_part(part)?;
        let placeholders = parse_shapes(part, &xml)?
            .into_iter()
            .filter(|s| s.placeholder.is_some())
            .collect();
        self.templates.insert(part.to_string(), placeholders);
        Ok(())
    }
}
