//! Reviewer comments linked from slides.
//!
//! Both comment part flavours are read:
//!
//! - legacy `p:cmLst/p:cm` with a `p:text` body and a numeric `authorId`
//!   pointing into `ppt/commentAuthors.xml`
//! - modern `p188:cmLst/p188:cm` with a DrawingML `p188:txBody`, threaded
//!   `p188:reply` entries and a GUID `authorId` pointing into `ppt/authors.xml`

use crate::package::PptxPackage;
use crate::rels::{file_name, Relationship};
use crate::xml::{attr, local_name, reader, xml_error};
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use std::io::{Read, Seek};
use xtract_core::{normalize_run, Comment, Result, Warning, WarningKind};

/// Directory holding comment parts.
pub const COMMENTS_DIR: &str = "ppt/comments";

/// Author table of legacy comments.
pub const LEGACY_AUTHORS_PART: &str = "ppt/commentAuthors.xml";

/// Author table of modern comments.
pub const MODERN_AUTHORS_PART: &str = "ppt/authors.xml";

/// A comment as written in a comment part, before author lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawComment {
    /// Name from an inline author list, if any.
    pub author_name: Option<String>,
    /// Reference into an author table, if any.
    pub author_id: Option<String>,
    /// Comment body.
    pub text: String,
}

/// Part name of a comment relationship target.
///
/// Targets are resolved by file name inside [`COMMENTS_DIR`].
pub fn comment_part_path(target: &str) -> String {
    format!("{}/{}", COMMENTS_DIR, file_name(target))
}

/// Parse a comment part into comments in document order.
///
/// Replies follow the comment they answer.
pub fn parse_comments(part: &str, xml: &str) -> Result<Vec<RawComment>> {
    let mut reader = reader(xml);
    let mut entries: Vec<RawComment> = Vec::new();
    let mut open: Vec<usize> = Vec::new();

    let mut in_author_list = false;
    let mut first_author = false;
    let mut in_legacy_text = false;
    let mut body: Option<Vec<String>> = None;
    let mut paragraph: Option<String> = None;
    let mut in_run_text = false;

    loop {
        let event = reader.read_event().map_err(|e| xml_error(part, e))?;
        match event {
            Event::Start(ref e) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"cm" | b"reply" => {
                        entries.push(new_entry(e));
                        open.push(entries.len() - 1);
                    }
                    b"authorLst" if !open.is_empty() => {
                        in_author_list = true;
                        first_author = true;
                    }
                    b"author" if in_author_list && std::mem::take(&mut first_author) => {
                        set_inline_author(e, &open, &mut entries)
                    }
                    b"text" if !open.is_empty() => in_legacy_text = true,
                    b"txBody" if !open.is_empty() => body = Some(Vec::new()),
                    b"p" if body.is_some() => paragraph = Some(String::new()),
                    b"t" if paragraph.is_some() => in_run_text = true,
                    b"br" => {
                        if let Some(p) = paragraph.as_mut() {
                            p.push('\n');
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(ref e) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"cm" | b"reply" => entries.push(new_entry(e)),
                    b"author" if in_author_list && std::mem::take(&mut first_author) => {
                        set_inline_author(e, &open, &mut entries)
                    }
                    b"p" => {
                        if let Some(paragraphs) = body.as_mut() {
                            paragraphs.push(String::new());
                        }
                    }
                    b"br" => {
                        if let Some(p) = paragraph.as_mut() {
                            p.push('\n');
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(ref e) if in_legacy_text || in_run_text => {
                let text = e
                    .unescape()
                    .map_err(|err| xml_error(part, err))?;
                let text = normalize_run(&text);
                if in_run_text {
                    if let Some(p) = paragraph.as_mut() {
                        p.push_str(&text);
                    }
                } else if let Some(&idx) = open.last() {
                    entries[idx].text.push_str(&text);
                }
            }
            Event::End(ref e) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"cm" | b"reply" => {
                        open.pop();
                    }
                    b"authorLst" => in_author_list = false,
                    b"text" => in_legacy_text = false,
                    b"t" => in_run_text = false,
                    b"p" => {
                        if let (Some(p), Some(paragraphs)) = (paragraph.take(), body.as_mut()) {
                            paragraphs.push(p);
                        }
                    }
                    b"txBody" => {
                        if let (Some(paragraphs), Some(&idx)) = (body.take(), open.last()) {
                            entries[idx].text = paragraphs.join("\n");
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(entries)
}

fn new_entry(e: &BytesStart<'_>) -> RawComment {
    RawComment {
        author_id: attr(e, b"authorId"),
        ..RawComment::default()
    }
}

/// Take the name of the first author of an inline author list. A nameless
/// first author leaves the comment without a name.
fn set_inline_author(e: &BytesStart<'_>, open: &[usize], entries: &mut [RawComment]) {
    if let Some(&idx) = open.last() {
        entries[idx].author_name = attr(e, b"name");
    }
}

/// Parse an author table (`p:cmAuthorLst` or `p188:authorLst`) into an
/// id → display name map.
pub fn parse_authors(part: &str, xml: &str) -> Result<HashMap<String, String>> {
    let mut reader = reader(xml);
    let mut authors = HashMap::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if matches!(local_name(e.name().as_ref()), b"cmAuthor" | b"author") =>
            {
                if let (Some(id), Some(name)) = (attr(e, b"id"), attr(e, b"name")) {
                    authors.insert(id, name);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(part, e)),
            _ => {}
        }
    }

    Ok(authors)
}

/// Resolves the comments of slides.
///
/// Author tables are read on first use and reused for every slide.
#[derive(Debug, Default)]
pub struct CommentResolver {
    authors: Option<HashMap<String, String>>,
}

impl CommentResolver {
    /// Create a resolver with no author tables loaded yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Comments of one slide, in source order. `rels` are the slide's
    /// relationships.
    ///
    /// Never fails: a malformed comment part empties the slide's comment
    /// list and is reported in `warnings`, a missing one is reported and
    /// skipped.
    pub fn resolve<R: Read + Seek>(
        &mut self,
        package: &mut PptxPackage<R>,
        slide_number: usize,
        rels: &[Relationship],
        warnings: &mut Vec<Warning>,
    ) -> Vec<Comment> {
        match self.try_resolve(package, slide_number, rels, warnings) {
            Ok(comments) => comments,
            Err(e) => {
                warnings.push(Warning::from_error(
                    Some(slide_number),
                    "Could not extract comments",
                    &e,
                ));
                Vec::new()
            }
        }
    }

    fn try_resolve<R: Read + Seek>(
        &mut self,
        package: &mut PptxPackage<R>,
        slide_number: usize,
        rels: &[Relationship],
        warnings: &mut Vec<Warning>,
    ) -> Result<Vec<Comment>> {
        let mut raw = Vec::new();

        for rel in rels.iter().filter(|r| r.targets_comments()) {
            let part = comment_part_path(&rel.target);
            if !package.has_part(&part) {
                warnings.push(Warning::new(
                    Some(slide_number),
                    WarningKind::MissingPart,
                    format!("Comment part '{}' ({}) not found", part, rel.id),
                ));
                continue;
            }
            let xml = package.read_part(&part)?;
            raw.extend(parse_comments(&part, &xml)?);
        }

        let needs_lookup = raw
            .iter()
            .any(|c| c.author_name.is_none() && c.author_id.is_some());
        if needs_lookup {
            self.load_authors(package, warnings);
        }
        let authors = self.authors.as_ref();

        Ok(raw
            .into_iter()
            .map(|c| {
                let name = c.author_name.or_else(|| {
                    let id = c.author_id?;
                    authors?.get(&id).cloned()
                });
                Comment::new(name.as_deref(), c.text)
            })
            .collect())
    }

    fn load_authors<R: Read + Seek>(
        &mut self,
        package: &mut PptxPackage<R>,
        warnings: &mut Vec<Warning>,
    ) {
        if self.authors.is_some() {
            return;
        }

        let mut authors = HashMap::new();
        for part in [LEGACY_AUTHORS_PART, MODERN_AUTHORS_PART] {
            if !package.has_part(part) {
                continue;
            }
            let parsed = package
                .read_part(part)
                .and_then(|xml| parse_authors(part, &xml));
            match parsed {
                Ok(table) => authors.extend(table),
                Err(e) => {
                    warnings.push(Warning::from_error(None, "Could not read comment authors", &e))
                }
            }
        }
        log::debug!("Loaded {} comment authors", authors.len());
        self.authors = Some(authors);
    }
}
