//! Relationship parts (`_rels/*.rels`) and target resolution.

use crate::xml::{attr, local_name, reader, xml_error};
use quick_xml::events::Event;
use xtract_core::Result;

/// Relationship type suffix of a slide's notes slide.
pub const REL_NOTES_SLIDE: &str = "/notesSlide";

/// Relationship type suffix of a slide's layout.
pub const REL_SLIDE_LAYOUT: &str = "/slideLayout";

/// Relationship type suffix of a layout's master.
pub const REL_SLIDE_MASTER: &str = "/slideMaster";

/// Relationship type suffix of a presentation's slides.
pub const REL_SLIDE: &str = "/slide";

/// A single relationship entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g. "rId1").
    pub id: String,
    /// Relationship type URI.
    pub rel_type: String,
    /// Target path as written in the part, usually relative.
    pub target: String,
    /// Whether the target points outside the package.
    pub external: bool,
}

impl Relationship {
    /// Whether the relationship type ends with the given suffix.
    pub fn is_type(&self, suffix: &str) -> bool {
        self.rel_type.ends_with(suffix)
    }

    /// Whether the target names a comment resource.
    pub fn targets_comments(&self) -> bool {
        !self.external && self.target.contains("comments")
    }
}

/// Parse the content of a relationship part.
pub fn parse_relationships(part: &str, xml: &str) -> Result<Vec<Relationship>> {
    let mut reader = reader(xml);
    let mut rels = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let Some(target) = attr(e, b"Target") else {
                    continue;
                };
                rels.push(Relationship {
                    id: attr(e, b"Id").unwrap_or_default(),
                    rel_type: attr(e, b"Type").unwrap_or_default(),
                    target,
                    external: attr(e, b"TargetMode").is_some_and(|m| m == "External"),
                });
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(part, e)),
            _ => {}
        }
    }

    Ok(rels)
}

/// Path of the relationship part belonging to `part`.
///
/// `ppt/slides/slide1.xml` → `ppt/slides/_rels/slide1.xml.rels`
pub fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the directory of its source part.
///
/// A leading `/` makes the target package-absolute. `.` and `..` segments
/// are collapsed; `..` never climbs above the package root.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    let relative = match target.strip_prefix('/') {
        Some(absolute) => absolute,
        None => {
            if let Some((dir, _)) = source_part.rsplit_once('/') {
                segments.extend(dir.split('/').filter(|s| !s.is_empty()));
            }
            target
        }
    };

    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    segments.join("/")
}

/// The first internal relationship in `rels` whose type ends with `suffix`,
/// resolved against `part`.
pub fn find_related(part: &str, rels: &[Relationship], suffix: &str) -> Option<String> {
    rels.iter()
        .find(|r| !r.external && r.is_type(suffix))
        .map(|r| resolve_target(part, &r.target))
}

/// File name component of a target path.
pub fn file_name(target: &str) -> &str {
    target.rsplit('/').next().unwrap_or(target)
}
