//! Read-only access to the parts of a PPTX package.

use crate::rels::{
    find_related, parse_relationships, rels_path_for, resolve_target, Relationship, REL_SLIDE,
};
use crate::xml::{decode_part, local_name, prefixed_attr, reader};
use quick_xml::events::Event;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use xtract_core::{Error, Result};
use zip::result::ZipError;
use zip::ZipArchive;

/// Main presentation part.
pub const PRESENTATION_PART: &str = "ppt/presentation.xml";

/// A PPTX package opened as a ZIP archive of named parts.
///
/// The archive is opened once and released when the package is dropped.
pub struct PptxPackage<R> {
    archive: ZipArchive<R>,
    names: HashSet<String>,
}

impl PptxPackage<BufReader<File>> {
    /// Open a package from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> PptxPackage<R> {
    /// Open a package from any seekable reader.
    ///
    /// Fails with [`Error::Format`] when the data is not a ZIP archive or
    /// does not contain a presentation part.
    pub fn from_reader(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader).map_err(|e| match e {
            ZipError::Io(io) => Error::Io(io),
            other => Error::Format(format!("Failed to open ZIP: {}", other)),
        })?;

        let names = archive.file_names().map(String::from).collect();
        let package = Self { archive, names };
        if !package.has_part(PRESENTATION_PART) {
            return Err(Error::Format(format!(
                "ZIP archive has no '{}' part",
                PRESENTATION_PART
            )));
        }
        Ok(package)
    }

    /// Whether a part with the given name exists.
    pub fn has_part(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Read a part as text.
    pub fn read_part(&mut self, name: &str) -> Result<String> {
        let mut file = self.archive.by_name(name).map_err(|e| match e {
            ZipError::FileNotFound => Error::MissingPart(name.to_string()),
            other => Error::Format(format!("Failed to read '{}': {}", name, other)),
        })?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        decode_part(name, bytes)
    }

    /// Relationships of a part. A part without a relationship part has none.
    pub fn relationships(&mut self, part: &str) -> Result<Vec<Relationship>> {
        let rels_path = rels_path_for(part);
        if !self.has_part(&rels_path) {
            return Ok(Vec::new());
        }
        let xml = self.read_part(&rels_path)?;
        parse_relationships(&rels_path, &xml)
    }

    /// The first internal relationship of `part` whose type ends with
    /// `suffix`, resolved to a part name.
    pub fn related_part(&mut self, part: &str, suffix: &str) -> Result<Option<String>> {
        let rels = self.relationships(part)?;
        Ok(find_related(part, &rels, suffix))
    }

    /// Slide part names in presentation order.
    ///
    /// Uses the slide id list of the presentation part; falls back to the
    /// numbering of the slide relationships, then to the slide parts found
    /// in the archive.
    pub fn slide_parts(&mut self) -> Result<Vec<String>> {
        let rels = match self.relationships(PRESENTATION_PART) {
            Ok(rels) => rels,
            Err(e) => {
                log::warn!("Ignoring unreadable presentation relationships: {}", e);
                Vec::new()
            }
        };
        let slide_rels: Vec<&Relationship> = rels
            .iter()
            .filter(|r| !r.external && r.is_type(REL_SLIDE))
            .collect();

        if !slide_rels.is_empty() {
            match self.slide_id_list() {
                Ok(ids) if !ids.is_empty() => {
                    let by_id: HashMap<&str, &Relationship> =
                        slide_rels.iter().map(|r| (r.id.as_str(), *r)).collect();
                    let parts: Vec<String> = ids
                        .iter()
                        .filter_map(|id| by_id.get(id.as_str()))
                        .map(|r| resolve_target(PRESENTATION_PART, &r.target))
                        .collect();
                    if !parts.is_empty() {
                        return Ok(parts);
                    }
                }
                Ok(_) => {}
                Err(e) => log::warn!("Ignoring unreadable slide id list: {}", e),
            }

            log::debug!("Ordering slides by relationship numbering");
            let mut ordered: Vec<(String, Option<usize>)> = slide_rels
                .iter()
                .map(|r| {
                    let n = trailing_number(&r.id).or_else(|| trailing_number(&r.target));
                    (resolve_target(PRESENTATION_PART, &r.target), n)
                })
                .collect();
            ordered.sort_by(|a, b| match (a.1, b.1) {
                (Some(na), Some(nb)) => na.cmp(&nb),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.0.cmp(&b.0),
            });
            return Ok(ordered.into_iter().map(|(path, _)| path).collect());
        }

        log::debug!("No slide relationships, scanning archive for slide parts");
        let mut found: Vec<(usize, String)> = self
            .names
            .iter()
            .filter_map(|name| {
                let file = name.strip_prefix("ppt/slides/")?;
                let n = file.strip_prefix("slide")?.strip_suffix(".xml")?.parse().ok()?;
                Some((n, name.to_string()))
            })
            .collect();
        found.sort();
        Ok(found.into_iter().map(|(_, name)| name).collect())
    }

    /// Relationship ids listed in `p:sldIdLst`, in order.
    fn slide_id_list(&mut self) -> Result<Vec<String>> {
        let xml = self.read_part(PRESENTATION_PART)?;
        let mut reader = reader(&xml);
        let mut ids = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if local_name(e.name().as_ref()) == b"sldId" =>
                {
                    if let Some(id) = prefixed_attr(e, b"id") {
                        ids.push(id);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(crate::xml::xml_error(PRESENTATION_PART, e)),
                _ => {}
            }
        }

        Ok(ids)
    }
}

/// Extract a trailing number from a string like "rId2" or "slides/slide3.xml".
fn trailing_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");
    let start = s
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    s[start..].parse().ok()
}
