//! Drives slide and comment extraction over a whole package.

use crate::comments::CommentResolver;
use crate::package::PptxPackage;
use crate::slide::SlideExtractor;
use std::io::{Read, Seek};
use std::path::Path;
use xtract_core::{Extraction, Result, SlideRecord, Warning};

/// Extracts slide text, speaker notes and comments from PPTX packages.
#[derive(Debug, Clone)]
pub struct PptxExtractor {
    /// Whether comments are resolved at all.
    include_comments: bool,
}

impl Default for PptxExtractor {
    fn default() -> Self {
        Self {
            include_comments: true,
        }
    }
}

impl PptxExtractor {
    /// Create an extractor that includes comments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether comments are extracted.
    pub fn with_comments(mut self, include: bool) -> Self {
        self.include_comments = include;
        self
    }

    /// Extract a package from a file path.
    ///
    /// Fails only when the file cannot be opened or is not a presentation
    /// package.
    pub fn extract_path(&self, path: impl AsRef<Path>) -> Result<Extraction> {
        let path = path.as_ref();
        log::debug!("Opening {}", path.display());
        let mut package = PptxPackage::open(path)?;
        self.extract_package(&mut package)
    }

    /// Extract a package from a seekable reader.
    pub fn extract<R: Read + Seek>(&self, reader: R) -> Result<Extraction> {
        let mut package = PptxPackage::from_reader(reader)?;
        self.extract_package(&mut package)
    }

    /// Extract every slide of an opened package, in presentation order.
    pub fn extract_package<R: Read + Seek>(
        &self,
        package: &mut PptxPackage<R>,
    ) -> Result<Extraction> {
        let slide_parts = package.slide_parts()?;
        log::debug!("Found {} slides", slide_parts.len());

        let mut extraction = Extraction::new(self.include_comments);
        let mut slides = SlideExtractor::new();
        let mut comments = CommentResolver::new();
        let mut warnings: Vec<Warning> = Vec::new();

        for (idx, slide_part) in slide_parts.iter().enumerate() {
            let slide_number = idx + 1;

            let rels = match package.relationships(slide_part) {
                Ok(rels) => rels,
                Err(e) => {
                    warnings.push(Warning::from_error(
                        Some(slide_number),
                        "Could not read slide relationships",
                        &e,
                    ));
                    Vec::new()
                }
            };

            let body_text = match slides.extract(
                package,
                slide_number,
                slide_part,
                &rels,
                &mut warnings,
            ) {
                Ok(text) => text,
                Err(e) => {
                    warnings.push(Warning::from_error(
                        Some(slide_number),
                        "Could not read slide",
                        &e,
                    ));
                    String::new()
                }
            };

            let mut record = SlideRecord::new(slide_number, body_text);
            if self.include_comments {
                let found = comments.resolve(package, slide_number, &rels, &mut warnings);
                record = record.with_comments(found);
            }
            extraction.add_slide(record);
        }

        for warning in warnings {
            log::warn!("{}", warning);
            extraction.add_warning(warning);
        }
        Ok(extraction)
    }
}
