//! Renderers turning an [`Extraction`] into portable documents.
//!
//! Every renderer receives the extraction by shared reference and writes a
//! complete document to the given writer.

pub mod docx;
pub mod json;
pub mod markdown;
pub mod rtf;

pub use docx::DocxRenderer;
pub use json::JsonRenderer;
pub use markdown::MarkdownRenderer;
pub use rtf::RtfRenderer;

use std::fmt;
use std::io::Write;
use std::str::FromStr;
use xtract_core::{Error, Extraction, Result};

/// Title placed at the top of rendered documents.
pub const DOCUMENT_TITLE: &str = "Presentation Content";

/// A backend that writes an extraction in one output format.
pub trait Renderer {
    /// File extension of the produced documents, without the dot.
    fn extension(&self) -> &'static str;

    /// Write the whole document.
    fn render(&self, extraction: &Extraction, out: &mut dyn Write) -> Result<()>;

    /// Render into a byte buffer.
    fn render_to_vec(&self, extraction: &Extraction) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.render(extraction, &mut buf)?;
        Ok(buf)
    }
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Word document.
    #[default]
    Docx,
    /// Markdown text.
    Markdown,
    /// Rich Text Format.
    Rtf,
    /// JSON dump of the extraction.
    Json,
}

impl OutputFormat {
    /// File extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Markdown => "md",
            Self::Rtf => "rtf",
            Self::Json => "json",
        }
    }

    /// Build the renderer for this format.
    ///
    /// `wrap_width` only affects Markdown; `0` disables wrapping.
    pub fn renderer(self, wrap_width: usize) -> Box<dyn Renderer> {
        match self {
            Self::Docx => Box::new(DocxRenderer::new()),
            Self::Markdown => Box::new(MarkdownRenderer::new().with_wrap_width(wrap_width)),
            Self::Rtf => Box::new(RtfRenderer::new()),
            Self::Json => Box::new(JsonRenderer::new()),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "docx" => Ok(Self::Docx),
            "md" | "markdown" => Ok(Self::Markdown),
            "rtf" => Ok(Self::Rtf),
            "json" => Ok(Self::Json),
            other => Err(Error::Render(format!("Unsupported output format: {}", other))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Split body text into blocks (separated by blank lines), each a list of
/// lines.
pub(crate) fn blocks(body_text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in body_text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

/// Comments to print for a slide: none when comments were not requested.
pub(crate) fn visible_comments<'a>(
    extraction: &Extraction,
    slide: &'a xtract_core::SlideRecord,
) -> &'a [xtract_core::Comment] {
    if extraction.include_comments {
        &slide.comments
    } else {
        &[]
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use xtract_core::{Comment, SlideRecord};

    /// Two slides: one with comments, one empty.
    pub(crate) fn sample() -> Extraction {
        let mut extraction = Extraction::new(true);
        extraction.add_slide(
            SlideRecord::new(1, "Title\n\nLine one\nLine two").with_comments(vec![
                Comment::new(Some("Alice"), "Looks good"),
                Comment::new(None, "Fix typo"),
            ]),
        );
        extraction.add_slide(SlideRecord::new(2, ""));
        extraction
    }

    #[test]
    fn test_blocks() {
        assert_eq!(
            blocks("Title\n\nLine one\nLine two\n\n\nEnd"),
            vec![vec!["Title"], vec!["Line one", "Line two"], vec!["End"]]
        );
        assert!(blocks("").is_empty());
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("DOCX".parse::<OutputFormat>().unwrap(), OutputFormat::Docx);
        assert!("pdf".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Docx);
    }

    #[test]
    fn test_renderer_extensions_match_format() {
        for format in [
            OutputFormat::Docx,
            OutputFormat::Markdown,
            OutputFormat::Rtf,
            OutputFormat::Json,
        ] {
            assert_eq!(format.renderer(0).extension(), format.extension());
        }
    }
}
