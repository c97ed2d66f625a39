//! Domain types for representing extracted presentation content.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author name used when a comment carries no resolvable author.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// The result of one extraction run, handed to exactly one renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    /// Slides in presentation order, numbered `1..=N`.
    pub slides: Vec<SlideRecord>,

    /// Whether comment extraction was requested for this run.
    pub include_comments: bool,

    /// Non-fatal problems met while extracting.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}

impl Extraction {
    /// Create an empty extraction.
    pub fn new(include_comments: bool) -> Self {
        Self {
            slides: Vec::new(),
            include_comments,
            warnings: Vec::new(),
        }
    }

    /// Append the next slide.
    pub fn add_slide(&mut self, slide: SlideRecord) {
        debug_assert_eq!(slide.slide_number, self.slides.len() + 1);
        self.slides.push(slide);
    }

    /// Record a warning.
    pub fn add_warning(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    /// Number of slides.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }
}

/// Extracted content of a single slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideRecord {
    /// 1-based slide number.
    pub slide_number: usize,

    /// Ordered, normalized text of the slide, speaker notes last.
    pub body_text: String,

    /// Reviewer comments in source order.
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl SlideRecord {
    /// Create a record without comments.
    pub fn new(slide_number: usize, body_text: impl Into<String>) -> Self {
        Self {
            slide_number,
            body_text: body_text.into(),
            comments: Vec::new(),
        }
    }

    /// Attach comments to this record.
    pub fn with_comments(mut self, comments: Vec<Comment>) -> Self {
        self.comments = comments;
        self
    }
}

/// A reviewer comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Display name of the author.
    pub author: String,

    /// Comment body.
    pub text: String,
}

impl Comment {
    /// Create a comment. An empty author falls back to [`UNKNOWN_AUTHOR`].
    pub fn new(author: Option<&str>, text: impl Into<String>) -> Self {
        let author = match author.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => UNKNOWN_AUTHOR.to_string(),
        };
        Self {
            author,
            text: text.into(),
        }
    }
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.author, self.text)
    }
}

/// Category of a non-fatal extraction problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// An expected part is absent from the package.
    MissingPart,
    /// A part exists but could not be parsed.
    MalformedPart,
}

/// A non-fatal problem reported on the diagnostics side channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// Slide the problem belongs to, if any.
    pub slide_number: Option<usize>,

    /// Category of the problem.
    pub kind: WarningKind,

    /// Human-readable description.
    pub message: String,
}

impl Warning {
    pub fn new(slide_number: Option<usize>, kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            slide_number,
            kind,
            message: message.into(),
        }
    }

    /// Turn a part-level error into a warning, prefixed with what was being
    /// attempted.
    pub fn from_error(slide_number: Option<usize>, context: &str, err: &Error) -> Self {
        let kind = match err {
            Error::MissingPart(_) => WarningKind::MissingPart,
            _ => WarningKind::MalformedPart,
        };
        Self::new(slide_number, kind, format!("{}: {}", context, err))
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slide_number {
            Some(n) => write!(f, "slide {}: {}", n, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Text content of one text-bearing shape, before reading order is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeText {
    /// Paragraph texts in document order, empty paragraphs included.
    pub paragraphs: Vec<String>,

    /// Vertical offset in EMU, in slide coordinates. None if unknown.
    pub y: Option<i64>,
}

impl ShapeText {
    /// Create a shape with the given paragraphs and position.
    pub fn new(paragraphs: Vec<String>, y: Option<i64>) -> Self {
        Self { paragraphs, y }
    }

    /// Paragraphs that carry text.
    pub fn non_empty_paragraphs(&self) -> impl Iterator<Item = &str> {
        self.paragraphs
            .iter()
            .map(String::as_str)
            .filter(|p| !p.is_empty())
    }
}

/// Sort shapes top-to-bottom.
///
/// Shapes without a known position sort as `y = 0`. The sort is stable, so
/// shapes at the same height keep their document order.
pub fn sort_by_position(shapes: &mut [ShapeText]) {
    shapes.sort_by_key(|s| s.y.unwrap_or(0));
}
