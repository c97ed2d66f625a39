//! Markdown output.
//!
//! Each slide becomes a `## Slide N` section. Lines inside a text block are
//! kept apart with Markdown hard breaks (two trailing spaces).

use crate::{blocks, visible_comments, Renderer, DOCUMENT_TITLE};
use std::io::Write;
use xtract_core::{Extraction, Result};

/// Renders an extraction as Markdown.
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    /// Maximum line width for body text, `0` for no wrapping.
    wrap_width: usize,
}

impl MarkdownRenderer {
    /// Create a renderer that does not wrap text.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap body lines at the given width. `0` disables wrapping.
    pub fn with_wrap_width(mut self, width: usize) -> Self {
        self.wrap_width = width;
        self
    }

    /// Render the whole document to a string.
    pub fn render_string(&self, extraction: &Extraction) -> String {
        let mut md = format!("# {}\n\n", DOCUMENT_TITLE);

        for slide in &extraction.slides {
            md.push_str(&format!("## Slide {}\n\n", slide.slide_number));

            for block in blocks(&slide.body_text) {
                let lines: Vec<String> = block.iter().map(|line| self.wrap(line)).collect();
                md.push_str(&lines.join("  \n"));
                md.push_str("\n\n");
            }

            let comments = visible_comments(extraction, slide);
            if !comments.is_empty() {
                md.push_str("### Comments\n\n");
                for comment in comments {
                    md.push_str(&format!("* {}\n", comment.to_string().replace('\n', " ")));
                }
                md.push('\n');
            }

            md.push_str("---\n\n");
        }

        md
    }

    /// Word-wrap one line; wrapped pieces are joined with soft line breaks.
    fn wrap(&self, line: &str) -> String {
        if self.wrap_width == 0 || line.chars().count() <= self.wrap_width {
            return line.to_string();
        }

        let mut out: Vec<String> = Vec::new();
        let mut current = String::new();
        for word in line.split_whitespace() {
            let needed = if current.is_empty() {
                word.chars().count()
            } else {
                current.chars().count() + 1 + word.chars().count()
            };
            if needed > self.wrap_width && !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            out.push(current);
        }
        out.join("\n")
    }
}

impl Renderer for MarkdownRenderer {
    fn extension(&self) -> &'static str {
        "md"
    }

    fn render(&self, extraction: &Extraction, out: &mut dyn Write) -> Result<()> {
        out.write_all(self.render_string(extraction).as_bytes())?;
        Ok(())
    }
}
