//! Rich Text Format output.

use crate::{blocks, visible_comments, Renderer, DOCUMENT_TITLE};
use std::io::Write;
use xtract_core::{Extraction, Result};

const HEADER: &str = "{\\rtf1\\ansi\\ansicpg1252\\deff0{\\fonttbl{\\f0\\fswiss Helvetica;}}\\f0\\fs24\n";

/// Renders an extraction as RTF.
#[derive(Debug, Clone, Default)]
pub struct RtfRenderer;

impl RtfRenderer {
    /// Create an RTF renderer.
    pub fn new() -> Self {
        Self
    }

    /// Render the whole document to a string.
    pub fn render_string(&self, extraction: &Extraction) -> String {
        let mut rtf = String::from(HEADER);
        rtf.push_str(&format!("{{\\pard\\sa240\\b\\fs40 {}\\par}}\n", escape(DOCUMENT_TITLE)));

        for slide in &extraction.slides {
            rtf.push_str(&format!(
                "{{\\pard\\sa240\\b\\fs32 Slide {}\\par}}\n",
                slide.slide_number
            ));
            for block in blocks(&slide.body_text) {
                let lines: Vec<String> = block.iter().map(|l| escape(l)).collect();
                rtf.push_str(&format!("{{\\pard\\sa120 {}\\par}}\n", lines.join("\\line ")));
            }

            let comments = visible_comments(extraction, slide);
            if !comments.is_empty() {
                rtf.push_str("{\\pard\\sb120\\sa120\\b\\fs24 Comments\\par}\n");
                for comment in comments {
                    rtf.push_str(&format!("{{\\pard - {}\\par}}\n", escape(&comment.to_string())));
                }
            }

            rtf.push_str("{\\pard\\sb480\\sa480 ---\\par}\n");
        }

        rtf.push('}');
        rtf
    }
}

/// Escape text for an RTF body.
///
/// Control characters `\ { }` are backslash-escaped, line breaks become
/// `\line`, and non-ASCII characters are written as signed 16-bit `\uN?`
/// escapes (UTF-16 surrogate pairs above the BMP).
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '\n' => out.push_str("\\line "),
            '\t' => out.push_str("\\tab "),
            '\r' => {}
            c if c.is_ascii() => out.push(c),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{}?", *unit as i16));
                }
            }
        }
    }
    out
}

impl Renderer for RtfRenderer {
    fn extension(&self) -> &'static str {
        "rtf"
    }

    fn render(&self, extraction: &Extraction, out: &mut dyn Write) -> Result<()> {
        out.write_all(self.render_string(extraction).as_bytes())?;
        Ok(())
    }
}
