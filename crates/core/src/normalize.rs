//! Text normalization and body-text composition.
//!
//! Run text is normalized to NFC with XML-illegal control characters removed.
//! Shapes are put into reading order and joined into the final `body_text`.

use crate::types::{sort_by_position, ShapeText};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use unicode_normalization::{is_nfc_quick, IsNormalized, UnicodeNormalization};

/// Control characters that are not allowed in XML 1.0 output.
static CONTROL_CHARS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]").unwrap());

/// Header placed in front of speaker notes in the body text.
pub const SPEAKER_NOTES_HEADER: &str = "--- Speaker Notes ---";

/// Marker joining paragraphs inside one shape.
pub const LINE_BREAK: &str = "\n";

/// Separator between shapes (and between the body and the notes).
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// Normalize the text of a single run.
///
/// - Composes to Unicode NFC
/// - Removes control characters other than tab, line feed and carriage return
/// - Leaves all other whitespace untouched
pub fn normalize_run(text: &str) -> Cow<'_, str> {
    let stripped = CONTROL_CHARS_REGEX.replace_all(text, "");
    if is_nfc_quick(stripped.chars()) == IsNormalized::Yes {
        return stripped;
    }
    Cow::Owned(stripped.nfc().collect())
}

/// Join the non-empty paragraphs of a shape with [`LINE_BREAK`].
pub fn shape_text(shape: &ShapeText) -> String {
    shape
        .non_empty_paragraphs()
        .collect::<Vec<_>>()
        .join(LINE_BREAK)
}

/// Build the final body text of a slide.
///
/// Shapes are sorted top-to-bottom (stable), each shape's paragraphs are
/// joined, shapes without text are dropped and the rest are separated by a
/// blank line. Non-blank `notes` are appended last under
/// [`SPEAKER_NOTES_HEADER`]. The result is trimmed.
pub fn compose_body_text(mut shapes: Vec<ShapeText>, notes: Option<&str>) -> String {
    sort_by_position(&mut shapes);

    let mut parts: Vec<String> = shapes
        .iter()
        .map(shape_text)
        .filter(|t| !t.is_empty())
        .collect();

    if let Some(notes) = notes.filter(|n| !n.trim().is_empty()) {
        parts.push(format!("{}\n{}", SPEAKER_NOTES_HEADER, notes));
    }

    parts.join(BLOCK_SEPARATOR).trim().to_string()
}
