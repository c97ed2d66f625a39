//! Error types for presentation content extraction.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during extraction or rendering.
///
/// Only [`Error::Io`] and [`Error::Format`] abort an extraction run. The
/// other variants are raised by individual parts and are turned into
/// warnings by the extractor.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open, read or write a file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// The input cannot be opened as a presentation package (corrupt ZIP,
    /// wrong file type).
    #[error("Invalid presentation package: {0}")]
    Format(String),

    /// A part could not be decoded or parsed as XML.
    #[error("XML parsing error: {0}")]
    Xml(String),

    /// A part referenced by the package is absent from the archive.
    #[error("Missing part: {0}")]
    MissingPart(String),

    /// An output document could not be produced.
    #[error("Render error: {0}")]
    Render(String),
}
