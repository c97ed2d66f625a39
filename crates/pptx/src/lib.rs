//! PPTX (Office Open XML) backend for presentation content extraction.
//!
//! Reads .pptx files, which are ZIP archives of XML parts linked by
//! relationship parts, into the renderer-neutral [`xtract_core::Extraction`].

pub mod comments;
pub mod extractor;
pub mod package;
pub mod rels;
pub mod slide;
mod xml;

#[cfg(test)]
mod fixture;

pub use comments::CommentResolver;
pub use extractor::PptxExtractor;
pub use package::PptxPackage;
pub use slide::SlideExtractor;
