//! Core domain types, errors and text normalization for presentation
//! content extraction.

pub mod error;
pub mod normalize;
pub mod types;

pub use error::{Error, Result};
pub use normalize::{compose_body_text, normalize_run};
pub use types::{
    Comment, Extraction, ShapeText, SlideRecord, Warning, WarningKind, UNKNOWN_AUTHOR,
};
