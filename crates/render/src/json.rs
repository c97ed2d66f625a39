//! JSON output of the raw extraction.

use crate::Renderer;
use std::io::Write;
use xtract_core::{Error, Extraction, Result};

/// Serializes the extraction, warnings included, as pretty-printed JSON.
#[derive(Debug, Clone, Default)]
pub struct JsonRenderer;

impl JsonRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for JsonRenderer {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn render(&self, extraction: &Extraction, out: &mut dyn Write) -> Result<()> {
        serde_json::to_writer_pretty(&mut *out, extraction)
            .map_err(|e| Error::Render(format!("Failed to serialize JSON: {}", e)))?;
        out.write_all(b"\n")?;
        Ok(())
    }
}
