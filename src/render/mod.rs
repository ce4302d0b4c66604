//! Renderer module — trait-based format dispatch for the driver.

pub mod annotations;
pub mod json;
pub mod text;

use anyhow::{anyhow, Result};
use codedoc::Extraction;

/// Turns an extraction into one output document.
pub trait Renderer {
    fn render(&self, out: &Extraction) -> Result<String>;
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str) -> Result<Box<dyn Renderer>> {
    match format {
        "json" => Ok(Box::new(json::JsonRenderer)),
        "text" => Ok(Box::new(text::TextRenderer)),
        "annotations" => Ok(Box::new(annotations::AnnotationRenderer)),
        _ => Err(anyhow!(
            "unknown format: {}. Use json, text, or annotations",
            format
        )),
    }
}
