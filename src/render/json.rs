//! JSON renderer — the model, issues and skip count, for tooling.

use crate::render::Renderer;
use anyhow::{Context, Result};
use codedoc::Extraction;

pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, out: &Extraction) -> Result<String> {
        let mut json = serde_json::to_string_pretty(out).context("failed to serialize model")?;
        json.push('\n');
        Ok(json)
    }
}
