//! Annotation renderer — canonical `@code` blocks, re-extractable.

use crate::render::Renderer;
use anyhow::Result;
use codedoc::emit::render_model;
use codedoc::Extraction;

pub struct AnnotationRenderer;

impl Renderer for AnnotationRenderer {
    fn render(&self, out: &Extraction) -> Result<String> {
        Ok(render_model(&out.model))
    }
}
