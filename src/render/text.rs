//! Text renderer — one lint-style line per issue, then a summary.

use crate::render::Renderer;
use anyhow::Result;
use codedoc::{Extraction, Severity};
use std::fmt::Write;

pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(&self, out: &Extraction) -> Result<String> {
        let mut text = String::new();
        for issue in &out.issues {
            writeln!(text, "{}", issue)?;
        }
        write!(
            text,
            "{} entities in {} groups, {} errors, {} warnings",
            out.model.len(),
            out.model.groups().count(),
            out.count(Severity::Error),
            out.count(Severity::Warning)
        )?;
        if out.skipped > 0 {
            write!(text, ", {} files skipped", out.skipped)?;
        }
        text.push('\n');
        Ok(text)
    }
}
