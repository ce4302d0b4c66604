//! codedoc — extract `@code` annotation blocks into a documentation model.
//!
//! The engine runs in five stages, each feeding the next:
//!
//! 1. **Locate** — find comment blocks using a per-language delimiter table ([`locator`])
//! 2. **Tokenize** — split each block into ordered `@tag` directives ([`tokenizer`])
//! 3. **Parse** — interpret directives against the tag grammar ([`directive`])
//! 4. **Build** — group directives into documented entities ([`builder`])
//! 5. **Validate** — cross-check the whole batch and build the model ([`validate`])
//!
//! Stages 1-4 run per file and in parallel; stage 5 runs once over the joined
//! results. Nothing is fatal: malformed comments, bad directives and
//! referential problems all come back as [`ValidationIssue`]s next to the
//! model, and the caller decides what fails a build.

pub mod builder;
pub mod config;
pub mod directive;
pub mod emit;
pub mod error;
pub mod locator;
pub mod model;
pub mod pipeline;
pub mod source;
pub mod tag;
pub mod tokenizer;
pub mod validate;

pub use config::Config;
pub use error::{ConfigError, DirectiveError, IssueKind, MalformedBlock, Severity, ValidationIssue};
pub use model::{DocEntity, DocGroup, DocumentationModel, EntityId, EntityKind, EntityRef};
pub use pipeline::{Engine, Extraction};
pub use source::SourceFile;

/// Run the whole pipeline over `files` with the default configuration.
pub fn extract(files: &[SourceFile]) -> Extraction {
    Engine::default().extract(files)
}
