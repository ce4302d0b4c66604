//! Error and issue types.
//!
//! Every problem the engine finds is accumulated, never thrown: a malformed
//! comment stops only its own file, a bad directive only itself. Callers get
//! one flat list of [`ValidationIssue`]s alongside the model.

use crate::model::{EntityRef, Location};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A comment block that opens but never closes before end of file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}:{line}: comment opened with `{opener}` is never closed", .path.display())]
pub struct MalformedBlock {
    pub path: PathBuf,
    /// Line of the opening delimiter (1-based).
    pub line: usize,
    pub opener: String,
}

/// A single directive that violates the tag grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveError {
    #[error("invalid @{tag}: {reason}")]
    Invalid { tag: String, reason: String },

    /// A singleton tag seen a second time in one entity. Attributed to the
    /// second occurrence; the first value is kept.
    #[error("duplicate @{tag} (first declared on line {first_line})")]
    DuplicateTag { tag: String, first_line: usize },
}

impl DirectiveError {
    pub fn invalid(tag: &str, reason: impl Into<String>) -> Self {
        DirectiveError::Invalid {
            tag: tag.to_string(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> IssueKind {
        match self {
            DirectiveError::Invalid { .. } => IssueKind::InvalidDirective,
            DirectiveError::DuplicateTag { .. } => IssueKind::DuplicateTag,
        }
    }
}

/// Configuration could not be loaded or is inconsistent.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("language `{language}`: {reason}")]
    Language { language: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// What an issue is about. Stable kebab-case names are used in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    MalformedBlock,
    InvalidDirective,
    DuplicateTag,
    UnknownTag,
    NestedEntity,
    NameMismatch,
    KindMismatch,
    DuplicateSymbol,
    DuplicateParam,
    DuplicateThrows,
    UndeclaredGeneric,
    InheritedGeneric,
    MissingContract,
    SignatureMismatch,
    UnresolvedReference,
}

impl IssueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueKind::MalformedBlock => "malformed-block",
            IssueKind::InvalidDirective => "invalid-directive",
            IssueKind::DuplicateTag => "duplicate-tag",
            IssueKind::UnknownTag => "unknown-tag",
            IssueKind::NestedEntity => "nested-entity",
            IssueKind::NameMismatch => "name-mismatch",
            IssueKind::KindMismatch => "kind-mismatch",
            IssueKind::DuplicateSymbol => "duplicate-symbol",
            IssueKind::DuplicateParam => "duplicate-param",
            IssueKind::DuplicateThrows => "duplicate-throws",
            IssueKind::UndeclaredGeneric => "undeclared-generic",
            IssueKind::InheritedGeneric => "inherited-generic",
            IssueKind::MissingContract => "missing-contract",
            IssueKind::SignatureMismatch => "signature-mismatch",
            IssueKind::UnresolvedReference => "unresolved-reference",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported problem, file-local or batch-global.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub kind: IssueKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<EntityRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub message: String,
}

impl ValidationIssue {
    pub fn error(kind: IssueKind, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, kind, message)
    }

    pub fn warning(kind: IssueKind, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, kind, message)
    }

    fn new(severity: Severity, kind: IssueKind, message: impl Into<String>) -> Self {
        ValidationIssue {
            severity,
            kind,
            entity: None,
            location: None,
            message: message.into(),
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn for_entity(mut self, entity: EntityRef) -> Self {
        self.entity = Some(entity);
        self
    }

    /// Wrap a directive error found at `location`.
    pub fn from_directive(err: &DirectiveError, location: Location) -> Self {
        ValidationIssue::error(err.kind(), err.to_string()).at(location)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl From<MalformedBlock> for ValidationIssue {
    fn from(err: MalformedBlock) -> Self {
        let location = Location::new(err.path.clone(), err.line);
        ValidationIssue::error(
            IssueKind::MalformedBlock,
            format!("comment opened with `{}` is never closed", err.opener),
        )
        .at(location)
    }
}

/// Lint-style rendering: `path:line: severity[kind]: message`.
impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref loc) = self.location {
            write!(f, "{}:{}: ", loc.path.display(), loc.line)?;
        }
        write!(f, "{}[{}]: ", self.severity, self.kind)?;
        if let Some(ref entity) = self.entity {
            write!(f, "{}: ", entity)?;
        }
        f.write_str(&self.message)
    }
}
