//! Directive parser — interprets one [`TagDirective`] against the tag grammar.
//!
//! Failures are returned as values so the caller can collect them and keep
//! going with the rest of the block.

use crate::error::DirectiveError;
use crate::model::{EntityKind, Generic, Param, Return, SeeRef, Throws};
use crate::tag::{Tag, TagName};
use crate::tokenizer::TagDirective;
use regex::Regex;
use std::sync::LazyLock;

static RE_PARAM_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w$.*&]+$").unwrap());

static RE_GENERIC_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

static RE_PLATFORM_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,\s]+").unwrap());

const DEFAULT_EXAMPLE_TITLE: &str = "Example";
const DEFAULT_DEPRECATION: &str = "This element is deprecated";

/// Typed value of one directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
    /// `@code {kind} name` — opens an entity.
    Code {
        kind: Option<EntityKind>,
        name: Option<String>,
    },
    Name(String),
    Group(String),
    Kind(EntityKind),
    Lang(String),
    Platforms(Vec<String>),
    Description(String),
    Version(String),
    Since(String),
    Access(String),
    Signature(String),
    Param(Param),
    Return(Return),
    Throws(Throws),
    Generic(Generic),
    /// Language is resolved later against the entity and file.
    Example {
        title: String,
        language: Option<String>,
        body: String,
    },
    See(SeeRef),
    Deprecated(String),
    Async(bool),
    Static(bool),
    Annotation(String),
}

/// Parse a directive into its typed attribute.
pub fn parse(directive: &TagDirective) -> Result<Attribute, DirectiveError> {
    let tag = match directive.tag {
        TagName::Known(tag) => tag,
        TagName::Unknown(ref raw) => {
            return Err(DirectiveError::invalid(raw, "unknown tag"));
        }
    };

    match tag {
        Tag::Code => Ok(parse_code(directive)),
        Tag::Name => scalar(directive, tag).map(Attribute::Name),
        Tag::Group => scalar(directive, tag).map(Attribute::Group),
        Tag::Type => scalar(directive, tag).map(|s| Attribute::Kind(EntityKind::parse(&s))),
        Tag::Lang => scalar(directive, tag).map(|s| Attribute::Lang(s.to_lowercase())),
        Tag::Platform => {
            let text = scalar(directive, tag)?;
            Ok(Attribute::Platforms(
                RE_PLATFORM_SPLIT
                    .split(&text)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect(),
            ))
        }
        Tag::Description => scalar(directive, tag).map(Attribute::Description),
        Tag::Version => scalar(directive, tag).map(Attribute::Version),
        Tag::Since => scalar(directive, tag).map(Attribute::Since),
        Tag::Access => scalar(directive, tag).map(|s| Attribute::Access(s.to_lowercase())),
        Tag::Signature => scalar(directive, tag).map(Attribute::Signature),
        Tag::Param => parse_param(directive),
        Tag::Return => {
            let ty = required_type(directive, tag)?;
            Ok(Attribute::Return(Return {
                ty,
                description: directive.body.trim().to_string(),
            }))
        }
        Tag::Throws => {
            let name = required_type(directive, tag)?;
            Ok(Attribute::Throws(Throws {
                name,
                condition: directive.body.trim().to_string(),
            }))
        }
        Tag::Generic => parse_generic(directive),
        Tag::Example => parse_example(directive),
        Tag::See => {
            let text = scalar(directive, tag)?;
            let (reference, description) = match text.split_once(char::is_whitespace) {
                Some((r, d)) => (r.to_string(), d.trim().to_string()),
                None => (text, String::new()),
            };
            Ok(Attribute::See(SeeRef {
                reference,
                description,
            }))
        }
        Tag::Deprecated => {
            let message = directive.body.trim();
            Ok(Attribute::Deprecated(if message.is_empty() {
                DEFAULT_DEPRECATION.to_string()
            } else {
                message.to_string()
            }))
        }
        Tag::Async => Ok(Attribute::Async(flag(directive))),
        Tag::Static => Ok(Attribute::Static(flag(directive))),
        Tag::Annotation => scalar(directive, tag).map(Attribute::Annotation),
    }
}

fn parse_code(directive: &TagDirective) -> Attribute {
    let kind = directive
        .type_annotation
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(EntityKind::parse);
    let name = directive.head_text().trim();
    Attribute::Code {
        kind,
        name: (!name.is_empty()).then(|| name.to_string()),
    }
}

/// Body, trimmed, must not be empty.
fn scalar(directive: &TagDirective, tag: Tag) -> Result<String, DirectiveError> {
    let text = directive.body.trim();
    if text.is_empty() {
        return Err(DirectiveError::invalid(tag.name(), "missing value"));
    }
    Ok(text.to_string())
}

/// `true` unless the body says `false`.
fn flag(directive: &TagDirective) -> bool {
    !directive.body.trim().eq_ignore_ascii_case("false")
}

fn required_type(directive: &TagDirective, tag: Tag) -> Result<String, DirectiveError> {
    match directive.type_annotation.as_deref().map(str::trim) {
        Some(ty) if !ty.is_empty() => Ok(ty.to_string()),
        Some(_) => Err(DirectiveError::invalid(tag.name(), "empty {type} annotation")),
        None if directive.identifier.as_deref().is_some_and(|i| i.starts_with('{'))
            || directive.body.trim_start().starts_with('{') =>
        {
            Err(DirectiveError::invalid(tag.name(), "unterminated {type} annotation"))
        }
        None => Err(DirectiveError::invalid(tag.name(), "missing {type} annotation")),
    }
}

fn parse_param(directive: &TagDirective) -> Result<Attribute, DirectiveError> {
    let ty = required_type(directive, Tag::Param)?;
    let raw = directive
        .identifier
        .as_deref()
        .ok_or_else(|| DirectiveError::invalid(Tag::Param.name(), "missing parameter name"))?;

    let (optional, spec) = match raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        Some(inner) => (true, inner.trim()),
        None => (false, raw),
    };
    let (name, default) = match spec.split_once('=') {
        Some((n, d)) if optional => (n.trim(), Some(d.trim().to_string())),
        _ => (spec, None),
    };
    if !RE_PARAM_NAME.is_match(name) {
        return Err(DirectiveError::invalid(
            Tag::Param.name(),
            format!("`{}` is not a valid parameter name", name),
        ));
    }

    Ok(Attribute::Param(Param {
        name: name.to_string(),
        ty,
        description: directive.body.trim().to_string(),
        optional,
        default,
    }))
}

fn parse_generic(directive: &TagDirective) -> Result<Attribute, DirectiveError> {
    let tag = Tag::Generic;
    let (decl, description) = match directive.type_annotation.as_deref() {
        Some(decl) => (decl.trim().to_string(), directive.body.trim().to_string()),
        None => {
            let text = scalar(directive, tag)?;
            match text.split_once(char::is_whitespace) {
                Some((d, rest)) => (d.to_string(), rest.trim().to_string()),
                None => (text, String::new()),
            }
        }
    };

    let (name, constraint) = match decl.split_once(':') {
        Some((n, c)) => (n.trim().to_string(), Some(c.trim().to_string())),
        None => (decl.clone(), None),
    };
    if !RE_GENERIC_NAME.is_match(&name) {
        return Err(DirectiveError::invalid(
            tag.name(),
            format!("`{}` is not a valid placeholder name", decl),
        ));
    }

    Ok(Attribute::Generic(Generic {
        name,
        constraint: constraint.filter(|c| !c.is_empty()),
        description,
    }))
}

fn parse_example(directive: &TagDirective) -> Result<Attribute, DirectiveError> {
    let language = directive
        .type_annotation
        .as_deref()
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty());

    let (head, rest) = match directive.body.split_once('\n') {
        Some((h, r)) => (h.trim(), r),
        None => (directive.body.trim(), ""),
    };

    let (title, body) = if head.is_empty() {
        (DEFAULT_EXAMPLE_TITLE.to_string(), rest.to_string())
    } else if looks_like_code(head) {
        (DEFAULT_EXAMPLE_TITLE.to_string(), directive.body.trim_start().to_string())
    } else {
        (head.to_string(), rest.to_string())
    };

    if body.trim().is_empty() {
        return Err(DirectiveError::invalid(Tag::Example.name(), "example has no body"));
    }

    Ok(Attribute::Example {
        title,
        language,
        body,
    })
}

/// Whether an example's first line is code rather than a title.
pub fn looks_like_code(line: &str) -> bool {
    const CODE_CHARS: &[char] = &['(', '{', '=', ';'];
    const CODE_PREFIXES: &[&str] = &[
        "//", "#", "val ", "let ", "var ", "const ", "def ", "func ", "fun ", "fn ",
    ];
    line.contains(CODE_CHARS)
        || CODE_PREFIXES.iter().any(|p| line.starts_with(p))
        || line.chars().count() >= 50
}
