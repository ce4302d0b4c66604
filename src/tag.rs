//! The `@code*` tag vocabulary and its per-tag grammar.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    Code,
    Name,
    Group,
    Type,
    Lang,
    Platform,
    Description,
    Version,
    Since,
    Access,
    Signature,
    Param,
    Return,
    Throws,
    Generic,
    Example,
    See,
    Deprecated,
    Async,
    Static,
    Annotation,
}

/// How often a tag may appear within one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Starts a new entity.
    Opens,
    /// At most once; a second occurrence is a `DuplicateTag`.
    Singleton,
    /// Accumulates.
    Repeatable,
}

/// Whether a `{…}` annotation follows the tag name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bracket {
    None,
    Optional,
    Required,
}

#[derive(Debug)]
pub struct TagSpec {
    pub tag: Tag,
    pub name: &'static str,
    pub arity: Arity,
    pub bracket: Bracket,
    /// A bare identifier (or `[name]` / `[name=default]`) follows the bracket.
    pub identifier: bool,
}

const fn spec(
    tag: Tag,
    name: &'static str,
    arity: Arity,
    bracket: Bracket,
    identifier: bool,
) -> TagSpec {
    TagSpec {
        tag,
        name,
        arity,
        bracket,
        identifier,
    }
}

use Arity::{Opens, Repeatable, Singleton};

pub static TAGS: &[TagSpec] = &[
    spec(Tag::Code, "code", Opens, Bracket::Optional, false),
    spec(Tag::Name, "codeName", Singleton, Bracket::None, false),
    spec(Tag::Group, "codeGroup", Singleton, Bracket::None, false),
    spec(Tag::Type, "codeType", Singleton, Bracket::None, false),
    spec(Tag::Lang, "codeLang", Singleton, Bracket::None, false),
    spec(Tag::Platform, "codePlatform", Repeatable, Bracket::None, false),
    spec(Tag::Description, "codeDescription", Singleton, Bracket::None, false),
    spec(Tag::Version, "codeVersion", Singleton, Bracket::None, false),
    spec(Tag::Since, "codeSince", Singleton, Bracket::None, false),
    spec(Tag::Access, "codeAccess", Singleton, Bracket::None, false),
    spec(Tag::Signature, "codeSignature", Singleton, Bracket::None, false),
    spec(Tag::Param, "codeParam", Repeatable, Bracket::Required, true),
    spec(Tag::Return, "codeReturn", Repeatable, Bracket::Required, false),
    spec(Tag::Throws, "codeThrows", Repeatable, Bracket::Required, false),
    spec(Tag::Generic, "codeGeneric", Repeatable, Bracket::Optional, false),
    spec(Tag::Example, "codeExample", Repeatable, Bracket::Optional, false),
    spec(Tag::See, "codeSee", Repeatable, Bracket::None, false),
    spec(Tag::Deprecated, "codeDeprecated", Singleton, Bracket::None, false),
    spec(Tag::Async, "codeAsync", Singleton, Bracket::None, false),
    spec(Tag::Static, "codeStatic", Singleton, Bracket::None, false),
    spec(Tag::Annotation, "codeAnnotation", Repeatable, Bracket::None, false),
];

impl Tag {
    /// Look up a tag by name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Tag> {
        TAGS.iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
            .map(|s| s.tag)
    }

    pub fn spec(self) -> &'static TagSpec {
        // TAGS is ordered like the enum.
        &TAGS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A directive's tag: one of ours, or anything else written as `@word`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagName {
    Known(Tag),
    Unknown(String),
}

impl TagName {
    pub fn parse(raw: &str) -> Self {
        match Tag::from_name(raw) {
            Some(tag) => TagName::Known(tag),
            None => TagName::Unknown(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TagName::Known(tag) => tag.name(),
            TagName::Unknown(raw) => raw,
        }
    }

    pub fn known(&self) -> Option<Tag> {
        match self {
            TagName::Known(tag) => Some(*tag),
            TagName::Unknown(_) => None,
        }
    }

    /// Belongs to the `@code…` namespace, recognized or not.
    pub fn in_code_namespace(&self) -> bool {
        match self {
            TagName::Known(_) => true,
            TagName::Unknown(raw) => raw
                .get(..4)
                .is_some_and(|p| p.eq_ignore_ascii_case("code")),
        }
    }
}
