//! Entity builder — turns the ordered directives of one file into entities.
//!
//! Every `@code` opens a new entity. Directives after it, up to the next
//! `@code` or the end of the block, attach to it; directives before the first
//! `@code` of a block attach to that first entity. Blocks without any `@code`
//! are ordinary comments and are skipped.

use crate::config::Config;
use crate::directive::{self, Attribute};
use crate::error::{DirectiveError, IssueKind, ValidationIssue};
use crate::model::{DocEntity, EntityKind, Example, Location};
use crate::source::SourceFile;
use crate::tag::{Arity, Tag, TagName};
use crate::tokenizer::TagDirective;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

/// Entities and file-local issues of one source file, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileExtraction {
    pub path: PathBuf,
    pub entities: Vec<DocEntity>,
    pub issues: Vec<ValidationIssue>,
}

pub struct EntityBuilder<'a> {
    file: &'a SourceFile,
    config: &'a Config,
    entities: Vec<DocEntity>,
    issues: Vec<ValidationIssue>,
}

impl<'a> EntityBuilder<'a> {
    pub fn new(file: &'a SourceFile, config: &'a Config) -> Self {
        EntityBuilder {
            file,
            config,
            entities: Vec::new(),
            issues: Vec::new(),
        }
    }

    /// Consume the directives of one comment block.
    pub fn push_block(&mut self, directives: &[TagDirective]) {
        let Some(first) = directives.iter().position(|d| d.is(Tag::Code)) else {
            return;
        };

        let mut draft = Draft::open(&directives[first]);
        for directive in &directives[..first] {
            self.apply(&mut draft, directive);
        }

        for directive in &directives[first + 1..] {
            if directive.is(Tag::Code) {
                let mut next = Draft::open(directive);
                if !directive.blank_before {
                    let message = format!(
                        "@code directly follows `{}` in the same comment; starting a new entity",
                        draft.display_name()
                    );
                    next.issues.push(
                        ValidationIssue::warning(IssueKind::NestedEntity, message)
                            .at(self.location(directive.line)),
                    );
                }
                self.close(std::mem::replace(&mut draft, next));
                continue;
            }
            self.apply(&mut draft, directive);
        }
        self.close(draft);
    }

    /// Record an issue that belongs to this file.
    pub fn report(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn finish(self) -> FileExtraction {
        FileExtraction {
            path: self.file.path().to_path_buf(),
            entities: self.entities,
            issues: self.issues,
        }
    }

    fn location(&self, line: usize) -> Location {
        Location::new(self.file.path(), line)
    }

    fn apply(&mut self, draft: &mut Draft, directive: &TagDirective) {
        let tag = match directive.tag {
            TagName::Known(tag) => tag,
            TagName::Unknown(ref raw) => {
                if self.config.warn_unknown_tags && directive.tag.in_code_namespace() {
                    let message = format!("unknown tag @{}", raw);
                    draft.issues.push(
                        ValidationIssue::warning(IssueKind::UnknownTag, message)
                            .at(self.location(directive.line)),
                    );
                }
                return;
            }
        };

        if tag.spec().arity == Arity::Singleton {
            if let Some(&first_line) = draft.seen.get(&tag) {
                let err = DirectiveError::DuplicateTag {
                    tag: tag.name().to_string(),
                    first_line,
                };
                draft
                    .issues
                    .push(ValidationIssue::from_directive(&err, self.location(directive.line)));
                return;
            }
        }

        let attribute = match directive::parse(directive) {
            Ok(attribute) => attribute,
            Err(err) => {
                draft
                    .issues
                    .push(ValidationIssue::from_directive(&err, self.location(directive.line)));
                return;
            }
        };

        if let Err(err) = draft.apply(attribute) {
            draft
                .issues
                .push(ValidationIssue::from_directive(&err, self.location(directive.line)));
            return;
        }
        draft.seen.insert(tag, directive.line);
    }

    fn close(&mut self, draft: Draft) {
        let location = self.location(draft.line);
        match draft.finish(self.file, location) {
            Ok((entity, issues)) => {
                debug!(
                    "{}:{}: built {} {}",
                    self.file.path().display(),
                    entity.location.line,
                    entity.kind,
                    entity.name
                );
                self.issues.extend(issues);
                self.entities.push(entity);
            }
            Err(issues) => self.issues.extend(issues),
        }
    }
}

/// An entity under construction.
struct Draft {
    line: usize,
    code_kind: Option<EntityKind>,
    code_name: Option<String>,
    kind: Option<EntityKind>,
    name: Option<String>,
    lang: Option<String>,
    examples: Vec<(String, Option<String>, String)>,
    entity: DocEntity,
    /// Singleton tags already applied, with their line.
    seen: HashMap<Tag, usize>,
    issues: Vec<ValidationIssue>,
}

impl Draft {
    fn open(code: &TagDirective) -> Self {
        let (code_kind, code_name) = match directive::parse(code) {
            Ok(Attribute::Code { kind, name }) => (kind, name),
            _ => (None, None),
        };
        Draft {
            line: code.line,
            code_kind,
            code_name,
            kind: None,
            name: None,
            lang: None,
            examples: Vec::new(),
            entity: DocEntity::new(
                EntityKind::Function,
                String::new(),
                String::new(),
                Location::new("", code.line),
            ),
            seen: HashMap::new(),
            issues: Vec::new(),
        }
    }

    fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.code_name.as_deref())
            .unwrap_or("<unnamed>")
    }

    fn apply(&mut self, attribute: Attribute) -> Result<(), DirectiveError> {
        let e = &mut self.entity;
        match attribute {
            // Only the opening directive carries these; a stray one is ignored.
            Attribute::Code { .. } => {}
            Attribute::Name(name) => self.name = Some(name),
            Attribute::Group(group) => e.group = group,
            Attribute::Kind(kind) => self.kind = Some(kind),
            Attribute::Lang(lang) => self.lang = Some(lang),
            Attribute::Platforms(platforms) => e.platforms.extend(platforms),
            Attribute::Description(text) => e.description = Some(text),
            Attribute::Version(text) => e.version = Some(text),
            Attribute::Since(text) => e.since = Some(text),
            Attribute::Access(text) => e.access = Some(text),
            Attribute::Signature(text) => e.signature = Some(text),
            Attribute::Param(param) => e.params.push(param),
            Attribute::Return(ret) => e.returns.push(ret),
            Attribute::Throws(throws) => e.throws.push(throws),
            Attribute::Generic(generic) => {
                if e.declares_generic(&generic.name) {
                    return Err(DirectiveError::invalid(
                        Tag::Generic.name(),
                        format!("placeholder `{}` is declared twice", generic.name),
                    ));
                }
                e.generics.push(generic);
            }
            Attribute::Example {
                title,
                language,
                body,
            } => self.examples.push((title, language, body)),
            Attribute::See(see) => e.see.push(see),
            Attribute::Deprecated(message) => e.deprecated = Some(message),
            Attribute::Async(flag) => e.is_async = flag,
            Attribute::Static(flag) => e.is_static = flag,
            Attribute::Annotation(text) => e.annotations.push(text),
        }
        Ok(())
    }

    /// Resolve name, kind and languages. A nameless draft is dropped and only
    /// its issues come back.
    fn finish(
        self,
        file: &SourceFile,
        location: Location,
    ) -> Result<(DocEntity, Vec<ValidationIssue>), Vec<ValidationIssue>> {
        let Draft {
            code_kind,
            code_name,
            kind,
            name,
            lang,
            examples,
            mut entity,
            mut issues,
            ..
        } = self;

        if let (Some(explicit), Some(inline)) = (&name, &code_name) {
            if explicit != inline {
                issues.push(
                    ValidationIssue::warning(
                        IssueKind::NameMismatch,
                        format!("@codeName `{}` overrides `{}` given on @code", explicit, inline),
                    )
                    .at(location.clone()),
                );
            }
        }
        if let (Some(explicit), Some(inline)) = (&kind, &code_kind) {
            if explicit != inline {
                issues.push(
                    ValidationIssue::warning(
                        IssueKind::KindMismatch,
                        format!("@codeType `{}` overrides `{}` given on @code", explicit, inline),
                    )
                    .at(location.clone()),
                );
            }
        }

        let Some(name) = name.or(code_name) else {
            issues.push(
                ValidationIssue::from_directive(
                    &DirectiveError::invalid(Tag::Code.name(), "entity has no name"),
                    location,
                ),
            );
            return Err(issues);
        };

        let language = lang.unwrap_or_else(|| file.language().to_string());
        entity.name = name;
        entity.kind = kind.or(code_kind).unwrap_or(EntityKind::Function);
        entity.examples = examples
            .into_iter()
            .map(|(title, example_lang, body)| Example {
                title,
                language: example_lang.unwrap_or_else(|| language.clone()),
                body,
            })
            .collect();
        entity.language = language;
        entity.location = location;

        let entity_ref = entity.entity_ref();
        let issues = issues
            .into_iter()
            .map(|issue| issue.for_entity(entity_ref.clone()))
            .collect();
        Ok((entity, issues))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize_text;

    fn build_with(config: &Config, blocks: &[&str]) -> FileExtraction {
        let file = SourceFile::new("src/server.go", "go", "");
        let mut builder = EntityBuilder::new(&file, config);
        for block in blocks {
            builder.push_block(&tokenize_text(block, Some("*"), 1));
        }
        builder.finish()
    }

    fn build(blocks: &[&str]) -> FileExtraction {
        build_with(&Config::default(), blocks)
    }

    fn kinds(out: &FileExtraction) -> Vec<IssueKind> {
        out.issues.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn struct_with_group_and_example() {
        let out = build(&[concat!(
            " * @code {struct} Server\n",
            " * @codeGroup HTTP\n",
            " * @codeDescription HTTP server\n",
            " * @codeExample Creating a Server\n",
            " * server := NewServer(cfg)\n",
        )]);
        assert!(out.issues.is_empty(), "{:?}", out.issues);
        let e = &out.entities[0];
        assert_eq!(e.kind, EntityKind::Struct);
        assert_eq!(e.name, "Server");
        assert_eq!(e.group, "HTTP");
        assert_eq!(e.language, "go");
        assert_eq!(e.examples[0].language, "go");
        assert_eq!(e.examples[0].body, "server := NewServer(cfg)");
        assert_eq!(e.location, Location::new("src/server.go", 1));
    }

    #[test]
    fn second_singleton_is_duplicate_and_first_wins() {
        let out = build(&[" * @code HashPassword\n * @codeName HashPassword\n * @codeName Hash\n"]);
        assert_eq!(out.entities.len(), 1);
        assert_eq!(out.entities[0].name, "HashPassword");
        assert_eq!(out.entities[0].kind, EntityKind::Function);
        assert_eq!(kinds(&out), vec![IssueKind::DuplicateTag]);
        let issue = &out.issues[0];
        assert_eq!(issue.location.as_ref().map(|l| l.line), Some(3));
        assert_eq!(issue.entity.as_ref().map(|r| r.name.as_str()), Some("HashPassword"));
    }

    #[test]
    fn leading_directives_attach_to_first_entity() {
        let out = build(&[" * @codeGroup Utils\n * @code Hash\n"]);
        assert_eq!(out.entities[0].group, "Utils");
    }

    #[test]
    fn block_without_code_is_skipped() {
        let out = build(&[" * @param x ignored\n * @codeGroup Orphan\n"]);
        assert!(out.entities.is_empty());
        assert!(out.issues.is_empty());
    }

    #[test]
    fn each_code_opens_an_entity() {
        let out = build(&[" * @code A\n * @codeGroup G\n *\n * @code B\n * @code C\n"]);
        let names: Vec<_> = out.entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);
        assert_eq!(out.entities[0].group, "G");
        assert_eq!(out.entities[1].group, "");
        assert_eq!(kinds(&out), vec![IssueKind::NestedEntity]);
        assert_eq!(out.issues[0].entity.as_ref().map(|r| r.name.as_str()), Some("C"));
    }

    #[test]
    fn nameless_entity_is_dropped() {
        let out = build(&[" * @code {struct}\n * @codeGroup G\n"]);
        assert!(out.entities.is_empty());
        assert_eq!(kinds(&out), vec![IssueKind::InvalidDirective]);
        assert!(out.issues[0].is_error());
    }

    #[test]
    fn explicit_name_and_kind_win() {
        let out = build(&[" * @code {function} Fetch\n * @codeName fetch\n * @codeType method\n"]);
        let e = &out.entities[0];
        assert_eq!(e.name, "fetch");
        assert_eq!(e.kind, EntityKind::Method);
        assert_eq!(kinds(&out), vec![IssueKind::NameMismatch, IssueKind::KindMismatch]);
    }

    #[test]
    fn unknown_code_tags_warn_when_enabled() {
        let blocks = [" * @code f\n * @codeFoo bar\n * @param x plain jsdoc\n"];
        assert_eq!(kinds(&build(&blocks)), vec![IssueKind::UnknownTag]);

        let quiet = Config {
            warn_unknown_tags: false,
            ..Config::default()
        };
        assert!(build_with(&quiet, &blocks).issues.is_empty());
    }

    #[test]
    fn example_language_falls_back_to_code_lang() {
        let out = build(&[concat!(
            " * @code render\n",
            " * @codeLang TypeScript\n",
            " * @codeExample Basic\n",
            " * render(x)\n",
            " * @codeExample {bash} From the shell\n",
            " * app render\n",
        )]);
        let e = &out.entities[0];
        assert_eq!(e.language, "typescript");
        assert_eq!(e.examples[0].language, "typescript");
        assert_eq!(e.examples[1].language, "bash");
    }

    #[test]
    fn invalid_directive_keeps_entity() {
        let out = build(&[" * @code f\n * @codeParam x missing type\n * @codeParam {int} y ok\n"]);
        assert_eq!(out.entities[0].params.len(), 1);
        assert_eq!(kinds(&out), vec![IssueKind::InvalidDirective]);
    }

    #[test]
    fn repeated_generic_is_invalid() {
        let out = build(&[" * @code Pool\n * @codeGeneric {T} a\n * @codeGeneric {T: Clone} b\n"]);
        assert_eq!(out.entities[0].generics.len(), 1);
        assert_eq!(kinds(&out), vec![IssueKind::InvalidDirective]);
    }
}
