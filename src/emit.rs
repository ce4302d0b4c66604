//! Annotation emitter — writes entities back as canonical `/** … */` blocks.
//!
//! Re-extracting the output gives back the same attribute values. Languages
//! are always written explicitly, so the host file's language does not matter.
//! A `*/` inside any value is written as `*\/`, which the tokenizer reads back.

use crate::model::{DocEntity, DocumentationModel};
use crate::tokenizer::escape_terminator;
use std::fmt::Write;

const TERMINATOR: &str = "*/";

/// One entity as a canonical annotation block.
pub fn render_block(entity: &DocEntity) -> String {
    let mut out = String::from("/**\n");
    let mut tag = |head: String, body: &str| push_directive(&mut out, &head, body);

    tag(format!("@code {{{}}}", entity.kind), &entity.name);
    if !entity.group.is_empty() {
        tag("@codeGroup".into(), &entity.group);
    }
    tag("@codeLang".into(), &entity.language);
    if !entity.platforms.is_empty() {
        tag("@codePlatform".into(), &entity.platforms.join(", "));
    }
    let scalars = [
        ("@codeDescription", &entity.description),
        ("@codeVersion", &entity.version),
        ("@codeSince", &entity.since),
        ("@codeAccess", &entity.access),
        ("@codeSignature", &entity.signature),
        ("@codeDeprecated", &entity.deprecated),
    ];
    for (name, value) in scalars {
        if let Some(value) = value {
            tag(name.into(), value);
        }
    }
    if entity.is_async {
        tag("@codeAsync".into(), "");
    }
    if entity.is_static {
        tag("@codeStatic".into(), "");
    }
    for annotation in &entity.annotations {
        tag("@codeAnnotation".into(), annotation);
    }
    for g in &entity.generics {
        let decl = match g.constraint {
            Some(ref c) => format!("{}: {}", g.name, c),
            None => g.name.clone(),
        };
        tag(format!("@codeGeneric {{{}}}", decl), &g.description);
    }
    for p in &entity.params {
        let name = match (p.optional, &p.default) {
            (true, Some(default)) => format!("[{}={}]", p.name, default),
            (true, None) => format!("[{}]", p.name),
            (false, _) => p.name.clone(),
        };
        tag(format!("@codeParam {{{}}} {}", p.ty, name), &p.description);
    }
    for r in &entity.returns {
        tag(format!("@codeReturn {{{}}}", r.ty), &r.description);
    }
    for t in &entity.throws {
        tag(format!("@codeThrows {{{}}}", t.name), &t.condition);
    }
    for s in &entity.see {
        tag("@codeSee".into(), &format!("{} {}", s.reference, s.description));
    }
    for ex in &entity.examples {
        tag(
            format!("@codeExample {{{}}}", ex.language),
            &format!("{}\n{}", ex.title, ex.body),
        );
    }

    out.push_str(" */\n");
    out
}

/// Every entity of the model, in declaration order, one block each.
pub fn render_model(model: &DocumentationModel) -> String {
    let mut out = String::new();
    for (idx, entity) in model.entities().iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(&render_block(entity));
    }
    out
}

fn push_directive(out: &mut String, head: &str, body: &str) {
    let escaped = escape_terminator(TERMINATOR);
    let head = head.replace(TERMINATOR, &escaped);
    let body = body.replace(TERMINATOR, &escaped);
    let mut lines = body.split('\n');
    let first = lines.next().unwrap_or("").trim_end();
    if first.is_empty() {
        let _ = writeln!(out, " * {}", head);
    } else {
        let _ = writeln!(out, " * {} {}", head, first);
    }
    for line in lines {
        if line.is_empty() {
            out.push_str(" *\n");
        } else {
            let _ = writeln!(out, " * {}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityKind, Example, Generic, Location, Param};
    use crate::pipeline::Engine;
    use crate::source::SourceFile;

    fn sample() -> DocEntity {
        let mut e = DocEntity::new(EntityKind::Method, "Fetch", "kotlin", Location::new("a.kt", 1));
        e.group = "Network".to_string();
        e.description = Some("Fetches a page.\n\nRetries on timeout.".to_string());
        e.is_async = true;
        e.generics = vec![Generic {
            name: "T".to_string(),
            constraint: Some("Any".to_string()),
            description: "Payload".to_string(),
        }];
        e.params = vec![
            Param {
                name: "url".to_string(),
                ty: "String".to_string(),
                description: "Target".to_string(),
                optional: false,
                default: None,
            },
            Param {
                name: "retries".to_string(),
                ty: "Int".to_string(),
                description: String::new(),
                optional: true,
                default: Some("3".to_string()),
            },
        ];
        e.examples = vec![Example {
            title: "Basic".to_string(),
            language: "kotlin".to_string(),
            body: "val page = fetch<Page>(url)\nif (page != null) {\n    show(page)\n}".to_string(),
        }];
        e
    }

    #[test]
    fn closing_delimiter_in_values_is_escaped() {
        let mut e = sample();
        e.description = Some("Strips /* comments */ from input.".to_string());
        e.examples[0].language = "python".to_string();
        e.examples[0].body = "x = 1  # a */ b\n/* c */".to_string();

        let text = render_block(&e);
        assert_eq!(text.matches("*/").count(), 1);
        assert!(text.contains(" * x = 1  # a *\\/ b\n * /* c *\\/\n"));

        let out = Engine::default().extract(&[SourceFile::new("b.go", "go", text)]);
        assert!(out.issues.is_empty(), "{:?}", out.issues);
        let mut back = out.model.entities()[0].clone();
        back.location = e.location.clone();
        assert_eq!(back, e);
    }

    #[test]
    fn block_layout() {
        let text = render_block(&sample());
        assert!(text.starts_with("/**\n * @code {method} Fetch\n * @codeGroup Network\n"));
        assert!(text.contains(" * @codeParam {Int} [retries=3]\n"));
        assert!(text.contains(" * @codeExample {kotlin} Basic\n * val page"));
        assert!(text.contains(" *     show(page)\n"));
        assert!(text.ends_with(" */\n"));
    }

    #[test]
    fn rendered_block_extracts_to_the_same_entity() {
        let original = sample();
        let file = SourceFile::new("b.go", "go", render_block(&original));
        let out = Engine::default().extract(&[file]);
        assert!(out.issues.is_empty(), "{:?}", out.issues);

        let mut back = out.model.entities()[0].clone();
        back.location = original.location.clone();
        assert_eq!(back, original);
    }
}
