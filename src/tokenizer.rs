//! Tag tokenizer — splits one comment block into ordered `@tag` directives.
//!
//! A line whose text (after comment markup is stripped) starts with `@word`
//! opens a directive; everything up to the next directive belongs to it.
//!
//! `@codeExample` bodies are verbatim. Inside one, only a line at the block's
//! marker indent (the indent of its first directive) naming a `@code…` tag
//! ends the example; deeper lines and `@Decorator` lines stay in the body.

use crate::locator::{CommentBlock, CommentStyle};
use crate::tag::{Bracket, Tag, TagName};
use regex::Regex;
use std::sync::LazyLock;

static RE_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([A-Za-z_][A-Za-z0-9_]*)(?:[\s{]|$)").unwrap());

/// One `@tag …` unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDirective {
    pub tag: TagName,
    /// Contents of `{…}` right after the tag name.
    pub type_annotation: Option<String>,
    /// Leading identifier, for tags whose grammar takes one. Bracketed
    /// optional forms are kept raw: `[port=5432]`.
    pub identifier: Option<String>,
    /// Rest of the directive line, then each continuation line after a `\n`.
    /// Example bodies keep their indentation relative to the marker indent.
    pub body: String,
    /// 1-based source line of the `@`.
    pub line: usize,
    pub indent: usize,
    /// A blank comment line directly precedes this directive.
    pub blank_before: bool,
}

impl TagDirective {
    pub fn is(&self, tag: Tag) -> bool {
        self.tag == TagName::Known(tag)
    }

    /// Text on the directive's own line, after the head.
    pub fn head_text(&self) -> &str {
        self.body.split('\n').next().unwrap_or("")
    }
}

/// Tokenize a located comment block.
///
/// In a block comment, an escaped terminator (`*\/` for `*/`) reads back as
/// the terminator itself.
pub fn tokenize(block: &CommentBlock<'_>) -> Vec<TagDirective> {
    let mut directives = tokenize_text(block.text, block.style.line_prefix(), block.first_line());
    if let CommentStyle::Block { end, .. } = block.style {
        let escaped = escape_terminator(end);
        if escaped != *end {
            for d in &mut directives {
                unescape(&mut d.body, &escaped, end);
                if let Some(ref mut ty) = d.type_annotation {
                    unescape(ty, &escaped, end);
                }
                if let Some(ref mut ident) = d.identifier {
                    unescape(ident, &escaped, end);
                }
            }
        }
    }
    directives
}

/// Escaped form of a block terminator: a backslash before its last
/// character, so `*/` becomes `*\/`.
pub(crate) fn escape_terminator(end: &str) -> String {
    match end.char_indices().next_back() {
        Some((idx, _)) if idx > 0 => format!("{}\\{}", &end[..idx], &end[idx..]),
        _ => end.to_string(),
    }
}

fn unescape(text: &mut String, escaped: &str, end: &str) {
    if text.contains(escaped) {
        *text = text.replace(escaped, end);
    }
}

/// Tokenize raw comment text whose first line is `first_line`, stripping
/// `line_prefix` (e.g. `*` or `#`) from each line.
pub fn tokenize_text(
    text: &str,
    line_prefix: Option<&str>,
    first_line: usize,
) -> Vec<TagDirective> {
    let lines = strip_markup(text, line_prefix);

    let mut out = Vec::new();
    let mut current: Option<Pending> = None;
    let mut marker_indent: Option<usize> = None;
    let mut prev_blank = false;

    for (i, line) in lines.iter().enumerate() {
        let number = first_line + i;
        let content = line.trim_start();
        let indent = line.len() - content.len();

        if let Some(caps) = RE_DIRECTIVE.captures(content) {
            let name = caps.get(1).map_or("", |m| m.as_str());
            let tag = TagName::parse(name);
            let in_example = current.as_ref().is_some_and(Pending::is_example);
            let opens = !in_example
                || (indent <= marker_indent.unwrap_or(0) && tag.in_code_namespace());
            if opens {
                if let Some(done) = current.take() {
                    out.push(done.finish());
                }
                marker_indent.get_or_insert(indent);
                let rest = &content[1 + name.len()..];
                current = Some(Pending::open(tag, rest, number, indent, prev_blank));
                prev_blank = false;
                continue;
            }
        }

        if let Some(ref mut pending) = current {
            pending.push_line(line, marker_indent.unwrap_or(0));
        }
        prev_blank = content.is_empty();
    }

    if let Some(done) = current.take() {
        out.push(done.finish());
    }
    out
}

struct Pending {
    tag: TagName,
    type_annotation: Option<String>,
    identifier: Option<String>,
    first: String,
    rest: Vec<String>,
    line: usize,
    indent: usize,
    blank_before: bool,
}

impl Pending {
    fn open(tag: TagName, rest: &str, line: usize, indent: usize, blank_before: bool) -> Self {
        let spec = tag.known().map(Tag::spec);
        let takes_bracket = spec.map_or(true, |s| s.bracket != Bracket::None);
        let takes_identifier = spec.is_some_and(|s| s.identifier);

        let mut rest = rest.trim_start();
        let mut type_annotation = None;
        if takes_bracket && rest.starts_with('{') {
            if let Some((inner, after)) = split_balanced(rest, '{', '}') {
                type_annotation = Some(inner.trim().to_string());
                rest = after.trim_start();
            }
        }

        let mut identifier = None;
        if takes_identifier && !rest.is_empty() {
            let bracketed = if rest.starts_with('[') {
                split_balanced(rest, '[', ']')
                    .map(|(inner, after)| (format!("[{}]", inner.trim()), after))
            } else {
                None
            };
            let (ident, after) = bracketed.unwrap_or_else(|| {
                let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
                (rest[..end].to_string(), &rest[end..])
            });
            identifier = Some(ident);
            rest = after.trim_start();
        }

        Pending {
            tag,
            type_annotation,
            identifier,
            first: rest.trim_end().to_string(),
            rest: Vec::new(),
            line,
            indent,
            blank_before,
        }
    }

    fn is_example(&self) -> bool {
        self.tag == TagName::Known(Tag::Example)
    }

    fn push_line(&mut self, line: &str, marker_indent: usize) {
        let text = if self.is_example() {
            strip_indent(line, marker_indent).trim_end()
        } else {
            line.trim()
        };
        self.rest.push(text.to_string());
    }

    fn finish(mut self) -> TagDirective {
        while self.rest.last().is_some_and(|l| l.is_empty()) {
            self.rest.pop();
        }
        let body = if self.rest.is_empty() {
            self.first
        } else {
            format!("{}\n{}", self.first, self.rest.join("\n"))
        };
        TagDirective {
            tag: self.tag,
            type_annotation: self.type_annotation,
            identifier: self.identifier,
            body,
            line: self.line,
            indent: self.indent,
            blank_before: self.blank_before,
        }
    }
}

/// Strip per-line comment markup.
///
/// With a prefix, each line loses leading whitespace, the prefix and one
/// space. Lines without the prefix, or blocks where no line carries it, are
/// unindented by their common leading whitespace instead.
fn strip_markup(text: &str, prefix: Option<&str>) -> Vec<String> {
    let raw: Vec<&str> = text.split('\n').map(|l| l.trim_end_matches('\r')).collect();

    let prefixed = prefix.filter(|p| {
        raw.iter()
            .skip(1)
            .any(|l| l.trim_start().starts_with(*p))
            || raw.first().is_some_and(|l| l.trim_start().starts_with(*p))
    });

    let common = raw
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .filter(|l| prefixed.map_or(true, |p| !l.trim_start().starts_with(p)))
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    raw.iter()
        .enumerate()
        .map(|(i, line)| {
            let trimmed = line.trim_start();
            if let Some(rest) = prefixed.and_then(|p| trimmed.strip_prefix(p)) {
                return rest.strip_prefix(' ').unwrap_or(rest).to_string();
            }
            if i == 0 {
                return trimmed.to_string();
            }
            strip_indent(line, common).to_string()
        })
        .collect()
}

/// Remove up to `n` leading whitespace characters.
fn strip_indent(line: &str, n: usize) -> &str {
    let mut cut = 0;
    for (count, (idx, ch)) in line.char_indices().enumerate() {
        if count == n || !ch.is_whitespace() {
            return &line[idx..];
        }
        cut = idx + ch.len_utf8();
    }
    &line[cut..]
}

/// Split `{inner}after` on the brace matching the first one.
pub(crate) fn split_balanced(s: &str, open: char, close: char) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (idx, ch) in s.char_indices() {
        if ch == open {
            depth += 1;
        } else if ch == close {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some((&s[open.len_utf8()..idx], &s[idx + close.len_utf8()..]));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn star(text: &str) -> Vec<TagDirective> {
        tokenize_text(text, Some("*"), 1)
    }

    #[test]
    fn splits_directives_with_bracket_and_body() {
        let d = star("\n * @code {struct} Server\n * @codeGroup HTTP\n ");
        assert_eq!(d.len(), 2);
        assert!(d[0].is(Tag::Code));
        assert_eq!(d[0].type_annotation.as_deref(), Some("struct"));
        assert_eq!(d[0].body, "Server");
        assert_eq!(d[0].line, 2);
        assert!(d[1].is(Tag::Group));
        assert_eq!(d[1].body, "HTTP");
        assert_eq!(d[1].line, 3);
    }

    #[test]
    fn param_identifier_is_split_off() {
        let d = star(" * @codeParam {context.Context} ctx Request context for cancellation");
        assert_eq!(d[0].type_annotation.as_deref(), Some("context.Context"));
        assert_eq!(d[0].identifier.as_deref(), Some("ctx"));
        assert_eq!(d[0].body, "Request context for cancellation");
    }

    #[test]
    fn optional_param_keeps_brackets() {
        let d = tokenize_text("@codeParam {int} [port=5432] Database port", None, 1);
        assert_eq!(d[0].identifier.as_deref(), Some("[port=5432]"));
        assert_eq!(d[0].body, "Database port");
    }

    #[test]
    fn return_has_no_identifier() {
        let d = star(" * @codeReturn {string, error} The hashed password or error");
        assert_eq!(d[0].type_annotation.as_deref(), Some("string, error"));
        assert_eq!(d[0].identifier, None);
        assert_eq!(d[0].body, "The hashed password or error");
    }

    #[test]
    fn nested_braces_in_type() {
        let d = star(" * @codeReturn {Map<String, {a: T}>} the map");
        assert_eq!(d[0].type_annotation.as_deref(), Some("Map<String, {a: T}>"));
        assert_eq!(d[0].body, "the map");
    }

    #[test]
    fn unterminated_bracket_stays_in_body() {
        let d = star(" * @codeThrows {ErrTimeout When it times out");
        assert_eq!(d[0].type_annotation, None);
        assert_eq!(d[0].body, "{ErrTimeout When it times out");
    }

    #[test]
    fn multi_line_description_accumulates() {
        let d = star(" * @codeDescription First line\n *   second line\n *\n * @codeVersion 1.0.0");
        assert_eq!(d[0].body, "First line\nsecond line");
        assert!(d[1].blank_before);
        assert!(!d[0].blank_before);
    }

    #[test]
    fn example_body_is_verbatim_with_relative_indent() {
        let text = concat!(
            "\n * @codeExample Creating a Server\n",
            " * server := NewServer(Config{\n",
            " *     Port: 8080,\n",
            " * })\n ",
        );
        let d = star(text);
        assert_eq!(d.len(), 1);
        assert_eq!(
            d[0].body,
            "Creating a Server\nserver := NewServer(Config{\n    Port: 8080,\n})"
        );
    }

    #[test]
    fn example_keeps_deeper_at_lines() {
        let text = concat!(
            " * @codeExample Overriding\n",
            " * class A {\n",
            " *     @Override\n",
            " *     @codeName notADirective\n",
            " *     void run() {}\n",
            " * }\n",
            " * @codeVersion 2.0\n",
        );
        let d = star(text);
        assert_eq!(d.len(), 2);
        assert!(d[0].body.contains("    @Override"));
        assert!(d[0].body.contains("    @codeName notADirective"));
        assert!(d[1].is(Tag::Version));
        assert_eq!(d[1].body, "2.0");
    }

    #[test]
    fn example_keeps_decorators_at_marker_indent() {
        let text = concat!(
            "@codeExample Using a dataclass\n",
            "@dataclass\n",
            "class Point:\n",
            "    x: int\n",
            "@codeAccess public\n",
        );
        let d = tokenize_text(text, None, 1);
        assert_eq!(d.len(), 2);
        assert_eq!(d[0].body, "Using a dataclass\n@dataclass\nclass Point:\n    x: int");
        assert!(d[1].is(Tag::Access));
    }

    #[test]
    fn unknown_tags_are_retained() {
        let d = star(" * @param x the x\n * @codeFoo bar");
        assert_eq!(d.len(), 2);
        assert_eq!(d[0].tag, TagName::Unknown("param".to_string()));
        assert_eq!(d[1].tag, TagName::Unknown("codeFoo".to_string()));
    }

    #[test]
    fn decorator_with_arguments_is_text() {
        let d = star(" * @codeAnnotation @Cacheable(\"users\")\n * @Table(name = \"users\")");
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].body, "@Cacheable(\"users\")\n@Table(name = \"users\")");
    }

    #[test]
    fn docstring_is_unindented() {
        let text = "\n    @code {class} Processor\n    @codeGroup Data\n    ";
        let d = tokenize_text(text, None, 10);
        assert_eq!(d.len(), 2);
        assert_eq!(d[0].indent, 0);
        assert_eq!(d[0].line, 11);
        assert_eq!(d[1].body, "Data");
    }

    #[test]
    fn hash_comments_strip_marker() {
        let d = tokenize_text("# @code f\n# @codeGroup Shell", Some("#"), 1);
        assert_eq!(d.len(), 2);
        assert_eq!(d[0].body, "f");
        assert_eq!(d[1].body, "Shell");
    }

    #[test]
    fn text_before_first_directive_is_ignored() {
        let d = star(" * Plain prose.\n * @code f");
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].line, 2);
    }

    #[test]
    fn escaped_terminator_reads_back() {
        assert_eq!(escape_terminator("*/"), "*\\/");
        assert_eq!(escape_terminator("]]"), "]\\]");
        assert_eq!(escape_terminator("#"), "#");

        let table = crate::locator::DelimiterTable::builtin();
        let file = crate::source::SourceFile::new(
            "a.go",
            "go",
            "/**\n * @code f\n * @codeDescription ends with *\\/ here\n */\n",
        );
        let block = crate::locator::Locator::new(&file, table.styles_for("go"))
            .next()
            .unwrap()
            .unwrap();
        let d = tokenize(&block);
        assert_eq!(d[1].body, "ends with */ here");
    }

    #[test]
    fn balanced_split() {
        assert_eq!(split_balanced("{a{b}c} rest", '{', '}'), Some(("a{b}c", " rest")));
        assert_eq!(split_balanced("{open", '{', '}'), None);
    }
}
