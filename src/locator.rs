//! Comment locator — finds documentation comments by delimiter, not by grammar.
//!
//! Which delimiters a language uses is data ([`DelimiterTable`]), so adding a
//! language means adding a table entry. The scan is lexically naive: string
//! literals are not understood, and a block ends only at its own terminator.

use crate::error::{ConfigError, MalformedBlock};
use crate::source::SourceFile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::{Range, RangeInclusive};
use tracing::trace;

/// How one kind of comment is delimited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CommentStyle {
    /// `start … end`, optionally with a per-line continuation marker (`*`).
    /// When `nested` is set, each inner occurrence of that opener must be
    /// closed before the block ends.
    Block {
        start: String,
        end: String,
        #[serde(default)]
        continuation: Option<String>,
        #[serde(default)]
        nested: Option<String>,
    },
    /// Consecutive lines starting with `marker` form one block.
    Line { marker: String },
}

impl CommentStyle {
    pub fn block(start: &str, end: &str, continuation: Option<&str>) -> Self {
        CommentStyle::Block {
            start: start.to_string(),
            end: end.to_string(),
            continuation: continuation.map(str::to_string),
            nested: None,
        }
    }

    pub fn nested(start: &str, end: &str, opener: &str) -> Self {
        CommentStyle::Block {
            start: start.to_string(),
            end: end.to_string(),
            continuation: None,
            nested: Some(opener.to_string()),
        }
    }

    pub fn line(marker: &str) -> Self {
        CommentStyle::Line {
            marker: marker.to_string(),
        }
    }

    fn opener(&self) -> &str {
        match self {
            CommentStyle::Block { start, .. } => start,
            CommentStyle::Line { marker } => marker,
        }
    }

    /// Marker stripped from the start of every line inside the comment.
    pub fn line_prefix(&self) -> Option<&str> {
        match self {
            CommentStyle::Block { continuation, .. } => continuation.as_deref(),
            CommentStyle::Line { marker } => Some(marker),
        }
    }

    fn check(&self, language: &str) -> Result<(), ConfigError> {
        let empty = match self {
            CommentStyle::Block { start, end, .. } => start.is_empty() || end.is_empty(),
            CommentStyle::Line { marker } => marker.is_empty(),
        };
        if empty {
            return Err(ConfigError::Language {
                language: language.to_string(),
                reason: "comment delimiters must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Compact form of the built-in table.
enum Builtin {
    Block(&'static str, &'static str, Option<&'static str>),
    Nested(&'static str, &'static str, &'static str),
    Line(&'static str),
}

const C_FAMILY: &[&str] = &[
    "default", "c", "cpp", "csharp", "java", "groovy", "javascript", "typescript", "go", "rust",
    "kotlin", "swift", "php", "dart", "scala", "objc",
];

const HASH_FAMILY: &[&str] = &[
    "bash", "shell", "perl", "r", "elixir", "powershell", "yaml", "toml",
];

static BUILTIN: &[(&[&str], &[Builtin])] = &[
    (C_FAMILY, &[Builtin::Block("/**", "*/", Some("*"))]),
    (
        &["python"],
        &[
            Builtin::Block("\"\"\"", "\"\"\"", None),
            Builtin::Block("'''", "'''", None),
        ],
    ),
    (
        &["ruby"],
        &[Builtin::Block("=begin", "=end", None), Builtin::Line("#")],
    ),
    (HASH_FAMILY, &[Builtin::Line("#")]),
    (
        &["lua"],
        &[Builtin::Block("--[[", "]]", None), Builtin::Line("--")],
    ),
    (
        &["sql"],
        &[Builtin::Block("/**", "*/", Some("*")), Builtin::Line("--")],
    ),
    (&["haskell"], &[Builtin::Nested("{-", "-}", "{-")]),
    (&["ocaml"], &[Builtin::Nested("(**", "*)", "(*")]),
    (&["erlang"], &[Builtin::Line("%%")]),
];

/// Language tag → comment styles, with a `default` fallback entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DelimiterTable {
    languages: BTreeMap<String, Vec<CommentStyle>>,
}

impl DelimiterTable {
    pub const DEFAULT_LANGUAGE: &'static str = "default";

    pub fn builtin() -> Self {
        let mut table = DelimiterTable::default();
        for (languages, styles) in BUILTIN {
            let styles: Vec<CommentStyle> = styles
                .iter()
                .map(|s| match s {
                    Builtin::Block(start, end, cont) => CommentStyle::block(start, end, *cont),
                    Builtin::Nested(start, end, opener) => CommentStyle::nested(start, end, opener),
                    Builtin::Line(marker) => CommentStyle::line(marker),
                })
                .collect();
            for lang in *languages {
                table.languages.insert(lang.to_string(), styles.clone());
            }
        }
        table
    }

    /// Add or replace the styles for `language`.
    pub fn insert(&mut self, language: &str, styles: Vec<CommentStyle>) -> Result<(), ConfigError> {
        if styles.is_empty() {
            return Err(ConfigError::Language {
                language: language.to_string(),
                reason: "at least one comment style is required".to_string(),
            });
        }
        for style in &styles {
            style.check(language)?;
        }
        self.languages.insert(language.to_lowercase(), styles);
        Ok(())
    }

    /// Styles for `language`, or the default entry when it is unknown.
    pub fn styles_for(&self, language: &str) -> &[CommentStyle] {
        self.languages
            .get(language)
            .or_else(|| self.languages.get(Self::DEFAULT_LANGUAGE))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }
}

/// One raw comment found in a source file.
#[derive(Debug, Clone)]
pub struct CommentBlock<'a> {
    pub source: &'a SourceFile,
    pub style: &'a CommentStyle,
    /// Byte range of the whole comment, delimiters included.
    pub span: Range<usize>,
    /// 1-based lines the comment covers.
    pub lines: RangeInclusive<usize>,
    /// Body between the delimiters. For line comments, the raw lines with
    /// their markers still in place.
    pub text: &'a str,
}

impl CommentBlock<'_> {
    /// Line on which `text` begins.
    pub fn first_line(&self) -> usize {
        *self.lines.start()
    }
}

/// Lazy iterator over the comment blocks of one file, in source order.
///
/// Yields a [`MalformedBlock`] error and stops when a block never closes.
pub struct Locator<'a> {
    file: &'a SourceFile,
    styles: &'a [CommentStyle],
    pos: usize,
    line: usize,
    line_pos: usize,
    done: bool,
}

impl<'a> Locator<'a> {
    pub fn new(file: &'a SourceFile, styles: &'a [CommentStyle]) -> Self {
        Locator {
            file,
            styles,
            pos: 0,
            line: 1,
            line_pos: 0,
            done: styles.is_empty(),
        }
    }

    /// 1-based line of byte offset `off`. Offsets must not go backwards.
    fn line_at(&mut self, off: usize) -> usize {
        let text = self.file.text();
        self.line += text[self.line_pos..off].matches('\n').count();
        self.line_pos = off;
        self.line
    }

    /// Earliest opener at or after `self.pos`; ties go to the longer opener.
    fn next_opener(&self) -> Option<(usize, &'a CommentStyle)> {
        let text = self.file.text();
        let mut best: Option<(usize, &'a CommentStyle)> = None;
        for style in self.styles {
            let found = match style {
                CommentStyle::Block { start, .. } => {
                    text[self.pos..].find(start.as_str()).map(|i| self.pos + i)
                }
                CommentStyle::Line { marker } => find_line_marker(text, self.pos, marker),
            };
            let Some(off) = found else { continue };
            best = match best {
                Some((b, s))
                    if b < off || (b == off && s.opener().len() >= style.opener().len()) =>
                {
                    Some((b, s))
                }
                _ => Some((off, style)),
            };
        }
        best
    }

    fn close_block(
        &mut self,
        off: usize,
        style: &'a CommentStyle,
    ) -> Option<Result<CommentBlock<'a>, MalformedBlock>> {
        let CommentStyle::Block { start, end, nested, .. } = style else {
            return None;
        };
        let file = self.file;
        let text = file.text();
        let body_start = off + start.len();
        let search_from = body_start - overlap(start, end);
        let closing = match nested {
            Some(opener) => find_nested_end(text, search_from, opener, end),
            None => text[search_from..].find(end.as_str()).map(|i| search_from + i),
        };
        let first_line = self.line_at(off);
        let Some(end_off) = closing else {
            self.done = true;
            return Some(Err(MalformedBlock {
                path: self.file.path().to_path_buf(),
                line: first_line,
                opener: start.clone(),
            }));
        };
        let last_line = self.line_at(end_off);
        self.pos = end_off + end.len();
        Some(Ok(CommentBlock {
            source: self.file,
            style,
            span: off..self.pos,
            lines: first_line..=last_line,
            text: &text[body_start.min(end_off)..end_off],
        }))
    }

    fn collect_lines(
        &mut self,
        off: usize,
        style: &'a CommentStyle,
        marker: &str,
    ) -> CommentBlock<'a> {
        let file = self.file;
        let text = file.text();
        let start = text[..off].rfind('\n').map_or(0, |i| i + 1).max(self.pos);
        let mut end = start;
        let mut last_line_start = start;
        while end < text.len() {
            let line_end = text[end..].find('\n').map_or(text.len(), |i| end + i);
            if !text[end..line_end].trim_start().starts_with(marker) {
                break;
            }
            last_line_start = end;
            end = (line_end + 1).min(text.len());
        }
        let first_line = self.line_at(start);
        let last_line = self.line_at(last_line_start);
        self.pos = end;
        let body_end = text[..end].strip_suffix('\n').map_or(end, str::len);
        CommentBlock {
            source: self.file,
            style,
            span: start..end,
            lines: first_line..=last_line,
            text: &text[start..body_end],
        }
    }
}

impl<'a> Iterator for Locator<'a> {
    type Item = Result<CommentBlock<'a>, MalformedBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let Some((off, style)) = self.next_opener() else {
            self.done = true;
            return None;
        };
        let block = match style {
            CommentStyle::Block { .. } => self.close_block(off, style),
            CommentStyle::Line { marker } => Some(Ok(self.collect_lines(off, style, marker))),
        };
        if let Some(Ok(ref b)) = block {
            trace!(
                path = %self.file.path().display(),
                lines = ?b.lines,
                "comment block"
            );
        }
        block
    }
}

/// Offset of the first `marker` at or after `pos` that begins a line (after
/// optional whitespace).
fn find_line_marker(text: &str, pos: usize, marker: &str) -> Option<usize> {
    let mut line_start = pos;
    while line_start < text.len() {
        let line_end = text[line_start..].find('\n').map_or(text.len(), |i| line_start + i);
        let line = &text[line_start..line_end];
        let trimmed = line.trim_start();
        if trimmed.starts_with(marker) {
            return Some(line_start + (line.len() - trimmed.len()));
        }
        line_start = line_end + 1;
    }
    None
}

/// End offset for a nesting block comment, or `None` if it never balances.
fn find_nested_end(text: &str, from: usize, opener: &str, end: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = from;
    while i < text.len() {
        let rest = &text[i..];
        if rest.starts_with(end) {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
            i += end.len();
        } else if rest.starts_with(opener) {
            depth += 1;
            i += opener.len();
        } else {
            i += rest.chars().next().map_or(1, char::len_utf8);
        }
    }
    None
}

/// Length of the longest suffix of `start` that is a prefix of `end`, so
/// `/**/` closes immediately. Zero when the delimiters are identical.
fn overlap(start: &str, end: &str) -> usize {
    if start == end {
        return 0;
    }
    (1..start.len().min(end.len()))
        .rev()
        .find(|&n| {
            start.is_char_boundary(start.len() - n)
                && end.is_char_boundary(n)
                && start.ends_with(&end[..n])
        })
        .unwrap_or(0)
}
