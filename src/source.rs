//! Source files handed to the engine, and file-extension → language mapping.

use std::path::{Path, PathBuf};

/// One input file. Owned by the caller; the engine only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    path: PathBuf,
    language: String,
    text: String,
}

impl SourceFile {
    pub fn new(
        path: impl Into<PathBuf>,
        language: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        SourceFile {
            path: path.into(),
            language: language.into().to_lowercase(),
            text: text.into(),
        }
    }

    /// Build a source file whose language is derived from its extension,
    /// falling back to `default` when the extension is unknown.
    pub fn detect(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let path = path.into();
        let language = language_for_path(&path).unwrap_or("default");
        SourceFile::new(path, language, text)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Extension → language tag.
const EXTENSIONS: &[(&str, &str)] = &[
    ("c", "c"),
    ("h", "c"),
    ("cc", "cpp"),
    ("cpp", "cpp"),
    ("cxx", "cpp"),
    ("hpp", "cpp"),
    ("hh", "cpp"),
    ("cs", "csharp"),
    ("java", "java"),
    ("groovy", "groovy"),
    ("js", "javascript"),
    ("mjs", "javascript"),
    ("cjs", "javascript"),
    ("jsx", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("go", "go"),
    ("rs", "rust"),
    ("kt", "kotlin"),
    ("kts", "kotlin"),
    ("swift", "swift"),
    ("php", "php"),
    ("dart", "dart"),
    ("scala", "scala"),
    ("m", "objc"),
    ("mm", "objc"),
    ("py", "python"),
    ("rb", "ruby"),
    ("sh", "bash"),
    ("bash", "bash"),
    ("zsh", "shell"),
    ("pl", "perl"),
    ("pm", "perl"),
    ("r", "r"),
    ("ex", "elixir"),
    ("exs", "elixir"),
    ("ps1", "powershell"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
    ("toml", "toml"),
    ("lua", "lua"),
    ("sql", "sql"),
    ("hs", "haskell"),
    ("ml", "ocaml"),
    ("mli", "ocaml"),
    ("erl", "erlang"),
    ("hrl", "erlang"),
];

/// Language tag for a path, from its extension (case-insensitive).
pub fn language_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    EXTENSIONS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, lang)| *lang)
}

/// Whether the file has an extension the engine knows a language for.
pub fn is_supported(path: &Path) -> bool {
    language_for_path(path).is_some()
}
