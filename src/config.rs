use crate::error::ConfigError;
use crate::locator::{CommentStyle, DelimiterTable};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Engine options. Every field has a default, so a config file only needs to
/// name what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Worker threads for per-file extraction. `None` uses rayon's global pool.
    pub jobs: Option<usize>,
    /// Warn about `@code…` tags that are not part of the vocabulary.
    pub warn_unknown_tags: bool,
    /// Compare documented parameter order with `@codeSignature`.
    pub check_signatures: bool,
    /// Extra or overriding delimiter table entries, by language tag.
    pub languages: BTreeMap<String, Vec<CommentStyle>>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            jobs: None,
            warn_unknown_tags: true,
            check_signatures: true,
            languages: BTreeMap::new(),
        }
    }
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            origin: "<string>".to_string(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            origin: path.display().to_string(),
            source,
        })
    }

    /// Built-in delimiters with this config's `languages` layered on top.
    pub fn delimiter_table(&self) -> Result<DelimiterTable, ConfigError> {
        let mut table = DelimiterTable::builtin();
        for (language, styles) in &self.languages {
            table.insert(language, styles.clone())?;
        }
        Ok(table)
    }
}
