//! Pipeline — per-file extraction on a rayon pool, then one validation pass.

use crate::builder::{EntityBuilder, FileExtraction};
use crate::config::Config;
use crate::error::{ConfigError, Severity, ValidationIssue};
use crate::locator::{DelimiterTable, Locator};
use crate::model::DocumentationModel;
use crate::source::SourceFile;
use crate::tokenizer::tokenize;
use crate::validate::validate;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Result of one run: the model plus every issue, file-local ones first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub model: DocumentationModel,
    pub issues: Vec<ValidationIssue>,
    /// Files not processed because the run was aborted.
    pub skipped: usize,
}

impl Extraction {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(ValidationIssue::is_error)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

pub struct Engine {
    config: Config,
    table: DelimiterTable,
    pool: Option<rayon::ThreadPool>,
}

impl Default for Engine {
    fn default() -> Self {
        Engine {
            config: Config::default(),
            table: DelimiterTable::builtin(),
            pool: None,
        }
    }
}

impl Engine {
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let table = config.delimiter_table()?;
        let pool = config.jobs.and_then(|jobs| {
            match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
                Ok(pool) => Some(pool),
                Err(e) => {
                    warn!("could not start {} worker threads, using the global pool: {}", jobs, e);
                    None
                }
            }
        });
        Ok(Engine { config, table, pool })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn table(&self) -> &DelimiterTable {
        &self.table
    }

    /// Locate, tokenize, parse and build one file. Never fails; problems
    /// come back as issues.
    pub fn extract_file(&self, file: &SourceFile) -> FileExtraction {
        let mut builder = EntityBuilder::new(file, &self.config);
        let mut blocks = 0usize;
        for block in Locator::new(file, self.table.styles_for(file.language())) {
            match block {
                Ok(block) => {
                    blocks += 1;
                    builder.push_block(&tokenize(&block));
                }
                Err(e) => {
                    warn!("{}", e);
                    builder.report(e.into());
                }
            }
        }
        let out = builder.finish();
        debug!(
            "{}: {} comment blocks, {} entities, {} issues",
            file.path().display(),
            blocks,
            out.entities.len(),
            out.issues.len()
        );
        out
    }

    pub fn extract(&self, files: &[SourceFile]) -> Extraction {
        self.extract_with_abort(files, &AtomicBool::new(false))
    }

    /// Like [`Engine::extract`], but files not yet started when `abort` is
    /// set are skipped and counted.
    pub fn extract_with_abort(&self, files: &[SourceFile], abort: &AtomicBool) -> Extraction {
        let run = || -> Vec<Option<FileExtraction>> {
            files
                .par_iter()
                .map(|file| {
                    if abort.load(Ordering::Relaxed) {
                        None
                    } else {
                        Some(self.extract_file(file))
                    }
                })
                .collect()
        };
        let results = match self.pool {
            Some(ref pool) => pool.install(run),
            None => run(),
        };

        let mut skipped = 0;
        let mut entities = Vec::new();
        let mut issues = Vec::new();
        for result in results {
            match result {
                Some(file) => {
                    entities.extend(file.entities);
                    issues.extend(file.issues);
                }
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!("aborted: {} of {} files skipped", skipped, files.len());
        }

        let (model, found) = validate(entities, &self.config);
        issues.extend(found);
        Extraction {
            model,
            issues,
            skipped,
        }
    }
}
