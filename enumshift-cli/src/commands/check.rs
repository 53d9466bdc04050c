use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::core::{Config, OutputFormat, OutputWriter};
use crate::migrate::{FileMutator, ImportInjector, PatternEngine, WriteMode};

/// Show what a migration would do to one file, without writing
pub fn run(config: &Config, path: PathBuf, format: OutputFormat) -> Result<()> {
    let vocabulary = config.vocabulary()?;
    let engine = PatternEngine::new(&vocabulary, config.guard_policy())?;
    let injector = ImportInjector::new(&vocabulary)?;
    let mutator = FileMutator::new(&engine, &injector, WriteMode::DryRun);

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    if config.exclusion_policy().is_excluded(&path) {
        tracing::warn!("{} matches an exclusion pattern; a migrate run would skip it", path.display());
    }

    let record = mutator.rewrite(&path, content);
    OutputWriter::new(format).write_check(&record)
}
