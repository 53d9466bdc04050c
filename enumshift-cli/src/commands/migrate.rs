use anyhow::Result;
use std::path::PathBuf;

use crate::core::{Config, OutputFormat, OutputWriter};
use crate::migrate::{
    FileMutator, ImportInjector, PatternEngine, RunReport, TreeWalker, WriteMode,
};

/// Options from the command line; empty fields fall back to the config
#[derive(Debug, Clone, Default)]
pub struct MigrateOptions {
    pub roots: Vec<PathBuf>,
    pub extra_files: Vec<PathBuf>,
    pub extension: Option<String>,
    pub dry_run: bool,
}

/// Build the pipeline from config and walk the tree
pub fn execute(config: &Config, options: &MigrateOptions) -> Result<RunReport> {
    let vocabulary = config.vocabulary()?;
    let engine = PatternEngine::new(&vocabulary, config.guard_policy())?;
    let injector = ImportInjector::new(&vocabulary)?;
    let exclusions = config.exclusion_policy();

    let roots = if options.roots.is_empty() {
        config.walk.roots.clone()
    } else {
        options.roots.clone()
    };
    let mut extra_files = config.walk.extra_files.clone();
    extra_files.extend(options.extra_files.iter().cloned());

    let extension = options
        .extension
        .clone()
        .unwrap_or_else(|| config.walk.extension.clone());

    let mode = if options.dry_run {
        WriteMode::DryRun
    } else {
        WriteMode::Execute
    };

    let mutator = FileMutator::new(&engine, &injector, mode);
    let walker = TreeWalker::new(mutator, &exclusions, extension);

    Ok(walker.run(&roots, &extra_files))
}

pub fn run(config: &Config, options: MigrateOptions, format: OutputFormat) -> Result<()> {
    let report = execute(config, &options)?;
    OutputWriter::new(format).write_report(&report)?;

    // Per-file failures are reported, never fatal
    Ok(())
}
