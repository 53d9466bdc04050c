use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::engine::{PatternEngine, RuleHit};
use super::imports::{ImportInjector, Injection};
use crate::core::error::{EnumshiftError, Result};

/// Suffix appended to the original file name for backups
pub const BACKUP_SUFFIX: &str = ".backup";

/// Whether the mutator touches the disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Write backup and rewritten file
    Execute,

    /// Compute the rewrite but never write
    DryRun,
}

/// One processed file, from read to (optional) commit
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub path: PathBuf,

    /// Content as read; written to the backup before the overwrite
    pub original: String,

    pub rewritten: String,

    /// Substitutions plus one if the declaration was inserted
    pub changes: usize,

    pub injection: Injection,
    pub hits: Vec<RuleHit>,

    /// The migration guard skipped this file
    pub guarded: bool,
}

impl FileRecord {
    pub fn is_changed(&self) -> bool {
        self.changes > 0
    }

    pub fn backup_path(&self) -> PathBuf {
        backup_path(&self.path)
    }

    /// Write the backup, then the rewritten content.
    ///
    /// The original path is never written if the backup fails.
    pub fn commit(&self) -> Result<()> {
        let backup = self.backup_path();

        write_durably(&backup, &self.original).map_err(|source| {
            EnumshiftError::BackupFailed {
                path: backup.clone(),
                source,
            }
        })?;

        fs::write(&self.path, &self.rewritten).map_err(|source| EnumshiftError::Write {
            path: self.path.clone(),
            source,
        })?;

        Ok(())
    }
}

/// `app/Foo.php` -> `app/Foo.php.backup`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

fn write_durably(path: &Path, content: &str) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()
}

/// Runs the injector and the engine over single files
pub struct FileMutator<'a> {
    engine: &'a PatternEngine,
    injector: &'a ImportInjector,
    mode: WriteMode,
}

impl<'a> FileMutator<'a> {
    pub fn new(engine: &'a PatternEngine, injector: &'a ImportInjector, mode: WriteMode) -> Self {
        Self {
            engine,
            injector,
            mode,
        }
    }

    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    /// Rewrite already-loaded content without touching the disk
    pub fn rewrite(&self, path: &Path, original: String) -> FileRecord {
        let (declared, injection) = self.injector.ensure_declared(&original);
        let rewrite = self.engine.apply(&declared);

        if injection == Injection::NoSafeAnchor && rewrite.changes > 0 {
            warn!(
                "{}: no import or namespace line, add `{}` by hand",
                path.display(),
                self.injector.declaration()
            );
        }

        // A lone declaration is not worth a rewrite
        let (rewritten, changes) = if rewrite.changes == 0 {
            (original.clone(), 0)
        } else {
            let changes = rewrite.changes + usize::from(injection.inserted());
            (rewrite.text, changes)
        };

        FileRecord {
            path: path.to_path_buf(),
            original,
            rewritten,
            changes,
            injection,
            hits: rewrite.hits,
            guarded: rewrite.guarded,
        }
    }

    /// Read, rewrite and, when something changed, back up and overwrite
    pub fn process(&self, path: &Path) -> Result<FileRecord> {
        let original = fs::read_to_string(path).map_err(|source| EnumshiftError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let record = self.rewrite(path, original);

        if record.guarded {
            debug!("{}: already migrated, skipping", path.display());
        }

        if record.is_changed() && self.mode == WriteMode::Execute {
            record.commit()?;
        }

        Ok(record)
    }
}
