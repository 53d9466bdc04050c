//! Rewrites raw status literals into enum references.
//!
//! The pipeline is walker → mutator → (import injector, pattern engine). All
//! rewriting is regex-based over surface syntax; nothing here parses PHP.

mod engine;
mod filters;
mod imports;
mod mutator;
mod preview;
mod rules;
mod walker;

pub use engine::{GuardPolicy, PatternEngine, Rewrite, RuleHit, DEFAULT_GUARD_THRESHOLD};
pub use filters::{has_extension, ExclusionPolicy, DEFAULT_EXCLUDES};
pub use imports::{ImportInjector, Injection};
pub use mutator::{backup_path, FileMutator, FileRecord, WriteMode, BACKUP_SUFFIX};
pub use preview::{generate_preview, PreviewChange, PreviewDiff};
pub use rules::{build_rules, ContextKind, Quote, RewriteRule, Strategy};
pub use walker::TreeWalker;

use serde::Serialize;
use std::path::PathBuf;

/// Outcome of a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Changed,
    Unchanged,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub status: FileStatus,
    pub changes: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate result of a run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub mode: WriteMode,

    /// Files handed to the mutator
    pub files_scanned: usize,

    /// Files rewritten (or that would be, in dry-run mode)
    pub files_changed: usize,

    /// Files matched by the exclusion policy
    pub files_skipped: usize,

    /// Substitutions across the run
    pub total_changes: usize,

    /// Per-file outcomes in processing order
    pub files: Vec<FileReport>,

    /// Excluded paths, never opened
    pub skipped: Vec<PathBuf>,

    /// Roots and extra files that do not exist
    pub missing: Vec<PathBuf>,

    pub errors: Vec<String>,

    /// Records of changed files, kept for previews
    #[serde(skip)]
    pub changed_records: Vec<FileRecord>,
}

impl RunReport {
    pub fn new(mode: WriteMode) -> Self {
        Self {
            mode,
            files_scanned: 0,
            files_changed: 0,
            files_skipped: 0,
            total_changes: 0,
            files: Vec::new(),
            skipped: Vec::new(),
            missing: Vec::new(),
            errors: Vec::new(),
            changed_records: Vec::new(),
        }
    }

    pub fn add_record(&mut self, record: &FileRecord) {
        self.files_scanned += 1;

        let status = if record.is_changed() {
            self.files_changed += 1;
            self.total_changes += record.changes;
            if self.mode == WriteMode::DryRun {
                self.changed_records.push(record.clone());
            }
            FileStatus::Changed
        } else {
            FileStatus::Unchanged
        };

        self.files.push(FileReport {
            path: record.path.clone(),
            status,
            changes: record.changes,
            error: None,
        });
    }

    pub fn add_error(&mut self, path: PathBuf, error: String) {
        self.files_scanned += 1;
        self.errors.push(format!("{}: {}", path.display(), error));
        self.files.push(FileReport {
            path,
            status: FileStatus::Error,
            changes: 0,
            error: Some(error),
        });
    }

    pub fn add_skipped(&mut self, path: PathBuf) {
        self.files_skipped += 1;
        self.skipped.push(path);
    }

    pub fn add_missing(&mut self, path: PathBuf) {
        self.missing.push(path);
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
