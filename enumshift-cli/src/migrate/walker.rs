use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use super::filters::{has_extension, ExclusionPolicy};
use super::mutator::FileMutator;
use super::RunReport;

/// Drives the file mutator over every candidate file under the roots
pub struct TreeWalker<'a> {
    mutator: FileMutator<'a>,
    exclusions: &'a ExclusionPolicy,
    extension: String,
}

impl<'a> TreeWalker<'a> {
    pub fn new(
        mutator: FileMutator<'a>,
        exclusions: &'a ExclusionPolicy,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            mutator,
            exclusions,
            extension: extension.into(),
        }
    }

    pub fn run(&self, roots: &[PathBuf], extra_files: &[PathBuf]) -> RunReport {
        let mut report = RunReport::new(self.mutator.mode());
        let mut seen = HashSet::new();

        info!(
            "Migrating {} root(s) and {} extra file(s)",
            roots.len(),
            extra_files.len()
        );

        for root in roots {
            if !root.is_dir() {
                warn!("Directory not found, skipping: {}", root.display());
                report.add_missing(root.clone());
                continue;
            }

            for file in self.collect_files(root) {
                if seen.insert(file.clone()) {
                    self.visit(&file, &mut report);
                }
            }
        }

        for file in extra_files {
            if !file.is_file() {
                warn!("File not found, skipping: {}", file.display());
                report.add_missing(file.clone());
                continue;
            }

            if !has_extension(file, &self.extension) {
                warn!("Not a .{} file, skipping: {}", self.extension, file.display());
                report.add_skipped(file.clone());
                continue;
            }

            if seen.insert(file.clone()) {
                self.visit(file, &mut report);
            }
        }

        info!(
            "Processed {} file(s), refactored {}, {} change(s)",
            report.files_scanned, report.files_changed, report.total_changes
        );

        report
    }

    /// Collect files with the target extension, in lexicographic order
    pub fn collect_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Cannot read entry under {}: {}", root.display(), e);
                    continue;
                }
            };

            if entry.file_type().is_file() && has_extension(entry.path(), &self.extension) {
                files.push(entry.into_path());
            }
        }

        files
    }

    fn visit(&self, path: &Path, report: &mut RunReport) {
        if self.exclusions.is_excluded(path) {
            debug!("Excluded: {}", path.display());
            report.add_skipped(path.to_path_buf());
            return;
        }

        match self.mutator.process(path) {
            Ok(record) => {
                if record.is_changed() {
                    info!("✓ {} ({} changes)", path.display(), record.changes);
                } else {
                    debug!("· {} no changes needed", path.display());
                }
                report.add_record(&record);
            }
            Err(e) => {
                error!("✗ {}: {}", path.display(), e);
                report.add_error(path.to_path_buf(), e.to_string());
            }
        }
    }
}
