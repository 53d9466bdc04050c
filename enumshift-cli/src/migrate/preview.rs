use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::path::PathBuf;

use super::mutator::FileRecord;

/// A single changed line
#[derive(Debug, Clone, Serialize)]
pub struct PreviewChange {
    /// Line number in the rewritten file (1-indexed)
    pub line: usize,

    /// Removed text, empty for inserted lines
    pub original: String,

    /// Added text, empty for removed lines
    pub replacement: String,
}

/// Preview of all changes in a single file
#[derive(Debug, Clone, Serialize)]
pub struct PreviewDiff {
    pub file_path: PathBuf,

    /// Substitutions reported by the engine
    pub num_changes: usize,

    pub changes: Vec<PreviewChange>,
}

impl PreviewDiff {
    pub fn from_record(record: &FileRecord) -> Self {
        let diff = TextDiff::from_lines(&record.original, &record.rewritten);
        let mut changes = Vec::new();

        for op in diff.ops() {
            let mut removed = Vec::new();
            let mut added = Vec::new();
            let mut line = 0;

            for change in diff.iter_changes(op) {
                let text = change.value().trim_end_matches('\n').to_string();
                match change.tag() {
                    ChangeTag::Delete => removed.push(text),
                    ChangeTag::Insert => {
                        if line == 0 {
                            line = change.new_index().map(|i| i + 1).unwrap_or(0);
                        }
                        added.push(text);
                    }
                    ChangeTag::Equal => {}
                }
            }

            // Pair removed and added lines so one-line rewrites read as - / +
            for i in 0..removed.len().max(added.len()) {
                changes.push(PreviewChange {
                    line: if line == 0 { 0 } else { line + i },
                    original: removed.get(i).cloned().unwrap_or_default(),
                    replacement: added.get(i).cloned().unwrap_or_default(),
                });
            }
        }

        Self {
            file_path: record.path.clone(),
            num_changes: record.changes,
            changes,
        }
    }

    /// Generate a human-readable diff output
    pub fn format_diff(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("📝 {}\n", self.file_path.display()));
        output.push_str(&format!(
            "   {} change{}\n\n",
            self.num_changes,
            if self.num_changes == 1 { "" } else { "s" }
        ));

        for (i, change) in self.changes.iter().enumerate() {
            output.push_str(&format!("  line {}\n", change.line));
            if !change.original.is_empty() {
                output.push_str(&format!("  - {}\n", change.original));
            }
            if !change.replacement.is_empty() {
                output.push_str(&format!("  + {}\n", change.replacement));
            }
            if i < self.changes.len() - 1 {
                output.push('\n');
            }
        }

        output
    }
}

/// Generate preview for all files
pub fn generate_preview(diffs: &[PreviewDiff]) -> String {
    let mut output = String::new();

    let total_files = diffs.len();
    let total_changes: usize = diffs.iter().map(|d| d.num_changes).sum();

    output.push_str("========================================\n");
    output.push_str("           PREVIEW CHANGES\n");
    output.push_str("========================================\n\n");
    output.push_str(&format!(
        "📊 {} file{}, {} change{}\n\n",
        total_files,
        if total_files == 1 { "" } else { "s" },
        total_changes,
        if total_changes == 1 { "" } else { "s" }
    ));

    for (i, diff) in diffs.iter().enumerate() {
        output.push_str(&diff.format_diff());
        if i < diffs.len() - 1 {
            output.push_str("\n----------------------------------------\n\n");
        }
    }

    output.push_str("\n========================================\n");
    output
}
