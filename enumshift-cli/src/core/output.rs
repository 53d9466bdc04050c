use anyhow::Result;
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::core::vocabulary::Vocabulary;
use crate::migrate::{FileRecord, FileStatus, PreviewDiff, RunReport, WriteMode};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Renders reports to stdout. Logging goes to stderr separately.
pub struct OutputWriter {
    format: OutputFormat,

    /// Paths in text output are shown relative to this directory
    base: Option<PathBuf>,
}

#[derive(Serialize)]
struct CheckOutput<'a> {
    path: &'a Path,
    changes: usize,
    guarded: bool,
    injection: crate::migrate::Injection,
    hits: &'a [crate::migrate::RuleHit],
    diff: PreviewDiff,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            base: std::env::current_dir().ok(),
        }
    }

    fn display_path(&self, path: &Path) -> String {
        self.base
            .as_deref()
            .and_then(|base| pathdiff::diff_paths(path, base))
            .filter(|rel| !rel.starts_with(".."))
            .unwrap_or_else(|| path.to_path_buf())
            .display()
            .to_string()
    }

    pub fn write_report(&self, report: &RunReport) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();

        match self.format {
            OutputFormat::Json => {
                writeln!(out, "{}", serde_json::to_string_pretty(report)?)?;
            }
            OutputFormat::Text => self.write_report_text(&mut out, report)?,
        }

        Ok(())
    }

    pub fn write_report_text(&self, out: &mut impl Write, report: &RunReport) -> Result<()> {
        for file in &report.files {
            let path = self.display_path(&file.path);
            match file.status {
                FileStatus::Changed => {
                    writeln!(out, "✓ {} ({} changes)", path, file.changes)?;
                }
                FileStatus::Unchanged => writeln!(out, "· {} no changes needed", path)?,
                FileStatus::Error => writeln!(
                    out,
                    "⚠️  {} {}",
                    path,
                    file.error.as_deref().unwrap_or("unknown error")
                )?,
            }
        }

        if report.mode == WriteMode::DryRun && !report.changed_records.is_empty() {
            let diffs: Vec<PreviewDiff> = report
                .changed_records
                .iter()
                .map(PreviewDiff::from_record)
                .collect();
            writeln!(out)?;
            write!(out, "{}", crate::migrate::generate_preview(&diffs))?;
        }

        writeln!(out)?;
        writeln!(out, "========================================")?;
        writeln!(
            out,
            "{}",
            if report.mode == WriteMode::DryRun {
                "        DRY-RUN MIGRATION SUMMARY"
            } else {
                "           MIGRATION SUMMARY"
            }
        )?;
        writeln!(out, "========================================")?;
        writeln!(out, "  Files processed:  {}", report.files_scanned)?;
        writeln!(out, "  Files refactored: {}", report.files_changed)?;
        writeln!(out, "  Total changes:    {}", report.total_changes)?;
        if report.files_skipped > 0 {
            writeln!(out, "  Files excluded:   {}", report.files_skipped)?;
        }

        if !report.missing.is_empty() {
            writeln!(out, "\nNot found:")?;
            for path in &report.missing {
                writeln!(out, "  • {}", self.display_path(path))?;
            }
        }

        if !report.errors.is_empty() {
            writeln!(out, "\nErrors:")?;
            for error in &report.errors {
                writeln!(out, "  ⚠️  {}", error)?;
            }
        }

        if report.mode == WriteMode::Execute && report.files_changed > 0 {
            writeln!(
                out,
                "\n💡 Originals saved next to each file with a .backup suffix"
            )?;
        } else if report.mode == WriteMode::DryRun && report.files_changed > 0 {
            writeln!(out, "\n💡 Run without --dry-run to apply changes")?;
        }

        Ok(())
    }

    pub fn write_check(&self, record: &FileRecord) -> Result<()> {
        let diff = PreviewDiff::from_record(record);

        match self.format {
            OutputFormat::Json => {
                let output = CheckOutput {
                    path: &record.path,
                    changes: record.changes,
                    guarded: record.guarded,
                    injection: record.injection,
                    hits: &record.hits,
                    diff,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                if record.guarded {
                    println!("{} looks migrated already, guard skipped it", record.path.display());
                    return Ok(());
                }
                if !record.is_changed() {
                    println!("{} no changes needed", record.path.display());
                    return Ok(());
                }

                println!("Rules fired:");
                for hit in &record.hits {
                    let q = hit.quote.as_char();
                    println!("  {:?} {}{}{} x{}", hit.context, q, hit.raw, q, hit.count);
                }
                println!("Declaration: {:?}\n", record.injection);
                println!("{}", diff.format_diff());
            }
        }

        Ok(())
    }

    pub fn write_vocabulary(&self, vocabulary: &Vocabulary) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(vocabulary)?);
            }
            OutputFormat::Text => {
                println!("{} (field: {})", vocabulary.qualified_name(), vocabulary.field());
                for entry in vocabulary.entries() {
                    println!("  '{}' => {}", entry.raw, vocabulary.symbol(entry));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrate::Injection;

    fn changed_record(path: &str) -> FileRecord {
        FileRecord {
            path: PathBuf::from(path),
            original: "'status' => 'ready'\n".to_string(),
            rewritten: "'status' => SessionStatus::READY\n".to_string(),
            changes: 1,
            injection: Injection::NoSafeAnchor,
            hits: Vec::new(),
            guarded: false,
        }
    }

    #[test]
    fn test_text_report_lines_and_summary() {
        let mut report = RunReport::new(WriteMode::Execute);
        report.add_record(&changed_record("/tmp/a.php"));
        report.add_error(PathBuf::from("/tmp/b.php"), "denied".to_string());

        let writer = OutputWriter {
            format: OutputFormat::Text,
            base: None,
        };
        let mut buf = Vec::new();
        writer.write_report_text(&mut buf, &report).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("✓ /tmp/a.php (1 changes)"));
        assert!(text.contains("⚠️  /tmp/b.php denied"));
        assert!(text.contains("Files processed:  2"));
        assert!(text.contains("Files refactored: 1"));
        assert!(text.contains("Total changes:    1"));
    }

    #[test]
    fn test_dry_run_report_includes_preview() {
        let mut report = RunReport::new(WriteMode::DryRun);
        report.add_record(&changed_record("a.php"));

        let writer = OutputWriter {
            format: OutputFormat::Text,
            base: None,
        };
        let mut buf = Vec::new();
        writer.write_report_text(&mut buf, &report).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("PREVIEW CHANGES"));
        assert!(text.contains("+ 'status' => SessionStatus::READY"));
        assert!(text.contains("Run without --dry-run"));
    }

    #[test]
    fn test_display_path_is_relative_to_base() {
        let writer = OutputWriter {
            format: OutputFormat::Text,
            base: Some(PathBuf::from("/project")),
        };

        assert_eq!(writer.display_path(Path::new("/project/app/A.php")), "app/A.php");
        assert_eq!(writer.display_path(Path::new("/elsewhere/B.php")), "/elsewhere/B.php");
    }
}
