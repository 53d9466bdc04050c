use std::path::Path;

/// Path fragments skipped by default
pub const DEFAULT_EXCLUDES: &[&str] = &[
    ".blade.php",
    "Test.php",
    "/tests/",
    "/fixtures/",
    "/vendor/",
    "Enums/SessionStatus.php",
    ".backup",
];

/// Substring-based exclusion, evaluated before a file is opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionPolicy {
    patterns: Vec<String>,
}

impl ExclusionPolicy {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Check if a path should be skipped
    pub fn is_excluded(&self, path: &Path) -> bool {
        // Match on forward slashes regardless of platform. A leading slash
        // lets `/tests/` match a relative `tests/Pest.php`.
        let normalized = path.to_string_lossy().replace('\\', "/");
        let normalized = normalized.trim_start_matches("./");
        let path_str = if normalized.starts_with('/') {
            normalized.to_string()
        } else {
            format!("/{}", normalized)
        };

        self.patterns
            .iter()
            .any(|pattern| path_str.contains(pattern.as_str()))
    }
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDES.iter().copied())
    }
}

/// Check if a file has the target extension
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == extension.trim_start_matches('.'))
        .unwrap_or(false)
}
