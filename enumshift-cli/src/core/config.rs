use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::vocabulary::{Vocabulary, VocabularyEntry};
use crate::migrate::{ExclusionPolicy, GuardPolicy, DEFAULT_EXCLUDES, DEFAULT_GUARD_THRESHOLD};

/// Project-level config file name
pub const PROJECT_CONFIG_FILE: &str = "enumshift.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub vocabulary: VocabularyConfig,

    #[serde(default)]
    pub walk: WalkConfig,

    #[serde(default)]
    pub guard: GuardConfig,
}

/// Which enum the literals are migrated to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyConfig {
    /// Enum class name
    #[serde(default = "default_enum_name")]
    pub enum_name: String,

    /// Namespace of the enum class
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Model attribute holding the raw value
    #[serde(default = "default_field")]
    pub field: String,

    /// Raw value -> enum member. Empty means the built-in session statuses.
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

/// Which files are visited
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkConfig {
    /// Directories searched recursively
    #[serde(default = "default_roots")]
    pub roots: Vec<PathBuf>,

    /// Individual files processed in addition to the roots
    #[serde(default)]
    pub extra_files: Vec<PathBuf>,

    /// Target file extension
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Path substrings that are never touched
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

/// How already-migrated files are recognised
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardConfig {
    #[serde(default)]
    pub mode: GuardMode,

    /// Only read in `threshold` mode
    #[serde(default = "default_threshold")]
    pub threshold: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardMode {
    #[default]
    Threshold,
    Exact,
}

// Default value functions
fn default_enum_name() -> String {
    "SessionStatus".to_string()
}

fn default_namespace() -> String {
    "App\\Enums".to_string()
}

fn default_field() -> String {
    "status".to_string()
}

fn default_roots() -> Vec<PathBuf> {
    ["app", "database/seeders", "routes"]
        .iter()
        .map(PathBuf::from)
        .collect()
}

fn default_extension() -> String {
    "php".to_string()
}

fn default_exclude() -> Vec<String> {
    DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect()
}

fn default_threshold() -> usize {
    DEFAULT_GUARD_THRESHOLD
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            enum_name: default_enum_name(),
            namespace: default_namespace(),
            field: default_field(),
            values: BTreeMap::new(),
        }
    }
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            roots: default_roots(),
            extra_files: Vec::new(),
            extension: default_extension(),
            exclude: default_exclude(),
        }
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            mode: GuardMode::default(),
            threshold: default_threshold(),
        }
    }
}

impl GuardConfig {
    pub fn policy(&self) -> GuardPolicy {
        match self.mode {
            GuardMode::Threshold => GuardPolicy::Threshold(self.threshold),
            GuardMode::Exact => GuardPolicy::Exact,
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// **Priority (highest to lowest):**
    /// 1. `explicit` path given on the command line
    /// 2. `./enumshift.toml`
    /// 3. `~/.config/enumshift/config.toml`
    /// 4. Built-in defaults
    ///
    /// The first file found wins; files are not merged.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            tracing::info!("Loading config from: {}", path.display());
            return Self::load_from_file(path);
        }

        let project_path = PathBuf::from(PROJECT_CONFIG_FILE);
        if project_path.exists() {
            tracing::info!("Loading project config from: {}", project_path.display());
            return Self::load_from_file(&project_path);
        }

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                tracing::info!("Loading global config from: {}", global_path.display());
                return Self::load_from_file(&global_path);
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Load config from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Get the global config path (~/.config/enumshift/config.toml)
    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("enumshift").join("config.toml"))
    }

    /// Build the vocabulary, validating the bijection
    pub fn vocabulary(&self) -> Result<Vocabulary> {
        let vocab = &self.vocabulary;

        let entries = if vocab.values.is_empty() {
            Vocabulary::session_status().entries().to_vec()
        } else {
            vocab
                .values
                .iter()
                .map(|(raw, member)| VocabularyEntry {
                    raw: raw.clone(),
                    member: member.clone(),
                })
                .collect()
        };

        Vocabulary::new(&vocab.enum_name, &vocab.namespace, &vocab.field, entries)
            .context("Invalid [vocabulary] section")
    }

    pub fn guard_policy(&self) -> GuardPolicy {
        self.guard.policy()
    }

    pub fn exclusion_policy(&self) -> ExclusionPolicy {
        ExclusionPolicy::new(self.walk.exclude.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();

        assert_eq!(config.vocabulary.enum_name, "SessionStatus");
        assert_eq!(config.walk.extension, "php");
        assert_eq!(config.walk.roots.len(), 3);
        assert_eq!(config.guard_policy(), GuardPolicy::Threshold(10));

        let vocabulary = config.vocabulary().unwrap();
        assert_eq!(vocabulary.entries().len(), 7);
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_toml(
            r#"
            [vocabulary]
            enum_name = "PaymentStatus"
            namespace = "App\\Enums\\Billing"
            field = "payment_status"

            [vocabulary.values]
            paid = "PAID"
            refunded = "REFUNDED"

            [walk]
            roots = ["src"]
            extra_files = ["bootstrap/app.php"]
            exclude = ["legacy/"]

            [guard]
            mode = "exact"
            "#,
        )
        .unwrap();

        let vocabulary = config.vocabulary().unwrap();
        assert_eq!(vocabulary.qualified_name(), "App\\Enums\\Billing\\PaymentStatus");
        assert_eq!(vocabulary.symbol_for("paid"), Some("PaymentStatus::PAID".to_string()));
        assert_eq!(config.walk.roots, vec![PathBuf::from("src")]);
        assert_eq!(config.walk.extra_files, vec![PathBuf::from("bootstrap/app.php")]);
        assert_eq!(config.guard_policy(), GuardPolicy::Exact);
        assert!(config
            .exclusion_policy()
            .is_excluded(Path::new("app/legacy/Old.php")));
    }

    #[test]
    fn test_threshold_guard_from_toml() {
        let config = Config::from_toml("[guard]\nmode = \"threshold\"\nthreshold = 25\n").unwrap();
        assert_eq!(config.guard_policy(), GuardPolicy::Threshold(25));
    }

    #[test]
    fn test_threshold_mode_without_value_uses_default() {
        let config = Config::from_toml("[guard]\nmode = \"threshold\"\n").unwrap();
        assert_eq!(config.guard_policy(), GuardPolicy::Threshold(10));

        let config = Config::from_toml("[guard]\nthreshold = 3\n").unwrap();
        assert_eq!(config.guard_policy(), GuardPolicy::Threshold(3));
    }

    #[test]
    fn test_non_bijective_values_are_rejected() {
        let config = Config::from_toml(
            "[vocabulary.values]\nopen = \"OPEN\"\nactive = \"OPEN\"\n",
        )
        .unwrap();

        assert!(config.vocabulary().is_err());
    }

    #[test]
    fn test_load_from_file_reports_parse_errors() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("enumshift.toml");
        fs::write(&path, "[walk\nroots = 3").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_explicit_path_wins() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.toml");
        fs::write(&path, "[walk]\nextension = \"inc\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.walk.extension, "inc");
    }
}
