use serde::Serialize;
use std::collections::HashSet;

use super::error::{EnumshiftError, Result};

/// Session statuses migrated by default, in rule evaluation order
const SESSION_STATUS_VALUES: &[(&str, &str)] = &[
    ("unscheduled", "UNSCHEDULED"),
    ("scheduled", "SCHEDULED"),
    ("ready", "READY"),
    ("ongoing", "ONGOING"),
    ("completed", "COMPLETED"),
    ("cancelled", "CANCELLED"),
    ("absent", "ABSENT"),
];

/// One raw value and the enum member that replaces it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VocabularyEntry {
    /// Literal stored in the database (e.g. "scheduled")
    pub raw: String,

    /// Enum case name (e.g. "SCHEDULED")
    pub member: String,
}

/// Closed set of raw values and the canonical symbols they map to.
///
/// The mapping is a bijection: construction fails if two entries share a raw
/// value or a member name.
#[derive(Debug, Clone, Serialize)]
pub struct Vocabulary {
    /// Enum class name (e.g. "SessionStatus")
    enum_name: String,

    /// Namespace the enum lives in (e.g. "App\Enums")
    namespace: String,

    /// Model attribute the values are stored in (e.g. "status")
    field: String,

    entries: Vec<VocabularyEntry>,
}

impl Vocabulary {
    pub fn new(
        enum_name: impl Into<String>,
        namespace: impl Into<String>,
        field: impl Into<String>,
        entries: Vec<VocabularyEntry>,
    ) -> Result<Self> {
        let enum_name = enum_name.into();
        let namespace: String = namespace.into();
        let namespace = namespace.trim_matches('\\').to_string();
        let field = field.into();

        if !is_identifier(&enum_name) {
            return Err(invalid(format!("'{}' is not a valid enum name", enum_name)));
        }
        if !namespace.is_empty() && !namespace.split('\\').all(is_identifier) {
            return Err(invalid(format!("'{}' is not a valid namespace", namespace)));
        }
        if !is_identifier(&field) {
            return Err(invalid(format!("'{}' is not a valid field name", field)));
        }
        if entries.is_empty() {
            return Err(invalid("at least one value is required".to_string()));
        }

        let mut raws = HashSet::new();
        let mut members = HashSet::new();
        for entry in &entries {
            if entry.raw.is_empty() || entry.raw.contains(['\'', '"', '\\']) {
                return Err(invalid(format!("raw value {:?} cannot be quoted", entry.raw)));
            }
            if !is_identifier(&entry.member) {
                return Err(invalid(format!("'{}' is not a valid member name", entry.member)));
            }
            if !raws.insert(entry.raw.as_str()) {
                return Err(invalid(format!("raw value '{}' is mapped twice", entry.raw)));
            }
            if !members.insert(entry.member.as_str()) {
                return Err(invalid(format!("member '{}' is mapped twice", entry.member)));
            }
        }

        Ok(Self {
            enum_name,
            namespace,
            field,
            entries,
        })
    }

    /// The `App\Enums\SessionStatus` vocabulary
    pub fn session_status() -> Self {
        Self {
            enum_name: "SessionStatus".to_string(),
            namespace: "App\\Enums".to_string(),
            field: "status".to_string(),
            entries: SESSION_STATUS_VALUES
                .iter()
                .map(|(raw, member)| VocabularyEntry {
                    raw: raw.to_string(),
                    member: member.to_string(),
                })
                .collect(),
        }
    }

    pub fn enum_name(&self) -> &str {
        &self.enum_name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn entries(&self) -> &[VocabularyEntry] {
        &self.entries
    }

    /// Fully qualified enum class, e.g. `App\Enums\SessionStatus`
    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.enum_name.clone()
        } else {
            format!("{}\\{}", self.namespace, self.enum_name)
        }
    }

    /// Canonical symbol for an entry, e.g. `SessionStatus::SCHEDULED`
    pub fn symbol(&self, entry: &VocabularyEntry) -> String {
        format!("{}::{}", self.enum_name, entry.member)
    }

    pub fn symbol_for(&self, raw: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|entry| entry.raw == raw)
            .map(|entry| self.symbol(entry))
    }

    /// Inverse lookup: the raw value a canonical symbol stands for.
    /// Accepts the bare symbol or its `->value` form.
    pub fn raw_for_symbol(&self, symbol: &str) -> Option<&str> {
        let symbol = symbol.strip_suffix("->value").unwrap_or(symbol);
        let member = symbol.strip_prefix(&self.enum_name)?.strip_prefix("::")?;

        self.entries
            .iter()
            .find(|entry| entry.member == member)
            .map(|entry| entry.raw.as_str())
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::session_status()
    }
}

fn invalid(message: String) -> EnumshiftError {
    EnumshiftError::InvalidVocabulary(message)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
