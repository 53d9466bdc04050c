use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnumshiftError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write backup {path}: {source}")]
    BackupFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid vocabulary: {0}")]
    InvalidVocabulary(String),

    #[error("Invalid rewrite pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, EnumshiftError>;

impl EnumshiftError {
    /// Path of the file involved in an I/O failure, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            EnumshiftError::Read { path, .. }
            | EnumshiftError::Write { path, .. }
            | EnumshiftError::BackupFailed { path, .. } => Some(path),
            _ => None,
        }
    }
}
