pub mod config;
pub mod error;
pub mod output;
pub mod vocabulary;

pub use config::Config;
pub use error::{EnumshiftError, Result};
pub use output::{OutputFormat, OutputWriter};
pub use vocabulary::{Vocabulary, VocabularyEntry};
