//! enumshift: rewrite raw status literals in PHP sources into enum references.
//!
//! `->where('status', 'scheduled')` becomes
//! `->where('status', SessionStatus::SCHEDULED->value)` and
//! `$s->status === 'completed'` becomes `$s->status === SessionStatus::COMPLETED`.
//! Every rewritten file is backed up next to the original first.

pub mod commands;
pub mod core;
pub mod migrate;

pub use crate::core::{Config, EnumshiftError, OutputFormat, Vocabulary};
pub use crate::migrate::{PatternEngine, RunReport};
