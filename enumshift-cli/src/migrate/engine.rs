use regex::Regex;
use serde::Serialize;
use tracing::debug;

use super::rules::{build_rules, ContextKind, Quote, RewriteRule};
use crate::core::error::Result;
use crate::core::vocabulary::Vocabulary;

/// When to treat a buffer as already migrated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardPolicy {
    /// Skip buffers holding more than this many canonical references
    Threshold(usize),

    /// Only skip buffers where no rule matches
    Exact,
}

/// Canonical references tolerated before a buffer counts as migrated
pub const DEFAULT_GUARD_THRESHOLD: usize = 10;

impl Default for GuardPolicy {
    fn default() -> Self {
        GuardPolicy::Threshold(DEFAULT_GUARD_THRESHOLD)
    }
}

/// A rule that fired and how many substitutions it made
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleHit {
    pub context: ContextKind,
    pub quote: Quote,
    pub raw: String,
    pub count: usize,
}

/// Result of running the engine over one buffer
#[derive(Debug, Clone, Serialize)]
pub struct Rewrite {
    pub text: String,

    /// Substitutions performed, summed over all rules
    pub changes: usize,

    pub hits: Vec<RuleHit>,

    /// True when the migration guard short-circuited the pass
    pub guarded: bool,
}

/// Ordered rule table applied to text buffers. Holds no mutable state.
pub struct PatternEngine {
    rules: Vec<RewriteRule>,
    guard: GuardPolicy,
    canonical_ref: Regex,
}

impl PatternEngine {
    pub fn new(vocabulary: &Vocabulary, guard: GuardPolicy) -> Result<Self> {
        let rules = build_rules(vocabulary)?;
        Self::with_rules(vocabulary, rules, guard)
    }

    /// Build an engine over a caller-supplied rule table
    pub fn with_rules(
        vocabulary: &Vocabulary,
        rules: Vec<RewriteRule>,
        guard: GuardPolicy,
    ) -> Result<Self> {
        let canonical_ref = Regex::new(&format!(
            r"\b{}::[A-Za-z_][A-Za-z0-9_]*",
            regex::escape(vocabulary.enum_name())
        ))?;

        Ok(Self {
            rules,
            guard,
            canonical_ref,
        })
    }

    pub fn rules(&self) -> &[RewriteRule] {
        &self.rules
    }

    pub fn guard(&self) -> GuardPolicy {
        self.guard
    }

    /// Count `Enum::MEMBER` references already present in the text
    pub fn canonical_references(&self, text: &str) -> usize {
        self.canonical_ref.find_iter(text).count()
    }

    /// Whether the guard considers this text already migrated
    pub fn is_migrated(&self, text: &str) -> bool {
        match self.guard {
            GuardPolicy::Threshold(limit) => self.canonical_references(text) > limit,
            GuardPolicy::Exact => !self.rules.iter().any(|rule| rule.is_match(text)),
        }
    }

    pub fn apply(&self, text: &str) -> Rewrite {
        if self.is_migrated(text) {
            return Rewrite {
                text: text.to_string(),
                changes: 0,
                hits: Vec::new(),
                guarded: true,
            };
        }

        let mut current = text.to_string();
        let mut changes = 0;
        let mut hits = Vec::new();

        for rule in &self.rules {
            let (rewritten, count) = rule.apply(&current);
            if count == 0 {
                continue;
            }

            let rewritten = rewritten.into_owned();
            debug!("{} matched {} time(s)", rule.label(), count);

            current = rewritten;
            changes += count;
            hits.push(RuleHit {
                context: rule.context,
                quote: rule.quote,
                raw: rule.raw.clone(),
                count,
            });
        }

        Rewrite {
            text: current,
            changes,
            hits,
            guarded: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn engine() -> PatternEngine {
        PatternEngine::new(&Vocabulary::session_status(), GuardPolicy::default()).unwrap()
    }

    #[test]
    fn test_where_filter_scenario() {
        let result = engine().apply("$sessions = $query->where('status', 'scheduled')->get();");

        assert!(result
            .text
            .contains("->where('status', SessionStatus::SCHEDULED->value)"));
        assert!(result.changes >= 1);
    }

    #[test]
    fn test_mapping_scenario_has_no_value_suffix() {
        let result = engine().apply("$session->update(['status' => 'cancelled']);");

        assert!(result.text.contains("'status' => SessionStatus::CANCELLED"));
        assert!(!result.text.contains("CANCELLED->value"));
    }

    #[test]
    fn test_comparison_scenario() {
        let result = engine().apply("return $this->status === 'completed';");

        assert_eq!(result.text, "return $this->status === SessionStatus::COMPLETED;");
        assert_eq!(result.changes, 1);
    }

    #[test]
    fn test_counts_substitutions_not_rules() {
        let text = "\
$a->where('status', 'ready');
$b->where('status', 'ready');
$c->orWhere(\"status\", \"ongoing\");
if ($s->status !== 'absent') {}
";
        let result = engine().apply(text);

        assert_eq!(result.changes, 4);
        assert_eq!(result.hits.len(), 3);

        let ready = result.hits.iter().find(|hit| hit.raw == "ready").unwrap();
        assert_eq!(ready.count, 2);
        assert_eq!(ready.context, ContextKind::Where);
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let text = "\
->where('status', '!=', 'cancelled')
->whereNotIn('status', ['completed', \"cancelled\"])
'status' => 'unscheduled',
$s->status == 'ready'
";
        let engine = engine();
        let first = engine.apply(text);
        let second = engine.apply(&first.text);

        assert!(first.changes > 0);
        assert_eq!(second.changes, 0);
        assert_eq!(second.text, first.text);
    }

    #[test]
    fn test_repeated_where_in_entry_settles_in_one_pass() {
        let engine = engine();
        let first = engine.apply("->whereIn('status', ['ready', 'ongoing', 'ready'])");

        assert_eq!(
            first.text,
            "->whereIn('status', [SessionStatus::READY->value, SessionStatus::ONGOING->value, SessionStatus::READY->value])"
        );
        assert_eq!(first.changes, 3);

        let second = engine.apply(&first.text);
        assert_eq!(second.changes, 0);
        assert_eq!(second.text, first.text);
    }

    #[test]
    fn test_value_rewrites_resolve_back_to_raw() {
        let vocabulary = Vocabulary::session_status();
        let engine = engine();

        for entry in vocabulary.entries() {
            let text = format!("->where('status', '{}')", entry.raw);
            let result = engine.apply(&text);

            let symbol = result
                .text
                .trim_start_matches("->where('status', ")
                .trim_end_matches(')');
            assert!(symbol.ends_with("->value"));
            assert_eq!(vocabulary.raw_for_symbol(symbol), Some(entry.raw.as_str()));
        }
    }

    #[test]
    fn test_threshold_guard_skips_migrated_text() {
        let mut text = String::new();
        for _ in 0..11 {
            text.push_str("$x = SessionStatus::READY;\n");
        }
        text.push_str("$q->where('status', 'scheduled');\n");

        let result = engine().apply(&text);

        assert!(result.guarded);
        assert_eq!(result.changes, 0);
        assert_eq!(result.text, text);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let mut text = String::new();
        for _ in 0..10 {
            text.push_str("$x = SessionStatus::READY;\n");
        }
        text.push_str("$q->where('status', 'scheduled');\n");

        let result = engine().apply(&text);

        assert!(!result.guarded);
        assert_eq!(result.changes, 1);
    }

    #[test]
    fn test_exact_guard_still_rewrites_partially_migrated_text() {
        let engine =
            PatternEngine::new(&Vocabulary::session_status(), GuardPolicy::Exact).unwrap();
        let mut text = String::new();
        for _ in 0..20 {
            text.push_str("$x = SessionStatus::READY;\n");
        }
        text.push_str("$q->where('status', 'scheduled');\n");

        let result = engine.apply(&text);
        assert_eq!(result.changes, 1);

        let again = engine.apply(&result.text);
        assert!(again.guarded);
    }

    #[test]
    fn test_text_without_vocabulary_is_untouched() {
        let text = "<?php\n$q->where('type', 'scheduled');\n$s->status === 'pending';\n";
        let result = engine().apply(text);

        assert_eq!(result.changes, 0);
        assert_eq!(result.text, text);
    }
}
