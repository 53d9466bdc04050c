use regex::{Captures, Regex};
use serde::Serialize;
use std::borrow::Cow;

use crate::core::error::Result;
use crate::core::vocabulary::{Vocabulary, VocabularyEntry};

/// Syntactic context a raw literal appears in.
///
/// `ContextKind::ALL` lists the contexts in evaluation order: query filters
/// first, then the broader identity forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    /// `->where('status', '!=', 'cancelled')`
    WhereOperator,

    /// `->where('status', 'scheduled')`, `Model::where(...)`, `->orWhere(...)`
    Where,

    /// `->whereIn('status', ['ready', 'ongoing'])`, `->whereNotIn(...)`
    WhereInEntry,

    /// `->status === 'completed'`
    Comparison,

    /// `'status' => 'cancelled'`
    Mapping,
}

/// How the replacement symbol is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Query builders compare against the stored string: `Symbol->value`
    Value,

    /// Typed comparisons and attribute assignment: bare `Symbol`
    Identity,
}

/// String literal quoting style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Quote {
    Single,
    Double,
}

impl Quote {
    pub const ALL: [Quote; 2] = [Quote::Single, Quote::Double];

    pub fn as_char(self) -> char {
        match self {
            Quote::Single => '\'',
            Quote::Double => '"',
        }
    }
}

// Placeholders: {field} is the escaped attribute name, {q} the quote and
// {raw} the escaped raw value. The `pre` group is kept verbatim.
const KEY: &str = r#"['"]{field}['"]"#;

impl ContextKind {
    pub const ALL: [ContextKind; 5] = [
        ContextKind::WhereOperator,
        ContextKind::Where,
        ContextKind::WhereInEntry,
        ContextKind::Comparison,
        ContextKind::Mapping,
    ];

    pub fn strategy(self) -> Strategy {
        match self {
            ContextKind::WhereOperator | ContextKind::Where | ContextKind::WhereInEntry => {
                Strategy::Value
            }
            ContextKind::Comparison | ContextKind::Mapping => Strategy::Identity,
        }
    }

    fn template(self) -> String {
        let prefix = match self {
            ContextKind::WhereOperator => format!(
                r#"(?:->|::)(?:where|orWhere|whereNot|orWhereNot)\(\s*{KEY}\s*,\s*['"](?:=|==|!=|<>)['"]\s*,\s*"#
            ),
            ContextKind::Where => {
                format!(r#"(?:->|::)(?:where|orWhere|whereNot|orWhereNot)\(\s*{KEY}\s*,\s*"#)
            }
            ContextKind::WhereInEntry => format!(
                r#"(?:->|::)(?:whereIn|whereNotIn|orWhereIn|orWhereNotIn)\(\s*{KEY}\s*,\s*\[[^\]]*?"#
            ),
            ContextKind::Comparison => r"->{field}\s*(?:===|!==|==|!=)\s*".to_string(),
            ContextKind::Mapping => format!(r"{KEY}\s*=>\s*"),
        };

        format!("(?P<pre>{}){{q}}{{raw}}{{q}}", prefix)
    }
}

/// One (context, raw value, quote style) rewrite
#[derive(Debug, Clone)]
pub struct RewriteRule {
    pub context: ContextKind,
    pub quote: Quote,
    pub raw: String,

    /// Text that replaces the quoted literal
    pub replacement: String,

    pattern: Regex,
}

impl RewriteRule {
    pub fn new(
        context: ContextKind,
        quote: Quote,
        vocabulary: &Vocabulary,
        entry: &VocabularyEntry,
    ) -> Result<Self> {
        let symbol = vocabulary.symbol(entry);
        let replacement = match context.strategy() {
            Strategy::Value => format!("{}->value", symbol),
            Strategy::Identity => symbol,
        };

        let source = context
            .template()
            .replace("{field}", &regex::escape(vocabulary.field()))
            .replace("{raw}", &regex::escape(&entry.raw))
            .replace("{q}", &quote.as_char().to_string());

        Ok(Self {
            context,
            quote,
            raw: entry.raw.clone(),
            replacement,
            pattern: Regex::new(&source)?,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Replace every match, returning the new text and the number of
    /// substitutions performed
    pub fn apply<'t>(&self, text: &'t str) -> (Cow<'t, str>, usize) {
        let (mut rewritten, mut count) = self.replace_pass(text);

        // A list prefix is consumed once per pass, so repeated entries in
        // the same `whereIn` list need further passes
        if self.context == ContextKind::WhereInEntry && count > 0 {
            loop {
                let (next, more) = self.replace_pass(&rewritten);
                if more == 0 {
                    break;
                }
                let next = next.into_owned();
                rewritten = Cow::Owned(next);
                count += more;
            }
        }

        (rewritten, count)
    }

    fn replace_pass<'t>(&self, text: &'t str) -> (Cow<'t, str>, usize) {
        let mut count = 0;
        let rewritten = self.pattern.replace_all(text, |caps: &Captures| {
            count += 1;
            format!("{}{}", &caps["pre"], self.replacement)
        });

        (rewritten, count)
    }

    /// Short human label, e.g. `Where 'scheduled'`
    pub fn label(&self) -> String {
        let q = self.quote.as_char();
        format!("{:?} {}{}{}", self.context, q, self.raw, q)
    }
}

/// Build the full rule table for a vocabulary.
///
/// Order is context first, then vocabulary order, then quote style.
pub fn build_rules(vocabulary: &Vocabulary) -> Result<Vec<RewriteRule>> {
    let mut rules = Vec::new();

    for context in ContextKind::ALL {
        for entry in vocabulary.entries() {
            for quote in Quote::ALL {
                rules.push(RewriteRule::new(context, quote, vocabulary, entry)?);
            }
        }
    }

    Ok(rules)
}
