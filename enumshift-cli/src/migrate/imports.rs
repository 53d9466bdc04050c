use regex::Regex;
use serde::Serialize;
use std::borrow::Cow;

use crate::core::error::Result;
use crate::core::vocabulary::Vocabulary;

/// What `ensure_declared` did to a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Injection {
    AlreadyDeclared,

    /// Added after the last top-level `use` statement
    AfterImports,

    /// Added below the `namespace` header
    AfterNamespace,

    /// No `use` or `namespace` line to anchor on; text left as is
    NoSafeAnchor,
}

impl Injection {
    pub fn inserted(self) -> bool {
        matches!(self, Injection::AfterImports | Injection::AfterNamespace)
    }
}

/// Adds `use App\Enums\SessionStatus;` to PHP files that lack it
pub struct ImportInjector {
    declaration: String,
    declared: Regex,
    import_line: Regex,
    namespace_line: Regex,
}

impl ImportInjector {
    pub fn new(vocabulary: &Vocabulary) -> Result<Self> {
        let qualified = vocabulary.qualified_name();
        let alias = r"(?:\s+as\s+\w+)?";

        // `use App\Enums\SessionStatus;`, optionally aliased
        let mut forms = vec![format!(r"\\?{}{}\s*;", regex::escape(&qualified), alias)];

        // `use App\Enums\{Other, SessionStatus};`
        if !vocabulary.namespace().is_empty() {
            forms.push(format!(
                r"\\?{}\\\{{(?:[^}}]*,)?\s*{}{}\s*(?:,[^}}]*)?\}}\s*;",
                regex::escape(vocabulary.namespace()),
                regex::escape(vocabulary.enum_name()),
                alias
            ));
        }

        Ok(Self {
            declaration: format!("use {};", qualified),
            declared: Regex::new(&format!(r"(?m)^\s*use\s+(?:{})", forms.join("|")))?,
            // Column zero only: indented `use` lines are trait imports
            import_line: Regex::new(r"(?m)^use\s+[^;\n]+;[^\n]*$")?,
            namespace_line: Regex::new(r"(?m)^namespace\s+[^;\n]+;[^\n]*$")?,
        })
    }

    pub fn declaration(&self) -> &str {
        &self.declaration
    }

    pub fn is_declared(&self, text: &str) -> bool {
        self.declared.is_match(text)
    }

    pub fn ensure_declared<'t>(&self, text: &'t str) -> (Cow<'t, str>, Injection) {
        if self.is_declared(text) {
            return (Cow::Borrowed(text), Injection::AlreadyDeclared);
        }

        if let Some(last_import) = self.import_line.find_iter(text).last() {
            let (pos, eol) = line_end(last_import.as_str(), last_import.end());
            let insertion = format!("{}{}", eol, self.declaration);
            return (
                Cow::Owned(insert_at(text, pos, &insertion)),
                Injection::AfterImports,
            );
        }

        if let Some(namespace) = self.namespace_line.find(text) {
            let (pos, eol) = line_end(namespace.as_str(), namespace.end());
            let insertion = format!("{}{}{}", eol, eol, self.declaration);
            return (
                Cow::Owned(insert_at(text, pos, &insertion)),
                Injection::AfterNamespace,
            );
        }

        (Cow::Borrowed(text), Injection::NoSafeAnchor)
    }
}

/// Insertion point before a matched line's terminator, and the terminator
/// new lines should reuse
fn line_end(line: &str, end: usize) -> (usize, &'static str) {
    if line.ends_with('\r') {
        (end - 1, "\r\n")
    } else {
        (end, "\n")
    }
}

fn insert_at(text: &str, pos: usize, insertion: &str) -> String {
    let mut out = String::with_capacity(text.len() + insertion.len());
    out.push_str(&text[..pos]);
    out.push_str(insertion);
    out.push_str(&text[pos..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn injector() -> ImportInjector {
        ImportInjector::new(&Vocabulary::session_status()).unwrap()
    }

    #[test]
    fn test_inserts_after_last_import() {
        let text = "<?php\n\nnamespace App\\Services;\n\nuse App\\Models\\User;\nuse Illuminate\\Support\\Collection;\n\nclass Foo\n{\n    use HasFactory;\n}\n";
        let (out, injection) = injector().ensure_declared(text);

        assert_eq!(injection, Injection::AfterImports);
        assert_eq!(
            out,
            "<?php\n\nnamespace App\\Services;\n\nuse App\\Models\\User;\nuse Illuminate\\Support\\Collection;\nuse App\\Enums\\SessionStatus;\n\nclass Foo\n{\n    use HasFactory;\n}\n"
        );
    }

    #[test]
    fn test_inserts_after_namespace() {
        let text = "<?php\n\nnamespace App\\Jobs;\n\nclass Foo {}\n";
        let (out, injection) = injector().ensure_declared(text);

        assert_eq!(injection, Injection::AfterNamespace);
        assert_eq!(
            out,
            "<?php\n\nnamespace App\\Jobs;\n\nuse App\\Enums\\SessionStatus;\n\nclass Foo {}\n"
        );
    }

    #[test]
    fn test_existing_declaration_is_left_alone() {
        let text = "<?php\nnamespace App;\nuse App\\Enums\\SessionStatus;\nuse App\\Models\\User;\n";
        let (out, injection) = injector().ensure_declared(text);

        assert_eq!(injection, Injection::AlreadyDeclared);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out, text);
    }

    #[test]
    fn test_leading_backslash_counts_as_declared() {
        let text = "<?php\nuse \\App\\Enums\\SessionStatus;\n";
        assert!(injector().is_declared(text));
    }

    #[test]
    fn test_group_import_counts_as_declared() {
        let injector = injector();

        assert!(injector.is_declared("<?php\nuse App\\Enums\\{SessionStatus, Other};\n"));
        assert!(injector.is_declared("<?php\nuse App\\Enums\\{Other, SessionStatus};\n"));
        assert!(injector.is_declared("<?php\nuse App\\Enums\\{\n    Other,\n    SessionStatus,\n};\n"));
        assert!(!injector.is_declared("<?php\nuse App\\Enums\\{SessionStatusLog, Other};\n"));

        let text = "<?php\nnamespace App;\nuse App\\Enums\\{Other, SessionStatus};\n";
        let (out, injection) = injector.ensure_declared(text);
        assert_eq!(injection, Injection::AlreadyDeclared);
        assert_eq!(out, text);
    }

    #[test]
    fn test_aliased_import_counts_as_declared() {
        let injector = injector();

        assert!(injector.is_declared("<?php\nuse App\\Enums\\SessionStatus as Status;\n"));
        assert!(injector.is_declared("<?php\nuse App\\Enums\\{SessionStatus as Status};\n"));
        assert!(!injector.is_declared("<?php\nuse App\\Enums\\SessionStatusLog;\n"));
    }

    #[test]
    fn test_crlf_files_keep_crlf_line_endings() {
        let injector = injector();

        let text = "<?php\r\nnamespace App;\r\n\r\nuse App\\Models\\User;\r\n\r\nclass A {}\r\n";
        let (out, injection) = injector.ensure_declared(text);
        assert_eq!(injection, Injection::AfterImports);
        assert_eq!(
            out,
            "<?php\r\nnamespace App;\r\n\r\nuse App\\Models\\User;\r\nuse App\\Enums\\SessionStatus;\r\n\r\nclass A {}\r\n"
        );

        let text = "<?php\r\nnamespace App;\r\n\r\nclass A {}\r\n";
        let (out, injection) = injector.ensure_declared(text);
        assert_eq!(injection, Injection::AfterNamespace);
        assert_eq!(
            out,
            "<?php\r\nnamespace App;\r\n\r\nuse App\\Enums\\SessionStatus;\r\n\r\nclass A {}\r\n"
        );
    }

    #[test]
    fn test_no_anchor_is_a_no_op() {
        let text = "<?php\n\nreturn ['status' => 'ready'];\n";
        let (out, injection) = injector().ensure_declared(text);

        assert_eq!(injection, Injection::NoSafeAnchor);
        assert!(!injection.inserted());
        assert_eq!(out, text);
    }

    #[test]
    fn test_second_pass_is_idempotent() {
        let injector = injector();
        let (once, _) = injector.ensure_declared("<?php\nnamespace App;\n\nclass A {}\n");
        let (twice, injection) = injector.ensure_declared(&once);

        assert_eq!(injection, Injection::AlreadyDeclared);
        assert_eq!(twice, once);
    }
}
