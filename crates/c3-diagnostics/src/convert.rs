// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Conversions from lexer and parser errors to `Diagnostic`.

use c3_ast::token::Keyword;
use c3_lexer::{LexError, LexErrorKind};
use c3_parser::{ParseError, ParseErrorKind};

use crate::codes;
use crate::suggestions::closest_match;
use crate::{Diagnostic, ToDiagnostic};

// ============================================================================
// Lex Errors
// ============================================================================

impl ToDiagnostic for LexError {
    fn to_diagnostic(&self) -> Diagnostic {
        let (code, label) = match &self.kind {
            LexErrorKind::InvalidCharacter(_) => (codes::INVALID_CHARACTER, "not valid here"),
            LexErrorKind::UnterminatedLiteral(_) => (codes::UNTERMINATED_LITERAL, "starts here"),
            LexErrorKind::InvalidEscape => (codes::INVALID_ESCAPE, "malformed escape"),
            LexErrorKind::InvalidNumericSuffix(_) => (codes::INVALID_NUMERIC_SUFFIX, "float literal"),
            LexErrorKind::MalformedNumber => (codes::MALFORMED_NUMBER, "in this literal"),
        };

        let mut diag = Diagnostic::error(self.kind.to_string())
            .with_code(code)
            .with_primary(self.span, label);
        if let Some(hint) = self.hint() {
            diag = diag.with_help(hint);
        }
        diag
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

impl ToDiagnostic for ParseError {
    fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = match &self.kind {
            ParseErrorKind::UnexpectedToken { .. } => Diagnostic::error(self.message())
                .with_code(codes::UNEXPECTED_TOKEN)
                .with_primary(self.span, "unexpected here"),
            ParseErrorKind::MissingExpectedToken { expected } => Diagnostic::error(self.message())
                .with_code(codes::MISSING_TOKEN)
                .with_primary(self.span, format!("{} inserted here", expected)),
            ParseErrorKind::AmbiguousConstruct { .. } => Diagnostic::warning(self.message())
                .with_code(codes::AMBIGUOUS_CONSTRUCT)
                .with_primary(self.span, "read as a parenthesised type"),
            ParseErrorKind::Structural { .. } => Diagnostic::error(self.message())
                .with_code(codes::STRUCTURAL)
                .with_primary(self.span, "here"),
        };

        if let Some(ref hint) = self.hint {
            diag = diag.with_help(hint.as_str());
        }
        if let ParseErrorKind::UnexpectedToken { found, .. } = &self.kind {
            if let Some(keyword) = misspelled_keyword(found) {
                // the keyword fix takes the help slot; a parser hint becomes a note
                if let Some(help) = diag.help.take() {
                    diag = diag.with_note(help.message);
                }
                diag = diag
                    .with_help(format!("did you mean `{}`?", keyword))
                    .with_suggestion(self.span, keyword);
            }
        }
        diag
    }
}

/// `identifier 'retrun'` -> `return`
fn misspelled_keyword(found: &str) -> Option<&'static str> {
    let word = found.strip_prefix("identifier '")?.strip_suffix('\'')?;
    closest_match(word, Keyword::ALL.iter().map(|kw| kw.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Severity;
    use c3_parser::{parse_source, ParseConfig};

    fn diags(src: &str) -> Vec<Diagnostic> {
        let out = parse_source(src, &ParseConfig::default());
        crate::collect_diagnostics(&out.lex_errors, &out.errors)
    }

    #[test]
    fn lex_error_codes() {
        let d = diags("fn void f() { int x = 0x; }");
        assert_eq!(d[0].code.as_ref().map(|c| c.0.as_str()), Some(codes::MALFORMED_NUMBER));
        let d = diags("const S = \"abc");
        assert_eq!(d[0].code.as_ref().map(|c| c.0.as_str()), Some(codes::UNTERMINATED_LITERAL));
        assert!(d[0].help.is_some());
    }

    #[test]
    fn missing_semicolon_is_its_own_code() {
        let d = diags("fn void f() { return 1 }");
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].code.as_ref().map(|c| c.0.as_str()), Some(codes::MISSING_TOKEN));
    }

    #[test]
    fn ambiguity_is_a_warning() {
        let d = diags("fn void f() { x = (int*); }");
        assert!(d.iter().any(|d| d.severity == Severity::Warning));
    }

    #[test]
    fn structural_errors() {
        let d = diags("enum Empty {}");
        assert_eq!(d[0].code.as_ref().map(|c| c.0.as_str()), Some(codes::STRUCTURAL));
    }

    #[test]
    fn suggests_keyword_for_typo() {
        assert_eq!(misspelled_keyword("identifier 'retrun'"), Some("return"));
        assert_eq!(misspelled_keyword("';'"), None);
    }

    #[test]
    fn typo_carries_a_replacement() {
        let d = diags("strcut Foo { int a; }");
        let help = d[0].help.as_ref().expect("help");
        assert_eq!(help.message, "did you mean `struct`?");
        let suggestion = help.suggestion.as_ref().expect("suggestion");
        assert_eq!(suggestion.replacement, "struct");
        assert_eq!((suggestion.span.start, suggestion.span.end), (0, 6));
    }
}
