// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Parse errors.

use c3_ast::token::TokenKind;
use c3_ast::Span;
use thiserror::Error;

/// A syntax error with location and an optional fix-it hint.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("{}", format_expected_message(.expected, .found))]
    UnexpectedToken { expected: String, found: String },

    /// The parser acted as if the token were present and kept going.
    #[error("missing {expected}")]
    MissingExpectedToken { expected: String },

    #[error("ambiguous {construct}: {detail}")]
    AmbiguousConstruct { construct: String, detail: String },

    #[error("{message}")]
    Structural { message: String },
}

impl ParseError {
    pub(crate) fn expected(expected: &str, found: &TokenKind, span: Span) -> Self {
        let hint = crate::hints::for_expected(expected, found).map(String::from);
        Self {
            kind: ParseErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found: found.display_name(),
            },
            span,
            hint,
        }
    }

    pub(crate) fn missing(expected: &str, span: Span) -> Self {
        let hint = crate::hints::for_missing(expected).map(String::from);
        Self {
            kind: ParseErrorKind::MissingExpectedToken { expected: expected.to_string() },
            span,
            hint,
        }
    }

    pub(crate) fn ambiguous(construct: &str, detail: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ParseErrorKind::AmbiguousConstruct {
                construct: construct.to_string(),
                detail: detail.into(),
            },
            span,
            hint: None,
        }
    }

    pub(crate) fn structural(message: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ParseErrorKind::Structural { message: message.into() },
            span,
            hint: None,
        }
    }

    pub(crate) fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Headline without the hint, e.g. "expected ';', found '}'".
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

/// Format a user-friendly "expected X, found Y" message.
fn format_expected_message(expected: &str, found: &str) -> String {
    match expected {
        "'{'" => format!("expected '{{' to start block, found {}", found),
        "'}'" => format!("expected '}}' to close block, found {}", found),
        "')'" if found == "end of file" => "unclosed '(': missing ')'".to_string(),
        "']'" if found == "end of file" => "unclosed '[': missing ']'".to_string(),
        "'>)'" => format!("expected '>)' to close generic arguments, found {}", found),
        _ => format!("expected {}, found {}", expected, found),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_message_names_both_sides() {
        let e = ParseError::expected("expression", &TokenKind::Semi, Span::default());
        assert_eq!(e.message(), "expected expression, found ';'");
        assert!(e.hint.is_some());
    }

    #[test]
    fn unclosed_paren_at_eof() {
        let e = ParseError::expected("')'", &TokenKind::Eof, Span::default());
        assert_eq!(e.to_string(), "unclosed '(': missing ')'");
    }

    #[test]
    fn missing_token_message() {
        let e = ParseError::missing("';'", Span::default());
        assert_eq!(e.to_string(), "missing ';'");
        assert!(matches!(e.kind, ParseErrorKind::MissingExpectedToken { .. }));
    }
}
