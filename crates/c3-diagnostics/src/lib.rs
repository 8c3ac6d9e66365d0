// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Diagnostics for the C3 front-end.
//!
//! Lexer and parser errors are converted to one `Diagnostic` type through
//! `ToDiagnostic`, then rendered for the terminal or as JSON.

pub mod codes;
pub mod convert;
pub mod formatter;
pub mod json;
pub mod suggestions;

use c3_ast::Span;
use c3_lexer::LexError;
use c3_parser::ParseError;
use serde::Serialize;

// ============================================================================
// Core Types
// ============================================================================

/// A compiler diagnostic with rich context for display.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Option<ErrorCode>,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    pub help: Option<Help>,
}

/// A labeled source span within a diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct Label {
    pub span: Span,
    pub style: LabelStyle,
    pub message: Option<String>,
}

/// How a label should be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelStyle {
    /// Primary error location (red underline).
    Primary,
    /// Related location (yellow/blue underline).
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

/// An error code like E0100.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct ErrorCode(pub String);

/// Actionable help attached to a diagnostic.
#[derive(Debug, Clone, Serialize)]
pub struct Help {
    pub message: String,
    pub suggestion: Option<CodeSuggestion>,
}

/// A concrete code change suggestion.
#[derive(Debug, Clone, Serialize)]
pub struct CodeSuggestion {
    pub span: Span,
    pub replacement: String,
}

// ============================================================================
// Builder API
// ============================================================================

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(ErrorCode(code.into()));
        self
    }

    pub fn with_label(mut self, span: Span, style: LabelStyle, msg: impl Into<String>) -> Self {
        self.labels.push(Label {
            span,
            style,
            message: Some(msg.into()),
        });
        self
    }

    pub fn with_primary(self, span: Span, msg: impl Into<String>) -> Self {
        self.with_label(span, LabelStyle::Primary, msg)
    }

    pub fn with_secondary(self, span: Span, msg: impl Into<String>) -> Self {
        self.with_label(span, LabelStyle::Secondary, msg)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(Help {
            message: help.into(),
            suggestion: None,
        });
        self
    }

    pub fn with_suggestion(mut self, span: Span, replacement: impl Into<String>) -> Self {
        if let Some(ref mut help) = self.help {
            help.suggestion = Some(CodeSuggestion {
                span,
                replacement: replacement.into(),
            });
        }
        self
    }

    /// Returns the primary span (first primary label, or first label).
    pub fn primary_span(&self) -> Option<Span> {
        self.labels
            .iter()
            .find(|l| l.style == LabelStyle::Primary)
            .or(self.labels.first())
            .map(|l| l.span)
    }
}

// ============================================================================
// Conversion Trait
// ============================================================================

/// Convert a front-end error into a rich diagnostic.
pub trait ToDiagnostic {
    fn to_diagnostic(&self) -> Diagnostic;
}

/// Merge lexer and parser errors into one list ordered by position.
pub fn collect_diagnostics(lex_errors: &[LexError], parse_errors: &[ParseError]) -> Vec<Diagnostic> {
    let mut diags: Vec<Diagnostic> = lex_errors
        .iter()
        .map(ToDiagnostic::to_diagnostic)
        .chain(parse_errors.iter().map(ToDiagnostic::to_diagnostic))
        .collect();
    // stable sort keeps lexer errors first at equal offsets
    diags.sort_by_key(|d| d.primary_span().map(|s| s.start).unwrap_or(0));
    diags
}

/// Number of error-severity diagnostics.
pub fn error_count(diags: &[Diagnostic]) -> usize {
    diags.iter().filter(|d| d.severity == Severity::Error).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use c3_parser::{parse_source, ParseConfig};

    #[test]
    fn collects_in_source_order() {
        let out = parse_source("fn void f() { x = ; String s = \"\\xZZ\"; }", &ParseConfig::default());
        let diags = collect_diagnostics(&out.lex_errors, &out.errors);
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].code.as_ref().map(|c| c.0.as_str()), Some("E0100"));
        assert_eq!(diags[1].code.as_ref().map(|c| c.0.as_str()), Some("E0003"));
        assert_eq!(error_count(&diags), 2);
    }

    #[test]
    fn builder_keeps_first_primary_span() {
        let d = Diagnostic::error("oops")
            .with_secondary(Span::new(0, 1, 1, 1), "first")
            .with_primary(Span::new(4, 6, 1, 5), "here");
        assert_eq!(d.primary_span().map(|s| s.start), Some(4));
    }
}
