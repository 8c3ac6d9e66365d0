// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Parser for the C3 language.
//!
//! Transforms a token stream into a concrete syntax tree. Parsing never
//! aborts: errors are collected and the tree built so far is returned.

mod config;
mod decl;
mod error;
mod expr;
mod hints;
mod parser;
mod precedence;
mod stmt;
mod types;

pub use config::{ParseConfig, TraceLevel};
pub use error::{ParseError, ParseErrorKind};
pub use parser::{ParseResult, Parser};
pub use precedence::Precedence;

use c3_ast::{Span, TranslationUnit};
use c3_lexer::{LexError, Lexer};

/// Everything produced from one source buffer.
#[derive(Debug)]
pub struct ParseOutput {
    pub unit: TranslationUnit,
    pub lex_errors: Vec<LexError>,
    pub errors: Vec<ParseError>,
    /// Spans of all comments, doc blocks included, in source order.
    pub comments: Vec<Span>,
}

impl ParseOutput {
    pub fn is_ok(&self) -> bool {
        self.lex_errors.is_empty() && self.errors.is_empty()
    }
}

/// Lex and parse a complete source buffer.
pub fn parse_source(src: &str, config: &ParseConfig) -> ParseOutput {
    let lexed = Lexer::new(src).with_tab_width(config.tab_width).tokenize();
    tracing::debug!(
        tokens = lexed.tokens.len(),
        lex_errors = lexed.errors.len(),
        "lexed source"
    );

    let span = match (lexed.tokens.first(), lexed.tokens.last()) {
        (Some(first), Some(last)) => first.span.to(last.span),
        _ => Span::default(),
    };
    let mut comments = lexed.comments;
    comments.extend(lexed.docs.iter().map(|d| d.span));
    comments.sort_by_key(|s| s.start);

    let result = Parser::with_config(lexed.tokens, config.clone())
        .with_docs(lexed.docs)
        .parse();
    tracing::debug!(decls = result.decls.len(), errors = result.errors.len(), "parsed source");

    ParseOutput {
        unit: TranslationUnit { decls: result.decls, span },
        lex_errors: lexed.errors,
        errors: result.errors,
        comments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use c3_ast::decl::DeclKind;

    fn parse(src: &str) -> ParseOutput {
        parse_source(src, &ParseConfig::default())
    }

    #[test]
    fn empty_source() {
        let out = parse("");
        assert!(out.is_ok());
        assert!(out.unit.decls.is_empty());
    }

    #[test]
    fn small_program() {
        let out = parse(
            "module app;\nimport std::io;\n\nfn void main() {\n    io::printn(\"hello\");\n}\n",
        );
        assert!(out.is_ok(), "errors: {:?}", out.errors);
        let tags: Vec<_> = out.unit.decls.iter().map(|d| d.tag()).collect();
        assert_eq!(tags, ["module", "import", "fn"]);
    }

    #[test]
    fn lex_errors_are_reported_separately() {
        let out = parse("fn void f() { String s = \"\\xZZ\"; }");
        assert_eq!(out.lex_errors.len(), 1);
        assert!(matches!(out.unit.decls[0].kind, DeclKind::Func(_)));
    }

    #[test]
    fn stop_at_first_error_without_recovery() {
        let config = ParseConfig { recover_on_error: false, ..ParseConfig::default() };
        let out = parse_source("int = ;\nint = ;\nfn void ok() {}", &config);
        assert_eq!(out.errors.len(), 1);
        assert!(out.unit.decls.is_empty());
    }

    #[test]
    fn errors_sorted_by_position() {
        let out = parse("fn void f() { a = ; }\nfn void g() { b = ; }");
        assert_eq!(out.errors.len(), 2);
        assert!(out.errors[0].span.start < out.errors[1].span.start);
    }

    #[test]
    fn comments_and_docs_are_collected_in_order() {
        let out = parse("// a\n<* doc *>\nfn void f() { /* b */ }");
        assert_eq!(out.comments.len(), 3);
        assert!(out.comments.windows(2).all(|w| w[0].start < w[1].start));
        assert!(out.unit.decls[0].doc.is_some());
    }

    #[test]
    fn unit_span_covers_source() {
        let src = "const A = 1;";
        let out = parse(src);
        assert_eq!(out.unit.span.start, 0);
        assert_eq!(out.unit.span.end, src.len());
    }
}
