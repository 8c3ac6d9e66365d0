// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Pretty printing and tree dumps for C3 syntax trees.

mod comment;
mod config;
mod dump;
mod printer;

pub use config::{DumpConfig, FormatConfig};
pub use dump::{dump_expr, dump_unit};

use c3_ast::TranslationUnit;
use c3_parser::{parse_source, ParseConfig};

/// Print a tree as canonical C3 source.
///
/// Comments are not part of the tree, so only doc comments survive.
pub fn print_unit(unit: &TranslationUnit, config: &FormatConfig) -> String {
    let mut p = printer::Printer::new(config);
    p.format_unit(unit);
    p.finish()
}

/// Print a single expression.
pub fn print_expr(expr: &c3_ast::expr::Expr, config: &FormatConfig) -> String {
    let mut p = printer::Printer::new(config);
    p.format_expr(expr);
    p.finish().trim_end().to_string()
}

/// Format C3 source code with default configuration.
/// Returns the original text if it does not parse cleanly.
pub fn format_source(source: &str) -> String {
    format_source_with_config(source, &FormatConfig::default())
}

/// Format C3 source code with custom configuration.
pub fn format_source_with_config(source: &str, config: &FormatConfig) -> String {
    let out = parse_source(source, &ParseConfig::default());
    if !out.is_ok() {
        tracing::debug!(
            lex_errors = out.lex_errors.len(),
            errors = out.errors.len(),
            "source has errors, leaving it unformatted"
        );
        return source.to_string();
    }

    let comments = comment::CommentList::from_spans(source, &out.comments);
    let mut p = printer::Printer::with_source(source, comments, config);
    p.format_unit(&out.unit);
    p.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broken_source_is_left_alone() {
        let src = "fn void f( {";
        assert_eq!(format_source(src), src);
    }

    #[test]
    fn normalizes_spacing() {
        let src = "fn   int add(int a,int b){return a+b;}";
        assert_eq!(format_source(src), "fn int add(int a, int b) {\n    return a + b;\n}\n");
    }

    #[test]
    fn keeps_comments() {
        let src = "// header\nmodule app;\n\nfn void f() {\n    g(); // call\n}\n";
        assert_eq!(format_source(src), src);
    }

    #[test]
    fn trailing_comment_gets_one_space() {
        let src = "fn void f() {\n    g();      // call\n}\n";
        assert_eq!(format_source(src), "fn void f() {\n    g(); // call\n}\n");
    }

    #[test]
    fn indent_width_is_configurable() {
        let config = FormatConfig { indent_width: 2 };
        let out = format_source_with_config("fn void f() { return; }", &config);
        assert_eq!(out, "fn void f() {\n  return;\n}\n");
    }

    #[test]
    fn print_unit_rebuilds_docs() {
        let parsed = parse_source(
            "<*\n  Adds.\n  @param a \"x\"\n*>\nfn int id(int a) => a;",
            &ParseConfig::default(),
        );
        assert!(parsed.is_ok());
        let text = print_unit(&parsed.unit, &FormatConfig::default());
        assert!(text.starts_with("<*\n Adds.\n @param a \"x\"\n*>\nfn int id(int a) => a;"), "{}", text);
    }

    #[test]
    fn empty_source_stays_empty() {
        assert_eq!(format_source(""), "");
    }
}
