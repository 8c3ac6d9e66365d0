// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Single-file inspection commands: lex, parse, dump.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use c3_diagnostics::json::{to_json_report, to_json_string, DiagnosticReport};
use c3_diagnostics::{collect_diagnostics, error_count, Diagnostic, ToDiagnostic};
use c3_fmt::{dump_unit, DumpConfig};
use c3_lexer::Lexer;
use c3_parser::{parse_source, ParseConfig};

use super::{read_source, render_diagnostics, CmdResult};
use crate::{output, Format};

#[derive(Serialize)]
struct TokenRow {
    kind: String,
    lexeme: String,
    line: u32,
    col: u32,
    start: usize,
    end: usize,
}

#[derive(Serialize)]
struct LexReport {
    tokens: Vec<TokenRow>,
    #[serde(flatten)]
    report: DiagnosticReport,
}

pub fn cmd_lex(path: &Path, config: &ParseConfig, format: Format) -> CmdResult {
    let source = read_source(path)?;
    let name = path.display().to_string();
    let lexed = Lexer::new(&source).with_tab_width(config.tab_width).tokenize();
    info!(file = %name, tokens = lexed.tokens.len(), errors = lexed.errors.len(), "lexed");

    let diagnostics: Vec<Diagnostic> = lexed.errors.iter().map(ToDiagnostic::to_diagnostic).collect();

    match format {
        Format::Human => {
            for tok in &lexed.tokens {
                println!(
                    "{} {:?} {}",
                    output::token_position(tok.span.line, tok.span.col),
                    tok.kind,
                    tok.lexeme
                );
            }
            if diagnostics.is_empty() {
                println!("\n{}", output::banner_ok("Lex"));
            } else {
                eprintln!("{}", render_diagnostics(&source, &name, &diagnostics));
                eprintln!("{}", output::banner_fail("Lex", diagnostics.len()));
            }
        }
        Format::Json => {
            let tokens = lexed
                .tokens
                .iter()
                .map(|tok| TokenRow {
                    kind: format!("{:?}", tok.kind),
                    lexeme: tok.lexeme.clone(),
                    line: tok.span.line,
                    col: tok.span.col,
                    start: tok.span.start,
                    end: tok.span.end,
                })
                .collect();
            let report = LexReport { tokens, report: to_json_report(&diagnostics, &source, &name) };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(lexed.errors.is_empty())
}

pub fn cmd_parse(path: &Path, config: &ParseConfig, format: Format) -> CmdResult {
    let source = read_source(path)?;
    let name = path.display().to_string();
    let out = parse_source(&source, config);
    let diagnostics = collect_diagnostics(&out.lex_errors, &out.errors);
    let errors = error_count(&diagnostics);
    info!(file = %name, decls = out.unit.decls.len(), errors, "parsed");

    match format {
        Format::Human => {
            if !diagnostics.is_empty() {
                eprintln!("{}", render_diagnostics(&source, &name, &diagnostics));
            }
            if errors == 0 {
                println!("{} ({} declarations)", output::banner_ok("Parse"), out.unit.decls.len());
            } else {
                eprintln!("{}", output::banner_fail("Parse", errors));
            }
        }
        Format::Json => println!("{}", to_json_string(&to_json_report(&diagnostics, &source, &name))),
    }
    Ok(errors == 0)
}

/// The dump goes to stdout even when the file has errors; diagnostics go
/// to stderr.
pub fn cmd_dump(path: &Path, config: &ParseConfig, spans: bool) -> CmdResult {
    let source = read_source(path)?;
    let name = path.display().to_string();
    let out = parse_source(&source, config);
    let diagnostics = collect_diagnostics(&out.lex_errors, &out.errors);
    if !diagnostics.is_empty() {
        eprintln!("{}", render_diagnostics(&source, &name, &diagnostics));
    }
    print!("{}", dump_unit(&out.unit, &DumpConfig { spans }));
    Ok(error_count(&diagnostics) == 0)
}
