// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Terminal rendering of diagnostics.
//!
//! ```text
//! error[E0100]: expected expression, found ';'
//!   --> main.c3:3:9
//!    |
//!  3 |     x = ;
//!    |         ^ unexpected here
//!    |
//!    = help: statement is incomplete
//! ```

use std::collections::BTreeMap;

use colored::Colorize;

use c3_ast::LineMap;

use crate::{Diagnostic, Help, LabelStyle, Severity};

/// Apply `NO_COLOR` / `FORCE_COLOR` to the `colored` crate's global switch.
/// `force` wins over both.
pub fn configure_color(force: Option<bool>) {
    let enabled = match force {
        Some(on) => on,
        None if std::env::var_os("FORCE_COLOR").is_some() => true,
        None if std::env::var_os("NO_COLOR").is_some() => false,
        None => return,
    };
    colored::control::set_override(enabled);
}

/// Formats diagnostics for terminal output.
pub struct DiagnosticFormatter<'a> {
    source: &'a str,
    file_name: Option<&'a str>,
    line_map: LineMap,
}

/// A source line with its labels.
struct AnnotatedLine {
    line_num: usize,
    text: String,
    annotations: Vec<Annotation>,
}

struct Annotation {
    col_start: usize,
    col_end: usize,
    style: LabelStyle,
    message: Option<String>,
}

impl<'a> DiagnosticFormatter<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, file_name: None, line_map: LineMap::new(source) }
    }

    pub fn with_file_name(mut self, name: &'a str) -> Self {
        self.file_name = Some(name);
        self
    }

    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        let mut out = String::new();
        self.format_header(&mut out, diagnostic);

        let annotated = self.collect_annotated_lines(diagnostic);
        let Some(span) = diagnostic.primary_span() else {
            self.format_footer(&mut out, diagnostic);
            return out;
        };

        let (line, col) = self.offset_to_line_col(span.start);
        out.push_str(&format!(
            "  {} {}:{}:{}\n",
            "-->".blue(),
            self.file_name.unwrap_or("<source>"),
            line,
            col
        ));

        let max_line = annotated.last().map(|a| a.line_num).unwrap_or(1);
        let gutter = max_line.to_string().len().max(2);
        out.push_str(&format!("{} {}\n", " ".repeat(gutter + 1), "|".blue()));

        let mut prev_line: Option<usize> = None;
        for line in &annotated {
            if prev_line.is_some_and(|p| line.line_num > p + 1) {
                out.push_str(&format!("{} {}\n", " ".repeat(gutter), "...".blue()));
            }
            out.push_str(&format!(
                "{:>width$} {} {}\n",
                line.line_num.to_string().blue().bold(),
                "|".blue(),
                line.text,
                width = gutter + 1,
            ));
            self.format_annotations(&mut out, line, gutter);
            prev_line = Some(line.line_num);
        }

        self.format_footer(&mut out, diagnostic);
        out
    }

    /// Format every diagnostic, separated by blank lines.
    pub fn format_all(&self, diagnostics: &[Diagnostic]) -> String {
        diagnostics.iter().map(|d| self.format(d)).collect::<Vec<_>>().join("\n")
    }

    fn format_header(&self, out: &mut String, diagnostic: &Diagnostic) {
        let severity = match diagnostic.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Note => "note".blue().bold(),
        };
        match &diagnostic.code {
            Some(code) => out.push_str(&format!(
                "{}[{}]: {}\n",
                severity,
                code.0.as_str().red().bold(),
                diagnostic.message.bold()
            )),
            None => out.push_str(&format!("{}: {}\n", severity, diagnostic.message.bold())),
        }
    }

    fn format_footer(&self, out: &mut String, diagnostic: &Diagnostic) {
        const GUTTER: usize = 2;
        if !diagnostic.notes.is_empty() || diagnostic.help.is_some() {
            out.push_str(&format!("{} {}\n", " ".repeat(GUTTER + 1), "|".blue()));
        }
        for note in &diagnostic.notes {
            out.push_str(&format!(
                "{} {} {}: {}\n",
                " ".repeat(GUTTER + 1),
                "=".cyan(),
                "note".cyan().bold(),
                note
            ));
        }
        if let Some(help) = &diagnostic.help {
            self.format_help(out, help, GUTTER);
        }
    }

    fn format_help(&self, out: &mut String, help: &Help, gutter: usize) {
        out.push_str(&format!(
            "{} {} {}: {}\n",
            " ".repeat(gutter + 1),
            "=".cyan(),
            "help".cyan().bold(),
            help.message
        ));

        let Some(suggestion) = &help.suggestion else { return };
        let (line, col) = self.offset_to_line_col(suggestion.span.start);
        let Some(text) = self.get_line(line) else { return };
        let start = (col - 1).min(text.len());
        let end = (start + suggestion.span.len()).min(text.len());
        out.push_str(&format!(
            "{:>width$} {} {}{}{}\n",
            line.to_string().blue().bold(),
            "|".blue(),
            &text[..start],
            suggestion.replacement.green(),
            &text[end..],
            width = gutter + 1,
        ));
    }

    fn collect_annotated_lines(&self, diagnostic: &Diagnostic) -> Vec<AnnotatedLine> {
        let mut lines: BTreeMap<usize, AnnotatedLine> = BTreeMap::new();

        for label in &diagnostic.labels {
            let (line_num, col_start) = self.offset_to_line_col(label.span.start);
            let (end_line, col_end) = self.offset_to_line_col(label.span.end);
            let text = self.get_line(line_num).unwrap_or("");

            // multi-line spans are underlined to the end of the first line
            let col_end = if end_line == line_num { col_end } else { text.len() + 1 };

            let entry = lines.entry(line_num).or_insert_with(|| AnnotatedLine {
                line_num,
                text: text.to_string(),
                annotations: Vec::new(),
            });
            entry.annotations.push(Annotation {
                col_start,
                col_end: col_end.max(col_start + 1),
                style: label.style,
                message: label.message.clone(),
            });
        }

        lines.into_values().collect()
    }

    fn format_annotations(&self, out: &mut String, line: &AnnotatedLine, gutter: usize) {
        let mut sorted: Vec<&Annotation> = line.annotations.iter().collect();
        sorted.sort_by_key(|a| (a.style != LabelStyle::Primary, a.col_start));

        let width = line.text.len() + 2;
        let mut underline = vec![' '; width];
        for ann in &sorted {
            let ch = match ann.style {
                LabelStyle::Primary => '^',
                LabelStyle::Secondary => '-',
            };
            for slot in underline.iter_mut().take((ann.col_end - 1).min(width)).skip(ann.col_start - 1) {
                *slot = ch;
            }
        }
        let underline: String = underline.into_iter().collect::<String>().trim_end().to_string();
        if underline.is_empty() {
            return;
        }

        let messages: Vec<(&Annotation, &str)> =
            sorted.iter().filter_map(|a| a.message.as_deref().map(|m| (*a, m))).collect();
        let pad = " ".repeat(gutter + 1);

        if let [(ann, msg)] = messages.as_slice() {
            out.push_str(&format!("{} {} {} {}\n", pad, "|".blue(), color_underline(&underline), styled(ann.style, msg)));
            return;
        }

        out.push_str(&format!("{} {} {}\n", pad, "|".blue(), color_underline(&underline)));
        for (ann, msg) in messages.iter().rev() {
            out.push_str(&format!(
                "{} {} {}{}\n",
                pad,
                "|".blue(),
                " ".repeat(ann.col_start - 1),
                styled(ann.style, msg),
            ));
        }
    }

    /// 1-based (line, col).
    fn offset_to_line_col(&self, offset: usize) -> (usize, usize) {
        let (line, col) = self.line_map.offset_to_line_col(offset);
        (line as usize, col as usize)
    }

    fn get_line(&self, line_num: usize) -> Option<&str> {
        self.line_map.line_text(self.source, line_num as u32)
    }
}

fn styled(style: LabelStyle, msg: &str) -> String {
    match style {
        LabelStyle::Primary => msg.red().bold().to_string(),
        LabelStyle::Secondary => msg.blue().to_string(),
    }
}

/// `^` runs in red, `-` runs in blue.
fn color_underline(s: &str) -> String {
    let mut result = String::new();
    let mut run = String::new();
    let mut run_char = None;

    for ch in s.chars() {
        if Some(ch) != run_char && !run.is_empty() {
            result.push_str(&flush_run(&run, run_char));
            run.clear();
        }
        run.push(ch);
        run_char = Some(ch);
    }
    if !run.is_empty() {
        result.push_str(&flush_run(&run, run_char));
    }
    result
}

fn flush_run(run: &str, kind: Option<char>) -> String {
    match kind {
        Some('^') => run.red().bold().to_string(),
        Some('-') => run.blue().to_string(),
        _ => run.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect_diagnostics;
    use c3_parser::{parse_source, ParseConfig};

    fn render(src: &str) -> String {
        colored::control::set_override(false);
        let out = parse_source(src, &ParseConfig::default());
        let diags = collect_diagnostics(&out.lex_errors, &out.errors);
        DiagnosticFormatter::new(src).with_file_name("main.c3").format_all(&diags)
    }

    #[test]
    fn points_at_the_offending_token() {
        let text = render("fn void f() {\n    x = ;\n}\n");
        assert!(text.starts_with("error[E0100]: expected expression, found ';'"), "{}", text);
        assert!(text.contains("--> main.c3:2:9"), "{}", text);
        assert!(text.contains("2 |     x = ;"), "{}", text);
        assert!(text.contains("^ unexpected here"), "{}", text);
        assert!(text.contains("= help: statement is incomplete"), "{}", text);
    }

    #[test]
    fn keyword_typo_shows_the_fixed_line() {
        let text = render("strcut Foo { int a; }\n");
        assert!(text.contains("= help: did you mean `struct`?"), "{}", text);
        assert!(text.contains("1 | struct Foo { int a; }"), "{}", text);
    }

    #[test]
    fn diagnostic_without_labels() {
        colored::control::set_override(false);
        let text = DiagnosticFormatter::new("").format(&Diagnostic::error("no input"));
        assert_eq!(text, "error: no input\n");
    }
}
