// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! JSON diagnostic output for machine consumption.
//!
//! Use `--format json` with `c3p parse` or `c3p check` to get this output.

use serde::Serialize;

use c3_ast::LineMap;

use crate::codes::ErrorCodeRegistry;
use crate::{Diagnostic, LabelStyle, Severity};

/// All diagnostics for one file.
#[derive(Debug, Serialize)]
pub struct DiagnosticReport {
    /// Schema version for forward compatibility.
    pub version: u32,
    pub file: String,
    /// No error-severity diagnostics.
    pub success: bool,
    pub diagnostics: Vec<JsonDiagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
}

#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    pub labels: Vec<JsonLabel>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

/// 1-based line and column plus the byte offset.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
    pub byte_offset: usize,
    pub source_line: String,
}

#[derive(Debug, Serialize)]
pub struct JsonLabel {
    pub role: LabelStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub start: SourceLocation,
    pub end: SourceLocation,
}

/// Build a report for `file` from diagnostics over `source`.
pub fn to_json_report(diagnostics: &[Diagnostic], source: &str, file: &str) -> DiagnosticReport {
    let registry = ErrorCodeRegistry::default();
    let line_map = LineMap::new(source);
    let locate = |offset: usize| {
        let (line, column) = line_map.offset_to_line_col(offset);
        SourceLocation {
            line,
            column,
            byte_offset: offset,
            source_line: line_map.line_text(source, line).unwrap_or("").to_string(),
        }
    };

    let diagnostics: Vec<JsonDiagnostic> = diagnostics
        .iter()
        .map(|d| {
            let code = d.code.as_ref().map(|c| c.0.clone());
            JsonDiagnostic {
                severity: d.severity,
                category: code.as_deref().and_then(|c| registry.get(c)).map(|i| i.category.to_string()),
                code,
                message: d.message.clone(),
                location: d.primary_span().map(|s| locate(s.start)),
                labels: d
                    .labels
                    .iter()
                    .map(|l| JsonLabel {
                        role: l.style,
                        message: l.message.clone(),
                        start: locate(l.span.start),
                        end: locate(l.span.end),
                    })
                    .collect(),
                notes: d.notes.clone(),
                help: d.help.as_ref().map(|h| h.message.clone()),
            }
        })
        .collect();

    let error_count = diagnostics.iter().filter(|d| d.severity == Severity::Error).count();
    let warning_count = diagnostics.iter().filter(|d| d.severity == Severity::Warning).count();
    DiagnosticReport {
        version: 1,
        file: file.to_string(),
        success: error_count == 0,
        diagnostics,
        error_count,
        warning_count,
    }
}

/// Serialize a report to pretty JSON.
pub fn to_json_string(report: &DiagnosticReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect_diagnostics;
    use c3_parser::{parse_source, ParseConfig};

    #[test]
    fn report_shape() {
        let src = "fn void f() {\n  x = ;\n}";
        let out = parse_source(src, &ParseConfig::default());
        let diags = collect_diagnostics(&out.lex_errors, &out.errors);
        let report = to_json_report(&diags, src, "a.c3");
        assert!(!report.success);
        assert_eq!(report.error_count, 1);

        let value: serde_json::Value =
            serde_json::from_str(&to_json_string(&report)).expect("valid json");
        let first = &value["diagnostics"][0];
        assert_eq!(first["severity"], "error");
        assert_eq!(first["code"], "E0100");
        assert_eq!(first["category"], "Syntax");
        assert_eq!(first["location"]["line"], 2);
        assert_eq!(first["location"]["column"], 7);
        assert_eq!(first["labels"][0]["role"], "primary");
    }

    #[test]
    fn clean_file_succeeds() {
        let report = to_json_report(&[], "", "empty.c3");
        assert!(report.success);
        assert_eq!(report.warning_count, 0);
    }
}
