// SPDX-License-Identifier: (MIT OR Apache-2.0)

//! End-to-end tests for the `c3p` binary.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn c3p(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_c3p"))
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run c3p")
}

/// Write `source` to a fresh file under the temp dir.
fn temp_file(name: &str, source: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("c3p_cli_{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, source).unwrap();
    path
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn parse_clean_file() {
    let path = temp_file("clean.c3", "module app;\nfn void main() {}\n");
    let out = c3p(&["parse", path.to_str().unwrap()]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stdout(&out).contains("Parse OK"));
}

#[test]
fn parse_reports_error_code() {
    let path = temp_file("broken.c3", "fn void f() { x = ; return 1; }\n");
    let out = c3p(&["parse", path.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("E01"), "{}", err);
    assert!(err.contains("broken.c3:1:"), "{}", err);
}

#[test]
fn parse_json_report() {
    let path = temp_file("json.c3", "fn void f() { x = ; }\n");
    let out = c3p(&["parse", "--format", "json", path.to_str().unwrap()]);
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error_count"], 1);
    assert_eq!(json["diagnostics"][0]["location"]["line"], 1);
}

#[test]
fn lex_prints_tokens() {
    let path = temp_file("lex.c3", "int x = 0x1A;\n");
    let out = c3p(&["lex", path.to_str().unwrap()]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("0x1A"), "{}", text);
    assert!(text.contains("Lex OK"));
}

#[test]
fn lex_error_is_lexical_code() {
    let path = temp_file("lexbad.c3", "String s = \"\\xZZ\";\nchar c = '\\q';\n");
    let out = c3p(&["lex", path.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("E0003"), "{}", err);
    assert!(err.contains("lexbad.c3:1:"), "{}", err);
    assert!(!err.contains("lexbad.c3:2:"), "{}", err);
}

#[test]
fn dump_shows_precedence() {
    let path = temp_file("dump.c3", "int x = 1 + 2 * 3;\n");
    let out = c3p(&["dump", path.to_str().unwrap()]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("(+ 1 (* 2 3))"), "{}", stdout(&out));

    let out = c3p(&["dump", "--spans", path.to_str().unwrap()]);
    assert!(stdout(&out).contains("global@1:1"), "{}", stdout(&out));
}

#[test]
fn fmt_check_and_write() {
    let path = temp_file("fmt.c3", "fn void f(){return;}\n");
    let out = c3p(&["fmt", "--check", path.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stdout(&out).contains("would reformat"));

    let out = c3p(&["fmt", path.to_str().unwrap()]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert_eq!(fs::read_to_string(&path).unwrap(), "fn void f() {\n    return;\n}\n");

    let out = c3p(&["fmt", "--check", path.to_str().unwrap()]);
    assert!(out.status.success());
}

#[test]
fn check_many_files() {
    let good = temp_file("good.c3", "const A = 1;\n");
    let bad = temp_file("bad.c3", "struct S {}\n");
    let out = c3p(&["check", good.to_str().unwrap(), bad.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(1));
    let text = stdout(&out);
    assert!(text.contains("1 passed, 1 failed"), "{}", text);
    assert!(text.find("good.c3") < text.find("bad.c3"));
}

#[test]
fn check_json_lists_every_file() {
    let a = temp_file("a.c3", "const A = 1;\n");
    let b = temp_file("b.c3", "const B = 2;\n");
    let out = c3p(&["check", "--format", "json", a.to_str().unwrap(), b.to_str().unwrap()]);
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json.as_array().map(Vec::len), Some(2));
}

#[test]
fn explain_known_and_unknown_codes() {
    let out = c3p(&["explain", "e0101"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("E0101"));

    let out = c3p(&["explain", "E9999"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("unknown error code"));
}

#[test]
fn missing_file_exits_with_two() {
    let out = c3p(&["parse", "/nonexistent/nope.c3"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("nope.c3"));
}

#[test]
fn trace_flag_emits_parser_events() {
    let path = temp_file("trace.c3", "const A = 1;\n");
    let out = c3p(&["--trace", "parse", path.to_str().unwrap()]);
    assert!(out.status.success());
    assert!(stderr(&out).contains("TRACE"), "{}", stderr(&out));
}
