// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Printing a tree and parsing the result must give back the same tree.

use std::fs;
use std::path::PathBuf;

use c3_fmt::{dump_unit, format_source, print_unit, DumpConfig, FormatConfig};
use c3_parser::{parse_source, ParseConfig};

fn fixtures() -> Vec<(String, String)> {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    let mut files: Vec<_> = fs::read_dir(&dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "c3"))
        .collect();
    files.sort();
    assert!(!files.is_empty(), "no fixtures in {}", dir.display());
    files
        .into_iter()
        .map(|p| {
            let name = p.file_name().unwrap().to_string_lossy().into_owned();
            (name, fs::read_to_string(&p).unwrap())
        })
        .collect()
}

fn dump(name: &str, src: &str) -> String {
    let out = parse_source(src, &ParseConfig::default());
    assert!(
        out.is_ok(),
        "{}: lex errors {:?}, parse errors {:?}\n{}",
        name,
        out.lex_errors,
        out.errors,
        src
    );
    dump_unit(&out.unit, &DumpConfig::default())
}

#[test]
fn formatted_source_parses_to_the_same_tree() {
    for (name, src) in fixtures() {
        let formatted = format_source(&src);
        assert_eq!(dump(&name, &src), dump(&name, &formatted), "{}:\n{}", name, formatted);
    }
}

#[test]
fn printed_tree_parses_to_the_same_tree() {
    for (name, src) in fixtures() {
        let out = parse_source(&src, &ParseConfig::default());
        let printed = print_unit(&out.unit, &FormatConfig::default());
        assert_eq!(dump(&name, &src), dump(&name, &printed), "{}:\n{}", name, printed);
    }
}

#[test]
fn formatting_is_idempotent() {
    for (name, src) in fixtures() {
        let once = format_source(&src);
        let twice = format_source(&once);
        assert_eq!(once, twice, "{} is not stable", name);
    }
}

#[test]
fn comments_survive_formatting() {
    let (_, src) = fixtures()
        .into_iter()
        .find(|(name, _)| name == "comments.c3")
        .unwrap();
    assert_eq!(format_source(&src), src);
}

#[test]
fn docs_survive_printing() {
    for (name, src) in fixtures() {
        let out = parse_source(&src, &ParseConfig::default());
        let printed = print_unit(&out.unit, &FormatConfig::default());
        let reparsed = parse_source(&printed, &ParseConfig::default());
        let docs = |decls: &[c3_ast::decl::Decl]| -> Vec<_> {
            decls.iter().map(|d| d.doc.clone()).map(|d| d.map(|d| (d.body, d.contracts))).collect()
        };
        assert_eq!(docs(&out.unit.decls), docs(&reparsed.unit.decls), "{}", name);
    }
}
