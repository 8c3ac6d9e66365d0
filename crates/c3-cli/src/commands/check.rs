// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `c3p check`: parse many files in parallel and report every diagnostic.
//!
//! Each worker owns its lexer and parser; results are printed in input
//! order once all workers are done.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::thread;

use tracing::info;

use c3_diagnostics::json::to_json_report;
use c3_diagnostics::{collect_diagnostics, error_count, Diagnostic};
use c3_parser::{parse_source, ParseConfig};

use super::{collect_c3_files, read_source, render_diagnostics, CliError, CmdResult};
use crate::{output, Format};

struct FileReport {
    name: String,
    source: String,
    diagnostics: Vec<Diagnostic>,
}

fn check_file(path: &Path, config: &ParseConfig) -> Result<FileReport, CliError> {
    let source = read_source(path)?;
    let out = parse_source(&source, config);
    let diagnostics = collect_diagnostics(&out.lex_errors, &out.errors);
    Ok(FileReport { name: path.display().to_string(), source, diagnostics })
}

fn expand_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>, CliError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let found = collect_c3_files(path);
            if found.is_empty() {
                return Err(CliError::NoFiles(path.display().to_string()));
            }
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

/// Parse `files` on up to `workers` threads, keeping input order.
fn check_all(files: &[PathBuf], config: &ParseConfig, workers: usize) -> Vec<Result<FileReport, CliError>> {
    if files.is_empty() {
        return Vec::new();
    }
    let per_worker = files.len().div_ceil(workers.max(1));
    thread::scope(|s| {
        let handles: Vec<_> = files
            .chunks(per_worker)
            .map(|chunk| {
                let handle = s.spawn(move || chunk.iter().map(|f| check_file(f, config)).collect::<Vec<_>>());
                (chunk, handle)
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|(chunk, handle)| match handle.join() {
                Ok(results) => results,
                Err(_) => chunk
                    .iter()
                    .map(|f| Err(CliError::Panicked(f.display().to_string())))
                    .collect(),
            })
            .collect()
    })
}

pub fn cmd_check(paths: &[PathBuf], config: &ParseConfig, format: Format) -> CmdResult {
    let files = expand_paths(paths)?;
    let workers = thread::available_parallelism().map_or(1, NonZeroUsize::get);
    info!(files = files.len(), workers, "checking");

    let results = check_all(&files, config, workers);

    let mut passed = 0;
    let mut failed = 0;
    let mut reports = Vec::new();
    for result in results {
        let report = match result {
            Ok(report) => report,
            Err(e) => {
                eprintln!("{}: {}", output::error_label(), e);
                failed += 1;
                continue;
            }
        };
        let errors = error_count(&report.diagnostics);
        if errors == 0 {
            passed += 1;
        } else {
            failed += 1;
        }

        match format {
            Format::Human => {
                if !report.diagnostics.is_empty() {
                    eprintln!("{}", render_diagnostics(&report.source, &report.name, &report.diagnostics));
                }
                if errors == 0 {
                    println!("{} {}", output::status_pass(), output::file_path(&report.name));
                } else {
                    println!(
                        "{} {} ({} errors)",
                        output::status_fail(),
                        output::file_path(&report.name),
                        errors
                    );
                }
            }
            Format::Json => reports.push(to_json_report(&report.diagnostics, &report.source, &report.name)),
        }
    }

    match format {
        Format::Human => println!("\n{}, {}", output::passed_count(passed), output::failed_count(failed)),
        Format::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }
    Ok(failed == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_files(tag: &str, sources: &[&str]) -> (PathBuf, Vec<PathBuf>) {
        let dir = std::env::temp_dir().join(format!("c3p_check_{}_{}", tag, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let files = sources
            .iter()
            .enumerate()
            .map(|(i, src)| {
                let path = dir.join(format!("f{:02}.c3", i));
                fs::write(&path, src).unwrap();
                path
            })
            .collect();
        (dir, files)
    }

    #[test]
    fn results_keep_input_order() {
        let sources: Vec<String> = (0..9).map(|i| format!("const C{} = {};", i, i)).collect();
        let refs: Vec<&str> = sources.iter().map(String::as_str).collect();
        let (dir, files) = temp_files("order", &refs);

        let results = check_all(&files, &ParseConfig::default(), 4);
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(results.len(), 9);
        for (i, result) in results.iter().enumerate() {
            let report = result.as_ref().unwrap();
            assert!(report.name.ends_with(&format!("f{:02}.c3", i)));
            assert!(report.diagnostics.is_empty());
        }
    }

    #[test]
    fn errors_stay_with_their_file() {
        let (dir, files) = temp_files("errors", &["fn void f() {}", "fn void g() { x = ; }"]);
        let results = check_all(&files, &ParseConfig::default(), 2);
        fs::remove_dir_all(&dir).unwrap();

        assert!(results[0].as_ref().unwrap().diagnostics.is_empty());
        assert_eq!(error_count(&results[1].as_ref().unwrap().diagnostics), 1);
    }

    #[test]
    fn missing_file_is_an_error_result() {
        let results = check_all(&[PathBuf::from("/nonexistent/x.c3")], &ParseConfig::default(), 1);
        assert!(matches!(results[0], Err(CliError::Read { .. })));
    }
}
