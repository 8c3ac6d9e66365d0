// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Command implementations.

pub mod check;
pub mod inspect;
pub mod tools;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use c3_diagnostics::formatter::DiagnosticFormatter;
use c3_diagnostics::Diagnostic;

/// Failures that stop a command before it can report on its input.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("reading {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("writing {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("no .c3 files found in {0}")]
    NoFiles(String),
    #[error("unknown error code `{0}`")]
    UnknownCode(String),
    #[error("worker thread panicked while checking {0}")]
    Panicked(String),
    #[error("serializing report: {0}")]
    Json(#[from] serde_json::Error),
}

/// `Ok(true)` when the input was clean.
pub type CmdResult = Result<bool, CliError>;

pub fn read_source(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.display().to_string(),
        source,
    })
}

/// All `.c3` files below `dir`, sorted.
pub fn collect_c3_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let Ok(entries) = fs::read_dir(&dir) else { continue };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "c3") {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}

/// Render diagnostics for the terminal, with the file name in each header.
pub fn render_diagnostics(source: &str, file: &str, diagnostics: &[Diagnostic]) -> String {
    DiagnosticFormatter::new(source).with_file_name(file).format_all(diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_nested_c3_files() {
        let root = std::env::temp_dir().join(format!("c3p_collect_{}", std::process::id()));
        let nested = root.join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(root.join("top.c3"), "").unwrap();
        fs::write(nested.join("deep.c3"), "").unwrap();
        fs::write(nested.join("notes.txt"), "").unwrap();

        let files = collect_c3_files(&root);
        fs::remove_dir_all(&root).unwrap();

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().unwrap() == "c3"));
    }

    #[test]
    fn read_error_names_the_file() {
        let err = read_source(Path::new("/nonexistent/missing.c3")).unwrap_err();
        assert!(err.to_string().contains("missing.c3"));
    }
}
