// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Developer tool commands: fmt, explain.

use std::fs;
use std::path::PathBuf;

use colored::Colorize;
use tracing::info;

use c3_diagnostics::codes::ErrorCodeRegistry;
use c3_fmt::{format_source_with_config, FormatConfig};
use c3_parser::{parse_source, ParseConfig};

use super::{read_source, CliError, CmdResult};
use crate::output;

pub fn cmd_fmt(files: &[PathBuf], check_only: bool, indent_width: usize) -> CmdResult {
    let config = FormatConfig { indent_width };
    let mut clean = true;

    for path in files {
        let name = path.display().to_string();
        let source = read_source(path)?;

        if !parse_source(&source, &ParseConfig::default()).is_ok() {
            eprintln!(
                "{}: {} has syntax errors, not formatted",
                output::warning_label(),
                output::file_path(&name)
            );
            clean = false;
            continue;
        }

        let formatted = format_source_with_config(&source, &config);
        if formatted == source {
            if check_only {
                println!("{} {}", output::status_pass(), output::file_path(&name));
            }
            continue;
        }

        if check_only {
            println!("{} {} (would reformat)", output::status_fail(), output::file_path(&name));
            clean = false;
            continue;
        }

        fs::write(path, &formatted).map_err(|source| CliError::Write { path: name.clone(), source })?;
        info!(file = %name, "formatted");
        println!("Formatted {}", output::file_path(&name));
    }
    Ok(clean)
}

pub fn cmd_explain(code: &str) -> CmdResult {
    let registry = ErrorCodeRegistry::default();
    let code = code.to_ascii_uppercase();
    let info = registry.get(&code).ok_or_else(|| CliError::UnknownCode(code.clone()))?;

    println!("{}[{}]: {}", "error".red().bold(), info.code.red().bold(), info.title.bold());
    println!();
    println!("  Category: {}", info.category);
    println!();
    println!("  Run `c3p check <file>` to see this error in context.");
    Ok(true)
}
