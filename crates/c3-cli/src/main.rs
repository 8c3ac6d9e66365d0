// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! c3p - inspect, check and format C3 source files.

mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use c3_parser::{ParseConfig, TraceLevel};

#[derive(Debug, Parser)]
#[command(name = "c3p", version, about = "Lexer, parser and formatter for C3 source files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Trace every parser production (overrides RUST_LOG).
    #[arg(long, global = true)]
    pub trace: bool,

    /// Output format for diagnostics and reports.
    #[arg(long, global = true, value_enum, default_value_t = Format::Human)]
    pub format: Format,

    /// When to use colors.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Tab stop used for column numbers.
    #[arg(long, global = true, default_value_t = 4)]
    pub tab_width: usize,

    /// Stop at the first syntax error.
    #[arg(long, global = true)]
    pub no_recover: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the token stream of a file
    Lex { file: PathBuf },
    /// Parse a file and report diagnostics
    Parse { file: PathBuf },
    /// Print the syntax tree of a file as an S-expression
    Dump {
        file: PathBuf,
        /// Suffix every node with its line and column.
        #[arg(long)]
        spans: bool,
    },
    /// Format files in place
    Fmt {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Report files that would change instead of writing them.
        #[arg(long)]
        check: bool,
        /// Spaces per indentation level.
        #[arg(long, default_value_t = 4)]
        indent_width: usize,
    },
    /// Parse files and directories in parallel, reporting all diagnostics
    Check {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Explain an error code
    Explain { code: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Human,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl Cli {
    fn parse_config(&self) -> ParseConfig {
        ParseConfig {
            trace_level: if self.trace { TraceLevel::Verbose } else { TraceLevel::None },
            recover_on_error: !self.no_recover,
            tab_width: self.tab_width,
        }
    }
}

fn init_tracing(trace: bool) {
    let filter = if trace {
        EnvFilter::new("trace")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.trace);
    output::init(match cli.color {
        ColorChoice::Auto => None,
        ColorChoice::Always => Some(true),
        ColorChoice::Never => Some(false),
    });

    let config = cli.parse_config();
    let result = match &cli.command {
        Command::Lex { file } => commands::inspect::cmd_lex(file, &config, cli.format),
        Command::Parse { file } => commands::inspect::cmd_parse(file, &config, cli.format),
        Command::Dump { file, spans } => commands::inspect::cmd_dump(file, &config, *spans),
        Command::Fmt { files, check, indent_width } => {
            commands::tools::cmd_fmt(files, *check, *indent_width)
        }
        Command::Check { paths } => commands::check::cmd_check(paths, &config, cli.format),
        Command::Explain { code } => commands::tools::cmd_explain(code),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}: {}", output::error_label(), e);
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["c3p", "parse", "a.c3", "--trace", "--format", "json"]).unwrap();
        assert!(cli.trace);
        assert_eq!(cli.format, Format::Json);
        assert!(matches!(cli.command, Command::Parse { .. }));
        assert_eq!(cli.parse_config().trace_level, TraceLevel::Verbose);
    }

    #[test]
    fn fmt_defaults() {
        let cli = Cli::try_parse_from(["c3p", "fmt", "a.c3", "b.c3"]).unwrap();
        let Command::Fmt { files, check, indent_width } = cli.command else {
            panic!("expected fmt");
        };
        assert_eq!(files.len(), 2);
        assert!(!check);
        assert_eq!(indent_width, 4);
    }

    #[test]
    fn no_recover_maps_to_config() {
        let cli = Cli::try_parse_from(["c3p", "--no-recover", "check", "src"]).unwrap();
        assert!(!cli.parse_config().recover_on_error);
    }

    #[test]
    fn fmt_needs_a_file() {
        assert!(Cli::try_parse_from(["c3p", "fmt"]).is_err());
    }
}
