// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Lexer for the C3 language.
//!
//! Tokenizes source code into a stream of tokens for the parser. Comments
//! and whitespace are skipped; their spans and any doc blocks are returned
//! alongside the tokens.

mod lexer;

pub use lexer::{LexError, LexErrorKind, LexResult, Lexer};
