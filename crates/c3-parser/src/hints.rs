// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error hints - suggestions for fixing common mistakes.
//!
//! Kept separate from the main parser to avoid clutter.

use c3_ast::token::{Keyword, TokenKind};

/// Get a hint for an "expected X" error based on what was found instead.
pub fn for_expected(expected: &str, found: &TokenKind) -> Option<&'static str> {
    match (expected, found) {
        // Terminators
        ("';'", TokenKind::RBrace) => Some("the last statement in a block still needs ';'"),
        ("';'", _) => Some("end statements and declarations with ';'"),

        // Blocks
        ("'{'", TokenKind::FatArrow) => Some("use either '=> expr;' or a '{ ... }' body"),
        ("'{'", _) => Some("blocks start with '{'"),
        ("'}'", TokenKind::Eof) => Some("every '{' needs a matching '}'"),

        // Parentheses
        ("'('", TokenKind::LBrace) => Some("conditions are written in parentheses: if (x) { ... }"),
        ("')'", TokenKind::Eof) => Some("add ')' to close the parenthesis"),
        ("']'", TokenKind::Eof) => Some("add ']' to close the bracket"),
        ("'>)'", _) => Some("generic arguments are written as Name(<Type, ...>)"),

        // Expressions
        ("expression", TokenKind::Semi) => Some("statement is incomplete"),
        ("expression", TokenKind::RParen) => Some("an operand is missing before ')'"),
        ("expression", TokenKind::Kw(Keyword::Else)) => Some("'else' must follow an if statement"),
        ("expression", _) => Some("try a value, variable, or function call"),

        // Names follow the case conventions of the language
        ("identifier", TokenKind::TypeIdent(_)) => {
            Some("names starting with an uppercase letter are types; use lowercase")
        }
        ("identifier", TokenKind::ConstIdent(_)) => {
            Some("all-uppercase names are constants; use lowercase")
        }
        ("identifier", TokenKind::Int(_)) => Some("names can't start with a number"),
        ("identifier", TokenKind::Kw(_)) => Some("keywords can't be used as names"),
        ("type name", TokenKind::Ident(_)) => Some("type names start with an uppercase letter: Foo"),
        ("constant name", _) => Some("constant names are all uppercase: FOO_BAR"),

        // Types
        ("type", TokenKind::Ident(_)) => {
            Some("lowercase names are values; types look like 'int', 'Foo' or 'foo::Bar'")
        }
        ("type", _) => Some("try a type like 'int', 'char*' or a struct name"),

        // Declarations
        ("declaration", TokenKind::Kw(Keyword::Return | Keyword::If | Keyword::While | Keyword::For)) => {
            Some("statements must be inside a function body")
        }
        ("declaration", _) => Some("start with 'fn', 'struct', 'enum', 'const', 'import', etc."),

        // Statements
        ("':'", TokenKind::Semi) => Some("case labels end with ':'"),
        ("statement", _) => None,

        _ => None,
    }
}

/// Hint for a token the parser inserted virtually.
pub fn for_missing(expected: &str) -> Option<&'static str> {
    match expected {
        "';'" => Some("add ';' at the end of the previous line"),
        "'}'" => Some("every '{' needs a matching '}'"),
        _ => None,
    }
}
