// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Concrete syntax tree types for the C3 language.
//!
//! This crate defines the tokens and tree nodes shared between the lexer,
//! the parser, the pretty printer and the diagnostics renderer.

pub mod span;
pub mod token;
pub mod literal;
pub mod ty;
pub mod expr;
pub mod stmt;
pub mod decl;
pub mod doc;

pub use span::{ColumnCursor, LineMap, Span};

/// Unique identifier for tree nodes within one translation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const DUMMY: NodeId = NodeId(u32::MAX);
}

/// Root of a parsed file.
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    pub decls: Vec<decl::Decl>,
    pub span: Span,
}
