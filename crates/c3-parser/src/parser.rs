// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The parser core: token navigation, error recovery and the top-level loop.
//!
//! Productions live in `types`, `expr`, `stmt` and `decl`; each adds an
//! `impl Parser` block on top of the helpers defined here.

use c3_ast::decl::Decl;
use c3_ast::doc::DocComment;
use c3_ast::token::{CtKeyword, Keyword, Token, TokenKind};
use c3_ast::{NodeId, Span};

use crate::config::{ParseConfig, TraceLevel};
use crate::error::ParseError;

/// Maximum number of errors to collect before stopping.
const MAX_ERRORS: usize = 100;

pub(crate) type PResult<T> = Result<T, ParseError>;

/// The parser for C3 source code.
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) pos: usize,
    /// Collected errors during parsing
    pub(crate) errors: Vec<ParseError>,
    /// Counter for generating unique NodeIds
    pub(crate) next_node_id: u32,
    pub(crate) config: ParseConfig,
    /// Set once no further errors will be accepted.
    pub(crate) halted: bool,
    /// Doc blocks not yet attached, in source order.
    docs: Vec<DocComment>,
    doc_cursor: usize,
    /// `^n` is only meaningful inside a subscript.
    pub(crate) allow_from_end: bool,
    /// Nesting of `switch` bodies; `case` and `default` only end a
    /// statement inside one.
    pub(crate) switch_depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::with_config(tokens, ParseConfig::default())
    }

    pub fn with_config(mut tokens: Vec<Token>, config: ParseConfig) -> Self {
        if !matches!(tokens.last(), Some(Token { kind: TokenKind::Eof, .. })) {
            let end = tokens.last().map(|t| t.span.end_point()).unwrap_or_default();
            tokens.push(Token { kind: TokenKind::Eof, span: end, lexeme: String::new() });
        }
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
            next_node_id: 0,
            config,
            halted: false,
            docs: Vec::new(),
            doc_cursor: 0,
            allow_from_end: false,
            switch_depth: 0,
        }
    }

    /// Doc blocks from the lexer, to be attached to the declarations they
    /// directly precede.
    pub fn with_docs(mut self, mut docs: Vec<DocComment>) -> Self {
        docs.sort_by_key(|d| d.span.start);
        self.docs = docs;
        self
    }

    pub(crate) fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    /// Record error, return if should continue.
    pub(crate) fn record_error(&mut self, error: ParseError) -> bool {
        if self.halted {
            return false;
        }
        tracing::debug!(at = error.span.start, "{}", error);
        self.errors.push(error);
        if !self.config.recover_on_error || self.errors.len() >= MAX_ERRORS {
            self.halted = true;
        }
        !self.halted
    }

    pub(crate) fn trace(&self, production: &'static str) {
        if self.config.trace_level == TraceLevel::Verbose {
            tracing::trace!(production, pos = self.pos, token = %self.current().lexeme, "enter");
        }
    }

    // =========================================================================
    // Token Navigation
    // =========================================================================

    pub(crate) fn current(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    pub(crate) fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    pub(crate) fn peek(&self, n: usize) -> &TokenKind {
        self.tokens.get(self.pos + n).map(|t| &t.kind).unwrap_or(&TokenKind::Eof)
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    /// Consume the current token and return its span.
    pub(crate) fn advance(&mut self) -> Span {
        let span = self.current().span;
        if !self.at_end() {
            self.pos += 1;
        }
        span
    }

    /// Span of the most recently consumed token.
    pub(crate) fn prev_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(t) => t.span,
            None => self.current().span.end_point(),
        }
    }

    /// Span from `start` through the last consumed token.
    pub(crate) fn span_from(&self, start: Span) -> Span {
        let prev = self.prev_span();
        if prev.end <= start.start {
            Span { end: start.start, ..start }
        } else {
            start.to(prev)
        }
    }

    /// Keywords and primitives compare by value, everything else by shape.
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        let cur = self.current_kind();
        match kind {
            TokenKind::Kw(_) | TokenKind::CtKw(_) | TokenKind::Primitive(_) => cur == kind,
            _ => std::mem::discriminant(cur) == std::mem::discriminant(kind),
        }
    }

    pub(crate) fn check_kw(&self, kw: Keyword) -> bool {
        self.current_kind().is_kw(kw)
    }

    pub(crate) fn check_ct(&self, kw: CtKeyword) -> bool {
        self.current_kind().is_ct_kw(kw)
    }

    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn match_kw(&mut self, kw: Keyword) -> bool {
        if self.check_kw(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind) -> PResult<Span> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_expected(&kind.display_name()))
        }
    }

    pub(crate) fn expect_kw(&mut self, kw: Keyword) -> PResult<Span> {
        self.expect(&TokenKind::Kw(kw))
    }

    pub(crate) fn expect_ct(&mut self, kw: CtKeyword) -> PResult<Span> {
        self.expect(&TokenKind::CtKw(kw))
    }

    pub(crate) fn error_expected(&self, expected: &str) -> ParseError {
        ParseError::expected(expected, self.current_kind(), self.current().span)
    }

    /// `;` after a statement or declaration. When it is missing right before
    /// `}`, end of file or a line break, it is inserted virtually.
    pub(crate) fn expect_semi(&mut self) -> PResult<()> {
        if self.match_token(&TokenKind::Semi) {
            return Ok(());
        }
        let prev = self.prev_span();
        let cur = self.current().span;
        let at_boundary = matches!(self.current_kind(), TokenKind::RBrace | TokenKind::Eof)
            || (self.pos > 0 && cur.line > prev.line);
        if at_boundary {
            self.record_error(ParseError::missing("';'", prev.end_point()));
            Ok(())
        } else {
            Err(self.error_expected("';'"))
        }
    }

    pub(crate) fn expect_ident(&mut self) -> PResult<String> {
        if let TokenKind::Ident(name) = self.current_kind() {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.error_expected("identifier"))
        }
    }

    pub(crate) fn expect_type_ident(&mut self) -> PResult<String> {
        if let TokenKind::TypeIdent(name) = self.current_kind() {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.error_expected("type name"))
        }
    }

    pub(crate) fn expect_const_ident(&mut self) -> PResult<String> {
        if let TokenKind::ConstIdent(name) = self.current_kind() {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.error_expected("constant name"))
        }
    }

    /// `CONST:` label directly after a loop or branch keyword.
    pub(crate) fn parse_label(&mut self) -> Option<String> {
        if let (TokenKind::ConstIdent(name), TokenKind::Colon) = (self.current_kind(), self.peek(1)) {
            let name = name.clone();
            self.advance();
            self.advance();
            Some(name)
        } else {
            None
        }
    }

    /// Index of the token closing the bracket at `open`, if any. Tracks
    /// parentheses, brackets and braces together.
    pub(crate) fn matching_close(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (i, tok) in self.tokens.iter().enumerate().skip(open) {
            match tok.kind {
                TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::LBrace
                | TokenKind::LBraceBar
                | TokenKind::LVec
                | TokenKind::LGen => depth += 1,
                TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
                | TokenKind::BarRBrace
                | TokenKind::RVec
                | TokenKind::RGen => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(i);
                    }
                }
                TokenKind::Eof => return None,
                _ => {}
            }
        }
        None
    }

    // =========================================================================
    // Error Recovery
    // =========================================================================

    /// Skip to next declaration after error.
    pub(crate) fn synchronize(&mut self) {
        let mut brace_depth = 0usize;

        while !self.at_end() {
            match self.current_kind() {
                TokenKind::LBrace => {
                    brace_depth += 1;
                    self.advance();
                }
                TokenKind::RBrace => {
                    self.advance();
                    if brace_depth > 0 {
                        brace_depth -= 1;
                        if brace_depth == 0 {
                            return;
                        }
                    }
                }
                TokenKind::Semi if brace_depth == 0 => {
                    self.advance();
                    return;
                }
                kind if brace_depth == 0 && starts_decl(kind) => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Synchronize within a block - skip to the next statement boundary.
    pub(crate) fn synchronize_in_block(&mut self) {
        let mut depth = 0usize;
        while !self.at_end() {
            match self.current_kind() {
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RParen | TokenKind::RBracket => {
                    depth = depth.saturating_sub(1);
                    self.advance();
                }
                // Stop at block end
                TokenKind::RBrace if depth == 0 => return,
                TokenKind::RBrace => {
                    depth -= 1;
                    self.advance();
                }
                // Stop at statement boundaries
                TokenKind::Semi if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::Kw(Keyword::Case | Keyword::Default) if depth == 0 && self.switch_depth == 0 => {
                    self.advance();
                }
                // Stop before statement-starting keywords
                kind if depth == 0 && starts_stmt(kind) => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Skip the rest of a malformed item in a comma list: stops after the
    /// next `,` or before the closing `}`.
    pub(crate) fn skip_list_item(&mut self) {
        let mut depth = 0usize;
        while !self.at_end() {
            match self.current_kind() {
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
                TokenKind::RBrace if depth == 0 => return,
                TokenKind::RBrace => depth -= 1,
                TokenKind::Comma if depth == 0 => {
                    self.advance();
                    return;
                }
                _ => {}
            }
            self.advance();
        }
    }

    // =========================================================================
    // Top-Level Parsing
    // =========================================================================

    pub fn parse(&mut self) -> ParseResult {
        self.trace("translation_unit");
        let mut decls = Vec::new();

        while !self.at_end() && !self.halted {
            let before = self.pos;
            match self.parse_decl() {
                Ok(decl) => decls.push(decl),
                Err(e) => {
                    if !self.record_error(e) {
                        break;
                    }
                    self.synchronize();
                    if self.pos == before {
                        self.advance();
                    }
                }
            }
        }

        let mut errors = std::mem::take(&mut self.errors);
        errors.sort_by_key(|e| e.span.start);
        ParseResult { decls, errors }
    }

    /// The doc block ending right before the current token, with nothing
    /// but whitespace and plain comments in between.
    pub(crate) fn take_doc(&mut self) -> Option<DocComment> {
        let start = self.current().span.start;
        let prev_end = if self.pos == 0 { 0 } else { self.prev_span().end };
        let mut found = None;
        while let Some(doc) = self.docs.get(self.doc_cursor) {
            if doc.span.end > start {
                break;
            }
            if doc.span.start >= prev_end {
                found = Some(self.doc_cursor);
            }
            self.doc_cursor += 1;
        }
        found.and_then(|i| self.docs.get(i).cloned())
    }
}

/// Tokens that begin a top-level declaration.
pub(crate) fn starts_decl(kind: &TokenKind) -> bool {
    match kind {
        TokenKind::Kw(kw) => matches!(
            kw,
            Keyword::Module
                | Keyword::Import
                | Keyword::Fn
                | Keyword::Macro
                | Keyword::Struct
                | Keyword::Union
                | Keyword::Bitstruct
                | Keyword::Enum
                | Keyword::Fault
                | Keyword::Interface
                | Keyword::Def
                | Keyword::Distinct
                | Keyword::Const
                | Keyword::Extern
                | Keyword::Tlocal
        ),
        TokenKind::CtKw(kw) => matches!(
            kw,
            CtKeyword::Assert
                | CtKeyword::Echo
                | CtKeyword::Error
                | CtKeyword::Include
                | CtKeyword::If
                | CtKeyword::Else
                | CtKeyword::Endif
                | CtKeyword::Switch
                | CtKeyword::Case
                | CtKeyword::Default
                | CtKeyword::Endswitch
        ),
        _ => false,
    }
}

/// Tokens that begin a statement, or close the list a statement lives in.
pub(crate) fn starts_stmt(kind: &TokenKind) -> bool {
    match kind {
        TokenKind::Kw(kw) => matches!(
            kw,
            Keyword::Return
                | Keyword::If
                | Keyword::While
                | Keyword::Do
                | Keyword::For
                | Keyword::Foreach
                | Keyword::ForeachR
                | Keyword::Switch
                | Keyword::Case
                | Keyword::Default
                | Keyword::Defer
                | Keyword::Break
                | Keyword::Continue
                | Keyword::Nextcase
                | Keyword::Asm
                | Keyword::Assert
                | Keyword::Const
                | Keyword::Var
                | Keyword::Static
                | Keyword::Tlocal
        ),
        TokenKind::CtKw(kw) => matches!(
            kw,
            CtKeyword::If
                | CtKeyword::Else
                | CtKeyword::Endif
                | CtKeyword::Switch
                | CtKeyword::Case
                | CtKeyword::Default
                | CtKeyword::Endswitch
                | CtKeyword::For
                | CtKeyword::Endfor
                | CtKeyword::Foreach
                | CtKeyword::Endforeach
                | CtKeyword::Echo
                | CtKeyword::Assert
                | CtKeyword::Error
        ),
        TokenKind::BarRBrace => true,
        _ => false,
    }
}

/// Result of parsing: declarations plus any errors found.
#[derive(Debug)]
pub struct ParseResult {
    pub decls: Vec<Decl>,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    /// Returns true if parsing completed without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}
