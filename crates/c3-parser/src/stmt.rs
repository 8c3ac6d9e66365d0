// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement parsing.

use c3_ast::expr::{Expr, ExprKind};
use c3_ast::stmt::{
    AsmBody, AsmInstr, AsmOperand, Block, CaseLabel, CondItem, Condition, CtCase, DeferKind,
    ForeachVar, NextcaseTarget, Stmt, StmtKind, Storage, SwitchCase, VarDecl,
};
use c3_ast::token::{CtKeyword, Keyword, TokenKind};
use c3_ast::ty::TypeExpr;

use crate::error::ParseError;
use crate::parser::{PResult, Parser};

fn ends_case(kind: &TokenKind) -> bool {
    matches!(kind, TokenKind::RBrace | TokenKind::Kw(Keyword::Case | Keyword::Default))
}

impl Parser {
    // =========================================================================
    // Blocks
    // =========================================================================

    /// `{ stmts }`. A missing `}` at end of file is inserted virtually.
    pub(crate) fn parse_block(&mut self) -> PResult<Block> {
        self.trace("block");
        let start = self.expect(&TokenKind::LBrace)?;
        let stmts = self.parse_stmt_list(|k| matches!(k, TokenKind::RBrace));
        if !self.halted && !self.match_token(&TokenKind::RBrace) {
            let at = self.current().span;
            self.record_error(ParseError::missing("'}'", at));
        }
        Ok(Block { stmts, span: self.span_from(start) })
    }

    /// Statements up to (not including) a token accepted by `stop`, with
    /// per-statement recovery.
    pub(crate) fn parse_stmt_list(&mut self, stop: impl Fn(&TokenKind) -> bool) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        while !self.at_end() && !self.halted && !stop(self.current_kind()) {
            let before = self.pos;
            match self.parse_stmt() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    if !self.record_error(e) {
                        break;
                    }
                    self.synchronize_in_block();
                    if self.pos == before {
                        self.advance();
                    }
                }
            }
        }
        stmts
    }

    /// Statement list between compile-time delimiters, as a block.
    fn parse_ct_body(&mut self, stop: impl Fn(&TokenKind) -> bool) -> Block {
        let start = self.current().span;
        let stmts = self.parse_stmt_list(stop);
        Block { stmts, span: self.span_from(start) }
    }

    /// At a `{` in statement position: block or initializer list?
    fn brace_starts_block(&self) -> bool {
        match self.peek(1) {
            TokenKind::RBrace | TokenKind::Semi | TokenKind::LBrace | TokenKind::CtKw(_) => true,
            TokenKind::Kw(kw) => !matches!(kw, Keyword::True | Keyword::False | Keyword::Null),
            _ => {
                let Some(close) = self.matching_close(self.pos) else {
                    return true;
                };
                let mut depth = 0usize;
                for tok in &self.tokens[self.pos..close] {
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
                        | TokenKind::RGen => depth = depth.saturating_sub(1),
                        TokenKind::Semi if depth == 1 => return true,
                        _ => {}
                    }
                }
                false
            }
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Parse a statement.
    pub(crate) fn parse_stmt(&mut self) -> PResult<Stmt> {
        self.trace("stmt");
        let start = self.current().span;

        let kind = match self.current_kind().clone() {
            TokenKind::Semi => {
                self.advance();
                StmtKind::Empty
            }
            TokenKind::LBrace if self.brace_starts_block() => StmtKind::Block(self.parse_block()?),
            TokenKind::Kw(kw) => match kw {
                Keyword::Return => self.parse_return()?,
                Keyword::If => self.parse_if()?,
                Keyword::While => self.parse_while()?,
                Keyword::Do => self.parse_do()?,
                Keyword::For => self.parse_for()?,
                Keyword::Foreach | Keyword::ForeachR => self.parse_foreach()?,
                Keyword::Switch => self.parse_switch()?,
                Keyword::Defer => self.parse_defer()?,
                Keyword::Break | Keyword::Continue => {
                    self.advance();
                    let label = match self.current_kind() {
                        TokenKind::ConstIdent(name) => {
                            let name = name.clone();
                            self.advance();
                            Some(name)
                        }
                        _ => None,
                    };
                    self.expect_semi()?;
                    if kw == Keyword::Break {
                        StmtKind::Break(label)
                    } else {
                        StmtKind::Continue(label)
                    }
                }
                Keyword::Nextcase => self.parse_nextcase()?,
                Keyword::Asm => self.parse_asm()?,
                Keyword::Assert => self.parse_assert()?,
                Keyword::Const => {
                    let decl = self.parse_const_decl(false)?;
                    self.expect_semi()?;
                    StmtKind::Const(decl)
                }
                Keyword::Var => {
                    self.advance();
                    let decl = self.parse_var_rest(None, None)?;
                    self.expect_semi()?;
                    StmtKind::Var(decl)
                }
                Keyword::Static | Keyword::Tlocal => {
                    let storage = if kw == Keyword::Static { Storage::Static } else { Storage::Tlocal };
                    self.advance();
                    let ty = if self.match_kw(Keyword::Var) { None } else { Some(self.parse_type()?) };
                    let decl = self.parse_var_rest(Some(storage), ty)?;
                    self.expect_semi()?;
                    StmtKind::Var(decl)
                }
                _ => self.parse_expr_or_decl_stmt()?,
            },
            TokenKind::CtKw(kw) => match kw {
                CtKeyword::If => self.parse_ct_if_stmt()?,
                CtKeyword::Switch => self.parse_ct_switch_stmt()?,
                CtKeyword::For => self.parse_ct_for()?,
                CtKeyword::Foreach => self.parse_ct_foreach()?,
                CtKeyword::Echo => {
                    self.advance();
                    let e = self.parse_expr()?;
                    self.expect_semi()?;
                    StmtKind::CtEcho(e)
                }
                CtKeyword::Assert => {
                    let (cond, message) = self.parse_ct_assert_body()?;
                    StmtKind::CtAssert { cond, message }
                }
                CtKeyword::Error => {
                    self.advance();
                    let e = self.parse_expr()?;
                    self.expect_semi()?;
                    StmtKind::CtError(e)
                }
                _ => self.parse_expr_or_decl_stmt()?,
            },
            _ => self.parse_expr_or_decl_stmt()?,
        };

        Ok(Stmt { id: self.next_id(), kind, span: self.span_from(start) })
    }

    /// Local declaration (`Type name ...;`) or expression statement.
    fn parse_expr_or_decl_stmt(&mut self) -> PResult<StmtKind> {
        if self.type_starts_at(0) {
            let decl_ahead = |p: &Parser| {
                matches!(
                    p.current_kind(),
                    TokenKind::Ident(_) | TokenKind::CtIdent(_) | TokenKind::CtTypeIdent(_)
                )
            };
            if let Some(ty) = self.try_parse_type_then(decl_ahead) {
                let decl = self.parse_var_rest(None, Some(ty))?;
                self.expect_semi()?;
                return Ok(StmtKind::Var(decl));
            }
        }

        let expr = self.parse_expr()?;
        if matches!(&expr.kind, ExprKind::Call { body: Some(_), .. }) {
            self.match_token(&TokenKind::Semi);
        } else {
            self.expect_semi()?;
        }
        Ok(StmtKind::Expr(expr))
    }

    /// Name, attributes and initializer of a variable whose storage and type
    /// are already known.
    pub(crate) fn parse_var_rest(&mut self, storage: Option<Storage>, ty: Option<TypeExpr>) -> PResult<VarDecl> {
        let name = match self.current_kind() {
            TokenKind::Ident(n) | TokenKind::CtIdent(n) | TokenKind::CtTypeIdent(n) => n.clone(),
            _ => return Err(self.error_expected("identifier")),
        };
        self.advance();
        let attrs = self.parse_attributes()?;
        let init = if self.match_token(&TokenKind::Eq) { Some(self.parse_expr()?) } else { None };
        Ok(VarDecl { storage, ty, name, attrs, init })
    }

    fn parse_return(&mut self) -> PResult<StmtKind> {
        self.advance();
        let value = if self.check(&TokenKind::Semi) { None } else { Some(self.parse_expr()?) };
        self.expect_semi()?;
        Ok(StmtKind::Return(value))
    }

    // =========================================================================
    // Conditions
    // =========================================================================

    /// Comma list of declarations, expressions and `try`/`catch` unwraps.
    pub(crate) fn parse_condition(&mut self) -> PResult<Condition> {
        self.trace("condition");
        let start = self.current().span;
        let mut items = Vec::new();
        loop {
            items.push(self.parse_cond_item()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        Ok(Condition { items, span: self.span_from(start) })
    }

    fn parse_cond_item(&mut self) -> PResult<CondItem> {
        if self.match_kw(Keyword::Var) {
            return Ok(CondItem::Decl(self.parse_var_rest(None, None)?));
        }
        if self.check_kw(Keyword::Catch) {
            return Ok(CondItem::Expr(self.parse_catch(true)?));
        }
        if self.type_starts_at(0) {
            let ty = self.try_parse_type_then(|p| {
                matches!(p.current_kind(), TokenKind::Ident(_)) && matches!(p.peek(1), TokenKind::Eq)
            });
            if let Some(ty) = ty {
                return Ok(CondItem::Decl(self.parse_var_rest(None, Some(ty))?));
            }
        }
        Ok(CondItem::Expr(self.parse_expr()?))
    }

    fn parse_paren_condition(&mut self) -> PResult<Condition> {
        self.expect(&TokenKind::LParen)?;
        let cond = self.parse_condition()?;
        self.expect(&TokenKind::RParen)?;
        Ok(cond)
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    fn parse_if(&mut self) -> PResult<StmtKind> {
        self.advance();
        let label = self.parse_label();
        let cond = self.parse_paren_condition()?;
        let then_branch = Box::new(self.parse_stmt()?);
        let else_branch = if self.match_kw(Keyword::Else) {
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };
        Ok(StmtKind::If { label, cond, then_branch, else_branch })
    }

    fn parse_while(&mut self) -> PResult<StmtKind> {
        self.advance();
        let label = self.parse_label();
        let cond = self.parse_paren_condition()?;
        let body = Box::new(self.parse_stmt()?);
        Ok(StmtKind::While { label, cond, body })
    }

    fn parse_do(&mut self) -> PResult<StmtKind> {
        self.advance();
        let label = self.parse_label();
        let body = self.parse_block()?;
        let cond = if self.match_kw(Keyword::While) {
            self.expect(&TokenKind::LParen)?;
            let cond = self.parse_expr()?;
            self.expect(&TokenKind::RParen)?;
            Some(cond)
        } else {
            None
        };
        self.expect_semi()?;
        Ok(StmtKind::DoWhile { label, body, cond })
    }

    fn parse_for(&mut self) -> PResult<StmtKind> {
        self.advance();
        let label = self.parse_label();
        self.expect(&TokenKind::LParen)?;
        let init = if self.check(&TokenKind::Semi) { None } else { Some(self.parse_condition()?) };
        self.expect(&TokenKind::Semi)?;
        let cond = if self.check(&TokenKind::Semi) { None } else { Some(self.parse_condition()?) };
        self.expect(&TokenKind::Semi)?;
        let step = self.parse_expr_list(&TokenKind::RParen)?;
        self.expect(&TokenKind::RParen)?;
        let body = Box::new(self.parse_stmt()?);
        Ok(StmtKind::For { label, init, cond, step, body })
    }

    /// Comma-separated expressions up to `close`.
    pub(crate) fn parse_expr_list(&mut self, close: &TokenKind) -> PResult<Vec<Expr>> {
        let mut exprs = Vec::new();
        while !self.check(close) && !self.at_end() {
            exprs.push(self.parse_expr()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        Ok(exprs)
    }

    fn parse_foreach(&mut self) -> PResult<StmtKind> {
        let reverse = self.check_kw(Keyword::ForeachR);
        self.advance();
        let label = self.parse_label();
        self.expect(&TokenKind::LParen)?;
        let first = self.parse_foreach_var()?;
        let (index, value) = if self.match_token(&TokenKind::Comma) {
            (Some(first), self.parse_foreach_var()?)
        } else {
            (None, first)
        };
        self.expect(&TokenKind::Colon)?;
        let collection = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        let body = Box::new(self.parse_stmt()?);
        Ok(StmtKind::Foreach { label, reverse, index, value, collection, body })
    }

    /// `[Type] [&]name`
    fn parse_foreach_var(&mut self) -> PResult<ForeachVar> {
        let untyped = matches!(self.current_kind(), TokenKind::Amp)
            || (matches!(self.current_kind(), TokenKind::Ident(_))
                && matches!(self.peek(1), TokenKind::Comma | TokenKind::Colon));
        let ty = if untyped { None } else { Some(self.parse_type()?) };
        let by_ref = self.match_token(&TokenKind::Amp);
        let name = self.expect_ident()?;
        Ok(ForeachVar { ty, by_ref, name })
    }

    fn parse_switch(&mut self) -> PResult<StmtKind> {
        self.advance();
        let label = self.parse_label();
        let subject = if self.match_token(&TokenKind::LParen) {
            let subject = if self.check(&TokenKind::RParen) { None } else { Some(self.parse_condition()?) };
            self.expect(&TokenKind::RParen)?;
            subject
        } else {
            None
        };
        self.expect(&TokenKind::LBrace)?;
        self.switch_depth += 1;
        let cases = self.parse_switch_cases();
        self.switch_depth -= 1;
        self.expect(&TokenKind::RBrace)?;
        Ok(StmtKind::Switch { label, subject, cases })
    }

    /// Cases up to the closing `}`. A malformed label costs only its own case.
    fn parse_switch_cases(&mut self) -> Vec<SwitchCase> {
        let mut cases = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() && !self.halted {
            let start = self.current().span;
            let label = match self.parse_case_label() {
                Ok(label) => Some(label),
                Err(e) => {
                    if !self.record_error(e) || !self.skip_to_case_body() {
                        continue;
                    }
                    None
                }
            };
            // Each case owns only the statements up to the next label.
            let body = self.parse_stmt_list(ends_case);
            if let Some(label) = label {
                cases.push(SwitchCase { label, body, span: self.span_from(start) });
            }
        }
        cases
    }

    /// `case expr:` or `default:`
    fn parse_case_label(&mut self) -> PResult<CaseLabel> {
        let label = if self.match_kw(Keyword::Case) {
            CaseLabel::Expr(self.parse_expr()?)
        } else if self.match_kw(Keyword::Default) {
            CaseLabel::Default
        } else {
            return Err(self.error_expected("'case' or 'default'"));
        };
        self.expect(&TokenKind::Colon)?;
        Ok(label)
    }

    /// Skip past the `:` closing a malformed label. False when the next
    /// label or the end of the switch comes first.
    fn skip_to_case_body(&mut self) -> bool {
        let mut depth = 0usize;
        while !self.at_end() {
            match self.current_kind() {
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
                TokenKind::RBrace if depth == 0 => return false,
                TokenKind::RBrace => depth -= 1,
                TokenKind::Kw(Keyword::Case | Keyword::Default) if depth == 0 => return false,
                TokenKind::Colon if depth == 0 => {
                    self.advance();
                    return true;
                }
                _ => {}
            }
            self.advance();
        }
        false
    }

    fn parse_defer(&mut self) -> PResult<StmtKind> {
        self.advance();
        let kind = match (self.current_kind(), self.peek(1)) {
            (TokenKind::Kw(Keyword::Try), TokenKind::LBrace) => DeferKind::Try,
            (TokenKind::Kw(Keyword::Catch), TokenKind::LBrace) => DeferKind::Catch,
            _ => DeferKind::Plain,
        };
        if kind != DeferKind::Plain {
            self.advance();
        }
        let body = Box::new(self.parse_stmt()?);
        Ok(StmtKind::Defer { kind, body })
    }

    /// `nextcase;`, `nextcase default;`, `nextcase value;`, `nextcase LABEL: value;`
    fn parse_nextcase(&mut self) -> PResult<StmtKind> {
        self.advance();
        let label = self.parse_label();
        let target = if self.check(&TokenKind::Semi) {
            None
        } else if self.match_kw(Keyword::Default) {
            Some(NextcaseTarget::Default)
        } else {
            Some(NextcaseTarget::Expr(self.parse_expr()?))
        };
        self.expect_semi()?;
        Ok(StmtKind::Nextcase { label, target })
    }

    fn parse_asm(&mut self) -> PResult<StmtKind> {
        self.advance();
        if self.match_token(&TokenKind::LParen) {
            let text = self.parse_expr()?;
            self.expect(&TokenKind::RParen)?;
            self.expect_semi()?;
            return Ok(StmtKind::Asm(AsmBody::Text(text)));
        }

        self.expect(&TokenKind::LBrace)?;
        let mut instrs = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            instrs.push(self.parse_asm_instr()?);
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(StmtKind::Asm(AsmBody::Block(instrs)))
    }

    fn parse_asm_instr(&mut self) -> PResult<AsmInstr> {
        let start = self.current().span;
        let mut name = self.asm_word()?;
        while self.match_token(&TokenKind::Dot) {
            name.push('.');
            name.push_str(&self.asm_word()?);
        }
        let mut operands = Vec::new();
        while !self.check(&TokenKind::Semi) && !self.at_end() {
            let operand = if self.match_token(&TokenKind::LBracket) {
                let addr = self.parse_expr()?;
                self.expect(&TokenKind::RBracket)?;
                AsmOperand::Address(addr)
            } else {
                AsmOperand::Expr(self.parse_expr()?)
            };
            operands.push(operand);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect_semi()?;
        Ok(AsmInstr { name, operands, span: self.span_from(start) })
    }

    /// Mnemonics may collide with keywords or type names.
    fn asm_word(&mut self) -> PResult<String> {
        match self.current_kind() {
            TokenKind::Ident(_)
            | TokenKind::TypeIdent(_)
            | TokenKind::ConstIdent(_)
            | TokenKind::Kw(_)
            | TokenKind::Primitive(_) => {
                let word = self.current().lexeme.clone();
                self.advance();
                Ok(word)
            }
            _ => Err(self.error_expected("instruction")),
        }
    }

    fn parse_assert(&mut self) -> PResult<StmtKind> {
        self.advance();
        self.expect(&TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        let mut message = Vec::new();
        while self.match_token(&TokenKind::Comma) {
            message.push(self.parse_expr()?);
        }
        self.expect(&TokenKind::RParen)?;
        self.expect_semi()?;
        Ok(StmtKind::Assert { cond, message })
    }

    // =========================================================================
    // Compile-time statements
    // =========================================================================

    /// `$assert cond [: message];`, shared with the top level.
    pub(crate) fn parse_ct_assert_body(&mut self) -> PResult<(Expr, Option<Expr>)> {
        self.expect_ct(CtKeyword::Assert)?;
        let cond = self.parse_expr()?;
        let message = if self.match_token(&TokenKind::Colon) { Some(self.parse_expr()?) } else { None };
        self.expect_semi()?;
        Ok((cond, message))
    }

    fn parse_ct_if_stmt(&mut self) -> PResult<StmtKind> {
        self.advance();
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::Colon)?;
        let then_branch = self.parse_ct_body(|k| {
            matches!(k, TokenKind::CtKw(CtKeyword::Else) | TokenKind::CtKw(CtKeyword::Endif))
        });
        let else_branch = if self.match_token(&TokenKind::CtKw(CtKeyword::Else)) {
            Some(self.parse_ct_body(|k| matches!(k, TokenKind::CtKw(CtKeyword::Endif))))
        } else {
            None
        };
        self.expect_ct(CtKeyword::Endif)?;
        Ok(StmtKind::CtIf { cond, then_branch, else_branch })
    }

    /// `$switch [(subject)]` head, shared with the top level.
    pub(crate) fn parse_ct_switch_head(&mut self) -> PResult<Option<Expr>> {
        self.expect_ct(CtKeyword::Switch)?;
        let subject = if self.match_token(&TokenKind::LParen) {
            let subject = if self.check(&TokenKind::RParen) { None } else { Some(self.parse_expr()?) };
            self.expect(&TokenKind::RParen)?;
            subject
        } else {
            None
        };
        self.match_token(&TokenKind::Colon);
        Ok(subject)
    }

    /// `$case label:` or `$default:`; `None` for the default arm.
    pub(crate) fn parse_ct_case_label(&mut self) -> PResult<Option<Expr>> {
        let label = if self.match_token(&TokenKind::CtKw(CtKeyword::Case)) {
            Some(self.parse_expr()?)
        } else if self.match_token(&TokenKind::CtKw(CtKeyword::Default)) {
            None
        } else {
            return Err(self.error_expected("'$case' or '$default'"));
        };
        self.expect(&TokenKind::Colon)?;
        Ok(label)
    }

    fn parse_ct_switch_stmt(&mut self) -> PResult<StmtKind> {
        let subject = self.parse_ct_switch_head()?;
        let mut cases = Vec::new();
        while !self.check_ct(CtKeyword::Endswitch) && !self.at_end() && !self.halted {
            let start = self.current().span;
            let label = self.parse_ct_case_label()?;
            let body = self.parse_stmt_list(is_ct_case_end);
            cases.push(CtCase { label, body, span: self.span_from(start) });
        }
        self.expect_ct(CtKeyword::Endswitch)?;
        Ok(StmtKind::CtSwitch { subject, cases })
    }

    fn parse_ct_for(&mut self) -> PResult<StmtKind> {
        self.advance();
        self.expect(&TokenKind::LParen)?;
        let init = if self.check(&TokenKind::Semi) { None } else { Some(self.parse_condition()?) };
        self.expect(&TokenKind::Semi)?;
        let cond = if self.check(&TokenKind::Semi) { None } else { Some(self.parse_expr()?) };
        self.expect(&TokenKind::Semi)?;
        let step = self.parse_expr_list(&TokenKind::RParen)?;
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Colon)?;
        let body = self.parse_ct_body(|k| matches!(k, TokenKind::CtKw(CtKeyword::Endfor)));
        self.expect_ct(CtKeyword::Endfor)?;
        Ok(StmtKind::CtFor { init, cond, step, body })
    }

    fn parse_ct_foreach(&mut self) -> PResult<StmtKind> {
        self.advance();
        self.expect(&TokenKind::LParen)?;
        let first = self.expect_ct_name()?;
        let (index, value) = if self.match_token(&TokenKind::Comma) {
            (Some(first), self.expect_ct_name()?)
        } else {
            (None, first)
        };
        self.expect(&TokenKind::Colon)?;
        let collection = self.parse_expr()?;
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Colon)?;
        let body = self.parse_ct_body(|k| matches!(k, TokenKind::CtKw(CtKeyword::Endforeach)));
        self.expect_ct(CtKeyword::Endforeach)?;
        Ok(StmtKind::CtForeach { index, value, collection, body })
    }

    fn expect_ct_name(&mut self) -> PResult<String> {
        match self.current_kind() {
            TokenKind::CtIdent(n) | TokenKind::CtConstIdent(n) | TokenKind::CtTypeIdent(n) => {
                let n = n.clone();
                self.advance();
                Ok(n)
            }
            _ => Err(self.error_expected("compile-time name")),
        }
    }
}

pub(crate) fn is_ct_case_end(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::CtKw(CtKeyword::Case) | TokenKind::CtKw(CtKeyword::Default) | TokenKind::CtKw(CtKeyword::Endswitch)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmt(src: &str) -> Stmt {
        let lexed = c3_lexer::Lexer::new(src).tokenize();
        let mut parser = Parser::new(lexed.tokens);
        let s = parser.parse_stmt().expect("statement should parse");
        assert!(parser.at_end(), "trailing tokens in {:?}", src);
        assert!(parser.errors.is_empty(), "errors: {:?}", parser.errors);
        s
    }

    fn stmts_with_errors(src: &str) -> (Vec<Stmt>, Vec<ParseError>) {
        let lexed = c3_lexer::Lexer::new(src).tokenize();
        let mut parser = Parser::new(lexed.tokens);
        let stmts = parser.parse_stmt_list(|_| false);
        (stmts, parser.errors)
    }

    #[test]
    fn local_declaration_versus_expression() {
        let StmtKind::Var(decl) = stmt("int* p = null;").kind else { panic!("expected var") };
        assert_eq!(decl.name, "p");
        assert!(decl.ty.is_some());
        assert!(matches!(stmt("a * b;").kind, StmtKind::Expr(_)));
        assert!(matches!(stmt("Foo.bar();").kind, StmtKind::Expr(_)));
    }

    #[test]
    fn var_and_static_locals() {
        let StmtKind::Var(decl) = stmt("var x = 1;").kind else { panic!("expected var") };
        assert!(decl.ty.is_none());
        let StmtKind::Var(decl) = stmt("static int counter;").kind else { panic!("expected var") };
        assert_eq!(decl.storage, Some(Storage::Static));
    }

    #[test]
    fn if_with_declaration_condition_and_else() {
        let StmtKind::If { cond, else_branch, .. } = stmt("if (int x = foo(), x > 2) { } else return;").kind else {
            panic!("expected if")
        };
        assert_eq!(cond.items.len(), 2);
        assert!(matches!(cond.items[0], CondItem::Decl(_)));
        assert!(else_branch.is_some());
    }

    #[test]
    fn labelled_loops() {
        let StmtKind::While { label, .. } = stmt("while OUTER: (true) { break OUTER; }").kind else {
            panic!("expected while")
        };
        assert_eq!(label.as_deref(), Some("OUTER"));
        assert!(matches!(stmt("do { x++; } while (x < 10);").kind, StmtKind::DoWhile { cond: Some(_), .. }));
        assert!(matches!(stmt("do { x++; };").kind, StmtKind::DoWhile { cond: None, .. }));
    }

    #[test]
    fn for_and_foreach() {
        let StmtKind::For { init, cond, step, .. } = stmt("for (int i = 0; i < 10; i++, j--) {}").kind else {
            panic!("expected for")
        };
        assert!(init.is_some() && cond.is_some());
        assert_eq!(step.len(), 2);
        assert!(matches!(stmt("for (;;) {}").kind, StmtKind::For { init: None, cond: None, .. }));

        let StmtKind::Foreach { reverse, index, value, .. } = stmt("foreach_r (i, &v : list) {}").kind else {
            panic!("expected foreach")
        };
        assert!(reverse);
        assert_eq!(index.map(|v| v.name).as_deref(), Some("i"));
        assert!(value.by_ref);

        let StmtKind::Foreach { value, .. } = stmt("foreach (int x : list) {}").kind else {
            panic!("expected foreach")
        };
        assert!(value.ty.is_some());
    }

    #[test]
    fn switch_cases_do_not_share_bodies() {
        let src = "switch (x) { case 1: foo(); case 2..4: case int: bar(); baz(); default: nextcase 1; }";
        let StmtKind::Switch { cases, .. } = stmt(src).kind else { panic!("expected switch") };
        let lens: Vec<usize> = cases.iter().map(|c| c.body.len()).collect();
        assert_eq!(lens, vec![1, 0, 2, 1]);
        assert!(matches!(cases[3].label, CaseLabel::Default));
    }

    #[test]
    fn defer_variants() {
        assert!(matches!(stmt("defer free(p);").kind, StmtKind::Defer { kind: DeferKind::Plain, .. }));
        assert!(matches!(stmt("defer catch { log(); }").kind, StmtKind::Defer { kind: DeferKind::Catch, .. }));
        assert!(matches!(stmt("defer try { ok(); }").kind, StmtKind::Defer { kind: DeferKind::Try, .. }));
    }

    #[test]
    fn asm_block_with_address_operand() {
        let StmtKind::Asm(AsmBody::Block(instrs)) = stmt("asm { movq [rax + 8], rbx; nop; }").kind else {
            panic!("expected asm block")
        };
        assert_eq!(instrs.len(), 2);
        assert_eq!(instrs[0].name, "movq");
        assert!(matches!(instrs[0].operands[0], AsmOperand::Address(_)));
    }

    #[test]
    fn compile_time_statements() {
        assert!(matches!(
            stmt("$if $defined(x): a(); $else b(); $endif").kind,
            StmtKind::CtIf { else_branch: Some(_), .. }
        ));
        let StmtKind::CtSwitch { cases, .. } = stmt("$switch ($T) $case int: a(); $default: b(); $endswitch").kind
        else {
            panic!("expected $switch")
        };
        assert_eq!(cases.len(), 2);
        assert!(cases[1].label.is_none());
        assert!(matches!(
            stmt("$foreach ($i, $v : $list): foo($v); $endforeach").kind,
            StmtKind::CtForeach { index: Some(_), .. }
        ));
        assert!(matches!(stmt("$for (var $i = 0; $i < 3; $i++): $endfor").kind, StmtKind::CtFor { .. }));
        assert!(matches!(stmt("$assert X > 0 : \"positive\";").kind, StmtKind::CtAssert { message: Some(_), .. }));
    }

    #[test]
    fn block_versus_initializer_statement() {
        assert!(matches!(stmt("{ foo(); }").kind, StmtKind::Block(_)));
        assert!(matches!(stmt("{}").kind, StmtKind::Block(_)));
    }

    #[test]
    fn trailing_block_makes_semicolon_optional() {
        assert!(matches!(stmt("@pool() { work(); }").kind, StmtKind::Expr(_)));
    }

    #[test]
    fn recovers_at_next_statement() {
        let (stmts, errors) = stmts_with_errors("x = ; return 1;");
        assert_eq!(errors.len(), 1);
        assert!(stmts.iter().any(|s| matches!(s.kind, StmtKind::Return(Some(_)))));
    }

    #[test]
    fn semicolon_inserted_before_closing_brace() {
        let lexed = c3_lexer::Lexer::new("{ return 1 }").tokenize();
        let mut parser = Parser::new(lexed.tokens);
        let block = parser.parse_block().expect("block should parse");
        assert_eq!(block.stmts.len(), 1);
        assert_eq!(parser.errors.len(), 1);
        assert!(matches!(parser.errors[0].kind, crate::ParseErrorKind::MissingExpectedToken { .. }));
    }
}
