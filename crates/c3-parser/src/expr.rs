// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression parsing: precedence climbing over a prefix/primary/postfix core.

use c3_ast::decl::{AttrArg, Attribute, OverloadOp};
use c3_ast::expr::{
    Arg, Binding, Designator, Expr, ExprKind, Lambda, LambdaBody, Member, PostfixOp, RangeKind,
    UnaryOp,
};
use c3_ast::literal::{Literal, LiteralKind, StringStyle};
use c3_ast::stmt::Block;
use c3_ast::token::{classify_word, CtKeyword, IdentClass, Keyword, TokenKind};
use c3_ast::ty::{PrimitiveType, TypeKind};
use c3_ast::Span;

use crate::error::ParseError;
use crate::parser::{PResult, Parser};
use crate::precedence::{assign_op, binary_op, Precedence};
use crate::types::ct_type_func;

/// Compile-time keywords that start an expression of the form `$kw(...)`.
fn is_ct_call_kw(kw: CtKeyword) -> bool {
    matches!(
        kw,
        CtKeyword::Alignof
            | CtKeyword::And
            | CtKeyword::Assignable
            | CtKeyword::Defined
            | CtKeyword::Eval
            | CtKeyword::Extnameof
            | CtKeyword::Feature
            | CtKeyword::IsConst
            | CtKeyword::Nameof
            | CtKeyword::Offsetof
            | CtKeyword::Qnameof
            | CtKeyword::Sizeof
            | CtKeyword::Stringify
            | CtKeyword::Vaarg
            | CtKeyword::Vaconst
            | CtKeyword::Vacount
            | CtKeyword::Varef
            | CtKeyword::Vaexpr
    )
}

/// Whether a token can begin an operand.
pub(crate) fn is_operand_start(kind: &TokenKind) -> bool {
    match kind {
        TokenKind::Ident(_)
        | TokenKind::TypeIdent(_)
        | TokenKind::ConstIdent(_)
        | TokenKind::AtIdent(_)
        | TokenKind::AtTypeIdent(_)
        | TokenKind::CtIdent(_)
        | TokenKind::CtConstIdent(_)
        | TokenKind::CtTypeIdent(_)
        | TokenKind::HashIdent(_)
        | TokenKind::Builtin
        | TokenKind::Primitive(_)
        | TokenKind::Int(_)
        | TokenKind::Float(_)
        | TokenKind::Char(_)
        | TokenKind::String(..)
        | TokenKind::Bytes(..)
        | TokenKind::LParen
        | TokenKind::LBrace
        | TokenKind::LBraceBar
        | TokenKind::Amp
        | TokenKind::AmpAmp
        | TokenKind::Star
        | TokenKind::Plus
        | TokenKind::Minus
        | TokenKind::Tilde
        | TokenKind::Bang
        | TokenKind::BangBang
        | TokenKind::PlusPlus
        | TokenKind::MinusMinus => true,
        TokenKind::Kw(kw) => matches!(
            kw,
            Keyword::True | Keyword::False | Keyword::Null | Keyword::Try | Keyword::Catch | Keyword::Fn
        ),
        TokenKind::CtKw(kw) => is_ct_call_kw(*kw) || ct_type_func(*kw).is_some(),
        _ => false,
    }
}

impl Parser {
    /// Operand start, counting `^` inside a subscript.
    fn at_operand_start(&self) -> bool {
        is_operand_start(self.current_kind())
            || (self.allow_from_end && self.check(&TokenKind::Caret))
    }

    pub(crate) fn mk_expr(&mut self, kind: ExprKind, span: Span) -> Expr {
        Expr { id: self.next_id(), kind, span }
    }

    // =========================================================================
    // Precedence climbing
    // =========================================================================

    pub fn parse_expr(&mut self) -> PResult<Expr> {
        self.parse_expr_prec(Precedence::Assignment)
    }

    pub(crate) fn parse_expr_prec(&mut self, min: Precedence) -> PResult<Expr> {
        self.trace("expr");
        let lhs = self.parse_unary()?;
        self.parse_infix(lhs, min)
    }

    fn parse_infix(&mut self, mut lhs: Expr, min: Precedence) -> PResult<Expr> {
        loop {
            let start = lhs.span;

            if let Some((op, prec)) = binary_op(self.current_kind()) {
                if prec < min {
                    break;
                }
                self.advance();
                let rhs = self.parse_expr_prec(prec.next())?;
                let span = start.to(rhs.span);
                lhs = self.mk_expr(
                    ExprKind::Binary { op, left: Box::new(lhs), right: Box::new(rhs) },
                    span,
                );
                continue;
            }

            if let Some(op) = assign_op(self.current_kind()) {
                if min > Precedence::Assignment {
                    break;
                }
                if !lhs.is_assignable() {
                    let err = ParseError::structural(
                        format!("cannot assign to a {} expression", lhs.tag()),
                        lhs.span,
                    );
                    self.record_error(err);
                }
                self.advance();
                let value = self.parse_expr_prec(Precedence::Assignment)?;
                let span = start.to(value.span);
                lhs = self.mk_expr(
                    ExprKind::Assign { op, target: Box::new(lhs), value: Box::new(value) },
                    span,
                );
                continue;
            }

            match self.current_kind() {
                TokenKind::DotDot if Precedence::Range >= min => {
                    self.advance();
                    let end = if self.at_operand_start() {
                        Some(Box::new(self.parse_expr_prec(Precedence::Range.next())?))
                    } else {
                        None
                    };
                    let span = self.span_from(start);
                    lhs = self.mk_expr(
                        ExprKind::Range { start: Some(Box::new(lhs)), end, kind: RangeKind::DotDot },
                        span,
                    );
                }
                TokenKind::Question if Precedence::Ternary >= min => {
                    lhs = self.parse_question(lhs)?;
                }
                TokenKind::Elvis if Precedence::Ternary >= min => {
                    self.advance();
                    let right = self.parse_expr_prec(Precedence::Ternary)?;
                    let span = start.to(right.span);
                    lhs = self.mk_expr(ExprKind::Elvis { left: Box::new(lhs), right: Box::new(right) }, span);
                }
                TokenKind::QuestionQuestion if Precedence::Ternary >= min => {
                    self.advance();
                    let right = self.parse_expr_prec(Precedence::Ternary)?;
                    let span = start.to(right.span);
                    lhs = self.mk_expr(ExprKind::OptElse { left: Box::new(lhs), right: Box::new(right) }, span);
                }
                _ => break,
            }
        }
        Ok(lhs)
    }

    /// `c ? a : b`, or the suffixes `a?` and `a?!`.
    fn parse_question(&mut self, lhs: Expr) -> PResult<Expr> {
        let start = lhs.span;
        let rethrow = matches!(self.peek(1), TokenKind::Bang) && !is_operand_start(self.peek(2));
        if rethrow || !is_operand_start(self.peek(1)) {
            self.advance();
            if rethrow {
                self.advance();
            }
            let span = self.span_from(start);
            return Ok(self.mk_expr(ExprKind::Optional { expr: Box::new(lhs), rethrow }, span));
        }

        self.advance();
        let then_expr = self.parse_expr()?;
        self.expect(&TokenKind::Colon)?;
        let else_expr = self.parse_expr_prec(Precedence::Ternary)?;
        let span = start.to(else_expr.span);
        Ok(self.mk_expr(
            ExprKind::Ternary {
                cond: Box::new(lhs),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            },
            span,
        ))
    }

    // =========================================================================
    // Prefix
    // =========================================================================

    pub(crate) fn parse_unary(&mut self) -> PResult<Expr> {
        let start = self.current().span;
        let op = match self.current_kind() {
            TokenKind::Amp => Some(UnaryOp::AddrOf),
            TokenKind::AmpAmp => Some(UnaryOp::AddrOfTemp),
            TokenKind::Star => Some(UnaryOp::Deref),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::PlusPlus => Some(UnaryOp::PreInc),
            TokenKind::MinusMinus => Some(UnaryOp::PreDec),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            let span = self.span_from(start);
            return Ok(self.mk_expr(ExprKind::Unary { op, operand: Box::new(operand) }, span));
        }

        match self.current_kind() {
            // `!!x` lexes as one token; as a prefix it is two negations.
            TokenKind::BangBang => {
                self.advance();
                let operand = self.parse_unary()?;
                let inner_start = Span {
                    start: start.start + 1,
                    col: start.col + 1,
                    ..start
                };
                let inner_span = inner_start.to(operand.span);
                let inner = self.mk_expr(
                    ExprKind::Unary { op: UnaryOp::Not, operand: Box::new(operand) },
                    inner_span,
                );
                let span = self.span_from(start);
                Ok(self.mk_expr(ExprKind::Unary { op: UnaryOp::Not, operand: Box::new(inner) }, span))
            }
            TokenKind::Kw(Keyword::Try) => self.parse_try(),
            TokenKind::Kw(Keyword::Catch) => self.parse_catch(false),
            TokenKind::Caret if self.allow_from_end => {
                self.advance();
                let operand = self.parse_unary()?;
                let span = self.span_from(start);
                Ok(self.mk_expr(ExprKind::FromEnd(Box::new(operand)), span))
            }
            TokenKind::LParen => match self.try_parse_cast()? {
                Some(cast) => Ok(cast),
                None => {
                    let primary = self.parse_primary()?;
                    self.parse_postfix(primary)
                }
            },
            _ => {
                let primary = self.parse_primary()?;
                self.parse_postfix(primary)
            }
        }
    }

    /// `try [binding =] operand`; the operand stops before `&&`, `||` and
    /// the ternary family.
    fn parse_try(&mut self) -> PResult<Expr> {
        self.trace("try");
        let start = self.advance();
        let binding = self.parse_binding();
        let operand = self.parse_expr_prec(Precedence::Comparative)?;
        let span = self.span_from(start);
        Ok(self.mk_expr(ExprKind::Try { binding, expr: Box::new(operand) }, span))
    }

    /// `catch [binding =] operand`. In a condition (`list`) the rest of the
    /// comma list belongs to the catch.
    pub(crate) fn parse_catch(&mut self, list: bool) -> PResult<Expr> {
        self.trace("catch");
        let start = self.advance();
        let binding = self.parse_binding();
        let mut exprs = vec![self.parse_expr_prec(Precedence::Comparative)?];
        while list && self.match_token(&TokenKind::Comma) {
            exprs.push(self.parse_expr_prec(Precedence::Comparative)?);
        }
        let span = self.span_from(start);
        Ok(self.mk_expr(ExprKind::Catch { binding, exprs }, span))
    }

    /// `name =` or `Type name =` after `try`/`catch`.
    fn parse_binding(&mut self) -> Option<Binding> {
        if let (TokenKind::Ident(name), TokenKind::Eq) = (self.current_kind(), self.peek(1)) {
            let name = name.clone();
            self.advance();
            self.advance();
            return Some(Binding { ty: None, name });
        }
        if !self.type_starts_at(0) {
            return None;
        }
        let ty = self.try_parse_type_then(|p| {
            matches!(p.current_kind(), TokenKind::Ident(_)) && matches!(p.peek(1), TokenKind::Eq)
        })?;
        let name = self.expect_ident().ok()?;
        self.advance();
        Some(Binding { ty: Some(ty), name })
    }

    /// `(Type)operand`. Returns `None`, with the position untouched, when the
    /// parenthesis does not hold a cast.
    fn try_parse_cast(&mut self) -> PResult<Option<Expr>> {
        if !self.type_starts_at(1) {
            return Ok(None);
        }
        let snap = self.snapshot();
        let start = self.advance();
        let ty = match self.parse_type() {
            Ok(ty) if self.check(&TokenKind::RParen) => ty,
            _ => {
                self.restore(snap);
                return Ok(None);
            }
        };
        self.advance();

        if is_operand_start(self.current_kind()) {
            let operand = self.parse_unary()?;
            let span = self.span_from(start);
            return Ok(Some(self.mk_expr(ExprKind::Cast { ty, expr: Box::new(operand) }, span)));
        }

        let modified = matches!(
            ty.kind,
            TypeKind::Pointer(_) | TypeKind::Array { .. } | TypeKind::Vector { .. } | TypeKind::Optional(_)
        );
        if modified && !self.check(&TokenKind::Dot) {
            let span = self.span_from(start);
            let err = ParseError::ambiguous(
                "parenthesised type",
                format!(
                    "{} cannot follow a cast, and a type is not a value here",
                    self.current_kind().display_name()
                ),
                span,
            )
            .with_hint("add the operand to cast, or drop the parentheses");
            self.record_error(err);
            let ty_span = ty.span;
            let inner = self.mk_expr(ExprKind::Type(ty), ty_span);
            return Ok(Some(self.mk_expr(ExprKind::Paren(Box::new(inner)), span)));
        }

        self.restore(snap);
        Ok(None)
    }

    // =========================================================================
    // Primary
    // =========================================================================

    fn parse_primary(&mut self) -> PResult<Expr> {
        self.trace("primary");
        let start = self.current().span;
        let lexeme = self.current().lexeme.clone();
        let kind = match self.current_kind().clone() {
            TokenKind::Int(v) => {
                self.advance();
                ExprKind::Literal(Literal { kind: LiteralKind::Int(v), lexeme })
            }
            TokenKind::Float(v) => {
                self.advance();
                ExprKind::Literal(Literal { kind: LiteralKind::Float(v), lexeme })
            }
            TokenKind::Char(c) => {
                self.advance();
                ExprKind::Literal(Literal { kind: LiteralKind::Char(c), lexeme })
            }
            TokenKind::Bytes(bytes, encoding) => {
                self.advance();
                ExprKind::Literal(Literal { kind: LiteralKind::Bytes { bytes, encoding }, lexeme })
            }
            TokenKind::String(..) => self.parse_string_literal(),
            TokenKind::Kw(Keyword::True) | TokenKind::Kw(Keyword::False) => {
                let value = self.check_kw(Keyword::True);
                self.advance();
                ExprKind::Literal(Literal { kind: LiteralKind::Bool(value), lexeme })
            }
            TokenKind::Kw(Keyword::Null) => {
                self.advance();
                ExprKind::Literal(Literal { kind: LiteralKind::Null, lexeme })
            }
            TokenKind::Ident(_) if self.path_ends_in_type(0) => return self.parse_type_operand(),
            TokenKind::Ident(_)
            | TokenKind::ConstIdent(_)
            | TokenKind::AtIdent(_)
            | TokenKind::AtTypeIdent(_) => self.parse_ident()?,
            TokenKind::TypeIdent(_) | TokenKind::Primitive(_) | TokenKind::CtTypeIdent(_) => {
                return self.parse_type_operand();
            }
            TokenKind::CtKw(kw) if ct_type_func(kw).is_some() => return self.parse_type_operand(),
            TokenKind::CtKw(kw) if is_ct_call_kw(kw) => self.parse_ct_call(kw)?,
            TokenKind::CtIdent(name) | TokenKind::CtConstIdent(name) => {
                self.advance();
                ExprKind::CtIdent(name)
            }
            TokenKind::HashIdent(name) => {
                self.advance();
                ExprKind::HashIdent(name)
            }
            TokenKind::Builtin => {
                self.advance();
                let name = match self.current_kind() {
                    TokenKind::Ident(n) | TokenKind::ConstIdent(n) | TokenKind::TypeIdent(n) => n.clone(),
                    _ => return Err(self.error_expected("builtin name")),
                };
                self.advance();
                ExprKind::Builtin(name)
            }
            TokenKind::LParen if self.paren_is_lambda() => self.parse_arrow_lambda()?,
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                ExprKind::Paren(Box::new(inner))
            }
            TokenKind::LBraceBar => {
                self.advance();
                let stmts = self.parse_stmt_list(|k| matches!(k, TokenKind::BarRBrace));
                self.expect(&TokenKind::BarRBrace)?;
                ExprKind::ExprBlock(Block { stmts, span: self.span_from(start) })
            }
            TokenKind::LBrace => ExprKind::Initializer(self.parse_initializer_args()?),
            TokenKind::Kw(Keyword::Fn) => self.parse_fn_lambda()?,
            _ => return Err(self.error_expected("expression")),
        };
        let span = self.span_from(start);
        Ok(self.mk_expr(kind, span))
    }

    /// Adjacent string literals concatenate into one.
    fn parse_string_literal(&mut self) -> ExprKind {
        let mut value = String::new();
        let mut parts = Vec::new();
        let mut style = None;
        while let TokenKind::String(s, st) = self.current_kind() {
            value.push_str(s);
            style.get_or_insert(*st);
            parts.push(self.current().lexeme.clone());
            self.advance();
        }
        ExprKind::Literal(Literal {
            kind: LiteralKind::String { value, style: style.unwrap_or(StringStyle::Plain) },
            lexeme: parts.join(" "),
        })
    }

    /// `foo`, `FOO`, `@foo`, `a::b::foo`.
    fn parse_ident(&mut self) -> PResult<ExprKind> {
        let path = self.parse_path_prefix();
        let (name, class) = match self.current_kind() {
            TokenKind::Ident(n) => (n.clone(), IdentClass::Ident),
            TokenKind::ConstIdent(n) => (n.clone(), IdentClass::Const),
            TokenKind::AtIdent(n) | TokenKind::AtTypeIdent(n) => {
                (n.clone(), classify_word(n.trim_start_matches('@')))
            }
            _ => return Err(self.error_expected("identifier")),
        };
        self.advance();
        Ok(ExprKind::Ident { path, name, class })
    }

    /// A type used as a value: `int.max`, `Foo { 1, 2 }`, `$typeof(x)`.
    fn parse_type_operand(&mut self) -> PResult<Expr> {
        let start = self.current().span;
        let base = self.parse_base_type()?;
        let ty = self.parse_type_suffixes(base, true)?;
        let expr = if self.check(&TokenKind::LBrace) {
            let args = self.parse_initializer_args()?;
            let span = self.span_from(start);
            self.mk_expr(ExprKind::CompoundLiteral { ty, args }, span)
        } else {
            let span = ty.span;
            self.mk_expr(ExprKind::Type(ty), span)
        };
        self.parse_postfix(expr)
    }

    fn parse_ct_call(&mut self, func: CtKeyword) -> PResult<ExprKind> {
        self.advance();
        if func == CtKeyword::Vacount && !self.check(&TokenKind::LParen) {
            return Ok(ExprKind::CtCall { func, args: None });
        }
        self.expect(&TokenKind::LParen)?;
        let args = self.parse_arg_list(&TokenKind::RParen)?;
        self.expect(&TokenKind::RParen)?;
        Ok(ExprKind::CtCall { func, args: Some(args) })
    }

    // =========================================================================
    // Lambdas
    // =========================================================================

    /// A parenthesised list directly followed by `=>`.
    fn paren_is_lambda(&self) -> bool {
        self.matching_close(self.pos)
            .and_then(|close| self.tokens.get(close + 1))
            .is_some_and(|t| matches!(t.kind, TokenKind::FatArrow))
    }

    /// `(params) => expr`
    fn parse_arrow_lambda(&mut self) -> PResult<ExprKind> {
        self.trace("lambda");
        let params = self.parse_params()?;
        let attrs = self.parse_attributes()?;
        self.expect(&TokenKind::FatArrow)?;
        let body = LambdaBody::Expr(self.parse_expr()?);
        Ok(ExprKind::Lambda(Box::new(Lambda { ret: None, params, attrs, body })))
    }

    /// `fn [Ret] (params) attrs { ... }` or `... => expr`
    fn parse_fn_lambda(&mut self) -> PResult<ExprKind> {
        self.trace("lambda");
        self.expect_kw(Keyword::Fn)?;
        let ret = if self.check(&TokenKind::LParen) { None } else { Some(self.parse_type()?) };
        let params = self.parse_params()?;
        let attrs = self.parse_attributes()?;
        let body = if self.match_token(&TokenKind::FatArrow) {
            LambdaBody::Expr(self.parse_expr()?)
        } else {
            LambdaBody::Block(self.parse_block()?)
        };
        Ok(ExprKind::Lambda(Box::new(Lambda { ret, params, attrs, body })))
    }

    // =========================================================================
    // Postfix
    // =========================================================================

    fn parse_postfix(&mut self, mut expr: Expr) -> PResult<Expr> {
        loop {
            let start = expr.span;
            let kind = match self.current_kind() {
                TokenKind::LParen => {
                    expr = self.parse_call(expr)?;
                    continue;
                }
                TokenKind::LBracket => {
                    self.advance();
                    let saved = std::mem::replace(&mut self.allow_from_end, true);
                    let index = self.parse_subscript_index();
                    self.allow_from_end = saved;
                    let index = index?;
                    self.expect(&TokenKind::RBracket)?;
                    ExprKind::Subscript { object: Box::new(expr), index: Box::new(index) }
                }
                TokenKind::Dot => {
                    self.advance();
                    let member = self.parse_member()?;
                    ExprKind::Field { object: Box::new(expr), member }
                }
                TokenKind::LGen => {
                    let args = self.parse_generic_args()?;
                    ExprKind::GenericApply { callee: Box::new(expr), args }
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let op = if self.check(&TokenKind::PlusPlus) { PostfixOp::Inc } else { PostfixOp::Dec };
                    self.advance();
                    ExprKind::Postfix { op, operand: Box::new(expr) }
                }
                TokenKind::Bang | TokenKind::BangBang => {
                    let force = self.check(&TokenKind::BangBang);
                    self.advance();
                    ExprKind::Rethrow { expr: Box::new(expr), force }
                }
                _ => break,
            };
            let span = self.span_from(start);
            expr = self.mk_expr(kind, span);
        }
        Ok(expr)
    }

    fn parse_member(&mut self) -> PResult<Member> {
        let name = match self.current_kind() {
            TokenKind::Ident(n)
            | TokenKind::ConstIdent(n)
            | TokenKind::TypeIdent(n)
            | TokenKind::AtIdent(n)
            | TokenKind::HashIdent(n)
            | TokenKind::CtIdent(n) => n.clone(),
            TokenKind::Primitive(PrimitiveType::Typeid) => "typeid".to_string(),
            TokenKind::CtKw(CtKeyword::Eval) => {
                self.advance();
                self.expect(&TokenKind::LParen)?;
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                return Ok(Member::Eval(Box::new(inner)));
            }
            _ => return Err(self.error_expected("member name")),
        };
        self.advance();
        Ok(Member::Name(name))
    }

    /// Inside `[...]`: an index, `a..b`, `a:len`, with open bounds and `^n`.
    fn parse_subscript_index(&mut self) -> PResult<Expr> {
        let start = self.current().span;
        let open_kind = match self.current_kind() {
            TokenKind::DotDot => Some(RangeKind::DotDot),
            TokenKind::Colon => Some(RangeKind::Len),
            _ => None,
        };
        if let Some(kind) = open_kind {
            self.advance();
            let end = self.parse_range_end()?;
            let span = self.span_from(start);
            return Ok(self.mk_expr(ExprKind::Range { start: None, end, kind }, span));
        }

        let first = self.parse_expr()?;
        if !self.match_token(&TokenKind::Colon) {
            return Ok(first);
        }
        let end = self.parse_range_end()?;
        let span = self.span_from(start);
        Ok(self.mk_expr(
            ExprKind::Range { start: Some(Box::new(first)), end, kind: RangeKind::Len },
            span,
        ))
    }

    fn parse_range_end(&mut self) -> PResult<Option<Box<Expr>>> {
        if self.check(&TokenKind::RBracket) {
            Ok(None)
        } else {
            Ok(Some(Box::new(self.parse_expr()?)))
        }
    }

    /// Call arguments, trailing-block parameters, inline attributes and, for
    /// `@macro` calls, a trailing compound block.
    fn parse_call(&mut self, callee: Expr) -> PResult<Expr> {
        self.trace("call");
        let start = callee.span;
        self.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.check(&TokenKind::Semi) && !self.at_end() {
            args.push(self.parse_arg()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        let trailing_params = if self.match_token(&TokenKind::Semi) {
            Some(self.parse_param_items()?)
        } else {
            None
        };
        self.expect(&TokenKind::RParen)?;
        let attrs = self.parse_attributes()?;

        let is_macro = matches!(&callee.kind, ExprKind::Ident { name, .. } if name.starts_with('@'))
            || matches!(&callee.kind, ExprKind::Field { member: Member::Name(name), .. } if name.starts_with('@'));
        let body = if is_macro && self.check(&TokenKind::LBrace) {
            Some(self.parse_block()?)
        } else {
            None
        };

        let span = self.span_from(start);
        Ok(self.mk_expr(
            ExprKind::Call { callee: Box::new(callee), args, trailing_params, attrs, body },
            span,
        ))
    }

    // =========================================================================
    // Arguments and initializers
    // =========================================================================

    pub(crate) fn parse_arg_list(&mut self, close: &TokenKind) -> PResult<Vec<Arg>> {
        let mut args = Vec::new();
        while !self.check(close) && !self.at_end() {
            args.push(self.parse_arg()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        Ok(args)
    }

    /// `{ a, .b = c, [0] = d, ...rest }`; a trailing comma is allowed.
    pub(crate) fn parse_initializer_args(&mut self) -> PResult<Vec<Arg>> {
        self.trace("initializer");
        self.expect(&TokenKind::LBrace)?;
        let args = self.parse_arg_list(&TokenKind::RBrace)?;
        self.expect(&TokenKind::RBrace)?;
        Ok(args)
    }

    fn parse_arg(&mut self) -> PResult<Arg> {
        match self.current_kind() {
            TokenKind::Dot | TokenKind::LBracket => self.parse_designated(),
            TokenKind::Ellipsis => {
                self.advance();
                Ok(Arg::Splat(self.parse_expr()?))
            }
            TokenKind::CtKw(CtKeyword::Vasplat) => {
                self.advance();
                let range = if self.match_token(&TokenKind::LParen) {
                    let range = if self.check(&TokenKind::RParen) {
                        None
                    } else {
                        Some(self.parse_expr()?)
                    };
                    self.expect(&TokenKind::RParen)?;
                    range
                } else {
                    None
                };
                Ok(Arg::VaSplat(range))
            }
            _ => Ok(Arg::Expr(self.parse_expr()?)),
        }
    }

    /// `.a.b[0] = value`
    fn parse_designated(&mut self) -> PResult<Arg> {
        let mut path = Vec::new();
        loop {
            if self.match_token(&TokenKind::Dot) {
                match self.parse_member()? {
                    Member::Name(name) => path.push(Designator::Field(name)),
                    Member::Eval(_) => return Err(self.error_expected("field name")),
                }
            } else if self.match_token(&TokenKind::LBracket) {
                let index = self.parse_expr()?;
                self.expect(&TokenKind::RBracket)?;
                path.push(Designator::Index(index));
            } else {
                break;
            }
        }
        self.expect(&TokenKind::Eq)?;
        let value = self.parse_expr()?;
        Ok(Arg::Designated { path, value })
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    fn at_attribute(&self) -> bool {
        let mut i = 0;
        while matches!(self.peek(i), TokenKind::Ident(_)) && matches!(self.peek(i + 1), TokenKind::ColonColon) {
            i += 2;
        }
        matches!(self.peek(i), TokenKind::AtIdent(_) | TokenKind::AtTypeIdent(_))
    }

    pub(crate) fn parse_attributes(&mut self) -> PResult<Vec<Attribute>> {
        let mut attrs = Vec::new();
        while self.at_attribute() {
            attrs.push(self.parse_attribute()?);
        }
        Ok(attrs)
    }

    pub(crate) fn parse_attribute(&mut self) -> PResult<Attribute> {
        let start = self.current().span;
        let path = self.parse_path_prefix();
        let name = match self.current_kind() {
            TokenKind::AtIdent(n) | TokenKind::AtTypeIdent(n) => n.clone(),
            _ => return Err(self.error_expected("attribute")),
        };
        self.advance();

        let args = if self.match_token(&TokenKind::LParen) {
            let mut args = Vec::new();
            while !self.check(&TokenKind::RParen) && !self.at_end() {
                args.push(self.parse_attr_arg()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RParen)?;
            Some(args)
        } else {
            None
        };
        Ok(Attribute { path, name, args, span: self.span_from(start) })
    }

    fn parse_attr_arg(&mut self) -> PResult<AttrArg> {
        match (self.current_kind(), self.peek(1), self.peek(2)) {
            (TokenKind::LBracket, TokenKind::RBracket, _) => {
                self.advance();
                self.advance();
                if self.match_token(&TokenKind::Eq) {
                    Ok(AttrArg::Operator(OverloadOp::IndexAssign))
                } else {
                    Ok(AttrArg::Operator(OverloadOp::Index))
                }
            }
            (TokenKind::Amp, TokenKind::LBracket, TokenKind::RBracket) => {
                self.advance();
                self.advance();
                self.advance();
                Ok(AttrArg::Operator(OverloadOp::IndexRef))
            }
            _ => Ok(AttrArg::Expr(self.parse_expr()?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use c3_ast::expr::BinOp;

    fn expr(src: &str) -> Expr {
        let lexed = c3_lexer::Lexer::new(src).tokenize();
        assert!(lexed.errors.is_empty(), "lex errors: {:?}", lexed.errors);
        let mut parser = Parser::new(lexed.tokens);
        let e = parser.parse_expr().expect("expression should parse");
        assert!(parser.at_end(), "trailing tokens in {:?}", src);
        assert!(parser.errors.is_empty(), "errors: {:?}", parser.errors);
        e
    }

    #[test]
    fn ternary_versus_optional_suffix() {
        assert!(matches!(expr("a ? b : c").kind, ExprKind::Ternary { .. }));
        assert!(matches!(expr("foo()?").kind, ExprKind::Optional { rethrow: false, .. }));
        assert!(matches!(expr("foo()?!").kind, ExprKind::Optional { rethrow: true, .. }));
        assert!(matches!(expr("a ? !b : c").kind, ExprKind::Ternary { .. }));
    }

    #[test]
    fn cast_and_parenthesised_type() {
        let e = expr("(int)x + 1");
        let ExprKind::Binary { op: BinOp::Add, left, .. } = e.kind else { panic!("expected add") };
        assert!(matches!(left.kind, ExprKind::Cast { .. }));

        let e = expr("(Foo).sizeof");
        let ExprKind::Field { object, .. } = e.kind else { panic!("expected field") };
        assert!(matches!(object.kind, ExprKind::Paren(_)));
    }

    #[test]
    fn ambiguous_parenthesised_pointer_type() {
        let lexed = c3_lexer::Lexer::new("(int*) ;").tokenize();
        let mut parser = Parser::new(lexed.tokens);
        let e = parser.parse_expr().expect("recovers");
        assert!(matches!(e.kind, ExprKind::Paren(_)));
        assert_eq!(parser.errors.len(), 1);
        assert!(matches!(
            parser.errors[0].kind,
            crate::error::ParseErrorKind::AmbiguousConstruct { .. }
        ));
    }

    #[test]
    fn postfix_chain() {
        let e = expr("a.b[1](2)!");
        let ExprKind::Rethrow { expr: call, force: false } = e.kind else { panic!("expected rethrow") };
        let ExprKind::Call { callee, args, .. } = call.kind else { panic!("expected call") };
        assert_eq!(args.len(), 1);
        assert!(matches!(callee.kind, ExprKind::Subscript { .. }));
    }

    #[test]
    fn subscript_ranges() {
        let e = expr("a[1..^1]");
        let ExprKind::Subscript { index, .. } = e.kind else { panic!("expected subscript") };
        let ExprKind::Range { end: Some(end), kind: RangeKind::DotDot, .. } = index.kind else {
            panic!("expected range")
        };
        assert!(matches!(end.kind, ExprKind::FromEnd(_)));

        let e = expr("a[2:3]");
        let ExprKind::Subscript { index, .. } = e.kind else { panic!("expected subscript") };
        assert!(matches!(index.kind, ExprKind::Range { kind: RangeKind::Len, .. }));

        let e = expr("a[..]");
        let ExprKind::Subscript { index, .. } = e.kind else { panic!("expected subscript") };
        assert!(matches!(index.kind, ExprKind::Range { start: None, end: None, .. }));
    }

    #[test]
    fn macro_call_with_trailing_block() {
        let e = expr("@pool(; x) { foo(x); }");
        let ExprKind::Call { trailing_params: Some(params), body: Some(body), .. } = e.kind else {
            panic!("expected macro call with body")
        };
        assert_eq!(params.len(), 1);
        assert_eq!(body.stmts.len(), 1);
    }

    #[test]
    fn initializers_and_compound_literals() {
        let e = expr("Foo { 1, .b = 2, [3] = 4, ...rest }");
        let ExprKind::CompoundLiteral { args, .. } = e.kind else { panic!("expected compound") };
        assert_eq!(args.len(), 4);
        assert!(matches!(args[1], Arg::Designated { .. }));
        assert!(matches!(args[2], Arg::Designated { .. }));
        assert!(matches!(args[3], Arg::Splat(_)));
    }

    #[test]
    fn lambdas() {
        assert!(matches!(expr("fn int (int a) => a * 2").kind, ExprKind::Lambda(_)));
        assert!(matches!(expr("(a, b) => a + b").kind, ExprKind::Lambda(_)));
        assert!(matches!(expr("fn void () { return; }").kind, ExprKind::Lambda(_)));
    }

    #[test]
    fn compile_time_calls() {
        assert!(matches!(expr("$sizeof(int)").kind, ExprKind::CtCall { func: CtKeyword::Sizeof, .. }));
        assert!(matches!(expr("$vacount").kind, ExprKind::CtCall { args: None, .. }));
        assert!(matches!(expr("$$LINE").kind, ExprKind::Builtin(ref n) if n == "LINE"));
        assert!(matches!(expr("int.max").kind, ExprKind::Field { .. }));
    }

    #[test]
    fn adjacent_strings_concatenate() {
        let e = expr("\"ab\" \"cd\"");
        let ExprKind::Literal(lit) = e.kind else { panic!("expected literal") };
        assert!(matches!(lit.kind, LiteralKind::String { ref value, .. } if value == "abcd"));
        assert_eq!(lit.lexeme, "\"ab\" \"cd\"");
    }

    #[test]
    fn assignment_to_literal_is_reported() {
        let lexed = c3_lexer::Lexer::new("1 = x").tokenize();
        let mut parser = Parser::new(lexed.tokens);
        let e = parser.parse_expr().expect("keeps going");
        assert!(matches!(e.kind, ExprKind::Assign { .. }));
        assert_eq!(parser.errors.len(), 1);
    }
}
