// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type parsing.

use c3_ast::decl::Param;
use c3_ast::expr::Expr;
use c3_ast::token::{CtKeyword, Keyword, TokenKind};
use c3_ast::ty::{ArrayLen, CtTypeFunc, TypeExpr, TypeKind, VectorLen};
use c3_ast::Span;

use crate::expr::is_operand_start;
use crate::parser::{PResult, Parser};

pub(crate) fn ct_type_func(kw: CtKeyword) -> Option<CtTypeFunc> {
    match kw {
        CtKeyword::Typeof => Some(CtTypeFunc::Typeof),
        CtKeyword::Typefrom => Some(CtTypeFunc::Typefrom),
        CtKeyword::Vatype => Some(CtTypeFunc::Vatype),
        CtKeyword::Evaltype => Some(CtTypeFunc::Evaltype),
        _ => None,
    }
}

/// Saved parser position for speculative parses.
pub(crate) struct Snapshot {
    pos: usize,
    errors: usize,
    next_node_id: u32,
    halted: bool,
}

impl Parser {
    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            pos: self.pos,
            errors: self.errors.len(),
            next_node_id: self.next_node_id,
            halted: self.halted,
        }
    }

    pub(crate) fn restore(&mut self, snap: Snapshot) {
        self.pos = snap.pos;
        self.errors.truncate(snap.errors);
        self.next_node_id = snap.next_node_id;
        self.halted = snap.halted;
    }

    /// Whether the token `n` ahead can begin a type.
    pub(crate) fn type_starts_at(&self, n: usize) -> bool {
        match self.peek(n) {
            TokenKind::Primitive(_) | TokenKind::TypeIdent(_) | TokenKind::CtTypeIdent(_) => true,
            TokenKind::CtKw(kw) => ct_type_func(*kw).is_some(),
            TokenKind::Ident(_) => self.path_ends_in_type(n),
            _ => false,
        }
    }

    /// `a::b::Foo` starting `n` tokens ahead.
    pub(crate) fn path_ends_in_type(&self, n: usize) -> bool {
        let mut i = n;
        while matches!(self.peek(i), TokenKind::Ident(_))
            && matches!(self.peek(i + 1), TokenKind::ColonColon)
        {
            i += 2;
        }
        i > n && matches!(self.peek(i), TokenKind::TypeIdent(_))
    }

    /// Consume `ident ::` pairs.
    pub(crate) fn parse_path_prefix(&mut self) -> Vec<String> {
        let mut path = Vec::new();
        while let (TokenKind::Ident(seg), TokenKind::ColonColon) = (self.current_kind(), self.peek(1)) {
            path.push(seg.clone());
            self.advance();
            self.advance();
        }
        path
    }

    /// Parse a full type: base, modifiers, optional `!`.
    pub fn parse_type(&mut self) -> PResult<TypeExpr> {
        self.trace("type");
        let base = self.parse_base_type()?;
        self.parse_type_suffixes(base, false)
    }

    /// Speculatively parse a type and keep it only if `accept` approves the
    /// position after it. On rejection everything is rewound.
    pub(crate) fn try_parse_type_then(&mut self, accept: impl Fn(&Parser) -> bool) -> Option<TypeExpr> {
        let snap = self.snapshot();
        match self.parse_type() {
            Ok(ty) if accept(self) => Some(ty),
            _ => {
                self.restore(snap);
                None
            }
        }
    }

    pub(crate) fn parse_base_type(&mut self) -> PResult<TypeExpr> {
        let start = self.current().span;
        let kind = match self.current_kind().clone() {
            TokenKind::Primitive(p) => {
                self.advance();
                TypeKind::Primitive(p)
            }
            TokenKind::TypeIdent(name) => {
                self.advance();
                self.named_type(Vec::new(), name)?
            }
            TokenKind::Ident(_) if self.path_ends_in_type(0) => {
                let path = self.parse_path_prefix();
                let name = self.expect_type_ident()?;
                self.named_type(path, name)?
            }
            TokenKind::CtTypeIdent(name) => {
                self.advance();
                TypeKind::CtType(name)
            }
            TokenKind::CtKw(kw) if ct_type_func(kw).is_some() => {
                self.advance();
                self.expect(&TokenKind::LParen)?;
                let arg = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                match ct_type_func(kw) {
                    Some(func) => TypeKind::CtTypeCall { func, arg: Box::new(arg) },
                    None => return Err(self.error_expected("type")),
                }
            }
            _ => return Err(self.error_expected("type")),
        };
        Ok(TypeExpr { id: self.next_id(), kind, span: self.span_from(start) })
    }

    fn named_type(&mut self, path: Vec<String>, name: String) -> PResult<TypeKind> {
        let generic_args = if self.check(&TokenKind::LGen) {
            Some(self.parse_generic_args()?)
        } else {
            None
        };
        Ok(TypeKind::Named { path, name, generic_args })
    }

    /// `(< a, b >)`
    pub(crate) fn parse_generic_args(&mut self) -> PResult<Vec<Expr>> {
        self.expect(&TokenKind::LGen)?;
        let mut args = Vec::new();
        while !self.check(&TokenKind::RGen) && !self.at_end() {
            args.push(self.parse_expr()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RGen)?;
        Ok(args)
    }

    /// Fold `*`, `[..]` and `[<..>]` left to right, then an optional `!`.
    ///
    /// In `lenient` mode (a type in expression position) `*` and `!` are only
    /// taken when no operand follows, so `Foo * x` is left alone.
    pub(crate) fn parse_type_suffixes(&mut self, mut ty: TypeExpr, lenient: bool) -> PResult<TypeExpr> {
        let start = ty.span;
        loop {
            match self.current_kind() {
                TokenKind::Star => {
                    if lenient && is_operand_start(self.peek(1)) {
                        break;
                    }
                    self.advance();
                    ty = self.wrap_type(start, TypeKind::Pointer(Box::new(ty)));
                }
                TokenKind::LBracket => {
                    self.advance();
                    let len = if self.match_token(&TokenKind::RBracket) {
                        ArrayLen::Slice
                    } else if self.check(&TokenKind::Star) && matches!(self.peek(1), TokenKind::RBracket) {
                        self.advance();
                        self.advance();
                        ArrayLen::Inferred
                    } else {
                        let len = self.parse_expr()?;
                        self.expect(&TokenKind::RBracket)?;
                        ArrayLen::Fixed(Box::new(len))
                    };
                    ty = self.wrap_type(start, TypeKind::Array { elem: Box::new(ty), len });
                }
                TokenKind::LVec => {
                    self.advance();
                    let len = if self.check(&TokenKind::Star) && matches!(self.peek(1), TokenKind::RVec) {
                        self.advance();
                        self.advance();
                        VectorLen::Inferred
                    } else {
                        let len = self.parse_expr()?;
                        self.expect(&TokenKind::RVec)?;
                        VectorLen::Fixed(Box::new(len))
                    };
                    ty = self.wrap_type(start, TypeKind::Vector { elem: Box::new(ty), len });
                }
                _ => break,
            }
        }
        if self.check(&TokenKind::Bang) && !(lenient && is_operand_start(self.peek(1))) {
            self.advance();
            ty = self.wrap_type(start, TypeKind::Optional(Box::new(ty)));
        }
        Ok(ty)
    }

    fn wrap_type(&mut self, start: Span, kind: TypeKind) -> TypeExpr {
        TypeExpr { id: self.next_id(), kind, span: self.span_from(start) }
    }

    /// Right-hand side of `def Name = ...`: a type or `fn Ret(params)`.
    pub(crate) fn parse_def_type(&mut self) -> PResult<TypeExpr> {
        if !self.check_kw(Keyword::Fn) {
            return self.parse_type();
        }
        let start = self.advance();
        let ret = self.parse_type()?;
        let params: Vec<Param> = self.parse_params()?;
        Ok(self.wrap_type(start, TypeKind::Func { ret: Box::new(ret), params }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use c3_ast::ty::PrimitiveType;

    fn parse_ty(src: &str) -> TypeExpr {
        let lexed = c3_lexer::Lexer::new(src).tokenize();
        let mut parser = Parser::new(lexed.tokens);
        let ty = parser.parse_type().expect("type should parse");
        assert!(parser.at_end(), "trailing tokens in {:?}", src);
        ty
    }

    #[test]
    fn optional_wraps_whole_type() {
        let ty = parse_ty("int!");
        let TypeKind::Optional(inner) = ty.kind else { panic!("expected optional") };
        assert!(matches!(inner.kind, TypeKind::Primitive(PrimitiveType::Int)));
    }

    #[test]
    fn modifiers_fold_left_to_right() {
        // int*[4] is an array of four pointers
        let ty = parse_ty("int*[4]");
        let TypeKind::Array { elem, len: ArrayLen::Fixed(_) } = ty.kind else { panic!("expected array") };
        assert!(matches!(elem.kind, TypeKind::Pointer(_)));
    }

    #[test]
    fn slices_vectors_and_inferred() {
        assert!(matches!(parse_ty("char[]").kind, TypeKind::Array { len: ArrayLen::Slice, .. }));
        assert!(matches!(parse_ty("int[*]").kind, TypeKind::Array { len: ArrayLen::Inferred, .. }));
        assert!(matches!(parse_ty("float[<4>]").kind, TypeKind::Vector { len: VectorLen::Fixed(_), .. }));
        assert!(matches!(parse_ty("int[<*>]").kind, TypeKind::Vector { len: VectorLen::Inferred, .. }));
    }

    #[test]
    fn qualified_generic_type() {
        let ty = parse_ty("std::collections::List(<int>)*");
        let TypeKind::Pointer(inner) = ty.kind else { panic!("expected pointer") };
        let TypeKind::Named { path, name, generic_args } = &inner.kind else { panic!("expected named") };
        assert_eq!(path, &["std", "collections"]);
        assert_eq!(name, "List");
        assert_eq!(generic_args.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn compile_time_types() {
        assert!(matches!(parse_ty("$Type").kind, TypeKind::CtType(ref n) if n == "$Type"));
        assert!(matches!(
            parse_ty("$typeof(x)").kind,
            TypeKind::CtTypeCall { func: CtTypeFunc::Typeof, .. }
        ));
    }

    #[test]
    fn speculation_rewinds() {
        let lexed = c3_lexer::Lexer::new("Foo.bar").tokenize();
        let mut parser = Parser::new(lexed.tokens);
        let got = parser.try_parse_type_then(|p| matches!(p.current_kind(), TokenKind::Ident(_)));
        assert!(got.is_none());
        assert_eq!(parser.pos, 0);
        assert_eq!(parser.next_node_id, 0);
    }
}
