// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Declaration parsing.

use c3_ast::decl::{
    AggregateKind, BitField, BitstructDecl, ConstDecl, Decl, DeclKind, DefineDecl, DefineKind,
    DistinctDecl, EnumConst, EnumDecl, FaultDecl, FuncBody, FuncDecl, FuncSignature, GlobalDecl,
    InterfaceDecl, MacroDecl, Param, StructDecl, StructMember, TrailingBlock,
};
use c3_ast::stmt::CtCase;
use c3_ast::token::{CtKeyword, Keyword, TokenKind};
use c3_ast::ty::TypeExpr;
use c3_ast::Span;

use crate::error::ParseError;
use crate::parser::{PResult, Parser};
use crate::precedence::Precedence;
use crate::stmt::is_ct_case_end;

impl Parser {
    // =========================================================================
    // Top level
    // =========================================================================

    /// Parse one top-level declaration, attaching the doc block before it.
    pub(crate) fn parse_decl(&mut self) -> PResult<Decl> {
        let doc = self.take_doc();
        let start = self.current().span;

        let kind = match self.current_kind().clone() {
            TokenKind::Kw(kw) => match kw {
                Keyword::Module => self.parse_module()?,
                Keyword::Import => self.parse_import()?,
                Keyword::Extern => {
                    self.advance();
                    match self.current_kind() {
                        TokenKind::Kw(Keyword::Fn) => DeclKind::Func(self.parse_func(true)?),
                        TokenKind::Kw(Keyword::Const) => {
                            let decl = self.parse_const_decl(true)?;
                            self.expect_semi()?;
                            DeclKind::Const(decl)
                        }
                        _ => DeclKind::Global(self.parse_global(true)?),
                    }
                }
                Keyword::Fn => DeclKind::Func(self.parse_func(false)?),
                Keyword::Macro => DeclKind::Macro(self.parse_macro()?),
                Keyword::Const => {
                    let decl = self.parse_const_decl(false)?;
                    self.expect_semi()?;
                    DeclKind::Const(decl)
                }
                Keyword::Tlocal => DeclKind::Global(self.parse_global(false)?),
                Keyword::Struct | Keyword::Union => DeclKind::Struct(self.parse_struct()?),
                Keyword::Bitstruct => DeclKind::Bitstruct(self.parse_bitstruct()?),
                Keyword::Enum => DeclKind::Enum(self.parse_enum()?),
                Keyword::Fault => DeclKind::Fault(self.parse_fault()?),
                Keyword::Interface => DeclKind::Interface(self.parse_interface()?),
                Keyword::Def => DeclKind::Define(self.parse_define()?),
                Keyword::Distinct => DeclKind::Distinct(self.parse_distinct()?),
                _ => return Err(self.error_expected("declaration")),
            },
            TokenKind::CtKw(kw) => match kw {
                CtKeyword::Assert => {
                    let (cond, message) = self.parse_ct_assert_body()?;
                    DeclKind::CtAssert { cond, message }
                }
                CtKeyword::Echo | CtKeyword::Error => {
                    self.advance();
                    let e = self.parse_expr()?;
                    self.expect_semi()?;
                    if kw == CtKeyword::Echo {
                        DeclKind::CtEcho(e)
                    } else {
                        DeclKind::CtError(e)
                    }
                }
                CtKeyword::Include => {
                    self.advance();
                    self.expect(&TokenKind::LParen)?;
                    let path = self.parse_expr()?;
                    self.expect(&TokenKind::RParen)?;
                    self.expect_semi()?;
                    DeclKind::CtInclude(path)
                }
                CtKeyword::If => self.parse_ct_if_decl()?,
                CtKeyword::Switch => self.parse_ct_switch_decl()?,
                _ => return Err(self.error_expected("declaration")),
            },
            _ if self.type_starts_at(0) => DeclKind::Global(self.parse_global(false)?),
            _ => return Err(self.error_expected("declaration")),
        };

        Ok(Decl { id: self.next_id(), kind, span: self.span_from(start), doc })
    }

    /// Declarations up to a token accepted by `stop`, with recovery.
    fn parse_decl_list(&mut self, stop: impl Fn(&TokenKind) -> bool) -> Vec<Decl> {
        let mut decls = Vec::new();
        while !self.at_end() && !self.halted && !stop(self.current_kind()) {
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
        decls
    }

    fn parse_ct_if_decl(&mut self) -> PResult<DeclKind> {
        self.advance();
        let cond = self.parse_expr()?;
        self.expect(&TokenKind::Colon)?;
        let then_decls = self.parse_decl_list(|k| {
            matches!(k, TokenKind::CtKw(CtKeyword::Else) | TokenKind::CtKw(CtKeyword::Endif))
        });
        let else_decls = if self.match_token(&TokenKind::CtKw(CtKeyword::Else)) {
            Some(self.parse_decl_list(|k| matches!(k, TokenKind::CtKw(CtKeyword::Endif))))
        } else {
            None
        };
        self.expect_ct(CtKeyword::Endif)?;
        Ok(DeclKind::CtIf { cond, then_decls, else_decls })
    }

    fn parse_ct_switch_decl(&mut self) -> PResult<DeclKind> {
        let subject = self.parse_ct_switch_head()?;
        let mut cases = Vec::new();
        while !self.check_ct(CtKeyword::Endswitch) && !self.at_end() && !self.halted {
            let start = self.current().span;
            let label = self.parse_ct_case_label()?;
            let body = self.parse_decl_list(is_ct_case_end);
            cases.push(CtCase { label, body, span: self.span_from(start) });
        }
        self.expect_ct(CtKeyword::Endswitch)?;
        Ok(DeclKind::CtSwitch { subject, cases })
    }

    // =========================================================================
    // Modules and imports
    // =========================================================================

    fn parse_module_path(&mut self) -> PResult<Vec<String>> {
        let mut path = vec![self.expect_ident()?];
        while self.match_token(&TokenKind::ColonColon) {
            path.push(self.expect_ident()?);
        }
        Ok(path)
    }

    fn parse_module(&mut self) -> PResult<DeclKind> {
        self.trace("module");
        self.advance();
        let path = self.parse_module_path()?;
        let mut generic_params = Vec::new();
        if self.match_token(&TokenKind::LGen) {
            while !self.check(&TokenKind::RGen) && !self.at_end() {
                match self.current_kind() {
                    TokenKind::TypeIdent(n) | TokenKind::ConstIdent(n) => {
                        generic_params.push(n.clone());
                        self.advance();
                    }
                    _ => return Err(self.error_expected("generic parameter")),
                }
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RGen)?;
        }
        let attrs = self.parse_attributes()?;
        self.expect_semi()?;
        Ok(DeclKind::Module { path, generic_params, attrs })
    }

    fn parse_import(&mut self) -> PResult<DeclKind> {
        self.trace("import");
        self.advance();
        let mut paths = vec![self.parse_module_path()?];
        while self.match_token(&TokenKind::Comma) {
            paths.push(self.parse_module_path()?);
        }
        let attrs = self.parse_attributes()?;
        self.expect_semi()?;
        Ok(DeclKind::Import { paths, attrs })
    }

    // =========================================================================
    // Functions and macros
    // =========================================================================

    /// `[Type.]name` where the method receiver is present unless the name
    /// directly precedes the parameter list.
    fn parse_callable_name(&mut self) -> PResult<(Option<TypeExpr>, String)> {
        let plain = matches!(self.current_kind(), TokenKind::Ident(_) | TokenKind::AtIdent(_))
            && matches!(self.peek(1), TokenKind::LParen);
        let method_of = if plain {
            None
        } else {
            let ty = self.parse_type()?;
            self.expect(&TokenKind::Dot)?;
            Some(ty)
        };
        let name = match self.current_kind() {
            TokenKind::Ident(n) | TokenKind::AtIdent(n) => n.clone(),
            _ => return Err(self.error_expected("function name")),
        };
        self.advance();
        Ok((method_of, name))
    }

    /// `Ret [Type.]name(params) attrs`
    fn parse_signature(&mut self) -> PResult<FuncSignature> {
        let ret = self.parse_type()?;
        let (method_of, name) = self.parse_callable_name()?;
        let params = self.parse_params()?;
        let attrs = self.parse_attributes()?;
        Ok(FuncSignature { ret, method_of, name, params, attrs })
    }

    fn parse_func(&mut self, is_extern: bool) -> PResult<FuncDecl> {
        self.trace("fn");
        self.expect_kw(Keyword::Fn)?;
        let signature = self.parse_signature()?;
        let body = if self.check(&TokenKind::LBrace) {
            Some(FuncBody::Block(self.parse_block()?))
        } else if self.match_token(&TokenKind::FatArrow) {
            let e = self.parse_expr()?;
            self.expect_semi()?;
            Some(FuncBody::Expr(e))
        } else {
            self.expect_semi()?;
            None
        };
        Ok(FuncDecl { is_extern, signature, body })
    }

    fn parse_macro(&mut self) -> PResult<MacroDecl> {
        self.trace("macro");
        self.advance();

        let name_next = |p: &Parser| {
            matches!(p.current_kind(), TokenKind::Ident(_) | TokenKind::AtIdent(_))
                && matches!(p.peek(1), TokenKind::LParen)
        };
        let (ret, method_of, name) = if name_next(self) {
            let (_, name) = self.parse_callable_name()?;
            (None, None, name)
        } else {
            let ty = self.parse_type()?;
            if self.match_token(&TokenKind::Dot) {
                // `macro Foo.bar()`: receiver without a return type
                let name = self.expect_macro_name()?;
                (None, Some(ty), name)
            } else {
                let (method_of, name) = self.parse_callable_name()?;
                (Some(ty), method_of, name)
            }
        };

        self.expect(&TokenKind::LParen)?;
        let params = self.parse_param_items()?;
        let trailing = if self.match_token(&TokenKind::Semi) {
            let name = match self.current_kind() {
                TokenKind::AtIdent(n) => n.clone(),
                _ => return Err(self.error_expected("trailing block name")),
            };
            self.advance();
            let params = if self.check(&TokenKind::LParen) { Some(self.parse_params()?) } else { None };
            Some(TrailingBlock { name, params })
        } else {
            None
        };
        self.expect(&TokenKind::RParen)?;
        let attrs = self.parse_attributes()?;

        let body = if self.match_token(&TokenKind::FatArrow) {
            let e = self.parse_expr()?;
            self.expect_semi()?;
            FuncBody::Expr(e)
        } else {
            FuncBody::Block(self.parse_block()?)
        };
        Ok(MacroDecl { ret, method_of, name, params, trailing, attrs, body })
    }

    fn expect_macro_name(&mut self) -> PResult<String> {
        match self.current_kind() {
            TokenKind::Ident(n) | TokenKind::AtIdent(n) => {
                let n = n.clone();
                self.advance();
                Ok(n)
            }
            _ => Err(self.error_expected("macro name")),
        }
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// `( params )`
    pub(crate) fn parse_params(&mut self) -> PResult<Vec<Param>> {
        self.expect(&TokenKind::LParen)?;
        let params = self.parse_param_items()?;
        self.expect(&TokenKind::RParen)?;
        Ok(params)
    }

    /// Parameters up to `)` or the `;` that opens a trailing block.
    pub(crate) fn parse_param_items(&mut self) -> PResult<Vec<Param>> {
        let mut params = Vec::new();
        while !matches!(self.current_kind(), TokenKind::RParen | TokenKind::Semi) && !self.at_end() {
            params.push(self.parse_param()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        Ok(params)
    }

    fn param_name(&mut self) -> Option<String> {
        match self.current_kind() {
            TokenKind::Ident(n)
            | TokenKind::CtIdent(n)
            | TokenKind::HashIdent(n)
            | TokenKind::CtTypeIdent(n) => {
                let n = n.clone();
                self.advance();
                Some(n)
            }
            _ => None,
        }
    }

    fn parse_param(&mut self) -> PResult<Param> {
        let start = self.current().span;
        let mut param = Param {
            ty: None,
            name: None,
            by_ref: false,
            variadic: false,
            attrs: Vec::new(),
            default: None,
            span: start,
        };

        let bare_name = match self.current_kind() {
            TokenKind::Ident(_) | TokenKind::CtIdent(_) | TokenKind::HashIdent(_) => !self.type_starts_at(0),
            // `$Type` alone names a type parameter
            TokenKind::CtTypeIdent(_) => {
                matches!(self.peek(1), TokenKind::Comma | TokenKind::RParen | TokenKind::Semi | TokenKind::Eq)
            }
            _ => false,
        };

        if self.match_token(&TokenKind::Ellipsis) {
            param.variadic = true;
        } else if self.match_token(&TokenKind::Amp) {
            param.by_ref = true;
            param.name = self.param_name();
            if param.name.is_none() {
                return Err(self.error_expected("parameter name"));
            }
        } else if bare_name {
            param.name = self.param_name();
            param.variadic = self.match_token(&TokenKind::Ellipsis);
        } else {
            param.ty = Some(self.parse_type()?);
            param.variadic = self.match_token(&TokenKind::Ellipsis);
            param.by_ref = self.match_token(&TokenKind::Amp);
            param.name = self.param_name();
            if param.by_ref && param.name.is_none() {
                return Err(self.error_expected("parameter name"));
            }
        }

        param.attrs = self.parse_attributes()?;
        if self.match_token(&TokenKind::Eq) {
            param.default = Some(self.parse_expr()?);
        }
        param.span = self.span_from(start);
        Ok(param)
    }

    // =========================================================================
    // Constants and globals
    // =========================================================================

    /// `const [Type] NAME attrs [= value]`, without the terminator.
    pub(crate) fn parse_const_decl(&mut self, is_extern: bool) -> PResult<ConstDecl> {
        self.trace("const");
        self.expect_kw(Keyword::Const)?;
        let untyped = matches!(self.current_kind(), TokenKind::ConstIdent(_) | TokenKind::CtConstIdent(_))
            && matches!(
                self.peek(1),
                TokenKind::Eq | TokenKind::Semi | TokenKind::AtIdent(_) | TokenKind::AtTypeIdent(_)
            );
        let ty = if untyped { None } else { Some(self.parse_type()?) };
        let name = match self.current_kind() {
            TokenKind::ConstIdent(n) | TokenKind::CtConstIdent(n) => n.clone(),
            _ => return Err(self.error_expected("constant name")),
        };
        self.advance();
        let attrs = self.parse_attributes()?;
        let value = if self.match_token(&TokenKind::Eq) { Some(self.parse_expr()?) } else { None };
        if value.is_none() && !is_extern {
            let at = self.current().span;
            self.record_error(ParseError::missing("'='", at).with_hint("constants need an initializer"));
        }
        Ok(ConstDecl { is_extern, ty, name, attrs, value })
    }

    fn parse_global(&mut self, is_extern: bool) -> PResult<GlobalDecl> {
        self.trace("global");
        let tlocal = self.match_kw(Keyword::Tlocal);
        let ty = self.parse_type()?;
        let mut names = vec![self.expect_ident()?];
        while self.match_token(&TokenKind::Comma) {
            names.push(self.expect_ident()?);
        }
        let attrs = self.parse_attributes()?;
        let init = if self.match_token(&TokenKind::Eq) { Some(self.parse_expr()?) } else { None };
        self.expect_semi()?;
        Ok(GlobalDecl { is_extern, tlocal, ty, names, attrs, init })
    }

    // =========================================================================
    // Aggregates
    // =========================================================================

    /// `(Iface, Iface)` after a type name.
    fn parse_interface_list(&mut self) -> PResult<Vec<TypeExpr>> {
        let mut interfaces = Vec::new();
        if !self.match_token(&TokenKind::LParen) {
            return Ok(interfaces);
        }
        while !self.check(&TokenKind::RParen) && !self.at_end() {
            interfaces.push(self.parse_type()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(interfaces)
    }

    fn report_empty_body(&mut self, what: &str, name: &str, start: Span) {
        let span = self.span_from(start);
        self.record_error(ParseError::structural(format!("{} '{}' has no members", what, name), span));
    }

    fn parse_struct(&mut self) -> PResult<StructDecl> {
        self.trace("struct");
        let start = self.current().span;
        let kind = if self.check_kw(Keyword::Union) { AggregateKind::Union } else { AggregateKind::Struct };
        self.advance();
        let name = self.expect_type_ident()?;
        let interfaces = self.parse_interface_list()?;
        let attrs = self.parse_attributes()?;
        let members = self.parse_struct_body()?;
        if members.is_empty() {
            self.report_empty_body(kind.as_str(), &name, start);
        }
        Ok(StructDecl { kind, name, interfaces, attrs, members })
    }

    fn parse_struct_body(&mut self) -> PResult<Vec<StructMember>> {
        self.expect(&TokenKind::LBrace)?;
        let mut members = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() && !self.halted {
            let before = self.pos;
            match self.parse_struct_member() {
                Ok(m) => members.push(m),
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
        self.expect(&TokenKind::RBrace)?;
        Ok(members)
    }

    fn parse_struct_member(&mut self) -> PResult<StructMember> {
        let start = self.current().span;
        match self.current_kind() {
            TokenKind::Kw(Keyword::Struct) | TokenKind::Kw(Keyword::Union) => {
                let kind = if self.check_kw(Keyword::Union) { AggregateKind::Union } else { AggregateKind::Struct };
                self.advance();
                let name = self.optional_ident();
                let attrs = self.parse_attributes()?;
                let members = self.parse_struct_body()?;
                Ok(StructMember::Nested { kind, name, attrs, members, span: self.span_from(start) })
            }
            TokenKind::Kw(Keyword::Bitstruct) => {
                self.advance();
                let name = self.optional_ident();
                self.expect(&TokenKind::Colon)?;
                let backing = self.parse_type()?;
                let attrs = self.parse_attributes()?;
                let fields = self.parse_bit_fields()?;
                Ok(StructMember::Bitstruct { name, backing, attrs, fields, span: self.span_from(start) })
            }
            _ => {
                let inline = self.match_kw(Keyword::Inline);
                let ty = self.parse_type()?;
                let name = self.optional_ident();
                let attrs = self.parse_attributes()?;
                self.expect_semi()?;
                Ok(StructMember::Field { inline, ty, name, attrs, span: self.span_from(start) })
            }
        }
    }

    fn optional_ident(&mut self) -> Option<String> {
        if let TokenKind::Ident(n) = self.current_kind() {
            let n = n.clone();
            self.advance();
            Some(n)
        } else {
            None
        }
    }

    fn parse_bitstruct(&mut self) -> PResult<BitstructDecl> {
        self.trace("bitstruct");
        let start = self.advance();
        let name = self.expect_type_ident()?;
        let interfaces = self.parse_interface_list()?;
        self.expect(&TokenKind::Colon)?;
        let backing = self.parse_type()?;
        let attrs = self.parse_attributes()?;
        let fields = self.parse_bit_fields()?;
        if fields.is_empty() {
            self.report_empty_body("bitstruct", &name, start);
        }
        Ok(BitstructDecl { name, interfaces, backing, attrs, fields })
    }

    /// `{ Type name : lo[..hi]; ... }`
    fn parse_bit_fields(&mut self) -> PResult<Vec<BitField>> {
        self.expect(&TokenKind::LBrace)?;
        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() && !self.halted {
            let before = self.pos;
            match self.parse_bit_field() {
                Ok(field) => fields.push(field),
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
        self.expect(&TokenKind::RBrace)?;
        Ok(fields)
    }

    fn parse_bit_field(&mut self) -> PResult<BitField> {
        let start = self.current().span;
        let ty = self.parse_type()?;
        let name = self.expect_ident()?;
        let (low, high) = if self.match_token(&TokenKind::Colon) {
            let low = self.parse_expr_prec(Precedence::Comparative)?;
            let high = if self.match_token(&TokenKind::DotDot) {
                Some(self.parse_expr_prec(Precedence::Comparative)?)
            } else {
                None
            };
            (Some(low), high)
        } else {
            (None, None)
        };
        self.expect_semi()?;
        Ok(BitField { ty, name, low, high, span: self.span_from(start) })
    }

    // =========================================================================
    // Enums, faults and interfaces
    // =========================================================================

    fn parse_enum(&mut self) -> PResult<EnumDecl> {
        self.trace("enum");
        let start = self.advance();
        let name = self.expect_type_ident()?;
        let interfaces = self.parse_interface_list()?;
        let (backing, params) = if self.match_token(&TokenKind::Colon) {
            let backing = self.parse_type()?;
            let params = if self.check(&TokenKind::LParen) { self.parse_params()? } else { Vec::new() };
            (Some(backing), params)
        } else {
            (None, Vec::new())
        };
        let attrs = self.parse_attributes()?;
        let constants = self.parse_enum_constants(true)?;
        if constants.is_empty() {
            self.report_empty_body("enum", &name, start);
        }
        Ok(EnumDecl { name, interfaces, backing, params, attrs, constants })
    }

    fn parse_fault(&mut self) -> PResult<FaultDecl> {
        self.trace("fault");
        let start = self.advance();
        let name = self.expect_type_ident()?;
        let interfaces = self.parse_interface_list()?;
        let attrs = self.parse_attributes()?;
        let constants = self.parse_enum_constants(false)?;
        if constants.is_empty() {
            self.report_empty_body("fault", &name, start);
        }
        Ok(FaultDecl { name, interfaces, attrs, constants })
    }

    /// `{ A, B(args) @attr, }`. Trailing comma allowed; a malformed
    /// constant is skipped up to the next comma.
    fn parse_enum_constants(&mut self, with_args: bool) -> PResult<Vec<EnumConst>> {
        self.expect(&TokenKind::LBrace)?;
        let mut constants = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() && !self.halted {
            match self.parse_enum_constant(with_args) {
                Ok(constant) => {
                    constants.push(constant);
                    if self.match_token(&TokenKind::Comma) || self.check(&TokenKind::RBrace) {
                        continue;
                    }
                    let at = self.current().span;
                    if !self.record_error(ParseError::missing("','", at)) {
                        break;
                    }
                }
                Err(e) => {
                    if !self.record_error(e) {
                        break;
                    }
                    self.skip_list_item();
                }
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(constants)
    }

    fn parse_enum_constant(&mut self, with_args: bool) -> PResult<EnumConst> {
        let start = self.current().span;
        let name = self.expect_const_ident()?;
        let args = if with_args && self.match_token(&TokenKind::LParen) {
            let args = self.parse_expr_list(&TokenKind::RParen)?;
            self.expect(&TokenKind::RParen)?;
            Some(args)
        } else {
            None
        };
        let attrs = self.parse_attributes()?;
        Ok(EnumConst { name, args, attrs, span: self.span_from(start) })
    }

    fn parse_interface(&mut self) -> PResult<InterfaceDecl> {
        self.trace("interface");
        self.advance();
        let name = self.expect_type_ident()?;
        let mut parents = Vec::new();
        if self.match_token(&TokenKind::Colon) {
            loop {
                parents.push(self.parse_type()?);
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::LBrace)?;
        let mut methods = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() && !self.halted {
            let before = self.pos;
            match self.parse_interface_method() {
                Ok(method) => methods.push(method),
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
        self.expect(&TokenKind::RBrace)?;
        Ok(InterfaceDecl { name, parents, methods })
    }

    fn parse_interface_method(&mut self) -> PResult<FuncSignature> {
        self.expect_kw(Keyword::Fn)?;
        let signature = self.parse_signature()?;
        self.expect_semi()?;
        Ok(signature)
    }

    // =========================================================================
    // def and distinct
    // =========================================================================

    fn parse_define(&mut self) -> PResult<DefineDecl> {
        self.trace("def");
        self.advance();
        let (name, is_type) = match self.current_kind() {
            TokenKind::AtIdent(n) | TokenKind::AtTypeIdent(n) => {
                let name = n.clone();
                self.advance();
                return self.parse_attribute_define(name);
            }
            TokenKind::TypeIdent(n) => (n.clone(), true),
            TokenKind::Ident(n) | TokenKind::ConstIdent(n) => (n.clone(), false),
            _ => return Err(self.error_expected("name to define")),
        };
        self.advance();
        let attrs = self.parse_attributes()?;
        self.expect(&TokenKind::Eq)?;
        let kind = if is_type {
            DefineKind::Type(self.parse_def_type()?)
        } else {
            DefineKind::Alias(self.parse_expr()?)
        };
        self.expect_semi()?;
        Ok(DefineDecl { name, attrs, kind })
    }

    /// `def @Attr(params) = { @a, @b };`
    fn parse_attribute_define(&mut self, name: String) -> PResult<DefineDecl> {
        let params = if self.check(&TokenKind::LParen) { self.parse_params()? } else { Vec::new() };
        self.expect(&TokenKind::Eq)?;
        self.expect(&TokenKind::LBrace)?;
        let mut inner = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            inner.push(self.parse_attribute()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        self.expect_semi()?;
        Ok(DefineDecl { name, attrs: Vec::new(), kind: DefineKind::Attribute { params, attrs: inner } })
    }

    fn parse_distinct(&mut self) -> PResult<DistinctDecl> {
        self.trace("distinct");
        self.advance();
        let name = self.expect_type_ident()?;
        let interfaces = self.parse_interface_list()?;
        let attrs = self.parse_attributes()?;
        self.expect(&TokenKind::Eq)?;
        let inline = self.match_kw(Keyword::Inline);
        let ty = self.parse_type()?;
        self.expect_semi()?;
        Ok(DistinctDecl { name, interfaces, attrs, inline, ty })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseErrorKind;

    fn parse(src: &str) -> crate::ParseResult {
        let lexed = c3_lexer::Lexer::new(src).tokenize();
        assert!(lexed.errors.is_empty(), "lex errors: {:?}", lexed.errors);
        Parser::new(lexed.tokens).with_docs(lexed.docs).parse()
    }

    fn decl(src: &str) -> Decl {
        let mut result = parse(src);
        assert!(result.is_ok(), "errors: {:?}", result.errors);
        assert_eq!(result.decls.len(), 1);
        result.decls.remove(0)
    }

    #[test]
    fn module_with_generic_params() {
        let DeclKind::Module { path, generic_params, attrs } = decl("module std::list (<Type, SIZE>) @private;").kind
        else {
            panic!("expected module")
        };
        assert_eq!(path, ["std", "list"]);
        assert_eq!(generic_params, ["Type", "SIZE"]);
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn import_list() {
        let DeclKind::Import { paths, .. } = decl("import std::io, libc;").kind else { panic!("expected import") };
        assert_eq!(paths, vec![vec!["std".to_string(), "io".to_string()], vec!["libc".to_string()]]);
    }

    #[test]
    fn function_forms() {
        let DeclKind::Func(f) = decl("fn int add(int a, int b) => a + b;").kind else { panic!("expected fn") };
        assert_eq!(f.signature.name, "add");
        assert!(matches!(f.body, Some(FuncBody::Expr(_))));

        let DeclKind::Func(f) = decl("extern fn void puts(char*);").kind else { panic!("expected fn") };
        assert!(f.is_extern && f.body.is_none());
        assert!(f.signature.params[0].name.is_none());

        let DeclKind::Func(f) = decl("fn void Foo.reset(&self) @inline { self.x = 0; }").kind else {
            panic!("expected fn")
        };
        assert!(f.signature.method_of.is_some());
        assert!(f.signature.params[0].by_ref);
        assert_eq!(f.signature.attrs.len(), 1);
    }

    #[test]
    fn macro_with_trailing_block() {
        let DeclKind::Macro(m) = decl("macro @each(list; @body(it)) { $for (;;): $endfor }").kind else {
            panic!("expected macro")
        };
        assert!(m.ret.is_none());
        assert_eq!(m.name, "@each");
        let trailing = m.trailing.expect("trailing block");
        assert_eq!(trailing.name, "@body");
        assert_eq!(trailing.params.map(|p| p.len()), Some(1));

        let DeclKind::Macro(m) = decl("macro int Foo.twice(self) => self.x * 2;").kind else {
            panic!("expected macro")
        };
        assert!(m.ret.is_some() && m.method_of.is_some());
    }

    #[test]
    fn parameter_shapes() {
        let DeclKind::Macro(m) = decl("macro foo($Type, #expr, $ct, int... rest, x = 1) {}").kind else {
            panic!("expected macro")
        };
        let names: Vec<_> = m.params.iter().map(|p| p.name.clone().unwrap_or_default()).collect();
        assert_eq!(names, ["$Type", "#expr", "$ct", "rest", "x"]);
        assert!(m.params[0].ty.is_none());
        assert!(m.params[3].variadic);
        assert!(m.params[4].default.is_some());
    }

    #[test]
    fn const_and_globals() {
        let DeclKind::Const(c) = decl("const MAX = 10;").kind else { panic!("expected const") };
        assert!(c.ty.is_none());
        let DeclKind::Const(c) = decl("const int MAX @private = 10;").kind else { panic!("expected const") };
        assert!(c.ty.is_some() && c.attrs.len() == 1);
        let DeclKind::Global(g) = decl("tlocal int a, b;").kind else { panic!("expected global") };
        assert!(g.tlocal);
        assert_eq!(g.names, ["a", "b"]);
        let DeclKind::Global(g) = decl("extern int errno;").kind else { panic!("expected global") };
        assert!(g.is_extern);
    }

    #[test]
    fn struct_members() {
        let src = "struct Foo (Printable) @packed {
            inline Base base;
            int x;
            union { int i; float f; }
            bitstruct flags : char { bool a : 0; bool b : 1; }
        }";
        let DeclKind::Struct(s) = decl(src).kind else { panic!("expected struct") };
        assert_eq!(s.interfaces.len(), 1);
        assert_eq!(s.members.len(), 4);
        assert!(matches!(s.members[0], StructMember::Field { inline: true, .. }));
        assert!(matches!(s.members[2], StructMember::Nested { kind: AggregateKind::Union, name: None, .. }));
        assert!(matches!(s.members[3], StructMember::Bitstruct { .. }));
    }

    #[test]
    fn empty_struct_is_structural_error_but_kept() {
        let result = parse("struct Empty {}");
        assert_eq!(result.decls.len(), 1);
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(result.errors[0].kind, ParseErrorKind::Structural { .. }));
    }

    #[test]
    fn bad_enum_constant_keeps_the_enum() {
        let result = parse("enum Ee { A, b, C }\nfn void g() {}");
        assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
        assert_eq!(result.decls.len(), 2);
        let DeclKind::Enum(e) = &result.decls[0].kind else { panic!("expected enum") };
        let names: Vec<_> = e.constants.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["A", "C"]);
    }

    #[test]
    fn missing_comma_between_fault_constants() {
        let result = parse("fault Io { A B, C }");
        assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
        assert!(matches!(result.errors[0].kind, ParseErrorKind::MissingExpectedToken { .. }));
        let DeclKind::Fault(f) = &result.decls[0].kind else { panic!("expected fault") };
        assert_eq!(f.constants.len(), 3);
    }

    #[test]
    fn bad_bit_field_keeps_the_others() {
        let result = parse("bitstruct Bits : uint { int a : 0; int 3; bool c : 4; }");
        assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
        let DeclKind::Bitstruct(b) = &result.decls[0].kind else { panic!("expected bitstruct") };
        let names: Vec<_> = b.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a", "c"]);
    }

    #[test]
    fn bad_interface_method_keeps_the_others() {
        let result = parse("interface Shape { fn void a(); fn b; fn void c(); }");
        assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
        let DeclKind::Interface(i) = &result.decls[0].kind else { panic!("expected interface") };
        let names: Vec<_> = i.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["a", "c"]);
    }

    #[test]
    fn bitstruct_ranges() {
        let DeclKind::Bitstruct(b) = decl("bitstruct Flags : uint { int lo : 0..3; bool hi : 31; }").kind else {
            panic!("expected bitstruct")
        };
        assert!(b.fields[0].high.is_some());
        assert!(b.fields[1].high.is_none());
    }

    #[test]
    fn enums_and_faults() {
        let DeclKind::Enum(e) = decl("enum Color : int (String name) { RED(\"red\"), GREEN(\"green\"), }").kind else {
            panic!("expected enum")
        };
        assert!(e.backing.is_some());
        assert_eq!(e.params.len(), 1);
        assert_eq!(e.constants.len(), 2);
        assert!(e.constants[0].args.is_some());

        let DeclKind::Fault(f) = decl("fault IoError { NOT_FOUND, DENIED }").kind else { panic!("expected fault") };
        assert_eq!(f.constants.len(), 2);
    }

    #[test]
    fn interface_methods() {
        let DeclKind::Interface(i) = decl("interface Printable : Named { fn String to_string(&self); }").kind else {
            panic!("expected interface")
        };
        assert_eq!(i.parents.len(), 1);
        assert_eq!(i.methods.len(), 1);
    }

    #[test]
    fn define_forms() {
        assert!(matches!(decl("def Callback = fn void(int);").kind, DeclKind::Define(DefineDecl { kind: DefineKind::Type(_), .. })));
        assert!(matches!(
            decl("def int_list_new = list::new(<int>);").kind,
            DeclKind::Define(DefineDecl { kind: DefineKind::Alias(_), .. })
        ));
        let DeclKind::Define(d) = decl("def @Hot(x) = { @inline, @align(x) };").kind else { panic!("expected def") };
        let DefineKind::Attribute { params, attrs } = d.kind else { panic!("expected attribute def") };
        assert_eq!((params.len(), attrs.len()), (1, 2));
    }

    #[test]
    fn distinct_inline() {
        let DeclKind::Distinct(d) = decl("distinct Meters = inline double;").kind else { panic!("expected distinct") };
        assert!(d.inline);
    }

    #[test]
    fn top_level_compile_time() {
        let DeclKind::CtIf { then_decls, else_decls, .. } =
            decl("$if $feature(X): fn void a() {} $else fn void b() {} $endif").kind
        else {
            panic!("expected $if")
        };
        assert_eq!(then_decls.len(), 1);
        assert_eq!(else_decls.map(|d| d.len()), Some(1));

        let DeclKind::CtSwitch { cases, .. } =
            decl("$switch $case FOO: const A = 1; $default: const A = 2; $endswitch").kind
        else {
            panic!("expected $switch")
        };
        assert_eq!(cases.len(), 2);
        assert!(matches!(decl("$include(\"x.c3\");").kind, DeclKind::CtInclude(_)));
    }

    #[test]
    fn doc_comment_attaches_to_following_decl() {
        let result = parse("<* Adds numbers. *>\nfn int add(int a, int b) => a + b;\nfn void other() {}");
        assert!(result.decls[0].doc.is_some());
        assert!(result.decls[1].doc.is_none());
    }

    #[test]
    fn recovery_continues_with_next_decl() {
        let result = parse("fn void f() { x = ; return 1; }\nstruct ;\nfn void g() {}");
        assert_eq!(result.decls.iter().filter(|d| matches!(d.kind, DeclKind::Func(_))).count(), 2);
        assert_eq!(result.errors.len(), 2);
    }
}
