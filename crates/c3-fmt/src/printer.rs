// SPDX-License-Identifier: (MIT OR Apache-2.0)

use c3_ast::decl::*;
use c3_ast::doc::DocComment;
use c3_ast::expr::*;
use c3_ast::stmt::*;
use c3_ast::ty::{ArrayLen, TypeExpr, TypeKind, VectorLen};
use c3_ast::TranslationUnit;

use crate::comment::CommentList;
use crate::config::FormatConfig;

/// Writes a tree back out as canonical C3.
///
/// The tree is printed as parsed: parenthesised expressions keep their
/// `Paren` nodes, so no precedence analysis is needed to reproduce it.
pub struct Printer<'a> {
    output: String,
    indent: usize,
    source: Option<&'a str>,
    comments: CommentList,
    config: &'a FormatConfig,
}

impl<'a> Printer<'a> {
    /// A printer for a bare tree; doc comments are rebuilt from the tree.
    pub fn new(config: &'a FormatConfig) -> Self {
        Self {
            output: String::new(),
            indent: 0,
            source: None,
            comments: CommentList::empty(),
            config,
        }
    }

    /// A printer that carries the comments of `source` along. Doc comments
    /// travel with the other comments, verbatim.
    pub fn with_source(source: &'a str, comments: CommentList, config: &'a FormatConfig) -> Self {
        Self {
            output: String::new(),
            indent: 0,
            source: Some(source),
            comments,
            config,
        }
    }

    pub fn finish(mut self) -> String {
        let rest = self.comments.take_rest();
        if !rest.is_empty() && !self.output.is_empty() {
            self.emit_blank_line();
        }
        for c in rest {
            self.output.push_str(&c.text);
            self.output.push('\n');
        }
        if !self.output.is_empty() && !self.output.ends_with('\n') {
            self.output.push('\n');
        }
        self.output
    }

    // --- Helpers ---

    fn emit(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn emit_newline(&mut self) {
        self.output.push('\n');
    }

    fn emit_indent(&mut self) {
        let spaces = self.indent * self.config.indent_width;
        self.output.extend(std::iter::repeat(' ').take(spaces));
    }

    fn emit_blank_line(&mut self) {
        if self.output.is_empty() || self.output.ends_with("\n\n") {
            return;
        }
        if !self.output.ends_with('\n') {
            self.output.push('\n');
        }
        self.output.push('\n');
    }

    /// Print into a scratch buffer instead of the output.
    fn render(&mut self, f: impl FnOnce(&mut Self)) -> String {
        let saved = std::mem::take(&mut self.output);
        f(self);
        std::mem::replace(&mut self.output, saved)
    }

    fn emit_sep<T>(&mut self, items: &[T], sep: &str, mut f: impl FnMut(&mut Self, &T)) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.emit(sep);
            }
            f(self, item);
        }
    }

    /// Whether the source has an empty line between the previous content
    /// and `pos`.
    fn has_blank_line_before(&self, pos: usize) -> bool {
        let Some(source) = self.source else { return false };
        let bytes = source.as_bytes();
        let mut newlines = 0;
        let mut p = pos.min(bytes.len());
        while p > 0 {
            p -= 1;
            match bytes[p] {
                b'\n' => newlines += 1,
                b' ' | b'\t' | b'\r' => {}
                _ => break,
            }
        }
        newlines >= 2
    }

    /// Start of the first pending comment before `pos`, or `pos`.
    fn leading_position(&self, pos: usize) -> usize {
        match self.comments.peek_next() {
            Some(c) if c.span.start < pos => c.span.start,
            _ => pos,
        }
    }

    fn emit_comments_before(&mut self, pos: usize) {
        let comments = self.comments.take_before(pos);
        for (i, c) in comments.iter().enumerate() {
            if i > 0 && self.has_blank_line_before(c.span.start) {
                self.emit_blank_line();
            }
            self.emit_indent();
            self.emit(&c.text);
            self.emit_newline();
        }
        if !comments.is_empty() && self.has_blank_line_before(pos) {
            self.emit_blank_line();
        }
    }

    /// Keep a comment that shares the line with the code ending at `end`.
    fn try_emit_trailing_comment(&mut self, end: usize) {
        let Some(source) = self.source else { return };
        let Some(c) = self.comments.peek_next() else { return };
        if c.span.start < end {
            return;
        }
        let same_line = source
            .get(end..c.span.start)
            .is_some_and(|gap| !gap.contains('\n'));
        if same_line && !c.text.contains('\n') {
            if let Some(c) = self.comments.advance() {
                self.emit(" ");
                self.emit(&c.text);
            }
        }
    }

    // --- Declarations ---

    pub fn format_unit(&mut self, unit: &TranslationUnit) {
        self.format_decls(&unit.decls);
    }

    fn format_decls(&mut self, decls: &[Decl]) {
        for (i, decl) in decls.iter().enumerate() {
            if i > 0 {
                let grouped = matches!(
                    (&decls[i - 1].kind, &decl.kind),
                    (DeclKind::Import { .. }, DeclKind::Import { .. })
                );
                let lead = self.leading_position(decl.span.start);
                if !grouped || self.has_blank_line_before(lead) {
                    self.emit_blank_line();
                }
            }
            self.emit_comments_before(decl.span.start);
            self.format_decl(decl);
        }
    }

    fn format_decl(&mut self, decl: &Decl) {
        if self.source.is_none() {
            if let Some(doc) = &decl.doc {
                self.format_doc(doc);
            }
        }
        self.emit_indent();
        match &decl.kind {
            DeclKind::Module { path, generic_params, attrs } => {
                self.emit("module ");
                self.emit(&path.join("::"));
                if !generic_params.is_empty() {
                    self.emit("(<");
                    self.emit(&generic_params.join(", "));
                    self.emit(">)");
                }
                self.format_attrs(attrs);
                self.emit(";");
            }
            DeclKind::Import { paths, attrs } => {
                self.emit("import ");
                let joined: Vec<String> = paths.iter().map(|p| p.join("::")).collect();
                self.emit(&joined.join(", "));
                self.format_attrs(attrs);
                self.emit(";");
            }
            DeclKind::Func(f) => {
                if f.is_extern {
                    self.emit("extern ");
                }
                self.emit("fn ");
                self.format_signature(&f.signature);
                match &f.body {
                    None => self.emit(";"),
                    Some(body) => self.format_func_body(body),
                }
            }
            DeclKind::Macro(m) => self.format_macro(m),
            DeclKind::Const(c) => {
                self.format_const(c);
                self.emit(";");
            }
            DeclKind::Global(g) => {
                if g.is_extern {
                    self.emit("extern ");
                }
                if g.tlocal {
                    self.emit("tlocal ");
                }
                self.format_type(&g.ty);
                self.emit(" ");
                self.emit(&g.names.join(", "));
                self.format_attrs(&g.attrs);
                if let Some(init) = &g.init {
                    self.emit(" = ");
                    self.format_expr(init);
                }
                self.emit(";");
            }
            DeclKind::Struct(s) => {
                self.emit(s.kind.as_str());
                self.emit(" ");
                self.emit(&s.name);
                self.format_interfaces(&s.interfaces);
                self.format_attrs(&s.attrs);
                self.emit(" ");
                self.format_members(&s.members);
            }
            DeclKind::Bitstruct(b) => {
                self.emit("bitstruct ");
                self.emit(&b.name);
                self.format_interfaces(&b.interfaces);
                self.emit(" : ");
                self.format_type(&b.backing);
                self.format_attrs(&b.attrs);
                self.emit(" ");
                self.format_bit_fields(&b.fields);
            }
            DeclKind::Enum(e) => {
                self.emit("enum ");
                self.emit(&e.name);
                self.format_interfaces(&e.interfaces);
                if let Some(backing) = &e.backing {
                    self.emit(" : ");
                    self.format_type(backing);
                    if !e.params.is_empty() {
                        self.format_params(&e.params);
                    }
                }
                self.format_attrs(&e.attrs);
                self.emit(" ");
                self.format_enum_constants(&e.constants);
            }
            DeclKind::Fault(f) => {
                self.emit("fault ");
                self.emit(&f.name);
                self.format_interfaces(&f.interfaces);
                self.format_attrs(&f.attrs);
                self.emit(" ");
                self.format_enum_constants(&f.constants);
            }
            DeclKind::Interface(i) => self.format_interface(i),
            DeclKind::Define(d) => self.format_define(d),
            DeclKind::Distinct(d) => {
                self.emit("distinct ");
                self.emit(&d.name);
                self.format_interfaces(&d.interfaces);
                self.format_attrs(&d.attrs);
                self.emit(" = ");
                if d.inline {
                    self.emit("inline ");
                }
                self.format_type(&d.ty);
                self.emit(";");
            }
            DeclKind::CtAssert { cond, message } => self.format_ct_assert(cond, message.as_ref()),
            DeclKind::CtEcho(e) => self.format_keyword_expr("$echo ", e),
            DeclKind::CtError(e) => self.format_keyword_expr("$error ", e),
            DeclKind::CtInclude(e) => {
                self.emit("$include(");
                self.format_expr(e);
                self.emit(");");
            }
            DeclKind::CtIf { cond, then_decls, else_decls } => {
                self.emit("$if ");
                self.format_expr(cond);
                self.emit(":");
                self.emit_newline();
                self.format_nested_decls(then_decls);
                if let Some(else_decls) = else_decls {
                    self.emit_indent();
                    self.emit("$else");
                    self.emit_newline();
                    self.format_nested_decls(else_decls);
                }
                self.emit_indent();
                self.emit("$endif");
            }
            DeclKind::CtSwitch { subject, cases } => {
                self.format_ct_switch_head(subject.as_ref());
                for case in cases {
                    self.emit_comments_before(case.span.start);
                    self.format_ct_case_label(case.label.as_ref());
                    self.format_nested_decls(&case.body);
                }
                self.emit_indent();
                self.emit("$endswitch");
            }
        }
        self.try_emit_trailing_comment(decl.span.end);
        self.emit_newline();
    }

    fn format_nested_decls(&mut self, decls: &[Decl]) {
        self.indent += 1;
        self.format_decls(decls);
        self.indent -= 1;
    }

    fn format_doc(&mut self, doc: &DocComment) {
        self.emit_indent();
        if doc.contracts.is_empty() && !doc.body.contains('\n') {
            if doc.body.is_empty() {
                self.emit("<* *>");
            } else {
                self.emit("<* ");
                self.emit(&doc.body);
                self.emit(" *>");
            }
            self.emit_newline();
            return;
        }
        self.emit("<*");
        self.emit_newline();
        let contracts = doc.contracts.iter().map(|c| {
            if c.body.is_empty() {
                format!("@{}", c.name)
            } else {
                format!("@{} {}", c.name, c.body)
            }
        });
        let lines: Vec<String> = doc.body.lines().map(str::to_string).chain(contracts).collect();
        for line in lines {
            if !line.is_empty() {
                self.emit_indent();
                self.emit(" ");
                self.emit(&line);
            }
            self.emit_newline();
        }
        self.emit_indent();
        self.emit("*>");
        self.emit_newline();
    }

    fn format_signature(&mut self, sig: &FuncSignature) {
        self.format_type(&sig.ret);
        self.emit(" ");
        if let Some(ty) = &sig.method_of {
            self.format_type(ty);
            self.emit(".");
        }
        self.emit(&sig.name);
        self.format_params(&sig.params);
        self.format_attrs(&sig.attrs);
    }

    fn format_func_body(&mut self, body: &FuncBody) {
        match body {
            FuncBody::Block(block) => {
                self.emit(" ");
                self.format_block(block);
            }
            FuncBody::Expr(e) => {
                self.emit(" => ");
                self.format_expr(e);
                self.emit(";");
            }
        }
    }

    fn format_macro(&mut self, m: &MacroDecl) {
        self.emit("macro ");
        if let Some(ret) = &m.ret {
            self.format_type(ret);
            self.emit(" ");
        }
        if let Some(ty) = &m.method_of {
            self.format_type(ty);
            self.emit(".");
        }
        self.emit(&m.name);
        self.emit("(");
        self.emit_sep(&m.params, ", ", Self::format_param);
        if let Some(trailing) = &m.trailing {
            self.emit("; ");
            self.emit(&trailing.name);
            if let Some(params) = &trailing.params {
                self.format_params(params);
            }
        }
        self.emit(")");
        self.format_attrs(&m.attrs);
        self.format_func_body(&m.body);
    }

    fn format_params(&mut self, params: &[Param]) {
        self.emit("(");
        self.emit_sep(params, ", ", Self::format_param);
        self.emit(")");
    }

    fn format_param(&mut self, param: &Param) {
        match &param.ty {
            Some(ty) => {
                self.format_type(ty);
                if param.variadic {
                    self.emit("...");
                }
                if let Some(name) = &param.name {
                    self.emit(" ");
                    if param.by_ref {
                        self.emit("&");
                    }
                    self.emit(name);
                }
            }
            None => {
                if param.by_ref {
                    self.emit("&");
                }
                if let Some(name) = &param.name {
                    self.emit(name);
                }
                if param.variadic {
                    self.emit("...");
                }
            }
        }
        self.format_attrs(&param.attrs);
        if let Some(default) = &param.default {
            self.emit(" = ");
            self.format_expr(default);
        }
    }

    fn format_attrs(&mut self, attrs: &[Attribute]) {
        for attr in attrs {
            self.emit(" ");
            self.format_attr(attr);
        }
    }

    fn format_attr(&mut self, attr: &Attribute) {
        self.format_path(&attr.path);
        self.emit(&attr.name);
        if let Some(args) = &attr.args {
            self.emit("(");
            self.emit_sep(args, ", ", |p, arg| match arg {
                AttrArg::Expr(e) => p.format_expr(e),
                AttrArg::Operator(op) => p.emit(op.as_str()),
            });
            self.emit(")");
        }
    }

    fn format_interfaces(&mut self, interfaces: &[TypeExpr]) {
        if interfaces.is_empty() {
            return;
        }
        self.emit(" (");
        self.emit_sep(interfaces, ", ", Self::format_type);
        self.emit(")");
    }

    fn format_const(&mut self, c: &ConstDecl) {
        if c.is_extern {
            self.emit("extern ");
        }
        self.emit("const ");
        if let Some(ty) = &c.ty {
            self.format_type(ty);
            self.emit(" ");
        }
        self.emit(&c.name);
        self.format_attrs(&c.attrs);
        if let Some(value) = &c.value {
            self.emit(" = ");
            self.format_expr(value);
        }
    }

    fn format_members(&mut self, members: &[StructMember]) {
        if members.is_empty() {
            self.emit("{}");
            return;
        }
        self.emit("{");
        self.emit_newline();
        self.indent += 1;
        for member in members {
            let span = match member {
                StructMember::Field { span, .. }
                | StructMember::Nested { span, .. }
                | StructMember::Bitstruct { span, .. } => *span,
            };
            self.emit_comments_before(span.start);
            self.emit_indent();
            match member {
                StructMember::Field { inline, ty, name, attrs, .. } => {
                    if *inline {
                        self.emit("inline ");
                    }
                    self.format_type(ty);
                    if let Some(name) = name {
                        self.emit(" ");
                        self.emit(name);
                    }
                    self.format_attrs(attrs);
                    self.emit(";");
                }
                StructMember::Nested { kind, name, attrs, members, .. } => {
                    self.emit(kind.as_str());
                    if let Some(name) = name {
                        self.emit(" ");
                        self.emit(name);
                    }
                    self.format_attrs(attrs);
                    self.emit(" ");
                    self.format_members(members);
                }
                StructMember::Bitstruct { name, backing, attrs, fields, .. } => {
                    self.emit("bitstruct");
                    if let Some(name) = name {
                        self.emit(" ");
                        self.emit(name);
                    }
                    self.emit(" : ");
                    self.format_type(backing);
                    self.format_attrs(attrs);
                    self.emit(" ");
                    self.format_bit_fields(fields);
                }
            }
            self.try_emit_trailing_comment(span.end);
            self.emit_newline();
        }
        self.indent -= 1;
        self.emit_indent();
        self.emit("}");
    }

    fn format_bit_fields(&mut self, fields: &[BitField]) {
        if fields.is_empty() {
            self.emit("{}");
            return;
        }
        self.emit("{");
        self.emit_newline();
        self.indent += 1;
        for field in fields {
            self.emit_comments_before(field.span.start);
            self.emit_indent();
            self.format_type(&field.ty);
            self.emit(" ");
            self.emit(&field.name);
            if let Some(low) = &field.low {
                self.emit(" : ");
                self.format_expr(low);
                if let Some(high) = &field.high {
                    self.emit(" .. ");
                    self.format_expr(high);
                }
            }
            self.emit(";");
            self.try_emit_trailing_comment(field.span.end);
            self.emit_newline();
        }
        self.indent -= 1;
        self.emit_indent();
        self.emit("}");
    }

    fn format_enum_constants(&mut self, constants: &[EnumConst]) {
        if constants.is_empty() {
            self.emit("{}");
            return;
        }
        self.emit("{");
        self.emit_newline();
        self.indent += 1;
        for (i, c) in constants.iter().enumerate() {
            self.emit_comments_before(c.span.start);
            self.emit_indent();
            self.emit(&c.name);
            if let Some(args) = &c.args {
                self.emit("(");
                self.emit_sep(args, ", ", Self::format_expr);
                self.emit(")");
            }
            self.format_attrs(&c.attrs);
            if i + 1 < constants.len() {
                self.emit(",");
            }
            self.emit_newline();
        }
        self.indent -= 1;
        self.emit_indent();
        self.emit("}");
    }

    fn format_interface(&mut self, i: &InterfaceDecl) {
        self.emit("interface ");
        self.emit(&i.name);
        if !i.parents.is_empty() {
            self.emit(" : ");
            self.emit_sep(&i.parents, ", ", Self::format_type);
        }
        if i.methods.is_empty() {
            self.emit(" {}");
            return;
        }
        self.emit(" {");
        self.emit_newline();
        self.indent += 1;
        for method in &i.methods {
            self.emit_indent();
            self.emit("fn ");
            self.format_signature(method);
            self.emit(";");
            self.emit_newline();
        }
        self.indent -= 1;
        self.emit_indent();
        self.emit("}");
    }

    fn format_define(&mut self, d: &DefineDecl) {
        self.emit("def ");
        self.emit(&d.name);
        match &d.kind {
            DefineKind::Attribute { params, attrs } => {
                if !params.is_empty() {
                    self.format_params(params);
                }
                self.emit(" = { ");
                self.emit_sep(attrs, ", ", Self::format_attr);
                self.emit(" };");
            }
            DefineKind::Alias(e) => {
                self.format_attrs(&d.attrs);
                self.emit(" = ");
                self.format_expr(e);
                self.emit(";");
            }
            DefineKind::Type(ty) => {
                self.format_attrs(&d.attrs);
                self.emit(" = ");
                self.format_type(ty);
                self.emit(";");
            }
        }
    }

    fn format_ct_assert(&mut self, cond: &Expr, message: Option<&Expr>) {
        self.emit("$assert ");
        self.format_expr(cond);
        if let Some(message) = message {
            self.emit(" : ");
            self.format_expr(message);
        }
        self.emit(";");
    }

    fn format_keyword_expr(&mut self, keyword: &str, e: &Expr) {
        self.emit(keyword);
        self.format_expr(e);
        self.emit(";");
    }

    fn format_ct_switch_head(&mut self, subject: Option<&Expr>) {
        self.emit("$switch");
        if let Some(subject) = subject {
            self.emit(" (");
            self.format_expr(subject);
            self.emit(")");
        }
        self.emit_newline();
    }

    fn format_ct_case_label(&mut self, label: Option<&Expr>) {
        self.emit_indent();
        match label {
            Some(label) => {
                self.emit("$case ");
                self.format_expr(label);
                self.emit(":");
            }
            None => self.emit("$default:"),
        }
        self.emit_newline();
    }

    // --- Types ---

    fn format_type(&mut self, ty: &TypeExpr) {
        match &ty.kind {
            TypeKind::Primitive(p) => self.emit(p.as_str()),
            TypeKind::Named { path, name, generic_args } => {
                self.format_path(path);
                self.emit(name);
                if let Some(args) = generic_args {
                    self.format_generic_args(args);
                }
            }
            TypeKind::CtType(name) => self.emit(name),
            TypeKind::CtTypeCall { func, arg } => {
                self.emit(func.as_str());
                self.emit("(");
                self.format_expr(arg);
                self.emit(")");
            }
            TypeKind::Pointer(inner) => {
                self.format_type(inner);
                self.emit("*");
            }
            TypeKind::Array { elem, len } => {
                self.format_type(elem);
                match len {
                    ArrayLen::Fixed(n) => {
                        self.emit("[");
                        self.format_expr(n);
                        self.emit("]");
                    }
                    ArrayLen::Slice => self.emit("[]"),
                    ArrayLen::Inferred => self.emit("[*]"),
                }
            }
            TypeKind::Vector { elem, len } => {
                self.format_type(elem);
                match len {
                    VectorLen::Fixed(n) => {
                        self.emit("[<");
                        self.format_expr(n);
                        self.emit(">]");
                    }
                    VectorLen::Inferred => self.emit("[<*>]"),
                }
            }
            TypeKind::Optional(inner) => {
                self.format_type(inner);
                self.emit("!");
            }
            TypeKind::Func { ret, params } => {
                self.emit("fn ");
                self.format_type(ret);
                self.format_params(params);
            }
        }
    }

    fn format_path(&mut self, path: &[String]) {
        for segment in path {
            self.emit(segment);
            self.emit("::");
        }
    }

    fn format_generic_args(&mut self, args: &[Expr]) {
        self.emit("(<");
        self.emit_sep(args, ", ", Self::format_expr);
        self.emit(">)");
    }

    // --- Statements ---

    fn format_block(&mut self, block: &Block) {
        if block.stmts.is_empty() && !self.comments.has_before(block.span.end) {
            self.emit("{}");
            return;
        }
        self.emit("{");
        self.emit_newline();
        self.format_body_lines(block);
        self.emit_indent();
        self.emit("}");
    }

    /// Statements of `block` one level deeper, with the comments before
    /// its end.
    fn format_body_lines(&mut self, block: &Block) {
        self.indent += 1;
        self.format_stmts(&block.stmts);
        self.emit_comments_before(block.span.end);
        self.indent -= 1;
    }

    fn format_stmts(&mut self, stmts: &[Stmt]) {
        for (i, stmt) in stmts.iter().enumerate() {
            let lead = self.leading_position(stmt.span.start);
            if i > 0 && self.has_blank_line_before(lead) {
                self.emit_blank_line();
            }
            self.emit_comments_before(stmt.span.start);
            self.emit_indent();
            self.format_stmt(stmt);
            self.try_emit_trailing_comment(stmt.span.end);
            self.emit_newline();
        }
    }

    fn format_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Empty => self.emit(";"),
            StmtKind::Expr(e) => {
                self.format_expr(e);
                if !matches!(e.kind, ExprKind::Call { body: Some(_), .. }) {
                    self.emit(";");
                }
            }
            StmtKind::Block(block) => self.format_block(block),
            StmtKind::Var(v) => {
                self.format_var(v);
                self.emit(";");
            }
            StmtKind::Const(c) => {
                self.format_const(c);
                self.emit(";");
            }
            StmtKind::Return(value) => {
                self.emit("return");
                if let Some(value) = value {
                    self.emit(" ");
                    self.format_expr(value);
                }
                self.emit(";");
            }
            StmtKind::If { label, cond, then_branch, else_branch } => {
                self.emit("if ");
                self.format_label(label.as_deref());
                self.format_paren_condition(cond);
                self.format_branch(then_branch);
                if let Some(else_branch) = else_branch {
                    if matches!(then_branch.kind, StmtKind::Block(_)) {
                        self.emit(" ");
                    } else {
                        self.emit_newline();
                        self.emit_indent();
                    }
                    self.emit("else");
                    self.format_branch(else_branch);
                }
            }
            StmtKind::While { label, cond, body } => {
                self.emit("while ");
                self.format_label(label.as_deref());
                self.format_paren_condition(cond);
                self.format_branch(body);
            }
            StmtKind::DoWhile { label, body, cond } => {
                self.emit("do ");
                self.format_label(label.as_deref());
                self.format_block(body);
                if let Some(cond) = cond {
                    self.emit(" while (");
                    self.format_expr(cond);
                    self.emit(")");
                }
                self.emit(";");
            }
            StmtKind::For { label, init, cond, step, body } => {
                self.emit("for ");
                self.format_label(label.as_deref());
                self.emit("(");
                if let Some(init) = init {
                    self.format_condition(init);
                }
                self.emit(";");
                if let Some(cond) = cond {
                    self.emit(" ");
                    self.format_condition(cond);
                }
                self.emit(";");
                if !step.is_empty() {
                    self.emit(" ");
                    self.emit_sep(step, ", ", Self::format_expr);
                }
                self.emit(")");
                self.format_branch(body);
            }
            StmtKind::Foreach { label, reverse, index, value, collection, body } => {
                self.emit(if *reverse { "foreach_r " } else { "foreach " });
                self.format_label(label.as_deref());
                self.emit("(");
                if let Some(index) = index {
                    self.format_foreach_var(index);
                    self.emit(", ");
                }
                self.format_foreach_var(value);
                self.emit(" : ");
                self.format_expr(collection);
                self.emit(")");
                self.format_branch(body);
            }
            StmtKind::Switch { label, subject, cases } => {
                self.emit("switch ");
                self.format_label(label.as_deref());
                if let Some(subject) = subject {
                    self.format_paren_condition(subject);
                    self.emit(" ");
                }
                self.format_switch_cases(cases, stmt.span.end);
            }
            StmtKind::Defer { kind, body } => {
                self.emit("defer");
                match kind {
                    DeferKind::Plain => {}
                    DeferKind::Try => self.emit(" try"),
                    DeferKind::Catch => self.emit(" catch"),
                }
                self.format_branch(body);
            }
            StmtKind::Break(label) => self.format_jump("break", label.as_deref()),
            StmtKind::Continue(label) => self.format_jump("continue", label.as_deref()),
            StmtKind::Nextcase { label, target } => {
                self.emit("nextcase");
                if let Some(label) = label {
                    self.emit(" ");
                    self.emit(label);
                    self.emit(":");
                }
                match target {
                    None => {}
                    Some(NextcaseTarget::Default) => self.emit(" default"),
                    Some(NextcaseTarget::Expr(e)) => {
                        self.emit(" ");
                        self.format_expr(e);
                    }
                }
                self.emit(";");
            }
            StmtKind::Asm(AsmBody::Text(text)) => {
                self.emit("asm(");
                self.format_expr(text);
                self.emit(");");
            }
            StmtKind::Asm(AsmBody::Block(instrs)) => self.format_asm_block(instrs),
            StmtKind::Assert { cond, message } => {
                self.emit("assert(");
                self.format_expr(cond);
                for part in message {
                    self.emit(", ");
                    self.format_expr(part);
                }
                self.emit(");");
            }
            StmtKind::CtIf { cond, then_branch, else_branch } => {
                self.emit("$if ");
                self.format_expr(cond);
                self.emit(":");
                self.emit_newline();
                self.format_body_lines(then_branch);
                if let Some(else_branch) = else_branch {
                    self.emit_indent();
                    self.emit("$else");
                    self.emit_newline();
                    self.format_body_lines(else_branch);
                }
                self.emit_indent();
                self.emit("$endif");
            }
            StmtKind::CtSwitch { subject, cases } => {
                self.format_ct_switch_head(subject.as_ref());
                for case in cases {
                    self.emit_comments_before(case.span.start);
                    self.format_ct_case_label(case.label.as_ref());
                    self.indent += 1;
                    self.format_stmts(&case.body);
                    self.indent -= 1;
                }
                self.emit_indent();
                self.emit("$endswitch");
            }
            StmtKind::CtFor { init, cond, step, body } => {
                self.emit("$for (");
                if let Some(init) = init {
                    self.format_condition(init);
                }
                self.emit(";");
                if let Some(cond) = cond {
                    self.emit(" ");
                    self.format_expr(cond);
                }
                self.emit(";");
                if !step.is_empty() {
                    self.emit(" ");
                    self.emit_sep(step, ", ", Self::format_expr);
                }
                self.emit("):");
                self.emit_newline();
                self.format_body_lines(body);
                self.emit_indent();
                self.emit("$endfor");
            }
            StmtKind::CtForeach { index, value, collection, body } => {
                self.emit("$foreach (");
                if let Some(index) = index {
                    self.emit(index);
                    self.emit(", ");
                }
                self.emit(value);
                self.emit(" : ");
                self.format_expr(collection);
                self.emit("):");
                self.emit_newline();
                self.format_body_lines(body);
                self.emit_indent();
                self.emit("$endforeach");
            }
            StmtKind::CtEcho(e) => self.format_keyword_expr("$echo ", e),
            StmtKind::CtAssert { cond, message } => self.format_ct_assert(cond, message.as_ref()),
            StmtKind::CtError(e) => self.format_keyword_expr("$error ", e),
        }
    }

    /// A statement body after a header: blocks open on the same line,
    /// anything else follows a single space.
    fn format_branch(&mut self, body: &Stmt) {
        self.emit(" ");
        self.format_stmt(body);
    }

    fn format_label(&mut self, label: Option<&str>) {
        if let Some(label) = label {
            self.emit(label);
            self.emit(": ");
        }
    }

    fn format_jump(&mut self, keyword: &str, label: Option<&str>) {
        self.emit(keyword);
        if let Some(label) = label {
            self.emit(" ");
            self.emit(label);
        }
        self.emit(";");
    }

    fn format_paren_condition(&mut self, cond: &Condition) {
        self.emit("(");
        self.format_condition(cond);
        self.emit(")");
    }

    fn format_condition(&mut self, cond: &Condition) {
        self.emit_sep(&cond.items, ", ", |p, item| match item {
            CondItem::Expr(e) => p.format_expr(e),
            CondItem::Decl(v) => p.format_var(v),
        });
    }

    fn format_var(&mut self, v: &VarDecl) {
        if let Some(storage) = v.storage {
            self.emit(storage.as_str());
            self.emit(" ");
        }
        match &v.ty {
            Some(ty) => self.format_type(ty),
            None => self.emit("var"),
        }
        self.emit(" ");
        self.emit(&v.name);
        self.format_attrs(&v.attrs);
        if let Some(init) = &v.init {
            self.emit(" = ");
            self.format_expr(init);
        }
    }

    fn format_foreach_var(&mut self, var: &ForeachVar) {
        if let Some(ty) = &var.ty {
            self.format_type(ty);
            self.emit(" ");
        }
        if var.by_ref {
            self.emit("&");
        }
        self.emit(&var.name);
    }

    fn format_switch_cases(&mut self, cases: &[SwitchCase], end: usize) {
        if cases.is_empty() && !self.comments.has_before(end) {
            self.emit("{}");
            return;
        }
        self.emit("{");
        self.emit_newline();
        for case in cases {
            self.emit_comments_before(case.span.start);
            self.emit_indent();
            match &case.label {
                CaseLabel::Expr(e) => {
                    self.emit("case ");
                    self.format_expr(e);
                    self.emit(":");
                }
                CaseLabel::Default => self.emit("default:"),
            }
            self.emit_newline();
            self.indent += 1;
            self.format_stmts(&case.body);
            self.indent -= 1;
        }
        self.indent += 1;
        self.emit_comments_before(end);
        self.indent -= 1;
        self.emit_indent();
        self.emit("}");
    }

    fn format_asm_block(&mut self, instrs: &[AsmInstr]) {
        if instrs.is_empty() {
            self.emit("asm {}");
            return;
        }
        self.emit("asm {");
        self.emit_newline();
        self.indent += 1;
        for instr in instrs {
            self.emit_comments_before(instr.span.start);
            self.emit_indent();
            self.emit(&instr.name);
            if !instr.operands.is_empty() {
                self.emit(" ");
                self.emit_sep(&instr.operands, ", ", |p, operand| match operand {
                    AsmOperand::Expr(e) => p.format_expr(e),
                    AsmOperand::Address(e) => {
                        p.emit("[");
                        p.format_expr(e);
                        p.emit("]");
                    }
                });
            }
            self.emit(";");
            self.emit_newline();
        }
        self.indent -= 1;
        self.emit_indent();
        self.emit("}");
    }

    // --- Expressions ---

    pub fn format_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Literal(lit) => self.emit(&lit.lexeme),
            ExprKind::Ident { path, name, .. } => {
                self.format_path(path);
                self.emit(name);
            }
            ExprKind::CtIdent(name) | ExprKind::HashIdent(name) => self.emit(name),
            ExprKind::Builtin(name) => {
                self.emit("$$");
                self.emit(name);
            }
            ExprKind::Type(ty) => self.format_type(ty),
            ExprKind::Paren(inner) => {
                self.emit("(");
                self.format_expr(inner);
                self.emit(")");
            }
            ExprKind::Unary { op, operand } => {
                let text = self.render(|p| p.format_expr(operand));
                self.emit(op.as_str());
                if prefix_needs_space(op.as_str(), &text) {
                    self.emit(" ");
                }
                self.emit(&text);
            }
            ExprKind::Cast { ty, expr } => {
                self.emit("(");
                self.format_type(ty);
                self.emit(")");
                self.format_expr(expr);
            }
            ExprKind::Postfix { op, operand } => {
                self.format_expr(operand);
                self.emit(op.as_str());
            }
            ExprKind::Rethrow { expr, force } => {
                self.format_expr(expr);
                self.emit(if *force { "!!" } else { "!" });
            }
            ExprKind::Binary { op, left, right } => self.format_infix(left, op.as_str(), right),
            ExprKind::Assign { op, target, value } => self.format_infix(target, op.as_str(), value),
            ExprKind::Ternary { cond, then_expr, else_expr } => {
                self.format_expr(cond);
                self.emit(" ? ");
                self.format_expr(then_expr);
                self.emit(" : ");
                self.format_expr(else_expr);
            }
            ExprKind::Elvis { left, right } => self.format_infix(left, "?:", right),
            ExprKind::OptElse { left, right } => self.format_infix(left, "??", right),
            ExprKind::Optional { expr, rethrow } => {
                self.format_expr(expr);
                self.emit(if *rethrow { "?!" } else { "?" });
            }
            ExprKind::Range { start, end, kind } => {
                let op = match kind {
                    RangeKind::DotDot => "..",
                    RangeKind::Len => ":",
                };
                if let Some(start) = start {
                    self.format_expr(start);
                    self.emit(" ");
                }
                self.emit(op);
                if let Some(end) = end {
                    self.emit(" ");
                    self.format_expr(end);
                }
            }
            ExprKind::FromEnd(inner) => {
                self.emit("^");
                self.format_expr(inner);
            }
            ExprKind::Call { callee, args, trailing_params, attrs, body } => {
                self.format_expr(callee);
                self.emit("(");
                self.emit_sep(args, ", ", Self::format_arg);
                if let Some(params) = trailing_params {
                    self.emit("; ");
                    self.emit_sep(params, ", ", Self::format_param);
                }
                self.emit(")");
                self.format_attrs(attrs);
                if let Some(body) = body {
                    self.emit(" ");
                    self.format_block(body);
                }
            }
            ExprKind::Subscript { object, index } => {
                self.format_expr(object);
                self.emit("[");
                self.format_expr(index);
                self.emit("]");
            }
            ExprKind::Field { object, member } => {
                self.format_expr(object);
                self.emit(".");
                match member {
                    Member::Name(name) => self.emit(name),
                    Member::Eval(inner) => {
                        self.emit("$eval(");
                        self.format_expr(inner);
                        self.emit(")");
                    }
                }
            }
            ExprKind::GenericApply { callee, args } => {
                self.format_expr(callee);
                self.format_generic_args(args);
            }
            ExprKind::Try { binding, expr } => {
                self.emit("try ");
                self.format_binding(binding.as_ref());
                self.format_expr(expr);
            }
            ExprKind::Catch { binding, exprs } => {
                self.emit("catch ");
                self.format_binding(binding.as_ref());
                self.emit_sep(exprs, ", ", Self::format_expr);
            }
            ExprKind::Lambda(lambda) => {
                self.emit("fn ");
                if let Some(ret) = &lambda.ret {
                    self.format_type(ret);
                    self.emit(" ");
                }
                self.format_params(&lambda.params);
                self.format_attrs(&lambda.attrs);
                match &lambda.body {
                    LambdaBody::Block(block) => {
                        self.emit(" ");
                        self.format_block(block);
                    }
                    LambdaBody::Expr(e) => {
                        self.emit(" => ");
                        self.format_expr(e);
                    }
                }
            }
            ExprKind::ExprBlock(block) => {
                self.emit("{|");
                self.emit_newline();
                self.format_body_lines(block);
                self.emit_indent();
                self.emit("|}");
            }
            ExprKind::Initializer(args) => self.format_initializer(args),
            ExprKind::CompoundLiteral { ty, args } => {
                self.format_type(ty);
                self.emit(" ");
                self.format_initializer(args);
            }
            ExprKind::CtCall { func, args } => {
                self.emit(func.as_str());
                if let Some(args) = args {
                    self.emit("(");
                    self.emit_sep(args, ", ", Self::format_arg);
                    self.emit(")");
                }
            }
        }
    }

    fn format_infix(&mut self, left: &Expr, op: &str, right: &Expr) {
        self.format_expr(left);
        self.emit(" ");
        self.emit(op);
        self.emit(" ");
        self.format_expr(right);
    }

    fn format_binding(&mut self, binding: Option<&Binding>) {
        if let Some(binding) = binding {
            if let Some(ty) = &binding.ty {
                self.format_type(ty);
                self.emit(" ");
            }
            self.emit(&binding.name);
            self.emit(" = ");
        }
    }

    fn format_initializer(&mut self, args: &[Arg]) {
        if args.is_empty() {
            self.emit("{}");
            return;
        }
        self.emit("{ ");
        self.emit_sep(args, ", ", Self::format_arg);
        self.emit(" }");
    }

    fn format_arg(&mut self, arg: &Arg) {
        match arg {
            Arg::Expr(e) => self.format_expr(e),
            Arg::Designated { path, value } => {
                for designator in path {
                    match designator {
                        Designator::Field(name) => {
                            self.emit(".");
                            self.emit(name);
                        }
                        Designator::Index(index) => {
                            self.emit("[");
                            self.format_expr(index);
                            self.emit("]");
                        }
                    }
                }
                self.emit(" = ");
                self.format_expr(value);
            }
            Arg::Splat(e) => {
                self.emit("...");
                self.format_expr(e);
            }
            Arg::VaSplat(range) => {
                self.emit("$vasplat");
                if let Some(range) = range {
                    self.emit("(");
                    self.format_expr(range);
                    self.emit(")");
                }
            }
        }
    }
}

/// A prefix operator must not fuse with its operand into another token,
/// nor fold a sign into a numeric literal.
fn prefix_needs_space(op: &str, operand: &str) -> bool {
    let (Some(last), Some(first)) = (op.chars().last(), operand.chars().next()) else {
        return false;
    };
    last == first || (matches!(op, "-" | "+") && first.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_spacing() {
        assert!(prefix_needs_space("-", "-x"));
        assert!(prefix_needs_space("-", "1"));
        assert!(prefix_needs_space("&", "&x"));
        assert!(prefix_needs_space("&&", "&x"));
        assert!(!prefix_needs_space("-", "x"));
        assert!(!prefix_needs_space("!", "x"));
        assert!(!prefix_needs_space("*", "p"));
    }
}
