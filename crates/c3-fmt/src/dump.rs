// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! S-expression rendering of a syntax tree.
//!
//! Every node prints as `(tag field: child ...)`. Operators use their symbol
//! as the tag, so `1 + 2 * 3` dumps as `(+ 1 (* 2 3))`. Leaves such as
//! names and literals print bare. Lists print in brackets. A node that does
//! not fit on one line puts each child on its own line.

use c3_ast::decl::*;
use c3_ast::expr::*;
use c3_ast::stmt::*;
use c3_ast::ty::{ArrayLen, TypeExpr, TypeKind, VectorLen};
use c3_ast::{Span, TranslationUnit};

use crate::config::DumpConfig;

const WIDTH: usize = 80;

#[derive(Debug, Clone)]
enum Sx {
    Atom(String),
    Node { head: String, items: Vec<(Option<&'static str>, Sx)> },
    List(Vec<Sx>),
}

impl Sx {
    fn flat(&self, out: &mut String) {
        match self {
            Sx::Atom(text) => out.push_str(text),
            Sx::Node { head, items } => {
                out.push('(');
                out.push_str(head);
                for (field, value) in items {
                    out.push(' ');
                    if let Some(field) = field {
                        out.push_str(field);
                        out.push_str(": ");
                    }
                    value.flat(out);
                }
                out.push(')');
            }
            Sx::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    item.flat(out);
                }
                out.push(']');
            }
        }
    }

    fn pretty(&self, column: usize, indent: usize, out: &mut String) {
        let mut flat = String::new();
        self.flat(&mut flat);
        if matches!(self, Sx::Atom(_)) || column + flat.len() <= WIDTH {
            out.push_str(&flat);
            return;
        }
        let inner = indent + 2;
        match self {
            Sx::Atom(_) => {}
            Sx::Node { head, items } => {
                out.push('(');
                out.push_str(head);
                for (field, value) in items {
                    newline(out, inner);
                    let mut column = inner;
                    if let Some(field) = field {
                        out.push_str(field);
                        out.push_str(": ");
                        column += field.len() + 2;
                    }
                    value.pretty(column, inner, out);
                }
                out.push(')');
            }
            Sx::List(items) => {
                out.push('[');
                for item in items {
                    newline(out, inner);
                    item.pretty(inner, inner, out);
                }
                out.push(']');
            }
        }
    }
}

fn newline(out: &mut String, indent: usize) {
    out.push('\n');
    out.extend(std::iter::repeat(' ').take(indent));
}

/// Collects the children of one node.
struct NodeBuilder {
    head: String,
    items: Vec<(Option<&'static str>, Sx)>,
}

impl NodeBuilder {
    fn pos(mut self, value: Sx) -> Self {
        self.items.push((None, value));
        self
    }

    fn field(mut self, name: &'static str, value: Sx) -> Self {
        self.items.push((Some(name), value));
        self
    }

    fn opt(self, name: &'static str, value: Option<Sx>) -> Self {
        match value {
            Some(value) => self.field(name, value),
            None => self,
        }
    }

    /// Omitted when empty.
    fn list(self, name: &'static str, values: Vec<Sx>) -> Self {
        if values.is_empty() {
            self
        } else {
            self.field(name, Sx::List(values))
        }
    }

    fn flag(self, name: &'static str, set: bool) -> Self {
        if set {
            self.pos(atom(name))
        } else {
            self
        }
    }

    fn build(self) -> Sx {
        Sx::Node { head: self.head, items: self.items }
    }
}

/// A node without a span, for heads that do not correspond to a tree node.
fn bare(head: &str) -> NodeBuilder {
    NodeBuilder { head: head.to_string(), items: Vec::new() }
}

fn atom(text: impl Into<String>) -> Sx {
    Sx::Atom(text.into())
}

fn path_atom(path: &[String], name: &str) -> String {
    let mut text = String::new();
    for segment in path {
        text.push_str(segment);
        text.push_str("::");
    }
    text.push_str(name);
    text
}

/// Render `unit` as an S-expression.
pub fn dump_unit(unit: &TranslationUnit, config: &DumpConfig) -> String {
    let dumper = Dumper { spans: config.spans };
    let root = dumper
        .node("unit", unit.span)
        .list("decls", unit.decls.iter().map(|d| dumper.decl(d)).collect())
        .build();
    let mut out = String::new();
    root.pretty(0, 0, &mut out);
    out.push('\n');
    out
}

/// Render a single expression; used by tests and the `dump` command.
pub fn dump_expr(expr: &Expr, config: &DumpConfig) -> String {
    let mut out = String::new();
    Dumper { spans: config.spans }.expr(expr).pretty(0, 0, &mut out);
    out
}

struct Dumper {
    spans: bool,
}

impl Dumper {
    fn head(&self, tag: &str, span: Span) -> String {
        if self.spans {
            format!("{}@{}:{}", tag, span.line, span.col)
        } else {
            tag.to_string()
        }
    }

    fn node(&self, tag: &str, span: Span) -> NodeBuilder {
        NodeBuilder { head: self.head(tag, span), items: Vec::new() }
    }

    fn leaf(&self, text: &str, span: Span) -> Sx {
        atom(self.head(text, span))
    }

    // --- Declarations ---

    fn decl(&self, decl: &Decl) -> Sx {
        let n = self.node(decl.tag(), decl.span);
        let n = match &decl.doc {
            Some(doc) => n
                .field("doc", atom(format!("{:?}", doc.body)))
                .list(
                    "contracts",
                    doc.contracts
                        .iter()
                        .map(|c| atom(format!("@{} {:?}", c.name, c.body)))
                        .collect(),
                ),
            None => n,
        };
        match &decl.kind {
            DeclKind::Module { path, generic_params, attrs } => n
                .pos(atom(path.join("::")))
                .list("generics", generic_params.iter().map(atom).collect())
                .list("attrs", self.attrs(attrs))
                .build(),
            DeclKind::Import { paths, attrs } => n
                .list("paths", paths.iter().map(|p| atom(p.join("::"))).collect())
                .list("attrs", self.attrs(attrs))
                .build(),
            DeclKind::Func(f) => {
                let n = self.signature(n.flag("extern", f.is_extern), &f.signature);
                n.opt("body", f.body.as_ref().map(|b| self.func_body(b))).build()
            }
            DeclKind::Macro(m) => n
                .pos(atom(&m.name))
                .opt("method_of", m.method_of.as_ref().map(|t| self.ty(t)))
                .opt("ret", m.ret.as_ref().map(|t| self.ty(t)))
                .list("params", self.params(&m.params))
                .opt(
                    "trailing",
                    m.trailing.as_ref().map(|t| {
                        bare("trailing")
                            .pos(atom(&t.name))
                            .opt("params", t.params.as_ref().map(|p| Sx::List(self.params(p))))
                            .build()
                    }),
                )
                .list("attrs", self.attrs(&m.attrs))
                .field("body", self.func_body(&m.body))
                .build(),
            DeclKind::Const(c) => self.const_decl(n, c),
            DeclKind::Global(g) => n
                .flag("extern", g.is_extern)
                .flag("tlocal", g.tlocal)
                .field("type", self.ty(&g.ty))
                .field("names", Sx::List(g.names.iter().map(atom).collect()))
                .list("attrs", self.attrs(&g.attrs))
                .opt("init", g.init.as_ref().map(|e| self.expr(e)))
                .build(),
            DeclKind::Struct(s) => n
                .pos(atom(&s.name))
                .list("interfaces", self.types(&s.interfaces))
                .list("attrs", self.attrs(&s.attrs))
                .field("members", Sx::List(s.members.iter().map(|m| self.member(m)).collect()))
                .build(),
            DeclKind::Bitstruct(b) => n
                .pos(atom(&b.name))
                .list("interfaces", self.types(&b.interfaces))
                .field("backing", self.ty(&b.backing))
                .list("attrs", self.attrs(&b.attrs))
                .field("fields", Sx::List(b.fields.iter().map(|f| self.bit_field(f)).collect()))
                .build(),
            DeclKind::Enum(e) => n
                .pos(atom(&e.name))
                .list("interfaces", self.types(&e.interfaces))
                .opt("backing", e.backing.as_ref().map(|t| self.ty(t)))
                .list("params", self.params(&e.params))
                .list("attrs", self.attrs(&e.attrs))
                .field("values", Sx::List(e.constants.iter().map(|c| self.enum_const(c)).collect()))
                .build(),
            DeclKind::Fault(f) => n
                .pos(atom(&f.name))
                .list("interfaces", self.types(&f.interfaces))
                .list("attrs", self.attrs(&f.attrs))
                .field("values", Sx::List(f.constants.iter().map(|c| self.enum_const(c)).collect()))
                .build(),
            DeclKind::Interface(i) => n
                .pos(atom(&i.name))
                .list("parents", self.types(&i.parents))
                .list(
                    "methods",
                    i.methods
                        .iter()
                        .map(|m| self.signature(bare("fn"), m).build())
                        .collect(),
                )
                .build(),
            DeclKind::Define(d) => {
                let n = n.pos(atom(&d.name)).list("attrs", self.attrs(&d.attrs));
                match &d.kind {
                    DefineKind::Alias(e) => n.field("alias", self.expr(e)).build(),
                    DefineKind::Type(t) => n.field("type", self.ty(t)).build(),
                    DefineKind::Attribute { params, attrs } => n
                        .list("params", self.params(params))
                        .field("attributes", Sx::List(self.attrs(attrs)))
                        .build(),
                }
            }
            DeclKind::Distinct(d) => n
                .pos(atom(&d.name))
                .list("interfaces", self.types(&d.interfaces))
                .list("attrs", self.attrs(&d.attrs))
                .flag("inline", d.inline)
                .field("type", self.ty(&d.ty))
                .build(),
            DeclKind::CtAssert { cond, message } => n
                .pos(self.expr(cond))
                .opt("message", message.as_ref().map(|e| self.expr(e)))
                .build(),
            DeclKind::CtEcho(e) | DeclKind::CtError(e) | DeclKind::CtInclude(e) => {
                n.pos(self.expr(e)).build()
            }
            DeclKind::CtIf { cond, then_decls, else_decls } => n
                .pos(self.expr(cond))
                .field("then", Sx::List(then_decls.iter().map(|d| self.decl(d)).collect()))
                .opt(
                    "else",
                    else_decls.as_ref().map(|ds| Sx::List(ds.iter().map(|d| self.decl(d)).collect())),
                )
                .build(),
            DeclKind::CtSwitch { subject, cases } => n
                .opt("subject", subject.as_ref().map(|e| self.expr(e)))
                .field(
                    "cases",
                    Sx::List(cases.iter().map(|c| self.ct_case(c, |d| self.decl(d))).collect()),
                )
                .build(),
        }
    }

    fn signature(&self, n: NodeBuilder, sig: &FuncSignature) -> NodeBuilder {
        n.pos(atom(&sig.name))
            .opt("method_of", sig.method_of.as_ref().map(|t| self.ty(t)))
            .field("ret", self.ty(&sig.ret))
            .list("params", self.params(&sig.params))
            .list("attrs", self.attrs(&sig.attrs))
    }

    fn func_body(&self, body: &FuncBody) -> Sx {
        match body {
            FuncBody::Block(b) => self.block(b),
            FuncBody::Expr(e) => self.node("=>", e.span).pos(self.expr(e)).build(),
        }
    }

    fn const_decl(&self, n: NodeBuilder, c: &ConstDecl) -> Sx {
        n.flag("extern", c.is_extern)
            .pos(atom(&c.name))
            .opt("type", c.ty.as_ref().map(|t| self.ty(t)))
            .list("attrs", self.attrs(&c.attrs))
            .opt("value", c.value.as_ref().map(|e| self.expr(e)))
            .build()
    }

    fn params(&self, params: &[Param]) -> Vec<Sx> {
        params
            .iter()
            .map(|p| {
                self.node("param", p.span)
                    .opt("name", p.name.as_ref().map(atom))
                    .opt("type", p.ty.as_ref().map(|t| self.ty(t)))
                    .flag("ref", p.by_ref)
                    .flag("variadic", p.variadic)
                    .list("attrs", self.attrs(&p.attrs))
                    .opt("default", p.default.as_ref().map(|e| self.expr(e)))
                    .build()
            })
            .collect()
    }

    fn attrs(&self, attrs: &[Attribute]) -> Vec<Sx> {
        attrs
            .iter()
            .map(|a| {
                let name = path_atom(&a.path, &a.name);
                match &a.args {
                    None => self.leaf(&name, a.span),
                    Some(args) => {
                        let mut n = self.node(&name, a.span);
                        for arg in args {
                            n = n.pos(match arg {
                                AttrArg::Expr(e) => self.expr(e),
                                AttrArg::Operator(op) => atom(op.as_str()),
                            });
                        }
                        n.build()
                    }
                }
            })
            .collect()
    }

    fn member(&self, member: &StructMember) -> Sx {
        match member {
            StructMember::Field { inline, ty, name, attrs, span } => self
                .node("field", *span)
                .flag("inline", *inline)
                .opt("name", name.as_ref().map(atom))
                .field("type", self.ty(ty))
                .list("attrs", self.attrs(attrs))
                .build(),
            StructMember::Nested { kind, name, attrs, members, span } => self
                .node(kind.as_str(), *span)
                .opt("name", name.as_ref().map(atom))
                .list("attrs", self.attrs(attrs))
                .field("members", Sx::List(members.iter().map(|m| self.member(m)).collect()))
                .build(),
            StructMember::Bitstruct { name, backing, attrs, fields, span } => self
                .node("bitstruct", *span)
                .opt("name", name.as_ref().map(atom))
                .field("backing", self.ty(backing))
                .list("attrs", self.attrs(attrs))
                .field("fields", Sx::List(fields.iter().map(|f| self.bit_field(f)).collect()))
                .build(),
        }
    }

    fn bit_field(&self, field: &BitField) -> Sx {
        self.node("bits", field.span)
            .pos(atom(&field.name))
            .field("type", self.ty(&field.ty))
            .opt("low", field.low.as_ref().map(|e| self.expr(e)))
            .opt("high", field.high.as_ref().map(|e| self.expr(e)))
            .build()
    }

    fn enum_const(&self, c: &EnumConst) -> Sx {
        if c.args.is_none() && c.attrs.is_empty() {
            return self.leaf(&c.name, c.span);
        }
        self.node(&c.name, c.span)
            .opt("args", c.args.as_ref().map(|args| Sx::List(self.exprs(args))))
            .list("attrs", self.attrs(&c.attrs))
            .build()
    }

    fn ct_case<T>(&self, case: &CtCase<T>, item: impl Fn(&T) -> Sx) -> Sx {
        let tag = if case.label.is_some() { "$case" } else { "$default" };
        self.node(tag, case.span)
            .opt("label", case.label.as_ref().map(|e| self.expr(e)))
            .list("body", case.body.iter().map(item).collect())
            .build()
    }

    // --- Types ---

    fn types(&self, types: &[TypeExpr]) -> Vec<Sx> {
        types.iter().map(|t| self.ty(t)).collect()
    }

    fn ty(&self, ty: &TypeExpr) -> Sx {
        match &ty.kind {
            TypeKind::Primitive(p) => self.leaf(p.as_str(), ty.span),
            TypeKind::Named { path, name, generic_args: None } => self.leaf(&path_atom(path, name), ty.span),
            TypeKind::Named { path, name, generic_args: Some(args) } => self
                .node("generic", ty.span)
                .pos(atom(path_atom(path, name)))
                .field("args", Sx::List(self.exprs(args)))
                .build(),
            TypeKind::CtType(name) => self.leaf(name, ty.span),
            TypeKind::CtTypeCall { func, arg } => self.node(func.as_str(), ty.span).pos(self.expr(arg)).build(),
            TypeKind::Pointer(inner) => self.node("ptr", ty.span).pos(self.ty(inner)).build(),
            TypeKind::Array { elem, len: ArrayLen::Slice } => {
                self.node("slice", ty.span).pos(self.ty(elem)).build()
            }
            TypeKind::Array { elem, len } => {
                let len = match len {
                    ArrayLen::Fixed(e) => self.expr(e),
                    _ => atom("*"),
                };
                self.node("array", ty.span).pos(self.ty(elem)).field("len", len).build()
            }
            TypeKind::Vector { elem, len } => {
                let len = match len {
                    VectorLen::Fixed(e) => self.expr(e),
                    VectorLen::Inferred => atom("*"),
                };
                self.node("vector", ty.span).pos(self.ty(elem)).field("len", len).build()
            }
            TypeKind::Optional(inner) => self.node("optional", ty.span).pos(self.ty(inner)).build(),
            TypeKind::Func { ret, params } => self
                .node("fn_type", ty.span)
                .field("ret", self.ty(ret))
                .list("params", self.params(params))
                .build(),
        }
    }

    // --- Statements ---

    fn block(&self, block: &Block) -> Sx {
        let mut n = self.node("block", block.span);
        for stmt in &block.stmts {
            n = n.pos(self.stmt(stmt));
        }
        n.build()
    }

    fn stmts(&self, stmts: &[Stmt]) -> Vec<Sx> {
        stmts.iter().map(|s| self.stmt(s)).collect()
    }

    fn stmt(&self, stmt: &Stmt) -> Sx {
        let n = self.node(stmt.tag(), stmt.span);
        match &stmt.kind {
            StmtKind::Empty => n.build(),
            StmtKind::Expr(e) => n.pos(self.expr(e)).build(),
            StmtKind::Block(b) => self.block(b),
            StmtKind::Var(v) => self.var(n, v),
            StmtKind::Const(c) => self.const_decl(n, c),
            StmtKind::Return(value) => n.opt("value", value.as_ref().map(|e| self.expr(e))).build(),
            StmtKind::If { label, cond, then_branch, else_branch } => n
                .opt("label", label.as_ref().map(atom))
                .field("cond", self.condition(cond))
                .field("then", self.stmt(then_branch))
                .opt("else", else_branch.as_ref().map(|s| self.stmt(s)))
                .build(),
            StmtKind::While { label, cond, body } => n
                .opt("label", label.as_ref().map(atom))
                .field("cond", self.condition(cond))
                .field("body", self.stmt(body))
                .build(),
            StmtKind::DoWhile { label, body, cond } => n
                .opt("label", label.as_ref().map(atom))
                .field("body", self.block(body))
                .opt("cond", cond.as_ref().map(|e| self.expr(e)))
                .build(),
            StmtKind::For { label, init, cond, step, body } => n
                .opt("label", label.as_ref().map(atom))
                .opt("init", init.as_ref().map(|c| self.condition(c)))
                .opt("cond", cond.as_ref().map(|c| self.condition(c)))
                .list("step", self.exprs(step))
                .field("body", self.stmt(body))
                .build(),
            StmtKind::Foreach { label, index, value, collection, body, .. } => n
                .opt("label", label.as_ref().map(atom))
                .opt("index", index.as_ref().map(|v| self.foreach_var(v)))
                .field("value", self.foreach_var(value))
                .field("in", self.expr(collection))
                .field("body", self.stmt(body))
                .build(),
            StmtKind::Switch { label, subject, cases } => n
                .opt("label", label.as_ref().map(atom))
                .opt("subject", subject.as_ref().map(|c| self.condition(c)))
                .field(
                    "cases",
                    Sx::List(
                        cases
                            .iter()
                            .map(|c| {
                                let n = match &c.label {
                                    CaseLabel::Expr(e) => self.node("case", c.span).pos(self.expr(e)),
                                    CaseLabel::Default => self.node("default", c.span),
                                };
                                n.list("body", self.stmts(&c.body)).build()
                            })
                            .collect(),
                    ),
                )
                .build(),
            StmtKind::Defer { kind, body } => n
                .flag("try", *kind == DeferKind::Try)
                .flag("catch", *kind == DeferKind::Catch)
                .pos(self.stmt(body))
                .build(),
            StmtKind::Break(label) | StmtKind::Continue(label) => n.opt("label", label.as_ref().map(atom)).build(),
            StmtKind::Nextcase { label, target } => n
                .opt("label", label.as_ref().map(atom))
                .opt(
                    "target",
                    target.as_ref().map(|t| match t {
                        NextcaseTarget::Default => atom("default"),
                        NextcaseTarget::Expr(e) => self.expr(e),
                    }),
                )
                .build(),
            StmtKind::Asm(AsmBody::Text(e)) => n.pos(self.expr(e)).build(),
            StmtKind::Asm(AsmBody::Block(instrs)) => {
                let mut n = n;
                for instr in instrs {
                    let mut i = self.node(&instr.name, instr.span);
                    for operand in &instr.operands {
                        i = i.pos(match operand {
                            AsmOperand::Expr(e) => self.expr(e),
                            AsmOperand::Address(e) => self.node("addr", e.span).pos(self.expr(e)).build(),
                        });
                    }
                    n = n.pos(i.build());
                }
                n.build()
            }
            StmtKind::Assert { cond, message } => {
                n.pos(self.expr(cond)).list("message", self.exprs(message)).build()
            }
            StmtKind::CtIf { cond, then_branch, else_branch } => n
                .pos(self.expr(cond))
                .field("then", self.block(then_branch))
                .opt("else", else_branch.as_ref().map(|b| self.block(b)))
                .build(),
            StmtKind::CtSwitch { subject, cases } => n
                .opt("subject", subject.as_ref().map(|e| self.expr(e)))
                .field(
                    "cases",
                    Sx::List(cases.iter().map(|c| self.ct_case(c, |s| self.stmt(s))).collect()),
                )
                .build(),
            StmtKind::CtFor { init, cond, step, body } => n
                .opt("init", init.as_ref().map(|c| self.condition(c)))
                .opt("cond", cond.as_ref().map(|e| self.expr(e)))
                .list("step", self.exprs(step))
                .field("body", self.block(body))
                .build(),
            StmtKind::CtForeach { index, value, collection, body } => n
                .opt("index", index.as_ref().map(atom))
                .field("value", atom(value))
                .field("in", self.expr(collection))
                .field("body", self.block(body))
                .build(),
            StmtKind::CtEcho(e) | StmtKind::CtError(e) => n.pos(self.expr(e)).build(),
            StmtKind::CtAssert { cond, message } => n
                .pos(self.expr(cond))
                .opt("message", message.as_ref().map(|e| self.expr(e)))
                .build(),
        }
    }

    fn var(&self, n: NodeBuilder, v: &VarDecl) -> Sx {
        n.opt("storage", v.storage.map(|s| atom(s.as_str())))
            .pos(atom(&v.name))
            .opt("type", v.ty.as_ref().map(|t| self.ty(t)))
            .list("attrs", self.attrs(&v.attrs))
            .opt("init", v.init.as_ref().map(|e| self.expr(e)))
            .build()
    }

    fn condition(&self, cond: &Condition) -> Sx {
        Sx::List(
            cond.items
                .iter()
                .map(|item| match item {
                    CondItem::Expr(e) => self.expr(e),
                    CondItem::Decl(v) => self.var(self.node("var", cond.span), v),
                })
                .collect(),
        )
    }

    fn foreach_var(&self, var: &ForeachVar) -> Sx {
        if var.ty.is_none() && !var.by_ref {
            return atom(&var.name);
        }
        bare(&var.name)
            .opt("type", var.ty.as_ref().map(|t| self.ty(t)))
            .flag("ref", var.by_ref)
            .build()
    }

    // --- Expressions ---

    fn exprs(&self, exprs: &[Expr]) -> Vec<Sx> {
        exprs.iter().map(|e| self.expr(e)).collect()
    }

    fn expr(&self, expr: &Expr) -> Sx {
        let span = expr.span;
        match &expr.kind {
            ExprKind::Literal(lit) => self.leaf(&lit.lexeme.replace('\n', "\\n"), span),
            ExprKind::Ident { path, name, .. } => self.leaf(&path_atom(path, name), span),
            ExprKind::CtIdent(name) | ExprKind::HashIdent(name) => self.leaf(name, span),
            ExprKind::Builtin(name) => self.leaf(&format!("$${}", name), span),
            ExprKind::Type(ty) => self.ty(ty),
            ExprKind::Paren(inner) => self.node("paren", span).pos(self.expr(inner)).build(),
            ExprKind::Unary { op, operand } => self.node(op.as_str(), span).pos(self.expr(operand)).build(),
            ExprKind::Cast { ty, expr } => self.node("cast", span).pos(self.ty(ty)).pos(self.expr(expr)).build(),
            ExprKind::Postfix { op, operand } => self
                .node(&format!("post{}", op.as_str()), span)
                .pos(self.expr(operand))
                .build(),
            ExprKind::Rethrow { expr, force } => self
                .node(if *force { "!!" } else { "!" }, span)
                .pos(self.expr(expr))
                .build(),
            ExprKind::Binary { op, left, right } => self
                .node(op.as_str(), span)
                .pos(self.expr(left))
                .pos(self.expr(right))
                .build(),
            ExprKind::Assign { op, target, value } => self
                .node(op.as_str(), span)
                .pos(self.expr(target))
                .pos(self.expr(value))
                .build(),
            ExprKind::Ternary { cond, then_expr, else_expr } => self
                .node("?", span)
                .pos(self.expr(cond))
                .pos(self.expr(then_expr))
                .pos(self.expr(else_expr))
                .build(),
            ExprKind::Elvis { left, right } => {
                self.node("?:", span).pos(self.expr(left)).pos(self.expr(right)).build()
            }
            ExprKind::OptElse { left, right } => {
                self.node("??", span).pos(self.expr(left)).pos(self.expr(right)).build()
            }
            ExprKind::Optional { expr, rethrow } => self
                .node("optional", span)
                .pos(self.expr(expr))
                .flag("rethrow", *rethrow)
                .build(),
            ExprKind::Range { start, end, kind } => {
                let tag = match kind {
                    RangeKind::DotDot => "..",
                    RangeKind::Len => ":",
                };
                let bound = |e: &Option<Box<Expr>>| e.as_ref().map_or_else(|| atom("_"), |e| self.expr(e));
                self.node(tag, span).pos(bound(start)).pos(bound(end)).build()
            }
            ExprKind::FromEnd(inner) => self.node("^", span).pos(self.expr(inner)).build(),
            ExprKind::Call { callee, args, trailing_params, attrs, body } => {
                let mut n = self.node("call", span).pos(self.expr(callee));
                for arg in args {
                    n = n.pos(self.arg(arg));
                }
                n.opt("trailing", trailing_params.as_ref().map(|p| Sx::List(self.params(p))))
                    .list("attrs", self.attrs(attrs))
                    .opt("body", body.as_ref().map(|b| self.block(b)))
                    .build()
            }
            ExprKind::Subscript { object, index } => self
                .node("index", span)
                .pos(self.expr(object))
                .pos(self.expr(index))
                .build(),
            ExprKind::Field { object, member } => {
                let member = match member {
                    Member::Name(name) => atom(name),
                    Member::Eval(e) => self.node("$eval", e.span).pos(self.expr(e)).build(),
                };
                self.node("field", span).pos(self.expr(object)).pos(member).build()
            }
            ExprKind::GenericApply { callee, args } => self
                .node("generic", span)
                .pos(self.expr(callee))
                .field("args", Sx::List(self.exprs(args)))
                .build(),
            ExprKind::Try { binding, expr } => self
                .binding(self.node("try", span), binding.as_ref())
                .pos(self.expr(expr))
                .build(),
            ExprKind::Catch { binding, exprs } => {
                let mut n = self.binding(self.node("catch", span), binding.as_ref());
                for e in exprs {
                    n = n.pos(self.expr(e));
                }
                n.build()
            }
            ExprKind::Lambda(lambda) => self
                .node("lambda", span)
                .opt("ret", lambda.ret.as_ref().map(|t| self.ty(t)))
                .list("params", self.params(&lambda.params))
                .list("attrs", self.attrs(&lambda.attrs))
                .field(
                    "body",
                    match &lambda.body {
                        LambdaBody::Block(b) => self.block(b),
                        LambdaBody::Expr(e) => self.node("=>", e.span).pos(self.expr(e)).build(),
                    },
                )
                .build(),
            ExprKind::ExprBlock(block) => {
                let mut n = self.node("expr_block", span);
                for stmt in &block.stmts {
                    n = n.pos(self.stmt(stmt));
                }
                n.build()
            }
            ExprKind::Initializer(args) => {
                let mut n = self.node("init", span);
                for arg in args {
                    n = n.pos(self.arg(arg));
                }
                n.build()
            }
            ExprKind::CompoundLiteral { ty, args } => {
                let mut n = self.node("compound", span).pos(self.ty(ty));
                for arg in args {
                    n = n.pos(self.arg(arg));
                }
                n.build()
            }
            ExprKind::CtCall { func, args } => {
                let mut n = self.node(func.as_str(), span);
                if let Some(args) = args {
                    for arg in args {
                        n = n.pos(self.arg(arg));
                    }
                }
                n.build()
            }
        }
    }

    fn binding(&self, n: NodeBuilder, binding: Option<&Binding>) -> NodeBuilder {
        match binding {
            Some(b) => {
                let bound = bare(&b.name)
                    .opt("type", b.ty.as_ref().map(|t| self.ty(t)))
                    .build();
                n.field("bind", bound)
            }
            None => n,
        }
    }

    fn arg(&self, arg: &Arg) -> Sx {
        match arg {
            Arg::Expr(e) => self.expr(e),
            Arg::Designated { path, value } => {
                let mut text = String::new();
                let mut indices = Vec::new();
                for designator in path {
                    match designator {
                        Designator::Field(name) => {
                            text.push('.');
                            text.push_str(name);
                        }
                        Designator::Index(e) => {
                            text.push_str("[]");
                            indices.push(self.expr(e));
                        }
                    }
                }
                bare("designated")
                    .pos(atom(text))
                    .list("indices", indices)
                    .field("value", self.expr(value))
                    .build()
            }
            Arg::Splat(e) => bare("...").pos(self.expr(e)).build(),
            Arg::VaSplat(range) => bare("$vasplat").opt("range", range.as_ref().map(|e| self.expr(e))).build(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use c3_parser::{parse_source, ParseConfig};

    fn dump(src: &str) -> String {
        let out = parse_source(src, &ParseConfig::default());
        assert!(out.is_ok(), "errors: {:?} {:?}", out.lex_errors, out.errors);
        dump_unit(&out.unit, &DumpConfig::default())
    }

    #[test]
    fn operators_use_their_symbol() {
        let text = dump("int x = 1 + 2 * 3;");
        assert!(text.contains("(+ 1 (* 2 3))"), "{}", text);
    }

    #[test]
    fn assignment_nests_to_the_right() {
        let text = dump("fn void f() { a = b = c; }");
        assert!(text.contains("(= a (= b c))"), "{}", text);
    }

    #[test]
    fn spans_are_optional() {
        let out = parse_source("const A = 1;", &ParseConfig::default());
        let plain = dump_unit(&out.unit, &DumpConfig { spans: false });
        let spanned = dump_unit(&out.unit, &DumpConfig { spans: true });
        assert!(!plain.contains('@'));
        assert!(spanned.contains("const@1:1"), "{}", spanned);
    }

    #[test]
    fn long_nodes_break_across_lines() {
        let text = dump(
            "fn void main() { io::printfn(\"%d %d %d\", first_value, second_value, third_value); }",
        );
        assert!(text.lines().count() > 2, "{}", text);
        assert!(text.lines().all(|l| !l.ends_with(' ')));
    }

    #[test]
    fn optional_type() {
        let text = dump("int! x;");
        assert!(text.contains("(optional int)"), "{}", text);
    }
}
