// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Declaration syntax nodes.

use crate::doc::DocComment;
use crate::expr::Expr;
use crate::stmt::{Block, CtCase};
use crate::ty::TypeExpr;
use crate::{NodeId, Span};

/// A top-level declaration.
#[derive(Debug, Clone)]
pub struct Decl {
    pub id: NodeId,
    pub kind: DeclKind,
    pub span: Span,
    /// `<* ... *>` block directly preceding the declaration.
    pub doc: Option<DocComment>,
}

#[derive(Debug, Clone)]
pub enum DeclKind {
    /// `module a::b (<T>) @attrs;`
    Module {
        path: Vec<String>,
        generic_params: Vec<String>,
        attrs: Vec<Attribute>,
    },
    /// `import a::b, c @attrs;`
    Import {
        paths: Vec<Vec<String>>,
        attrs: Vec<Attribute>,
    },
    Func(FuncDecl),
    Macro(MacroDecl),
    Const(ConstDecl),
    Global(GlobalDecl),
    Struct(StructDecl),
    Bitstruct(BitstructDecl),
    Enum(EnumDecl),
    Fault(FaultDecl),
    Interface(InterfaceDecl),
    Define(DefineDecl),
    Distinct(DistinctDecl),
    CtAssert {
        cond: Expr,
        message: Option<Expr>,
    },
    CtEcho(Expr),
    CtError(Expr),
    CtInclude(Expr),
    CtIf {
        cond: Expr,
        then_decls: Vec<Decl>,
        else_decls: Option<Vec<Decl>>,
    },
    CtSwitch {
        subject: Option<Expr>,
        cases: Vec<CtCase<Decl>>,
    },
}

/// Attribute reference: `@inline`, `@Foo(1, 2)`, `std::@Bar`.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub path: Vec<String>,
    /// Name including the leading `@`.
    pub name: String,
    pub args: Option<Vec<AttrArg>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum AttrArg {
    Expr(Expr),
    /// `@operator([])` and friends.
    Operator(OverloadOp),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverloadOp {
    /// `[]`
    Index,
    /// `[]=`
    IndexAssign,
    /// `&[]`
    IndexRef,
}

impl OverloadOp {
    pub fn as_str(self) -> &'static str {
        match self {
            OverloadOp::Index => "[]",
            OverloadOp::IndexAssign => "[]=",
            OverloadOp::IndexRef => "&[]",
        }
    }
}

/// A function, macro, lambda or trailing-block parameter.
#[derive(Debug, Clone)]
pub struct Param {
    pub ty: Option<TypeExpr>,
    /// Name including any `$` or `#` sigil; `None` for a bare `...` or an
    /// unnamed typed parameter.
    pub name: Option<String>,
    /// `&name`
    pub by_ref: bool,
    /// `Type ...name`, `name...` or `...`
    pub variadic: bool,
    pub attrs: Vec<Attribute>,
    pub default: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FuncSignature {
    pub ret: TypeExpr,
    /// `Foo` in `fn void Foo.bar()`.
    pub method_of: Option<TypeExpr>,
    pub name: String,
    pub params: Vec<Param>,
    pub attrs: Vec<Attribute>,
}

#[derive(Debug, Clone)]
pub enum FuncBody {
    Block(Block),
    /// `=> expr;`
    Expr(Expr),
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub is_extern: bool,
    pub signature: FuncSignature,
    /// `None` for `fn void f();`.
    pub body: Option<FuncBody>,
}

/// `; @body(x)` at the end of a macro parameter list.
#[derive(Debug, Clone)]
pub struct TrailingBlock {
    pub name: String,
    pub params: Option<Vec<Param>>,
}

#[derive(Debug, Clone)]
pub struct MacroDecl {
    pub ret: Option<TypeExpr>,
    pub method_of: Option<TypeExpr>,
    pub name: String,
    pub params: Vec<Param>,
    pub trailing: Option<TrailingBlock>,
    pub attrs: Vec<Attribute>,
    pub body: FuncBody,
}

/// `const [Type] NAME = value;`, at top level or inside a body.
#[derive(Debug, Clone)]
pub struct ConstDecl {
    pub is_extern: bool,
    pub ty: Option<TypeExpr>,
    pub name: String,
    pub attrs: Vec<Attribute>,
    pub value: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct GlobalDecl {
    pub is_extern: bool,
    pub tlocal: bool,
    pub ty: TypeExpr,
    pub names: Vec<String>,
    pub attrs: Vec<Attribute>,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateKind {
    Struct,
    Union,
}

impl AggregateKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AggregateKind::Struct => "struct",
            AggregateKind::Union => "union",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StructDecl {
    pub kind: AggregateKind,
    pub name: String,
    pub interfaces: Vec<TypeExpr>,
    pub attrs: Vec<Attribute>,
    pub members: Vec<StructMember>,
}

#[derive(Debug, Clone)]
pub enum StructMember {
    Field {
        inline: bool,
        ty: TypeExpr,
        name: Option<String>,
        attrs: Vec<Attribute>,
        span: Span,
    },
    /// Nested `struct` or `union`, named or anonymous.
    Nested {
        kind: AggregateKind,
        name: Option<String>,
        attrs: Vec<Attribute>,
        members: Vec<StructMember>,
        span: Span,
    },
    /// Nested `bitstruct`.
    Bitstruct {
        name: Option<String>,
        backing: TypeExpr,
        attrs: Vec<Attribute>,
        fields: Vec<BitField>,
        span: Span,
    },
}

#[derive(Debug, Clone)]
pub struct BitstructDecl {
    pub name: String,
    pub interfaces: Vec<TypeExpr>,
    pub backing: TypeExpr,
    pub attrs: Vec<Attribute>,
    pub fields: Vec<BitField>,
}

/// `Type name : lo..hi;`, `Type name : bit;` or `Type name;`
#[derive(Debug, Clone)]
pub struct BitField {
    pub ty: TypeExpr,
    pub name: String,
    pub low: Option<Expr>,
    pub high: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct EnumDecl {
    pub name: String,
    pub interfaces: Vec<TypeExpr>,
    pub backing: Option<TypeExpr>,
    /// Associated-value parameters: `enum E : int (String desc)`.
    pub params: Vec<Param>,
    pub attrs: Vec<Attribute>,
    pub constants: Vec<EnumConst>,
}

#[derive(Debug, Clone)]
pub struct EnumConst {
    pub name: String,
    pub args: Option<Vec<Expr>>,
    pub attrs: Vec<Attribute>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FaultDecl {
    pub name: String,
    pub interfaces: Vec<TypeExpr>,
    pub attrs: Vec<Attribute>,
    pub constants: Vec<EnumConst>,
}

#[derive(Debug, Clone)]
pub struct InterfaceDecl {
    pub name: String,
    pub parents: Vec<TypeExpr>,
    pub methods: Vec<FuncSignature>,
}

#[derive(Debug, Clone)]
pub struct DefineDecl {
    /// Name including any `@` sigil.
    pub name: String,
    pub attrs: Vec<Attribute>,
    pub kind: DefineKind,
}

#[derive(Debug, Clone)]
pub enum DefineKind {
    /// `def foo = bar::baz(<int>);`, `def FOO = x::BAR;`
    Alias(Expr),
    /// `def @Attr(params) = { @a, @b };`
    Attribute {
        params: Vec<Param>,
        attrs: Vec<Attribute>,
    },
    /// `def Name = Type;` or `def Cb = fn void(int);`
    Type(TypeExpr),
}

#[derive(Debug, Clone)]
pub struct DistinctDecl {
    pub name: String,
    pub interfaces: Vec<TypeExpr>,
    pub attrs: Vec<Attribute>,
    pub inline: bool,
    pub ty: TypeExpr,
}

impl Decl {
    pub fn tag(&self) -> &'static str {
        match &self.kind {
            DeclKind::Module { .. } => "module",
            DeclKind::Import { .. } => "import",
            DeclKind::Func(_) => "fn",
            DeclKind::Macro(_) => "macro",
            DeclKind::Const(_) => "const",
            DeclKind::Global(_) => "global",
            DeclKind::Struct(s) => s.kind.as_str(),
            DeclKind::Bitstruct(_) => "bitstruct",
            DeclKind::Enum(_) => "enum",
            DeclKind::Fault(_) => "fault",
            DeclKind::Interface(_) => "interface",
            DeclKind::Define(_) => "def",
            DeclKind::Distinct(_) => "distinct",
            DeclKind::CtAssert { .. } => "$assert",
            DeclKind::CtEcho(_) => "$echo",
            DeclKind::CtError(_) => "$error",
            DeclKind::CtInclude(_) => "$include",
            DeclKind::CtIf { .. } => "$if",
            DeclKind::CtSwitch { .. } => "$switch",
        }
    }

    /// Declared name, for declarations that introduce one.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            DeclKind::Func(f) => Some(&f.signature.name),
            DeclKind::Macro(m) => Some(&m.name),
            DeclKind::Const(c) => Some(&c.name),
            DeclKind::Global(g) => g.names.first().map(String::as_str),
            DeclKind::Struct(s) => Some(&s.name),
            DeclKind::Bitstruct(b) => Some(&b.name),
            DeclKind::Enum(e) => Some(&e.name),
            DeclKind::Fault(f) => Some(&f.name),
            DeclKind::Interface(i) => Some(&i.name),
            DeclKind::Define(d) => Some(&d.name),
            DeclKind::Distinct(d) => Some(&d.name),
            _ => None,
        }
    }
}
