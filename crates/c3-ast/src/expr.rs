// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression syntax nodes.

use crate::decl::{Attribute, Param};
use crate::literal::Literal;
use crate::stmt::Block;
use crate::token::{CtKeyword, IdentClass};
use crate::ty::TypeExpr;
use crate::{NodeId, Span};

/// An expression in the syntax tree.
#[derive(Debug, Clone)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

/// The kind of expression.
#[derive(Debug, Clone)]
pub enum ExprKind {
    Literal(Literal),
    /// `foo`, `io::printn`, `@foo`, `FOO`
    Ident {
        path: Vec<String>,
        name: String,
        class: IdentClass,
    },
    /// `$foo`, `$FOO`
    CtIdent(String),
    /// `#foo`
    HashIdent(String),
    /// `$$name`
    Builtin(String),
    /// A type in expression position: `int`, `Foo`, `$Type`.
    Type(TypeExpr),
    Paren(Box<Expr>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `(Type)expr`
    Cast {
        ty: TypeExpr,
        expr: Box<Expr>,
    },
    /// `a++`, `a--`
    Postfix {
        op: PostfixOp,
        operand: Box<Expr>,
    },
    /// `a!` or, with `force`, `a!!`
    Rethrow {
        expr: Box<Expr>,
        force: bool,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Ternary {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    /// `a ?: b`
    Elvis {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `a ?? b`
    OptElse {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `a?` or, with `rethrow`, `a?!`
    Optional {
        expr: Box<Expr>,
        rethrow: bool,
    },
    /// `a..b`, `a:b`; either bound may be absent.
    Range {
        start: Option<Box<Expr>>,
        end: Option<Box<Expr>>,
        kind: RangeKind,
    },
    /// `^n` inside a subscript
    FromEnd(Box<Expr>),
    Call {
        callee: Box<Expr>,
        args: Vec<Arg>,
        /// `foo(a; x, y)`
        trailing_params: Option<Vec<Param>>,
        /// `foo(a) @inline`
        attrs: Vec<Attribute>,
        /// `@foo(a) { ... }`
        body: Option<Block>,
    },
    Subscript {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    Field {
        object: Box<Expr>,
        member: Member,
    },
    /// `foo(<int, 4>)`
    GenericApply {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Try {
        binding: Option<Binding>,
        expr: Box<Expr>,
    },
    Catch {
        binding: Option<Binding>,
        exprs: Vec<Expr>,
    },
    Lambda(Box<Lambda>),
    /// `{| stmts |}`
    ExprBlock(Block),
    /// `{ a, .b = c }`
    Initializer(Vec<Arg>),
    /// `Foo { a, b }`
    CompoundLiteral {
        ty: TypeExpr,
        args: Vec<Arg>,
    },
    /// `$sizeof(x)`, `$vacount`; `args` is `None` when written without parens.
    CtCall {
        func: CtKeyword,
        args: Option<Vec<Arg>>,
    },
}

/// Binding introduced by `try x = e` or `catch err = e`.
#[derive(Debug, Clone)]
pub struct Binding {
    pub ty: Option<TypeExpr>,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Lambda {
    pub ret: Option<TypeExpr>,
    pub params: Vec<Param>,
    pub attrs: Vec<Attribute>,
    pub body: LambdaBody,
}

#[derive(Debug, Clone)]
pub enum LambdaBody {
    Block(Block),
    Expr(Expr),
}

/// Right-hand side of `.` in a member access.
#[derive(Debug, Clone)]
pub enum Member {
    /// Name as written, including any `@`, `#` or `$` sigil.
    Name(String),
    /// `.$eval(expr)`
    Eval(Box<Expr>),
}

/// A call or initializer argument.
#[derive(Debug, Clone)]
pub enum Arg {
    Expr(Expr),
    /// `.a.b[0] = value`
    Designated {
        path: Vec<Designator>,
        value: Expr,
    },
    /// `...expr`
    Splat(Expr),
    /// `$vasplat` or `$vasplat(range)`
    VaSplat(Option<Expr>),
}

#[derive(Debug, Clone)]
pub enum Designator {
    Field(String),
    Index(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
    /// `a..b`, inclusive end
    DotDot,
    /// `a:b`, start and length
    Len,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
    Add,
    Sub,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `&`
    AddrOf,
    /// `&&`, address of a temporary
    AddrOfTemp,
    /// `*`
    Deref,
    /// `+`
    Plus,
    /// `-`
    Neg,
    /// `~`
    BitNot,
    /// `!`
    Not,
    /// `++`
    PreInc,
    /// `--`
    PreDec,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::AddrOf => "&",
            UnaryOp::AddrOfTemp => "&&",
            UnaryOp::Deref => "*",
            UnaryOp::Plus => "+",
            UnaryOp::Neg => "-",
            UnaryOp::BitNot => "~",
            UnaryOp::Not => "!",
            UnaryOp::PreInc => "++",
            UnaryOp::PreDec => "--",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOp {
    Inc,
    Dec,
}

impl PostfixOp {
    pub fn as_str(self) -> &'static str {
        match self {
            PostfixOp::Inc => "++",
            PostfixOp::Dec => "--",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
}

impl AssignOp {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Mod => "%=",
            AssignOp::Shl => "<<=",
            AssignOp::Shr => ">>=",
            AssignOp::BitAnd => "&=",
            AssignOp::BitOr => "|=",
            AssignOp::BitXor => "^=",
        }
    }
}

impl Expr {
    /// Short tag naming the node kind, used by dumps and diagnostics.
    pub fn tag(&self) -> &'static str {
        match &self.kind {
            ExprKind::Literal(_) => "literal",
            ExprKind::Ident { .. } => "ident",
            ExprKind::CtIdent(_) => "ct_ident",
            ExprKind::HashIdent(_) => "hash_ident",
            ExprKind::Builtin(_) => "builtin",
            ExprKind::Type(_) => "type",
            ExprKind::Paren(_) => "paren",
            ExprKind::Unary { .. } => "unary",
            ExprKind::Cast { .. } => "cast",
            ExprKind::Postfix { .. } => "postfix",
            ExprKind::Rethrow { .. } => "rethrow",
            ExprKind::Binary { .. } => "binary",
            ExprKind::Assign { .. } => "assign",
            ExprKind::Ternary { .. } => "ternary",
            ExprKind::Elvis { .. } => "elvis",
            ExprKind::OptElse { .. } => "opt_else",
            ExprKind::Optional { .. } => "optional",
            ExprKind::Range { .. } => "range",
            ExprKind::FromEnd(_) => "from_end",
            ExprKind::Call { .. } => "call",
            ExprKind::Subscript { .. } => "subscript",
            ExprKind::Field { .. } => "field",
            ExprKind::GenericApply { .. } => "generic",
            ExprKind::Try { .. } => "try",
            ExprKind::Catch { .. } => "catch",
            ExprKind::Lambda(_) => "lambda",
            ExprKind::ExprBlock(_) => "expr_block",
            ExprKind::Initializer(_) => "initializer",
            ExprKind::CompoundLiteral { .. } => "compound_literal",
            ExprKind::CtCall { .. } => "ct_call",
        }
    }

    /// Whether this expression may appear on the left of an assignment.
    ///
    /// Only obviously non-addressable shapes are rejected; the rest is left
    /// to later stages.
    pub fn is_assignable(&self) -> bool {
        !matches!(
            self.kind,
            ExprKind::Literal(_)
                | ExprKind::Binary { .. }
                | ExprKind::Assign { .. }
                | ExprKind::Ternary { .. }
                | ExprKind::Elvis { .. }
                | ExprKind::OptElse { .. }
                | ExprKind::Range { .. }
                | ExprKind::Postfix { .. }
                | ExprKind::Try { .. }
                | ExprKind::Catch { .. }
                | ExprKind::Lambda(_)
                | ExprKind::Initializer(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::literal::{IntLiteral, LiteralKind, Radix};

    fn int(v: u128) -> Expr {
        Expr {
            id: NodeId(0),
            kind: ExprKind::Literal(Literal {
                kind: LiteralKind::Int(IntLiteral {
                    value: v,
                    negative: false,
                    radix: Radix::Decimal,
                    suffix: None,
                }),
                lexeme: v.to_string(),
            }),
            span: Span::default(),
        }
    }

    fn ident(name: &str) -> Expr {
        Expr {
            id: NodeId(1),
            kind: ExprKind::Ident {
                path: vec![],
                name: name.to_string(),
                class: IdentClass::Ident,
            },
            span: Span::default(),
        }
    }

    #[test]
    fn assignable_shapes() {
        assert!(ident("a").is_assignable());
        assert!(!int(1).is_assignable());
        let sum = Expr {
            id: NodeId(2),
            kind: ExprKind::Binary {
                op: BinOp::Add,
                left: Box::new(ident("a")),
                right: Box::new(int(1)),
            },
            span: Span::default(),
        };
        assert!(!sum.is_assignable());
        assert_eq!(sum.tag(), "binary");
        let deref = Expr {
            id: NodeId(3),
            kind: ExprKind::Unary { op: UnaryOp::Deref, operand: Box::new(ident("p")) },
            span: Span::default(),
        };
        assert!(deref.is_assignable());
    }
}
