// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement syntax nodes.

use crate::decl::{Attribute, ConstDecl};
use crate::expr::{Binding, Expr};
use crate::ty::TypeExpr;
use crate::{NodeId, Span};

/// A statement in the syntax tree.
#[derive(Debug, Clone)]
pub struct Stmt {
    pub id: NodeId,
    pub kind: StmtKind,
    pub span: Span,
}

/// `{ stmts }`, or the statement list between compile-time delimiters.
#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    /// `;`
    Empty,
    Expr(Expr),
    Block(Block),
    Var(VarDecl),
    Const(ConstDecl),
    Return(Option<Expr>),
    If {
        label: Option<String>,
        cond: Condition,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        label: Option<String>,
        cond: Condition,
        body: Box<Stmt>,
    },
    /// `do { } while (c);` or `do { };`
    DoWhile {
        label: Option<String>,
        body: Block,
        cond: Option<Expr>,
    },
    For {
        label: Option<String>,
        init: Option<Condition>,
        cond: Option<Condition>,
        step: Vec<Expr>,
        body: Box<Stmt>,
    },
    Foreach {
        label: Option<String>,
        reverse: bool,
        index: Option<ForeachVar>,
        value: ForeachVar,
        collection: Expr,
        body: Box<Stmt>,
    },
    Switch {
        label: Option<String>,
        subject: Option<Condition>,
        cases: Vec<SwitchCase>,
    },
    Defer {
        kind: DeferKind,
        body: Box<Stmt>,
    },
    Break(Option<String>),
    Continue(Option<String>),
    Nextcase {
        label: Option<String>,
        target: Option<NextcaseTarget>,
    },
    Asm(AsmBody),
    /// `assert(cond, "message", args...)`
    Assert {
        cond: Expr,
        message: Vec<Expr>,
    },
    CtIf {
        cond: Expr,
        then_branch: Block,
        else_branch: Option<Block>,
    },
    CtSwitch {
        subject: Option<Expr>,
        cases: Vec<CtCase<Stmt>>,
    },
    /// `$for (init; cond; step): ... $endfor`
    CtFor {
        init: Option<Condition>,
        cond: Option<Expr>,
        step: Vec<Expr>,
        body: Block,
    },
    /// `$foreach ($i, $v : list): ... $endforeach`
    CtForeach {
        index: Option<String>,
        value: String,
        collection: Expr,
        body: Block,
    },
    CtEcho(Expr),
    CtAssert {
        cond: Expr,
        message: Option<Expr>,
    },
    CtError(Expr),
}

/// A local variable declaration.
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub storage: Option<Storage>,
    /// `None` for `var name = ...`.
    pub ty: Option<TypeExpr>,
    pub name: String,
    pub attrs: Vec<Attribute>,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Static,
    Tlocal,
}

impl Storage {
    pub fn as_str(self) -> &'static str {
        match self {
            Storage::Static => "static",
            Storage::Tlocal => "tlocal",
        }
    }
}

/// Comma list used as the header of `if`, `while`, `switch` and `for`.
#[derive(Debug, Clone)]
pub struct Condition {
    pub items: Vec<CondItem>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum CondItem {
    Expr(Expr),
    Decl(VarDecl),
}

#[derive(Debug, Clone)]
pub struct ForeachVar {
    pub ty: Option<TypeExpr>,
    pub by_ref: bool,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct SwitchCase {
    pub label: CaseLabel,
    /// Statements owned by this case only.
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum CaseLabel {
    /// Value, range `a..b` or type.
    Expr(Expr),
    Default,
}

/// One arm of a compile-time `$switch`, generic over the item kind.
#[derive(Debug, Clone)]
pub struct CtCase<T> {
    /// `None` for `$default`.
    pub label: Option<Expr>,
    pub body: Vec<T>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferKind {
    Plain,
    Try,
    Catch,
}

#[derive(Debug, Clone)]
pub enum NextcaseTarget {
    Expr(Expr),
    Default,
}

#[derive(Debug, Clone)]
pub enum AsmBody {
    /// `asm("...");`
    Text(Expr),
    /// `asm { instr; ... }`
    Block(Vec<AsmInstr>),
}

#[derive(Debug, Clone)]
pub struct AsmInstr {
    /// Mnemonic, possibly dotted (`lock.addq`).
    pub name: String,
    pub operands: Vec<AsmOperand>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum AsmOperand {
    Expr(Expr),
    /// `[base + index * scale + offset]`, kept as the inner expression.
    Address(Expr),
}

impl Stmt {
    pub fn tag(&self) -> &'static str {
        match &self.kind {
            StmtKind::Empty => "empty",
            StmtKind::Expr(_) => "expr_stmt",
            StmtKind::Block(_) => "block",
            StmtKind::Var(_) => "var",
            StmtKind::Const(_) => "const",
            StmtKind::Return(_) => "return",
            StmtKind::If { .. } => "if",
            StmtKind::While { .. } => "while",
            StmtKind::DoWhile { .. } => "do",
            StmtKind::For { .. } => "for",
            StmtKind::Foreach { reverse: false, .. } => "foreach",
            StmtKind::Foreach { reverse: true, .. } => "foreach_r",
            StmtKind::Switch { .. } => "switch",
            StmtKind::Defer { .. } => "defer",
            StmtKind::Break(_) => "break",
            StmtKind::Continue(_) => "continue",
            StmtKind::Nextcase { .. } => "nextcase",
            StmtKind::Asm(_) => "asm",
            StmtKind::Assert { .. } => "assert",
            StmtKind::CtIf { .. } => "$if",
            StmtKind::CtSwitch { .. } => "$switch",
            StmtKind::CtFor { .. } => "$for",
            StmtKind::CtForeach { .. } => "$foreach",
            StmtKind::CtEcho(_) => "$echo",
            StmtKind::CtAssert { .. } => "$assert",
            StmtKind::CtError(_) => "$error",
        }
    }
}

impl CondItem {
    /// The `try`/`catch` binding carried by this item, if any.
    pub fn binding(&self) -> Option<&Binding> {
        match self {
            CondItem::Expr(Expr { kind: crate::expr::ExprKind::Try { binding, .. }, .. })
            | CondItem::Expr(Expr { kind: crate::expr::ExprKind::Catch { binding, .. }, .. }) => {
                binding.as_ref()
            }
            _ => None,
        }
    }
}
