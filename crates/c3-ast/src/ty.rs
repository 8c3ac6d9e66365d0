// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type syntax nodes.

use crate::expr::Expr;
use crate::decl::Param;
use crate::{NodeId, Span};

/// Built-in type keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Void,
    Bool,
    Char,
    Ichar,
    Short,
    Ushort,
    Int,
    Uint,
    Long,
    Ulong,
    Int128,
    Uint128,
    Float,
    Double,
    Float16,
    Bfloat16,
    Float128,
    Iptr,
    Uptr,
    Isz,
    Usz,
    Anyfault,
    Any,
    Typeid,
}

impl PrimitiveType {
    pub const ALL: &'static [PrimitiveType] = &[
        PrimitiveType::Void,
        PrimitiveType::Bool,
        PrimitiveType::Char,
        PrimitiveType::Ichar,
        PrimitiveType::Short,
        PrimitiveType::Ushort,
        PrimitiveType::Int,
        PrimitiveType::Uint,
        PrimitiveType::Long,
        PrimitiveType::Ulong,
        PrimitiveType::Int128,
        PrimitiveType::Uint128,
        PrimitiveType::Float,
        PrimitiveType::Double,
        PrimitiveType::Float16,
        PrimitiveType::Bfloat16,
        PrimitiveType::Float128,
        PrimitiveType::Iptr,
        PrimitiveType::Uptr,
        PrimitiveType::Isz,
        PrimitiveType::Usz,
        PrimitiveType::Anyfault,
        PrimitiveType::Any,
        PrimitiveType::Typeid,
    ];

    pub fn from_word(word: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.as_str() == word)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveType::Void => "void",
            PrimitiveType::Bool => "bool",
            PrimitiveType::Char => "char",
            PrimitiveType::Ichar => "ichar",
            PrimitiveType::Short => "short",
            PrimitiveType::Ushort => "ushort",
            PrimitiveType::Int => "int",
            PrimitiveType::Uint => "uint",
            PrimitiveType::Long => "long",
            PrimitiveType::Ulong => "ulong",
            PrimitiveType::Int128 => "int128",
            PrimitiveType::Uint128 => "uint128",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Float16 => "float16",
            PrimitiveType::Bfloat16 => "bfloat16",
            PrimitiveType::Float128 => "float128",
            PrimitiveType::Iptr => "iptr",
            PrimitiveType::Uptr => "uptr",
            PrimitiveType::Isz => "isz",
            PrimitiveType::Usz => "usz",
            PrimitiveType::Anyfault => "anyfault",
            PrimitiveType::Any => "any",
            PrimitiveType::Typeid => "typeid",
        }
    }
}

/// A type as written in source.
#[derive(Debug, Clone)]
pub struct TypeExpr {
    pub id: NodeId,
    pub kind: TypeKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum TypeKind {
    Primitive(PrimitiveType),
    /// `Foo`, `std::io::File`, `List(<int>)`
    Named {
        path: Vec<String>,
        name: String,
        generic_args: Option<Vec<Expr>>,
    },
    /// `$Type`
    CtType(String),
    /// `$typeof(e)`, `$typefrom(e)`, `$vatype(e)`, `$evaltype(e)`
    CtTypeCall { func: CtTypeFunc, arg: Box<Expr> },
    Pointer(Box<TypeExpr>),
    Array { elem: Box<TypeExpr>, len: ArrayLen },
    Vector { elem: Box<TypeExpr>, len: VectorLen },
    /// `T!`
    Optional(Box<TypeExpr>),
    /// `fn Ret(params)`, only valid on the right of `def`.
    Func { ret: Box<TypeExpr>, params: Vec<Param> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtTypeFunc {
    Typeof,
    Typefrom,
    Vatype,
    Evaltype,
}

impl CtTypeFunc {
    pub fn as_str(self) -> &'static str {
        match self {
            CtTypeFunc::Typeof => "$typeof",
            CtTypeFunc::Typefrom => "$typefrom",
            CtTypeFunc::Vatype => "$vatype",
            CtTypeFunc::Evaltype => "$evaltype",
        }
    }
}

#[derive(Debug, Clone)]
pub enum ArrayLen {
    /// `[N]`
    Fixed(Box<Expr>),
    /// `[]`
    Slice,
    /// `[*]`
    Inferred,
}

#[derive(Debug, Clone)]
pub enum VectorLen {
    /// `[<N>]`
    Fixed(Box<Expr>),
    /// `[<*>]`
    Inferred,
}

impl TypeExpr {
    /// True when the outermost wrapper is `!`.
    pub fn is_optional(&self) -> bool {
        matches!(self.kind, TypeKind::Optional(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_table_round_trips() {
        for p in PrimitiveType::ALL {
            assert_eq!(PrimitiveType::from_word(p.as_str()), Some(*p));
        }
        assert_eq!(PrimitiveType::from_word("integer"), None);
    }
}
