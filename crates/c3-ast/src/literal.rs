// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Decoded literal values.

/// Integer type suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntSuffix {
    /// Bare `u`
    U,
    I8,
    I16,
    I32,
    I64,
    I128,
    U8,
    U16,
    U32,
    U64,
    U128,
}

/// Float type suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatSuffix {
    /// Bare `f`
    F,
    F16,
    F32,
    F64,
    F128,
}

/// Any numeric suffix, as it appears in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericSuffix {
    Int(IntSuffix),
    Float(FloatSuffix),
}

impl NumericSuffix {
    /// Every accepted suffix spelling, longest first within each family so a
    /// linear scan finds the greedy-longest match.
    pub const TABLE: &'static [(&'static str, NumericSuffix)] = &[
        ("i128", NumericSuffix::Int(IntSuffix::I128)),
        ("u128", NumericSuffix::Int(IntSuffix::U128)),
        ("f128", NumericSuffix::Float(FloatSuffix::F128)),
        ("i16", NumericSuffix::Int(IntSuffix::I16)),
        ("i32", NumericSuffix::Int(IntSuffix::I32)),
        ("i64", NumericSuffix::Int(IntSuffix::I64)),
        ("u16", NumericSuffix::Int(IntSuffix::U16)),
        ("u32", NumericSuffix::Int(IntSuffix::U32)),
        ("u64", NumericSuffix::Int(IntSuffix::U64)),
        ("f16", NumericSuffix::Float(FloatSuffix::F16)),
        ("f32", NumericSuffix::Float(FloatSuffix::F32)),
        ("f64", NumericSuffix::Float(FloatSuffix::F64)),
        ("i8", NumericSuffix::Int(IntSuffix::I8)),
        ("u8", NumericSuffix::Int(IntSuffix::U8)),
        ("u", NumericSuffix::Int(IntSuffix::U)),
        ("f", NumericSuffix::Float(FloatSuffix::F)),
    ];

    /// Longest suffix that `text` starts with, and its length.
    pub fn longest_prefix_of(text: &str) -> Option<(NumericSuffix, usize)> {
        Self::TABLE
            .iter()
            .find(|(s, _)| text.starts_with(s))
            .map(|(s, suffix)| (*suffix, s.len()))
    }
}

impl IntSuffix {
    pub fn as_str(self) -> &'static str {
        match self {
            IntSuffix::U => "u",
            IntSuffix::I8 => "i8",
            IntSuffix::I16 => "i16",
            IntSuffix::I32 => "i32",
            IntSuffix::I64 => "i64",
            IntSuffix::I128 => "i128",
            IntSuffix::U8 => "u8",
            IntSuffix::U16 => "u16",
            IntSuffix::U32 => "u32",
            IntSuffix::U64 => "u64",
            IntSuffix::U128 => "u128",
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            IntSuffix::I8 | IntSuffix::I16 | IntSuffix::I32 | IntSuffix::I64 | IntSuffix::I128
        )
    }
}

impl FloatSuffix {
    pub fn as_str(self) -> &'static str {
        match self {
            FloatSuffix::F => "f",
            FloatSuffix::F16 => "f16",
            FloatSuffix::F32 => "f32",
            FloatSuffix::F64 => "f64",
            FloatSuffix::F128 => "f128",
        }
    }

    /// Width in bits; bare `f` means `float`.
    pub fn bits(self) -> u32 {
        match self {
            FloatSuffix::F16 => 16,
            FloatSuffix::F | FloatSuffix::F32 => 32,
            FloatSuffix::F64 => 64,
            FloatSuffix::F128 => 128,
        }
    }
}

/// Radix of an integer body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    Binary,
    Octal,
    Decimal,
    Hex,
}

impl Radix {
    pub fn base(self) -> u32 {
        match self {
            Radix::Binary => 2,
            Radix::Octal => 8,
            Radix::Decimal => 10,
            Radix::Hex => 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntLiteral {
    pub value: u128,
    /// Set when a leading `-` was folded into the literal.
    pub negative: bool,
    pub radix: Radix,
    pub suffix: Option<IntSuffix>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatLiteral {
    pub value: f64,
    pub suffix: Option<FloatSuffix>,
}

/// How a string literal was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringStyle {
    /// `"..."`
    Plain,
    /// `` `...` ``
    Raw,
    /// `"""..."""`
    Multiline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BytesEncoding {
    /// `x"..."`
    Hex,
    /// `b64"..."`
    Base64,
}

/// A literal value together with its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub kind: LiteralKind,
    /// Source text; for concatenated strings, the parts joined by a space.
    pub lexeme: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralKind {
    Bool(bool),
    Null,
    Char(char),
    String { value: String, style: StringStyle },
    Bytes { bytes: Vec<u8>, encoding: BytesEncoding },
    Int(IntLiteral),
    Float(FloatLiteral),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_match_is_greedy() {
        assert_eq!(
            NumericSuffix::longest_prefix_of("i128"),
            Some((NumericSuffix::Int(IntSuffix::I128), 4))
        );
        assert_eq!(
            NumericSuffix::longest_prefix_of("i1"),
            None
        );
        assert_eq!(
            NumericSuffix::longest_prefix_of("u8x"),
            Some((NumericSuffix::Int(IntSuffix::U8), 2))
        );
        assert_eq!(
            NumericSuffix::longest_prefix_of("ux"),
            Some((NumericSuffix::Int(IntSuffix::U), 1))
        );
        assert_eq!(NumericSuffix::longest_prefix_of("x"), None);
    }

    #[test]
    fn float_widths() {
        assert_eq!(FloatSuffix::F.bits(), 32);
        assert_eq!(FloatSuffix::F128.bits(), 128);
        assert!(IntSuffix::I8.is_signed());
        assert!(!IntSuffix::U.is_signed());
    }
}
