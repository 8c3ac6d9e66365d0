// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Token definitions for the lexer.

use crate::literal::{BytesEncoding, FloatLiteral, IntLiteral, StringStyle};
use crate::ty::PrimitiveType;
use crate::Span;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// Source text of the token, exactly as written.
    pub lexeme: String,
}

/// Builds a keyword enum together with its lookup table.
macro_rules! keyword_table {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            pub fn from_word(word: &str) -> Option<Self> {
                match word {
                    $($text => Some($name::$variant),)*
                    _ => None,
                }
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),*
                }
            }
        }
    };
}

keyword_table! {
    /// Reserved words.
    Keyword {
        Asm => "asm",
        Assert => "assert",
        Bitstruct => "bitstruct",
        Break => "break",
        Case => "case",
        Catch => "catch",
        Const => "const",
        Continue => "continue",
        Def => "def",
        Default => "default",
        Defer => "defer",
        Distinct => "distinct",
        Do => "do",
        Else => "else",
        Enum => "enum",
        Extern => "extern",
        False => "false",
        Fault => "fault",
        Fn => "fn",
        For => "for",
        Foreach => "foreach",
        ForeachR => "foreach_r",
        If => "if",
        Import => "import",
        Inline => "inline",
        Interface => "interface",
        Macro => "macro",
        Module => "module",
        Nextcase => "nextcase",
        Null => "null",
        Return => "return",
        Static => "static",
        Struct => "struct",
        Switch => "switch",
        Tlocal => "tlocal",
        True => "true",
        Try => "try",
        Union => "union",
        Var => "var",
        While => "while",
    }
}

keyword_table! {
    /// `$`-prefixed compile-time keywords.
    CtKeyword {
        Alignof => "$alignof",
        And => "$and",
        Assert => "$assert",
        Assignable => "$assignable",
        Case => "$case",
        Default => "$default",
        Defined => "$defined",
        Echo => "$echo",
        Else => "$else",
        Endfor => "$endfor",
        Endforeach => "$endforeach",
        Endif => "$endif",
        Endswitch => "$endswitch",
        Error => "$error",
        Eval => "$eval",
        Evaltype => "$evaltype",
        Extnameof => "$extnameof",
        Feature => "$feature",
        For => "$for",
        Foreach => "$foreach",
        If => "$if",
        Include => "$include",
        IsConst => "$is_const",
        Nameof => "$nameof",
        Offsetof => "$offsetof",
        Qnameof => "$qnameof",
        Sizeof => "$sizeof",
        Stringify => "$stringify",
        Switch => "$switch",
        Typefrom => "$typefrom",
        Typeof => "$typeof",
        Vaarg => "$vaarg",
        Vaconst => "$vaconst",
        Vacount => "$vacount",
        Varef => "$varef",
        Vaexpr => "$vaexpr",
        Vasplat => "$vasplat",
        Vatype => "$vatype",
    }
}

/// Lexical shape of a bare word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentClass {
    /// `foo`, `_foo`, `foo_Bar`
    Ident,
    /// `Foo`, `_FooBar`
    Type,
    /// `FOO`, `_FOO_2`
    Const,
}

/// Classify a word by its shape alone.
///
/// Leading underscores are ignored; an uppercase-initial remainder is a
/// constant when it has no lowercase letters and a type name otherwise.
pub fn classify_word(word: &str) -> IdentClass {
    let rest = word.trim_start_matches('_');
    match rest.chars().next() {
        Some(c) if c.is_ascii_uppercase() => {
            if rest.chars().any(|c| c.is_ascii_lowercase()) {
                IdentClass::Type
            } else {
                IdentClass::Const
            }
        }
        _ => IdentClass::Ident,
    }
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Identifiers
    Ident(String),
    TypeIdent(String),
    ConstIdent(String),
    /// `@foo`
    AtIdent(String),
    /// `@Foo`
    AtTypeIdent(String),
    /// `$foo`
    CtIdent(String),
    /// `$FOO`
    CtConstIdent(String),
    /// `$Foo`
    CtTypeIdent(String),
    /// `#foo`
    HashIdent(String),
    /// `$$`
    Builtin,

    // Keywords
    Kw(Keyword),
    CtKw(CtKeyword),
    Primitive(PrimitiveType),

    // Literals
    Int(IntLiteral),
    Float(FloatLiteral),
    Char(char),
    String(String, StringStyle),
    Bytes(Vec<u8>, BytesEncoding),

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    LBraceBar,  // {|
    BarRBrace,  // |}
    LVec,       // [<
    RVec,       // >]
    LGen,       // (<
    RGen,       // >)
    Comma,
    Semi,
    Colon,
    ColonColon,
    Dot,
    DotDot,
    Ellipsis,

    // Operators
    Eq,
    EqEq,
    BangEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,
    Amp,
    AmpAmp,
    Pipe,
    PipePipe,
    Caret,
    Tilde,
    Bang,
    BangBang,
    Question,
    Elvis,             // ?:
    QuestionQuestion,  // ??
    FatArrow,
    LtLt,
    GtGt,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,
    LtLtEq,
    GtGtEq,

    Eof,
}

impl TokenKind {
    pub fn is_kw(&self, kw: Keyword) -> bool {
        matches!(self, TokenKind::Kw(k) if *k == kw)
    }

    pub fn is_ct_kw(&self, kw: CtKeyword) -> bool {
        matches!(self, TokenKind::CtKw(k) if *k == kw)
    }

    /// Punctuation text, if this is a fixed punctuation token.
    pub fn punct_str(&self) -> Option<&'static str> {
        Some(match self {
            TokenKind::Builtin => "$$",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBraceBar => "{|",
            TokenKind::BarRBrace => "|}",
            TokenKind::LVec => "[<",
            TokenKind::RVec => ">]",
            TokenKind::LGen => "(<",
            TokenKind::RGen => ">)",
            TokenKind::Comma => ",",
            TokenKind::Semi => ";",
            TokenKind::Colon => ":",
            TokenKind::ColonColon => "::",
            TokenKind::Dot => ".",
            TokenKind::DotDot => "..",
            TokenKind::Ellipsis => "...",
            TokenKind::Eq => "=",
            TokenKind::EqEq => "==",
            TokenKind::BangEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::LtEq => "<=",
            TokenKind::GtEq => ">=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::Amp => "&",
            TokenKind::AmpAmp => "&&",
            TokenKind::Pipe => "|",
            TokenKind::PipePipe => "||",
            TokenKind::Caret => "^",
            TokenKind::Tilde => "~",
            TokenKind::Bang => "!",
            TokenKind::BangBang => "!!",
            TokenKind::Question => "?",
            TokenKind::Elvis => "?:",
            TokenKind::QuestionQuestion => "??",
            TokenKind::FatArrow => "=>",
            TokenKind::LtLt => "<<",
            TokenKind::GtGt => ">>",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::StarEq => "*=",
            TokenKind::SlashEq => "/=",
            TokenKind::PercentEq => "%=",
            TokenKind::AmpEq => "&=",
            TokenKind::PipeEq => "|=",
            TokenKind::CaretEq => "^=",
            TokenKind::LtLtEq => "<<=",
            TokenKind::GtGtEq => ">>=",
            _ => return None,
        })
    }

    /// Returns a human-readable name for this token kind.
    pub fn display_name(&self) -> String {
        if let Some(p) = self.punct_str() {
            return format!("'{}'", p);
        }
        match self {
            TokenKind::Ident(name) => format!("identifier '{}'", name),
            TokenKind::TypeIdent(name) => format!("type name '{}'", name),
            TokenKind::ConstIdent(name) => format!("constant '{}'", name),
            TokenKind::AtIdent(name) | TokenKind::AtTypeIdent(name) => format!("attribute '{}'", name),
            TokenKind::CtIdent(name) | TokenKind::CtConstIdent(name) | TokenKind::CtTypeIdent(name) => {
                format!("compile-time name '{}'", name)
            }
            TokenKind::HashIdent(name) => format!("'{}'", name),
            TokenKind::Kw(kw) => format!("'{}'", kw.as_str()),
            TokenKind::CtKw(kw) => format!("'{}'", kw.as_str()),
            TokenKind::Primitive(p) => format!("'{}'", p.as_str()),
            TokenKind::Int(_) => "integer literal".to_string(),
            TokenKind::Float(_) => "float literal".to_string(),
            TokenKind::Char(_) => "character literal".to_string(),
            TokenKind::String(..) => "string literal".to_string(),
            TokenKind::Bytes(..) => "byte literal".to_string(),
            TokenKind::Eof => "end of file".to_string(),
            _ => "token".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_shapes() {
        assert_eq!(classify_word("foo"), IdentClass::Ident);
        assert_eq!(classify_word("_"), IdentClass::Ident);
        assert_eq!(classify_word("_foo"), IdentClass::Ident);
        assert_eq!(classify_word("foo_Bar"), IdentClass::Ident);
        assert_eq!(classify_word("Foo"), IdentClass::Type);
        assert_eq!(classify_word("_FooBar"), IdentClass::Type);
        assert_eq!(classify_word("FOO"), IdentClass::Const);
        assert_eq!(classify_word("T"), IdentClass::Const);
        assert_eq!(classify_word("__MAX_2"), IdentClass::Const);
    }

    #[test]
    fn keyword_tables_round_trip() {
        for kw in Keyword::ALL {
            assert_eq!(Keyword::from_word(kw.as_str()), Some(*kw));
        }
        for kw in CtKeyword::ALL {
            assert_eq!(CtKeyword::from_word(kw.as_str()), Some(*kw));
            assert!(kw.as_str().starts_with('$'));
        }
        assert_eq!(Keyword::from_word("fnord"), None);
    }
}
