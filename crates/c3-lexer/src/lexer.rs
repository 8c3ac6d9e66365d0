// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The lexer implementation using logos.

use std::ops::Range;

use c3_ast::doc::DocComment;
use c3_ast::literal::{
    BytesEncoding, FloatLiteral, IntLiteral, NumericSuffix, Radix, StringStyle,
};
use c3_ast::token::{classify_word, CtKeyword, IdentClass, Keyword, Token, TokenKind};
use c3_ast::ty::PrimitiveType;
use c3_ast::{ColumnCursor, LineMap, Span};
use logos::Logos;
use thiserror::Error;

/// Side channel filled by the logos callbacks.
#[derive(Default)]
struct Extras {
    errors: Vec<(LexErrorKind, Range<usize>)>,
    comments: Vec<Range<usize>>,
    docs: Vec<Range<usize>>,
}

impl Extras {
    fn error(&mut self, kind: LexErrorKind, range: Range<usize>) {
        self.errors.push((kind, range));
    }
}

#[derive(Debug, Clone, PartialEq)]
enum NumberValue {
    Int(IntLiteral),
    Float(FloatLiteral),
}

/// Raw token type for logos - words and punctuation are mapped to
/// `TokenKind` in a second pass, literals are decoded by callbacks.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(extras = Extras)]
#[logos(skip r"([ \t\r\n\f]|\\\r?\n)+")]
enum RawToken {
    // === Words ===
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Word,
    #[regex(r"\$[a-zA-Z_][a-zA-Z0-9_]*")]
    CtWord,
    #[regex(r"@[a-zA-Z_][a-zA-Z0-9_]*")]
    AtWord,
    #[regex(r"#[a-zA-Z_][a-zA-Z0-9_]*")]
    HashWord,
    #[token("$$")]
    Builtin,

    // === Trivia ===
    #[token("//", line_comment)]
    LineComment,
    #[token("/*", block_comment)]
    BlockComment,
    #[token("<*", doc_comment)]
    DocBlock,

    // === Literals ===
    #[regex(r"[0-9]", lex_number)]
    Number(NumberValue),
    #[token("'", lex_char)]
    Char(char),
    #[token("\"", lex_string)]
    Str(String),
    #[token("\"\"\"", lex_multiline_string)]
    MultilineStr(String),
    #[token("`", lex_raw_string)]
    RawStr(String),
    #[token("x\"", lex_hex_bytes)]
    HexBytes(Vec<u8>),
    #[token("b64\"", lex_base64_bytes)]
    Base64Bytes(Vec<u8>),

    // === Operators (longest match wins) ===
    #[token("...")]
    Ellipsis,
    #[token("<<=")]
    LtLtEq,
    #[token(">>=")]
    GtGtEq,
    #[token("{|")]
    LBraceBar,
    #[token("|}")]
    BarRBrace,
    #[token("[<")]
    LVec,
    #[token(">]")]
    RVec,
    #[token("(<")]
    LGen,
    #[token(">)")]
    RGen,
    #[token("::")]
    ColonColon,
    #[token("..")]
    DotDot,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("!!")]
    BangBang,
    #[token("?:")]
    Elvis,
    #[token("??")]
    QuestionQuestion,
    #[token("=>")]
    FatArrow,
    #[token("<<")]
    LtLt,
    #[token(">>")]
    GtGt,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("!")]
    Bang,
    #[token("?")]
    Question,
}

// ---------------------------------------------------------------------------
// Trivia callbacks
// ---------------------------------------------------------------------------

/// `//` runs to the end of the line; a backslash escapes the next character,
/// newline included.
fn line_comment(lex: &mut logos::Lexer<RawToken>) -> logos::Skip {
    let rest = lex.remainder();
    let mut chars = rest.char_indices();
    let mut end = rest.len();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                if let Some((_, '\r')) = chars.next() {
                    chars.next();
                }
            }
            '\n' => {
                end = i;
                break;
            }
            _ => {}
        }
    }
    lex.bump(end);
    let span = lex.span();
    lex.extras.comments.push(span);
    logos::Skip
}

/// `/* ... */`; the first `*/` closes, nesting is not tracked.
fn block_comment(lex: &mut logos::Lexer<RawToken>) -> logos::Skip {
    let rest = lex.remainder();
    match rest.find("*/") {
        Some(i) => lex.bump(i + 2),
        None => {
            let len = rest.len();
            lex.bump(len);
            let span = lex.span();
            lex.extras.error(LexErrorKind::UnterminatedLiteral("block comment"), span);
        }
    }
    let span = lex.span();
    lex.extras.comments.push(span);
    logos::Skip
}

fn doc_comment(lex: &mut logos::Lexer<RawToken>) -> logos::Skip {
    let rest = lex.remainder();
    match rest.find("*>") {
        Some(i) => {
            lex.bump(i + 2);
            let span = lex.span();
            lex.extras.docs.push(span);
        }
        None => {
            let len = rest.len();
            lex.bump(len);
            let span = lex.span();
            lex.extras.error(LexErrorKind::UnterminatedLiteral("doc comment"), span);
        }
    }
    logos::Skip
}

// ---------------------------------------------------------------------------
// Literal callbacks
// ---------------------------------------------------------------------------

fn lex_number(lex: &mut logos::Lexer<RawToken>) -> NumberValue {
    let start = lex.span().start;
    let scan = scan_number(&lex.source()[start..]);
    // the first digit is already part of the match
    lex.bump(scan.len - 1);
    if let Some(kind) = scan.error {
        lex.extras.error(kind, start..start + scan.len);
    }
    scan.value
}

fn lex_char(lex: &mut logos::Lexer<RawToken>) -> char {
    let start = lex.span().start;
    let rest = lex.remainder();
    let mut chars = rest.chars();
    let (value, used) = match chars.next() {
        Some('\\') => {
            let (decoded, len) = scan_escape(&rest[1..]);
            if decoded.is_none() {
                lex.extras.error(LexErrorKind::InvalidEscape, start + 1..start + 2 + len);
            }
            (decoded.unwrap_or('\0'), 1 + len)
        }
        Some(c) if c != '\'' && c != '\n' => (c, c.len_utf8()),
        _ => ('\0', 0),
    };
    if rest[used..].starts_with('\'') {
        lex.bump(used + 1);
    } else {
        lex.bump(used);
        let span = lex.span();
        lex.extras.error(LexErrorKind::UnterminatedLiteral("character literal"), span);
    }
    value
}

fn lex_string(lex: &mut logos::Lexer<RawToken>) -> String {
    let start = lex.span().end;
    let rest = lex.remainder();
    let mut out = String::new();
    let mut i = 0;
    let mut closed = false;
    while let Some(c) = rest[i..].chars().next() {
        match c {
            '"' => {
                i += 1;
                closed = true;
                break;
            }
            '\n' => break,
            '\\' => {
                let (decoded, len) = scan_escape(&rest[i + 1..]);
                match decoded {
                    Some(ch) => out.push(ch),
                    None => lex
                        .extras
                        .error(LexErrorKind::InvalidEscape, start + i..start + i + 1 + len),
                }
                i += 1 + len;
            }
            c => {
                out.push(c);
                i += c.len_utf8();
            }
        }
    }
    lex.bump(i);
    if !closed {
        let span = lex.span();
        lex.extras.error(LexErrorKind::UnterminatedLiteral("string literal"), span);
    }
    out
}

fn lex_multiline_string(lex: &mut logos::Lexer<RawToken>) -> String {
    let start = lex.span().end;
    let rest = lex.remainder();
    let mut out = String::new();
    let mut i = 0;
    let mut closed = false;
    while let Some(c) = rest[i..].chars().next() {
        if rest[i..].starts_with("\"\"\"") {
            i += 3;
            closed = true;
            break;
        }
        if c == '\\' {
            let (decoded, len) = scan_escape(&rest[i + 1..]);
            match decoded {
                Some(ch) => out.push(ch),
                None => lex
                    .extras
                    .error(LexErrorKind::InvalidEscape, start + i..start + i + 1 + len),
            }
            i += 1 + len;
        } else {
            out.push(c);
            i += c.len_utf8();
        }
    }
    lex.bump(i);
    if !closed {
        let span = lex.span();
        lex.extras.error(LexErrorKind::UnterminatedLiteral("multiline string"), span);
    }
    out
}

/// Raw strings have no escapes; a doubled backtick stands for one.
fn lex_raw_string(lex: &mut logos::Lexer<RawToken>) -> String {
    let rest = lex.remainder();
    let mut out = String::new();
    let mut i = 0;
    let mut closed = false;
    while let Some(c) = rest[i..].chars().next() {
        if c == '`' {
            if rest[i + 1..].starts_with('`') {
                out.push('`');
                i += 2;
                continue;
            }
            i += 1;
            closed = true;
            break;
        }
        out.push(c);
        i += c.len_utf8();
    }
    lex.bump(i);
    if !closed {
        let span = lex.span();
        lex.extras.error(LexErrorKind::UnterminatedLiteral("raw string"), span);
    }
    out
}

/// Collect the body of `x"..."` / `b64"..."` up to the closing quote,
/// reporting characters outside `allowed`.
fn scan_byte_body(
    lex: &mut logos::Lexer<RawToken>,
    allowed: fn(char) -> bool,
    what: &'static str,
) -> Vec<char> {
    let start = lex.span().end;
    let rest = lex.remainder();
    let mut digits = Vec::new();
    let mut i = 0;
    let mut closed = false;
    while let Some(c) = rest[i..].chars().next() {
        if c == '"' {
            i += 1;
            closed = true;
            break;
        }
        if allowed(c) {
            digits.push(c);
        } else if !c.is_whitespace() {
            lex.extras.error(
                LexErrorKind::InvalidCharacter(c),
                start + i..start + i + c.len_utf8(),
            );
        }
        i += c.len_utf8();
    }
    lex.bump(i);
    if !closed {
        let span = lex.span();
        lex.extras.error(LexErrorKind::UnterminatedLiteral(what), span);
    }
    digits
}

fn lex_hex_bytes(lex: &mut logos::Lexer<RawToken>) -> Vec<u8> {
    let digits = scan_byte_body(lex, |c| c.is_ascii_hexdigit(), "hex literal");
    if digits.len() % 2 != 0 {
        let span = lex.span();
        lex.extras.error(LexErrorKind::MalformedNumber, span);
    }
    digits
        .chunks(2)
        .map(|pair| {
            let hi = pair[0].to_digit(16).unwrap_or(0);
            let lo = pair.get(1).and_then(|c| c.to_digit(16)).unwrap_or(0);
            (hi * 16 + lo) as u8
        })
        .collect()
}

fn lex_base64_bytes(lex: &mut logos::Lexer<RawToken>) -> Vec<u8> {
    let digits = scan_byte_body(
        lex,
        |c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '=',
        "base64 literal",
    );
    decode_base64(&digits)
}

fn base64_value(c: char) -> Option<u32> {
    match c {
        'A'..='Z' => Some(c as u32 - 'A' as u32),
        'a'..='z' => Some(c as u32 - 'a' as u32 + 26),
        '0'..='9' => Some(c as u32 - '0' as u32 + 52),
        '+' => Some(62),
        '/' => Some(63),
        _ => None,
    }
}

/// Decode base64 digits; decoding stops at the first `=`.
fn decode_base64(digits: &[char]) -> Vec<u8> {
    let mut out = Vec::with_capacity(digits.len() * 3 / 4);
    let mut acc: u32 = 0;
    let mut bits = 0;
    for &c in digits {
        let Some(v) = base64_value(c) else { break };
        acc = (acc << 6) | v;
        bits += 6;
        if bits >= 8 {
            bits -= 8;
            out.push((acc >> bits) as u8);
            acc &= (1 << bits) - 1;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Escapes and numbers
// ---------------------------------------------------------------------------

/// Decode the escape that follows a backslash. Returns the character (or
/// `None` when malformed) and the number of bytes consumed after the `\`.
fn scan_escape(rest: &str) -> (Option<char>, usize) {
    let Some(c) = rest.chars().next() else {
        return (None, 0);
    };
    let width = match c {
        'x' => 2,
        'u' => 4,
        'U' => 8,
        '0'..='9' => {
            let digits = rest.bytes().take(3).take_while(u8::is_ascii_digit).count();
            if digits >= 2 {
                let value = rest[..digits].parse::<u32>().ok().and_then(char::from_u32);
                return (value, digits);
            }
            return (Some(if c == '0' { '\0' } else { c }), 1);
        }
        'n' => return (Some('\n'), 1),
        't' => return (Some('\t'), 1),
        'r' => return (Some('\r'), 1),
        'a' => return (Some('\x07'), 1),
        'b' => return (Some('\x08'), 1),
        'e' => return (Some('\x1b'), 1),
        'f' => return (Some('\x0c'), 1),
        'v' => return (Some('\x0b'), 1),
        other => return (Some(other), other.len_utf8()),
    };
    let body: String = rest[1..].chars().take(width).collect();
    if body.chars().count() != width || !body.chars().all(|d| d.is_ascii_hexdigit() || d == '_') {
        return (None, 1);
    }
    let cleaned: String = body.chars().filter(|d| *d != '_').collect();
    let value = u32::from_str_radix(&cleaned, 16).ok().and_then(char::from_u32);
    (value, 1 + width)
}

struct NumberScan {
    value: NumberValue,
    len: usize,
    error: Option<LexErrorKind>,
}

fn digits_value(digits: &str, base: u32) -> Option<u128> {
    digits.chars().filter(|c| *c != '_').try_fold(0u128, |acc, c| {
        let d = c.to_digit(base)?;
        acc.checked_mul(base as u128)?.checked_add(d as u128)
    })
}

/// Scan a numeric literal at the start of `text`, suffix included.
fn scan_number(text: &str) -> NumberScan {
    let b = text.as_bytes();
    let (radix, prefix) = match (b.first(), b.get(1)) {
        (Some(b'0'), Some(b'x')) => (Radix::Hex, 2),
        (Some(b'0'), Some(b'o')) => (Radix::Octal, 2),
        (Some(b'0'), Some(b'b')) => (Radix::Binary, 2),
        _ => (Radix::Decimal, 0),
    };
    let base = radix.base();
    let is_digit = |c: &u8| (*c as char).is_digit(base);
    let allows_float = matches!(radix, Radix::Decimal | Radix::Hex);

    let mut i = prefix;
    while b.get(i).is_some_and(|c| is_digit(c) || *c == b'_') {
        i += 1;
    }
    let int_digits = &text[prefix..i];

    let mut frac_digits = "";
    if allows_float && b.get(i) == Some(&b'.') && b.get(i + 1).is_some_and(is_digit) {
        let frac_start = i + 1;
        i = frac_start;
        while b.get(i).is_some_and(|c| is_digit(c) || *c == b'_') {
            i += 1;
        }
        frac_digits = &text[frac_start..i];
    }

    let mut exponent: Option<&str> = None;
    let markers: &[u8] = if radix == Radix::Hex { b"pP" } else { b"eE" };
    if allows_float && b.get(i).is_some_and(|c| markers.contains(c)) {
        let mut j = i + 1;
        if matches!(b.get(j), Some(b'+') | Some(b'-')) {
            j += 1;
        }
        if b.get(j).is_some_and(u8::is_ascii_digit) {
            while b.get(j).is_some_and(u8::is_ascii_digit) {
                j += 1;
            }
            exponent = Some(&text[i + 1..j]);
            i = j;
        }
    }
    let body_len = i;
    let is_float_body = !frac_digits.is_empty() || exponent.is_some();

    let (suffix, suffix_len) = match NumericSuffix::longest_prefix_of(&text[i..]) {
        Some((s, n)) => (Some(s), n),
        None => (None, 0),
    };
    let len = body_len + suffix_len;

    let mut error = None;
    if int_digits.chars().all(|c| c == '_') {
        error = Some(LexErrorKind::MalformedNumber);
    }

    let float_value = |error: &mut Option<LexErrorKind>| -> f64 {
        if radix == Radix::Hex {
            let mantissa = digits_value(int_digits, 16).unwrap_or(0) as f64;
            let mut scale = 1.0 / 16.0;
            let mut frac = 0.0;
            for c in frac_digits.chars().filter(|c| *c != '_') {
                frac += c.to_digit(16).unwrap_or(0) as f64 * scale;
                scale /= 16.0;
            }
            let exp = exponent.and_then(|e| e.parse::<i32>().ok()).unwrap_or(0);
            (mantissa + frac) * 2f64.powi(exp)
        } else {
            let cleaned: String = text[..body_len].chars().filter(|c| *c != '_').collect();
            match cleaned.parse::<f64>() {
                Ok(v) => v,
                Err(_) => {
                    *error = Some(LexErrorKind::MalformedNumber);
                    0.0
                }
            }
        }
    };

    let value = match (is_float_body, suffix) {
        (false, None) | (false, Some(NumericSuffix::Int(_))) => {
            let value = match digits_value(int_digits, base) {
                Some(v) => v,
                None => {
                    error = Some(LexErrorKind::MalformedNumber);
                    0
                }
            };
            let suffix = match suffix {
                Some(NumericSuffix::Int(s)) => Some(s),
                _ => None,
            };
            NumberValue::Int(IntLiteral { value, negative: false, radix, suffix })
        }
        (_, Some(NumericSuffix::Float(s))) => NumberValue::Float(FloatLiteral {
            value: float_value(&mut error),
            suffix: Some(s),
        }),
        (true, None) => NumberValue::Float(FloatLiteral { value: float_value(&mut error), suffix: None }),
        (true, Some(NumericSuffix::Int(s))) => {
            let value = float_value(&mut error);
            error = Some(LexErrorKind::InvalidNumericSuffix(s.as_str().to_string()));
            NumberValue::Float(FloatLiteral { value, suffix: None })
        }
    };

    NumberScan { value, len, error }
}

// ---------------------------------------------------------------------------
// Word classification
// ---------------------------------------------------------------------------

fn classify_plain_word(word: &str) -> TokenKind {
    if word == "define" {
        return TokenKind::Kw(Keyword::Def);
    }
    if let Some(kw) = Keyword::from_word(word) {
        return TokenKind::Kw(kw);
    }
    if let Some(p) = PrimitiveType::from_word(word) {
        return TokenKind::Primitive(p);
    }
    match classify_word(word) {
        IdentClass::Ident => TokenKind::Ident(word.to_string()),
        IdentClass::Type => TokenKind::TypeIdent(word.to_string()),
        IdentClass::Const => TokenKind::ConstIdent(word.to_string()),
    }
}

fn classify_ct_word(word: &str) -> TokenKind {
    if let Some(kw) = CtKeyword::from_word(word) {
        return TokenKind::CtKw(kw);
    }
    match classify_word(&word[1..]) {
        IdentClass::Ident => TokenKind::CtIdent(word.to_string()),
        IdentClass::Type => TokenKind::CtTypeIdent(word.to_string()),
        IdentClass::Const => TokenKind::CtConstIdent(word.to_string()),
    }
}

fn classify_at_word(word: &str) -> TokenKind {
    match classify_word(&word[1..]) {
        IdentClass::Ident => TokenKind::AtIdent(word.to_string()),
        IdentClass::Type | IdentClass::Const => TokenKind::AtTypeIdent(word.to_string()),
    }
}

/// Whether a token can end an operand, so that a following sign is binary.
fn ends_operand(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Ident(_)
            | TokenKind::TypeIdent(_)
            | TokenKind::ConstIdent(_)
            | TokenKind::AtIdent(_)
            | TokenKind::AtTypeIdent(_)
            | TokenKind::CtIdent(_)
            | TokenKind::CtConstIdent(_)
            | TokenKind::CtTypeIdent(_)
            | TokenKind::HashIdent(_)
            | TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Char(_)
            | TokenKind::String(..)
            | TokenKind::Bytes(..)
            | TokenKind::Primitive(_)
            | TokenKind::RParen
            | TokenKind::RBracket
            | TokenKind::RBrace
            | TokenKind::BarRBrace
            | TokenKind::RGen
            | TokenKind::RVec
            | TokenKind::PlusPlus
            | TokenKind::MinusMinus
            | TokenKind::Bang
            | TokenKind::BangBang
            | TokenKind::Kw(Keyword::True)
            | TokenKind::Kw(Keyword::False)
            | TokenKind::Kw(Keyword::Null)
            | TokenKind::CtKw(CtKeyword::Vacount)
    )
}

// ---------------------------------------------------------------------------
// Public interface
// ---------------------------------------------------------------------------

/// The lexer for C3 source code.
pub struct Lexer<'a> {
    source: &'a str,
    tab_width: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self { source, tab_width: 4 }
    }

    /// Columns advance to the next multiple of `tab_width` at a tab.
    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width;
        self
    }

    /// Tokenize the entire source, collecting every error.
    pub fn tokenize(&mut self) -> LexResult {
        let lines = LineMap::new(self.source);
        let mut cursor = ColumnCursor::new(&lines, self.source, self.tab_width);

        let mut tokens: Vec<Token> = Vec::new();
        let mut errors: Vec<LexError> = Vec::new();
        let mut raw = RawToken::lexer(self.source);

        while let Some(result) = raw.next() {
            let range = raw.span();
            let slice = raw.slice();
            let kind = match result {
                Ok(tok) => convert_token(tok, slice),
                Err(()) => {
                    let ch = self.source[range.start..].chars().next().unwrap_or('?');
                    errors.push(LexError {
                        kind: LexErrorKind::InvalidCharacter(ch),
                        span: span_at(&mut cursor, &range),
                    });
                    continue;
                }
            };
            tokens.push(Token {
                kind,
                span: span_at(&mut cursor, &range),
                lexeme: slice.to_string(),
            });
        }

        let extras = std::mem::take(&mut raw.extras);
        errors.extend(extras.errors.iter().map(|(kind, range)| LexError {
            kind: kind.clone(),
            span: span_at(&mut cursor, range),
        }));
        errors.sort_by_key(|e| e.span.start);

        let end = self.source.len();
        tokens.push(Token {
            kind: TokenKind::Eof,
            span: span_at(&mut cursor, &(end..end)),
            lexeme: String::new(),
        });

        let docs = extras
            .docs
            .iter()
            .map(|range| DocComment::parse(&self.source[range.clone()], span_at(&mut cursor, range)))
            .collect();

        LexResult {
            tokens: fold_signs(tokens),
            errors,
            comments: extras.comments.iter().map(|range| span_at(&mut cursor, range)).collect(),
            docs,
        }
    }
}

fn span_at(cursor: &mut ColumnCursor<'_>, range: &Range<usize>) -> Span {
    let (line, col) = cursor.line_col(range.start);
    Span::new(range.start, range.end, line, col)
}

/// Convert a raw logos token to our TokenKind.
fn convert_token(raw: RawToken, slice: &str) -> TokenKind {
    match raw {
        RawToken::Word => classify_plain_word(slice),
        RawToken::CtWord => classify_ct_word(slice),
        RawToken::AtWord => classify_at_word(slice),
        RawToken::HashWord => TokenKind::HashIdent(slice.to_string()),
        RawToken::Builtin => TokenKind::Builtin,

        RawToken::Number(NumberValue::Int(v)) => TokenKind::Int(v),
        RawToken::Number(NumberValue::Float(v)) => TokenKind::Float(v),
        RawToken::Char(c) => TokenKind::Char(c),
        RawToken::Str(s) => TokenKind::String(s, StringStyle::Plain),
        RawToken::MultilineStr(s) => TokenKind::String(s, StringStyle::Multiline),
        RawToken::RawStr(s) => TokenKind::String(s, StringStyle::Raw),
        RawToken::HexBytes(b) => TokenKind::Bytes(b, BytesEncoding::Hex),
        RawToken::Base64Bytes(b) => TokenKind::Bytes(b, BytesEncoding::Base64),

        RawToken::Ellipsis => TokenKind::Ellipsis,
        RawToken::LtLtEq => TokenKind::LtLtEq,
        RawToken::GtGtEq => TokenKind::GtGtEq,
        RawToken::LBraceBar => TokenKind::LBraceBar,
        RawToken::BarRBrace => TokenKind::BarRBrace,
        RawToken::LVec => TokenKind::LVec,
        RawToken::RVec => TokenKind::RVec,
        RawToken::LGen => TokenKind::LGen,
        RawToken::RGen => TokenKind::RGen,
        RawToken::ColonColon => TokenKind::ColonColon,
        RawToken::DotDot => TokenKind::DotDot,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::BangEq => TokenKind::BangEq,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::PlusPlus => TokenKind::PlusPlus,
        RawToken::MinusMinus => TokenKind::MinusMinus,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::PipePipe => TokenKind::PipePipe,
        RawToken::BangBang => TokenKind::BangBang,
        RawToken::Elvis => TokenKind::Elvis,
        RawToken::QuestionQuestion => TokenKind::QuestionQuestion,
        RawToken::FatArrow => TokenKind::FatArrow,
        RawToken::LtLt => TokenKind::LtLt,
        RawToken::GtGt => TokenKind::GtGt,
        RawToken::PlusEq => TokenKind::PlusEq,
        RawToken::MinusEq => TokenKind::MinusEq,
        RawToken::StarEq => TokenKind::StarEq,
        RawToken::SlashEq => TokenKind::SlashEq,
        RawToken::PercentEq => TokenKind::PercentEq,
        RawToken::AmpEq => TokenKind::AmpEq,
        RawToken::PipeEq => TokenKind::PipeEq,
        RawToken::CaretEq => TokenKind::CaretEq,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Semi => TokenKind::Semi,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Eq => TokenKind::Eq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Amp => TokenKind::Amp,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::Caret => TokenKind::Caret,
        RawToken::Tilde => TokenKind::Tilde,
        RawToken::Bang => TokenKind::Bang,
        RawToken::Question => TokenKind::Question,

        // skipped by their callbacks
        RawToken::LineComment | RawToken::BlockComment | RawToken::DocBlock => TokenKind::Eof,
    }
}

/// Fold a `-`/`+` that directly touches a numeric literal into the literal,
/// unless the previous token ends an operand (`a-1` stays a subtraction).
fn fold_signs(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter().peekable();
    while let Some(tok) = iter.next() {
        let is_sign = matches!(tok.kind, TokenKind::Minus | TokenKind::Plus);
        let prefix_position = out.last().map_or(true, |prev| !ends_operand(&prev.kind));
        if is_sign && prefix_position {
            if let Some(next) = iter.peek() {
                let touching = next.span.start == tok.span.end;
                if touching && matches!(next.kind, TokenKind::Int(_) | TokenKind::Float(_)) {
                    if let Some(next) = iter.next() {
                        let negative = tok.kind == TokenKind::Minus;
                        let kind = match next.kind {
                            TokenKind::Int(mut v) => {
                                v.negative = negative;
                                TokenKind::Int(v)
                            }
                            TokenKind::Float(mut v) => {
                                if negative {
                                    v.value = -v.value;
                                }
                                TokenKind::Float(v)
                            }
                            other => other,
                        };
                        out.push(Token {
                            kind,
                            span: tok.span.to(next.span),
                            lexeme: format!("{}{}", tok.lexeme, next.lexeme),
                        });
                        continue;
                    }
                }
            }
        }
        out.push(tok);
    }
    out
}

/// Result of lexing: tokens plus any errors found.
#[derive(Debug)]
pub struct LexResult {
    /// Always ends with `Eof`.
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
    /// Spans of `//` and `/* */` comments, in source order.
    pub comments: Vec<Span>,
    /// Parsed `<* *>` blocks, in source order.
    pub docs: Vec<DocComment>,
}

impl LexResult {
    /// Returns true if lexing completed without errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexErrorKind {
    #[error("unterminated {0}")]
    UnterminatedLiteral(&'static str),
    #[error("invalid escape sequence")]
    InvalidEscape,
    #[error("invalid character '{0}'")]
    InvalidCharacter(char),
    #[error("integer suffix '{0}' on a float literal")]
    InvalidNumericSuffix(String),
    #[error("malformed numeric literal")]
    MalformedNumber,
}

/// A lexer error with its location.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    pub fn hint(&self) -> Option<&'static str> {
        match &self.kind {
            LexErrorKind::UnterminatedLiteral("string literal") => Some("add a closing '\"'"),
            LexErrorKind::UnterminatedLiteral("character literal") => Some("add a closing '''"),
            LexErrorKind::UnterminatedLiteral("block comment") => Some("add a closing '*/'"),
            LexErrorKind::UnterminatedLiteral(_) => None,
            LexErrorKind::InvalidEscape => {
                Some("\\x, \\u and \\U need 2, 4 and 8 hex digits naming a valid character")
            }
            LexErrorKind::InvalidCharacter(_) => None,
            LexErrorKind::InvalidNumericSuffix(_) => Some("use f, f16, f32, f64 or f128"),
            LexErrorKind::MalformedNumber => Some("integer literals must fit in 128 bits"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<TokenKind> {
        let result = Lexer::new(src).tokenize();
        assert!(result.is_ok(), "unexpected errors: {:?}", result.errors);
        result.tokens.into_iter().map(|t| t.kind).collect()
    }

    fn int_of(kind: &TokenKind) -> IntLiteral {
        match kind {
            TokenKind::Int(v) => *v,
            other => panic!("expected integer, got {:?}", other),
        }
    }

    #[test]
    fn escapes() {
        assert_eq!(scan_escape("n"), (Some('\n'), 1));
        assert_eq!(scan_escape("x41"), (Some('A'), 3));
        assert_eq!(scan_escape("x4_"), (Some('\x04'), 3));
        assert_eq!(scan_escape("u00e9"), (Some('é'), 5));
        assert_eq!(scan_escape("065"), (Some('A'), 3));
        assert_eq!(scan_escape("0"), (Some('\0'), 1));
        assert_eq!(scan_escape("q"), (Some('q'), 1));
        assert_eq!(scan_escape("xZZ"), (None, 1));
        assert_eq!(scan_escape("U0000D800"), (None, 9));
    }

    #[test]
    fn number_bodies() {
        let scan = scan_number("0x1A;");
        assert_eq!(scan.len, 4);
        assert!(matches!(scan.value, NumberValue::Int(IntLiteral { value: 26, .. })));

        let scan = scan_number("1..2");
        assert_eq!(scan.len, 1);

        let scan = scan_number("0x1p4");
        assert_eq!(scan.value, NumberValue::Float(FloatLiteral { value: 16.0, suffix: None }));

        let scan = scan_number("0x");
        assert_eq!(scan.error, Some(LexErrorKind::MalformedNumber));
    }

    #[test]
    fn signs_fold_only_in_prefix_position() {
        let kinds = lex("x = -1; a-1;");
        assert!(int_of(&kinds[2]).negative);
        assert!(matches!(kinds[5], TokenKind::Minus));
        assert!(!int_of(&kinds[6]).negative);
    }

    #[test]
    fn sign_after_question_mark_folds() {
        let kinds = lex("a ? -1 : 2");
        assert!(matches!(kinds[1], TokenKind::Question));
        assert!(int_of(&kinds[2]).negative);
    }

    #[test]
    fn unknown_suffix_text_is_not_consumed() {
        let kinds = lex("1x");
        assert_eq!(int_of(&kinds[0]).value, 1);
        assert!(matches!(kinds[1], TokenKind::Ident(ref name) if name == "x"));
        assert!(matches!(kinds[2], TokenKind::Eof));
    }

    #[test]
    fn string_styles() {
        let kinds = lex("`a``b` \"\"\"one\n\\ttwo\"\"\"");
        assert_eq!(kinds[0], TokenKind::String("a`b".to_string(), StringStyle::Raw));
        assert_eq!(kinds[1], TokenKind::String("one\n\ttwo".to_string(), StringStyle::Multiline));
    }

    #[test]
    fn byte_literals() {
        let kinds = lex("x\"DE ad\" b64\"aGk=\"");
        assert_eq!(kinds[0], TokenKind::Bytes(vec![0xde, 0xad], BytesEncoding::Hex));
        assert_eq!(kinds[1], TokenKind::Bytes(b"hi".to_vec(), BytesEncoding::Base64));
    }

    #[test]
    fn unterminated_literals_still_produce_tokens() {
        let result = Lexer::new("x = \"abc").tokenize();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, LexErrorKind::UnterminatedLiteral("string literal"));
        assert!(matches!(result.tokens[2].kind, TokenKind::String(ref s, _) if s == "abc"));

        let result = Lexer::new("x;\n\t`open").tokenize();
        assert_eq!(result.errors[0].kind, LexErrorKind::UnterminatedLiteral("raw string"));
        assert_eq!((result.errors[0].span.line, result.errors[0].span.col), (2, 5));
    }

    #[test]
    fn integer_suffix_on_float_is_an_error() {
        let result = Lexer::new("1.5u8").tokenize();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, LexErrorKind::InvalidNumericSuffix("u8".to_string()));
        assert!(matches!(result.tokens[0].kind, TokenKind::Float(FloatLiteral { value, suffix: None }) if value == 1.5));
    }

    #[test]
    fn tab_width_sets_columns() {
        let result = Lexer::new("\tx\n  \ty").tokenize();
        assert_eq!((result.tokens[0].span.line, result.tokens[0].span.col), (1, 5));
        assert_eq!((result.tokens[1].span.line, result.tokens[1].span.col), (2, 5));

        let result = Lexer::new("\tx\n  \ty").with_tab_width(8).tokenize();
        assert_eq!(result.tokens[0].span.col, 9);
        assert_eq!(result.tokens[1].span.col, 9);
    }

    #[test]
    fn base64_decoding() {
        let digits: Vec<char> = "aGVsbG8=".chars().collect();
        assert_eq!(decode_base64(&digits), b"hello");
    }
}
