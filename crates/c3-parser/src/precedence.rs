// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Operator precedence table.

use c3_ast::expr::{AssignOp, BinOp};
use c3_ast::token::TokenKind;

/// Binding strength, loosest first. Everything below `Prefix` is a binary
/// level; `Range` sits between logical-and and the comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precedence {
    Assignment,
    Ternary,
    Or,
    And,
    Range,
    Comparative,
    Additive,
    Bitwise,
    Shift,
    Multiplicative,
    Prefix,
    Postfix,
}

impl Precedence {
    /// The next tighter level; used for the right operand of a
    /// left-associative operator.
    pub fn next(self) -> Precedence {
        match self {
            Precedence::Assignment => Precedence::Ternary,
            Precedence::Ternary => Precedence::Or,
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::Range,
            Precedence::Range => Precedence::Comparative,
            Precedence::Comparative => Precedence::Additive,
            Precedence::Additive => Precedence::Bitwise,
            Precedence::Bitwise => Precedence::Shift,
            Precedence::Shift => Precedence::Multiplicative,
            Precedence::Multiplicative => Precedence::Prefix,
            Precedence::Prefix | Precedence::Postfix => Precedence::Postfix,
        }
    }

    pub fn is_right_assoc(self) -> bool {
        matches!(self, Precedence::Assignment | Precedence::Ternary)
    }
}

/// Binary operator and its level for a token, if it is one.
pub fn binary_op(kind: &TokenKind) -> Option<(BinOp, Precedence)> {
    let entry = match kind {
        TokenKind::Star => (BinOp::Mul, Precedence::Multiplicative),
        TokenKind::Slash => (BinOp::Div, Precedence::Multiplicative),
        TokenKind::Percent => (BinOp::Mod, Precedence::Multiplicative),
        TokenKind::LtLt => (BinOp::Shl, Precedence::Shift),
        TokenKind::GtGt => (BinOp::Shr, Precedence::Shift),
        TokenKind::Amp => (BinOp::BitAnd, Precedence::Bitwise),
        TokenKind::Pipe => (BinOp::BitOr, Precedence::Bitwise),
        TokenKind::Caret => (BinOp::BitXor, Precedence::Bitwise),
        TokenKind::Plus => (BinOp::Add, Precedence::Additive),
        TokenKind::Minus => (BinOp::Sub, Precedence::Additive),
        TokenKind::EqEq => (BinOp::Eq, Precedence::Comparative),
        TokenKind::BangEq => (BinOp::Ne, Precedence::Comparative),
        TokenKind::Lt => (BinOp::Lt, Precedence::Comparative),
        TokenKind::LtEq => (BinOp::Le, Precedence::Comparative),
        TokenKind::Gt => (BinOp::Gt, Precedence::Comparative),
        TokenKind::GtEq => (BinOp::Ge, Precedence::Comparative),
        TokenKind::AmpAmp => (BinOp::And, Precedence::And),
        TokenKind::PipePipe => (BinOp::Or, Precedence::Or),
        _ => return None,
    };
    Some(entry)
}

/// Level at which a binary operator binds, for printers deciding on parens.
pub fn binop_precedence(op: BinOp) -> Precedence {
    match op {
        BinOp::Mul | BinOp::Div | BinOp::Mod => Precedence::Multiplicative,
        BinOp::Shl | BinOp::Shr => Precedence::Shift,
        BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor => Precedence::Bitwise,
        BinOp::Add | BinOp::Sub => Precedence::Additive,
        BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            Precedence::Comparative
        }
        BinOp::And => Precedence::And,
        BinOp::Or => Precedence::Or,
    }
}

pub fn assign_op(kind: &TokenKind) -> Option<AssignOp> {
    Some(match kind {
        TokenKind::Eq => AssignOp::Assign,
        TokenKind::PlusEq => AssignOp::Add,
        TokenKind::MinusEq => AssignOp::Sub,
        TokenKind::StarEq => AssignOp::Mul,
        TokenKind::SlashEq => AssignOp::Div,
        TokenKind::PercentEq => AssignOp::Mod,
        TokenKind::LtLtEq => AssignOp::Shl,
        TokenKind::GtGtEq => AssignOp::Shr,
        TokenKind::AmpEq => AssignOp::BitAnd,
        TokenKind::PipeEq => AssignOp::BitOr,
        TokenKind::CaretEq => AssignOp::BitXor,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_order() {
        let levels = [
            Precedence::Assignment,
            Precedence::Ternary,
            Precedence::Or,
            Precedence::And,
            Precedence::Range,
            Precedence::Comparative,
            Precedence::Additive,
            Precedence::Bitwise,
            Precedence::Shift,
            Precedence::Multiplicative,
            Precedence::Prefix,
            Precedence::Postfix,
        ];
        for pair in levels.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].next(), pair[1]);
        }
    }

    #[test]
    fn bitwise_binds_tighter_than_additive() {
        let (_, amp) = binary_op(&TokenKind::Amp).unwrap();
        let (_, plus) = binary_op(&TokenKind::Plus).unwrap();
        let (_, shl) = binary_op(&TokenKind::LtLt).unwrap();
        assert!(amp > plus);
        assert!(shl > amp);
        assert_eq!(binop_precedence(BinOp::BitXor), amp);
    }

    #[test]
    fn assignment_tokens() {
        assert_eq!(assign_op(&TokenKind::LtLtEq), Some(AssignOp::Shl));
        assert_eq!(assign_op(&TokenKind::EqEq), None);
    }
}
