//! Operator tokens as they appear in unary and binary expressions.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperatorKind {
    Plus,
    Minus,
    Bang,
    Tilde,
}

impl UnaryOperatorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOperatorKind::Plus => "+",
            UnaryOperatorKind::Minus => "-",
            UnaryOperatorKind::Bang => "!",
            UnaryOperatorKind::Tilde => "~",
        }
    }
}

impl fmt::Display for UnaryOperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperatorKind {
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Ampersand,
    Pipe,
    Hat,
    AmpersandAmpersand,
    PipePipe,
    LessLess,
    GreaterGreater,
    EqualsEquals,
    BangEquals,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
}

impl BinaryOperatorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperatorKind::Plus => "+",
            BinaryOperatorKind::Minus => "-",
            BinaryOperatorKind::Star => "*",
            BinaryOperatorKind::Slash => "/",
            BinaryOperatorKind::Percent => "%",
            BinaryOperatorKind::Ampersand => "&",
            BinaryOperatorKind::Pipe => "|",
            BinaryOperatorKind::Hat => "^",
            BinaryOperatorKind::AmpersandAmpersand => "&&",
            BinaryOperatorKind::PipePipe => "||",
            BinaryOperatorKind::LessLess => "<<",
            BinaryOperatorKind::GreaterGreater => ">>",
            BinaryOperatorKind::EqualsEquals => "==",
            BinaryOperatorKind::BangEquals => "!=",
            BinaryOperatorKind::Less => "<",
            BinaryOperatorKind::LessEquals => "<=",
            BinaryOperatorKind::Greater => ">",
            BinaryOperatorKind::GreaterEquals => ">=",
        }
    }
}

impl fmt::Display for BinaryOperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
