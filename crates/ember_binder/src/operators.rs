//! Operator tables for unary and binary expressions.
//!
//! Operators are not overloadable; an operator applies when an entry matches
//! the operand types exactly.

use crate::types::TypeSymbol;
use ember_syntax::{BinaryOperatorKind, UnaryOperatorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperation {
    Identity,
    Negation,
    LogicalNegation,
    BitwiseNegation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Modulus,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    LogicalAnd,
    LogicalOr,
    ShiftLeft,
    ShiftRight,
    Equals,
    NotEquals,
    Less,
    LessOrEquals,
    Greater,
    GreaterOrEquals,
    Concatenation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundUnaryOperator {
    pub syntax: UnaryOperatorKind,
    pub operation: UnaryOperation,
    pub operand_type: TypeSymbol,
    pub result_type: TypeSymbol,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundBinaryOperator {
    pub syntax: BinaryOperatorKind,
    pub operation: BinaryOperation,
    pub left_type: TypeSymbol,
    pub right_type: TypeSymbol,
    pub result_type: TypeSymbol,
}

fn is_integer(ty: &TypeSymbol) -> bool {
    [TypeSymbol::BYTE, TypeSymbol::INT, TypeSymbol::UINT, TypeSymbol::LONG, TypeSymbol::ULONG].contains(ty)
}

fn is_numeric(ty: &TypeSymbol) -> bool {
    is_integer(ty) || *ty == TypeSymbol::FLOAT || *ty == TypeSymbol::DOUBLE
}

fn is_signed(ty: &TypeSymbol) -> bool {
    [TypeSymbol::INT, TypeSymbol::LONG, TypeSymbol::FLOAT, TypeSymbol::DOUBLE].contains(ty)
}

impl BoundUnaryOperator {
    pub fn bind(syntax: UnaryOperatorKind, operand_type: &TypeSymbol) -> Option<BoundUnaryOperator> {
        let operation = match syntax {
            UnaryOperatorKind::Plus if is_numeric(operand_type) => UnaryOperation::Identity,
            UnaryOperatorKind::Minus if is_signed(operand_type) => UnaryOperation::Negation,
            UnaryOperatorKind::Bang if *operand_type == TypeSymbol::BOOL => UnaryOperation::LogicalNegation,
            UnaryOperatorKind::Tilde if is_integer(operand_type) => UnaryOperation::BitwiseNegation,
            _ => return None,
        };
        Some(BoundUnaryOperator {
            syntax,
            operation,
            operand_type: operand_type.clone(),
            result_type: operand_type.clone(),
        })
    }
}

impl BoundBinaryOperator {
    pub fn bind(syntax: BinaryOperatorKind, left: &TypeSymbol, right: &TypeSymbol) -> Option<BoundBinaryOperator> {
        use BinaryOperatorKind as K;

        let same = left == right;
        let bool_pair = same && *left == TypeSymbol::BOOL;
        let numeric_pair = same && is_numeric(left);
        let integer_pair = same && is_integer(left);
        let string_pair = same && *left == TypeSymbol::STRING;

        let (operation, result_type) = match syntax {
            K::Plus if string_pair => (BinaryOperation::Concatenation, TypeSymbol::STRING),
            K::Plus if numeric_pair => (BinaryOperation::Addition, left.clone()),
            K::Minus if numeric_pair => (BinaryOperation::Subtraction, left.clone()),
            K::Star if numeric_pair => (BinaryOperation::Multiplication, left.clone()),
            K::Slash if numeric_pair => (BinaryOperation::Division, left.clone()),
            K::Percent if integer_pair => (BinaryOperation::Modulus, left.clone()),
            K::Ampersand if integer_pair || bool_pair => (BinaryOperation::BitwiseAnd, left.clone()),
            K::Pipe if integer_pair || bool_pair => (BinaryOperation::BitwiseOr, left.clone()),
            K::Hat if integer_pair || bool_pair => (BinaryOperation::BitwiseXor, left.clone()),
            K::LessLess if integer_pair => (BinaryOperation::ShiftLeft, left.clone()),
            K::GreaterGreater if integer_pair => (BinaryOperation::ShiftRight, left.clone()),
            K::AmpersandAmpersand if bool_pair => (BinaryOperation::LogicalAnd, TypeSymbol::BOOL),
            K::PipePipe if bool_pair => (BinaryOperation::LogicalOr, TypeSymbol::BOOL),
            K::EqualsEquals if same && !left.is_void() && !left.is_error() => {
                (BinaryOperation::Equals, TypeSymbol::BOOL)
            }
            K::BangEquals if same && !left.is_void() && !left.is_error() => {
                (BinaryOperation::NotEquals, TypeSymbol::BOOL)
            }
            K::Less if numeric_pair => (BinaryOperation::Less, TypeSymbol::BOOL),
            K::LessEquals if numeric_pair => (BinaryOperation::LessOrEquals, TypeSymbol::BOOL),
            K::Greater if numeric_pair => (BinaryOperation::Greater, TypeSymbol::BOOL),
            K::GreaterEquals if numeric_pair => (BinaryOperation::GreaterOrEquals, TypeSymbol::BOOL),
            _ => return None,
        };

        Some(BoundBinaryOperator {
            syntax,
            operation,
            left_type: left.clone(),
            right_type: right.clone(),
            result_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic_requires_matching_types() {
        let op = BoundBinaryOperator::bind(BinaryOperatorKind::Plus, &TypeSymbol::INT, &TypeSymbol::INT).unwrap();
        assert_eq!(op.operation, BinaryOperation::Addition);
        assert_eq!(op.result_type, TypeSymbol::INT);
        assert!(BoundBinaryOperator::bind(BinaryOperatorKind::Plus, &TypeSymbol::INT, &TypeSymbol::LONG).is_none());
    }

    #[test]
    fn test_string_concatenation_and_comparison() {
        let concat =
            BoundBinaryOperator::bind(BinaryOperatorKind::Plus, &TypeSymbol::STRING, &TypeSymbol::STRING).unwrap();
        assert_eq!(concat.operation, BinaryOperation::Concatenation);
        let eq = BoundBinaryOperator::bind(BinaryOperatorKind::EqualsEquals, &TypeSymbol::STRING, &TypeSymbol::STRING)
            .unwrap();
        assert_eq!(eq.result_type, TypeSymbol::BOOL);
        assert!(BoundBinaryOperator::bind(BinaryOperatorKind::Less, &TypeSymbol::STRING, &TypeSymbol::STRING).is_none());
    }

    #[test]
    fn test_unary_operators() {
        assert!(BoundUnaryOperator::bind(UnaryOperatorKind::Bang, &TypeSymbol::BOOL).is_some());
        assert!(BoundUnaryOperator::bind(UnaryOperatorKind::Bang, &TypeSymbol::INT).is_none());
        assert!(BoundUnaryOperator::bind(UnaryOperatorKind::Minus, &TypeSymbol::UINT).is_none());
        assert!(BoundUnaryOperator::bind(UnaryOperatorKind::Tilde, &TypeSymbol::LONG).is_some());
    }
}
