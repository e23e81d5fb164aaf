//! Values of constant expressions, and the operators that fold them.
//!
//! A value that could not be worked out at parse time is `None`; every
//! operator propagates it, as it does type mismatches, overflow and division
//! by zero.  Folding never fails loudly.

use std::fmt::Display;

use crate::token::TokenKind;

/// A known value of an expression
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    Integer(i64),
    Boolean(bool),
    Str(String),
}

impl Value {
    /// Parse the text of a numeric literal
    pub fn from_literal(digits: &str) -> Option<Value> {
        digits.parse().ok().map(Value::Integer)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{i}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

/// Show a possibly unknown value
pub fn display(value: &Option<Value>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "unknown".to_string(),
    }
}

/// Apply a binary operator, given as the token that spells it
pub fn binary(op: TokenKind, lhs: Option<Value>, rhs: Option<Value>) -> Option<Value> {
    use Value::*;

    let (lhs, rhs) = (lhs?, rhs?);
    match (op, lhs, rhs) {
        (TokenKind::Plus, Integer(a), Integer(b)) => a.checked_add(b).map(Integer),
        (TokenKind::Minus, Integer(a), Integer(b)) => a.checked_sub(b).map(Integer),
        (TokenKind::Star, Integer(a), Integer(b)) => a.checked_mul(b).map(Integer),
        (TokenKind::Slash, Integer(a), Integer(b)) => floor_div(a, b).map(Integer),
        (TokenKind::KwMod, Integer(a), Integer(b)) => floor_mod(a, b).map(Integer),
        (TokenKind::Power, Integer(a), Integer(b)) => {
            a.checked_pow(u32::try_from(b).ok()?).map(Integer)
        }

        (TokenKind::KwAnd, Boolean(a), Boolean(b)) => Some(Boolean(a && b)),
        (TokenKind::KwOr, Boolean(a), Boolean(b)) => Some(Boolean(a || b)),

        (TokenKind::Equals, a, b) => same_type(&a, &b).then(|| Boolean(a == b)),
        (TokenKind::NotEquals, a, b) => same_type(&a, &b).then(|| Boolean(a != b)),
        (TokenKind::Less, a, b) => same_type(&a, &b).then(|| Boolean(a < b)),
        (TokenKind::LessEquals, a, b) => same_type(&a, &b).then(|| Boolean(a <= b)),
        (TokenKind::Greater, a, b) => same_type(&a, &b).then(|| Boolean(a > b)),
        (TokenKind::GreaterEquals, a, b) => same_type(&a, &b).then(|| Boolean(a >= b)),

        _ => None,
    }
}

/// Apply a unary operator: a sign (`+`/`-`) or `not`
pub fn unary(op: TokenKind, operand: Option<Value>) -> Option<Value> {
    match (op, operand?) {
        (TokenKind::Plus, Value::Integer(a)) => Some(Value::Integer(a)),
        (TokenKind::Minus, Value::Integer(a)) => a.checked_neg().map(Value::Integer),
        (TokenKind::KwNot, Value::Boolean(b)) => Some(Value::Boolean(!b)),
        _ => None,
    }
}

fn same_type(a: &Value, b: &Value) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

/// Integer division rounding towards negative infinity
fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a % b != 0 && (a < 0) != (b < 0) {
        Some(q - 1)
    } else {
        Some(q)
    }
}

/// Remainder taking the sign of the divisor
fn floor_mod(a: i64, b: i64) -> Option<i64> {
    let r = a.checked_rem(b)?;
    if r != 0 && (r < 0) != (b < 0) {
        Some(r + b)
    } else {
        Some(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(i: i64) -> Option<Value> {
        Some(Value::Integer(i))
    }

    fn boolean(b: bool) -> Option<Value> {
        Some(Value::Boolean(b))
    }

    #[test]
    fn arithmetic() {
        assert_eq!(binary(TokenKind::Plus, int(2), int(3)), int(5));
        assert_eq!(binary(TokenKind::Minus, int(2), int(3)), int(-1));
        assert_eq!(binary(TokenKind::Star, int(4), int(3)), int(12));
        assert_eq!(binary(TokenKind::Power, int(2), int(10)), int(1024));
    }

    #[test]
    fn division_rounds_down() {
        assert_eq!(binary(TokenKind::Slash, int(7), int(2)), int(3));
        assert_eq!(binary(TokenKind::Slash, int(-7), int(2)), int(-4));
        assert_eq!(binary(TokenKind::KwMod, int(7), int(3)), int(1));
        assert_eq!(binary(TokenKind::KwMod, int(-7), int(3)), int(2));
        assert_eq!(binary(TokenKind::KwMod, int(7), int(-3)), int(-2));
    }

    #[test]
    fn failures_are_unknown() {
        assert_eq!(binary(TokenKind::Slash, int(1), int(0)), None);
        assert_eq!(binary(TokenKind::KwMod, int(1), int(0)), None);
        assert_eq!(binary(TokenKind::Power, int(2), int(-1)), None);
        assert_eq!(binary(TokenKind::Star, int(i64::MAX), int(2)), None);
        assert_eq!(binary(TokenKind::Plus, int(1), boolean(true)), None);
        assert_eq!(binary(TokenKind::Plus, None, int(1)), None);
        assert_eq!(unary(TokenKind::Minus, int(i64::MIN)), None);
        assert_eq!(unary(TokenKind::KwNot, int(1)), None);
    }

    #[test]
    fn logic_and_comparison() {
        assert_eq!(binary(TokenKind::KwAnd, boolean(true), boolean(false)), boolean(false));
        assert_eq!(binary(TokenKind::KwOr, boolean(true), boolean(false)), boolean(true));
        assert_eq!(binary(TokenKind::Less, int(1), int(2)), boolean(true));
        assert_eq!(binary(TokenKind::NotEquals, int(1), int(2)), boolean(true));
        assert_eq!(
            binary(
                TokenKind::Equals,
                Some(Value::Str("a".into())),
                Some(Value::Str("a".into()))
            ),
            boolean(true)
        );
        assert_eq!(binary(TokenKind::Equals, int(1), boolean(true)), None);
        assert_eq!(unary(TokenKind::KwNot, boolean(true)), boolean(false));
    }

    #[test]
    fn literals() {
        assert_eq!(Value::from_literal("042"), int(42));
        assert_eq!(Value::from_literal("99999999999999999999"), None);
        assert_eq!(display(&None), "unknown");
        assert_eq!(display(&int(-3)), "-3");
    }
}
