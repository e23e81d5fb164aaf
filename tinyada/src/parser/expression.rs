//! Expressions, folded to a value where every operand is known.

use std::io::Read;

use super::{Name, Parser, Result};
use crate::{
    symbol_table::Role,
    token::TokenKind,
    value::{self, Value},
};

impl<'s, R: Read> Parser<'s, R> {
    /// expression = relation { "and" relation } | relation { "or" relation }
    pub(super) fn expression(&mut self) -> Result<Option<Value>> {
        self.nested(|p| {
            let mut value = p.relation()?;

            let op = p.token.kind();
            if matches!(op, TokenKind::KwAnd | TokenKind::KwOr) {
                while p.at(op) {
                    p.advance();
                    let rhs = p.relation()?;
                    value = value::binary(op, value, rhs);
                }
            }

            Ok(value)
        })
    }

    /// relation = simpleExpression [ relationalOperator simpleExpression ]
    fn relation(&mut self) -> Result<Option<Value>> {
        let mut value = self.simple_expression()?;

        let op = self.token.kind();
        if op.is_relational() {
            self.advance();
            let rhs = self.simple_expression()?;
            value = value::binary(op, value, rhs);
        }

        Ok(value)
    }

    /// simpleExpression =
    ///     [ unaryAddingOperator ] term { binaryAddingOperator term }
    pub(super) fn simple_expression(&mut self) -> Result<Option<Value>> {
        let sign = self.token.kind();
        let signed = sign.is_adding();
        if signed {
            self.advance();
        }

        let mut value = self.term()?;
        if signed {
            value = value::unary(sign, value);
        }

        while self.token.kind().is_adding() {
            let op = self.token.kind();
            self.advance();
            let rhs = self.term()?;
            value = value::binary(op, value, rhs);
        }

        Ok(value)
    }

    /// term = factor { multiplyingOperator factor }
    fn term(&mut self) -> Result<Option<Value>> {
        let mut value = self.factor()?;

        while self.token.kind().is_multiplying() {
            let op = self.token.kind();
            self.advance();
            let rhs = self.factor()?;
            value = value::binary(op, value, rhs);
        }

        Ok(value)
    }

    /// factor = primary [ "**" primary ] | "not" primary
    fn factor(&mut self) -> Result<Option<Value>> {
        if self.at(TokenKind::KwNot) {
            self.advance();
            let operand = self.primary()?;
            return Ok(value::unary(TokenKind::KwNot, operand));
        }

        let value = self.primary()?;
        if self.at(TokenKind::Power) {
            self.advance();
            let exponent = self.primary()?;
            return Ok(value::binary(TokenKind::Power, value, exponent));
        }

        Ok(value)
    }

    /// primary = numericLiteral | stringLiteral | name | "(" expression ")"
    fn primary(&mut self) -> Result<Option<Value>> {
        match self.token.kind() {
            TokenKind::NumericLiteral => {
                let value = self.token.text().and_then(Value::from_literal);
                self.advance();
                Ok(value)
            }
            TokenKind::StringLiteral => {
                let value = self.token.text().map(|s| Value::Str(s.to_string()));
                self.advance();
                Ok(value)
            }
            TokenKind::Identifier => {
                let name = self.name()?;
                if name.indexed {
                    return Ok(None);
                }
                Ok(name.entry.and_then(|e| e.value))
            }
            TokenKind::LeftParen => {
                self.advance();
                let value = self.expression()?;
                self.accept(TokenKind::RightParen)?;
                Ok(value)
            }
            _ => Err(self.expected_one_of(
                "either a numeric literal, a string literal, an identifier, \
                 or an opening parenthesis",
            )),
        }
    }

    /// name = identifier [ indexedComponent ]
    ///
    /// A procedure name is never indexed, the parenthesis after it starts
    /// the actual parameters.
    pub(super) fn name(&mut self) -> Result<Name> {
        let ident = self.identifier()?;
        let entry = self.find_symbol(&ident);

        let is_procedure = entry.as_ref().is_some_and(|e| e.role == Role::Procedure);
        let indexed = !is_procedure && self.at(TokenKind::LeftParen);
        if indexed {
            self.indexed_component()?;
        }

        Ok(Name {
            ident,
            entry,
            indexed,
        })
    }

    /// indexedComponent = "(" expression { "," expression } ")"
    fn indexed_component(&mut self) -> Result {
        self.accept(TokenKind::LeftParen)?;
        self.expression()?;
        while self.at(TokenKind::Comma) {
            self.advance();
            self.expression()?;
        }
        self.accept(TokenKind::RightParen)
    }
}
