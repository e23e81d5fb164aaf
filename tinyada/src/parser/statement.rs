use std::io::Read;

use itertools::Itertools;

use super::{Parser, Result};
use crate::{
    diagnostic::{DiagnosticKind, Expected},
    symbol_table::Role,
    token::TokenKind,
    value::{self, Value},
};

impl<'s, R: Read> Parser<'s, R> {
    /// sequenceOfStatements = statement { statement }
    ///
    /// Runs until a token that closes the sequence.
    pub(super) fn sequence_of_statements(&mut self) {
        self.statement();
        loop {
            self.skip_newlines();
            if matches!(
                self.token.kind(),
                TokenKind::KwEnd | TokenKind::KwElsif | TokenKind::KwElse | TokenKind::Eof
            ) {
                break;
            }
            self.statement();
        }
    }

    /// A statement sequence nested inside a compound statement
    fn nested_sequence(&mut self) -> Result {
        self.nested(|p| {
            p.sequence_of_statements();
            Ok(())
        })
    }

    /// statement = simpleStatement | compoundStatement
    ///
    /// A recovery boundary, a broken statement is skipped up to the end of its
    /// line.
    fn statement(&mut self) {
        self.skip_newlines();
        let result = match self.token.kind() {
            TokenKind::KwIf => self.if_statement(),
            TokenKind::KwWhile | TokenKind::KwLoop => self.loop_statement(),
            TokenKind::KwNull => self.null_statement(),
            TokenKind::KwExit => self.exit_statement(),
            _ => self.name_statement(),
        };

        if let Err(fault) = result {
            self.recover(fault, "continue parsing next statement");
        }
    }

    /// nullStatement = "null" ";"
    fn null_statement(&mut self) -> Result {
        self.accept(TokenKind::KwNull)?;
        self.accept(TokenKind::SemiColon)
    }

    /// Statements starting with a name:
    ///
    /// assignmentStatement = <variable>name ":=" expression ";"
    /// procedureCallStatement = <procedure>name [ actualParameterPart ] ";"
    fn name_statement(&mut self) -> Result {
        let name = self.name()?;

        if self.at(TokenKind::Assign) {
            let value = self.assignment_statement()?;
            let Some(entry) = &name.entry else {
                return Ok(());
            };

            if matches!(entry.role, Role::Variable | Role::Parameter) {
                // only whole variables are tracked, not array elements
                let value = if name.indexed { None } else { value };
                self.table.assign(&entry.name, value);
            } else {
                let kind = DiagnosticKind::RoleMismatch {
                    name: entry.name.clone(),
                    expected: Expected::VariableOrParameter,
                    found: entry.role,
                };
                self.report(kind, name.ident.location.clone());
            }
            return Ok(());
        }

        let builtin_print = name
            .entry
            .as_ref()
            .is_some_and(|e| e.name == "print" && e.role == Role::Procedure);
        if builtin_print {
            return self.print_statement();
        }

        self.check_role(&name, Role::Procedure);
        if self.at(TokenKind::LeftParen) {
            self.actual_parameter_part()?;
        }
        self.accept(TokenKind::SemiColon)
    }

    /// The part of an assignment after the name, giving the assigned value
    fn assignment_statement(&mut self) -> Result<Option<Value>> {
        self.accept(TokenKind::Assign)?;
        let value = self.expression()?;
        self.accept(TokenKind::SemiColon)?;
        Ok(value)
    }

    /// Call of the built-in `print`: its arguments are written on one line,
    /// separated by spaces.
    fn print_statement(&mut self) -> Result {
        let values = if self.at(TokenKind::LeftParen) {
            self.actual_parameter_part()?
        } else {
            vec![]
        };

        let line = values.iter().map(value::display).join(" ");
        self.lexer.source().print(line);

        self.accept(TokenKind::SemiColon)
    }

    /// actualParameterPart = "(" expression { "," expression } ")"
    fn actual_parameter_part(&mut self) -> Result<Vec<Option<Value>>> {
        self.accept(TokenKind::LeftParen)?;
        let mut values = vec![self.expression()?];
        while self.at(TokenKind::Comma) {
            self.advance();
            values.push(self.expression()?);
        }
        self.accept(TokenKind::RightParen)?;
        Ok(values)
    }

    /// exitStatement = "exit" [ "when" condition ] ";"
    fn exit_statement(&mut self) -> Result {
        self.accept(TokenKind::KwExit)?;
        if self.at(TokenKind::KwWhen) {
            self.advance();
            self.condition()?;
        }
        self.accept(TokenKind::SemiColon)
    }

    /// ifStatement =
    ///     "if" condition "then" sequenceOfStatements
    ///     { "elsif" condition "then" sequenceOfStatements }
    ///     [ "else" sequenceOfStatements ]
    ///     "end" "if" ";"
    fn if_statement(&mut self) -> Result {
        self.accept(TokenKind::KwIf)?;
        self.condition()?;
        self.accept(TokenKind::KwThen)?;
        self.nested_sequence()?;

        while self.at(TokenKind::KwElsif) {
            self.advance();
            self.condition()?;
            self.accept(TokenKind::KwThen)?;
            self.nested_sequence()?;
        }

        if self.at(TokenKind::KwElse) {
            self.advance();
            self.nested_sequence()?;
        }

        self.accept(TokenKind::KwEnd)?;
        self.accept(TokenKind::KwIf)?;
        self.accept(TokenKind::SemiColon)
    }

    /// loopStatement =
    ///     [ iterationScheme ] "loop" sequenceOfStatements "end" "loop" ";"
    ///
    /// The header and the trailer are recovery boundaries of their own.
    fn loop_statement(&mut self) -> Result {
        if let Err(fault) = self.loop_header() {
            self.recover(
                fault,
                "continue parsing from sequence of statements of loop statement",
            );
        }

        self.nested_sequence()?;

        if let Err(fault) = self.loop_trailer() {
            self.recover(fault, "stop parsing loop statement");
        }

        Ok(())
    }

    /// iterationScheme = "while" condition
    fn loop_header(&mut self) -> Result {
        if self.at(TokenKind::KwWhile) {
            self.advance();
            self.condition()?;
        }
        self.accept(TokenKind::KwLoop)
    }

    fn loop_trailer(&mut self) -> Result {
        self.accept(TokenKind::KwEnd)?;
        self.accept(TokenKind::KwLoop)?;
        self.accept(TokenKind::SemiColon)
    }

    /// condition = <boolean>expression
    fn condition(&mut self) -> Result {
        self.expression()?;
        Ok(())
    }
}
