use std::io::Read;

use super::{Ident, Parser, Result};
use crate::{diagnostic::DiagnosticKind, symbol_table::Role, token::TokenKind, value::Value};

impl<'s, R: Read> Parser<'s, R> {
    /// subprogramBody =
    ///     subprogramSpecification "is"
    ///     declarativePart
    ///     "begin" sequenceOfStatements
    ///     "end" [ <procedure>identifier ] ";"
    ///
    /// Each phase is its own recovery boundary.  The scope opened by the
    /// specification is always exited again, even if the body is broken.
    pub(super) fn subprogram_body(&mut self) {
        let mut procedure = None;

        let specification = self
            .subprogram_specification(&mut procedure)
            .and_then(|()| self.accept(TokenKind::KwIs));
        if let Err(fault) = specification {
            self.recover(
                fault,
                "continue parsing from declarative part of subprogram body",
            );
        }

        // declarations and statements recover individually
        self.declarative_part();

        if let Err(fault) = self.accept(TokenKind::KwBegin) {
            self.recover(
                fault,
                "continue parsing from sequence of statements of subprogram body",
            );
        }

        self.sequence_of_statements();

        if let Err(fault) = self.subprogram_end(procedure) {
            self.recover(fault, "stop parsing subprogram body");
        }
    }

    /// subprogramSpecification = "procedure" identifier [ formalPart ]
    ///
    /// Declares the procedure in the enclosing scope, then opens the scope of
    /// the body.
    fn subprogram_specification(&mut self, procedure: &mut Option<String>) -> Result {
        let header = self
            .accept(TokenKind::KwProcedure)
            .and_then(|()| self.identifier());

        let ident = match header {
            Ok(ident) => ident,
            Err(fault) => {
                self.table.enter_scope();
                return Err(fault);
            }
        };

        self.enter_symbol(&ident, Role::Procedure, None);
        self.table.enter_scope();
        *procedure = Some(ident.name);

        if self.at(TokenKind::LeftParen) {
            self.formal_part()?;
        }

        Ok(())
    }

    /// The trailing `"end" [ identifier ] ";"` of a subprogram body
    fn subprogram_end(&mut self, procedure: Option<String>) -> Result {
        let end = self.accept(TokenKind::KwEnd);
        self.exit_scope(procedure.clone());
        end?;

        if self.at(TokenKind::Identifier) {
            let found = self.identifier()?;
            match procedure {
                Some(expected) if expected != found.name => self.report(
                    DiagnosticKind::ProcedureNameMismatch {
                        expected,
                        found: found.name,
                    },
                    found.location,
                ),
                Some(_) => (),
                None => self.report(
                    DiagnosticKind::UnknownProcedureName { found: found.name },
                    found.location,
                ),
            }
        }

        self.accept(TokenKind::SemiColon)
    }

    /// formalPart = "(" parameterSpecification { ";" parameterSpecification } ")"
    fn formal_part(&mut self) -> Result {
        self.accept(TokenKind::LeftParen)?;
        self.parameter_specification()?;
        while self.at(TokenKind::SemiColon) {
            self.advance();
            self.parameter_specification()?;
        }
        self.accept(TokenKind::RightParen)
    }

    /// parameterSpecification = identifierList ":" mode <type>name
    fn parameter_specification(&mut self) -> Result {
        let idents = self.identifier_list()?;
        for ident in &idents {
            self.enter_symbol(ident, Role::Parameter, None);
        }

        self.accept(TokenKind::Colon)?;
        self.mode();
        self.type_name()
    }

    /// mode = [ "in" ] | "in" "out" | "out"
    fn mode(&mut self) {
        if self.at(TokenKind::KwIn) {
            self.advance();
        }
        if self.at(TokenKind::KwOut) {
            self.advance();
        }
    }

    /// declarativePart = { basicDeclaration }
    fn declarative_part(&mut self) {
        loop {
            self.skip_newlines();
            if !matches!(
                self.token.kind(),
                TokenKind::Identifier | TokenKind::KwType | TokenKind::KwProcedure
            ) {
                break;
            }

            if let Err(fault) = self.basic_declaration() {
                self.recover(
                    fault,
                    "continue parsing basic declaration of declarative part",
                );
            }
        }
    }

    /// basicDeclaration = objectDeclaration | numberDeclaration
    ///                  | typeDeclaration | subprogramBody
    fn basic_declaration(&mut self) -> Result {
        match self.token.kind() {
            TokenKind::Identifier => self.object_or_number_declaration(),
            TokenKind::KwType => self.type_declaration(),
            _ => self.nested(|p| {
                p.subprogram_body();
                Ok(())
            }),
        }
    }

    /// Object and number declarations share their start:
    ///
    /// objectDeclaration = identifierList ":" typeDefinition ";"
    /// numberDeclaration = identifierList ":" "constant" ":=" <static>expression ";"
    ///
    /// The names are declared once the whole declaration parsed.
    fn object_or_number_declaration(&mut self) -> Result {
        let idents = self.identifier_list()?;
        self.accept(TokenKind::Colon)?;

        let (role, value) = if self.at(TokenKind::KwConstant) {
            (Role::Constant, self.number_declaration()?)
        } else {
            self.type_definition()?;
            self.accept(TokenKind::SemiColon)?;
            (Role::Variable, None)
        };

        for ident in &idents {
            self.enter_symbol(ident, role, value.clone());
        }

        Ok(())
    }

    /// The part of a number declaration after the colon, giving its value
    fn number_declaration(&mut self) -> Result<Option<Value>> {
        self.accept(TokenKind::KwConstant)?;
        self.accept(TokenKind::Assign)?;
        let value = self.expression()?;
        self.accept(TokenKind::SemiColon)?;
        Ok(value)
    }

    /// typeDeclaration = "type" identifier "is" typeDefinition ";"
    fn type_declaration(&mut self) -> Result {
        self.accept(TokenKind::KwType)?;
        let ident = self.identifier()?;
        self.accept(TokenKind::KwIs)?;
        self.type_definition()?;
        self.accept(TokenKind::SemiColon)?;

        self.enter_symbol(&ident, Role::Type, None);
        Ok(())
    }

    /// typeDefinition = enumerationTypeDefinition | arrayTypeDefinition
    ///                | range | <type>name
    fn type_definition(&mut self) -> Result {
        match self.token.kind() {
            TokenKind::LeftParen => self.enumeration_type_definition(),
            TokenKind::KwArray => self.array_type_definition(),
            TokenKind::KwRange => self.range(),
            TokenKind::Identifier => self.type_name(),
            _ => Err(self.expected_one_of(
                "either an opening parenthesis, an array, a range, or an identifier",
            )),
        }
    }

    /// range = "range" simpleExpression ".." simpleExpression
    fn range(&mut self) -> Result {
        self.accept(TokenKind::KwRange)?;
        self.simple_expression()?;
        self.accept(TokenKind::DotDot)?;
        self.simple_expression()?;
        Ok(())
    }

    /// index = range | <type>name
    fn index(&mut self) -> Result {
        match self.token.kind() {
            TokenKind::KwRange => self.range(),
            TokenKind::Identifier => self.type_name(),
            _ => Err(self.expected_one_of("either a range or a type name")),
        }
    }

    /// enumerationTypeDefinition = "(" identifierList ")"
    ///
    /// The literals are constants in the current scope.
    fn enumeration_type_definition(&mut self) -> Result {
        self.accept(TokenKind::LeftParen)?;
        let idents = self.identifier_list()?;
        for ident in &idents {
            self.enter_symbol(ident, Role::Constant, None);
        }
        self.accept(TokenKind::RightParen)
    }

    /// arrayTypeDefinition = "array" "(" index { "," index } ")" "of" <type>name
    fn array_type_definition(&mut self) -> Result {
        self.accept(TokenKind::KwArray)?;
        self.accept(TokenKind::LeftParen)?;
        self.index()?;
        while self.at(TokenKind::Comma) {
            self.advance();
            self.index()?;
        }
        self.accept(TokenKind::RightParen)?;
        self.accept(TokenKind::KwOf)?;
        self.type_name()
    }

    /// A name that has to denote a type
    fn type_name(&mut self) -> Result {
        let name = self.name()?;
        self.check_role(&name, Role::Type);
        Ok(())
    }

    /// identifierList = identifier { "," identifier }
    fn identifier_list(&mut self) -> Result<Vec<Ident>> {
        let mut idents = vec![self.identifier()?];
        while self.at(TokenKind::Comma) {
            self.advance();
            idents.push(self.identifier()?);
        }
        Ok(idents)
    }

    /// Consume an identifier, keeping its text and location
    pub(super) fn identifier(&mut self) -> Result<Ident> {
        self.skip_newlines();
        let ident = Ident {
            name: self.token.text().unwrap_or_default().to_string(),
            location: self.location(),
        };
        self.accept(TokenKind::Identifier)?;
        Ok(ident)
    }
}
