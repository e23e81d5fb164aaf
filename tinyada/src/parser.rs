mod declaration;
mod error;
mod expression;
mod statement;

use std::{io::Read, ops::Range};

use itertools::Itertools;
use tracing::{debug, info};

use crate::{
    char_source::CharSource,
    diagnostic::{Diagnostic, DiagnosticKind, Expected, Sink},
    lexer::Lexer,
    symbol_table::{Role, Scope, SymbolEntry, SymbolTable},
    token::{Token, TokenKind},
    value::Value,
};

pub use self::error::{Result, SyntaxFault};

/// Settings for a single parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Options {
    /// How deeply subprograms, statement sequences and expressions may nest
    /// before the parser gives up on the construct.
    pub recursion_limit: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            recursion_limit: 100,
        }
    }
}

/// Recursive descent parser for one TinyAda subprogram body.  Declarations are
/// recorded in a scoped symbol table and constant expressions are folded
/// while parsing.
pub struct Parser<'s, R: Read> {
    /// Lexer to get tokens from the source file
    lexer: Lexer<'s, R>,

    /// The token currently being looked at
    token: Token,

    /// Declarations visible at the current point of the parse
    table: SymbolTable,

    /// Scopes of subprogram bodies that have been completely parsed
    closed: Vec<ClosedScope>,

    options: Options,

    /// Current recursion depth, see `Options::recursion_limit`
    depth: usize,

    /// Number of syntax faults reported
    faults: usize,

    /// Number of non-fatal diagnostics reported by the parser
    warnings: usize,
}

/// The scope of a subprogram body, kept after the parser left it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedScope {
    /// Name of the procedure, if its specification could be parsed
    pub procedure: Option<String>,

    pub scope: Scope,
}

/// Everything known after a parse finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutput {
    /// The table as left after the parse, holding only the outermost scope
    pub table: SymbolTable,

    /// Scopes of all subprogram bodies, in the order they were closed
    pub closed_scopes: Vec<ClosedScope>,

    /// Number of syntax faults reported
    pub faults: usize,

    /// Number of non-fatal diagnostics reported by the parser
    pub warnings: usize,
}

impl ParseOutput {
    /// The scope of the first procedure with the given name
    pub fn scope_of(&self, procedure: &str) -> Option<&Scope> {
        self.closed_scopes
            .iter()
            .find(|s| s.procedure.as_deref() == Some(procedure))
            .map(|s| &s.scope)
    }
}

/// An identifier as written, with where it was written
#[derive(Debug, Clone, PartialEq, Eq)]
struct Ident {
    name: String,
    location: Range<usize>,
}

/// A name used in a statement or expression
#[derive(Debug, Clone, PartialEq, Eq)]
struct Name {
    ident: Ident,

    /// What the identifier resolved to
    entry: Option<SymbolEntry>,

    /// Was the name followed by an indexed component
    indexed: bool,
}

impl<'s, R: Read> Parser<'s, R> {
    /// Construct a parser reading from `reader` and reporting to `sink`.  The
    /// symbol table starts with a scope holding the built-in names.
    pub fn new(reader: R, sink: &'s mut dyn Sink, options: Options) -> Self {
        let mut lexer = Lexer::new(CharSource::new(reader, sink));
        let token = lexer.next_token();

        Self {
            lexer,
            token,
            table: SymbolTable::with_builtins(),
            closed: vec![],
            options,
            depth: 0,
            faults: 0,
            warnings: 0,
        }
    }

    /// Parse a single subprogram body, which must make up the whole input.
    pub fn parse(mut self) -> ParseOutput {
        self.subprogram_body();

        self.skip_newlines();
        if !self.at(TokenKind::Eof) {
            let fault = self.expected(TokenKind::Eof);
            self.report_fault(fault);
        }

        debug!(
            "parse finished with {} faults and {} warnings",
            self.faults, self.warnings
        );

        ParseOutput {
            table: self.table,
            closed_scopes: self.closed,
            faults: self.faults,
            warnings: self.warnings,
        }
    }

    /// Move on to the next token
    fn advance(&mut self) {
        self.token = self.lexer.next_token();
    }

    /// Is the current token of the provided kind?
    fn at(&self, kind: TokenKind) -> bool {
        self.token.is(kind)
    }

    /// Location of the current token
    fn location(&self) -> Range<usize> {
        self.token.start..self.token.end
    }

    /// Skip newlines and unexpected tokens.  Unexpected tokens were already
    /// reported by the lexer.
    fn skip_newlines(&mut self) {
        while self.at(TokenKind::Newline) || self.at(TokenKind::Unexpected) {
            self.advance();
        }
    }

    /// Consume a token of the given kind, otherwise fault.
    ///
    /// Line terminating tokens (`is`, `loop`, `;`, `begin`, `then`) are
    /// followed by skipping any newlines.  If one of them is expected but the
    /// line has already ended, the fault is raised on the newline, so the
    /// tokens of the next line are not lost to recovery.
    fn accept(&mut self, kind: TokenKind) -> Result {
        if self.at(TokenKind::Newline) && kind.is_line_terminating() {
            return Err(self.expected(kind));
        }

        self.skip_newlines();
        if !self.at(kind) {
            return Err(self.expected(kind));
        }

        self.advance();
        if kind.is_line_terminating() {
            self.skip_newlines();
        }

        Ok(())
    }

    /// Fault for a missing terminal at the current token
    fn expected(&self, kind: TokenKind) -> SyntaxFault {
        SyntaxFault::Expected {
            expected: kind,
            found: self.token.clone(),
        }
    }

    /// Fault for a missing construct at the current token
    fn expected_one_of(&self, alternatives: &'static str) -> SyntaxFault {
        SyntaxFault::ExpectedOneOf {
            alternatives,
            found: self.token.clone(),
        }
    }

    /// Run a nested part of the parse, unless the nesting is already too deep
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.options.recursion_limit {
            return Err(SyntaxFault::DepthExceeded {
                limit: self.options.recursion_limit,
                found: self.token.clone(),
            });
        }

        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Report a non-fatal diagnostic
    fn report(&mut self, kind: impl Into<DiagnosticKind>, location: Range<usize>) {
        self.warnings += 1;
        self.lexer
            .source()
            .report(Diagnostic::new(kind, location));
    }

    fn report_fault(&mut self, fault: SyntaxFault) {
        self.faults += 1;
        let location = fault.location();
        self.lexer
            .source()
            .report(Diagnostic::new(fault, location));
    }

    /// Recovery boundary: report the fault, give up on the rest of the line
    /// and log where parsing continues.
    fn recover(&mut self, fault: SyntaxFault, resume: &str) {
        self.report_fault(fault);
        self.discard_tokens();
        info!("{resume}");
    }

    /// Discard tokens up to the end of the line, or up to a keyword that
    /// closes the enclosing statement sequence, then skip the newlines.
    fn discard_tokens(&mut self) {
        let mut discarded = vec![];
        while !matches!(
            self.token.kind(),
            TokenKind::Newline
                | TokenKind::Eof
                | TokenKind::KwEnd
                | TokenKind::KwElsif
                | TokenKind::KwElse
        ) {
            discarded.push(self.token.clone());
            self.advance();
        }

        self.skip_newlines();

        if !discarded.is_empty() {
            info!(
                "trailing tokens {} were discarded",
                discarded.iter().join(" ")
            );
        }
    }

    /// Declare a name in the innermost scope
    fn enter_symbol(&mut self, ident: &Ident, role: Role, value: Option<Value>) {
        if let Err(e) = self.table.enter_symbol(&ident.name, role, value) {
            self.report(e, ident.location.clone());
        }
    }

    /// Resolve an identifier, reporting it if it is not declared
    fn find_symbol(&mut self, ident: &Ident) -> Option<SymbolEntry> {
        let found = self
            .table
            .find_symbol(Some(&ident.name))
            .map(|entry| entry.cloned());

        match found {
            Ok(entry) => entry,
            Err(e) => {
                self.report(e, ident.location.clone());
                None
            }
        }
    }

    /// Check that a resolved identifier has the expected role.  Parameters
    /// can be used wherever variables can.
    fn check_role(&mut self, name: &Name, expected: Role) {
        let Some(entry) = &name.entry else {
            return;
        };

        let parameter_as_variable = expected == Role::Variable && entry.role == Role::Parameter;
        if entry.role != expected && !parameter_as_variable {
            let kind = DiagnosticKind::RoleMismatch {
                name: entry.name.clone(),
                expected: Expected::Role(expected),
                found: entry.role,
            };
            self.report(kind, name.ident.location.clone());
        }
    }

    /// Close the scope of a subprogram body
    fn exit_scope(&mut self, procedure: Option<String>) {
        let Some(scope) = self.table.exit_scope() else {
            return;
        };

        debug!(
            "closing scope of procedure [{}]: {scope}",
            procedure.as_deref().unwrap_or("?")
        );
        self.closed.push(ClosedScope { procedure, scope });
    }
}
