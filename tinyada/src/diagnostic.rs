use std::{fmt::Display, io::Write, ops::Range};

use thiserror::Error;

use crate::{
    parser::SyntaxFault,
    symbol_table::{Role, SymbolError},
};

/// Severity of a given diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// A syntax fault, parsing resumed at the next recovery boundary.
    Error,

    /// Should be fixed but the parser carried on without unwinding.
    Warning,
}

/// Everything the front end can complain about
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagnosticKind {
    #[error("unexpected symbol '{0}'")]
    UnexpectedCharacter(char),

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error(transparent)]
    Symbol(#[from] SymbolError),

    #[error("{name}: expected {expected} identifier, not {found}")]
    RoleMismatch {
        name: String,
        expected: Expected,
        found: Role,
    },

    #[error(
        "unexpected name [{found}] was used after END keyword in procedure [{expected}]. \
         it should be equal to the procedure's name"
    )]
    ProcedureNameMismatch { expected: String, found: String },

    #[error(
        "failed to check if [{found}] is valid after procedure's END keyword, because the \
         procedure's name was not recognized properly due to an error in subprogram specification"
    )]
    UnknownProcedureName { found: String },

    #[error(transparent)]
    Syntax(#[from] SyntaxFault),
}

/// The role or roles an identifier was expected to have at its point of use
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Expected {
    Role(Role),
    VariableOrParameter,
}

impl Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expected::Role(role) => write!(f, "{role}"),
            Expected::VariableOrParameter => f.write_str("variable or parameter"),
        }
    }
}

impl DiagnosticKind {
    pub fn level(&self) -> Level {
        match self {
            DiagnosticKind::Syntax(_) => Level::Error,
            _ => Level::Warning,
        }
    }
}

/// A message shown to the user, with the byte range of the source it is about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,

    /// Start byte offset into the source
    pub start: usize,

    /// End byte offset into the source (exclusive)
    pub end: usize,
}

impl Diagnostic {
    pub fn new(kind: impl Into<DiagnosticKind>, location: Range<usize>) -> Self {
        Diagnostic {
            kind: kind.into(),
            start: location.start,
            end: location.end,
        }
    }

    pub fn level(&self) -> Level {
        self.kind.level()
    }

    pub fn location(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E: {}", self.kind)
    }
}

/// Destination for everything a parse wants to show the user: diagnostics and
/// the output of the built-in `print` procedure.  Reporting never fails.
pub trait Sink {
    fn diagnostic(&mut self, diagnostic: Diagnostic);

    fn print(&mut self, line: String);
}

/// Sink writing plain text lines, diagnostics prefixed with `E: `
#[derive(Debug)]
pub struct TextSink<W> {
    out: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, line: impl Display) {
        if let Err(e) = writeln!(self.out, "{line}") {
            tracing::warn!("unable to write output line: {e}");
        }
    }
}

impl<W: Write> Sink for TextSink<W> {
    fn diagnostic(&mut self, diagnostic: Diagnostic) {
        self.line(diagnostic);
    }

    fn print(&mut self, line: String) {
        self.line(line);
    }
}

/// Sink keeping everything in memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collector {
    pub diagnostics: Vec<Diagnostic>,
    pub printed: Vec<String>,
}

impl Collector {
    pub fn new() -> Self {
        Default::default()
    }

    /// The diagnostics rendered the way a `TextSink` would write them
    pub fn messages(&self) -> Vec<String> {
        self.diagnostics.iter().map(ToString::to_string).collect()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.level() == Level::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.level() == Level::Warning)
    }
}

impl Sink for Collector {
    fn diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn print(&mut self, line: String) {
        self.printed.push(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_sink_prefixes_diagnostics() {
        let mut sink = TextSink::new(vec![]);
        sink.diagnostic(Diagnostic::new(DiagnosticKind::UnexpectedCharacter('#'), 3..4));
        sink.print("5 true".to_string());

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "E: unexpected symbol '#'\n5 true\n");
    }

    #[test]
    fn role_mismatch_message() {
        let kind = DiagnosticKind::RoleMismatch {
            name: "x".into(),
            expected: Expected::VariableOrParameter,
            found: Role::Constant,
        };
        assert_eq!(
            kind.to_string(),
            "x: expected variable or parameter identifier, not constant"
        );
        assert_eq!(kind.level(), Level::Warning);
    }
}
