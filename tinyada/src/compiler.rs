//! The primary interface to the TinyAda front end.

use std::{
    io::Read,
    ops::{Deref, DerefMut},
};

use crate::{
    diagnostic::Sink,
    lexer::Lexer,
    parser::{Options, ParseOutput, Parser},
    token::Token,
};

/// Entry point for checking TinyAda sources.  Diagnostics and the output of
/// `print` calls go to the sink given to each call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Compiler {
    options: Options,
}

impl Compiler {
    /// Create a new compiler with the default options
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_options(options: Options) -> Self {
        Self { options }
    }

    /// Parse one source file containing a single subprogram body.
    pub fn parse<R: Read>(&self, reader: R, sink: &mut dyn Sink) -> ParseOutput {
        tracing::debug!(options = ?self.options, "parsing");
        Parser::new(reader, sink, self.options).parse()
    }

    /// Split a source file into tokens, without parsing it.  The last token
    /// is always the end of file.
    pub fn tokens<R: Read>(&self, reader: R, sink: &mut dyn Sink) -> Vec<Token> {
        Lexer::run(reader, sink)
    }
}

impl Deref for Compiler {
    type Target = Options;

    fn deref(&self) -> &Self::Target {
        &self.options
    }
}

impl DerefMut for Compiler {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{diagnostic::Collector, token::TokenKind};

    #[test]
    fn options_are_passed_to_the_parser() {
        let mut compiler = Compiler::new();
        compiler.recursion_limit = 1;

        let mut sink = Collector::new();
        let output = compiler.parse(
            "procedure p is\nx : constant := (1);\nbegin null; end p;".as_bytes(),
            &mut sink,
        );
        assert_eq!(output.faults, 1);
    }

    #[test]
    fn tokens_end_with_eof() {
        let mut sink = Collector::new();
        let tokens = Compiler::new().tokens("null;".as_bytes(), &mut sink);

        let kinds = tokens.iter().map(Token::kind).collect::<Vec<_>>();
        assert_eq!(
            kinds,
            [TokenKind::KwNull, TokenKind::SemiColon, TokenKind::Eof]
        );
    }
}
