#![forbid(unsafe_code)]

mod char_source;
mod compiler;
mod diagnostic;
mod lexer;
mod parser;
mod symbol_table;
mod token;
mod value;

#[cfg(test)]
mod lexer_property_tests;

pub use char_source::CharSource;
pub use compiler::Compiler;
pub use diagnostic::{Collector, Diagnostic, DiagnosticKind, Expected, Level, Sink, TextSink};
pub use lexer::Lexer;
pub use parser::{ClosedScope, Options, ParseOutput, Parser, SyntaxFault};
pub use symbol_table::{Role, Scope, SymbolEntry, SymbolError, SymbolTable};
pub use token::{Lexeme, Token, TokenKind};
pub use value::Value;
