use std::ops::Range;

use thiserror::Error;

use crate::token::{Token, TokenKind};

/// A required part of the grammar was missing.  Faults unwind to the nearest
/// recovery boundary, where they are reported and parsing resumes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxFault {
    /// A specific terminal was required
    #[error("expected [{expected}] but {found} was detected")]
    Expected { expected: TokenKind, found: Token },

    /// One of several constructs was required, described in words
    #[error("expected {alternatives} but {found} was detected")]
    ExpectedOneOf {
        alternatives: &'static str,
        found: Token,
    },

    /// Recursion depth limit reached in the parser (try to avoid stack overflow)
    #[error("constructs are nested more than {limit} levels deep at {found}")]
    DepthExceeded { limit: usize, found: Token },
}

pub type Result<T = (), E = SyntaxFault> = std::result::Result<T, E>;

impl SyntaxFault {
    /// The token the fault was detected at
    pub fn found(&self) -> &Token {
        match self {
            SyntaxFault::Expected { found, .. }
            | SyntaxFault::ExpectedOneOf { found, .. }
            | SyntaxFault::DepthExceeded { found, .. } => found,
        }
    }

    /// Byte range of the token the fault was detected at
    pub fn location(&self) -> Range<usize> {
        let found = self.found();
        found.start..found.end
    }
}
