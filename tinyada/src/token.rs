use std::fmt::Display;

/// All possible types of token, includes the newline, end of file and
/// unexpected token markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenKind {
    // Delimiters
    Comma,
    Colon,
    SemiColon,
    DotDot,
    LeftParen,
    RightParen,
    Assign,

    // Keywords
    KwIs,
    KwBegin,
    KwEnd,
    KwRange,
    KwArray,
    KwOf,
    KwIn,
    KwOut,
    KwThen,
    KwElsif,
    KwElse,
    KwWhen,
    KwConstant,
    KwType,
    KwProcedure,
    KwExit,
    KwIf,
    KwLoop,
    KwNull,
    KwWhile,
    KwMod,
    KwNot,
    KwAnd,
    KwOr,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Power,
    Equals,
    NotEquals,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,

    // Tokens carrying source text
    Identifier,
    NumericLiteral,
    StringLiteral,
    Unexpected,

    // Markers
    Newline,
    Eof,
}

/// String/Enum mapping for keywords
pub const KEYWORD_DATA: [(&str, TokenKind); 24] = [
    ("is", TokenKind::KwIs),
    ("begin", TokenKind::KwBegin),
    ("end", TokenKind::KwEnd),
    ("range", TokenKind::KwRange),
    ("array", TokenKind::KwArray),
    ("of", TokenKind::KwOf),
    ("in", TokenKind::KwIn),
    ("out", TokenKind::KwOut),
    ("then", TokenKind::KwThen),
    ("elsif", TokenKind::KwElsif),
    ("else", TokenKind::KwElse),
    ("when", TokenKind::KwWhen),
    ("constant", TokenKind::KwConstant),
    ("type", TokenKind::KwType),
    ("procedure", TokenKind::KwProcedure),
    ("exit", TokenKind::KwExit),
    ("if", TokenKind::KwIf),
    ("loop", TokenKind::KwLoop),
    ("null", TokenKind::KwNull),
    ("while", TokenKind::KwWhile),
    ("mod", TokenKind::KwMod),
    ("not", TokenKind::KwNot),
    ("and", TokenKind::KwAnd),
    ("or", TokenKind::KwOr),
];

/// Operators that are always a single character long
pub const SINGLE_OPERATORS: [(char, TokenKind); 7] = [
    ('+', TokenKind::Plus),
    ('-', TokenKind::Minus),
    (';', TokenKind::SemiColon),
    ('(', TokenKind::LeftParen),
    (')', TokenKind::RightParen),
    (',', TokenKind::Comma),
    ('=', TokenKind::Equals),
];

/// Operators that are valid on their own, but might also start a two
/// character operator
pub const PREFIX_OPERATORS: [(char, TokenKind); 5] = [
    ('/', TokenKind::Slash),
    (':', TokenKind::Colon),
    ('>', TokenKind::Greater),
    ('<', TokenKind::Less),
    ('*', TokenKind::Star),
];

/// The closed set of two character operators.  `..` is matched before any of
/// these.
pub const DOUBLE_OPERATORS: [(&str, TokenKind); 5] = [
    ("/=", TokenKind::NotEquals),
    (":=", TokenKind::Assign),
    ("<=", TokenKind::LessEquals),
    (">=", TokenKind::GreaterEquals),
    ("**", TokenKind::Power),
];

impl TokenKind {
    /// Does a token of this kind carry its source text
    pub fn carries_text(self) -> bool {
        matches!(
            self,
            TokenKind::Identifier
                | TokenKind::NumericLiteral
                | TokenKind::StringLiteral
                | TokenKind::Unexpected
        )
    }

    /// Terminals that always end a line of source.  Accepting one of these
    /// skips the newlines that follow it.
    pub fn is_line_terminating(self) -> bool {
        matches!(
            self,
            TokenKind::KwIs
                | TokenKind::KwLoop
                | TokenKind::SemiColon
                | TokenKind::KwBegin
                | TokenKind::KwThen
        )
    }

    pub fn is_relational(self) -> bool {
        matches!(
            self,
            TokenKind::Equals
                | TokenKind::NotEquals
                | TokenKind::Less
                | TokenKind::LessEquals
                | TokenKind::Greater
                | TokenKind::GreaterEquals
        )
    }

    pub fn is_adding(self) -> bool {
        matches!(self, TokenKind::Plus | TokenKind::Minus)
    }

    pub fn is_multiplying(self) -> bool {
        matches!(self, TokenKind::Star | TokenKind::Slash | TokenKind::KwMod)
    }

    /// The code of the token as it is shown to the user
    pub fn code(self) -> &'static str {
        match self {
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::SemiColon => ";",
            TokenKind::DotDot => "..",
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::Assign => ":=",
            TokenKind::KwIs => "is",
            TokenKind::KwBegin => "begin",
            TokenKind::KwEnd => "end",
            TokenKind::KwRange => "range",
            TokenKind::KwArray => "array",
            TokenKind::KwOf => "of",
            TokenKind::KwIn => "in",
            TokenKind::KwOut => "out",
            TokenKind::KwThen => "then",
            TokenKind::KwElsif => "elsif",
            TokenKind::KwElse => "else",
            TokenKind::KwWhen => "when",
            TokenKind::KwConstant => "constant",
            TokenKind::KwType => "type",
            TokenKind::KwProcedure => "procedure",
            TokenKind::KwExit => "exit",
            TokenKind::KwIf => "if",
            TokenKind::KwLoop => "loop",
            TokenKind::KwNull => "null",
            TokenKind::KwWhile => "while",
            TokenKind::KwMod => "mod",
            TokenKind::KwNot => "not",
            TokenKind::KwAnd => "and",
            TokenKind::KwOr => "or",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Power => "**",
            TokenKind::Equals => "=",
            TokenKind::NotEquals => "/=",
            TokenKind::Less => "<",
            TokenKind::LessEquals => "<=",
            TokenKind::Greater => ">",
            TokenKind::GreaterEquals => ">=",
            TokenKind::Identifier => "identifier",
            TokenKind::NumericLiteral => "numericLiteral",
            TokenKind::StringLiteral => "stringLiteral",
            TokenKind::Unexpected => "unexpectedToken",
            TokenKind::Newline => "newline",
            TokenKind::Eof => "EOF",
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// What was lexed, without its location.  Only some kinds of token carry the
/// text they were lexed from, so the two shapes are kept apart.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lexeme {
    Plain(TokenKind),
    WithText(TokenKind, String),
}

/// A single token from a source file
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token {
    /// The type and optional text of the token
    pub lexeme: Lexeme,

    /// The start byte index into the source file
    pub start: usize,

    /// The end byte index into the source file (exclusive upper bound)
    pub end: usize,
}

impl Token {
    /// A token that has no text attached
    pub(crate) fn plain(kind: TokenKind, start: usize, end: usize) -> Self {
        debug_assert!(!kind.carries_text(), "{kind:?} needs its text");
        Token {
            lexeme: Lexeme::Plain(kind),
            start,
            end,
        }
    }

    /// A token carrying the text it was lexed from
    pub(crate) fn with_text(kind: TokenKind, text: String, start: usize, end: usize) -> Self {
        debug_assert!(kind.carries_text(), "{kind:?} does not carry text");
        Token {
            lexeme: Lexeme::WithText(kind, text),
            start,
            end,
        }
    }

    pub fn kind(&self) -> TokenKind {
        match self.lexeme {
            Lexeme::Plain(kind) | Lexeme::WithText(kind, _) => kind,
        }
    }

    /// The source text of identifiers, literals and unexpected characters
    pub fn text(&self) -> Option<&str> {
        match &self.lexeme {
            Lexeme::Plain(_) => None,
            Lexeme::WithText(_, text) => Some(text),
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }
}

impl Display for Token {
    /// Formats as `[code]`, or `[code(value)]` for tokens with text.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.lexeme {
            Lexeme::Plain(kind) => write!(f, "[{kind}]"),
            Lexeme::WithText(kind, text) => write!(f, "[{kind}({text})]"),
        }
    }
}
