use std::{collections::HashMap, io::Read, sync::OnceLock};

use crate::{
    char_source::CharSource,
    diagnostic::{Diagnostic, DiagnosticKind, Sink},
    token::{self, Token, TokenKind},
};

/// State for converting a character stream into a token stream.  Tokens are
/// produced one at a time, on request from the parser.
pub struct Lexer<'s, R: Read> {
    /// Where characters are read from and errors reported to
    source: CharSource<'s, R>,
}

impl<'s, R: Read> Lexer<'s, R> {
    pub fn new(source: CharSource<'s, R>) -> Self {
        Self { source }
    }

    /// Get all tokens for a source file, ending with the end of file token.
    pub fn run(reader: R, sink: &'s mut dyn Sink) -> Vec<Token> {
        let mut lexer = Lexer::new(CharSource::new(reader, sink));

        let mut tokens = vec![];
        loop {
            let tok = lexer.next_token();
            let eof = tok.is(TokenKind::Eof);
            tokens.push(tok);
            if eof {
                break;
            }
        }

        tokens
    }

    /// The character source the lexer reads from
    pub fn source(&mut self) -> &mut CharSource<'s, R> {
        &mut self.source
    }

    /// Get the next available token.  Once the input is exhausted, every call
    /// returns an end of file token.  Lexical errors are reported and turned
    /// into unexpected tokens, lexing always carries on.
    pub fn next_token(&mut self) -> Token {
        while self.source.peek().is_some_and(is_ignored) {
            self.source.consume();
        }

        let start = self.source.offset();
        let tok = match self.source.peek() {
            None => Token::plain(TokenKind::Eof, start, start),
            Some('\n') => {
                self.source.consume();
                Token::plain(TokenKind::Newline, start, start + 1)
            }
            Some(c) if c.is_ascii_alphabetic() => self.alphabetic(start),
            Some(c) if c.is_ascii_digit() => self.integer(start),
            Some('"') => self.string(start),
            Some(_) => self.operator(start),
        };

        tracing::trace!("lexed {tok} at {}..{}", tok.start, tok.end);
        tok
    }

    /// Scan an identifier or a reserved word
    fn alphabetic(&mut self, start: usize) -> Token {
        let mut value = String::new();
        while let Some(c) = self.source.peek().filter(|&c| !is_delimiter(c)) {
            value.push(c);
            self.source.consume();
        }

        let end = self.source.offset();
        match keywords().get(value.as_str()) {
            Some(&kind) => Token::plain(kind, start, end),
            None => Token::with_text(TokenKind::Identifier, value, start, end),
        }
    }

    /// Scan an integer literal, a series of digits.  The digits are kept as
    /// text, converting them to a number is left to the parser.
    fn integer(&mut self, start: usize) -> Token {
        let mut value = String::new();
        while let Some(c) = self.source.peek().filter(char::is_ascii_digit) {
            value.push(c);
            self.source.consume();
        }

        Token::with_text(TokenKind::NumericLiteral, value, start, self.source.offset())
    }

    /// Scan a string literal.  The quotes are not part of the value.  A string
    /// must be closed on the line it was opened.
    fn string(&mut self, start: usize) -> Token {
        self.source.consume(); // opening quote

        let mut value = String::new();
        loop {
            match self.source.peek() {
                Some('"') => {
                    self.source.consume();
                    break;
                }
                Some('\n') | None => {
                    let end = self.source.offset();
                    self.source
                        .report(Diagnostic::new(DiagnosticKind::UnterminatedString, start..end));
                    break;
                }
                Some(c) => {
                    value.push(c);
                    self.source.consume();
                }
            }
        }

        Token::with_text(TokenKind::StringLiteral, value, start, self.source.offset())
    }

    /// Scan an operator symbol.  Characters that do not start any operator
    /// are reported and returned as an unexpected token.
    fn operator(&mut self, start: usize) -> Token {
        let Some(first) = self.source.consume() else {
            return Token::plain(TokenKind::Eof, start, start);
        };

        if first == '.' && self.source.peek() == Some('.') {
            self.source.consume();
            return Token::plain(TokenKind::DotDot, start, start + 2);
        }

        if let Some(&(_, kind)) = token::SINGLE_OPERATORS.iter().find(|(c, _)| *c == first) {
            return Token::plain(kind, start, start + 1);
        }

        if let Some(&(_, single)) = token::PREFIX_OPERATORS.iter().find(|(c, _)| *c == first) {
            let double = self.source.peek().and_then(|second| {
                token::DOUBLE_OPERATORS
                    .iter()
                    .find(|(s, _)| s.starts_with(first) && s.ends_with(second))
                    .map(|&(_, kind)| kind)
            });

            return match double {
                Some(kind) => {
                    self.source.consume();
                    Token::plain(kind, start, start + 2)
                }
                None => Token::plain(single, start, start + 1),
            };
        }

        self.source.report(Diagnostic::new(
            DiagnosticKind::UnexpectedCharacter(first),
            start..start + 1,
        ));
        Token::with_text(TokenKind::Unexpected, first.to_string(), start, start + 1)
    }
}

/// Characters skipped between tokens.  Newlines are tokens of their own.
fn is_ignored(c: char) -> bool {
    matches!(c, ' ' | '\r' | '\t')
}

/// Characters that cannot be part of an identifier or reserved word
fn is_delimiter(c: char) -> bool {
    is_ignored(c) || c == '\n' || (c.is_ascii_punctuation() && c != '_')
}

/// Get a mapping from keyword strings to their token kind
fn keywords() -> &'static HashMap<&'static str, TokenKind> {
    static KEYWORDS: OnceLock<HashMap<&'static str, TokenKind>> = OnceLock::new();
    KEYWORDS.get_or_init(|| HashMap::from(token::KEYWORD_DATA))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{diagnostic::Collector, token::Lexeme};

    fn lex(source: &str) -> (Vec<Token>, Collector) {
        let mut sink = Collector::new();
        let tokens = Lexer::run(source.as_bytes(), &mut sink);
        (tokens, sink)
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).0.iter().map(Token::kind).collect()
    }

    #[test]
    fn procedure_header() {
        use TokenKind::*;
        assert_eq!(
            kinds("procedure P is\nbegin"),
            [KwProcedure, Identifier, KwIs, Newline, KwBegin, Eof]
        );
    }

    #[test]
    fn identifiers_are_lowercased() {
        let (tokens, _) = lex("Total_Sum");
        assert_eq!(
            tokens[0].lexeme,
            Lexeme::WithText(TokenKind::Identifier, "total_sum".into())
        );
        assert_eq!((tokens[0].start, tokens[0].end), (0, 9));
    }

    #[test]
    fn double_operators() {
        use TokenKind::*;
        assert_eq!(
            kinds("x:=1**2 /= 3<=4>=5 1..2"),
            [
                Identifier,
                Assign,
                NumericLiteral,
                Power,
                NumericLiteral,
                NotEquals,
                NumericLiteral,
                LessEquals,
                NumericLiteral,
                GreaterEquals,
                NumericLiteral,
                NumericLiteral,
                DotDot,
                NumericLiteral,
                Eof
            ]
        );
    }

    #[test]
    fn prefix_operator_falls_back_to_single() {
        use TokenKind::*;
        assert_eq!(
            kinds("a:b*c/d<e>f"),
            [
                Identifier, Colon, Identifier, Star, Identifier, Slash, Identifier, Less,
                Identifier, Greater, Identifier, Eof,
            ]
        );
        // `*=` is not an operator, so it is `*` followed by `=`
        assert_eq!(kinds("*="), [Star, Equals, Eof]);
    }

    #[test]
    fn string_literal_excludes_quotes() {
        let (tokens, sink) = lex("\"Hello World\";");
        assert_eq!(tokens[0].text(), Some("hello world"));
        assert!(tokens[0].is(TokenKind::StringLiteral));
        assert!(tokens[1].is(TokenKind::SemiColon));
        assert!(sink.diagnostics.is_empty());
    }

    #[test]
    fn unterminated_string_is_reported() {
        let (tokens, sink) = lex("\"abc\nx");
        assert_eq!(tokens[0].text(), Some("abc"));
        assert!(tokens[1].is(TokenKind::Newline));
        assert_eq!(sink.messages(), ["E: unterminated string literal"]);
    }

    #[test]
    fn unexpected_characters_do_not_stop_lexing() {
        let (tokens, sink) = lex("a # b . c");
        let kinds: Vec<_> = tokens.iter().map(Token::kind).collect();
        assert_eq!(
            kinds,
            [
                TokenKind::Identifier,
                TokenKind::Unexpected,
                TokenKind::Identifier,
                TokenKind::Unexpected,
                TokenKind::Identifier,
                TokenKind::Eof
            ]
        );
        assert_eq!(tokens[1].text(), Some("#"));
        assert_eq!(
            sink.messages(),
            ["E: unexpected symbol '#'", "E: unexpected symbol '.'"]
        );
    }

    #[test]
    fn eof_repeats() {
        let mut sink = Collector::new();
        let mut lexer = Lexer::new(CharSource::new("  ".as_bytes(), &mut sink));
        assert!(lexer.next_token().is(TokenKind::Eof));
        assert!(lexer.next_token().is(TokenKind::Eof));
    }

    #[test]
    fn integer_keeps_leading_zeros() {
        let (tokens, _) = lex("042;");
        assert_eq!(tokens[0].text(), Some("042"));
    }

    #[test]
    fn identifier_stops_at_punctuation() {
        use TokenKind::*;
        assert_eq!(
            kinds("a(i,j);"),
            [Identifier, LeftParen, Identifier, Comma, Identifier, RightParen, SemiColon, Eof]
        );
    }
}
