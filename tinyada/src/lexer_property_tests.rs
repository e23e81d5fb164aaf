//! Property-based tests for the lexer, and for the parser's recovery on
//! arbitrary input.
//!
//! 1. Token spans lie within the input, in order, ending with EOF
//! 2. Words and symbols separated by blanks lex to the matching kinds
//! 3. Digit strings lex to a single literal holding the same digits
//! 4. Parsing arbitrary input terminates and leaves only the outermost scope

use proptest::prelude::*;

use crate::{
    char_source::CharSource,
    diagnostic::Collector,
    lexer::Lexer,
    parser::{Options, Parser},
    token::{Token, TokenKind, DOUBLE_OPERATORS, KEYWORD_DATA, SINGLE_OPERATORS},
};

fn lex(input: &[u8]) -> (Vec<Token>, Collector) {
    let mut sink = Collector::new();
    let tokens = Lexer::run(input, &mut sink);
    (tokens, sink)
}

/// Source text of a single token, paired with the kind it lexes to
fn word() -> impl Strategy<Value = (String, TokenKind)> {
    let keyword = prop::sample::select(KEYWORD_DATA.to_vec())
        .prop_map(|(text, kind)| (text.to_string(), kind));
    let single = prop::sample::select(SINGLE_OPERATORS.to_vec())
        .prop_map(|(c, kind)| (c.to_string(), kind));
    let double = prop::sample::select(DOUBLE_OPERATORS.to_vec())
        .prop_map(|(text, kind)| (text.to_string(), kind));
    let identifier = "[a-z][a-z0-9_]{0,8}"
        .prop_filter("not a keyword", |s| {
            KEYWORD_DATA.iter().all(|(k, _)| *k != s.as_str())
        })
        .prop_map(|s| (s, TokenKind::Identifier));

    prop_oneof![keyword, single, double, identifier]
}

proptest! {
    #[test]
    fn spans_are_ordered_and_in_bounds(input in prop::collection::vec(any::<u8>(), 0..300)) {
        let (tokens, _) = lex(&input);

        let last = tokens.last().map(|t| t.kind());
        prop_assert_eq!(last, Some(TokenKind::Eof));

        let mut previous_end = 0;
        for token in &tokens {
            prop_assert!(token.start <= token.end, "{token} at {}..{}", token.start, token.end);
            prop_assert!(token.end <= input.len(), "{token} ends past the input");
            prop_assert!(token.start >= previous_end, "{token} overlaps the previous token");
            previous_end = token.end;
        }
    }

    #[test]
    fn words_lex_to_their_kinds(
        words in prop::collection::vec(word(), 1..20),
        blank in prop::sample::select(vec![" ", "\t", "  ", " \r "]),
    ) {
        let source = words.iter().map(|(text, _)| text.as_str()).collect::<Vec<_>>().join(blank);
        let (tokens, sink) = lex(source.as_bytes());

        prop_assert!(sink.diagnostics.is_empty());
        let kinds = tokens.iter().map(|t| t.kind()).collect::<Vec<_>>();
        let mut expected = words.iter().map(|(_, kind)| *kind).collect::<Vec<_>>();
        expected.push(TokenKind::Eof);
        prop_assert_eq!(kinds, expected);
    }

    #[test]
    fn digits_lex_to_one_literal(digits in "[0-9]{1,30}") {
        let (tokens, _) = lex(digits.as_bytes());

        prop_assert_eq!(tokens.len(), 2);
        prop_assert_eq!(tokens[0].kind(), TokenKind::NumericLiteral);
        prop_assert_eq!(tokens[0].text(), Some(digits.as_str()));
    }

    #[test]
    fn peek_does_not_consume(input in prop::collection::vec(any::<u8>(), 0..50)) {
        let mut sink = Collector::new();
        let mut source = CharSource::new(input.as_slice(), &mut sink);

        while let Some(c) = source.peek() {
            prop_assert_eq!(source.peek(), Some(c));
            prop_assert_eq!(source.consume(), Some(c));
        }
        prop_assert_eq!(source.offset(), input.len());
    }

    #[test]
    fn parser_recovers_from_anything(
        input in prop::collection::vec(
            prop_oneof![
                word().prop_map(|(text, _)| text),
                Just("\n".to_string()),
                Just("procedure".to_string()),
                Just("42".to_string()),
                Just("\"s\"".to_string()),
            ],
            0..60,
        )
    ) {
        let source = input.join(" ");
        let mut sink = Collector::new();
        let output = Parser::new(source.as_bytes(), &mut sink, Options::default()).parse();

        prop_assert_eq!(output.table.depth(), 1);
        prop_assert_eq!(output.faults, sink.errors().count());
    }
}
