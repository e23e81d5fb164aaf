//! Converts the bytes of a source file into a stream of characters for the
//! lexer, and carries the message sink every later stage reports through.

use std::{
    io::{Bytes, Read},
    iter::Peekable,
};

use crate::diagnostic::{Diagnostic, Sink};

/// Character source with a single character of lookahead.  Each byte of the
/// input is one character (no multi-byte encodings).
pub struct CharSource<'s, R: Read> {
    /// Iterator over all bytes in the file
    bytes: Peekable<Bytes<R>>,

    /// Byte offset of the next character to be consumed
    offset: usize,

    /// Set once reading the input failed, the input is treated as ended
    failed: bool,

    /// Where diagnostics are written to
    sink: &'s mut dyn Sink,
}

impl<'s, R: Read> CharSource<'s, R> {
    /// Create a character source reading from `reader` and reporting to `sink`.
    pub fn new(reader: R, sink: &'s mut dyn Sink) -> Self {
        Self {
            bytes: reader.bytes().peekable(),
            offset: 0,
            failed: false,
            sink,
        }
    }

    /// The next character, without consuming it.  `None` at end of input.
    pub fn peek(&mut self) -> Option<char> {
        if self.failed {
            return None;
        }

        match self.bytes.peek()? {
            Ok(byte) => Some(decode(*byte)),
            Err(_) => {
                // a read error ends the input
                if let Some(Err(e)) = self.bytes.next() {
                    tracing::warn!("input ended early at byte {}: {e}", self.offset);
                }
                self.failed = true;
                None
            }
        }
    }

    /// Consume and return the next character.  At end of input this returns
    /// `None`, however many times it is called.
    pub fn consume(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.bytes.next();
        self.offset += 1;
        Some(ch)
    }

    /// Byte offset of the next character
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Send a diagnostic to the message sink
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.sink.diagnostic(diagnostic);
    }

    /// Send a line of program output to the message sink
    pub fn print(&mut self, line: String) {
        self.sink.print(line);
    }
}

/// Decode a single source byte: the newline, tab and carriage-return bytes
/// keep their meaning, anything else is folded to lowercase.
fn decode(byte: u8) -> char {
    match byte {
        b'\n' => '\n',
        b'\t' => '\t',
        b'\r' => '\r',
        _ => char::from(byte).to_ascii_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Collector;

    #[test]
    fn peek_does_not_advance() {
        let mut sink = Collector::new();
        let mut source = CharSource::new("Ab".as_bytes(), &mut sink);

        assert_eq!(source.peek(), Some('a'));
        assert_eq!(source.peek(), Some('a'));
        assert_eq!(source.offset(), 0);
        assert_eq!(source.consume(), Some('a'));
        assert_eq!(source.peek(), Some('b'));
        assert_eq!(source.offset(), 1);
    }

    #[test]
    fn end_of_input_is_stable() {
        let mut sink = Collector::new();
        let mut source = CharSource::new("x".as_bytes(), &mut sink);

        assert_eq!(source.consume(), Some('x'));
        assert_eq!(source.consume(), None);
        assert_eq!(source.consume(), None);
        assert_eq!(source.peek(), None);
        assert_eq!(source.offset(), 1);
    }

    #[test]
    fn control_bytes_are_kept() {
        let mut sink = Collector::new();
        let mut source = CharSource::new("\tQ\r\n".as_bytes(), &mut sink);

        let chars: Vec<_> = std::iter::from_fn(|| source.consume()).collect();
        assert_eq!(chars, ['\t', 'q', '\r', '\n']);
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn read_errors_end_the_input() {
        let mut sink = Collector::new();
        let mut source = CharSource::new(Broken, &mut sink);

        assert_eq!(source.peek(), None);
        assert_eq!(source.consume(), None);
    }
}
