//! Pull-based token cursor with bounded lookahead over a [`Lexer`].

use std::collections::VecDeque;

use crate::error::LexError;
use crate::position::Position;
use super::lexer::{Lexer, Located, Token};

/// Token source handed to the grammar parser.
///
/// Tokens are lexed on demand into a small ring buffer so the parser can
/// peek a few tokens ahead to tell keywords from identifiers. Lex errors
/// surface from whichever call first reaches the malformed token.
pub struct TokenStream<'a> {
    lexer: Lexer<'a>,
    buffer: VecDeque<Located>,
    last: Option<Position>,
}

impl<'a> TokenStream<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        TokenStream {
            lexer,
            buffer: VecDeque::new(),
            last: None,
        }
    }

    /// Convenience constructor lexing `input` under `filename`.
    pub fn from_source(filename: &str, input: &'a str) -> Self {
        TokenStream::new(Lexer::new(filename, input))
    }

    fn fill(&mut self, count: usize) -> Result<(), LexError> {
        while self.buffer.len() < count {
            let located = self.lexer.next_token()?;
            self.buffer.push_back(located);
        }
        Ok(())
    }

    /// Consume and return the next token.
    pub fn next(&mut self) -> Result<Located, LexError> {
        self.fill(1)?;
        let located = match self.buffer.pop_front() {
            Some(located) => located,
            None => self.lexer.next_token()?,
        };
        self.last = Some(located.position.clone());
        Ok(located)
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&mut self) -> Result<&Located, LexError> {
        self.peek_nth(0)
    }

    /// Peek at the nth token ahead (`peek_nth(0)` is `peek()`).
    pub fn peek_nth(&mut self, n: usize) -> Result<&Located, LexError> {
        self.fill(n + 1)?;
        Ok(&self.buffer[n])
    }

    /// Token kind `n` ahead, skipping nothing. Used for keyword disambiguation.
    pub fn peek_token(&mut self, n: usize) -> Result<&Token, LexError> {
        Ok(&self.peek_nth(n)?.token)
    }

    /// Push a token back to the front of the stream.
    pub fn put_back(&mut self, located: Located) {
        self.buffer.push_front(located);
    }

    /// Position of the most recently consumed token.
    pub fn last_position(&self) -> Option<&Position> {
        self.last.as_ref()
    }

    pub fn filename(&self) -> &str {
        self.lexer.filename()
    }
}
