use std::fmt;
use std::sync::Arc;

use crate::error::LexError;
use crate::position::Position;

/// Token types produced by the lexer.
///
/// Keywords are not distinguished here: `message`, `option`, `repeated` and
/// friends all arrive as `Ident` and the grammar decides their role.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// An identifier or keyword
    Ident(String),
    /// Integer literal, raw text (`42`, `0x2A`, `052`)
    Int(String),
    /// Float literal, raw text (`1.5`, `.5`, `1e10`)
    Float(String),
    /// String literal without its quotes; escapes are kept verbatim
    Str { value: String, quote: char },
    /// `// ...` comment, text after the slashes
    LineComment(String),
    /// `/* ... */` comment, text between the delimiters
    BlockComment(String),
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `<`
    LAngle,
    /// `>`
    RAngle,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `=`
    Equals,
    /// `.`
    Dot,
    /// `:`
    Colon,
    /// `-`
    Minus,
    /// `+`
    Plus,
    /// `/` outside a comment (type URLs in aggregate keys)
    Slash,
    /// End of input
    Eof,
}

impl Token {
    pub fn is_comment(&self) -> bool {
        matches!(self, Token::LineComment(_) | Token::BlockComment(_))
    }

    pub fn is_ident(&self, word: &str) -> bool {
        matches!(self, Token::Ident(name) if name == word)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) | Token::Int(s) | Token::Float(s) => f.write_str(s),
            Token::Str { value, quote } => write!(f, "{quote}{value}{quote}"),
            Token::LineComment(text) => write!(f, "//{text}"),
            Token::BlockComment(text) => write!(f, "/*{text}*/"),
            Token::LBrace => f.write_str("{"),
            Token::RBrace => f.write_str("}"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::LBracket => f.write_str("["),
            Token::RBracket => f.write_str("]"),
            Token::LAngle => f.write_str("<"),
            Token::RAngle => f.write_str(">"),
            Token::Comma => f.write_str(","),
            Token::Semicolon => f.write_str(";"),
            Token::Equals => f.write_str("="),
            Token::Dot => f.write_str("."),
            Token::Colon => f.write_str(":"),
            Token::Minus => f.write_str("-"),
            Token::Plus => f.write_str("+"),
            Token::Slash => f.write_str("/"),
            Token::Eof => f.write_str("end of input"),
        }
    }
}

/// A token with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Located {
    pub token: Token,
    pub position: Position,
}

/// Tokenizer for `.proto` source text.
pub struct Lexer<'a> {
    src: &'a str,
    input: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
    filename: Arc<str>,
}

impl<'a> Lexer<'a> {
    pub fn new(filename: impl Into<Arc<str>>, input: &'a str) -> Self {
        Lexer {
            src: input,
            input: input.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
            filename: filename.into(),
        }
    }

    pub fn filename(&self) -> &Arc<str> {
        &self.filename
    }

    fn position(&self) -> Position {
        Position {
            filename: Arc::clone(&self.filename),
            line: self.line,
            column: self.column,
        }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_byte_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = *self.input.get(self.pos)?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else if b & 0xC0 != 0x80 {
            // continuation bytes of a UTF-8 sequence share the lead byte's column
            self.column += 1;
        }
        Some(b)
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\r' | b'\n' | b'\x0b' | b'\x0c') = self.peek_byte() {
            self.advance();
        }
    }

    fn read_name(&mut self) -> String {
        let start = self.pos;
        while let Some(b) = self.peek_byte() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.advance();
            } else {
                break;
            }
        }
        self.src[start..self.pos].to_string()
    }

    fn read_digits(&mut self, radix: u32) -> usize {
        let start = self.pos;
        while let Some(b) = self.peek_byte() {
            if (b as char).is_digit(radix) {
                self.advance();
            } else {
                break;
            }
        }
        self.pos - start
    }

    fn read_number(&mut self, position: Position) -> Result<Token, LexError> {
        let start = self.pos;
        let mut is_float = false;
        let mut valid = true;

        if self.peek_byte() == Some(b'0') && matches!(self.peek_byte_at(1), Some(b'x' | b'X')) {
            self.advance();
            self.advance();
            valid = self.read_digits(16) > 0;
        } else {
            self.read_digits(10);
            if self.peek_byte() == Some(b'.') {
                self.advance();
                self.read_digits(10);
                is_float = true;
            }
            if let Some(b'e' | b'E') = self.peek_byte() {
                self.advance();
                if let Some(b'+' | b'-') = self.peek_byte() {
                    self.advance();
                }
                valid = self.read_digits(10) > 0;
                is_float = true;
            }
        }

        // a number glued to identifier characters, e.g. `12abc`
        while let Some(b) = self.peek_byte() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.advance();
                valid = false;
            } else {
                break;
            }
        }

        let text = self.src[start..self.pos].to_string();
        if !valid {
            return Err(LexError::InvalidNumber { position, text });
        }
        Ok(if is_float {
            Token::Float(text)
        } else {
            Token::Int(text)
        })
    }

    fn read_string(&mut self, quote: u8, position: Position) -> Result<Token, LexError> {
        self.advance(); // opening quote
        let start = self.pos;
        loop {
            match self.peek_byte() {
                None | Some(b'\n') => return Err(LexError::UnterminatedString { position }),
                Some(b'\\') => {
                    self.advance();
                    if self.advance().is_none() {
                        return Err(LexError::UnterminatedString { position });
                    }
                }
                Some(b) if b == quote => {
                    let value = self.src[start..self.pos].to_string();
                    self.advance(); // closing quote
                    return Ok(Token::Str {
                        value,
                        quote: quote as char,
                    });
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    fn read_line_comment(&mut self) -> Token {
        self.advance();
        self.advance();
        let start = self.pos;
        while let Some(b) = self.peek_byte() {
            if b == b'\n' {
                break;
            }
            self.advance();
        }
        let text = self.src[start..self.pos].trim_end_matches('\r');
        Token::LineComment(text.to_string())
    }

    fn read_block_comment(&mut self, position: Position) -> Result<Token, LexError> {
        self.advance();
        self.advance();
        let start = self.pos;
        loop {
            match self.peek_byte() {
                None => return Err(LexError::UnterminatedComment { position }),
                Some(b'*') if self.peek_byte_at(1) == Some(b'/') => {
                    let text = self.src[start..self.pos].to_string();
                    self.advance();
                    self.advance();
                    return Ok(Token::BlockComment(text));
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    fn punct(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    /// Read the next token. Returns `Eof` repeatedly once input is exhausted.
    pub fn next_token(&mut self) -> Result<Located, LexError> {
        self.skip_whitespace();
        let position = self.position();

        let token = match self.peek_byte() {
            None => Token::Eof,
            Some(b'/') => match self.peek_byte_at(1) {
                Some(b'/') => self.read_line_comment(),
                Some(b'*') => self.read_block_comment(position.clone())?,
                _ => self.punct(Token::Slash),
            },
            Some(q @ (b'"' | b'\'')) => self.read_string(q, position.clone())?,
            Some(b) if b.is_ascii_digit() => self.read_number(position.clone())?,
            Some(b'.') if self.peek_byte_at(1).is_some_and(|b| b.is_ascii_digit()) => {
                self.read_number(position.clone())?
            }
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => Token::Ident(self.read_name()),
            Some(b'{') => self.punct(Token::LBrace),
            Some(b'}') => self.punct(Token::RBrace),
            Some(b'(') => self.punct(Token::LParen),
            Some(b')') => self.punct(Token::RParen),
            Some(b'[') => self.punct(Token::LBracket),
            Some(b']') => self.punct(Token::RBracket),
            Some(b'<') => self.punct(Token::LAngle),
            Some(b'>') => self.punct(Token::RAngle),
            Some(b',') => self.punct(Token::Comma),
            Some(b';') => self.punct(Token::Semicolon),
            Some(b'=') => self.punct(Token::Equals),
            Some(b'.') => self.punct(Token::Dot),
            Some(b':') => self.punct(Token::Colon),
            Some(b'-') => self.punct(Token::Minus),
            Some(b'+') => self.punct(Token::Plus),
            Some(_) => {
                let ch = self.src[self.pos..].chars().next().unwrap_or('\u{fffd}');
                return Err(LexError::UnexpectedCharacter { position, ch });
            }
        };

        Ok(Located { token, position })
    }
}

/// Tokenize a whole source text, including the trailing `Eof`.
pub fn tokenize(filename: &str, input: &str) -> Result<Vec<Located>, LexError> {
    let mut lexer = Lexer::new(filename, input);
    let mut tokens = Vec::new();
    loop {
        let located = lexer.next_token()?;
        let done = located.token == Token::Eof;
        tokens.push(located);
        if done {
            return Ok(tokens);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize("<input>", input)
            .unwrap()
            .into_iter()
            .map(|l| l.token)
            .collect()
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            kinds("message Out { string id = 1; }"),
            vec![
                Token::Ident("message".into()),
                Token::Ident("Out".into()),
                Token::LBrace,
                Token::Ident("string".into()),
                Token::Ident("id".into()),
                Token::Equals,
                Token::Int("1".into()),
                Token::Semicolon,
                Token::RBrace,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_are_identifiers() {
        assert_eq!(
            kinds("message option repeated"),
            vec![
                Token::Ident("message".into()),
                Token::Ident("option".into()),
                Token::Ident("repeated".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("12 0x1F 1.5 .5 1e10 2E-3 5."),
            vec![
                Token::Int("12".into()),
                Token::Int("0x1F".into()),
                Token::Float("1.5".into()),
                Token::Float(".5".into()),
                Token::Float("1e10".into()),
                Token::Float("2E-3".into()),
                Token::Float("5.".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_invalid_numbers() {
        let err = tokenize("<input>", "x = 12abc;").unwrap_err();
        assert!(matches!(err, LexError::InvalidNumber { ref text, .. } if text == "12abc"));
        assert_eq!(err.position().column, 5);

        let err = tokenize("<input>", "0x").unwrap_err();
        assert!(matches!(err, LexError::InvalidNumber { .. }));

        let err = tokenize("<input>", "1e+").unwrap_err();
        assert!(matches!(err, LexError::InvalidNumber { .. }));
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            kinds(r#"'' "things" "a\"b""#),
            vec![
                Token::Str { value: "".into(), quote: '\'' },
                Token::Str { value: "things".into(), quote: '"' },
                Token::Str { value: r#"a\"b"#.into(), quote: '"' },
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("<input>", "x = \"abc\n\";").unwrap_err();
        assert_eq!(
            err,
            LexError::UnterminatedString {
                position: Position::new("<input>", 1, 5)
            }
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("// one\r\n/* two\nthree */ x"),
            vec![
                Token::LineComment(" one".into()),
                Token::BlockComment(" two\nthree ".into()),
                Token::Ident("x".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = tokenize("<input>", "a\n  /* never closed").unwrap_err();
        assert_eq!(
            err,
            LexError::UnterminatedComment {
                position: Position::new("<input>", 2, 3)
            }
        );
    }

    #[test]
    fn test_line_and_column_tracking() {
        let tokens = tokenize("<input>", "\n\t\tstring   id\n  ;").unwrap();
        let at: Vec<(usize, usize)> = tokens
            .iter()
            .map(|t| (t.position.line, t.position.column))
            .collect();
        assert_eq!(at, vec![(2, 3), (2, 12), (3, 3), (3, 4)]);
    }

    #[test]
    fn test_positions_share_filename() {
        let mut lexer = Lexer::new("shared.proto", "a b");
        let a = lexer.next_token().unwrap();
        let b = lexer.next_token().unwrap();
        assert_eq!(&**lexer.filename(), "shared.proto");
        assert!(Arc::ptr_eq(&a.position.filename, lexer.filename()));
        assert!(Arc::ptr_eq(&a.position.filename, &b.position.filename));
    }

    #[test]
    fn test_multibyte_in_comment_counts_one_column() {
        let tokens = tokenize("<input>", "// é\n/*é*/ x").unwrap();
        assert_eq!(tokens[2].position, Position::new("<input>", 2, 7));
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("<input>", "a @").unwrap_err();
        assert_eq!(
            err,
            LexError::UnexpectedCharacter {
                position: Position::new("<input>", 1, 3),
                ch: '@'
            }
        );
    }

    #[test]
    fn test_slash_outside_comment() {
        assert_eq!(
            kinds("a/b"),
            vec![
                Token::Ident("a".into()),
                Token::Slash,
                Token::Ident("b".into()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_eof_repeats() {
        let mut lex = Lexer::new("<input>", "x");
        assert_eq!(lex.next_token().unwrap().token, Token::Ident("x".into()));
        assert_eq!(lex.next_token().unwrap().token, Token::Eof);
        assert_eq!(lex.next_token().unwrap().token, Token::Eof);
    }
}
