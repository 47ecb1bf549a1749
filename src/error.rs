use crate::position::Position;

/// Errors from the tokenizer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexError {
    #[error("{position}: unterminated string literal")]
    UnterminatedString { position: Position },

    #[error("{position}: unterminated block comment")]
    UnterminatedComment { position: Position },

    #[error("{position}: invalid numeric literal '{text}'")]
    InvalidNumber { position: Position, text: String },

    #[error("{position}: unexpected character '{ch}'")]
    UnexpectedCharacter { position: Position, ch: char },
}

impl LexError {
    pub fn position(&self) -> &Position {
        match self {
            LexError::UnterminatedString { position }
            | LexError::UnterminatedComment { position }
            | LexError::InvalidNumber { position, .. }
            | LexError::UnexpectedCharacter { position, .. } => position,
        }
    }
}

/// Grammar violations found while parsing a message body.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("{position}: found {found:?} but expected [{expected}]{context}")]
    Unexpected {
        position: Position,
        found: String,
        expected: String,
        /// Enclosing declaration, rendered as ` in message Foo` (or empty).
        context: String,
    },

    #[error("{position}: reserved statement mixes field names and field numbers{context}")]
    MixedReserved { position: Position, context: String },

    #[error("{position}: invalid integer '{text}'{context}")]
    InvalidInteger {
        position: Position,
        text: String,
        context: String,
    },

    #[error("{position}: nesting exceeds the limit of {limit} levels")]
    NestingTooDeep { position: Position, limit: usize },
}

impl ParseError {
    pub fn position(&self) -> &Position {
        match self {
            ParseError::Unexpected { position, .. }
            | ParseError::MixedReserved { position, .. }
            | ParseError::InvalidInteger { position, .. }
            | ParseError::NestingTooDeep { position, .. } => position,
        }
    }
}

/// Top-level error type that wraps all sub-errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl Error {
    /// Where the fault was detected.
    pub fn position(&self) -> &Position {
        match self {
            Error::Lex(e) => e.position(),
            Error::Parse(e) => e.position(),
        }
    }
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, Error>;
