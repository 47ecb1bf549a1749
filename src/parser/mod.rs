pub mod lexer;
pub mod cursor;
pub mod ast;
pub mod grammar;
mod comment;
mod option;
mod enumeration;

use crate::error::Result;
use ast::{Message, OptionOwner, OwnerKind};
use comment::{comment_from_token, PendingComments};
use cursor::TokenStream;
use grammar::{unexpected, Context, Parser};

/// Settings for a parse.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParseOptions {
    /// Name recorded in every [`Position`](crate::Position).
    pub filename: String,
    /// Deepest allowed nesting of bodies, aggregates and lists. The default
    /// of 32 stays well inside a 2 MiB thread stack in debug builds.
    pub max_nesting_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            filename: "<input>".to_string(),
            max_nesting_depth: 32,
        }
    }
}

/// Parse a message body from a token stream whose `message` keyword has
/// already been consumed.
///
/// The stream is left positioned right after the closing `}`.
pub fn parse_message(tokens: &mut TokenStream) -> Result<Message> {
    Parser::new(tokens).parse_message()
}

/// Like [`parse_message`], with explicit options.
pub fn parse_message_with(tokens: &mut TokenStream, options: &ParseOptions) -> Result<Message> {
    Parser::with_options(tokens, options).parse_message()
}

/// Parse source text holding exactly one `message` declaration.
///
/// ```
/// let msg = protoidl::parse_message_str("message Ping { int64 sent_at = 1; }").unwrap();
/// assert_eq!(msg.name, "Ping");
/// ```
pub fn parse_message_str(source: &str) -> Result<Message> {
    parse_message_str_with(source, &ParseOptions::default())
}

/// Like [`parse_message_str`], with explicit options.
///
/// A comment run directly above the `message` keyword becomes the message's
/// leading comment. Only comments may follow the closing brace.
pub fn parse_message_str_with(source: &str, options: &ParseOptions) -> Result<Message> {
    let mut tokens = TokenStream::from_source(&options.filename, source);
    let owner = OptionOwner::new(OwnerKind::Message, "");
    let mut pending = PendingComments::default();

    let keyword = loop {
        let located = tokens.next()?;
        match comment_from_token(&located.token, located.position.clone()) {
            Some(comment) => pending.push(comment),
            None if located.token.is_ident("message") => break located,
            None => return Err(unexpected(&located, "message", Context::Decl(&owner))),
        }
    };

    let mut parser = Parser::with_options(&mut tokens, options);
    let mut message = parser.parse_message()?;
    message.comment = pending.take_for(keyword.position.line);

    loop {
        let located = tokens.next()?;
        if located.token.is_comment() {
            log::trace!("ignoring trailing comment at {}", located.position);
            continue;
        }
        if located.token == lexer::Token::Eof {
            return Ok(message);
        }
        let owner = OptionOwner::new(OwnerKind::Message, message.name.clone());
        return Err(unexpected(&located, "end of input", Context::Decl(&owner)));
    }
}
