//! Recursive-descent grammar for message bodies.
//!
//! Keywords are resolved by position: a word such as `message` or `repeated`
//! only acts as a keyword when the tokens after it fit the declaration it
//! would start, otherwise it is read as a type or field name.

use crate::error::{Error, ParseError, Result};
use crate::position::Position;
use super::ast::*;
use super::comment::{comment_from_token, Body};
use super::cursor::TokenStream;
use super::lexer::{Located, Token};
use super::ParseOptions;

/// What is being parsed, for error messages.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Context<'c> {
    Decl(&'c OptionOwner),
    Option {
        name: &'c str,
        owner: &'c OptionOwner,
    },
}

impl Context<'_> {
    fn render(&self) -> String {
        match self {
            Context::Decl(owner) => format!(" in {}", owner.describe()),
            Context::Option { name, owner } => {
                format!(" in option {} of {}", name, owner.describe())
            }
        }
    }
}

pub(crate) fn unexpected(found: &Located, expected: &str, ctx: Context<'_>) -> Error {
    ParseError::Unexpected {
        position: found.position.clone(),
        found: found.token.to_string(),
        expected: expected.to_string(),
        context: ctx.render(),
    }
    .into()
}

/// Parse an integer literal as written: decimal, `0x` hex or leading-zero octal.
pub(crate) fn parse_int_literal(text: &str) -> Option<i64> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()
    } else if text.len() > 1 && text.starts_with('0') {
        i64::from_str_radix(&text[1..], 8).ok()
    } else {
        text.parse().ok()
    }
}

/// Recursive-descent parser over a [`TokenStream`].
pub struct Parser<'s, 'a> {
    pub(crate) tokens: &'s mut TokenStream<'a>,
    max_depth: usize,
    depth: usize,
}

impl<'s, 'a> Parser<'s, 'a> {
    pub fn new(tokens: &'s mut TokenStream<'a>) -> Self {
        Parser::with_options(tokens, &ParseOptions::default())
    }

    pub fn with_options(tokens: &'s mut TokenStream<'a>, options: &ParseOptions) -> Self {
        Parser {
            tokens,
            max_depth: options.max_nesting_depth,
            depth: 0,
        }
    }

    /// Parse a message whose `message` keyword the caller has just consumed.
    ///
    /// Reads the name, the `{`, every element and the closing `}`. Tokens
    /// after the closing brace are left in the stream.
    pub fn parse_message(&mut self) -> Result<Message> {
        let position = match self.tokens.last_position() {
            Some(position) => position.clone(),
            None => self.tokens.peek()?.position.clone(),
        };
        self.parse_message_decl(position, None, false).map(|message| *message)
    }

    // Token helpers

    pub(crate) fn next(&mut self) -> Result<Located> {
        Ok(self.tokens.next()?)
    }

    pub(crate) fn peek(&mut self, n: usize) -> Result<&Token> {
        Ok(self.tokens.peek_token(n)?)
    }

    pub(crate) fn peek_located(&mut self) -> Result<Located> {
        Ok(self.tokens.peek()?.clone())
    }

    pub(crate) fn peek_is(&mut self, n: usize, token: &Token) -> Result<bool> {
        Ok(self.peek(n)? == token)
    }

    fn peek_is_name(&mut self, n: usize) -> Result<bool> {
        Ok(matches!(self.peek(n)?, Token::Ident(_)))
    }

    /// Line of the most recently consumed token.
    pub(crate) fn last_line(&self) -> usize {
        self.tokens.last_position().map_or(0, |p| p.line)
    }

    pub(crate) fn expect(&mut self, token: Token, expected: &str, ctx: Context<'_>) -> Result<Located> {
        let located = self.next()?;
        if located.token == token {
            Ok(located)
        } else {
            Err(unexpected(&located, expected, ctx))
        }
    }

    /// Any word, keyword or not.
    pub(crate) fn expect_ident(&mut self, expected: &str, ctx: Context<'_>) -> Result<String> {
        let located = self.next()?;
        match located.token {
            Token::Ident(name) => Ok(name),
            _ => Err(unexpected(&located, expected, ctx)),
        }
    }

    /// `ident { "." ident }`
    pub(crate) fn parse_full_ident(&mut self, expected: &str, ctx: Context<'_>) -> Result<String> {
        let mut name = self.expect_ident(expected, ctx)?;
        while self.peek_is(0, &Token::Dot)? && self.peek_is_name(1)? {
            self.next()?;
            name.push('.');
            name.push_str(&self.expect_ident(expected, ctx)?);
        }
        Ok(name)
    }

    /// `[ "." ] ident { "." ident }`
    pub(crate) fn parse_type_name(&mut self, expected: &str, ctx: Context<'_>) -> Result<String> {
        if self.peek_is(0, &Token::Dot)? {
            self.next()?;
            let rest = self.parse_full_ident(expected, ctx)?;
            return Ok(format!(".{rest}"));
        }
        self.parse_full_ident(expected, ctx)
    }

    pub(crate) fn parse_integer(&mut self, expected: &str, ctx: Context<'_>) -> Result<i64> {
        let located = self.next()?;
        match &located.token {
            Token::Int(text) => parse_int_literal(text).ok_or_else(|| {
                ParseError::InvalidInteger {
                    position: located.position.clone(),
                    text: text.clone(),
                    context: ctx.render(),
                }
                .into()
            }),
            _ => Err(unexpected(&located, expected, ctx)),
        }
    }

    pub(crate) fn parse_signed_integer(&mut self, expected: &str, ctx: Context<'_>) -> Result<i64> {
        if self.peek_is(0, &Token::Minus)? {
            let minus = self.next()?;
            let value = self.parse_integer(expected, ctx)?;
            return value.checked_neg().ok_or_else(|| {
                ParseError::InvalidInteger {
                    position: minus.position,
                    text: format!("-{value}"),
                    context: ctx.render(),
                }
                .into()
            });
        }
        self.parse_integer(expected, ctx)
    }

    /// A comment on the same line as the token just consumed.
    pub(crate) fn inline_comment(&mut self) -> Result<Option<Comment>> {
        let line = self.last_line();
        let located = self.tokens.peek()?;
        if !located.token.is_comment() || located.position.line != line {
            return Ok(None);
        }
        let located = self.next()?;
        Ok(comment_from_token(&located.token, located.position))
    }

    /// Run `f` one nesting level deeper, failing past the configured limit.
    pub(crate) fn nested<T>(
        &mut self,
        at: &Position,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        if self.depth >= self.max_depth {
            return Err(ParseError::NestingTooDeep {
                position: at.clone(),
                limit: self.max_depth,
            }
            .into());
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // Keyword disambiguation

    /// `kw Name ...` where the second word is not a field name followed by `=`.
    fn declares_named_block(&mut self) -> Result<bool> {
        Ok(self.peek_is_name(1)? && !self.peek_is(2, &Token::Equals)?)
    }

    /// `option name` / `option (ext)`; `option.x` is a field type.
    pub(crate) fn starts_option(&mut self) -> Result<bool> {
        Ok(matches!(self.peek(1)?, Token::Ident(_) | Token::LParen))
    }

    /// `reserved 1`, `reserved "a"`, `reserved -1`, `reserved a, b;`
    pub(crate) fn starts_reserved(&mut self) -> Result<bool> {
        let next = self.peek(1)?.clone();
        Ok(match next {
            Token::Int(_) | Token::Str { .. } | Token::Minus => true,
            Token::Ident(_) => matches!(self.peek(2)?, Token::Comma | Token::Semicolon),
            _ => false,
        })
    }

    /// A label followed by a type: `repeated string x`, `repeated .pkg.T x`.
    fn starts_qualified(&mut self) -> Result<bool> {
        let next = self.peek(1)?.clone();
        Ok(match next {
            Token::Dot => true,
            Token::Ident(_) => !self.peek_is(2, &Token::Equals)?,
            _ => false,
        })
    }

    /// `group Name = N {` or `group Name = N [opts] {`, starting `offset` tokens ahead.
    /// A `;` after the number means a field whose type is named `group`.
    pub(crate) fn starts_group(&mut self, offset: usize) -> Result<bool> {
        Ok(self.peek(offset)?.is_ident("group")
            && self.peek_is_name(offset + 1)?
            && self.peek_is(offset + 2, &Token::Equals)?
            && matches!(self.peek(offset + 3)?, Token::Int(_))
            && !self.peek_is(offset + 4, &Token::Semicolon)?)
    }

    // Declarations

    pub(crate) fn parse_message_decl(
        &mut self,
        position: Position,
        comment: Option<Comment>,
        is_extend: bool,
    ) -> Result<Box<Message>> {
        let kind = if is_extend { OwnerKind::Extend } else { OwnerKind::Message };
        let unnamed = OptionOwner::new(kind, "");
        let name = if is_extend {
            self.parse_type_name("extend identifier", Context::Decl(&unnamed))?
        } else {
            self.expect_ident("message identifier", Context::Decl(&unnamed))?
        };
        log::debug!("parsing {} {} at {}", kind.as_str(), name, position);

        let owner = OptionOwner::new(kind, name);
        let elements = self.parse_block(&owner, &position)?;
        Ok(Box::new(Message {
            name: owner.name,
            elements,
            is_extend,
            position,
            comment,
        }))
    }

    /// `{ element* }`, allowing comments before the opening brace.
    fn parse_block(&mut self, owner: &OptionOwner, opening: &Position) -> Result<Vec<Element>> {
        self.nested(opening, |p| {
            let ctx = Context::Decl(owner);
            let mut body = Body::new();
            loop {
                let located = p.next()?;
                if let Some(comment) = comment_from_token(&located.token, located.position.clone()) {
                    body.push_comment(comment);
                    continue;
                }
                if located.token == Token::LBrace {
                    break;
                }
                let expected = format!("{} opening {{", owner.kind.as_str());
                return Err(unexpected(&located, &expected, ctx));
            }
            body.detach();
            while p.parse_body_element(&mut body, owner)? {}
            Ok(body.into_elements())
        })
    }

    /// Parse one element of a message, group or extend body into `body`.
    /// Returns `false` once the closing brace has been consumed.
    fn parse_body_element(&mut self, body: &mut Body<Element>, owner: &OptionOwner) -> Result<bool> {
        let ctx = Context::Decl(owner);
        let located = self.peek_located()?;
        let position = located.position.clone();

        let word = match &located.token {
            token if token.is_comment() => {
                self.next()?;
                if let Some(comment) = comment_from_token(token, position) {
                    body.push_comment(comment);
                }
                return Ok(true);
            }
            Token::Semicolon => {
                self.next()?;
                body.detach();
                return Ok(true);
            }
            Token::RBrace => {
                self.next()?;
                return Ok(false);
            }
            Token::Ident(word) => word.clone(),
            Token::Dot => String::new(),
            Token::Eof => {
                let expected = format!("{} closing }}", owner.kind.as_str());
                return Err(unexpected(&located, &expected, ctx));
            }
            _ => {
                let expected = format!("{} element or closing }}", owner.kind.as_str());
                return Err(unexpected(&located, &expected, ctx));
            }
        };

        let element = match word.as_str() {
            "message" | "extend"
                if self.declares_named_block()?
                    || (word == "extend" && self.peek_is(1, &Token::Dot)?) =>
            {
                self.next()?;
                let comment = body.take_leading(position.line);
                Element::Message(self.parse_message_decl(position, comment, word == "extend")?)
            }
            "enum" if self.declares_named_block()? => {
                self.next()?;
                let comment = body.take_leading(position.line);
                Element::Enum(self.parse_enum(position, comment)?)
            }
            "oneof" if self.declares_named_block()? => {
                self.next()?;
                let comment = body.take_leading(position.line);
                Element::OneOf(self.parse_oneof(position, comment)?)
            }
            "map" if self.peek_is(1, &Token::LAngle)? => {
                self.next()?;
                let comment = body.take_leading(position.line);
                Element::MapField(self.parse_map_field(position, comment, ctx)?)
            }
            "option" if self.starts_option()? => {
                self.next()?;
                let comment = body.take_leading(position.line);
                Element::Option(self.parse_option_statement(position, comment, owner)?)
            }
            "reserved" if self.starts_reserved()? => {
                self.next()?;
                let comment = body.take_leading(position.line);
                Element::Reserved(self.parse_reserved(position, comment, ctx)?)
            }
            "extensions" if matches!(self.peek(1)?, Token::Int(_) | Token::Minus) => {
                self.next()?;
                let comment = body.take_leading(position.line);
                Element::Extensions(self.parse_extensions(position, comment, ctx)?)
            }
            "group" if self.starts_group(0)? => {
                self.next()?;
                let comment = body.take_leading(position.line);
                Element::Group(self.parse_group(Qualifier::None, position, comment, ctx)?)
            }
            _ => {
                let qualifier = Qualifier::from_keyword(&word);
                let comment = body.take_leading(position.line);
                match qualifier {
                    Some(qualifier) if self.starts_qualified()? => {
                        self.next()?;
                        if self.starts_group(0)? {
                            self.next()?;
                            Element::Group(self.parse_group(qualifier, position, comment, ctx)?)
                        } else {
                            Element::NormalField(self.parse_normal_field(qualifier, position, comment, ctx)?)
                        }
                    }
                    _ => Element::NormalField(self.parse_normal_field(
                        Qualifier::None,
                        position,
                        comment,
                        ctx,
                    )?),
                }
            }
        };

        body.push(element);
        Ok(true)
    }

    /// `type name = number [options];` with the qualifier already consumed.
    pub(crate) fn parse_normal_field(
        &mut self,
        qualifier: Qualifier,
        position: Position,
        comment: Option<Comment>,
        ctx: Context<'_>,
    ) -> Result<Box<NormalField>> {
        let type_name = self.parse_type_name("field type", ctx)?;
        let name = self.expect_ident("field identifier", ctx)?;
        self.expect(Token::Equals, "field =", ctx)?;
        let field_number = self.parse_integer("field number", ctx)?;

        let owner = OptionOwner::new(OwnerKind::NormalField, name);
        let options = self.parse_option_list(&owner)?;
        self.expect(Token::Semicolon, "field ;", Context::Decl(&owner))?;
        let inline_comment = self.inline_comment()?;

        Ok(Box::new(NormalField {
            name: owner.name,
            type_name,
            qualifier,
            field_number,
            options,
            position,
            comment,
            inline_comment,
        }))
    }

    /// `<KeyType, ValueType> name = number [options];` after `map`.
    fn parse_map_field(
        &mut self,
        position: Position,
        comment: Option<Comment>,
        ctx: Context<'_>,
    ) -> Result<Box<MapField>> {
        self.expect(Token::LAngle, "map <", ctx)?;
        let key_type = self.parse_type_name("map key type", ctx)?;
        self.expect(Token::Comma, "map ,", ctx)?;
        let value_type = self.parse_type_name("map value type", ctx)?;
        self.expect(Token::RAngle, "map >", ctx)?;
        let name = self.expect_ident("map field identifier", ctx)?;
        self.expect(Token::Equals, "map field =", ctx)?;
        let field_number = self.parse_integer("map field number", ctx)?;

        let owner = OptionOwner::new(OwnerKind::MapField, name);
        let options = self.parse_option_list(&owner)?;
        self.expect(Token::Semicolon, "map field ;", Context::Decl(&owner))?;
        let inline_comment = self.inline_comment()?;

        Ok(Box::new(MapField {
            name: owner.name,
            key_type,
            value_type,
            field_number,
            options,
            position,
            comment,
            inline_comment,
        }))
    }

    /// `name { field* }` after `oneof`.
    fn parse_oneof(&mut self, position: Position, comment: Option<Comment>) -> Result<Box<OneOf>> {
        let unnamed = OptionOwner::new(OwnerKind::OneOf, "");
        let name = self.expect_ident("oneof identifier", Context::Decl(&unnamed))?;
        let owner = OptionOwner::new(OwnerKind::OneOf, name);

        let elements = self.nested(&position, |p| {
            let ctx = Context::Decl(&owner);
            let mut body = Body::new();
            loop {
                let located = p.next()?;
                if let Some(comment) = comment_from_token(&located.token, located.position.clone()) {
                    body.push_comment(comment);
                    continue;
                }
                if located.token == Token::LBrace {
                    break;
                }
                return Err(unexpected(&located, "oneof opening {", ctx));
            }
            body.detach();

            loop {
                let located = p.peek_located()?;
                let position = located.position.clone();
                match &located.token {
                    token if token.is_comment() => {
                        p.next()?;
                        if let Some(comment) = comment_from_token(token, position) {
                            body.push_comment(comment);
                        }
                    }
                    Token::Semicolon => {
                        p.next()?;
                        body.detach();
                    }
                    Token::RBrace => {
                        p.next()?;
                        break;
                    }
                    Token::Ident(word) if word == "option" && p.starts_option()? => {
                        p.next()?;
                        let comment = body.take_leading(position.line);
                        let option = p.parse_option_statement(position, comment, &owner)?;
                        body.push(Element::Option(option));
                    }
                    Token::Ident(word) if word == "group" && p.starts_group(0)? => {
                        p.next()?;
                        let comment = body.take_leading(position.line);
                        let group = p.parse_group(Qualifier::None, position, comment, ctx)?;
                        body.push(Element::Group(group));
                    }
                    Token::Ident(word)
                        if Qualifier::from_keyword(word).is_some() && p.starts_qualified()? =>
                    {
                        return Err(unexpected(&located, "oneof field type (oneof fields take no label)", ctx));
                    }
                    Token::Ident(_) | Token::Dot => {
                        let comment = body.take_leading(position.line);
                        let field = p.parse_normal_field(Qualifier::None, position, comment, ctx)?;
                        body.push(Element::NormalField(field));
                    }
                    Token::Eof => return Err(unexpected(&located, "oneof closing }", ctx)),
                    _ => return Err(unexpected(&located, "oneof field or closing }", ctx)),
                }
            }
            Ok(body.into_elements())
        })?;

        Ok(Box::new(OneOf {
            name: owner.name,
            elements,
            position,
            comment,
        }))
    }

    /// `Name = number [options] { element* }` after `[qualifier] group`.
    fn parse_group(
        &mut self,
        qualifier: Qualifier,
        position: Position,
        comment: Option<Comment>,
        ctx: Context<'_>,
    ) -> Result<Box<Group>> {
        let name = self.expect_ident("group identifier", ctx)?;
        self.expect(Token::Equals, "group =", ctx)?;
        let field_number = self.parse_integer("group field number", ctx)?;

        let owner = OptionOwner::new(OwnerKind::Group, name);
        let options = self.parse_option_list(&owner)?;
        let elements = self.parse_block(&owner, &position)?;

        Ok(Box::new(Group {
            name: owner.name,
            field_number,
            repeated: qualifier == Qualifier::Repeated,
            required: qualifier == Qualifier::Required,
            optional: qualifier == Qualifier::Optional,
            options,
            elements,
            position,
            comment,
        }))
    }

    /// Names or ranges after `reserved`, up to and including `;`.
    pub(crate) fn parse_reserved(
        &mut self,
        position: Position,
        comment: Option<Comment>,
        ctx: Context<'_>,
    ) -> Result<Box<Reserved>> {
        let mut field_names = Vec::new();
        let mut field_ranges = Vec::new();

        loop {
            let located = self.next()?;
            match located.token {
                Token::Str { value: name, .. } | Token::Ident(name) => {
                    if !field_ranges.is_empty() {
                        return Err(mixed_reserved(located.position, ctx));
                    }
                    field_names.push(name);
                }
                Token::Int(_) | Token::Minus => {
                    if !field_names.is_empty() {
                        return Err(mixed_reserved(located.position, ctx));
                    }
                    self.tokens.put_back(located);
                    field_ranges.push(self.parse_range(ctx)?);
                }
                _ => return Err(unexpected(&located, "reserved name or range", ctx)),
            }

            let separator = self.next()?;
            match separator.token {
                Token::Comma => continue,
                Token::Semicolon => break,
                _ => return Err(unexpected(&separator, "reserved , or ;", ctx)),
            }
        }

        let inline_comment = self.inline_comment()?;
        Ok(Box::new(Reserved {
            field_names,
            field_ranges,
            position,
            comment,
            inline_comment,
        }))
    }

    /// `low [ "to" ( high | "max" ) ]`
    fn parse_range(&mut self, ctx: Context<'_>) -> Result<FieldRange> {
        let low = self.parse_signed_integer("range start", ctx)?;
        if !self.peek(0)?.is_ident("to") {
            return Ok(FieldRange::single(low));
        }
        self.next()?;
        let high = if self.peek(0)?.is_ident("max") {
            self.next()?;
            RangeEnd::Max
        } else {
            RangeEnd::Number(self.parse_signed_integer("range end or max", ctx)?)
        };
        Ok(FieldRange { low, high })
    }

    /// `range { "," range } [options] ;` after `extensions`.
    fn parse_extensions(
        &mut self,
        position: Position,
        comment: Option<Comment>,
        ctx: Context<'_>,
    ) -> Result<Box<Extensions>> {
        let mut ranges = vec![self.parse_range(ctx)?];
        while self.peek_is(0, &Token::Comma)? {
            self.next()?;
            ranges.push(self.parse_range(ctx)?);
        }

        let owner = OptionOwner::new(OwnerKind::Extensions, "");
        let options = self.parse_option_list(&owner)?;
        self.expect(Token::Semicolon, "extensions ;", ctx)?;
        let inline_comment = self.inline_comment()?;

        Ok(Box::new(Extensions {
            ranges,
            options,
            position,
            comment,
            inline_comment,
        }))
    }
}

fn mixed_reserved(position: Position, ctx: Context<'_>) -> Error {
    ParseError::MixedReserved {
        position,
        context: ctx.render(),
    }
    .into()
}
