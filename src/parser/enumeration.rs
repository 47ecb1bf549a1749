//! Enum bodies.

use crate::error::Result;
use crate::position::Position;
use super::ast::*;
use super::comment::{comment_from_token, Body};
use super::grammar::{unexpected, Context, Parser};
use super::lexer::Token;

impl Parser<'_, '_> {
    /// `Name { value* }` after the `enum` keyword.
    pub(crate) fn parse_enum(&mut self, position: Position, comment: Option<Comment>) -> Result<Box<Enum>> {
        let unnamed = OptionOwner::new(OwnerKind::Enum, "");
        let name = self.expect_ident("enum identifier", Context::Decl(&unnamed))?;
        log::debug!("parsing enum {} at {}", name, position);
        let owner = OptionOwner::new(OwnerKind::Enum, name);

        let elements = self.nested(&position, |p| {
            let ctx = Context::Decl(&owner);
            let mut body: Body<EnumElement> = Body::new();
            loop {
                let located = p.next()?;
                if let Some(comment) = comment_from_token(&located.token, located.position.clone()) {
                    body.push_comment(comment);
                    continue;
                }
                if located.token == Token::LBrace {
                    break;
                }
                return Err(unexpected(&located, "enum opening {", ctx));
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
                        body.push(EnumElement::Option(*option));
                    }
                    Token::Ident(word) if word == "reserved" && p.starts_reserved()? => {
                        p.next()?;
                        let comment = body.take_leading(position.line);
                        let reserved = p.parse_reserved(position, comment, ctx)?;
                        body.push(EnumElement::Reserved(*reserved));
                    }
                    Token::Ident(_) => {
                        let comment = body.take_leading(position.line);
                        let value = p.parse_enum_value(position, comment, ctx)?;
                        body.push(EnumElement::Value(value));
                    }
                    Token::Eof => return Err(unexpected(&located, "enum closing }", ctx)),
                    _ => return Err(unexpected(&located, "enum value or closing }", ctx)),
                }
            }
            Ok(body.into_elements())
        })?;

        Ok(Box::new(Enum {
            name: owner.name,
            elements,
            position,
            comment,
        }))
    }

    /// `NAME = [-]number [options];`
    fn parse_enum_value(
        &mut self,
        position: Position,
        comment: Option<Comment>,
        ctx: Context<'_>,
    ) -> Result<EnumValue> {
        let name = self.expect_ident("enum value identifier", ctx)?;
        self.expect(Token::Equals, "enum value =", ctx)?;
        let value = self.parse_signed_integer("enum value number", ctx)?;

        let owner = OptionOwner::new(OwnerKind::EnumValue, name);
        let options = self.parse_option_list(&owner)?;
        self.expect(Token::Semicolon, "enum value ;", Context::Decl(&owner))?;
        let inline_comment = self.inline_comment()?;

        Ok(EnumValue {
            name: owner.name,
            value,
            options,
            position,
            comment,
            inline_comment,
        })
    }
}
