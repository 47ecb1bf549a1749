//! Option statements, field option lists and constant values.

use crate::error::Result;
use crate::position::Position;
use super::ast::*;
use super::comment::{comment_from_token, PendingComments};
use super::grammar::{unexpected, Context, Parser};
use super::lexer::Token;

impl Parser<'_, '_> {
    /// `name = value ;` after the `option` keyword.
    pub(crate) fn parse_option_statement(
        &mut self,
        position: Position,
        comment: Option<Comment>,
        owner: &OptionOwner,
    ) -> Result<Box<ProtoOption>> {
        let mut option = self.parse_option_assignment(position, owner)?;
        self.expect(
            Token::Semicolon,
            "option ;",
            Context::Option {
                name: &option.name,
                owner,
            },
        )?;
        option.comment = comment;
        option.inline_comment = self.inline_comment()?;
        Ok(Box::new(option))
    }

    /// `[ name = value { , name = value } ]`, or nothing when no `[` follows.
    pub(crate) fn parse_option_list(&mut self, owner: &OptionOwner) -> Result<Vec<ProtoOption>> {
        let mut options: Vec<ProtoOption> = Vec::new();
        if !self.peek_is(0, &Token::LBracket)? {
            return Ok(options);
        }
        self.next()?;

        let ctx = Context::Decl(owner);
        let mut pending = PendingComments::default();
        let mut expect_entry = true;
        let mut last_end_line = 0;

        loop {
            let located = self.next()?;
            if let Some(comment) = comment_from_token(&located.token, located.position.clone()) {
                match options.last_mut() {
                    Some(last)
                        if comment.position.line == last_end_line
                            && last.inline_comment.is_none() =>
                    {
                        last.inline_comment = Some(comment);
                    }
                    _ => pending.push(comment),
                }
                continue;
            }

            if expect_entry {
                let position = located.position.clone();
                self.tokens.put_back(located);
                let mut option = self.parse_option_assignment(position, owner)?;
                option.is_embedded = true;
                option.comment = pending.take_for(option.position.line);
                let mut comments = pending.take_standalone();
                comments.append(&mut option.comments);
                option.comments = comments;
                options.push(option);
                last_end_line = self.last_line();
                expect_entry = false;
                continue;
            }

            match located.token {
                Token::Comma => expect_entry = true,
                Token::RBracket => break,
                _ => return Err(unexpected(&located, "option , or ]", ctx)),
            }
        }

        if let Some(last) = options.last_mut() {
            last.comments.extend(pending.finish());
        }
        Ok(options)
    }

    /// `name = value`, shared by statements and list entries.
    fn parse_option_assignment(&mut self, position: Position, owner: &OptionOwner) -> Result<ProtoOption> {
        let name = self.parse_option_name(Context::Decl(owner))?;
        let ctx = Context::Option { name: &name, owner };
        self.expect(Token::Equals, "option value assignment =", ctx)?;

        let (constant, aggregated_constants, comments) = if self.peek_is(0, &Token::LBrace)? {
            let open = self.next()?;
            let (entries, comments) = self.parse_aggregate(Token::RBrace, &open.position, ctx)?;
            (None, entries, comments)
        } else {
            (Some(self.parse_literal(ctx)?), Vec::new(), Vec::new())
        };
        let is_aggregate = constant.is_none();

        Ok(ProtoOption {
            name,
            constant,
            aggregated_constants,
            is_aggregate,
            is_embedded: false,
            owner: owner.clone(),
            position,
            comment: None,
            inline_comment: None,
            comments,
        })
    }

    /// `( "(" typeName ")" | ident ) { "." ( "(" typeName ")" | ident ) }`
    ///
    /// Parenthesized parts keep their parentheses: `(my_option).a`.
    pub(crate) fn parse_option_name(&mut self, ctx: Context<'_>) -> Result<String> {
        let mut name = String::new();
        loop {
            let located = self.next()?;
            match located.token {
                Token::LParen => {
                    let extension = self.parse_type_name("option full identifier", ctx)?;
                    self.expect(Token::RParen, "option full identifier closing )", ctx)?;
                    name.push('(');
                    name.push_str(&extension);
                    name.push(')');
                }
                Token::Ident(part) => name.push_str(&part),
                _ => return Err(unexpected(&located, "option identifier", ctx)),
            }
            if !self.peek_is(0, &Token::Dot)? {
                return Ok(name);
            }
            self.next()?;
            name.push('.');
        }
    }

    /// A scalar, list, or aggregate constant.
    pub(crate) fn parse_literal(&mut self, ctx: Context<'_>) -> Result<Literal> {
        let located = self.next()?;
        let position = located.position.clone();

        match located.token {
            Token::LBracket => {
                let (items, comments) = self.parse_list(&position, ctx)?;
                Ok(Literal {
                    array: Some(items),
                    comments,
                    ..Literal::scalar("", position)
                })
            }
            Token::LBrace | Token::LAngle => {
                let closer = if located.token == Token::LBrace {
                    Token::RBrace
                } else {
                    Token::RAngle
                };
                let (entries, comments) = self.parse_aggregate(closer, &position, ctx)?;
                Ok(Literal {
                    ordered_map: Some(entries),
                    comments,
                    ..Literal::scalar("", position)
                })
            }
            Token::Minus | Token::Plus => {
                let sign = if located.token == Token::Minus { "-" } else { "" };
                let value = self.next()?;
                match value.token {
                    Token::Int(text) | Token::Float(text) | Token::Ident(text) => {
                        Ok(Literal::scalar(format!("{sign}{text}"), position))
                    }
                    _ => Err(unexpected(&value, "number after sign", ctx)),
                }
            }
            Token::Str { value, quote } => {
                let mut pieces = vec![value];
                while let Token::Str { value, .. } = self.peek(0)?.clone() {
                    self.next()?;
                    pieces.push(value);
                }
                let source = pieces.concat();
                let source_lines = if pieces.len() > 1 { pieces } else { Vec::new() };
                Ok(Literal {
                    is_string: true,
                    quote: Some(quote),
                    source_lines,
                    ..Literal::scalar(source, position)
                })
            }
            Token::Int(text) | Token::Float(text) => Ok(Literal::scalar(text, position)),
            Token::Ident(first) => {
                let mut source = first;
                while self.peek_is(0, &Token::Dot)? && matches!(self.peek(1)?, Token::Ident(_)) {
                    self.next()?;
                    source.push('.');
                    source.push_str(&self.expect_ident("identifier", ctx)?);
                }
                Ok(Literal::scalar(source, position))
            }
            _ => Err(unexpected(&located, "constant", ctx)),
        }
    }

    /// Items of `[a, b, ...]` after the opening bracket, through `]`, and
    /// the comments written between them.
    fn parse_list(&mut self, open: &Position, ctx: Context<'_>) -> Result<(Vec<Literal>, Vec<Comment>)> {
        self.nested(open, |p| {
            let mut items = Vec::new();
            let mut comments = Vec::new();
            p.collect_comments(&mut comments)?;
            if p.peek_is(0, &Token::RBracket)? {
                p.next()?;
                return Ok((items, comments));
            }
            loop {
                p.collect_comments(&mut comments)?;
                items.push(p.parse_literal(ctx)?);
                p.collect_comments(&mut comments)?;
                let separator = p.next()?;
                match separator.token {
                    Token::Comma => continue,
                    Token::RBracket => return Ok((items, comments)),
                    _ => return Err(unexpected(&separator, "list , or ]", ctx)),
                }
            }
        })
    }

    /// Consume consecutive comment tokens into `comments`.
    fn collect_comments(&mut self, comments: &mut Vec<Comment>) -> Result<()> {
        while self.peek(0)?.is_comment() {
            let located = self.next()?;
            comments.extend(comment_from_token(&located.token, located.position));
        }
        Ok(())
    }

    /// Entries of an aggregate after its opening delimiter, through `closer`,
    /// and the comments inside it that lead no entry.
    fn parse_aggregate(
        &mut self,
        closer: Token,
        open: &Position,
        ctx: Context<'_>,
    ) -> Result<(Vec<NamedLiteral>, Vec<Comment>)> {
        self.nested(open, |p| {
            let mut entries: Vec<NamedLiteral> = Vec::new();
            let mut pending = PendingComments::default();
            let mut last_end_line = 0;

            loop {
                let located = p.next()?;
                if let Some(comment) = comment_from_token(&located.token, located.position.clone()) {
                    match entries.last_mut() {
                        Some(last)
                            if comment.position.line == last_end_line
                                && last.inline_comment.is_none() =>
                        {
                            last.inline_comment = Some(comment);
                        }
                        _ => pending.push(comment),
                    }
                    continue;
                }

                let position = located.position.clone();
                let (name, bracketed) = match located.token {
                    ref token if *token == closer => break,
                    Token::Eof => {
                        let expected = format!("aggregate closing {closer}");
                        return Err(unexpected(&located, &expected, ctx));
                    }
                    Token::Semicolon => continue,
                    Token::Comma => {
                        if entries.is_empty() {
                            return Err(unexpected(&located, "non-empty option aggregate key", ctx));
                        }
                        continue;
                    }
                    Token::LBracket => {
                        let key = p.parse_bracketed_key(ctx)?;
                        (key, true)
                    }
                    Token::LParen => {
                        let extension = p.parse_type_name("aggregate extension key", ctx)?;
                        p.expect(Token::RParen, "aggregate extension key closing )", ctx)?;
                        let mut key = format!("({extension})");
                        while p.peek_is(0, &Token::Dot)? {
                            p.next()?;
                            key.push('.');
                            key.push_str(&p.expect_ident("aggregate key", ctx)?);
                        }
                        (key, false)
                    }
                    Token::Ident(first) => {
                        let mut key = first;
                        while p.peek_is(0, &Token::Dot)? {
                            p.next()?;
                            key.push('.');
                            key.push_str(&p.expect_ident("aggregate key", ctx)?);
                        }
                        (key, false)
                    }
                    _ => return Err(unexpected(&located, "option aggregate key", ctx)),
                };

                let comment = pending.take_for(position.line);
                let prints_colon = p.peek_is(0, &Token::Colon)?;
                if prints_colon {
                    p.next()?;
                    while p.peek(0)?.is_comment() {
                        let located = p.next()?;
                        if let Some(kept) = comment_from_token(&located.token, located.position) {
                            pending.keep(kept);
                        }
                    }
                }

                let next = p.peek(0)?.clone();
                let literal = match next {
                    Token::Comma | Token::Semicolon => Literal::scalar("true", position.clone()),
                    ref token if !prints_colon && (*token == closer || token.is_comment()) => {
                        Literal::scalar("true", position.clone())
                    }
                    _ => p.parse_literal(ctx)?,
                };

                entries.push(NamedLiteral {
                    name,
                    literal,
                    prints_colon,
                    bracketed,
                    position,
                    comment,
                    inline_comment: None,
                });
                last_end_line = p.last_line();
            }

            Ok((entries, pending.finish()))
        })
    }

    /// `[` already consumed: `key`, `key.dot`, `type.googleapis.com/pkg.Msg`, then `]`.
    fn parse_bracketed_key(&mut self, ctx: Context<'_>) -> Result<String> {
        let mut key = self.expect_ident("aggregate key", ctx)?;
        loop {
            let located = self.next()?;
            match located.token {
                Token::Dot => key.push('.'),
                Token::Slash => key.push('/'),
                Token::RBracket => return Ok(key),
                _ => return Err(unexpected(&located, "aggregate key closing ]", ctx)),
            }
            key.push_str(&self.expect_ident("aggregate key", ctx)?);
        }
    }
}
