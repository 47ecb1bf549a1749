//! Associating comment tokens with the declarations around them.
//!
//! Comments are collected into the body being built as standalone elements.
//! When the next declaration starts on the line right after a comment ends,
//! that comment is taken back out and becomes the declaration's leading
//! comment. Whatever is left over stays in the body.

use crate::position::Position;
use super::ast::{Comment, Element, EnumElement};
use super::lexer::Token;

/// Build a [`Comment`] from a comment token.
pub(crate) fn comment_from_token(token: &Token, position: Position) -> Option<Comment> {
    match token {
        Token::LineComment(text) => Some(Comment::new(position, vec![text.clone()], false)),
        Token::BlockComment(text) => Some(Comment::new(
            position,
            text.split('\n')
                .map(|line| line.trim_end_matches('\r').to_string())
                .collect(),
            true,
        )),
        _ => None,
    }
}

/// Two comments are one run when both are `//` comments and the second
/// starts on the line after the first ends.
fn continues(prev: &Comment, next: &Comment) -> bool {
    !prev.cstyle && !next.cstyle && prev.end_line() + 1 == next.position.line
}

/// Whether `comment` sits directly above (or, for `/* */`, directly before
/// on the same line) a declaration starting on `line`.
fn adjacent(comment: &Comment, line: usize) -> bool {
    comment.end_line() + 1 == line || (comment.cstyle && comment.end_line() == line)
}

/// Container element types that can hold a standalone comment.
pub(crate) trait CommentSlot: Sized {
    fn from_comment(comment: Comment) -> Self;
    fn as_comment_mut(&mut self) -> Option<&mut Comment>;
    fn into_comment(self) -> Result<Comment, Self>;
}

impl CommentSlot for Element {
    fn from_comment(comment: Comment) -> Self {
        Element::Comment(comment)
    }

    fn as_comment_mut(&mut self) -> Option<&mut Comment> {
        match self {
            Element::Comment(c) => Some(c),
            _ => None,
        }
    }

    fn into_comment(self) -> Result<Comment, Self> {
        match self {
            Element::Comment(c) => Ok(c),
            other => Err(other),
        }
    }
}

impl CommentSlot for EnumElement {
    fn from_comment(comment: Comment) -> Self {
        EnumElement::Comment(comment)
    }

    fn as_comment_mut(&mut self) -> Option<&mut Comment> {
        match self {
            EnumElement::Comment(c) => Some(c),
            _ => None,
        }
    }

    fn into_comment(self) -> Result<Comment, Self> {
        match self {
            EnumElement::Comment(c) => Ok(c),
            other => Err(other),
        }
    }
}

/// Ordered element list of a body under construction.
pub(crate) struct Body<E> {
    elements: Vec<E>,
    /// The trailing comment, if any, was followed by a non-comment token
    /// (an empty statement) and can no longer lead a declaration.
    detached: bool,
}

impl<E: CommentSlot> Body<E> {
    pub(crate) fn new() -> Self {
        Body {
            elements: Vec::new(),
            detached: false,
        }
    }

    /// Add a comment, merging it into the previous comment when contiguous.
    pub(crate) fn push_comment(&mut self, comment: Comment) {
        if !self.detached {
            if let Some(last) = self.elements.last_mut().and_then(E::as_comment_mut) {
                if continues(last, &comment) {
                    last.merge(comment);
                    return;
                }
            }
        }
        self.detached = false;
        self.elements.push(E::from_comment(comment));
    }

    /// Take the trailing comment if it leads a declaration starting on `line`.
    pub(crate) fn take_leading(&mut self, line: usize) -> Option<Comment> {
        if self.detached {
            return None;
        }
        let last = self.elements.pop()?;
        match last.into_comment() {
            Ok(comment) if adjacent(&comment, line) => {
                log::trace!("attached comment at {} to declaration on line {line}", comment.position);
                Some(comment)
            }
            Ok(comment) => {
                self.elements.push(E::from_comment(comment));
                None
            }
            Err(element) => {
                self.elements.push(element);
                None
            }
        }
    }

    /// Mark that a non-comment token separated the last comment from what follows.
    pub(crate) fn detach(&mut self) {
        self.detached = true;
    }

    pub(crate) fn push(&mut self, element: E) {
        self.detached = false;
        self.elements.push(element);
    }

    pub(crate) fn into_elements(self) -> Vec<E> {
        self.elements
    }
}

/// Comments gathered between entries of an option list or aggregate.
///
/// The latest run waits for the entry it may lead. Runs that end up leading
/// nothing are kept in order as standalone comments.
#[derive(Default)]
pub(crate) struct PendingComments {
    run: Option<Comment>,
    standalone: Vec<Comment>,
}

impl PendingComments {
    pub(crate) fn push(&mut self, comment: Comment) {
        match &mut self.run {
            Some(run) if continues(run, &comment) => run.merge(comment),
            Some(run) => {
                let displaced = std::mem::replace(run, comment);
                log::trace!("keeping detached comment at {}", displaced.position);
                self.standalone.push(displaced);
            }
            None => self.run = Some(comment),
        }
    }

    /// The pending run if it sits directly above `line`; otherwise it becomes standalone.
    pub(crate) fn take_for(&mut self, line: usize) -> Option<Comment> {
        let run = self.run.take()?;
        if adjacent(&run, line) {
            Some(run)
        } else {
            log::trace!("keeping detached comment at {}", run.position);
            self.standalone.push(run);
            None
        }
    }

    /// Record a comment that cannot lead an entry, e.g. one between a key and its value.
    /// Any pending run is kept first, as it can no longer lead an entry either.
    pub(crate) fn keep(&mut self, comment: Comment) {
        self.standalone.extend(self.run.take());
        self.standalone.push(comment);
    }

    pub(crate) fn take_standalone(&mut self) -> Vec<Comment> {
        std::mem::take(&mut self.standalone)
    }

    /// All standalone comments, including a final run that led nothing.
    pub(crate) fn finish(mut self) -> Vec<Comment> {
        self.standalone.extend(self.run.take());
        self.standalone
    }
}
