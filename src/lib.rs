//! Protoidl: a position-preserving parser for Protocol Buffers message declarations.
//!
//! The parser turns the body of a `.proto` `message` (nested messages, fields,
//! map fields, oneofs, groups, enums, reserved and extensions statements and
//! options with aggregate values) into an AST where every node records its
//! source position and the comments around it. Keywords are never reserved:
//! `message message { string message = 1; }` is a valid declaration.
//!
//! # Quick Start
//!
//! ```rust
//! use protoidl::{parse_message_str, Element};
//!
//! let msg = parse_message_str(r#"
//!     message Person {
//!         // Full name.
//!         string name = 1;
//!         repeated string emails = 2 [(validate.rules).repeated.max_items = 20];
//!         option (my_option) = { [key.dot]: value_name };
//!     }
//! "#).unwrap();
//!
//! assert_eq!(msg.name, "Person");
//! let name = msg.fields().next().unwrap();
//! assert_eq!(name.comment.as_ref().unwrap().lines, vec![" Full name."]);
//! assert_eq!(name.position.to_string(), "<input>:4:9");
//!
//! match &msg.elements[2] {
//!     Element::Option(opt) => assert_eq!(opt.aggregated_constants[0].name, "key.dot"),
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```
//!
//! File-level parsers that already hold a [`TokenStream`] call
//! [`parse_message`] right after consuming the `message` keyword; the stream
//! is left after the closing brace.

pub mod error;
pub mod position;
pub mod parser;
pub mod visitor;

pub use error::{Error, LexError, ParseError, Result};
pub use position::Position;
pub use parser::ast::{
    Comment, Element, Enum, EnumElement, EnumValue, Extensions, FieldRange, Group, Literal,
    MapField, Message, NamedLiteral, NormalField, OneOf, OptionOwner, OwnerKind, ProtoOption,
    Qualifier, RangeEnd, Reserved,
};
pub use parser::cursor::TokenStream;
pub use parser::lexer::{tokenize, Lexer, Located, Token};
pub use parser::{parse_message, parse_message_str, parse_message_str_with, parse_message_with, ParseOptions};
pub use visitor::{walk_message, Visitor};
