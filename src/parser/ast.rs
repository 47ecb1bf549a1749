//! AST node types for parsed message declarations.
//!
//! Every node carries the [`Position`] of the token that begins it. Leading
//! comments are owned by the node they precede; comments that precede
//! nothing stay in the container as [`Element::Comment`].

use crate::position::Position;

/// A run of comment lines.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Comment {
    pub position: Position,
    /// One entry per `//` line, or per physical line of a block comment.
    pub lines: Vec<String>,
    /// Written as `/* ... */`.
    pub cstyle: bool,
}

impl Comment {
    pub fn new(position: Position, lines: Vec<String>, cstyle: bool) -> Self {
        Comment {
            position,
            lines,
            cstyle,
        }
    }

    /// Line on which the comment text ends.
    pub fn end_line(&self) -> usize {
        self.position.line + self.lines.len().saturating_sub(1)
    }

    /// The lines joined with `\n`.
    pub fn message(&self) -> String {
        self.lines.join("\n")
    }

    pub(crate) fn merge(&mut self, other: Comment) {
        self.lines.extend(other.lines);
    }
}

/// A declaration inside a message, group, oneof or extend body.
///
/// Declarations are boxed so that an element stays pointer-sized on the
/// recursive descent path.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Element {
    NormalField(Box<NormalField>),
    MapField(Box<MapField>),
    OneOf(Box<OneOf>),
    Group(Box<Group>),
    Message(Box<Message>),
    Enum(Box<Enum>),
    Option(Box<ProtoOption>),
    Reserved(Box<Reserved>),
    Extensions(Box<Extensions>),
    Comment(Comment),
}

impl Element {
    pub fn position(&self) -> &Position {
        match self {
            Element::NormalField(f) => &f.position,
            Element::MapField(f) => &f.position,
            Element::OneOf(o) => &o.position,
            Element::Group(g) => &g.position,
            Element::Message(m) => &m.position,
            Element::Enum(e) => &e.position,
            Element::Option(o) => &o.position,
            Element::Reserved(r) => &r.position,
            Element::Extensions(e) => &e.position,
            Element::Comment(c) => &c.position,
        }
    }

    /// The leading comment, if any. A standalone comment is its own.
    pub fn comment(&self) -> Option<&Comment> {
        match self {
            Element::NormalField(f) => f.comment.as_ref(),
            Element::MapField(f) => f.comment.as_ref(),
            Element::OneOf(o) => o.comment.as_ref(),
            Element::Group(g) => g.comment.as_ref(),
            Element::Message(m) => m.comment.as_ref(),
            Element::Enum(e) => e.comment.as_ref(),
            Element::Option(o) => o.comment.as_ref(),
            Element::Reserved(r) => r.comment.as_ref(),
            Element::Extensions(e) => e.comment.as_ref(),
            Element::Comment(c) => Some(c),
        }
    }

    /// Short lowercase name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Element::NormalField(_) => "field",
            Element::MapField(_) => "map field",
            Element::OneOf(_) => "oneof",
            Element::Group(_) => "group",
            Element::Message(m) if m.is_extend => "extend",
            Element::Message(_) => "message",
            Element::Enum(_) => "enum",
            Element::Option(_) => "option",
            Element::Reserved(_) => "reserved",
            Element::Extensions(_) => "extensions",
            Element::Comment(_) => "comment",
        }
    }
}

/// A `message` (or `extend`) declaration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    /// Message name; for `extend` the extended type, possibly dotted.
    pub name: String,
    pub elements: Vec<Element>,
    pub is_extend: bool,
    pub position: Position,
    pub comment: Option<Comment>,
}

impl Message {
    /// Fields declared directly in this message (not inside oneofs).
    pub fn fields(&self) -> impl Iterator<Item = &NormalField> {
        self.elements.iter().filter_map(|e| match e {
            Element::NormalField(f) => Some(&**f),
            _ => None,
        })
    }

    /// Nested messages, excluding `extend` blocks.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.elements.iter().filter_map(|e| match e {
            Element::Message(m) if !m.is_extend => Some(&**m),
            _ => None,
        })
    }

    pub fn options(&self) -> impl Iterator<Item = &ProtoOption> {
        self.elements.iter().filter_map(|e| match e {
            Element::Option(o) => Some(&**o),
            _ => None,
        })
    }
}

/// `required`, `optional`, `repeated`, or nothing (proto3 singular).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Qualifier {
    #[default]
    None,
    Required,
    Optional,
    Repeated,
}

impl Qualifier {
    pub fn from_keyword(word: &str) -> Option<Qualifier> {
        match word {
            "required" => Some(Qualifier::Required),
            "optional" => Some(Qualifier::Optional),
            "repeated" => Some(Qualifier::Repeated),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Qualifier::None => "",
            Qualifier::Required => "required",
            Qualifier::Optional => "optional",
            Qualifier::Repeated => "repeated",
        }
    }
}

/// `[qualifier] type name = number [options];`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NormalField {
    pub name: String,
    pub type_name: String,
    pub qualifier: Qualifier,
    pub field_number: i64,
    pub options: Vec<ProtoOption>,
    pub position: Position,
    pub comment: Option<Comment>,
    pub inline_comment: Option<Comment>,
}

impl NormalField {
    pub fn is_repeated(&self) -> bool {
        self.qualifier == Qualifier::Repeated
    }

    pub fn is_required(&self) -> bool {
        self.qualifier == Qualifier::Required
    }

    pub fn is_optional(&self) -> bool {
        self.qualifier == Qualifier::Optional
    }
}

/// `map<KeyType, ValueType> name = number [options];`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapField {
    pub name: String,
    pub key_type: String,
    pub value_type: String,
    pub field_number: i64,
    pub options: Vec<ProtoOption>,
    pub position: Position,
    pub comment: Option<Comment>,
    pub inline_comment: Option<Comment>,
}

/// `oneof name { ... }`. Elements are unqualified fields, groups, options
/// and comments.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OneOf {
    pub name: String,
    pub elements: Vec<Element>,
    pub position: Position,
    pub comment: Option<Comment>,
}

/// Legacy proto2 `[qualifier] group Name = number [options] { ... }`.
///
/// At most one of `repeated`, `required` and `optional` is set.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Group {
    pub name: String,
    pub field_number: i64,
    pub repeated: bool,
    pub required: bool,
    pub optional: bool,
    pub options: Vec<ProtoOption>,
    pub elements: Vec<Element>,
    pub position: Position,
    pub comment: Option<Comment>,
}

/// `enum Name { ... }`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Enum {
    pub name: String,
    pub elements: Vec<EnumElement>,
    pub position: Position,
    pub comment: Option<Comment>,
}

impl Enum {
    pub fn values(&self) -> impl Iterator<Item = &EnumValue> {
        self.elements.iter().filter_map(|e| match e {
            EnumElement::Value(v) => Some(v),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EnumElement {
    Value(EnumValue),
    Option(ProtoOption),
    Reserved(Reserved),
    Comment(Comment),
}

/// `NAME = number [options];`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumValue {
    pub name: String,
    pub value: i64,
    pub options: Vec<ProtoOption>,
    pub position: Position,
    pub comment: Option<Comment>,
    pub inline_comment: Option<Comment>,
}

/// Upper bound of a field number range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RangeEnd {
    Number(i64),
    /// The `max` keyword.
    Max,
}

/// `low`, `low to high` or `low to max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldRange {
    pub low: i64,
    pub high: RangeEnd,
}

impl FieldRange {
    pub fn single(n: i64) -> Self {
        FieldRange {
            low: n,
            high: RangeEnd::Number(n),
        }
    }
}

/// `reserved ...;` with either names or ranges, never both.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reserved {
    /// Names as written between the quotes; empty strings are kept.
    pub field_names: Vec<String>,
    pub field_ranges: Vec<FieldRange>,
    pub position: Position,
    pub comment: Option<Comment>,
    pub inline_comment: Option<Comment>,
}

/// `extensions 100 to 199 [options];`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Extensions {
    pub ranges: Vec<FieldRange>,
    pub options: Vec<ProtoOption>,
    pub position: Position,
    pub comment: Option<Comment>,
    pub inline_comment: Option<Comment>,
}

/// Kind of declaration an option belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OwnerKind {
    Message,
    Extend,
    Group,
    OneOf,
    Enum,
    EnumValue,
    NormalField,
    MapField,
    Extensions,
}

impl OwnerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerKind::Message => "message",
            OwnerKind::Extend => "extend",
            OwnerKind::Group => "group",
            OwnerKind::OneOf => "oneof",
            OwnerKind::Enum => "enum",
            OwnerKind::EnumValue => "enum value",
            OwnerKind::NormalField => "field",
            OwnerKind::MapField => "map field",
            OwnerKind::Extensions => "extensions",
        }
    }
}

/// Non-owning reference from an option to its enclosing declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptionOwner {
    pub kind: OwnerKind,
    pub name: String,
}

impl OptionOwner {
    pub fn new(kind: OwnerKind, name: impl Into<String>) -> Self {
        OptionOwner {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn describe(&self) -> String {
        if self.name.is_empty() {
            self.kind.as_str().to_string()
        } else {
            format!("{} {}", self.kind.as_str(), self.name)
        }
    }
}

/// `option name = value;` or one entry of a field's `[...]` list.
///
/// Exactly one of `constant` and `aggregated_constants` is in use, as told by
/// `is_aggregate`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProtoOption {
    /// Full option name, e.g. `deprecated`, `(my_option).a`.
    pub name: String,
    pub constant: Option<Literal>,
    pub aggregated_constants: Vec<NamedLiteral>,
    pub is_aggregate: bool,
    /// Written inside a field's `[...]` rather than as a statement.
    pub is_embedded: bool,
    pub owner: OptionOwner,
    pub position: Position,
    pub comment: Option<Comment>,
    pub inline_comment: Option<Comment>,
    /// Comments inside the aggregate body, or between entries of a field's
    /// option list, that lead no entry.
    pub comments: Vec<Comment>,
}

impl ProtoOption {
    /// Look up a top-level aggregate entry by name.
    pub fn aggregated(&self, name: &str) -> Option<&Literal> {
        self.aggregated_constants
            .iter()
            .find(|nl| nl.name == name)
            .map(|nl| &nl.literal)
    }
}

/// `key: value` inside an aggregate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NamedLiteral {
    /// Key with brackets stripped: `foo`, `foo.bar`, `key.dot`, `(ext).a`.
    pub name: String,
    pub literal: Literal,
    pub prints_colon: bool,
    /// Key was written as `[...]`.
    pub bracketed: bool,
    pub position: Position,
    pub comment: Option<Comment>,
    pub inline_comment: Option<Comment>,
}

/// A constant value.
///
/// Scalars keep their raw text in `source` (strings without quotes). Lists
/// populate `array`; nested aggregates populate `ordered_map`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Literal {
    pub source: String,
    pub is_string: bool,
    pub quote: Option<char>,
    /// The pieces of an adjacent-string concatenation, when there was more than one.
    pub source_lines: Vec<String>,
    pub array: Option<Vec<Literal>>,
    pub ordered_map: Option<Vec<NamedLiteral>>,
    /// Comments inside a list or aggregate value that lead no entry.
    pub comments: Vec<Comment>,
    pub position: Position,
}

impl Literal {
    pub fn scalar(source: impl Into<String>, position: Position) -> Self {
        Literal {
            source: source.into(),
            is_string: false,
            quote: None,
            source_lines: Vec::new(),
            array: None,
            ordered_map: None,
            comments: Vec::new(),
            position,
        }
    }

    /// Value as a bool, if it is the identifier `true` or `false`.
    pub fn as_bool(&self) -> Option<bool> {
        if self.is_string {
            return None;
        }
        match self.source.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}
