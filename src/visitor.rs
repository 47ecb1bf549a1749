//! Depth-first traversal of a parsed message.

use crate::parser::ast::*;

/// Visitor trait for traversing the AST
///
/// Each visit method corresponds to a node type. Default implementations
/// are empty, so you only need to override the methods you care about.
/// Containers are visited before their children.
///
/// ```
/// use protoidl::{parse_message_str, walk_message, NormalField, Visitor};
///
/// #[derive(Default)]
/// struct FieldNames(Vec<String>);
///
/// impl Visitor for FieldNames {
///     fn visit_normal_field(&mut self, field: &NormalField) {
///         self.0.push(field.name.clone());
///     }
/// }
///
/// let msg = parse_message_str("message A { int32 x = 1; message B { int32 y = 1; } }").unwrap();
/// let mut names = FieldNames::default();
/// walk_message(&mut names, &msg);
/// assert_eq!(names.0, vec!["x", "y"]);
/// ```
pub trait Visitor {
    // Containers
    fn visit_message(&mut self, _message: &Message) {}
    fn visit_oneof(&mut self, _oneof: &OneOf) {}
    fn visit_group(&mut self, _group: &Group) {}
    fn visit_enum(&mut self, _enum: &Enum) {}

    // Leaves
    fn visit_normal_field(&mut self, _field: &NormalField) {}
    fn visit_map_field(&mut self, _field: &MapField) {}
    fn visit_enum_value(&mut self, _value: &EnumValue) {}
    fn visit_option(&mut self, _option: &ProtoOption) {}
    fn visit_reserved(&mut self, _reserved: &Reserved) {}
    fn visit_extensions(&mut self, _extensions: &Extensions) {}
    fn visit_comment(&mut self, _comment: &Comment) {}
}

/// Visit `message` and everything beneath it.
pub fn walk_message(visitor: &mut dyn Visitor, message: &Message) {
    visitor.visit_message(message);
    visit_children(visitor, &message.elements);
}

/// Visit each element of a body in order.
pub fn visit_children(visitor: &mut dyn Visitor, elements: &[Element]) {
    for element in elements {
        element.accept(visitor);
    }
}

impl Element {
    /// Accept a visitor for this element and its children.
    pub fn accept(&self, visitor: &mut dyn Visitor) {
        match self {
            Element::NormalField(f) => {
                visitor.visit_normal_field(f);
                visit_options(visitor, &f.options);
            }
            Element::MapField(f) => {
                visitor.visit_map_field(f);
                visit_options(visitor, &f.options);
            }
            Element::OneOf(o) => {
                visitor.visit_oneof(o);
                visit_children(visitor, &o.elements);
            }
            Element::Group(g) => {
                visitor.visit_group(g);
                visit_options(visitor, &g.options);
                visit_children(visitor, &g.elements);
            }
            Element::Message(m) => walk_message(visitor, m),
            Element::Enum(e) => {
                visitor.visit_enum(e);
                for element in &e.elements {
                    element.accept(visitor);
                }
            }
            Element::Option(o) => visitor.visit_option(o),
            Element::Reserved(r) => visitor.visit_reserved(r),
            Element::Extensions(e) => {
                visitor.visit_extensions(e);
                visit_options(visitor, &e.options);
            }
            Element::Comment(c) => visitor.visit_comment(c),
        }
    }
}

impl EnumElement {
    pub fn accept(&self, visitor: &mut dyn Visitor) {
        match self {
            EnumElement::Value(v) => {
                visitor.visit_enum_value(v);
                visit_options(visitor, &v.options);
            }
            EnumElement::Option(o) => visitor.visit_option(o),
            EnumElement::Reserved(r) => visitor.visit_reserved(r),
            EnumElement::Comment(c) => visitor.visit_comment(c),
        }
    }
}

fn visit_options(visitor: &mut dyn Visitor, options: &[ProtoOption]) {
    for option in options {
        visitor.visit_option(option);
    }
}
