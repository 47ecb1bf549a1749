//! Message body parsing through the public entry points.

use pretty_assertions::assert_eq;
use protoidl::{
    parse_message, Element, Group, Message, OptionOwner, OwnerKind, ProtoOption, TokenStream,
};

/// Parse `src`, consuming the leading `message` keyword the way a file-level
/// parser would.
fn parse(src: &str) -> Message {
    let mut tokens = TokenStream::from_source("<input>", src);
    let keyword = tokens.next().unwrap();
    assert!(keyword.token.is_ident("message"), "{:?}", keyword);
    parse_message(&mut tokens).unwrap()
}

fn option_at(m: &Message, index: usize) -> &ProtoOption {
    match &m.elements[index] {
        Element::Option(o) => &**o,
        other => panic!("expected option at {}, got {:?}", index, other),
    }
}

fn group_at(m: &Message, index: usize) -> &Group {
    match &m.elements[index] {
        Element::Group(g) => &**g,
        other => panic!("expected group at {}, got {:?}", index, other),
    }
}

#[test]
fn test_message_positions_and_elements() {
    let src = "\n\t\tmessage   Out   {\n\
               \t\t// identifier\n\
               \t\tstring   id  = 1;\n\
               \t\t// size\n\
               \t\tint64   size = 2;\n\
               \n\
               \t\toneof foo {\n\
               \t\t\tstring     name        = 4;\n\
               \t\t\tSubMessage sub_message = 9;\n\
               \t\t}\n\
               \t\tmessage  Inner {   // Level 2\n\
               \t\t\tint64  ival = 1;\n\
               \t\t}\n\
               \t\tmap<string, testdata.SubDefaults> proto2_value  =  13;\n\
               \t\toption  (my_option).a  =  true;\n\
               \t}";
    let m = parse(src);

    assert_eq!(m.name, "Out");
    assert_eq!(m.elements.len(), 6);
    assert_eq!(m.position.to_string(), "<input>:2:3");

    let kinds: Vec<&str> = m.elements.iter().map(Element::kind).collect();
    assert_eq!(kinds, vec!["field", "field", "oneof", "message", "map field", "option"]);

    let id = m.fields().next().unwrap();
    assert_eq!(id.position.to_string(), "<input>:4:3");
    assert_eq!(id.comment.as_ref().unwrap().position.to_string(), "<input>:3:3");

    match &m.elements[3] {
        Element::Message(inner) => {
            assert_eq!(inner.position.to_string(), "<input>:12:3");
            assert_eq!(inner.elements[0].position().line, 13);
        }
        other => panic!("expected nested message, got {:?}", other),
    }

    let option = option_at(&m, 5);
    assert_eq!(option.name, "(my_option).a");
    assert_eq!(option.owner, OptionOwner::new(OwnerKind::Message, "Out"));
    assert_eq!(option.constant.as_ref().unwrap().as_bool(), Some(true));
}

#[test]
fn test_repeated_group_in_message() {
    let m = parse(
        "message SearchResponse {
		repeated group Result = 1 {
		  required string url = 2;
		  optional string title = 3;
		  repeated string snippets = 4;
		}
	  }",
    );
    assert_eq!(m.elements.len(), 1);
    let g = group_at(&m, 0);
    assert_eq!(g.name, "Result");
    assert_eq!(g.field_number, 1);
    assert_eq!(g.elements.len(), 3);
    assert!(g.repeated);
    assert!(!g.required);
}

#[test]
fn test_required_group_in_message() {
    let m = parse(
        "message SearchResponse {
		required group Result = 1 {
		  required string url = 2;
		  optional string title = 3;
		  repeated string snippets = 4;
		}
	  }",
    );
    let g = group_at(&m, 0);
    assert_eq!(g.elements.len(), 3);
    assert!(g.required);
    assert!(!g.repeated);
}

#[test]
fn test_single_quoted_reserved_names() {
    let m = parse("message Channel {\n\t\treserved '', 'things', \"\";\n\t  }");
    match &m.elements[0] {
        Element::Reserved(r) => assert_eq!(r.field_names, vec!["", "things", ""]),
        other => panic!("expected reserved, got {:?}", other),
    }
}

#[test]
fn test_comment_before_body_is_kept() {
    let m = parse(
        "message BarMessage // BarMessage
	  // with another line
	  {
		  name string = 1;
	  }
	",
    );
    assert_eq!(m.elements.len(), 2);
    match &m.elements[0] {
        Element::Comment(c) => assert_eq!(c.lines, vec![" BarMessage", " with another line"]),
        other => panic!("expected comment, got {:?}", other),
    }
    let f = m.fields().next().unwrap();
    assert_eq!(f.type_name, "name");
    assert_eq!(f.name, "string");
}

#[test]
fn test_message_named_message() {
    let m = parse("message message {\n\t\tstring message = 1;\n\t}\n\t");
    assert_eq!(m.name, "message");
    assert_eq!(m.elements.len(), 1);
    let f = m.fields().next().unwrap();
    assert_eq!(f.name, "message");
    assert_eq!(f.type_name, "string");
}

#[test]
fn test_bracketed_aggregate_keys() {
    let cases = [
        ("[key]: value_name", "key", "value_name"),
        ("[key.dot]: value_name", "key.dot", "value_name"),
        ("[option.message]: repeated", "option.message", "repeated"),
    ];
    for (entry, name, value) in cases {
        let src = format!("message Msg {{\n  option (option_name) = {{ {} }}; \n}}", entry);
        let m = parse(&src);
        let option = option_at(&m, 0);
        assert!(option.is_aggregate);
        let named = &option.aggregated_constants[0];
        assert_eq!(named.name, name);
        assert!(named.bracketed);
        assert_eq!(named.literal.source, value);
    }
}

#[test]
fn test_comments_in_field_options_array() {
    let m = parse(
        "message Msg {
	repeated string strings_list = 5 [
		// before
		(validate.rules).repeated.max_items = 20 // inline
		// after
	];
}",
    );
    let f = m.fields().next().unwrap();
    assert!(f.is_repeated());
    assert_eq!(f.options.len(), 1);
    let option = &f.options[0];
    assert_eq!(option.name, "(validate.rules).repeated.max_items");
    assert_eq!(option.constant.as_ref().unwrap().source, "20");
    assert_eq!(option.comment.as_ref().unwrap().lines, vec![" before"]);
    assert_eq!(option.inline_comment.as_ref().unwrap().lines, vec![" inline"]);
    assert_eq!(option.comments.len(), 1);
    assert_eq!(option.comments[0].lines, vec![" after"]);
    assert_eq!(option.comments[0].position.line, 5);
    assert_eq!(option.owner, OptionOwner::new(OwnerKind::NormalField, "strings_list"));
}

#[test]
fn test_keywords_as_names_everywhere() {
    let m = parse(
        "message M {
  message message = 1;
  option.Type option = 2;
  repeated repeated = 3;
  oneof oneof = 4;
  enum enum = 5;
  extend extend = 6;
  reserved reserved = 7;
  extensions extensions = 8;
  map map = 9;
  optional group group = 10;
}",
    );
    let names: Vec<(&str, &str)> = m
        .fields()
        .map(|f| (f.type_name.as_str(), f.name.as_str()))
        .collect();
    assert_eq!(
        names,
        vec![
            ("message", "message"),
            ("option.Type", "option"),
            ("repeated", "repeated"),
            ("oneof", "oneof"),
            ("enum", "enum"),
            ("extend", "extend"),
            ("reserved", "reserved"),
            ("extensions", "extensions"),
            ("map", "map"),
            ("group", "group"),
        ]
    );
    assert!(m.fields().last().unwrap().is_optional());
}

#[test]
fn test_nested_enum_and_extend() {
    let m = parse(
        "message M {
  enum Kind {
    option allow_alias = true;
    UNKNOWN = 0;
    OTHER = 1 [deprecated = true];
  }
  extend .google.protobuf.MessageOptions {
    optional string label = 50000;
  }
  extensions 100 to max;
}",
    );
    match &m.elements[0] {
        Element::Enum(e) => {
            assert_eq!(e.name, "Kind");
            assert_eq!(e.values().count(), 2);
        }
        other => panic!("expected enum, got {:?}", other),
    }
    match &m.elements[1] {
        Element::Message(ext) => {
            assert!(ext.is_extend);
            assert_eq!(ext.name, ".google.protobuf.MessageOptions");
        }
        other => panic!("expected extend, got {:?}", other),
    }
    assert_eq!(m.elements[2].kind(), "extensions");
}

#[test]
fn test_reparse_is_structurally_equal() {
    let a = parse("message A {\n  // c\n  int32 x = 1;\n  option (o) = { k: [1, 2] };\n}");
    let b = parse("message A {\n  // c\n  int32 x = 1;\n  option (o) = { k: [1, 2] };\n}");
    assert_eq!(a, b);

    // Same tokens, different layout: same shape and names, different positions.
    let c = parse("message A {\n\n\n  // c\n  int32   x = 1;   option (o) = {k:[1,2]};\n}");
    let shape = |m: &Message| -> Vec<&'static str> { m.elements.iter().map(Element::kind).collect() };
    assert_eq!(shape(&a), shape(&c));
    assert_ne!(a.fields().next().unwrap().position, c.fields().next().unwrap().position);
}
