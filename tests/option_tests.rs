//! Option statements and values inside message bodies.

use pretty_assertions::assert_eq;
use protoidl::{parse_message_str, Element, Literal, Message, OwnerKind, ProtoOption};

fn options(m: &Message) -> Vec<&ProtoOption> {
    m.options().collect()
}

fn sources(items: &[Literal]) -> Vec<&str> {
    items.iter().map(|l| l.source.as_str()).collect()
}

#[test]
fn test_scalar_option_statements() {
    let m = parse_message_str(
        r#"message M {
  option deprecated = true;
  option (my.ext) = -12;
  option (fmt).width = 0x10;
  option (doc) = "first "
                 'second';
  option (ratio) = 1.5e3;
  option (kind) = pkg.Kind.VALUE;
}"#,
    )
    .unwrap();
    let opts = options(&m);
    let values: Vec<(&str, &str, bool)> = opts
        .iter()
        .map(|o| {
            let c = o.constant.as_ref().unwrap();
            (o.name.as_str(), c.source.as_str(), c.is_string)
        })
        .collect();
    assert_eq!(
        values,
        vec![
            ("deprecated", "true", false),
            ("(my.ext)", "-12", false),
            ("(fmt).width", "0x10", false),
            ("(doc)", "first second", true),
            ("(ratio)", "1.5e3", false),
            ("(kind)", "pkg.Kind.VALUE", false),
        ]
    );
    let doc = opts[3].constant.as_ref().unwrap();
    assert_eq!(doc.source_lines, vec!["first ", "second"]);
    assert!(opts.iter().all(|o| !o.is_embedded && o.owner.kind == OwnerKind::Message));
}

#[test]
fn test_aggregate_option() {
    let m = parse_message_str(
        r#"message M {
  option (http) = {
    get: "/v1/things/{id}"
    additional_bindings {
      post: "/v1/things"
      body: "*"
    }
    tags: ["a", "b"];
    any: { [type.googleapis.com/pkg.Thing] { name: "x" } }
    strict
  };
}"#,
    )
    .unwrap();
    let http = options(&m)[0];
    assert!(http.is_aggregate);
    assert!(http.constant.is_none());

    let names: Vec<&str> = http.aggregated_constants.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["get", "additional_bindings", "tags", "any", "strict"]);

    assert_eq!(http.aggregated("get").unwrap().source, "/v1/things/{id}");
    let bindings = http.aggregated("additional_bindings").unwrap();
    assert!(!http.aggregated_constants[1].prints_colon);
    let inner: Vec<&str> = bindings
        .ordered_map
        .as_ref()
        .unwrap()
        .iter()
        .map(|n| n.name.as_str())
        .collect();
    assert_eq!(inner, vec!["post", "body"]);

    assert_eq!(sources(http.aggregated("tags").unwrap().array.as_ref().unwrap()), vec!["a", "b"]);

    let any = http.aggregated("any").unwrap().ordered_map.as_ref().unwrap();
    assert_eq!(any[0].name, "type.googleapis.com/pkg.Thing");
    assert!(any[0].bracketed);

    assert_eq!(http.aggregated("strict").unwrap().as_bool(), Some(true));
}

#[test]
fn test_field_option_lists() {
    let m = parse_message_str(
        r#"message M {
  int32 a = 1 [packed = true, (custom).flag = false, json_name = "A"];
  map<string, int32> b = 2 [deprecated = true];
  optional group G = 3 [deprecated = true] {}
  extensions 10 to 20 [(declaration) = { number: 10 }];
}"#,
    )
    .unwrap();

    let owners: Vec<(OwnerKind, String, String)> = m
        .elements
        .iter()
        .flat_map(|e| match e {
            Element::NormalField(f) => f.options.clone(),
            Element::MapField(f) => f.options.clone(),
            Element::Group(g) => g.options.clone(),
            Element::Extensions(x) => x.options.clone(),
            _ => Vec::new(),
        })
        .map(|o| {
            assert!(o.is_embedded);
            (o.owner.kind, o.owner.name, o.name)
        })
        .collect();
    assert_eq!(
        owners,
        vec![
            (OwnerKind::NormalField, "a".to_string(), "packed".to_string()),
            (OwnerKind::NormalField, "a".to_string(), "(custom).flag".to_string()),
            (OwnerKind::NormalField, "a".to_string(), "json_name".to_string()),
            (OwnerKind::MapField, "b".to_string(), "deprecated".to_string()),
            (OwnerKind::Group, "G".to_string(), "deprecated".to_string()),
            (OwnerKind::Extensions, String::new(), "(declaration)".to_string()),
        ]
    );
}

#[test]
fn test_option_owners_in_nested_containers() {
    let m = parse_message_str(
        "message M {
  oneof o { option (one) = 1; int32 a = 1; }
  repeated group G = 2 { option (grp) = 2; }
  extend Foo { optional int32 x = 100 [(ext) = 3]; }
}",
    )
    .unwrap();
    let mut seen = Vec::new();
    for element in &m.elements {
        match element {
            Element::OneOf(o) => seen.extend(o.elements.iter().filter_map(|e| match e {
                Element::Option(opt) => Some(opt.owner.clone()),
                _ => None,
            })),
            Element::Group(g) => seen.extend(g.elements.iter().filter_map(|e| match e {
                Element::Option(opt) => Some(opt.owner.clone()),
                _ => None,
            })),
            Element::Message(ext) => seen.extend(ext.fields().flat_map(|f| f.options.iter().map(|o| o.owner.clone()))),
            _ => {}
        }
    }
    let described: Vec<(OwnerKind, &str)> = seen.iter().map(|o| (o.kind, o.name.as_str())).collect();
    assert_eq!(
        described,
        vec![
            (OwnerKind::OneOf, "o"),
            (OwnerKind::Group, "G"),
            (OwnerKind::NormalField, "x"),
        ]
    );
}
