use eml_parse::*;

const SAMPLE_SHORT: &str = include_str!("fixtures/sample_short.eml");

// --- Node ---

#[test]
fn test_default_node_is_empty_simple() {
    let node = Node::default();
    assert!(node.is_simple());
    assert!(!node.is_compound());
    assert_eq!(node.body(), Some(""));
    assert_eq!(node.boundary(), None);
    assert!(node.children().is_empty());
}

#[test]
fn test_header_lookup_is_case_insensitive() {
    let root = parse_str("X-Thing: value\n\nbody").unwrap();
    assert_eq!(root.header("X-THING"), Some("value"));
    assert_eq!(root.header("missing"), None);
}

#[test]
fn test_walk_is_pre_order() {
    let root = parse_str(SAMPLE_SHORT).unwrap();
    let order: Vec<Option<&str>> = root
        .walk()
        .map(|node| node.meta().content_type.as_deref())
        .collect();
    assert_eq!(
        order,
        [
            Some("multipart/related"),
            Some("multipart/alternative"),
            Some("text/plain"),
            Some("text/html"),
            Some("text/plain"),
            Some("text/plain"),
        ]
    );
}

// --- Serialization ---

#[test]
fn test_json_shape() {
    let root = parse_str(SAMPLE_SHORT).unwrap();
    let json = root.to_json().unwrap();

    assert_eq!(json["kind"], "compound");
    assert_eq!(json["boundary"], "__1__");
    assert_eq!(json["meta"]["contentType"], "multipart/related");
    assert!(json["meta"].get("charset").is_none());
    assert!(json.get("body").is_none());

    let text = &json["children"][0]["children"][0];
    assert_eq!(text["kind"], "simple");
    assert_eq!(text["meta"]["charset"], "utf-8");
    assert_eq!(text["headers"]["x-some-header"], "text");

    let attachment = &json["children"][1];
    assert_eq!(attachment["meta"]["filename"], "plain-file-1.txt");
    assert!(attachment["meta"].get("fileNameIsRfc5987").is_none());
}

#[test]
fn test_json_round_trip() {
    let root = parse_str(SAMPLE_SHORT).unwrap();
    let text = serde_json::to_string(&root).unwrap();
    let back: Node = serde_json::from_str(&text).unwrap();
    assert_eq!(back, root);
}

#[test]
fn test_rfc5987_flag_serialized() {
    let root = parse_str(
        "Content-Type: text/plain\nContent-Disposition: attachment; filename*=utf-8''a%20b.txt\n\nx",
    )
    .unwrap();
    let json = root.to_json().unwrap();
    assert_eq!(json["meta"]["filename"], "a b.txt");
    assert_eq!(json["meta"]["fileNameIsRfc5987"], true);
}

// --- Meta ---

#[test]
fn test_meta_default_is_empty() {
    let meta = Meta::default();
    assert!(!meta.is_ascii_armored());
    assert!(!meta.needs_charset_redecode());
    assert_eq!(serde_json::to_string(&meta).unwrap(), "{}");
}

// --- ParseOptions ---

#[test]
fn test_parse_options_defaults() {
    let options = ParseOptions::default();
    assert_eq!(options.default_charset, "utf-8");
    assert!(options.strict);
    assert_eq!(options.read_buffer_size, 8192);
}

#[test]
fn test_parse_options_from_partial_json() {
    let options: ParseOptions = serde_json::from_str(r#"{"strict": false}"#).unwrap();
    assert!(!options.strict);
    assert_eq!(options.default_charset, "utf-8");
    assert_eq!(ParseOptions::default().with_read_buffer_size(0).read_buffer_size, 1);
}

#[test]
fn test_unknown_default_charset() {
    let options = ParseOptions::default().with_default_charset("x-none");
    assert!(matches!(
        parse_bytes_with(b"Subject: x\n\n", &options),
        Err(ParseError::UnsupportedCharset(_))
    ));
}

#[test]
fn test_latin1_default_charset_for_headers() {
    let options = ParseOptions::default().with_default_charset("iso-8859-1");
    let root = parse_bytes_with(b"Subject: caf\xe9\n\nbody", &options).unwrap();
    assert_eq!(root.header("subject"), Some("café"));
}
