use eml_parse::*;

fn filename(header: &str) -> Option<String> {
    extended_parameter(header, "filename", true)
        .unwrap()
        .map(|param| param.value)
}

// --- Encoded words ---

#[test]
fn test_encoded_word_quoted_printable() {
    assert_eq!(
        decode_encoded_words("=?utf-8?Q?=C3=A9=3F?=", true).unwrap(),
        "é?"
    );
    assert_eq!(
        decode_encoded_words("=?iso-8859-1?Q?=A3=2020?=", true).unwrap(),
        "£ 20"
    );
    assert_eq!(
        decode_encoded_words("=?UTF-8?Q?Foo_Bar?= <foo.bar@example.com>", true).unwrap(),
        "Foo Bar <foo.bar@example.com>"
    );
}

#[test]
fn test_encoded_word_base64() {
    assert_eq!(
        decode_encoded_words("=?gb2312?B?zsTX1g==?==?gb2312?B?zsTX1g==?=", true).unwrap(),
        "文字文字"
    );
    assert_eq!(
        decode_encoded_words("=?ISO-2022-JP?B?GyRCM1g5OzU7PVEwdzgmPSQ4IUYkMnFKczlwGyhC?=", true)
            .unwrap(),
        "学校技術員研修検討会報告"
    );
}

#[test]
fn test_adjacent_encoded_words_drop_folding_whitespace() {
    assert_eq!(
        decode_encoded_words("=?utf-8?Q?a?=\r\n =?utf-8?Q?b?=", true).unwrap(),
        "ab"
    );
    assert_eq!(
        decode_encoded_words("x =?utf-8?Q?a?= y =?utf-8?Q?b?= z", true).unwrap(),
        "x a y b z"
    );
}

#[test]
fn test_character_split_across_encoded_words() {
    assert_eq!(
        decode_encoded_words("=?utf-8?B?5pY=?= =?utf-8?B?hw==?=", true).unwrap(),
        "文"
    );
}

#[test]
fn test_malformed_encoded_word_passes_through() {
    for input in ["=?utf-8?X?abc?=", "=?utf-8?Q?unterminated", "plain text", "a=?b"] {
        assert_eq!(decode_encoded_words(input, true).unwrap(), input);
    }
}

#[test]
fn test_encoded_word_errors() {
    assert!(matches!(
        decode_encoded_words("=?x-unknown?Q?a?=", true),
        Err(ParseError::UnsupportedCharset(_))
    ));
    assert!(matches!(
        decode_encoded_words("=?utf-8?B?@@@@?=", true),
        Err(ParseError::Decode(_))
    ));
    assert!(matches!(
        decode_encoded_words("=?utf-8?Q?=FF?=", true),
        Err(ParseError::Decode(_))
    ));
    assert_eq!(
        decode_encoded_words("=?utf-8?Q?=FF?=", false).unwrap(),
        "\u{fffd}"
    );
}

// --- RFC 5987 ---

#[test]
fn test_rfc5987_values() {
    assert_eq!(
        decode_rfc5987("utf-8''%E6%96%87%E5%AD%97.txt", true).unwrap(),
        "文字.txt"
    );
    assert_eq!(
        decode_rfc5987("iso-8859-1'en'%A3%20rates.txt", true).unwrap(),
        "£ rates.txt"
    );
    assert_eq!(decode_rfc5987("''plain.txt", true).unwrap(), "plain.txt");
    assert_eq!(decode_rfc5987("no-delimiters", true).unwrap(), "no-delimiters");
}

// --- Simple parameters ---

#[test]
fn test_parameter_lookup() {
    let content_type = "multipart/mixed;\n boundary=\"----=_Part_1\"; charset=UTF-8";
    assert_eq!(
        parameter(content_type, "boundary").as_deref(),
        Some("----=_Part_1")
    );
    assert_eq!(parameter(content_type, "CHARSET").as_deref(), Some("UTF-8"));
    assert_eq!(parameter(content_type, "name"), None);
}

#[test]
fn test_unquoted_value_runs_to_semicolon() {
    assert_eq!(
        filename("attachment; filename=foo bar.txt").as_deref(),
        Some("foo bar.txt")
    );
    assert_eq!(
        filename("attachment; filename=My Document.pdf ; size=10").as_deref(),
        Some("My Document.pdf")
    );
    assert_eq!(
        parameter("multipart/mixed; boundary=abc\n\t", "boundary").as_deref(),
        Some("abc")
    );
}

#[test]
fn test_boundary_is_not_decoded() {
    let content_type = "multipart/mixed; boundary=\"=?utf-8?Q?b?=\"";
    assert_eq!(
        parameter(content_type, "boundary").as_deref(),
        Some("=?utf-8?Q?b?=")
    );
}

// --- Extended parameter precedence ---

#[test]
fn test_extended_form_wins_over_everything() {
    let header = "attachment; filename*0=\"b.t\"; filename*1=\"xt\"; \
                  filename=\"d.txt\"; filename*=utf-8''e.txt";
    let param = extended_parameter(header, "filename", true).unwrap().unwrap();
    assert_eq!(param.value, "e.txt");
    assert!(param.rfc5987);
}

#[test]
fn test_plain_form_wins_over_continuations() {
    let header = "attachment; filename*0=\"b.t\"; filename*1=\"xt\"; filename=\"d.txt\"";
    let param = extended_parameter(header, "filename", true).unwrap().unwrap();
    assert_eq!(param.value, "d.txt");
    assert!(!param.rfc5987);
}

#[test]
fn test_continuations_are_last_resort() {
    assert_eq!(
        filename("attachment; filename*1=\"xt\"; filename*0=\"b.t\"").as_deref(),
        Some("b.txt")
    );
}

#[test]
fn test_two_extended_forms_fall_back_to_plain() {
    let header = "attachment; filename*=utf-8''x.txt; filename*=utf-8''y.txt; filename=z.txt";
    assert_eq!(filename(header).as_deref(), Some("z.txt"));
}

#[test]
fn test_extended_continuations_join_bytes() {
    let header = "attachment; filename*0*=utf-8''%E6%96; filename*1*=%87%E5%AD%97; filename*2=.txt";
    let param = extended_parameter(header, "filename", true).unwrap().unwrap();
    assert_eq!(param.value, "文字.txt");
    assert!(param.rfc5987);
}

#[test]
fn test_continuation_gap_makes_parameter_absent() {
    assert_eq!(filename("attachment; filename*0=\"a\"; filename*2=\"c\""), None);
    assert_eq!(filename("attachment; filename*1=\"b\""), None);
    assert_eq!(
        filename("attachment; filename*0=\"a\"; filename*0=\"again\""),
        None
    );
}

#[test]
fn test_plain_parameter_is_encoded_word_decoded() {
    let header = "attachment;\n\tfilename=\"=?gb2312?B?zsTX1g==?=\n =?gb2312?B?LnR4dA==?=\"";
    assert_eq!(filename(header).as_deref(), Some("文字.txt"));
}

#[test]
fn test_missing_parameter() {
    assert_eq!(filename("attachment"), None);
    assert_eq!(filename("inline; name=\"a.txt\""), None);
}

// --- Idempotence ---

#[test]
fn test_decoded_values_decode_to_themselves() {
    let headers = [
        "attachment; filename*=utf-8''%E6%96%87%E5%AD%97.txt",
        "attachment; filename*=iso-8859-1'en'%A3%20rates.txt",
        "attachment; filename=\"=?gb2312?B?zsTX1g==?=\"",
        "attachment; filename*0=\"ABC\"; filename*1=\"def.txt\"",
    ];
    for header in headers {
        let decoded = filename(header).unwrap();
        assert_eq!(decode_encoded_words(&decoded, true).unwrap(), decoded);

        let requoted = format!("attachment; filename=\"{decoded}\"");
        assert_eq!(filename(&requoted).as_deref(), Some(decoded.as_str()));
    }
}
