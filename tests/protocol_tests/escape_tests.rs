//! Tests for the escaping codecs
//!
//! These tests verify:
//! - ServerQuery escape table in both directions
//! - Backslash handling (no double escaping)
//! - URL form encoding for the WebQuery transport
//! - The two encodings are not interchangeable

use ts3query::protocol::escape::{
    decode, encode, form_decode, form_encode, is_wire_safe, ESCAPE_TABLE,
};

// =============================================================================
// ServerQuery Escape Table
// =============================================================================

#[test]
fn test_encode_known_sequences() {
    assert_eq!(encode("Server Admin"), "Server\\sAdmin");
    assert_eq!(encode("a|b"), "a\\pb");
    assert_eq!(encode("5/10"), "5\\/10");
    assert_eq!(encode("C:\\temp"), "C:\\\\temp");
    assert_eq!(encode("line1\nline2\r\n"), "line1\\nline2\\r\\n");
    assert_eq!(encode("\t\u{0B}\u{0C}\u{07}\u{08}"), "\\t\\v\\f\\a\\b");
}

#[test]
fn test_decode_known_sequences() {
    assert_eq!(decode("unknown\\scommand"), "unknown command");
    assert_eq!(decode("Dr.\\sHouse\\p\\/MD"), "Dr. House|/MD");
    assert_eq!(decode("\\\\\\\\"), "\\\\");
}

#[test]
fn test_round_trip_reserved_and_alphanumeric() {
    let reserved: String = ESCAPE_TABLE.iter().map(|(raw, _)| *raw).collect();
    let samples = [
        reserved.clone(),
        format!("abc{}XYZ019", reserved),
        "\\s\\p\\\\".to_string(),
        "trailing backslash\\".to_string(),
        "a b|c/d\te".to_string(),
        String::new(),
    ];

    for sample in &samples {
        assert_eq!(&decode(&encode(sample)), sample, "round trip of {:?}", sample);
    }
}

#[test]
fn test_plain_text_passes_through() {
    let text = "ÄÖÜ_日本語-42.~=";
    assert!(is_wire_safe(text));
    assert_eq!(encode(text), text);
    assert_eq!(decode(text), text);
}

#[test]
fn test_encoded_output_has_no_raw_separators() {
    let encoded = encode("a b|c\nd");
    assert!(!encoded.contains(' '));
    assert!(!encoded.contains('|'));
    assert!(!encoded.contains('\n'));
}

#[test]
fn test_backslash_escaped_before_other_sequences() {
    // A literal backslash followed by 's' must stay distinguishable from a space
    let encoded = encode("\\s");
    assert_eq!(encoded, "\\\\s");
    assert_ne!(decode(&encoded), " ");
}

#[test]
fn test_double_encoding_is_not_idempotent() {
    let once = encode("a b");
    let twice = encode(&once);
    assert_ne!(once, twice);
    assert_eq!(decode(&twice), once);
}

#[test]
fn test_decode_unknown_escape_kept() {
    assert_eq!(decode("a\\xb"), "a\\xb");
    assert_eq!(decode("end\\"), "end\\");
}

// =============================================================================
// URL Form Encoding
// =============================================================================

#[test]
fn test_form_encode_space_and_equals() {
    assert_eq!(form_encode("a b=c"), "a+b%3Dc");
    assert_eq!(form_encode("x&y"), "x%26y");
    assert_eq!(form_encode("ü"), "%C3%BC");
}

#[test]
fn test_form_decode() {
    assert_eq!(form_decode("a+b%3Dc"), "a b=c");
    assert_eq!(form_decode("a%20b"), "a b");
    assert_eq!(form_decode("%C3%BC"), "ü");
}

#[test]
fn test_form_round_trip() {
    for sample in ["hello world", "k=v&x=y", "100% sure", "a/b\\c|d", ""] {
        assert_eq!(form_decode(&form_encode(sample)), sample);
    }
}

#[test]
fn test_encodings_are_distinct() {
    let value = "poke me=now";
    assert_eq!(encode(value), "poke\\sme=now");
    assert_eq!(form_encode(value), "poke+me%3Dnow");

    // Decoding with the wrong table corrupts the value
    assert_ne!(decode(&form_encode(value)), value);
    assert_ne!(form_decode(&encode(value)), value);
}
