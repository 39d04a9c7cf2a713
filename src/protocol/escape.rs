//! Escaping codec
//!
//! Two independent encodings live here:
//!
//! - [`encode`] / [`decode`]: the ServerQuery escape table, used by the TCP
//!   transport for every parameter value and every record value.
//! - [`form_encode`] / [`form_decode`]: `application/x-www-form-urlencoded`,
//!   used by the WebQuery transport for URL query parameters.
//!
//! A value must pass through exactly one of them, exactly once.
//!
//! ## Escape Table
//! ```text
//! ┌──────────┬──────────┐   ┌──────────┬──────────┐
//! │  char    │  wire    │   │  char    │  wire    │
//! ├──────────┼──────────┤   ├──────────┼──────────┤
//! │  \       │  \\      │   │  FF      │  \f      │
//! │  /       │  \/      │   │  LF      │  \n      │
//! │  space   │  \s      │   │  CR      │  \r      │
//! │  |       │  \p      │   │  TAB     │  \t      │
//! │  BEL     │  \a      │   │  VT      │  \v      │
//! │  BS      │  \b      │   │          │          │
//! └──────────┴──────────┘   └──────────┴──────────┘
//! ```

/// Reserved characters and their escape letter (the byte following `\`)
pub const ESCAPE_TABLE: [(char, char); 11] = [
    ('\\', '\\'),
    ('/', '/'),
    (' ', 's'),
    ('|', 'p'),
    ('\u{07}', 'a'),
    ('\u{08}', 'b'),
    ('\u{0C}', 'f'),
    ('\n', 'n'),
    ('\r', 'r'),
    ('\t', 't'),
    ('\u{0B}', 'v'),
];

fn escape_letter(c: char) -> Option<char> {
    ESCAPE_TABLE
        .iter()
        .find(|(raw, _)| *raw == c)
        .map(|(_, letter)| *letter)
}

fn unescape_letter(letter: char) -> Option<char> {
    ESCAPE_TABLE
        .iter()
        .find(|(_, l)| *l == letter)
        .map(|(raw, _)| *raw)
}

/// Escape a raw value for the ServerQuery wire
///
/// Works one source character at a time, so a backslash produced by one
/// escape is never itself re-escaped.
pub fn encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    for c in text.chars() {
        match escape_letter(c) {
            Some(letter) => {
                out.push('\\');
                out.push(letter);
            }
            None => out.push(c),
        }
    }
    out
}

/// Unescape a ServerQuery wire value
///
/// Unknown sequences and a trailing lone backslash are kept verbatim.
pub fn decode(wire: &str) -> String {
    let mut out = String::with_capacity(wire.len());
    let mut chars = wire.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(letter) => match unescape_letter(letter) {
                Some(raw) => out.push(raw),
                None => {
                    out.push('\\');
                    out.push(letter);
                }
            },
            None => out.push('\\'),
        }
    }
    out
}

/// True if `text` contains nothing that [`encode`] would rewrite
pub fn is_wire_safe(text: &str) -> bool {
    text.chars().all(|c| escape_letter(c).is_none())
}

// =============================================================================
// URL form encoding (WebQuery transport)
// =============================================================================

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Form-encode a value for a URL query string
///
/// Space becomes `+`, `=` becomes `%3D`, and every byte outside
/// `A-Z a-z 0-9 - . _ ~` is percent-encoded.
pub fn form_encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for &byte in text.as_bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => {
                out.push('%');
                out.push(HEX[(byte >> 4) as usize] as char);
                out.push(HEX[(byte & 0x0F) as usize] as char);
            }
        }
    }
    out
}

/// Decode a form-encoded value
///
/// Invalid percent sequences are kept verbatim; invalid UTF-8 is replaced.
pub fn form_decode(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 2;
                    }
                    _ => out.push(b'%'),
                }
            }
            other => out.push(other),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
