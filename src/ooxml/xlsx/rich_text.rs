//! Plain-text extraction for rich text values.
//!
//! SpreadsheetML stores characters that XML cannot carry (mostly C0 control
//! characters) as `_xHHHH_` escapes. Decoding turns the escapes back into
//! characters, then drops every control character other than tab, line feed
//! and carriage return so that only displayable text reaches a row.

use memchr::memmem;

/// Decode `_xHHHH_` escapes and strip non-printing control characters.
///
/// # Examples
///
/// ```
/// use rowstream::ooxml::xlsx::plain_text;
/// assert_eq!(plain_text("line_x000D_"), "line\r");
/// assert_eq!(plain_text("bell_x0007_"), "bell");
/// assert_eq!(plain_text("_x005F_x0041_"), "_x0041_");
/// ```
pub fn plain_text(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = String::with_capacity(raw.len());
    let mut pos = 0;

    while let Some(found) = memmem::find(&bytes[pos..], b"_x") {
        let start = pos + found;
        push_visible(&mut out, &raw[pos..start]);

        match decode_escape(&bytes[start..]) {
            Some(ch) => {
                // `_x005F_` is an escaped underscore: the text after it is literal.
                if ch == '_' {
                    out.push('_');
                } else if is_visible(ch) {
                    out.push(ch);
                }
                pos = start + ESCAPE_LEN;
            },
            None => {
                out.push_str("_x");
                pos = start + 2;
            },
        }
    }

    push_visible(&mut out, &raw[pos..]);
    out
}

const ESCAPE_LEN: usize = 7;

/// Decode `_xHHHH_` at the start of `bytes`.
fn decode_escape(bytes: &[u8]) -> Option<char> {
    if bytes.len() < ESCAPE_LEN || bytes[ESCAPE_LEN - 1] != b'_' {
        return None;
    }
    let hex = &bytes[2..6];
    if !hex.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    let code = u32::from_str_radix(std::str::from_utf8(hex).ok()?, 16).ok()?;
    char::from_u32(code)
}

#[inline]
fn is_visible(ch: char) -> bool {
    !ch.is_control() || matches!(ch, '\t' | '\n' | '\r')
}

#[inline]
fn push_visible(out: &mut String, segment: &str) {
    out.extend(segment.chars().filter(|&ch| is_visible(ch)));
}
