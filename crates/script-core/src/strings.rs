//! String literal parsing and the inverse `escape_string`.
//!
//! These two functions are deliberately *not* perfect inverses of each
//! other: `parse_string` expands `\t` to four spaces (there is no tab
//! character in the language's runtime representation), but
//! `escape_string` passes a literal tab byte through unescaped. A tab
//! produced by some other route therefore cannot be round-tripped back
//! through source text. This matches the historical behavior of the
//! runtime this core was modeled on and is preserved deliberately, not a
//! bug to be fixed.

use crate::arena::Arena;

/// Parse a source-level quoted string literal into raw bytes, NUL-terminated.
///
/// `literal` is the token text as it appears in source, including the
/// optional leading `L` and the opening/closing quotes (e.g. `"abc\n"` or
/// `L"abc"`). The `L` prefix keeps a literal `"` as the first byte of the
/// value — a historical parser quirk preserved for source fidelity.
pub fn parse_string<'a>(arena: &'a Arena, literal: &str) -> &'a [u8] {
    let mut chars = literal.chars().peekable();
    let mut out: Vec<u8> = Vec::with_capacity(literal.len());

    if chars.peek() == Some(&'L') {
        chars.next();
        out.push(b'"');
    }

    if chars.peek() == Some(&'"') {
        chars.next();
    }

    let mut buf = [0u8; 4];
    while let Some(c) = chars.next() {
        match c {
            '"' => break,
            '\\' => match chars.next() {
                Some('n') => out.push(b'\n'),
                Some('t') => out.extend_from_slice(b"    "),
                Some('\\') => out.push(b'\\'),
                Some('"') => out.push(b'"'),
                Some(other) => out.extend_from_slice(other.encode_utf8(&mut buf).as_bytes()),
                None => break,
            },
            other => out.extend_from_slice(other.encode_utf8(&mut buf).as_bytes()),
        }
    }

    out.push(0);
    arena.alloc_bytes(&out)
}

/// Render raw string bytes back to source-level quoted syntax. Stops at the
/// first NUL, if any. Escapes `\`, `"`, and newline; every other byte
/// (including tab) passes through unmodified — see the module comment for
/// why that is not a bug.
pub fn escape_string(bytes: &[u8]) -> String {
    let trimmed = match bytes.iter().position(|&b| b == 0) {
        Some(i) => &bytes[..i],
        None => bytes,
    };
    let text = String::from_utf8_lossy(trimmed);

    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_expands_to_four_spaces() {
        let arena = Arena::new();
        let bytes = parse_string(&arena, "\"a\\tb\"");
        assert_eq!(bytes, b"a    b\0");
    }

    #[test]
    fn l_prefix_keeps_leading_quote() {
        let arena = Arena::new();
        let bytes = parse_string(&arena, "L\"abc\"");
        assert_eq!(bytes, b"\"abc\0");
    }

    #[test]
    fn unterminated_escape_truncates_cleanly() {
        let arena = Arena::new();
        let bytes = parse_string(&arena, "\"abc\\");
        assert_eq!(bytes, b"abc\0");
    }

    #[test]
    fn unknown_escape_drops_backslash() {
        let arena = Arena::new();
        let bytes = parse_string(&arena, "\"a\\qb\"");
        assert_eq!(bytes, b"aqb\0");
    }

    #[test]
    fn round_trips_without_tab_or_nul() {
        let arena = Arena::new();
        let original = "line one\nline \"two\"\\end";
        let escaped = escape_string(original.as_bytes());
        let parsed = parse_string(&arena, &escaped);
        assert_eq!(&parsed[..parsed.len() - 1], original.as_bytes());
    }

    #[test]
    fn escape_passes_tab_through_unescaped() {
        let escaped = escape_string(b"a\tb");
        assert_eq!(escaped, "\"a\tb\"");
    }
}
