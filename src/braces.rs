//! Brace matching that treats quoted string literals and comments as opaque.
//!
//! A string opens on an unescaped `"` or `'` and closes on the next unescaped
//! occurrence of the same quote. "Escaped" only looks at the single preceding
//! byte, so `"\\"` is seen as an unterminated string. Outside a string, `//`
//! hides the rest of its line and `/* ... */` hides everything up to the
//! closing `*/`.

#[derive(Clone, Copy, PartialEq, Eq)]
enum Lexical {
    Code,
    Quoted(u8),
    LineComment,
    BlockComment,
}

/// Advances the lexical state over `bytes[i]`. Returns the next index to
/// look at, skipping the second byte of a comment delimiter.
fn step(bytes: &[u8], i: usize, prev: u8, state: &mut Lexical) -> usize {
    let b = bytes[i];
    let next = bytes.get(i + 1).copied();
    match *state {
        Lexical::Quoted(q) => {
            if b == q && prev != b'\\' {
                *state = Lexical::Code;
            }
        }
        Lexical::LineComment => {
            if b == b'\n' {
                *state = Lexical::Code;
            }
        }
        Lexical::BlockComment => {
            if b == b'*' && next == Some(b'/') {
                *state = Lexical::Code;
                return i + 2;
            }
        }
        Lexical::Code => match (b, next) {
            (b'/', Some(b'/')) => {
                *state = Lexical::LineComment;
                return i + 2;
            }
            (b'/', Some(b'*')) => {
                *state = Lexical::BlockComment;
                return i + 2;
            }
            (b'"' | b'\'', _) if prev != b'\\' => *state = Lexical::Quoted(b),
            _ => {}
        },
    }
    i + 1
}

/// Offset of the `}` that balances the block opened at `open`, or `None`
/// when the text ends first.
pub fn find_matching_close(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if open >= bytes.len() {
        return None;
    }

    let mut depth: i32 = 0;
    let mut state = Lexical::Code;
    let mut prev = if open > 0 { bytes[open - 1] } else { 0 };
    let mut i = open;

    while i < bytes.len() {
        let b = bytes[i];
        if state == Lexical::Code {
            match b {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        let next = step(bytes, i, prev, &mut state);
        prev = bytes[next - 1];
        i = next;
    }
    None
}

/// Net `{` minus `}` on a single line, string and comment state reset at
/// line start.
pub fn brace_delta(line: &str) -> i32 {
    let bytes = line.as_bytes();
    let mut delta: i32 = 0;
    let mut state = Lexical::Code;
    let mut prev = 0u8;
    let mut i = 0;

    while i < bytes.len() {
        if state == Lexical::Code {
            match bytes[i] {
                b'{' => delta += 1,
                b'}' => delta -= 1,
                _ => {}
            }
        }
        let next = step(bytes, i, prev, &mut state);
        prev = bytes[next - 1];
        i = next;
    }
    delta
}
