//! Quote/escape-aware bracket matching.
//!
//! Both the bracket matcher and the partial item extractor walk JSON-ish
//! text byte by byte and must ignore structural characters that appear
//! inside string literals. [`JsonScanner`] holds that shared state.
//!
//! Scanning is over bytes: every delimiter we care about is ASCII and no
//! UTF-8 continuation byte can be mistaken for one.

/// String-literal state for a byte-wise JSON scan.
///
/// Tracks whether the cursor is inside a `"..."` literal and whether the
/// previous byte was an unescaped backslash inside that literal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonScanner {
    in_string: bool,
    escape_next: bool,
}

impl JsonScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte. Returns `true` if the byte is structural, i.e. it lies
    /// outside any string literal and is not itself a quote.
    #[inline]
    pub fn structural(&mut self, byte: u8) -> bool {
        if self.escape_next {
            self.escape_next = false;
            return false;
        }
        if self.in_string {
            match byte {
                b'\\' => self.escape_next = true,
                b'"' => self.in_string = false,
                _ => {}
            }
            return false;
        }
        if byte == b'"' {
            self.in_string = true;
            return false;
        }
        true
    }

    /// True while the cursor is inside a string literal.
    #[inline]
    pub fn in_string(&self) -> bool {
        self.in_string
    }
}

/// Find the index of the bracket that closes the one at `start`.
///
/// `text[start]` must be `[` or `{`. Any `[`/`{` outside a string literal
/// deepens the nesting and any `]`/`}` closes one level; the index of the
/// byte that returns depth to zero is returned.
///
/// Returns `None` when `start` does not point at an opening bracket, or when
/// the text ends first, which is how callers learn the structure is still
/// streaming in.
pub fn find_matching_bracket(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    match bytes.get(start) {
        Some(b'[') | Some(b'{') => {}
        _ => return None,
    }

    let mut scanner = JsonScanner::new();
    let mut depth: usize = 0;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if !scanner.structural(byte) {
            continue;
        }
        match byte {
            b'[' | b'{' => depth += 1,
            b']' | b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }

    None
}
