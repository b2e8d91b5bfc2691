//! Content hash for synthetic widget and item ids.
//!
//! Not cryptographic. The only requirements are determinism and enough
//! spread that two widgets in one message do not collide visibly.

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Hash `text` into a short lowercase base-36 string.
///
/// 32-bit rolling `h * 31 + unit` over the UTF-16 code units of the text,
/// with wrapping arithmetic, then the magnitude in base 36. Hashing UTF-16
/// units keeps ids identical to those a JavaScript host computes for the
/// same string.
pub fn content_hash(text: &str) -> String {
    let mut hash: i32 = 0;
    for unit in text.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit));
    }
    to_base36(hash.unsigned_abs())
}

fn to_base36(mut value: u32) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::with_capacity(7);
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    // Only ASCII digits and letters were pushed.
    String::from_utf8(digits).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_single_char() {
        assert_eq!(content_hash(""), "0");
        // 'a' == 97 == 2 * 36 + 25
        assert_eq!(content_hash("a"), "2p");
    }

    #[test]
    fn test_deterministic() {
        let body = r#"{"items": [{"id": "1", "title": "A"}]}"#;
        assert_eq!(content_hash(body), content_hash(body));
    }

    #[test]
    fn test_spread() {
        assert_ne!(content_hash(r#"{"title":"A"}"#), content_hash(r#"{"title":"B"}"#));
        assert_ne!(content_hash("ab"), content_hash("ba"));
    }

    #[test]
    fn test_wrapping_does_not_panic() {
        let long = "z".repeat(10_000);
        let hash = content_hash(&long);
        assert!(!hash.is_empty());
        assert!(hash.len() <= 7);
        assert!(hash.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_lowercase()));
    }

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(u32::MAX), "1z141z3");
    }
}
