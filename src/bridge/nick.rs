//! Pure nick validation and coercion, per RFC 2812 section 2.3.1.

use super::error::BridgeError;

/// Characters permitted anywhere in a nick, after the first position restriction.
fn is_allowed(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b']' | b'[' | b'^' | b'\\' | b'{' | b'}' | b'-' | b'_' | b'|')
}

/// Validates and, when `strict` is false, coerces `nick` into a legal IRC nickname.
///
/// `nicklen` is the server-advertised `NICKLEN`, when a live session is available; `None`
/// means no live client is present and length is not checked (RFC 1459's 9-character
/// default is too conservative for modern daemons, which coerce on their own).
///
/// On success, the returned string always matches `^[A-Za-z][A-Za-z0-9\]\[\^\\{}\-_|]*$`
/// and is no longer than `nicklen` bytes when `nicklen` is `Some`.
pub fn validate(nick: &str, strict: bool, nicklen: Option<usize>) -> Result<String, BridgeError> {
    let stripped: String = nick.bytes().filter(|b| is_allowed(*b)).map(|b| b as char).collect();
    if strict && stripped.len() != nick.len() {
        return Err(BridgeError::Validation("contains illegal characters.".into()));
    }

    let starts_with_letter = stripped.as_bytes().first().is_some_and(|b| b.is_ascii_alphabetic());
    let lettered = if starts_with_letter {
        stripped
    } else {
        if strict {
            return Err(BridgeError::Validation("contains illegal characters.".into()));
        }
        format!("M{stripped}")
    };

    if let Some(max) = nicklen {
        if lettered.len() > max {
            if strict {
                return Err(BridgeError::Validation(format!("too long. (Max: {max})")));
            }
            return Ok(lettered[..max].to_string());
        }
    }
    Ok(lettered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_digit_leading_nick_and_strips_bang() {
        assert_eq!(validate("123bob!", false, None).unwrap(), "M123bob");
    }

    #[test]
    fn strict_rejects_illegal_characters() {
        let err = validate("123bob!", true, None).unwrap_err();
        assert_eq!(err.to_string(), "contains illegal characters.");
    }

    #[test]
    fn truncates_to_nicklen() {
        assert_eq!(validate("alexander", false, Some(9)).unwrap(), "alexander");
        assert_eq!(validate("alexandermax", false, Some(9)).unwrap(), "alexander");
    }

    #[test]
    fn strict_rejects_overlong_nick() {
        let err = validate("alexandermax", true, Some(9)).unwrap_err();
        assert_eq!(err.to_string(), "too long. (Max: 9)");
    }

    #[test]
    fn strict_accepts_nick_validate_leaves_unchanged() {
        assert_eq!(validate("alexander", true, Some(9)).unwrap(), "alexander");
    }

    #[test]
    fn coerced_output_always_matches_shape() {
        for input in ["", "9", "!!!", "a_b-c{d}e|f[g]h^i\\j", "Z"] {
            let coerced = validate(input, false, Some(20)).unwrap();
            assert!(coerced.as_bytes().first().is_some_and(|b| b.is_ascii_alphabetic()));
            assert!(coerced.len() <= 20);
            assert!(coerced.bytes().all(is_allowed));
        }
    }
}
