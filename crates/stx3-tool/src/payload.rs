//! Parsing of hex payload arguments.

use thiserror::Error;

/// Reasons a payload argument cannot be decoded.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadParseError {
    #[error("no payload bytes given")]
    Empty,

    #[error("'{0}' is not a hex byte")]
    BadByte(String),

    #[error("'{arg}' is not a hex string: {reason}")]
    BadString { arg: String, reason: String },
}

/// Decode payload arguments.
///
/// Accepts either one byte per argument (`0a 1b 0x2c`) or a single argument
/// holding the whole payload as a hex string (`0a1b2c`).
pub fn parse_payload<S: AsRef<str>>(args: &[S]) -> Result<Vec<u8>, PayloadParseError> {
    match args {
        [] => Err(PayloadParseError::Empty),
        [single] if strip_hex_prefix(single.as_ref()).len() > 2 => {
            let arg = single.as_ref();
            hex::decode(strip_hex_prefix(arg)).map_err(|e| PayloadParseError::BadString {
                arg: arg.to_string(),
                reason: e.to_string(),
            })
        }
        many => many.iter().map(|s| parse_byte(s.as_ref())).collect(),
    }
}

fn parse_byte(arg: &str) -> Result<u8, PayloadParseError> {
    let digits = strip_hex_prefix(arg);
    if digits.is_empty() || digits.len() > 2 {
        return Err(PayloadParseError::BadByte(arg.to_string()));
    }
    u8::from_str_radix(digits, 16).map_err(|_| PayloadParseError::BadByte(arg.to_string()))
}

fn strip_hex_prefix(arg: &str) -> &str {
    arg.strip_prefix("0x")
        .or_else(|| arg.strip_prefix("0X"))
        .unwrap_or(arg)
}

/// Parse a decimal or `0x`-prefixed hex byte value.
pub fn parse_u8(arg: &str) -> Result<u8, String> {
    let parsed = match arg.strip_prefix("0x").or_else(|| arg.strip_prefix("0X")) {
        Some(digits) => u8::from_str_radix(digits, 16),
        None => arg.parse::<u8>(),
    };
    parsed.map_err(|e| format!("'{}' is not a byte value: {}", arg, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_hex_string() {
        assert_eq!(
            parse_payload(&["0102030405060708ff"]).unwrap(),
            vec![1, 2, 3, 4, 5, 6, 7, 8, 0xFF]
        );
        assert_eq!(parse_payload(&["0xA0B1"]).unwrap(), vec![0xA0, 0xB1]);
    }

    #[test]
    fn test_separate_bytes() {
        assert_eq!(
            parse_payload(&["0a", "1B", "0x2c", "3"]).unwrap(),
            vec![0x0A, 0x1B, 0x2C, 0x03]
        );
        assert_eq!(parse_payload(&["ff"]).unwrap(), vec![0xFF]);
    }

    #[test]
    fn test_rejects_bad_input() {
        let empty: [&str; 0] = [];
        assert_eq!(parse_payload(&empty), Err(PayloadParseError::Empty));
        assert_eq!(
            parse_payload(&["0a", "zz"]),
            Err(PayloadParseError::BadByte("zz".to_string()))
        );
        assert_eq!(
            parse_payload(&["0a", "123"]),
            Err(PayloadParseError::BadByte("123".to_string()))
        );
        assert!(matches!(
            parse_payload(&["0a1b2"]),
            Err(PayloadParseError::BadString { .. })
        ));
        assert!(matches!(
            parse_payload(&["0a1bzz"]),
            Err(PayloadParseError::BadString { .. })
        ));
    }

    #[test]
    fn test_parse_u8() {
        assert_eq!(parse_u8("60"), Ok(60));
        assert_eq!(parse_u8("0x3C"), Ok(0x3C));
        assert_eq!(parse_u8("0X78"), Ok(0x78));
        assert!(parse_u8("256").is_err());
        assert!(parse_u8("0x").is_err());
        assert!(parse_u8("-1").is_err());
    }
}
