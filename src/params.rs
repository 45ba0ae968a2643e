//! Parsing of the comma-separated integer list.
//!
//! Tokens follow the kernel's `kstrtoint(s, 0)` rules: an optional sign,
//! then `0x`/`0X` for hexadecimal, a leading `0` for octal, decimal
//! otherwise. A single trailing newline is tolerated. Empty tokens
//! (`"1,,2"`, a trailing comma) are skipped.

use crate::container::Value;
use crate::error::{Error, ParseReason, Result};

/// Parse every token of `input`.
pub fn parse_int_list(input: &str) -> Result<Vec<Value>> {
    input
        .split(',')
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(position, token)| {
            parse_int(token).map_err(|reason| Error::parse(position, token, reason))
        })
        .collect()
}

/// Parse one token.
pub fn parse_int(token: &str) -> std::result::Result<Value, ParseReason> {
    let token = token.strip_suffix('\n').unwrap_or(token);
    let (negative, rest) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };

    let (radix, digits) = if let Some(hex) = rest
        .strip_prefix("0x")
        .or_else(|| rest.strip_prefix("0X"))
    {
        (16, hex)
    } else if rest.len() > 1 && rest.starts_with('0') {
        (8, &rest[1..])
    } else {
        (10, rest)
    };

    if digits.is_empty() {
        return Err(ParseReason::NoDigits);
    }
    if !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(ParseReason::InvalidDigit);
    }

    let magnitude = i64::from_str_radix(digits, radix).map_err(|_| ParseReason::OutOfRange)?;
    let value = if negative { -magnitude } else { magnitude };
    Value::try_from(value).map_err(|_| ParseReason::OutOfRange)
}
