//! frame.rs — NMEA 0183 framing
//!
//! `⟨prefix⟩⟨body⟩*HH\r\n` where prefix is `$` or `!` and `HH` is the XOR of
//! the body bytes, uppercase hex. Verification is case-insensitive on `HH`.

use crate::error::ParseError;

/// XOR of every byte of `body` (prefix and `*HH` excluded).
pub fn checksum(body: &str) -> u8 {
    body.bytes().fold(0, |acc, b| acc ^ b)
}

/// Wrap a sentence body into a complete frame, CR-LF terminated.
pub fn wrap(prefix: char, body: &str) -> String {
    format!("{prefix}{body}*{:02X}\r\n", checksum(body))
}

/// Verify a received frame and return its body (prefix and checksum stripped).
///
/// The input may still carry its CR-LF; surrounding whitespace is ignored.
pub fn unwrap(line: &str) -> Result<&str, ParseError> {
    let line = line.trim();
    let rest = line
        .strip_prefix('$')
        .or_else(|| line.strip_prefix('!'))
        .ok_or_else(|| ParseError::MalformedFrame(format!("missing $/! prefix: {line}")))?;

    let (body, carried) = rest
        .rsplit_once('*')
        .ok_or_else(|| ParseError::MalformedFrame(format!("missing checksum: {line}")))?;
    if carried.len() != 2 || !carried.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ParseError::MalformedFrame(format!(
            "bad checksum field {carried:?}"
        )));
    }

    let computed = checksum(body);
    let carried_val =
        u8::from_str_radix(carried, 16).map_err(|_| ParseError::MalformedFrame(line.into()))?;
    if computed != carried_val {
        return Err(ParseError::ChecksumMismatch {
            computed,
            carried: carried.to_string(),
        });
    }
    Ok(body)
}
