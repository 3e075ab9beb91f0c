//! Hex text at the transport boundary.
//!
//! Decoders only accept raw bytes. Text captures (logs, test fixtures, CLI
//! arguments) are turned into bytes here first; anything that is not a valid
//! byte encoding is rejected before it can reach decoder state.

use crate::error::{FrameError, Result};

/// Parse hex text into bytes.
///
/// ASCII whitespace, `:` and `,` separators are ignored, as is an optional
/// leading `0x`. Digits must come in pairs.
pub fn decode_hex(text: &str) -> Result<Vec<u8>> {
    let text = text.trim();
    let text = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);

    let digits: Vec<u8> = text
        .bytes()
        .filter(|b| !b.is_ascii_whitespace() && *b != b':' && *b != b',')
        .collect();

    if digits.len() % 2 != 0 {
        return Err(FrameError::InvalidInputEncoding {
            reason: format!("odd number of hex digits ({})", digits.len()),
        });
    }

    digits
        .chunks_exact(2)
        .map(|pair| -> Result<u8> { Ok((nibble(pair[0])? << 4) | nibble(pair[1])?) })
        .collect()
}

/// Format bytes as space-separated uppercase hex pairs.
pub fn encode_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{byte:02X}"));
    }
    out
}

fn nibble(digit: u8) -> Result<u8> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(digit - b'a' + 10),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        other => Err(FrameError::InvalidInputEncoding {
            reason: format!("invalid hex digit {:?}", char::from(other)),
        }),
    }
}
