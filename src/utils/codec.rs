//! Conversions between `0x`-prefixed hex strings and raw bytes.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HexCodecError {
    #[error("Invalid {field} hex: non-hexadecimal character '{ch}' at position {pos}")]
    InvalidCharacter {
        field: String,
        ch: char,
        pos: usize,
    },
    #[error("Invalid {field} hex: {reason}")]
    Decode { field: String, reason: String },
}

/// Decodes a hex string, with or without a `0x` prefix.
///
/// `field_name` only feeds error messages.
pub fn decode_hex(value: &str, field_name: &str) -> Result<Vec<u8>, HexCodecError> {
    let hex_str = value.strip_prefix("0x").unwrap_or(value);

    if let Some((pos, ch)) = hex_str
        .chars()
        .enumerate()
        .find(|(_, c)| !c.is_ascii_hexdigit())
    {
        return Err(HexCodecError::InvalidCharacter {
            field: field_name.to_string(),
            ch,
            pos,
        });
    }

    hex::decode(hex_str).map_err(|e| HexCodecError::Decode {
        field: field_name.to_string(),
        reason: e.to_string(),
    })
}

/// Encodes bytes as lowercase hex with a `0x` prefix.
pub fn encode_hex_prefixed(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Left-pads a big-endian buffer to `N` bytes.
///
/// Returns `None` when the value does not fit once leading zeros are dropped.
pub fn left_pad<const N: usize>(bytes: &[u8]) -> Option<[u8; N]> {
    let first_non_zero = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    let trimmed = &bytes[first_non_zero..];
    if trimmed.len() > N {
        return None;
    }
    let mut out = [0u8; N];
    out[N - trimmed.len()..].copy_from_slice(trimmed);
    Some(out)
}
