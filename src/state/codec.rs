//! Byte arrays inside JSON records are stored as standard base64.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::CodecError;

pub fn encode_bytes(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode_bytes(text: &str) -> Result<Vec<u8>, CodecError> {
    Ok(STANDARD.decode(text.trim())?)
}

/// One byte per cell, 0 or 1
pub fn encode_mask(mask: &[bool]) -> String {
    let bytes: Vec<u8> = mask.iter().map(|&filled| filled as u8).collect();
    encode_bytes(&bytes)
}

/// Any non-zero byte counts as filled.
pub fn decode_mask(text: &str) -> Result<Vec<bool>, CodecError> {
    Ok(decode_bytes(text)?.into_iter().map(|b| b != 0).collect())
}
